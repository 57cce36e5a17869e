use contacts_core::people::{self, DirectoryPage, DIRECTORY_SOURCE, SEARCH_READ_MASK};
use contacts_core::{ApiRequest, FieldSpec, InputSchema, Query, Result};
use serde::Deserialize;
use serde_json::json;

use super::{non_empty, present, Tool, ToolAnnotations, ToolContext, ToolResult};

pub fn definitions() -> Result<Vec<Tool>> {
    Ok(vec![Tool::new(
        "directory_search",
        "Search directory",
        "Search the organization directory for people (coworkers, etc). Requires directory.readonly scope.",
        InputSchema::new(vec![
            FieldSpec::string(
                "query",
                "Search query - matches against names, email addresses, and phone numbers",
            )
            .required()
            .aliases(&["q"]),
            FieldSpec::integer("pageSize", 1, 500, "Maximum number of results")
                .default_value(json!(10))
                .aliases(&["page_size", "limit"]),
            FieldSpec::string("pageToken", "Page token for pagination")
                .aliases(&["page_token", "cursor"]),
        ])?,
        people::directory_schema(),
        ToolAnnotations::read_only(),
        directory_search,
    )])
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DirectorySearchArgs {
    query: String,
    page_size: u32,
    page_token: Option<String>,
}

fn directory_search(ctx: &ToolContext, args: DirectorySearchArgs) -> Result<ToolResult> {
    let query = Query::new()
        .set("query", &args.query)
        .set("readMask", SEARCH_READ_MASK)
        .set("sources", DIRECTORY_SOURCE)
        .set("pageSize", args.page_size)
        .set_opt("pageToken", non_empty(args.page_token));

    let raw = ctx.call(&ApiRequest::get("/people:searchDirectoryPeople").with_query(&query))?;
    Ok(present(people::reshape::<DirectoryPage>(raw)?))
}
