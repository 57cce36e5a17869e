use contacts_core::people::{
    self, ConnectionsPage, Person, SearchResults, DETAIL_PERSON_FIELDS, LIST_PERSON_FIELDS,
    SEARCH_READ_MASK,
};
use contacts_core::{ApiRequest, FieldSpec, InputSchema, Query, Result};
use serde::Deserialize;
use serde_json::json;

use super::{non_empty, present, resource_path, Tool, ToolAnnotations, ToolContext, ToolResult};

const SORT_ORDERS: &[&str] = &[
    "LAST_MODIFIED_ASCENDING",
    "LAST_MODIFIED_DESCENDING",
    "FIRST_NAME_ASCENDING",
    "LAST_NAME_ASCENDING",
];

pub fn definitions() -> Result<Vec<Tool>> {
    Ok(vec![
        Tool::new(
            "contacts_list",
            "List contacts",
            "List contacts from the user's Google Contacts. Returns names, emails, phone numbers, and organizations.",
            InputSchema::new(vec![
                FieldSpec::integer("pageSize", 1, 1000, "Maximum number of contacts to return")
                    .default_value(json!(100))
                    .aliases(&["page_size", "limit"]),
                FieldSpec::string("pageToken", "Page token for pagination")
                    .aliases(&["page_token", "cursor"]),
                FieldSpec::enumeration("sortOrder", SORT_ORDERS, "Sort order for results")
                    .aliases(&["sort_order"]),
            ])?,
            people::connections_schema(),
            ToolAnnotations::read_only(),
            contacts_list,
        ),
        Tool::new(
            "contact_get",
            "Get contact",
            "Get detailed information about a single contact by resource name.",
            InputSchema::new(vec![FieldSpec::string(
                "resourceName",
                "The resource name of the contact (e.g., \"people/c12345\")",
            )
            .required()
            .aliases(&["resource_name", "resourceId", "id"])])?,
            people::person_schema(true),
            ToolAnnotations::read_only(),
            contact_get,
        ),
        Tool::new(
            "contact_search",
            "Search contacts",
            "Search the user's own contacts by name, email address or phone number.",
            InputSchema::new(vec![
                FieldSpec::string(
                    "query",
                    "Search query - prefix matches against names, email addresses, and phone numbers",
                )
                .required()
                .aliases(&["q"]),
                FieldSpec::integer("pageSize", 1, 30, "Maximum number of results")
                    .default_value(json!(10))
                    .aliases(&["page_size", "limit"]),
            ])?,
            people::search_results_schema(),
            ToolAnnotations::read_only(),
            contact_search,
        ),
    ])
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContactsListArgs {
    page_size: u32,
    page_token: Option<String>,
    sort_order: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContactGetArgs {
    resource_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContactSearchArgs {
    query: String,
    page_size: u32,
}

fn contacts_list(ctx: &ToolContext, args: ContactsListArgs) -> Result<ToolResult> {
    let query = Query::new()
        .set("personFields", LIST_PERSON_FIELDS)
        .set("pageSize", args.page_size)
        .set_opt("pageToken", non_empty(args.page_token))
        .set_opt("sortOrder", args.sort_order);

    let raw = ctx.call(&ApiRequest::get("/people/me/connections").with_query(&query))?;
    Ok(present(people::reshape::<ConnectionsPage>(raw)?))
}

fn contact_get(ctx: &ToolContext, args: ContactGetArgs) -> Result<ToolResult> {
    let query = Query::new().set("personFields", DETAIL_PERSON_FIELDS);

    let raw = ctx.call(&ApiRequest::get(resource_path(&args.resource_name)).with_query(&query))?;
    Ok(present(people::reshape::<Person>(raw)?))
}

fn contact_search(ctx: &ToolContext, args: ContactSearchArgs) -> Result<ToolResult> {
    let query = Query::new()
        .set("query", &args.query)
        .set("readMask", SEARCH_READ_MASK)
        .set("pageSize", args.page_size);

    let raw = ctx.call(&ApiRequest::get("/people:searchContacts").with_query(&query))?;
    Ok(present(people::reshape::<SearchResults>(raw)?))
}
