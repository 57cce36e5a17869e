use contacts_core::testing::MockTransport;
use contacts_core::{Credential, Method};
use contacts_mcp::server::McpServer;
use contacts_mcp::tools::{ToolContext, ToolRegistry};
use serde_json::{json, Value};
use std::sync::Arc;

fn request(method: &str, params: Option<Value>) -> String {
    let req = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": method,
        "params": params
    });
    serde_json::to_string(&req).unwrap()
}

fn tool_call(name: &str, arguments: Value) -> String {
    request(
        "tools/call",
        Some(json!({
            "name": name,
            "arguments": arguments
        })),
    )
}

fn parse_response(response: &str) -> Value {
    serde_json::from_str(response).unwrap()
}

fn get_text_content(response: &Value) -> &str {
    response["result"]["content"][0]["text"]
        .as_str()
        .unwrap_or("")
}

fn server_with(transport: Arc<MockTransport>) -> McpServer {
    let ctx = ToolContext::new(Credential::new("test-token"), transport);
    McpServer::new(ToolRegistry::new(ctx).unwrap())
}

fn server() -> McpServer {
    server_with(Arc::new(MockTransport::replying(json!({}))))
}

// ============================================================================
// MCP Protocol Tests
// ============================================================================

#[test]
fn initialize_returns_server_info() {
    let mut server = server();
    let resp = server
        .handle_request(&request("initialize", Some(json!({}))))
        .unwrap();
    let json: Value = parse_response(&resp);

    assert_eq!(json["jsonrpc"], "2.0");
    assert_eq!(json["id"], 1);
    assert_eq!(json["result"]["serverInfo"]["name"], "contacts-mcp");
    assert!(json["result"]["serverInfo"]["version"].as_str().is_some());
    assert_eq!(json["result"]["protocolVersion"], "2025-06-18");
    assert!(json["result"]["capabilities"]["tools"].is_object());
}

#[test]
fn initialized_notification_returns_nothing() {
    let mut server = server();
    assert!(!server.is_initialized());

    let notice = json!({"jsonrpc": "2.0", "method": "notifications/initialized"});
    let resp = server.handle_request(&notice.to_string());
    assert!(resp.is_none());
    assert!(server.is_initialized());

    assert!(server.handle_request(&request("initialized", None)).is_none());
}

#[test]
fn requests_without_id_get_no_response() {
    let mut server = server();
    let notice = json!({"jsonrpc": "2.0", "method": "tools/list"});
    assert!(server.handle_request(&notice.to_string()).is_none());
}

#[test]
fn ping_returns_empty_object() {
    let mut server = server();
    let resp = server.handle_request(&request("ping", None)).unwrap();
    let json: Value = parse_response(&resp);

    assert_eq!(json["result"], json!({}));
}

#[test]
fn tools_list_returns_all_tools() {
    let mut server = server();
    let resp = server.handle_request(&request("tools/list", None)).unwrap();
    let json: Value = parse_response(&resp);

    let tools = json["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 7);

    let tool_names: Vec<&str> = tools.iter().filter_map(|t| t["name"].as_str()).collect();
    assert!(tool_names.contains(&"contacts_list"));
    assert!(tool_names.contains(&"contact_update"));
    assert!(tool_names.contains(&"directory_search"));

    for tool in tools {
        assert_eq!(tool["inputSchema"]["type"], "object");
        assert_eq!(tool["outputSchema"]["type"], "object");
        assert!(tool["title"].as_str().is_some());
    }
}

#[test]
fn tools_list_advertises_aliases_and_hints() {
    let mut server = server();
    let resp = server.handle_request(&request("tools/list", None)).unwrap();
    let json: Value = parse_response(&resp);
    let tools = json["result"]["tools"].as_array().unwrap();
    let tool = |name: &str| tools.iter().find(|t| t["name"] == name).unwrap().clone();

    let get = tool("contact_get");
    assert_eq!(get["inputSchema"]["required"], json!(["resourceName"]));
    let description = get["inputSchema"]["properties"]["resourceName"]["description"]
        .as_str()
        .unwrap();
    assert!(description.contains("resource_name"));
    assert_eq!(get["annotations"]["readOnlyHint"], true);

    assert_eq!(tool("contact_delete")["annotations"]["destructiveHint"], true);
    assert!(tool("contact_create").get("annotations").is_none());
}

#[test]
fn unknown_method_returns_error() {
    let mut server = server();
    let resp = server
        .handle_request(&request("unknown/method", None))
        .unwrap();
    let json: Value = parse_response(&resp);

    assert!(json["error"].is_object());
    assert_eq!(json["error"]["code"], -32601);
}

#[test]
fn invalid_json_returns_parse_error() {
    let mut server = server();
    let resp = server.handle_request("not valid json").unwrap();
    let json: Value = parse_response(&resp);

    assert!(json["error"].is_object());
    assert_eq!(json["error"]["code"], -32700);
    assert_eq!(json["id"], Value::Null);
}

#[test]
fn request_without_method_is_invalid() {
    let mut server = server();
    let resp = server
        .handle_request(&json!({"jsonrpc": "2.0", "id": 4}).to_string())
        .unwrap();
    let json: Value = parse_response(&resp);

    assert_eq!(json["error"]["code"], -32600);
    assert_eq!(json["id"], 4);
}

#[test]
fn unknown_tool_returns_invalid_params() {
    let mut server = server();
    let resp = server
        .handle_request(&tool_call("contacts_nuke", json!({})))
        .unwrap();
    let json: Value = parse_response(&resp);

    assert_eq!(json["error"]["code"], -32602);
}

#[test]
fn tools_call_without_params_is_invalid() {
    let mut server = server();
    let resp = server.handle_request(&request("tools/call", None)).unwrap();
    let json: Value = parse_response(&resp);

    assert_eq!(json["error"]["code"], -32602);
}

// ============================================================================
// Contact Tools Tests
// ============================================================================

#[test]
fn contacts_list_returns_structured_page() {
    let transport = Arc::new(MockTransport::replying(json!({
        "connections": [
            {"resourceName": "people/c1", "names": [{"displayName": "Ada Lovelace"}]}
        ],
        "nextPageToken": "NEXT",
        "totalPeople": 2
    })));
    let mut server = server_with(transport.clone());

    let resp = server
        .handle_request(&tool_call("contacts_list", json!({"limit": 1})))
        .unwrap();
    let json = parse_response(&resp);

    let structured = &json["result"]["structuredContent"];
    assert_eq!(structured["nextPageToken"], "NEXT");
    assert_eq!(structured["connections"][0]["resourceName"], "people/c1");
    assert!(json["result"].get("isError").is_none());

    let text: Value = serde_json::from_str(get_text_content(&json)).unwrap();
    assert_eq!(&text, structured);

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].path.contains("pageSize=1"));
}

#[test]
fn contact_get_accepts_resource_id_alias() {
    let transport = Arc::new(MockTransport::replying(json!({
        "resourceName": "people/c42",
        "etag": "%Eg",
        "biographies": [{"value": "Mathematician", "contentType": "TEXT_PLAIN"}]
    })));
    let mut server = server_with(transport.clone());

    let resp = server
        .handle_request(&tool_call("contact_get", json!({"resourceId": "people/c42"})))
        .unwrap();
    let json = parse_response(&resp);

    assert_eq!(
        json["result"]["structuredContent"]["biographies"][0]["value"],
        "Mathematician"
    );
    assert!(transport.requests()[0].path.starts_with("/people/c42?personFields="));
}

#[test]
fn conflicting_aliases_become_error_result() {
    let transport = Arc::new(MockTransport::replying(json!({})));
    let mut server = server_with(transport.clone());

    let resp = server
        .handle_request(&tool_call(
            "contact_get",
            json!({"resourceName": "people/c1", "id": "people/c2"}),
        ))
        .unwrap();
    let json = parse_response(&resp);

    assert_eq!(json["result"]["isError"], true);
    assert_eq!(
        json["result"]["structuredContent"]["error"]["kind"],
        "invalid_input"
    );
    assert!(get_text_content(&json).contains("conflicting"));
    assert!(transport.requests().is_empty());
}

#[test]
fn contact_create_sends_minimal_person() {
    let remote = json!({
        "resourceName": "people/c7",
        "etag": "%new",
        "names": [{"givenName": "Ada", "displayNameLastFirst": "Ada"}],
        "emailAddresses": [{"value": "ada@example.com", "metadata": {"primary": true}}],
        "metadata": {"sources": [{"type": "CONTACT"}]}
    });
    let transport = Arc::new(MockTransport::replying(remote.clone()));
    let mut server = server_with(transport.clone());

    let resp = server
        .handle_request(&tool_call(
            "contact_create",
            json!({"givenName": "Ada", "emailAddresses": [{"value": "ada@example.com"}]}),
        ))
        .unwrap();
    let json = parse_response(&resp);

    assert_eq!(json["result"]["structuredContent"], remote);

    let requests = transport.requests();
    assert_eq!(requests[0].method, Method::POST);
    assert_eq!(
        requests[0].body,
        Some(json!({
            "names": [{"givenName": "Ada"}],
            "emailAddresses": [{"value": "ada@example.com"}]
        }))
    );
}

#[test]
fn null_in_known_response_field_becomes_error_result() {
    let transport = Arc::new(MockTransport::replying(json!({
        "resourceName": "people/c1",
        "etag": null,
        "names": [{"givenName": null}]
    })));
    let mut server = server_with(transport);

    let resp = server
        .handle_request(&tool_call("contact_get", json!({"resourceName": "people/c1"})))
        .unwrap();
    let json = parse_response(&resp);

    assert_eq!(json["result"]["isError"], true);
    assert_eq!(
        json["result"]["structuredContent"]["error"]["kind"],
        "output_shape"
    );
}

#[test]
fn contact_update_clears_notes_with_empty_string() {
    let transport = Arc::new(MockTransport::replying(json!({"resourceName": "people/c7"})));
    let mut server = server_with(transport.clone());

    server
        .handle_request(&tool_call(
            "contact_update",
            json!({"resourceName": "people/c7", "etag": "%Eg", "notes": ""}),
        ))
        .unwrap();

    let requests = transport.requests();
    assert_eq!(requests[0].method, Method::PATCH);
    assert_eq!(
        requests[0].path,
        "/people/c7:updateContact?updatePersonFields=biographies"
    );
    assert_eq!(
        requests[0].body.as_ref().unwrap()["biographies"],
        json!([{"value": "", "contentType": "TEXT_PLAIN"}])
    );
}

#[test]
fn contact_update_without_etag_is_rejected() {
    let transport = Arc::new(MockTransport::replying(json!({})));
    let mut server = server_with(transport.clone());

    let resp = server
        .handle_request(&tool_call(
            "contact_update",
            json!({"resourceName": "people/c7", "givenName": "Ada"}),
        ))
        .unwrap();
    let json = parse_response(&resp);

    assert_eq!(json["result"]["isError"], true);
    assert!(get_text_content(&json).contains("etag"));
    assert!(transport.requests().is_empty());
}

#[test]
fn contact_delete_reports_success() {
    let transport = Arc::new(MockTransport::replying(json!({})));
    let mut server = server_with(transport.clone());

    let resp = server
        .handle_request(&tool_call("contact_delete", json!({"resource_name": "people/c123"})))
        .unwrap();
    let json = parse_response(&resp);

    assert_eq!(
        json["result"]["structuredContent"],
        json!({"success": true, "message": "Contact people/c123 deleted successfully"})
    );
    let requests = transport.requests();
    assert_eq!(requests[0].method, Method::DELETE);
    assert_eq!(requests[0].path, "/people/c123:deleteContact");
}

#[test]
fn remote_error_becomes_error_result() {
    let transport = Arc::new(MockTransport::failing(
        403,
        json!({"error": {"code": 403, "status": "PERMISSION_DENIED"}}),
    ));
    let mut server = server_with(transport);

    let resp = server
        .handle_request(&tool_call("directory_search", json!({"query": "grace"})))
        .unwrap();
    let json = parse_response(&resp);

    let error = &json["result"]["structuredContent"]["error"];
    assert_eq!(json["result"]["isError"], true);
    assert_eq!(error["kind"], "remote_api");
    assert_eq!(error["status"], 403);
    assert_eq!(error["body"]["error"]["status"], "PERMISSION_DENIED");
    assert!(get_text_content(&json).contains("403"));
}

#[test]
fn malformed_remote_response_becomes_error_result() {
    let transport = Arc::new(MockTransport::replying(json!({"connections": "nope"})));
    let mut server = server_with(transport);

    let resp = server
        .handle_request(&tool_call("contacts_list", json!({})))
        .unwrap();
    let json = parse_response(&resp);

    assert_eq!(json["result"]["isError"], true);
    assert_eq!(
        json["result"]["structuredContent"]["error"]["kind"],
        "output_shape"
    );
}
