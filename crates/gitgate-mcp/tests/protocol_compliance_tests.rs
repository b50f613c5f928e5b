//! MCP Protocol Compliance Integration Tests
//!
//! Tests that the MCP server correctly implements JSON-RPC 2.0 and
//! MCP protocol requirements, including ID preservation, error codes,
//! tool listing and end-to-end tool execution against real repositories.

use std::io::Cursor;
use std::sync::Arc;

use gitgate_mcp::{GitMcpServer, ServerConfig};
use gitgate_test_utils::repo::TestRepo;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn server_for(repo: &TestRepo, write_access: bool) -> GitMcpServer {
    let config = ServerConfig {
        repositories: vec![repo.root().to_path_buf()],
        write_access,
        ..Default::default()
    };
    GitMcpServer::new(config.build_gateway())
}

async fn request(server: &GitMcpServer, message: Value) -> Value {
    let response = server.handle_message(&message.to_string()).await.unwrap();
    serde_json::from_str(&response).unwrap()
}

async fn call_tool(server: &GitMcpServer, name: &str, arguments: Value) -> Value {
    request(
        server,
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {"name": name, "arguments": arguments}
        }),
    )
    .await
}

fn tool_names(response: &Value) -> Vec<String> {
    response["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tool| tool["name"].as_str().unwrap().to_string())
        .collect()
}

// ==========================================================================
// JSON-RPC 2.0 envelope
// ==========================================================================

#[tokio::test]
async fn test_numeric_and_string_ids_preserved() {
    let repo = TestRepo::with_commit();
    let server = server_for(&repo, false);

    let numeric = request(&server, json!({"jsonrpc": "2.0", "id": 42, "method": "ping"})).await;
    assert_eq!(numeric["id"], 42, "Numeric ID must be echoed back exactly");
    assert_eq!(numeric["jsonrpc"], "2.0");

    let string = request(
        &server,
        json!({"jsonrpc": "2.0", "id": "req-abc-123", "method": "ping"}),
    )
    .await;
    assert_eq!(string["id"], "req-abc-123");
}

#[tokio::test]
async fn test_unknown_method_returns_method_not_found() {
    let repo = TestRepo::with_commit();
    let server = server_for(&repo, false);

    let response = request(
        &server,
        json!({"jsonrpc": "2.0", "id": "err-test", "method": "resources/list"}),
    )
    .await;

    assert_eq!(response["id"], "err-test");
    assert_eq!(response["error"]["code"], -32601);
    assert!(
        response["error"]["message"]
            .as_str()
            .unwrap()
            .contains("resources/list")
    );
    assert!(response.get("result").is_none());
}

#[tokio::test]
async fn test_malformed_json_returns_parse_error() {
    let repo = TestRepo::with_commit();
    let server = server_for(&repo, false);

    let raw = server.handle_message("{not json").await.unwrap();
    let response: Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(response["error"]["code"], -32700);
    assert!(response["id"].is_null());
}

#[tokio::test]
async fn test_request_without_method_is_invalid() {
    let repo = TestRepo::with_commit();
    let server = server_for(&repo, false);

    let response = request(&server, json!({"jsonrpc": "2.0", "id": 5})).await;

    assert_eq!(response["error"]["code"], -32600);
    assert_eq!(response["id"], 5);
}

#[tokio::test]
async fn test_notification_gets_no_response() {
    let repo = TestRepo::with_commit();
    let server = server_for(&repo, false);

    let response = server
        .handle_message(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
        .await
        .unwrap();
    assert!(response.is_empty());
}

#[tokio::test]
async fn test_tools_call_without_name_is_invalid_params() {
    let repo = TestRepo::with_commit();
    let server = server_for(&repo, false);

    let response = request(
        &server,
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {"arguments": {}}}),
    )
    .await;

    assert_eq!(response["error"]["code"], -32602);
    assert_eq!(response["id"], 3);
}

// ==========================================================================
// MCP lifecycle
// ==========================================================================

#[tokio::test]
async fn test_initialize_reports_server_and_capabilities() {
    let repo = TestRepo::with_commit();
    let server = server_for(&repo, false);

    let response = request(
        &server,
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "test", "version": "1.0"}
            }
        }),
    )
    .await;

    let result = &response["result"];
    assert_eq!(result["protocolVersion"], "2024-11-05");
    assert_eq!(result["serverInfo"]["name"], "gitgate-mcp");
    assert!(result["serverInfo"]["version"].is_string());
    assert!(result["capabilities"]["tools"].is_object());
}

#[tokio::test]
async fn test_ping_returns_empty_result() {
    let repo = TestRepo::with_commit();
    let server = server_for(&repo, false);

    let response = request(&server, json!({"jsonrpc": "2.0", "id": 9, "method": "ping"})).await;
    assert_eq!(response["result"], json!({}));
}

// ==========================================================================
// tools/list
// ==========================================================================

#[tokio::test]
async fn test_tools_list_hides_push_without_write_access() {
    let repo = TestRepo::with_commit();
    let server = server_for(&repo, false);

    let response = request(
        &server,
        json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}),
    )
    .await;
    let names = tool_names(&response);

    assert_eq!(names.len(), 15);
    assert!(names.contains(&"git_status".to_string()));
    assert!(names.contains(&"git_list_repositories".to_string()));
    assert!(!names.contains(&"git_push".to_string()));
}

#[tokio::test]
async fn test_tools_list_includes_push_with_write_access() {
    let repo = TestRepo::with_commit();
    let server = server_for(&repo, true);

    let response = request(
        &server,
        json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}),
    )
    .await;
    let names = tool_names(&response);

    assert_eq!(names.len(), 16);
    assert!(names.contains(&"git_push".to_string()));

    for tool in response["result"]["tools"].as_array().unwrap() {
        assert!(tool["description"].is_string());
        assert_eq!(tool["inputSchema"]["type"], "object");
    }
}

// ==========================================================================
// tools/call
// ==========================================================================

#[tokio::test]
async fn test_status_call_uses_default_repository() {
    let repo = TestRepo::with_commit();
    repo.write_file("untracked.txt", "new");
    let server = server_for(&repo, false);

    let response = call_tool(&server, "git_status", json!({})).await;
    let result = &response["result"];
    let text = result["content"][0]["text"].as_str().unwrap();

    assert!(result.get("isError").is_none());
    assert!(text.starts_with("Repository status for"));
    assert!(text.contains("untracked.txt"));
}

#[tokio::test]
async fn test_list_repositories_names_registered_root() {
    let repo = TestRepo::with_commit();
    let server = server_for(&repo, false);

    let response = call_tool(&server, "git_list_repositories", json!({})).await;
    let text = response["result"]["content"][0]["text"].as_str().unwrap();

    assert!(text.starts_with("Available repositories (1):"));
    assert!(text.contains(&repo.root().display().to_string()));
}

#[tokio::test]
async fn test_outside_path_is_a_tool_error() {
    let repo = TestRepo::with_commit();
    let server = server_for(&repo, false);
    let outside = repo.outside("elsewhere");

    let response = call_tool(
        &server,
        "git_status",
        json!({"repo_path": outside.display().to_string()}),
    )
    .await;
    let result = &response["result"];

    assert!(response.get("error").is_none(), "tool failures are not JSON-RPC errors");
    assert_eq!(result["isError"], true);
    assert!(
        result["content"][0]["text"]
            .as_str()
            .unwrap()
            .starts_with("Repository path error:")
    );
}

#[tokio::test]
async fn test_push_refused_without_write_access() {
    let repo = TestRepo::with_remote();
    let server = server_for(&repo, false);

    let response = call_tool(&server, "git_push", json!({})).await;
    let result = &response["result"];

    assert_eq!(result["isError"], true);
    assert!(
        result["content"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Write access is disabled")
    );
}

#[tokio::test]
async fn test_unknown_tool_is_a_tool_error() {
    let repo = TestRepo::with_commit();
    let server = server_for(&repo, false);

    let response = call_tool(&server, "git_rebase", json!({})).await;
    assert_eq!(response["result"]["isError"], true);
}

#[tokio::test]
async fn test_add_and_commit_through_protocol() {
    let repo = TestRepo::with_commit();
    repo.write_file("feature.txt", "feature");
    let server = server_for(&repo, false);

    let add = call_tool(&server, "git_add", json!({"files": "feature.txt"})).await;
    assert!(add["result"].get("isError").is_none(), "{add}");

    let commit = call_tool(&server, "git_commit", json!({"message": "Add feature"})).await;
    assert!(commit["result"].get("isError").is_none(), "{commit}");

    assert_eq!(repo.commit_count(), 2);
    let log = call_tool(&server, "git_log", json!({"max_count": 1})).await;
    let text = log["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.starts_with("Commit history for"));
    assert!(text.contains("Add feature"));
}

// ==========================================================================
// Stream serving
// ==========================================================================

#[tokio::test]
async fn test_serve_answers_every_request_and_skips_notifications() {
    let repo = TestRepo::with_commit();
    let server = Arc::new(server_for(&repo, false));

    let input = [
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {"name": "git_status"}}),
    ]
    .iter()
    .map(Value::to_string)
    .collect::<Vec<_>>()
    .join("\n")
        + "\n\n";

    let mut output = Vec::new();
    server
        .serve(Cursor::new(input.into_bytes()), &mut output)
        .await
        .unwrap();

    let responses: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(responses.len(), 3);

    let by_id = |id: i64| {
        responses
            .iter()
            .find(|r| r["id"] == id)
            .unwrap_or_else(|| panic!("no response for id {id}"))
    };
    assert_eq!(by_id(1)["result"]["serverInfo"]["name"], "gitgate-mcp");
    assert!(by_id(2)["result"]["tools"].is_array());
    assert!(
        by_id(3)["result"]["content"][0]["text"]
            .as_str()
            .unwrap()
            .starts_with("Repository status for")
    );
}
