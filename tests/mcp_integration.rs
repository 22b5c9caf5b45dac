//! Integration tests for the MCP server loop.
//!
//! Each test feeds a scripted client session through an in-memory transport
//! and inspects the replies written back, with a fake Rhino plugin behind
//! the server.

mod common;

use common::{accept_all, scripts_only, unreachable_address, FakeRhino};
use rhino_mcp::mcp::server::{McpServer, ServerState};
use rhino_mcp::mcp::Transport;
use rhino_mcp::rhino::{HostConnection, RhinoConnection};
use serde_json::{json, Value};

const INITIALIZE: &str = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test-client","version":"0.1"}}}"#;
const INITIALIZED: &str = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;

/// Runs `lines` through a fresh server and returns the parsed replies.
async fn session<C: HostConnection>(server: &mut McpServer<C>, lines: &[&str]) -> Vec<Value> {
    let input = lines.join("\n") + "\n";
    let mut transport = Transport::new(input.as_bytes(), Vec::new());
    server.serve(&mut transport).await.unwrap();

    let output = String::from_utf8(transport.into_writer()).unwrap();
    output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn call(id: u64, name: &str, arguments: Value) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments }
    })
    .to_string()
}

fn tool_text(reply: &Value) -> &str {
    reply["result"]["content"][0]["text"].as_str().unwrap()
}

#[tokio::test]
async fn full_session_creates_text_dot() {
    let rhino = FakeRhino::spawn(accept_all).await;
    let mut server = McpServer::new(RhinoConnection::new(rhino.config()));

    let create = call(
        3,
        "create_text_dot",
        json!({"text": "P1", "location": [1, 1, 0], "name": "Dot-One", "color": [0, 0, 255]}),
    );
    let replies = session(
        &mut server,
        &[
            INITIALIZE,
            INITIALIZED,
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            &create,
        ],
    )
    .await;

    // The notification gets no reply.
    assert_eq!(replies.len(), 3);

    assert_eq!(replies[0]["id"], 1);
    assert_eq!(replies[0]["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(replies[0]["result"]["serverInfo"]["name"], "rhino-mcp");
    assert!(replies[0]["result"]["capabilities"]["tools"].is_object());

    let names: Vec<&str> = replies[1]["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tool| tool["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["create_text", "create_text_dot", "create_leader", "get_document_info"]
    );

    assert_eq!(replies[2]["id"], 3);
    assert_eq!(tool_text(&replies[2]), "Created TEXT_DOT: Dot-One");
    assert_ne!(replies[2]["result"]["isError"], true);

    assert_eq!(server.state(), ServerState::ShuttingDown);
    assert_eq!(rhino.commands(), vec!["create_object"]);
}

#[tokio::test]
async fn session_uses_fallback_transparently() {
    let rhino = FakeRhino::spawn(scripts_only).await;
    let mut server = McpServer::new(RhinoConnection::new(rhino.config()));

    let create = call(
        2,
        "create_leader",
        json!({"points": [[0, 0, 0], [5, 0, 0]], "text": "Edge A", "name": "Leader A"}),
    );
    let replies = session(&mut server, &[INITIALIZE, INITIALIZED, &create]).await;

    assert_eq!(tool_text(&replies[1]), "Created LEADER: Leader A");
    let requests = rhino.requests();
    let script = requests[1]["params"]["code"].as_str().unwrap();
    assert!(script.contains("pts = [[0,0,0],[5,0,0]]\n"));
    assert!(script.contains(r#"_id = rs.AddLeader(pts, None, "Edge A")"#));
}

#[tokio::test]
async fn session_reports_offline_rhino_as_tool_error() {
    let address = unreachable_address().await;
    let mut server = McpServer::new(RhinoConnection::new(common::config_for(address)));

    let create = call(2, "create_text", json!({"text": "Hello", "location": [0, 0, 0]}));
    let info = call(3, "get_document_info", json!({}));
    let replies = session(&mut server, &[INITIALIZE, INITIALIZED, &create, &info]).await;

    // Tool failures are results, not JSON-RPC errors.
    assert!(replies[1].get("error").is_none());
    assert_eq!(replies[1]["result"]["isError"], true);
    assert!(tool_text(&replies[1]).starts_with("Error creating text: "));

    let body: Value = serde_json::from_str(tool_text(&replies[2])).unwrap();
    assert_eq!(body["success"], false);
    assert!(!body["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn tools_rejected_before_initialisation() {
    let rhino = FakeRhino::spawn(accept_all).await;
    let mut server = McpServer::new(RhinoConnection::new(rhino.config()));

    let replies = session(
        &mut server,
        &[
            r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#,
            &call(2, "get_document_info", json!({})),
        ],
    )
    .await;

    assert_eq!(replies.len(), 2);
    for reply in &replies {
        assert_eq!(reply["error"]["code"], -32600);
    }
    assert!(rhino.requests().is_empty());
}

#[tokio::test]
async fn malformed_lines_get_errors_and_session_continues() {
    let rhino = FakeRhino::spawn(accept_all).await;
    let mut server = McpServer::new(RhinoConnection::new(rhino.config()));

    let replies = session(
        &mut server,
        &[
            "{not json",
            "",
            INITIALIZE,
            INITIALIZED,
            r#"{"jsonrpc":"2.0","id":4,"method":"resources/list"}"#,
            r#"{"jsonrpc":"2.0","id":5,"method":"ping"}"#,
            &call(6, "delete_everything", json!({})),
        ],
    )
    .await;

    assert_eq!(replies.len(), 5);
    assert_eq!(replies[0]["error"]["code"], -32700);
    assert_eq!(replies[1]["id"], 1);
    assert_eq!(replies[2]["error"]["code"], -32601);
    assert_eq!(replies[3]["result"], json!({}));
    assert_eq!(replies[4]["result"]["isError"], true);
    assert_eq!(tool_text(&replies[4]), "Unknown tool: delete_everything");
}

#[tokio::test]
async fn second_initialize_is_refused() {
    let rhino = FakeRhino::spawn(accept_all).await;
    let mut server = McpServer::new(RhinoConnection::new(rhino.config()));

    let replies = session(&mut server, &[INITIALIZE, INITIALIZED, INITIALIZE]).await;

    assert_eq!(replies.len(), 2);
    assert_eq!(replies[1]["error"]["code"], -32600);
    assert_eq!(server.state(), ServerState::ShuttingDown);
}
