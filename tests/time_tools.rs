//! Tool scenarios through the dispatcher: time formatting, conversion,
//! defaults, and structured failures.

use std::sync::Arc;

use serde_json::{json, Value};

use tempus_mcp::protocol::{DispatchReply, Dispatcher};
use tempus_mcp::session::SessionRegistry;
use tempus_mcp::types::JsonRpcMessage;

fn dispatcher() -> Arc<Dispatcher> {
    let tools = Arc::new(tempus_mcp::tools::default_registry().unwrap());
    Arc::new(Dispatcher::new(Arc::new(SessionRegistry::new()), tools))
}

async fn send(dispatcher: &Dispatcher, session_id: Option<&str>, msg: Value) -> DispatchReply {
    let parsed: JsonRpcMessage = serde_json::from_value(msg).unwrap();
    dispatcher.handle(session_id, parsed).await
}

async fn init_session(dispatcher: &Dispatcher) -> String {
    let init = json!({
        "jsonrpc": "2.0",
        "id": 0,
        "method": "initialize",
        "params": {
            "protocolVersion": "2025-03-26",
            "capabilities": {},
            "clientInfo": { "name": "time-test", "version": "1.0" }
        }
    });
    match send(dispatcher, None, init).await {
        DispatchReply::NewSession { session_id, .. } => session_id.to_string(),
        other => panic!("expected NewSession, got {other:?}"),
    }
}

/// Call a tool and return the full JSON-RPC body.
async fn call_tool(dispatcher: &Dispatcher, sid: &str, name: &str, arguments: Value) -> Value {
    let msg = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments }
    });
    match send(dispatcher, Some(sid), msg).await {
        DispatchReply::Response(body) => body,
        other => panic!("expected Response, got {other:?}"),
    }
}

fn content_text(body: &Value) -> &str {
    body["result"]["content"][0]["text"].as_str().unwrap()
}

#[tokio::test]
async fn get_current_time_in_shanghai_carries_utc8_offset() {
    let d = dispatcher();
    let sid = init_session(&d).await;

    let body = call_tool(&d, &sid, "getCurrentTime", json!({ "timezone": "Asia/Shanghai" })).await;
    assert!(body["result"]["isError"].is_null(), "{body}");
    assert!(
        content_text(&body).ends_with("+08:00"),
        "expected UTC+8 offset, got {}",
        content_text(&body)
    );
}

#[tokio::test]
async fn get_current_time_defaults_to_utc() {
    let d = dispatcher();
    let sid = init_session(&d).await;

    let body = call_tool(&d, &sid, "getCurrentTime", json!({})).await;
    assert!(content_text(&body).ends_with("+00:00"), "{body}");
}

#[tokio::test]
async fn unknown_timezone_is_a_structured_tool_failure() {
    let d = dispatcher();
    let sid = init_session(&d).await;

    let body = call_tool(&d, &sid, "getCurrentTime", json!({ "timezone": "Nowhere/Atlantis" })).await;
    assert_eq!(body["result"]["isError"], true, "{body}");
    assert!(content_text(&body).contains("Unknown timezone"), "{body}");
}

#[tokio::test]
async fn convert_timezone_utc_to_new_york() {
    let d = dispatcher();
    let sid = init_session(&d).await;

    let body = call_tool(
        &d,
        &sid,
        "convertTimezone",
        json!({
            "datetime": "2024-01-01T00:00:00Z",
            "sourceTimezone": "UTC",
            "targetTimezone": "America/New_York"
        }),
    )
    .await;
    assert_eq!(content_text(&body), "2023-12-31 19:00:00 -05:00");
}

#[tokio::test]
async fn convert_timezone_applies_utc_defaults() {
    let d = dispatcher();
    let sid = init_session(&d).await;

    // Only the datetime given: source and target both default to UTC.
    let body = call_tool(
        &d,
        &sid,
        "convertTimezone",
        json!({ "datetime": "2024-06-15T10:30:00Z" }),
    )
    .await;
    assert_eq!(content_text(&body), "2024-06-15 10:30:00 +00:00");
}

#[tokio::test]
async fn malformed_datetime_is_a_structured_tool_failure() {
    let d = dispatcher();
    let sid = init_session(&d).await;

    let body = call_tool(
        &d,
        &sid,
        "convertTimezone",
        json!({ "datetime": "first of never" }),
    )
    .await;
    assert_eq!(body["result"]["isError"], true, "{body}");
    assert!(content_text(&body).contains("Invalid datetime"), "{body}");

    // The failure left the session fully usable.
    let body = call_tool(&d, &sid, "getCurrentTime", json!({})).await;
    assert!(body.get("result").is_some(), "{body}");
}

#[tokio::test]
async fn datetime_type_mismatch_is_a_validation_error() {
    let d = dispatcher();
    let sid = init_session(&d).await;

    let body = call_tool(&d, &sid, "convertTimezone", json!({ "datetime": 1704067200 })).await;
    assert_eq!(body["error"]["code"], -32602, "{body}");
}

#[tokio::test]
async fn tool_output_is_independent_of_session_identity() {
    let d = dispatcher();
    let first = init_session(&d).await;
    let second = init_session(&d).await;

    let args = json!({
        "datetime": "2024-01-01T00:00:00Z",
        "sourceTimezone": "UTC",
        "targetTimezone": "Asia/Tokyo"
    });

    let a = call_tool(&d, &first, "convertTimezone", args.clone()).await;
    let b = call_tool(&d, &second, "convertTimezone", args).await;
    assert_eq!(content_text(&a), content_text(&b));
}
