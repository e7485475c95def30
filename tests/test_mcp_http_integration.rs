use axum::Router;
use http_body_util::BodyExt; // for .collect
use hyper::{header, Request, StatusCode};
use serde_json::{json, Value};
use tokio::time::{timeout, Duration};
use tower::ServiceExt; // for .oneshot

use whatsapp_mcp_server::infra::http_app::build_app_default;

static MCP_PROTOCOL_VERSION: &str = "2025-03-26";

fn post(body: &Value, session_id: Option<&str>) -> Request<axum::body::Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header(header::ACCEPT, "application/json, text/event-stream")
        .header(header::CONTENT_TYPE, "application/json")
        .header("MCP-Protocol-Version", MCP_PROTOCOL_VERSION);
    if let Some(id) = session_id {
        builder = builder.header("MCP-Session-Id", id);
    }
    builder.body(axum::body::Body::from(body.to_string())).unwrap()
}

/// Pull the JSON-RPC message out of an SSE (`data: ...`) or plain JSON body.
async fn rpc_message(res: axum::response::Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let s = String::from_utf8_lossy(&bytes);
    s.lines()
        .find_map(|line| line.strip_prefix("data: ").map(|d| d.to_string()))
        .and_then(|d| serde_json::from_str::<Value>(&d).ok())
        .or_else(|| serde_json::from_str::<Value>(&s).ok())
        .expect("Did not find an rpc message in response body")
}

async fn initialize(app: &Router) -> String {
    let init = json!({
        "jsonrpc":"2.0","id":1,"method":"initialize",
        "params":{ "protocolVersion":MCP_PROTOCOL_VERSION,"capabilities":{},"clientInfo":{"name":"test","version":"0.1"} }
    });
    let init_res = app.clone().oneshot(post(&init, None)).await.unwrap();
    assert!(init_res.status().is_success());
    let session_id = init_res
        .headers()
        .get("MCP-Session-Id")
        .unwrap()
        .to_str()
        .unwrap()
        .to_owned();
    let v = rpc_message(init_res).await;
    assert_eq!(v["result"]["serverInfo"]["name"], "whatsapp-mcp-server");

    let initialized_notif =
        json!({"jsonrpc":"2.0","method":"notifications/initialized","params":{}});
    let initialized_res = app
        .clone()
        .oneshot(post(&initialized_notif, Some(&session_id)))
        .await
        .unwrap();
    assert_eq!(initialized_res.status(), StatusCode::ACCEPTED);
    session_id
}

#[tokio::test]
async fn initialize_list_and_call_over_streamable_http() {
    let app = build_app_default();
    let session_id = initialize(&app).await;

    // tools/list
    let list = json!({"jsonrpc":"2.0","id":2,"method":"tools/list","params":{}});
    let list_res = timeout(
        Duration::from_secs(20),
        app.clone().oneshot(post(&list, Some(&session_id))),
    )
    .await
    .unwrap()
    .unwrap();
    assert!(list_res.status().is_success());
    let v = rpc_message(list_res).await;
    let tools = v["result"]["tools"].as_array().expect("tools array");
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0]["name"], "send_whatsapp_message");
    assert_eq!(tools[0]["inputSchema"]["required"], json!(["message"]));

    // tools/call
    let call = json!({
        "jsonrpc":"2.0","id":3,"method":"tools/call",
        "params": {"name":"send_whatsapp_message","arguments":{"message":"Test message"}}
    });
    let call_res = timeout(
        Duration::from_secs(20),
        app.clone().oneshot(post(&call, Some(&session_id))),
    )
    .await
    .unwrap()
    .unwrap();
    assert!(call_res.status().is_success());
    let v = rpc_message(call_res).await;
    assert_eq!(v["id"], 3);
    assert_eq!(v["result"]["content"][0]["type"], "text");
    let text = v["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("✅ Mensagem enviada com sucesso!"));
    assert!(text.contains("ID: msg_"));
    assert!(text.contains("Para: Grupo Principal"));
    assert!(text.contains("Status: sent"));
}

#[tokio::test]
async fn unknown_tool_yields_jsonrpc_error_over_streamable_http() {
    let app = build_app_default();
    let session_id = initialize(&app).await;

    let call = json!({
        "jsonrpc":"2.0","id":4,"method":"tools/call",
        "params": {"name":"unknown_tool","arguments":{}}
    });
    let res = app.clone().oneshot(post(&call, Some(&session_id))).await.unwrap();
    assert!(res.status().is_success());
    let v = rpc_message(res).await;
    assert!(v.get("result").is_none());
    let msg = v["error"]["message"].as_str().expect("error message");
    assert!(msg.contains("unknown_tool"), "got: {msg}");
}
