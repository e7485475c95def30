//! MCP server integration (stdio + Streamable HTTP) for whatsapp-mcp-server.
//!
//! - Lists the registry's tools with their hand-written input schemas
//! - Dispatches `tools/call`; unknown names become JSON-RPC errors, tool
//!   failures become `isError` content
//!
//! `list_tools`/`call_tool` are implemented directly instead of through the
//! `#[tool_router]` macros so the listed schema is exactly the declared one
//! and unknown names are reported as `Unknown action: <name>`.

use std::{future::Future, sync::Arc};

use rmcp::{
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, JsonObject,
        ListToolsResult, PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
    },
    service::{RequestContext, RoleServer},
    ErrorData as McpError, ServerHandler,
};

use crate::core::error::AdapterError;
use crate::core::tool::ActionDescriptor;
use crate::domain::{InvocationResult, MessageSender};
use crate::tools::registry::{build_default_registry, build_registry, ToolRegistry};

pub const SERVER_NAME: &str = "whatsapp-mcp-server";

/// The MCP server handler. Cheap to clone; holds only the shared registry.
#[derive(Clone)]
pub struct WhatsAppSvc {
    registry: ToolRegistry,
}

impl WhatsAppSvc {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    pub fn list(&self) -> ListToolsResult {
        ListToolsResult::with_all_items(self.registry.list().into_iter().map(to_mcp_tool).collect())
    }

    /// `tools/call` without the request context, so it can be driven directly.
    pub async fn dispatch(&self, request: CallToolRequestParam) -> Result<CallToolResult, McpError> {
        let name: &str = &request.name;
        tracing::debug!(tool = %name, "tools/call invoked");
        let args = request.arguments.unwrap_or_default();

        let outcome = self.registry.call(name, &args).await.map_err(|e| {
            tracing::warn!(error = %e, "tools/call rejected");
            to_mcp_error(e)
        })?;
        tracing::trace!(outcome = ?outcome, "tools/call returning");
        Ok(to_call_result(&outcome))
    }
}

impl ServerHandler for WhatsAppSvc {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some("Use send_whatsapp_message to post a message to the main group.".into()),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        std::future::ready(Ok(self.list()))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        self.dispatch(request)
    }
}

fn to_mcp_tool(d: ActionDescriptor) -> Tool {
    let schema: JsonObject = match d.input_schema {
        serde_json::Value::Object(map) => map,
        _ => JsonObject::new(),
    };
    Tool::new(d.name, d.description, Arc::new(schema))
}

fn to_mcp_error(e: AdapterError) -> McpError {
    match e {
        AdapterError::UnknownAction(_) => McpError::internal_error(e.to_string(), None),
    }
}

fn to_call_result(outcome: &InvocationResult) -> CallToolResult {
    let content = vec![Content::text(outcome.render())];
    if outcome.is_error() {
        CallToolResult::error(content)
    } else {
        CallToolResult::success(content)
    }
}

pub fn factory_with_sender(sender: Arc<dyn MessageSender>) -> WhatsAppSvc {
    WhatsAppSvc::new(build_registry(sender))
}

pub fn factory_default() -> WhatsAppSvc {
    WhatsAppSvc::new(build_default_registry())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SendError, SendReceipt};
    use serde_json::{json, Value};

    struct Instant;

    #[async_trait::async_trait]
    impl MessageSender for Instant {
        async fn send(&self, _message: &str) -> Result<SendReceipt, SendError> {
            let now = chrono::Utc::now();
            Ok(SendReceipt {
                message_id: format!("msg_{}", now.timestamp_millis()),
                status: "sent".into(),
                timestamp: now,
                destination: "Grupo Principal".into(),
            })
        }
    }

    struct Down;

    #[async_trait::async_trait]
    impl MessageSender for Down {
        async fn send(&self, _message: &str) -> Result<SendReceipt, SendError> {
            Err(SendError::Message("gateway down".into()))
        }
    }

    fn call(name: &str, args: Value) -> CallToolRequestParam {
        CallToolRequestParam {
            name: name.to_string().into(),
            arguments: args.as_object().cloned(),
        }
    }

    #[test]
    fn list_contains_exactly_the_declared_tool() {
        let svc = factory_with_sender(Arc::new(Instant));
        let v = serde_json::to_value(svc.list()).unwrap();
        let tools = v["tools"].as_array().expect("tools array");
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["name"], "send_whatsapp_message");
        assert_eq!(tools[0]["description"], "Envia mensagem para WhatsApp");
        assert_eq!(
            tools[0]["inputSchema"],
            json!({
                "type": "object",
                "properties": {
                    "message": { "type": "string", "description": "Mensagem a ser enviada" }
                },
                "required": ["message"]
            })
        );
    }

    #[test]
    fn list_is_stable_across_calls() {
        let svc = factory_default();
        let a = serde_json::to_string(&svc.list()).unwrap();
        let b = serde_json::to_string(&svc.list()).unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn call_success_returns_single_text_block() {
        let svc = factory_with_sender(Arc::new(Instant));
        let res = svc
            .dispatch(call("send_whatsapp_message", json!({"message": "Test message"})))
            .await
            .expect("tool should succeed");
        let v = serde_json::to_value(&res).unwrap();
        assert!(!v["isError"].as_bool().unwrap_or(false));
        assert_eq!(v["content"].as_array().unwrap().len(), 1);
        assert_eq!(v["content"][0]["type"], "text");
        let text = v["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("✅ Mensagem enviada com sucesso!"));
        assert!(text.contains("ID: msg_"));
        assert!(text.contains("Para: Grupo Principal"));
        assert!(text.contains("Status: sent"));
    }

    #[tokio::test]
    async fn call_without_arguments_still_succeeds() {
        let svc = factory_with_sender(Arc::new(Instant));
        let res = svc
            .dispatch(CallToolRequestParam {
                name: "send_whatsapp_message".into(),
                arguments: None,
            })
            .await
            .unwrap();
        let v = serde_json::to_value(&res).unwrap();
        assert!(v["content"][0]["text"].as_str().unwrap().starts_with("✅"));
    }

    #[tokio::test]
    async fn sender_failure_is_error_content_not_protocol_error() {
        let svc = factory_with_sender(Arc::new(Down));
        let res = svc
            .dispatch(call("send_whatsapp_message", json!({"message": "x"})))
            .await
            .expect("tool failures stay in content");
        let v = serde_json::to_value(&res).unwrap();
        assert_eq!(v["isError"], true);
        assert_eq!(v["content"][0]["text"], "❌ Erro ao enviar mensagem: gateway down");
    }

    #[tokio::test]
    async fn unknown_tool_is_protocol_error_naming_it() {
        let svc = factory_with_sender(Arc::new(Instant));
        let err = match svc.dispatch(call("unknown_tool", json!({}))).await {
            Err(e) => e,
            Ok(_) => panic!("expected protocol error, got Ok"),
        };
        // JSON-RPC internal error is -32603
        assert_eq!(err.code.0, -32603);
        assert_eq!(err.message, "Unknown action: unknown_tool");
    }

    #[test]
    fn server_info_advertises_tools() {
        let info = factory_default().get_info();
        assert_eq!(info.server_info.name, "whatsapp-mcp-server");
        assert!(info.capabilities.tools.is_some());
    }
}
