use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::clients::whatsapp::WhatsAppMock;
use crate::core::tool::{Arguments, Tool, ToolSpec};
use crate::domain::{InvocationResult, MessageSender};

pub const TOOL_NAME: &str = "send_whatsapp_message";

#[derive(Clone)]
pub struct SendMessageTool {
    sender: Arc<dyn MessageSender>,
}

impl SendMessageTool {
    pub fn new(sender: Arc<dyn MessageSender>) -> Self {
        Self { sender }
    }
}

impl Default for SendMessageTool {
    fn default() -> Self {
        Self::new(Arc::new(WhatsAppMock::new()))
    }
}

impl ToolSpec for SendMessageTool {
    fn name(&self) -> &'static str {
        TOOL_NAME
    }
    fn description(&self) -> &'static str {
        "Envia mensagem para WhatsApp"
    }
    fn input_schema(&self) -> Value {
        json!({
          "type": "object",
          "properties": {
            "message": { "type": "string", "description": "Mensagem a ser enviada" }
          },
          "required": ["message"]
        })
    }
}

#[async_trait]
impl Tool for SendMessageTool {
    async fn call(&self, arguments: &Arguments) -> InvocationResult {
        let message = read_message(arguments);
        tracing::debug!(chars = message.chars().count(), "send_whatsapp_message invoked");
        let res = self.sender.send(&message).await;
        if let Err(e) = &res {
            tracing::warn!(error = %e, "send_whatsapp_message failed");
        }
        res.into()
    }
}

/// The schema marks `message` as required, but it is not enforced: a missing
/// or null field reads as empty, other JSON values as their JSON text.
fn read_message(arguments: &Arguments) -> String {
    match arguments.get("message") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
