use async_trait::async_trait;
use serde::Serialize;

use crate::domain::InvocationResult;

/// Argument map of a `tools/call` request.
pub type Arguments = serde_json::Map<String, serde_json::Value>;

/// Minimal metadata every tool must expose.
pub trait ToolSpec {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn input_schema(&self) -> serde_json::Value;

    fn descriptor(&self) -> ActionDescriptor {
        ActionDescriptor {
            name: self.name(),
            description: self.description(),
            input_schema: self.input_schema(),
        }
    }
}

/// Tool = Spec + invocation. The declared schema is advisory; `call` receives
/// the raw arguments.
#[async_trait]
pub trait Tool: ToolSpec + Send + Sync {
    async fn call(&self, arguments: &Arguments) -> InvocationResult;
}

/// Static description of one invocable action, as listed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}
