use std::collections::BTreeMap;
use std::sync::Arc;

use crate::core::error::AdapterError;
use crate::core::tool::{ActionDescriptor, Arguments, Tool};
use crate::domain::{InvocationResult, MessageSender};
use crate::tools::send_message::SendMessageTool;

#[derive(Clone)]
pub struct ToolRegistry {
    by_name: Arc<BTreeMap<&'static str, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    pub fn with_tools<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Tool>>,
    {
        let map: BTreeMap<&'static str, Arc<dyn Tool>> =
            iter.into_iter().map(|t| (t.name(), t)).collect();
        Self { by_name: Arc::new(map) }
    }

    pub fn list(&self) -> Vec<ActionDescriptor> {
        self.by_name.values().map(|t| t.descriptor()).collect()
    }

    /// Unknown names fail here, before any tool runs.
    pub async fn call(&self, name: &str, args: &Arguments) -> Result<InvocationResult, AdapterError> {
        let t = self
            .by_name
            .get(name)
            .ok_or_else(|| AdapterError::UnknownAction(name.to_owned()))?;
        Ok(t.call(args).await)
    }
}

/// Registry exposing `send_whatsapp_message` backed by the given sender.
pub fn build_registry(sender: Arc<dyn MessageSender>) -> ToolRegistry {
    let send: Arc<dyn Tool> = Arc::new(SendMessageTool::new(sender));
    ToolRegistry::with_tools([send])
}

/// Registry backed by the simulated WhatsApp client.
pub fn build_default_registry() -> ToolRegistry {
    let send: Arc<dyn Tool> = Arc::new(SendMessageTool::default());
    ToolRegistry::with_tools([send])
}
