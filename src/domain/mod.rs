use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

/// Status token reported for every delivered message.
pub const STATUS_SENT: &str = "sent";

/// Destination label of the (single) WhatsApp group the mock delivers to.
pub const DEFAULT_DESTINATION: &str = "Grupo Principal";

#[derive(Debug, Error)]
pub enum SendError {
    #[error("{0}")]
    Message(String),
}

/// What the messaging backend hands back after a successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    pub message_id: String,
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub destination: String,
}

impl SendReceipt {
    /// ISO-8601 UTC rendering with millisecond precision, e.g. `2024-05-01T12:00:00.000Z`.
    pub fn timestamp_iso(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Capability to deliver one message. Swappable so tests can run without latency.
#[async_trait::async_trait]
pub trait MessageSender: Send + Sync + 'static {
    async fn send(&self, message: &str) -> Result<SendReceipt, SendError>;
}

/// Result of invoking a tool. Tool-level failures live here; protocol-level
/// failures (unknown action) never reach this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationResult {
    Sent(SendReceipt),
    Failed { error_message: String },
}

impl InvocationResult {
    pub fn is_error(&self) -> bool {
        matches!(self, InvocationResult::Failed { .. })
    }

    /// Human-readable text block returned to the caller as the sole content item.
    pub fn render(&self) -> String {
        match self {
            InvocationResult::Sent(receipt) => format!(
                "✅ Mensagem enviada com sucesso!\n\nDetalhes:\n- ID: {}\n- Para: {}\n- Status: {}\n- Enviado em: {}",
                receipt.message_id,
                receipt.destination,
                receipt.status,
                receipt.timestamp_iso()
            ),
            InvocationResult::Failed { error_message } => {
                format!("❌ Erro ao enviar mensagem: {error_message}")
            }
        }
    }
}

impl From<Result<SendReceipt, SendError>> for InvocationResult {
    fn from(res: Result<SendReceipt, SendError>) -> Self {
        match res {
            Ok(receipt) => InvocationResult::Sent(receipt),
            Err(e) => InvocationResult::Failed {
                error_message: e.to_string(),
            },
        }
    }
}
