use std::time::{Duration, Instant};

use chrono::Utc;

use crate::domain::{MessageSender, SendError, SendReceipt, DEFAULT_DESTINATION, STATUS_SENT};

/// Fixed delay standing in for the round trip to the WhatsApp API.
pub const SIMULATED_LATENCY: Duration = Duration::from_millis(500);

/// Mock WhatsApp client: waits out the simulated latency, then fabricates a
/// receipt. No network I/O.
#[derive(Clone, Debug, Default)]
pub struct WhatsAppMock;

impl WhatsAppMock {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl MessageSender for WhatsAppMock {
    async fn send(&self, message: &str) -> Result<SendReceipt, SendError> {
        tracing::debug!(chars = message.chars().count(), "whatsapp.send request");
        let start = Instant::now();

        tokio::time::sleep(SIMULATED_LATENCY).await;

        let now = Utc::now();
        let receipt = SendReceipt {
            // Millisecond clock: distinct across sequential sends, not globally unique.
            message_id: format!("msg_{}", now.timestamp_millis()),
            status: STATUS_SENT.to_string(),
            timestamp: now,
            destination: DEFAULT_DESTINATION.to_string(),
        };

        let elapsed_ms = start.elapsed().as_millis() as f64;
        crate::infra::logging::log_metric("send_whatsapp_message", "send_latency_ms", elapsed_ms);
        tracing::debug!(message_id = %receipt.message_id, "whatsapp.send delivered");
        Ok(receipt)
    }
}
