use super::{ProviderError, PushProvider};
use crate::models::OutboundMessage;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// In-memory provider for tests: answers every send with a fixed outcome and
/// records what it was asked to deliver.
pub struct MockPushProvider {
    outcome: Result<String, ProviderError>,
    send_count: AtomicU64,
    sent: Mutex<Vec<OutboundMessage>>,
}

impl MockPushProvider {
    pub fn succeeding(message_id: impl Into<String>) -> Self {
        Self::with_outcome(Ok(message_id.into()))
    }

    pub fn failing(error: ProviderError) -> Self {
        Self::with_outcome(Err(error))
    }

    fn with_outcome(outcome: Result<String, ProviderError>) -> Self {
        Self {
            outcome,
            send_count: AtomicU64::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }

    pub fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl PushProvider for MockPushProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn send(&self, message: &OutboundMessage) -> Result<String, ProviderError> {
        self.send_count.fetch_add(1, Ordering::SeqCst);
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.clone());

        tracing::info!(
            title = %message.notification.title,
            "[MOCK] Push notification would be sent"
        );

        self.outcome.clone()
    }
}
