use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use fortune_core::OutboundMessage;
use tokio::sync::Mutex;

use crate::{Notifier, NotifyError, check_batch};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryKind {
    Push { to: String },
    Reply { reply_token: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub kind: DeliveryKind,
    pub messages: Vec<OutboundMessage>,
}

/// Records deliveries instead of sending them.
///
/// `set_failing(true)` makes every call fail with
/// [`NotifyError::Unavailable`]; attempts are counted either way.
#[derive(Clone, Default)]
pub struct InMemoryNotifier {
    delivered: Arc<Mutex<Vec<Delivery>>>,
    attempts: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
    latency: Option<Duration>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every call, widening race windows in concurrency tests.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub async fn deliveries(&self) -> Vec<Delivery> {
        self.delivered.lock().await.clone()
    }

    pub async fn take_deliveries(&self) -> Vec<Delivery> {
        let mut guard = self.delivered.lock().await;
        std::mem::take(&mut *guard)
    }

    async fn record(
        &self,
        kind: DeliveryKind,
        messages: &[OutboundMessage],
    ) -> Result<(), NotifyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        check_batch(messages)?;
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotifyError::Unavailable("in-memory notifier failing".into()));
        }
        self.delivered.lock().await.push(Delivery {
            kind,
            messages: messages.to_vec(),
        });
        Ok(())
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn push(&self, to: &str, messages: &[OutboundMessage]) -> Result<(), NotifyError> {
        self.record(DeliveryKind::Push { to: to.to_string() }, messages)
            .await
    }

    async fn reply(
        &self,
        reply_token: &str,
        messages: &[OutboundMessage],
    ) -> Result<(), NotifyError> {
        self.record(
            DeliveryKind::Reply {
                reply_token: reply_token.to_string(),
            },
            messages,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_and_fails_on_demand() {
        let notifier = InMemoryNotifier::new();
        notifier
            .push("U1", &[OutboundMessage::text("a")])
            .await
            .unwrap();
        notifier.set_failing(true);
        let err = notifier
            .reply("rt", &[OutboundMessage::text("b")])
            .await
            .unwrap_err();
        assert!(matches!(err, NotifyError::Unavailable(_)));

        assert_eq!(notifier.attempts(), 2);
        let delivered = notifier.take_deliveries().await;
        assert_eq!(delivered.len(), 1);
        assert_eq!(
            delivered[0].kind,
            DeliveryKind::Push { to: "U1".into() }
        );
        assert!(notifier.deliveries().await.is_empty());
    }
}
