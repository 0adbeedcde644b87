//! Outbound delivery seam.
//!
//! The bot talks to its messaging platform only through [`Notifier`]:
//! `push` addresses a user directly, `reply` answers a webhook event through
//! its short-lived reply token.

use std::sync::Arc;

use async_trait::async_trait;
use fortune_core::{MAX_MESSAGES_PER_REQUEST, OutboundMessage};

mod line;
mod memory;

pub use line::{DEFAULT_LINE_API_BASE, LineNotifier};
pub use memory::{Delivery, DeliveryKind, InMemoryNotifier};

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("no messages to send")]
    Empty,
    #[error("{0} messages exceed the per-request limit of {max}", max = MAX_MESSAGES_PER_REQUEST)]
    TooManyMessages(usize),
    #[error("notifier transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("notifier rejected request: status={status} body={body}")]
    Rejected { status: u16, body: String },
    #[error("notifier unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn push(&self, to: &str, messages: &[OutboundMessage]) -> Result<(), NotifyError>;

    async fn reply(&self, reply_token: &str, messages: &[OutboundMessage])
    -> Result<(), NotifyError>;
}

pub type SharedNotifier = Arc<dyn Notifier>;

/// Rejects batches the platform would refuse, before any I/O.
pub fn check_batch(messages: &[OutboundMessage]) -> Result<(), NotifyError> {
    match messages.len() {
        0 => Err(NotifyError::Empty),
        n if n > MAX_MESSAGES_PER_REQUEST => Err(NotifyError::TooManyMessages(n)),
        _ => Ok(()),
    }
}
