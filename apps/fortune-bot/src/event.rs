//! LINE webhook envelope.
//!
//! Only text messages from a source with a user id and a reply token become
//! [`InboundEvent`]s; follows, stickers, postbacks and the rest are dropped.

use axum::body::Bytes;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct WebhookBody {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub source: Option<EventSource>,
    #[serde(default)]
    pub message: Option<EventMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// A verified text message addressed to the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub raw_body: Bytes,
    pub signature_header: String,
    pub message_text: String,
    pub source_recipient_id: String,
    pub reply_token: String,
}

impl WebhookEvent {
    fn into_inbound(self, raw_body: &Bytes, signature_header: &str) -> Option<InboundEvent> {
        if self.kind != "message" {
            return None;
        }
        let message = self.message.filter(|m| m.kind == "text")?;
        Some(InboundEvent {
            raw_body: raw_body.clone(),
            signature_header: signature_header.to_string(),
            message_text: message.text?,
            source_recipient_id: self.source?.user_id?,
            reply_token: self.reply_token.filter(|t| !t.is_empty())?,
        })
    }
}

/// Parses a verified webhook body into the text events it carries, in order.
pub fn inbound_events(
    raw_body: &Bytes,
    signature_header: &str,
) -> Result<Vec<InboundEvent>, serde_json::Error> {
    let body: WebhookBody = serde_json::from_slice(raw_body)?;
    Ok(body
        .events
        .into_iter()
        .filter_map(|event| {
            let kind = event.kind.clone();
            let inbound = event.into_inbound(raw_body, signature_header);
            if inbound.is_none() {
                debug!(kind = %kind, "ignoring webhook event");
            }
            inbound
        })
        .collect())
}
