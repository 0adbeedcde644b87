use serde::{Deserialize, Serialize};

/// Upper bound on messages in a single push or reply request.
pub const MAX_MESSAGES_PER_REQUEST: usize = 5;

/// Outbound message in the LINE Messaging API wire shape.
///
/// ```
/// use fortune_core::OutboundMessage;
///
/// let msg = OutboundMessage::text("hello");
/// assert_eq!(
///     serde_json::to_value(&msg).unwrap(),
///     serde_json::json!({ "type": "text", "text": "hello" })
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    Image {
        original_content_url: String,
        preview_image_url: String,
    },
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        OutboundMessage::Text { text: text.into() }
    }

    /// Image message whose preview is the full image.
    pub fn image(url: impl Into<String>) -> Self {
        let url = url.into();
        OutboundMessage::Image {
            original_content_url: url.clone(),
            preview_image_url: url,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            OutboundMessage::Text { text } => Some(text),
            OutboundMessage::Image { .. } => None,
        }
    }
}
