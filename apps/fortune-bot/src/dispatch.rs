use fortune_core::OutboundMessage;
use fortune_notifier::NotifyError;
use tracing::{debug, instrument};

use crate::event::InboundEvent;
use crate::state::AppState;

/// Any of these anywhere in a message asks for a fortune.
pub const FORTUNE_KEYWORDS: [&str; 2] = ["占い", "運勢"];

pub const HELP_TEXT: &str = "「占い」って送ってくれたら今日の運勢教えるで〜!✨";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Fortune,
    Help,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Fortune => "fortune",
            Intent::Help => "help",
        }
    }
}

pub fn classify(text: &str) -> Intent {
    if FORTUNE_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        Intent::Fortune
    } else {
        Intent::Help
    }
}

/// Replies to one inbound message: the sender's fortune for a keyword, the
/// usage hint otherwise.
#[instrument(
    name = "dispatch.event",
    skip_all,
    fields(user = %event.source_recipient_id, intent = tracing::field::Empty)
)]
pub async fn dispatch_event(state: &AppState, event: &InboundEvent) -> Result<Intent, NotifyError> {
    let intent = classify(&event.message_text);
    tracing::Span::current().record("intent", intent.as_str());

    let messages = match intent {
        Intent::Fortune => {
            let (fortune, messages) = state.fortune_for(&event.source_recipient_id);
            debug!(score = fortune.score, level = fortune.level.label(), "fortune drawn");
            messages
        }
        Intent::Help => vec![OutboundMessage::text(HELP_TEXT)],
    };

    let result = state.notifier.reply(&event.reply_token, &messages).await;
    let outcome = if result.is_ok() { "ok" } else { "failed" };
    metrics::counter!("fortune_reply_total", "kind" => intent.as_str(), "outcome" => outcome)
        .increment(1);
    result.map(|()| intent)
}
