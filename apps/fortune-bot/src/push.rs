use fortune_core::{CalendarDate, FortuneResult, fortune_messages, generate};
use fortune_notifier::NotifyError;
use tracing::{error, info, instrument};

use crate::state::AppState;

#[derive(Debug)]
pub enum PushOutcome {
    Sent(CalendarDate),
    NotDue,
    Failed(NotifyError),
}

impl PushOutcome {
    /// Body returned to the poller.
    pub fn status_line(&self) -> &'static str {
        match self {
            PushOutcome::Sent(_) => "sent",
            PushOutcome::NotDue => "not due",
            PushOutcome::Failed(_) => "push failed",
        }
    }
}

/// One poll of the daily push.
///
/// Claims the gate, pushes the default recipient's fortune and marks the day
/// only once the notifier confirmed the delivery. Pollers arriving while a
/// push is in flight wait on the gate and then see the day as done.
#[instrument(name = "push.scheduled", skip_all)]
pub async fn run_scheduled_push(state: &AppState) -> PushOutcome {
    let now = state.clock.now();
    let Some(permit) = state.gate.try_claim(now).await else {
        metrics::counter!("fortune_push_total", "outcome" => "not_due").increment(1);
        return PushOutcome::NotDue;
    };

    let recipient = &state.settings.default_recipient;
    let fortune = generate(recipient, now, &state.settings.timezone);
    let messages = fortune_messages(&fortune, &state.settings.image_url);

    match state.notifier.push(recipient, &messages).await {
        Ok(()) => {
            let date = permit.date();
            permit.mark_sent();
            metrics::counter!("fortune_push_total", "outcome" => "sent").increment(1);
            info!(date = %date, score = fortune.score, "daily fortune pushed");
            PushOutcome::Sent(date)
        }
        Err(err) => {
            drop(permit);
            metrics::counter!("fortune_push_total", "outcome" => "failed").increment(1);
            error!(error = %err, "daily fortune push failed; will retry on next poll");
            PushOutcome::Failed(err)
        }
    }
}

/// Pushes the default recipient's fortune right away. The gate is neither
/// consulted nor updated.
#[instrument(name = "push.manual", skip_all)]
pub async fn send_fortune_now(state: &AppState) -> Result<FortuneResult, NotifyError> {
    let recipient = &state.settings.default_recipient;
    let (fortune, messages) = state.fortune_for(recipient);
    let result = state.notifier.push(recipient, &messages).await;
    let outcome = if result.is_ok() { "sent" } else { "failed" };
    metrics::counter!("fortune_manual_push_total", "outcome" => outcome).increment(1);
    result.map(|()| fortune)
}
