use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware,
    routing::{get, post},
};
use fortune_security::{LINE_SIGNATURE_HEADER, SignatureConfig, require_signature};
use tracing::{Instrument, debug, error, info_span, warn};

use crate::dispatch::dispatch_event;
use crate::error::ApiError;
use crate::event::inbound_events;
use crate::push::{run_scheduled_push, send_fortune_now};
use crate::reqid::with_request_id;
use crate::state::AppState;

/// Builds the bot's router.
///
/// Only `/callback` is signature checked; the poller and manual trigger
/// endpoints are expected to sit behind the platform's own access control.
pub fn build_router(state: AppState, signature: SignatureConfig) -> Router {
    Router::new()
        .route("/", get(check))
        .route("/check", get(check))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics_text))
        .route("/send_fortune", post(send_fortune))
        .route(
            "/callback",
            post(callback).layer(middleware::from_fn_with_state(signature, require_signature)),
        )
        .layer(middleware::from_fn(with_request_id))
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn metrics_text(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .ok_or(StatusCode::NOT_FOUND)
}

/// Poll target for the external scheduler. Always 200; the body says what happened.
async fn check(State(state): State<AppState>) -> (StatusCode, &'static str) {
    let outcome = run_scheduled_push(&state).await;
    (StatusCode::OK, outcome.status_line())
}

async fn send_fortune(State(state): State<AppState>) -> Result<&'static str, ApiError> {
    match send_fortune_now(&state).await {
        Ok(fortune) => {
            debug!(date = %fortune.date, score = fortune.score, "manual fortune sent");
            Ok("Fortune sent!")
        }
        Err(err) => {
            error!(error = %err, "manual fortune push failed");
            Err(err.into())
        }
    }
}

/// LINE webhook. Reaching here means the signature matched. Per-event
/// failures are logged and still answered with 200 so LINE does not redeliver.
async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    let signature = headers
        .get(LINE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let events = match inbound_events(&body, signature) {
        Ok(events) => events,
        Err(err) => {
            warn!(error = %err, "webhook body is not a LINE envelope");
            metrics::counter!("webhook_rejected_total", "reason" => "malformed").increment(1);
            return Err(err.into());
        }
    };

    for event in &events {
        let span = info_span!("webhook.event", reply_token = %event.reply_token);
        if let Err(err) = dispatch_event(&state, event).instrument(span).await {
            error!(error = %err, user = %event.source_recipient_id, "reply failed");
        }
    }

    Ok("OK")
}
