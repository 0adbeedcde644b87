//! LINE daily fortune bot.
//!
//! Answers keyword messages on the LINE webhook with the sender's fortune of
//! the day and pushes one fortune per day to a configured user when polled
//! inside the send hour.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod http;
pub mod push;
pub mod reqid;
pub mod state;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;

pub use config::{BotConfig, ConfigError};
pub use dispatch::{FORTUNE_KEYWORDS, HELP_TEXT, Intent, classify, dispatch_event};
pub use error::ApiError;
pub use event::{InboundEvent, inbound_events};
pub use http::build_router;
pub use push::{PushOutcome, run_scheduled_push, send_fortune_now};
pub use state::{AppState, FortuneSettings};

/// Serves the bot until ctrl-c.
pub async fn serve(config: BotConfig) -> Result<()> {
    let (state, signature) =
        AppState::from_config(&config).context("failed to build LINE notifier")?;
    let state = state.with_metrics(fortune_telemetry::install_metrics()?);
    let router = build_router(state, signature);

    let listener = TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    info!(
        addr = %config.addr,
        timezone = %config.timezone,
        send_hour = config.send_hour,
        "fortune-bot listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}
