use std::sync::Arc;

use fortune_core::{
    Clock, DEFAULT_IMAGE_URL, FortuneResult, OutboundMessage, SystemClock, Timezone,
    fortune_messages, generate,
};
use fortune_gate::{DEFAULT_SEND_HOUR, DeliveryGate};
use fortune_notifier::{LineNotifier, NotifyError, SharedNotifier};
use fortune_security::SignatureConfig;
use fortune_telemetry::PrometheusHandle;

use crate::config::BotConfig;

/// What a fortune looks like and who gets the scheduled one.
#[derive(Debug, Clone)]
pub struct FortuneSettings {
    pub default_recipient: String,
    pub image_url: String,
    pub timezone: Timezone,
}

impl FortuneSettings {
    pub fn new(default_recipient: impl Into<String>) -> Self {
        Self {
            default_recipient: default_recipient.into(),
            image_url: DEFAULT_IMAGE_URL.to_string(),
            timezone: Timezone::default(),
        }
    }
}

/// Shared handler state; cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub notifier: SharedNotifier,
    pub gate: DeliveryGate,
    pub clock: Arc<dyn Clock>,
    pub settings: Arc<FortuneSettings>,
    /// Renders `/metrics`; the route answers 404 while unset.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        notifier: SharedNotifier,
        clock: Arc<dyn Clock>,
        settings: FortuneSettings,
        send_hour: u32,
    ) -> Self {
        Self {
            notifier,
            gate: DeliveryGate::new(settings.timezone, send_hour),
            clock,
            settings: Arc::new(settings),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// State with the default send hour, used by tests and previews.
    pub fn with_defaults(
        notifier: SharedNotifier,
        clock: Arc<dyn Clock>,
        settings: FortuneSettings,
    ) -> Self {
        Self::new(notifier, clock, settings, DEFAULT_SEND_HOUR)
    }

    /// Wires the LINE notifier and the system clock from configuration.
    pub fn from_config(cfg: &BotConfig) -> Result<(Self, SignatureConfig), NotifyError> {
        let notifier = LineNotifier::with_timeout(
            cfg.line_api_base.clone(),
            cfg.channel_access_token.clone(),
            cfg.notifier_timeout,
        )?;
        let settings = FortuneSettings {
            default_recipient: cfg.default_recipient.clone(),
            image_url: cfg.image_url.clone(),
            timezone: cfg.timezone,
        };
        let state = Self::new(Arc::new(notifier), Arc::new(SystemClock), settings, cfg.send_hour);
        Ok((state, SignatureConfig::new(cfg.channel_secret.as_bytes())))
    }

    /// Today's fortune for `recipient_id` and the messages that carry it.
    pub fn fortune_for(&self, recipient_id: &str) -> (FortuneResult, Vec<OutboundMessage>) {
        let fortune = generate(recipient_id, self.clock.now(), &self.settings.timezone);
        let messages = fortune_messages(&fortune, &self.settings.image_url);
        (fortune, messages)
    }
}
