use std::fmt::{Debug, Formatter};
use std::time::Duration;

use async_trait::async_trait;
use fortune_core::OutboundMessage;
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::{Notifier, NotifyError, check_batch};

pub const DEFAULT_LINE_API_BASE: &str = "https://api.line.me";

const PUSH_PATH: &str = "/v2/bot/message/push";
const REPLY_PATH: &str = "/v2/bot/message/reply";

/// LINE Messaging API client.
///
/// A `mock://` base skips the network entirely, which the local tooling uses
/// to exercise the full flow without credentials.
pub struct LineNotifier {
    http: reqwest::Client,
    api_base: String,
    access_token: String,
}

impl LineNotifier {
    pub fn new(
        http: reqwest::Client,
        api_base: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        let base = api_base.into();
        Self {
            http,
            api_base: base.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }

    /// Builds a client whose every request is bounded by `timeout`.
    pub fn with_timeout(
        api_base: impl Into<String>,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::new(http, api_base, access_token))
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    async fn post(&self, path: &str, payload: Value) -> Result<(), NotifyError> {
        if self.api_base.starts_with("mock://") {
            debug!(path, payload = %payload, "mock line request");
            return Ok(());
        }

        let response = self
            .http
            .post(self.endpoint(path))
            .bearer_auth(&self.access_token)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

impl Debug for LineNotifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineNotifier")
            .field("api_base", &self.api_base)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl Notifier for LineNotifier {
    #[instrument(name = "line.push", skip(self, messages), fields(count = messages.len()))]
    async fn push(&self, to: &str, messages: &[OutboundMessage]) -> Result<(), NotifyError> {
        check_batch(messages)?;
        self.post(PUSH_PATH, push_payload(to, messages)).await
    }

    #[instrument(name = "line.reply", skip_all, fields(count = messages.len()))]
    async fn reply(
        &self,
        reply_token: &str,
        messages: &[OutboundMessage],
    ) -> Result<(), NotifyError> {
        check_batch(messages)?;
        self.post(REPLY_PATH, reply_payload(reply_token, messages))
            .await
    }
}

fn push_payload(to: &str, messages: &[OutboundMessage]) -> Value {
    json!({ "to": to, "messages": messages })
}

fn reply_payload(reply_token: &str, messages: &[OutboundMessage]) -> Value {
    json!({ "replyToken": reply_token, "messages": messages })
}
