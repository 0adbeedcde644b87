use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    http::{StatusCode, header::HeaderName},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use crate::signature::{LINE_SIGNATURE_HEADER, verify};

/// Largest webhook body buffered for verification.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct SignatureConfig {
    secret: Arc<[u8]>,
    header: HeaderName,
}

impl SignatureConfig {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: Arc::from(secret.as_ref()),
            header: HeaderName::from_static(LINE_SIGNATURE_HEADER),
        }
    }

    pub fn with_header(mut self, header: HeaderName) -> Self {
        self.header = header;
        self
    }

    pub fn header(&self) -> &HeaderName {
        &self.header
    }
}

impl Debug for SignatureConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureConfig")
            .field("secret", &"<redacted>")
            .field("header", &self.header)
            .finish()
    }
}

/// Rejects requests whose body does not match the signature header with 400.
///
/// The verified body is handed on unchanged, so downstream handlers can still
/// extract it as `Bytes` or `String`.
pub async fn require_signature(
    State(cfg): State<SignatureConfig>,
    req: Request,
    next: Next,
) -> Response {
    let (parts, body) = req.into_parts();
    let body_bytes = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!(error = %err, "failed to buffer webhook body");
            reject("unreadable");
            return (StatusCode::BAD_REQUEST, "invalid body").into_response();
        }
    };

    let provided = parts
        .headers
        .get(&cfg.header)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if provided.is_empty() {
        warn!(header = %cfg.header, "webhook signature header missing");
        reject("missing");
        return (StatusCode::BAD_REQUEST, "missing signature").into_response();
    }
    if !verify(&body_bytes, provided, &cfg.secret) {
        warn!(header = %cfg.header, "webhook signature mismatch");
        reject("mismatch");
        return (StatusCode::BAD_REQUEST, "invalid signature").into_response();
    }

    next.run(Request::from_parts(parts, Body::from(body_bytes)))
        .await
}

fn reject(reason: &'static str) {
    metrics::counter!("webhook_rejected_total", "reason" => reason).increment(1);
}
