//! Ingress authentication for the LINE webhook.
//!
//! [`signature::verify`] is the pure check; [`middleware::require_signature`]
//! wraps it as an axum layer that rejects a request before any handler runs.
pub mod middleware;
pub mod signature;

pub use middleware::{SignatureConfig, require_signature};
pub use signature::{LINE_SIGNATURE_HEADER, SignatureError, sign, verify};
