use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fortune_notifier::NotifyError;

/// Failures surfaced by the HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("delivery failed: {0}")]
    Delivery(#[from] NotifyError),
    #[error("webhook body is not a LINE envelope: {0}")]
    MalformedEnvelope(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Delivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MalformedEnvelope(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            ApiError::Delivery(_) => "Error",
            ApiError::MalformedEnvelope(_) => "invalid payload",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.message()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        let delivery = ApiError::from(NotifyError::Empty);
        assert_eq!(delivery.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(delivery.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let malformed = ApiError::from(parse);
        assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
        assert!(malformed.to_string().starts_with("webhook body is not a LINE envelope"));
    }
}
