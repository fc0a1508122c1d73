//! Error-to-HTTP mapping.

use axum::http::StatusCode;
use axum::Json;

use crate::error::ShopkeepError;

use super::dto::ErrorBody;

/// Map a core error to an HTTP response.
///
/// Caller faults carry their validation detail; upstream failures get a
/// fixed, non-leaking message with a machine-readable code.
pub fn error_response(err: &ShopkeepError) -> (StatusCode, Json<ErrorBody>) {
    let (status, code, message) = match err {
        ShopkeepError::InvalidInput(_) => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
        ShopkeepError::SessionNotFound(_) => (
            StatusCode::NOT_FOUND,
            "session_not_found",
            "Session not found".to_string(),
        ),
        ShopkeepError::Timeout(_) => (
            StatusCode::BAD_GATEWAY,
            "model_timeout",
            "The assistant took too long to respond. Please try again.".to_string(),
        ),
        ShopkeepError::RateLimited { .. } => (
            StatusCode::BAD_GATEWAY,
            "rate_limited",
            "The assistant is receiving too many requests. Please try again shortly.".to_string(),
        ),
        ShopkeepError::Api { .. }
        | ShopkeepError::Authentication(_)
        | ShopkeepError::Provider(_)
        | ShopkeepError::Stream(_) => (
            StatusCode::BAD_GATEWAY,
            "model_unavailable",
            "Failed to generate a response. Please try again.".to_string(),
        ),
        #[cfg(feature = "gemini")]
        ShopkeepError::Network(_) => (
            StatusCode::BAD_GATEWAY,
            "model_unavailable",
            "Failed to generate a response. Please try again.".to_string(),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "Internal server error".to_string(),
        ),
    };

    (
        status,
        Json(ErrorBody {
            error: message,
            code,
        }),
    )
}

/// Short message safe to forward inside an SSE error event.
pub fn public_message(err: &ShopkeepError) -> String {
    let (_, body) = error_response(err);
    body.0.error
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_is_a_400_with_detail() {
        let err = ShopkeepError::InvalidInput("message cannot be empty".into());
        let (status, body) = error_response(&err);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.0.code, "invalid_input");
        assert!(body.0.error.contains("empty"));
    }

    #[test]
    fn provider_failures_are_502_and_non_leaking() {
        let err = ShopkeepError::api(500, "upstream stack trace with secrets");
        let (status, body) = error_response(&err);
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(!body.0.error.contains("secrets"));
    }
}
