//! Shared HTTP client and SSE parsing for provider implementations.

use std::sync::OnceLock;

use crate::error::ShopkeepError;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .pool_max_idle_per_host(10)
            .build()
            .expect("Failed to build HTTP client")
    })
}

/// Parse an SSE "data:" line, returning None for "[DONE]".
pub fn parse_sse_data(line: &str) -> Option<&str> {
    let data = line.strip_prefix("data: ")?;
    if data == "[DONE]" {
        return None;
    }
    Some(data)
}

/// Map an HTTP status code to a typed error.
pub fn status_to_error(status: u16, body: &str) -> ShopkeepError {
    match status {
        401 | 403 => ShopkeepError::Authentication(body.to_string()),
        429 => ShopkeepError::RateLimited {
            retry_after_ms: extract_retry_after(body),
        },
        _ => ShopkeepError::api(status, body),
    }
}

fn extract_retry_after(body: &str) -> Option<u64> {
    // Try to parse retry-after from JSON error body
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("retry_after"))
                .and_then(|r| r.as_f64())
                .map(|s| (s * 1000.0) as u64)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sse_data_strips_prefix_and_done() {
        assert_eq!(parse_sse_data("data: {\"a\":1}"), Some("{\"a\":1}"));
        assert_eq!(parse_sse_data("data: [DONE]"), None);
        assert_eq!(parse_sse_data(": keepalive"), None);
    }

    #[test]
    fn status_to_error_classifies_auth_and_rate_limit() {
        assert!(matches!(
            status_to_error(401, "bad key"),
            ShopkeepError::Authentication(_)
        ));
        assert!(matches!(
            status_to_error(429, "{}"),
            ShopkeepError::RateLimited { .. }
        ));
        assert!(matches!(
            status_to_error(500, "boom"),
            ShopkeepError::Api { status: 500, .. }
        ));
    }
}
