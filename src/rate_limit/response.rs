use axum::{
    Json,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::metrics::THROTTLED_TOTAL;
use crate::models::ThrottledResponse;
use crate::rate_limit::{RateLimitDecision, RateLimitPolicy};

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

// Limit / remaining / reset (epoch ms) triad sent with every limited response
pub fn rate_limit_headers(policy: &RateLimitPolicy, decision: &RateLimitDecision) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(policy.max_requests));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(decision.reset_time));
    headers
}

/// 429 with retry guidance in both the body and `Retry-After`.
pub fn throttled_response(
    policy: &RateLimitPolicy,
    decision: &RateLimitDecision,
    now_ms: u64,
    message: &str,
) -> Response {
    THROTTLED_TOTAL.inc();

    let mut headers = rate_limit_headers(policy, decision);
    headers.insert(header::RETRY_AFTER, HeaderValue::from(decision.retry_after_secs(now_ms)));

    let body = ThrottledResponse {
        error: message.to_string(),
        retry_after: iso_timestamp(decision.reset_time),
    };

    (StatusCode::TOO_MANY_REQUESTS, headers, Json(body)).into_response()
}

fn iso_timestamp(epoch_ms: u64) -> String {
    let ms = i64::try_from(epoch_ms).unwrap_or(i64::MAX);
    DateTime::<Utc>::from_timestamp_millis(ms)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iso_timestamp_has_millis_and_zulu() {
        assert_eq!(iso_timestamp(1_700_000_000_123), "2023-11-14T22:13:20.123Z");
    }

    #[test]
    fn throttled_response_carries_retry_headers() {
        let policy = RateLimitPolicy::login();
        let decision = RateLimitDecision {
            allowed: false,
            remaining: 0,
            reset_time: 1_700_000_900_000,
            total_requests: 5,
        };
        let response = throttled_response(&policy, &decision, 1_700_000_000_500, "slow down");
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

        let h = response.headers();
        assert_eq!(h["x-ratelimit-limit"], "5");
        assert_eq!(h["x-ratelimit-remaining"], "0");
        assert_eq!(h["x-ratelimit-reset"], "1700000900000");
        assert_eq!(h[header::RETRY_AFTER], "900");
    }
}
