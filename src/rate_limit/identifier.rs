use axum::http::HeaderMap;

const FORWARDED_FOR: &str = "x-forwarded-for";
const REAL_IP: &str = "x-real-ip";
const CF_CONNECTING_IP: &str = "cf-connecting-ip";
const FALLBACK_IP: &str = "127.0.0.1";

/// Derive the throttling key for a request from its origin headers.
///
/// Precedence: first hop of `X-Forwarded-For`, then `X-Real-IP`, then
/// `CF-Connecting-IP`, then the loopback address. Never fails.
pub fn client_identifier(headers: &HeaderMap) -> String {
    let ip = header_value(headers, FORWARDED_FOR)
        .and_then(|chain| chain.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| non_empty(headers, REAL_IP))
        .or_else(|| non_empty(headers, CF_CONNECTING_IP))
        .unwrap_or(FALLBACK_IP);

    format!("ip:{}", ip)
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn non_empty<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    header_value(headers, name)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
