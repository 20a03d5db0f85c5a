use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, register_counter, register_gauge};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("blog_requests_total", "Total number of requests").unwrap();
    pub static ref LOGIN_ATTEMPTS: Counter =
        register_counter!("blog_login_attempts_total", "Login attempts that reached credential checking").unwrap();
    pub static ref LOGIN_FAILURES: Counter =
        register_counter!("blog_login_failures_total", "Login attempts with invalid credentials").unwrap();
    pub static ref THROTTLED_TOTAL: Counter =
        register_counter!("blog_throttled_total", "Requests refused by the rate limiter").unwrap();
    pub static ref GATE_REJECTIONS: Counter =
        register_counter!("blog_gate_rejections_total", "Admin requests redirected or rejected").unwrap();
    pub static ref RATE_LIMIT_ENTRIES: Gauge =
        register_gauge!("blog_rate_limit_entries", "Current number of tracked rate limit keys").unwrap();
}
