// Per-client request throttling: identifier -> sliding window counter -> decision

mod identifier;
mod limiter;
mod response;
mod store;

pub use identifier::client_identifier;
pub use limiter::{RateLimitDecision, RateLimitPolicy, RateLimiter};
pub use response::{rate_limit_headers, throttled_response};
pub use store::CounterStore;
