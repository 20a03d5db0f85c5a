use std::sync::Arc;
use std::time::Duration;

use crate::auth::{SessionManager, check_password_hash};
use crate::config::Args;
use crate::error::AppError;
use crate::posts::PostStore;
use crate::rate_limit::{CounterStore, RateLimitPolicy, RateLimiter};
// app's shared state

pub struct AppState {
    pub posts: PostStore,
    pub sessions: SessionManager,
    pub rate_limiter: RateLimiter,           // one store for every policy, keys are namespaced
    pub login_policy: RateLimitPolicy,
    pub api_policy: RateLimitPolicy,
    pub admin_password_hash: String,
    pub login_failure_delay: Duration,       // pause before a 401 on wrong password
}

impl AppState {
    pub fn from_args(args: &Args) -> Result<Self, AppError> {
        let secret = args
            .session_secret
            .as_deref()
            .ok_or_else(|| AppError::Config("SESSION_SECRET is not set".to_string()))?;
        let admin_password_hash = args
            .admin_password_hash
            .clone()
            .ok_or_else(|| AppError::Config("ADMIN_PASSWORD_HASH is not set".to_string()))?;
        check_password_hash(&admin_password_hash)?;

        let sessions = SessionManager::new(
            secret,
            &args.admin_emails,
            chrono::Duration::hours(args.session_hours),
            args.secure_cookies(),
        )?;

        Ok(Self {
            posts: PostStore::new(args.content_dir.clone()),
            sessions,
            rate_limiter: RateLimiter::new(Arc::new(CounterStore::new())),
            login_policy: RateLimitPolicy::new(args.login_window.saturating_mul(1000), args.login_max_attempts)
                .skip_successful(),
            api_policy: RateLimitPolicy::new(args.api_window.saturating_mul(1000), args.api_max_requests),
            admin_password_hash,
            login_failure_delay: Duration::from_millis(args.login_failure_delay_ms),
        })
    }
}
