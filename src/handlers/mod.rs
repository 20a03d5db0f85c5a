mod admin_posts;
mod auth;
mod health;
mod metrics;
mod pages;
mod public;

pub use admin_posts::{
    create_post_handler, delete_post_handler, get_post_handler, list_posts_handler,
    update_post_handler,
};
pub use auth::{login_handler, logout_handler, refresh_handler, session_handler};
pub use health::health_handler;
pub use metrics::metrics_handler;
pub use pages::{dashboard_handler, error_page_handler, login_page_handler};
pub use public::{categories_handler, category_handler, home_handler, post_handler};

use serde::de::DeserializeOwned;

use crate::error::AppError;

// Bodies are parsed by hand so malformed JSON is a plain 400
pub(crate) fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, AppError> {
    serde_json::from_slice(body).map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e)))
}
