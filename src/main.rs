mod app;
mod auth;
mod clock;
mod config;
mod error;
mod handlers;
mod metrics;
mod models;
mod posts;
mod rate_limit;
mod state;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::config::{Args, Command};
use crate::state::AppState;

// this is main async function with tokio
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Some(Command::HashPassword { password }) = &args.command {
        let hash = auth::hash_password(password).context("failed to hash password")?;
        println!("ADMIN_PASSWORD_HASH={}", hash);
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("quill_blog=info,tower_http=info")),
        )
        .init();

    let state = Arc::new(AppState::from_args(&args).context("invalid configuration")?);
    let app = app::build_router(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!(port = args.port, "blog running on http://localhost:{}", args.port);
    tracing::info!(content_dir = %args.content_dir.display(), "serving posts");
    tracing::info!(
        login_max_attempts = args.login_max_attempts,
        login_window_secs = args.login_window,
        api_max_requests = args.api_max_requests,
        api_window_secs = args.api_window,
        secure_cookies = args.secure_cookies(),
        "rate limits configured"
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
