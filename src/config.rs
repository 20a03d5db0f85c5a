use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "quill-blog")]
#[command(about = "File-backed blog with an authenticated admin API")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    // Directory holding one <slug>.mdx file per post
    #[arg(long, env = "CONTENT_DIR", default_value = "content/posts")]
    pub content_dir: PathBuf,

    // Emails allowed admin access (comma-separated)
    // Example: "editor@example.com,ops@example.com"
    #[arg(long, env = "ADMIN_EMAILS", default_value = "")]
    pub admin_emails: String,

    // Signing secret for session tokens, at least 32 bytes
    #[arg(long, env = "SESSION_SECRET", hide_env_values = true)]
    pub session_secret: Option<String>,

    // Argon2 PHC hash of the admin password (see `hash-password`)
    #[arg(long, env = "ADMIN_PASSWORD_HASH", hide_env_values = true)]
    pub admin_password_hash: Option<String>,

    // production turns on Secure cookies
    #[arg(long, env = "APP_ENV", value_enum, default_value_t = Environment::Development)]
    pub environment: Environment,

    // Session lifetime in hours
    #[arg(long, env = "SESSION_HOURS", default_value_t = 24, value_parser = clap::value_parser!(i64).range(1..=8760))]
    pub session_hours: i64,

    // Login rate limit window in seconds
    #[arg(long, env = "LOGIN_WINDOW_SECS", default_value_t = 900)]
    pub login_window: u64,

    // Login attempts allowed per window
    #[arg(long, env = "LOGIN_MAX_ATTEMPTS", default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
    pub login_max_attempts: u32,

    // Admin API rate limit window in seconds
    #[arg(long, env = "API_WINDOW_SECS", default_value_t = 60)]
    pub api_window: u64,

    // Admin API requests allowed per window
    #[arg(long, env = "API_MAX_REQUESTS", default_value_t = 60, value_parser = clap::value_parser!(u32).range(1..))]
    pub api_max_requests: u32,

    // Pause before answering a wrong password
    #[arg(long, env = "LOGIN_FAILURE_DELAY_MS", default_value_t = 2000)]
    pub login_failure_delay_ms: u64,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the ADMIN_PASSWORD_HASH line for a password
    HashPassword { password: String },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Args {
    pub fn secure_cookies(&self) -> bool {
        self.environment == Environment::Production
    }
}
