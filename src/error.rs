use thiserror::Error;

/// Main error type for the rate notification bot
#[derive(Error, Debug)]
pub enum RatewatchError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Rate source errors: network failures, non-2xx statuses and malformed
    // payloads all collapse into this one signal
    #[error("Exchange rates unavailable: {0}")]
    RatesUnavailable(String),

    // Telegram Bot API errors
    #[error("Telegram API error: {0}")]
    Telegram(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for RatewatchError
pub type Result<T> = std::result::Result<T, RatewatchError>;
