use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub rates: RatesConfig,
    pub database: DatabaseConfig,
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot API token from @BotFather
    #[serde(default)]
    pub token: String,
    /// Bot API base URL (override for local API servers)
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Long-poll timeout for getUpdates in seconds
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_poll_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct RatesConfig {
    /// Rate source endpoint (CBR daily JSON)
    #[serde(default = "default_rates_url")]
    pub url: String,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_rates_url() -> String {
    crate::adapters::cbr::CBR_DAILY_URL.to_string()
}

fn default_request_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    #[serde(default = "default_database_url")]
    pub url: String,
    /// Maximum connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_url() -> String {
    "sqlite://users.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Interval between notification ticks in seconds
    #[serde(default = "default_tick_interval")]
    pub tick_interval_secs: u64,
    /// Delay before the first tick, giving the transport time to start
    #[serde(default = "default_initial_delay")]
    pub initial_delay_secs: u64,
}

fn default_tick_interval() -> u64 {
    3600
}

fn default_initial_delay() -> u64 {
    10
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval(),
            initial_delay_secs: default_initial_delay(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("telegram.token", "")?
            .set_default("telegram.api_url", default_api_url())?
            .set_default("telegram.poll_timeout_secs", default_poll_timeout())?
            .set_default("rates.url", default_rates_url())?
            .set_default("rates.request_timeout_secs", default_request_timeout())?
            .set_default("database.url", default_database_url())?
            .set_default("database.max_connections", default_max_connections())?
            .set_default("scheduler.tick_interval_secs", default_tick_interval())?
            .set_default("scheduler.initial_delay_secs", default_initial_delay())?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("RATEWATCH_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (RATEWATCH_TELEGRAM__TOKEN, etc.)
            .add_source(
                Environment::with_prefix("RATEWATCH")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.telegram.token.is_empty() {
            errors.push(
                "telegram.token must be set (RATEWATCH_TELEGRAM__TOKEN)".to_string(),
            );
        }

        if self.rates.url.is_empty() {
            errors.push("rates.url must not be empty".to_string());
        }

        if self.database.url.is_empty() {
            errors.push("database.url must not be empty".to_string());
        }

        if self.scheduler.tick_interval_secs == 0 {
            errors.push("scheduler.tick_interval_secs must be positive".to_string());
        }

        if self.telegram.poll_timeout_secs == 0 {
            errors.push("telegram.poll_timeout_secs must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
