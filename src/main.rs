mod runtime;

use clap::{Parser, Subcommand};
use ratewatch::adapters::{CbrClient, SqliteStore, TelegramClient};
use ratewatch::bot::{CommandHandlers, UpdateListener};
use ratewatch::config::AppConfig;
use ratewatch::error::{RatewatchError, Result};
use ratewatch::services::{NotificationDispatcher, Scheduler};
use ratewatch::traits::RateSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

#[derive(Parser)]
#[command(
    name = "ratewatch",
    version,
    about = "Telegram bot for currency exchange rate notifications"
)]
struct Cli {
    /// Directory with configuration files
    #[arg(long, default_value = "config")]
    config_dir: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot (default)
    Run,
    /// Fetch current rates once and print them
    Rates,
    /// Apply database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_bot(&cli.config_dir).await,
        Commands::Rates => {
            runtime::init_logging_simple();
            show_rates(&cli.config_dir).await
        }
        Commands::Migrate => {
            runtime::init_logging_simple();
            run_migrations(&cli.config_dir).await
        }
    }
}

async fn run_bot(config_dir: &str) -> Result<()> {
    let config = AppConfig::load_from(config_dir)?;
    runtime::init_logging(&config.logging);

    if let Err(errors) = config.validate() {
        for e in &errors {
            error!("Config error: {}", e);
        }
        return Err(RatewatchError::Internal(
            "invalid configuration".to_string(),
        ));
    }

    let store = SqliteStore::new(&config.database.url, config.database.max_connections).await?;
    store.migrate().await?;

    let rates: Arc<dyn RateSource> = Arc::new(CbrClient::new(
        &config.rates.url,
        Duration::from_secs(config.rates.request_timeout_secs),
    )?);
    let telegram = Arc::new(TelegramClient::new(
        &config.telegram.api_url,
        &config.telegram.token,
    )?);

    let dispatcher = Arc::new(NotificationDispatcher::new(
        store.clone(),
        rates.clone(),
        telegram.clone(),
    ));
    let scheduler = Scheduler::new(dispatcher, config.scheduler.clone());
    scheduler.start();

    let handlers = CommandHandlers::new(store, rates);
    let listener = UpdateListener::new(telegram, handlers, config.telegram.poll_timeout_secs);

    info!("ratewatch started");

    tokio::select! {
        _ = listener.run() => {
            error!("Update listener terminated");
        }
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    scheduler.stop();
    Ok(())
}

async fn show_rates(config_dir: &str) -> Result<()> {
    let config = AppConfig::load_from(config_dir)?;
    let rates = CbrClient::new(
        &config.rates.url,
        Duration::from_secs(config.rates.request_timeout_secs),
    )?;

    let snapshot = rates.fetch().await?;
    println!("{}", snapshot.reply_text());
    Ok(())
}

async fn run_migrations(config_dir: &str) -> Result<()> {
    let config = AppConfig::load_from(config_dir)?;
    let store = SqliteStore::new(&config.database.url, config.database.max_connections).await?;
    store.migrate().await?;
    println!("Migrations applied to {}", config.database.url);
    Ok(())
}
