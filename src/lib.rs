pub mod adapters;
pub mod bot;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod traits;

pub use adapters::{CbrClient, SqliteStore, TelegramClient};
pub use bot::{CommandHandlers, UpdateListener};
pub use config::AppConfig;
pub use domain::{NotifyPeriod, RateSnapshot, Subscription};
pub use error::{RatewatchError, Result};
pub use services::{NotificationDispatcher, Scheduler, TickReport};
pub use traits::{RateSource, Transport};
