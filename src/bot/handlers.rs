//! Command surface exposed to the transport layer.
//!
//! Plain entry points the update loop calls into: user registration,
//! ad-hoc rate queries and period changes. Each returns the reply text
//! for the user; storage errors propagate so the caller can decide what
//! to show.

use crate::adapters::SqliteStore;
use crate::domain::NotifyPeriod;
use crate::error::Result;
use crate::traits::RateSource;
use std::sync::Arc;
use tracing::warn;

pub const WELCOME_TEXT: &str = "Привет! Я бот для отслеживания курсов валют.\n\
Команды:\n\
/rates — текущие курсы EUR и USD\n\
/notify — настроить уведомления";

pub const CHOOSE_PERIOD_TEXT: &str = "Выберите периодичность уведомлений:";

pub const RATES_UNAVAILABLE_TEXT: &str =
    "Не удалось получить курсы валют. Попробуйте позже.";

pub const SETTINGS_FAILED_TEXT: &str =
    "Не удалось сохранить настройки. Попробуйте позже.";

/// Confirmation wording for each selectable cadence
pub fn period_label(period: NotifyPeriod) -> &'static str {
    match period {
        NotifyPeriod::Daily => "раз в день",
        NotifyPeriod::Weekly => "раз в неделю",
        NotifyPeriod::Monthly => "раз в месяц",
        NotifyPeriod::Off | NotifyPeriod::Unset => "отключены",
    }
}

/// Handlers behind the bot commands
pub struct CommandHandlers {
    store: SqliteStore,
    rates: Arc<dyn RateSource>,
}

impl CommandHandlers {
    pub fn new(store: SqliteStore, rates: Arc<dyn RateSource>) -> Self {
        Self { store, rates }
    }

    /// /start: register the user (idempotently) and greet
    pub async fn on_user_seen(&self, user_id: i64) -> Result<String> {
        self.store.ensure_user(user_id).await?;
        Ok(WELCOME_TEXT.to_string())
    }

    /// /rates: one ad-hoc fetch, independent of the schedule.
    ///
    /// A failed fetch becomes a user-visible message, never an error: the
    /// user explicitly asked, so the user gets the answer either way.
    pub async fn on_rates_requested(&self) -> String {
        match self.rates.fetch().await {
            Ok(snapshot) => snapshot.reply_text(),
            Err(e) => {
                warn!("Ad-hoc rates request failed: {}", e);
                RATES_UNAVAILABLE_TEXT.to_string()
            }
        }
    }

    /// Period picked from the inline keyboard
    pub async fn on_period_chosen(&self, user_id: i64, period: NotifyPeriod) -> Result<String> {
        self.store.set_period(user_id, period).await?;
        Ok(format!("Уведомления установлены: {}", period_label(period)))
    }
}
