use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Exchange rates fetched from the rate source at one point in time.
///
/// Transient: every delivery tick re-fetches, nothing is cached across
/// ticks. All due users within one tick share the same snapshot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateSnapshot {
    /// EUR to RUB
    pub eur: f64,
    /// USD to RUB
    pub usd: f64,
    pub fetched_at: DateTime<Utc>,
}

impl RateSnapshot {
    /// Message body for scheduled notifications.
    pub fn notification_text(&self) -> String {
        format!(
            "Курсы валют:\nEUR: {:.2} RUB\nUSD: {:.2} RUB",
            self.eur, self.usd
        )
    }

    /// Message body for ad-hoc /rates replies.
    pub fn reply_text(&self) -> String {
        format!(
            "Текущие курсы:\nEUR: {:.2} RUB\nUSD: {:.2} RUB",
            self.eur, self.usd
        )
    }
}
