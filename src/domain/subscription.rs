use chrono::{DateTime, Datelike, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Notification cadence chosen by a user.
///
/// `Unset` (the user never picked anything) and `Off` (notifications
/// explicitly disabled) are distinct states: both suppress delivery, but
/// only `Unset` maps to a NULL column in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyPeriod {
    Unset,
    Daily,
    Weekly,
    Monthly,
    Off,
}

impl NotifyPeriod {
    /// Whether a tick at `now` is a delivery occasion for this period.
    ///
    /// Pure function of `(self, now)`: weekly fires on Mondays, monthly on
    /// the first day of the month. Only the instant of the tick is
    /// evaluated; occurrences missed while the process was down are not
    /// caught up.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self {
            NotifyPeriod::Daily => true,
            NotifyPeriod::Weekly => now.weekday() == Weekday::Mon,
            NotifyPeriod::Monthly => now.day() == 1,
            NotifyPeriod::Off | NotifyPeriod::Unset => false,
        }
    }

    /// Storage representation; `Unset` is stored as SQL NULL.
    pub fn db_value(&self) -> Option<&'static str> {
        match self {
            NotifyPeriod::Unset => None,
            NotifyPeriod::Daily => Some("daily"),
            NotifyPeriod::Weekly => Some("weekly"),
            NotifyPeriod::Monthly => Some("monthly"),
            NotifyPeriod::Off => Some("off"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NotifyPeriod::Unset => "unset",
            NotifyPeriod::Daily => "daily",
            NotifyPeriod::Weekly => "weekly",
            NotifyPeriod::Monthly => "monthly",
            NotifyPeriod::Off => "off",
        }
    }
}

impl FromStr for NotifyPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(NotifyPeriod::Daily),
            "weekly" => Ok(NotifyPeriod::Weekly),
            "monthly" => Ok(NotifyPeriod::Monthly),
            "off" => Ok(NotifyPeriod::Off),
            other => Err(format!("unknown notify period: {other}")),
        }
    }
}

impl std::fmt::Display for NotifyPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One user's subscription record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Telegram user id (doubles as the chat id for direct messages)
    pub user_id: i64,
    pub period: NotifyPeriod,
}
