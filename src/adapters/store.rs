//! SQLite-backed subscription store.
//!
//! One table keyed by user id with a nullable period column. The pool is
//! owned here; connections are acquired per operation and released on
//! every path, including errors.

use crate::domain::{NotifyPeriod, Subscription};
use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// SQLite storage adapter
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new SQLite store, creating the database file if missing
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        info!("Connected to SQLite at {}", database_url);
        Ok(Self { pool })
    }

    /// Create a store from an existing connection pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Run migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations completed");
        Ok(())
    }

    /// Get the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Register a user on first contact with a NULL period.
    ///
    /// Idempotent: an existing row is left untouched, repeated and
    /// concurrent calls are safe.
    pub async fn ensure_user(&self, user_id: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, notify_period)
            VALUES (?1, NULL)
            ON CONFLICT(user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        debug!("Ensured user {} exists", user_id);
        Ok(())
    }

    /// Overwrite the notification period for a user.
    ///
    /// Upserts: choosing a period before /start still creates the record.
    pub async fn set_period(&self, user_id: i64, period: NotifyPeriod) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, notify_period)
            VALUES (?1, ?2)
            ON CONFLICT(user_id) DO UPDATE SET notify_period = excluded.notify_period
            "#,
        )
        .bind(user_id)
        .bind(period.db_value())
        .execute(&self.pool)
        .await?;

        info!("User {} set notify period to {}", user_id, period);
        Ok(())
    }

    /// Get a single user's period; `None` means the user is unknown.
    pub async fn get_period(&self, user_id: i64) -> Result<Option<NotifyPeriod>> {
        let row = sqlx::query("SELECT notify_period FROM users WHERE user_id = ?1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| parse_period(user_id, r.get("notify_period"))))
    }

    /// All subscriptions that could ever be due.
    ///
    /// Excludes NULL periods by contract; excluding 'off' here is an
    /// optimization, the due policy rejects it anyway.
    pub async fn list_due_candidates(&self) -> Result<Vec<Subscription>> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, notify_period
            FROM users
            WHERE notify_period IS NOT NULL AND notify_period != 'off'
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let candidates = rows
            .into_iter()
            .map(|r| Subscription {
                user_id: r.get("user_id"),
                period: parse_period(r.get("user_id"), r.get("notify_period")),
            })
            .collect();

        Ok(candidates)
    }
}

/// Map a stored period column to the enum.
///
/// An unrecognized string (e.g. from a newer schema) downgrades to `Unset`
/// rather than failing the whole candidate listing.
fn parse_period(user_id: i64, value: Option<String>) -> NotifyPeriod {
    match value {
        None => NotifyPeriod::Unset,
        Some(s) => NotifyPeriod::from_str(&s).unwrap_or_else(|_| {
            warn!("User {} has unrecognized notify_period '{}'", user_id, s);
            NotifyPeriod::Unset
        }),
    }
}
