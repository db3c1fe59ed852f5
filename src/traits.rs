//! Seams between the delivery engine and its external collaborators.

use crate::domain::RateSnapshot;
use crate::error::Result;

/// Source of fresh exchange rates.
///
/// One implementation talks to the CBR daily JSON endpoint; tests swap in
/// an in-process fake. A fetch either yields a complete snapshot or fails
/// as a whole.
#[async_trait::async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch(&self) -> Result<RateSnapshot>;
}

/// Outbound message channel to a single user.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Deliver `text` to the user's chat. Bounded wait is inherited from
    /// the underlying HTTP client's timeout.
    async fn send_message(&self, user_id: i64, text: &str) -> Result<()>;
}
