//! Central Bank of Russia daily rates client.
//!
//! Fetches EUR and USD quotes from the `daily_json.js` endpoint. Every
//! failure mode (network, non-2xx status, malformed payload, non-positive
//! values) collapses into `RatesUnavailable`.

use crate::domain::RateSnapshot;
use crate::error::{RatewatchError, Result};
use crate::traits::RateSource;
use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const CBR_DAILY_URL: &str = "https://www.cbr-xml-daily.ru/daily_json.js";

#[derive(Debug, Deserialize)]
struct DailyQuotes {
    #[serde(rename = "Valute")]
    valute: ValuteTable,
}

#[derive(Debug, Deserialize)]
struct ValuteTable {
    #[serde(rename = "EUR")]
    eur: ValuteEntry,
    #[serde(rename = "USD")]
    usd: ValuteEntry,
}

#[derive(Debug, Deserialize)]
struct ValuteEntry {
    #[serde(rename = "Value")]
    value: f64,
}

/// CBR daily rates API client
pub struct CbrClient {
    client: reqwest::Client,
    url: String,
}

impl CbrClient {
    /// Create a new client with a bounded request timeout
    pub fn new(url: &str, request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| RatewatchError::Internal(format!("client build failed: {e}")))?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl RateSource for CbrClient {
    async fn fetch(&self) -> Result<RateSnapshot> {
        debug!("Fetching rates from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| RatewatchError::RatesUnavailable(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(RatewatchError::RatesUnavailable(format!(
                "rate source returned {}",
                response.status()
            )));
        }

        let quotes: DailyQuotes = response
            .json()
            .await
            .map_err(|e| RatewatchError::RatesUnavailable(format!("malformed payload: {e}")))?;

        let (eur, usd) = (quotes.valute.eur.value, quotes.valute.usd.value);
        if eur <= 0.0 || usd <= 0.0 {
            return Err(RatewatchError::RatesUnavailable(format!(
                "non-positive rate in payload: EUR={eur}, USD={usd}"
            )));
        }

        debug!("Fetched rates: EUR={:.4}, USD={:.4}", eur, usd);

        Ok(RateSnapshot {
            eur,
            usd,
            fetched_at: Utc::now(),
        })
    }
}
