use chrono::{DateTime, TimeZone, Utc};
use ratewatch::adapters::SqliteStore;
use ratewatch::domain::{NotifyPeriod, RateSnapshot};
use ratewatch::error::{RatewatchError, Result};
use ratewatch::services::NotificationDispatcher;
use ratewatch::traits::{RateSource, Transport};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

// 2024-01-01 was a Monday
fn monday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
}

fn wednesday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 3, 9, 0, 0).unwrap()
}

struct FakeRates {
    eur: f64,
    usd: f64,
    fail: AtomicBool,
    calls: AtomicUsize,
}

impl FakeRates {
    fn new(eur: f64, usd: f64) -> Self {
        Self {
            eur,
            usd,
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    fn set_failing(&self, failing: bool) {
        self.fail.store(failing, Ordering::SeqCst);
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RateSource for FakeRates {
    async fn fetch(&self) -> Result<RateSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(RatewatchError::RatesUnavailable(
                "rate source down".to_string(),
            ));
        }
        Ok(RateSnapshot {
            eur: self.eur,
            usd: self.usd,
            fetched_at: Utc::now(),
        })
    }
}

struct RecordingTransport {
    sent: Mutex<Vec<(i64, String)>>,
    fail_for: HashSet<i64>,
}

impl RecordingTransport {
    fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_for: HashSet::new(),
        }
    }

    fn failing_for(user_ids: &[i64]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_for: user_ids.iter().copied().collect(),
        }
    }

    fn sent(&self) -> Vec<(i64, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Transport for RecordingTransport {
    async fn send_message(&self, user_id: i64, text: &str) -> Result<()> {
        if self.fail_for.contains(&user_id) {
            return Err(RatewatchError::Telegram("bot was blocked".to_string()));
        }
        self.sent.lock().unwrap().push((user_id, text.to_string()));
        Ok(())
    }
}

struct Fixture {
    store: SqliteStore,
    rates: Arc<FakeRates>,
    transport: Arc<RecordingTransport>,
    dispatcher: NotificationDispatcher,
}

async fn fixture_with(transport: RecordingTransport) -> Fixture {
    let store = SqliteStore::new("sqlite::memory:", 1)
        .await
        .expect("in-memory store");
    store.migrate().await.expect("migrations");

    let rates = Arc::new(FakeRates::new(92.5, 85.3));
    let transport = Arc::new(transport);
    let dispatcher = NotificationDispatcher::new(
        store.clone(),
        rates.clone() as Arc<dyn RateSource>,
        transport.clone() as Arc<dyn Transport>,
    );

    Fixture {
        store,
        rates,
        transport,
        dispatcher,
    }
}

async fn fixture() -> Fixture {
    fixture_with(RecordingTransport::new()).await
}

#[tokio::test]
async fn fetch_failure_aborts_tick_with_zero_sends() {
    let fx = fixture().await;
    for user_id in [1, 2, 3] {
        fx.store.set_period(user_id, NotifyPeriod::Daily).await.unwrap();
    }

    fx.rates.set_failing(true);
    let result = fx.dispatcher.run_tick(monday()).await;

    assert!(matches!(result, Err(RatewatchError::RatesUnavailable(_))));
    assert_eq!(fx.rates.call_count(), 1);
    assert!(fx.transport.sent().is_empty());

    // All three remain eligible on the next matching tick
    fx.rates.set_failing(false);
    let report = fx.dispatcher.run_tick(monday()).await.unwrap();
    assert_eq!(report.due, 3);
    assert_eq!(report.delivered, 3);
    assert_eq!(fx.transport.sent().len(), 3);
}

#[tokio::test]
async fn one_failed_send_does_not_block_the_others() {
    let fx = fixture_with(RecordingTransport::failing_for(&[2])).await;
    for user_id in [1, 2, 3] {
        fx.store.set_period(user_id, NotifyPeriod::Daily).await.unwrap();
    }

    let report = fx.dispatcher.run_tick(monday()).await.unwrap();

    assert_eq!(report.due, 3);
    assert_eq!(report.delivered, 2);
    assert_eq!(report.failed, 1);

    let recipients: Vec<i64> = fx.transport.sent().iter().map(|(id, _)| *id).collect();
    assert!(recipients.contains(&1));
    assert!(recipients.contains(&3));
    assert!(!recipients.contains(&2));
}

#[tokio::test]
async fn empty_due_set_skips_the_rate_fetch() {
    let fx = fixture().await;
    fx.store.set_period(1, NotifyPeriod::Weekly).await.unwrap();
    fx.store.set_period(2, NotifyPeriod::Off).await.unwrap();
    fx.store.ensure_user(3).await.unwrap();

    let report = fx.dispatcher.run_tick(wednesday()).await.unwrap();

    assert_eq!(report.due, 0);
    assert_eq!(fx.rates.call_count(), 0);
    assert!(fx.transport.sent().is_empty());
}

#[tokio::test]
async fn one_fetch_is_shared_by_all_due_users() {
    let fx = fixture().await;
    for user_id in 1..=5 {
        fx.store.set_period(user_id, NotifyPeriod::Daily).await.unwrap();
    }

    let report = fx.dispatcher.run_tick(wednesday()).await.unwrap();

    assert_eq!(report.delivered, 5);
    assert_eq!(fx.rates.call_count(), 1);
}

#[tokio::test]
async fn weekly_subscriber_lifecycle() {
    let fx = fixture().await;

    // First contact: registered but unset, never due
    fx.store.ensure_user(42).await.unwrap();
    let report = fx.dispatcher.run_tick(monday()).await.unwrap();
    assert_eq!(report.candidates, 0);
    assert!(fx.transport.sent().is_empty());

    // User picks weekly
    fx.store.set_period(42, NotifyPeriod::Weekly).await.unwrap();

    // Wednesday tick: not due, no fetch, no send
    let report = fx.dispatcher.run_tick(wednesday()).await.unwrap();
    assert_eq!(report.candidates, 1);
    assert_eq!(report.due, 0);
    assert_eq!(fx.rates.call_count(), 0);

    // Monday tick: delivered with both rates at two decimal places
    let report = fx.dispatcher.run_tick(monday()).await.unwrap();
    assert_eq!(report.due, 1);
    assert_eq!(report.delivered, 1);

    let sent = fx.transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, 42);
    assert!(sent[0].1.contains("92.50"));
    assert!(sent[0].1.contains("85.30"));
}
