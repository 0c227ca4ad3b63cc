// ═══════════════════════════════════════════════════════════════════
// Rate Tests — RateSnapshot math, RateService refresh & caching
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chat_ledger_core::errors::CoreError;
use chat_ledger_core::models::rates::{
    RateField, RateQuote, RateSnapshot, CHI_PER_TAEL, OUNCE_TO_TAEL, SILVER_LOCAL_PREMIUM,
};
use chat_ledger_core::models::transaction::Currency;
use chat_ledger_core::providers::registry::RateSourceRegistry;
use chat_ledger_core::providers::traits::RateSource;
use chat_ledger_core::services::rate_service::RateService;

// ═══════════════════════════════════════════════════════════════════
// Test Helpers — Mock Sources
// ═══════════════════════════════════════════════════════════════════

/// Returns fixed quotes and counts how often it was called.
struct StaticSource {
    name: String,
    quotes: Vec<RateQuote>,
    calls: Arc<AtomicUsize>,
}

impl StaticSource {
    fn new(name: &str, quotes: Vec<RateQuote>) -> Self {
        Self {
            name: name.to_string(),
            quotes,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl RateSource for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fields(&self) -> Vec<RateField> {
        self.quotes.iter().map(|q| q.field).collect()
    }

    async fn fetch(&self) -> Result<Vec<RateQuote>, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.quotes.clone())
    }
}

/// Always fails with an API error.
struct FailingSource {
    field: RateField,
}

#[async_trait]
impl RateSource for FailingSource {
    fn name(&self) -> &str {
        "failing"
    }

    fn fields(&self) -> Vec<RateField> {
        vec![self.field]
    }

    async fn fetch(&self) -> Result<Vec<RateQuote>, CoreError> {
        Err(CoreError::Api {
            provider: "failing".into(),
            message: "upstream down".into(),
        })
    }
}

/// Sleeps far longer than any test timeout.
struct SlowSource;

#[async_trait]
impl RateSource for SlowSource {
    fn name(&self) -> &str {
        "slow"
    }

    fn fields(&self) -> Vec<RateField> {
        vec![RateField::BtcLocal]
    }

    async fn fetch(&self) -> Result<Vec<RateQuote>, CoreError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(vec![RateQuote::new(RateField::BtcLocal, 1.0)])
    }
}

fn service(sources: Vec<Box<dyn RateSource>>) -> RateService {
    let mut registry = RateSourceRegistry::new();
    for source in sources {
        registry.register(source);
    }
    RateService::new(registry, Duration::from_millis(200))
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-6 * b.abs().max(1.0)
}

// ═══════════════════════════════════════════════════════════════════
// RateSnapshot
// ═══════════════════════════════════════════════════════════════════

mod snapshot {
    use super::*;

    #[test]
    fn fallback_values() {
        let s = RateSnapshot::fallback();
        assert_eq!(s.usd_local, 25_400.0);
        assert_eq!(s.gold_usd, 2_700.0);
        assert_eq!(s.silver_usd, 32.0);
        assert_eq!(s.gold_local, 8_500_000.0);
        assert_eq!(s.silver_local_est, 1_000_000.0);
        assert_eq!(s.btc_local, 2_500_000_000.0);
        assert!(s.is_fallback());
        assert!(s.stale_fields.is_empty());
    }

    #[test]
    fn fallback_differentials_are_consistent() {
        let s = RateSnapshot::fallback();
        let world_gold = 2_700.0 * 25_400.0 * OUNCE_TO_TAEL;
        assert!(close(s.gold_diff, 8_500_000.0 * CHI_PER_TAEL - world_gold));
        let world_silver = 32.0 * 25_400.0 * OUNCE_TO_TAEL;
        assert!(close(s.silver_diff, 1_000_000.0 - world_silver));
    }

    #[test]
    fn silver_estimate_formula() {
        let mut s = RateSnapshot::fallback();
        s.silver_usd = 30.0;
        s.usd_local = 25_000.0;
        let s = s.with_silver_estimate();
        assert!(close(
            s.silver_local_est,
            30.0 * 25_000.0 * OUNCE_TO_TAEL * SILVER_LOCAL_PREMIUM
        ));
    }

    #[test]
    fn conversion_to_local() {
        let s = RateSnapshot::fallback();
        assert_eq!(s.to_local(50_000.0, Currency::Local), 50_000.0);
        assert_eq!(s.to_local(100.0, Currency::Usd), 2_540_000.0);
        assert_eq!(s.to_local(2.0, Currency::Gold), 17_000_000.0);
        assert_eq!(s.to_local(0.1, Currency::Btc), 250_000_000.0);
        assert_eq!(s.rate_for(Currency::Local), 1.0);
    }

    #[test]
    fn get_and_set_fields() {
        let mut s = RateSnapshot::fallback();
        s.set(RateField::GoldLocal, 9_000_000.0);
        assert_eq!(s.get(RateField::GoldLocal), 9_000_000.0);
        assert_eq!(s.gold_local_per_tael(), 90_000_000.0);
    }

    #[test]
    fn serializes_with_wire_names() {
        let json = serde_json::to_value(RateSnapshot::fallback()).unwrap();
        assert_eq!(json["usd_vnd"], 25_400.0);
        assert_eq!(json["vn_sjc"], 8_500_000.0);
        assert_eq!(json["vn_silver_est"], 1_000_000.0);
        assert_eq!(json["btc_vnd"], 2_500_000_000.0);
        assert!(json.get("gold_diff").is_some());
    }

    #[test]
    fn field_display() {
        assert_eq!(RateField::UsdLocal.to_string(), "USD/VND");
        assert_eq!(RateField::BtcLocal.to_string(), "BTC/VND");
    }
}

// ═══════════════════════════════════════════════════════════════════
// RateService::refresh
// ═══════════════════════════════════════════════════════════════════

mod refresh {
    use super::*;

    #[test]
    fn serves_fallback_before_first_refresh() {
        let svc = service(vec![]);
        assert_eq!(*svc.current(), RateSnapshot::fallback());
    }

    #[tokio::test]
    async fn all_sources_succeed() {
        let svc = service(vec![
            Box::new(StaticSource::new("usd", vec![RateQuote::new(RateField::UsdLocal, 26_000.0)])),
            Box::new(StaticSource::new(
                "metals",
                vec![
                    RateQuote::new(RateField::GoldUsd, 2_500.0),
                    RateQuote::new(RateField::SilverUsd, 30.0),
                ],
            )),
            Box::new(StaticSource::new("sjc", vec![RateQuote::new(RateField::GoldLocal, 9_000_000.0)])),
            Box::new(StaticSource::new("btc", vec![RateQuote::new(RateField::BtcLocal, 2.0e9)])),
        ]);

        let report = svc.refresh().await;
        assert!(report.published);
        assert!(report.stale.is_empty());
        assert!(report.failed_sources.is_empty());
        assert_eq!(report.updated.len(), 5);

        let s = svc.current();
        assert_eq!(s.usd_local, 26_000.0);
        assert_eq!(s.btc_local, 2.0e9);
        assert!(!s.is_fallback());
        assert!(s.stale_fields.is_empty());

        let silver_est = 30.0 * 26_000.0 * OUNCE_TO_TAEL * SILVER_LOCAL_PREMIUM;
        assert!(close(s.silver_local_est, silver_est));
        assert!(close(
            s.gold_diff,
            9_000_000.0 * 10.0 - 2_500.0 * 26_000.0 * OUNCE_TO_TAEL
        ));
        assert!(close(
            s.silver_diff,
            silver_est - 30.0 * 26_000.0 * OUNCE_TO_TAEL
        ));
    }

    #[tokio::test]
    async fn failing_source_keeps_previous_value() {
        let svc = service(vec![
            Box::new(FailingSource { field: RateField::UsdLocal }),
            Box::new(StaticSource::new("gold", vec![RateQuote::new(RateField::GoldUsd, 2_600.0)])),
        ]);

        let report = svc.refresh().await;
        assert!(report.published);
        assert_eq!(report.failed_sources, vec!["failing".to_string()]);
        assert_eq!(report.updated, vec![RateField::GoldUsd]);

        let s = svc.current();
        assert_eq!(s.usd_local, 25_400.0);
        assert_eq!(s.gold_usd, 2_600.0);
        assert!(s.stale_fields.contains(&RateField::UsdLocal));
        assert!(!s.stale_fields.contains(&RateField::GoldUsd));
        // Differential recomputed from the mix of fresh and carried values
        assert!(close(
            s.gold_diff,
            8_500_000.0 * 10.0 - 2_600.0 * 25_400.0 * OUNCE_TO_TAEL
        ));
    }

    #[tokio::test]
    async fn silver_estimate_untouched_without_fresh_silver() {
        let svc = service(vec![Box::new(StaticSource::new(
            "usd",
            vec![RateQuote::new(RateField::UsdLocal, 30_000.0)],
        ))]);
        svc.refresh().await;
        assert_eq!(svc.current().silver_local_est, 1_000_000.0);
    }

    #[tokio::test]
    async fn all_sources_failing_publishes_nothing() {
        let svc = service(vec![
            Box::new(FailingSource { field: RateField::UsdLocal }),
            Box::new(FailingSource { field: RateField::BtcLocal }),
        ]);
        let before = svc.current();

        let report = svc.refresh().await;
        assert!(!report.published);
        assert_eq!(report.stale.len(), 5);
        assert!(Arc::ptr_eq(&before, &svc.current()));
        assert!(svc.current().is_fallback());
    }

    #[tokio::test]
    async fn invalid_values_are_ignored() {
        let svc = service(vec![Box::new(StaticSource::new(
            "broken",
            vec![
                RateQuote::new(RateField::UsdLocal, f64::NAN),
                RateQuote::new(RateField::GoldUsd, -1.0),
                RateQuote::new(RateField::BtcLocal, 0.0),
            ],
        ))]);

        let report = svc.refresh().await;
        assert!(!report.published);
        assert_eq!(svc.current().usd_local, 25_400.0);
    }

    #[tokio::test]
    async fn slow_source_times_out() {
        let svc = service(vec![
            Box::new(SlowSource),
            Box::new(StaticSource::new("usd", vec![RateQuote::new(RateField::UsdLocal, 26_000.0)])),
        ]);

        let report = svc.refresh().await;
        assert_eq!(report.failed_sources, vec!["slow".to_string()]);
        assert!(report.published);
        assert_eq!(svc.current().btc_local, 2_500_000_000.0);
        assert!(svc.current().stale_fields.contains(&RateField::BtcLocal));
    }

    #[tokio::test]
    async fn readers_keep_their_snapshot_across_publish() {
        let svc = service(vec![Box::new(StaticSource::new(
            "usd",
            vec![RateQuote::new(RateField::UsdLocal, 27_000.0)],
        ))]);
        let held = svc.current();
        svc.refresh().await;

        assert_eq!(held.usd_local, 25_400.0);
        assert_eq!(svc.current().usd_local, 27_000.0);
    }

    #[test]
    fn publish_replaces_snapshot() {
        let svc = service(vec![]);
        let mut next = RateSnapshot::fallback();
        next.usd_local = 24_000.0;
        svc.publish(next);
        assert_eq!(svc.current().usd_local, 24_000.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// RateService::spawn_refresher
// ═══════════════════════════════════════════════════════════════════

mod refresher {
    use super::*;

    #[tokio::test]
    async fn refreshes_immediately_and_periodically() {
        let source = StaticSource::new("usd", vec![RateQuote::new(RateField::UsdLocal, 26_500.0)]);
        let calls = Arc::clone(&source.calls);
        let svc = Arc::new(service(vec![Box::new(source)]));

        let handle = Arc::clone(&svc).spawn_refresher(Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(150)).await;
        handle.abort();

        assert!(calls.load(Ordering::SeqCst) >= 2);
        assert_eq!(svc.current().usd_local, 26_500.0);
    }
}
