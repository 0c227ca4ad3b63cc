use chrono::Utc;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::errors::CoreError;
use crate::models::rates::{RateField, RateQuote, RateSnapshot};
use crate::models::settings::RateSettings;
use crate::providers::registry::RateSourceRegistry;
use crate::providers::traits::RateSource;

const ALL_FIELDS: [RateField; 5] = [
    RateField::UsdLocal,
    RateField::GoldUsd,
    RateField::SilverUsd,
    RateField::GoldLocal,
    RateField::BtcLocal,
];

/// What one refresh cycle achieved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshReport {
    /// Fields that received a fresh value
    pub updated: Vec<RateField>,
    /// Fields that kept their previous value
    pub stale: Vec<RateField>,
    /// Names of the sources that failed or timed out
    pub failed_sources: Vec<String>,
    /// Whether a new snapshot was published
    pub published: bool,
}

/// Owns the cached market-rate snapshot and keeps it fresh.
///
/// Cache strategy:
/// - Readers call [`current`](Self::current) and get the latest published
///   snapshot immediately; they never wait on the network.
/// - A refresh builds a complete new snapshot off to the side and swaps it
///   in with a single pointer write, so readers see either the whole old
///   snapshot or the whole new one.
/// - Until the first successful refresh the built-in fallback is served.
/// - A failing source keeps its field's previous value and the field is
///   listed in `stale_fields`.
pub struct RateService {
    registry: RateSourceRegistry,
    current: RwLock<Arc<RateSnapshot>>,
    fetch_timeout: Duration,
}

impl RateService {
    pub fn new(registry: RateSourceRegistry, fetch_timeout: Duration) -> Self {
        Self::with_initial(registry, fetch_timeout, RateSnapshot::fallback())
    }

    /// Start from a given snapshot instead of the built-in fallback.
    pub fn with_initial(
        registry: RateSourceRegistry,
        fetch_timeout: Duration,
        initial: RateSnapshot,
    ) -> Self {
        Self {
            registry,
            current: RwLock::new(Arc::new(initial)),
            fetch_timeout,
        }
    }

    /// Service wired to the default public sources.
    pub fn from_settings(settings: &RateSettings) -> Self {
        Self::new(
            RateSourceRegistry::new_with_defaults(settings),
            Duration::from_secs(settings.fetch_timeout_secs),
        )
    }

    /// The latest published snapshot.
    pub fn current(&self) -> Arc<RateSnapshot> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*guard)
    }

    /// Replace the published snapshot.
    pub fn publish(&self, snapshot: RateSnapshot) {
        let next = Arc::new(snapshot);
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        *guard = next;
    }

    /// Run one refresh cycle over every registered source.
    ///
    /// Nothing is published when every source fails; the previous
    /// snapshot stays in place untouched.
    pub async fn refresh(&self) -> RefreshReport {
        debug!(sources = self.registry.len(), "refreshing market rates");

        let mut draft = (*self.current()).clone();
        let mut report = RefreshReport::default();

        for source in self.registry.sources() {
            match self.fetch_source(source).await {
                Ok(quotes) => {
                    for quote in quotes {
                        if !quote.value.is_finite() || quote.value <= 0.0 {
                            warn!(
                                source = source.name(),
                                field = %quote.field,
                                value = quote.value,
                                "ignoring invalid rate"
                            );
                            continue;
                        }
                        draft.set(quote.field, quote.value);
                        if !report.updated.contains(&quote.field) {
                            report.updated.push(quote.field);
                        }
                    }
                }
                Err(e) => {
                    warn!(source = source.name(), error = %e, "rate source failed");
                    report.failed_sources.push(source.name().to_string());
                }
            }
        }

        report.stale = ALL_FIELDS
            .into_iter()
            .filter(|f| !report.updated.contains(f))
            .collect();

        if report.updated.is_empty() {
            warn!("no rate source succeeded; keeping previous snapshot");
            return report;
        }

        if report.updated.contains(&RateField::SilverUsd) {
            draft = draft.with_silver_estimate();
        }
        draft = draft.with_differentials();
        draft.stale_fields = report.stale.clone();
        draft.fetched_at = Some(Utc::now());

        self.publish(draft);
        report.published = true;

        info!(
            updated = report.updated.len(),
            stale = report.stale.len(),
            "market rates refreshed"
        );
        report
    }

    /// Refresh now, then every `interval`, until the task is aborted.
    pub fn spawn_refresher(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                self.refresh().await;
            }
        })
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }

    async fn fetch_source(
        &self,
        source: &dyn RateSource,
    ) -> Result<Vec<RateQuote>, CoreError> {
        match tokio::time::timeout(self.fetch_timeout, source.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(CoreError::Timeout {
                provider: source.name().to_string(),
                millis: self.fetch_timeout.as_millis(),
            }),
        }
    }
}
