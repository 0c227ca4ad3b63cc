pub mod errors;
pub mod logging;
pub mod models;
pub mod providers;
pub mod replies;
pub mod services;
pub mod storage;

use chrono::{DateTime, FixedOffset, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use errors::CoreError;
use models::{
    rates::RateSnapshot,
    report::{Period, PeriodReport},
    settings::Settings,
};
use replies::Reply;
use services::{
    bulletin::{BulletinSchedule, BulletinService, Notifier},
    ingest_service::{IngestOutcome, IngestService},
    parser::TransactionParser,
    rate_service::RateService,
    report_service::{period_start, ReportService},
};
use storage::{
    file_store::LedgerFileStore, memory::MemoryStore, traits::TransactionStore,
};
use tokio::task::JoinHandle;

/// Main entry point for the bookkeeping core.
/// Turns one inbound chat message into the replies to send back.
#[must_use]
pub struct FinanceBot {
    store: Arc<dyn TransactionStore>,
    rates: Arc<RateService>,
    parser: TransactionParser,
    ingest_service: IngestService,
    report_service: ReportService,
    offset: FixedOffset,
}

impl std::fmt::Debug for FinanceBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinanceBot")
            .field("offset", &self.offset)
            .field("categories", &self.parser.categorizer().labels())
            .finish()
    }
}

impl FinanceBot {
    /// Build a bot over a store and a rate service, using the configured time zone.
    pub fn new(
        store: Arc<dyn TransactionStore>,
        rates: Arc<RateService>,
        settings: &Settings,
    ) -> Result<Self, CoreError> {
        Ok(Self::with_offset(store, rates, settings.offset()?))
    }

    pub fn with_offset(
        store: Arc<dyn TransactionStore>,
        rates: Arc<RateService>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            store,
            rates,
            parser: TransactionParser::new(),
            ingest_service: IngestService::new(),
            report_service: ReportService::new(),
            offset,
        }
    }

    /// Replace the parser, e.g. to use a custom category table.
    pub fn with_parser(mut self, parser: TransactionParser) -> Self {
        self.parser = parser;
        self
    }

    // ── Chat entry point ────────────────────────────────────────────

    /// Handle one chat message from `user_id`.
    pub async fn handle_message(&self, user_id: &str, text: &str) -> Vec<Reply> {
        self.handle_message_at(user_id, text, Utc::now()).await
    }

    /// Handle one chat message as if it arrived at `now`.
    ///
    /// Routing, first match wins:
    /// - "báo cáo" → week and month report
    /// - "giá vàng" / "giá bạc" → price card from the cached rates
    /// - anything else → parse and store; nothing parsed → usage help
    pub async fn handle_message_at(
        &self,
        user_id: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> Vec<Reply> {
        info!(user_id, text, "message received");
        let lower = text.to_lowercase();

        if lower.contains("báo cáo") {
            return vec![self.report_reply(user_id, now).await];
        }
        if lower.contains("giá vàng") {
            return vec![replies::gold_price_message(&self.rates.current())];
        }
        if lower.contains("giá bạc") {
            return vec![replies::silver_price_message(&self.rates.current())];
        }

        let outcome = self.record(user_id, text, now).await;
        if outcome.saved.is_empty() && outcome.failed.is_empty() {
            return vec![replies::help_message()];
        }

        let mut out: Vec<Reply> = outcome
            .failed
            .iter()
            .map(|_| replies::save_failed_message())
            .collect();
        if !outcome.saved.is_empty() {
            out.push(replies::saved_message(&outcome.saved));
        }
        out
    }

    // ── Operations ──────────────────────────────────────────────────

    /// Parse `text` and store every transaction found, valued at the
    /// current rates.
    pub async fn record(&self, user_id: &str, text: &str, now: DateTime<Utc>) -> IngestOutcome {
        let parsed = self.parser.parse(text);
        if parsed.is_empty() {
            return IngestOutcome::default();
        }
        let rates = self.rates.current();
        self.ingest_service
            .ingest(self.store.as_ref(), user_id, &parsed, &rates, now)
            .await
    }

    /// Summary of `user_id`'s entries in `[period start, now)`, with the
    /// period start taken in the bot's time zone.
    pub async fn report(
        &self,
        user_id: &str,
        period: Period,
        now: DateTime<Utc>,
    ) -> Result<PeriodReport, CoreError> {
        let local_now = now.with_timezone(&self.offset);
        let start = period_start(period, &local_now);
        let mut entries = self
            .store
            .fetch_by_user_since(user_id, start.with_timezone(&Utc))
            .await?;
        entries.retain(|tx| tx.created_at < now);

        Ok(self.report_service.aggregate(
            period,
            start.date_naive(),
            &entries,
            &self.rates.current(),
        ))
    }

    /// The market rates currently served.
    pub fn market_rates(&self) -> Arc<RateSnapshot> {
        self.rates.current()
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    async fn report_reply(&self, user_id: &str, now: DateTime<Utc>) -> Reply {
        let week = match self.report(user_id, Period::Week, now).await {
            Ok(report) => report,
            Err(e) => {
                warn!(user_id, error = %e, "week report failed");
                return replies::report_failed_message(Period::Week);
            }
        };
        let month = match self.report(user_id, Period::Month, now).await {
            Ok(report) => report,
            Err(e) => {
                warn!(user_id, error = %e, "month report failed");
                return replies::report_failed_message(Period::Month);
            }
        };
        replies::report_message(&week, &month)
    }
}

// ── Runtime wiring ──────────────────────────────────────────────────

/// Open the configured ledger: the file at `ledger_path`, or memory.
pub fn open_store(settings: &Settings) -> Result<Arc<dyn TransactionStore>, CoreError> {
    match settings.ledger_path.as_deref() {
        Some(path) => Ok(Arc::new(LedgerFileStore::open(path)?)),
        None => Ok(Arc::new(MemoryStore::new())),
    }
}

/// Start the rate refresher, the market bulletin (when enabled) and the
/// keep-alive pinger (when a URL is set).
///
/// The tasks run until their handles are aborted.
pub fn spawn_background_jobs(
    settings: &Settings,
    rates: Arc<RateService>,
    store: Arc<dyn TransactionStore>,
    notifier: Arc<dyn Notifier>,
) -> Result<Vec<JoinHandle<()>>, CoreError> {
    settings.validate()?;
    let mut handles = vec![Arc::clone(&rates).spawn_refresher(settings.refresh_interval())];

    if settings.bulletin.enabled {
        let bulletin = BulletinService::new(BulletinSchedule::from_settings(settings)?);
        handles.push(bulletin.spawn(notifier, store, rates));
    }

    let client = reqwest::Client::builder()
        .timeout(settings.fetch_timeout())
        .build()
        .unwrap_or_else(|_| reqwest::Client::new());
    if let Some(handle) = services::keep_alive::spawn_keep_alive(
        client,
        settings.keep_alive.url.clone(),
        settings.keep_alive_interval(),
        "keep-alive",
    ) {
        handles.push(handle);
    }

    info!(tasks = handles.len(), "background jobs started");
    Ok(handles)
}
