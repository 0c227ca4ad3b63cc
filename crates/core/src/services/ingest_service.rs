use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::errors::CoreError;
use crate::models::rates::RateSnapshot;
use crate::models::transaction::{ParsedTransaction, StoredTransaction};
use crate::storage::traits::TransactionStore;

/// Result of storing one batch of parsed transactions.
#[derive(Debug, Default)]
pub struct IngestOutcome {
    /// Records persisted, in input order
    pub saved: Vec<StoredTransaction>,
    /// Items the store refused, with the reason
    pub failed: Vec<(ParsedTransaction, CoreError)>,
}

impl IngestOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Converts parsed transactions to local currency and persists them.
pub struct IngestService;

impl IngestService {
    pub fn new() -> Self {
        Self
    }

    /// Value of `parsed` in local currency at the given snapshot.
    pub fn convert(&self, parsed: &ParsedTransaction, rates: &RateSnapshot) -> f64 {
        rates.to_local(parsed.amount, parsed.currency)
    }

    /// Store every item of `batch` for `user_id`.
    ///
    /// A failure on one item does not stop the others; it is logged and
    /// returned in [`IngestOutcome::failed`].
    pub async fn ingest(
        &self,
        store: &dyn TransactionStore,
        user_id: &str,
        batch: &[ParsedTransaction],
        rates: &RateSnapshot,
        now: DateTime<Utc>,
    ) -> IngestOutcome {
        let mut outcome = IngestOutcome::default();

        for parsed in batch {
            let converted = self.convert(parsed, rates);
            let record = StoredTransaction::from_parsed(user_id, parsed, converted, now);

            match store.create(record.clone()).await {
                Ok(()) => {
                    debug!(user_id, id = %record.id, kind = %record.kind, "transaction stored");
                    outcome.saved.push(record);
                }
                Err(e) => {
                    warn!(user_id, kind = %parsed.kind, error = %e, "failed to store transaction");
                    outcome.failed.push((parsed.clone(), e));
                }
            }
        }

        outcome
    }
}

impl Default for IngestService {
    fn default() -> Self {
        Self::new()
    }
}
