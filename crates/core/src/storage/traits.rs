use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::CoreError;
use crate::models::transaction::StoredTransaction;

/// Persistence collaborator for ledger entries.
///
/// Entries are append-only: nothing is ever updated or deleted.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Persist a new entry.
    async fn create(&self, tx: StoredTransaction) -> Result<(), CoreError>;

    /// All entries of `user_id` created at or after `start`, oldest first.
    async fn fetch_by_user_since(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
    ) -> Result<Vec<StoredTransaction>, CoreError>;

    /// Every user that has at least one entry, sorted and without duplicates.
    async fn list_user_ids(&self) -> Result<Vec<String>, CoreError>;
}
