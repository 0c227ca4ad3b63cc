use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::RwLock;

use crate::errors::CoreError;
use crate::models::transaction::StoredTransaction;
use super::traits::TransactionStore;

/// Ledger kept in process memory. Lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<Vec<StoredTransaction>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `entries`.
    pub fn with_entries(entries: Vec<StoredTransaction>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Copy of every entry in insertion order.
    pub fn snapshot(&self) -> Vec<StoredTransaction> {
        self.read().clone()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<StoredTransaction>> {
        self.entries.read().unwrap_or_else(|e| e.into_inner())
    }
}

/// Entries of `user_id` at or after `start`, sorted by creation time.
pub(crate) fn select_since(
    entries: &[StoredTransaction],
    user_id: &str,
    start: DateTime<Utc>,
) -> Vec<StoredTransaction> {
    let mut selected: Vec<StoredTransaction> = entries
        .iter()
        .filter(|tx| tx.user_id == user_id && tx.created_at >= start)
        .cloned()
        .collect();
    selected.sort_by_key(|tx| tx.created_at);
    selected
}

pub(crate) fn distinct_users(entries: &[StoredTransaction]) -> Vec<String> {
    entries
        .iter()
        .map(|tx| tx.user_id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn create(&self, tx: StoredTransaction) -> Result<(), CoreError> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.push(tx);
        Ok(())
    }

    async fn fetch_by_user_since(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
    ) -> Result<Vec<StoredTransaction>, CoreError> {
        Ok(select_since(&self.read(), user_id, start))
    }

    async fn list_user_ids(&self) -> Result<Vec<String>, CoreError> {
        Ok(distinct_users(&self.read()))
    }
}
