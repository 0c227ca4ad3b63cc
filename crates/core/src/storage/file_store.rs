use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

use crate::errors::CoreError;
use crate::models::transaction::StoredTransaction;
use super::format;
use super::memory::{distinct_users, select_since};
use super::traits::TransactionStore;

/// Ledger persisted to a single versioned binary file.
///
/// Flow on every write: entries → bincode → CLDG format bytes → temp file
/// → rename over the ledger. A crash mid-write leaves the previous file
/// intact.
pub struct LedgerFileStore {
    path: PathBuf,
    entries: Mutex<Vec<StoredTransaction>>,
}

impl LedgerFileStore {
    /// Open the ledger at `path`, starting empty when the file does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let bytes = std::fs::read(&path)?;
            Self::decode(&bytes)?
        } else {
            Vec::new()
        };
        info!(path = %path.display(), entries = entries.len(), "ledger opened");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize entries to CLDG bytes.
    pub fn encode(entries: &[StoredTransaction]) -> Result<Vec<u8>, CoreError> {
        let payload = bincode::serialize(entries)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize ledger: {e}")))?;
        Ok(format::write_file(format::CURRENT_VERSION, &payload))
    }

    /// Parse CLDG bytes back into entries.
    pub fn decode(data: &[u8]) -> Result<Vec<StoredTransaction>, CoreError> {
        let (_, payload) = format::read_file(data)?;
        bincode::deserialize(payload)
            .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize ledger: {e}")))
    }

    fn persist(&self, entries: &[StoredTransaction]) -> Result<(), CoreError> {
        let bytes = Self::encode(entries)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), entries = entries.len(), "ledger saved");
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<StoredTransaction>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl TransactionStore for LedgerFileStore {
    async fn create(&self, tx: StoredTransaction) -> Result<(), CoreError> {
        let mut entries = self.lock();
        entries.push(tx);
        if let Err(e) = self.persist(&entries) {
            entries.pop();
            return Err(CoreError::Storage(format!("Failed to save ledger: {e}")));
        }
        Ok(())
    }

    async fn fetch_by_user_since(
        &self,
        user_id: &str,
        start: DateTime<Utc>,
    ) -> Result<Vec<StoredTransaction>, CoreError> {
        Ok(select_since(&self.lock(), user_id, start))
    }

    async fn list_user_ids(&self) -> Result<Vec<String>, CoreError> {
        Ok(distinct_users(&self.lock()))
    }
}
