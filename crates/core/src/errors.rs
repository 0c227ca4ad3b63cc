use thiserror::Error;

/// Unified error type for the entire chat-ledger-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
///
/// Message parsing never produces a `CoreError`: text that cannot be
/// understood simply yields no transactions.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Ledger file ─────────────────────────────────────────────────
    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Unsupported file version: {0}")]
    UnsupportedVersion(u16),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("File I/O error: {0}")]
    FileIO(String),

    // ── Persistence collaborator ────────────────────────────────────
    #[error("Storage error: {0}")]
    Storage(String),

    // ── Rate sources / Network ──────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate source {provider} timed out after {millis} ms")]
    Timeout {
        provider: String,
        millis: u128,
    },

    // ── Chat delivery ───────────────────────────────────────────────
    #[error("Delivery to {user_id} failed: {message}")]
    Delivery {
        user_id: String,
        message: String,
    },

    // ── Configuration ───────────────────────────────────────────────
    #[error("Invalid configuration: {0}")]
    Config(String),

    // ── Business Logic ──────────────────────────────────────────────
    #[error("Unknown report period: {0}")]
    UnknownPeriod(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<bincode::Error> for CoreError {
    fn from(e: bincode::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}

impl From<toml::de::Error> for CoreError {
    fn from(e: toml::de::Error) -> Self {
        CoreError::Config(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Strip query parameters: source URLs may carry keys or user ids.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
