use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category assigned to expenses that match no keyword.
pub const FALLBACK_CATEGORY: &str = "khác";

/// The three kinds of ledger entries a chat message can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Money earned ("thu", or a leading `+`)
    #[serde(rename = "thu")]
    Income,
    /// Money spent ("chi", or a leading `-`)
    #[serde(rename = "chi")]
    Expense,
    /// Money moved into a tracked asset ("tk", "tiết kiệm")
    #[serde(rename = "tiet_kiem")]
    Saving,
}

impl TransactionKind {
    /// Short label used in chat replies.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Income => "thu",
            TransactionKind::Expense => "chi",
            TransactionKind::Saving => "tiết kiệm",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Unit a transaction amount is denominated in.
///
/// `Local` is the accounting currency (VND). Gold is counted in "chỉ"
/// (1/10 of a lượng).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "VND")]
    Local,
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "BTC")]
    Btc,
    #[serde(rename = "GOLD")]
    Gold,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Local => "VND",
            Currency::Usd => "USD",
            Currency::Btc => "BTC",
            Currency::Gold => "GOLD",
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Currency::Local)
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// One transaction extracted from a chat message, before conversion and storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTransaction {
    pub kind: TransactionKind,

    /// Quantity in `currency` units, already scaled by any k/m suffix. Always > 0.
    pub amount: f64,

    /// Trimmed free text. Empty for savings, non-empty otherwise.
    pub note: String,

    pub currency: Currency,

    /// Expense category; `None` for income and savings.
    #[serde(default)]
    pub category: Option<String>,
}

/// A persisted ledger entry. Created once, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTransaction {
    pub id: Uuid,

    /// Opaque chat user identifier
    pub user_id: String,

    pub kind: TransactionKind,

    /// Value in local currency at the rate in effect when the entry was created
    pub converted_amount: f64,

    /// Quantity in the original currency/unit
    pub original_amount: f64,

    pub note: String,

    pub currency: Currency,

    #[serde(default)]
    pub category: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl StoredTransaction {
    /// Build a stored record from a parsed transaction and its converted value.
    ///
    /// Expenses without a category are filed under [`FALLBACK_CATEGORY`].
    pub fn from_parsed(
        user_id: impl Into<String>,
        parsed: &ParsedTransaction,
        converted_amount: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        let category = match (parsed.kind, &parsed.category) {
            (TransactionKind::Expense, None) => Some(FALLBACK_CATEGORY.to_string()),
            (_, category) => category.clone(),
        };
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            kind: parsed.kind,
            converted_amount,
            original_amount: parsed.amount,
            note: parsed.note.clone(),
            currency: parsed.currency,
            category,
            created_at,
        }
    }
}
