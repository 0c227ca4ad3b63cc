use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use thiserror::Error;

use crate::models::transaction::{Currency, ParsedTransaction, TransactionKind};
use super::categorizer::Categorizer;

/// One transaction clause: keyword or sign, amount with optional k/m
/// suffix, optional unit, then the note up to the next comma or newline.
///
/// A `.` or `,` belongs to the amount only when a digit follows it, so
/// "tk 100, chi 5k cafe" still splits at the comma.
///
/// Spacing between the pieces is horizontal only, so a clause never
/// borrows its note from the following line.
static TRANSACTION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)(?:(?P<keyword>thu|chi|tk|tiết\s?kiệm|tiet\s?kiem)|(?P<sign>[+\-]))",
        r"[^\S\r\n]*(?P<amount>-?\d+(?:[.,]\d+)*[km]?)",
        r"[^\S\r\n]*(?P<unit>usd|\$|btc|bitcoin|chỉ\s?vàng)?",
        r"[^\S\r\n]*(?P<note>[^,\n]*)",
    ))
    .expect("transaction pattern is a valid regex")
});

/// Why a matched clause did not become a transaction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RejectionReason {
    #[error("amount '{0}' is not a number")]
    UnreadableAmount(String),

    #[error("amount {0} is not positive")]
    NonPositiveAmount(f64),

    #[error("savings entries take no note, got '{0}'")]
    SavingWithNote(String),

    #[error("income and expense entries need a note")]
    MissingNote,

    #[error("income and expense entries must be in VND, got {0}")]
    ForeignCurrency(Currency),
}

/// A matched clause and what became of it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    /// The exact text the pattern matched
    pub segment: String,
    pub result: Result<ParsedTransaction, RejectionReason>,
}

/// Extracts transactions from free-text chat messages.
///
/// Parsing is best-effort: clauses that break a rule are dropped and
/// the rest of the message still counts. An empty result means nothing
/// in the message was understood.
pub struct TransactionParser {
    categorizer: Categorizer,
}

impl TransactionParser {
    pub fn new() -> Self {
        Self::with_categorizer(Categorizer::new())
    }

    pub fn with_categorizer(categorizer: Categorizer) -> Self {
        Self { categorizer }
    }

    pub fn categorizer(&self) -> &Categorizer {
        &self.categorizer
    }

    /// Accepted transactions in the order they appear in `text`.
    pub fn parse(&self, text: &str) -> Vec<ParsedTransaction> {
        self.parse_detailed(text)
            .into_iter()
            .filter_map(|outcome| outcome.result.ok())
            .collect()
    }

    /// Every matched clause with either its transaction or its rejection reason.
    pub fn parse_detailed(&self, text: &str) -> Vec<ParseOutcome> {
        TRANSACTION_PATTERN
            .captures_iter(text)
            .map(|caps| ParseOutcome {
                segment: caps
                    .get(0)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default(),
                result: self.build(&caps),
            })
            .collect()
    }

    fn build(&self, caps: &Captures<'_>) -> Result<ParsedTransaction, RejectionReason> {
        let kind = resolve_kind(
            caps.name("keyword").map(|m| m.as_str()),
            caps.name("sign").map(|m| m.as_str()),
        );
        let amount = parse_amount(caps.name("amount").map_or("", |m| m.as_str()))?;
        let currency = resolve_currency(caps.name("unit").map(|m| m.as_str()));
        let note = caps.name("note").map_or("", |m| m.as_str()).trim().to_string();

        match kind {
            TransactionKind::Saving => {
                if !note.is_empty() {
                    return Err(RejectionReason::SavingWithNote(note));
                }
            }
            TransactionKind::Income | TransactionKind::Expense => {
                if note.is_empty() {
                    return Err(RejectionReason::MissingNote);
                }
                if !currency.is_local() {
                    return Err(RejectionReason::ForeignCurrency(currency));
                }
            }
        }

        let category = match kind {
            TransactionKind::Expense => Some(self.categorizer.categorize(&note).to_string()),
            _ => None,
        };

        Ok(ParsedTransaction {
            kind,
            amount,
            note,
            currency,
            category,
        })
    }
}

impl Default for TransactionParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Kind from an explicit keyword, else from the sign (`+` income, anything else expense).
pub fn resolve_kind(keyword: Option<&str>, sign: Option<&str>) -> TransactionKind {
    match keyword.map(str::to_lowercase).as_deref() {
        Some("thu") => TransactionKind::Income,
        Some("chi") => TransactionKind::Expense,
        // Only "tk" and the "tiết kiệm" spellings are left.
        Some(_) => TransactionKind::Saving,
        None if sign == Some("+") => TransactionKind::Income,
        None => TransactionKind::Expense,
    }
}

/// Parse an amount literal such as `50k`, `1,5m` or `-20`.
///
/// `k` multiplies by 1 000 and `m` by 1 000 000; a comma is read as the
/// decimal point. The scaled value must be finite and strictly positive.
pub fn parse_amount(raw: &str) -> Result<f64, RejectionReason> {
    let lowered = raw.trim().to_lowercase();
    let (digits, multiplier) = if let Some(rest) = lowered.strip_suffix('k') {
        (rest, 1_000.0)
    } else if let Some(rest) = lowered.strip_suffix('m') {
        (rest, 1_000_000.0)
    } else {
        (lowered.as_str(), 1.0)
    };

    let value: f64 = digits
        .replace(',', ".")
        .parse()
        .map_err(|_| RejectionReason::UnreadableAmount(raw.to_string()))?;
    let scaled = value * multiplier;

    if !scaled.is_finite() {
        return Err(RejectionReason::UnreadableAmount(raw.to_string()));
    }
    if scaled <= 0.0 {
        return Err(RejectionReason::NonPositiveAmount(scaled));
    }
    Ok(scaled)
}

/// Currency from the optional unit token. No unit means local currency.
pub fn resolve_currency(unit: Option<&str>) -> Currency {
    let unit = unit.map(str::to_lowercase).unwrap_or_default();
    match unit.as_str() {
        "usd" | "$" => Currency::Usd,
        "btc" | "bitcoin" => Currency::Btc,
        u if u.contains("vàng") => Currency::Gold,
        _ => Currency::Local,
    }
}
