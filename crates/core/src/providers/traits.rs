use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::rates::{RateField, RateQuote};

/// Trait abstraction for all market-rate sources.
///
/// Each external feed (exchange rate, world metal price, local gold
/// price, crypto price) implements this trait and feeds one or more
/// fields of the rate snapshot. Sources are fetched independently: one
/// failing feed never affects the fields of another.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Human-readable name of this source (for logs/errors).
    fn name(&self) -> &str;

    /// Which snapshot fields this source provides.
    fn fields(&self) -> Vec<RateField>;

    /// Fetch the latest values.
    async fn fetch(&self) -> Result<Vec<RateQuote>, CoreError>;
}
