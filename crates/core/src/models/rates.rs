use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::transaction::Currency;

/// Troy ounces in one lượng (tael). Used to compare world metal prices
/// against local per-lượng prices.
pub const OUNCE_TO_TAEL: f64 = 1.20565;

/// Number of chỉ in one lượng. Local gold is quoted per chỉ.
pub const CHI_PER_TAEL: f64 = 10.0;

/// Markup applied to the world silver price to estimate the local retail price.
pub const SILVER_LOCAL_PREMIUM: f64 = 1.05;

/// Individual fields of a [`RateSnapshot`] that a rate source can feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RateField {
    /// Local currency per 1 USD
    UsdLocal,
    /// World gold, USD per troy ounce
    GoldUsd,
    /// World silver, USD per troy ounce
    SilverUsd,
    /// Local (SJC) gold, local currency per chỉ
    GoldLocal,
    /// Bitcoin, local currency per coin
    BtcLocal,
}

impl std::fmt::Display for RateField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateField::UsdLocal => write!(f, "USD/VND"),
            RateField::GoldUsd => write!(f, "XAU/USD"),
            RateField::SilverUsd => write!(f, "XAG/USD"),
            RateField::GoldLocal => write!(f, "SJC/VND"),
            RateField::BtcLocal => write!(f, "BTC/VND"),
        }
    }
}

/// One value returned by a rate source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateQuote {
    pub field: RateField,
    pub value: f64,
}

impl RateQuote {
    pub fn new(field: RateField, value: f64) -> Self {
        Self { field, value }
    }
}

/// A consistent set of market rates, published as a whole.
///
/// Serialized with the field names the reporting API has always used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    #[serde(rename = "usd_vnd")]
    pub usd_local: f64,

    pub gold_usd: f64,

    pub silver_usd: f64,

    /// SJC gold price per chỉ
    #[serde(rename = "vn_sjc")]
    pub gold_local: f64,

    /// Estimated local silver price per lượng
    #[serde(rename = "vn_silver_est")]
    pub silver_local_est: f64,

    #[serde(rename = "btc_vnd")]
    pub btc_local: f64,

    /// Local gold per lượng minus world gold converted to local per lượng
    pub gold_diff: f64,

    /// Local silver estimate minus world silver converted to local per lượng
    pub silver_diff: f64,

    /// When the last refresh cycle completed. `None` for the built-in fallback.
    #[serde(default)]
    pub fetched_at: Option<DateTime<Utc>>,

    /// Fields whose value was carried over because their source failed.
    #[serde(default)]
    pub stale_fields: Vec<RateField>,
}

impl RateSnapshot {
    /// Hard-coded rates used until the first successful refresh.
    pub fn fallback() -> Self {
        Self {
            usd_local: 25_400.0,
            gold_usd: 2_700.0,
            silver_usd: 32.0,
            gold_local: 8_500_000.0,
            silver_local_est: 1_000_000.0,
            btc_local: 2_500_000_000.0,
            gold_diff: 0.0,
            silver_diff: 0.0,
            fetched_at: None,
            stale_fields: Vec::new(),
        }
        .with_differentials()
    }

    /// Read a raw field.
    pub fn get(&self, field: RateField) -> f64 {
        match field {
            RateField::UsdLocal => self.usd_local,
            RateField::GoldUsd => self.gold_usd,
            RateField::SilverUsd => self.silver_usd,
            RateField::GoldLocal => self.gold_local,
            RateField::BtcLocal => self.btc_local,
        }
    }

    /// Overwrite a raw field. Derived values are not touched.
    pub fn set(&mut self, field: RateField, value: f64) {
        match field {
            RateField::UsdLocal => self.usd_local = value,
            RateField::GoldUsd => self.gold_usd = value,
            RateField::SilverUsd => self.silver_usd = value,
            RateField::GoldLocal => self.gold_local = value,
            RateField::BtcLocal => self.btc_local = value,
        }
    }

    /// Local value of one unit of `currency`.
    pub fn rate_for(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Local => 1.0,
            Currency::Usd => self.usd_local,
            Currency::Gold => self.gold_local,
            Currency::Btc => self.btc_local,
        }
    }

    /// Convert a quantity of `currency` into local currency.
    pub fn to_local(&self, amount: f64, currency: Currency) -> f64 {
        match currency {
            Currency::Local => amount,
            other => amount * self.rate_for(other),
        }
    }

    /// World gold price converted to local currency per lượng.
    pub fn world_gold_local_per_tael(&self) -> f64 {
        self.gold_usd * self.usd_local * OUNCE_TO_TAEL
    }

    /// World silver price converted to local currency per lượng.
    pub fn world_silver_local_per_tael(&self) -> f64 {
        self.silver_usd * self.usd_local * OUNCE_TO_TAEL
    }

    /// SJC gold price per lượng.
    pub fn gold_local_per_tael(&self) -> f64 {
        self.gold_local * CHI_PER_TAEL
    }

    /// Re-estimate the local silver price from the world price.
    pub fn with_silver_estimate(mut self) -> Self {
        self.silver_local_est = self.world_silver_local_per_tael() * SILVER_LOCAL_PREMIUM;
        self
    }

    /// Recompute the local-vs-world differentials from the current fields.
    pub fn with_differentials(mut self) -> Self {
        self.gold_diff = self.gold_local_per_tael() - self.world_gold_local_per_tael();
        self.silver_diff = self.silver_local_est - self.world_silver_local_per_tael();
        self
    }

    pub fn is_fallback(&self) -> bool {
        self.fetched_at.is_none()
    }
}

impl Default for RateSnapshot {
    fn default() -> Self {
        Self::fallback()
    }
}
