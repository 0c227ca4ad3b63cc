use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::transaction::Currency;
use crate::errors::CoreError;

/// Reporting window. Both windows end "now" and start at local midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Since Monday 00:00 of the current ISO week
    Week,
    /// Since the 1st of the current month, 00:00
    Month,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Week => "week",
            Period::Month => "month",
        }
    }

    /// Section title used in chat replies.
    pub fn title(&self) -> &'static str {
        match self {
            Period::Week => "Tuần này",
            Period::Month => "Tháng này",
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Period {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "week" | "tuần" => Ok(Period::Week),
            "month" | "tháng" => Ok(Period::Month),
            other => Err(CoreError::UnknownPeriod(other.to_string())),
        }
    }
}

/// Accumulated holding of one foreign currency or commodity, valued at today's rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetDetail {
    /// Total quantity saved during the period
    pub quantity: f64,

    /// Current local value of the whole quantity
    #[serde(rename = "current_vnd")]
    pub current_local: f64,

    /// Local value of one unit at the time of the report
    pub rate: f64,
}

/// Period summary. Computed on demand and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodReport {
    pub period: Period,

    pub start_date: NaiveDate,

    pub total_income: f64,

    pub total_expense: f64,

    /// Everything moved into savings, valued at entry-time rates
    #[serde(rename = "total_savings_vnd")]
    pub total_savings_local: f64,

    /// income − expense − savings
    pub balance: f64,

    pub expense_by_category: BTreeMap<String, f64>,

    pub assets: BTreeMap<Currency, AssetDetail>,

    /// Sum of all asset valuations at the current rates
    #[serde(rename = "total_assets_vnd")]
    pub total_assets_local: f64,
}

impl PeriodReport {
    pub fn empty(period: Period, start_date: NaiveDate) -> Self {
        Self {
            period,
            start_date,
            total_income: 0.0,
            total_expense: 0.0,
            total_savings_local: 0.0,
            balance: 0.0,
            expense_by_category: BTreeMap::new(),
            assets: BTreeMap::new(),
            total_assets_local: 0.0,
        }
    }

    /// Assets with a positive accumulated quantity.
    pub fn held_assets(&self) -> impl Iterator<Item = (&Currency, &AssetDetail)> {
        self.assets.iter().filter(|(_, a)| a.quantity > 0.0)
    }
}
