use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::errors::CoreError;

/// Runtime configuration, read from a TOML file.
///
/// Every section has defaults, so an empty file (or no file at all)
/// yields the reference deployment: UTC+7, 10-minute rate refresh,
/// 5-second source timeout, bulletins at 07:00 and 19:00.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Offset of the users' local time from UTC, in hours. Period
    /// boundaries and bulletin times are computed in this zone.
    pub utc_offset_hours: i32,

    /// Ledger file for `LedgerFileStore`. `None` keeps the ledger in memory.
    pub ledger_path: Option<String>,

    pub rates: RateSettings,

    pub bulletin: BulletinSettings,

    pub keep_alive: KeepAliveSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateSettings {
    pub refresh_interval_secs: u64,
    pub fetch_timeout_secs: u64,
    pub usd_rate_url: String,
    pub gold_api_url: String,
    pub local_gold_url: String,
    pub bitcoin_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletinSettings {
    pub enabled: bool,
    /// Local hours (0-23) at which the market bulletin goes out
    pub hours: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeepAliveSettings {
    /// URL pinged periodically so a sleeping host stays awake
    pub url: Option<String>,
    pub interval_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            utc_offset_hours: 7,
            ledger_path: None,
            rates: RateSettings::default(),
            bulletin: BulletinSettings::default(),
            keep_alive: KeepAliveSettings::default(),
        }
    }
}

impl Default for RateSettings {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 600,
            fetch_timeout_secs: 5,
            usd_rate_url: "https://open.er-api.com/v6/latest/USD".to_string(),
            gold_api_url: "https://api.gold-api.com/price".to_string(),
            local_gold_url: "https://www.vang.today/api/prices?type=SJL1L10".to_string(),
            bitcoin_url:
                "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin&vs_currencies=vnd"
                    .to_string(),
        }
    }
}

impl Default for BulletinSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            hours: vec![7, 19],
        }
    }
}

impl Default for KeepAliveSettings {
    fn default() -> Self {
        Self {
            url: None,
            interval_secs: 600,
        }
    }
}

impl Settings {
    /// Parse and validate settings from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, CoreError> {
        let settings: Settings = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file. A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if !(-12..=14).contains(&self.utc_offset_hours) {
            return Err(CoreError::Config(format!(
                "utc_offset_hours must be between -12 and 14, got {}",
                self.utc_offset_hours
            )));
        }
        if self.rates.refresh_interval_secs == 0 {
            return Err(CoreError::Config(
                "rates.refresh_interval_secs must be positive".into(),
            ));
        }
        if self.rates.fetch_timeout_secs == 0 {
            return Err(CoreError::Config(
                "rates.fetch_timeout_secs must be positive".into(),
            ));
        }
        if let Some(hour) = self.bulletin.hours.iter().find(|h| **h > 23) {
            return Err(CoreError::Config(format!(
                "bulletin.hours contains {hour}, expected 0-23"
            )));
        }
        if self.keep_alive.url.is_some() && self.keep_alive.interval_secs == 0 {
            return Err(CoreError::Config(
                "keep_alive.interval_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    /// The users' local time zone.
    pub fn offset(&self) -> Result<FixedOffset, CoreError> {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).ok_or_else(|| {
            CoreError::Config(format!("Invalid UTC offset: {}", self.utc_offset_hours))
        })
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.rates.refresh_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.rates.fetch_timeout_secs)
    }

    pub fn keep_alive_interval(&self) -> Duration {
        Duration::from_secs(self.keep_alive.interval_secs)
    }
}
