use crate::models::rates::RateField;
use crate::models::settings::RateSettings;

use super::coingecko::CoinGeckoSource;
use super::er_api::ErApiSource;
use super::gold_api::GoldApiSource;
use super::traits::RateSource;
use super::vang_today::VangTodaySource;
use std::time::Duration;

/// Registry of all configured rate sources.
///
/// Sources are fetched in registration order during a refresh cycle.
/// USD/VND is registered first so the derived silver estimate uses the
/// freshest exchange rate.
pub struct RateSourceRegistry {
    sources: Vec<Box<dyn RateSource>>,
}

impl RateSourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    /// Create a registry with every default source, pointed at the configured URLs.
    pub fn new_with_defaults(settings: &RateSettings) -> Self {
        let timeout = Duration::from_secs(settings.fetch_timeout_secs);
        let mut registry = Self::new();

        // open.er-api.com: USD/VND
        registry.register(Box::new(ErApiSource::new(&settings.usd_rate_url, timeout)));

        // gold-api.com: world gold and silver
        registry.register(Box::new(GoldApiSource::gold(&settings.gold_api_url, timeout)));
        registry.register(Box::new(GoldApiSource::silver(&settings.gold_api_url, timeout)));

        // vang.today: SJC gold
        registry.register(Box::new(VangTodaySource::new(&settings.local_gold_url, timeout)));

        // CoinGecko: BTC/VND
        registry.register(Box::new(CoinGeckoSource::new(&settings.bitcoin_url, timeout)));

        registry
    }

    /// Register a new rate source.
    pub fn register(&mut self, source: Box<dyn RateSource>) {
        self.sources.push(source);
    }

    /// All sources in registration order.
    pub fn sources(&self) -> impl Iterator<Item = &dyn RateSource> {
        self.sources.iter().map(|s| s.as_ref())
    }

    /// Sources that feed the given field, in registration order.
    pub fn sources_for(&self, field: RateField) -> Vec<&dyn RateSource> {
        self.sources
            .iter()
            .filter(|s| s.fields().contains(&field))
            .map(|s| s.as_ref())
            .collect()
    }

    /// Fields no registered source provides.
    pub fn uncovered_fields(&self) -> Vec<RateField> {
        [
            RateField::UsdLocal,
            RateField::GoldUsd,
            RateField::SilverUsd,
            RateField::GoldLocal,
            RateField::BtcLocal,
        ]
        .into_iter()
        .filter(|f| self.sources_for(*f).is_empty())
        .collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Default for RateSourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
