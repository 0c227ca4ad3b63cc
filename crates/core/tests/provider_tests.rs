// ═══════════════════════════════════════════════════════════════════
// Provider Tests — response decoding for every source, registry
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use std::time::Duration;

use chat_ledger_core::errors::CoreError;
use chat_ledger_core::models::rates::{RateField, RateQuote};
use chat_ledger_core::models::settings::RateSettings;
use chat_ledger_core::providers::coingecko::CoinGeckoSource;
use chat_ledger_core::providers::er_api::ErApiSource;
use chat_ledger_core::providers::gold_api::GoldApiSource;
use chat_ledger_core::providers::registry::RateSourceRegistry;
use chat_ledger_core::providers::traits::RateSource;
use chat_ledger_core::providers::vang_today::VangTodaySource;

// ═══════════════════════════════════════════════════════════════════
// Test Helpers — Mock Source
// ═══════════════════════════════════════════════════════════════════

struct MockSource {
    name: String,
    fields: Vec<RateField>,
}

impl MockSource {
    fn new(name: &str, fields: Vec<RateField>) -> Self {
        Self {
            name: name.to_string(),
            fields,
        }
    }
}

#[async_trait]
impl RateSource for MockSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fields(&self) -> Vec<RateField> {
        self.fields.clone()
    }

    async fn fetch(&self) -> Result<Vec<RateQuote>, CoreError> {
        Ok(self.fields.iter().map(|f| RateQuote::new(*f, 1.0)).collect())
    }
}

// ═══════════════════════════════════════════════════════════════════
// open.er-api.com
// ═══════════════════════════════════════════════════════════════════

mod er_api {
    use super::*;

    #[test]
    fn parses_vnd_rate() {
        let body = r#"{"result":"success","base_code":"USD","rates":{"USD":1,"VND":25450.5,"EUR":0.92}}"#;
        assert_eq!(ErApiSource::parse_body(body).unwrap(), 25_450.5);
    }

    #[test]
    fn missing_vnd_is_an_api_error() {
        let body = r#"{"rates":{"USD":1}}"#;
        let err = ErApiSource::parse_body(body).unwrap_err();
        assert!(matches!(err, CoreError::Api { ref provider, .. } if provider == "ExchangeRate-API"));
    }

    #[test]
    fn malformed_body_is_an_api_error() {
        assert!(matches!(
            ErApiSource::parse_body("<html>"),
            Err(CoreError::Api { .. })
        ));
    }

    #[test]
    fn feeds_usd_field() {
        let source = ErApiSource::default();
        assert_eq!(source.fields(), vec![RateField::UsdLocal]);
        assert_eq!(source.name(), "ExchangeRate-API");
    }
}

// ═══════════════════════════════════════════════════════════════════
// gold-api.com
// ═══════════════════════════════════════════════════════════════════

mod gold_api {
    use super::*;

    #[test]
    fn parses_price() {
        let body = r#"{"name":"Gold","price":2651.3,"symbol":"XAU","updatedAt":"2024-11-01T00:00:00Z"}"#;
        assert_eq!(GoldApiSource::parse_body(body).unwrap(), 2_651.3);
    }

    #[test]
    fn missing_price_is_an_error() {
        assert!(GoldApiSource::parse_body(r#"{"name":"Gold"}"#).is_err());
    }

    #[test]
    fn symbol_to_field() {
        assert_eq!(GoldApiSource::resolve_field("XAU").unwrap(), RateField::GoldUsd);
        assert_eq!(GoldApiSource::resolve_field("xag").unwrap(), RateField::SilverUsd);
        assert!(GoldApiSource::resolve_field("XPT").is_err());
    }

    #[test]
    fn url_joins_base_and_symbol() {
        let source = GoldApiSource::gold("https://api.gold-api.com/price/", Duration::from_secs(5));
        assert_eq!(source.url(), "https://api.gold-api.com/price/XAU");

        let source = GoldApiSource::silver("https://api.gold-api.com/price", Duration::from_secs(5));
        assert_eq!(source.url(), "https://api.gold-api.com/price/XAG");
        assert_eq!(source.fields(), vec![RateField::SilverUsd]);
    }

    #[test]
    fn new_normalizes_symbol() {
        let source = GoldApiSource::new("https://x", " xau ", Duration::from_secs(1)).unwrap();
        assert_eq!(source.fields(), vec![RateField::GoldUsd]);
        assert_eq!(source.name(), "gold-api.com (XAU)");
        assert!(GoldApiSource::new("https://x", "BTC", Duration::from_secs(1)).is_err());
    }
}

// ═══════════════════════════════════════════════════════════════════
// vang.today
// ═══════════════════════════════════════════════════════════════════

mod vang_today {
    use super::*;

    #[test]
    fn converts_tael_price_to_chi() {
        let body = r#"{"type":"SJL1L10","buy":83000000,"sell":85000000}"#;
        assert_eq!(VangTodaySource::parse_body(body).unwrap(), 8_500_000.0);
    }

    #[test]
    fn missing_sell_is_an_error() {
        let err = VangTodaySource::parse_body(r#"{"buy":1}"#).unwrap_err();
        assert!(err.to_string().contains("vang.today"));
    }

    #[test]
    fn feeds_local_gold_field() {
        assert_eq!(VangTodaySource::default().fields(), vec![RateField::GoldLocal]);
    }
}

// ═══════════════════════════════════════════════════════════════════
// CoinGecko
// ═══════════════════════════════════════════════════════════════════

mod coingecko {
    use super::*;

    #[test]
    fn parses_btc_in_vnd() {
        let body = r#"{"bitcoin":{"vnd":2456789000}}"#;
        assert_eq!(CoinGeckoSource::parse_body(body).unwrap(), 2_456_789_000.0);
    }

    #[test]
    fn zero_price_is_rejected() {
        assert!(CoinGeckoSource::parse_body(r#"{"bitcoin":{}}"#).is_err());
        assert!(CoinGeckoSource::parse_body(r#"{"bitcoin":{"vnd":0}}"#).is_err());
    }

    #[test]
    fn missing_coin_is_rejected() {
        assert!(CoinGeckoSource::parse_body(r#"{}"#).is_err());
    }

    #[test]
    fn feeds_btc_field() {
        let source = CoinGeckoSource::default();
        assert_eq!(source.name(), "CoinGecko");
        assert_eq!(source.fields(), vec![RateField::BtcLocal]);
    }
}

// ═══════════════════════════════════════════════════════════════════
// RateSourceRegistry
// ═══════════════════════════════════════════════════════════════════

mod registry {
    use super::*;

    #[test]
    fn new_is_empty() {
        let registry = RateSourceRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.uncovered_fields().len(), 5);
    }

    #[test]
    fn keeps_registration_order() {
        let mut registry = RateSourceRegistry::default();
        registry.register(Box::new(MockSource::new("b", vec![RateField::GoldUsd])));
        registry.register(Box::new(MockSource::new("a", vec![RateField::UsdLocal])));

        let names: Vec<&str> = registry.sources().map(|s| s.name()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn sources_for_field() {
        let mut registry = RateSourceRegistry::new();
        registry.register(Box::new(MockSource::new("one", vec![RateField::GoldUsd])));
        registry.register(Box::new(MockSource::new(
            "two",
            vec![RateField::GoldUsd, RateField::SilverUsd],
        )));

        let names: Vec<&str> = registry
            .sources_for(RateField::GoldUsd)
            .iter()
            .map(|s| s.name())
            .collect();
        assert_eq!(names, vec!["one", "two"]);
        assert!(registry.sources_for(RateField::BtcLocal).is_empty());
    }

    #[test]
    fn defaults_cover_every_field() {
        let registry = RateSourceRegistry::new_with_defaults(&RateSettings::default());
        assert_eq!(registry.len(), 5);
        assert!(registry.uncovered_fields().is_empty());

        let first = registry.sources().next().unwrap();
        assert_eq!(first.fields(), vec![RateField::UsdLocal]);
    }

    #[tokio::test]
    async fn mock_source_fetch() {
        let source = MockSource::new("m", vec![RateField::BtcLocal]);
        let quotes = source.fetch().await.unwrap();
        assert_eq!(quotes, vec![RateQuote::new(RateField::BtcLocal, 1.0)]);
    }
}
