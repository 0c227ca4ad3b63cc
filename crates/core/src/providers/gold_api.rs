use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::rates::{RateField, RateQuote};
use super::traits::RateSource;

pub const DEFAULT_BASE_URL: &str = "https://api.gold-api.com/price";

/// gold-api.com provider for world spot prices of precious metals.
///
/// - **Free**: No API key required.
/// - **Endpoint**: `/price/{symbol}` → `{"price": <USD per troy ounce>}`
/// - **Coverage**: one instance per metal, `XAU` (gold) or `XAG` (silver).
pub struct GoldApiSource {
    client: Client,
    base_url: String,
    symbol: String,
    field: RateField,
    name: String,
}

impl GoldApiSource {
    /// Source for a metal symbol. Only `XAU` and `XAG` feed the snapshot.
    pub fn new(
        base_url: impl Into<String>,
        symbol: &str,
        timeout: Duration,
    ) -> Result<Self, CoreError> {
        let symbol = symbol.trim().to_uppercase();
        let field = Self::resolve_field(&symbol)?;
        Ok(Self::build(base_url.into(), &symbol, field, timeout))
    }

    pub fn gold(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self::build(base_url.into(), "XAU", RateField::GoldUsd, timeout)
    }

    pub fn silver(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self::build(base_url.into(), "XAG", RateField::SilverUsd, timeout)
    }

    fn build(base_url: String, symbol: &str, field: RateField, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
            name: format!("gold-api.com ({symbol})"),
            symbol: symbol.to_string(),
            field,
        }
    }

    /// Map a metal symbol to the snapshot field it feeds.
    pub fn resolve_field(symbol: &str) -> Result<RateField, CoreError> {
        match symbol.to_uppercase().as_str() {
            "XAU" => Ok(RateField::GoldUsd),
            "XAG" => Ok(RateField::SilverUsd),
            other => Err(CoreError::Api {
                provider: "gold-api.com".into(),
                message: format!("Unknown metal symbol: {other}. Supported: XAU, XAG"),
            }),
        }
    }

    pub fn url(&self) -> String {
        format!("{}/{}", self.base_url, self.symbol)
    }

    /// Extract the USD price from a `/price/{symbol}` response body.
    pub fn parse_body(body: &str) -> Result<f64, CoreError> {
        let resp: PriceResponse = serde_json::from_str(body).map_err(|e| CoreError::Api {
            provider: "gold-api.com".into(),
            message: format!("Failed to parse price response: {e}"),
        })?;
        Ok(resp.price)
    }
}

// ── gold-api.com response types ─────────────────────────────────────

#[derive(Deserialize)]
struct PriceResponse {
    price: f64,
}

#[async_trait]
impl RateSource for GoldApiSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fields(&self) -> Vec<RateField> {
        vec![self.field]
    }

    async fn fetch(&self) -> Result<Vec<RateQuote>, CoreError> {
        let body = self
            .client
            .get(self.url())
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let price = Self::parse_body(&body)?;
        Ok(vec![RateQuote::new(self.field, price)])
    }
}
