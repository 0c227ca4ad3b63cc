use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::rates::{RateField, RateQuote};
use super::traits::RateSource;

pub const DEFAULT_URL: &str = "https://open.er-api.com/v6/latest/USD";

const PROVIDER: &str = "ExchangeRate-API";

/// open.er-api.com provider for the USD → VND exchange rate.
///
/// - **Free**: No API key, daily-updated rates.
/// - **Endpoint**: `/v6/latest/USD` returns every rate against USD.
pub struct ErApiSource {
    client: Client,
    url: String,
}

impl ErApiSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            url: url.into(),
        }
    }

    /// Extract the VND rate from a `/latest/USD` response body.
    pub fn parse_body(body: &str) -> Result<f64, CoreError> {
        let resp: LatestResponse = serde_json::from_str(body).map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse latest rates: {e}"),
        })?;
        resp.rates.get("VND").copied().ok_or_else(|| CoreError::Api {
            provider: PROVIDER.into(),
            message: "No rate found for USD → VND".into(),
        })
    }
}

impl Default for ErApiSource {
    fn default() -> Self {
        Self::new(DEFAULT_URL, Duration::from_secs(5))
    }
}

// ── open.er-api.com response types ──────────────────────────────────

#[derive(Deserialize)]
struct LatestResponse {
    rates: HashMap<String, f64>,
}

#[async_trait]
impl RateSource for ErApiSource {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn fields(&self) -> Vec<RateField> {
        vec![RateField::UsdLocal]
    }

    async fn fetch(&self) -> Result<Vec<RateQuote>, CoreError> {
        let body = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let rate = Self::parse_body(&body)?;
        Ok(vec![RateQuote::new(RateField::UsdLocal, rate)])
    }
}
