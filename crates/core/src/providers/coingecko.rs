use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::rates::{RateField, RateQuote};
use super::traits::RateSource;

pub const DEFAULT_URL: &str =
    "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin&vs_currencies=vnd";

const PROVIDER: &str = "CoinGecko";

/// CoinGecko provider for the Bitcoin price, quoted directly in VND.
///
/// - **Free**: No API key for `/simple/price`.
/// - CoinGecko rejects many requests from cloud hosts that carry no
///   browser User-Agent, so one is always sent.
pub struct CoinGeckoSource {
    client: Client,
    url: String,
}

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

impl CoinGeckoSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .user_agent(BROWSER_USER_AGENT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            url: url.into(),
        }
    }

    /// Extract the BTC price in VND. A zero price means the feed had no data.
    pub fn parse_body(body: &str) -> Result<f64, CoreError> {
        let resp: SimplePriceResponse = serde_json::from_str(body).map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse bitcoin price: {e}"),
        })?;
        if resp.bitcoin.vnd > 0.0 {
            Ok(resp.bitcoin.vnd)
        } else {
            Err(CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Unusable bitcoin price: {}", resp.bitcoin.vnd),
            })
        }
    }
}

impl Default for CoinGeckoSource {
    fn default() -> Self {
        Self::new(DEFAULT_URL, Duration::from_secs(5))
    }
}

// ── CoinGecko response types ────────────────────────────────────────

#[derive(Deserialize)]
struct SimplePriceResponse {
    bitcoin: CoinPrice,
}

#[derive(Deserialize)]
struct CoinPrice {
    #[serde(default)]
    vnd: f64,
}

#[async_trait]
impl RateSource for CoinGeckoSource {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn fields(&self) -> Vec<RateField> {
        vec![RateField::BtcLocal]
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

        let price = Self::parse_body(&body)?;
        Ok(vec![RateQuote::new(RateField::BtcLocal, price)])
    }
}
