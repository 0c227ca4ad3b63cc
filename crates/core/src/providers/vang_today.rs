use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::rates::{RateField, RateQuote, CHI_PER_TAEL};
use super::traits::RateSource;

pub const DEFAULT_URL: &str = "https://www.vang.today/api/prices?type=SJL1L10";

const PROVIDER: &str = "vang.today";

/// vang.today provider for the local SJC gold bar price.
///
/// The feed quotes the sell price per lượng; the snapshot keeps the
/// price per chỉ, so the value is divided by 10.
pub struct VangTodaySource {
    client: Client,
    url: String,
}

impl VangTodaySource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            url: url.into(),
        }
    }

    /// Extract the per-chỉ sell price from a response body.
    pub fn parse_body(body: &str) -> Result<f64, CoreError> {
        let resp: PriceResponse = serde_json::from_str(body).map_err(|e| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("Failed to parse SJC price: {e}"),
        })?;
        Ok(resp.sell / CHI_PER_TAEL)
    }
}

impl Default for VangTodaySource {
    fn default() -> Self {
        Self::new(DEFAULT_URL, Duration::from_secs(5))
    }
}

#[derive(Deserialize)]
struct PriceResponse {
    sell: f64,
}

#[async_trait]
impl RateSource for VangTodaySource {
    fn name(&self) -> &str {
        PROVIDER
    }

    fn fields(&self) -> Vec<RateField> {
        vec![RateField::GoldLocal]
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

        let per_chi = Self::parse_body(&body)?;
        Ok(vec![RateQuote::new(RateField::GoldLocal, per_chi)])
    }
}
