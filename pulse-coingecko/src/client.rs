//! CoinGecko API client
//!
//! Provides methods for the CoinGecko REST endpoints the monitor consumes.
//! All requests carry a bounded timeout so one stalled fetch cannot stall
//! an entire poll cycle.

use crate::types::{
    ExchangeRatesResponse, RawAsset, RawExchange, RawTicker, TickersResponse, VolumeChartPoint,
};
use pulse_core::{AssetDescriptor, ExchangeDescriptor, PulseError};
use reqwest::{Client, RequestBuilder};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Base URL for the CoinGecko public API
const COINGECKO_API_BASE: &str = "https://api.coingecko.com/api/v3";

/// Catalog page size; the API accepts between 1 and 250 results per page
const EXCHANGES_PER_PAGE: u32 = 250;

/// CoinGecko API client
#[derive(Clone)]
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinGeckoClient {
    /// Create a new client for unauthenticated public endpoints.
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: COINGECKO_API_BASE.to_string(),
            api_key: None,
        }
    }

    /// Create a client that sends a demo API key with every request.
    pub fn with_api_key(api_key: String) -> Self {
        let mut client = Self::new();
        client.api_key = Some(api_key);
        client
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get(&self, url: &str) -> RequestBuilder {
        let mut request = self.client.get(url).header("accept", "application/json");
        if let Some(ref key) = self.api_key {
            request = request.header("x-cg-demo-api-key", key.as_str());
        }
        request
    }

    /// Fetch the exchange catalog (first page, 250 entries).
    pub async fn exchanges(&self) -> Result<Vec<ExchangeDescriptor>, PulseError> {
        let url = format!(
            "{}/exchanges?per_page={}&page=1",
            self.base_url, EXCHANGES_PER_PAGE
        );

        debug!("Fetching exchange catalog from: {}", url);

        let response = self
            .get(&url)
            .send()
            .await
            .map_err(|e| PulseError::network(format!("Failed to fetch exchanges: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PulseError::api(format!(
                "CoinGecko API error ({}): {}",
                status, body
            )));
        }

        let raw: Vec<RawExchange> = response
            .json()
            .await
            .map_err(|e| PulseError::parse(format!("Failed to parse exchanges response: {}", e)))?;

        Ok(raw.into_iter().map(RawExchange::into_descriptor).collect())
    }

    /// Fetch all tickers currently listed on an exchange.
    pub async fn tickers(&self, exchange_id: &str) -> Result<Vec<RawTicker>, PulseError> {
        let url = format!("{}/exchanges/{}/tickers", self.base_url, exchange_id);

        debug!("Fetching tickers for exchange: {}", exchange_id);

        let response = self
            .get(&url)
            .send()
            .await
            .map_err(|e| PulseError::network(format!("Failed to fetch tickers: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PulseError::api(format!(
                "CoinGecko API error ({}): {}",
                status, body
            )));
        }

        let tickers: TickersResponse = response
            .json()
            .await
            .map_err(|e| PulseError::parse(format!("Failed to parse tickers response: {}", e)))?;

        Ok(tickers.tickers)
    }

    /// Fetch an exchange's daily volume history (BTC-denominated), oldest
    /// point first.
    pub async fn volume_chart(
        &self,
        exchange_id: &str,
        days: u32,
    ) -> Result<Vec<VolumeChartPoint>, PulseError> {
        let url = format!(
            "{}/exchanges/{}/volume_chart?days={}",
            self.base_url, exchange_id, days
        );

        debug!("Fetching {} day volume chart for: {}", days, exchange_id);

        let response = self
            .get(&url)
            .send()
            .await
            .map_err(|e| PulseError::network(format!("Failed to fetch volume chart: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PulseError::api(format!(
                "CoinGecko API error ({}): {}",
                status, body
            )));
        }

        response.json().await.map_err(|e| {
            PulseError::parse(format!("Failed to parse volume chart response: {}", e))
        })
    }

    /// Current BTC-to-currency conversion rate.
    ///
    /// The rates table is keyed by lowercased currency code.
    pub async fn currency_rate(&self, currency: &str) -> Result<Decimal, PulseError> {
        let url = format!("{}/exchange_rates", self.base_url);

        debug!("Fetching exchange rates for: {}", currency);

        let response = self
            .get(&url)
            .send()
            .await
            .map_err(|e| PulseError::network(format!("Failed to fetch exchange rates: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PulseError::api(format!(
                "CoinGecko API error ({}): {}",
                status, body
            )));
        }

        let rates: ExchangeRatesResponse = response.json().await.map_err(|e| {
            PulseError::parse(format!("Failed to parse exchange rates response: {}", e))
        })?;

        rates
            .rates
            .get(&currency.to_lowercase())
            .map(|rate| rate.value)
            .ok_or_else(|| {
                PulseError::not_found(format!("Currency not listed in exchange rates: {}", currency))
            })
    }

    /// Spot price of an asset in the quote currency.
    pub async fn spot_price(&self, asset: &str, quote: &str) -> Result<Decimal, PulseError> {
        let asset_id = asset.to_lowercase();
        let quote_key = quote.to_lowercase();
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies={}",
            self.base_url, asset_id, quote_key
        );

        debug!("Fetching {} spot price for: {}", quote_key, asset_id);

        let response = self
            .get(&url)
            .send()
            .await
            .map_err(|e| PulseError::network(format!("Failed to fetch spot price: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PulseError::api(format!(
                "CoinGecko API error ({}): {}",
                status, body
            )));
        }

        let prices: HashMap<String, HashMap<String, Decimal>> = response
            .json()
            .await
            .map_err(|e| PulseError::parse(format!("Failed to parse spot price response: {}", e)))?;

        prices
            .get(&asset_id)
            .and_then(|quotes| quotes.get(&quote_key))
            .copied()
            .ok_or_else(|| {
                PulseError::not_found(format!("No {} spot price for {}", quote, asset))
            })
    }

    /// Top assets by market capitalization.
    pub async fn top_assets(&self, limit: u32) -> Result<Vec<AssetDescriptor>, PulseError> {
        let url = format!(
            "{}/coins/markets?vs_currency=usd&order=market_cap_desc&per_page={}&page=1",
            self.base_url, limit
        );

        debug!("Fetching top {} assets by market cap", limit);

        let response = self
            .get(&url)
            .send()
            .await
            .map_err(|e| PulseError::network(format!("Failed to fetch top assets: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(PulseError::api(format!(
                "CoinGecko API error ({}): {}",
                status, body
            )));
        }

        let raw: Vec<RawAsset> = response
            .json()
            .await
            .map_err(|e| PulseError::parse(format!("Failed to parse top assets response: {}", e)))?;

        Ok(raw.into_iter().map(RawAsset::into_descriptor).collect())
    }
}

impl Default for CoinGeckoClient {
    fn default() -> Self {
        Self::new()
    }
}
