//! Market data provider abstraction
//!
//! The scheduler and aggregation engine consume this trait rather than the
//! concrete HTTP client, so full poll cycles can run against an in-memory
//! provider in tests.

use async_trait::async_trait;
use pulse_coingecko::{CoinGeckoClient, RawTicker, VolumeChartPoint};
use pulse_core::{AssetDescriptor, ExchangeDescriptor, PulseResult};
use rust_decimal::Decimal;

/// Synchronous request/response market data source
///
/// Non-success responses surface as errors and are never retried here;
/// the caller decides whether a failure degrades the cycle or the row.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// The exchange catalog.
    async fn exchanges(&self) -> PulseResult<Vec<ExchangeDescriptor>>;

    /// All tickers currently listed on an exchange.
    async fn tickers(&self, exchange_id: &str) -> PulseResult<Vec<RawTicker>>;

    /// Daily volume history in the provider's native unit (BTC), oldest
    /// point first.
    async fn volume_history(
        &self,
        exchange_id: &str,
        days: u32,
    ) -> PulseResult<Vec<VolumeChartPoint>>;

    /// BTC-to-currency conversion rate.
    async fn currency_rate(&self, currency: &str) -> PulseResult<Decimal>;

    /// Spot price of an asset in the quote currency.
    async fn spot_price(&self, asset: &str, quote: &str) -> PulseResult<Decimal>;

    /// Top assets by market capitalization.
    async fn top_assets(&self, limit: u32) -> PulseResult<Vec<AssetDescriptor>>;
}

#[async_trait]
impl MarketDataProvider for CoinGeckoClient {
    async fn exchanges(&self) -> PulseResult<Vec<ExchangeDescriptor>> {
        CoinGeckoClient::exchanges(self).await
    }

    async fn tickers(&self, exchange_id: &str) -> PulseResult<Vec<RawTicker>> {
        CoinGeckoClient::tickers(self, exchange_id).await
    }

    async fn volume_history(
        &self,
        exchange_id: &str,
        days: u32,
    ) -> PulseResult<Vec<VolumeChartPoint>> {
        self.volume_chart(exchange_id, days).await
    }

    async fn currency_rate(&self, currency: &str) -> PulseResult<Decimal> {
        CoinGeckoClient::currency_rate(self, currency).await
    }

    async fn spot_price(&self, asset: &str, quote: &str) -> PulseResult<Decimal> {
        CoinGeckoClient::spot_price(self, asset, quote).await
    }

    async fn top_assets(&self, limit: u32) -> PulseResult<Vec<AssetDescriptor>> {
        CoinGeckoClient::top_assets(self, limit).await
    }
}
