//! CoinGecko API response types
//!
//! These types mirror the CoinGecko API responses and are converted to
//! pulse-core types before the rest of the monitor sees them.

use pulse_core::{AssetDescriptor, ExchangeDescriptor};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// One exchange from GET /exchanges
#[derive(Debug, Clone, Deserialize)]
pub struct RawExchange {
    pub id: String,
    pub name: String,

    /// Nullable on the wire; many smaller exchanges report no country
    #[serde(default)]
    pub country: Option<String>,

    #[serde(default)]
    pub trade_volume_24h_btc: Option<Decimal>,
}

impl RawExchange {
    pub fn into_descriptor(self) -> ExchangeDescriptor {
        ExchangeDescriptor {
            id: self.id,
            name: self.name,
            country: self.country,
            trade_volume_24h_btc: self.trade_volume_24h_btc,
        }
    }
}

/// Response from GET /exchanges/{id}/tickers
#[derive(Debug, Clone, Deserialize)]
pub struct TickersResponse {
    #[serde(default)]
    pub name: Option<String>,
    pub tickers: Vec<RawTicker>,
}

/// A single trading-pair ticker as reported by an exchange
///
/// Everything beyond the pair itself is optional on the wire; the
/// normalizer decides which missing fields make a record unusable.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTicker {
    /// Base currency code, in whatever case the exchange reports
    pub base: String,

    /// Target currency code
    pub target: String,

    /// Last traded price
    #[serde(default)]
    pub last: Option<Decimal>,

    /// Volume behind the last update
    #[serde(default)]
    pub volume: Option<Decimal>,

    /// Bid/ask spread as a percentage
    #[serde(default)]
    pub bid_ask_spread_percentage: Option<Decimal>,

    /// Trade timestamp, wire format `YYYY-MM-DDTHH:MM:SS+00:00` (UTC)
    #[serde(default)]
    pub last_traded_at: Option<String>,
}

/// One point from GET /exchanges/{id}/volume_chart
///
/// The wire shape is `[millis, "volume"]`: timestamps arrive as JSON
/// numbers (sometimes fractional), volumes as decimal strings.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeChartPoint {
    pub timestamp_ms: i64,

    /// Daily volume in BTC, the provider's native unit
    pub volume: Decimal,
}

impl<'de> Deserialize<'de> for VolumeChartPoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (timestamp, volume): (f64, Decimal) = Deserialize::deserialize(deserializer)?;
        Ok(VolumeChartPoint {
            timestamp_ms: timestamp as i64,
            volume,
        })
    }
}

/// Response from GET /exchange_rates
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeRatesResponse {
    /// BTC-relative rates keyed by lowercased currency code
    pub rates: HashMap<String, RateInfo>,
}

/// One BTC-relative rate entry
#[derive(Debug, Clone, Deserialize)]
pub struct RateInfo {
    pub name: String,
    pub unit: String,
    pub value: Decimal,
    #[serde(rename = "type")]
    pub kind: String,
}

/// One asset from GET /coins/markets
#[derive(Debug, Clone, Deserialize)]
pub struct RawAsset {
    pub id: String,
    pub symbol: String,
    pub name: String,
}

impl RawAsset {
    pub fn into_descriptor(self) -> AssetDescriptor {
        AssetDescriptor {
            id: self.id,
            symbol: self.symbol,
            name: self.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn volume_chart_point_parses_millis_and_string_volume() {
        let point: VolumeChartPoint =
            serde_json::from_str(r#"[1711843200000.0, "12345.678901"]"#).unwrap();
        assert_eq!(point.timestamp_ms, 1_711_843_200_000);
        assert_eq!(point.volume, dec!(12345.678901));
    }

    #[test]
    fn raw_exchange_tolerates_null_country() {
        let raw: RawExchange = serde_json::from_str(
            r#"{"id":"bitmart","name":"BitMart","country":null,"trade_volume_24h_btc":4321.5}"#,
        )
        .unwrap();
        assert_eq!(raw.country, None);
        assert_eq!(raw.trade_volume_24h_btc, Some(dec!(4321.5)));
    }

    #[test]
    fn ticker_missing_fields_deserialize_as_none() {
        let raw: RawTicker =
            serde_json::from_str(r#"{"base":"BTC","target":"USDT","last":65000.12}"#).unwrap();
        assert_eq!(raw.last, Some(dec!(65000.12)));
        assert_eq!(raw.volume, None);
        assert_eq!(raw.last_traded_at, None);
    }

    #[test]
    fn rate_entry_parses_type_field() {
        let response: ExchangeRatesResponse = serde_json::from_str(
            r#"{"rates":{"usd":{"name":"US Dollar","unit":"$","value":67234.21,"type":"fiat"}}}"#,
        )
        .unwrap();
        let usd = &response.rates["usd"];
        assert_eq!(usd.kind, "fiat");
        assert_eq!(usd.value, dec!(67234.21));
    }
}
