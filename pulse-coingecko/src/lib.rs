//! CoinGecko integration for the Exchange Pulse monitor
//!
//! Implements the market data provider side of the monitor against the
//! CoinGecko REST API: exchange catalog, per-exchange tickers, daily
//! volume charts, BTC exchange rates and spot prices.

pub mod client;
pub mod types;

pub use client::CoinGeckoClient;
pub use types::{RawTicker, VolumeChartPoint};
