//! Polling and aggregation engine for the Exchange Pulse monitor
//!
//! This crate provides the monitor's working parts: the market data
//! provider abstraction, snapshot normalization, currency rate resolution,
//! the deduplicating accumulation store, the per-exchange aggregation
//! engine, and the polling scheduler that ties them together.

pub mod aggregation;
pub mod normalizer;
pub mod poller;
pub mod provider;
pub mod rates;
pub mod store;

pub use aggregation::{rolling_mean, AggregationEngine, SMA_WINDOW, VOLUME_LOOKBACK_DAYS};
pub use normalizer::SnapshotNormalizer;
pub use poller::{CyclePhase, CycleReport, MarketPoller, PollerConfig};
pub use provider::MarketDataProvider;
pub use rates::{RateResolver, NATIVE_VOLUME_UNIT};
pub use store::ObservationStore;
