//! Core types for the Exchange Pulse monitor
//!
//! This crate defines the shared data structures used across the monitor:
//! the exchange catalog, normalized ticker observations, and the
//! per-exchange aggregate rows recomputed on every poll cycle.

pub mod aggregate;
pub mod error;
pub mod exchange;
pub mod observation;

pub use aggregate::{AggregateRow, VolumeSeriesPoint};
pub use error::{PulseError, PulseResult};
pub use exchange::{AssetDescriptor, CurrencyPair, ExchangeCatalog, ExchangeDescriptor};
pub use observation::Observation;
