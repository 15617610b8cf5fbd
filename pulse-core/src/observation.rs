//! Normalized ticker observations

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One normalized price/volume/spread snapshot for an exchange
///
/// Identity is full field-wise equality: two observations are the same
/// record iff every field matches exactly. `Eq` and `Hash` are derived so
/// the accumulation store deduplicates on plain set insertion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Observation {
    /// Exchange this snapshot was taken from
    pub exchange_id: String,

    /// Last traded price for the requested pair
    pub last_price: Decimal,

    /// Volume behind the last ticker update
    pub last_volume: Decimal,

    /// Bid/ask spread as a percentage
    pub bid_ask_spread_pct: Decimal,

    /// Trade timestamp, normalized into the configured reference zone
    pub trade_time: DateTime<FixedOffset>,
}
