//! Per-exchange aggregate statistics

use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

/// One day of an exchange's converted volume history
///
/// Recomputed fresh on every aggregation pass, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeSeriesPoint {
    pub date: NaiveDate,

    /// Daily volume, scaled into the requested currency
    pub volume: Decimal,

    /// Trailing mean of `volume`; `None` while the window has not filled
    pub volume_sma: Option<Decimal>,
}

/// Summary statistics for one exchange, derived from the full accumulation
/// store plus a side query for the exchange's trailing volume history
#[derive(Debug, Clone)]
pub struct AggregateRow {
    pub exchange_id: String,

    /// Earliest trade time observed for this exchange
    pub trade_time_first: DateTime<FixedOffset>,

    /// Latest trade time observed for this exchange
    pub trade_time_last: DateTime<FixedOffset>,

    /// `trade_time_last - trade_time_first`
    pub trade_time_span: Duration,

    pub last_price_mean: Decimal,
    pub last_volume_mean: Decimal,
    pub spread_mean: Decimal,
    pub num_observations: usize,

    /// Mean observed volume as a percentage of the exchange's own trailing
    /// 30-day SMA volume; unset when the denominator could not be resolved
    pub volume_share_pct: Option<Decimal>,
}
