//! Aggregation engine
//!
//! Groups the accumulated observations by exchange and computes the
//! per-cycle summary rows, including each exchange's volume share against
//! its own trailing moving-average volume.

use std::sync::Arc;

use chrono::DateTime;
use itertools::izip;
use rust_decimal::Decimal;
use tracing::warn;

use pulse_core::{AggregateRow, Observation, PulseResult, VolumeSeriesPoint};

use crate::provider::MarketDataProvider;
use crate::rates::RateResolver;
use crate::store::ObservationStore;

/// Days of volume history fetched for the rolling baseline
pub const VOLUME_LOOKBACK_DAYS: u32 = 30;

/// Window, in daily points, of the trailing volume mean
pub const SMA_WINDOW: usize = 7;

/// Recomputes the per-exchange summary rows on every cycle
pub struct AggregationEngine {
    provider: Arc<dyn MarketDataProvider>,
    rates: RateResolver,
    lookback_days: u32,
    sma_window: usize,
}

impl AggregationEngine {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self {
            rates: RateResolver::new(Arc::clone(&provider)),
            provider,
            lookback_days: VOLUME_LOOKBACK_DAYS,
            sma_window: SMA_WINDOW,
        }
    }

    /// Compute one summary row per exchange present in the store.
    ///
    /// The volume side-query runs per exchange; when it fails or yields no
    /// usable baseline, that row's `volume_share_pct` stays unset and the
    /// pass continues. An empty store yields an empty row set.
    pub async fn aggregate(
        &self,
        store: &ObservationStore,
        base_currency: &str,
    ) -> Vec<AggregateRow> {
        let mut rows = Vec::new();

        for (exchange_id, observations) in store.by_exchange() {
            let Some(mut row) = summarize(exchange_id, &observations) else {
                continue;
            };

            match self.representative_volume(exchange_id, base_currency).await {
                Ok(Some(baseline)) if !baseline.is_zero() => {
                    row.volume_share_pct =
                        Some(row.last_volume_mean / baseline * Decimal::ONE_HUNDRED);
                }
                Ok(_) => {
                    warn!(
                        "No usable volume baseline for {}, leaving volume share unset",
                        exchange_id
                    );
                }
                Err(e) => {
                    warn!("Volume history lookup failed for {}: {}", exchange_id, e);
                }
            }

            rows.push(row);
        }

        rows
    }

    /// Fetch and convert one exchange's volume history, most recent first.
    pub async fn volume_series(
        &self,
        exchange_id: &str,
        base_currency: &str,
    ) -> PulseResult<Vec<VolumeSeriesPoint>> {
        let history = self
            .provider
            .volume_history(exchange_id, self.lookback_days)
            .await?;
        let rate = self.rates.resolve_or_unit(base_currency).await;

        let volumes: Vec<Decimal> = history.iter().map(|point| point.volume * rate).collect();
        let smas = rolling_mean(&volumes, self.sma_window);

        let mut series: Vec<VolumeSeriesPoint> = izip!(&history, volumes, smas)
            .map(|(point, volume, volume_sma)| VolumeSeriesPoint {
                date: DateTime::from_timestamp_millis(point.timestamp_ms)
                    .map(|dt| dt.date_naive())
                    .unwrap_or_default(),
                volume,
                volume_sma,
            })
            .collect();

        // The provider returns oldest-first; the baseline lookup and
        // presentation read the newest point at the front.
        series.reverse();
        Ok(series)
    }

    /// Most recent SMA value of the exchange's converted volume history.
    async fn representative_volume(
        &self,
        exchange_id: &str,
        base_currency: &str,
    ) -> PulseResult<Option<Decimal>> {
        let series = self.volume_series(exchange_id, base_currency).await?;
        Ok(series.first().and_then(|point| point.volume_sma))
    }
}

/// Plain summary statistics over one exchange's observations.
fn summarize(exchange_id: &str, observations: &[&Observation]) -> Option<AggregateRow> {
    let count = observations.len();
    let n = Decimal::from(count);

    let first = observations.iter().map(|o| o.trade_time).min()?;
    let last = observations.iter().map(|o| o.trade_time).max()?;

    let price_sum: Decimal = observations.iter().map(|o| o.last_price).sum();
    let volume_sum: Decimal = observations.iter().map(|o| o.last_volume).sum();
    let spread_sum: Decimal = observations.iter().map(|o| o.bid_ask_spread_pct).sum();

    Some(AggregateRow {
        exchange_id: exchange_id.to_string(),
        trade_time_first: first,
        trade_time_last: last,
        trade_time_span: last - first,
        last_price_mean: price_sum / n,
        last_volume_mean: volume_sum / n,
        spread_mean: spread_sum / n,
        num_observations: count,
        volume_share_pct: None,
    })
}

/// Trailing mean over `window` points.
///
/// Points with fewer than `window` predecessors carry no value, except
/// when the whole series is shorter than the window; then the mean
/// shrinks to however many points are available.
pub fn rolling_mean(values: &[Decimal], window: usize) -> Vec<Option<Decimal>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    let len = values.len();
    (0..len)
        .map(|i| {
            if i + 1 >= window {
                Some(mean(&values[i + 1 - window..=i]))
            } else if len < window {
                Some(mean(&values[..=i]))
            } else {
                None
            }
        })
        .collect()
}

fn mean(values: &[Decimal]) -> Decimal {
    values.iter().copied().sum::<Decimal>() / Decimal::from(values.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset};
    use rust_decimal_macros::dec;

    fn observation(exchange: &str, minute: u32, price: Decimal, volume: Decimal) -> Observation {
        let wire = format!("2024-03-30T14:{:02}:00+00:00", minute);
        Observation {
            exchange_id: exchange.to_string(),
            last_price: price,
            last_volume: volume,
            bid_ask_spread_pct: dec!(0.2),
            trade_time: DateTime::<FixedOffset>::parse_from_rfc3339(&wire).unwrap(),
        }
    }

    #[test]
    fn rolling_mean_with_full_window() {
        let values: Vec<Decimal> = (1..=9).map(Decimal::from).collect();
        let smas = rolling_mean(&values, 7);

        assert_eq!(smas.len(), 9);
        assert!(smas[..6].iter().all(Option::is_none));
        assert_eq!(smas[6], Some(dec!(4)));
        assert_eq!(smas[8], Some(dec!(6)));
    }

    #[test]
    fn rolling_mean_shrinks_on_short_series() {
        let values = vec![dec!(10), dec!(20), dec!(60)];
        let smas = rolling_mean(&values, 7);

        assert_eq!(smas, vec![Some(dec!(10)), Some(dec!(15)), Some(dec!(30))]);
    }

    #[test]
    fn rolling_mean_of_empty_series_is_empty() {
        assert!(rolling_mean(&[], 7).is_empty());
    }

    #[test]
    fn summarize_computes_means_and_span() {
        let a = observation("kraken", 0, dec!(100), dec!(10));
        let b = observation("kraken", 30, dec!(200), dec!(30));
        let row = summarize("kraken", &[&a, &b]).unwrap();

        assert_eq!(row.num_observations, 2);
        assert_eq!(row.last_price_mean, dec!(150));
        assert_eq!(row.last_volume_mean, dec!(20));
        assert_eq!(row.trade_time_span, chrono::Duration::minutes(30));
        assert_eq!(row.trade_time_first, a.trade_time);
        assert_eq!(row.trade_time_last, b.trade_time);
        assert_eq!(row.volume_share_pct, None);
    }

    #[test]
    fn summarize_of_empty_group_is_none() {
        assert!(summarize("kraken", &[]).is_none());
    }
}
