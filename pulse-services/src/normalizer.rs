//! Snapshot normalizer
//!
//! Converts one raw ticker fetch into a canonical [`Observation`] for the
//! accumulation store.

use chrono::{DateTime, FixedOffset};
use pulse_coingecko::RawTicker;
use pulse_core::{CurrencyPair, Observation, PulseError, PulseResult};

/// Wire format for ticker trade timestamps; the offset is always `+00:00`
const TRADE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Converts raw ticker records into canonical observations
///
/// Pair matching is exact and case-sensitive, mirroring the codes exactly
/// as exchanges report them. Known limitation: an exchange that lists the
/// pair in nonstandard case will never match.
#[derive(Debug, Clone)]
pub struct SnapshotNormalizer {
    local_zone: FixedOffset,
}

impl SnapshotNormalizer {
    /// Normalizer that converts trade times into the given reference zone.
    pub fn new(local_zone: FixedOffset) -> Self {
        Self { local_zone }
    }

    /// Normalize the ticker matching `pair` out of one exchange fetch.
    ///
    /// `NoMatchFound` and `MalformedRecord` are per-exchange, per-cycle
    /// skips; the caller logs them and carries on with the other
    /// candidates.
    pub fn normalize(
        &self,
        exchange_id: &str,
        tickers: &[RawTicker],
        pair: &CurrencyPair,
    ) -> PulseResult<Observation> {
        let ticker = tickers
            .iter()
            .find(|t| t.base == pair.base && t.target == pair.target)
            .ok_or_else(|| PulseError::NoMatchFound {
                exchange: exchange_id.to_string(),
                base: pair.base.clone(),
                target: pair.target.clone(),
            })?;

        let last_price = ticker
            .last
            .ok_or_else(|| PulseError::malformed(exchange_id, "missing last price"))?;
        let last_volume = ticker
            .volume
            .ok_or_else(|| PulseError::malformed(exchange_id, "missing volume"))?;
        let bid_ask_spread_pct = ticker
            .bid_ask_spread_percentage
            .ok_or_else(|| PulseError::malformed(exchange_id, "missing bid/ask spread"))?;
        let wire_time = ticker
            .last_traded_at
            .as_deref()
            .ok_or_else(|| PulseError::malformed(exchange_id, "missing trade timestamp"))?;

        let trade_time = self.convert_trade_time(wire_time).map_err(|e| {
            PulseError::malformed(exchange_id, format!("bad trade timestamp {}: {}", wire_time, e))
        })?;

        Ok(Observation {
            exchange_id: exchange_id.to_string(),
            last_price,
            last_volume,
            bid_ask_spread_pct,
            trade_time,
        })
    }

    /// Parse the UTC wire timestamp and shift it into the reference zone.
    fn convert_trade_time(&self, wire: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
        let parsed = DateTime::parse_from_str(wire, TRADE_TIME_FORMAT)?;
        Ok(parsed.with_timezone(&self.local_zone))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use rust_decimal_macros::dec;

    fn utc_normalizer() -> SnapshotNormalizer {
        SnapshotNormalizer::new(FixedOffset::east_opt(0).unwrap())
    }

    fn pair(base: &str, target: &str) -> CurrencyPair {
        CurrencyPair::new(base.to_string(), target.to_string())
    }

    fn full_ticker(base: &str, target: &str) -> RawTicker {
        RawTicker {
            base: base.to_string(),
            target: target.to_string(),
            last: Some(dec!(65123.45)),
            volume: Some(dec!(812.5)),
            bid_ask_spread_percentage: Some(dec!(0.12)),
            last_traded_at: Some("2024-03-30T14:05:21+00:00".to_string()),
        }
    }

    #[test]
    fn normalizes_the_matching_ticker() {
        let tickers = vec![full_ticker("ETH", "USDT"), full_ticker("BTC", "USDT")];

        let obs = utc_normalizer()
            .normalize("kraken", &tickers, &pair("BTC", "USDT"))
            .unwrap();

        assert_eq!(obs.exchange_id, "kraken");
        assert_eq!(obs.last_price, dec!(65123.45));
        assert_eq!(obs.last_volume, dec!(812.5));
        assert_eq!(obs.bid_ask_spread_pct, dec!(0.12));
    }

    #[test]
    fn pair_matching_is_case_sensitive() {
        let tickers = vec![full_ticker("btc", "usdt")];

        let err = utc_normalizer()
            .normalize("kraken", &tickers, &pair("BTC", "USDT"))
            .unwrap_err();

        assert!(matches!(err, PulseError::NoMatchFound { .. }));
    }

    #[test]
    fn missing_pair_reports_no_match() {
        let err = utc_normalizer()
            .normalize("gemini", &[], &pair("BTC", "USDT"))
            .unwrap_err();

        match err {
            PulseError::NoMatchFound { exchange, base, target } => {
                assert_eq!(exchange, "gemini");
                assert_eq!(base, "BTC");
                assert_eq!(target, "USDT");
            }
            other => panic!("expected NoMatchFound, got {:?}", other),
        }
    }

    #[test]
    fn missing_field_reports_malformed_record() {
        let mut ticker = full_ticker("BTC", "USDT");
        ticker.volume = None;

        let err = utc_normalizer()
            .normalize("kraken", &[ticker], &pair("BTC", "USDT"))
            .unwrap_err();

        assert!(matches!(err, PulseError::MalformedRecord { .. }));
    }

    #[test]
    fn unparseable_timestamp_reports_malformed_record() {
        let mut ticker = full_ticker("BTC", "USDT");
        ticker.last_traded_at = Some("yesterday-ish".to_string());

        let err = utc_normalizer()
            .normalize("kraken", &[ticker], &pair("BTC", "USDT"))
            .unwrap_err();

        assert!(matches!(err, PulseError::MalformedRecord { .. }));
    }

    #[test]
    fn trade_time_is_shifted_into_the_reference_zone() {
        let accra_plus_one = SnapshotNormalizer::new(FixedOffset::east_opt(3600).unwrap());
        let tickers = vec![full_ticker("BTC", "USDT")];

        let obs = accra_plus_one
            .normalize("kraken", &tickers, &pair("BTC", "USDT"))
            .unwrap();

        assert_eq!(obs.trade_time.hour(), 15);
        assert_eq!(obs.trade_time.offset().local_minus_utc(), 3600);
    }
}
