//! Accumulation store
//!
//! The ever-growing deduplicated set of observations collected across
//! polling cycles.

use std::collections::{BTreeMap, HashSet};

use pulse_core::Observation;

/// Append-only observation set with field-wise deduplication
///
/// Merging is a plain set union under [`Observation`]'s field-wise
/// identity: idempotent, commutative and associative, so a retried fetch
/// merged twice adds nothing. No record is ever removed during a run.
#[derive(Debug, Clone, Default)]
pub struct ObservationStore {
    observations: HashSet<Observation>,
}

impl ObservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union `incoming` into the store, returning how many were new.
    pub fn merge<I>(&mut self, incoming: I) -> usize
    where
        I: IntoIterator<Item = Observation>,
    {
        let mut added = 0;
        for observation in incoming {
            if self.observations.insert(observation) {
                added += 1;
            }
        }
        added
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }

    /// Observations grouped by exchange id, keyed in id order.
    pub fn by_exchange(&self) -> BTreeMap<&str, Vec<&Observation>> {
        let mut groups: BTreeMap<&str, Vec<&Observation>> = BTreeMap::new();
        for observation in &self.observations {
            groups
                .entry(observation.exchange_id.as_str())
                .or_default()
                .push(observation);
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset};
    use rust_decimal_macros::dec;

    fn observation(exchange: &str, minute: u32) -> Observation {
        let wire = format!("2024-03-30T14:{:02}:00+00:00", minute);
        Observation {
            exchange_id: exchange.to_string(),
            last_price: dec!(65000),
            last_volume: dec!(10.5),
            bid_ask_spread_pct: dec!(0.1),
            trade_time: DateTime::<FixedOffset>::parse_from_rfc3339(&wire).unwrap(),
        }
    }

    #[test]
    fn merge_is_idempotent() {
        let sample = vec![observation("kraken", 0), observation("gemini", 1)];

        let mut store = ObservationStore::new();
        assert_eq!(store.merge(sample.clone()), 2);
        assert_eq!(store.merge(sample), 0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn merge_is_commutative() {
        let a = vec![observation("kraken", 0), observation("kraken", 1)];
        let b = vec![observation("kraken", 1), observation("gemini", 2)];

        let mut ab = ObservationStore::new();
        ab.merge(a.clone());
        ab.merge(b.clone());

        let mut ba = ObservationStore::new();
        ba.merge(b);
        ba.merge(a);

        let collect = |store: &ObservationStore| {
            let mut all: Vec<Observation> = store.iter().cloned().collect();
            all.sort_by(|x, y| (&x.exchange_id, x.trade_time).cmp(&(&y.exchange_id, y.trade_time)));
            all
        };
        assert_eq!(collect(&ab), collect(&ba));
        assert_eq!(ab.len(), 3);
    }

    #[test]
    fn merge_is_associative() {
        let s = vec![observation("kraken", 0)];
        let a = vec![observation("kraken", 1)];
        let b = vec![observation("kraken", 1), observation("gemini", 2)];

        let mut left = ObservationStore::new();
        left.merge(s.clone());
        left.merge(a.clone());
        left.merge(b.clone());

        let mut right_inner = ObservationStore::new();
        right_inner.merge(a);
        right_inner.merge(b);
        let mut right = ObservationStore::new();
        right.merge(s);
        right.merge(right_inner.iter().cloned().collect::<Vec<_>>());

        assert_eq!(left.len(), right.len());
        assert_eq!(left.len(), 3);
    }

    #[test]
    fn near_identical_observations_are_distinct_records() {
        let mut store = ObservationStore::new();
        let base = observation("kraken", 0);
        let mut shifted = base.clone();
        shifted.last_price = dec!(65000.01);

        store.merge(vec![base, shifted]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn groups_are_keyed_by_exchange() {
        let mut store = ObservationStore::new();
        store.merge(vec![
            observation("kraken", 0),
            observation("kraken", 1),
            observation("gemini", 2),
        ]);

        let groups = store.by_exchange();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["kraken"].len(), 2);
        assert_eq!(groups["gemini"].len(), 1);
    }
}
