//! Exchange catalog and currency pair types

use derive_more::{Constructor, Display};
use itertools::Itertools;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One exchange from the provider's catalog
///
/// Immutable after the one-time catalog fetch at startup; used to filter
/// candidate exchanges by country and to rank by reported volume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeDescriptor {
    /// Provider-side exchange identifier (e.g. "binance_us")
    pub id: String,

    /// Human-readable exchange name
    pub name: String,

    /// Registration country as reported by the provider; not every exchange
    /// discloses one
    pub country: Option<String>,

    /// 24h traded volume denominated in BTC
    pub trade_volume_24h_btc: Option<Decimal>,
}

/// A base/target currency pair, exact-case as the analyst requested it
#[derive(Debug, Clone, PartialEq, Eq, Constructor, Display)]
#[display("{base}-{target}")]
pub struct CurrencyPair {
    pub base: String,
    pub target: String,
}

/// One asset from the provider's top-assets listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetDescriptor {
    pub id: String,
    pub symbol: String,
    pub name: String,
}

/// The exchange catalog, fetched once per monitoring run
#[derive(Debug, Clone, Default)]
pub struct ExchangeCatalog {
    exchanges: Vec<ExchangeDescriptor>,
}

impl ExchangeCatalog {
    /// Build a catalog sorted by 24h BTC volume, highest first.
    pub fn new(mut exchanges: Vec<ExchangeDescriptor>) -> Self {
        exchanges.sort_by(|a, b| {
            b.trade_volume_24h_btc
                .unwrap_or_default()
                .cmp(&a.trade_volume_24h_btc.unwrap_or_default())
        });
        Self { exchanges }
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    /// All exchanges, volume-ranked.
    pub fn iter(&self) -> impl Iterator<Item = &ExchangeDescriptor> {
        self.exchanges.iter()
    }

    /// Exchanges whose country matches `filter` (case-insensitive substring).
    ///
    /// Exchanges without a reported country never match.
    pub fn candidates(&self, filter: &str) -> Vec<&ExchangeDescriptor> {
        let needle = filter.to_lowercase();
        self.exchanges
            .iter()
            .filter(|e| {
                e.country
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Distinct country values present in the catalog, sorted.
    pub fn countries(&self) -> Vec<String> {
        self.exchanges
            .iter()
            .filter_map(|e| e.country.as_deref())
            .unique()
            .sorted()
            .map(String::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn descriptor(id: &str, country: Option<&str>, volume: Decimal) -> ExchangeDescriptor {
        ExchangeDescriptor {
            id: id.to_string(),
            name: id.to_uppercase(),
            country: country.map(String::from),
            trade_volume_24h_btc: Some(volume),
        }
    }

    #[test]
    fn catalog_ranks_by_volume_descending() {
        let catalog = ExchangeCatalog::new(vec![
            descriptor("small", Some("Japan"), dec!(10)),
            descriptor("big", Some("Japan"), dec!(5000)),
            descriptor("mid", Some("Japan"), dec!(700)),
        ]);

        let ids: Vec<&str> = catalog.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["big", "mid", "small"]);
    }

    #[test]
    fn candidate_filter_is_case_insensitive_substring() {
        let catalog = ExchangeCatalog::new(vec![
            descriptor("gemini", Some("United States"), dec!(100)),
            descriptor("kraken", Some("United States"), dec!(900)),
            descriptor("bitflyer", Some("Japan"), dec!(300)),
            descriptor("unknown", None, dec!(50)),
        ]);

        let ids: Vec<&str> = catalog
            .candidates("united")
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["kraken", "gemini"]);
    }

    #[test]
    fn countries_are_distinct_and_sorted() {
        let catalog = ExchangeCatalog::new(vec![
            descriptor("a", Some("Japan"), dec!(1)),
            descriptor("b", Some("Cayman Islands"), dec!(2)),
            descriptor("c", Some("Japan"), dec!(3)),
            descriptor("d", None, dec!(4)),
        ]);

        assert_eq!(catalog.countries(), vec!["Cayman Islands", "Japan"]);
    }

    #[test]
    fn pair_displays_as_base_dash_target() {
        let pair = CurrencyPair::new("BTC".to_string(), "USDT".to_string());
        assert_eq!(pair.to_string(), "BTC-USDT");
    }
}
