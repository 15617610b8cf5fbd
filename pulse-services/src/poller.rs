//! Polling scheduler
//!
//! Drives the infinite collect → merge → aggregate → present cycle and
//! owns the accumulation store for the lifetime of a run.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use pulse_core::{
    AggregateRow, CurrencyPair, ExchangeCatalog, ExchangeDescriptor, PulseError, PulseResult,
};

use crate::aggregation::AggregationEngine;
use crate::normalizer::SnapshotNormalizer;
use crate::provider::MarketDataProvider;
use crate::store::ObservationStore;

/// Phases of one poll cycle
///
/// `Idle` only exists before the first pass; after that the scheduler
/// loops `Fetch → Merge → Aggregate → Present → Sleep` until cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    Fetch,
    Merge,
    Aggregate,
    Present,
    Sleep,
}

/// Configuration for the polling scheduler
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Currency pair fetched from every candidate exchange
    pub pair: CurrencyPair,

    /// Case-insensitive substring matched against exchange countries
    pub country: String,

    /// Fixed sleep between cycles
    pub poll_interval: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            pair: CurrencyPair::new("BTC".to_string(), "USDT".to_string()),
            country: "United States".to_string(),
            poll_interval: Duration::from_secs(60),
        }
    }
}

/// Everything one poll cycle produced
#[derive(Debug)]
pub struct CycleReport {
    /// Monotonic cycle counter, starting at 1
    pub cycle: u64,

    /// Candidate exchange ids after the country filter, volume-ranked
    pub candidates: Vec<String>,

    /// Exchanges skipped this cycle, with the reason
    pub skipped: Vec<(String, PulseError)>,

    /// Observations newly added by this cycle's merge
    pub merged_new: usize,

    /// Total store size after the merge
    pub store_size: usize,

    /// Aggregate rows over the full store
    pub rows: Vec<AggregateRow>,

    /// Distinct catalog countries, attached when the filter matched nothing
    pub available_countries: Option<Vec<String>>,
}

/// The polling scheduler: owns the store and drives the cycle loop
pub struct MarketPoller {
    provider: Arc<dyn MarketDataProvider>,
    normalizer: SnapshotNormalizer,
    engine: AggregationEngine,
    store: ObservationStore,
    catalog: ExchangeCatalog,
    config: PollerConfig,
    phase: CyclePhase,
    cycle: u64,
}

impl MarketPoller {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        normalizer: SnapshotNormalizer,
        config: PollerConfig,
    ) -> Self {
        Self {
            engine: AggregationEngine::new(Arc::clone(&provider)),
            provider,
            normalizer,
            store: ObservationStore::new(),
            catalog: ExchangeCatalog::default(),
            config,
            phase: CyclePhase::Idle,
            cycle: 0,
        }
    }

    /// The accumulated observations; never shrinks during a run.
    pub fn observations(&self) -> &ObservationStore {
        &self.store
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    /// Fetch the exchange catalog once; candidates are filtered from it on
    /// every cycle.
    pub async fn load_catalog(&mut self) -> PulseResult<()> {
        let exchanges = self.provider.exchanges().await?;
        info!("Loaded {} exchanges from provider catalog", exchanges.len());
        self.catalog = ExchangeCatalog::new(exchanges);
        Ok(())
    }

    /// Run one full fetch → merge → aggregate pass.
    ///
    /// Per-exchange failures become typed skips in the report; nothing
    /// short of cancellation stops the cycle.
    pub async fn run_cycle(&mut self) -> CycleReport {
        self.cycle += 1;
        self.enter(CyclePhase::Fetch);

        let candidates: Vec<ExchangeDescriptor> = self
            .catalog
            .candidates(&self.config.country)
            .into_iter()
            .cloned()
            .collect();

        if candidates.is_empty() {
            let countries = self.catalog.countries();
            warn!(
                "No exchanges match country filter {:?}; available countries: {}",
                self.config.country,
                countries.join(", ")
            );
            return CycleReport {
                cycle: self.cycle,
                candidates: Vec::new(),
                skipped: Vec::new(),
                merged_new: 0,
                store_size: self.store.len(),
                rows: Vec::new(),
                available_countries: Some(countries),
            };
        }

        let mut fresh = Vec::new();
        let mut skipped = Vec::new();

        for exchange in &candidates {
            match self.provider.tickers(&exchange.id).await {
                Ok(tickers) => {
                    match self
                        .normalizer
                        .normalize(&exchange.id, &tickers, &self.config.pair)
                    {
                        Ok(observation) => fresh.push(observation),
                        Err(e) => {
                            warn!("Skipping {} this cycle: {}", exchange.id, e);
                            skipped.push((exchange.id.clone(), e));
                        }
                    }
                }
                Err(e) => {
                    warn!("Ticker fetch failed for {}: {}", exchange.id, e);
                    skipped.push((exchange.id.clone(), e));
                }
            }
        }

        self.enter(CyclePhase::Merge);
        let merged_new = self.store.merge(fresh);
        debug!(
            "Merged {} new observations, store holds {}",
            merged_new,
            self.store.len()
        );

        self.enter(CyclePhase::Aggregate);
        let rows = self
            .engine
            .aggregate(&self.store, &self.config.pair.base)
            .await;

        self.enter(CyclePhase::Present);
        CycleReport {
            cycle: self.cycle,
            candidates: candidates.into_iter().map(|e| e.id).collect(),
            skipped,
            merged_new,
            store_size: self.store.len(),
            rows,
            available_countries: None,
        }
    }

    /// Run the poll loop until `shutdown` flips to true.
    ///
    /// One pass runs immediately at startup; after that cancellation is
    /// observed during the between-cycle sleep, never mid-fetch. Stopping
    /// discards no already-merged data.
    pub async fn run<F>(
        &mut self,
        mut shutdown: watch::Receiver<bool>,
        mut present: F,
    ) -> PulseResult<()>
    where
        F: FnMut(&CycleReport),
    {
        if self.catalog.is_empty() {
            self.load_catalog().await?;
        }

        info!(
            "Monitoring {} on exchanges matching {:?}, polling every {:?}",
            self.config.pair, self.config.country, self.config.poll_interval
        );

        loop {
            let report = self.run_cycle().await;
            present(&report);

            self.enter(CyclePhase::Sleep);
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Shutdown requested, stopping poll loop");
                        break;
                    }
                }
                _ = tokio::time::sleep(self.config.poll_interval) => {}
            }
        }

        Ok(())
    }

    fn enter(&mut self, phase: CyclePhase) {
        debug!("Cycle {}: entering {:?} phase", self.cycle, phase);
        self.phase = phase;
    }
}
