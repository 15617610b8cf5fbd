//! Currency rate resolution
//!
//! Volume histories arrive denominated in BTC; this resolves the
//! multiplicative factor that converts them into the analyst's requested
//! currency.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use pulse_core::{PulseError, PulseResult};

use crate::provider::MarketDataProvider;

/// Unit the provider reports raw volumes in
pub const NATIVE_VOLUME_UNIT: &str = "BTC";

/// Resolves BTC-to-currency conversion factors with a spot-price fallback
#[derive(Clone)]
pub struct RateResolver {
    provider: Arc<dyn MarketDataProvider>,
}

impl RateResolver {
    pub fn new(provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { provider }
    }

    /// Conversion factor from 1 BTC of volume to `currency`.
    ///
    /// The native unit short-circuits to 1.0 without a lookup. Codes absent
    /// from the direct rate table fall back to a USD spot-price lookup, as
    /// if the code were itself a tradable asset.
    pub async fn resolve(&self, currency: &str) -> PulseResult<Decimal> {
        if currency == NATIVE_VOLUME_UNIT {
            return Ok(Decimal::ONE);
        }

        match self.provider.currency_rate(currency).await {
            Ok(rate) => Ok(rate),
            Err(e) => {
                debug!("No direct rate for {} ({}), trying spot price", currency, e);
                self.provider
                    .spot_price(currency, "usd")
                    .await
                    .map_err(|_| PulseError::RateUnavailable(currency.to_string()))
            }
        }
    }

    /// Like [`RateResolver::resolve`], degraded to a unit factor when no
    /// rate can be found.
    ///
    /// The degraded path leaves volumes in BTC and logs a warning; it is
    /// user-visible degraded output, not a failure.
    pub async fn resolve_or_unit(&self, currency: &str) -> Decimal {
        match self.resolve(currency).await {
            Ok(rate) => rate,
            Err(e) => {
                warn!("{}; volume will be reported in {}", e, NATIVE_VOLUME_UNIT);
                Decimal::ONE
            }
        }
    }
}
