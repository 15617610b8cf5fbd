//! Error types for the monitor

use thiserror::Error;

/// Monitor-wide error type
///
/// Everything except `Config` is recoverable at the cycle level: the
/// scheduler records the failure for the affected exchange and moves on.
#[derive(Error, Debug)]
pub enum PulseError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("No {base}-{target} ticker listed on {exchange}")]
    NoMatchFound {
        exchange: String,
        base: String,
        target: String,
    },

    #[error("Malformed ticker record on {exchange}: {detail}")]
    MalformedRecord { exchange: String, detail: String },

    #[error("No conversion rate available for {0}")]
    RateUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl PulseError {
    pub fn api(msg: impl Into<String>) -> Self {
        PulseError::Api(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        PulseError::Network(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        PulseError::Parse(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        PulseError::NotFound(msg.into())
    }

    pub fn malformed(exchange: impl Into<String>, detail: impl Into<String>) -> Self {
        PulseError::MalformedRecord {
            exchange: exchange.into(),
            detail: detail.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        PulseError::Config(msg.into())
    }
}

/// Result type alias for monitor operations
pub type PulseResult<T> = Result<T, PulseError>;
