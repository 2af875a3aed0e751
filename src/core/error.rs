//! Error types for rate lookups

use super::quote::SourceId;
use reqwest::StatusCode;

/// Failure of a single source fetch. Never crosses the aggregator boundary.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP error: {0}")]
    Status(StatusCode),

    #[error("Failed to parse JSON response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Response contained no data")]
    EmptyData,

    #[error("Invalid price: {0:?}")]
    InvalidPrice(String),

    #[error("No parseable price in response")]
    NoParseablePrice,

    #[error("Source {0} is not configured")]
    NotConfigured(SourceId),

    #[error("Request cancelled")]
    Cancelled,
}

/// The only failure surfaced to callers of the aggregator.
#[derive(Debug, thiserror::Error)]
pub enum RateError {
    #[error("no valid rate available for currency {currency}")]
    NoValidRate { currency: String },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RoutingError {
    #[error("Route for {0} must list exactly two sources, got {1}")]
    WrongLength(String, usize),

    #[error("Route for {0} lists source {1} more than once")]
    DuplicateSource(String, SourceId),
}
