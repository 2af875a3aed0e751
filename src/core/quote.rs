//! Price sources and the samples they produce

use super::error::FetchError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use tokio_util::sync::CancellationToken;

/// Crypto leg of every quote.
pub const REFERENCE_ASSET: &str = "USDT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    Bitget,
    Binance,
    Quidax,
}

impl SourceId {
    pub const ALL: [SourceId; 3] = [SourceId::Bitget, SourceId::Binance, SourceId::Quidax];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Bitget => "bitget",
            SourceId::Binance => "binance",
            SourceId::Quidax => "quidax",
        }
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bitget" => Ok(SourceId::Bitget),
            "binance" => Ok(SourceId::Binance),
            "quidax" => Ok(SourceId::Quidax),
            _ => Err(anyhow::anyhow!("Unknown price source: {}", s)),
        }
    }
}

/// An external provider able to quote `currency` against [`REFERENCE_ASSET`].
///
/// Implementations make a single attempt per call. Retrying is left to the caller.
#[async_trait]
pub trait RateSource: Send + Sync {
    fn id(&self) -> SourceId;

    async fn fetch_rate(
        &self,
        currency: &str,
        cancel: &CancellationToken,
    ) -> Result<f64, FetchError>;
}

/// One sample obtained from a source.
#[derive(Debug)]
pub struct Quote {
    pub source: SourceId,
    pub outcome: Result<f64, FetchError>,
    pub fetched_at: DateTime<Utc>,
}

impl Quote {
    pub fn new(source: SourceId, outcome: Result<f64, FetchError>) -> Self {
        Self {
            source,
            outcome,
            fetched_at: Utc::now(),
        }
    }

    /// The usable price, `None` when the fetch failed.
    pub fn price(&self) -> Option<f64> {
        self.outcome.as_ref().ok().copied()
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.outcome.as_ref().err()
    }
}
