//! Currency to source routing

use super::error::RoutingError;
use super::quote::SourceId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Routing table as it appears in the config file.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RoutingConfig {
    #[serde(default = "default_route")]
    pub default: Vec<SourceId>,
    #[serde(default = "default_currency_routes")]
    pub currencies: BTreeMap<String, Vec<SourceId>>,
}

fn default_route() -> Vec<SourceId> {
    vec![SourceId::Binance, SourceId::Bitget]
}

fn default_currency_routes() -> BTreeMap<String, Vec<SourceId>> {
    BTreeMap::from([(
        "NGN".to_string(),
        vec![SourceId::Quidax, SourceId::Bitget],
    )])
}

impl Default for RoutingConfig {
    fn default() -> Self {
        RoutingConfig {
            default: default_route(),
            currencies: default_currency_routes(),
        }
    }
}

/// Number of sources queried per currency.
pub const ROUTE_LEN: usize = 2;

/// Decides which pair of sources to query for a currency.
///
/// Lookups never fail: currencies without an explicit route use the default one.
#[derive(Debug, Clone)]
pub struct RoutingPolicy {
    default: Vec<SourceId>,
    routes: BTreeMap<String, Vec<SourceId>>,
}

impl RoutingPolicy {
    pub fn new(
        default: Vec<SourceId>,
        routes: BTreeMap<String, Vec<SourceId>>,
    ) -> Result<Self, RoutingError> {
        validate_route("default", &default)?;

        let mut normalized = BTreeMap::new();
        for (currency, sources) in routes {
            let currency = currency.to_uppercase();
            validate_route(&currency, &sources)?;
            normalized.insert(currency, sources);
        }

        Ok(Self {
            default,
            routes: normalized,
        })
    }

    pub fn from_config(config: &RoutingConfig) -> Result<Self, RoutingError> {
        Self::new(config.default.clone(), config.currencies.clone())
    }

    pub fn route(&self, currency: &str) -> &[SourceId] {
        self.routes
            .get(&currency.to_uppercase())
            .unwrap_or(&self.default)
    }
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        RoutingPolicy {
            default: default_route(),
            routes: default_currency_routes(),
        }
    }
}

fn validate_route(name: &str, sources: &[SourceId]) -> Result<(), RoutingError> {
    if sources.len() != ROUTE_LEN {
        return Err(RoutingError::WrongLength(name.to_string(), sources.len()));
    }
    let mut seen = HashSet::new();
    for source in sources {
        if !seen.insert(*source) {
            return Err(RoutingError::DuplicateSource(name.to_string(), *source));
        }
    }
    Ok(())
}
