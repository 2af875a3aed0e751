//! Consensus rate over the sources routed for a currency

use crate::core::config::AppConfig;
use crate::core::{
    FetchError, Quote, RateError, RateSource, RoutingPolicy, SourceId, median,
};
use crate::providers::{BinanceProvider, BitgetProvider, QuidaxProvider, util::build_client};
use anyhow::{Context, Result};
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

pub struct RateAggregator {
    sources: HashMap<SourceId, Arc<dyn RateSource>>,
    routing: RoutingPolicy,
}

impl RateAggregator {
    pub fn new(sources: Vec<Arc<dyn RateSource>>, routing: RoutingPolicy) -> Self {
        RateAggregator {
            sources: sources
                .into_iter()
                .map(|source| (source.id(), source))
                .collect(),
            routing,
        }
    }

    /// Builds the HTTP sources from `config`. All of them share one client.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;
        let client = build_client(config.timeout()).context("Failed to build HTTP client")?;
        let routing =
            RoutingPolicy::from_config(&config.routing).context("Invalid routing table")?;

        let sources: Vec<Arc<dyn RateSource>> = vec![
            Arc::new(BitgetProvider::new(
                config.providers.bitget_url(),
                client.clone(),
            )),
            Arc::new(BinanceProvider::new(
                config.providers.binance_url(),
                client.clone(),
            )),
            Arc::new(QuidaxProvider::new(config.providers.quidax_url(), client)),
        ];

        Ok(Self::new(sources, routing))
    }

    pub fn routing(&self) -> &RoutingPolicy {
        &self.routing
    }

    /// Queries every source routed for `currency` concurrently and returns
    /// one quote per source once all of them have settled.
    pub async fn fetch_quotes(&self, currency: &str, cancel: &CancellationToken) -> Vec<Quote> {
        let futures = self.routing.route(currency).iter().map(|id| async move {
            let outcome = match self.sources.get(id) {
                Some(source) => source.fetch_rate(currency, cancel).await,
                None => Err(FetchError::NotConfigured(*id)),
            };
            Quote::new(*id, outcome)
        });

        join_all(futures).await
    }

    /// Median of the successful quotes for `currency`.
    ///
    /// Per-source failures are logged and otherwise dropped; the call only
    /// fails when no source produced a price.
    #[instrument(name = "FetchRate", skip(self, cancel), fields(currency = %currency))]
    pub async fn fetch_rate(
        &self,
        currency: &str,
        cancel: &CancellationToken,
    ) -> Result<f64, RateError> {
        let quotes = self.fetch_quotes(currency, cancel).await;
        consensus(currency, &quotes)
    }
}

/// Combines settled quotes into one rate.
pub fn consensus(currency: &str, quotes: &[Quote]) -> Result<f64, RateError> {
    let candidates: Vec<f64> = quotes
        .iter()
        .filter_map(|quote| match &quote.outcome {
            Ok(price) => Some(*price),
            Err(e) => {
                warn!(source = %quote.source, error = %e, "Discarding failed quote");
                None
            }
        })
        .collect();

    if candidates.is_empty() {
        return Err(RateError::NoValidRate {
            currency: currency.to_string(),
        });
    }

    let rate = median(&candidates);
    debug!(samples = candidates.len(), rate, "Aggregated rate");
    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::BTreeMap;
    use std::sync::Mutex;
    use std::time::Duration;

    struct MockSource {
        id: SourceId,
        price: Option<f64>,
        delay: Duration,
        calls: Mutex<Vec<String>>,
    }

    impl MockSource {
        fn new(id: SourceId, price: Option<f64>) -> Arc<Self> {
            Self::with_delay(id, price, Duration::ZERO)
        }

        fn with_delay(id: SourceId, price: Option<f64>, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                id,
                price,
                delay,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RateSource for MockSource {
        fn id(&self) -> SourceId {
            self.id
        }

        async fn fetch_rate(
            &self,
            currency: &str,
            _cancel: &CancellationToken,
        ) -> Result<f64, FetchError> {
            self.calls.lock().unwrap().push(currency.to_string());
            tokio::time::sleep(self.delay).await;
            self.price.ok_or(FetchError::EmptyData)
        }
    }

    fn aggregator(sources: &[&Arc<MockSource>]) -> RateAggregator {
        let sources = sources
            .iter()
            .map(|s| Arc::clone(*s) as Arc<dyn RateSource>)
            .collect();
        RateAggregator::new(sources, RoutingPolicy::default())
    }

    #[tokio::test]
    async fn test_ngn_routes_to_quidax_and_bitget() {
        let bitget = MockSource::new(SourceId::Bitget, Some(745.0));
        let binance = MockSource::new(SourceId::Binance, Some(750.0));
        let quidax = MockSource::new(SourceId::Quidax, Some(755.0));
        let aggregator = aggregator(&[&bitget, &binance, &quidax]);

        let rate = aggregator
            .fetch_rate("NGN", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(rate, 750.0);
        assert_eq!(bitget.calls(), vec!["NGN"]);
        assert_eq!(quidax.calls(), vec!["NGN"]);
        assert!(binance.calls().is_empty());
    }

    #[tokio::test]
    async fn test_other_currencies_route_to_binance_and_bitget() {
        let bitget = MockSource::new(SourceId::Bitget, Some(145.5));
        let binance = MockSource::new(SourceId::Binance, Some(145.5));
        let quidax = MockSource::new(SourceId::Quidax, Some(1.0));
        let aggregator = aggregator(&[&bitget, &binance, &quidax]);

        for currency in ["KES", "GHS"] {
            aggregator
                .fetch_rate(currency, &CancellationToken::new())
                .await
                .unwrap();
        }

        assert_eq!(bitget.calls(), vec!["KES", "GHS"]);
        assert_eq!(binance.calls(), vec!["KES", "GHS"]);
        assert!(quidax.calls().is_empty());
    }

    #[tokio::test]
    async fn test_single_failure_is_tolerated() {
        let bitget = MockSource::new(SourceId::Bitget, None);
        let binance = MockSource::new(SourceId::Binance, Some(545.5));
        let aggregator = aggregator(&[&bitget, &binance]);

        let rate = aggregator
            .fetch_rate("GHS", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(rate, 545.5);
    }

    #[tokio::test]
    async fn test_total_failure_names_currency() {
        let bitget = MockSource::new(SourceId::Bitget, None);
        let binance = MockSource::new(SourceId::Binance, None);
        let aggregator = aggregator(&[&bitget, &binance]);

        let err = aggregator
            .fetch_rate("KES", &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "no valid rate available for currency KES");
    }

    #[tokio::test]
    async fn test_unregistered_source_counts_as_failure() {
        // Quidax is routed for NGN but never registered
        let bitget = MockSource::new(SourceId::Bitget, Some(745.0));
        let aggregator = aggregator(&[&bitget]);

        let quotes = aggregator
            .fetch_quotes("NGN", &CancellationToken::new())
            .await;
        assert_eq!(quotes.len(), 2);
        assert!(matches!(
            quotes[0].error(),
            Some(FetchError::NotConfigured(SourceId::Quidax))
        ));
        assert_eq!(quotes[1].price(), Some(745.0));

        let rate = aggregator
            .fetch_rate("NGN", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(rate, 745.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sources_are_queried_concurrently() {
        let delay = Duration::from_secs(2);
        let bitget = MockSource::with_delay(SourceId::Bitget, Some(145.0), delay);
        let binance = MockSource::with_delay(SourceId::Binance, Some(146.0), delay);
        let aggregator = aggregator(&[&bitget, &binance]);

        let started = tokio::time::Instant::now();
        let rate = aggregator
            .fetch_rate("KES", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(rate, 145.5);
        assert!(started.elapsed() < delay * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_slow_source() {
        let bitget = MockSource::with_delay(SourceId::Bitget, Some(100.0), Duration::ZERO);
        let binance =
            MockSource::with_delay(SourceId::Binance, Some(200.0), Duration::from_secs(5));
        let aggregator = aggregator(&[&bitget, &binance]);

        let rate = aggregator
            .fetch_rate("ZAR", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(rate, 150.0);
    }

    #[test]
    fn test_consensus_over_settled_quotes() {
        let quotes = vec![
            Quote::new(SourceId::Bitget, Ok(545.5)),
            Quote::new(SourceId::Binance, Err(FetchError::Cancelled)),
        ];
        assert_eq!(consensus("GHS", &quotes).unwrap(), 545.5);
        assert!(consensus("GHS", &[]).is_err());
    }

    #[test]
    fn test_custom_routing_is_honoured() {
        let routing = RoutingPolicy::new(
            vec![SourceId::Bitget, SourceId::Quidax],
            BTreeMap::from([(
                "UGX".to_string(),
                vec![SourceId::Quidax, SourceId::Binance],
            )]),
        )
        .unwrap();
        let aggregator = RateAggregator::new(Vec::new(), routing);
        assert_eq!(
            aggregator.routing().route("UGX"),
            &[SourceId::Quidax, SourceId::Binance]
        );
        assert_eq!(
            aggregator.routing().route("KES"),
            &[SourceId::Bitget, SourceId::Quidax]
        );
    }

    #[test]
    fn test_from_config_with_defaults() {
        let aggregator = RateAggregator::from_config(&AppConfig::default()).unwrap();
        assert_eq!(aggregator.sources.len(), 3);
        assert_eq!(
            aggregator.routing().route("NGN"),
            &[SourceId::Quidax, SourceId::Bitget]
        );
    }

    #[test]
    fn test_from_config_rejects_zero_timeout() {
        let config = AppConfig {
            timeout_secs: 0,
            ..AppConfig::default()
        };
        let err = RateAggregator::from_config(&config).err().unwrap();
        assert!(err.to_string().contains("timeout_secs"));
    }
}
