use super::util::{get_json, parse_price};
use crate::core::{FetchError, RateSource, SourceId};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

const MARKET_PREFIX: &str = "usd";

/// Quotes the last traded price of a Quidax market.
pub struct QuidaxProvider {
    base_url: String,
    client: Client,
}

impl QuidaxProvider {
    pub fn new(base_url: &str, client: Client) -> Self {
        QuidaxProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn market(currency: &str) -> String {
        format!("{MARKET_PREFIX}{}", currency.to_lowercase())
    }
}

#[derive(Debug, Deserialize)]
struct TickerResponse {
    data: TickerData,
}

#[derive(Debug, Deserialize)]
struct TickerData {
    last_price: String,
}

#[async_trait]
impl RateSource for QuidaxProvider {
    fn id(&self) -> SourceId {
        SourceId::Quidax
    }

    #[instrument(name = "QuidaxRateFetch", skip(self, cancel), fields(currency = %currency))]
    async fn fetch_rate(
        &self,
        currency: &str,
        cancel: &CancellationToken,
    ) -> Result<f64, FetchError> {
        let market = Self::market(currency);
        let url = format!("{}/api/v1/markets/tickers/{}", self.base_url, market);

        let ticker: TickerResponse = get_json(&self.client, &url, &[], cancel).await?;
        let rate = parse_price(&ticker.data.last_price)?;

        debug!(%market, rate, "Quidax rate");
        Ok(rate)
    }
}
