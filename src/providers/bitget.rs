use super::util::{get_json, parse_price};
use crate::core::{FetchError, REFERENCE_ASSET, RateSource, SourceId, median};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

const ADVERTISEMENT_LIMIT: &str = "20";

/// Quotes from Bitget's P2P advertisement book. The median over the listed
/// buy adverts smooths out a single outlier advert.
pub struct BitgetProvider {
    base_url: String,
    client: Client,
}

impl BitgetProvider {
    pub fn new(base_url: &str, client: Client) -> Self {
        BitgetProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AdvListResponse {
    #[serde(default)]
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Vec<Advertisement>,
}

#[derive(Debug, Deserialize)]
struct Advertisement {
    price: String,
    #[serde(default)]
    available: String,
}

#[async_trait]
impl RateSource for BitgetProvider {
    fn id(&self) -> SourceId {
        SourceId::Bitget
    }

    #[instrument(name = "BitgetRateFetch", skip(self, cancel), fields(currency = %currency))]
    async fn fetch_rate(
        &self,
        currency: &str,
        cancel: &CancellationToken,
    ) -> Result<f64, FetchError> {
        let url = format!("{}/api/v2/p2p/advList", self.base_url);
        let query = [
            ("fiat", currency),
            ("coin", REFERENCE_ASSET),
            ("side", "buy"),
            ("limit", ADVERTISEMENT_LIMIT),
        ];

        let response: AdvListResponse = get_json(&self.client, &url, &query, cancel).await?;
        if response.data.is_empty() {
            debug!(code = %response.code, msg = %response.msg, "Bitget returned no adverts");
            return Err(FetchError::EmptyData);
        }

        let prices: Vec<f64> = response
            .data
            .iter()
            .filter_map(|ad| match parse_price(&ad.price) {
                Ok(price) => Some(price),
                Err(e) => {
                    debug!(error = %e, available = %ad.available, "Skipping advert");
                    None
                }
            })
            .collect();

        if prices.is_empty() {
            return Err(FetchError::NoParseablePrice);
        }

        let rate = median(&prices);
        debug!(adverts = prices.len(), rate, "Bitget rate");
        Ok(rate)
    }
}
