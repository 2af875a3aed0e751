use super::util::{get_json, parse_price};
use crate::core::{FetchError, REFERENCE_ASSET, RateSource, SourceId};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// Quotes from Binance's spot ticker for the `USDT{currency}` symbol.
pub struct BinanceProvider {
    base_url: String,
    client: Client,
}

impl BinanceProvider {
    pub fn new(base_url: &str, client: Client) -> Self {
        BinanceProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TickerPrice {
    #[serde(default)]
    symbol: String,
    price: String,
}

#[async_trait]
impl RateSource for BinanceProvider {
    fn id(&self) -> SourceId {
        SourceId::Binance
    }

    #[instrument(name = "BinanceRateFetch", skip(self, cancel), fields(currency = %currency))]
    async fn fetch_rate(
        &self,
        currency: &str,
        cancel: &CancellationToken,
    ) -> Result<f64, FetchError> {
        let url = format!("{}/api/v3/ticker/price", self.base_url);
        let symbol = format!("{REFERENCE_ASSET}{currency}");

        let ticker: TickerPrice =
            get_json(&self.client, &url, &[("symbol", symbol.as_str())], cancel).await?;
        let rate = parse_price(&ticker.price)?;

        debug!(symbol = %ticker.symbol, rate, "Binance rate");
        Ok(rate)
    }
}
