use crate::core::FetchError;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

const USER_AGENT: &str = "p2p-rates/0.1";

/// Builds the client shared by every source. `timeout` bounds each request
/// from connect until the body has been read.
pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}

/// Issues a single GET and decodes the JSON body into `T`.
///
/// Resolves with [`FetchError::Cancelled`] as soon as `cancel` fires; the
/// in-flight request is dropped.
pub async fn get_json<T>(
    client: &Client,
    url: &str,
    query: &[(&str, &str)],
    cancel: &CancellationToken,
) -> Result<T, FetchError>
where
    T: DeserializeOwned,
{
    let parsed = if query.is_empty() {
        Url::parse(url)
    } else {
        Url::parse_with_params(url, query)
    };
    let url = parsed.map_err(|_| FetchError::InvalidUrl(url.to_string()))?;

    debug!(%url, "Requesting rate data");

    let request = async {
        let response = client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }
        let text = response.text().await?;
        Ok::<T, FetchError>(serde_json::from_str(&text)?)
    };

    tokio::select! {
        _ = cancel.cancelled() => Err(FetchError::Cancelled),
        result = request => result,
    }
}

/// Parses a string-encoded price. Only positive finite values are accepted.
pub fn parse_price(raw: &str) -> Result<f64, FetchError> {
    match raw.trim().parse::<f64>() {
        Ok(price) if price.is_finite() && price > 0.0 => Ok(price),
        _ => Err(FetchError::InvalidPrice(raw.to_string())),
    }
}
