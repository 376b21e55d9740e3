use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue};
use serde::Serialize;

/// Build the shared outbound client.
///
/// `timeout` bounds the whole call, connect included.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .pool_max_idle_per_host(16)
        .connect_timeout(timeout.min(Duration::from_secs(5)))
        .timeout(timeout)
        .build()
}

/// Turn static header pairs into a [`HeaderMap`].
pub fn header_map(pairs: &[(&'static str, &str)]) -> Result<HeaderMap, InvalidHeaderValue> {
    let mut headers = HeaderMap::with_capacity(pairs.len());
    for &(name, value) in pairs {
        headers.insert(HeaderName::from_static(name), HeaderValue::from_str(value)?);
    }
    Ok(headers)
}

pub async fn post_json<T: Serialize>(
    client: &reqwest::Client,
    url: &str,
    headers: HeaderMap,
    payload: &T,
) -> Result<reqwest::Response, reqwest::Error> {
    client.post(url).headers(headers).json(payload).send().await
}

pub async fn get(
    client: &reqwest::Client,
    url: &str,
    headers: HeaderMap,
) -> Result<reqwest::Response, reqwest::Error> {
    client.get(url).headers(headers).send().await
}
