//! HTTP download of remote CSV exports (e.g. the sample dataset).

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use crate::error::{ReportError, Result};

/// GETs `url` and returns the response body. Non-2xx statuses are errors.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let url = url
        .parse()
        .map_err(|_| ReportError::InvalidUrl(url.to_string()))?;
    let req = reqwest::Request::new(reqwest::Method::GET, url);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}
