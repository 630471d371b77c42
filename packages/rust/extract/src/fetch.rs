//! HTTP fetch of the remote listings page.
//!
//! One invocation does at most one fetch. Transport failures and non-success
//! status codes are fatal for the update path; there is no retry policy.

use std::time::Duration;

use conftrack_shared::{ConftrackError, Result};
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

/// User-Agent string for listing requests.
const USER_AGENT: &str = concat!("conftrack/", env!("CARGO_PKG_VERSION"));

/// Fetch the listings document at `url` and return its body text.
pub async fn fetch_listing(url: &Url) -> Result<String> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(5))
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| ConftrackError::Network(format!("failed to build HTTP client: {e}")))?;

    info!(%url, "fetching conference listings");

    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| ConftrackError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ConftrackError::Network(format!("{url}: HTTP {status}")));
    }

    let body = response
        .text()
        .await
        .map_err(|e| ConftrackError::Network(format!("{url}: body read failed: {e}")))?;

    debug!(bytes = body.len(), "listing fetched");
    Ok(body)
}
