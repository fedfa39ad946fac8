use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Result, WatchError};

pub fn create_client(config: &Config) -> Result<Client> {
    let client = ClientBuilder::new()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.request_timeout_seconds))
        .build()
        .map_err(|e| WatchError::Config(format!("failed to build HTTP client: {}", e)))?;

    Ok(client)
}

/// Single GET, no retry. Timeouts, connection failures and non-2xx
/// statuses all come back as `WatchError::Network`.
pub async fn fetch_page(client: &Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| WatchError::Network(format!("request to {} failed: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        warn!("HTTP error {}: {}", status, url);
        return Err(WatchError::Network(format!("HTTP error {} from {}", status, url)));
    }

    let body = response
        .text()
        .await
        .map_err(|e| WatchError::Network(format!("failed to read body from {}: {}", url, e)))?;

    debug!("Fetched {} bytes from {}", body.len(), url);
    Ok(body)
}
