use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::USER_AGENT;
use reqwest::Client;
use tracing::debug;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the HTTP client shared by the whole run.
pub fn client() -> Result<Client> {
    Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}

/// GET a page and return its body. Each crawl stage passes its own browser
/// User-Agent. A non-2xx status is an error, not an empty body.
pub async fn fetch_html(client: &Client, url: &str, user_agent: &str) -> Result<String> {
    debug!("GET {}", url);
    let response = client
        .get(url)
        .header(USER_AGENT, user_agent)
        .send()
        .await
        .with_context(|| format!("Request failed: {}", url))?
        .error_for_status()
        .with_context(|| format!("Bad status from {}", url))?;

    let body = response
        .text()
        .await
        .with_context(|| format!("Failed to read body from {}", url))?;
    debug!("{} bytes from {}", body.len(), url);
    Ok(body)
}
