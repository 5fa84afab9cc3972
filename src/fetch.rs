//! Shared HTTP plumbing.
//!
//! All network calls go through one [`reqwest::Client`] carrying a
//! browser-like User-Agent (several of the configured sources answer
//! differently to obvious bots) and a fixed per-request timeout. There are
//! no retries: a timed-out or failed call is caught by the caller and the
//! affected page simply contributes nothing to the run.

use std::error::Error;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fixed per-request timeout. A call that exceeds it fails; the failure is
/// handled locally by the caller.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the shared client used for the whole run.
pub fn client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
}

/// GET a URL and return its body as text.
///
/// Non-2xx statuses are errors; the body decodes per the response charset,
/// falling back to UTF-8.
pub async fn get_text(client: &Client, url: &str) -> Result<String, Box<dyn Error>> {
    let response = client.get(url).send().await?.error_for_status()?;
    let body = response.text().await?;
    debug!(%url, bytes = body.len(), "Fetched page");
    Ok(body)
}
