use tracing::warn;

use crate::config::{upstream_connect_timeout, upstream_http_timeout};
use crate::error::FetchError;

/// Build the shared HTTP client with configured timeouts. Hosts embedding
/// the engine may pass their own client to the sources instead.
pub fn build_http_client() -> reqwest::Client {
    let request_timeout = upstream_http_timeout();
    let connect_timeout = upstream_connect_timeout();
    reqwest::Client::builder()
        .user_agent("atlas-engine/0.1")
        .timeout(request_timeout)
        .connect_timeout(connect_timeout)
        .build()
        .or_else(|e| {
            warn!(
                error = %e,
                "configured HTTP client failed to build, retrying without the user-agent"
            );
            reqwest::Client::builder()
                .timeout(request_timeout)
                .connect_timeout(connect_timeout)
                .build()
        })
        .unwrap_or_else(|e| {
            panic!("timeout-configured HTTP client failed to build: {e}");
        })
}

pub(crate) async fn fetch_text(
    client: &reqwest::Client,
    url: &str,
) -> Result<String, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }
    response
        .text()
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))
}

pub(crate) async fn fetch_bytes(
    client: &reqwest::Client,
    url: &str,
) -> Result<Vec<u8>, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }
    response
        .bytes()
        .await
        .map(|b| b.to_vec())
        .map_err(|e| FetchError::Transport(e.to_string()))
}
