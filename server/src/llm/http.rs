//! HTTP plumbing shared by the provider clients.

use serde::Serialize;
use tracing::debug;

use super::config::LlmTimeouts;
use super::types::LlmError;

pub(crate) fn client(timeouts: LlmTimeouts) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(timeouts.request)
        .connect_timeout(timeouts.connect)
        .build()
        .map_err(|e| LlmError::HttpClientBuild(e.to_string()))
}

/// POST `body` and return the raw reply text. Any status but 200 is an
/// [`LlmError::ApiResponse`] carrying the error body.
pub(crate) async fn post_json(request: reqwest::RequestBuilder, body: &impl Serialize) -> Result<String, LlmError> {
    let response = request
        .json(body)
        .send()
        .await
        .map_err(|e| LlmError::ApiRequest(e.to_string()))?;
    let status = response.status().as_u16();
    let text = response.text().await.map_err(|e| LlmError::ApiRequest(e.to_string()))?;
    debug!(status, bytes = text.len(), "llm: provider reply");
    if status == 200 { Ok(text) } else { Err(LlmError::ApiResponse { status, body: text }) }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
