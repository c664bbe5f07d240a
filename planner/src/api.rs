//! HTTP adapter for the planner backend.
//!
//! Both endpoints have emitted more than one response schema over time;
//! normalization happens here (via `trips`) so the rest of the planner only
//! ever sees [`VoiceParse`] and [`PlaceSearch`].

use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use trips::{FindPlacesRequest, PlaceSearch, RouteResult, VoiceCommandRequest, VoiceParse, WireError};

use crate::config::HttpTimeouts;

pub const PARSE_VOICE_PATH: &str = "/api/parse-voice-query";
pub const FIND_PLACES_PATH: &str = "/api/find-places-on-route";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("server returned {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("response body is not JSON: {0}")]
    Decode(String),
    #[error(transparent)]
    Wire(#[from] WireError),
}

#[async_trait::async_trait]
pub trait TripApi: Send + Sync {
    /// Turn a free-text command into origin, destination and search query.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-2xx status or an
    /// unrecognized body.
    async fn parse_voice_query(&self, command: &str) -> Result<VoiceParse, ApiError>;

    /// Search for places matching `query` along `route`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] on transport failure, non-2xx status or an
    /// unrecognized body.
    async fn find_places_on_route(&self, query: &str, route: &RouteResult) -> Result<PlaceSearch, ApiError>;
}

pub struct HttpTripApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTripApi {
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeouts: HttpTimeouts) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeouts.request)
            .connect_timeout(timeouts.connect)
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json(&self, path: &str, body: &impl Serialize) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        debug!(%url, status = status.as_u16(), bytes = text.len(), "api: response");

        if !status.is_success() {
            return Err(ApiError::Status { status: status.as_u16(), detail: error_detail(&text) });
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait::async_trait]
impl TripApi for HttpTripApi {
    async fn parse_voice_query(&self, command: &str) -> Result<VoiceParse, ApiError> {
        let body = VoiceCommandRequest { command: command.to_owned() };
        let value = self.post_json(PARSE_VOICE_PATH, &body).await?;
        Ok(VoiceParse::from_wire(&value)?)
    }

    async fn find_places_on_route(&self, query: &str, route: &RouteResult) -> Result<PlaceSearch, ApiError> {
        let body = FindPlacesRequest { query: query.to_owned(), route: route.clone() };
        let value = self.post_json(FIND_PLACES_PATH, &body).await?;
        Ok(PlaceSearch::from_wire(value)?)
    }
}

/// Pull the `detail` message out of an error body, falling back to the raw text.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_else(|| body.trim().to_owned())
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
