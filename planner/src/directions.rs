//! [`RouteService`] backed by the Google Directions web service.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};
use trips::{RouteRequest, RouteResult};

use crate::capability::{RouteError, RouteService};
use crate::config::HttpTimeouts;

pub const DIRECTIONS_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";

pub struct GoogleDirections {
    http: reqwest::Client,
    api_key: String,
    url: String,
}

impl GoogleDirections {
    /// # Errors
    ///
    /// Returns [`RouteError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn new(api_key: &str, timeouts: HttpTimeouts) -> Result<Self, RouteError> {
        Self::with_url(api_key, DIRECTIONS_URL, timeouts)
    }

    /// Point the service at a different endpoint (a proxy, or a fake in tests).
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn with_url(api_key: &str, url: &str, timeouts: HttpTimeouts) -> Result<Self, RouteError> {
        let http = reqwest::Client::builder()
            .timeout(timeouts.request)
            .connect_timeout(timeouts.connect)
            .build()
            .map_err(|e| RouteError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key: api_key.to_owned(), url: url.to_owned() })
    }
}

#[async_trait]
impl RouteService for GoogleDirections {
    async fn compute_route(&self, request: &RouteRequest) -> Result<RouteResult, RouteError> {
        let mut params = query_params(request);
        params.push(("key", self.api_key.clone()));

        let response = self
            .http
            .get(&self.url)
            .query(&params)
            .send()
            .await
            .map_err(|e| RouteError::Request(e.to_string()))?;
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| RouteError::Parse(e.to_string()))?;
        debug!(http_status = status.as_u16(), waypoints = request.waypoints.len(), "directions: response");

        parse_response(body)
    }
}

/// Query parameters for a request, without the credential.
#[must_use]
pub fn query_params(request: &RouteRequest) -> Vec<(&'static str, String)> {
    let mut params = vec![("origin", request.origin.to_param()), ("destination", request.destination.to_param())];
    if !request.waypoints.is_empty() {
        let stops = request.waypoints.iter().map(trips::Waypoint::to_param);
        let joined = if request.optimize_waypoints {
            std::iter::once("optimize:true".to_string()).chain(stops).collect::<Vec<_>>().join("|")
        } else {
            stops.collect::<Vec<_>>().join("|")
        };
        params.push(("waypoints", joined));
    }
    params
}

/// Accept an `OK` directions body; anything else becomes [`RouteError::Status`].
///
/// # Errors
///
/// Returns [`RouteError::Parse`] when the body has no `status`, and
/// [`RouteError::Status`] when the service found no route.
pub fn parse_response(body: Value) -> Result<RouteResult, RouteError> {
    let Some(status) = body.get("status").and_then(Value::as_str) else {
        return Err(RouteError::Parse("missing status".into()));
    };
    if status != "OK" {
        let message = body
            .get("error_message")
            .and_then(Value::as_str)
            .unwrap_or("no route found")
            .to_owned();
        warn!(status, %message, "directions: no route");
        return Err(RouteError::Status { status: status.to_owned(), message });
    }
    Ok(RouteResult(body))
}

#[cfg(test)]
#[path = "directions_test.rs"]
mod tests;
