//! Google Maps web-service client (Geocoding, Places text search and details).

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use trips::{LatLng, Place};

use super::{GeocodeHit, MapsApi, MapsError, TextSearch};

pub const DEFAULT_MAPS_BASE_URL: &str = "https://maps.googleapis.com/maps/api";
const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;
const PHOTO_MAX_WIDTH: u32 = 400;

/// Fields requested from Place Details.
pub const DETAIL_FIELDS: &[&str] = &[
    "place_id",
    "name",
    "geometry",
    "rating",
    "user_ratings_total",
    "price_level",
    "opening_hours",
    "photos",
    "formatted_address",
    "formatted_phone_number",
    "website",
    "types",
];

pub struct GoogleMapsClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GoogleMapsClient {
    /// # Errors
    ///
    /// Returns [`MapsError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn new(api_key: String) -> Result<Self, MapsError> {
        Self::with_base_url(api_key, DEFAULT_MAPS_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`MapsError::HttpClientBuild`] if the HTTP client cannot be built.
    pub fn with_base_url(api_key: String, base_url: &str) -> Result<Self, MapsError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(std::time::Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| MapsError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key, base_url: base_url.trim_end_matches('/').to_string() })
    }

    async fn get(&self, path: &str, mut params: Vec<(&'static str, String)>) -> Result<Value, MapsError> {
        params.push(("key", self.api_key.clone()));
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| MapsError::Request(e.to_string()))?;
        let http_status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| MapsError::Parse(e.to_string()))?;
        let status = body.get("status").and_then(Value::as_str).unwrap_or_default();
        debug!(path, http_status = http_status.as_u16(), status, "maps: response");
        Ok(body)
    }
}

#[async_trait]
impl MapsApi for GoogleMapsClient {
    async fn geocode(&self, address: &str) -> Result<Vec<GeocodeHit>, MapsError> {
        let body = self.get("/geocode/json", vec![("address", address.to_owned())]).await?;
        parse_geocode(&body)
    }

    async fn text_search(&self, search: &TextSearch) -> Result<Vec<Place>, MapsError> {
        let body = self.get("/place/textsearch/json", text_search_params(search)).await?;
        parse_text_search(body)
    }

    async fn place_details(&self, place_id: &str) -> Result<Place, MapsError> {
        let params = vec![("place_id", place_id.to_owned()), ("fields", DETAIL_FIELDS.join(","))];
        let body = self.get("/place/details/json", params).await?;
        parse_details(body)
    }

    fn photo_url(&self, photo_reference: &str) -> String {
        format!(
            "{}/place/photo?maxwidth={PHOTO_MAX_WIDTH}&photoreference={photo_reference}&key={}",
            self.base_url, self.api_key
        )
    }
}

// =============================================================================
// REQUEST / RESPONSE
// =============================================================================

#[must_use]
pub fn text_search_params(search: &TextSearch) -> Vec<(&'static str, String)> {
    let mut params = vec![("query", search.query.clone()), ("radius", search.radius_m.to_string())];
    if let Some(location) = search.location {
        params.push(("location", location.to_param()));
    }
    if let Some(place_type) = &search.place_type {
        params.push(("type", place_type.clone()));
    }
    params
}

/// `OK` and `ZERO_RESULTS` are both successes; everything else is an error.
fn check_status(body: &Value) -> Result<bool, MapsError> {
    match body.get("status").and_then(Value::as_str) {
        Some("OK") => Ok(true),
        Some("ZERO_RESULTS") => Ok(false),
        Some(other) => Err(MapsError::Status {
            status: other.to_owned(),
            message: body
                .get("error_message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
        }),
        None => Err(MapsError::Parse("missing status".into())),
    }
}

pub(crate) fn parse_geocode(body: &Value) -> Result<Vec<GeocodeHit>, MapsError> {
    if !check_status(body)? {
        return Ok(Vec::new());
    }
    let hits = body
        .get("results")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
        .iter()
        .filter_map(|r| {
            let location = r.get("geometry")?.get("location")?;
            Some(GeocodeHit {
                formatted_address: r.get("formatted_address")?.as_str()?.to_owned(),
                location: LatLng::new(location.get("lat")?.as_f64()?, location.get("lng")?.as_f64()?),
            })
        })
        .collect();
    Ok(hits)
}

pub(crate) fn parse_text_search(mut body: Value) -> Result<Vec<Place>, MapsError> {
    if !check_status(&body)? {
        return Ok(Vec::new());
    }
    let results = body.get_mut("results").map(Value::take).unwrap_or(Value::Array(Vec::new()));
    serde_json::from_value(results).map_err(|e| MapsError::Parse(e.to_string()))
}

pub(crate) fn parse_details(mut body: Value) -> Result<Place, MapsError> {
    if !check_status(&body)? {
        return Err(MapsError::Status { status: "ZERO_RESULTS".into(), message: "place not found".into() });
    }
    let Some(result) = body.get_mut("result").map(Value::take) else {
        return Err(MapsError::Parse("details response without result".into()));
    };
    serde_json::from_value(result).map_err(|e| MapsError::Parse(e.to_string()))
}

#[cfg(test)]
#[path = "google_test.rs"]
mod tests;
