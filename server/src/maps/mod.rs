//! Maps: geocoding and place directory lookups.
//!
//! DESIGN
//! ======
//! Services depend on the [`MapsApi`] trait only. [`google::GoogleMapsClient`]
//! implements it over the Google Maps JSON web services; tests swap in an
//! in-memory fake.

pub mod google;

use trips::{LatLng, Place};

pub use google::GoogleMapsClient;

#[derive(Debug, thiserror::Error)]
pub enum MapsError {
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
    #[error("maps request failed: {0}")]
    Request(String),
    #[error("maps service returned {status}: {message}")]
    Status { status: String, message: String },
    #[error("maps response parse failed: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeHit {
    pub formatted_address: String,
    pub location: LatLng,
}

/// A free-text place search, optionally biased around a point.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSearch {
    pub query: String,
    pub location: Option<LatLng>,
    pub radius_m: u32,
    pub place_type: Option<String>,
}

impl TextSearch {
    #[must_use]
    pub fn new(query: impl Into<String>, radius_m: u32) -> Self {
        Self { query: query.into(), location: None, radius_m, place_type: None }
    }

    #[must_use]
    pub fn near(mut self, location: LatLng) -> Self {
        self.location = Some(location);
        self
    }

    #[must_use]
    pub fn of_type(mut self, place_type: Option<String>) -> Self {
        self.place_type = place_type.filter(|t| !t.trim().is_empty());
        self
    }
}

#[async_trait::async_trait]
pub trait MapsApi: Send + Sync {
    /// Geocode free text. An empty list means nothing matched.
    ///
    /// # Errors
    ///
    /// Returns a [`MapsError`] on transport failure or a rejected request.
    async fn geocode(&self, address: &str) -> Result<Vec<GeocodeHit>, MapsError>;

    /// Run a text search. An empty list means nothing matched.
    ///
    /// # Errors
    ///
    /// Returns a [`MapsError`] on transport failure or a rejected request.
    async fn text_search(&self, search: &TextSearch) -> Result<Vec<Place>, MapsError>;

    /// Fetch the detail record for one place.
    ///
    /// # Errors
    ///
    /// Returns a [`MapsError`] when the place cannot be fetched.
    async fn place_details(&self, place_id: &str) -> Result<Place, MapsError>;

    /// Public URL for a place photo reference.
    fn photo_url(&self, photo_reference: &str) -> String;
}
