//! Shared wire model for the trip planner.
//!
//! This crate owns the JSON shapes exchanged between the planner client and
//! the places/voice backend. Both endpoints have historically returned more
//! than one shape (flat place arrays, alternate key casings); those variants
//! are accepted here, at the boundary, and normalized into one canonical
//! type each so neither side has to care downstream.

pub mod place;
pub mod route;
pub mod search;
pub mod voice;

pub use place::{Geometry, LatLng, OpeningHours, Place, PlacePhoto, top_rated};
pub use route::{RouteAnchor, RouteEndpoint, RouteRequest, RouteResult, Waypoint};
pub use search::{FindPlacesRequest, LEGACY_RECOMMENDATION_COUNT, PlaceSearch, PlaceTiers};
pub use voice::{ResolutionMethod, VoiceCommandRequest, VoiceParse};

/// Error returned when a backend payload cannot be normalized.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The payload was valid JSON but not an object where one was required.
    #[error("expected a JSON object for {0}")]
    NotAnObject(&'static str),
    /// The payload matched none of the accepted shapes.
    #[error("unrecognized {what} payload: {detail}")]
    UnexpectedShape { what: &'static str, detail: String },
    /// A nested value failed to deserialize.
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}
