//! Place search along a route: request body and the normalized response.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Place, RouteAnchor, RouteResult, WireError, top_rated};

/// How many places are promoted to recommendations when the backend only
/// sends a flat list.
pub const LEGACY_RECOMMENDATION_COUNT: usize = 3;

/// Body of `POST /api/find-places-on-route`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FindPlacesRequest {
    pub query: String,
    pub route: RouteResult,
}

/// Canonical search response: every candidate plus the ranked picks.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceSearch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_location_type: Option<RouteAnchor>,
    #[serde(default)]
    pub all_places: Vec<Place>,
    /// Ranked best-first by the server.
    #[serde(default)]
    pub recommended_places: Vec<Place>,
    #[serde(default)]
    pub total_found: usize,
}

/// Recommended places and the remainder, with no place in both.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlaceTiers {
    pub recommended: Vec<Place>,
    pub remaining: Vec<Place>,
}

impl PlaceSearch {
    /// Normalize either response schema the search endpoint has produced.
    ///
    /// A flat array is the legacy schema: its recommendations are derived
    /// locally as the [`LEGACY_RECOMMENDATION_COUNT`] best-rated places.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::UnexpectedShape`] for anything that is neither a
    /// place array nor an object with `all_places`/`recommended_places`, and
    /// [`WireError::Json`] when a place record is malformed.
    pub fn from_wire(value: Value) -> Result<Self, WireError> {
        let structured = value
            .as_object()
            .is_some_and(|obj| obj.contains_key("all_places") || obj.contains_key("recommended_places"));
        match value {
            Value::Array(_) => {
                let places: Vec<Place> = serde_json::from_value(value)?;
                Ok(Self::from_flat(places))
            }
            Value::Object(_) if structured => {
                let mut search: Self = serde_json::from_value(value)?;
                if search.total_found == 0 {
                    search.total_found = search.all_places.len();
                }
                Ok(search)
            }
            other => Err(WireError::UnexpectedShape { what: "place search", detail: shape_of(&other).to_owned() }),
        }
    }

    fn from_flat(places: Vec<Place>) -> Self {
        let recommended_places = top_rated(&places, LEGACY_RECOMMENDATION_COUNT);
        Self { query: None, search_location_type: None, total_found: places.len(), all_places: places, recommended_places }
    }

    /// Split into the two display tiers.
    ///
    /// Recommended places keep server order and are de-duplicated by id. The
    /// remaining tier is `all_places` minus anything recommended, also
    /// de-duplicated, in original order. Places without an id are never
    /// treated as duplicates.
    #[must_use]
    pub fn tiers(&self) -> PlaceTiers {
        let mut seen: HashSet<String> = HashSet::new();
        let mut first_sighting = |p: &Place| p.place_id.is_empty() || seen.insert(p.place_id.clone());
        let recommended: Vec<Place> = self.recommended_places.iter().filter(|p| first_sighting(p)).cloned().collect();
        let remaining = self.all_places.iter().filter(|p| first_sighting(p)).cloned().collect();
        PlaceTiers { recommended, remaining }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all_places.is_empty() && self.recommended_places.is_empty()
    }
}

fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object without place lists",
    }
}

#[cfg(test)]
#[path = "search_test.rs"]
mod tests;
