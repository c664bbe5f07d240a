//! Route queries and the opaque route result.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::LatLng;

const PLACE_ID_PREFIX: &str = "place_id:";

/// A stopover inserted between origin and destination.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
    #[serde(default)]
    pub place_id: Option<String>,
}

impl Waypoint {
    #[must_use]
    pub fn location(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    /// Directions parameter for this stop. Place ids are preferred over
    /// coordinates because they snap to the entrance of the venue.
    #[must_use]
    pub fn to_param(&self) -> String {
        match self.place_id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => format!("{PLACE_ID_PREFIX}{id}"),
            None => self.location().to_param(),
        }
    }
}

/// Origin or destination: free text to be geocoded, or a directory id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RouteEndpoint {
    Text(String),
    PlaceId(String),
}

impl RouteEndpoint {
    /// Interpret user input; `place_id:<id>` selects an id, anything else is text.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.strip_prefix(PLACE_ID_PREFIX) {
            Some(id) => Self::PlaceId(id.trim().to_owned()),
            None => Self::Text(trimmed.to_owned()),
        }
    }

    #[must_use]
    pub fn to_param(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::PlaceId(id) => format!("{PLACE_ID_PREFIX}{id}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RouteRequest {
    pub origin: RouteEndpoint,
    pub destination: RouteEndpoint,
    pub waypoints: Vec<Waypoint>,
    /// Ask the directions service to reorder waypoints.
    pub optimize_waypoints: bool,
}

/// Directions result. Kept opaque; only the first route's leg boundaries
/// are ever read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteResult(pub Value);

impl RouteResult {
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    fn legs(&self) -> &[Value] {
        self.0
            .get("routes")
            .and_then(Value::as_array)
            .and_then(|routes| routes.first())
            .and_then(|route| route.get("legs"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Start and end coordinates of every leg of the first route.
    #[must_use]
    pub fn leg_boundaries(&self) -> Vec<(LatLng, LatLng)> {
        self.legs()
            .iter()
            .filter_map(|leg| Some((read_latlng(leg.get("start_location")?)?, read_latlng(leg.get("end_location")?)?)))
            .collect()
    }

    /// Boundaries of the first leg, if the result has one.
    #[must_use]
    pub fn first_leg_endpoints(&self) -> Option<(LatLng, LatLng)> {
        let leg = self.legs().first()?;
        Some((read_latlng(leg.get("start_location")?)?, read_latlng(leg.get("end_location")?)?))
    }

    /// Human-readable summary of the first route, when the service sent one.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.0
            .get("routes")
            .and_then(Value::as_array)
            .and_then(|routes| routes.first())
            .and_then(|route| route.get("summary"))
            .and_then(Value::as_str)
    }
}

fn read_latlng(value: &Value) -> Option<LatLng> {
    Some(LatLng::new(value.get("lat")?.as_f64()?, value.get("lng")?.as_f64()?))
}

/// Which point of a route a place search is centred on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteAnchor {
    Start,
    Destination,
    Midpoint,
}

const DESTINATION_PHRASES: &[&str] = &["near destination", "at destination", "destination area", "end of trip"];
const START_PHRASES: &[&str] = &["near start", "at start", "beginning", "start of trip", "departure"];

impl RouteAnchor {
    /// Pick the anchor named by the query; searches "along the way" use the midpoint.
    #[must_use]
    pub fn for_query(query: &str) -> Self {
        let lower = query.to_lowercase();
        if DESTINATION_PHRASES.iter().any(|p| lower.contains(p)) {
            Self::Destination
        } else if START_PHRASES.iter().any(|p| lower.contains(p)) {
            Self::Start
        } else {
            Self::Midpoint
        }
    }

    #[must_use]
    pub fn pick(self, start: LatLng, end: LatLng) -> LatLng {
        match self {
            Self::Start => start,
            Self::Destination => end,
            Self::Midpoint => start.midpoint(end),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Destination => "destination",
            Self::Midpoint => "midpoint",
        }
    }
}

#[cfg(test)]
#[path = "route_test.rs"]
mod tests;
