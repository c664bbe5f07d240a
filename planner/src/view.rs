//! Turning a place search into something drawable.

use trips::{Place, PlaceSearch, RouteAnchor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStyle {
    /// Recommended by the model; drawn highlighted with its reason.
    AiPick,
    Standard,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaceMarker {
    pub place: Place,
    pub style: MarkerStyle,
    pub reason: Option<String>,
}

impl PlaceMarker {
    fn new(place: &Place, style: MarkerStyle) -> Self {
        let reason = match style {
            MarkerStyle::AiPick => place.recommendation_reason.clone(),
            MarkerStyle::Standard => None,
        };
        Self { place: place.clone(), style, reason }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        self.place.name.as_deref().unwrap_or("Unnamed place")
    }
}

/// Recommended places first, then the rest, with no place listed twice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationView {
    pub query: Option<String>,
    pub anchor: Option<RouteAnchor>,
    pub markers: Vec<PlaceMarker>,
    pub total_found: usize,
}

impl RecommendationView {
    #[must_use]
    pub fn from_search(search: &PlaceSearch) -> Self {
        let tiers = search.tiers();
        let markers = tiers
            .recommended
            .iter()
            .map(|p| PlaceMarker::new(p, MarkerStyle::AiPick))
            .chain(tiers.remaining.iter().map(|p| PlaceMarker::new(p, MarkerStyle::Standard)))
            .collect();
        Self {
            query: search.query.clone(),
            anchor: search.search_location_type,
            markers,
            total_found: search.total_found,
        }
    }

    pub fn picks(&self) -> impl Iterator<Item = &PlaceMarker> {
        self.markers.iter().filter(|m| m.style == MarkerStyle::AiPick)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

#[cfg(test)]
#[path = "view_test.rs"]
mod tests;
