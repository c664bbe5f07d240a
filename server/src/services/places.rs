//! Place search along a planned route.
//!
//! DESIGN
//! ======
//! A search runs in four steps:
//!
//! 1. the model turns the free-form query into text-search keywords and an
//!    optional place type
//! 2. the route's first leg picks the search centre (start, destination or
//!    midpoint, depending on the query wording)
//! 3. the best-rated candidates are enriched with detail records
//! 4. the model ranks a few picks with a reason each
//!
//! Detail and ranking failures degrade the response instead of failing it:
//! a candidate falls back to its search-result fields and the picks fall
//! back to the best-rated candidates.

use std::fmt::Write as _;

use serde::Deserialize;
use tracing::{info, warn};
use trips::{FindPlacesRequest, OpeningHours, Place, PlaceSearch, RouteAnchor};

use crate::llm::{LlmChat, LlmError, complete_json};
use crate::maps::{MapsApi, MapsError, TextSearch};

pub const SEARCH_RADIUS_M: u32 = 10_000;
/// Candidates kept (by rating) before enrichment and ranking.
pub const CANDIDATE_LIMIT: usize = 10;
/// Picks used when the model cannot rank the candidates.
pub const FALLBACK_PICKS: usize = 3;

const ADDRESS_UNAVAILABLE: &str = "Address not available";

#[derive(Debug, thiserror::Error)]
pub enum PlacesError {
    #[error("keyword extraction failed: {0}")]
    Keywords(#[source] LlmError),
    #[error("Invalid route object supplied: {0}")]
    InvalidRoute(String),
    #[error("places search failed: {0}")]
    Search(#[from] MapsError),
}

#[derive(Debug, Deserialize)]
struct Keywords {
    #[serde(default)]
    search_query: Option<String>,
    #[serde(default)]
    place_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Ranking {
    #[serde(default)]
    recommendations: Vec<Pick>,
}

#[derive(Debug, Deserialize)]
struct Pick {
    place_index: usize,
    #[serde(default)]
    reason: Option<String>,
}

fn keywords_prompt(query: &str) -> String {
    format!(
        r#"You are a geospatial search assistant in a travel planning application.
A user asked: "{query}".
Extract concise keywords suitable for a Google Places text search and, if possible, a Google Places 'type' value.
Reply with JSON only:
{{"search_query": "<keywords>", "place_type": "<place type or empty string>"}}"#
    )
}

fn ranking_prompt(query: &str, candidates: &[Place]) -> String {
    let mut listing = String::new();
    for (i, place) in candidates.iter().enumerate() {
        let rating = place.rating.map_or_else(|| "N/A".to_owned(), |r| r.to_string());
        let reviews = place.user_ratings_total.map_or_else(|| "N/A".to_owned(), |n| n.to_string());
        let price = "$".repeat(usize::from(place.price_level.unwrap_or(0).max(1)));
        let types = place.types.iter().take(3).map(String::as_str).collect::<Vec<_>>().join(", ");
        let _ = writeln!(
            listing,
            "Place {i}: {} (Rating: {rating}, Reviews: {reviews}, Price: {price}, Types: {types}, Address: {})",
            place.name.as_deref().unwrap_or("Unknown"),
            place.address().unwrap_or("N/A"),
        );
    }
    format!(
        r#"You are a travel expert analyzing places for a user query: "{query}"

Candidate places:
{listing}
Select the 2-3 most suitable places, considering ratings, reviews, relevance to the query and overall quality.
Give a one or two sentence reason for each, and rank them best first.

Reply with JSON only:
{{"recommendations": [{{"place_index": 0, "reason": "..."}}]}}"#
    )
}

/// Picks when the model is unavailable: the first candidates, which are
/// already ordered by rating.
fn fallback_picks(candidates: &[Place]) -> Vec<Place> {
    candidates
        .iter()
        .take(FALLBACK_PICKS)
        .cloned()
        .map(|mut place| {
            let stars = place.rating.map_or_else(|| "N/A".to_owned(), |r| format!("{r:?}"));
            place.recommendation_reason = Some(format!("Highly rated with {stars} stars"));
            place
        })
        .collect()
}

pub struct PlaceFinder<'a> {
    llm: &'a dyn LlmChat,
    maps: &'a dyn MapsApi,
}

impl<'a> PlaceFinder<'a> {
    #[must_use]
    pub fn new(llm: &'a dyn LlmChat, maps: &'a dyn MapsApi) -> Self {
        Self { llm, maps }
    }

    /// Search for places matching `request.query` around the request's route.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::InvalidRoute`] when the route has no first leg.
    /// - [`PlacesError::Keywords`] when keyword extraction fails.
    /// - [`PlacesError::Search`] when the text search fails.
    pub async fn find_on_route(&self, request: &FindPlacesRequest) -> Result<PlaceSearch, PlacesError> {
        let (start, end) = request
            .route
            .first_leg_endpoints()
            .ok_or_else(|| PlacesError::InvalidRoute("route has no legs with start and end locations".into()))?;
        let anchor = RouteAnchor::for_query(&request.query);

        let keywords: Keywords =
            complete_json(self.llm, "", &keywords_prompt(&request.query)).await.map_err(PlacesError::Keywords)?;
        let search_query = keywords
            .search_query
            .filter(|q| !q.trim().is_empty())
            .unwrap_or_else(|| request.query.clone());

        let search = TextSearch::new(search_query, SEARCH_RADIUS_M)
            .near(anchor.pick(start, end))
            .of_type(keywords.place_type);
        let found = self.maps.text_search(&search).await?;
        info!(query = %search.query, anchor = anchor.as_str(), found = found.len(), "places: text search done");

        let mut candidates = Vec::new();
        for place in trips::top_rated(&found, CANDIDATE_LIMIT) {
            candidates.push(self.enrich(place).await);
        }
        let recommended_places = self.recommend(&request.query, &candidates).await;

        info!(total = candidates.len(), picks = recommended_places.len(), "places: search complete");
        Ok(PlaceSearch {
            query: Some(request.query.clone()),
            search_location_type: Some(anchor),
            total_found: candidates.len(),
            all_places: candidates,
            recommended_places,
        })
    }

    /// Detail record for a candidate, flattened for display. Falls back to
    /// the search-result fields when details cannot be fetched.
    async fn enrich(&self, place: Place) -> Place {
        match self.maps.place_details(&place.place_id).await {
            Ok(mut detail) => {
                detail.place_id = place.place_id;
                detail.photo_url = detail
                    .photos
                    .first()
                    .and_then(|p| p.photo_reference.as_deref())
                    .map(|r| self.maps.photo_url(r));
                detail.photos.clear();
                detail.opening_hours = detail.opening_hours.map(|h| OpeningHours::WeekdayText(h.weekday_text().to_vec()));
                detail
            }
            Err(e) => {
                warn!(error = %e, place_id = %place.place_id, "places: details failed, using search result");
                Place {
                    formatted_address: Some(place.address().unwrap_or(ADDRESS_UNAVAILABLE).to_owned()),
                    place_id: place.place_id,
                    name: place.name,
                    geometry: place.geometry,
                    rating: place.rating,
                    ..Place::default()
                }
            }
        }
    }

    /// Model-ranked picks with reasons. Out-of-range indexes are dropped.
    async fn recommend(&self, query: &str, candidates: &[Place]) -> Vec<Place> {
        if candidates.is_empty() {
            return Vec::new();
        }
        let ranking: Ranking = match complete_json(self.llm, "", &ranking_prompt(query, candidates)).await {
            Ok(ranking) => ranking,
            Err(e) => {
                warn!(error = %e, "places: ranking failed, using best rated");
                return fallback_picks(candidates);
            }
        };
        ranking
            .recommendations
            .into_iter()
            .filter_map(|pick| {
                let mut place = candidates.get(pick.place_index)?.clone();
                place.recommendation_reason = pick.reason;
                Some(place)
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "places_test.rs"]
mod tests;
