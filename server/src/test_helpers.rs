//! Shared fakes for service and route tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use serde_json::json;
use trips::{LatLng, Place, RouteResult};

use crate::llm::{ChatResponse, LlmChat, LlmError, Message};
use crate::maps::{GeocodeHit, MapsApi, MapsError, TextSearch};

/// One-leg route from UC San Diego's east campus to Geisel Library.
pub fn sample_route() -> RouteResult {
    RouteResult(json!({
        "routes": [{
            "summary": "Gilman Dr",
            "legs": [{
                "start_location": { "lat": 32.8716, "lng": -117.2141 },
                "end_location": { "lat": 32.8801, "lng": -117.2359 }
            }]
        }]
    }))
}

/// A rated place whose name and address are both `label`.
pub fn place_at(id: &str, rating: f64, label: &str) -> Place {
    Place {
        place_id: id.into(),
        name: Some(label.into()),
        rating: Some(rating),
        formatted_address: Some(label.into()),
        ..Place::default()
    }
}

// =============================================================================
// MockLlm
// =============================================================================

/// Replays scripted text replies in order and records each user prompt.
/// Errors once the script runs out.
#[derive(Default)]
pub struct MockLlm {
    replies: Mutex<VecDeque<String>>,
    fail: bool,
    prompts: Mutex<Vec<String>>,
}

impl MockLlm {
    pub fn replying(replies: &[&str]) -> Self {
        Self { replies: Mutex::new(replies.iter().map(|r| (*r).to_owned()).collect()), ..Self::default() }
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmChat for MockLlm {
    async fn chat(&self, _max_tokens: u32, _system: &str, messages: &[Message]) -> Result<ChatResponse, LlmError> {
        if let Some(last) = messages.last() {
            self.prompts.lock().unwrap().push(last.content.clone());
        }
        if self.fail {
            return Err(LlmError::ApiResponse { status: 500, body: "upstream down".into() });
        }
        let text = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| LlmError::ApiRequest("no scripted reply".into()))?;
        Ok(ChatResponse { text, model: "mock".into(), stop_reason: "end_turn".into(), input_tokens: 1, output_tokens: 1 })
    }
}

// =============================================================================
// MockMaps
// =============================================================================

/// In-memory maps directory. Unknown lookups come back empty.
#[derive(Default)]
pub struct MockMaps {
    geocodes: HashMap<String, GeocodeHit>,
    results: HashMap<String, Vec<Place>>,
    details: HashMap<String, Place>,
    failing_search: bool,
    failing_details: HashSet<String>,
    searches: Mutex<Vec<TextSearch>>,
    geocoded: Mutex<Vec<String>>,
    detail_lookups: Mutex<Vec<String>>,
}

impl MockMaps {
    pub fn geocoding(mut self, address: &str, formatted: &str, location: LatLng) -> Self {
        self.geocodes.insert(address.into(), GeocodeHit { formatted_address: formatted.into(), location });
        self
    }

    pub fn searching(mut self, query: &str, places: Vec<Place>) -> Self {
        self.results.insert(query.into(), places);
        self
    }

    pub fn with_details(mut self, place: Place) -> Self {
        self.details.insert(place.place_id.clone(), place);
        self
    }

    pub fn failing_details_for(mut self, place_id: &str) -> Self {
        self.failing_details.insert(place_id.into());
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.failing_search = true;
        self
    }

    pub fn searches(&self) -> Vec<TextSearch> {
        self.searches.lock().unwrap().clone()
    }

    pub fn detail_lookups(&self) -> Vec<String> {
        self.detail_lookups.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.searches.lock().unwrap().len()
            + self.geocoded.lock().unwrap().len()
            + self.detail_lookups.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl MapsApi for MockMaps {
    async fn geocode(&self, address: &str) -> Result<Vec<GeocodeHit>, MapsError> {
        self.geocoded.lock().unwrap().push(address.into());
        Ok(self.geocodes.get(address).cloned().into_iter().collect())
    }

    async fn text_search(&self, search: &TextSearch) -> Result<Vec<Place>, MapsError> {
        self.searches.lock().unwrap().push(search.clone());
        if self.failing_search {
            return Err(MapsError::Status { status: "REQUEST_DENIED".into(), message: "key rejected".into() });
        }
        Ok(self.results.get(&search.query).cloned().unwrap_or_default())
    }

    async fn place_details(&self, place_id: &str) -> Result<Place, MapsError> {
        self.detail_lookups.lock().unwrap().push(place_id.into());
        if self.failing_details.contains(place_id) {
            return Err(MapsError::Request("connection reset".into()));
        }
        self.details
            .get(place_id)
            .cloned()
            .ok_or_else(|| MapsError::Status { status: "NOT_FOUND".into(), message: place_id.into() })
    }

    fn photo_url(&self, photo_reference: &str) -> String {
        format!("https://photos.test/{photo_reference}")
    }
}
