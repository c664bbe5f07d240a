//! In-memory fakes for the planner's capabilities and backend.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;
use trips::{Place, PlaceSearch, RouteRequest, RouteResult, VoiceParse};

use crate::api::{ApiError, TripApi};
use crate::capability::{
    CaptureError, RenderOptions, RouteError, RouteRenderer, RouteService, SpeechCapture, SpeechEvent,
};
use crate::view::PlaceMarker;

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

pub fn place(id: &str, rating: f64) -> Place {
    Place { place_id: id.into(), name: Some(format!("Place {id}")), rating: Some(rating), ..Place::default() }
}

// =============================================================================
// ROUTES
// =============================================================================

pub struct MockRoutes {
    pub requests: Mutex<Vec<RouteRequest>>,
    fail: AtomicBool,
    delay: Duration,
}

impl MockRoutes {
    pub fn ok() -> Self {
        Self { requests: Mutex::new(Vec::new()), fail: AtomicBool::new(false), delay: Duration::ZERO }
    }

    pub fn failing() -> Self {
        let routes = Self::ok();
        routes.set_failing(true);
        routes
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn delayed(delay: Duration) -> Self {
        Self { delay, ..Self::ok() }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl RouteService for MockRoutes {
    async fn compute_route(&self, request: &RouteRequest) -> Result<RouteResult, RouteError> {
        self.requests.lock().unwrap().push(request.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(RouteError::Status { status: "NOT_FOUND".into(), message: "no route".into() });
        }
        Ok(sample_route())
    }
}

// =============================================================================
// BACKEND
// =============================================================================

pub struct MockApi {
    pub parse_calls: AtomicUsize,
    pub commands: Mutex<Vec<String>>,
    pub search_queries: Mutex<Vec<String>>,
    parse_result: Result<VoiceParse, u16>,
    parse_delay: Duration,
    searches: Mutex<VecDeque<(Duration, Result<PlaceSearch, u16>)>>,
}

impl MockApi {
    pub fn parsing(parse: VoiceParse) -> Self {
        Self {
            parse_calls: AtomicUsize::new(0),
            commands: Mutex::new(Vec::new()),
            search_queries: Mutex::new(Vec::new()),
            parse_result: Ok(parse),
            parse_delay: Duration::ZERO,
            searches: Mutex::new(VecDeque::new()),
        }
    }

    pub fn failing_parse(status: u16) -> Self {
        Self { parse_result: Err(status), ..Self::parsing(VoiceParse::default()) }
    }

    #[must_use]
    pub fn with_parse_delay(mut self, delay: Duration) -> Self {
        self.parse_delay = delay;
        self
    }

    /// Queue a search response, served in order after `delay`.
    #[must_use]
    pub fn with_search(self, delay: Duration, result: Result<PlaceSearch, u16>) -> Self {
        self.searches.lock().unwrap().push_back((delay, result));
        self
    }

    pub fn parse_count(&self) -> usize {
        self.parse_calls.load(Ordering::SeqCst)
    }

    pub fn search_count(&self) -> usize {
        self.search_queries.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl TripApi for MockApi {
    async fn parse_voice_query(&self, command: &str) -> Result<VoiceParse, ApiError> {
        self.parse_calls.fetch_add(1, Ordering::SeqCst);
        self.commands.lock().unwrap().push(command.to_owned());
        if !self.parse_delay.is_zero() {
            tokio::time::sleep(self.parse_delay).await;
        }
        self.parse_result
            .clone()
            .map_err(|status| ApiError::Status { status, detail: "parser unavailable".into() })
    }

    async fn find_places_on_route(&self, query: &str, _route: &RouteResult) -> Result<PlaceSearch, ApiError> {
        self.search_queries.lock().unwrap().push(query.to_owned());
        let next = self.searches.lock().unwrap().pop_front();
        let (delay, result) = next.unwrap_or((Duration::ZERO, Ok(PlaceSearch::default())));
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        result.map_err(|status| ApiError::Status { status, detail: "search failed".into() })
    }
}

// =============================================================================
// SPEECH
// =============================================================================

pub struct MockSpeech {
    events: Option<Vec<SpeechEvent>>,
    pub stops: AtomicUsize,
}

impl MockSpeech {
    pub fn scripted(events: Vec<SpeechEvent>) -> Self {
        Self { events: Some(events), stops: AtomicUsize::new(0) }
    }

    pub fn unsupported() -> Self {
        Self { events: None, stops: AtomicUsize::new(0) }
    }
}

impl SpeechCapture for MockSpeech {
    fn start_capture(&self) -> Result<mpsc::Receiver<SpeechEvent>, CaptureError> {
        let Some(events) = &self.events else {
            return Err(CaptureError::Unsupported("no recognizer in test".into()));
        };
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            tx.try_send(event.clone()).unwrap();
        }
        Ok(rx)
    }

    fn stop_capture(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// RENDERER
// =============================================================================

#[derive(Default)]
pub struct MockRenderer {
    pub routes: Mutex<Vec<(RouteResult, RenderOptions)>>,
    pub markers: Mutex<Vec<PlaceMarker>>,
}

impl RouteRenderer for MockRenderer {
    fn render_route(&self, route: &RouteResult, options: &RenderOptions) {
        self.routes.lock().unwrap().push((route.clone(), *options));
    }

    fn render_markers(&self, markers: &[PlaceMarker]) {
        *self.markers.lock().unwrap() = markers.to_vec();
    }
}
