//! The trip controller: one object per map surface.
//!
//! DESIGN
//! ======
//! The controller owns the form, the UI status and the current
//! recommendations. Every user action is an async method that never fails
//! hard: problems land in [`UiStatus`] as an inline error or prompt.
//!
//! Searches are numbered. A search that finishes after a newer one was
//! issued is discarded, so the panel always reflects the latest request.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{info, warn};
use trips::Waypoint;

use crate::api::TripApi;
use crate::capability::{CaptureError, RenderOptions, RouteError, RouteRenderer, RouteService, SpeechCapture, SpeechEvent};
use crate::config::{DEFAULT_ROUTE_WAIT_MS, PlannerConfig};
use crate::route::{MIN_ENDPOINT_CHARS, RouteForm, RouteGate, RouteOutcome};
use crate::view::RecommendationView;
use crate::voice::{ResolutionNotice, Submission, VoiceIntake};

/// Shown when origin or destination is too short to route.
pub const SHORT_INPUT_PROMPT: &str = "Enter an origin and destination of at least 3 characters";

// =============================================================================
// CONFIG
// =============================================================================

/// Where the results panel sits relative to the map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PanelLayout {
    #[default]
    Sidebar,
    Overlay,
    Stacked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerConfig {
    pub layout: PanelLayout,
    pub traffic_layer: bool,
    pub optimize_waypoints: bool,
    pub suppress_default_markers: bool,
    /// How long a search may wait for a route before it is dropped.
    pub search_wait: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            layout: PanelLayout::Sidebar,
            traffic_layer: false,
            optimize_waypoints: false,
            suppress_default_markers: false,
            search_wait: Duration::from_millis(DEFAULT_ROUTE_WAIT_MS),
        }
    }
}

impl ControllerConfig {
    #[must_use]
    pub fn from_planner(config: &PlannerConfig) -> Self {
        Self { search_wait: config.route_wait, ..Self::default() }
    }

    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            layout: self.layout,
            traffic_layer: self.traffic_layer,
            suppress_default_markers: self.suppress_default_markers,
        }
    }
}

// =============================================================================
// STATUS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiStatus {
    pub listening: bool,
    pub loading_route: bool,
    pub searching: bool,
    /// Inline error from the last failed network operation.
    pub error: Option<String>,
    /// Input guidance, e.g. when the endpoints are too short.
    pub prompt: Option<String>,
    pub speech_available: bool,
    pub speech_message: Option<String>,
    pub resolution: Option<ResolutionNotice>,
}

impl Default for UiStatus {
    fn default() -> Self {
        Self {
            listening: false,
            loading_route: false,
            searching: false,
            error: None,
            prompt: None,
            speech_available: true,
            speech_message: None,
            resolution: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Shown(RecommendationView),
    /// No route appeared within the wait window.
    RouteTimedOut,
    /// A newer search was issued before this one finished.
    Superseded,
    Failed(String),
    /// Blank query; nothing was sent.
    Skipped,
}

// =============================================================================
// CONTROLLER
// =============================================================================

pub struct TripController {
    config: ControllerConfig,
    api: Arc<dyn TripApi>,
    speech: Arc<dyn SpeechCapture>,
    renderer: Arc<dyn RouteRenderer>,
    gate: RouteGate,
    intake: VoiceIntake,
    form: Mutex<RouteForm>,
    status: Mutex<UiStatus>,
    view: Mutex<RecommendationView>,
    search_generation: AtomicU64,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TripController {
    #[must_use]
    pub fn new(
        config: ControllerConfig,
        api: Arc<dyn TripApi>,
        routes: Arc<dyn RouteService>,
        speech: Arc<dyn SpeechCapture>,
        renderer: Arc<dyn RouteRenderer>,
    ) -> Self {
        Self {
            config,
            intake: VoiceIntake::new(Arc::clone(&api)),
            api,
            speech,
            renderer,
            gate: RouteGate::new(routes),
            form: Mutex::new(RouteForm::default()),
            status: Mutex::new(UiStatus::default()),
            view: Mutex::new(RecommendationView::default()),
            search_generation: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    #[must_use]
    pub fn form(&self) -> RouteForm {
        lock(&self.form).clone()
    }

    #[must_use]
    pub fn status(&self) -> UiStatus {
        lock(&self.status).clone()
    }

    #[must_use]
    pub fn view(&self) -> RecommendationView {
        lock(&self.view).clone()
    }

    #[must_use]
    pub fn route_gate(&self) -> &RouteGate {
        &self.gate
    }

    pub fn set_origin(&self, origin: &str) {
        origin.clone_into(&mut lock(&self.form).origin);
    }

    pub fn set_destination(&self, destination: &str) {
        destination.clone_into(&mut lock(&self.form).destination);
    }

    pub fn set_semantic_query(&self, query: &str) {
        query.clone_into(&mut lock(&self.form).semantic_query);
    }

    pub fn add_waypoint(&self, waypoint: Waypoint) {
        lock(&self.form).waypoints.push(waypoint);
    }

    // -------------------------------------------------------------------------
    // Voice
    // -------------------------------------------------------------------------

    /// Run one listening session and submit what was heard.
    ///
    /// # Errors
    ///
    /// Returns the [`CaptureError`] when capture cannot start. Speech input is
    /// then marked unavailable in [`UiStatus`]; typed commands still work.
    pub async fn listen(&self) -> Result<Submission, CaptureError> {
        let mut events = match self.speech.start_capture() {
            Ok(rx) => rx,
            Err(e) => {
                warn!(error = %e, "controller: speech capture unavailable");
                let mut status = lock(&self.status);
                status.listening = false;
                status.speech_message = Some(e.to_string());
                if matches!(e, CaptureError::Unsupported(_)) {
                    status.speech_available = false;
                }
                return Err(e);
            }
        };
        lock(&self.status).listening = true;

        while let Some(event) = events.recv().await {
            self.intake.on_speech_event(&event);
            match event {
                SpeechEvent::Ended => break,
                SpeechEvent::Error(message) => {
                    lock(&self.status).speech_message = Some(format!("Speech recognition error: {message}"));
                    break;
                }
                SpeechEvent::Interim(_) | SpeechEvent::Final(_) => {}
            }
        }
        lock(&self.status).listening = false;

        let submission = self.intake.on_listening_ended().await;
        self.apply_submission(&submission);
        Ok(submission)
    }

    pub fn stop_listening(&self) {
        self.speech.stop_capture();
    }

    /// The command box lost focus with `text` in it.
    pub async fn submit_text(&self, text: &str) -> Submission {
        let submission = self.intake.on_text_blur(text).await;
        self.apply_submission(&submission);
        submission
    }

    fn apply_submission(&self, submission: &Submission) {
        match submission {
            Submission::Parsed { parse, .. } => {
                lock(&self.form).apply_parse(parse);
                lock(&self.status).resolution = ResolutionNotice::from_parse(parse);
            }
            Submission::Unparsed { utterance, .. } => {
                lock(&self.form).apply_unparsed(utterance);
                lock(&self.status).resolution = None;
            }
            Submission::Skipped(_) => {}
        }
    }

    // -------------------------------------------------------------------------
    // Route
    // -------------------------------------------------------------------------

    /// Compute and draw the route for the current form.
    ///
    /// # Errors
    ///
    /// Returns the [`RouteError`] after recording it as the inline error.
    pub async fn plan_route(&self) -> Result<RouteOutcome, RouteError> {
        let form = self.form();
        {
            let mut status = lock(&self.status);
            status.loading_route = true;
            status.error = None;
            status.prompt = None;
        }

        let result = self.gate.plan(&form, self.config.optimize_waypoints).await;

        {
            let mut status = lock(&self.status);
            status.loading_route = false;
            match &result {
                Ok(RouteOutcome::Planned(_)) => {}
                Ok(RouteOutcome::NotAttempted) => {
                    info!(min_chars = MIN_ENDPOINT_CHARS, "controller: route not attempted");
                    status.prompt = Some(SHORT_INPUT_PROMPT.to_string());
                }
                Err(e) => {
                    warn!(error = %e, "controller: route failed");
                    status.error = Some(e.to_string());
                }
            }
        }
        // Renderers may read controller state, so no lock is held here.
        if let Ok(RouteOutcome::Planned(route)) = &result {
            self.renderer.render_route(route, &self.config.render_options());
        }
        result
    }

    // -------------------------------------------------------------------------
    // Search
    // -------------------------------------------------------------------------

    /// Search along the route, waiting up to the configured window for one.
    pub async fn search(&self, query: &str) -> SearchOutcome {
        self.search_when_route_ready(query, self.config.search_wait).await
    }

    /// Search for `query` once a route exists, or drop the search when no
    /// route shows up within `wait`.
    pub async fn search_when_route_ready(&self, query: &str, wait: Duration) -> SearchOutcome {
        let query = query.trim();
        if query.is_empty() {
            return SearchOutcome::Skipped;
        }
        let generation = self.search_generation.fetch_add(1, Ordering::AcqRel) + 1;
        {
            let mut status = lock(&self.status);
            status.searching = true;
            status.error = None;
        }

        let Some(route) = self.gate.wait_for_route(wait).await else {
            if !self.is_current(generation) {
                return SearchOutcome::Superseded;
            }
            info!(generation, wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX), "controller: no route in time, search dropped");
            lock(&self.status).searching = false;
            return SearchOutcome::RouteTimedOut;
        };

        let result = self.api.find_places_on_route(query, &route).await;
        if !self.is_current(generation) {
            info!(generation, "controller: discarding superseded search");
            return SearchOutcome::Superseded;
        }

        match result {
            Ok(search) => {
                let view = RecommendationView::from_search(&search);
                info!(generation, places = view.markers.len(), picks = view.picks().count(), "controller: search shown");
                lock(&self.view).clone_from(&view);
                lock(&self.status).searching = false;
                self.renderer.render_markers(&view.markers);
                SearchOutcome::Shown(view)
            }
            Err(e) => {
                warn!(generation, error = %e, "controller: search failed");
                let message = e.to_string();
                let mut status = lock(&self.status);
                status.searching = false;
                status.error = Some(message.clone());
                SearchOutcome::Failed(message)
            }
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.search_generation.load(Ordering::Acquire) == generation
    }

    /// Plan the route, then search along it when the form carries a query.
    pub async fn plan_trip(&self) -> (Result<RouteOutcome, RouteError>, Option<SearchOutcome>) {
        let route = self.plan_route().await;
        let query = self.form().semantic_query;
        let search = match &route {
            Ok(RouteOutcome::Planned(_)) if !query.trim().is_empty() => Some(self.search(&query).await),
            _ => None,
        };
        (route, search)
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
