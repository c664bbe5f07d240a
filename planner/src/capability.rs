//! Injected capabilities: speech capture, route computation, map drawing.
//!
//! Implementations wrap whatever the host environment provides (a browser
//! SDK, a web service, a terminal). Tests substitute in-memory fakes.

use tokio::sync::mpsc;
use trips::{RouteRequest, RouteResult};

use crate::controller::PanelLayout;
use crate::view::PlaceMarker;

// =============================================================================
// SPEECH
// =============================================================================

/// One recognition callback from a listening session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    /// Provisional text for the phrase currently being spoken.
    Interim(String),
    /// Text the recognizer will not revise further.
    Final(String),
    /// Recognition failed mid-session; the session is over.
    Error(String),
    /// The listening session ended normally.
    Ended,
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The environment has no speech recognition at all.
    #[error("speech recognition is not supported here: {0}")]
    Unsupported(String),
    /// Recognition exists but could not be started (permission, device busy).
    #[error("speech capture failed to start: {0}")]
    Start(String),
}

pub trait SpeechCapture: Send + Sync {
    /// Begin a listening session. Events arrive on the returned channel until
    /// [`SpeechEvent::Ended`] or [`SpeechEvent::Error`].
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::Unsupported`] when recognition is unavailable.
    fn start_capture(&self) -> Result<mpsc::Receiver<SpeechEvent>, CaptureError>;

    /// Ask the recognizer to stop; it still delivers [`SpeechEvent::Ended`].
    fn stop_capture(&self);
}

// =============================================================================
// ROUTING
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("directions request failed: {0}")]
    Request(String),
    #[error("directions service returned {status}: {message}")]
    Status { status: String, message: String },
    #[error("directions response parse failed: {0}")]
    Parse(String),
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

#[async_trait::async_trait]
pub trait RouteService: Send + Sync {
    /// Compute a route for the request.
    ///
    /// # Errors
    ///
    /// Returns a [`RouteError`] when the service is unreachable or finds no route.
    async fn compute_route(&self, request: &RouteRequest) -> Result<RouteResult, RouteError>;
}

// =============================================================================
// RENDERING
// =============================================================================

/// Presentation switches for the map surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub layout: PanelLayout,
    pub traffic_layer: bool,
    /// Hide the service's default A/B markers in favour of custom icons.
    pub suppress_default_markers: bool,
}

pub trait RouteRenderer: Send + Sync {
    fn render_route(&self, route: &RouteResult, options: &RenderOptions);

    /// Replace the place markers currently shown.
    fn render_markers(&self, markers: &[PlaceMarker]);
}
