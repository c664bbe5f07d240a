//! Client-side trip planning: voice intake, route gating, and place search.
//!
//! DESIGN
//! ======
//! Everything that touches a device or a vendor SDK (speech recognition,
//! directions, map drawing) is reached through the traits in
//! [`capability`], and the planner backend through [`api::TripApi`]. The
//! [`controller::TripController`] wires them together and owns the only
//! mutable UI state. Searches wait on the route through a watch channel
//! instead of polling for it.

pub mod api;
pub mod capability;
pub mod config;
pub mod controller;
pub mod directions;
pub mod route;
pub mod view;
pub mod voice;

pub use api::{ApiError, HttpTripApi, TripApi};
pub use capability::{CaptureError, RenderOptions, RouteError, RouteRenderer, RouteService, SpeechCapture, SpeechEvent};
pub use config::PlannerConfig;
pub use controller::{ControllerConfig, PanelLayout, SearchOutcome, TripController, UiStatus};
pub use directions::GoogleDirections;
pub use route::{RouteForm, RouteGate, RouteOutcome};
pub use view::{MarkerStyle, PlaceMarker, RecommendationView};
pub use voice::{ResolutionNotice, SkipReason, Submission, VoiceIntake};

#[cfg(test)]
mod test_helpers;
