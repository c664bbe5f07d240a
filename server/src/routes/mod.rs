//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The planner front-end calls two JSON endpoints from the browser, so the
//! router carries a CORS layer for the configured origins and an HTTP trace
//! layer for request logging.

pub mod api;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::state::AppState;

/// Full application router.
pub fn app(state: AppState, cors_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(%origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(api::root))
        .route("/healthz", get(api::healthz))
        .route("/api/parse-voice-query", post(api::parse_voice_query))
        .route("/api/find-places-on-route", post(api::find_places_on_route))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
