//! Trip planner JSON endpoints.
//!
//! Handlers decode the body, check that the upstream clients they need are
//! configured, and hand off to the services. Every failure, including a
//! body that does not decode, is answered as `{"detail": "..."}`.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::{Value, json};
use tracing::{error, warn};
use trips::{FindPlacesRequest, PlaceSearch, VoiceCommandRequest, VoiceParse};

use crate::llm::LlmChat;
use crate::maps::MapsApi;
use crate::services::places::{PlaceFinder, PlacesError};
use crate::services::voice::{VoiceError, VoiceResolver};
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{}", .0.body_text())]
    Body(#[from] JsonRejection),
    #[error("{0} not configured in environment")]
    NotConfigured(&'static str),
    #[error(transparent)]
    Voice(#[from] VoiceError),
    #[error(transparent)]
    Places(#[from] PlacesError),
}

pub(crate) fn api_error_to_status(err: &ApiError) -> StatusCode {
    match err {
        ApiError::Body(rejection) => rejection.status(),
        ApiError::NotConfigured(_) | ApiError::Voice(_) | ApiError::Places(PlacesError::Keywords(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        ApiError::Places(PlacesError::InvalidRoute(_)) => StatusCode::BAD_REQUEST,
        ApiError::Places(PlacesError::Search(_)) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = api_error_to_status(&self);
        if status.is_server_error() {
            error!(error = %self, status = status.as_u16(), "api: request failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "api: request rejected");
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

fn clients(state: &AppState) -> Result<(&dyn LlmChat, &dyn MapsApi), ApiError> {
    let llm = state.llm.as_deref().ok_or(ApiError::NotConfigured("LLM provider"))?;
    let maps = state.maps.as_deref().ok_or(ApiError::NotConfigured("GOOGLE_API_KEY"))?;
    Ok((llm, maps))
}

pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": "Trip Planner API",
        "version": env!("CARGO_PKG_VERSION"),
        "llm_configured": state.llm.is_some(),
        "maps_service": "Google Maps",
        "maps_configured": state.maps.is_some(),
    }))
}

pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// `POST /api/parse-voice-query`
pub async fn parse_voice_query(
    State(state): State<AppState>,
    body: Result<Json<VoiceCommandRequest>, JsonRejection>,
) -> Result<Json<VoiceParse>, ApiError> {
    let Json(body) = body?;
    let (llm, maps) = clients(&state)?;
    let parse = VoiceResolver::new(llm, maps).parse_command(&body.command).await?;
    Ok(Json(parse))
}

/// `POST /api/find-places-on-route`
pub async fn find_places_on_route(
    State(state): State<AppState>,
    body: Result<Json<FindPlacesRequest>, JsonRejection>,
) -> Result<Json<PlaceSearch>, ApiError> {
    let Json(body) = body?;
    let (llm, maps) = clients(&state)?;
    let search = PlaceFinder::new(llm, maps).find_on_route(&body).await?;
    Ok(Json(search))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
