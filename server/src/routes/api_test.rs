use std::sync::Arc;

use super::*;
use crate::services::places::PlacesError;
use crate::test_helpers::{MockLlm, MockMaps, place_at, sample_route};

async fn spawn(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = crate::routes::app(state, &["http://localhost:3000".to_string()]);
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{addr}")
}

fn state_with(llm: MockLlm, maps: MockMaps) -> AppState {
    AppState::new(Some(Arc::new(llm)), Some(Arc::new(maps)))
}

async fn post(base: &str, path: &str, body: Value) -> (StatusCode, Value) {
    let response = reqwest::Client::new().post(format!("{base}{path}")).json(&body).send().await.unwrap();
    let status = StatusCode::from_u16(response.status().as_u16()).unwrap();
    (status, response.json().await.unwrap())
}

// =============================================================================
// status mapping
// =============================================================================

#[test]
fn invalid_route_is_bad_request() {
    let err = ApiError::Places(PlacesError::InvalidRoute("no legs".into()));
    assert_eq!(api_error_to_status(&err), StatusCode::BAD_REQUEST);
}

#[test]
fn search_failure_is_bad_gateway() {
    let err = ApiError::Places(PlacesError::Search(crate::maps::MapsError::Request("reset".into())));
    assert_eq!(api_error_to_status(&err), StatusCode::BAD_GATEWAY);
}

#[test]
fn missing_credentials_is_server_error() {
    let err = ApiError::NotConfigured("GOOGLE_API_KEY");
    assert_eq!(api_error_to_status(&err), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.to_string(), "GOOGLE_API_KEY not configured in environment");
}

// =============================================================================
// endpoints
// =============================================================================

#[tokio::test]
async fn root_reports_configuration() {
    let base = spawn(AppState::default()).await;

    let body: Value = reqwest::get(format!("{base}/")).await.unwrap().json().await.unwrap();
    assert_eq!(body["message"], "Trip Planner API");
    assert_eq!(body["llm_configured"], false);

    let health = reqwest::get(format!("{base}/healthz")).await.unwrap();
    assert_eq!(health.status().as_u16(), 200);
}

#[tokio::test]
async fn voice_without_llm_is_500() {
    let base = spawn(AppState::default()).await;

    let (status, body) = post(&base, "/api/parse-voice-query", json!({ "command": "to the beach" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "LLM provider not configured in environment");
}

#[tokio::test]
async fn places_without_maps_key_is_500() {
    let state = AppState::new(Some(Arc::new(MockLlm::default())), None);
    let base = spawn(state).await;

    let (status, body) =
        post(&base, "/api/find-places-on-route", json!({ "query": "coffee", "route": sample_route() })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "GOOGLE_API_KEY not configured in environment");
}

#[tokio::test]
async fn voice_parse_uses_canonical_keys() {
    let llm = MockLlm::replying(&[r#"{"origin": "Price Center", "destination": "Geisel Library", "semantic_query": "tacos"}"#]);
    let base = spawn(state_with(llm, MockMaps::default())).await;

    let (status, body) =
        post(&base, "/api/parse-voice-query", json!({ "command": "price center to geisel, tacos" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "origin": "Price Center", "destination": "Geisel Library", "semanticQuery": "tacos", "resolved": false }));
}

#[tokio::test]
async fn voice_model_failure_is_500() {
    let base = spawn(state_with(MockLlm::failing(), MockMaps::default())).await;

    let (status, body) = post(&base, "/api/parse-voice-query", json!({ "command": "anything" })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().starts_with("Failed to parse voice command"));
}

#[tokio::test]
async fn places_search_response_shape() {
    let llm = MockLlm::replying(&[
        r#"{"search_query": "coffee shop", "place_type": "cafe"}"#,
        r#"{"recommendations": [{"place_index": 0, "reason": "Great espresso"}]}"#,
    ]);
    let maps = MockMaps::default()
        .searching("coffee shop", vec![place_at("a", 4.5, "Art of Espresso")])
        .with_details(place_at("a", 4.5, "Art of Espresso"));
    let base = spawn(state_with(llm, maps)).await;

    let (status, body) =
        post(&base, "/api/find-places-on-route", json!({ "query": "coffee", "route": sample_route() })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "coffee");
    assert_eq!(body["search_location_type"], "midpoint");
    assert_eq!(body["total_found"], 1);
    assert_eq!(body["all_places"][0]["place_id"], "a");
    assert_eq!(body["recommended_places"][0]["recommendation_reason"], "Great espresso");
}

#[tokio::test]
async fn places_invalid_route_is_400() {
    let base = spawn(state_with(MockLlm::default(), MockMaps::default())).await;

    let (status, body) =
        post(&base, "/api/find-places-on-route", json!({ "query": "coffee", "route": { "status": "OK" } })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().starts_with("Invalid route object supplied"));
}

#[tokio::test]
async fn malformed_body_is_answered_as_detail() {
    let base = spawn(state_with(MockLlm::default(), MockMaps::default())).await;

    let response = reqwest::Client::new()
        .post(format!("{base}/api/parse-voice-query"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["detail"].as_str().is_some_and(|d| !d.is_empty()));
}

#[tokio::test]
async fn missing_field_is_answered_as_detail() {
    let base = spawn(state_with(MockLlm::default(), MockMaps::default())).await;

    let (status, body) = post(&base, "/api/find-places-on-route", json!({ "route": sample_route() })).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].as_str().unwrap().contains("query"));
}

#[tokio::test]
async fn places_search_failure_is_502() {
    let llm = MockLlm::replying(&[r#"{"search_query": "coffee shop"}"#]);
    let base = spawn(state_with(llm, MockMaps::default().failing_search())).await;

    let (status, _) =
        post(&base, "/api/find-places-on-route", json!({ "query": "coffee", "route": sample_route() })).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn cors_allows_configured_origin() {
    let base = spawn(AppState::default()).await;

    let response = reqwest::Client::new()
        .get(format!("{base}/healthz"))
        .header("Origin", "http://localhost:3000")
        .send()
        .await
        .unwrap();

    let allowed = response.headers().get("access-control-allow-origin").map(|v| v.to_str().unwrap().to_owned());
    assert_eq!(allowed.as_deref(), Some("http://localhost:3000"));
}
