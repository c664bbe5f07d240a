use super::*;
use axum::Json;
use axum::Router;
use axum::extract::Query;
use axum::routing::get;
use serde_json::json;
use std::collections::HashMap;
use trips::{RouteEndpoint, Waypoint};

fn request(waypoints: Vec<Waypoint>, optimize: bool) -> RouteRequest {
    RouteRequest {
        origin: RouteEndpoint::parse("UCSD"),
        destination: RouteEndpoint::parse("place_id:ChIJprice"),
        waypoints,
        optimize_waypoints: optimize,
    }
}

fn stop(name: &str, place_id: Option<&str>) -> Waypoint {
    Waypoint { lat: 32.88, lng: -117.23, name: name.into(), place_id: place_id.map(str::to_owned) }
}

#[test]
fn params_without_waypoints() {
    let params = query_params(&request(vec![], true));
    assert_eq!(
        params,
        vec![("origin", "UCSD".to_string()), ("destination", "place_id:ChIJprice".to_string())]
    );
}

#[test]
fn waypoints_join_with_pipe() {
    let params = query_params(&request(vec![stop("Geisel", Some("ChIJgeisel")), stop("Lot", None)], false));
    assert_eq!(params[2], ("waypoints", "place_id:ChIJgeisel|32.88,-117.23".to_string()));
}

#[test]
fn optimize_prefixes_waypoints() {
    let params = query_params(&request(vec![stop("Geisel", Some("ChIJgeisel"))], true));
    assert_eq!(params[2].1, "optimize:true|place_id:ChIJgeisel");
}

#[test]
fn ok_body_becomes_route() {
    let route = parse_response(json!({ "status": "OK", "routes": [{ "summary": "I-5 N", "legs": [] }] })).unwrap();
    assert_eq!(route.summary(), Some("I-5 N"));
}

#[test]
fn non_ok_status_is_error() {
    let err = parse_response(json!({ "status": "ZERO_RESULTS", "routes": [] })).unwrap_err();
    assert!(matches!(err, RouteError::Status { ref status, .. } if status == "ZERO_RESULTS"));
}

#[test]
fn missing_status_is_parse_error() {
    assert!(matches!(parse_response(json!({})), Err(RouteError::Parse(_))));
}

#[tokio::test]
async fn compute_route_sends_key_and_endpoints() {
    let app = Router::new().route(
        "/directions",
        get(|Query(q): Query<HashMap<String, String>>| async move {
            Json(json!({
                "status": "OK",
                "routes": [{ "summary": format!("{} via {}", q["origin"], q["key"]), "legs": [] }]
            }))
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    let directions =
        GoogleDirections::with_url("test-key", &format!("http://{addr}/directions"), HttpTimeouts::default()).unwrap();
    let route = directions.compute_route(&request(vec![], false)).await.unwrap();

    assert_eq!(route.summary(), Some("UCSD via test-key"));
}
