use super::*;
use axum::Json;
use axum::Router;
use axum::extract::Query;
use axum::routing::get;
use serde_json::json;
use std::collections::HashMap;

#[test]
fn text_search_params_include_bias_and_type() {
    let search = TextSearch::new("pizza", 10_000)
        .near(LatLng::new(32.87, -117.21))
        .of_type(Some("restaurant".into()));
    let params = text_search_params(&search);
    assert_eq!(
        params,
        vec![
            ("query", "pizza".to_string()),
            ("radius", "10000".to_string()),
            ("location", "32.87,-117.21".to_string()),
            ("type", "restaurant".to_string()),
        ]
    );
}

#[test]
fn blank_place_type_is_dropped() {
    let search = TextSearch::new("pizza", 5_000).of_type(Some(" ".into()));
    assert!(search.place_type.is_none());
    assert_eq!(text_search_params(&search).len(), 2);
}

#[test]
fn geocode_reads_address_and_location() {
    let body = json!({
        "status": "OK",
        "results": [{
            "formatted_address": "9500 Gilman Dr, La Jolla, CA 92093, USA",
            "geometry": { "location": { "lat": 32.8801, "lng": -117.234 } }
        }]
    });
    let hits = parse_geocode(&body).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].formatted_address, "9500 Gilman Dr, La Jolla, CA 92093, USA");
    assert_eq!(hits[0].location, LatLng::new(32.8801, -117.234));
}

#[test]
fn zero_results_is_empty_not_error() {
    let body = json!({ "status": "ZERO_RESULTS", "results": [] });
    assert!(parse_geocode(&body).unwrap().is_empty());
    assert!(parse_text_search(body).unwrap().is_empty());
}

#[test]
fn denied_request_is_status_error() {
    let body = json!({ "status": "REQUEST_DENIED", "error_message": "The provided API key is invalid." });
    let err = parse_text_search(body).unwrap_err();
    assert!(matches!(err, MapsError::Status { ref status, ref message } if status == "REQUEST_DENIED" && message.contains("invalid")));
}

#[test]
fn text_search_places_use_vicinity_fallbacks() {
    let body = json!({
        "status": "OK",
        "results": [{
            "place_id": "p1",
            "name": "Regents Pizzeria",
            "rating": 4.4,
            "vicinity": "4150 Regents Park Row",
            "geometry": { "location": { "lat": 32.87, "lng": -117.21 }, "viewport": {} },
            "opening_hours": { "open_now": true }
        }]
    });
    let places = parse_text_search(body).unwrap();
    assert_eq!(places[0].vicinity.as_deref(), Some("4150 Regents Park Row"));
    assert_eq!(places[0].address(), Some("4150 Regents Park Row"));
    assert_eq!(places[0].opening_hours.as_ref().and_then(trips::OpeningHours::open_now), Some(true));
}

#[test]
fn details_reads_result() {
    let body = json!({
        "status": "OK",
        "result": {
            "place_id": "p1",
            "name": "Regents Pizzeria",
            "formatted_phone_number": "(858) 550-0406",
            "photos": [{ "photo_reference": "ref-1", "width": 800, "height": 600 }],
            "opening_hours": { "weekday_text": ["Monday: 11 AM-10 PM"] }
        }
    });
    let place = parse_details(body).unwrap();
    assert_eq!(place.phone.as_deref(), Some("(858) 550-0406"));
    assert_eq!(place.photos[0].photo_reference.as_deref(), Some("ref-1"));
}

#[test]
fn details_without_result_is_error() {
    assert!(parse_details(json!({ "status": "ZERO_RESULTS" })).is_err());
    assert!(matches!(parse_details(json!({ "status": "OK" })), Err(MapsError::Parse(_))));
}

#[test]
fn photo_url_carries_reference_and_key() {
    let client = GoogleMapsClient::with_base_url("k123".into(), "https://maps.test/api/").unwrap();
    assert_eq!(client.photo_url("ref-1"), "https://maps.test/api/place/photo?maxwidth=400&photoreference=ref-1&key=k123");
}

#[tokio::test]
async fn geocode_hits_local_service() {
    let app = Router::new().route(
        "/geocode/json",
        get(|Query(q): Query<HashMap<String, String>>| async move {
            Json(json!({
                "status": "OK",
                "results": [{
                    "formatted_address": format!("{} (key {})", q["address"], q["key"]),
                    "geometry": { "location": { "lat": 1.0, "lng": 2.0 } }
                }]
            }))
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    let client = GoogleMapsClient::with_base_url("secret".into(), &format!("http://{addr}")).unwrap();
    let hits = client.geocode("Price Center").await.unwrap();

    assert_eq!(hits[0].formatted_address, "Price Center (key secret)");
}

#[tokio::test]
async fn response_status_is_logged_at_debug() {
    let _log = tracing::subscriber::set_default(
        tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).with_test_writer().finish(),
    );
    let app = Router::new().route("/geocode/json", get(|| async { Json(json!({ "status": "ZERO_RESULTS", "results": [] })) }));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    let client = GoogleMapsClient::with_base_url("secret".into(), &format!("http://{addr}")).unwrap();

    assert!(client.geocode("Nowhere").await.unwrap().is_empty());
}
