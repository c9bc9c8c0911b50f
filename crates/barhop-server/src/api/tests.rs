use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::Request;
use barhop_core::config::build_app_config;
use barhop_core::seed::{parse_seed, DEFAULT_SEED};
use chrono::{NaiveDate, NaiveDateTime};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;
use crate::clock::FixedClock;

/// Monday 2024-06-03, 10 PM.
fn monday_night() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 3)
        .unwrap()
        .and_hms_opt(22, 0, 0)
        .unwrap()
}

async fn test_state(places: Option<PlacesClient>) -> AppState {
    let config = build_app_config(|_| Err(std::env::VarError::NotPresent)).expect("config");
    let store = MemStore::seeded(&parse_seed(DEFAULT_SEED).expect("seed"))
        .await
        .expect("store");
    AppState {
        store,
        places: places.map(Arc::new),
        clock: Arc::new(FixedClock(monday_night())),
        config: Arc::new(config),
    }
}

async fn test_app(places: Option<PlacesClient>) -> Router {
    build_app(test_state(places).await, RateLimitState::per_minute(1_000))
}

fn get_req(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

fn places_client(server: &MockServer) -> PlacesClient {
    PlacesClient::with_base_url("test-key", 5, &server.uri()).expect("places client")
}

#[test]
fn api_error_codes_map_to_statuses() {
    let cases = [
        ("validation_error", StatusCode::BAD_REQUEST),
        ("not_found", StatusCode::NOT_FOUND),
        ("conflict", StatusCode::CONFLICT),
        ("upstream_error", StatusCode::BAD_GATEWAY),
        ("service_unavailable", StatusCode::SERVICE_UNAVAILABLE),
        ("anything_else", StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (code, status) in cases {
        let response = ApiError::new("req-1", code, "msg").into_response();
        assert_eq!(response.status(), status, "code {code}");
    }
}

#[test]
fn radius_defaults_and_rejects_non_positive() {
    assert!((radius_km("r", None, 5.0).unwrap() - 5.0).abs() < f64::EPSILON);
    assert!((radius_km("r", Some(2.5), 5.0).unwrap() - 2.5).abs() < f64::EPSILON);
    assert!(radius_km("r", Some(0.0), 5.0).is_err());
    assert!(radius_km("r", Some(f64::INFINITY), 5.0).is_err());
}

#[tokio::test]
async fn health_reports_store_counts() {
    let app = test_app(None).await;
    let (status, json) = send(&app, get_req("/api/v1/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["places"], "disabled");
    assert_eq!(json["data"]["bars"], 5);
    assert_eq!(json["data"]["events"], 5);
    assert!(json["meta"]["request_id"].is_string());
}

#[tokio::test]
async fn config_exposes_missing_key_as_null() {
    let app = test_app(None).await;
    let (status, json) = send(&app, get_req("/api/v1/config")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["data"]["google_api_key"].is_null());
}

#[tokio::test]
async fn list_bars_evaluates_hours_at_clock_time() {
    let app = test_app(None).await;
    let (status, json) = send(&app, get_req("/api/v1/bars")).await;

    assert_eq!(status, StatusCode::OK);
    let bars = json["data"].as_array().expect("data array");
    assert_eq!(bars.len(), 5);

    let neon = &bars[0];
    assert_eq!(neon["name"], "Neon Nights");
    assert_eq!(neon["type"], "Dance Club");
    assert_eq!(neon["rating"], "4.8");
    assert_eq!(neon["open_status"]["is_open_now"], true);
    assert_eq!(neon["open_status"]["message"], "Open until 2:00 AM");
    assert!(neon.get("distance").is_none());

    let sky = &bars[4];
    assert_eq!(sky["name"], "Sky Lounge");
    assert_eq!(sky["open_status"]["closing_time"], "Closed today");
    assert_eq!(
        sky["open_status"]["message"],
        "Closed until tomorrow at 5:00 PM"
    );
}

#[tokio::test]
async fn list_bars_adds_distance_for_origin() {
    let app = test_app(None).await;
    let (status, json) = send(&app, get_req("/api/v1/bars?lat=45.5152&lng=-122.6784")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"][0]["distance"], "0 ft");
}

#[tokio::test]
async fn list_bars_filters_by_query_nearest_first() {
    let app = test_app(None).await;
    let (status, json) = send(
        &app,
        get_req("/api/v1/bars?q=LOUNGE&lat=45.5200&lng=-122.6820"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = json["data"]
        .as_array()
        .expect("data array")
        .iter()
        .filter_map(|b| b["name"].as_str())
        .collect();
    assert_eq!(names, ["Sky Lounge", "Midnight Lounge"]);
    assert_eq!(json["data"][0]["distance"], "0 ft");
}

#[tokio::test]
async fn list_bars_rejects_half_an_origin() {
    let app = test_app(None).await;
    let (status, json) = send(&app, get_req("/api/v1/bars?lat=45.5")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn sponsored_bars_are_filtered() {
    let app = test_app(None).await;
    let (_, json) = send(&app, get_req("/api/v1/bars/sponsored")).await;
    let names: Vec<&str> = json["data"]
        .as_array()
        .expect("data array")
        .iter()
        .filter_map(|b| b["name"].as_str())
        .collect();
    assert_eq!(names, ["Neon Nights", "Midnight Lounge"]);
}

#[tokio::test]
async fn local_nearby_ranks_stored_bars() {
    let app = test_app(None).await;
    let (status, json) = send(
        &app,
        get_req("/api/v1/bars/local/nearby?lat=45.5200&lng=-122.6820&radius=2"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let bars = json["data"].as_array().expect("data array");
    assert_eq!(bars.len(), 5);
    assert_eq!(bars[0]["name"], "Sky Lounge");
    assert_eq!(bars[0]["distance"], "0 ft");
}

#[tokio::test]
async fn local_nearby_requires_coordinates() {
    let app = test_app(None).await;
    let (status, _) = send(&app, get_req("/api/v1/bars/local/nearby")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, get_req("/api/v1/bars/local/nearby?lat=91&lng=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_bar_returns_404_for_unknown_id() {
    let app = test_app(None).await;
    let (status, json) = send(&app, get_req("/api/v1/bars/99")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn nearby_places_without_key_is_empty() {
    let app = test_app(None).await;
    let (status, json) = send(&app, get_req("/api/v1/bars/nearby?lat=45.5&lng=-122.6")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], serde_json::json!([]));
}

#[tokio::test]
async fn place_details_without_key_is_unavailable() {
    let app = test_app(None).await;
    let (status, json) = send(&app, get_req("/api/v1/places/abc")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"]["code"], "service_unavailable");
}

#[tokio::test]
async fn search_filters_places_by_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maps/api/place/nearbysearch/json"))
        .and(query_param("type", "bar"))
        .and(query_param("radius", "3000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "results": [
                {
                    "place_id": "p1",
                    "name": "Holocene",
                    "vicinity": "1001 SE Morrison St, Portland",
                    "geometry": { "location": { "lat": 45.5171, "lng": -122.6557 } },
                    "types": ["night_club", "bar"],
                    "business_status": "OPERATIONAL"
                },
                {
                    "place_id": "p2",
                    "name": "Kells Irish Pub",
                    "vicinity": "112 SW 2nd Ave, Portland",
                    "geometry": { "location": { "lat": 45.5210, "lng": -122.6720 } },
                    "types": ["bar", "restaurant"],
                    "business_status": "OPERATIONAL"
                }
            ]
        })))
        .mount(&server)
        .await;

    let app = test_app(Some(places_client(&server))).await;
    let (status, json) = send(
        &app,
        post_json(
            "/api/v1/bars/search",
            &serde_json::json!({
                "latitude": 45.5152,
                "longitude": -122.6784,
                "radius": 3,
                "query": "IRISH"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let places = json["data"].as_array().expect("data array");
    assert_eq!(places.len(), 1);
    assert_eq!(places[0]["name"], "Kells Irish Pub");
    assert_eq!(places[0]["type"], "Bar & Restaurant");
    assert!(places[0]["distance"].is_string());
}

#[tokio::test]
async fn place_details_are_upserted_into_store() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maps/api/place/details/json"))
        .and(query_param("place_id", "p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "result": {
                "place_id": "p1",
                "name": "Holocene",
                "formatted_address": "1001 SE Morrison St, Portland, OR 97214",
                "geometry": { "location": { "lat": 45.5171, "lng": -122.6557 } },
                "opening_hours": {
                    "weekday_text": [
                        "Monday: 8:00 PM – 2:00 AM",
                        "Tuesday: 8:00 PM – 2:00 AM"
                    ]
                },
                "rating": 4.5,
                "price_level": 2,
                "types": ["night_club", "bar"],
                "business_status": "OPERATIONAL"
            }
        })))
        .mount(&server)
        .await;

    let app = test_app(Some(places_client(&server))).await;
    let (status, json) = send(&app, get_req("/api/v1/places/p1")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["id"], 6);
    assert_eq!(json["data"]["place_id"], "p1");
    assert_eq!(json["data"]["type"], "Nightclub");
    assert_eq!(json["data"]["price_range"], "$$");
    assert_eq!(json["data"]["open_status"]["message"], "Open until 2:00 AM");

    let (_, json) = send(&app, get_req("/api/v1/places/p1")).await;
    assert_eq!(json["data"]["id"], 6, "second lookup refreshes the same bar");

    let (_, json) = send(&app, get_req("/api/v1/bars")).await;
    assert_eq!(json["data"].as_array().map(Vec::len), Some(6));
}

#[tokio::test]
async fn place_details_not_found_is_404() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maps/api/place/details/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "status": "NOT_FOUND" })),
        )
        .mount(&server)
        .await;

    let app = test_app(Some(places_client(&server))).await;
    let (status, _) = send(&app, get_req("/api/v1/places/missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn place_details_upstream_failure_is_502() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/maps/api/place/details/json"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let app = test_app(Some(places_client(&server))).await;
    let (status, json) = send(&app, get_req("/api/v1/places/p1")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"]["code"], "upstream_error");
}

#[tokio::test]
async fn users_and_favorites_flow() {
    let app = test_app(None).await;

    let (status, json) = send(
        &app,
        post_json("/api/v1/users", &serde_json::json!({ "username": "hopper" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let user_id = json["data"]["id"].as_i64().expect("user id");

    let (status, json) = send(
        &app,
        post_json("/api/v1/users", &serde_json::json!({ "username": "Hopper" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["code"], "conflict");

    let (status, json) = send(&app, get_req(&format!("/api/v1/users/{user_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["username"], "hopper");

    let favorite = format!("/api/v1/users/{user_id}/favorites/2");
    let (_, json) = send(&app, get_req(&favorite)).await;
    assert_eq!(json["data"]["is_favorited"], false);

    let toggle = Request::builder()
        .method("POST")
        .uri(&favorite)
        .body(Body::empty())
        .expect("request");
    let (status, json) = send(&app, toggle).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["is_favorited"], true);

    let (_, json) = send(&app, get_req(&favorite)).await;
    assert_eq!(json["data"]["is_favorited"], true);
}

#[tokio::test]
async fn toggling_favorite_for_unknown_bar_is_404() {
    let app = test_app(None).await;
    send(
        &app,
        post_json("/api/v1/users", &serde_json::json!({ "username": "hopper" })),
    )
    .await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/users/1/favorites/404")
        .body(Body::empty())
        .expect("request");
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_user_rejects_blank_username() {
    let app = test_app(None).await;
    let (status, json) = send(
        &app,
        post_json("/api/v1/users", &serde_json::json!({ "username": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn events_filter_featured_and_add_distance() {
    let app = test_app(None).await;

    let (status, json) = send(&app, get_req("/api/v1/events?featured=true")).await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = json["data"]
        .as_array()
        .expect("data array")
        .iter()
        .filter_map(|e| e["title"].as_str())
        .collect();
    assert_eq!(titles, ["Happy Hour Specials", "Live Jazz Night"]);

    let (_, json) = send(&app, get_req("/api/v1/events?lat=45.5152&lng=-122.6784")).await;
    let birthday = json["data"]
        .as_array()
        .expect("data array")
        .iter()
        .find(|e| e["title"] == "Sarah's 25th Birthday Bash")
        .expect("birthday event");
    assert_eq!(birthday["distance"], "0 ft");
    assert_eq!(birthday["type"], "birthday");
    assert_eq!(birthday["is_full"], false);
}

#[tokio::test]
async fn get_event_by_id_and_missing() {
    let app = test_app(None).await;
    let (status, json) = send(&app, get_req("/api/v1/events/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["title"], "Live Jazz Night");

    let (status, _) = send(&app, get_req("/api/v1/events/42")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rate_limit_applies_to_api_but_not_health() {
    let app = build_app(test_state(None).await, RateLimitState::per_minute(1));

    let (status, _) = send(&app, get_req("/api/v1/bars")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, json) = send(&app, get_req("/api/v1/bars")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["error"]["code"], "rate_limited");

    let (status, _) = send(&app, get_req("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
}
