use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::DateTime;
use pxl_server::{api::app_router, build_state, config::Config, scheduler, AppState};
use serde_json::Value;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

async fn build_test_app() -> (TempDir, Arc<AppState>, Router) {
    let tmp = tempdir().unwrap();
    let mut config = Config::from_env().unwrap();
    config.db_path = tmp.path().join("pxl.db").to_string_lossy().into_owned();
    config.auto_initialize = false;
    let state = build_state(&config).await.unwrap();
    let app = app_router(state.clone(), &config);
    (tmp, state, app)
}

async fn send(app: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn current_rate_before_initialize_is_structured_error() {
    let (_tmp, _state, app) = build_test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/v1/pxl/current-rate").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "EXCHANGE_RATE_ERROR");
    assert!(body["error"]["message"].is_string());
    assert!(body["error"]["details"]
        .as_str()
        .unwrap()
        .contains("not initialized"));
}

#[tokio::test]
async fn fresh_system_initializes_with_five_tiers() {
    let (_tmp, _state, app) = build_test_app().await;

    let (status, body) = send(&app, Method::POST, "/api/v1/pxl/initialize").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());
    let data = &body["data"];
    assert!(data["currentRate"].as_f64().unwrap() > 0.0);
    assert!(data["baseRate"].as_f64().unwrap() > 0.0);
    assert_eq!(data["trend"], "stable");
    assert_eq!(data["hourlyRatesCount"], 1);
    assert_eq!(data["dailyRatesCount"], 1);
    assert_eq!(data["tiers"].as_array().unwrap().len(), 5);
    assert_eq!(data["purchaseDiscounts"].as_array().unwrap().len(), 4);

    let (status, body) = send(&app, Method::GET, "/api/v1/pxl/current-rate").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["change24h"].as_f64(), Some(0.0));
    assert_eq!(body["trend"], "stable");
    let last_updated = body["lastUpdated"].as_str().unwrap();
    assert!(DateTime::parse_from_rfc3339(last_updated).is_ok());
    assert!(last_updated.ends_with('Z'));
}

#[tokio::test]
async fn initialize_twice_keeps_record() {
    let (_tmp, _state, app) = build_test_app().await;

    let (status, _) = send(&app, Method::POST, "/api/v1/pxl/initialize").await;
    assert_eq!(status, StatusCode::OK);
    let (_, first) = send(&app, Method::GET, "/api/v1/pxl/current-rate").await;

    let (status, body) = send(&app, Method::POST, "/api/v1/pxl/initialize").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["hourlyRatesCount"], 1);

    let (_, second) = send(&app, Method::GET, "/api/v1/pxl/current-rate").await;
    assert_eq!(first["lastUpdated"], second["lastUpdated"]);
    assert_eq!(first["rate"], second["rate"]);
}

#[tokio::test]
async fn head_current_rate_is_empty_ok() {
    let (_tmp, _state, app) = build_test_app().await;

    let (status, body) = send(&app, Method::HEAD, "/api/v1/pxl/current-rate").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn initialize_info_lists_endpoints() {
    let (_tmp, _state, app) = build_test_app().await;

    let (status, body) = send(&app, Method::GET, "/api/v1/pxl/initialize").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().contains("POST"));
    for key in ["initialize", "currentRate", "rateHistory"] {
        assert!(body["endpoints"][key].is_string(), "missing endpoint {}", key);
    }

    // Discovery never initializes.
    let (status, _) = send(&app, Method::GET, "/api/v1/pxl/current-rate").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn scheduled_update_moves_history_and_keeps_timestamps_ordered() {
    let (_tmp, state, app) = build_test_app().await;

    // Skipped while uninitialized.
    scheduler::run_rate_update(&state).await;
    assert_eq!(
        send(&app, Method::GET, "/api/v1/pxl/current-rate").await.0,
        StatusCode::INTERNAL_SERVER_ERROR
    );

    send(&app, Method::POST, "/api/v1/pxl/initialize").await;
    let (_, before) = send(&app, Method::GET, "/api/v1/pxl/current-rate").await;

    scheduler::run_rate_update(&state).await;
    scheduler::run_rate_update(&state).await;

    let (status, history) = send(&app, Method::GET, "/api/v1/pxl/rate-history?period=hourly").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history["period"], "hourly");
    assert_eq!(history["rates"].as_array().unwrap().len(), 3);

    let (_, after) = send(&app, Method::GET, "/api/v1/pxl/current-rate").await;
    let before_ts = DateTime::parse_from_rfc3339(before["lastUpdated"].as_str().unwrap()).unwrap();
    let after_ts = DateTime::parse_from_rfc3339(after["lastUpdated"].as_str().unwrap()).unwrap();
    assert!(after_ts >= before_ts);

    let (_, limited) = send(&app, Method::GET, "/api/v1/pxl/rate-history?limit=1").await;
    assert_eq!(limited["rates"].as_array().unwrap().len(), 1);
    assert_eq!(limited["rates"][0]["rate"], after["rate"]);
}

#[tokio::test]
async fn rate_history_rejects_bad_query() {
    let (_tmp, _state, app) = build_test_app().await;
    send(&app, Method::POST, "/api/v1/pxl/initialize").await;

    let (status, body) = send(&app, Method::GET, "/api/v1/pxl/rate-history?period=weekly").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = send(&app, Method::GET, "/api/v1/pxl/rate-history?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn quote_applies_tier_and_discount() {
    let (_tmp, _state, app) = build_test_app().await;
    send(&app, Method::POST, "/api/v1/pxl/initialize").await;

    let (status, body) = send(&app, Method::GET, "/api/v1/pxl/quote?amount=25&tier=pro").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tier"], "pro");
    assert_eq!(body["discountPercent"].as_f64(), Some(5.0));
    assert_eq!(body["pxlAmount"].as_f64(), Some(2750.0));
    assert_eq!(body["chargedAmount"].as_f64(), Some(23.75));

    let (status, body) = send(&app, Method::GET, "/api/v1/pxl/quote?amount=25&tier=gold").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("gold"));

    let (status, body) = send(&app, Method::GET, "/api/v1/pxl/quote?tier=pro").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Amount is required");
}

#[tokio::test]
async fn quote_for_amount_too_large_is_rejected() {
    let (_tmp, _state, app) = build_test_app().await;
    send(&app, Method::POST, "/api/v1/pxl/initialize").await;

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/pxl/quote?amount=79228162514264337593543950335&tier=pro",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("too large"));
}
