use axum::{body::Body, http::Request};
use pxl_server::{api::app_router, build_state, config::Config};
use tempfile::tempdir;
use tower::ServiceExt;

#[tokio::test]
async fn healthz_works() {
    let tmp = tempdir().unwrap();
    let mut config = Config::from_env().unwrap();
    config.db_path = tmp.path().join("test.db").to_string_lossy().into_owned();
    let state = build_state(&config).await.unwrap();
    let app = app_router(state, &config);

    let response = app
        .oneshot(Request::builder().uri("/api/v1/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn readyz_follows_initialization() {
    let tmp = tempdir().unwrap();
    let mut config = Config::from_env().unwrap();
    config.db_path = tmp.path().join("test.db").to_string_lossy().into_owned();
    config.auto_initialize = false;
    let state = build_state(&config).await.unwrap();
    let app = app_router(state, &config);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/v1/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), 503);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/pxl/initialize")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = app
        .oneshot(Request::builder().uri("/api/v1/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn openapi_document_lists_rate_routes() {
    let tmp = tempdir().unwrap();
    let mut config = Config::from_env().unwrap();
    config.db_path = tmp.path().join("test.db").to_string_lossy().into_owned();
    let state = build_state(&config).await.unwrap();
    let app = app_router(state, &config);

    let response = app
        .oneshot(Request::builder().uri("/openapi.json").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(doc["paths"]["/api/v1/pxl/current-rate"].is_object());
    assert!(doc["paths"]["/api/v1/payment-methods"].is_object());
}
