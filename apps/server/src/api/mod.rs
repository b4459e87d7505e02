use std::{str::FromStr, sync::Arc};

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use pxl_core::currency::ServiceStatus;
use rust_decimal::Decimal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{
    config::Config,
    error::{ApiError, ApiResult, ErrorDetail, MessageErrorBody, StructuredErrorBody},
    main_lib::AppState,
    models::{
        CurrentRateResponse, Endpoints, InitializeInfoResponse, InitializeResponse,
        InitializedData, PaymentMethod, PaymentMethodsResponse, PurchaseDiscount, QuoteResponse,
        RateHistoryResponse, RatePoint,
    },
};

pub mod currency;
pub mod payment_methods;

/// Parses a required positive `amount` query value.
pub(crate) fn parse_amount(raw: Option<&str>) -> ApiResult<Decimal> {
    let raw = raw
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Amount is required".to_string()))?;
    Decimal::from_str(raw)
        .ok()
        .filter(|amount| *amount > Decimal::ZERO)
        .ok_or_else(|| ApiError::BadRequest("Amount must be a positive number".to_string()))
}

#[utoipa::path(get, path = "/api/v1/healthz", responses((status = 200, description = "Health")))]
pub async fn healthz() -> &'static str {
    "ok"
}

#[utoipa::path(
    get,
    path = "/api/v1/readyz",
    responses(
        (status = 200, description = "Currency data loaded"),
        (status = 503, description = "Not initialized yet")
    )
)]
pub async fn readyz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.currency_service.status() {
        ServiceStatus::Ready => (StatusCode::OK, "ok"),
        ServiceStatus::Initializing => (StatusCode::SERVICE_UNAVAILABLE, "initializing"),
        ServiceStatus::Uninitialized => (StatusCode::SERVICE_UNAVAILABLE, "uninitialized"),
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        healthz,
        readyz,
        currency::get_current_rate,
        currency::head_current_rate,
        currency::initialize,
        currency::initialize_info,
        currency::get_rate_history,
        currency::get_quote,
        payment_methods::get_payment_methods
    ),
    components(schemas(
        CurrentRateResponse,
        PurchaseDiscount,
        InitializeResponse,
        InitializedData,
        InitializeInfoResponse,
        Endpoints,
        RateHistoryResponse,
        RatePoint,
        QuoteResponse,
        PaymentMethodsResponse,
        PaymentMethod,
        StructuredErrorBody,
        ErrorDetail,
        MessageErrorBody
    )),
    tags((name = "pxl"), (name = "payments"))
)]
pub struct ApiDoc;

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let cors = if config.cors_allow.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins = config
            .cors_allow
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(origin) => Some(origin),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin: {}", o);
                    None
                }
            })
            .collect::<Vec<_>>();
        CorsLayer::new().allow_origin(origins)
    };

    let openapi = ApiDoc::openapi();

    let api = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .nest("/pxl", currency::router())
        .merge(payment_methods::router());

    Router::new()
        .nest("/api/v1", api)
        .route("/openapi.json", get(|| async { Json(openapi) }))
        .with_state(state)
        .layer(cors)
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}
