use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use pxl_core::currency::{RatePeriod, Tier};

use super::parse_amount;
use crate::{
    error::{ApiError, ApiResult, MessageErrorBody, StructuredErrorBody},
    main_lib::AppState,
    models::{
        CurrentRateResponse, Endpoints, InitializeInfoResponse, InitializeResponse, QuoteQuery,
        QuoteResponse, RateHistoryQuery, RateHistoryResponse,
    },
};

#[utoipa::path(
    get,
    path = "/api/v1/pxl/current-rate",
    tag = "pxl",
    responses(
        (status = 200, body = CurrentRateResponse),
        (status = 500, body = StructuredErrorBody)
    )
)]
pub async fn get_current_rate(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<CurrentRateResponse>> {
    let current = state
        .currency_service
        .get_current_rate()
        .map_err(ApiError::exchange_rate)?;
    Ok(Json(current.into()))
}

/// Liveness probe for the rate endpoint; never touches the store.
#[utoipa::path(head, path = "/api/v1/pxl/current-rate", tag = "pxl", responses((status = 200)))]
pub async fn head_current_rate() -> StatusCode {
    StatusCode::OK
}

#[utoipa::path(
    post,
    path = "/api/v1/pxl/initialize",
    tag = "pxl",
    responses(
        (status = 200, body = InitializeResponse),
        (status = 500, body = StructuredErrorBody)
    )
)]
pub async fn initialize(State(state): State<Arc<AppState>>) -> ApiResult<Json<InitializeResponse>> {
    let outcome = state
        .currency_service
        .initialize()
        .await
        .map_err(ApiError::initialization)?;
    Ok(Json(outcome.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/pxl/initialize",
    tag = "pxl",
    responses((status = 200, body = InitializeInfoResponse))
)]
pub async fn initialize_info() -> Json<InitializeInfoResponse> {
    Json(InitializeInfoResponse {
        message: "Send a POST request to this endpoint to initialize PXL currency data"
            .to_string(),
        endpoints: Endpoints {
            initialize: "POST /api/v1/pxl/initialize".to_string(),
            current_rate: "GET /api/v1/pxl/current-rate".to_string(),
            rate_history: "GET /api/v1/pxl/rate-history".to_string(),
        },
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/pxl/rate-history",
    tag = "pxl",
    params(RateHistoryQuery),
    responses(
        (status = 200, body = RateHistoryResponse),
        (status = 400, body = MessageErrorBody),
        (status = 500, body = StructuredErrorBody)
    )
)]
pub async fn get_rate_history(
    State(state): State<Arc<AppState>>,
    Query(q): Query<RateHistoryQuery>,
) -> ApiResult<Json<RateHistoryResponse>> {
    let period = match q.period.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        Some(raw) => raw.parse::<RatePeriod>().map_err(|_| {
            ApiError::BadRequest(format!(
                "Unknown period '{}', expected 'hourly' or 'daily'",
                raw
            ))
        })?,
        None => RatePeriod::default(),
    };
    let limit = match q.limit.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
        Some(raw) => Some(raw.parse::<usize>().ok().filter(|n| *n > 0).ok_or_else(|| {
            ApiError::BadRequest("Limit must be a positive integer".to_string())
        })?),
        None => None,
    };

    let history = state
        .currency_service
        .get_rate_history(period, limit)
        .map_err(ApiError::exchange_rate)?;
    Ok(Json(history.into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/pxl/quote",
    tag = "pxl",
    params(QuoteQuery),
    responses(
        (status = 200, body = QuoteResponse),
        (status = 400, body = MessageErrorBody),
        (status = 500, body = StructuredErrorBody)
    )
)]
pub async fn get_quote(
    State(state): State<Arc<AppState>>,
    Query(q): Query<QuoteQuery>,
) -> ApiResult<Json<QuoteResponse>> {
    let amount = parse_amount(q.amount.as_deref())?;
    let tier = match q.tier.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(raw) => raw
            .parse::<Tier>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => Tier::Starter,
    };

    let quote = state
        .currency_service
        .quote_purchase(amount, tier)
        .map_err(ApiError::exchange_rate)?;
    Ok(Json(quote.into()))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/current-rate", get(get_current_rate).head(head_current_rate))
        .route("/initialize", get(initialize_info).post(initialize))
        .route("/rate-history", get(get_rate_history))
        .route("/quote", get(get_quote))
}
