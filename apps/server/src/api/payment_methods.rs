use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use super::parse_amount;
use crate::{
    error::{ApiError, ApiResult, MessageErrorBody},
    main_lib::AppState,
    models::{PaymentMethodsQuery, PaymentMethodsResponse},
};

#[utoipa::path(
    get,
    path = "/api/v1/payment-methods",
    tag = "payments",
    params(PaymentMethodsQuery),
    responses(
        (status = 200, body = PaymentMethodsResponse),
        (status = 400, body = MessageErrorBody)
    )
)]
pub async fn get_payment_methods(
    State(state): State<Arc<AppState>>,
    Query(q): Query<PaymentMethodsQuery>,
) -> ApiResult<Json<PaymentMethodsResponse>> {
    let amount = parse_amount(q.amount.as_deref())?;
    let quote = state
        .payment_method_service
        .available_methods(amount, q.currency.as_deref())
        .map_err(ApiError::core)?;
    Ok(Json(quote.into()))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/payment-methods", get(get_payment_methods))
}
