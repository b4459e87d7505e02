use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pxl_core::errors::{Error as CoreError, ValidationError};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Reading the rate failed: not initialized or the store is unreachable.
    #[error("Failed to fetch PXL exchange rate")]
    ExchangeRate(#[source] CoreError),
    #[error("Failed to initialize PXL currency data")]
    Initialization(#[source] CoreError),
    #[error("{0}")]
    Core(#[source] CoreError),
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    /// Maps a failure of a rate query; caller mistakes stay 400s.
    pub fn exchange_rate(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => Self::from(e),
            other => ApiError::ExchangeRate(other),
        }
    }

    pub fn initialization(err: CoreError) -> Self {
        ApiError::Initialization(err)
    }

    /// Converts a core error, turning validation failures into 400s.
    pub fn core(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => Self::from(e),
            other => ApiError::Core(other),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::InvalidInput(message) => ApiError::BadRequest(message),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}

/// Body of a 500-class failure.
#[derive(Serialize, ToSchema)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub details: String,
}

#[derive(Serialize, ToSchema)]
pub struct StructuredErrorBody {
    pub error: ErrorDetail,
}

/// Body of a rejected request.
#[derive(Serialize, ToSchema)]
pub struct MessageErrorBody {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, details) = match &self {
            ApiError::BadRequest(message) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(MessageErrorBody {
                        error: message.clone(),
                    }),
                )
                    .into_response();
            }
            ApiError::ExchangeRate(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "EXCHANGE_RATE_ERROR",
                e.to_string(),
            ),
            ApiError::Initialization(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INITIALIZATION_ERROR",
                e.to_string(),
            ),
            ApiError::Core(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                e.to_string(),
            ),
        };
        tracing::error!(code, %details, "{}", self);
        let body = Json(StructuredErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details,
            },
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
