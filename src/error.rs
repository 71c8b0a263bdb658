use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use crate::products::services::ProductError;
use crate::response::ApiResponse;

pub const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong!";

/// Errors as seen at the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ProductError> for ApiError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::Validation(msg) => Self::BadRequest(msg),
            other @ (ProductError::NotFound
            | ProductError::Inactive
            | ProductError::AlreadyActive
            | ProductError::StillActive) => Self::NotFound(other.to_string()),
            ProductError::Store(e) => Self::Internal(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::BadRequest(msg) => {
                warn!(message = %msg, "rejected request");
                ApiResponse::failure(msg)
            }
            Self::NotFound(msg) => ApiResponse::failure(msg),
            Self::Internal(e) => {
                error!(error = ?e, "unhandled error");
                ApiResponse::failure(INTERNAL_ERROR_MESSAGE).with_details(format!("{e:#}"))
            }
        };
        (status, Json(body)).into_response()
    }
}
