use axum::http::StatusCode as HttpStatus;
use axum::response::{IntoResponse, Json, Response};
use objstore_core::{StatusCode, StoreError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

/// JSON body returned with every failed request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: StatusCode,
    pub message: String,
}

/// A store error on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub StoreError);

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(err)
    }
}

/// HTTP status for an operation outcome.
pub fn http_status(code: StatusCode) -> HttpStatus {
    match code {
        StatusCode::Ok => HttpStatus::OK,
        StatusCode::NotFound => HttpStatus::NOT_FOUND,
        StatusCode::PermissionDenied => HttpStatus::FORBIDDEN,
        StatusCode::InvalidArgument => HttpStatus::BAD_REQUEST,
        StatusCode::Unavailable => HttpStatus::SERVICE_UNAVAILABLE,
        StatusCode::Internal | StatusCode::Unknown => HttpStatus::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.code();
        let status = http_status(code);
        if status.is_server_error() {
            tracing::warn!(%code, error = %self.0, "request failed");
        }
        let body = ErrorBody {
            code,
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
