use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// HTTP-facing error for the API surface. Each variant maps to a status
/// code plus a machine-readable error code in the response body.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Request body must be valid JSON")]
    InvalidJson(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("The insuredId path parameter is required")]
    MissingInsuredId,

    #[error("The insured id must be exactly 5 digits: {0}")]
    InvalidInsuredIdFormat(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidJson(_) => "INVALID_JSON",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::MissingInsuredId => "MISSING_INSURED_ID",
            AppError::InvalidInsuredIdFormat(_) => "INVALID_INSURED_ID_FORMAT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidJson(_)
            | AppError::Validation(_)
            | AppError::MissingInsuredId
            | AppError::InvalidInsuredIdFormat(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        tracing::error!("Error: {}: {}", status, message);

        let body = Json(json!({
            "message": message,
            "error": self.code(),
        }));

        (status, body).into_response()
    }
}
