//! API error type for the HTTP routes

use axum::{
    extract::rejection::FormRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use finadvisor_common::{ErrorResponse, ProfileError};

/// Boundary validation failures. The engine itself never errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    InvalidForm(String),

    #[error(transparent)]
    InvalidProfile(#[from] ProfileError),
}

impl ApiError {
    fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidForm(_) => "invalid_form",
            ApiError::InvalidProfile(_) => "invalid_profile",
        }
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        ApiError::InvalidForm(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.kind().to_string(),
            detail: self.to_string(),
        };
        (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
    }
}
