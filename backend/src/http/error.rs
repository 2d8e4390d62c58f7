//! HTTP error handling and response types.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;

/// API error response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// 404
    NotFound(String),
    /// 422, for malformed or invalid input
    Unprocessable(String),
    /// Mapped by variant: 400, 404, 422 or 500
    Repository(RepositoryError),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ApiError) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::Unprocessable(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::new("VALIDATION_ERROR", msg),
            ),
            AppError::Repository(err) => repository_status_and_body(err),
        }
    }
}

fn repository_status_and_body(err: RepositoryError) -> (StatusCode, ApiError) {
    let (status, code) = match &err {
        RepositoryError::ValidationError { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR")
        }
        RepositoryError::InvalidWindow { .. } => (StatusCode::BAD_REQUEST, "INVALID_WINDOW"),
        RepositoryError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        _ => {
            tracing::error!("Repository error: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "REPOSITORY_ERROR")
        }
    };

    let mut body = ApiError::new(code, err.message());
    if let Some(details) = err.context().and_then(|c| c.details.clone()) {
        body = body.with_details(details);
    }
    (status, body)
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_body();
        (status, Json(error)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

// Extractor rejections are client input errors and map to 422

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Unprocessable(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Unprocessable(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Unprocessable(rejection.body_text())
    }
}
