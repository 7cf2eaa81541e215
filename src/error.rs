//! API-facing error type: maps engine errors onto HTTP responses.
//!
//! WebSocket handlers use the same type and render it as an error message;
//! HTTP handlers return it directly and get a status + JSON body. Nothing in
//! here is fatal; every variant is an inline, retryable message for the SPA.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::progress::ProgressError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("mission {0} not found")]
    MissionNotFound(String),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissionNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Progress(ProgressError::UnknownQuestion(_))
            | ApiError::Progress(ProgressError::UnknownOption(_)) => StatusCode::NOT_FOUND,
            ApiError::Progress(ProgressError::NotAChoice(_)) => StatusCode::BAD_REQUEST,
            ApiError::Progress(_) => StatusCode::CONFLICT,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
