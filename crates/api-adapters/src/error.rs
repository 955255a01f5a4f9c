//! Error-to-response mapping for the HTTP surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use domains::ForumError;

#[derive(Debug)]
pub enum ApiError {
    /// No usable identity on a route that requires one.
    Unauthorized(String),
    Domain(ForumError),
}

impl From<ForumError> for ApiError {
    fn from(err: ForumError) -> Self {
        Self::Domain(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "error": msg }))).into_response()
            }
            ApiError::Domain(err) => domain_response(err),
        }
    }
}

fn domain_response(err: ForumError) -> Response {
    match err {
        ForumError::NotFound(kind, id) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("{kind} not found"), "id": id })),
        )
            .into_response(),
        ForumError::Banned(until) => (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "banned", "banned_until": until })),
        )
            .into_response(),
        ForumError::Forbidden(msg) => {
            (StatusCode::FORBIDDEN, Json(json!({ "error": msg }))).into_response()
        }
        ForumError::ValidationFailed(fields) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "error": "validation failed", "fields": fields })),
        )
            .into_response(),
        ForumError::Conflict(msg) => {
            (StatusCode::CONFLICT, Json(json!({ "error": msg }))).into_response()
        }
        ForumError::Duplicate(msg) => {
            (StatusCode::CONFLICT, Json(json!({ "error": msg }))).into_response()
        }
        ForumError::Internal(msg) => {
            tracing::error!(%msg, "internal error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "internal server error" })),
            )
                .into_response()
        }
    }
}
