//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use engram_types::error::MemoryError;

use super::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Memory mutation errors (validation, not-found, storage).
    Memory(MemoryError),
    /// Request validation error.
    Validation(String),
}

impl From<MemoryError> for AppError {
    fn from(e: MemoryError) -> Self {
        AppError::Memory(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Memory(MemoryError::NotFound) => (
                StatusCode::NOT_FOUND,
                "MEMORY_NOT_FOUND",
                "Memory not found".to_string(),
            ),
            AppError::Memory(MemoryError::EmptyContent) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                "Memory content cannot be empty".to_string(),
            ),
            AppError::Memory(e @ MemoryError::ContentTooLong { .. }) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Memory(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "MEMORY_ERROR",
                e.to_string(),
            ),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
        };

        let body = ApiResponse::error(code, &message, Uuid::now_v7().to_string());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let resp = AppError::Memory(MemoryError::NotFound).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_empty_content_maps_to_400() {
        let resp = AppError::Memory(MemoryError::EmptyContent).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_too_long_maps_to_400() {
        let resp =
            AppError::Memory(MemoryError::ContentTooLong { max: 1000 }).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_storage_maps_to_500() {
        let resp = AppError::Memory(MemoryError::Storage("locked".to_string())).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
