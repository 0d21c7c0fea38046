//! HTTP error mapping.

use axum::{http::StatusCode, response::IntoResponse, Json};

#[derive(Debug)]
pub enum ApiError {
    Database(vigil_core::Error),
    NotFound(String),
    BadRequest(String),
    Conflict(String),
}

impl From<vigil_core::Error> for ApiError {
    fn from(err: vigil_core::Error) -> Self {
        match &err {
            vigil_core::Error::NotFound(msg) => ApiError::NotFound(msg.clone()),
            vigil_core::Error::ClientNotFound(_) => ApiError::NotFound(err.to_string()),
            vigil_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg.clone()),
            vigil_core::Error::Database(sqlx_err) => {
                let msg = sqlx_err.to_string();
                if msg.contains("duplicate key") || msg.contains("unique constraint") {
                    return ApiError::Conflict(msg);
                }
                if msg.contains("foreign key") || msg.contains("check constraint") {
                    return ApiError::BadRequest(msg);
                }
                ApiError::Database(err)
            }
            _ => ApiError::Database(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Database(err) => {
                tracing::error!(subsystem = "api", error = %err, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
