use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HangError {
    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Venue search error: {0}")]
    VenueSearch(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for HangError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            HangError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            HangError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            HangError::Database(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            HangError::Http(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            HangError::Json(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            HangError::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            HangError::VenueSearch(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            HangError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, HangError>;
