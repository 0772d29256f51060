//! Error responses.
//!
//! Whatever goes wrong while reflecting a request, the client gets a 500
//! with a fixed JSON string body instead of a dropped connection.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Body sent with every 500 response.
pub const FALLBACK_BODY: &str = "\"something went wrong\"";

/// Failures while building a reflection.
#[derive(Debug, Error)]
pub enum ReflectionError {
    #[error("failed to read request body: {0}")]
    BodyRead(#[source] axum::Error),

    #[error("failed to serialize reflection: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl IntoResponse for ReflectionError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "responding with 500");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "application/json")],
            FALLBACK_BODY,
        )
            .into_response()
    }
}
