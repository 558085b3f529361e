use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Uniform response body: `{"success": bool, "message": ...}`.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(message: T) -> Json<Self> {
        Json(Self { success: true, message })
    }
}

/// Client-facing failure, rendered as an error envelope with `status`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Envelope { success: false, message: self.message };
        (self.status, Json(body)).into_response()
    }
}
