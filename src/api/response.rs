//! The `{success, message?, data?}` envelope every route responds with.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::CareTrackError;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

pub fn data<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

pub fn message_data<T: Serialize>(message: &str, data: T) -> Json<Value> {
    Json(json!({ "success": true, "message": message, "data": data }))
}

pub fn message(message: &str) -> Json<Value> {
    Json(json!({ "success": true, "message": message }))
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

// Database and runtime details never reach the client.
impl From<CareTrackError> for ApiError {
    fn from(err: CareTrackError) -> Self {
        match err {
            CareTrackError::Validation(msg) => Self::new(StatusCode::BAD_REQUEST, msg),
            CareTrackError::Auth(msg) => Self::new(StatusCode::UNAUTHORIZED, msg),
            CareTrackError::Forbidden(msg) => Self::new(StatusCode::FORBIDDEN, msg),
            CareTrackError::NotFound(msg) => Self::new(StatusCode::NOT_FOUND, msg),
            CareTrackError::Conflict(msg) => Self::new(StatusCode::CONFLICT, msg),
            CareTrackError::ExternalService(_)
            | CareTrackError::Config(_)
            | CareTrackError::Database(_)
            | CareTrackError::Runtime(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "success": false, "message": self.message }));
        (self.status, body).into_response()
    }
}
