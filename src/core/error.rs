use crate::repositories::DirectoryError;
use crate::store::StoreError;
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;

#[derive(Serialize)]
struct ErrorResponse {
    error: bool,
    message: String,
}

pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    // Common error constructors

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::bad_request(format!("Validation error: {}", err))
    }
}

impl From<axum::Error> for AppError {
    fn from(_: axum::Error) -> Self {
        Self::internal_server_error("Internal server error")
    }
}

// Il fallimento dello store non declassa mai una decisione di sicurezza:
// chi dipende dalla sessione riceve un 500 e la richiesta viene respinta.
impl From<StoreError> for AppError {
    fn from(_: StoreError) -> Self {
        Self::internal_server_error("Session store unavailable")
    }
}

impl From<DirectoryError> for AppError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::NotFound => Self::not_found("No user found"),
            DirectoryError::AlreadyExists => Self::conflict("User already exists"),
            DirectoryError::Unavailable(_) => Self::internal_server_error("Error finding user"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}
