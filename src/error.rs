use actix_web::{http::StatusCode, HttpResponse};
use thiserror::Error;

/// Store failure taxonomy. The HTTP layer maps these straight to
/// status codes via `ResponseError`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("reading {0} not found")]
    NotFound(i32),
    #[error("storage error: {0}")]
    Storage(#[from] diesel::result::Error),
    #[error("storage lock poisoned")]
    Poisoned,
}

impl actix_web::ResponseError for StoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            StoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Storage(_) | StoreError::Poisoned => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.to_string() }))
    }
}
