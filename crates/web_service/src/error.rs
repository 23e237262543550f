use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use checklist_core::ChecklistError;
use party_sync::SyncError;
use serde::Serialize;
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid party id: {0}")]
    InvalidPartyId(String),

    #[error("Identity error: {0}")]
    Identity(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::InvalidKey(key) => AppError::InvalidPartyId(key),
            SyncError::Identity(msg) => AppError::Identity(msg),
            SyncError::InvalidDocument(e) => AppError::InvalidDocument(e.to_string()),
            other => AppError::StorageError(other.to_string()),
        }
    }
}

impl From<ChecklistError> for AppError {
    fn from(err: ChecklistError) -> Self {
        AppError::InvalidDocument(err.to_string())
    }
}

#[derive(Serialize)]
struct JsonError {
    message: String,
    r#type: String,
}

#[derive(Serialize)]
struct JsonErrorWrapper {
    error: JsonError,
}

impl AppError {
    fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidPartyId(_) => "invalid_party_id",
            AppError::Identity(_) => "identity_error",
            AppError::InvalidDocument(_) => "invalid_document",
            _ => "api_error",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidPartyId(_) => StatusCode::BAD_REQUEST,
            AppError::Identity(_) => StatusCode::UNAUTHORIZED,
            AppError::InvalidDocument(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Config(_)
            | AppError::StorageError(_)
            | AppError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        if status_code.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        let error_response = JsonErrorWrapper {
            error: JsonError {
                message: self.to_string(),
                r#type: self.error_type().to_string(),
            },
        };
        HttpResponse::build(status_code).json(error_response)
    }
}
