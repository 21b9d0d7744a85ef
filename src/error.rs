//! Typed errors and HTTP mapping.

use crate::response::ErrorBody;
use crate::validation::ValidationErrors;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// SQLSTATE for a string that does not fit its column.
const STRING_DATA_RIGHT_TRUNCATION: &str = "22001";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation: {0}")]
    Validation(ValidationErrors),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    /// A request the framework refused before it reached a handler.
    #[error("rejected ({0}): {1}")]
    Rejected(StatusCode, String),
    #[error("internal: {0}")]
    Internal(String),
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}

fn db_status(e: &sqlx::Error) -> (StatusCode, &'static str) {
    match e {
        sqlx::Error::RowNotFound => (StatusCode::NOT_FOUND, "record not found"),
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            (StatusCode::CONFLICT, "a record with the same unique value already exists")
        }
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            (StatusCode::CONFLICT, "the record is still referenced or references a missing record")
        }
        sqlx::Error::Database(db) if db.code().as_deref() == Some(STRING_DATA_RIGHT_TRUNCATION) => {
            (StatusCode::BAD_REQUEST, "value too long for column")
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal server error"),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(errors) => return (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            AppError::Conflict(m) => (StatusCode::CONFLICT, m),
            AppError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            AppError::Rejected(status, m) => (status, m),
            AppError::Internal(m) => {
                tracing::error!(error = %m, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
            AppError::Db(e) => {
                let (status, message) = db_status(&e);
                if status.is_server_error() {
                    tracing::error!(error = %e, "database error");
                } else {
                    tracing::debug!(error = %e, status = %status, "database constraint");
                }
                (status, message.to_string())
            }
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
