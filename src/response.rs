//! Response bodies shared by all handlers.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Confirmation returned by mutations.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

pub fn message(status: StatusCode, text: impl Into<String>) -> (StatusCode, Json<MessageBody>) {
    (status, Json(MessageBody { message: text.into() }))
}

pub fn created(text: impl Into<String>) -> (StatusCode, Json<MessageBody>) {
    message(StatusCode::CREATED, text)
}

pub fn ok(text: impl Into<String>) -> (StatusCode, Json<MessageBody>) {
    message(StatusCode::OK, text)
}
