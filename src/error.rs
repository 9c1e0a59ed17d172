use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;

/// Field name to the messages reported against it.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0:?}")]
    Validation(FieldErrors),

    #[error("Not found.")]
    NotFound,

    /// Business rule rejection, the message goes back to the caller as is.
    #[error("{0}")]
    Rejected(String),

    #[error("Authentication credentials were not provided.")]
    Unauthenticated,

    #[error("You do not have permission to perform this action.")]
    Forbidden,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Storage error: {0}")]
    Storage(StoreError),

    #[error("Password hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(what) => AppError::Conflict(format!("{} already exists", what)),
            other => AppError::Storage(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            AppError::NotFound | AppError::Rejected(_) => {
                let status = if matches!(self, AppError::NotFound) {
                    StatusCode::NOT_FOUND
                } else {
                    StatusCode::NOT_ACCEPTABLE
                };
                (status, Json(json!({ "message": self.to_string() }))).into_response()
            }
            AppError::Unauthenticated | AppError::Forbidden => {
                (StatusCode::FORBIDDEN, Json(json!({ "detail": self.to_string() }))).into_response()
            }
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "detail": self.to_string() }))).into_response()
            }
            AppError::Conflict(_) => {
                (StatusCode::CONFLICT, Json(json!({ "detail": self.to_string() }))).into_response()
            }
            AppError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "detail": self.to_string() }))).into_response()
            }
            AppError::Storage(_) | AppError::Hash(_) => {
                tracing::error!("Request failed: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "Internal server error" })),
                )
                    .into_response()
            }
        }
    }
}
