//! Error types for transformer

use serde::{Deserialize, Serialize};
use thiserror::Error;
use transformer_formula::FormulaError;

/// Result type alias using [`ApiError`]
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// A failure reported to a caller as a `{message, status}` payload
///
/// `status` follows HTTP conventions: 400 for bad input, 404 for an unknown
/// transform, 500 for anything unanticipated.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
    pub status: u16,
}

impl ApiError {
    pub fn new<S: Into<String>>(message: S, status: u16) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }

    /// 400
    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::new(message, 400)
    }

    /// 404
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::new(message, 404)
    }

    /// 500
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::new(message, 500)
    }

    /// JSON payload `{"message": ..., "status": ...}`
    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "message": self.message,
            "status": self.status,
        })
    }
}

impl From<FormulaError> for ApiError {
    fn from(err: FormulaError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

/// Errors raised while building a [`crate::Registry`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A transform with the same `category.name` key is already registered
    #[error("Transform with the name {0} already exists")]
    Duplicate(String),
}
