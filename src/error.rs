//! Application error taxonomy.
//!
//! Every fallible operation in the crate returns [`AppError`]. Variants carry a
//! human-readable message plus structured JSON details for logging and for
//! front ends that render errors (see [`AppError::to_error_info`]).

use serde::Serialize;
use serde_json::{Value, json};

/// Serializable error body: `{ "code": ..., "message": ..., "details": ... }`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Caller input out of range (page, limit).
    #[error("{message}")]
    Validation { message: String, details: Value },

    /// Unknown link id or short code. No mutation has taken place.
    #[error("{message}")]
    NotFound { message: String, details: Value },

    /// Opaque persistence failure: connectivity, constraint violation, timeout.
    #[error("{message}")]
    Storage { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn storage(message: impl Into<String>, details: Value) -> Self {
        Self::Storage {
            message: message.into(),
            details,
        }
    }

    /// Stable machine-readable code for the variant.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::NotFound { .. } => "not_found",
            AppError::Storage { .. } => "storage_error",
        }
    }

    pub fn details(&self) -> &Value {
        match self {
            AppError::Validation { details, .. }
            | AppError::NotFound { details, .. }
            | AppError::Storage { details, .. } => details,
        }
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        ErrorInfo {
            code: self.code(),
            message: self.to_string(),
            details: self.details().clone(),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e)
    }
}

pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return AppError::storage(
                "Unique constraint violation",
                json!({ "constraint": db.constraint() }),
            );
        }
        if db.is_foreign_key_violation() {
            return AppError::storage(
                "Foreign key violation",
                json!({ "constraint": db.constraint() }),
            );
        }
    }

    tracing::error!(error = %e, "Database error");
    AppError::storage("Database error", json!({}))
}
