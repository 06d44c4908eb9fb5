//! Crate-wide error type
//!
//! Every fallible operation in the service layer returns [`ServiceError`].
//! The HTTP boundary maps variants to stable status codes via
//! [`ServiceError::http_status`]; password mismatches and alias collisions
//! are routine outcomes here, not bugs.

use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};

/// A single field-level validation failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ServiceError {
    /// Alias or record unknown.
    NotFound(String),
    /// Duplicate alias or duplicate unique field.
    Conflict(String),
    /// Missing/invalid credential or password mismatch.
    Unauthorized(String),
    /// Authenticated but not the owner.
    Forbidden(String),
    /// Malformed input rejected before any core logic runs.
    BadRequest(String),
    /// Schema-level input rejection with a field error list.
    Validation(Vec<FieldError>),
    DatabaseConfig(String),
    DatabaseConnection(String),
    Database(String),
    PasswordHash(String),
    QrRender(String),
    Internal(String),
}

impl ServiceError {
    pub fn error_type(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => "Not Found",
            ServiceError::Conflict(_) => "Conflict",
            ServiceError::Unauthorized(_) => "Unauthorized",
            ServiceError::Forbidden(_) => "Forbidden",
            ServiceError::BadRequest(_) => "Bad Request",
            ServiceError::Validation(_) => "Validation Failed",
            ServiceError::DatabaseConfig(_) => "Database Configuration Error",
            ServiceError::DatabaseConnection(_) => "Database Connection Error",
            ServiceError::Database(_) => "Database Operation Error",
            ServiceError::PasswordHash(_) => "Password Hash Error",
            ServiceError::QrRender(_) => "QR Render Error",
            ServiceError::Internal(_) => "Internal Error",
        }
    }

    pub fn message(&self) -> String {
        match self {
            ServiceError::NotFound(msg)
            | ServiceError::Conflict(msg)
            | ServiceError::Unauthorized(msg)
            | ServiceError::Forbidden(msg)
            | ServiceError::BadRequest(msg)
            | ServiceError::DatabaseConfig(msg)
            | ServiceError::DatabaseConnection(msg)
            | ServiceError::Database(msg)
            | ServiceError::PasswordHash(msg)
            | ServiceError::QrRender(msg)
            | ServiceError::Internal(msg) => msg.clone(),
            ServiceError::Validation(fields) => fields
                .iter()
                .map(|f| format!("{}: {}", f.field, f.message))
                .collect::<Vec<_>>()
                .join("; "),
        }
    }

    /// Stable status code for the HTTP boundary.
    pub fn http_status(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Conflict(_) => StatusCode::CONFLICT,
            ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
            ServiceError::BadRequest(_) | ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn field_errors(&self) -> Option<&[FieldError]> {
        match self {
            ServiceError::Validation(fields) => Some(fields),
            _ => None,
        }
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_type(), self.message())
    }
}

impl std::error::Error for ServiceError {}

impl ServiceError {
    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        ServiceError::NotFound(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        ServiceError::Conflict(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        ServiceError::Unauthorized(msg.into())
    }

    pub fn forbidden<T: Into<String>>(msg: T) -> Self {
        ServiceError::Forbidden(msg.into())
    }

    pub fn bad_request<T: Into<String>>(msg: T) -> Self {
        ServiceError::BadRequest(msg.into())
    }

    pub fn validation(fields: Vec<FieldError>) -> Self {
        ServiceError::Validation(fields)
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        ServiceError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        ServiceError::DatabaseConnection(msg.into())
    }

    pub fn database<T: Into<String>>(msg: T) -> Self {
        ServiceError::Database(msg.into())
    }

    pub fn password_hash<T: Into<String>>(msg: T) -> Self {
        ServiceError::PasswordHash(msg.into())
    }

    pub fn qr_render<T: Into<String>>(msg: T) -> Self {
        ServiceError::QrRender(msg.into())
    }

    pub fn internal<T: Into<String>>(msg: T) -> Self {
        ServiceError::Internal(msg.into())
    }
}

/// Detect a unique-constraint rejection inside a sea-orm error.
///
/// The unique index is the authoritative arbiter for alias and email
/// collisions, so its rejection must surface as `Conflict` rather than a
/// generic database failure. Matched per backend: SQLite 2067/1555,
/// MySQL 1062, PostgreSQL 23505, plus a message fallback.
pub fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
    use sea_orm::error::RuntimeErr;

    let runtime_err = match err {
        sea_orm::DbErr::Exec(e) | sea_orm::DbErr::Query(e) => e,
        _ => return false,
    };

    match runtime_err {
        RuntimeErr::SqlxError(sqlx_err) => {
            use std::ops::Deref;
            if let Some(db_err) = sqlx_err.deref().as_database_error() {
                if db_err.is_unique_violation() {
                    return true;
                }
                if let Some(code) = db_err.code() {
                    return matches!(code.as_ref(), "2067" | "1555" | "1062" | "23505");
                }
            }
            let msg = sqlx_err.to_string().to_lowercase();
            msg.contains("unique constraint") || msg.contains("duplicate")
        }
        RuntimeErr::Internal(msg) => {
            let msg = msg.to_lowercase();
            msg.contains("unique constraint") || msg.contains("duplicate")
        }
        #[allow(unreachable_patterns)]
        _ => false,
    }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(err: sea_orm::DbErr) -> Self {
        if is_unique_violation(&err) {
            ServiceError::Conflict(format!("Duplicate unique value: {}", err))
        } else {
            ServiceError::Database(err.to_string())
        }
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(err: std::io::Error) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
