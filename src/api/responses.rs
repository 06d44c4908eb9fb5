//! API response envelope
//!
//! Every API-style endpoint answers `{success, message, data?, errors?}`;
//! `errors` carries the field-level list for validation rejections. The
//! interactive redirect surface does not use this envelope.

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;

use crate::errors::{FieldError, Result, ServiceError};

#[derive(Serialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

pub fn json_response<T: Serialize>(
    status: StatusCode,
    success: bool,
    message: impl Into<String>,
    data: Option<T>,
    errors: Option<Vec<FieldError>>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            success,
            message: message.into(),
            data,
            errors,
        })
}

pub fn success_response<T: Serialize>(message: impl Into<String>, data: T) -> HttpResponse {
    json_response(StatusCode::OK, true, message, Some(data), None)
}

pub fn created_response<T: Serialize>(message: impl Into<String>, data: T) -> HttpResponse {
    json_response(StatusCode::CREATED, true, message, Some(data), None)
}

/// Map a service error to its envelope; validation errors carry fields.
pub fn error_response(err: &ServiceError) -> HttpResponse {
    json_response::<()>(
        err.http_status(),
        false,
        err.message(),
        None,
        err.field_errors().map(|f| f.to_vec()),
    )
}

/// Uniform `Result` → envelope conversion for handlers.
pub fn api_result<T: Serialize>(message: &str, result: Result<T>) -> HttpResponse {
    match result {
        Ok(data) => success_response(message, data),
        Err(e) => error_response(&e),
    }
}
