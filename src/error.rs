//! Error types for the catalog server

use std::borrow::Cow;

use axum::{
    extract::rejection::PathRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use validator::{ValidationError, ValidationErrors};

/// Machine-readable error codes returned alongside every error response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    NotAuthenticated = 2,
    PermissionDenied = 3,
    DbFailure = 4,
    NotFound = 5,
    BadValue = 6,
    Duplicate = 7,
    ReferentialDelete = 8,
    SessionFailure = 9,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Permission denied: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Field-level validation errors, reported back per form field
    #[error("Invalid fields: {0}")]
    InvalidFields(#[from] ValidationErrors),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Deletion blocked because other records still reference this one
    #[error("Cannot delete {resource} {id}: {dependents} dependent record(s) still reference it")]
    ReferentialDelete {
        resource: &'static str,
        id: i32,
        dependents: i64,
    },

    #[error("Session store error: {0}")]
    Session(String),
}

impl AppError {
    /// Build a single field error, e.g. an unknown author reference in a book form
    pub fn field(field: &'static str, code: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        let mut error = ValidationError::new(code);
        error.message = Some(message.into());

        let mut errors = ValidationErrors::new();
        errors.add(field, error);
        AppError::InvalidFields(errors)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::InvalidFields(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) | AppError::ReferentialDelete { .. } => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[serde_with::skip_serializing_none]
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
    /// Per-field validation messages, keyed by form field name
    #[schema(value_type = Option<Object>)]
    pub fields: Option<serde_json::Value>,
    /// Where the client should go to retry a blocked deletion
    pub retry: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut fields = None;
        let mut retry = None;

        let (code, message) = match &self {
            AppError::Authentication(msg) => (ErrorCode::NotAuthenticated, msg.clone()),
            AppError::Authorization(msg) => (ErrorCode::PermissionDenied, msg.clone()),
            AppError::NotFound(msg) => (ErrorCode::NotFound, msg.clone()),
            AppError::Validation(msg) => (ErrorCode::BadValue, msg.clone()),
            AppError::InvalidFields(errors) => {
                fields = serde_json::to_value(errors).ok();
                (ErrorCode::BadValue, "Invalid form data".to_string())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (ErrorCode::DbFailure, "Database error".to_string())
            }
            AppError::Conflict(msg) => (ErrorCode::Duplicate, msg.clone()),
            AppError::ReferentialDelete { resource, id, .. } => {
                retry = Some(format!("/api/v1/{}s/{}/delete", resource, id));
                (ErrorCode::ReferentialDelete, self.to_string())
            }
            AppError::Session(msg) => {
                tracing::error!("Session store error: {}", msg);
                (ErrorCode::SessionFailure, "Session store error".to_string())
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
            fields,
            retry,
        });

        (status, body).into_response()
    }
}

/// An id in the URL that cannot be parsed names no record
impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::NotFound(rejection.body_text())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

/// Whether a sqlx error is a foreign key violation (dependent rows still exist)
pub(crate) fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23503"))
}

/// Map a sqlx error raised while writing a row, turning unique violations into conflicts
pub(crate) fn map_write_error(e: sqlx::Error, what: &str) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some("23505") {
            return AppError::Conflict(format!("{} already exists", what));
        }
    }
    AppError::Database(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(
            AppError::Authentication("no token".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Authorization("nope".into()).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::field("renewal_date", "past_date", "in the past").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::ReferentialDelete { resource: "author", id: 3, dependents: 2 }.status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn field_error_is_keyed_by_field() {
        let AppError::InvalidFields(errors) = AppError::field("author_id", "unknown", "No such author")
        else {
            panic!("expected field errors");
        };
        let value = serde_json::to_value(&errors).unwrap();
        assert_eq!(value["author_id"][0]["code"], "unknown");
        assert_eq!(value["author_id"][0]["message"], "No such author");
    }

    #[test]
    fn blocked_delete_points_to_confirmation() {
        let response = AppError::ReferentialDelete { resource: "book", id: 7, dependents: 1 }.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
