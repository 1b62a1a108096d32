//! Server error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Stable error codes consumed by clients.
pub mod error_codes {
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const RESOURCE_NOT_FOUND: &str = "RESOURCE_NOT_FOUND";
    pub const AUTHENTICATION_REQUIRED: &str = "AUTHENTICATION_REQUIRED";
    pub const PERMISSION_DENIED: &str = "PERMISSION_DENIED";
    pub const CONFLICT: &str = "CONFLICT";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Invalid request parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Field validation failed.
    #[error("Validation failed")]
    Validation(Vec<String>),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authentication required.
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Permission denied. Distinct from `NotFound`: the entity exists, the
    /// caller may not act on it.
    #[error(transparent)]
    Forbidden(#[from] authz::Forbidden),

    /// Store error.
    #[error("Store error: {0}")]
    Store(#[from] project_store::StoreError),

    /// Authentication error.
    #[error("Auth error: {0}")]
    Auth(#[from] auth::AuthError),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        use project_store::StoreError;

        let (status, error_code, message, fields) = match &self {
            ServerError::InvalidRequest(msg) => (
                StatusCode::BAD_REQUEST,
                error_codes::INVALID_REQUEST,
                msg.clone(),
                None,
            ),
            ServerError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                error_codes::VALIDATION_FAILED,
                "Validation failed".to_string(),
                Some(errors.clone()),
            ),
            ServerError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                error_codes::RESOURCE_NOT_FOUND,
                msg.clone(),
                None,
            ),
            ServerError::AuthenticationRequired => (
                StatusCode::UNAUTHORIZED,
                error_codes::AUTHENTICATION_REQUIRED,
                "Authentication required".to_string(),
                None,
            ),
            ServerError::Forbidden(denied) => (
                StatusCode::FORBIDDEN,
                error_codes::PERMISSION_DENIED,
                denied.to_string(),
                None,
            ),
            ServerError::Store(e) => match e {
                StoreError::NotFound { .. } => (
                    StatusCode::NOT_FOUND,
                    error_codes::RESOURCE_NOT_FOUND,
                    e.to_string(),
                    None,
                ),
                StoreError::AlreadyExists { .. }
                | StoreError::AlreadyAssigned { .. }
                | StoreError::NotAssigned { .. }
                | StoreError::Conflict(_) => (
                    StatusCode::BAD_REQUEST,
                    error_codes::CONFLICT,
                    e.to_string(),
                    None,
                ),
                StoreError::Transaction(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_codes::INTERNAL_ERROR,
                    e.to_string(),
                    None,
                ),
            },
            ServerError::Auth(e) => match e {
                auth::AuthError::InvalidCredentials => (
                    StatusCode::BAD_REQUEST,
                    error_codes::INVALID_REQUEST,
                    e.to_string(),
                    None,
                ),
                auth::AuthError::TokenExpired | auth::AuthError::InvalidToken => (
                    StatusCode::UNAUTHORIZED,
                    error_codes::AUTHENTICATION_REQUIRED,
                    e.to_string(),
                    None,
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_codes::INTERNAL_ERROR,
                    e.to_string(),
                    None,
                ),
            },
            ServerError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::INTERNAL_ERROR,
                msg.clone(),
                None,
            ),
        };

        let body = match fields {
            Some(fields) => json!({
                "error": {
                    "code": error_code,
                    "message": message,
                    "fields": fields,
                }
            }),
            None => json!({
                "error": {
                    "code": error_code,
                    "message": message,
                }
            }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use project_store::StoreError;
    use uuid::Uuid;

    fn status_of(err: ServerError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_forbidden_maps_to_403() {
        let denied = authz::Forbidden {
            action: "update",
            entity: authz::EntityKind::Project,
            id: Some(Uuid::new_v4()),
        };
        assert_eq!(status_of(ServerError::Forbidden(denied)), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_store_not_found_maps_to_404() {
        let err = ServerError::Store(StoreError::not_found("Task", Uuid::new_v4()));
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_ledger_conflict_maps_to_400() {
        let err = ServerError::Store(StoreError::AlreadyAssigned {
            user_id: Uuid::new_v4(),
            task_id: Uuid::new_v4(),
        });
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_validation_lists_fields() {
        let err = ServerError::Validation(vec!["Title is required".to_string()]);
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }
}
