//! Authentication middleware.

use std::sync::Arc;

use authz::Identity;
use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use project_store::ProjectStore;
use serde_json::json;

use crate::error::error_codes;
use crate::state::AppState;

/// Extracts the JWT token from the Authorization header.
fn extract_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": { "code": error_codes::AUTHENTICATION_REQUIRED, "message": message }
        })),
    )
        .into_response()
}

/// Authentication middleware.
///
/// Extracts the bearer token, validates it, and re-reads the user record so
/// the identity carries the current global role rather than the one at token
/// issue time. The resulting [`Identity`] is stored in request extensions
/// for handlers to consume.
pub async fn auth_middleware<S: ProjectStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match extract_token(&request) {
        Some(token) => token,
        None => return unauthorized("Missing authorization header"),
    };

    let claims = match state.jwt_manager.validate_token(token) {
        Ok(claims) => claims,
        Err(_) => return unauthorized("Invalid token"),
    };

    let user_id = match claims.user_id() {
        Ok(id) => id,
        Err(_) => return unauthorized("Invalid token claims"),
    };

    // The token may outlive the account; a deleted user fails closed here.
    let user = match state.store.get_user(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return unauthorized("User no longer exists"),
        Err(e) => {
            tracing::error!(error = %e, "user lookup failed during authentication");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": { "code": error_codes::INTERNAL_ERROR, "message": "Authentication failed" }
                })),
            )
                .into_response();
        }
    };

    request
        .extensions_mut()
        .insert(Identity::new(user.id, user.role));

    next.run(request).await
}
