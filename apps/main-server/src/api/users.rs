//! User management and authentication API endpoints.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use authz::{Action, Identity, authorize};
use entities::{GlobalRole, Project, User};
use project_store::ProjectStore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ServerError, ServerResult};
use crate::state::SharedState;
use crate::validation::{check_email, check_password, check_username};
use crate::api::views::{TaskDetail, UserView, task_detail};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<GlobalRole>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserView,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<GlobalRole>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub message: String,
    pub user: UserView,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// A user together with their activity counts.
#[derive(Debug, Serialize)]
pub struct UserWithActivity {
    #[serde(flatten)]
    pub user: UserView,
    /// Number of projects the user manages or is assigned into.
    pub projects: usize,
    /// Number of task assignments the user holds.
    pub tasks: usize,
}

/// Registers a new user and issues a token.
pub async fn register<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Json(request): Json<RegisterRequest>,
) -> ServerResult<Json<AuthResponse>> {
    let mut errors = Vec::new();
    check_username(&request.username, &mut errors);
    check_email(&request.email, &mut errors);
    check_password(&request.password, &mut errors);
    if !errors.is_empty() {
        return Err(ServerError::Validation(errors));
    }

    let password_hash = auth::hash_password(&request.password)?;
    let user = User::new(request.username, request.email, password_hash)
        .with_role(request.role.unwrap_or_default());
    let user = state.store.create_user(user).await?;

    let token = state.jwt_manager.generate_token(user.id, user.role)?;
    tracing::info!(user_id = %user.id, role = %user.role, "user registered");

    Ok(Json(AuthResponse {
        message: "User registered successfully".to_string(),
        user: UserView::from(&user),
        token,
    }))
}

/// Authenticates a user by email and password.
pub async fn login<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Json(request): Json<LoginRequest>,
) -> ServerResult<Json<AuthResponse>> {
    let user = state
        .store
        .get_user_by_email(&request.email)
        .await?
        .ok_or(auth::AuthError::InvalidCredentials)?;

    if !auth::verify_password(&request.password, &user.password_hash)? {
        return Err(auth::AuthError::InvalidCredentials.into());
    }

    let token = state.jwt_manager.generate_token(user.id, user.role)?;
    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user: UserView::from(&user),
        token,
    }))
}

/// Lists all users with activity counts.
pub async fn list_users<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Extension(identity): Extension<Identity>,
) -> ServerResult<Json<Vec<UserWithActivity>>> {
    authorize(&identity, &Action::ListUsers)?;

    let users = state.store.list_users().await?;
    let mut result = Vec::with_capacity(users.len());
    for user in &users {
        let tasks = state.store.list_user_assignments(user.id).await?.len();
        let projects = state.store.list_user_projects(user.id).await?.len();
        result.push(UserWithActivity {
            user: UserView::from(user),
            projects,
            tasks,
        });
    }

    Ok(Json(result))
}

/// Gets a user by ID.
pub async fn get_user<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> ServerResult<Json<UserView>> {
    let user = state
        .store
        .get_user(id)
        .await?
        .ok_or_else(|| ServerError::NotFound("User not found".to_string()))?;

    authorize(&identity, &Action::ViewUser { user_id: id })?;

    Ok(Json(UserView::from(&user)))
}

/// Updates a user profile. Role changes are admin-only; a non-admin request
/// carrying a role field is denied whole.
pub async fn update_user<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> ServerResult<Json<UserResponse>> {
    let mut user = state
        .store
        .get_user(id)
        .await?
        .ok_or_else(|| ServerError::NotFound("User not found".to_string()))?;

    authorize(
        &identity,
        &Action::EditUser {
            user_id: id,
            changes_role: request.role.is_some(),
        },
    )?;

    let mut errors = Vec::new();
    if let Some(username) = &request.username {
        check_username(username, &mut errors);
    }
    if let Some(email) = &request.email {
        check_email(email, &mut errors);
    }
    if let Some(password) = &request.password {
        check_password(password, &mut errors);
    }
    if !errors.is_empty() {
        return Err(ServerError::Validation(errors));
    }

    if let Some(username) = request.username {
        user.username = username;
    }
    if let Some(email) = request.email {
        user.email = email;
    }
    if let Some(password) = request.password {
        user.password_hash = auth::hash_password(&password)?;
    }
    if let Some(role) = request.role {
        user.role = role;
    }

    let user = state.store.update_user(user).await?;
    tracing::info!(user_id = %user.id, "user updated");

    Ok(Json(UserResponse {
        message: "User updated successfully".to_string(),
        user: UserView::from(&user),
    }))
}

/// Deletes a user. Admin only; refused while the user still manages a
/// project or has created tasks.
pub async fn delete_user<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> ServerResult<Json<MessageResponse>> {
    state
        .store
        .get_user(id)
        .await?
        .ok_or_else(|| ServerError::NotFound("User not found".to_string()))?;

    authorize(&identity, &Action::DeleteUser { user_id: id })?;

    state.store.delete_user(id).await?;

    Ok(Json(MessageResponse {
        message: "User deleted successfully".to_string(),
    }))
}

/// Lists the tasks assigned to a user.
pub async fn get_user_tasks<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> ServerResult<Json<Vec<TaskDetail>>> {
    state
        .store
        .get_user(id)
        .await?
        .ok_or_else(|| ServerError::NotFound("User not found".to_string()))?;

    authorize(&identity, &Action::ViewUser { user_id: id })?;

    let tasks = state.store.list_user_tasks(id).await?;
    let mut details = Vec::with_capacity(tasks.len());
    for task in &tasks {
        details.push(task_detail(&state.store, task).await?);
    }

    Ok(Json(details))
}

/// Lists the projects a user belongs to, managed ones first.
pub async fn get_user_projects<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> ServerResult<Json<Vec<Project>>> {
    state
        .store
        .get_user(id)
        .await?
        .ok_or_else(|| ServerError::NotFound("User not found".to_string()))?;

    authorize(&identity, &Action::ViewUser { user_id: id })?;

    let projects = state.store.list_user_projects(id).await?;
    Ok(Json(projects))
}
