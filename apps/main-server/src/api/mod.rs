//! API endpoints.

pub mod comments;
pub mod projects;
pub mod tasks;
pub mod users;
pub mod views;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use project_store::ProjectStore;

use crate::state::SharedState;

/// Creates the API router with all endpoints.
///
/// Registration, login, and the health check are public; everything else
/// sits behind the authentication middleware.
pub fn create_router<S: ProjectStore + 'static>(state: SharedState<S>) -> Router {
    let public = Router::new()
        .route("/api/users/register", post(users::register))
        .route("/api/users/login", post(users::login))
        .route("/health", get(health_check));

    let protected = Router::new()
        // User endpoints
        .route("/api/users", get(users::list_users))
        .route("/api/users/:id", get(users::get_user))
        .route("/api/users/:id", put(users::update_user))
        .route("/api/users/:id", delete(users::delete_user))
        .route("/api/users/:id/tasks", get(users::get_user_tasks))
        .route("/api/users/:id/projects", get(users::get_user_projects))
        // Project endpoints
        .route("/api/projects", post(projects::create_project))
        .route("/api/projects", get(projects::list_projects))
        .route("/api/projects/:id", get(projects::get_project))
        .route("/api/projects/:id", put(projects::update_project))
        .route("/api/projects/:id", delete(projects::delete_project))
        .route("/api/projects/:id/tasks", get(projects::get_project_tasks))
        .route("/api/projects/:id/stats", get(projects::get_project_stats))
        // Team endpoints
        .route("/api/projects/:id/team", get(projects::get_project_team))
        .route("/api/projects/:id/team", post(projects::add_team_member))
        .route(
            "/api/projects/:id/team/:user_id",
            delete(projects::remove_team_member),
        )
        // Task endpoints
        .route("/api/tasks", post(tasks::create_task))
        .route("/api/tasks", get(tasks::list_tasks))
        .route("/api/tasks/:id", get(tasks::get_task))
        .route("/api/tasks/:id", put(tasks::update_task))
        .route("/api/tasks/:id", delete(tasks::delete_task))
        .route("/api/tasks/:id/assign", post(tasks::assign_task))
        .route("/api/tasks/:id/assign-user", post(tasks::assign_single_user))
        .route(
            "/api/tasks/:id/assign/:user_id",
            delete(tasks::remove_assignee),
        )
        .route("/api/tasks/:id/status", put(tasks::update_assignment_status))
        // Comment endpoints
        .route("/api/comments", post(comments::create_comment))
        .route(
            "/api/comments/task/:task_id",
            get(comments::get_task_comments),
        )
        .route("/api/comments/:id", put(comments::update_comment))
        .route("/api/comments/:id", delete(comments::delete_comment))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::auth::auth_middleware::<S>,
        ));

    public.merge(protected).with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
