//! Project management API endpoints.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use authz::{Action, Identity, authorize};
use chrono::NaiveDate;
use entities::{Project, ProjectStats, ProjectStatus, TaskStatus, TeamMember};
use project_store::ProjectStore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::views::{ProjectDetail, TaskDetail, project_detail, task_detail};
use crate::error::{ServerError, ServerResult};
use crate::state::SharedState;
use crate::validation::{check_date_range, check_title};

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub manager_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub message: String,
    pub project: ProjectDetail,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct AddTeamMemberRequest {
    pub user_id: Uuid,
}

async fn load_project<S: ProjectStore>(state: &SharedState<S>, id: Uuid) -> ServerResult<Project> {
    state
        .store
        .get_project(id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Project not found".to_string()))
}

/// Creates a new project managed by the caller.
pub async fn create_project<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<CreateProjectRequest>,
) -> ServerResult<Json<ProjectResponse>> {
    authorize(&identity, &Action::CreateProject)?;

    let mut errors = Vec::new();
    check_title(&request.title, &mut errors);
    check_date_range(request.start_date, request.end_date, &mut errors);
    if !errors.is_empty() {
        return Err(ServerError::Validation(errors));
    }

    let mut project = Project::new(request.title, identity.id);
    project.description = request.description;
    project.status = request.status.unwrap_or_default();
    project.start_date = request.start_date;
    project.end_date = request.end_date;

    let project = state.store.create_project(project).await?;
    tracing::info!(project_id = %project.id, "project created");

    Ok(Json(ProjectResponse {
        message: "Project created successfully".to_string(),
        project: project_detail(&state.store, &project, false).await?,
    }))
}

/// Lists all projects with their managers.
pub async fn list_projects<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Extension(identity): Extension<Identity>,
) -> ServerResult<Json<Vec<ProjectDetail>>> {
    authorize(&identity, &Action::ViewProject)?;

    let projects = state.store.list_projects().await?;
    let mut details = Vec::with_capacity(projects.len());
    for project in &projects {
        details.push(project_detail(&state.store, project, false).await?);
    }
    Ok(Json(details))
}

/// Gets a project with its tasks and assignees.
pub async fn get_project<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> ServerResult<Json<ProjectDetail>> {
    let project = load_project(&state, id).await?;
    authorize(&identity, &Action::ViewProject)?;

    Ok(Json(project_detail(&state.store, &project, true).await?))
}

/// Updates a project. Manager reassignment is restricted to the current
/// manager or an admin, and the new manager must exist.
pub async fn update_project<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateProjectRequest>,
) -> ServerResult<Json<ProjectResponse>> {
    let mut project = load_project(&state, id).await?;

    authorize(
        &identity,
        &Action::EditProject {
            project_id: project.id,
            manager_id: project.manager_id,
        },
    )?;

    let mut errors = Vec::new();
    if let Some(title) = &request.title {
        check_title(title, &mut errors);
    }
    check_date_range(
        request.start_date.or(project.start_date),
        request.end_date.or(project.end_date),
        &mut errors,
    );
    if !errors.is_empty() {
        return Err(ServerError::Validation(errors));
    }

    if let Some(title) = request.title {
        project.title = title;
    }
    if let Some(description) = request.description {
        project.description = Some(description);
    }
    if let Some(status) = request.status {
        project.status = status;
    }
    if let Some(start_date) = request.start_date {
        project.start_date = Some(start_date);
    }
    if let Some(end_date) = request.end_date {
        project.end_date = Some(end_date);
    }
    if let Some(manager_id) = request.manager_id {
        state
            .store
            .get_user(manager_id)
            .await?
            .ok_or_else(|| ServerError::NotFound("New manager not found".to_string()))?;
        project.manager_id = manager_id;
    }

    let project = state.store.update_project(project).await?;
    tracing::info!(project_id = %project.id, "project updated");

    Ok(Json(ProjectResponse {
        message: "Project updated successfully".to_string(),
        project: project_detail(&state.store, &project, false).await?,
    }))
}

/// Deletes a project, cascading its tasks and assignments.
pub async fn delete_project<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> ServerResult<Json<MessageResponse>> {
    let project = load_project(&state, id).await?;

    authorize(
        &identity,
        &Action::DeleteProject {
            project_id: project.id,
            manager_id: project.manager_id,
        },
    )?;

    state.store.delete_project(id).await?;

    Ok(Json(MessageResponse {
        message: "Project deleted successfully".to_string(),
    }))
}

/// Lists the tasks under a project.
pub async fn get_project_tasks<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> ServerResult<Json<Vec<TaskDetail>>> {
    load_project(&state, id).await?;
    authorize(&identity, &Action::ViewProject)?;

    let tasks = state.store.list_project_tasks(id).await?;
    let mut details = Vec::with_capacity(tasks.len());
    for task in &tasks {
        details.push(task_detail(&state.store, task).await?);
    }
    Ok(Json(details))
}

/// Computes task statistics for a project.
pub async fn get_project_stats<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> ServerResult<Json<ProjectStats>> {
    load_project(&state, id).await?;
    authorize(&identity, &Action::ViewProject)?;

    let tasks = state.store.list_project_tasks(id).await?;

    let total_tasks = tasks.len();
    let count = |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count();
    let completed_tasks = count(TaskStatus::Done);
    let total_estimated_hours: f64 = tasks.iter().filter_map(|t| t.estimated_hours).sum();
    let total_actual_hours: f64 = tasks.iter().filter_map(|t| t.actual_hours).sum();

    let stats = ProjectStats {
        total_tasks,
        backlog_tasks: count(TaskStatus::Backlog),
        todo_tasks: count(TaskStatus::Todo),
        in_progress_tasks: count(TaskStatus::InProgress),
        review_tasks: count(TaskStatus::Review),
        completed_tasks,
        completion_rate: if total_tasks > 0 {
            (completed_tasks as f64 / total_tasks as f64) * 100.0
        } else {
            0.0
        },
        total_estimated_hours,
        total_actual_hours,
        hours_variance: total_estimated_hours - total_actual_hours,
    };

    Ok(Json(stats))
}

/// Resolves a project's team.
pub async fn get_project_team<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> ServerResult<Json<Vec<TeamMember>>> {
    load_project(&state, id).await?;
    authorize(&identity, &Action::ViewProject)?;

    Ok(Json(state.store.resolve_team(id).await?))
}

/// Adds a user to a project's team by assigning them to one of its tasks.
pub async fn add_team_member<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(request): Json<AddTeamMemberRequest>,
) -> ServerResult<Json<Vec<TeamMember>>> {
    let project = load_project(&state, id).await?;

    authorize(
        &identity,
        &Action::ManageTeam {
            project_id: project.id,
            manager_id: project.manager_id,
        },
    )?;

    let team = state
        .store
        .add_team_member(id, request.user_id, identity.id)
        .await?;
    tracing::info!(project_id = %id, user_id = %request.user_id, "team member added");

    Ok(Json(team))
}

/// Removes a user from every task in the project.
pub async fn remove_team_member<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Extension(identity): Extension<Identity>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> ServerResult<Json<Vec<TeamMember>>> {
    let project = load_project(&state, id).await?;

    authorize(
        &identity,
        &Action::ManageTeam {
            project_id: project.id,
            manager_id: project.manager_id,
        },
    )?;

    let team = state.store.remove_team_member(id, user_id).await?;
    tracing::info!(project_id = %id, user_id = %user_id, "team member removed");

    Ok(Json(team))
}
