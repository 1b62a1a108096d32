//! Task management API endpoints.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use authz::{Action, Identity, TaskField, TaskRelation, authorize};
use chrono::{DateTime, Utc};
use entities::{Assignment, AssignmentStatus, Task, TaskPriority, TaskStatus};
use project_store::{ProjectStore, TaskQuery};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::views::{AssigneeView, TaskDetail, task_detail};
use crate::error::{ServerError, ServerResult};
use crate::state::SharedState;
use crate::validation::{check_hours, check_title};

#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub estimated_hours: Option<f64>,
    pub due_date: Option<DateTime<Utc>>,
    pub project_id: Uuid,
    pub assignee_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub estimated_hours: Option<f64>,
    pub actual_hours: Option<f64>,
    pub due_date: Option<DateTime<Utc>>,
    pub project_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub project_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct AssignTaskRequest {
    pub user_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct AssignUserRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAssignmentStatusRequest {
    pub status: AssignmentStatus,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub message: String,
    pub task: TaskDetail,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct AssigneesResponse {
    pub message: String,
    pub assignees: Vec<AssigneeView>,
}

#[derive(Debug, Serialize)]
pub struct AssignmentResponse {
    pub message: String,
    pub assignment: Assignment,
}

async fn load_task<S: ProjectStore>(state: &SharedState<S>, id: Uuid) -> ServerResult<Task> {
    state
        .store
        .get_task(id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Task not found".to_string()))
}

/// Gathers the caller's relationship to a task for the policy engine.
async fn task_relation<S: ProjectStore>(
    state: &SharedState<S>,
    task: &Task,
    identity: &Identity,
) -> ServerResult<TaskRelation> {
    let project = state
        .store
        .get_project(task.project_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Project not found".to_string()))?;
    let is_assignee = state.store.is_assignee(task.id, identity.id).await?;

    Ok(TaskRelation {
        task_id: task.id,
        creator_id: task.creator_id,
        project_manager_id: project.manager_id,
        is_assignee,
    })
}

async fn assignee_views<S: ProjectStore>(
    state: &SharedState<S>,
    assignments: &[Assignment],
) -> ServerResult<Vec<AssigneeView>> {
    let mut views = Vec::with_capacity(assignments.len());
    for assignment in assignments {
        if let Some(user) = state.store.get_user(assignment.user_id).await? {
            views.push(AssigneeView {
                id: user.id,
                username: user.username,
                email: user.email,
                role: user.role,
                status: assignment.status,
                assigned_at: assignment.assigned_at,
            });
        }
    }
    Ok(views)
}

/// Creates a task, optionally attaching assignees in the same operation.
pub async fn create_task<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<CreateTaskRequest>,
) -> ServerResult<Json<TaskResponse>> {
    authorize(&identity, &Action::CreateTask)?;

    let mut errors = Vec::new();
    check_title(&request.title, &mut errors);
    check_hours("Estimated hours", request.estimated_hours, &mut errors);
    if !errors.is_empty() {
        return Err(ServerError::Validation(errors));
    }

    state
        .store
        .get_project(request.project_id)
        .await?
        .ok_or_else(|| ServerError::NotFound("Project not found".to_string()))?;

    let mut task = Task::new(request.title, request.project_id, identity.id);
    task.description = request.description;
    task.status = request.status.unwrap_or_default();
    task.priority = request.priority.unwrap_or_default();
    task.estimated_hours = request.estimated_hours;
    task.due_date = request.due_date;

    let assignee_ids = request.assignee_ids.unwrap_or_default();
    let task = state.store.create_task(task, &assignee_ids).await?;
    tracing::info!(task_id = %task.id, assignees = assignee_ids.len(), "task created");

    Ok(Json(TaskResponse {
        message: "Task created successfully".to_string(),
        task: task_detail(&state.store, &task).await?,
    }))
}

/// Lists tasks with optional status/priority/project filters.
pub async fn list_tasks<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ListTasksQuery>,
) -> ServerResult<Json<Vec<TaskDetail>>> {
    authorize(&identity, &Action::ViewTask)?;

    let filter = TaskQuery {
        status: query.status,
        priority: query.priority,
        project_id: query.project_id,
    };
    let tasks = state.store.list_tasks(&filter).await?;
    let mut details = Vec::with_capacity(tasks.len());
    for task in &tasks {
        details.push(task_detail(&state.store, task).await?);
    }
    Ok(Json(details))
}

/// Gets a task with assignees, project, and creator.
pub async fn get_task<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> ServerResult<Json<TaskDetail>> {
    let task = load_task(&state, id).await?;
    authorize(&identity, &Action::ViewTask)?;

    Ok(Json(task_detail(&state.store, &task).await?))
}

/// Updates a task.
///
/// The fields the request touches are collected first and the whole request
/// is authorized against them, so an assignee sneaking `title` in next to
/// `status` is refused outright with nothing applied. Changing the owning
/// project additionally requires authority over the destination.
pub async fn update_task<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTaskRequest>,
) -> ServerResult<Json<TaskResponse>> {
    let mut task = load_task(&state, id).await?;

    let mut touched = Vec::new();
    if request.title.is_some() {
        touched.push(TaskField::Title);
    }
    if request.description.is_some() {
        touched.push(TaskField::Description);
    }
    if request.status.is_some() {
        touched.push(TaskField::Status);
    }
    if request.priority.is_some() {
        touched.push(TaskField::Priority);
    }
    if request.estimated_hours.is_some() {
        touched.push(TaskField::EstimatedHours);
    }
    if request.actual_hours.is_some() {
        touched.push(TaskField::ActualHours);
    }
    if request.due_date.is_some() {
        touched.push(TaskField::DueDate);
    }
    if request.project_id.is_some() {
        touched.push(TaskField::Project);
    }

    let rel = task_relation(&state, &task, &identity).await?;
    authorize(&identity, &Action::EditTask { rel, touched })?;

    let mut errors = Vec::new();
    if let Some(title) = &request.title {
        check_title(title, &mut errors);
    }
    check_hours("Estimated hours", request.estimated_hours, &mut errors);
    check_hours("Actual hours", request.actual_hours, &mut errors);
    if !errors.is_empty() {
        return Err(ServerError::Validation(errors));
    }

    if let Some(new_project_id) = request.project_id {
        if new_project_id != task.project_id {
            let destination = state
                .store
                .get_project(new_project_id)
                .await?
                .ok_or_else(|| ServerError::NotFound("New project not found".to_string()))?;

            authorize(
                &identity,
                &Action::MoveTask {
                    task_id: task.id,
                    destination_manager_id: destination.manager_id,
                },
            )?;
            task.project_id = new_project_id;
        }
    }

    if let Some(title) = request.title {
        task.title = title;
    }
    if let Some(description) = request.description {
        task.description = Some(description);
    }
    if let Some(status) = request.status {
        task.status = status;
    }
    if let Some(priority) = request.priority {
        task.priority = priority;
    }
    if let Some(estimated_hours) = request.estimated_hours {
        task.estimated_hours = Some(estimated_hours);
    }
    if let Some(actual_hours) = request.actual_hours {
        task.actual_hours = Some(actual_hours);
    }
    if let Some(due_date) = request.due_date {
        task.due_date = Some(due_date);
    }

    let task = state.store.update_task(task).await?;
    tracing::info!(task_id = %task.id, "task updated");

    Ok(Json(TaskResponse {
        message: "Task updated successfully".to_string(),
        task: task_detail(&state.store, &task).await?,
    }))
}

/// Deletes a task.
pub async fn delete_task<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
) -> ServerResult<Json<MessageResponse>> {
    let task = load_task(&state, id).await?;
    let rel = task_relation(&state, &task, &identity).await?;

    authorize(&identity, &Action::DeleteTask { rel })?;

    state.store.delete_task(id).await?;

    Ok(Json(MessageResponse {
        message: "Task deleted successfully".to_string(),
    }))
}

/// Replaces a task's full assignee set.
pub async fn assign_task<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignTaskRequest>,
) -> ServerResult<Json<AssigneesResponse>> {
    if request.user_ids.is_empty() {
        return Err(ServerError::InvalidRequest(
            "User IDs array is required".to_string(),
        ));
    }

    let task = load_task(&state, id).await?;
    let rel = task_relation(&state, &task, &identity).await?;
    authorize(&identity, &Action::ManageAssignees { rel })?;

    let assignments = state.store.set_assignees(id, &request.user_ids).await?;
    tracing::info!(task_id = %id, assignees = assignments.len(), "task assignees replaced");

    Ok(Json(AssigneesResponse {
        message: "Task assigned successfully".to_string(),
        assignees: assignee_views(&state, &assignments).await?,
    }))
}

/// Assigns a single user to a task.
pub async fn assign_single_user<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignUserRequest>,
) -> ServerResult<Json<TaskDetail>> {
    let task = load_task(&state, id).await?;
    let rel = task_relation(&state, &task, &identity).await?;
    authorize(&identity, &Action::ManageAssignees { rel })?;

    state.store.assign(id, request.user_id).await?;
    tracing::info!(task_id = %id, user_id = %request.user_id, "user assigned to task");

    Ok(Json(task_detail(&state.store, &task).await?))
}

/// Removes a single user from a task.
pub async fn remove_assignee<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Extension(identity): Extension<Identity>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> ServerResult<Json<TaskDetail>> {
    let task = load_task(&state, id).await?;
    let rel = task_relation(&state, &task, &identity).await?;
    authorize(&identity, &Action::ManageAssignees { rel })?;

    state.store.unassign(id, user_id).await?;
    tracing::info!(task_id = %id, user_id = %user_id, "user removed from task");

    Ok(Json(task_detail(&state.store, &task).await?))
}

/// Updates the caller's own assignment status on a task.
///
/// When this completes the last open assignment, the rollup forces the task
/// to `done` inside the same store operation.
pub async fn update_assignment_status<S: ProjectStore>(
    State(state): State<SharedState<S>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAssignmentStatusRequest>,
) -> ServerResult<Json<AssignmentResponse>> {
    let task = load_task(&state, id).await?;
    authorize(&identity, &Action::UpdateOwnAssignment { task_id: task.id })?;

    let assignment = state
        .store
        .set_assignment_status(id, identity.id, request.status)
        .await?;
    tracing::info!(task_id = %id, user_id = %identity.id, status = ?assignment.status, "assignment status updated");

    Ok(Json(AssignmentResponse {
        message: "Task status updated successfully".to_string(),
        assignment,
    }))
}
