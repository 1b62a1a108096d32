//! Response view types shared across API modules.
//!
//! Responses embed related snapshots (a task carries its assignees, project
//! reference, and creator) the way clients expect them, assembled from the
//! store on the way out.

use chrono::{DateTime, Utc};
use entities::{AssignmentStatus, Comment, GlobalRole, Project, Task, User};
use project_store::ProjectStore;
use serde::Serialize;
use uuid::Uuid;

use crate::error::ServerResult;

/// Minimal user reference.
#[derive(Debug, Clone, Serialize)]
pub struct UserRef {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<&User> for UserRef {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

/// Public view of a user account.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: GlobalRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// An assignee on a task, with their assignment state.
#[derive(Debug, Clone, Serialize)]
pub struct AssigneeView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: GlobalRole,
    pub status: AssignmentStatus,
    pub assigned_at: DateTime<Utc>,
}

/// Minimal project reference.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectRef {
    pub id: Uuid,
    pub title: String,
}

/// A task with its related snapshots.
#[derive(Debug, Serialize)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,
    pub assignees: Vec<AssigneeView>,
    pub project: Option<ProjectRef>,
    pub creator: Option<UserRef>,
}

/// A project with its manager, and optionally its tasks.
#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub manager: Option<UserRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<TaskDetail>>,
}

/// A comment with its author.
#[derive(Debug, Serialize)]
pub struct CommentDetail {
    #[serde(flatten)]
    pub comment: Comment,
    pub author: Option<UserRef>,
}

/// Assembles a task view with assignees, project, and creator.
pub async fn task_detail<S: ProjectStore>(store: &S, task: &Task) -> ServerResult<TaskDetail> {
    let assignments = store.list_task_assignments(task.id).await?;
    let mut assignees = Vec::with_capacity(assignments.len());
    for assignment in assignments {
        if let Some(user) = store.get_user(assignment.user_id).await? {
            assignees.push(AssigneeView {
                id: user.id,
                username: user.username,
                email: user.email,
                role: user.role,
                status: assignment.status,
                assigned_at: assignment.assigned_at,
            });
        }
    }

    let project = store
        .get_project(task.project_id)
        .await?
        .map(|p| ProjectRef {
            id: p.id,
            title: p.title,
        });
    let creator = store.get_user(task.creator_id).await?.as_ref().map(UserRef::from);

    Ok(TaskDetail {
        task: task.clone(),
        assignees,
        project,
        creator,
    })
}

/// Assembles a project view, optionally with its tasks.
pub async fn project_detail<S: ProjectStore>(
    store: &S,
    project: &Project,
    include_tasks: bool,
) -> ServerResult<ProjectDetail> {
    let manager = store
        .get_user(project.manager_id)
        .await?
        .as_ref()
        .map(UserRef::from);

    let tasks = if include_tasks {
        let mut details = Vec::new();
        for task in store.list_project_tasks(project.id).await? {
            details.push(task_detail(store, &task).await?);
        }
        Some(details)
    } else {
        None
    };

    Ok(ProjectDetail {
        project: project.clone(),
        manager,
        tasks,
    })
}

/// Assembles a comment view with its author.
pub async fn comment_detail<S: ProjectStore>(
    store: &S,
    comment: &Comment,
) -> ServerResult<CommentDetail> {
    let author = store
        .get_user(comment.author_id)
        .await?
        .as_ref()
        .map(UserRef::from);
    Ok(CommentDetail {
        comment: comment.clone(),
        author,
    })
}
