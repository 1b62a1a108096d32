//! Derived team and statistics views.
//!
//! Neither of these is persisted: the team is always recomputed from the
//! project manager plus task assignments, and stats are aggregated from the
//! project's tasks on demand.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{GlobalRole, TaskStatus};

/// Role of a user within a project, implied by data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectRole {
    /// The project's manager.
    Manager,
    /// Assigned to at least one task in the project.
    Member,
}

/// A lightweight reference to a task, carried per team member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRef {
    /// Task identifier.
    pub id: Uuid,
    /// Task title.
    pub title: String,
    /// Task status.
    pub status: TaskStatus,
}

/// One entry of a resolved project team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    /// User identifier.
    pub user_id: Uuid,
    /// Username snapshot.
    pub username: String,
    /// Email snapshot.
    pub email: String,
    /// Global role snapshot.
    pub role: GlobalRole,
    /// Role within this project.
    pub project_role: ProjectRole,
    /// Tasks in this project the member is assigned to. Empty for a manager
    /// with no assignments.
    pub tasks: Vec<TaskRef>,
}

/// Aggregated task statistics for a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectStats {
    pub total_tasks: usize,
    pub backlog_tasks: usize,
    pub todo_tasks: usize,
    pub in_progress_tasks: usize,
    pub review_tasks: usize,
    pub completed_tasks: usize,
    /// Percentage of tasks in `done` status, 0.0 when the project is empty.
    pub completion_rate: f64,
    pub total_estimated_hours: f64,
    pub total_actual_hours: f64,
    /// Estimated minus actual hours.
    pub hours_variance: f64,
}
