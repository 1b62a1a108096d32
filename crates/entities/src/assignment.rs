//! Assignment entity: the many-to-many relation between users and tasks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-assignee status on a task.
///
/// The task's own status is rolled up from these: when every assignment
/// reaches `Completed`, the task is forced to `done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Assigned,
    InProgress,
    Completed,
    Blocked,
}

impl Default for AssignmentStatus {
    fn default() -> Self {
        Self::Assigned
    }
}

/// The join record between a user and a task.
///
/// Composite key (user_id, task_id); no duplicate pairs. This is the only
/// persisted record of "who works on what" — project team membership is
/// derived from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    /// The assigned user.
    pub user_id: Uuid,
    /// The task worked on.
    pub task_id: Uuid,
    /// Per-assignee status.
    pub status: AssignmentStatus,
    /// When the user was assigned.
    pub assigned_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Assignment {
    /// Creates a new assignment in `assigned` status.
    pub fn new(user_id: Uuid, task_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            task_id,
            status: AssignmentStatus::Assigned,
            assigned_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_starts_assigned() {
        let assignment = Assignment::new(Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(assignment.status, AssignmentStatus::Assigned);
    }
}
