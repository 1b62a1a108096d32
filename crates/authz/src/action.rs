//! Actions and the relationship facts they carry.

use entities::GlobalRole;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EntityKind;

/// The authenticated caller: id plus global role.
///
/// Produced by the authentication layer from a verified token; the engine
/// treats it as an external fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// User id of the caller.
    pub id: Uuid,
    /// Global role of the caller.
    pub role: GlobalRole,
}

impl Identity {
    /// Creates an identity.
    pub fn new(id: Uuid, role: GlobalRole) -> Self {
        Self { id, role }
    }
}

/// A mutable field of a task.
///
/// Used for the per-relationship allow-list: assignees may only touch
/// `Status` and `ActualHours`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Title,
    Description,
    Status,
    Priority,
    EstimatedHours,
    ActualHours,
    DueDate,
    Project,
}

impl TaskField {
    /// Whether an assignee (with no other relationship) may change this field.
    pub fn assignee_mutable(&self) -> bool {
        matches!(self, TaskField::Status | TaskField::ActualHours)
    }

    /// Returns the snake_case field name.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskField::Title => "title",
            TaskField::Description => "description",
            TaskField::Status => "status",
            TaskField::Priority => "priority",
            TaskField::EstimatedHours => "estimated_hours",
            TaskField::ActualHours => "actual_hours",
            TaskField::DueDate => "due_date",
            TaskField::Project => "project_id",
        }
    }
}

/// The caller's relationship to a task, gathered by the caller before
/// asking for a decision.
#[derive(Debug, Clone, Copy)]
pub struct TaskRelation {
    /// The task in question.
    pub task_id: Uuid,
    /// The task's creator.
    pub creator_id: Uuid,
    /// Manager of the task's owning project.
    pub project_manager_id: Uuid,
    /// Whether the caller holds an assignment on the task.
    pub is_assignee: bool,
}

/// An intended action together with the relationship facts needed to decide
/// it. Target ids ride along so denials can name what was refused.
#[derive(Debug, Clone)]
pub enum Action {
    // Projects
    ViewProject,
    CreateProject,
    EditProject { project_id: Uuid, manager_id: Uuid },
    DeleteProject { project_id: Uuid, manager_id: Uuid },
    /// Add or remove team members (implemented as assignment writes).
    ManageTeam { project_id: Uuid, manager_id: Uuid },

    // Tasks
    ViewTask,
    CreateTask,
    /// Edit with the set of fields the request actually touches.
    EditTask { rel: TaskRelation, touched: Vec<TaskField> },
    /// Change the owning project of an existing task.
    MoveTask { task_id: Uuid, destination_manager_id: Uuid },
    DeleteTask { rel: TaskRelation },
    /// Assign/unassign users, single or bulk.
    ManageAssignees { rel: TaskRelation },
    /// Update the caller's own assignment status on a task. Open to every
    /// authenticated caller; the ledger rejects callers holding no
    /// assignment.
    UpdateOwnAssignment { task_id: Uuid },

    // Comments
    CreateComment,
    EditComment { comment_id: Uuid, author_id: Uuid },
    DeleteComment { comment_id: Uuid, author_id: Uuid },

    // Users
    ListUsers,
    ViewUser { user_id: Uuid },
    EditUser { user_id: Uuid, changes_role: bool },
    DeleteUser { user_id: Uuid },
}

impl Action {
    /// Verb, entity kind, and target id for denial messages.
    pub fn describe(&self) -> (&'static str, EntityKind, Option<Uuid>) {
        match self {
            Action::ViewProject => ("view", EntityKind::Project, None),
            Action::CreateProject => ("create", EntityKind::Project, None),
            Action::EditProject { project_id, .. } => {
                ("update", EntityKind::Project, Some(*project_id))
            }
            Action::DeleteProject { project_id, .. } => {
                ("delete", EntityKind::Project, Some(*project_id))
            }
            Action::ManageTeam { project_id, .. } => {
                ("manage the team of", EntityKind::Project, Some(*project_id))
            }
            Action::ViewTask => ("view", EntityKind::Task, None),
            Action::CreateTask => ("create", EntityKind::Task, None),
            Action::EditTask { rel, .. } => ("update", EntityKind::Task, Some(rel.task_id)),
            Action::MoveTask { task_id, .. } => ("move", EntityKind::Task, Some(*task_id)),
            Action::DeleteTask { rel } => ("delete", EntityKind::Task, Some(rel.task_id)),
            Action::ManageAssignees { rel } => {
                ("manage assignees of", EntityKind::Task, Some(rel.task_id))
            }
            Action::UpdateOwnAssignment { task_id } => {
                ("update own assignment on", EntityKind::Task, Some(*task_id))
            }
            Action::CreateComment => ("create", EntityKind::Comment, None),
            Action::EditComment { comment_id, .. } => {
                ("update", EntityKind::Comment, Some(*comment_id))
            }
            Action::DeleteComment { comment_id, .. } => {
                ("delete", EntityKind::Comment, Some(*comment_id))
            }
            Action::ListUsers => ("list", EntityKind::User, None),
            Action::ViewUser { user_id } => ("view", EntityKind::User, Some(*user_id)),
            Action::EditUser { user_id, .. } => ("update", EntityKind::User, Some(*user_id)),
            Action::DeleteUser { user_id } => ("delete", EntityKind::User, Some(*user_id)),
        }
    }
}
