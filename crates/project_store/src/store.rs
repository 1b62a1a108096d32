//! Store trait definitions.

use async_trait::async_trait;
use entities::{
    Assignment, AssignmentStatus, Comment, Project, Task, TaskPriority, TaskStatus, TeamMember,
    User,
};
use uuid::Uuid;

use crate::StoreResult;

/// Filter options for listing tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    /// Filter by task status.
    pub status: Option<TaskStatus>,
    /// Filter by priority.
    pub priority: Option<TaskPriority>,
    /// Filter by owning project.
    pub project_id: Option<Uuid>,
}

/// Trait for CrewTrack storage operations.
///
/// Implementations must make every method atomic: a method either applies
/// all of its writes or none of them, and concurrent mutations serialize.
/// Methods that combine several record writes (cascade deletes, bulk
/// assignee replacement, team membership changes) rely on that guarantee —
/// partial application is a correctness bug, not an accepted failure mode.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    // =========================================================================
    // User operations
    // =========================================================================

    /// Creates a new user. Fails with `AlreadyExists` when the username or
    /// email is taken.
    async fn create_user(&self, user: User) -> StoreResult<User>;

    /// Gets a user by ID.
    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Gets a user by email, case-insensitively.
    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Lists all users.
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    /// Updates a user. Uniqueness of username/email is re-checked against
    /// everyone else.
    async fn update_user(&self, user: User) -> StoreResult<User>;

    /// Deletes a user, cascading their assignments and comments.
    ///
    /// Refused with `Conflict` while the user still manages a project or
    /// has created tasks; nothing is deleted in that case.
    async fn delete_user(&self, id: Uuid) -> StoreResult<()>;

    // =========================================================================
    // Project operations
    // =========================================================================

    /// Creates a new project. The manager must exist.
    async fn create_project(&self, project: Project) -> StoreResult<Project>;

    /// Gets a project by ID.
    async fn get_project(&self, id: Uuid) -> StoreResult<Option<Project>>;

    /// Lists all projects.
    async fn list_projects(&self) -> StoreResult<Vec<Project>>;

    /// Updates a project. A changed manager must exist.
    async fn update_project(&self, project: Project) -> StoreResult<Project>;

    /// Deletes a project, cascading its tasks and their assignments and
    /// comments, all-or-nothing.
    async fn delete_project(&self, id: Uuid) -> StoreResult<()>;

    /// Lists the tasks under a project, oldest first.
    async fn list_project_tasks(&self, project_id: Uuid) -> StoreResult<Vec<Task>>;

    // =========================================================================
    // Task operations
    // =========================================================================

    /// Creates a task and attaches the given assignees in one step.
    ///
    /// The project, creator, and every assignee are verified to exist before
    /// anything is written.
    async fn create_task(&self, task: Task, assignee_ids: &[Uuid]) -> StoreResult<Task>;

    /// Gets a task by ID.
    async fn get_task(&self, id: Uuid) -> StoreResult<Option<Task>>;

    /// Lists tasks matching the query, newest first.
    async fn list_tasks(&self, query: &TaskQuery) -> StoreResult<Vec<Task>>;

    /// Updates a task. A changed owning project must exist.
    async fn update_task(&self, task: Task) -> StoreResult<Task>;

    /// Deletes a task, cascading its assignments and comments.
    async fn delete_task(&self, id: Uuid) -> StoreResult<()>;

    // =========================================================================
    // Assignment ledger
    // =========================================================================

    /// Assigns a user to a task with status `assigned`. Fails with
    /// `AlreadyAssigned` when the pair exists; the ledger is unchanged then.
    async fn assign(&self, task_id: Uuid, user_id: Uuid) -> StoreResult<Assignment>;

    /// Removes a user's assignment from a task. Fails with `NotAssigned`
    /// when no such pair exists.
    async fn unassign(&self, task_id: Uuid, user_id: Uuid) -> StoreResult<()>;

    /// Updates the caller's own assignment status, then re-evaluates the
    /// rollup: when every assignment on the task (at least one) is
    /// `completed`, the task is forced to `done`. One-way — a done task
    /// never auto-reopens.
    async fn set_assignment_status(
        &self,
        task_id: Uuid,
        user_id: Uuid,
        status: AssignmentStatus,
    ) -> StoreResult<Assignment>;

    /// Replaces the full assignee set of a task: stale assignments are
    /// removed, new users added with status `assigned`, survivors keep their
    /// status. All-or-nothing.
    async fn set_assignees(&self, task_id: Uuid, user_ids: &[Uuid]) -> StoreResult<Vec<Assignment>>;

    /// Lists a task's assignments, oldest first.
    async fn list_task_assignments(&self, task_id: Uuid) -> StoreResult<Vec<Assignment>>;

    /// Lists a user's assignments, oldest first.
    async fn list_user_assignments(&self, user_id: Uuid) -> StoreResult<Vec<Assignment>>;

    /// Returns true when the user holds an assignment on the task.
    async fn is_assignee(&self, task_id: Uuid, user_id: Uuid) -> StoreResult<bool>;

    // =========================================================================
    // Team composition (derived, never stored)
    // =========================================================================

    /// Resolves a project's team: the manager first, then every task
    /// assignee in first-seen order, each with their task references. A
    /// project with zero tasks still yields the manager.
    async fn resolve_team(&self, project_id: Uuid) -> StoreResult<Vec<TeamMember>>;

    /// Adds a user to a project's team by assigning them to the project's
    /// oldest task, creating a "Project Setup" placeholder task (created by
    /// `acting_user_id`) when the project has none. A user already on the
    /// team is left untouched. Returns the updated team.
    async fn add_team_member(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        acting_user_id: Uuid,
    ) -> StoreResult<Vec<TeamMember>>;

    /// Removes a user's assignments from every task in the project. The
    /// manager stays on the team regardless, since manager membership is
    /// not ledger-backed. Returns the updated team.
    async fn remove_team_member(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Vec<TeamMember>>;

    // =========================================================================
    // Comment operations
    // =========================================================================

    /// Creates a comment. The task and author must exist.
    async fn create_comment(&self, comment: Comment) -> StoreResult<Comment>;

    /// Gets a comment by ID.
    async fn get_comment(&self, id: Uuid) -> StoreResult<Option<Comment>>;

    /// Lists a task's comments, newest first.
    async fn list_task_comments(&self, task_id: Uuid) -> StoreResult<Vec<Comment>>;

    /// Updates a comment.
    async fn update_comment(&self, comment: Comment) -> StoreResult<Comment>;

    /// Deletes a comment.
    async fn delete_comment(&self, id: Uuid) -> StoreResult<()>;

    // =========================================================================
    // Per-user derived queries
    // =========================================================================

    /// Lists the tasks a user is assigned to.
    async fn list_user_tasks(&self, user_id: Uuid) -> StoreResult<Vec<Task>>;

    /// Lists the projects a user belongs to: managed projects first, then
    /// projects reached through task assignments, deduplicated.
    async fn list_user_projects(&self, user_id: Uuid) -> StoreResult<Vec<Project>>;
}
