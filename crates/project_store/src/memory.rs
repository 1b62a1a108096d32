//! In-memory store implementation.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use entities::{
    Assignment, AssignmentStatus, Comment, Project, ProjectRole, Task, TaskRef, TaskStatus,
    TeamMember, User,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{ProjectStore, StoreError, StoreResult, TaskQuery};

/// All tables live behind one lock: the write guard is the transaction.
/// Every mutation validates its preconditions against the guarded state
/// first and only then writes, so a failing check leaves nothing to roll
/// back and concurrent writers serialize.
#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    projects: HashMap<Uuid, Project>,
    tasks: HashMap<Uuid, Task>,
    /// Keyed by (task_id, user_id).
    assignments: HashMap<(Uuid, Uuid), Assignment>,
    comments: HashMap<Uuid, Comment>,
}

impl Tables {
    /// Tasks of a project, oldest first.
    fn project_tasks(&self, project_id: Uuid) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self
            .tasks
            .values()
            .filter(|t| t.project_id == project_id)
            .collect();
        tasks.sort_by_key(|t| (t.created_at, t.id));
        tasks
    }

    /// Assignments of a task, oldest first.
    fn task_assignments(&self, task_id: Uuid) -> Vec<&Assignment> {
        let mut assignments: Vec<&Assignment> = self
            .assignments
            .values()
            .filter(|a| a.task_id == task_id)
            .collect();
        assignments.sort_by_key(|a| (a.assigned_at, a.user_id));
        assignments
    }

    fn require_user(&self, id: Uuid) -> StoreResult<&User> {
        self.users
            .get(&id)
            .ok_or_else(|| StoreError::not_found("User", id))
    }

    fn require_project(&self, id: Uuid) -> StoreResult<&Project> {
        self.projects
            .get(&id)
            .ok_or_else(|| StoreError::not_found("Project", id))
    }

    fn require_task(&self, id: Uuid) -> StoreResult<&Task> {
        self.tasks
            .get(&id)
            .ok_or_else(|| StoreError::not_found("Task", id))
    }

    /// Checks username/email uniqueness against every user except `exclude`.
    fn check_user_unique(&self, user: &User, exclude: Option<Uuid>) -> StoreResult<()> {
        for other in self.users.values() {
            if Some(other.id) == exclude || other.id == user.id {
                continue;
            }
            if other.username == user.username {
                return Err(StoreError::already_exists("User", user.username.clone()));
            }
            if other.email.eq_ignore_ascii_case(&user.email) {
                return Err(StoreError::already_exists("User", user.email.clone()));
            }
        }
        Ok(())
    }

    /// Derives a project's team from the manager plus task assignments.
    fn resolve_team(&self, project_id: Uuid) -> StoreResult<Vec<TeamMember>> {
        let project = self.require_project(project_id)?;

        let mut members: Vec<TeamMember> = Vec::new();
        let mut index: HashMap<Uuid, usize> = HashMap::new();

        // Manager first, whether or not they hold assignments.
        if let Some(manager) = self.users.get(&project.manager_id) {
            index.insert(manager.id, members.len());
            members.push(TeamMember {
                user_id: manager.id,
                username: manager.username.clone(),
                email: manager.email.clone(),
                role: manager.role,
                project_role: ProjectRole::Manager,
                tasks: Vec::new(),
            });
        }

        // Then assignees in first-seen order: tasks oldest first, and within
        // a task, assignments oldest first.
        for task in self.project_tasks(project_id) {
            for assignment in self.task_assignments(task.id) {
                let Some(user) = self.users.get(&assignment.user_id) else {
                    continue;
                };
                let slot = *index.entry(user.id).or_insert_with(|| {
                    members.push(TeamMember {
                        user_id: user.id,
                        username: user.username.clone(),
                        email: user.email.clone(),
                        role: user.role,
                        project_role: ProjectRole::Member,
                        tasks: Vec::new(),
                    });
                    members.len() - 1
                });
                members[slot].tasks.push(TaskRef {
                    id: task.id,
                    title: task.title.clone(),
                    status: task.status,
                });
            }
        }

        Ok(members)
    }

    /// Forces the task to `done` when every assignment (at least one) is
    /// completed. One-way: never transitions out of `done`.
    fn rollup_task_status(&mut self, task_id: Uuid) {
        let assignments = self.task_assignments(task_id);
        let all_completed = !assignments.is_empty()
            && assignments
                .iter()
                .all(|a| a.status == AssignmentStatus::Completed);
        if !all_completed {
            return;
        }
        if let Some(task) = self.tasks.get_mut(&task_id) {
            if task.status != TaskStatus::Done {
                task.status = TaskStatus::Done;
                task.updated_at = Utc::now();
                tracing::info!(task_id = %task_id, "all assignments completed, task forced to done");
            }
        }
    }
}

/// In-memory project store.
#[derive(Debug, Default)]
pub struct MemoryProjectStore {
    tables: RwLock<Tables>,
}

impl MemoryProjectStore {
    /// Creates a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProjectStore for MemoryProjectStore {
    // =========================================================================
    // User operations
    // =========================================================================

    async fn create_user(&self, user: User) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        t.check_user_unique(&user, None)?;
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let t = self.tables.read().await;
        let mut users: Vec<User> = t.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn update_user(&self, mut user: User) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&user.id) {
            return Err(StoreError::not_found("User", user.id));
        }
        t.check_user_unique(&user, Some(user.id))?;
        user.updated_at = Utc::now();
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        t.require_user(id)?;

        // Referential constraints: a managed project or a created task
        // blocks the delete entirely.
        if t.projects.values().any(|p| p.manager_id == id) {
            return Err(StoreError::Conflict(format!(
                "user {id} still manages a project"
            )));
        }
        if t.tasks.values().any(|task| task.creator_id == id) {
            return Err(StoreError::Conflict(format!(
                "user {id} is the creator of existing tasks"
            )));
        }

        t.assignments.retain(|_, a| a.user_id != id);
        t.comments.retain(|_, c| c.author_id != id);
        t.users.remove(&id);
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }

    // =========================================================================
    // Project operations
    // =========================================================================

    async fn create_project(&self, project: Project) -> StoreResult<Project> {
        let mut t = self.tables.write().await;
        t.require_user(project.manager_id)?;
        t.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn get_project(&self, id: Uuid) -> StoreResult<Option<Project>> {
        let t = self.tables.read().await;
        Ok(t.projects.get(&id).cloned())
    }

    async fn list_projects(&self) -> StoreResult<Vec<Project>> {
        let t = self.tables.read().await;
        let mut projects: Vec<Project> = t.projects.values().cloned().collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    async fn update_project(&self, mut project: Project) -> StoreResult<Project> {
        let mut t = self.tables.write().await;
        if !t.projects.contains_key(&project.id) {
            return Err(StoreError::not_found("Project", project.id));
        }
        t.require_user(project.manager_id)?;
        project.updated_at = Utc::now();
        t.projects.insert(project.id, project.clone());
        Ok(project)
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        t.require_project(id)?;

        let task_ids: HashSet<Uuid> = t
            .tasks
            .values()
            .filter(|task| task.project_id == id)
            .map(|task| task.id)
            .collect();

        let assignments_before = t.assignments.len();
        t.assignments.retain(|_, a| !task_ids.contains(&a.task_id));
        let removed_assignments = assignments_before - t.assignments.len();
        t.comments.retain(|_, c| !task_ids.contains(&c.task_id));
        t.tasks.retain(|task_id, _| !task_ids.contains(task_id));
        t.projects.remove(&id);

        tracing::info!(
            project_id = %id,
            tasks = task_ids.len(),
            assignments = removed_assignments,
            "project deleted with cascade"
        );
        Ok(())
    }

    async fn list_project_tasks(&self, project_id: Uuid) -> StoreResult<Vec<Task>> {
        let t = self.tables.read().await;
        t.require_project(project_id)?;
        Ok(t.project_tasks(project_id).into_iter().cloned().collect())
    }

    // =========================================================================
    // Task operations
    // =========================================================================

    async fn create_task(&self, task: Task, assignee_ids: &[Uuid]) -> StoreResult<Task> {
        let mut t = self.tables.write().await;
        t.require_project(task.project_id)?;
        t.require_user(task.creator_id)?;

        let unique: HashSet<Uuid> = assignee_ids.iter().copied().collect();
        for user_id in &unique {
            t.require_user(*user_id)?;
        }

        // All checks passed; commit the task and its assignments together.
        t.tasks.insert(task.id, task.clone());
        for user_id in unique {
            t.assignments
                .insert((task.id, user_id), Assignment::new(user_id, task.id));
        }
        Ok(task)
    }

    async fn get_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let t = self.tables.read().await;
        Ok(t.tasks.get(&id).cloned())
    }

    async fn list_tasks(&self, query: &TaskQuery) -> StoreResult<Vec<Task>> {
        let t = self.tables.read().await;
        let mut tasks: Vec<Task> = t
            .tasks
            .values()
            .filter(|task| {
                query.status.is_none_or(|s| task.status == s)
                    && query.priority.is_none_or(|p| task.priority == p)
                    && query.project_id.is_none_or(|id| task.project_id == id)
            })
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn update_task(&self, mut task: Task) -> StoreResult<Task> {
        let mut t = self.tables.write().await;
        if !t.tasks.contains_key(&task.id) {
            return Err(StoreError::not_found("Task", task.id));
        }
        t.require_project(task.project_id)?;
        task.updated_at = Utc::now();
        t.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        t.require_task(id)?;
        t.assignments.retain(|_, a| a.task_id != id);
        t.comments.retain(|_, c| c.task_id != id);
        t.tasks.remove(&id);
        tracing::info!(task_id = %id, "task deleted with cascade");
        Ok(())
    }

    // =========================================================================
    // Assignment ledger
    // =========================================================================

    async fn assign(&self, task_id: Uuid, user_id: Uuid) -> StoreResult<Assignment> {
        let mut t = self.tables.write().await;
        t.require_task(task_id)?;
        t.require_user(user_id)?;
        if t.assignments.contains_key(&(task_id, user_id)) {
            return Err(StoreError::AlreadyAssigned { user_id, task_id });
        }
        let assignment = Assignment::new(user_id, task_id);
        t.assignments.insert((task_id, user_id), assignment.clone());
        Ok(assignment)
    }

    async fn unassign(&self, task_id: Uuid, user_id: Uuid) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        t.require_task(task_id)?;
        t.require_user(user_id)?;
        if t.assignments.remove(&(task_id, user_id)).is_none() {
            return Err(StoreError::NotAssigned { user_id, task_id });
        }
        Ok(())
    }

    async fn set_assignment_status(
        &self,
        task_id: Uuid,
        user_id: Uuid,
        status: AssignmentStatus,
    ) -> StoreResult<Assignment> {
        let mut t = self.tables.write().await;
        t.require_task(task_id)?;

        let assignment = t
            .assignments
            .get_mut(&(task_id, user_id))
            .ok_or(StoreError::NotAssigned { user_id, task_id })?;
        assignment.status = status;
        assignment.updated_at = Utc::now();
        let updated = assignment.clone();

        // Rollup runs in the same critical section as the write, so a
        // reader never observes a task contradicting its assignments.
        if status == AssignmentStatus::Completed {
            t.rollup_task_status(task_id);
        }

        Ok(updated)
    }

    async fn set_assignees(&self, task_id: Uuid, user_ids: &[Uuid]) -> StoreResult<Vec<Assignment>> {
        let mut t = self.tables.write().await;
        t.require_task(task_id)?;

        let desired: HashSet<Uuid> = user_ids.iter().copied().collect();
        for user_id in &desired {
            t.require_user(*user_id)?;
        }

        // Diff current against desired: stale pairs go, new pairs arrive
        // with status `assigned`, survivors keep their status.
        t.assignments
            .retain(|&(tid, uid), _| tid != task_id || desired.contains(&uid));
        for user_id in desired {
            t.assignments
                .entry((task_id, user_id))
                .or_insert_with(|| Assignment::new(user_id, task_id));
        }

        Ok(t.task_assignments(task_id).into_iter().cloned().collect())
    }

    async fn list_task_assignments(&self, task_id: Uuid) -> StoreResult<Vec<Assignment>> {
        let t = self.tables.read().await;
        t.require_task(task_id)?;
        Ok(t.task_assignments(task_id).into_iter().cloned().collect())
    }

    async fn list_user_assignments(&self, user_id: Uuid) -> StoreResult<Vec<Assignment>> {
        let t = self.tables.read().await;
        t.require_user(user_id)?;
        let mut assignments: Vec<Assignment> = t
            .assignments
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        assignments.sort_by_key(|a| (a.assigned_at, a.task_id));
        Ok(assignments)
    }

    async fn is_assignee(&self, task_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        let t = self.tables.read().await;
        Ok(t.assignments.contains_key(&(task_id, user_id)))
    }

    // =========================================================================
    // Team composition
    // =========================================================================

    async fn resolve_team(&self, project_id: Uuid) -> StoreResult<Vec<TeamMember>> {
        let t = self.tables.read().await;
        t.resolve_team(project_id)
    }

    async fn add_team_member(
        &self,
        project_id: Uuid,
        user_id: Uuid,
        acting_user_id: Uuid,
    ) -> StoreResult<Vec<TeamMember>> {
        let mut t = self.tables.write().await;
        t.require_project(project_id)?;
        t.require_user(user_id)?;
        t.require_user(acting_user_id)?;

        let project_tasks: Vec<Uuid> = t.project_tasks(project_id).iter().map(|x| x.id).collect();

        // Already a member through some assignment: nothing to do.
        let already_member = project_tasks
            .iter()
            .any(|&tid| t.assignments.contains_key(&(tid, user_id)));
        if already_member {
            return t.resolve_team(project_id);
        }

        // Membership is a side effect of assignment, so attach the user to
        // the oldest task, creating a placeholder when the project is empty.
        let target_task_id = match project_tasks.first() {
            Some(&tid) => tid,
            None => {
                let placeholder = Task::new("Project Setup", project_id, acting_user_id)
                    .with_description("Initial project setup and planning")
                    .with_status(TaskStatus::Todo);
                let id = placeholder.id;
                t.tasks.insert(id, placeholder);
                tracing::info!(project_id = %project_id, task_id = %id, "created placeholder task for team membership");
                id
            }
        };
        t.assignments
            .insert((target_task_id, user_id), Assignment::new(user_id, target_task_id));

        t.resolve_team(project_id)
    }

    async fn remove_team_member(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Vec<TeamMember>> {
        let mut t = self.tables.write().await;
        t.require_project(project_id)?;
        t.require_user(user_id)?;

        let project_tasks: HashSet<Uuid> =
            t.project_tasks(project_id).iter().map(|x| x.id).collect();
        t.assignments
            .retain(|&(tid, uid), _| uid != user_id || !project_tasks.contains(&tid));

        t.resolve_team(project_id)
    }

    // =========================================================================
    // Comment operations
    // =========================================================================

    async fn create_comment(&self, comment: Comment) -> StoreResult<Comment> {
        let mut t = self.tables.write().await;
        t.require_task(comment.task_id)?;
        t.require_user(comment.author_id)?;
        t.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn get_comment(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        let t = self.tables.read().await;
        Ok(t.comments.get(&id).cloned())
    }

    async fn list_task_comments(&self, task_id: Uuid) -> StoreResult<Vec<Comment>> {
        let t = self.tables.read().await;
        t.require_task(task_id)?;
        let mut comments: Vec<Comment> = t
            .comments
            .values()
            .filter(|c| c.task_id == task_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }

    async fn update_comment(&self, mut comment: Comment) -> StoreResult<Comment> {
        let mut t = self.tables.write().await;
        if !t.comments.contains_key(&comment.id) {
            return Err(StoreError::not_found("Comment", comment.id));
        }
        comment.updated_at = Utc::now();
        t.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn delete_comment(&self, id: Uuid) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        if t.comments.remove(&id).is_none() {
            return Err(StoreError::not_found("Comment", id));
        }
        Ok(())
    }

    // =========================================================================
    // Per-user derived queries
    // =========================================================================

    async fn list_user_tasks(&self, user_id: Uuid) -> StoreResult<Vec<Task>> {
        let t = self.tables.read().await;
        t.require_user(user_id)?;
        let mut tasks: Vec<Task> = t
            .assignments
            .values()
            .filter(|a| a.user_id == user_id)
            .filter_map(|a| t.tasks.get(&a.task_id))
            .cloned()
            .collect();
        tasks.sort_by_key(|task| (task.created_at, task.id));
        Ok(tasks)
    }

    async fn list_user_projects(&self, user_id: Uuid) -> StoreResult<Vec<Project>> {
        let t = self.tables.read().await;
        t.require_user(user_id)?;

        let mut projects: Vec<Project> = t
            .projects
            .values()
            .filter(|p| p.manager_id == user_id)
            .cloned()
            .collect();
        projects.sort_by_key(|p| (p.created_at, p.id));

        // Projects reached through assignments, after the managed ones.
        let mut seen: HashSet<Uuid> = projects.iter().map(|p| p.id).collect();
        let mut derived: Vec<Project> = t
            .assignments
            .values()
            .filter(|a| a.user_id == user_id)
            .filter_map(|a| t.tasks.get(&a.task_id))
            .filter_map(|task| t.projects.get(&task.project_id))
            .cloned()
            .collect();
        derived.sort_by_key(|p| (p.created_at, p.id));
        for project in derived {
            if seen.insert(project.id) {
                projects.push(project);
            }
        }

        Ok(projects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entities::GlobalRole;

    async fn seed_user(store: &MemoryProjectStore, name: &str, role: GlobalRole) -> User {
        store
            .create_user(User::new(name, format!("{name}@example.com"), "hash").with_role(role))
            .await
            .unwrap()
    }

    async fn seed_project(store: &MemoryProjectStore, manager: &User) -> Project {
        store
            .create_project(Project::new("Test Project", manager.id))
            .await
            .unwrap()
    }

    async fn seed_task(store: &MemoryProjectStore, project: &Project, creator: &User) -> Task {
        store
            .create_task(Task::new("Test Task", project.id, creator.id), &[])
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_assign_is_conflict_and_idempotent() {
        let store = MemoryProjectStore::new();
        let manager = seed_user(&store, "mgr", GlobalRole::Manager).await;
        let dev = seed_user(&store, "dev", GlobalRole::Developer).await;
        let project = seed_project(&store, &manager).await;
        let task = seed_task(&store, &project, &manager).await;

        let first = store.assign(task.id, dev.id).await.unwrap();
        store
            .set_assignment_status(task.id, dev.id, AssignmentStatus::InProgress)
            .await
            .unwrap();

        let err = store.assign(task.id, dev.id).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyAssigned { .. }));

        // State after the failed second call equals state after the first
        // call plus the status update: one assignment, status preserved.
        let assignments = store.list_task_assignments(task.id).await.unwrap();
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].user_id, first.user_id);
        assert_eq!(assignments[0].status, AssignmentStatus::InProgress);
    }

    #[tokio::test]
    async fn test_unassign_missing_is_not_assigned() {
        let store = MemoryProjectStore::new();
        let manager = seed_user(&store, "mgr", GlobalRole::Manager).await;
        let dev = seed_user(&store, "dev", GlobalRole::Developer).await;
        let project = seed_project(&store, &manager).await;
        let task = seed_task(&store, &project, &manager).await;

        let err = store.unassign(task.id, dev.id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotAssigned { .. }));
    }

    #[tokio::test]
    async fn test_sole_assignee_completion_rolls_task_to_done() {
        let store = MemoryProjectStore::new();
        let manager = seed_user(&store, "user3", GlobalRole::Manager).await;
        let dev = seed_user(&store, "user7", GlobalRole::Developer).await;
        let project = seed_project(&store, &manager).await;
        let task = seed_task(&store, &project, &manager).await;
        store.assign(task.id, dev.id).await.unwrap();

        store
            .set_assignment_status(task.id, dev.id, AssignmentStatus::Completed)
            .await
            .unwrap();

        let task = store.get_task(task.id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Done);
    }

    #[tokio::test]
    async fn test_partial_completion_leaves_task_status_alone() {
        let store = MemoryProjectStore::new();
        let manager = seed_user(&store, "mgr", GlobalRole::Manager).await;
        let dev1 = seed_user(&store, "dev1", GlobalRole::Developer).await;
        let dev2 = seed_user(&store, "dev2", GlobalRole::Developer).await;
        let project = seed_project(&store, &manager).await;
        let task = seed_task(&store, &project, &manager).await;
        store.assign(task.id, dev1.id).await.unwrap();
        store.assign(task.id, dev2.id).await.unwrap();

        store
            .set_assignment_status(task.id, dev1.id, AssignmentStatus::Completed)
            .await
            .unwrap();

        let task = store.get_task(task.id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Backlog);
    }

    #[tokio::test]
    async fn test_done_task_never_auto_reopens() {
        let store = MemoryProjectStore::new();
        let manager = seed_user(&store, "mgr", GlobalRole::Manager).await;
        let dev1 = seed_user(&store, "dev1", GlobalRole::Developer).await;
        let dev2 = seed_user(&store, "dev2", GlobalRole::Developer).await;
        let project = seed_project(&store, &manager).await;
        let task = seed_task(&store, &project, &manager).await;
        store.assign(task.id, dev1.id).await.unwrap();
        store
            .set_assignment_status(task.id, dev1.id, AssignmentStatus::Completed)
            .await
            .unwrap();

        // A fresh assignee on a done task does not reopen it.
        store.assign(task.id, dev2.id).await.unwrap();
        let task = store.get_task(task.id).await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Done);
    }

    #[tokio::test]
    async fn test_resolve_team_manager_only_on_empty_project() {
        let store = MemoryProjectStore::new();
        let manager = seed_user(&store, "mgr", GlobalRole::Manager).await;
        let project = seed_project(&store, &manager).await;

        let team = store.resolve_team(project.id).await.unwrap();
        assert_eq!(team.len(), 1);
        assert_eq!(team[0].user_id, manager.id);
        assert_eq!(team[0].project_role, ProjectRole::Manager);
        assert!(team[0].tasks.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_team_orders_and_deduplicates() {
        let store = MemoryProjectStore::new();
        let manager = seed_user(&store, "mgr", GlobalRole::Manager).await;
        let dev1 = seed_user(&store, "dev1", GlobalRole::Developer).await;
        let dev2 = seed_user(&store, "dev2", GlobalRole::Designer).await;
        let project = seed_project(&store, &manager).await;
        let task1 = seed_task(&store, &project, &manager).await;
        let task2 = seed_task(&store, &project, &manager).await;

        store.assign(task1.id, dev1.id).await.unwrap();
        store.assign(task1.id, dev2.id).await.unwrap();
        store.assign(task2.id, dev1.id).await.unwrap();

        let team = store.resolve_team(project.id).await.unwrap();
        assert_eq!(team.len(), 3);
        assert_eq!(team[0].user_id, manager.id);
        assert_eq!(team[0].project_role, ProjectRole::Manager);
        assert_eq!(team[1].user_id, dev1.id);
        assert_eq!(team[1].project_role, ProjectRole::Member);
        assert_eq!(team[2].user_id, dev2.id);

        // dev1 appears once, carrying both task references.
        assert_eq!(team[1].tasks.len(), 2);
        assert_eq!(team[2].tasks.len(), 1);
    }

    #[tokio::test]
    async fn test_manager_accumulates_task_refs_when_assigned() {
        let store = MemoryProjectStore::new();
        let manager = seed_user(&store, "mgr", GlobalRole::Manager).await;
        let project = seed_project(&store, &manager).await;
        let task = seed_task(&store, &project, &manager).await;
        store.assign(task.id, manager.id).await.unwrap();

        let team = store.resolve_team(project.id).await.unwrap();
        assert_eq!(team.len(), 1);
        assert_eq!(team[0].project_role, ProjectRole::Manager);
        assert_eq!(team[0].tasks.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_team_member_strips_all_assignments() {
        let store = MemoryProjectStore::new();
        let manager = seed_user(&store, "mgr", GlobalRole::Manager).await;
        let dev = seed_user(&store, "dev", GlobalRole::Developer).await;
        let project = seed_project(&store, &manager).await;
        let task1 = seed_task(&store, &project, &manager).await;
        let task2 = seed_task(&store, &project, &manager).await;
        store.assign(task1.id, dev.id).await.unwrap();
        store.assign(task2.id, dev.id).await.unwrap();

        let team = store.remove_team_member(project.id, dev.id).await.unwrap();
        assert_eq!(team.len(), 1);
        assert_eq!(team[0].user_id, manager.id);
        assert!(store.list_task_assignments(task1.id).await.unwrap().is_empty());
        assert!(store.list_task_assignments(task2.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_remove_team_member_keeps_manager() {
        let store = MemoryProjectStore::new();
        let manager = seed_user(&store, "mgr", GlobalRole::Manager).await;
        let project = seed_project(&store, &manager).await;
        let task = seed_task(&store, &project, &manager).await;
        store.assign(task.id, manager.id).await.unwrap();

        let team = store
            .remove_team_member(project.id, manager.id)
            .await
            .unwrap();
        // The manager's assignments are gone but the manager remains.
        assert_eq!(team.len(), 1);
        assert_eq!(team[0].project_role, ProjectRole::Manager);
        assert!(team[0].tasks.is_empty());
    }

    #[tokio::test]
    async fn test_add_team_member_creates_placeholder_task() {
        let store = MemoryProjectStore::new();
        let manager = seed_user(&store, "mgr", GlobalRole::Manager).await;
        let dev = seed_user(&store, "dev", GlobalRole::Developer).await;
        let project = seed_project(&store, &manager).await;

        let team = store
            .add_team_member(project.id, dev.id, manager.id)
            .await
            .unwrap();

        assert_eq!(team.len(), 2);
        let tasks = store.list_project_tasks(project.id).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Project Setup");
        assert_eq!(tasks[0].status, TaskStatus::Todo);
        assert_eq!(tasks[0].creator_id, manager.id);
        assert!(store.is_assignee(tasks[0].id, dev.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_add_team_member_is_idempotent() {
        let store = MemoryProjectStore::new();
        let manager = seed_user(&store, "mgr", GlobalRole::Manager).await;
        let dev = seed_user(&store, "dev", GlobalRole::Developer).await;
        let project = seed_project(&store, &manager).await;
        let task = seed_task(&store, &project, &manager).await;
        store.assign(task.id, dev.id).await.unwrap();

        let team = store
            .add_team_member(project.id, dev.id, manager.id)
            .await
            .unwrap();
        assert_eq!(team.len(), 2);
        assert_eq!(store.list_project_tasks(project.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_project_cascades_everything() {
        let store = MemoryProjectStore::new();
        let manager = seed_user(&store, "mgr", GlobalRole::Manager).await;
        let dev1 = seed_user(&store, "dev1", GlobalRole::Developer).await;
        let dev2 = seed_user(&store, "dev2", GlobalRole::Developer).await;
        let project = seed_project(&store, &manager).await;

        // 3 tasks, 5 assignments total.
        let t1 = seed_task(&store, &project, &manager).await;
        let t2 = seed_task(&store, &project, &manager).await;
        let t3 = seed_task(&store, &project, &manager).await;
        store.assign(t1.id, dev1.id).await.unwrap();
        store.assign(t1.id, dev2.id).await.unwrap();
        store.assign(t2.id, dev1.id).await.unwrap();
        store.assign(t2.id, dev2.id).await.unwrap();
        store.assign(t3.id, dev1.id).await.unwrap();
        store
            .create_comment(Comment::new("note", t1.id, dev1.id))
            .await
            .unwrap();

        store.delete_project(project.id).await.unwrap();

        assert!(store.get_project(project.id).await.unwrap().is_none());
        for t in [t1.id, t2.id, t3.id] {
            assert!(store.get_task(t).await.unwrap().is_none());
        }
        assert!(store.list_user_assignments(dev1.id).await.unwrap().is_empty());
        assert!(store.list_user_assignments(dev2.id).await.unwrap().is_empty());

        // Deleting again reports the project as missing.
        let err = store.delete_project(project.id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_set_assignees_diffs_and_preserves_survivors() {
        let store = MemoryProjectStore::new();
        let manager = seed_user(&store, "mgr", GlobalRole::Manager).await;
        let dev1 = seed_user(&store, "dev1", GlobalRole::Developer).await;
        let dev2 = seed_user(&store, "dev2", GlobalRole::Developer).await;
        let dev3 = seed_user(&store, "dev3", GlobalRole::Developer).await;
        let project = seed_project(&store, &manager).await;
        let task = seed_task(&store, &project, &manager).await;

        store.assign(task.id, dev1.id).await.unwrap();
        store.assign(task.id, dev2.id).await.unwrap();
        store
            .set_assignment_status(task.id, dev1.id, AssignmentStatus::InProgress)
            .await
            .unwrap();

        // Replace {dev1, dev2} with {dev1, dev3}.
        let assignments = store
            .set_assignees(task.id, &[dev1.id, dev3.id])
            .await
            .unwrap();

        assert_eq!(assignments.len(), 2);
        let dev1_entry = assignments.iter().find(|a| a.user_id == dev1.id).unwrap();
        assert_eq!(dev1_entry.status, AssignmentStatus::InProgress);
        assert!(assignments.iter().any(|a| a.user_id == dev3.id));
        assert!(!store.is_assignee(task.id, dev2.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_set_assignees_unknown_user_changes_nothing() {
        let store = MemoryProjectStore::new();
        let manager = seed_user(&store, "mgr", GlobalRole::Manager).await;
        let dev = seed_user(&store, "dev", GlobalRole::Developer).await;
        let project = seed_project(&store, &manager).await;
        let task = seed_task(&store, &project, &manager).await;
        store.assign(task.id, dev.id).await.unwrap();

        let err = store
            .set_assignees(task.id, &[dev.id, Uuid::new_v4()])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        // The failed bulk replace left the ledger untouched.
        let assignments = store.list_task_assignments(task.id).await.unwrap();
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].user_id, dev.id);
    }

    #[tokio::test]
    async fn test_delete_user_blocked_by_managed_project() {
        let store = MemoryProjectStore::new();
        let manager = seed_user(&store, "mgr", GlobalRole::Manager).await;
        seed_project(&store, &manager).await;

        let err = store.delete_user(manager.id).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert!(store.get_user(manager.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_user_cascades_assignments_and_comments() {
        let store = MemoryProjectStore::new();
        let manager = seed_user(&store, "mgr", GlobalRole::Manager).await;
        let dev = seed_user(&store, "dev", GlobalRole::Developer).await;
        let project = seed_project(&store, &manager).await;
        let task = seed_task(&store, &project, &manager).await;
        store.assign(task.id, dev.id).await.unwrap();
        store
            .create_comment(Comment::new("bye", task.id, dev.id))
            .await
            .unwrap();

        store.delete_user(dev.id).await.unwrap();

        assert!(store.get_user(dev.id).await.unwrap().is_none());
        assert!(store.list_task_assignments(task.id).await.unwrap().is_empty());
        assert!(store.list_task_comments(task.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_username_and_email_rejected() {
        let store = MemoryProjectStore::new();
        seed_user(&store, "alice", GlobalRole::Developer).await;

        let err = store
            .create_user(User::new("alice", "other@example.com", "hash"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));

        let err = store
            .create_user(User::new("alice2", "ALICE@example.com", "hash"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn test_get_user_by_email_is_case_insensitive() {
        let store = MemoryProjectStore::new();
        let user = seed_user(&store, "alice", GlobalRole::Developer).await;

        let found = store
            .get_user_by_email("ALICE@EXAMPLE.COM")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, user.id);
    }

    #[tokio::test]
    async fn test_list_user_projects_merges_managed_and_assigned() {
        let store = MemoryProjectStore::new();
        let manager = seed_user(&store, "mgr", GlobalRole::Manager).await;
        let other_manager = seed_user(&store, "mgr2", GlobalRole::Manager).await;
        let project_a = seed_project(&store, &manager).await;
        let project_b = store
            .create_project(Project::new("Other", other_manager.id))
            .await
            .unwrap();
        let task = seed_task(&store, &project_b, &other_manager).await;
        store.assign(task.id, manager.id).await.unwrap();

        let projects = store.list_user_projects(manager.id).await.unwrap();
        assert_eq!(projects.len(), 2);
        assert_eq!(projects[0].id, project_a.id);
        assert_eq!(projects[1].id, project_b.id);
    }

    #[tokio::test]
    async fn test_create_task_with_unknown_assignee_writes_nothing() {
        let store = MemoryProjectStore::new();
        let manager = seed_user(&store, "mgr", GlobalRole::Manager).await;
        let project = seed_project(&store, &manager).await;

        let task = Task::new("T", project.id, manager.id);
        let err = store
            .create_task(task.clone(), &[Uuid::new_v4()])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
        assert!(store.get_task(task.id).await.unwrap().is_none());
    }
}
