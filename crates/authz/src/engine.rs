//! Policy evaluation.

use entities::GlobalRole;

use crate::{Action, Forbidden, Identity, TaskField};

/// Decides whether `identity` may perform `action`.
///
/// The whole policy is this one match: global-role shortcuts first
/// (admin allows everything, a global manager gets broad read and
/// team-management powers), then relationship rules. Assignees editing a
/// task are restricted to an allow-list of fields; a request touching
/// anything outside it is denied whole, never partially applied.
pub fn authorize(identity: &Identity, action: &Action) -> Result<(), Forbidden> {
    // Admin short-circuits every rule, including user deletion.
    if identity.role == GlobalRole::Admin {
        return Ok(());
    }

    let global_manager = identity.role == GlobalRole::Manager;

    let allowed = match action {
        // Any authenticated caller may read projects, tasks and comments,
        // create tasks, comment, and report progress on their own
        // assignment (the ledger turns non-assignees away).
        Action::ViewProject
        | Action::ViewTask
        | Action::CreateTask
        | Action::CreateComment
        | Action::UpdateOwnAssignment { .. } => true,

        // Only admins and managers open new projects.
        Action::CreateProject => global_manager,

        // Project mutation belongs to the managing user alone.
        Action::EditProject { manager_id, .. } | Action::DeleteProject { manager_id, .. } => {
            identity.id == *manager_id
        }

        // Team composition: the project's manager, or any global manager.
        Action::ManageTeam { manager_id, .. } => global_manager || identity.id == *manager_id,

        Action::EditTask { rel, touched } => {
            if identity.id == rel.project_manager_id || identity.id == rel.creator_id {
                true
            } else if rel.is_assignee {
                // Assignees may only touch status and actual_hours; one
                // disallowed field fails the whole request.
                touched.iter().all(TaskField::assignee_mutable)
            } else {
                false
            }
        }

        // Moving a task requires authority over the destination project.
        Action::MoveTask {
            destination_manager_id,
            ..
        } => identity.id == *destination_manager_id,

        Action::DeleteTask { rel } => {
            identity.id == rel.project_manager_id || identity.id == rel.creator_id
        }

        Action::ManageAssignees { rel } => {
            global_manager
                || identity.id == rel.project_manager_id
                || identity.id == rel.creator_id
        }

        Action::EditComment { author_id, .. } | Action::DeleteComment { author_id, .. } => {
            global_manager || identity.id == *author_id
        }

        Action::ListUsers => global_manager,

        Action::ViewUser { user_id } => global_manager || identity.id == *user_id,

        // Self-edit without touching the role; role changes are admin-only
        // and a non-admin request carrying one is refused outright rather
        // than silently stripped.
        Action::EditUser {
            user_id,
            changes_role,
        } => identity.id == *user_id && !changes_role,

        Action::DeleteUser { .. } => false,
    };

    if allowed {
        Ok(())
    } else {
        let (verb, entity, id) = action.describe();
        Err(Forbidden {
            action: verb,
            entity,
            id,
        })
    }
}

/// Boolean form of [`authorize`].
pub fn is_allowed(identity: &Identity, action: &Action) -> bool {
    authorize(identity, action).is_ok()
}
