//! Authorization error types.

use thiserror::Error;
use uuid::Uuid;

/// Kind of entity an action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Project,
    Task,
    Comment,
}

impl EntityKind {
    /// Returns the lowercase name used in messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Project => "project",
            EntityKind::Task => "task",
            EntityKind::Comment => "comment",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A denied action.
///
/// Carries what was attempted against what, so the HTTP layer can produce a
/// 403 that is distinguishable from a 404.
#[derive(Debug, Clone, Error)]
pub struct Forbidden {
    /// Verb of the denied action.
    pub action: &'static str,
    /// Kind of the target entity.
    pub entity: EntityKind,
    /// Target id, when the action has a concrete target.
    pub id: Option<Uuid>,
}

impl std::fmt::Display for Forbidden {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.id {
            Some(id) => write!(f, "not authorized to {} {} {}", self.action, self.entity, id),
            None => write!(f, "not authorized to {} {}s", self.action, self.entity),
        }
    }
}
