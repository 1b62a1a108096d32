//! Comment entity definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A comment on a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Unique identifier.
    pub id: Uuid,
    /// Comment body.
    pub content: String,
    /// The task commented on.
    pub task_id: Uuid,
    /// The authoring user.
    pub author_id: Uuid,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Creates a new comment.
    pub fn new(content: impl Into<String>, task_id: Uuid, author_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            task_id,
            author_id,
            created_at: now,
            updated_at: now,
        }
    }
}
