//! Project-related entity definitions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Planning,
    InProgress,
    OnHold,
    Completed,
    Cancelled,
}

impl Default for ProjectStatus {
    fn default() -> Self {
        Self::Planning
    }
}

/// A project owned by exactly one manager.
///
/// There is no stored team: membership is derived from task assignments
/// plus the manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier.
    pub id: Uuid,
    /// Project title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Current status.
    pub status: ProjectStatus,
    /// Planned start date.
    pub start_date: Option<NaiveDate>,
    /// Planned end date.
    pub end_date: Option<NaiveDate>,
    /// The managing user.
    pub manager_id: Uuid,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
    /// When this record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Creates a new project in `planning` status.
    pub fn new(title: impl Into<String>, manager_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            status: ProjectStatus::Planning,
            start_date: None,
            end_date: None,
            manager_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: ProjectStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the planned date range.
    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_creation() {
        let manager_id = Uuid::new_v4();
        let project = Project::new("Website Redesign", manager_id)
            .with_description("Q3 marketing site refresh")
            .with_status(ProjectStatus::InProgress);

        assert_eq!(project.title, "Website Redesign");
        assert_eq!(project.manager_id, manager_id);
        assert_eq!(project.status, ProjectStatus::InProgress);
        assert!(project.start_date.is_none());
    }

    #[test]
    fn test_default_status_is_planning() {
        let project = Project::new("P", Uuid::new_v4());
        assert_eq!(project.status, ProjectStatus::Planning);
    }
}
