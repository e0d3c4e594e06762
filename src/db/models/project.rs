//! Project models and DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::common::Priority;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    Planning,
    Active,
    OnHold,
    Completed,
    Archived,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 5] = [
        ProjectStatus::Planning,
        ProjectStatus::Active,
        ProjectStatus::OnHold,
        ProjectStatus::Completed,
        ProjectStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Active => "active",
            Self::OnHold => "on-hold",
            Self::Completed => "completed",
            Self::Archived => "archived",
        }
    }
}

impl Default for ProjectStatus {
    fn default() -> Self {
        Self::Planning
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "planning" => Ok(Self::Planning),
            "active" => Ok(Self::Active),
            "on-hold" | "on_hold" | "onhold" => Ok(Self::OnHold),
            "completed" | "done" => Ok(Self::Completed),
            "archived" => Ok(Self::Archived),
            _ => Err(format!("Unknown project status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    /// Budget in whole rupees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<u64>,
    pub start_date: NaiveDate,
    pub deadline: NaiveDate,
    pub priority: Priority,
    pub status: ProjectStatus,
    /// User IDs
    pub members: Vec<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Whether the user created the project or is listed as a member
    pub fn involves(&self, user_id: &str) -> bool {
        self.created_by == user_id || self.has_member(user_id)
    }

    pub fn has_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m == user_id)
    }
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub client_name: Option<String>,
    pub budget: Option<u64>,
    pub start_date: NaiveDate,
    pub deadline: NaiveDate,
    pub priority: Priority,
    pub status: ProjectStatus,
    pub members: Vec<String>,
    pub created_by: String,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub client_name: Option<String>,
    pub budget: Option<u64>,
    pub start_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
    pub priority: Option<Priority>,
    pub status: Option<ProjectStatus>,
    pub members: Option<Vec<String>>,
}

impl Project {
    pub(crate) fn apply(&mut self, patch: ProjectPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(client_name) = patch.client_name {
            self.client_name = Some(client_name);
        }
        if let Some(budget) = patch.budget {
            self.budget = Some(budget);
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = deadline;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(members) = patch.members {
            self.members = members;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_status_kebab_case() {
        assert_eq!(
            serde_json::to_string(&ProjectStatus::OnHold).unwrap(),
            "\"on-hold\""
        );
        assert_eq!("on_hold".parse::<ProjectStatus>(), Ok(ProjectStatus::OnHold));
        assert_eq!(ProjectStatus::OnHold.to_string(), "on-hold");
        assert!("paused".parse::<ProjectStatus>().is_err());
    }
}
