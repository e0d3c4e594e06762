//! Task models. A task's status is the only thing deciding its kanban lane.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::common::Priority;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Backlog,
    Todo,
    InProgress,
    Review,
    Testing,
    Completed,
}

impl TaskStatus {
    /// Lanes in display order
    pub const ALL: [TaskStatus; 6] = [
        TaskStatus::Backlog,
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Testing,
        TaskStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Review => "review",
            Self::Testing => "testing",
            Self::Completed => "completed",
        }
    }

    /// Column heading
    pub fn title(&self) -> &'static str {
        match self {
            Self::Backlog => "Backlog",
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::Review => "Review",
            Self::Testing => "Testing",
            Self::Completed => "Completed",
        }
    }

    /// Position of the lane on the board, 0-based
    pub fn lane_index(&self) -> usize {
        match self {
            Self::Backlog => 0,
            Self::Todo => 1,
            Self::InProgress => 2,
            Self::Review => 3,
            Self::Testing => 4,
            Self::Completed => 5,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "backlog" => Ok(Self::Backlog),
            "todo" | "to-do" | "to_do" => Ok(Self::Todo),
            "in-progress" | "in_progress" | "inprogress" => Ok(Self::InProgress),
            "review" => Ok(Self::Review),
            "testing" => Ok(Self::Testing),
            "completed" | "done" => Ok(Self::Completed),
            _ => Err(format!("Unknown task status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub title: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub user_id: String,
    pub content: String,
    #[serde(default)]
    pub mentions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub name: String,
    pub url: String,
    /// MIME type
    #[serde(rename = "type")]
    pub content_type: String,
    pub size: u64,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<f64>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Completed vs total subtasks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubtaskProgress {
    pub completed: usize,
    pub total: usize,
}

impl SubtaskProgress {
    /// Percentage of completed subtasks, 0 when the task has none
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        }
    }
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    pub fn is_assigned_to(&self, user_id: &str) -> bool {
        self.assignees.iter().any(|a| a == user_id)
    }

    pub fn subtask_progress(&self) -> SubtaskProgress {
        SubtaskProgress {
            completed: self.subtasks.iter().filter(|s| s.completed).count(),
            total: self.subtasks.len(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub project_id: String,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: Priority,
    pub assignees: Vec<String>,
    pub tags: Vec<String>,
    pub subtasks: Vec<Subtask>,
    pub due_date: Option<NaiveDate>,
    pub estimated_hours: Option<f64>,
    pub time_spent: Option<f64>,
    pub created_by: String,
}

impl NewTask {
    /// A task with only the required fields set
    pub fn new(
        project_id: impl Into<String>,
        title: impl Into<String>,
        status: TaskStatus,
        created_by: impl Into<String>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            title: title.into(),
            description: String::new(),
            status,
            priority: Priority::default(),
            assignees: Vec::new(),
            tags: Vec::new(),
            subtasks: Vec::new(),
            due_date: None,
            estimated_hours: None,
            time_spent: None,
            created_by: created_by.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub project_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub assignees: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub subtasks: Option<Vec<Subtask>>,
    pub due_date: Option<NaiveDate>,
    pub estimated_hours: Option<f64>,
    pub time_spent: Option<f64>,
    pub attachments: Option<Vec<Attachment>>,
}

impl Task {
    pub(crate) fn apply(&mut self, patch: TaskPatch) {
        if let Some(project_id) = patch.project_id {
            self.project_id = project_id;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(assignees) = patch.assignees {
            self.assignees = assignees;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(subtasks) = patch.subtasks {
            self.subtasks = subtasks;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = Some(due_date);
        }
        if let Some(estimated_hours) = patch.estimated_hours {
            self.estimated_hours = Some(estimated_hours);
        }
        if let Some(time_spent) = patch.time_spent {
            self.time_spent = Some(time_spent);
        }
        if let Some(attachments) = patch.attachments {
            self.attachments = attachments;
        }
    }
}

/// Comment as submitted by a user
#[derive(Debug, Clone)]
pub struct NewComment {
    pub user_id: String,
    pub content: String,
    /// User IDs mentioned in the comment
    pub mentions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_order_matches_lanes() {
        for (index, status) in TaskStatus::ALL.iter().enumerate() {
            assert_eq!(status.lane_index(), index);
        }
        assert!(TaskStatus::Backlog < TaskStatus::Completed);
    }

    #[test]
    fn test_task_status_parsing() {
        assert_eq!("in-progress".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert_eq!("IN_PROGRESS".parse::<TaskStatus>(), Ok(TaskStatus::InProgress));
        assert_eq!("done".parse::<TaskStatus>(), Ok(TaskStatus::Completed));
        assert!("blocked".parse::<TaskStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
    }

    #[test]
    fn test_subtask_progress() {
        let mut task_json = serde_json::json!({
            "id": "1-1",
            "projectId": "1",
            "title": "Design homepage mockups",
            "description": "",
            "status": "todo",
            "priority": "high",
            "subtasks": [
                {"id": "1", "title": "Hero section", "completed": true},
                {"id": "2", "title": "Feature cards", "completed": false}
            ],
            "createdBy": "1",
            "createdAt": "2026-02-05T00:00:00Z",
            "updatedAt": "2026-02-18T00:00:00Z"
        });
        let task: Task = serde_json::from_value(task_json.take()).unwrap();

        let progress = task.subtask_progress();
        assert_eq!(progress, SubtaskProgress { completed: 1, total: 2 });
        assert_eq!(progress.percent(), 50.0);
        assert!(task.comments.is_empty());
        assert!(task.due_date.is_none());
    }

    #[test]
    fn test_empty_subtask_progress_is_zero() {
        let progress = SubtaskProgress { completed: 0, total: 0 };
        assert_eq!(progress.percent(), 0.0);
    }

    #[test]
    fn test_attachment_type_field_name() {
        let attachment = Attachment {
            id: "a1".to_string(),
            name: "spec.pdf".to_string(),
            url: "https://files.example.com/spec.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            size: 1024,
            uploaded_by: "1".to_string(),
            uploaded_at: Utc::now(),
        };
        let value = serde_json::to_value(attachment).unwrap();
        assert_eq!(value["type"], "application/pdf");
        assert!(value.get("uploadedBy").is_some());
    }
}
