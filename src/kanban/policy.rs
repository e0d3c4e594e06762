use std::sync::Arc;
use tracing::info;

use crate::config::{KanbanConfig, TransitionPolicyKind};
use crate::db::{Task, TaskStatus};

/// Decides whether a task may move to another lane.
///
/// Consulted by every status change made through the store. An `Err`
/// carries the reason shown to the user.
pub trait TransitionPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    fn check(&self, task: &Task, to: TaskStatus) -> Result<(), String>;
}

/// Any lane to any lane
pub struct Unrestricted;

impl TransitionPolicy for Unrestricted {
    fn name(&self) -> &'static str {
        "unrestricted"
    }

    fn check(&self, _task: &Task, _to: TaskStatus) -> Result<(), String> {
        Ok(())
    }
}

/// Tasks may stay put or move right, never back to an earlier lane
pub struct ForwardOnly;

impl TransitionPolicy for ForwardOnly {
    fn name(&self) -> &'static str {
        "forward-only"
    }

    fn check(&self, task: &Task, to: TaskStatus) -> Result<(), String> {
        if to.lane_index() < task.status.lane_index() {
            return Err(format!(
                "'{}' comes before '{}'",
                to.title(),
                task.status.title()
            ));
        }
        Ok(())
    }
}

/// Completed tasks stay completed
pub struct CompletedIsTerminal;

impl TransitionPolicy for CompletedIsTerminal {
    fn name(&self) -> &'static str {
        "completed-is-terminal"
    }

    fn check(&self, task: &Task, to: TaskStatus) -> Result<(), String> {
        if task.status == TaskStatus::Completed && to != TaskStatus::Completed {
            return Err("completed tasks cannot be reopened".to_string());
        }
        Ok(())
    }
}

/// Build the policy named in the configuration
pub fn build_transition_policy(config: &KanbanConfig) -> Arc<dyn TransitionPolicy> {
    let policy: Arc<dyn TransitionPolicy> = match config.transition_policy {
        TransitionPolicyKind::Unrestricted => Arc::new(Unrestricted),
        TransitionPolicyKind::ForwardOnly => Arc::new(ForwardOnly),
        TransitionPolicyKind::CompletedIsTerminal => Arc::new(CompletedIsTerminal),
    };
    info!(policy = policy.name(), "Using transition policy");
    policy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewTask;
    use chrono::Utc;

    fn task_in(status: TaskStatus) -> Task {
        let new = NewTask::new("p", "t", status, "1");
        let now = Utc::now();
        Task {
            id: "t-1".to_string(),
            project_id: new.project_id,
            title: new.title,
            description: new.description,
            status: new.status,
            priority: new.priority,
            assignees: new.assignees,
            tags: new.tags,
            subtasks: new.subtasks,
            due_date: None,
            estimated_hours: None,
            time_spent: None,
            comments: Vec::new(),
            attachments: Vec::new(),
            created_by: new.created_by,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_unrestricted_allows_every_pair() {
        for from in TaskStatus::ALL {
            for to in TaskStatus::ALL {
                assert!(Unrestricted.check(&task_in(from), to).is_ok());
            }
        }
    }

    #[test]
    fn test_forward_only() {
        let task = task_in(TaskStatus::Review);
        assert!(ForwardOnly.check(&task, TaskStatus::Review).is_ok());
        assert!(ForwardOnly.check(&task, TaskStatus::Completed).is_ok());
        let reason = ForwardOnly.check(&task, TaskStatus::Todo).unwrap_err();
        assert!(reason.contains("To Do"));
    }

    #[test]
    fn test_completed_is_terminal() {
        let done = task_in(TaskStatus::Completed);
        assert!(CompletedIsTerminal.check(&done, TaskStatus::Completed).is_ok());
        assert!(CompletedIsTerminal.check(&done, TaskStatus::Backlog).is_err());
        assert!(CompletedIsTerminal
            .check(&task_in(TaskStatus::Testing), TaskStatus::Backlog)
            .is_ok());
    }

    #[test]
    fn test_build_from_config() {
        let config = KanbanConfig {
            transition_policy: TransitionPolicyKind::ForwardOnly,
        };
        assert_eq!(build_transition_policy(&config).name(), "forward-only");
        assert_eq!(
            build_transition_policy(&KanbanConfig::default()).name(),
            "unrestricted"
        );
    }
}
