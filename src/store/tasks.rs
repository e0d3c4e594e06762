use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};

use super::AppStore;
use crate::db::{
    actions, next_timestamp, ActivityTarget, Comment, NewComment, NewNotification, NewTask,
    NotificationType, Recipient, Task, TaskPatch, TaskStatus,
};
use crate::error::{EntityKind, StoreError, StoreResult};
use crate::utils::generate_id;

impl AppStore {
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.state.task(id)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.state.tasks
    }

    /// Create a task under an existing project
    pub fn add_task(&mut self, new: NewTask) -> StoreResult<Task> {
        self.ensure_project(&new.project_id)?;

        let now = Utc::now();
        let task = Task {
            id: generate_id(),
            project_id: new.project_id,
            title: new.title,
            description: new.description,
            status: new.status,
            priority: new.priority,
            assignees: new.assignees,
            tags: new.tags,
            subtasks: new.subtasks,
            due_date: new.due_date,
            estimated_hours: new.estimated_hours,
            time_spent: new.time_spent,
            comments: Vec::new(),
            attachments: Vec::new(),
            created_by: new.created_by,
            created_at: now,
            updated_at: now,
        };

        self.state.tasks.push(task.clone());
        self.record_activity(
            ActivityTarget::Task,
            &task.id,
            actions::CREATED,
            Some(json!({ "title": task.title, "projectId": task.project_id })),
        );
        debug!(task_id = %task.id, project_id = %task.project_id, "Task created");

        self.persist()?;
        Ok(task)
    }

    /// Merge a patch into a task. A status change goes through the
    /// transition policy just like [`AppStore::move_task`].
    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> StoreResult<Task> {
        if let Some(project_id) = &patch.project_id {
            self.ensure_project(project_id)?;
        }
        if let Some(status) = patch.status {
            let task = self
                .state
                .task(id)
                .ok_or_else(|| StoreError::not_found(EntityKind::Task, id))?;
            self.check_transition(task, status)?;
        }

        let task = self.task_mut(id)?;
        task.apply(patch);
        task.updated_at = next_timestamp(task.updated_at);
        let updated = task.clone();

        self.record_activity(ActivityTarget::Task, id, actions::UPDATED, None);
        debug!(task_id = %id, "Task updated");

        self.persist()?;
        Ok(updated)
    }

    pub fn delete_task(&mut self, id: &str) -> StoreResult<Task> {
        let index = self
            .state
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Task, id))?;
        let task = self.state.tasks.remove(index);

        self.record_activity(
            ActivityTarget::Task,
            id,
            actions::DELETED,
            Some(json!({ "title": task.title })),
        );
        debug!(task_id = %id, "Task deleted");

        self.persist()?;
        Ok(task)
    }

    /// Put a task into another kanban lane.
    ///
    /// Any lane may be reached from any lane unless the configured policy
    /// says otherwise. Moving into the current lane still bumps `updatedAt`.
    pub fn move_task(&mut self, id: &str, status: TaskStatus) -> StoreResult<Task> {
        let task = self
            .state
            .task(id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Task, id))?;
        self.check_transition(task, status)?;

        let task = self.task_mut(id)?;
        let from = task.status;
        task.status = status;
        task.updated_at = next_timestamp(task.updated_at);
        let moved = task.clone();

        self.record_activity(
            ActivityTarget::Task,
            id,
            actions::MOVED,
            Some(json!({ "from": from, "to": status })),
        );
        info!(task_id = %id, %from, to = %status, "Task moved");

        self.persist()?;
        Ok(moved)
    }

    /// Flip the completed flag of one subtask
    pub fn toggle_subtask(&mut self, task_id: &str, subtask_id: &str) -> StoreResult<Task> {
        let task = self.task_mut(task_id)?;
        let subtask = task
            .subtasks
            .iter_mut()
            .find(|s| s.id == subtask_id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Subtask, subtask_id))?;
        subtask.completed = !subtask.completed;
        task.updated_at = next_timestamp(task.updated_at);
        let updated = task.clone();

        self.persist()?;
        Ok(updated)
    }

    /// Append a comment and notify every mentioned user except the author
    pub fn add_comment(&mut self, task_id: &str, new: NewComment) -> StoreResult<Comment> {
        let task = self.task_mut(task_id)?;
        let comment = Comment {
            id: generate_id(),
            user_id: new.user_id,
            content: new.content,
            mentions: new.mentions,
            created_at: Utc::now(),
        };
        task.comments.push(comment.clone());
        task.updated_at = next_timestamp(task.updated_at);
        let task_title = task.title.clone();

        let mut notified: Vec<&str> = Vec::new();
        for mention in &comment.mentions {
            if mention == &comment.user_id || notified.contains(&mention.as_str()) {
                continue;
            }
            notified.push(mention);
            self.push_notification(NewNotification::new(
                Recipient::user(mention.as_str()),
                NotificationType::Mention,
                "You were mentioned",
                format!("You were mentioned in a comment on \"{}\"", task_title),
            ));
        }

        self.record_activity(
            ActivityTarget::Task,
            task_id,
            actions::COMMENTED,
            Some(json!({ "commentId": comment.id, "mentions": notified.len() })),
        );
        debug!(task_id, mentions = notified.len(), "Comment added");

        self.persist()?;
        Ok(comment)
    }

    fn check_transition(&self, task: &Task, to: TaskStatus) -> StoreResult<()> {
        self.policy
            .check(task, to)
            .map_err(|reason| StoreError::TransitionRejected {
                from: task.status,
                to,
                reason,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::new_project;
    use super::*;
    use crate::db::Subtask;
    use crate::kanban::CompletedIsTerminal;
    use std::sync::Arc;

    fn store_with_project() -> (AppStore, String) {
        let mut store = AppStore::in_memory();
        let project = store.add_project(new_project("Digital Campaign")).unwrap();
        (store, project.id)
    }

    #[test]
    fn test_add_task_requires_existing_project() {
        let mut store = AppStore::in_memory();
        let err = store
            .add_task(NewTask::new("nope", "Orphan", TaskStatus::Todo, "1"))
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::NotFound { kind: EntityKind::Project, .. }
        ));
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn test_move_task_sets_status_and_later_timestamp() {
        let (mut store, project_id) = store_with_project();
        let task = store
            .add_task(NewTask::new(&project_id, "Write API docs", TaskStatus::Todo, "1"))
            .unwrap();

        let moved = store.move_task(&task.id, TaskStatus::Review).unwrap();
        assert_eq!(moved.status, TaskStatus::Review);
        assert!(moved.updated_at > task.updated_at);

        // Completed is not terminal by default
        store.move_task(&task.id, TaskStatus::Completed).unwrap();
        let reopened = store.move_task(&task.id, TaskStatus::Backlog).unwrap();
        assert_eq!(reopened.status, TaskStatus::Backlog);

        // Same lane still counts as a move
        let again = store.move_task(&task.id, TaskStatus::Backlog).unwrap();
        assert!(again.updated_at > reopened.updated_at);
    }

    #[test]
    fn test_policy_rejection_leaves_task_untouched() {
        let (mut store, project_id) = store_with_project();
        store.set_policy(Arc::new(CompletedIsTerminal));
        let task = store
            .add_task(NewTask::new(&project_id, "Ship it", TaskStatus::Completed, "1"))
            .unwrap();

        let err = store.move_task(&task.id, TaskStatus::Todo).unwrap_err();
        assert!(matches!(err, StoreError::TransitionRejected { .. }));

        let err = store
            .update_task(
                &task.id,
                TaskPatch {
                    status: Some(TaskStatus::Review),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::TransitionRejected { .. }));
        assert_eq!(store.task(&task.id), Some(&task));
    }

    #[test]
    fn test_update_task_to_unknown_project_fails() {
        let (mut store, project_id) = store_with_project();
        let task = store
            .add_task(NewTask::new(&project_id, "Schema", TaskStatus::Todo, "1"))
            .unwrap();

        let err = store
            .update_task(
                &task.id,
                TaskPatch {
                    project_id: Some("ghost".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.task(&task.id).unwrap().project_id, project_id);
    }

    #[test]
    fn test_update_and_delete_task() {
        let (mut store, project_id) = store_with_project();
        let task = store
            .add_task(NewTask::new(&project_id, "Perf pass", TaskStatus::Backlog, "1"))
            .unwrap();

        let updated = store
            .update_task(
                &task.id,
                TaskPatch {
                    assignees: Some(vec!["3".to_string()]),
                    time_spent: Some(2.5),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(updated.is_assigned_to("3"));
        assert_eq!(updated.time_spent, Some(2.5));
        assert!(updated.updated_at > task.updated_at);

        let deleted = store.delete_task(&task.id).unwrap();
        assert_eq!(deleted.id, task.id);
        assert!(store.task(&task.id).is_none());
        assert!(store.delete_task(&task.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_toggle_subtask() {
        let (mut store, project_id) = store_with_project();
        let mut new = NewTask::new(&project_id, "Navigation", TaskStatus::InProgress, "1");
        new.subtasks = vec![
            Subtask {
                id: "1".to_string(),
                title: "Desktop nav".to_string(),
                completed: true,
            },
            Subtask {
                id: "2".to_string(),
                title: "Mobile menu".to_string(),
                completed: false,
            },
        ];
        let task = store.add_task(new).unwrap();

        let toggled = store.toggle_subtask(&task.id, "2").unwrap();
        let progress = toggled.subtask_progress();
        assert_eq!((progress.completed, progress.total), (2, 2));

        let toggled = store.toggle_subtask(&task.id, "1").unwrap();
        assert_eq!(toggled.subtask_progress().completed, 1);

        let err = store.toggle_subtask(&task.id, "9").unwrap_err();
        assert!(matches!(
            err,
            StoreError::NotFound { kind: EntityKind::Subtask, .. }
        ));
    }

    #[test]
    fn test_comment_mentions_fan_out() {
        let (mut store, project_id) = store_with_project();
        let task = store
            .add_task(NewTask::new(&project_id, "Homepage", TaskStatus::Review, "1"))
            .unwrap();

        let comment = store
            .add_comment(
                &task.id,
                NewComment {
                    user_id: "1".to_string(),
                    content: "@2 @3 please review".to_string(),
                    mentions: ["2", "3", "3", "1"].map(String::from).to_vec(),
                },
            )
            .unwrap();

        assert_eq!(store.task(&task.id).unwrap().comments, vec![comment]);

        let notifications = &store.snapshot().notifications;
        assert_eq!(notifications.len(), 2);
        assert!(notifications
            .iter()
            .all(|n| n.kind == NotificationType::Mention && !n.read));
        assert_eq!(store.notifications_for("3").len(), 1);
        assert!(store.notifications_for("1").is_empty());
    }
}
