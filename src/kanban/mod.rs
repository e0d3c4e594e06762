//! Kanban board: six fixed lanes, one per [`TaskStatus`].

mod policy;

pub use policy::{
    build_transition_policy, CompletedIsTerminal, ForwardOnly, TransitionPolicy, Unrestricted,
};

use crate::db::{Task, TaskStatus};
use crate::error::StoreResult;
use crate::store::{AppSnapshot, AppStore};

/// One column of the board
#[derive(Debug, Clone)]
pub struct Lane<'a> {
    pub status: TaskStatus,
    pub tasks: Vec<&'a Task>,
}

impl Lane<'_> {
    pub fn title(&self) -> &'static str {
        self.status.title()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// A project's tasks grouped into lanes, in display order
#[derive(Debug, Clone)]
pub struct KanbanBoard<'a> {
    pub project_id: &'a str,
    pub lanes: Vec<Lane<'a>>,
}

impl<'a> KanbanBoard<'a> {
    pub fn for_project(snapshot: &'a AppSnapshot, project_id: &'a str) -> Self {
        let mut lanes: Vec<Lane<'a>> = TaskStatus::ALL
            .iter()
            .map(|&status| Lane {
                status,
                tasks: Vec::new(),
            })
            .collect();

        for task in snapshot.tasks_for_project(project_id) {
            lanes[task.status.lane_index()].tasks.push(task);
        }

        Self { project_id, lanes }
    }

    pub fn lane(&self, status: TaskStatus) -> &Lane<'a> {
        &self.lanes[status.lane_index()]
    }

    pub fn task_count(&self) -> usize {
        self.lanes.iter().map(Lane::len).sum()
    }
}

/// Lane whose identifier is exactly `id`
pub fn lane_for_id(id: &str) -> Option<TaskStatus> {
    TaskStatus::ALL.into_iter().find(|s| s.as_str() == id)
}

/// Drag-end handling: dropping onto a lane moves the task there, dropping
/// anywhere else (another card, outside the board) does nothing.
pub fn handle_drop(store: &mut AppStore, task_id: &str, over_id: &str) -> StoreResult<Option<Task>> {
    match lane_for_id(over_id) {
        Some(status) => store.move_task(task_id, status).map(Some),
        None => Ok(None),
    }
}
