//! The application state container.
//!
//! [`AppStore`] owns every collection (projects, tasks, team members,
//! notifications, activities) plus the theme preference. Each mutation
//! updates the in-memory [`AppSnapshot`] and then writes the whole snapshot
//! to storage under [`APP_NAMESPACE`]. If that write fails the in-memory
//! change stays and the error is returned to the caller.
//!
//! The store does not validate field contents; callers do that before
//! handing over a payload.

mod activity;
mod notifications;
mod projects;
mod tasks;
mod team;

pub use activity::MAX_ACTIVITIES;
pub use projects::CascadeDelete;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::db::{
    load_snapshot, preserve_unreadable, save_snapshot, Activity, MemoryStorage, Notification,
    Project, SharedStorage, Task, TeamMember, Theme, APP_NAMESPACE,
};
use crate::error::{EntityKind, StoreError, StoreResult};
use crate::kanban::{TransitionPolicy, Unrestricted};

/// Everything persisted under the app namespace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSnapshot {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    /// Newest first
    #[serde(default)]
    pub notifications: Vec<Notification>,
    /// Newest first
    #[serde(default)]
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub team_members: Vec<TeamMember>,
    #[serde(default)]
    pub theme: Theme,
}

impl AppSnapshot {
    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn team_member(&self, id: &str) -> Option<&TeamMember> {
        self.team_members.iter().find(|m| m.id == id)
    }

    pub fn tasks_for_project<'a>(&'a self, project_id: &'a str) -> impl Iterator<Item = &'a Task> {
        self.tasks.iter().filter(move |t| t.project_id == project_id)
    }
}

pub struct AppStore {
    state: AppSnapshot,
    storage: SharedStorage,
    policy: Arc<dyn TransitionPolicy>,
    acting_user: Option<String>,
}

impl AppStore {
    /// Restore the persisted snapshot, starting empty if there is none or it
    /// cannot be read. An unreadable snapshot is first copied to
    /// `app-storage.corrupt`.
    pub fn open(storage: SharedStorage, policy: Arc<dyn TransitionPolicy>) -> Self {
        let state = match load_snapshot::<AppSnapshot>(storage.as_ref(), APP_NAMESPACE) {
            Ok(Some(state)) => {
                info!(
                    projects = state.projects.len(),
                    tasks = state.tasks.len(),
                    "Restored app state"
                );
                state
            }
            Ok(None) => AppSnapshot::default(),
            Err(e) => {
                match preserve_unreadable(storage.as_ref(), APP_NAMESPACE) {
                    Ok(Some(backup)) => warn!(
                        error = %e,
                        backup = %backup,
                        "Unreadable app snapshot moved aside, starting empty"
                    ),
                    Ok(None) => warn!(error = %e, "Discarding unreadable app snapshot"),
                    Err(copy_err) => error!(
                        error = %e,
                        copy_error = %copy_err,
                        "Unreadable app snapshot could not be backed up and will be overwritten"
                    ),
                }
                AppSnapshot::default()
            }
        };

        Self {
            state,
            storage,
            policy,
            acting_user: None,
        }
    }

    /// Empty store on process-local storage with the unrestricted policy
    pub fn in_memory() -> Self {
        Self::open(MemoryStorage::shared(), Arc::new(Unrestricted))
    }

    pub fn snapshot(&self) -> &AppSnapshot {
        &self.state
    }

    pub fn policy(&self) -> &Arc<dyn TransitionPolicy> {
        &self.policy
    }

    pub fn set_policy(&mut self, policy: Arc<dyn TransitionPolicy>) {
        info!(policy = policy.name(), "Transition policy changed");
        self.policy = policy;
    }

    /// User recorded as the actor of subsequent activity entries
    pub fn set_acting_user(&mut self, user_id: Option<String>) {
        self.acting_user = user_id;
    }

    pub fn acting_user(&self) -> Option<&str> {
        self.acting_user.as_deref()
    }

    pub fn toggle_theme(&mut self) -> StoreResult<Theme> {
        self.state.theme = self.state.theme.toggled();
        self.persist()?;
        Ok(self.state.theme)
    }

    /// Direct access for bulk loads that bypass id generation
    pub(crate) fn state_mut(&mut self) -> &mut AppSnapshot {
        &mut self.state
    }

    pub(crate) fn persist(&self) -> StoreResult<()> {
        save_snapshot(self.storage.as_ref(), APP_NAMESPACE, &self.state)
    }

    fn project_mut(&mut self, id: &str) -> StoreResult<&mut Project> {
        self.state
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Project, id))
    }

    fn task_mut(&mut self, id: &str) -> StoreResult<&mut Task> {
        self.state
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Task, id))
    }

    fn ensure_project(&self, id: &str) -> StoreResult<()> {
        if self.state.project(id).is_some() {
            Ok(())
        } else {
            Err(StoreError::not_found(EntityKind::Project, id))
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::NaiveDate;

    use crate::db::{NewProject, Priority, ProjectStatus};

    pub fn new_project(title: &str) -> NewProject {
        NewProject {
            title: title.to_string(),
            description: format!("{} description", title),
            client_name: Some("Infosys".to_string()),
            budget: Some(1_000_000),
            start_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            deadline: NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
            priority: Priority::High,
            status: ProjectStatus::Active,
            members: vec!["1".to_string(), "3".to_string()],
            created_by: "1".to_string(),
        }
    }
}
