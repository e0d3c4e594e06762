use chrono::Utc;
use serde_json::json;
use tracing::{debug, info};

use super::AppStore;
use crate::db::{actions, next_timestamp, ActivityTarget, NewProject, Project, ProjectPatch, Task};
use crate::error::{EntityKind, StoreError, StoreResult};
use crate::utils::generate_id;

/// Result of deleting a project together with its tasks
#[derive(Debug, Clone)]
pub struct CascadeDelete {
    pub project: Project,
    pub removed_tasks: Vec<Task>,
}

impl AppStore {
    pub fn project(&self, id: &str) -> Option<&Project> {
        self.state.project(id)
    }

    pub fn projects(&self) -> &[Project] {
        &self.state.projects
    }

    pub fn add_project(&mut self, new: NewProject) -> StoreResult<Project> {
        let now = Utc::now();
        let project = Project {
            id: generate_id(),
            title: new.title,
            description: new.description,
            client_name: new.client_name,
            budget: new.budget,
            start_date: new.start_date,
            deadline: new.deadline,
            priority: new.priority,
            status: new.status,
            members: new.members,
            created_by: new.created_by,
            created_at: now,
            updated_at: now,
        };

        self.state.projects.push(project.clone());
        self.record_activity(
            ActivityTarget::Project,
            &project.id,
            actions::CREATED,
            Some(json!({ "title": project.title })),
        );
        debug!(project_id = %project.id, title = %project.title, "Project created");

        self.persist()?;
        Ok(project)
    }

    pub fn update_project(&mut self, id: &str, patch: ProjectPatch) -> StoreResult<Project> {
        let project = self.project_mut(id)?;
        project.apply(patch);
        project.updated_at = next_timestamp(project.updated_at);
        let updated = project.clone();

        self.record_activity(ActivityTarget::Project, id, actions::UPDATED, None);
        debug!(project_id = %id, "Project updated");

        self.persist()?;
        Ok(updated)
    }

    /// Remove the project and every task that belongs to it in one update
    pub fn delete_project(&mut self, id: &str) -> StoreResult<CascadeDelete> {
        let index = self
            .state
            .projects
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found(EntityKind::Project, id))?;

        let project = self.state.projects.remove(index);
        let (removed_tasks, kept): (Vec<Task>, Vec<Task>) = std::mem::take(&mut self.state.tasks)
            .into_iter()
            .partition(|t| t.project_id == id);
        self.state.tasks = kept;

        self.record_activity(
            ActivityTarget::Project,
            id,
            actions::DELETED,
            Some(json!({ "title": project.title, "removedTasks": removed_tasks.len() })),
        );
        info!(
            project_id = %id,
            removed_tasks = removed_tasks.len(),
            "Project deleted"
        );

        self.persist()?;
        Ok(CascadeDelete {
            project,
            removed_tasks,
        })
    }
}
