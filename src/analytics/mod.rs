//! Derived views over the app snapshot.
//!
//! Nothing here is stored. Every view is recomputed from the collections on
//! each call, with the current time passed in by the caller so results are
//! reproducible.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::{
    start_of_day, Notification, Priority, ProjectStatus, Task, TaskStatus, TeamMember, UserRole,
};
use crate::store::AppSnapshot;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Rounded percentage, 0 when there is nothing to complete
pub fn completion_rate(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (completed as f64 / total as f64 * 100.0).round() as u32
}

/// Due date has passed (midnight of the due day is before `now`) and the
/// task is not completed
pub fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    match task.due_date {
        Some(due) => start_of_day(due) < now && !task.is_completed(),
        None => false,
    }
}

/// Whole days until the due date, rounded up. `None` without a due date.
pub fn days_until_due(task: &Task, now: DateTime<Utc>) -> Option<i64> {
    let due = start_of_day(task.due_date?);
    let ms = (due - now).num_milliseconds();
    Some(-((-ms).div_euclid(DAY_MS)))
}

/// Due within the next seven days and not completed
pub fn is_upcoming(task: &Task, now: DateTime<Utc>) -> bool {
    matches!(days_until_due(task, now), Some(days) if (1..=7).contains(&days))
        && !task.is_completed()
}

/// Task count per lane, every lane included
pub fn status_breakdown<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Vec<(TaskStatus, usize)> {
    let mut counts = [0usize; 6];
    for task in tasks {
        counts[task.status.lane_index()] += 1;
    }
    TaskStatus::ALL.into_iter().zip(counts).collect()
}

/// Task count per priority from low to critical, every priority included
pub fn priority_breakdown<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Vec<(Priority, usize)> {
    let tasks: Vec<&Task> = tasks.into_iter().collect();
    Priority::ALL
        .into_iter()
        .map(|priority| {
            let count = tasks.iter().filter(|t| t.priority == priority).count();
            (priority, count)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectProgress {
    pub project_id: String,
    pub title: String,
    pub completed: usize,
    pub total: usize,
    pub percent: u32,
}

/// Completion of every project, in collection order
pub fn project_progress(snapshot: &AppSnapshot) -> Vec<ProjectProgress> {
    snapshot
        .projects
        .iter()
        .map(|project| progress_of(snapshot, &project.id, &project.title))
        .collect()
}

fn progress_of(snapshot: &AppSnapshot, project_id: &str, title: &str) -> ProjectProgress {
    let (completed, total) = snapshot
        .tasks_for_project(project_id)
        .fold((0, 0), |(done, all), t| {
            (done + usize::from(t.is_completed()), all + 1)
        });
    ProjectProgress {
        project_id: project_id.to_string(),
        title: title.to_string(),
        completed,
        total,
        percent: completion_rate(completed, total),
    }
}

/// Unread notifications visible to the user, broadcasts included
pub fn unread_count(notifications: &[Notification], user_id: &str) -> usize {
    notifications
        .iter()
        .filter(|n| !n.read && n.recipient.includes(user_id))
        .count()
}

/// Workspace-wide numbers for administrators
#[derive(Debug, Clone, Serialize)]
pub struct AdminOverview {
    pub total_projects: usize,
    pub active_projects: usize,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub in_progress_tasks: usize,
    pub overdue_tasks: usize,
    pub completion_rate: u32,
    /// Team members plus accounts known to the authenticator
    pub team_size: usize,
    pub projects_by_status: Vec<(ProjectStatus, usize)>,
}

impl AdminOverview {
    pub fn compute(snapshot: &AppSnapshot, account_count: usize, now: DateTime<Utc>) -> Self {
        let tasks = &snapshot.tasks;
        let completed_tasks = tasks.iter().filter(|t| t.is_completed()).count();

        Self {
            total_projects: snapshot.projects.len(),
            active_projects: snapshot
                .projects
                .iter()
                .filter(|p| p.status == ProjectStatus::Active)
                .count(),
            total_tasks: tasks.len(),
            completed_tasks,
            in_progress_tasks: tasks
                .iter()
                .filter(|t| t.status == TaskStatus::InProgress)
                .count(),
            overdue_tasks: tasks.iter().filter(|t| is_overdue(t, now)).count(),
            completion_rate: completion_rate(completed_tasks, tasks.len()),
            team_size: snapshot.team_members.len() + account_count,
            projects_by_status: ProjectStatus::ALL
                .into_iter()
                .map(|status| {
                    let count = snapshot
                        .projects
                        .iter()
                        .filter(|p| p.status == status)
                        .count();
                    (status, count)
                })
                .collect(),
        }
    }
}

/// Projects a manager created or belongs to, and their tasks
#[derive(Debug, Clone, Serialize)]
pub struct ManagerOverview {
    pub project_count: usize,
    pub active_projects: usize,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub overdue_tasks: usize,
    pub completion_rate: u32,
    pub active_progress: Vec<ProjectProgress>,
    /// Team members plus accounts known to the authenticator
    pub team_size: usize,
}

impl ManagerOverview {
    pub fn for_user(
        snapshot: &AppSnapshot,
        user_id: &str,
        account_count: usize,
        now: DateTime<Utc>,
    ) -> Self {
        let projects: Vec<_> = snapshot
            .projects
            .iter()
            .filter(|p| p.involves(user_id))
            .collect();
        let tasks: Vec<&Task> = snapshot
            .tasks
            .iter()
            .filter(|t| projects.iter().any(|p| p.id == t.project_id))
            .collect();
        let completed_tasks = tasks.iter().filter(|t| t.is_completed()).count();

        let active_progress = projects
            .iter()
            .filter(|p| p.status == ProjectStatus::Active)
            .map(|p| progress_of(snapshot, &p.id, &p.title))
            .collect::<Vec<_>>();

        Self {
            project_count: projects.len(),
            active_projects: active_progress.len(),
            total_tasks: tasks.len(),
            completed_tasks,
            overdue_tasks: tasks.iter().filter(|t| is_overdue(t, now)).count(),
            completion_rate: completion_rate(completed_tasks, tasks.len()),
            active_progress,
            team_size: snapshot.team_members.len() + account_count,
        }
    }
}

/// A member's own workload
#[derive(Debug, Clone, Serialize)]
pub struct MemberOverview {
    pub assigned_tasks: usize,
    pub completed_tasks: usize,
    pub in_progress_tasks: usize,
    pub todo_tasks: usize,
    /// Ids of open tasks due within a week, soonest first
    pub upcoming: Vec<String>,
    pub project_count: usize,
    pub completion_rate: u32,
}

impl MemberOverview {
    pub fn for_user(snapshot: &AppSnapshot, user_id: &str, now: DateTime<Utc>) -> Self {
        let tasks: Vec<&Task> = snapshot
            .tasks
            .iter()
            .filter(|t| t.is_assigned_to(user_id))
            .collect();
        let count = |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count();
        let completed_tasks = count(TaskStatus::Completed);

        let mut upcoming: Vec<&Task> = tasks
            .iter()
            .copied()
            .filter(|t| is_upcoming(t, now))
            .collect();
        upcoming.sort_by_key(|t| t.due_date);

        Self {
            assigned_tasks: tasks.len(),
            completed_tasks,
            in_progress_tasks: count(TaskStatus::InProgress),
            todo_tasks: count(TaskStatus::Todo),
            upcoming: upcoming.into_iter().map(|t| t.id.clone()).collect(),
            project_count: snapshot
                .projects
                .iter()
                .filter(|p| p.has_member(user_id))
                .count(),
            completion_rate: completion_rate(completed_tasks, tasks.len()),
        }
    }
}

/// Per-project charts and totals
#[derive(Debug, Clone, Serialize)]
pub struct ProjectAnalytics {
    pub progress: ProjectProgress,
    /// Lanes with at least one task
    pub by_status: Vec<(TaskStatus, usize)>,
    /// Priorities with at least one task, critical first
    pub by_priority: Vec<(Priority, usize)>,
    pub estimated_hours: f64,
    pub time_spent: f64,
    pub member_count: usize,
}

impl ProjectAnalytics {
    pub fn for_project(snapshot: &AppSnapshot, project_id: &str) -> Option<Self> {
        let project = snapshot.project(project_id)?;
        let tasks: Vec<&Task> = snapshot.tasks_for_project(project_id).collect();

        let by_status = status_breakdown(tasks.iter().copied())
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .collect();
        let by_priority = priority_breakdown(tasks.iter().copied())
            .into_iter()
            .rev()
            .filter(|(_, count)| *count > 0)
            .collect();

        Some(Self {
            progress: progress_of(snapshot, &project.id, &project.title),
            by_status,
            by_priority,
            estimated_hours: tasks.iter().filter_map(|t| t.estimated_hours).sum(),
            time_spent: tasks.iter().filter_map(|t| t.time_spent).sum(),
            member_count: project.members.len(),
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TeamRoleCounts {
    pub total: usize,
    pub admins: usize,
    pub managers: usize,
    pub members: usize,
}

impl TeamRoleCounts {
    pub fn for_team<'a>(team: impl IntoIterator<Item = &'a TeamMember>) -> Self {
        team.into_iter().fold(Self::default(), |mut counts, member| {
            counts.total += 1;
            match member.role {
                UserRole::Admin => counts.admins += 1,
                UserRole::Manager => counts.managers += 1,
                UserRole::Member => counts.members += 1,
            }
            counts
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemberStatus, NewNotification, NewProject, NewTask, NotificationType, Recipient};
    use crate::store::AppStore;
    use chrono::{Duration, NaiveDate, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 10, 9, 30, 0).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, day).unwrap()
    }

    fn project(title: &str, status: ProjectStatus, created_by: &str, members: &[&str]) -> NewProject {
        NewProject {
            title: title.to_string(),
            description: String::new(),
            client_name: None,
            budget: Some(500_000),
            start_date: date(1),
            deadline: date(30),
            priority: Priority::Medium,
            status,
            members: members.iter().map(|m| m.to_string()).collect(),
            created_by: created_by.to_string(),
        }
    }

    fn task(project_id: &str, status: TaskStatus, priority: Priority, due: Option<u32>) -> NewTask {
        let mut new = NewTask::new(project_id, "work", status, "2");
        new.priority = priority;
        new.due_date = due.map(date);
        new.assignees = vec!["3".to_string()];
        new.estimated_hours = Some(4.0);
        new.time_spent = Some(1.5);
        new
    }

    fn workspace() -> (AppStore, String, String) {
        let mut store = AppStore::in_memory();
        let alpha = store
            .add_project(project("Alpha", ProjectStatus::Active, "2", &["3"]))
            .unwrap();
        let beta = store
            .add_project(project("Beta", ProjectStatus::Planning, "1", &[]))
            .unwrap();

        store
            .add_task(task(&alpha.id, TaskStatus::Completed, Priority::High, Some(2)))
            .unwrap();
        store
            .add_task(task(&alpha.id, TaskStatus::InProgress, Priority::High, Some(9)))
            .unwrap();
        store
            .add_task(task(&alpha.id, TaskStatus::Todo, Priority::Critical, Some(12)))
            .unwrap();
        store
            .add_task(task(&beta.id, TaskStatus::Backlog, Priority::Low, Some(25)))
            .unwrap();

        (store, alpha.id, beta.id)
    }

    #[test]
    fn test_completion_rate_rounds() {
        assert_eq!(completion_rate(0, 0), 0);
        assert_eq!(completion_rate(1, 3), 33);
        assert_eq!(completion_rate(2, 3), 67);
        assert_eq!(completion_rate(4, 4), 100);
    }

    #[test]
    fn test_overdue_and_upcoming_windows() {
        let (store, _, _) = workspace();
        let tasks = &store.snapshot().tasks;

        // Completed tasks are never overdue
        assert!(!is_overdue(&tasks[0], now()));
        // Due at midnight of the 9th, which is before 09:30 on the 10th
        assert!(is_overdue(&tasks[1], now()));
        assert_eq!(days_until_due(&tasks[1], now()), Some(-1));
        assert!(!is_upcoming(&tasks[1], now()));

        assert_eq!(days_until_due(&tasks[2], now()), Some(2));
        assert!(is_upcoming(&tasks[2], now()));
        assert!(!is_upcoming(&tasks[3], now()));

        let week_out = now() + Duration::days(7);
        assert!(!is_overdue(&tasks[3], week_out));
    }

    #[test]
    fn test_admin_overview() {
        let (mut store, _, _) = workspace();
        store
            .add_team_member(crate::db::NewTeamMember {
                email: "x@taskflow.com".to_string(),
                name: "X".to_string(),
                avatar: None,
                role: UserRole::Member,
            })
            .unwrap();

        let overview = AdminOverview::compute(store.snapshot(), 3, now());
        assert_eq!(overview.total_projects, 2);
        assert_eq!(overview.active_projects, 1);
        assert_eq!(overview.total_tasks, 4);
        assert_eq!(overview.completed_tasks, 1);
        assert_eq!(overview.in_progress_tasks, 1);
        assert_eq!(overview.overdue_tasks, 1);
        assert_eq!(overview.completion_rate, 25);
        assert_eq!(overview.team_size, 4);
        assert!(overview
            .projects_by_status
            .contains(&(ProjectStatus::Planning, 1)));
    }

    #[test]
    fn test_manager_overview_scopes_to_user_projects() {
        let (store, alpha_id, _) = workspace();

        let overview = ManagerOverview::for_user(store.snapshot(), "2", 3, now());
        assert_eq!(overview.project_count, 1);
        assert_eq!(overview.total_tasks, 3);
        assert_eq!(overview.completed_tasks, 1);
        assert_eq!(overview.overdue_tasks, 1);
        assert_eq!(overview.completion_rate, 33);
        assert_eq!(overview.active_progress.len(), 1);
        assert_eq!(overview.active_progress[0].project_id, alpha_id);
        assert_eq!(overview.team_size, 3);

        let stranger = ManagerOverview::for_user(store.snapshot(), "99", 0, now());
        assert_eq!(stranger.total_tasks, 0);
        assert_eq!(stranger.completion_rate, 0);
    }

    #[test]
    fn test_member_overview() {
        let (store, _, _) = workspace();
        let overview = MemberOverview::for_user(store.snapshot(), "3", now());

        assert_eq!(overview.assigned_tasks, 4);
        assert_eq!(overview.completed_tasks, 1);
        assert_eq!(overview.in_progress_tasks, 1);
        assert_eq!(overview.todo_tasks, 1);
        assert_eq!(overview.upcoming.len(), 1);
        assert_eq!(overview.project_count, 1);
        assert_eq!(overview.completion_rate, 25);
    }

    #[test]
    fn test_breakdowns_keep_every_bucket() {
        let (store, _, _) = workspace();
        let statuses = status_breakdown(&store.snapshot().tasks);
        assert_eq!(statuses.len(), 6);
        assert_eq!(statuses[0], (TaskStatus::Backlog, 1));
        assert_eq!(statuses[3], (TaskStatus::Review, 0));

        let priorities = priority_breakdown(&store.snapshot().tasks);
        assert_eq!(
            priorities,
            vec![
                (Priority::Low, 1),
                (Priority::Medium, 0),
                (Priority::High, 2),
                (Priority::Critical, 1)
            ]
        );
    }

    #[test]
    fn test_project_analytics_drops_empty_buckets() {
        let (store, alpha_id, _) = workspace();
        let analytics = ProjectAnalytics::for_project(store.snapshot(), &alpha_id).unwrap();

        assert_eq!(analytics.progress.total, 3);
        assert_eq!(analytics.progress.percent, 33);
        assert_eq!(analytics.by_status.len(), 3);
        assert_eq!(
            analytics.by_priority,
            vec![(Priority::Critical, 1), (Priority::High, 2)]
        );
        assert_eq!(analytics.estimated_hours, 12.0);
        assert_eq!(analytics.time_spent, 4.5);
        assert_eq!(analytics.member_count, 1);

        assert!(ProjectAnalytics::for_project(store.snapshot(), "missing").is_none());
    }

    #[test]
    fn test_project_progress_lists_every_project() {
        let (store, _, beta_id) = workspace();
        let progress = project_progress(store.snapshot());
        assert_eq!(progress.len(), 2);
        assert_eq!(progress[1].project_id, beta_id);
        assert_eq!((progress[1].completed, progress[1].total), (0, 1));
    }

    #[test]
    fn test_team_role_counts_and_unread() {
        let mut store = AppStore::in_memory();
        for (name, role) in [("A", UserRole::Admin), ("B", UserRole::Member), ("C", UserRole::Member)] {
            store
                .add_team_member(crate::db::NewTeamMember {
                    email: format!("{}@taskflow.com", name),
                    name: name.to_string(),
                    avatar: None,
                    role,
                })
                .unwrap();
        }
        let counts = TeamRoleCounts::for_team(store.team_members());
        assert_eq!(
            counts,
            TeamRoleCounts {
                total: 3,
                admins: 1,
                managers: 0,
                members: 2
            }
        );
        assert!(store
            .team_members()
            .iter()
            .all(|m| m.status == MemberStatus::Pending));

        store
            .add_notification(NewNotification::new(
                Recipient::All,
                NotificationType::Announcement,
                "Holiday",
                "Office closed on Diwali",
            ))
            .unwrap();
        store
            .add_notification(NewNotification::new(
                Recipient::user("5"),
                NotificationType::Warning,
                "Timesheet",
                "Timesheet missing",
            ))
            .unwrap();
        assert_eq!(unread_count(store.notifications(), "5"), 2);
        assert_eq!(unread_count(store.notifications(), "6"), 1);
    }
}
