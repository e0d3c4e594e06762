//! Demo workspace seeding
//!
//! Installs a fixed set of projects, tasks, team members and notifications
//! so a fresh login has something to look at. Records keep their fixed ids
//! (`1`..`4` for projects, `{project}-{n}` for tasks) and are written in one
//! bulk update instead of going through the id-generating store operations.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::info;

use super::{
    start_of_day, MemberStatus, NewNotification, NotificationType, Priority, Project,
    ProjectStatus, Recipient, Subtask, Task, TaskStatus, TeamMember, UserRole,
};
use crate::error::StoreResult;
use crate::store::AppStore;
use crate::utils::avatar_url;

/// Number of team members the demo workspace brings along
pub const DEMO_TEAM_SIZE: usize = 5;

fn day(year: i32, month: u32, date: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, date).unwrap_or_default()
}

fn at(year: i32, month: u32, date: u32) -> DateTime<Utc> {
    start_of_day(day(year, month, date))
}

/// Seed the demo workspace for `user_id` if the store has no projects yet.
///
/// Returns whether anything was installed.
pub fn initialize_demo_data(store: &mut AppStore, user_id: &str) -> StoreResult<bool> {
    if !store.projects().is_empty() {
        return Ok(false);
    }

    info!(user_id, "Seeding demo workspace...");

    let projects = demo_projects(user_id);
    let tasks: Vec<Task> = projects
        .iter()
        .flat_map(|p| demo_tasks(&p.id, user_id))
        .collect();
    let team = demo_team();

    let state = store.state_mut();
    state.projects = projects;
    state.tasks = tasks;
    state.team_members = team;

    store.push_notification(NewNotification::new(
        Recipient::user(user_id),
        NotificationType::Assignment,
        "New task assigned",
        "You have been assigned to \"Implement responsive navigation\"",
    ));
    store.push_notification(NewNotification::new(
        Recipient::user(user_id),
        NotificationType::Deadline,
        "Upcoming deadline",
        "Task \"Setup database schema\" is due in 3 days",
    ));
    store.persist()?;

    info!(
        projects = store.projects().len(),
        tasks = store.tasks().len(),
        team_members = store.team_members().len(),
        "Demo workspace ready"
    );
    Ok(true)
}

fn demo_projects(user_id: &str) -> Vec<Project> {
    // (id, title, description, client, budget, start, deadline, priority, status, other members, created)
    #[allow(clippy::type_complexity)]
    let rows: [(
        &str,
        &str,
        &str,
        &str,
        u64,
        NaiveDate,
        NaiveDate,
        Priority,
        ProjectStatus,
        &[&str],
        DateTime<Utc>,
    ); 4] = [
        (
            "1",
            "E-Commerce Platform Redesign",
            "Complete redesign of online shopping platform with modern UI/UX for Indian market",
            "Flipkart India",
            4_500_000,
            day(2026, 2, 1),
            day(2026, 4, 30),
            Priority::High,
            ProjectStatus::Active,
            &["2", "3", "4"],
            at(2026, 2, 1),
        ),
        (
            "2",
            "Banking Mobile App",
            "Secure mobile banking application with UPI integration",
            "HDFC Bank",
            12_000_000,
            day(2026, 1, 15),
            day(2026, 6, 30),
            Priority::Critical,
            ProjectStatus::Active,
            &["2", "3", "5", "6"],
            at(2026, 1, 15),
        ),
        (
            "3",
            "Digital Marketing Campaign",
            "Q2 social media and digital marketing campaign for Indian festivals",
            "Myntra Fashion",
            3_500_000,
            day(2026, 3, 1),
            day(2026, 5, 31),
            Priority::Medium,
            ProjectStatus::Planning,
            &["2", "7"],
            at(2026, 2, 10),
        ),
        (
            "4",
            "ERP System Implementation",
            "Enterprise resource planning system for manufacturing unit",
            "Tata Industries",
            8_500_000,
            day(2026, 2, 15),
            day(2026, 8, 30),
            Priority::High,
            ProjectStatus::Active,
            &["2", "4", "5"],
            at(2026, 2, 15),
        ),
    ];

    rows.into_iter()
        .map(
            |(id, title, description, client, budget, start, deadline, priority, status, others, created)| {
                let mut members = vec![user_id.to_string()];
                members.extend(
                    others
                        .iter()
                        .filter(|m| **m != user_id)
                        .map(|m| m.to_string()),
                );
                Project {
                    id: id.to_string(),
                    title: title.to_string(),
                    description: description.to_string(),
                    client_name: Some(client.to_string()),
                    budget: Some(budget),
                    start_date: start,
                    deadline,
                    priority,
                    status,
                    members,
                    created_by: user_id.to_string(),
                    created_at: created,
                    updated_at: at(2026, 2, 19),
                }
            },
        )
        .collect()
}

fn demo_tasks(project_id: &str, user_id: &str) -> Vec<Task> {
    struct Template {
        title: &'static str,
        description: &'static str,
        status: TaskStatus,
        priority: Priority,
        assigned: bool,
        tags: &'static [&'static str],
        subtasks: &'static [(&'static str, bool)],
        due: Option<NaiveDate>,
        estimated: f64,
        spent: f64,
        created: DateTime<Utc>,
        updated: DateTime<Utc>,
    }

    let templates = [
        Template {
            title: "Design homepage mockups",
            description: "Create high-fidelity mockups for the new homepage design",
            status: TaskStatus::Completed,
            priority: Priority::High,
            assigned: true,
            tags: &["design", "ui/ux"],
            subtasks: &[("Hero section", true), ("Feature cards", true), ("Footer", true)],
            due: Some(day(2026, 2, 25)),
            estimated: 16.0,
            spent: 14.0,
            created: at(2026, 2, 5),
            updated: at(2026, 2, 18),
        },
        Template {
            title: "Implement responsive navigation",
            description: "Build mobile-friendly navigation with hamburger menu",
            status: TaskStatus::InProgress,
            priority: Priority::High,
            assigned: true,
            tags: &["frontend", "react"],
            subtasks: &[("Desktop nav", true), ("Mobile menu", false), ("Animations", false)],
            due: Some(day(2026, 2, 28)),
            estimated: 12.0,
            spent: 8.0,
            created: at(2026, 2, 10),
            updated: at(2026, 2, 19),
        },
        Template {
            title: "Setup database schema",
            description: "Design and implement database structure for user management",
            status: TaskStatus::Review,
            priority: Priority::Critical,
            assigned: true,
            tags: &["backend", "database"],
            subtasks: &[],
            due: Some(day(2026, 2, 22)),
            estimated: 8.0,
            spent: 9.0,
            created: at(2026, 2, 8),
            updated: at(2026, 2, 19),
        },
        Template {
            title: "Write API documentation",
            description: "Document all API endpoints with examples",
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            assigned: true,
            tags: &["documentation"],
            subtasks: &[],
            due: Some(day(2026, 3, 5)),
            estimated: 6.0,
            spent: 0.0,
            created: at(2026, 2, 12),
            updated: at(2026, 2, 19),
        },
        Template {
            title: "Performance optimization",
            description: "Optimize bundle size and lazy loading",
            status: TaskStatus::Backlog,
            priority: Priority::Low,
            assigned: false,
            tags: &["performance"],
            subtasks: &[],
            due: None,
            estimated: 10.0,
            spent: 0.0,
            created: at(2026, 2, 15),
            updated: at(2026, 2, 19),
        },
    ];

    templates
        .into_iter()
        .enumerate()
        .map(|(index, t)| Task {
            id: format!("{}-{}", project_id, index + 1),
            project_id: project_id.to_string(),
            title: t.title.to_string(),
            description: t.description.to_string(),
            status: t.status,
            priority: t.priority,
            assignees: if t.assigned {
                vec![user_id.to_string()]
            } else {
                Vec::new()
            },
            tags: t.tags.iter().map(|s| s.to_string()).collect(),
            subtasks: t
                .subtasks
                .iter()
                .enumerate()
                .map(|(i, (title, completed))| Subtask {
                    id: (i + 1).to_string(),
                    title: title.to_string(),
                    completed: *completed,
                })
                .collect(),
            due_date: t.due,
            estimated_hours: Some(t.estimated),
            time_spent: Some(t.spent),
            comments: Vec::new(),
            attachments: Vec::new(),
            created_by: user_id.to_string(),
            created_at: t.created,
            updated_at: t.updated,
        })
        .collect()
}

fn demo_team() -> Vec<TeamMember> {
    // (id, first name, last name, role, joined)
    let rows = [
        ("4", "Vikram", "Singh", UserRole::Manager, at(2025, 12, 1)),
        ("5", "Sneha", "Reddy", UserRole::Member, at(2025, 12, 15)),
        ("6", "Arjun", "Mehta", UserRole::Member, at(2026, 1, 5)),
        ("7", "Pooja", "Gupta", UserRole::Member, at(2026, 1, 20)),
        ("8", "Rohit", "Verma", UserRole::Manager, at(2025, 11, 10)),
    ];

    rows.into_iter()
        .map(|(id, first, last, role, joined)| TeamMember {
            id: id.to_string(),
            email: format!("{}.{}@taskflow.com", first.to_lowercase(), last.to_lowercase()),
            name: format!("{} {}", first, last),
            avatar: Some(avatar_url(first)),
            role,
            status: MemberStatus::Active,
            joined_at: joined,
        })
        .collect()
}
