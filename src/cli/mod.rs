//! CLI module for the TaskFlow command-line interface.
//!
//! Every command opens the state directory, does its work through
//! [`TaskFlow`] and exits; the signed-in session is kept on disk between
//! invocations:
//! - `login` / `signup` / `logout` / `whoami` - Session management
//! - `projects`, `tasks`, `board` - Project and kanban work
//! - `team`, `notify`, `notifications` - Collaboration
//! - `stats` - Role-specific overview
//! - `config check` - Validate configuration file

mod validation;

pub use validation::*;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::analytics::{project_progress, ProjectAnalytics, TeamRoleCounts};
use crate::config::Config;
use crate::db::{
    initialize_demo_data, NewComment, NewNotification, NewProject, NewTask, NewTeamMember,
    NotificationType, Priority, ProjectStatus, Recipient, TaskStatus, User, UserRole,
};
use crate::kanban::KanbanBoard;
use crate::utils::currency::format_indian_currency;
use crate::utils::extract_mentions;
use crate::TaskFlow;

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "taskflow")]
#[command(author, version, about = "Project and task management from the terminal", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "taskflow.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Override the state directory from the configuration file
    #[arg(long, env = "TASKFLOW_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in with email and password
    Login {
        email: String,
        #[arg(long, env = "TASKFLOW_PASSWORD")]
        password: String,
    },

    /// Create an account and sign in as it
    Signup {
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long, env = "TASKFLOW_PASSWORD")]
        password: String,
        #[arg(long, default_value = "member")]
        role: UserRole,
    },

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Install the demo workspace if there are no projects yet
    Seed,

    /// Project management commands
    #[command(subcommand)]
    Projects(ProjectsCommands),

    /// Task management commands
    #[command(subcommand)]
    Tasks(TasksCommands),

    /// Show a project's kanban board
    Board {
        /// Project ID
        project: String,
    },

    /// Team management commands
    #[command(subcommand)]
    Team(TeamCommands),

    /// Send a notification to one user or everyone
    Notify {
        #[arg(long)]
        title: String,
        #[arg(long)]
        message: String,
        #[arg(long = "type", default_value = "announcement")]
        kind: NotificationType,
        /// Recipient user ID
        #[arg(long, conflicts_with = "all")]
        to: Option<String>,
        /// Send to every user
        #[arg(long)]
        all: bool,
    },

    /// Notification inbox commands
    #[command(subcommand)]
    Notifications(NotificationsCommands),

    /// Overview for the signed-in user's role
    Stats {
        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Switch between light and dark theme
    Theme,

    /// Configuration management commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Projects subcommands
#[derive(Subcommand, Debug)]
pub enum ProjectsCommands {
    /// List all projects
    List,
    /// Show progress and breakdowns for a project
    Show {
        /// Project ID
        project: String,
    },
    /// Create a project
    Create {
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        client: String,
        /// Budget in rupees
        #[arg(long, allow_hyphen_values = true)]
        budget: Option<i64>,
        /// Start date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Deadline (YYYY-MM-DD)
        #[arg(long)]
        deadline: NaiveDate,
        #[arg(long, default_value = "medium")]
        priority: Priority,
    },
    /// Delete a project and all of its tasks
    Delete {
        /// Project ID
        project: String,
    },
}

/// Tasks subcommands
#[derive(Subcommand, Debug)]
pub enum TasksCommands {
    /// List tasks, optionally for one project
    List {
        #[arg(long)]
        project: Option<String>,
        /// Only tasks assigned to me
        #[arg(long)]
        mine: bool,
    },
    /// Create a task
    Create {
        /// Project ID
        project: String,
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "todo")]
        status: TaskStatus,
        #[arg(long, default_value = "medium")]
        priority: Priority,
        /// Assignee user ID (repeatable)
        #[arg(long = "assignee")]
        assignees: Vec<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<NaiveDate>,
        #[arg(long)]
        estimate: Option<f64>,
    },
    /// Move a task to another lane
    Move {
        /// Task ID
        task: String,
        /// Target lane
        status: TaskStatus,
    },
    /// Delete a task
    Delete {
        /// Task ID
        task: String,
    },
    /// Comment on a task; `@id` mentions notify those users
    Comment {
        /// Task ID
        task: String,
        text: String,
    },
    /// Toggle a subtask's completed flag
    Subtask {
        /// Task ID
        task: String,
        /// Subtask ID
        subtask: String,
    },
}

/// Team subcommands
#[derive(Subcommand, Debug)]
pub enum TeamCommands {
    /// List team members
    List,
    /// Invite a new member
    Invite {
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "member")]
        role: UserRole,
    },
    /// Remove a member
    Remove {
        /// Member ID
        member: String,
    },
}

/// Notifications subcommands
#[derive(Subcommand, Debug)]
pub enum NotificationsCommands {
    /// List my notifications, newest first
    List,
    /// Mark one notification read
    Read {
        /// Notification ID
        id: String,
    },
    /// Mark every notification read
    ReadAll,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration file
    Check,
}

// ============================================================================
// CLI Command Handlers
// ============================================================================

/// Run a CLI command
pub async fn run_command(cli: &Cli, mut config: Config) -> Result<()> {
    if let Commands::Config(ConfigCommands::Check) = &cli.command {
        return cmd_config_check(cli);
    }

    if let Some(dir) = &cli.data_dir {
        config.storage.data_dir = dir.clone();
    }
    let mut flow = TaskFlow::open(config).context("Failed to open state directory")?;

    match &cli.command {
        Commands::Login { email, password } => cmd_login(&mut flow, email, password).await,
        Commands::Signup {
            email,
            name,
            password,
            role,
        } => cmd_signup(&mut flow, email, password, name, *role).await,
        Commands::Logout => {
            flow.logout();
            println!("Signed out.");
            Ok(())
        }
        Commands::Whoami => cmd_whoami(&flow),
        Commands::Seed => cmd_seed(&mut flow),
        Commands::Projects(command) => cmd_projects(&mut flow, command),
        Commands::Tasks(command) => cmd_tasks(&mut flow, command),
        Commands::Board { project } => cmd_board(&flow, project),
        Commands::Team(command) => cmd_team(&mut flow, command).await,
        Commands::Notify {
            title,
            message,
            kind,
            to,
            all,
        } => cmd_notify(&mut flow, title, message, *kind, to.as_deref(), *all).await,
        Commands::Notifications(command) => cmd_notifications(&mut flow, command),
        Commands::Stats { json } => cmd_stats(&flow, *json),
        Commands::Theme => {
            let theme = flow.app_mut().toggle_theme()?;
            println!("Theme: {}", theme);
            Ok(())
        }
        Commands::Config(ConfigCommands::Check) => Ok(()),
    }
}

fn require_user(flow: &TaskFlow) -> Result<User> {
    flow.current_user()
        .cloned()
        .context("Not signed in. Run `taskflow login <email>` first.")
}

fn require_team_manager(flow: &TaskFlow) -> Result<User> {
    let user = require_user(flow)?;
    if !user.role.can_manage_team() {
        anyhow::bail!("Only admins and managers can manage the team");
    }
    Ok(user)
}

async fn cmd_login(flow: &mut TaskFlow, email: &str, password: &str) -> Result<()> {
    if !flow.login(email, password).await? {
        anyhow::bail!("Invalid credentials. Try: admin@taskflow.com / admin123");
    }
    if let Some(user) = flow.current_user() {
        println!("Welcome back, {} ({})", user.name, user.role);
    }
    Ok(())
}

async fn cmd_signup(
    flow: &mut TaskFlow,
    email: &str,
    password: &str,
    name: &str,
    role: UserRole,
) -> Result<()> {
    validate_signup(email, password, name)?;
    if !flow.signup(email, password, name, role).await? {
        anyhow::bail!("Failed to create account");
    }
    if let Some(user) = flow.current_user() {
        println!("Account created. Signed in as {} ({})", user.name, user.id);
    }
    Ok(())
}

fn cmd_whoami(flow: &TaskFlow) -> Result<()> {
    match flow.current_user() {
        Some(user) => {
            println!("ID:      {}", user.id);
            println!("Name:    {}", user.name);
            println!("Email:   {}", user.email);
            println!("Role:    {}", user.role);
        }
        None => println!("Not signed in."),
    }
    Ok(())
}

fn cmd_seed(flow: &mut TaskFlow) -> Result<()> {
    let user = require_user(flow)?;
    if initialize_demo_data(flow.app_mut(), &user.id)? {
        println!("Demo workspace installed.");
    } else {
        println!("Projects already exist, nothing to do.");
    }
    Ok(())
}

fn cmd_projects(flow: &mut TaskFlow, command: &ProjectsCommands) -> Result<()> {
    match command {
        ProjectsCommands::List => {
            let progress = project_progress(flow.app().snapshot());
            let projects = flow.app().projects();
            if projects.is_empty() {
                println!("No projects found.");
                return Ok(());
            }

            println!();
            println!(
                "{:<28}  {:<30}  {:<10}  {:<9}  {:<14}  {:<8}",
                "ID", "TITLE", "STATUS", "PRIORITY", "BUDGET", "PROGRESS"
            );
            println!("{}", "-".repeat(110));
            for (project, progress) in projects.iter().zip(progress) {
                let budget = project
                    .budget
                    .map(format_indian_currency)
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<28}  {:<30}  {:<10}  {:<9}  {:<14}  {:>3}% ({}/{})",
                    project.id,
                    truncate(&project.title, 30),
                    project.status,
                    project.priority,
                    budget,
                    progress.percent,
                    progress.completed,
                    progress.total
                );
            }
            println!();
            Ok(())
        }
        ProjectsCommands::Show { project } => {
            let analytics = ProjectAnalytics::for_project(flow.app().snapshot(), project)
                .with_context(|| format!("Project not found: {}", project))?;

            println!();
            println!("=== Project: {} ===", analytics.progress.title);
            println!();
            println!(
                "Progress:   {}% ({}/{} tasks)",
                analytics.progress.percent, analytics.progress.completed, analytics.progress.total
            );
            println!(
                "Hours:      {:.1} spent / {:.1} estimated",
                analytics.time_spent, analytics.estimated_hours
            );
            println!("Members:    {}", analytics.member_count);
            println!();
            println!("By status:");
            for (status, count) in &analytics.by_status {
                println!("  {:<12} {}", status.title(), count);
            }
            println!("By priority:");
            for (priority, count) in &analytics.by_priority {
                println!("  {:<12} {}", priority, count);
            }
            println!();
            Ok(())
        }
        ProjectsCommands::Create {
            title,
            description,
            client,
            budget,
            start,
            deadline,
            priority,
        } => {
            let user = require_user(flow)?;
            let start_date = start.unwrap_or_else(|| Utc::now().date_naive());
            validate_project(&ProjectInput {
                title,
                description,
                client_name: client,
                budget: *budget,
                start_date,
                deadline: *deadline,
            })?;

            let project = flow.app_mut().add_project(NewProject {
                title: title.clone(),
                description: description.clone(),
                client_name: Some(client.clone()),
                budget: budget.and_then(|b| u64::try_from(b).ok()),
                start_date,
                deadline: *deadline,
                priority: *priority,
                status: ProjectStatus::Planning,
                members: vec![user.id.clone()],
                created_by: user.id,
            })?;
            println!("Project \"{}\" created successfully! ({})", project.title, project.id);
            Ok(())
        }
        ProjectsCommands::Delete { project } => {
            require_user(flow)?;
            let result = flow.app_mut().delete_project(project)?;
            println!(
                "Deleted project \"{}\" and {} task(s)",
                result.project.title,
                result.removed_tasks.len()
            );
            Ok(())
        }
    }
}

fn cmd_tasks(flow: &mut TaskFlow, command: &TasksCommands) -> Result<()> {
    match command {
        TasksCommands::List { project, mine } => {
            let me = if *mine {
                Some(require_user(flow)?.id)
            } else {
                None
            };
            let tasks: Vec<_> = flow
                .app()
                .tasks()
                .iter()
                .filter(|t| project.as_ref().map_or(true, |p| &t.project_id == p))
                .filter(|t| me.as_ref().map_or(true, |id| t.is_assigned_to(id)))
                .collect();

            if tasks.is_empty() {
                println!("No tasks found.");
                return Ok(());
            }

            println!();
            println!(
                "{:<28}  {:<32}  {:<12}  {:<9}  {:<10}",
                "ID", "TITLE", "STATUS", "PRIORITY", "DUE"
            );
            println!("{}", "-".repeat(100));
            for task in tasks {
                let due = task
                    .due_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<28}  {:<32}  {:<12}  {:<9}  {:<10}",
                    task.id,
                    truncate(&task.title, 32),
                    task.status,
                    task.priority,
                    due
                );
            }
            println!();
            Ok(())
        }
        TasksCommands::Create {
            project,
            title,
            description,
            status,
            priority,
            assignees,
            tags,
            due,
            estimate,
        } => {
            let user = require_user(flow)?;
            let mut errors = crate::error::ValidationErrorBuilder::new();
            errors.check("title", validate_required("Title", title));
            errors.finish()?;

            let mut new = NewTask::new(project.clone(), title.clone(), *status, user.id);
            new.description = description.clone();
            new.priority = *priority;
            new.assignees = assignees.clone();
            new.tags = tags.clone();
            new.due_date = *due;
            new.estimated_hours = *estimate;

            let task = flow.app_mut().add_task(new)?;
            println!("Task \"{}\" created ({})", task.title, task.id);
            Ok(())
        }
        TasksCommands::Move { task, status } => {
            require_user(flow)?;
            let task = flow.app_mut().move_task(task, *status)?;
            println!("Moved \"{}\" to {}", task.title, task.status.title());
            Ok(())
        }
        TasksCommands::Delete { task } => {
            require_user(flow)?;
            let task = flow.app_mut().delete_task(task)?;
            println!("Deleted task \"{}\"", task.title);
            Ok(())
        }
        TasksCommands::Comment { task, text } => {
            let user = require_user(flow)?;
            if text.trim().is_empty() {
                anyhow::bail!("Comment is empty");
            }
            let comment = flow.app_mut().add_comment(
                task,
                NewComment {
                    user_id: user.id,
                    content: text.clone(),
                    mentions: extract_mentions(text),
                },
            )?;
            println!("Comment added ({})", comment.id);
            Ok(())
        }
        TasksCommands::Subtask { task, subtask } => {
            require_user(flow)?;
            let task = flow.app_mut().toggle_subtask(task, subtask)?;
            let progress = task.subtask_progress();
            println!(
                "Subtasks of \"{}\": {}/{} done",
                task.title, progress.completed, progress.total
            );
            Ok(())
        }
    }
}

fn cmd_board(flow: &TaskFlow, project_id: &str) -> Result<()> {
    let project = flow
        .app()
        .project(project_id)
        .with_context(|| format!("Project not found: {}", project_id))?;
    let board = KanbanBoard::for_project(flow.app().snapshot(), project_id);

    println!();
    println!("=== {} ===", project.title);
    for lane in &board.lanes {
        println!();
        println!("{} ({})", lane.title(), lane.len());
        for task in &lane.tasks {
            let progress = task.subtask_progress();
            if progress.total > 0 {
                println!(
                    "  [{}] {} ({}/{})",
                    task.priority, task.title, progress.completed, progress.total
                );
            } else {
                println!("  [{}] {}", task.priority, task.title);
            }
        }
    }
    println!();
    Ok(())
}

async fn cmd_team(flow: &mut TaskFlow, command: &TeamCommands) -> Result<()> {
    match command {
        TeamCommands::List => {
            let members = flow.app().team_members();
            let counts = TeamRoleCounts::for_team(members);
            println!();
            println!(
                "{} members ({} admin, {} manager, {} member)",
                counts.total, counts.admins, counts.managers, counts.members
            );
            println!();
            println!(
                "{:<28}  {:<20}  {:<32}  {:<8}  {:<8}",
                "ID", "NAME", "EMAIL", "ROLE", "STATUS"
            );
            println!("{}", "-".repeat(104));
            for member in members {
                println!(
                    "{:<28}  {:<20}  {:<32}  {:<8}  {:<8}",
                    member.id,
                    truncate(&member.name, 20),
                    truncate(&member.email, 32),
                    member.role,
                    member.status
                );
            }
            println!();
            Ok(())
        }
        TeamCommands::Invite { email, name, role } => {
            require_team_manager(flow)?;
            validate_invite(email, name)?;
            println!("Sending invitation...");
            let member = flow
                .invite_member(NewTeamMember {
                    email: email.clone(),
                    name: name.clone(),
                    avatar: None,
                    role: *role,
                })
                .await?;
            println!("Invitation sent to {} ({})", member.email, member.id);
            Ok(())
        }
        TeamCommands::Remove { member } => {
            require_team_manager(flow)?;
            let removed = flow.app_mut().remove_team_member(member)?;
            println!("{} has been removed from the team", removed.name);
            Ok(())
        }
    }
}

async fn cmd_notify(
    flow: &mut TaskFlow,
    title: &str,
    message: &str,
    kind: NotificationType,
    to: Option<&str>,
    all: bool,
) -> Result<()> {
    require_user(flow)?;
    validate_notification(title, message, to, all)?;

    let recipient = match to {
        Some(id) if !all => Recipient::user(id),
        _ => Recipient::All,
    };
    let audience = match &recipient {
        Recipient::All => "all team members".to_string(),
        Recipient::User(id) => flow
            .app()
            .team_member(id)
            .map(|m| m.name.clone())
            .unwrap_or_else(|| id.clone()),
    };

    flow.send_notification(NewNotification::new(recipient, kind, title, message))
        .await?;
    println!("{} sent to {}", kind.label(), audience);
    Ok(())
}

fn cmd_notifications(flow: &mut TaskFlow, command: &NotificationsCommands) -> Result<()> {
    let user = require_user(flow)?;
    match command {
        NotificationsCommands::List => {
            let notifications = flow.app().notifications_for(&user.id);
            if notifications.is_empty() {
                println!("No notifications.");
                return Ok(());
            }
            println!();
            for n in notifications {
                let marker = if n.read { " " } else { "*" };
                println!("{} [{}] {}: {}", marker, n.kind, n.title, n.message);
                println!("    {}  {}", n.id, n.created_at.format("%Y-%m-%d %H:%M"));
            }
            println!();
            Ok(())
        }
        NotificationsCommands::Read { id } => {
            flow.app_mut().mark_notification_read(id)?;
            println!("Marked as read.");
            Ok(())
        }
        NotificationsCommands::ReadAll => {
            let changed = flow.app_mut().mark_all_notifications_read()?;
            println!("Marked {} notification(s) as read.", changed);
            Ok(())
        }
    }
}

fn cmd_stats(flow: &TaskFlow, json: bool) -> Result<()> {
    let user = require_user(flow)?;
    let now = Utc::now();
    let unread = flow.app().unread_count_for(&user.id);

    match user.role {
        UserRole::Admin => {
            let overview = flow.admin_overview(now);
            if json {
                println!("{}", serde_json::to_string_pretty(&overview)?);
                return Ok(());
            }
            println!();
            println!("=== Admin Overview ===");
            println!();
            println!(
                "Projects:     {} ({} active)",
                overview.total_projects, overview.active_projects
            );
            println!(
                "Tasks:        {} ({} completed, {} in progress, {} overdue)",
                overview.total_tasks,
                overview.completed_tasks,
                overview.in_progress_tasks,
                overview.overdue_tasks
            );
            println!("Completion:   {}%", overview.completion_rate);
            println!("Team size:    {}", overview.team_size);
            println!();
            println!("Projects by status:");
            for (status, count) in &overview.projects_by_status {
                println!("  {:<10} {}", status, count);
            }
        }
        UserRole::Manager => {
            let overview = flow
                .manager_overview(now)
                .context("Not signed in")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&overview)?);
                return Ok(());
            }
            println!();
            println!("=== Manager Overview ===");
            println!();
            println!(
                "Projects:     {} ({} active)",
                overview.project_count, overview.active_projects
            );
            println!(
                "Tasks:        {} ({} completed, {} overdue)",
                overview.total_tasks, overview.completed_tasks, overview.overdue_tasks
            );
            println!("Completion:   {}%", overview.completion_rate);
            println!("Team size:    {}", overview.team_size);
            println!();
            for progress in &overview.active_progress {
                println!("  {:<30} {:>3}%", truncate(&progress.title, 30), progress.percent);
            }
        }
        UserRole::Member => {
            let overview = flow.member_overview(now).context("Not signed in")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&overview)?);
                return Ok(());
            }
            println!();
            println!("=== My Work ===");
            println!();
            println!(
                "Tasks:        {} ({} completed, {} in progress, {} to do)",
                overview.assigned_tasks,
                overview.completed_tasks,
                overview.in_progress_tasks,
                overview.todo_tasks
            );
            println!("Due soon:     {}", overview.upcoming.len());
            println!("Projects:     {}", overview.project_count);
            println!("Completion:   {}%", overview.completion_rate);
        }
    }

    println!();
    println!("Unread notifications: {}", unread);
    println!();
    Ok(())
}

fn cmd_config_check(cli: &Cli) -> Result<()> {
    let config_path = &cli.config;

    println!("Checking configuration file: {}", config_path.display());
    println!();

    if !config_path.exists() {
        println!(
            "[!!] Configuration file not found: {}",
            config_path.display()
        );
        println!();
        println!("Defaults will be used.");
        return Ok(());
    }

    match Config::load(config_path) {
        Ok(config) => {
            println!("[OK] Configuration file is valid!");
            println!();
            println!("=== Configuration Summary ===");
            println!();
            println!("Storage:");
            println!("  Data Dir:        {}", config.storage.data_dir.display());
            println!();
            println!("Latency:");
            println!("  Auth:            {} ms", config.auth.latency_ms);
            println!("  Invite:          {} ms", config.team.invite_latency_ms);
            println!("  Notify:          {} ms", config.team.notify_latency_ms);
            println!();
            println!("Kanban:");
            println!("  Policy:          {:?}", config.kanban.transition_policy);
            println!();
            println!(
                "Demo data:         {}",
                if config.seed.demo_data {
                    "Enabled"
                } else {
                    "Disabled"
                }
            );
            println!("Log level:         {}", config.logging.level);
            println!();
            Ok(())
        }
        Err(e) => {
            println!("[!!] Configuration file is invalid!");
            println!();
            println!("Error: {:#}", e);
            println!();
            println!("Please check the configuration file syntax and try again.");
            anyhow::bail!("Invalid configuration file");
        }
    }
}

/// Truncate a string to max length with ellipsis
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
