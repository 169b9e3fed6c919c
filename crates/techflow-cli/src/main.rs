//! TechFlow CLI - a command-line client for the TechFlow project and
//! task tracker.
//!
//! All data lives behind the TechFlow REST API; this binary wires the
//! core session store, route guard, and domain services to subcommands.
//! Protected commands consult the route guard before touching the API,
//! mirroring how a frontend gates protected views.

mod output;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use techflow_core::api::{ApiError, HttpClient};
use techflow_core::config::Config;
use techflow_core::models::{
    LoginRequest, NewProject, NewTask, ProjectStatus, ProjectUpdate, RegisterRequest,
    TaskPriority, TaskStatus, TaskUpdate,
};
use techflow_core::services::{AuthService, ProjectQuery, ProjectService, TaskQuery, TaskService, TeamService};
use techflow_core::session::{KeychainStorage, RouteDecision, RouteGuard, SessionStore};

#[derive(Parser)]
#[command(name = "techflow")]
#[command(about = "Command-line client for the TechFlow project and task tracker")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and persist the session
    Login {
        /// Email address (prompted for if omitted)
        email: Option<String>,
    },
    /// Create a new account (does not log in)
    Register,
    /// Clear the stored session
    Logout,
    /// Show the logged-in user's profile
    Whoami,
    /// Check that the API is reachable and the session is accepted
    Check,
    /// Project and task counts by status
    Dashboard,
    /// Manage projects
    #[command(subcommand)]
    Projects(ProjectCommands),
    /// Manage tasks
    #[command(subcommand)]
    Tasks(TaskCommands),
    /// View team members and their assigned work
    #[command(subcommand)]
    Team(TeamCommands),
}

#[derive(Subcommand)]
enum ProjectCommands {
    /// List projects
    List {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
        /// Filter by name or description substring
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one project, including its tasks when the server embeds them
    Show { id: String },
    /// Create a project
    Create {
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// active, completed, or on-hold
        #[arg(long, default_value = "active")]
        status: ProjectStatus,
    },
    /// Update a project's fields
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<ProjectStatus>,
    },
    /// Delete a project
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum TaskCommands {
    /// List tasks
    List {
        /// Only tasks in this project
        #[arg(long)]
        project: Option<String>,
        /// todo, in-progress, or completed
        #[arg(long)]
        status: Option<TaskStatus>,
        /// low, medium, high, or urgent
        #[arg(long)]
        priority: Option<TaskPriority>,
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        #[arg(short, long, default_value_t = 10)]
        limit: u32,
    },
    /// Show one task
    Show { id: String },
    /// Create a task
    Create {
        title: String,
        /// Project the task belongs to
        #[arg(long)]
        project: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(long, default_value = "medium")]
        priority: TaskPriority,
        /// Due date as YYYY-MM-DD
        #[arg(long)]
        due: String,
        /// Team member to assign the task to
        #[arg(long)]
        assign: Option<String>,
    },
    /// Update a task's fields
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        priority: Option<TaskPriority>,
        /// Due date as YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        assign: Option<String>,
    },
    /// Move a task to a new status
    Status { id: String, status: TaskStatus },
    /// Delete a task
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum TeamCommands {
    /// List team members
    Members,
    /// Tasks assigned to one member
    Tasks { member_id: String },
}

/// Everything a command handler needs, assembled once per invocation.
struct AppContext {
    config: Config,
    session: Arc<SessionStore>,
    guard: RouteGuard,
    auth: AuthService,
    projects: ProjectService,
    tasks: TaskService,
    team: TeamService,
}

impl AppContext {
    fn build() -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        let storage = KeychainStorage::new(Config::data_dir()?);
        let session = Arc::new(SessionStore::new(Box::new(storage)));
        session.initialize();

        let http = HttpClient::new(&config.resolved_base_url(), session.clone())
            .context("Failed to build HTTP client")?;

        Ok(Self {
            guard: RouteGuard::new(session.clone()),
            auth: AuthService::new(http.clone()),
            projects: ProjectService::new(http.clone()),
            tasks: TaskService::new(http.clone()),
            team: TeamService::new(http),
            config,
            session,
        })
    }

    /// Gate for protected commands, re-evaluated on every invocation.
    fn require_session(&self) -> Result<()> {
        match self.guard.decide() {
            RouteDecision::Render => Ok(()),
            RouteDecision::RedirectToLogin => {
                bail!("Not logged in. Run `techflow login` first.")
            }
            RouteDecision::Wait => bail!("Session store is not initialized"),
        }
    }
}

/// Initialize the tracing subscriber for logging.
/// Use RUST_LOG env var to control the level (e.g. RUST_LOG=debug);
/// a copy of the log also goes to a file under the data directory.
fn init_tracing() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_writer = Config::data_dir().ok().and_then(|dir| {
        let log_dir = dir.join("logs");
        std::fs::create_dir_all(&log_dir).ok()?;
        Some(tracing_appender::rolling::never(log_dir, "techflow.log"))
    });

    match file_writer {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing();
    info!("TechFlow CLI starting");

    let mut ctx = AppContext::build()?;

    match cli.command {
        Commands::Login { email } => cmd_login(&mut ctx, email).await,
        Commands::Register => cmd_register(&ctx).await,
        Commands::Logout => {
            ctx.session.logout();
            println!("Logged out.");
            Ok(())
        }
        Commands::Whoami => cmd_whoami(&ctx).await,
        Commands::Check => cmd_check(&ctx).await,
        Commands::Dashboard => cmd_dashboard(&ctx).await,
        Commands::Projects(command) => cmd_projects(&ctx, command).await,
        Commands::Tasks(command) => cmd_tasks(&ctx, command).await,
        Commands::Team(command) => cmd_team(&ctx, command).await,
    }
}

// ============================================================================
// Auth commands
// ============================================================================

async fn cmd_login(ctx: &mut AppContext, email: Option<String>) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => prompt_with_default("Email", ctx.config.last_email.as_deref())?,
    };
    if email.is_empty() || !email.contains('@') {
        bail!("A valid email address is required");
    }

    let password = rpassword::prompt_password("Password: ")?;
    if password.is_empty() {
        bail!("Password must not be empty");
    }

    let request = LoginRequest {
        email: email.clone(),
        password,
    };
    let user = ctx.session.login(&ctx.auth, &request).await?;

    ctx.config.last_email = Some(email);
    if let Err(e) = ctx.config.save() {
        warn!(error = %e, "Failed to save configuration");
    }

    println!("Logged in as {} <{}>.", user.name, user.email);
    Ok(())
}

async fn cmd_register(ctx: &AppContext) -> Result<()> {
    let name = prompt_line("Name: ")?;
    let email = prompt_line("Email: ")?;
    if name.is_empty() {
        bail!("Name must not be empty");
    }
    if email.is_empty() || !email.contains('@') {
        bail!("A valid email address is required");
    }

    let password = rpassword::prompt_password("Password: ")?;
    let confirmed = rpassword::prompt_password("Confirm password: ")?;
    if password.is_empty() {
        bail!("Password must not be empty");
    }
    if password != confirmed {
        bail!("Passwords do not match");
    }

    let request = RegisterRequest {
        email,
        password,
        name,
    };
    let response = ctx.session.register(&ctx.auth, &request).await?;

    if response.message.is_empty() {
        println!("Account created.");
    } else {
        println!("{}", response.message);
    }
    println!("You can now log in with `techflow login`.");
    Ok(())
}

async fn cmd_whoami(ctx: &AppContext) -> Result<()> {
    ctx.require_session()?;

    let user = ctx.auth.profile().await?;
    println!("{} <{}>", user.name, user.email);
    println!("  ID:     {}", user.id);
    if let Some(created) = user.created_at {
        println!("  Joined: {}", created.format("%b %d, %Y"));
    }
    Ok(())
}

/// Reachability probe: distinguishes "no response", "rejected
/// credential", and "working session" without changing any state.
async fn cmd_check(ctx: &AppContext) -> Result<()> {
    println!("API: {}", ctx.config.resolved_base_url());

    match ctx.auth.profile().await {
        Ok(user) => {
            println!("Reachable; session accepted ({}).", user.email);
        }
        Err(e) if e.is_unauthorized() => {
            println!("Reachable; session rejected (401). Run `techflow login`.");
        }
        Err(ApiError::Server { status, message }) => {
            println!("Reachable; server answered {}: {}", status, message);
        }
        Err(e) => {
            println!("Unreachable: {}", e);
        }
    }
    Ok(())
}

// ============================================================================
// Dashboard
// ============================================================================

/// Page size for the dashboard overview.
/// 100 covers typical workspaces in one request per resource.
const DASHBOARD_FETCH_LIMIT: u32 = 100;

async fn cmd_dashboard(ctx: &AppContext) -> Result<()> {
    ctx.require_session()?;

    let project_query = ProjectQuery {
        limit: DASHBOARD_FETCH_LIMIT,
        ..Default::default()
    };
    let task_query = TaskQuery {
        limit: DASHBOARD_FETCH_LIMIT,
        ..Default::default()
    };
    let (projects, tasks) = futures::future::try_join(
        ctx.projects.list(&project_query),
        ctx.tasks.list(&task_query),
    )
    .await?;

    let project_count = |status| {
        projects
            .projects
            .iter()
            .filter(|p| p.status == status)
            .count()
    };
    println!("Projects ({}):", projects.projects.len());
    println!("  Active:      {}", project_count(ProjectStatus::Active));
    println!("  On hold:     {}", project_count(ProjectStatus::OnHold));
    println!("  Completed:   {}", project_count(ProjectStatus::Completed));

    let task_count = |status| tasks.tasks.iter().filter(|t| t.status == status).count();
    println!("Tasks ({}):", tasks.tasks.len());
    println!("  To do:       {}", task_count(TaskStatus::Todo));
    println!("  In progress: {}", task_count(TaskStatus::InProgress));
    println!("  Completed:   {}", task_count(TaskStatus::Completed));

    let urgent = tasks
        .tasks
        .iter()
        .filter(|t| t.priority == TaskPriority::Urgent && t.status != TaskStatus::Completed)
        .count();
    if urgent > 0 {
        println!("  Urgent open: {}", urgent);
    }
    Ok(())
}

// ============================================================================
// Project commands
// ============================================================================

async fn cmd_projects(ctx: &AppContext, command: ProjectCommands) -> Result<()> {
    ctx.require_session()?;

    match command {
        ProjectCommands::List {
            page,
            limit,
            search,
        } => {
            let query = ProjectQuery {
                page,
                limit,
                search: search.unwrap_or_default(),
            };
            let result = ctx.projects.list(&query).await?;
            if result.projects.is_empty() {
                println!("No projects found.");
            } else {
                output::print_projects(&result.projects);
            }
            println!(
                "Page {} of {}.",
                result.current_page.unwrap_or(query.page),
                result.total_pages
            );
        }
        ProjectCommands::Show { id } => {
            let id = required_id(&id, "project id")?;
            let project = ctx.projects.get(id).await?;
            output::print_project_detail(&project);
        }
        ProjectCommands::Create {
            name,
            description,
            status,
        } => {
            if name.trim().is_empty() {
                bail!("Project name must not be empty");
            }
            let project = ctx
                .projects
                .create(&NewProject {
                    name,
                    description,
                    status,
                })
                .await?;
            println!("Created project {} ({}).", project.name, project.id);
        }
        ProjectCommands::Update {
            id,
            name,
            description,
            status,
        } => {
            let id = required_id(&id, "project id")?;
            let update = ProjectUpdate {
                name,
                description,
                status,
            };
            if update.is_empty() {
                bail!("Nothing to update; pass at least one of --name/--description/--status");
            }
            let project = ctx.projects.update(id, &update).await?;
            println!("Updated project {} ({}).", project.name, project.id);
        }
        ProjectCommands::Delete { id, yes } => {
            let id = required_id(&id, "project id")?;
            if !yes && !confirm(&format!("Delete project {}?", id))? {
                println!("Aborted.");
                return Ok(());
            }
            ctx.projects.delete(id).await?;
            println!("Deleted project {}.", id);
        }
    }
    Ok(())
}

// ============================================================================
// Task commands
// ============================================================================

async fn cmd_tasks(ctx: &AppContext, command: TaskCommands) -> Result<()> {
    ctx.require_session()?;

    match command {
        TaskCommands::List {
            project,
            status,
            priority,
            page,
            limit,
        } => {
            let query = TaskQuery {
                project_id: project,
                status,
                priority,
                page,
                limit,
            };
            let result = ctx.tasks.list(&query).await?;
            if result.tasks.is_empty() {
                println!("No tasks found.");
            } else {
                output::print_tasks(&result.tasks);
            }
            println!(
                "Page {} of {}.",
                result.current_page.unwrap_or(query.page),
                result.total_pages
            );
        }
        TaskCommands::Show { id } => {
            let id = required_id(&id, "task id")?;
            let task = ctx.tasks.get(id).await?;
            output::print_task_detail(&task);
        }
        TaskCommands::Create {
            title,
            project,
            description,
            priority,
            due,
            assign,
        } => {
            if title.trim().is_empty() {
                bail!("Task title must not be empty");
            }
            let project = required_id(&project, "project id")?;
            validate_due_date(&due)?;
            let task = ctx
                .tasks
                .create(&NewTask {
                    title,
                    description,
                    project_id: project.to_string(),
                    priority,
                    due_date: due,
                    assigned_to: assign,
                })
                .await?;
            println!("Created task {} ({}).", task.title, task.id);
        }
        TaskCommands::Update {
            id,
            title,
            description,
            status,
            priority,
            due,
            assign,
        } => {
            let id = required_id(&id, "task id")?;
            if let Some(ref due) = due {
                validate_due_date(due)?;
            }
            let update = TaskUpdate {
                title,
                description,
                status,
                priority,
                due_date: due,
                assigned_to: assign,
            };
            if update.is_empty() {
                bail!("Nothing to update; pass at least one field flag");
            }
            let task = ctx.tasks.update(id, &update).await?;
            println!("Updated task {} ({}).", task.title, task.id);
        }
        TaskCommands::Status { id, status } => {
            let id = required_id(&id, "task id")?;
            let task = ctx.tasks.set_status(id, status).await?;
            println!("Task {} is now {}.", task.id, task.status);
        }
        TaskCommands::Delete { id, yes } => {
            let id = required_id(&id, "task id")?;
            if !yes && !confirm(&format!("Delete task {}?", id))? {
                println!("Aborted.");
                return Ok(());
            }
            ctx.tasks.delete(id).await?;
            println!("Deleted task {}.", id);
        }
    }
    Ok(())
}

// ============================================================================
// Team commands
// ============================================================================

async fn cmd_team(ctx: &AppContext, command: TeamCommands) -> Result<()> {
    ctx.require_session()?;

    match command {
        TeamCommands::Members => {
            let members = ctx.team.members().await?;
            if members.is_empty() {
                println!("No team members found.");
            } else {
                output::print_members(&members);
            }
        }
        TeamCommands::Tasks { member_id } => {
            let member_id = required_id(&member_id, "member id")?;
            let result = ctx.team.member_tasks(member_id).await?;
            if result.tasks.is_empty() {
                println!("No tasks assigned.");
            } else {
                output::print_tasks(&result.tasks);
            }
        }
    }
    Ok(())
}

// ============================================================================
// Input helpers
// ============================================================================

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Prompt showing a default value; an empty answer takes the default.
fn prompt_with_default(prompt: &str, default: Option<&str>) -> Result<String> {
    let answer = match default {
        Some(default) => prompt_line(&format!("{} [{}]: ", prompt, default))?,
        None => prompt_line(&format!("{}: ", prompt))?,
    };
    if answer.is_empty() {
        Ok(default.unwrap_or_default().to_string())
    } else {
        Ok(answer)
    }
}

fn confirm(question: &str) -> Result<bool> {
    let answer = prompt_line(&format!("{} [y/N] ", question))?;
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}

fn required_id<'a>(id: &'a str, what: &str) -> Result<&'a str> {
    let id = id.trim();
    if id.is_empty() {
        bail!("A {} is required", what);
    }
    Ok(id)
}

fn validate_due_date(due: &str) -> Result<()> {
    chrono::NaiveDate::parse_from_str(due, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| anyhow::anyhow!("Due date must be YYYY-MM-DD, got {:?}", due))
}
