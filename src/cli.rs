use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, BufReader};

use smart_scheduler::SchedulerApi;
use smart_scheduler::models::{ConstraintToggles, CourseFile, Role, SelectedSubject};
use smart_scheduler::schedule::{FreeTimeGrid, SelectionList, TimetableGrid};
use smart_scheduler::services::{
    AdminConsole, ChatAssistant, CourseCatalog, LoginForm, ManualCourseInput, RegisterForm,
    SchedulePlanner,
};
use smart_scheduler::session::{LogoutOptions, Route, SessionStore};

type CliResult = Result<(), Box<dyn Error>>;

#[derive(Debug, Parser)]
#[command(name = "smart-scheduler", about = "Smart Scheduler client")]
pub struct Cli {
    /// Overrides SCHEDULER_API_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    Logout,
    /// Shows the profile of the stored session.
    Whoami,
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
        #[arg(long)]
        confirm: String,
        #[arg(long)]
        email: Option<String>,
    },
    Courses {
        #[arg(long)]
        semester: String,
        #[arg(long)]
        major: Option<String>,
    },
    /// Uploads a PDF/Excel/CSV course list (admin only).
    Upload {
        #[arg(long)]
        semester: String,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        major: Option<String>,
        #[arg(long)]
        file: PathBuf,
    },
    /// Adds or updates a single course (admin only).
    AddCourse {
        #[arg(long)]
        semester: String,
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        credits: String,
        #[arg(long, default_value = "")]
        department: String,
        #[arg(long, default_value = "")]
        major: String,
    },
    /// Generates a timetable from a plan file.
    Schedule {
        #[arg(long)]
        plan: PathBuf,
        /// Print the request instead of sending it.
        #[arg(long)]
        dry_run: bool,
    },
    Chat {
        message: Option<String>,
    },
}

/// Plan file consumed by `schedule`: subjects in priority order plus
/// availability and preferences.
#[derive(Debug, Deserialize)]
struct PlanFile {
    subjects: Vec<SelectedSubject>,
    #[serde(default)]
    free_slots: Vec<String>,
    #[serde(default)]
    constraints: ConstraintToggles,
    #[serde(default)]
    max_credits: Option<String>,
}

pub async fn run(
    command: Command,
    api: Arc<dyn SchedulerApi>,
    session: &SessionStore,
) -> CliResult {
    match command {
        Command::Login { username, password } => login(session, username, password).await,
        Command::Logout => {
            session.logout(LogoutOptions::silent()).await;
            println!("Logged out.");
            Ok(())
        }
        Command::Whoami => whoami(session).await,
        Command::Register {
            username,
            password,
            confirm,
            email,
        } => {
            let mut form = RegisterForm {
                username,
                email: email.unwrap_or_default(),
                password,
                confirm_password: confirm,
                message: None,
            };
            let outcome = form.submit(api.as_ref()).await;
            println!("{}", form.message.as_deref().unwrap_or_default());
            outcome.map_err(Into::into)
        }
        Command::Courses { semester, major } => {
            require_login(session).await?;
            courses(api, &semester, major.as_deref()).await
        }
        Command::Upload {
            semester,
            department,
            major,
            file,
        } => {
            require_admin(session).await?;
            upload(api, &semester, department.as_deref(), major.as_deref(), &file).await
        }
        Command::AddCourse {
            semester,
            code,
            name,
            credits,
            department,
            major,
        } => {
            require_admin(session).await?;
            let mut console = AdminConsole::new(api, semester);
            let input = ManualCourseInput {
                code,
                name,
                credits,
                department,
                major,
            };
            let outcome = console.add_course(&input).await;
            if let Some(notice) = console.notice() {
                println!("{}", notice.text);
            }
            outcome.map(|_| ()).map_err(Into::into)
        }
        Command::Schedule { plan, dry_run } => {
            require_login(session).await?;
            schedule(api, &plan, dry_run).await
        }
        Command::Chat { message } => {
            require_login(session).await?;
            chat(api, message).await
        }
    }
}

async fn login(session: &SessionStore, username: String, password: String) -> CliResult {
    let mut form = LoginForm::new(username, password);
    match form.submit(session).await {
        Ok(route) => {
            let name = session.profile().map(|p| p.username).unwrap_or_default();
            println!("Logged in as {} -> {}", name, route.path());
            Ok(())
        }
        Err(e) => {
            println!("{}", form.message.as_deref().unwrap_or_default());
            Err(e.into())
        }
    }
}

async fn whoami(session: &SessionStore) -> CliResult {
    let restored = session.restore().await;
    match restored.profile {
        Some(profile) => {
            let role = if profile.is_admin { "admin" } else { "student" };
            println!("{} ({})", profile.username, role);
        }
        None => println!("Not logged in."),
    }
    Ok(())
}

async fn require_login(session: &SessionStore) -> CliResult {
    session.restore().await;
    if session.authorize(Route::Scheduler) != Route::Scheduler {
        return Err("Not logged in. Run `smart-scheduler login` first.".into());
    }
    Ok(())
}

async fn require_admin(session: &SessionStore) -> CliResult {
    require_login(session).await?;
    session.require_admin()?;
    Ok(())
}

async fn courses(api: Arc<dyn SchedulerApi>, semester: &str, major: Option<&str>) -> CliResult {
    let mut catalog = CourseCatalog::new(api);
    catalog.list_courses(semester, major).await;
    if let Some(error) = catalog.error() {
        return Err(error.to_string().into());
    }

    println!("{:<12} {:<40} {:>7}  {}", "CODE", "NAME", "CREDITS", "MAJOR");
    for course in catalog.courses() {
        println!(
            "{:<12} {:<40} {:>7}  {}",
            course.code,
            course.name,
            course.credits,
            course.major.as_deref().unwrap_or("-")
        );
    }
    println!("{} courses", catalog.courses().len());
    Ok(())
}

async fn upload(
    api: Arc<dyn SchedulerApi>,
    semester: &str,
    department: Option<&str>,
    major: Option<&str>,
    path: &Path,
) -> CliResult {
    let bytes = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "courses".to_string());

    let mut console = AdminConsole::new(api, semester);
    console.set_department(department);
    console.set_major(major).await;

    let outcome = console.upload_courses(Some(CourseFile { file_name, bytes })).await;
    if let Some(notice) = console.notice() {
        println!("{}", notice.text);
    }
    let summary = outcome?;
    for course in &summary.sample {
        println!("  {} {} ({} credits)", course.code, course.name, course.credits);
    }
    Ok(())
}

async fn schedule(api: Arc<dyn SchedulerApi>, plan_path: &Path, dry_run: bool) -> CliResult {
    let raw = tokio::fs::read_to_string(plan_path).await?;
    let plan: PlanFile = serde_json::from_str(&raw)?;

    let mut planner = SchedulePlanner::new(api);
    planner.selection = SelectionList::from_subjects(plan.subjects);
    planner.free_time = FreeTimeGrid::from_tokens(&plan.free_slots)?;
    planner.toggles = plan.constraints;
    if let Some(max) = &plan.max_credits {
        planner.credits.set_max_input(max)?;
    }

    if let (Some(min), Some(max)) = (planner.credits.min(), planner.credits.max()) {
        let total = planner.selection.total_credits();
        println!("Selected {} credits (target {}-{})", total, min, max);
    }

    if dry_run {
        let request = planner.preview_request()?;
        println!("{}", serde_json::to_string_pretty(&request)?);
        return Ok(());
    }

    match planner.submit().await {
        Ok(grid) => {
            print_grid(&grid);
            Ok(())
        }
        Err(e) => {
            println!("{}", planner.notice().unwrap_or_default());
            Err(e.into())
        }
    }
}

fn print_grid(grid: &TimetableGrid) {
    println!("{}", grid);
    println!("Cost: {}", grid.cost());
    for entry in grid.unplaced() {
        println!("Unrecognised slot {} for {}", entry.time, entry.subject);
    }
    if !grid.removed().is_empty() {
        println!("Removed subjects:");
        for removed in grid.removed() {
            println!("  {}: {}", removed.subject, removed.reason);
        }
    }
}

async fn chat(api: Arc<dyn SchedulerApi>, message: Option<String>) -> CliResult {
    let mut assistant = ChatAssistant::new(api);

    if let Some(message) = message {
        if let Some(reply) = assistant.send_message(&message).await {
            println!("{}", reply.content);
        }
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if let Some(reply) = assistant.send_message(&line).await {
            let label = match reply.role {
                Role::User => "You",
                Role::Assistant => "Bot",
            };
            println!("{}: {}", label, reply.content);
        }
    }
    Ok(())
}
