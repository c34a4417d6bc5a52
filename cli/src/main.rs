use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use jobboard::net::api::ApiClient;
use jobboard::net::types::{ApplicationStatus, JobDraft, JobStatus, JobUpdate, ProfileUpdate, Role, SignUpProfile};
use jobboard::state::applications::{ApplicationHook, ApplicationMutations, JobApplicationsHook, MyApplicationsHook};
use jobboard::state::job::JobHook;
use jobboard::state::jobs::{JobList, JobsHook, JobsParams, MyJobsHook};
use jobboard::state::resource::Resource;
use jobboard::state::session::{SessionState, SessionStore};
use jobboard::state::token::FileTokenStore;
use jobboard::util::guard::{GuardDecision, Route, RouteGuard, resolve};
use jobboard::util::toast::{ToastKind, ToastQueue};
use jobboard::{ClientConfig, ClientError};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("sign in first: run `jobboard login`")]
    SignInRequired,
    #[error("not available to your account role")]
    WrongRole,
    #[error("already signed in; run `jobboard logout` first")]
    AlreadySignedIn,
    #[error("{0}")]
    Fetch(String),
    #[error("not found")]
    NotFound,
    #[error("no config directory found; pass --token-dir or set JOBBOARD_TOKEN_DIR")]
    NoTokenDir,
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "jobboard", about = "Job board client")]
struct Cli {
    #[arg(long, env = "JOBBOARD_API_URL")]
    api_url: Option<String>,

    /// Directory holding the persisted auth token.
    #[arg(long, env = "JOBBOARD_TOKEN_DIR")]
    token_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        role: Role,
    },
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    Whoami,
    Profile(ProfileArgs),
    Jobs(JobsCommand),
    /// Apply to a job as a candidate.
    Apply {
        job_id: String,
        #[arg(long)]
        resume: String,
        #[arg(long)]
        cover_letter: Option<String>,
    },
    Applications(ApplicationsCommand),
}

#[derive(Args, Debug)]
struct ProfileArgs {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    bio: Option<String>,
    /// Comma-separated list.
    #[arg(long, value_delimiter = ',')]
    skills: Option<Vec<String>>,
    #[arg(long)]
    experience: Option<String>,
    #[arg(long)]
    education: Option<String>,
}

#[derive(Args, Debug)]
struct JobsCommand {
    #[command(subcommand)]
    command: JobsSubcommand,
}

#[derive(Subcommand, Debug)]
enum JobsSubcommand {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    Show {
        id: String,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        requirements: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        salary: Option<String>,
    },
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        requirements: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        salary: Option<String>,
        #[arg(long)]
        status: Option<JobStatus>,
    },
    Delete {
        id: String,
    },
    /// Jobs posted by the signed-in employer.
    Mine {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        limit: Option<u32>,
    },
}

#[derive(Args, Debug)]
struct ApplicationsCommand {
    #[command(subcommand)]
    command: ApplicationsSubcommand,
}

#[derive(Subcommand, Debug)]
enum ApplicationsSubcommand {
    Mine,
    ForJob {
        job_id: String,
    },
    Show {
        id: String,
    },
    SetStatus {
        id: String,
        status: ApplicationStatus,
    },
    /// Set the same status on several applications at once.
    Bulk {
        #[arg(long)]
        status: ApplicationStatus,
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

struct Context {
    api: Arc<ApiClient>,
    session: SessionStore,
    toasts: Arc<ToastQueue>,
    page_limit: u32,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = ClientConfig::from_env();
    if let Some(api_url) = &cli.api_url {
        config = config.with_api_url(api_url);
    }
    let token_dir = match cli.token_dir {
        Some(dir) => dir,
        None => default_token_dir()?,
    };
    tracing::debug!(api_url = %config.api_url, token_dir = %token_dir.display(), "starting");

    let api = Arc::new(ApiClient::from_config(&config)?);
    let toasts = Arc::new(ToastQueue::new());
    let session = SessionStore::new(api.clone(), Arc::new(FileTokenStore::in_dir(&token_dir)), toasts.clone());
    session.initialize().await;

    let ctx = Context { api, session, toasts, page_limit: config.page_limit };
    let result = dispatch(&ctx, cli.command).await;
    flush_toasts(&ctx.toasts);
    ctx.session.dispose();
    result
}

fn default_token_dir() -> Result<PathBuf, CliError> {
    directories::ProjectDirs::from("", "", "jobboard")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(CliError::NoTokenDir)
}

async fn dispatch(ctx: &Context, command: Command) -> Result<(), CliError> {
    match command {
        Command::Register { email, password, first_name, last_name, role } => {
            admit_form(&Route::Register, &ctx.session.snapshot())?;
            let profile = SignUpProfile { first_name, last_name, role };
            let user = ctx.session.sign_up(&email, &password, profile).await?;
            print_json(&serde_json::to_value(user)?)
        }
        Command::Login { email, password } => {
            admit_form(&Route::Login, &ctx.session.snapshot())?;
            let user = ctx.session.sign_in(&email, &password).await?;
            print_json(&serde_json::to_value(user)?)
        }
        Command::Logout => {
            admit(RouteGuard::authenticated().evaluate(&ctx.session.snapshot()))?;
            ctx.session.sign_out().await;
            Ok(())
        }
        Command::Whoami => {
            admit(RouteGuard::authenticated().evaluate(&ctx.session.snapshot()))?;
            print_json(&serde_json::to_value(ctx.session.current_user())?)
        }
        Command::Profile(args) => {
            admit(RouteGuard::authenticated().evaluate(&ctx.session.snapshot()))?;
            let update = ProfileUpdate {
                first_name: args.first_name,
                last_name: args.last_name,
                phone: args.phone,
                bio: args.bio,
                skills: args.skills,
                experience: args.experience,
                education: args.education,
            };
            let user = if update.is_empty() {
                ctx.session.current_user()
            } else {
                Some(ctx.session.update_profile(update).await?)
            };
            print_json(&serde_json::to_value(user)?)
        }
        Command::Jobs(jobs) => run_jobs(ctx, jobs.command).await,
        Command::Apply { job_id, resume, cover_letter } => {
            admit(RouteGuard::role(Role::Candidate).evaluate(&ctx.session.snapshot()))?;
            let hook = MyApplicationsHook::new(ctx.api.clone(), ctx.toasts.clone());
            let created = hook.create_application(&job_id, &resume, cover_letter.as_deref()).await?;
            print_json(&serde_json::to_value(created)?)
        }
        Command::Applications(applications) => run_applications(ctx, applications.command).await,
    }
}

async fn run_jobs(ctx: &Context, command: JobsSubcommand) -> Result<(), CliError> {
    let session = ctx.session.snapshot();
    match command {
        JobsSubcommand::List { page, limit, search, location } => {
            admit(resolve(&Route::Jobs, &session))?;
            let params = JobsParams { page: page.max(1), limit: limit.unwrap_or(ctx.page_limit), search, location };
            let hook = JobsHook::mount(ctx.api.clone(), ctx.toasts.clone(), params).await;
            print_job_list(hook.snapshot())
        }
        JobsSubcommand::Show { id } => {
            admit(resolve(&Route::JobDetails(id.clone()), &session))?;
            let hook = JobHook::mount(ctx.api.clone(), Some(id)).await;
            let snapshot = hook.snapshot();
            if let Some(error) = snapshot.error {
                return Err(CliError::Fetch(error));
            }
            let job = snapshot.data.ok_or(CliError::NotFound)?;
            let owned = session.user.as_ref().is_some_and(|user| hook.is_owned_by(user));
            let mut rendered = serde_json::to_value(&job)?;
            rendered["requirement_list"] = json!(job.requirement_list());
            rendered["owned"] = json!(owned);
            print_json(&rendered)
        }
        JobsSubcommand::Create { title, description, requirements, location, salary } => {
            admit(resolve(&Route::CreateJob, &session))?;
            let hook = MyJobsHook::new(ctx.api.clone(), ctx.toasts.clone(), 1, ctx.page_limit);
            let draft = JobDraft { title, description, requirements, location, salary };
            let created = hook.create_job(draft).await?;
            print_json(&serde_json::to_value(created)?)
        }
        JobsSubcommand::Update { id, title, description, requirements, location, salary, status } => {
            admit(resolve(&Route::MyJobs, &session))?;
            let hook = MyJobsHook::new(ctx.api.clone(), ctx.toasts.clone(), 1, ctx.page_limit);
            let update = JobUpdate { title, description, requirements, location, salary, status };
            let updated = hook.update_job(&id, update).await?;
            print_json(&serde_json::to_value(updated)?)
        }
        JobsSubcommand::Delete { id } => {
            admit(resolve(&Route::MyJobs, &session))?;
            let hook = MyJobsHook::new(ctx.api.clone(), ctx.toasts.clone(), 1, ctx.page_limit);
            hook.delete_job(&id).await?;
            Ok(())
        }
        JobsSubcommand::Mine { page, limit } => {
            admit(resolve(&Route::MyJobs, &session))?;
            let limit = limit.unwrap_or(ctx.page_limit);
            let hook = MyJobsHook::mount(ctx.api.clone(), ctx.toasts.clone(), page, limit).await;
            print_job_list(hook.snapshot())
        }
    }
}

async fn run_applications(ctx: &Context, command: ApplicationsSubcommand) -> Result<(), CliError> {
    let session = ctx.session.snapshot();
    match command {
        ApplicationsSubcommand::Mine => {
            admit(resolve(&Route::MyApplications, &session))?;
            let hook = MyApplicationsHook::mount(ctx.api.clone(), ctx.toasts.clone()).await;
            print_resource(hook.snapshot())
        }
        ApplicationsSubcommand::ForJob { job_id } => {
            admit(resolve(&Route::Applications(job_id.clone()), &session))?;
            let hook = JobApplicationsHook::mount(ctx.api.clone(), ctx.toasts.clone(), Some(job_id)).await;
            print_resource(hook.snapshot())
        }
        ApplicationsSubcommand::Show { id } => {
            admit(RouteGuard::authenticated().evaluate(&session))?;
            let hook = ApplicationHook::mount(ctx.api.clone(), ctx.toasts.clone(), Some(id)).await;
            let snapshot = hook.snapshot();
            if let Some(error) = snapshot.error {
                return Err(CliError::Fetch(error));
            }
            print_json(&serde_json::to_value(snapshot.data.ok_or(CliError::NotFound)?)?)
        }
        ApplicationsSubcommand::SetStatus { id, status } => {
            admit(RouteGuard::role(Role::Employer).evaluate(&session))?;
            let mutations = ApplicationMutations::new(ctx.api.clone(), ctx.toasts.clone());
            let updated = mutations.update_application_status(&id, status).await?;
            print_json(&serde_json::to_value(updated)?)
        }
        ApplicationsSubcommand::Bulk { status, ids } => {
            admit(RouteGuard::role(Role::Employer).evaluate(&session))?;
            let mutations = ApplicationMutations::new(ctx.api.clone(), ctx.toasts.clone());
            let updates: Vec<_> = ids.into_iter().map(|id| (id, status)).collect();
            let count = mutations.bulk_update_applications(&updates).await?;
            print_json(&json!({ "updated": count }))
        }
    }
}

/// Turn a guard decision into go / no-go for a command.
fn admit(decision: GuardDecision) -> Result<(), CliError> {
    match decision {
        GuardDecision::Render => Ok(()),
        GuardDecision::Redirect(Route::Login) => Err(CliError::SignInRequired),
        GuardDecision::Redirect(_) => Err(CliError::WrongRole),
        // Commands run after initialize, so the session is never loading here.
        GuardDecision::Loading => Err(CliError::SignInRequired),
    }
}

/// Gate for the login and register forms, which send signed-in users home.
fn admit_form(route: &Route, session: &SessionState) -> Result<(), CliError> {
    match resolve(route, session) {
        GuardDecision::Redirect(Route::Home) => Err(CliError::AlreadySignedIn),
        decision => admit(decision),
    }
}

fn print_job_list(snapshot: Resource<JobList>) -> Result<(), CliError> {
    if let Some(error) = snapshot.error {
        return Err(CliError::Fetch(error));
    }
    print_json(&json!({ "jobs": snapshot.data.jobs, "pagination": snapshot.data.pagination }))
}

fn print_resource<T: serde::Serialize>(snapshot: Resource<T>) -> Result<(), CliError> {
    if let Some(error) = snapshot.error {
        return Err(CliError::Fetch(error));
    }
    print_json(&serde_json::to_value(snapshot.data)?)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

fn flush_toasts(toasts: &ToastQueue) {
    for toast in toasts.drain() {
        let mark = match toast.kind {
            ToastKind::Success => "ok",
            ToastKind::Error => "error",
        };
        eprintln!("[{mark}] {}", toast.message);
    }
}
