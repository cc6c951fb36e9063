use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use authgate::util::auth::{Route, RouteDecision, guard};
use authgate::util::validation::{LoginForm, SignupForm};
use authgate::{ApiConfig, AuthError, AuthProvider, AuthState, FileStore, HttpAuthApi, StoreError, User};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[cfg(test)]
#[path = "main_test.rs"]
mod main_test;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("no config directory found; pass --session-file or set AUTHGATE_SESSION_FILE")]
    NoSessionPath,
    #[error("http client setup failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Auth(#[from] AuthError),
    #[error("failed to clear session: {0}")]
    Store(#[from] StoreError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "authgate", about = "Sign up, log in and inspect the current session")]
struct Cli {
    #[arg(long, env = "AUTHGATE_BASE_URL", default_value = "http://localhost:8080/api")]
    base_url: String,

    #[arg(long, env = "AUTHGATE_SESSION_FILE", help = "Token file; defaults to the user config directory")]
    session_file: Option<PathBuf>,

    #[arg(long, env = "AUTHGATE_TIMEOUT_SECS", default_value_t = 10)]
    timeout_secs: u64,

    #[arg(long, default_value_t = false, help = "Print the user as JSON")]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account and start a session.
    Signup(SignupArgs),
    /// Start a session with existing credentials.
    Login(LoginArgs),
    /// Resume the stored session and show who is signed in.
    Whoami,
    /// End the stored session.
    Logout,
    /// Show what the app does when navigating to PATH.
    Open { path: String },
}

#[derive(Args, Debug)]
struct SignupArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: String,
    #[arg(long, env = "AUTHGATE_PASSWORD")]
    password: String,
    #[arg(long, help = "Defaults to --password")]
    password_confirmation: Option<String>,
    #[arg(long, default_value_t = false, help = "Accept the terms of use")]
    accept_terms: bool,
}

#[derive(Args, Debug)]
struct LoginArgs {
    #[arg(long)]
    email: String,
    #[arg(long, env = "AUTHGATE_PASSWORD")]
    password: String,
}

impl From<SignupArgs> for SignupForm {
    fn from(args: SignupArgs) -> Self {
        let password_confirmation = args.password_confirmation.unwrap_or_else(|| args.password.clone());
        Self {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            password: args.password,
            password_confirmation,
            terms: args.accept_terms,
        }
    }
}

fn default_session_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("authgate").join("session.json"))
}

fn resolve_session_path(explicit: Option<PathBuf>) -> Result<PathBuf, CliError> {
    explicit.or_else(default_session_path).ok_or(CliError::NoSessionPath)
}

fn greeting(user: &User) -> String {
    format!("Hello, {}", user.first_name)
}

fn describe_decision(decision: RouteDecision, state: &AuthState) -> String {
    match decision {
        RouteDecision::Wait => "waiting for session".to_owned(),
        RouteDecision::Redirect(route) => format!("redirect {}", route.path()),
        RouteDecision::Render(Route::Home) => match &state.user {
            Some(user) => format!("render / ({})", greeting(user)),
            None => "render /".to_owned(),
        },
        RouteDecision::Render(Route::NotFound) => "render not found".to_owned(),
        RouteDecision::Render(route) => format!("render {}", route.path()),
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let session_path = resolve_session_path(cli.session_file)?;
    let client = reqwest::Client::builder().timeout(Duration::from_secs(cli.timeout_secs)).build()?;
    let api = HttpAuthApi::with_client(client, ApiConfig::with_base_url(cli.base_url));
    tracing::debug!(session = %session_path.display(), base_url = %api.config().base_url, "starting");

    let auth = AuthProvider::new(Arc::new(FileStore::new(session_path)), Arc::new(api));
    let state = auth.initialize().await;

    match cli.command {
        Command::Signup(args) => {
            let user = auth.sign_up(&args.into()).await?;
            print_user(&user, cli.json)?;
        }
        Command::Login(args) => {
            let form = LoginForm { email: args.email, password: args.password };
            let user = auth.log_in(&form).await?;
            print_user(&user, cli.json)?;
        }
        Command::Whoami => match state.user {
            Some(user) => print_user(&user, cli.json)?,
            None => println!("not signed in"),
        },
        Command::Logout => {
            auth.sign_out()?;
            println!("signed out");
        }
        Command::Open { path } => {
            let decision = guard(Route::from_path(&path), &state);
            println!("{}", describe_decision(decision, &state));
        }
    }
    Ok(())
}

fn print_user(user: &User, json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(user)?);
    } else {
        println!("{}", greeting(user));
    }
    Ok(())
}
