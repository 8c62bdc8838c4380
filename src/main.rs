use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use sd_browser_session::{
    AuthError, ConfigError, FileStorage, HttpAuthService, Session, SessionConfig, SessionStore, route,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("http client build failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Auth(#[from] AuthError),
    #[error("not signed in")]
    NotSignedIn,
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "sd-session", about = "Sign in to SD Browser and inspect the persisted session")]
struct Cli {
    #[arg(long, env = "SD_API_BASE_URL")]
    api_base_url: Option<String>,

    #[arg(long, env = "SD_SESSION_DIR")]
    session_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and persist the session.
    Login(CredentialArgs),
    /// Create an account and sign in.
    Register(CredentialArgs),
    /// Sign out and remove the persisted session.
    Logout,
    /// Print whether a session is active.
    Status,
    /// Print the signed-in user as JSON.
    Whoami,
    /// Show what the route gate does with a path.
    Route { path: String },
}

#[derive(Args, Debug)]
struct CredentialArgs {
    #[arg(long)]
    email: String,

    #[arg(long, env = "SD_PASSWORD", hide_env_values = true)]
    password: String,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = SessionConfig::from_env()?;
    if let Some(url) = cli.api_base_url.as_deref() {
        config = config.with_api_base_url(url)?;
    }
    if let Some(dir) = cli.session_dir {
        config = config.with_session_dir(dir);
    }

    let auth = Arc::new(HttpAuthService::new(&config.api_base_url, config.timeouts)?);
    let storage = Arc::new(FileStorage::new(config.session_dir.clone()));
    let store = SessionStore::open(auth, storage).await;

    let result = run(&store, cli.command).await;
    store.dispose();
    result
}

async fn run(store: &SessionStore, command: Command) -> Result<(), CliError> {
    match command {
        Command::Login(args) => {
            let user = store.login(&args.email, &args.password).await?;
            println!("signed in as {} ({})", user.email, user.id);
        }
        Command::Register(args) => {
            let user = store.register(&args.email, &args.password).await?;
            println!("registered and signed in as {} ({})", user.email, user.id);
        }
        Command::Logout => {
            store.logout().await;
            println!("signed out");
        }
        Command::Status => println!("{}", status_line(&store.session())),
        Command::Whoami => {
            let user = store.user().ok_or(CliError::NotSignedIn)?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        Command::Route { path } => println!("{}", route::decide_for(&store.session(), &path)),
    }
    Ok(())
}

fn status_line(session: &Session) -> String {
    match session.credentials() {
        Some(c) if c.user.is_admin => format!("authenticated as {} (admin)", c.user.email),
        Some(c) => format!("authenticated as {}", c.user.email),
        None => "anonymous".to_owned(),
    }
}
