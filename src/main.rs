use anyhow::{Context, Result};
use clap::Parser;
use secrecy::SecretString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

use tpr::api::{ApiClient, ApiError};
use tpr::app::{App, AppEvent};
use tpr::config::{Config, SERVER_URL_ENV};
use tpr::items::{CollectionKind, SpawnedReadMarker};
use tpr::keybindings::KeybindingRegistry;
use tpr::session::SessionStore;
use tpr::ui;

/// Get the config directory path (~/.config/tpr/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("tpr"))
}

/// Create the config directory if needed and restrict it to the user.
fn ensure_config_dir(config_dir: &Path) -> Result<()> {
    if !config_dir.exists() {
        std::fs::create_dir_all(config_dir).context("Failed to create config directory")?;
    }

    // SEC-007: The directory holds the session token; user-only access
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o700);
        if let Err(e) = std::fs::set_permissions(config_dir, perms) {
            eprintln!(
                "Warning: failed to set permissions on {}: {}",
                config_dir.display(),
                e
            );
        }
    }
    Ok(())
}

/// Route tracing output to `tpr.log`; the TUI owns stdout.
fn init_logging(config_dir: &Path) -> Result<()> {
    let log_path = config_dir.join("tpr.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tpr=info")),
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "tpr", about = "Terminal client for a personal feed reader")]
struct Args {
    /// Log in as NAME (password is read from stdin)
    #[arg(long, value_name = "NAME")]
    login: Option<String>,

    /// Log out and forget the stored session
    #[arg(long)]
    logout: bool,

    /// Print subscribed feeds and exit
    #[arg(long)]
    feeds: bool,

    /// Start in the archive view
    #[arg(long)]
    archive: bool,

    /// Server base URL (overrides TPR_SERVER_URL and the config file)
    #[arg(long, value_name = "URL")]
    server: Option<String>,

    /// Config file path (default: ~/.config/tpr/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn read_password() -> Result<SecretString> {
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read password from stdin")?;
    let password = line.trim_end_matches(&['\r', '\n'][..]).to_string();
    Ok(SecretString::from(password))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = get_config_dir()?;
    ensure_config_dir(&config_dir)?;
    init_logging(&config_dir)?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    let env_url = std::env::var(SERVER_URL_ENV).ok();
    let server_url = config.resolve_server_url(args.server.as_deref(), env_url.as_deref());

    let session = SessionStore::load(config_dir.join("session.json"));
    let client = ApiClient::new(&server_url, session, config.request_timeout())
        .with_context(|| format!("Invalid server URL: {}", server_url))?;

    if let Some(name) = &args.login {
        let password = read_password()?;
        client
            .login(name, &password)
            .await
            .context("Login failed")?;
        println!("Logged in as {}.", name);
        return Ok(());
    }

    if args.logout {
        match client.logout().await {
            Ok(()) => println!("Logged out."),
            Err(ApiError::NotLoggedIn) => println!("Not logged in."),
            Err(e) => {
                // Local session is already gone at this point
                tracing::warn!(error = %e, "Server-side logout failed");
                println!("Logged out locally; server reported: {}", e);
            }
        }
        return Ok(());
    }

    if !client.session().is_authenticated() {
        eprintln!("Not logged in. Run `tpr --login <NAME>` first.");
        std::process::exit(1);
    }

    if args.feeds {
        let feeds = client.get_feeds().await.context("Failed to load feeds")?;
        for feed in feeds {
            let name = if feed.name.is_empty() {
                &feed.url
            } else {
                &feed.name
            };
            match &feed.last_failure {
                Some(failure) => println!("{}\t{}\t(failing: {})", name, feed.url, failure),
                None => println!("{}\t{}", name, feed.url),
            }
        }
        return Ok(());
    }

    let mut keybindings = KeybindingRegistry::new();
    for warning in keybindings.apply_overrides(&config.keybindings) {
        tracing::warn!(%warning, "Ignoring keybinding override");
    }

    // Create event channel for background tasks
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(100);

    let user_name = client.session().name();
    let pending = client.pending();
    let api = Arc::new(client);
    let marker = Arc::new(SpawnedReadMarker::new(api.clone(), event_tx.clone()));
    let start = if args.archive {
        CollectionKind::Archived
    } else {
        CollectionKind::Unread
    };

    let mut app = App::new(api, marker, pending, keybindings, start);
    app.user_name = user_name;

    tracing::info!(server = %server_url, view = start.label(), "Starting TUI");
    ui::run(&mut app, event_tx, event_rx).await?;

    if let Some(message) = app.exit_message {
        eprintln!("{}", message);
        std::process::exit(1);
    }
    Ok(())
}
