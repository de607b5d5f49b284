mod api;
mod pairing;
mod session;
mod views;

use clap::{Parser, Subcommand};
use pairing::PairingTracker;
use session::SessionGate;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use wadash_auth::{CredentialVerifier, LoginRequest, SqliteCredentialStore};
use wadash_channels::whatsapp::{self, WhatsAppAutomation};
use wadash_core::config::{self, Config, StoreBackend};
use wadash_core::event::AutomationEvent;
use wadash_core::shellexpand;
use wadash_core::traits::Automation;

#[derive(Parser)]
#[command(
    name = "wadash",
    version,
    about = "wadash: login-gated admin panel for a WhatsApp session"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the dashboard.
    Start,
    /// Show the resolved configuration and check the credential store.
    Status,
    /// Print a bcrypt hash for seeding a credential record.
    HashPassword {
        /// Plaintext password.
        password: String,
    },
    /// Add or update an administrator in the SQLite credential store.
    AddUser {
        username: String,
        password: String,
    },
}

/// Automation events buffered before the tracker catches up.
const EVENT_BUFFER: usize = 32;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;

    match cli.command {
        Commands::Start => {
            let _guard = init_logging(&cfg)?;
            start(cfg).await?;
        }
        Commands::Status => {
            init_stdout_logging();
            status(&cli.config, &cfg).await;
        }
        Commands::HashPassword { password } => {
            println!("{}", wadash_auth::hash::hash_password(&password)?);
        }
        Commands::AddUser { username, password } => {
            init_stdout_logging();
            add_user(&cfg, &username, &password).await?;
        }
    }

    Ok(())
}

/// Build the shared state, start WhatsApp, and serve until the listener fails.
async fn start(cfg: Config) -> anyhow::Result<()> {
    info!("wadash starting ({:?})", cfg.server.environment);

    let store = wadash_auth::build_store(&cfg.store).await?;
    let verifier = CredentialVerifier::new(store);

    let tracker = Arc::new(PairingTracker::new());
    let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
    tokio::spawn(pump_events(tracker.clone(), events_rx));

    let automation: Arc<dyn Automation> = Arc::new(WhatsAppAutomation::new(
        cfg.whatsapp.clone(),
        &cfg.wadash.data_dir,
    ));
    if cfg.whatsapp.enabled {
        if let Err(e) = automation.initialize(events_tx.clone()).await {
            error!("WhatsApp failed to start: {e}");
        }
    } else {
        info!("WhatsApp disabled in config");
    }

    let state = api::AppState {
        gate: Arc::new(SessionGate::new()),
        tracker,
        verifier,
        automation,
        events: events_tx,
        views_dir: cfg.server.views_dir(),
        repair_after_logout: cfg.whatsapp.repair_after_logout,
    };

    api::serve(state, &cfg.server).await
}

/// Apply automation events to the tracker in arrival order.
async fn pump_events(tracker: Arc<PairingTracker>, mut events: mpsc::Receiver<AutomationEvent>) {
    while let Some(event) = events.recv().await {
        tracker.handle(event).await;
    }
    info!("automation event stream closed");
}

async fn status(config_path: &str, cfg: &Config) {
    println!("wadash status\n");
    println!("Config: {config_path}");
    println!("Data dir: {}", shellexpand(&cfg.wadash.data_dir));
    println!("Listen: {}", cfg.server.addr());
    println!("Environment: {:?}", cfg.server.environment);
    println!("Assets: {}", cfg.server.public_dir().display());
    println!("Views: {}", cfg.server.views_dir().display());
    println!();

    match wadash_auth::build_store(&cfg.store).await {
        Ok(store) => match store.find_by_username("__wadash_status__").await {
            Ok(_) => println!("  credential store ({}): reachable", store.name()),
            Err(e) => println!("  credential store ({}): {e}", store.name()),
        },
        Err(e) => println!("  credential store: {e}"),
    }

    let session_db = format!(
        "{}/whatsapp.db",
        whatsapp::session_dir(&cfg.wadash.data_dir)
    );
    println!(
        "  whatsapp: {}",
        if !cfg.whatsapp.enabled {
            "disabled"
        } else if Path::new(&session_db).exists() {
            "session stored"
        } else {
            "not paired"
        }
    );
}

async fn add_user(cfg: &Config, username: &str, password: &str) -> anyhow::Result<()> {
    if cfg.store.backend != StoreBackend::Sqlite {
        anyhow::bail!(
            "add-user only writes to the sqlite store; set [store] backend = \"sqlite\" \
             or seed Firestore with the output of `wadash hash-password`"
        );
    }

    let request = LoginRequest::new(username, password);
    let (username, password) = request.validated()?;

    let store = SqliteCredentialStore::new(&cfg.store.db_path).await?;
    store
        .upsert(
            username,
            &wadash_auth::hash::hash_password_blocking(password).await?,
        )
        .await?;
    println!(
        "saved '{username}' ({} user(s) in {})",
        store.count().await?,
        shellexpand(&cfg.store.db_path)
    );
    Ok(())
}

/// Log to stdout and to a daily file under `{data_dir}/logs`.
///
/// The returned guard flushes the file writer on drop.
fn init_logging(cfg: &Config) -> anyhow::Result<WorkerGuard> {
    let log_dir = Path::new(&shellexpand(&cfg.wadash.data_dir)).join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("wadash")
        .filename_suffix("log")
        .build(&log_dir)?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter(&cfg.wadash.log_level))
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .with_target(true)
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .init();

    info!("Logging to: {}", log_dir.display());
    Ok(guard)
}

fn init_stdout_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter("warn"))
        .init();
}

/// Noisy libraries are capped at `warn`; `RUST_LOG` layers on top.
fn env_filter(level: &str) -> EnvFilter {
    let base = "hyper=warn,reqwest=warn,h2=warn,rustls=warn,sqlx=warn,whatsapp_rust=warn";
    match std::env::var("RUST_LOG") {
        Ok(env) => EnvFilter::new(format!("{base},{level},{env}")),
        Err(_) => EnvFilter::new(format!("{base},{level}")),
    }
}
