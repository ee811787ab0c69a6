/// Version injected at compile time via SIEM_SYNC_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("SIEM_SYNC_VERSION") {
    Some(v) => v,
    None => "dev",
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use siem_sync::app::{ApplyAction, App};
use siem_sync::config::Config;
use siem_sync::resource::{get_all_resource_keys, get_resource, Deletion};
use siem_sync::siem::client::SiemClient;
use siem_sync::state::StateStore;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Synchronize SIEM detection rules and exception lists
#[derive(Parser, Debug)]
#[command(name = "siem-sync", version = VERSION, about, long_about = None)]
struct Args {
    /// Config file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// SIEM host name
    #[arg(long, global = true)]
    hostname: Option<String>,

    /// SIEM port
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Connect using TLS
    #[arg(long, global = true)]
    tls: Option<bool>,

    /// User to authenticate as
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Password to authenticate with
    #[arg(long, env = "SIEM_SYNC_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    /// State file tracking managed resources
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create or update a resource from a JSON document
    Apply {
        /// Resource kind (see `kinds`)
        kind: String,
        /// Local name for the resource
        name: String,
        /// JSON document describing the desired state
        file: PathBuf,
    },
    /// Re-read all tracked resources, dropping those deleted remotely
    Refresh,
    /// Delete a tracked resource
    Destroy { kind: String, name: String },
    /// Track an existing remote resource by id
    Import { kind: String, name: String, id: String },
    /// Print tracked resources
    Show {
        /// Only show resources of this kind
        kind: Option<String>,
    },
    /// List supported resource kinds
    Kinds,
    /// Print the privileges of the configured user
    Privileges,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("siem-sync {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("siem-sync").join("siem-sync.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".siem-sync").join("siem-sync.log");
    }
    PathBuf::from("siem-sync.log")
}

/// Load config (CLI > config file > defaults)
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Some(hostname) = &args.hostname {
        config.hostname = hostname.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(tls) = args.tls {
        config.tls = tls;
    }
    if let Some(user) = &args.user {
        config.user = user.clone();
    }
    if let Some(password) = &args.password {
        config.password = Some(password.clone());
    }
    if let Some(state) = &args.state {
        config.state_file = Some(state.clone());
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    if let Command::Kinds = args.command {
        for key in get_all_resource_keys() {
            if let Some(def) = get_resource(key) {
                println!("{:<22} {:<22} {}", key, def.display_name, def.collection_path);
            }
        }
        return Ok(());
    }

    let config = load_config(&args)?;
    tracing::info!("Using SIEM at {}:{} (tls: {})", config.hostname, config.port, config.tls);

    let client = SiemClient::new(&config.connection_settings())?;
    let state = StateStore::load(&config.effective_state_file())?;
    let mut app = App::new(client, state);

    match args.command {
        Command::Apply { kind, name, file } => {
            let source = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let report = app.apply(&kind, &name, &source).await?;
            for warning in &report.warnings {
                eprintln!("warning: {}", warning);
            }
            let verb = match report.action {
                ApplyAction::Created => "created",
                ApplyAction::Updated => "updated",
            };
            println!("{} {} (id: {})", verb, report.resource.address(), report.resource.id);
        }
        Command::Refresh => {
            let report = app.refresh().await?;
            for address in &report.refreshed {
                println!("refreshed {}", address);
            }
            for address in &report.dropped {
                println!("dropped {} (not found remotely)", address);
            }
            for (address, error) in &report.failed {
                eprintln!("failed {}: {}", address, error);
            }
            if !report.failed.is_empty() {
                anyhow::bail!("{} resource(s) could not be refreshed", report.failed.len());
            }
        }
        Command::Destroy { kind, name } => match app.destroy(&kind, &name).await? {
            Deletion::Deleted => println!("deleted {}/{}", kind, name),
            Deletion::AlreadyGone => {
                eprintln!("warning: {}/{} was already gone remotely", kind, name);
                println!("forgot {}/{}", kind, name);
            }
        },
        Command::Import { kind, name, id } => {
            let resource = app.import(&kind, &name, &id).await?;
            println!("imported {} (id: {})", resource.address(), resource.id);
        }
        Command::Show { kind } => {
            let resources: Vec<_> = app
                .state
                .resources()
                .filter(|r| kind.as_deref().map_or(true, |k| r.kind == k))
                .collect();
            println!("{}", serde_json::to_string_pretty(&resources)?);
        }
        Command::Privileges => {
            let privileges = app.privileges().await?;
            println!("{}", serde_json::to_string_pretty(&privileges)?);
        }
        Command::Kinds => {}
    }

    Ok(())
}
