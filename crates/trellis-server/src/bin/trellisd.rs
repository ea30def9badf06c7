//! TrellisDB server daemon.
//!
//! `trellisd` starts a single-node TrellisDB: the in-memory engine, the
//! command dispatch table, the local command log, and the TCP command
//! service. It shuts down gracefully on ctrl-c or SIGTERM.
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings
//! trellisd
//!
//! # Start on a custom port
//! trellisd --port 7272
//!
//! # Use a configuration file
//! trellisd --config /etc/trellisdb/trellisd.toml
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use trellis_repl::{Applier, LocalLog};
use trellis_server::config::ServerConfig;
use trellis_server::service::Server;
use trellis_store::{MemoryEngine, Registry};

/// TrellisDB server daemon.
#[derive(Parser, Debug)]
#[command(
    name = "trellisd",
    version,
    about = "TrellisDB wide-column store server",
    long_about = "TrellisDB is a wide-column store over an ordered transactional \
                  key-value engine.\n\nThis daemon starts a single node and listens \
                  for command connections."
)]
struct Args {
    /// Host address to bind to
    #[arg(short = 'H', long, env = "TRELLIS_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short = 'p', long, env = "TRELLIS_PORT")]
    port: Option<u16>,

    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Data directory for persistent storage
    #[arg(short = 'd', long, value_name = "DIR", env = "TRELLIS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Run in memory-only mode (no persistence)
    #[arg(long)]
    memory: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", env = "TRELLIS_LOG_LEVEL")]
    log_level: String,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);

    let config = load_config(&args)?;

    if args.print_config {
        println!("{}", config.to_toml()?);
        return Ok(());
    }

    run_server(config).await
}

fn init_logging(args: &Args) {
    let level = if args.verbose { "debug" } else { &args.log_level };

    let filter = EnvFilter::try_new(format!(
        "trellis_server={level},trellis_repl={level},trellis_store={level}"
    ))
    .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

fn load_config(args: &Args) -> Result<ServerConfig> {
    let mut config = if let Some(path) = &args.config {
        ServerConfig::from_file(path).context("failed to load config file")?
    } else {
        ServerConfig::default()
    };

    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(dir) = &args.data_dir {
        config.data_dir = Some(dir.clone());
    }
    if args.memory {
        config.memory_mode = true;
    }

    Ok(config)
}

async fn run_server(config: ServerConfig) -> Result<()> {
    info!("TrellisDB v{}", env!("CARGO_PKG_VERSION"));

    if config.memory_mode {
        info!("memory-only mode: data will not be persisted");
    } else if let Some(dir) = &config.data_dir {
        warn!(
            data_dir = %dir.display(),
            "this build ships the in-memory engine; the data directory is unused"
        );
    }

    // Wire the node together: engine, dispatch table, applier, command log.
    let engine = Arc::new(MemoryEngine::new());
    let registry = Registry::new();
    info!(operations = ?registry.names(), "dispatch table built");
    let applier = Arc::new(Applier::new(registry, engine));
    let log = Arc::new(LocalLog::new(Arc::clone(&applier)));

    let server = Server::bind(
        &config.listen_addr(),
        log,
        applier,
        config.max_frame_bytes,
    )
    .await
    .context("failed to bind listener")?;

    info!(addr = %server.local_addr()?, "press ctrl-c to shut down");

    tokio::select! {
        result = server.serve() => {
            result.context("server error")?;
        }
        _ = shutdown_signal() => {
            info!("shutdown signal received");
        }
    }

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
