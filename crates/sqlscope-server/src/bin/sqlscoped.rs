//! SqlScope Parse Service Daemon
//!
//! The `sqlscoped` binary serves the SQL parser over HTTP:
//! - `POST /parse-sql` with `{"sql": "..."}` returns the parse tree as JSON
//! - `OPTIONS` on any path answers CORS preflight requests
//! - Handles graceful shutdown on SIGTERM/SIGINT
//!
//! # Usage
//!
//! ```bash
//! # Start server with default settings (0.0.0.0:8001)
//! sqlscoped
//!
//! # Start on custom port
//! sqlscoped --port 9000
//!
//! # Use configuration file
//! sqlscoped --config /etc/sqlscope/sqlscoped.toml
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sqlscope_server::{HttpServer, ServerConfig};

/// SqlScope Parse Service Daemon
#[derive(Parser, Debug)]
#[command(
    name = "sqlscoped",
    author = "SqlScope Team",
    version,
    about = "SqlScope SQL parse service",
    long_about = "SqlScope parses SQL SELECT statements into an AST and a logical execution plan.\n\n\
                  This daemon exposes the parser over HTTP for visualisation front ends."
)]
struct Args {
    /// Host address to bind to [default: 0.0.0.0]
    #[arg(short = 'H', long, env = "SQLSCOPE_HOST")]
    host: Option<String>,

    /// Port to listen on [default: 8001]
    #[arg(short = 'p', long, env = "SQLSCOPE_PORT")]
    port: Option<u16>,

    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", env = "SQLSCOPE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", env = "SQLSCOPE_LOG_LEVEL")]
    log_level: String,

    /// Print configuration and exit
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

    print_banner();

    run_server(config).await
}

fn init_logging(args: &Args) {
    let level = if args.verbose {
        "debug"
    } else {
        &args.log_level
    };

    let filter = EnvFilter::try_new(format!(
        "sqlscoped={level},sqlscope_server={level},sqlscope_sql={level}"
    ))
    .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

fn load_config(args: &Args) -> Result<ServerConfig> {
    let mut config = if let Some(path) = &args.config {
        ServerConfig::from_file(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?
    } else {
        ServerConfig::default()
    };

    // Override with command-line arguments
    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    Ok(config)
}

fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    info!("┌──────────────────────────────────────────┐");
    info!("│  SqlScope v{:<10} SQL parse service   │", version);
    info!("└──────────────────────────────────────────┘");
}

async fn run_server(config: ServerConfig) -> Result<()> {
    let addr = config.socket_addr();

    info!("Server configuration:");
    info!("  Listen address: {}", addr);
    info!("  Parse path: {}", config.parse_path);
    info!("  Max body: {} bytes", config.max_body_bytes);
    info!("  Read timeout: {} ms", config.read_timeout_ms);
    info!("  Allow origin: {}", config.allow_origin);

    let server = HttpServer::bind(config)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Press Ctrl+C to shutdown");

    if let Err(e) = server.serve_with_shutdown(shutdown_signal()).await {
        error!("Server error: {}", e);
        return Err(anyhow::anyhow!("Server error: {}", e));
    }

    info!("Server stopped. Goodbye!");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
