//! rhino-mcp: MCP server for creating annotations in Rhino
//!
//! Bridges an MCP client on stdio to the Rhino plugin's TCP socket.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use rhino_mcp::config;
use rhino_mcp::mcp::server::McpServer;
use rhino_mcp::rhino::RhinoConnection;

/// MCP server for creating annotations in Rhino.
///
/// Sends annotation requests to the Rhino plugin and falls back to
/// generated RhinoScript when the plugin cannot handle them.
#[derive(Parser, Debug)]
#[command(name = "rhino-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Rhino plugin host (overrides the configuration file)
    #[arg(long)]
    host: Option<String>,

    /// Rhino plugin port (overrides the configuration file)
    #[arg(long)]
    port: Option<u16>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber. Logs go to stderr; stdout carries MCP.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// GPL notice naming the package authors as copyright holders.
fn license_notice() -> String {
    format!(
        "rhino-mcp {}  Copyright (C) 2026  {}\n\
         This program comes with ABSOLUTELY NO WARRANTY.\n\
         This is free software, licensed under GPL-3.0-or-later.\n",
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_AUTHORS"),
    )
}

/// Entry point for the rhino-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    let mut cfg = match config::load_or_default(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            if args.config.is_none() {
                if let Some(default_path) = config::default_config_path() {
                    eprintln!("\nDefault configuration file: {}", default_path.display());
                }
            }
            return ExitCode::FAILURE;
        }
    };

    if let Some(host) = args.host {
        cfg.rhino.host = host;
    }
    if let Some(port) = args.port {
        cfg.rhino.port = port;
    }
    if let Err(e) = cfg.rhino.validate() {
        eprintln!("Configuration error: {e}");
        return ExitCode::FAILURE;
    }

    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    // Display GPL license notice (required by GPLv3 Section 5d)
    eprintln!("{}", license_notice());

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %cfg.rhino.host,
        port = cfg.rhino.port,
        timeout_secs = cfg.rhino.timeout_secs,
        "Starting rhino-mcp server"
    );

    let mut server = McpServer::new(RhinoConnection::new(cfg.rhino));

    info!("MCP server ready, waiting for client connection...");

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(server.run()) {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}
