//! Authentication service — CLI server
//!
//! ```sh
//! # Run with default config (~/.config/auth-service/config.toml)
//! auth-service
//!
//! # Custom config path and port
//! auth-service --config /etc/auth-service/config.toml --port 8080
//!
//! # Local development without a user directory
//! auth-service --profile development --in-memory-directory
//!
//! # Validate config without starting
//! auth-service --check
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use auth_service::config::{AppConfig, DirectoryTarget, Profile};
use auth_service::server::{init_tracing, ServerHandle};

/// Credential issuance service: registration, login and JWT access tokens.
#[derive(Parser, Debug)]
#[command(name = "auth-service", version, about)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "AUTH_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listen port.
    #[arg(long)]
    port: Option<u16>,

    /// Override the deployment profile (development, production).
    #[arg(long)]
    profile: Option<Profile>,

    /// Serve users from process memory instead of the user directory (development only).
    #[arg(long)]
    in_memory_directory: bool,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration and exit without starting the server.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(auth_service::default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", config_path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(profile) = cli.profile {
        config.profile = profile;
    }
    if cli.in_memory_directory {
        config.directory.in_memory = true;
    }
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }

    init_tracing(&config.logging);
    info!("Configuration loaded from {}", config_path.display());

    let settings = match config.validate() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        let directory = match &settings.directory {
            DirectoryTarget::Http { base_url, .. } => base_url.as_str(),
            DirectoryTarget::InMemory => "in-memory",
        };
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Profile     : {:?}", settings.profile);
        println!("   Address     : {}", settings.address());
        println!("   Directory   : {}", directory);
        println!("   Token TTL   : {}m", settings.token_ttl.num_minutes());
        println!("   Log level   : {}", config.logging.level);
        return ExitCode::SUCCESS;
    }

    // ── Start server ───────────────────────────────────────────
    let handle = match ServerHandle::start(settings).await {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to start: {}", e);
            return ExitCode::FAILURE;
        }
    };

    handle.install_signal_handler();
    info!("Press Ctrl+C to shutdown gracefully.");

    handle.wait().await;
    ExitCode::SUCCESS
}
