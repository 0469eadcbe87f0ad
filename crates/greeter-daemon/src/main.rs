// crates/greeter-daemon/src/main.rs
//
// Binary entrypoint for the Greeter daemon.
//
// Parses CLI arguments, loads configuration, initializes tracing, wires the
// domain services into the greeting use case, and serves SayHello until
// interrupted.

mod config;

use std::sync::Arc;

use clap::Parser;
use config::{ConfigError, DaemonConfig};

use greeter_core::{
    AllowAllPolicy, FormattingGreetingService, GreetPerson, LoggingAuditor, TemplateFormatter,
    TracingLogger,
};
use greeter_rpc::GreeterRpcServer;

/// Greeter daemon: serves the greeter.Greeter RPC service.
#[derive(Parser, Debug)]
#[command(name = "greeter-daemon", version = "0.1.0", about = "Greeter RPC server")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "greeter.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();

    // Tracing is configured from the loaded config, so load errors are held
    // until the subscriber exists.
    let (mut daemon_config, load_error) = match DaemonConfig::load(&args.config) {
        Ok(cfg) => (cfg, None),
        Err(e) => (DaemonConfig::default(), Some(e)),
    };

    // Initialize tracing subscriber for structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&daemon_config.log_level)),
        )
        .init();

    match load_error {
        None => tracing::info!("Loaded configuration from {}", args.config),
        Some(e @ ConfigError::Read { .. }) => {
            tracing::warn!("Could not load config: {}. Using defaults.", e)
        }
        Some(e) => {
            tracing::error!("{}", e);
            return Err(e.into());
        }
    }

    // GRPC_PORT overrides the config file; a bad value aborts startup.
    if let Err(e) = daemon_config.apply_env() {
        tracing::error!("{}", e);
        return Err(e.into());
    }

    tracing::info!("Greeter Daemon v0.1.0");
    tracing::info!(
        "RPC endpoint: {}:{}",
        daemon_config.rpc_host,
        daemon_config.rpc_port
    );
    tracing::info!("Audit mode: {:?}", daemon_config.audit_mode);

    let logger = TracingLogger::shared();

    let service = Arc::new(FormattingGreetingService::new(
        TemplateFormatter,
        logger.clone(),
    ));
    let policy = Arc::new(AllowAllPolicy::new(logger.clone()));
    let auditor = Arc::new(LoggingAuditor::new(logger.clone()));
    let usecase = GreetPerson::new(service, policy, auditor, logger.clone())
        .with_audit_mode(daemon_config.audit_mode);

    let server = GreeterRpcServer::new(daemon_config.rpc_config(), Arc::new(usecase), logger)?;

    // Serves until Ctrl-C.
    server.start().await?;

    tracing::info!("Greeter daemon shut down");
    Ok(())
}
