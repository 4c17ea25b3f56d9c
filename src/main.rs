use std::sync::Arc;

use internal_transfers::config::AppConfig;
use internal_transfers::service::LedgerService;
use internal_transfers::{gateway, logging};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    std::env::var("APP_ENV").unwrap_or_else(|_| "local".to_string())
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut app_config = AppConfig::load(&env)?;
    if let Some(port) = get_port_override() {
        app_config.gateway.port = port;
    }
    let _log_guard = logging::init_logging(&app_config);

    tracing::info!(
        env = %env,
        version = env!("CARGO_PKG_VERSION"),
        build = env!("LEDGER_BUILD_REV"),
        "Starting internal transfers service"
    );

    let ledger = match LedgerService::from_config(&app_config).await {
        Ok(ledger) => Arc::new(ledger),
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "FATAL: ledger startup failed");
            return Err(e);
        }
    };

    gateway::run_server(&app_config.gateway, ledger).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
