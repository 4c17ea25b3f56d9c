pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod state;
pub mod types;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use crate::config::GatewayConfig;
use crate::service::LedgerService;
use state::AppState;

/// Build the HTTP router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/accounts", post(handlers::create_account))
        .route("/accounts/{account_id}", get(handlers::get_account))
        .route("/transactions", post(handlers::create_transfer))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .layer(axum::middleware::from_fn(middleware::request_context))
        .with_state(state)
}

/// Serve `app` until `shutdown` resolves, then give in-flight requests
/// `grace` to finish before dropping them.
///
/// Dropped handlers drop their open transactions, which roll back.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
    grace: Duration,
) -> anyhow::Result<()> {
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        res = &mut server => {
            return res.context("server task panicked")?.context("server error");
        }
        _ = shutdown => {}
    }

    info!(
        grace_ms = grace.as_millis() as u64,
        "shutdown signal received, draining in-flight requests"
    );
    let _ = stop_tx.send(());

    match tokio::time::timeout(grace, &mut server).await {
        Ok(res) => {
            res.context("server task panicked")?.context("server error")?;
            info!("server stopped");
            Ok(())
        }
        Err(_) => {
            warn!("grace period elapsed, aborting in-flight requests");
            server.abort();
            Ok(())
        }
    }
}

/// Resolves on SIGINT or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// Start HTTP Gateway server
pub async fn run_server(config: &GatewayConfig, ledger: Arc<LedgerService>) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr} (port already in use?)"))?;

    info!(
        addr = %addr,
        backend = ledger.backend(),
        "gateway listening, API docs at /api-docs/openapi.json"
    );

    let app = build_router(AppState::new(ledger));
    serve(
        listener,
        app,
        shutdown_signal(),
        Duration::from_millis(config.shutdown_grace_ms),
    )
    .await
}
