//! metrix server.
//!
//! Boot order: config -> stores -> restore -> periodic snapshot task -> HTTP.
//! On SIGINT/SIGTERM the server drains, the periodic task stops, and a final
//! snapshot is flushed.

use tokio::sync::watch;
use tracing_subscriber::{fmt, EnvFilter};

use metrix_core::error::Result;
use metrix_server::{app_state::AppState, config, router};

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "metrix-server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let path = std::env::var("METRIX_CONFIG").unwrap_or_else(|_| config::DEFAULT_CONFIG_PATH.into());
    let cfg = config::load(&path)?;
    let listen = cfg.server.listen_addr()?;

    let state = AppState::new(cfg)?;
    state.restore_if_enabled().await;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let periodic = state.persistence().spawn_periodic(shutdown_rx);

    let app = router::build_router(state.clone());
    let listener = tokio::net::TcpListener::bind(listen).await?;
    tracing::info!(%listen, "metrix-server starting");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let _ = shutdown_tx.send(true);
    if let Some(handle) = periodic {
        if let Err(e) = handle.await {
            tracing::warn!(error = %e, "periodic snapshot task ended abnormally");
        }
    }
    state.persistence().flush().await;
    tracing::info!("metrix-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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
    tracing::info!("signal received, starting graceful shutdown");
}
