use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{debug, info, instrument, warn};

use crate::config::initialize_app_state_with_url;
use crate::router::create_router;

/// Parses `IP:PORT` and binds it, so a typo fails before the database is touched.
async fn bind_listener(bind_address: &str) -> Result<TcpListener> {
    let addr: SocketAddr = bind_address
        .parse()
        .with_context(|| format!("invalid bind address '{}'", bind_address))?;
    TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

/// Runs the API until a shutdown signal arrives, letting in-flight requests finish.
#[instrument(skip(database_url))]
pub async fn serve(database_url: &str, bind_address: &str) -> Result<()> {
    let listener = bind_listener(bind_address).await?;
    let local = listener.local_addr()?;

    let state = initialize_app_state_with_url(database_url)
        .await
        .context("failed to initialize application state")?;
    debug!("Serving media from {}", state.artwork.root().display());

    let app = create_router(state);

    info!("Mediashelf listening on http://{}", local);
    info!("Swagger UI at http://{}/swagger-ui", local);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Mediashelf stopped");
    Ok(())
}
