//! HTTP server lifecycle.

use axum::Router;
use tokio::{net::TcpListener, signal};

use crate::{
    config::Config,
    error::Result,
    router::router,
    state::AppState,
    store::spawn_connect,
};

/// Runs the catalog service until a shutdown signal arrives.
pub struct Server {
    config: Config,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Binds the listener, connects to the store in the background and serves.
    ///
    /// Requests are accepted immediately; resource endpoints answer 503 until the
    /// store connection is confirmed. After shutdown the store is released.
    pub async fn run(self) -> Result<()> {
        let state = AppState::new(self.config);
        let connector = spawn_connect(state.clone());

        let served = serve(state.config(), router(state.clone())).await;

        connector.abort();

        if let Ok(handler) = state.handler() {
            handler.collection().backend().shutdown().await?;
            tracing::info!("Store connection closed");
        }

        served
    }
}

/// Serves `app` on the configured address with graceful shutdown.
pub async fn serve(config: &Config, app: Router) -> Result<()> {
    let addr = format!("{}:{}", config.service.host, config.service.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Starting {} on {}", config.service.name, listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Completes on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            },
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl+C), starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }

    tracing::info!("Shutdown signal received, draining requests...");
}
