//! Backend selection and the startup connection loop.

use std::sync::Arc;

use catalog_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    error::{StoreError, StoreResult},
};
use catalog_memory::InMemoryStore;
#[cfg(feature = "mongodb")]
use catalog_mongodb::MongoDbStore;

use crate::{
    config::{BackendKind, StoreConfig},
    state::AppState,
};

/// Builds the configured backend without checking that it is reachable.
pub async fn build_backend(config: &StoreConfig, app_name: &str) -> StoreResult<Arc<dyn StoreBackend>> {
    match config.backend {
        BackendKind::Memory => Ok(Arc::new(InMemoryStore::builder().build().await?)),
        #[cfg(feature = "mongodb")]
        BackendKind::Mongodb => Ok(Arc::new(
            MongoDbStore::builder(&config.url, &config.database)
                .app_name(app_name)
                .server_selection_timeout(config.operation_timeout())
                .build()
                .await?,
        )),
        #[cfg(not(feature = "mongodb"))]
        BackendKind::Mongodb => {
            let _ = app_name;
            Err(StoreError::Initialization("built without the `mongodb` feature".into()))
        },
    }
}

/// Builds the backend and confirms it answers a ping.
async fn try_connect(config: &StoreConfig, app_name: &str) -> StoreResult<Arc<dyn StoreBackend>> {
    let backend = build_backend(config, app_name).await?;
    let timeout = config.operation_timeout();

    tokio::time::timeout(timeout, backend.ping())
        .await
        .map_err(|_| StoreError::Timeout(timeout.as_millis()))??;

    Ok(backend)
}

/// Connects to the store, retrying with a fixed delay.
///
/// Gives up after `connect_max_retries` retries, or never when that is `0`.
pub async fn connect(config: &StoreConfig, app_name: &str) -> StoreResult<Arc<dyn StoreBackend>> {
    let mut retries = 0u32;

    loop {
        match try_connect(config, app_name).await {
            Ok(backend) => {
                tracing::info!(backend = ?config.backend, database = %config.database, "store connection established");
                return Ok(backend);
            },
            Err(err) if config.connect_max_retries == 0 || retries < config.connect_max_retries => {
                retries += 1;
                tracing::warn!(
                    error = %err,
                    attempt = retries,
                    retry_in_secs = config.connect_retry_delay_secs,
                    "store connection failed, retrying"
                );
                tokio::time::sleep(config.connect_retry_delay()).await;
            },
            Err(err) => return Err(err),
        }
    }
}

/// Connects in the background and marks the service ready once connected.
pub fn spawn_connect(state: AppState) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let config = state.config().clone();

        match connect(&config.store, &config.service.name).await {
            Ok(backend) => {
                state.attach(backend);
            },
            Err(err) => {
                tracing::error!(error = %err, "giving up on store connection; service stays unready");
            },
        }
    })
}
