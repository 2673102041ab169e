//! Application state shared by every request.

use std::sync::Arc;

use tokio::sync::OnceCell;

use catalog_core::{
    backend::StoreBackend,
    collection::Collection,
    error::{ResourceError, ResourceResult},
    handler::ResourceHandler,
};

use crate::config::Config;

/// Shared state handed to every axum handler.
///
/// The resource handler is installed once, after the store connection has been
/// confirmed. Until then the service is not ready and resource requests fail with
/// [`ResourceError::DependencyUnavailable`].
#[derive(Clone)]
pub struct AppState {
    config: Arc<Config>,
    handler: Arc<OnceCell<ResourceHandler>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            handler: Arc::new(OnceCell::new()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Installs the connected backend. Returns `false` if one was already installed.
    pub fn attach(&self, backend: Arc<dyn StoreBackend>) -> bool {
        let collection = Collection::new(backend, self.config.store.collection.clone())
            .with_timeout(self.config.store.operation_timeout());

        self.handler
            .set(ResourceHandler::new(collection))
            .is_ok()
    }

    /// The resource handler, once the store is connected.
    pub fn handler(&self) -> ResourceResult<&ResourceHandler> {
        self.handler
            .get()
            .ok_or_else(|| ResourceError::DependencyUnavailable("store connection not established".into()))
    }

    pub fn is_connected(&self) -> bool {
        self.handler.initialized()
    }
}
