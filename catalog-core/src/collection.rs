//! A handle to one collection in a storage backend.
//!
//! [`Collection`] binds a backend to a collection name and bounds every call with an
//! operation timeout, so a stalled store surfaces as [`StoreError::Timeout`] instead of
//! a hung request.
//!
//! # Example
//!
//! ```ignore
//! use std::{sync::Arc, time::Duration};
//! use catalog_core::collection::Collection;
//! use catalog_memory::InMemoryStore;
//!
//! let products = Collection::new(Arc::new(InMemoryStore::new()), "products")
//!     .with_timeout(Duration::from_secs(5));
//! let id = products.insert(bson::doc! { "name": "Pen" }).await?;
//! ```

use std::{future::Future, sync::Arc, time::Duration};

use bson::{Document, oid::ObjectId};

use crate::{
    backend::{StoreBackend, Update},
    error::{StoreError, StoreResult},
    query::Query,
};

/// Default bound on a single store call.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

/// A collection handle shared by every request.
///
/// Cloning is cheap: clones share the same backend.
#[derive(Debug, Clone)]
pub struct Collection {
    name: String,
    backend: Arc<dyn StoreBackend>,
    timeout: Duration,
}

impl Collection {
    /// Creates a handle for `name` on `backend` with the default timeout.
    pub fn new(backend: Arc<dyn StoreBackend>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            backend,
            timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Sets the bound on each store call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the backend this collection lives in.
    pub fn backend(&self) -> &Arc<dyn StoreBackend> {
        &self.backend
    }

    /// Inserts a document and returns its generated identifier.
    pub async fn insert(&self, document: Document) -> StoreResult<ObjectId> {
        self.bounded(self.backend.insert_document(document, &self.name))
            .await
    }

    /// Retrieves a document by identifier.
    pub async fn get(&self, id: &ObjectId) -> StoreResult<Option<Document>> {
        self.bounded(self.backend.get_document(id, &self.name))
            .await
    }

    /// Queries documents using a structured query.
    pub async fn query(&self, query: Query) -> StoreResult<Vec<Document>> {
        self.bounded(self.backend.query_documents(query, &self.name))
            .await
    }

    /// Updates a document, returning whether it existed.
    pub async fn update(&self, id: &ObjectId, update: Update) -> StoreResult<bool> {
        self.bounded(self.backend.update_document(id, update, &self.name))
            .await
    }

    /// Deletes a document, returning whether it existed.
    pub async fn delete(&self, id: &ObjectId) -> StoreResult<bool> {
        self.bounded(self.backend.delete_document(id, &self.name))
            .await
    }

    /// Confirms the backend is reachable.
    pub async fn ping(&self) -> StoreResult<()> {
        self.bounded(self.backend.ping()).await
    }

    async fn bounded<T>(&self, call: impl Future<Output = StoreResult<T>>) -> StoreResult<T> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| StoreError::Timeout(self.timeout.as_millis()))?
    }
}
