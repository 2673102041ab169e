//! Storage backend abstraction for the resource service.
//!
//! This module defines the trait that abstracts over storage implementations, allowing
//! the service to run against an in-memory store or MongoDB without changing the
//! handler.
//!
//! # Traits
//!
//! - [`StoreBackend`]: The core, object-safe trait for storage backends
//! - [`StoreBackendBuilder`]: Factory trait for creating backend instances
//!
//! # Examples
//!
//! ```ignore
//! use catalog_core::backend::StoreBackend;
//! use bson::doc;
//!
//! let backend = MyBackendImpl::new();
//!
//! let id = backend
//!     .insert_document(doc! { "name": "Pen", "price": 1.5 }, "products")
//!     .await?;
//! let stored = backend.get_document(&id, "products").await?;
//! ```

use async_trait::async_trait;
use bson::{Document, oid::ObjectId};
use std::fmt::Debug;

use crate::{error::StoreResult, query::Query};

/// How an update is applied to an existing document.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Replace every field except the identifier.
    Replace(Document),
    /// Set only the supplied fields, leaving the rest untouched.
    Merge(Document),
}

/// Abstract interface for document storage backends.
///
/// Implementers provide single-document atomicity for insert, update and delete. The
/// service layer adds no locking of its own.
///
/// # Thread Safety
///
/// All implementations must be thread-safe and support concurrent access from multiple
/// async tasks. The trait is object safe so a backend chosen at runtime can be held as
/// `Arc<dyn StoreBackend>`.
///
/// # Error Handling
///
/// Operations return [`StoreResult<T>`](crate::error::StoreResult). Absence of a
/// document is never an error: lookups return `None` and writes return `false`.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Inserts a new document and returns the identifier the store assigned to it.
    ///
    /// Any `_id` present in `document` is ignored.
    async fn insert_document(&self, document: Document, collection: &str) -> StoreResult<ObjectId>;

    /// Retrieves a single document by identifier, or `None` if it does not exist.
    async fn get_document(&self, id: &ObjectId, collection: &str) -> StoreResult<Option<Document>>;

    /// Queries documents using a structured query.
    ///
    /// Documents with equal sort keys keep the store's natural order.
    ///
    /// # See Also
    ///
    /// - [`Query`] for constructing queries
    /// - [`crate::query::Filter`] for building filter expressions
    async fn query_documents(&self, query: Query, collection: &str) -> StoreResult<Vec<Document>>;

    /// Applies an update to the document with the given identifier.
    ///
    /// Returns `false` when no document matched. The identifier is never changed.
    async fn update_document(
        &self,
        id: &ObjectId,
        update: Update,
        collection: &str,
    ) -> StoreResult<bool>;

    /// Deletes the document with the given identifier.
    ///
    /// Returns `false` when no document matched.
    async fn delete_document(&self, id: &ObjectId, collection: &str) -> StoreResult<bool>;

    /// Confirms the backend is reachable.
    async fn ping(&self) -> StoreResult<()>;

    /// Cleanly shuts down the backend, releasing all resources.
    ///
    /// The default implementation is a no-op, but backends with external connections
    /// should override this.
    async fn shutdown(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> StoreResult<Self::Backend>;
}
