//! In-memory document storage backend for the catalog service.
//!
//! This crate provides a thread-safe, in-memory implementation of the `StoreBackend` trait.
//! It uses async-aware read-write locks for concurrent access and is meant for development,
//! tests, and running the service without a MongoDB server.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using async-aware RwLock
//! - **MongoDB-compatible documents** - Documents are stored as BSON with an `_id` field
//! - **Query support** - Equality and range filters, stable sorting, and projection
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use catalog_core::{backend::StoreBackendBuilder, collection::Collection};
//! use catalog_memory::InMemoryStore;
//!
//! let backend = InMemoryStore::builder().build().await?;
//! let products = Collection::new(Arc::new(backend), "products");
//!
//! let id = products
//!     .insert(bson::doc! { "name": "Pen", "price": 1.5, "category": "office" })
//!     .await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as catalog_memory;

pub mod store;
mod evaluator;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
