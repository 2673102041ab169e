//! MongoDB backend implementation for the catalog service.
//!
//! This crate provides a MongoDB-based implementation of the `StoreBackend` trait,
//! storing resources as documents in one collection and using MongoDB's query engine
//! for filtering, projection and sorting.
//!
//! It is enabled by the `mongodb` feature of the `catalog` crate, which is on by default.
//!
//! # Connection
//!
//! The builder takes a MongoDB connection string and database name. Building the
//! store only parses the connection string; the driver connects lazily, so callers
//! should [`ping`](catalog_core::backend::StoreBackend::ping) before reporting ready.
//!
//! # Example
//!
//! ```ignore
//! use catalog_core::backend::{StoreBackend, StoreBackendBuilder};
//! use catalog_mongodb::MongoDbStore;
//!
//! let store = MongoDbStore::builder("mongodb://127.0.0.1:27017", "shop")
//!     .build()
//!     .await?;
//! store.ping().await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as catalog_mongodb;

pub mod store;
mod query;

pub use store::{MongoDbStore, MongoDbStoreBuilder};
