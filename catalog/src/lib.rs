//! The catalog service: a resource-collection HTTP API over a document store.
//!
//! This crate is the entry point of the catalog workspace. It re-exports the core
//! abstractions and backends, and wires them into an axum service:
//!
//! | Method   | Path                   | Operation                         |
//! |----------|------------------------|-----------------------------------|
//! | `GET`    | `/api/resources`       | list, filtered by query string    |
//! | `GET`    | `/api/resources/{id}`  | fetch one                         |
//! | `POST`   | `/api/resources`       | create                            |
//! | `PUT`    | `/api/resources/{id}`  | replace the core fields           |
//! | `PATCH`  | `/api/resources/{id}`  | merge the supplied fields         |
//! | `DELETE` | `/api/resources/{id}`  | delete                            |
//!
//! plus `GET /` (endpoint discovery), `GET /health` and `GET /ready`.
//!
//! # Quick Start
//!
//! ```ignore
//! use catalog::{config::Config, server::Server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     catalog::observability::init_tracing(&config.service)?;
//!     Server::new(config).run().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Embedding
//!
//! The router can be mounted with any backend, which is how the tests drive it:
//!
//! ```ignore
//! use std::sync::Arc;
//! use catalog::{config::Config, memory::InMemoryStore, router::router, state::AppState};
//!
//! let state = AppState::new(Config::default());
//! state.attach(Arc::new(InMemoryStore::new()));
//! let app = router(state);
//! ```
//!
//! # Backends
//!
//! - [`memory`] - In-memory storage for development and testing
//! - [`mongodb`] - MongoDB backend (requires the `mongodb` feature, on by default)

pub mod prelude;

pub mod config;
pub mod error;
pub mod handlers;
pub mod health;
pub mod observability;
pub mod router;
pub mod server;
pub mod state;
pub mod store;

pub use catalog_core::{backend, collection, document, handler, id, query, translate};

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use catalog_memory::{InMemoryStore, InMemoryStoreBuilder};
}

/// MongoDB storage backend implementations.
///
/// This module is only available when the `mongodb` feature is enabled.
#[cfg(feature = "mongodb")]
pub mod mongodb {
    pub use catalog_mongodb::{MongoDbStore, MongoDbStoreBuilder};
}
