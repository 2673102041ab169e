//! Core of the catalog service: the query-and-update translation layer that sits
//! between HTTP requests and a document store.
//!
//! This crate provides:
//!
//! - **Errors** ([`error`]) - Store errors and the client-facing resource error taxonomy
//! - **Identifiers** ([`id`]) - Syntactic validation of store identifiers
//! - **Resources** ([`document`]) - Conversion between JSON bodies and stored documents
//! - **Queries** ([`query`]) - Filter, projection and sort construction with a visitor for backends
//! - **Store backend abstraction** ([`backend`]) - The trait every storage backend implements
//! - **Collections** ([`collection`]) - A timeout-bounded handle to one collection
//! - **Translation** ([`translate`]) - Query-string parameters to a store query
//! - **Handling** ([`handler`]) - Validation and dispatch of the six resource operations
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use catalog_core::{collection::Collection, handler::ResourceHandler};
//! use catalog_memory::InMemoryStore;
//!
//! let handler = ResourceHandler::new(Collection::new(Arc::new(InMemoryStore::new()), "products"));
//! let id = handler
//!     .create(bson::doc! { "name": "Pen", "price": 1.5, "category": "office" })
//!     .await?;
//! let pen = handler.get(&id.to_hex()).await?;
//! ```

#[allow(unused_extern_crates)]
extern crate self as catalog_core;

pub mod backend;
pub mod collection;
pub mod document;
pub mod error;
pub mod handler;
pub mod id;
pub mod query;
pub mod translate;
