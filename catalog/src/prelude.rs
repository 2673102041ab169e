//! Convenient re-exports of commonly used types from the catalog crates.
//!
//! ```ignore
//! use catalog::prelude::*;
//! ```

pub use catalog_core::{
    backend::{StoreBackend, StoreBackendBuilder, Update},
    collection::Collection,
    document::Resource,
    error::{ResourceError, ResourceResult, StoreError, StoreResult},
    handler::{Outcome, ResourceHandler, ResourceOperation},
    query::{Expr, FieldOp, Filter, Projection, Query, QueryBuilder, QueryVisitor, Sort, SortDirection},
    translate::{QueryParams, translate},
};

pub use crate::{config::Config, router::router, server::Server, state::AppState};
