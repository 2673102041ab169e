//! Error types and result types for store and resource operations.
//!
//! Two layers of errors live here:
//!
//! - [`StoreError`] is what a storage backend reports. Use [`StoreResult<T>`] as the
//!   return type for backend operations.
//! - [`ResourceError`] is the client-facing taxonomy produced by the resource handler.
//!   Every variant maps to exactly one HTTP status code and a stable error code.

use thiserror::Error;

/// Represents all possible errors that can occur when interacting with a document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Serialization/deserialization error when converting between document formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during store initialization or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// The document has an invalid structure for the requested operation.
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
    /// The store did not answer within the configured operation timeout.
    #[error("Store operation timed out after {0} ms")]
    Timeout(u128),
}

/// A specialized `Result` type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced to the caller of a resource operation.
///
/// None of these are retried internally. Malformed input maps to `400`, an absent
/// resource to `404` and an unreachable store to `503`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResourceError {
    /// The identifier is not a syntactically valid store identifier.
    #[error("Invalid resource id")]
    InvalidIdentifier(String),
    /// The identifier is well formed but no resource has it.
    #[error("Resource not found")]
    NotFound(String),
    /// One or more of the required create/replace fields are absent.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    /// A partial update carried no fields.
    #[error("Update payload must contain at least one field")]
    EmptyPayload,
    /// The request body is not a usable JSON object.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
    /// A recognized query parameter could not be interpreted.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    /// The store is unreachable, not yet connected, or timed out.
    #[error("Service unavailable: {0}")]
    DependencyUnavailable(String),
    /// The store returned something this layer cannot handle.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A specialized `Result` type for resource operations.
pub type ResourceResult<T> = Result<T, ResourceError>;

impl ResourceError {
    /// HTTP status code for this error.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidIdentifier(_)
            | Self::MissingFields(_)
            | Self::EmptyPayload
            | Self::InvalidPayload(_)
            | Self::InvalidQuery(_) => 400,
            Self::NotFound(_) => 404,
            Self::DependencyUnavailable(_) => 503,
            Self::Internal(_) => 500,
        }
    }

    /// Stable machine-readable code for this error.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier(_) => "INVALID_IDENTIFIER",
            Self::NotFound(_) => "NOT_FOUND",
            Self::MissingFields(_) => "MISSING_FIELDS",
            Self::EmptyPayload => "EMPTY_PAYLOAD",
            Self::InvalidPayload(_) => "INVALID_PAYLOAD",
            Self::InvalidQuery(_) => "INVALID_QUERY",
            Self::DependencyUnavailable(_) => "DEPENDENCY_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether this error is the server's fault rather than the client's.
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

impl From<StoreError> for ResourceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Backend(_) | StoreError::Initialization(_) | StoreError::Timeout(_) => {
                ResourceError::DependencyUnavailable(err.to_string())
            }
            StoreError::Serialization(_) | StoreError::InvalidDocument(_) => {
                ResourceError::Internal(err.to_string())
            }
        }
    }
}
