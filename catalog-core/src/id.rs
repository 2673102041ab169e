//! Resource identifiers.
//!
//! Identifiers are the store's native ObjectId, exchanged with clients as the
//! 24-character lowercase hex string. Parsing is a purely syntactic check and never
//! touches the store.

use bson::oid::ObjectId;

use crate::error::{ResourceError, ResourceResult};

/// Name of the identifier field inside a stored document.
pub const ID_FIELD: &str = "_id";

/// Parses a client-supplied identifier.
///
/// Surrounding whitespace is not trimmed: `" 5f..."` is as malformed as `"xyz"`.
///
/// # Errors
///
/// Returns [`ResourceError::InvalidIdentifier`] unless `raw` is exactly 24 hex digits.
pub fn parse_id(raw: &str) -> ResourceResult<ObjectId> {
    ObjectId::parse_str(raw).map_err(|_| ResourceError::InvalidIdentifier(raw.to_string()))
}
