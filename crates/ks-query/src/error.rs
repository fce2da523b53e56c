//! Error types for the ks-query crate.

use thiserror::Error;

/// Returned when a query kind name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown query kind '{name}' (expected one of: {expected})")]
pub struct QueryKindError {
    /// The name that failed to parse.
    pub name: String,
    /// Comma-separated list of accepted names.
    pub expected: String,
}
