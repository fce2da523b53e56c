//! Query and location value types for ks.
//!
//! A [`Query`] describes one search request against an engine: what kind of
//! lookup to perform and the pattern to look for. Engines answer with batches of
//! [`Location`]s, each pointing at a place in the indexed source.
//!
//! # Example
//!
//! ```
//! use ks_query::{Query, QueryKind};
//!
//! let query = Query::new("def".parse().unwrap(), "main");
//! assert_eq!(query.kind, QueryKind::Definition);
//! assert_eq!(query.to_string(), "Definition: main");
//! ```

#![warn(missing_docs)]

mod error;
mod kind;
mod location;

use std::fmt;

pub use error::QueryKindError;
pub use kind::QueryKind;
pub use location::{Location, LocationList};
use serde::{Deserialize, Serialize};

/// A single search request: a lookup kind plus the pattern to look for.
///
/// Queries are plain values. Two queries are the same query if their kind and
/// pattern are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query {
    /// What kind of lookup to perform.
    pub kind: QueryKind,
    /// The symbol, text or file name to look for.
    pub pattern: String,
}

impl Query {
    /// Creates a query of the given kind.
    pub fn new(kind: QueryKind, pattern: impl Into<String>) -> Self {
        Self {
            kind,
            pattern: pattern.into(),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.pattern)
    }
}
