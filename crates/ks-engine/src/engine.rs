//! The engine trait implemented by every backend.

use ks_query::Query;

use crate::{Connection, EngineError};

/// A pluggable backend that indexes a source corpus and answers queries.
///
/// `query` and `build` only validate their input and start the work; they
/// return as soon as the operation is running. Results, progress and completion
/// arrive later through the [`Connection`]. An `Err` means the operation never
/// began and no callback will fire for it.
pub trait Engine {
    /// Name of the backend, as used by the [`EngineRegistry`](crate::EngineRegistry).
    fn name(&self) -> &str;

    /// Makes the engine available for querying.
    ///
    /// `open_string` is an implementation-specific descriptor, forwarded
    /// verbatim from the project configuration.
    fn open(&mut self, open_string: &str) -> Result<(), EngineError>;

    /// Starts a query.
    fn query(&self, conn: &mut Connection, query: &Query) -> Result<(), EngineError>;

    /// Starts a (re)build of the engine's index.
    fn build(&self, conn: &mut Connection) -> Result<(), EngineError>;
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn open(&mut self, open_string: &str) -> Result<(), EngineError> {
        (**self).open(open_string)
    }

    fn query(&self, conn: &mut Connection, query: &Query) -> Result<(), EngineError> {
        (**self).query(conn, query)
    }

    fn build(&self, conn: &mut Connection) -> Result<(), EngineError> {
        (**self).build(conn)
    }
}
