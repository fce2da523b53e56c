//! Engine protocol for ks.
//!
//! An [`Engine`] indexes a source corpus and answers [`Query`](ks_query::Query)s.
//! Engine operations run off the caller's call stack; results travel back through a
//! per-operation [`Connection`]:
//!
//! - The engine registers a [`Controlled`] cancellation target and receives an
//!   [`Emitter`] from [`Connection::begin`].
//! - The worker streams batches and progress through the emitter and ends with
//!   exactly one of [`Emitter::finish`] or [`Emitter::abort`].
//! - The owner of the connection pumps events with [`Connection::dispatch`] or
//!   [`Connection::wait`], which invoke the [`ConnectionHandler`] callbacks on the
//!   owner's thread.
//!
//! The crate also ships the `grep` backend, the [`SourceTree`] codebase and the
//! [`EngineRegistry`] used to pick a backend by name.
//!
//! # Example
//!
//! ```no_run
//! use ks_engine::{Connection, Engine, EngineRegistry};
//! use ks_query::{LocationList, Query, QueryKind};
//!
//! struct Print;
//!
//! impl ks_engine::ConnectionHandler for Print {
//!     fn on_data_ready(&mut self, batch: LocationList) {
//!         for loc in batch {
//!             println!("{}", loc.display_position());
//!         }
//!     }
//!     fn on_progress(&mut self, _text: &str, _current: usize, _total: usize) {}
//!     fn on_finished(&mut self) {}
//!     fn on_aborted(&mut self) {}
//! }
//!
//! let registry = EngineRegistry::new();
//! let mut engine = registry.create("grep").unwrap();
//! engine.open("./src").unwrap();
//!
//! let mut conn = Connection::new();
//! engine
//!     .query(&mut conn, &Query::new(QueryKind::Text, "TODO"))
//!     .unwrap();
//! conn.wait(&mut Print);
//! ```

#![warn(missing_docs)]

mod codebase;
mod connection;
mod controlled;
mod engine;
mod error;
mod grep;
mod registry;
mod source;

pub use codebase::{Codebase, SourceTree};
pub use connection::{Connection, ConnectionHandler, ConnectionState, Emitter, Outcome};
pub use controlled::{Controlled, StopToken};
pub use engine::Engine;
pub use error::{CodebaseError, EngineError, SourceError};
pub use grep::{GrepEngine, GrepSettings};
pub use registry::{EngineRegistry, KeyValuePairs};
pub use source::SourceSpec;
