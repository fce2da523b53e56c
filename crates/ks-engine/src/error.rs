//! Error types for the ks-engine crate.

use std::{io, path::PathBuf};

use ks_query::QueryKind;
use thiserror::Error;

/// Errors raised while interpreting a source descriptor (`<root>[;<glob>,...]`).
#[derive(Debug, Error)]
pub enum SourceError {
    /// The descriptor did not name a root directory.
    #[error("source descriptor has no root directory")]
    EmptyRoot,

    /// The root directory does not exist or is not a directory.
    #[error("source root is not a directory: {path}")]
    RootNotFound {
        /// The missing root.
        path: PathBuf,
    },

    /// A file pattern could not be compiled.
    #[error("invalid file pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Underlying glob error.
        source: globset::Error,
    },
}

/// Errors that prevent an engine operation from starting.
///
/// An `EngineError` returned from [`Engine::query`](crate::Engine::query) or
/// [`Engine::build`](crate::Engine::build) means the operation never began: no
/// connection callback will fire for that call.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine has not been opened.
    #[error("engine is not open")]
    NotOpen,

    /// The connection already carries an operation in flight.
    #[error("connection already has an operation in flight")]
    Busy,

    /// The backend cannot answer this kind of query.
    #[error("the {engine} engine does not support {kind} queries")]
    Unsupported {
        /// Backend name.
        engine: String,
        /// The rejected query kind.
        kind: QueryKind,
    },

    /// The query pattern was empty.
    #[error("query pattern is empty")]
    EmptyPattern,

    /// No backend is registered under this name.
    #[error("unknown engine '{name}' (available: {available})")]
    UnknownBackend {
        /// The requested name.
        name: String,
        /// Comma-separated list of registered backends.
        available: String,
    },

    /// A configuration parameter could not be applied.
    #[error("invalid value '{value}' for {engine} engine parameter '{key}'")]
    InvalidConfig {
        /// Backend name.
        engine: String,
        /// Parameter key.
        key: String,
        /// Rejected value.
        value: String,
    },

    /// The open string could not be interpreted.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The worker thread could not be started.
    #[error("failed to start engine worker: {0}")]
    Spawn(#[source] io::Error),
}

/// Errors raised while loading a codebase.
#[derive(Debug, Error)]
pub enum CodebaseError {
    /// The descriptor could not be interpreted.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// I/O error while reading the codebase.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
