//! Error types for projects.

use std::{io, path::PathBuf};

use ks_config::ConfigError;
use ks_engine::{CodebaseError, EngineError};
use thiserror::Error;

/// Errors raised by project operations.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// `open` was called before the project file was loaded.
    #[error("project parameters were not loaded")]
    NotLoaded,

    /// `create` was called on a project that is loaded or open.
    #[error("cannot overwrite an existing project")]
    Overwrite,

    /// The project directory could not be created.
    #[error("failed to create the directory {path}: {source}")]
    CreateDir {
        /// The directory.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A project file already exists where a new one would be written.
    #[error("cannot overwrite an existing project file {path}")]
    ConfigExists {
        /// The existing file.
        path: PathBuf,
    },

    /// The project file could not be read.
    #[error("failed to load project: {0}")]
    Load(#[source] ConfigError),

    /// The project file could not be written.
    #[error("failed to write project: {0}")]
    Write(#[source] ConfigError),

    /// The engine rejected its open string.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The code base rejected its descriptor.
    #[error(transparent)]
    Codebase(#[from] CodebaseError),
}
