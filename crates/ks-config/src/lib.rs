//! Configuration for ks.
//!
//! Two files are involved:
//!
//! - The **project file**, `<project>/project.toml`, holds one project's name,
//!   root path and the opaque strings handed to its engine and code base.
//! - The **settings file**, `~/.ks.toml` (or `$KS_SETTINGS`), holds application
//!   state: the last opened project, the default engine and per-engine
//!   parameters in `[Engine_<name>]` tables.

#![warn(missing_docs)]

mod error;
mod project_file;
mod settings;

pub use error::ConfigError;
pub use project_file::{PROJECT_FILENAME, ProjectConfig, read_project_file, write_project_file};
pub use settings::{
    ENGINE_GROUP_PREFIX, SETTINGS_ENV, SETTINGS_FILENAME, Settings, settings_path,
};
