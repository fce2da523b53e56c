//! Persisted project parameters.

use std::path::{Path, PathBuf};

use ks_config::ProjectConfig;

/// Everything needed to create or reopen a project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    /// Directory holding the project file.
    pub project_path: PathBuf,
    /// Display name.
    pub name: String,
    /// Root of the source tree.
    pub root_path: String,
    /// Passed verbatim to the engine's `open`.
    pub engine_string: String,
    /// Passed verbatim to the code base's `load`.
    pub codebase_string: String,
}

impl Params {
    /// Combines a project directory with the contents of its project file.
    pub fn from_config(project_path: &Path, config: ProjectConfig) -> Self {
        Self {
            project_path: project_path.to_path_buf(),
            name: config.name,
            root_path: config.root_path,
            engine_string: config.engine_string,
            codebase_string: config.codebase_string,
        }
    }

    /// The fields stored in the project file.
    pub fn to_config(&self) -> ProjectConfig {
        ProjectConfig {
            name: self.name.clone(),
            root_path: self.root_path.clone(),
            engine_string: self.engine_string.clone(),
            codebase_string: self.codebase_string.clone(),
        }
    }
}
