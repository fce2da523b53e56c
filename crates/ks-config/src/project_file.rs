//! The per-project configuration file.

use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Name of the project file inside a project directory.
pub const PROJECT_FILENAME: &str = "project.toml";

/// The `[Project]` group of a project file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectConfig {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Root of the source tree.
    #[serde(default = "default_root_path")]
    pub root_path: String,
    /// Passed verbatim to the engine's `open`.
    #[serde(default)]
    pub engine_string: String,
    /// Passed verbatim to the code base's `load`.
    #[serde(default)]
    pub codebase_string: String,
}

/// Root path used when a project file does not set one.
fn default_root_path() -> String {
    "/".to_string()
}

/// On-disk layout of a project file.
#[derive(Debug, Serialize, Deserialize)]
struct ProjectFile {
    /// The single group.
    #[serde(rename = "Project")]
    project: ProjectConfig,
}

/// Reads the `[Project]` group from a project file.
pub fn read_project_file(path: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let file: ProjectFile = toml::from_str(&content).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(file.project)
}

/// Writes a new project file. Fails without touching the file if it exists.
pub fn write_project_file(path: &Path, config: &ProjectConfig) -> Result<(), ConfigError> {
    let content = toml::to_string(&ProjectFile {
        project: config.clone(),
    })?;

    let write_err = |source| ConfigError::WriteFile {
        path: path.to_path_buf(),
        source,
    };
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(ConfigError::AlreadyExists {
                path: path.to_path_buf(),
            });
        }
        Err(e) => return Err(write_err(e)),
    };
    file.write_all(content.as_bytes()).map_err(write_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProjectConfig {
        ProjectConfig {
            name: "kernel".into(),
            root_path: "/src/linux".into(),
            engine_string: "/src/linux;*.c,*.h".into(),
            codebase_string: "/src/linux".into(),
        }
    }

    #[test]
    fn writes_a_project_group() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROJECT_FILENAME);
        write_project_file(&path, &sample()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("[Project]"));
        assert!(content.contains("Name = \"kernel\""));
        assert!(content.contains("EngineString = "));
        assert_eq!(read_project_file(&path).unwrap(), sample());
    }

    #[test]
    fn refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROJECT_FILENAME);
        fs::write(&path, "keep me").unwrap();

        let err = write_project_file(&path, &sample()).unwrap_err();
        assert!(matches!(err, ConfigError::AlreadyExists { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "keep me");
    }

    #[test]
    fn root_path_defaults_to_filesystem_root() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROJECT_FILENAME);
        fs::write(&path, "[Project]\nName = \"x\"\n").unwrap();

        let config = read_project_file(&path).unwrap();
        assert_eq!(config.root_path, "/");
        assert_eq!(config.engine_string, "");
    }

    #[test]
    fn name_defaults_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROJECT_FILENAME);
        fs::write(&path, "[Project]\nEngineString = \"/src\"\n").unwrap();

        let config = read_project_file(&path).unwrap();
        assert_eq!(config.name, "");
        assert_eq!(config.engine_string, "/src");
    }

    #[test]
    fn missing_and_malformed_files_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROJECT_FILENAME);
        assert!(matches!(
            read_project_file(&path),
            Err(ConfigError::ReadFile { .. })
        ));

        fs::write(&path, "[Project\nName=").unwrap();
        assert!(matches!(
            read_project_file(&path),
            Err(ConfigError::ParseToml { .. })
        ));
    }
}
