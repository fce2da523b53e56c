//! Integration tests for ks-config.
//!
//! Exercises project files and settings files together the way a session does:
//! create a project, remember it, reload both.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use std::{fs, path::Path};

use ks_config::{
    ConfigError, PROJECT_FILENAME, ProjectConfig, Settings, read_project_file,
    write_project_file,
};

/// Test helper owning a temporary directory.
struct TestEnv {
    root: tempfile::TempDir,
}

impl TestEnv {
    fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.root.path()
    }
}

fn project(name: &str, root: &Path) -> ProjectConfig {
    ProjectConfig {
        name: name.to_string(),
        root_path: root.display().to_string(),
        engine_string: root.display().to_string(),
        codebase_string: root.display().to_string(),
    }
}

#[test]
fn session_remembers_the_last_project() {
    let env = TestEnv::new();
    let project_dir = env.path().join("proj");
    fs::create_dir_all(&project_dir).unwrap();
    write_project_file(
        &project_dir.join(PROJECT_FILENAME),
        &project("demo", env.path()),
    )
    .unwrap();

    let settings_file = env.path().join("settings.toml");
    let mut settings = Settings::load_from(&settings_file).unwrap();
    settings.session.last_project = Some(project_dir.clone());
    settings.save_to(&settings_file).unwrap();

    let restored = Settings::load_from(&settings_file).unwrap();
    let last = restored.session.last_project.unwrap();
    let config = read_project_file(&last.join(PROJECT_FILENAME)).unwrap();
    assert_eq!(config.name, "demo");
}

#[test]
fn second_write_leaves_the_first_project_intact() {
    let env = TestEnv::new();
    let path = env.path().join(PROJECT_FILENAME);

    write_project_file(&path, &project("first", env.path())).unwrap();
    let err = write_project_file(&path, &project("second", env.path())).unwrap_err();

    assert!(matches!(err, ConfigError::AlreadyExists { .. }));
    assert_eq!(read_project_file(&path).unwrap().name, "first");
}

#[test]
fn malformed_settings_report_the_path() {
    let env = TestEnv::new();
    let path = env.path().join("settings.toml");
    fs::write(&path, "[session\n").unwrap();

    let err = Settings::load_from(&path).unwrap_err();
    assert!(matches!(&err, ConfigError::ParseToml { path: p, .. } if p == &path));
    assert!(err.to_string().contains("settings.toml"));
}

#[test]
fn unknown_groups_are_ignored() {
    let env = TestEnv::new();
    let path = env.path().join("settings.toml");
    fs::write(
        &path,
        "[window]\nwidth = 800\n\n[Engine_grep]\nmax_results = 5\n",
    )
    .unwrap();

    let settings = Settings::load_from(&path).unwrap();
    assert_eq!(settings.engines.len(), 1);
    assert_eq!(
        settings.engine_params("grep").get("max_results").map(String::as_str),
        Some("5")
    );
}
