//! Application settings: session state, defaults and engine parameters.

use std::{
    collections::BTreeMap,
    env, fs,
    path::{Path, PathBuf},
};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use toml::{Table, Value, de};
use tracing::{debug, warn};

use crate::ConfigError;

/// The settings filename in the home directory.
pub const SETTINGS_FILENAME: &str = ".ks.toml";

/// Environment variable naming an alternative settings file.
pub const SETTINGS_ENV: &str = "KS_SETTINGS";

/// Prefix of the tables holding per-engine parameters.
pub const ENGINE_GROUP_PREFIX: &str = "Engine_";

/// Returns the settings file path: `$KS_SETTINGS` if set, else `~/.ks.toml`.
///
/// Returns `None` if neither is available.
pub fn settings_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os(SETTINGS_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    BaseDirs::new().map(|dirs| dirs.home_dir().join(SETTINGS_FILENAME))
}

/// Session state restored at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    /// Project directory opened last.
    pub last_project: Option<PathBuf>,
}

/// Defaults for new projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Engine backend name.
    pub engine: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            engine: "grep".to_string(),
        }
    }
}

/// Parsed application settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// `[session]` group.
    pub session: Session,
    /// `[defaults]` group.
    pub defaults: Defaults,
    /// `[Engine_<name>]` groups keyed by engine name, values flattened to strings.
    pub engines: BTreeMap<String, BTreeMap<String, String>>,
}

impl Settings {
    /// Loads settings from a file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses settings from TOML text.
    pub fn parse(content: &str) -> Result<Self, de::Error> {
        let table: Table = toml::from_str(content)?;
        let mut settings = Self::default();

        for (key, value) in table {
            match key.as_str() {
                "session" => settings.session = value.try_into()?,
                "defaults" => settings.defaults = value.try_into()?,
                _ => match key.strip_prefix(ENGINE_GROUP_PREFIX) {
                    Some(engine) if !engine.is_empty() => {
                        let params = flatten_group(&key, value);
                        settings.engines.insert(engine.to_string(), params);
                    }
                    _ => warn!(group = %key, "ignoring unknown settings group"),
                },
            }
        }

        Ok(settings)
    }

    /// Parameters for an engine, empty if it has no group.
    pub fn engine_params(&self, engine: &str) -> BTreeMap<String, String> {
        self.engines.get(engine).cloned().unwrap_or_default()
    }

    /// Renders the settings as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        let mut table = Table::new();
        table.insert("session".into(), Value::try_from(&self.session)?);
        table.insert("defaults".into(), Value::try_from(&self.defaults)?);
        for (engine, params) in &self.engines {
            let group: Table = params
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            table.insert(format!("{ENGINE_GROUP_PREFIX}{engine}"), Value::Table(group));
        }
        Ok(toml::to_string(&table)?)
    }

    /// Writes the settings to a file, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_toml()?;
        let write_err = |source| ConfigError::WriteFile {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, content).map_err(write_err)
    }
}

/// Flattens an engine group's scalar values into strings.
fn flatten_group(group: &str, value: Value) -> BTreeMap<String, String> {
    let Value::Table(table) = value else {
        warn!(group, "engine group is not a table, ignoring");
        return BTreeMap::new();
    };

    table
        .into_iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Integer(i) => i.to_string(),
                Value::Float(f) => f.to_string(),
                Value::Boolean(b) => b.to_string(),
                Value::Datetime(d) => d.to_string(),
                Value::Array(_) | Value::Table(_) => {
                    warn!(group, key = %key, "ignoring non-scalar engine parameter");
                    return None;
                }
            };
            Some((key, text))
        })
        .collect()
}
