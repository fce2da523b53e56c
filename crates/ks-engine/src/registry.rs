//! Backend selection by name.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::{Engine, EngineError, GrepEngine, GrepSettings};

/// Configuration parameters for one engine type.
pub type KeyValuePairs = BTreeMap<String, String>;

/// Creates engines by backend name, applying the per-engine configuration
/// loaded at process start.
#[derive(Debug, Clone, Default)]
pub struct EngineRegistry {
    /// Parameters keyed by backend name.
    configs: HashMap<String, KeyValuePairs>,
}

impl EngineRegistry {
    /// Names of the backends this registry can create.
    pub const BACKENDS: &'static [&'static str] = &[GrepEngine::NAME];

    /// Creates a registry with no configuration applied.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies configuration parameters to a backend.
    ///
    /// The parameters are validated immediately, so a bad value is reported at
    /// startup rather than when the first project opens.
    pub fn configure(&mut self, name: &str, params: KeyValuePairs) -> Result<(), EngineError> {
        match name {
            GrepEngine::NAME => {
                GrepSettings::from_params(&params)?;
            }
            _ => return Err(unknown_backend(name)),
        }

        debug!(engine = name, params = params.len(), "engine configured");
        self.configs.insert(name.to_string(), params);
        Ok(())
    }

    /// Returns the parameters applied to a backend, if any.
    pub fn config(&self, name: &str) -> Option<&KeyValuePairs> {
        self.configs.get(name)
    }

    /// Creates an unopened engine of the named backend.
    pub fn create(&self, name: &str) -> Result<Box<dyn Engine>, EngineError> {
        let empty = KeyValuePairs::new();
        let params = self.configs.get(name).unwrap_or(&empty);

        match name {
            GrepEngine::NAME => Ok(Box::new(GrepEngine::with_settings(
                GrepSettings::from_params(params)?,
            ))),
            _ => Err(unknown_backend(name)),
        }
    }
}

/// Builds the error for a name no backend is registered under.
fn unknown_backend(name: &str) -> EngineError {
    EngineError::UnknownBackend {
        name: name.to_string(),
        available: EngineRegistry::BACKENDS.join(", "),
    }
}
