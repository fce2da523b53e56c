//! Shared context for running CLI commands.

use std::{
    env,
    path::{Path, PathBuf},
    process::ExitCode,
};

use ks_config::{Settings, settings_path};
use ks_engine::{Engine, EngineError, EngineRegistry, GrepEngine, SourceTree};
use ks_project::{Project, ProjectBase, ProjectManager};
use tracing::{debug, warn};

/// Project directory used when neither `-p` nor a remembered project applies.
pub const DEFAULT_PROJECT_DIR: &str = ".ks";

/// Command execution context built once per CLI invocation.
pub struct CommandContext {
    /// Current working directory.
    pub cwd: PathBuf,
    /// Loaded application settings (defaults if there is no settings file).
    pub settings: Settings,
    /// Where settings are saved, if a location is known.
    settings_path: Option<PathBuf>,
    /// Engine factory configured from the settings.
    registry: EngineRegistry,
}

impl CommandContext {
    /// Loads the current directory, the settings and the engine configuration.
    pub fn load() -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        let settings_path = settings_path();
        let settings = match &settings_path {
            Some(path) => Settings::load_from(path).map_err(|e| {
                eprintln!("error: failed to load settings: {e}");
                ExitCode::FAILURE
            })?,
            None => Settings::default(),
        };
        let registry = registry_or_failure(&settings)?;

        Ok(Self {
            cwd,
            settings,
            settings_path,
            registry,
        })
    }

    /// Makes a path absolute against the current directory.
    pub fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    /// Picks the project directory: the explicit one, else the last opened
    /// project, else `./.ks`.
    pub fn resolve_project_path(&self, explicit: Option<&Path>) -> PathBuf {
        match explicit {
            Some(path) => self.absolute(path),
            None => match &self.settings.session.last_project {
                Some(last) => last.clone(),
                None => self.cwd.join(DEFAULT_PROJECT_DIR),
            },
        }
    }

    /// A project manager whose projects use the default engine.
    pub fn manager(&self) -> ProjectManager {
        let registry = self.registry.clone();
        let engine = self.settings.defaults.engine.clone();
        ProjectManager::new(move || build_project(&registry, &engine))
    }

    /// A fresh, unopened project of the default engine type.
    pub fn new_project(&self) -> Box<dyn ProjectBase> {
        build_project(&self.registry, &self.settings.defaults.engine)
    }

    /// Opens the project selected by `explicit`, exiting with an error if it
    /// cannot be opened.
    pub fn open_project(&mut self, explicit: Option<&Path>) -> Result<ProjectManager, ExitCode> {
        let path = self.resolve_project_path(explicit);
        let mut manager = self.manager();
        if let Err(e) = manager.open(&path) {
            eprintln!("error: failed to open project {}: {e}", path.display());
            if explicit.is_none() {
                eprintln!("Run 'ks init' to create a project, or pass -p <dir>.");
            }
            return Err(ExitCode::FAILURE);
        }
        self.remember_project(&path);
        Ok(manager)
    }

    /// Records `path` as the last opened project. Failures are only logged.
    pub fn remember_project(&mut self, path: &Path) {
        let path = self.absolute(path);
        if self.settings.session.last_project.as_deref() == Some(path.as_path()) {
            return;
        }
        self.settings.session.last_project = Some(path);

        let Some(settings_path) = &self.settings_path else {
            debug!("no settings location, session not saved");
            return;
        };
        if let Err(e) = self.settings.save_to(settings_path) {
            warn!(error = %e, "could not save session");
        }
    }
}

/// Returns the current working directory or exits with a consistent error.
fn current_dir_or_failure() -> Result<PathBuf, ExitCode> {
    env::current_dir().map_err(|e| {
        eprintln!("error: could not determine current directory: {e}");
        ExitCode::FAILURE
    })
}

/// Builds an unloaded project over the named engine.
///
/// The engine name is validated when the context is loaded, so the grep
/// fallback only applies to registries that skipped that check.
fn build_project(registry: &EngineRegistry, engine: &str) -> Box<dyn ProjectBase> {
    let engine: Box<dyn Engine> = match registry.create(engine) {
        Ok(engine) => engine,
        Err(e) => {
            warn!(engine = %engine, error = %e, "falling back to an unconfigured grep engine");
            Box::new(GrepEngine::new())
        }
    };
    Box::new(Project::new(engine, SourceTree::new()))
}

/// Builds the engine registry from the settings' engine groups.
fn registry_or_failure(settings: &Settings) -> Result<EngineRegistry, ExitCode> {
    let mut registry = EngineRegistry::new();
    for (engine, params) in &settings.engines {
        match registry.configure(engine, params.clone()) {
            Ok(()) => {}
            Err(EngineError::UnknownBackend { name, .. }) => {
                warn!(engine = %name, "settings configure an unknown engine");
            }
            Err(e) => {
                eprintln!("error: invalid engine settings: {e}");
                return Err(ExitCode::FAILURE);
            }
        }
    }

    if let Err(e) = registry.create(&settings.defaults.engine) {
        eprintln!("error: invalid default engine: {e}");
        return Err(ExitCode::FAILURE);
    }
    Ok(registry)
}
