//! A project: one engine and one code base bound to a project file.

use std::{fs, path::Path};

use ks_config::{ConfigError, PROJECT_FILENAME, read_project_file, write_project_file};
use ks_engine::{Codebase, Engine};
use tracing::{debug, warn};

use crate::{Params, ProjectError};

/// Object-safe view of a project, used where the engine and code base types are
/// not known statically.
pub trait ProjectBase {
    /// Reads the project file under `project_path`.
    ///
    /// A missing or unreadable file is not an error: the project simply stays
    /// unloaded, as it is for a project about to be created.
    fn load(&mut self, project_path: &Path) -> bool {
        match self.try_load(project_path) {
            Ok(()) => true,
            Err(ProjectError::Load(ConfigError::ReadFile { path, source })) => {
                debug!(path = %path.display(), error = %source, "project file not loaded");
                false
            }
            Err(e) => {
                warn!(error = %e, "project file not loaded");
                false
            }
        }
    }

    /// Reads the project file under `project_path`, reporting why it failed.
    fn try_load(&mut self, project_path: &Path) -> Result<(), ProjectError>;

    /// Opens the engine and loads the code base. Does nothing if already open.
    fn open(&mut self) -> Result<(), ProjectError>;

    /// Writes a new project file. The project is neither opened nor marked
    /// loaded; reload it to use it.
    fn create(&mut self, params: Params) -> Result<(), ProjectError>;

    /// Marks the project closed. The engine and code base are kept.
    fn close(&mut self);

    /// Whether the project file was read.
    fn is_loaded(&self) -> bool;

    /// Whether the project is open.
    fn is_open(&self) -> bool;

    /// The in-memory parameters.
    fn params(&self) -> &Params;

    /// The project's display name.
    fn name(&self) -> &str {
        &self.params().name
    }

    /// The root of the project's source tree.
    fn root_path(&self) -> &str {
        &self.params().root_path
    }

    /// The project's engine.
    fn engine(&self) -> &dyn Engine;

    /// The project's code base.
    fn codebase(&self) -> &dyn Codebase;
}

/// A project over concrete engine and code base types.
///
/// `loaded` and `open` are independent flags; `open` implies `loaded`.
#[derive(Debug)]
pub struct Project<E, C> {
    /// File name of the project file inside the project directory.
    config_file_name: String,
    /// The engine.
    engine: E,
    /// The code base.
    codebase: C,
    /// Parameters read from or written to the project file.
    params: Params,
    /// Whether the project file was read.
    loaded: bool,
    /// Whether the engine and code base were opened.
    open: bool,
}

impl<E: Engine, C: Codebase> Project<E, C> {
    /// Creates an unloaded project using the standard project file name.
    pub fn new(engine: E, codebase: C) -> Self {
        Self::with_config_file_name(PROJECT_FILENAME, engine, codebase)
    }

    /// Creates an unloaded project whose file is called `config_file_name`.
    pub fn with_config_file_name(
        config_file_name: impl Into<String>,
        engine: E,
        codebase: C,
    ) -> Self {
        Self {
            config_file_name: config_file_name.into(),
            engine,
            codebase,
            params: Params::default(),
            loaded: false,
            open: false,
        }
    }

    /// A copy of the in-memory parameters, whether or not the project is open.
    pub fn get_current_params(&self) -> Params {
        self.params.clone()
    }

    /// The engine, typed.
    pub fn engine_ref(&self) -> &E {
        &self.engine
    }

    /// The code base, typed.
    pub fn codebase_ref(&self) -> &C {
        &self.codebase
    }
}

impl<E: Engine, C: Codebase> ProjectBase for Project<E, C> {
    fn try_load(&mut self, project_path: &Path) -> Result<(), ProjectError> {
        let config = read_project_file(&project_path.join(&self.config_file_name))
            .map_err(ProjectError::Load)?;
        self.params = Params::from_config(project_path, config);
        self.loaded = true;
        debug!(
            path = %project_path.display(),
            name = %self.params.name,
            "project loaded"
        );
        Ok(())
    }

    fn open(&mut self) -> Result<(), ProjectError> {
        if self.open {
            return Ok(());
        }
        if !self.loaded {
            return Err(ProjectError::NotLoaded);
        }

        self.engine.open(&self.params.engine_string)?;
        self.codebase.load(&self.params.codebase_string)?;

        self.open = true;
        debug!(
            engine_string = %self.params.engine_string,
            codebase_string = %self.params.codebase_string,
            "project opened"
        );
        Ok(())
    }

    fn create(&mut self, params: Params) -> Result<(), ProjectError> {
        if self.open || self.loaded {
            return Err(ProjectError::Overwrite);
        }

        let dir = &params.project_path;
        if !dir.is_dir() {
            fs::create_dir_all(dir).map_err(|source| ProjectError::CreateDir {
                path: dir.clone(),
                source,
            })?;
        }

        let path = dir.join(&self.config_file_name);
        if path.exists() {
            return Err(ProjectError::ConfigExists { path });
        }

        write_project_file(&path, &params.to_config()).map_err(|e| match e {
            ConfigError::AlreadyExists { path } => ProjectError::ConfigExists { path },
            other => ProjectError::Write(other),
        })?;
        debug!(path = %path.display(), name = %params.name, "project created");
        self.params = params;
        Ok(())
    }

    fn close(&mut self) {
        if self.open {
            debug!(name = %self.params.name, "project closed");
        }
        self.open = false;
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn params(&self) -> &Params {
        &self.params
    }

    fn engine(&self) -> &dyn Engine {
        &self.engine
    }

    fn codebase(&self) -> &dyn Codebase {
        &self.codebase
    }
}
