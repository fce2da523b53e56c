//! The process-wide holder of the active project.

use std::{fmt, path::Path};

use tracing::info;

use crate::{Params, ProjectBase, ProjectError};

/// Broadcast by the [`ProjectManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectEvent {
    /// A project was opened (`true`) or closed (`false`).
    HasProject(bool),
    /// A rebuild of the active project was requested.
    BuildProject,
}

/// Builds an empty, unloaded project.
type Factory = Box<dyn Fn() -> Box<dyn ProjectBase>>;

/// Holds at most one open project.
///
/// Switching projects closes the old one (announcing `HasProject(false)`) before
/// the new one is opened and announced with `HasProject(true)`. Subscribers are
/// called synchronously, in subscription order.
pub struct ProjectManager {
    /// Creates project instances.
    factory: Factory,
    /// The open project.
    current: Option<Box<dyn ProjectBase>>,
    /// Event subscribers.
    listeners: Vec<Box<dyn FnMut(&ProjectEvent)>>,
}

impl ProjectManager {
    /// Creates a manager with no project; `factory` builds the project
    /// instances it opens.
    pub fn new(factory: impl Fn() -> Box<dyn ProjectBase> + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            current: None,
            listeners: Vec::new(),
        }
    }

    /// Registers an event callback.
    pub fn subscribe(&mut self, callback: impl FnMut(&ProjectEvent) + 'static) {
        self.listeners.push(Box::new(callback));
    }

    /// Opens the project stored under `project_path`, replacing the active one.
    ///
    /// A project file that cannot be read is reported before the active
    /// project is touched. If the new project fails to open, no project is
    /// active afterwards.
    pub fn open(&mut self, project_path: &Path) -> Result<(), ProjectError> {
        let mut project = (self.factory)();
        project.try_load(project_path)?;

        self.close();

        project.open()?;
        info!(
            name = %project.name(),
            path = %project_path.display(),
            "project opened"
        );
        self.current = Some(project);
        self.emit(ProjectEvent::HasProject(true));
        Ok(())
    }

    /// Creates a project and opens it.
    pub fn create(&mut self, params: Params) -> Result<(), ProjectError> {
        let project_path = params.project_path.clone();
        (self.factory)().create(params)?;
        info!(path = %project_path.display(), "project created");
        self.open(&project_path)
    }

    /// Closes the active project, if any.
    pub fn close(&mut self) {
        if let Some(mut project) = self.current.take() {
            project.close();
            info!(name = %project.name(), "project closed");
            self.emit(ProjectEvent::HasProject(false));
        }
    }

    /// Whether a project is active.
    pub fn has_project(&self) -> bool {
        self.current.is_some()
    }

    /// The active project.
    pub fn current(&self) -> Option<&dyn ProjectBase> {
        self.current.as_deref()
    }

    /// The active project, mutably.
    pub fn current_mut(&mut self) -> Option<&mut dyn ProjectBase> {
        self.current
            .as_mut()
            .map(|project| project.as_mut() as &mut dyn ProjectBase)
    }

    /// Asks subscribers to rebuild the active project.
    pub fn request_build(&mut self) {
        self.emit(ProjectEvent::BuildProject);
    }

    /// Delivers an event to every subscriber.
    fn emit(&mut self, event: ProjectEvent) {
        for listener in &mut self.listeners {
            listener(&event);
        }
    }
}

impl fmt::Debug for ProjectManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectManager")
            .field("current", &self.current.as_ref().map(|p| p.name().to_string()))
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
