//! Projects for ks.
//!
//! A [`Project`] pairs one engine with one code base under a name and a root
//! path, persisted in a project file. The [`ProjectManager`] holds at most one
//! open project and tells subscribers when that changes.

#![warn(missing_docs)]

mod error;
mod manager;
mod params;
mod project;

pub use error::ProjectError;
pub use manager::{ProjectEvent, ProjectManager};
pub use params::Params;
pub use project::{Project, ProjectBase};
