//! The code base a project indexes.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{CodebaseError, SourceSpec};

/// The indexed set of source files.
///
/// `descriptor` is an implementation-specific string, forwarded verbatim from
/// the project configuration.
pub trait Codebase {
    /// Loads the code base.
    fn load(&mut self, descriptor: &str) -> Result<(), CodebaseError>;
}

impl<C: Codebase + ?Sized> Codebase for Box<C> {
    fn load(&mut self, descriptor: &str) -> Result<(), CodebaseError> {
        (**self).load(descriptor)
    }
}

/// A code base made of the files under a directory, optionally filtered by globs.
///
/// Uses the same `<root>[;<glob>,...]` descriptor as the `grep` engine.
#[derive(Debug, Clone, Default)]
pub struct SourceTree {
    /// The loaded descriptor.
    spec: Option<SourceSpec>,
    /// Files discovered when the code base was loaded.
    files: Vec<PathBuf>,
}

impl SourceTree {
    /// Creates an empty, unloaded code base.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether [`load`](Codebase::load) succeeded.
    pub fn is_loaded(&self) -> bool {
        self.spec.is_some()
    }

    /// Root directory, once loaded.
    pub fn root(&self) -> Option<&Path> {
        self.spec.as_ref().map(SourceSpec::root)
    }

    /// Files found at load time, in walk order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

impl Codebase for SourceTree {
    fn load(&mut self, descriptor: &str) -> Result<(), CodebaseError> {
        let spec = SourceSpec::parse_existing(descriptor)?;
        let files = spec.discover();
        debug!(root = %spec.root().display(), files = files.len(), "code base loaded");

        self.files = files;
        self.spec = Some(spec);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;
    use crate::SourceError;

    #[test]
    fn load_lists_matching_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.c"), "").unwrap();
        fs::write(temp.path().join("b.txt"), "").unwrap();

        let mut tree = SourceTree::new();
        tree.load(&format!("{};*.c", temp.path().display()))
            .unwrap();

        assert!(tree.is_loaded());
        assert_eq!(tree.root(), Some(temp.path()));
        assert_eq!(tree.files(), &[temp.path().join("a.c")]);
    }

    #[test]
    fn load_fails_for_missing_root_and_stays_unloaded() {
        let temp = TempDir::new().unwrap();
        let mut tree = SourceTree::new();
        let err = tree
            .load(temp.path().join("missing").to_str().unwrap())
            .unwrap_err();

        assert!(matches!(
            err,
            CodebaseError::Source(SourceError::RootNotFound { .. })
        ));
        assert!(!tree.is_loaded());
    }
}
