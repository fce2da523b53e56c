//! Source descriptors and file discovery.
//!
//! Both the `grep` engine and the [`SourceTree`](crate::SourceTree) codebase are
//! configured with a descriptor of the form `<root>[;<glob>,<glob>...]`. Walking a
//! descriptor yields the regular, non-hidden, non-binary files under the root that
//! match at least one glob (or every such file when no globs are given).

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
};

use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::SourceError;

/// A parsed `<root>[;<glob>,...]` descriptor.
#[derive(Debug, Clone)]
pub struct SourceSpec {
    /// Directory to walk.
    root: PathBuf,
    /// Glob patterns as written.
    patterns: Vec<String>,
    /// Compiled patterns, `None` when every file is accepted.
    globs: Option<GlobSet>,
}

impl SourceSpec {
    /// Parses a descriptor. Does not touch the filesystem.
    pub fn parse(descriptor: &str) -> Result<Self, SourceError> {
        let (root, patterns) = match descriptor.split_once(';') {
            Some((root, patterns)) => (root.trim(), patterns),
            None => (descriptor.trim(), ""),
        };

        if root.is_empty() {
            return Err(SourceError::EmptyRoot);
        }

        let patterns: Vec<String> = patterns
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect();

        let globs = if patterns.is_empty() {
            None
        } else {
            let mut builder = GlobSetBuilder::new();
            for pattern in &patterns {
                let glob = Glob::new(pattern).map_err(|source| SourceError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })?;
                builder.add(glob);
            }
            Some(
                builder
                    .build()
                    .map_err(|source| SourceError::InvalidPattern {
                        pattern: patterns.join(","),
                        source,
                    })?,
            )
        };

        Ok(Self {
            root: PathBuf::from(root),
            patterns,
            globs,
        })
    }

    /// Parses a descriptor and checks that its root is an existing directory.
    pub fn parse_existing(descriptor: &str) -> Result<Self, SourceError> {
        let spec = Self::parse(descriptor)?;
        if !spec.root.is_dir() {
            return Err(SourceError::RootNotFound { path: spec.root });
        }
        Ok(spec)
    }

    /// Root directory of the corpus.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Glob patterns restricting the corpus (empty means all files).
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether a file under the root belongs to the corpus.
    pub fn accepts(&self, path: &Path) -> bool {
        let Ok(rel) = path.strip_prefix(&self.root) else {
            return false;
        };
        if is_binary_file(path) {
            return false;
        }
        self.globs.as_ref().is_none_or(|globs| globs.is_match(rel))
    }

    /// Walks the corpus in file-name order, lazily.
    ///
    /// Hidden entries (names starting with '.') below the root are skipped, as
    /// are symlinks and unreadable entries.
    pub fn walk(&self) -> impl Iterator<Item = PathBuf> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()))
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|path| self.accepts(path))
    }

    /// Collects every file of the corpus.
    pub fn discover(&self) -> Vec<PathBuf> {
        self.walk().collect()
    }
}

/// Checks if a filename represents a hidden file (starts with '.').
fn is_hidden(name: &OsStr) -> bool {
    name.to_str().is_some_and(|s| s.starts_with('.'))
}

/// Checks if a file is likely binary based on extension.
fn is_binary_file(path: &Path) -> bool {
    const BINARY_EXTENSIONS: &[&str] = &[
        // Objects and archives
        "o", "obj", "a", "lib", "so", "dylib", "dll", "exe", "out", "ko", "rlib", "class", "jar",
        "pyc", "zip", "tar", "gz", "bz2", "xz", "zst", "7z", // Images and documents
        "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "pdf", // Databases
        "db", "sqlite",
    ];

    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| BINARY_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}
