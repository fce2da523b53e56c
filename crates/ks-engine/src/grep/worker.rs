//! Background jobs run by the `grep` engine.

use std::{
    fs,
    mem,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use ks_query::{Location, LocationList};
use tracing::{debug, trace, warn};

use super::{manifest::FileManifest, matcher::Matcher};
use crate::{Emitter, SourceSpec};

/// Progress label while a build walks the source tree.
const SCANNING: &str = "Scanning source files";

/// Progress label while a query reads files.
const SEARCHING: &str = "Searching";

/// File list shared between the engine and its build jobs.
pub(super) type FileCache = Arc<RwLock<Option<Arc<Vec<PathBuf>>>>>;

/// Returns the cached file list, if a build has completed.
pub(super) fn cached_files(cache: &FileCache) -> Option<Arc<Vec<PathBuf>>> {
    cache.read().ok().and_then(|files| files.clone())
}

/// A query running on a worker thread.
pub(super) struct QueryJob {
    /// The corpus to search.
    pub(super) source: SourceSpec,
    /// Files from the last build, used instead of walking the tree.
    pub(super) cached: Option<Arc<Vec<PathBuf>>>,
    /// What to look for.
    pub(super) matcher: Matcher,
    /// Locations per delivered batch.
    pub(super) batch_size: usize,
    /// Result cap (0 = unlimited).
    pub(super) max_results: usize,
}

impl QueryJob {
    /// Searches every file, streaming matches through `emitter`.
    pub(super) fn run(self, emitter: Emitter) {
        let files = match self.cached {
            Some(ref files) => Arc::clone(files),
            None => Arc::new(self.source.discover()),
        };
        let total = files.len();
        debug!(files = total, cached = self.cached.is_some(), "grep query started");

        let mut batch = LocationList::with_capacity(self.batch_size);
        let mut found = 0usize;

        for (index, path) in files.iter().enumerate() {
            if !emitter.progress(SEARCHING, index, total) {
                emitter.abort();
                return;
            }

            let before = batch.len();
            if self.matcher.scans_lines() {
                self.scan_file(path, &mut batch);
            } else if self.matcher.match_path(self.relative(path)) {
                batch.push(
                    Location::new(path.clone(), 0)
                        .with_text(self.relative(path).to_string_lossy()),
                );
            }
            found += batch.len() - before;

            let capped = self.max_results > 0 && found >= self.max_results;
            if capped {
                batch.truncate(batch.len() - (found - self.max_results));
            }
            if (capped || batch.len() >= self.batch_size) && !emitter.data(mem::take(&mut batch))
            {
                emitter.abort();
                return;
            }
            if capped {
                debug!(max_results = self.max_results, "grep query hit the result cap");
                break;
            }
        }

        if !emitter.data(batch) || !emitter.progress(SEARCHING, total, total) {
            emitter.abort();
            return;
        }
        emitter.finish();
    }

    /// Appends the matching lines of one file.
    fn scan_file(&self, path: &Path, batch: &mut LocationList) {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "skipping unreadable file");
                return;
            }
        };
        let text = String::from_utf8_lossy(&bytes);

        for (number, line) in text.lines().enumerate() {
            if let Some(column) = self.matcher.match_line(line) {
                let line_number = u32::try_from(number + 1).unwrap_or(u32::MAX);
                trace!(path = %path.display(), line = line_number, "match");
                batch.push(
                    Location::new(path.to_path_buf(), line_number)
                        .with_column(column)
                        .with_text(line.trim()),
                );
            }
        }
    }

    /// A path relative to the corpus root.
    fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(self.source.root()).unwrap_or(path)
    }
}

/// A rebuild of the file list running on a worker thread.
pub(super) struct BuildJob {
    /// The corpus to scan.
    pub(super) source: SourceSpec,
    /// Where the resulting list is stored.
    pub(super) cache: FileCache,
    /// File the list is persisted to, if any.
    pub(super) manifest: Option<PathBuf>,
}

impl BuildJob {
    /// Walks the corpus and replaces the cached file list, and the manifest
    /// when one is configured.
    ///
    /// A stopped or failed build leaves the previous list in place.
    pub(super) fn run(self, emitter: Emitter) {
        if !emitter.progress(SCANNING, 0, 0) {
            emitter.abort();
            return;
        }

        let mut files = Vec::new();
        for path in self.source.walk() {
            if emitter.is_stopped() {
                debug!(scanned = files.len(), "grep build stopped");
                emitter.abort();
                return;
            }
            files.push(path);
            if !emitter.progress(SCANNING, files.len(), 0) {
                emitter.abort();
                return;
            }
        }

        let count = files.len();
        if let Some(path) = &self.manifest {
            let manifest = FileManifest {
                root: self.source.root().to_path_buf(),
                files,
            };
            if let Err(e) = manifest.save(path) {
                warn!(manifest = %path.display(), error = %e, "could not write build manifest");
                emitter.abort();
                return;
            }
            files = manifest.files;
        }

        match self.cache.write() {
            Ok(mut cache) => *cache = Some(Arc::new(files)),
            Err(_) => {
                debug!("file cache lock poisoned");
                emitter.abort();
                return;
            }
        }
        debug!(files = count, "grep build finished");

        if !emitter.progress(SCANNING, count, count) {
            emitter.abort();
            return;
        }
        emitter.finish();
    }
}
