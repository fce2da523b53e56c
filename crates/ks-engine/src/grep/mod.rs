//! The `grep` backend: answers queries by scanning source files line by line.
//!
//! [`Engine::build`] rescans the source tree and caches the file list, which
//! later queries reuse; without a build, every query walks the tree itself. When
//! the open string names a manifest file, the list is also written there and
//! read back by the next [`Engine::open`].

mod manifest;
mod matcher;
mod worker;

use std::{
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
    thread,
};

use ks_query::Query;
use tracing::{debug, warn};

use crate::{Connection, Engine, EngineError, KeyValuePairs, SourceSpec, StopToken};
use manifest::FileManifest;
use matcher::Matcher;
use worker::{BuildJob, FileCache, QueryJob};

/// Tunables for the `grep` engine, read from the `Engine_grep` settings group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrepSettings {
    /// Number of locations per delivered batch.
    pub batch_size: usize,
    /// Stop after this many locations (0 = unlimited).
    pub max_results: usize,
    /// Whether text matching ignores ASCII case.
    pub ignore_case: bool,
}

impl Default for GrepSettings {
    fn default() -> Self {
        Self {
            batch_size: 64,
            max_results: 0,
            ignore_case: false,
        }
    }
}

impl GrepSettings {
    /// Builds settings from configuration parameters.
    ///
    /// Unknown keys are ignored with a warning; malformed values are errors.
    pub fn from_params(params: &KeyValuePairs) -> Result<Self, EngineError> {
        let mut settings = Self::default();

        for (key, value) in params {
            let invalid = || EngineError::InvalidConfig {
                engine: GrepEngine::NAME.to_string(),
                key: key.clone(),
                value: value.clone(),
            };

            match key.as_str() {
                "batch_size" => {
                    settings.batch_size = value.trim().parse().map_err(|_| invalid())?;
                    if settings.batch_size == 0 {
                        return Err(invalid());
                    }
                }
                "max_results" => {
                    settings.max_results = value.trim().parse().map_err(|_| invalid())?;
                }
                "ignore_case" => {
                    settings.ignore_case = value.trim().parse().map_err(|_| invalid())?;
                }
                _ => warn!(engine = GrepEngine::NAME, key = %key, "ignoring unknown engine parameter"),
            }
        }

        Ok(settings)
    }
}

/// Line-scanning engine over a source directory.
///
/// Open string: `<root>[;<glob>,<glob>...[;<manifest>]]`. Supports text,
/// reference, file and including-file queries.
#[derive(Debug, Default)]
pub struct GrepEngine {
    /// Tunables.
    settings: GrepSettings,
    /// The corpus, once opened.
    source: Option<SourceSpec>,
    /// Where builds record the file list.
    manifest: Option<PathBuf>,
    /// File list produced by the last successful build.
    files: FileCache,
}

impl GrepEngine {
    /// Registry name of this backend.
    pub const NAME: &'static str = "grep";

    /// File name projects use for the build manifest.
    pub const MANIFEST_FILENAME: &'static str = "grep-files.json";

    /// Builds an open string for `root` that records builds in `manifest`.
    pub fn open_string(root: &Path, manifest: &Path) -> String {
        format!("{};;{}", root.display(), manifest.display())
    }

    /// Creates an unopened engine with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an unopened engine with the given settings.
    pub fn with_settings(settings: GrepSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// The settings in effect.
    pub fn settings(&self) -> &GrepSettings {
        &self.settings
    }

    /// Returns the opened corpus or [`EngineError::NotOpen`].
    fn source(&self) -> Result<&SourceSpec, EngineError> {
        self.source.as_ref().ok_or(EngineError::NotOpen)
    }
}

impl Engine for GrepEngine {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn open(&mut self, open_string: &str) -> Result<(), EngineError> {
        let (descriptor, manifest) = manifest::split_open_string(open_string);
        let spec = SourceSpec::parse_existing(descriptor)?;
        let files = manifest
            .as_deref()
            .and_then(|path| load_manifest(path, spec.root()));
        debug!(
            root = %spec.root().display(),
            patterns = ?spec.patterns(),
            built = files.is_some(),
            "grep engine opened"
        );

        self.source = Some(spec);
        self.manifest = manifest;
        self.files = Arc::new(RwLock::new(files.map(Arc::new)));
        Ok(())
    }

    fn query(&self, conn: &mut Connection, query: &Query) -> Result<(), EngineError> {
        let source = self.source()?.clone();
        if query.pattern.trim().is_empty() {
            return Err(EngineError::EmptyPattern);
        }
        let matcher = Matcher::for_query(query, self.settings.ignore_case).ok_or_else(|| {
            EngineError::Unsupported {
                engine: Self::NAME.to_string(),
                kind: query.kind,
            }
        })?;

        let token = Arc::new(StopToken::new());
        let emitter = conn.begin(token)?;
        let job = QueryJob {
            source,
            cached: worker::cached_files(&self.files),
            matcher,
            batch_size: self.settings.batch_size,
            max_results: self.settings.max_results,
        };

        spawn_worker(conn, format!("ks-grep-{}", query.kind.name()), move || {
            job.run(emitter);
        })
    }

    fn build(&self, conn: &mut Connection) -> Result<(), EngineError> {
        let source = self.source()?.clone();

        let token = Arc::new(StopToken::new());
        let emitter = conn.begin(token)?;
        let job = BuildJob {
            source,
            cache: Arc::clone(&self.files),
            manifest: self.manifest.clone(),
        };

        spawn_worker(conn, "ks-grep-build".to_string(), move || {
            job.run(emitter);
        })
    }
}

/// Reads the file list of an earlier build. A missing, unreadable or foreign
/// manifest yields `None`, so queries walk the tree.
fn load_manifest(path: &Path, root: &Path) -> Option<Vec<PathBuf>> {
    match FileManifest::load(path) {
        Ok(Some(manifest)) if manifest.root == root => Some(manifest.files),
        Ok(Some(manifest)) => {
            warn!(
                manifest = %path.display(),
                root = %manifest.root.display(),
                "ignoring manifest built for another root"
            );
            None
        }
        Ok(None) => None,
        Err(e) => {
            warn!(manifest = %path.display(), error = %e, "ignoring unreadable manifest");
            None
        }
    }
}

/// Runs `work` on a named thread, rolling the connection back if the thread
/// cannot be started.
fn spawn_worker<F>(conn: &mut Connection, name: String, work: F) -> Result<(), EngineError>
where
    F: FnOnce() + Send + 'static,
{
    match thread::Builder::new().name(name).spawn(work) {
        Ok(_) => Ok(()),
        Err(e) => {
            conn.abandon();
            Err(EngineError::Spawn(e))
        }
    }
}
