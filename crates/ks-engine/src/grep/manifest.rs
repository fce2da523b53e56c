//! On-disk record of the file list produced by a `grep` build.
//!
//! The manifest is stored as JSON at the path named in the engine's open string,
//! so a build done by one process is reused by the queries of the next.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

/// The files found by the last completed build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct FileManifest {
    /// Corpus root the list was built for.
    pub(super) root: PathBuf,
    /// Files in walk order.
    #[serde(default)]
    pub(super) files: Vec<PathBuf>,
}

impl FileManifest {
    /// Loads a manifest. Returns `None` if the file does not exist.
    pub(super) fn load(path: &Path) -> io::Result<Option<Self>> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Writes the manifest, creating parent directories as needed.
    ///
    /// The new contents replace the old file in one rename, so a reader never
    /// sees a partial list.
    pub(super) fn save(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let staging = path.with_extension("tmp");
        fs::write(&staging, contents)?;
        fs::rename(&staging, path)
    }
}

/// Splits a `grep` open string into its source descriptor and manifest path.
///
/// The manifest is the optional third `;`-separated field:
/// `<root>[;<glob>,...[;<manifest>]]`.
pub(super) fn split_open_string(open_string: &str) -> (&str, Option<PathBuf>) {
    match open_string.match_indices(';').nth(1) {
        Some((at, _)) => {
            let manifest = open_string[at + 1..].trim();
            let manifest = (!manifest.is_empty()).then(|| PathBuf::from(manifest));
            (&open_string[..at], manifest)
        }
        None => (open_string, None),
    }
}
