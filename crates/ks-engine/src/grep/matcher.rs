//! Per-kind match predicates.

use std::path::Path;

use ks_query::{Query, QueryKind};

/// What a query looks for, compiled from its kind and pattern.
#[derive(Debug, Clone)]
pub(super) enum Matcher {
    /// Any occurrence of a string on a line.
    Text {
        /// The string to find, lowercased when `ignore_case` is set.
        needle: String,
        /// Compare ASCII case-insensitively.
        ignore_case: bool,
    },
    /// An occurrence of an identifier not embedded in a longer identifier.
    Identifier(String),
    /// Files whose path relative to the root contains a string.
    FilePath(String),
    /// Lines of the form `#include "..."` or `#include <...>` naming a file.
    Including(String),
}

impl Matcher {
    /// Compiles a query, or returns `None` for kinds this engine cannot answer.
    ///
    /// Text patterns are used as given; names are trimmed.
    pub(super) fn for_query(query: &Query, ignore_case: bool) -> Option<Self> {
        let pattern = query.pattern.trim().to_string();
        match query.kind {
            QueryKind::Text => Some(Self::Text {
                needle: if ignore_case {
                    query.pattern.to_ascii_lowercase()
                } else {
                    query.pattern.clone()
                },
                ignore_case,
            }),
            QueryKind::References => Some(Self::Identifier(pattern)),
            QueryKind::FindFile => Some(Self::FilePath(pattern)),
            QueryKind::IncludingFiles => Some(Self::Including(pattern)),
            QueryKind::Definition
            | QueryKind::CalledFunctions
            | QueryKind::CallingFunctions
            | QueryKind::CallGraph => None,
        }
    }

    /// Whether this matcher inspects file contents rather than file paths.
    pub(super) fn scans_lines(&self) -> bool {
        !matches!(self, Self::FilePath(_))
    }

    /// Matches a path relative to the corpus root.
    pub(super) fn match_path(&self, rel: &Path) -> bool {
        match self {
            Self::FilePath(needle) => rel.to_string_lossy().contains(needle.as_str()),
            _ => false,
        }
    }

    /// Matches a line, returning the 1-based character column of the match.
    pub(super) fn match_line(&self, line: &str) -> Option<u32> {
        let byte = match self {
            Self::Text {
                needle,
                ignore_case: true,
            } => line.to_ascii_lowercase().find(needle.as_str()),
            Self::Text { needle, .. } => line.find(needle.as_str()),
            Self::Identifier(name) => find_identifier(line, name),
            Self::Including(name) => find_include(line, name),
            Self::FilePath(_) => None,
        }?;
        Some(char_column(line, byte))
    }
}

/// Whether a character can be part of a C-like identifier.
fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Finds `name` in `line` where it is not part of a longer identifier.
fn find_identifier(line: &str, name: &str) -> Option<usize> {
    if name.is_empty() {
        return None;
    }
    line.match_indices(name).map(|(i, _)| i).find(|&i| {
        let before = line[..i].chars().next_back();
        let after = line[i + name.len()..].chars().next();
        !before.is_some_and(is_ident_char) && !after.is_some_and(is_ident_char)
    })
}

/// Finds the target of an `#include` directive that names `name`.
///
/// The target matches when it equals `name` or ends with `/name`. Returns the
/// byte offset of the target within `line`.
fn find_include(line: &str, name: &str) -> Option<usize> {
    let trimmed = line.trim_start();
    let rest = trimmed.strip_prefix('#')?.trim_start();
    let rest = rest.strip_prefix("include")?.trim_start();

    let close = match rest.chars().next()? {
        '"' => '"',
        '<' => '>',
        _ => return None,
    };
    let target = &rest[1..];
    let target = &target[..target.find(close)?];

    let matches = target == name
        || target
            .strip_suffix(name)
            .is_some_and(|prefix| prefix.ends_with('/'));
    matches.then(|| line.len() - rest.len() + 1)
}

/// Converts a byte offset into a 1-based character column.
fn char_column(line: &str, byte: usize) -> u32 {
    let chars = line[..byte].chars().count();
    u32::try_from(chars + 1).unwrap_or(u32::MAX)
}
