//! Query kinds and their user-facing names.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::QueryKindError;

/// The lookups an engine can be asked to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    /// Free text search.
    Text,
    /// All references to a symbol.
    References,
    /// The definition of a symbol.
    Definition,
    /// Functions called by a function.
    CalledFunctions,
    /// Functions calling a function.
    CallingFunctions,
    /// Files whose path matches the pattern.
    FindFile,
    /// Files including the named file.
    IncludingFiles,
    /// Recursive caller/callee graph of a function.
    CallGraph,
}

impl QueryKind {
    /// Every kind, in the order the query dialog lists them.
    pub const ALL: [Self; 8] = [
        Self::Text,
        Self::References,
        Self::Definition,
        Self::CalledFunctions,
        Self::CallingFunctions,
        Self::FindFile,
        Self::IncludingFiles,
        Self::CallGraph,
    ];

    /// Canonical command-line name for this kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::References => "references",
            Self::Definition => "definition",
            Self::CalledFunctions => "called",
            Self::CallingFunctions => "calling",
            Self::FindFile => "file",
            Self::IncludingFiles => "including",
            Self::CallGraph => "callgraph",
        }
    }

    /// Human-readable title, as shown in result headers.
    pub fn title(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::References => "References",
            Self::Definition => "Definition",
            Self::CalledFunctions => "Called Functions",
            Self::CallingFunctions => "Calling Functions",
            Self::FindFile => "File",
            Self::IncludingFiles => "Including Files",
            Self::CallGraph => "Call Graph",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

impl FromStr for QueryKind {
    type Err = QueryKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let kind = match lowered.as_str() {
            "text" | "grep" => Self::Text,
            "references" | "refs" | "ref" => Self::References,
            "definition" | "def" => Self::Definition,
            "called" | "callees" | "called-functions" => Self::CalledFunctions,
            "calling" | "callers" | "calling-functions" => Self::CallingFunctions,
            "file" | "find-file" => Self::FindFile,
            "including" | "includes" | "including-files" => Self::IncludingFiles,
            "callgraph" | "call-graph" => Self::CallGraph,
            _ => {
                return Err(QueryKindError {
                    name: s.to_string(),
                    expected: Self::ALL
                        .iter()
                        .map(|k| k.name())
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
        };
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_names_round_trip() {
        for kind in QueryKind::ALL {
            assert_eq!(kind.name().parse::<QueryKind>().unwrap(), kind);
        }
    }

    #[test]
    fn aliases_are_case_insensitive() {
        assert_eq!("DEF".parse::<QueryKind>().unwrap(), QueryKind::Definition);
        assert_eq!(
            "Callers".parse::<QueryKind>().unwrap(),
            QueryKind::CallingFunctions
        );
        assert_eq!(" refs ".parse::<QueryKind>().unwrap(), QueryKind::References);
    }

    #[test]
    fn unknown_name_lists_expected_kinds() {
        let err = "symbol".parse::<QueryKind>().unwrap_err();
        assert_eq!(err.name, "symbol");
        assert!(err.expected.contains("definition"));
        assert!(err.to_string().contains("unknown query kind 'symbol'"));
    }
}
