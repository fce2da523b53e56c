//! Source locations produced by engines.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A point in the source plus descriptive fields.
///
/// Line and column numbers are 1-based. A value of 0 means the engine did not
/// report that coordinate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Path of the file containing the location.
    pub file: PathBuf,
    /// Line number (1-based, 0 if unspecified).
    #[serde(default)]
    pub line: u32,
    /// Column number (1-based, 0 if unspecified).
    #[serde(default)]
    pub column: u32,
    /// Tag type, for tag locations (e.g. "function", "macro").
    #[serde(default)]
    pub tag: String,
    /// Enclosing symbol scope.
    #[serde(default)]
    pub scope: String,
    /// Text of the source line.
    #[serde(default)]
    pub text: String,
}

/// A batch of locations delivered as one unit of streaming.
pub type LocationList = Vec<Location>;

impl Location {
    /// Creates a location pointing at a line of a file, with no other fields set.
    pub fn new(file: impl Into<PathBuf>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
            ..Default::default()
        }
    }

    /// Sets the column.
    pub fn with_column(mut self, column: u32) -> Self {
        self.column = column;
        self
    }

    /// Sets the line text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Sets the enclosing scope.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Sets the tag type.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Whether a line number was reported.
    pub fn has_line(&self) -> bool {
        self.line != 0
    }

    /// Renders `file`, `file:line` or `file:line:column`, depending on which
    /// coordinates are known.
    pub fn display_position(&self) -> String {
        let file = self.file.display();
        match (self.line, self.column) {
            (0, _) => file.to_string(),
            (line, 0) => format!("{file}:{line}"),
            (line, column) => format!("{file}:{line}:{column}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_position_omits_unknown_coordinates() {
        assert_eq!(Location::new("a.c", 0).display_position(), "a.c");
        assert_eq!(Location::new("a.c", 10).display_position(), "a.c:10");
        assert_eq!(
            Location::new("a.c", 10).with_column(4).display_position(),
            "a.c:10:4"
        );
    }

    #[test]
    fn missing_fields_deserialize_as_unspecified() {
        let loc: Location = serde_json::from_str(r#"{"file":"src/main.c"}"#).unwrap();
        assert_eq!(loc.file, PathBuf::from("src/main.c"));
        assert!(!loc.has_line());
        assert_eq!(loc.column, 0);
        assert!(loc.text.is_empty());
    }

    #[test]
    fn builders_fill_descriptive_fields() {
        let loc = Location::new("lib.c", 3)
            .with_scope("init")
            .with_tag("function")
            .with_text("int init(void)");
        assert_eq!(loc.scope, "init");
        assert_eq!(loc.tag, "function");
        assert_eq!(loc.text, "int init(void)");
    }
}
