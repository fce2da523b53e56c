//! Projection of location fields onto display columns.

use std::fmt;

use ks_query::Location;

/// A location field shown as a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    /// The file path.
    File,
    /// The line number.
    Line,
    /// The column number.
    Column,
    /// The tag type.
    Tag,
    /// The enclosing scope.
    Scope,
    /// The text of the line.
    Text,
}

impl Column {
    /// Header title for this column.
    pub fn title(self) -> &'static str {
        match self {
            Self::File => "File",
            Self::Line => "Line",
            Self::Column => "Column",
            Self::Tag => "Tag",
            Self::Scope => "Scope",
            Self::Text => "Text",
        }
    }

    /// Renders this column's field of a location.
    ///
    /// Unspecified line and column numbers render as empty strings.
    pub fn value(self, location: &Location) -> String {
        let number = |n: u32| if n == 0 { String::new() } else { n.to_string() };
        match self {
            Self::File => location.file.display().to_string(),
            Self::Line => number(location.line),
            Self::Column => number(location.column),
            Self::Tag => location.tag.clone(),
            Self::Scope => location.scope.clone(),
            Self::Text => location.text.clone(),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unspecified_numbers_render_empty() {
        let loc = Location::new("a.c", 0).with_text("x");
        assert_eq!(Column::Line.value(&loc), "");
        assert_eq!(Column::Column.value(&loc), "");
        assert_eq!(Column::Text.value(&loc), "x");
        assert_eq!(Column::File.value(&loc), "a.c");
    }

    #[test]
    fn numbers_render_when_known() {
        let loc = Location::new("a.c", 10).with_column(3);
        assert_eq!(Column::Line.value(&loc), "10");
        assert_eq!(Column::Column.value(&loc), "3");
        assert_eq!(Column::Scope.to_string(), "Scope");
    }
}
