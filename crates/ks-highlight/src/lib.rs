//! Terminal styling for ks.
//!
//! [`Highlighter`] colors source lines returned by queries, choosing the syntax
//! from the file they came from. The free functions wrap text in ANSI styles for
//! headers and status messages.

#![warn(missing_docs)]

use std::path::Path;

use syntect::{
    easy::HighlightLines,
    highlighting::Style,
    parsing::{SyntaxReference, SyntaxSet},
    util::{LinesWithEndings, as_24_bit_terminal_escaped},
};
use two_face::{
    syntax::extra_newlines as extra_syntaxes,
    theme::{EmbeddedLazyThemeSet, EmbeddedThemeName, extra as extra_themes},
};

/// Highlights source text for terminal output.
pub struct Highlighter {
    /// Language definitions, including the extras shipped by two-face.
    syntax_set: SyntaxSet,
    /// Embedded color themes.
    theme_set: EmbeddedLazyThemeSet,
    /// Theme in use.
    theme: EmbeddedThemeName,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter {
    /// Creates a highlighter with the Dracula theme.
    pub fn new() -> Self {
        Self {
            syntax_set: extra_syntaxes(),
            theme_set: extra_themes(),
            theme: EmbeddedThemeName::Dracula,
        }
    }

    /// Highlights one line of a source file, picking the syntax from the file's
    /// extension or name. Unknown files are left uncolored apart from the
    /// trailing reset.
    pub fn highlight_line(&self, text: &str, file: &Path) -> String {
        self.render(text, self.syntax_for_file(file))
    }

    /// Looks up a syntax by extension, then by full file name.
    fn syntax_for_file(&self, file: &Path) -> &SyntaxReference {
        let by_extension = file
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.syntax_set.find_syntax_by_extension(ext));
        let by_name = || {
            file.file_name()
                .and_then(|name| name.to_str())
                .and_then(|name| self.syntax_set.find_syntax_by_extension(name))
        };
        by_extension
            .or_else(by_name)
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
    }

    /// Applies a syntax to `content` and appends a reset.
    fn render(&self, content: &str, syntax: &SyntaxReference) -> String {
        let theme = self.theme_set.get(self.theme);
        let mut highlighter = HighlightLines::new(syntax, theme);

        let mut output = String::with_capacity(content.len() * 2);
        for line in LinesWithEndings::from(content) {
            let ranges: Vec<(Style, &str)> = highlighter
                .highlight_line(line, &self.syntax_set)
                .unwrap_or_else(|_| vec![(Style::default(), line)]);
            output.push_str(&as_24_bit_terminal_escaped(&ranges, false));
        }
        output.push_str(colors::RESET);
        output
    }
}

/// ANSI escape codes.
pub mod colors {
    /// Bold text.
    pub const BOLD: &str = "\x1b[1m";
    /// Cyan text (headers).
    pub const CYAN: &str = "\x1b[36m";
    /// Green text (success).
    pub const GREEN: &str = "\x1b[32m";
    /// Yellow text (warnings).
    pub const YELLOW: &str = "\x1b[33m";
    /// Red text (errors).
    pub const RED: &str = "\x1b[31m";
    /// Dim text.
    pub const DIM: &str = "\x1b[2m";
    /// Reset all formatting.
    pub const RESET: &str = "\x1b[0m";
}

/// Wraps text in one or more styles.
fn styled(styles: &[&str], text: &str) -> String {
    format!("{}{text}{}", styles.concat(), colors::RESET)
}

/// Bold cyan, for section headers.
pub fn header(text: &str) -> String {
    styled(&[colors::BOLD, colors::CYAN], text)
}

/// Bold.
pub fn subheader(text: &str) -> String {
    styled(&[colors::BOLD], text)
}

/// Dimmed, for secondary information.
pub fn dim(text: &str) -> String {
    styled(&[colors::DIM], text)
}

/// Green, for completed actions.
pub fn success(text: &str) -> String {
    styled(&[colors::GREEN], text)
}

/// Yellow.
pub fn warning(text: &str) -> String {
    styled(&[colors::YELLOW], text)
}

/// Red.
pub fn error(text: &str) -> String {
    styled(&[colors::RED], text)
}

/// A `file:line` position with the line number dimmed.
pub fn position(file: &str, line: u32) -> String {
    if line == 0 {
        return subheader(file);
    }
    format!("{}{}", subheader(file), dim(&format!(":{line}")))
}
