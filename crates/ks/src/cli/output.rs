//! Rendering and JSON serialization for CLI output.

use std::{
    io::{self, IsTerminal},
    path::{Component, Path},
    process::ExitCode,
};

use comfy_table::{Cell, Table, presets::UTF8_FULL_CONDENSED};
use ks_highlight::{Highlighter, position};
pub use ks_highlight::{dim, subheader, success};
use ks_query::{Location, Query};
use ks_results::{Column, LocationListModel};
use serde::Serialize;

/// JSON output for `ks query --json`.
#[derive(Serialize)]
struct JsonQueryOutput<'a> {
    /// Query kind name.
    kind: &'static str,
    /// The pattern searched for.
    pattern: &'a str,
    /// Number of results.
    total: usize,
    /// The results, in arrival order.
    results: Vec<&'a Location>,
}

/// Whether stdout is an interactive terminal.
pub fn stdout_is_terminal() -> bool {
    io::stdout().is_terminal()
}

/// Renders a path relative to `base` when it lies below it.
pub fn display_path(path: &Path, base: &Path) -> String {
    match pathdiff::diff_paths(path, base) {
        Some(rel)
            if path.is_absolute()
                && !rel.as_os_str().is_empty()
                && !matches!(rel.components().next(), Some(Component::ParentDir)) =>
        {
            rel.display().to_string()
        }
        _ => path.display().to_string(),
    }
}

/// `file:line` for a location, with the file relative to `base`.
pub fn display_position(location: &Location, base: &Path) -> String {
    let file = display_path(&location.file, base);
    if location.has_line() {
        format!("{file}:{}", location.line)
    } else {
        file
    }
}

/// Prints query results as JSON.
pub fn print_json(query: &Query, model: &LocationListModel) -> ExitCode {
    let output = JsonQueryOutput {
        kind: query.kind.name(),
        pattern: &query.pattern,
        total: model.len(),
        results: model.iter().collect(),
    };
    match serde_json::to_string_pretty(&output) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize results: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Prints query results as a table, one row per location.
pub fn print_table(model: &LocationListModel, base: &Path) {
    if model.is_empty() {
        println!("{}", dim("No results."));
        return;
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(model.columns().iter().map(|c| c.title()).collect::<Vec<_>>());

    for location in model.iter() {
        table.add_row(
            model
                .columns()
                .iter()
                .map(|&column| match column {
                    Column::File => Cell::new(display_path(&location.file, base)),
                    other => Cell::new(other.value(location)),
                })
                .collect::<Vec<_>>(),
        );
    }

    println!("{table}");
    println!("{}", dim(&format!("{} result(s)", model.len())));
}

/// Prints query results grep-style: `file:line: text`, highlighted on a terminal.
pub fn print_plain(model: &LocationListModel, base: &Path, color: bool) {
    let highlighter = color.then(Highlighter::new);
    for location in model.iter() {
        let file = display_path(&location.file, base);
        match &highlighter {
            Some(hl) => println!(
                "{}: {}",
                position(&file, location.line),
                hl.highlight_line(&location.text, &location.file)
            ),
            None => println!("{}: {}", display_position(location, base), location.text),
        }
    }
}
