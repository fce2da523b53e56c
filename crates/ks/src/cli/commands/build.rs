//! Implementation of `ks build`.

use std::{
    io::{self, IsTerminal, Write},
    process::ExitCode,
};

use ks_engine::{Connection, ConnectionHandler, Outcome};
use ks_query::LocationList;

use crate::cli::{args::ProjectArgs, context::CommandContext, output::success};

/// Reports build progress on stderr.
struct ProgressReporter {
    /// Redraw a status line in place.
    interactive: bool,
    /// Last progress report.
    last: Option<(String, usize, usize)>,
}

impl ProgressReporter {
    /// Formats a progress report.
    fn line(text: &str, current: usize, total: usize) -> String {
        if total == 0 {
            format!("{text}: {current}")
        } else {
            format!("{text}: {current}/{total}")
        }
    }

    /// Ends an in-place status line.
    fn finish_line(&self) {
        if self.interactive && self.last.is_some() {
            eprintln!();
        }
    }
}

impl ConnectionHandler for ProgressReporter {
    fn on_data_ready(&mut self, _batch: LocationList) {}

    fn on_progress(&mut self, text: &str, current: usize, total: usize) {
        if self.interactive {
            eprint!("\r{}", Self::line(text, current, total));
            io::stderr().flush().ok();
        }
        self.last = Some((text.to_string(), current, total));
    }

    fn on_finished(&mut self) {
        self.finish_line();
    }

    fn on_aborted(&mut self) {
        self.finish_line();
    }
}

/// Rebuilds the active project's index, showing progress on stderr.
pub fn run(ctx: &mut CommandContext, cmd: &ProjectArgs) -> ExitCode {
    let manager = match ctx.open_project(cmd.project.as_deref()) {
        Ok(manager) => manager,
        Err(code) => return code,
    };
    let Some(project) = manager.current() else {
        eprintln!("error: no project is open");
        return ExitCode::FAILURE;
    };

    let mut conn = Connection::new();
    if let Err(e) = project.engine().build(&mut conn) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    let mut reporter = ProgressReporter {
        interactive: io::stderr().is_terminal(),
        last: None,
    };
    match conn.wait(&mut reporter) {
        Some(Outcome::Finished) => {
            if !reporter.interactive
                && let Some((text, current, total)) = &reporter.last
            {
                eprintln!("{}", ProgressReporter::line(text, *current, *total));
            }
            println!("{} {}", success("Build complete:"), project.name());
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("error: build was aborted");
            ExitCode::FAILURE
        }
    }
}
