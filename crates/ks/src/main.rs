//! ks: source code browsing from the command line.
//!
//! `ks` keeps a project (a source tree plus the engine used to search it) and
//! answers cross-reference style queries against it: text, references,
//! included files and file names.

#![warn(missing_docs)]

mod cli;

use std::process::ExitCode;

use clap::Parser;

use crate::cli::{CommandContext, args::Cli, commands, logging};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init();

    let mut ctx = match CommandContext::load() {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };
    commands::run(cli.command, &mut ctx)
}
