//! Command implementations and dispatch.

pub mod build;
pub mod init;
pub mod query;
pub mod status;

use std::process::ExitCode;

use super::{args::Commands, context::CommandContext};

/// Dispatches to the selected subcommand.
pub fn run(command: Commands, ctx: &mut CommandContext) -> ExitCode {
    match command {
        Commands::Init(cmd) => init::run(ctx, &cmd),
        Commands::Query(cmd) => query::run(ctx, &cmd),
        Commands::Build(cmd) => build::run(ctx, &cmd),
        Commands::Status(cmd) => status::run(ctx, &cmd),
    }
}
