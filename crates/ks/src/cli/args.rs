//! Clap argument definitions for the `ks` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use ks_query::QueryKind;

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "ks")]
#[command(about = "Source code browsing: query a project's source tree")]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Selects the project a command works on.
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Project directory [default: last opened project, else ./.ks]
    #[arg(short = 'p', long = "project")]
    pub project: Option<PathBuf>,
}

/// Arguments for `ks init`.
#[derive(Args, Debug, Clone)]
pub struct InitCommand {
    /// Project name
    #[arg(long)]
    pub name: String,

    /// Root of the source tree
    #[arg(long)]
    pub root: PathBuf,

    /// Directory to store the project in
    #[arg(long, default_value = ".ks")]
    pub path: PathBuf,

    /// Engine open string [default: the root]
    #[arg(long)]
    pub engine_string: Option<String>,

    /// Code base descriptor [default: the root]
    #[arg(long)]
    pub codebase_string: Option<String>,
}

/// Arguments for `ks query`.
#[derive(Args, Debug, Clone)]
pub struct QueryCommand {
    /// Query kind: text, references, definition, called, calling, file,
    /// including, callgraph
    #[arg(value_parser = parse_kind)]
    pub kind: QueryKind,

    /// What to look for
    pub pattern: String,

    /// Project selection.
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Output in JSON format
    #[arg(long, conflicts_with = "plain")]
    pub json: bool,

    /// Output one `file:line: text` line per result
    #[arg(long)]
    pub plain: bool,

    /// If there is exactly one result, print only its position
    #[arg(long)]
    pub first: bool,
}

/// Supported `ks` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Create a project
    Init(InitCommand),

    /// Run a query against the project's engine
    Query(QueryCommand),

    /// Rebuild the project's index
    Build(ProjectArgs),

    /// Show the project's parameters
    Status(ProjectArgs),
}

/// Parses a query kind name for clap.
fn parse_kind(s: &str) -> Result<QueryKind, String> {
    s.parse().map_err(|e: ks_query::QueryKindError| e.to_string())
}
