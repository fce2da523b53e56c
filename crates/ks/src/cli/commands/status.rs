//! Implementation of `ks status`.

use std::{path::Path, process::ExitCode};

use ks_config::{PROJECT_FILENAME, settings_path};

use crate::cli::{
    args::ProjectArgs,
    context::CommandContext,
    output::{dim, subheader},
};

/// Shows the selected project's parameters without opening it.
pub fn run(ctx: &CommandContext, cmd: &ProjectArgs) -> ExitCode {
    let path = ctx.resolve_project_path(cmd.project.as_deref());
    let mut project = ctx.new_project();
    if let Err(e) = project.try_load(&path) {
        eprintln!("error: no project at {}: {e}", path.display());
        return ExitCode::FAILURE;
    }
    let params = project.params();

    println!("{}", subheader("Project:"));
    println!("   Name:            {}", params.name);
    println!("   Path:            {}", params.project_path.display());
    println!("   File:            {}", dim(&path.join(PROJECT_FILENAME).display().to_string()));
    println!("   Root:            {}{}", params.root_path, missing(Path::new(&params.root_path)));
    println!("   Engine string:   {}", params.engine_string);
    println!("   Codebase string: {}", params.codebase_string);
    println!();

    println!("{}", subheader("Settings:"));
    println!("   Engine:          {}", ctx.settings.defaults.engine);
    let engine_params = ctx.settings.engine_params(&ctx.settings.defaults.engine);
    for (key, value) in &engine_params {
        println!("   {key}: {value}");
    }
    match settings_path() {
        Some(path) => println!("   File:            {}", dim(&path.display().to_string())),
        None => println!("   File:            {}", dim("(none)")),
    }

    ExitCode::SUCCESS
}

/// A dimmed marker for a root that no longer exists.
fn missing(root: &Path) -> String {
    if root.is_dir() {
        String::new()
    } else {
        format!(" {}", dim("[missing]"))
    }
}
