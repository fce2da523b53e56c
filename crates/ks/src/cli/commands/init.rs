//! Implementation of `ks init`.

use std::process::ExitCode;

use ks_engine::GrepEngine;
use ks_project::Params;

use crate::cli::{
    args::InitCommand,
    context::CommandContext,
    output::{dim, success},
};

/// Creates a project, opens it and remembers it as the last project.
pub fn run(ctx: &mut CommandContext, cmd: &InitCommand) -> ExitCode {
    let project_path = ctx.absolute(&cmd.path);
    let root_dir = ctx.absolute(&cmd.root);
    let root = root_dir.display().to_string();

    // The grep engine keeps its build manifest inside the project directory.
    let default_engine_string = if ctx.settings.defaults.engine == GrepEngine::NAME {
        GrepEngine::open_string(&root_dir, &project_path.join(GrepEngine::MANIFEST_FILENAME))
    } else {
        root.clone()
    };

    let params = Params {
        project_path: project_path.clone(),
        name: cmd.name.clone(),
        engine_string: cmd.engine_string.clone().unwrap_or(default_engine_string),
        codebase_string: cmd.codebase_string.clone().unwrap_or_else(|| root.clone()),
        root_path: root,
    };

    let mut manager = ctx.manager();
    if let Err(e) = manager.create(params) {
        eprintln!("error: failed to create project: {e}");
        return ExitCode::FAILURE;
    }
    ctx.remember_project(&project_path);

    println!("{} {}", success("Created project"), cmd.name);
    println!("{}", dim(&format!("at {}", project_path.display())));
    ExitCode::SUCCESS
}
