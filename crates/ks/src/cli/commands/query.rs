//! Implementation of `ks query`.

use std::{cell::RefCell, process::ExitCode, rc::Rc};

use ks_engine::{Connection, Outcome};
use ks_query::{Location, Query};
use ks_results::{Column, LocationListModel, QueryView};
use tracing::debug;

use crate::cli::{
    args::QueryCommand,
    context::CommandContext,
    output::{display_position, print_json, print_plain, print_table, stdout_is_terminal},
};

/// Columns shown for query results.
const COLUMNS: [Column; 4] = [Column::Scope, Column::File, Column::Line, Column::Text];

/// Runs a query through the active project's engine and prints the results.
pub fn run(ctx: &mut CommandContext, cmd: &QueryCommand) -> ExitCode {
    let manager = match ctx.open_project(cmd.project.project.as_deref()) {
        Ok(manager) => manager,
        Err(code) => return code,
    };
    let Some(project) = manager.current() else {
        eprintln!("error: no project is open");
        return ExitCode::FAILURE;
    };

    let query = Query::new(cmd.kind, cmd.pattern.clone());
    let mut view = QueryView::new(LocationListModel::new(COLUMNS));
    view.set_auto_select_single_result(cmd.first);
    let selected: Rc<RefCell<Option<Location>>> = Rc::default();
    let sink = Rc::clone(&selected);
    view.on_location_requested(move |loc| *sink.borrow_mut() = Some(loc.clone()));

    view.init_query(query.clone());
    let mut conn = Connection::new();
    if let Err(e) = project.engine().query(&mut conn, &query) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }
    let outcome = conn.wait(&mut view);
    debug!(?outcome, results = view.sink().len(), "query done");

    if let Some(location) = selected.borrow().as_ref() {
        println!("{}", display_position(location, &ctx.cwd));
        return ExitCode::SUCCESS;
    }

    let model = view.sink();
    let code = if cmd.json {
        print_json(&query, model)
    } else if cmd.plain {
        print_plain(model, &ctx.cwd, stdout_is_terminal());
        ExitCode::SUCCESS
    } else {
        print_table(model, &ctx.cwd);
        ExitCode::SUCCESS
    };

    if outcome != Some(Outcome::Finished) {
        eprintln!("error: query was aborted, results may be incomplete");
        return ExitCode::FAILURE;
    }
    code
}
