//! The consumer side of a query: feeds a sink from connection callbacks.

use std::fmt;

use ks_engine::ConnectionHandler;
use ks_query::{Location, LocationList, Query};
use tracing::debug;

use crate::{LocationListModel, LocationTreeModel, NodeId, ResultSink};

/// Last progress report of a running operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// What the engine is doing.
    pub text: String,
    /// Units done.
    pub current: usize,
    /// Units expected (0 = unknown).
    pub total: usize,
}

/// Where a view's current query stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewState {
    /// No query has been started.
    #[default]
    Idle,
    /// Results are streaming.
    Running,
    /// The query completed.
    Finished,
    /// The query was stopped or failed.
    Aborted,
}

/// Accumulates a query's results in a sink and raises navigation requests.
///
/// With auto-select-single-result enabled, a query that finishes with exactly
/// one location requests that location immediately and marks the view as
/// auto-selected, so a front end can skip showing the list. Follow-up queries
/// started with [`extend_query`](Self::extend_query) never auto-select.
pub struct QueryView<S> {
    /// Where results go.
    sink: S,
    /// The query being shown.
    query: Option<Query>,
    /// Jump straight to a lone result.
    auto_select: bool,
    /// The current query adds to earlier results.
    extending: bool,
    /// State of the current query.
    state: ViewState,
    /// Last progress report.
    progress: Option<Progress>,
    /// Locations received since the query started or was extended.
    received: usize,
    /// The first location of the current cycle.
    first_received: Option<Location>,
    /// Whether the last finish triggered an automatic selection.
    auto_selected: bool,
    /// Navigation listeners.
    listeners: Vec<Box<dyn FnMut(&Location)>>,
}

impl<S: ResultSink> QueryView<S> {
    /// Creates a view over `sink`.
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            query: None,
            auto_select: false,
            extending: false,
            state: ViewState::Idle,
            progress: None,
            received: 0,
            first_received: None,
            auto_selected: false,
            listeners: Vec::new(),
        }
    }

    /// Enables or disables auto-select-single-result.
    pub fn set_auto_select_single_result(&mut self, enabled: bool) {
        self.auto_select = enabled;
    }

    /// Whether auto-select-single-result is enabled.
    pub fn auto_select_single_result(&self) -> bool {
        self.auto_select
    }

    /// Registers a callback for "location requested" events.
    pub fn on_location_requested(&mut self, callback: impl FnMut(&Location) + 'static) {
        self.listeners.push(Box::new(callback));
    }

    /// Prepares for a new query, discarding previous results.
    pub fn init_query(&mut self, query: Query) {
        self.sink.clear();
        self.start(query, false);
    }

    /// Prepares for a follow-up query whose results join the existing ones,
    /// e.g. when expanding a call-graph node.
    pub fn extend_query(&mut self, query: Query) {
        self.start(query, true);
    }

    /// The query being shown.
    pub fn query(&self) -> Option<&Query> {
        self.query.as_ref()
    }

    /// State of the current query.
    pub fn state(&self) -> ViewState {
        self.state
    }

    /// Last progress report while running.
    pub fn progress(&self) -> Option<&Progress> {
        self.progress.as_ref()
    }

    /// Whether the last completed query was resolved by auto-selection.
    pub fn auto_selected(&self) -> bool {
        self.auto_selected
    }

    /// The sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The sink, mutably.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consumes the view, returning the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Resets per-query state.
    fn start(&mut self, query: Query, extending: bool) {
        debug!(query = %query, extending, "query view started");
        self.query = Some(query);
        self.extending = extending;
        self.state = ViewState::Running;
        self.progress = None;
        self.received = 0;
        self.first_received = None;
        self.auto_selected = false;
    }

    /// Delivers a navigation request to every listener.
    fn request(&mut self, location: &Location) {
        for listener in &mut self.listeners {
            listener(location);
        }
    }
}

impl QueryView<LocationListModel> {
    /// Requests the location at `row`, as when the user picks a list entry.
    ///
    /// Returns `false` if there is no such row.
    pub fn activate_row(&mut self, row: usize) -> bool {
        let Some(location) = self.sink.location(row).cloned() else {
            return false;
        };
        self.request(&location);
        true
    }
}

impl QueryView<LocationTreeModel> {
    /// Requests the location of a tree node, as when the user picks it.
    ///
    /// Returns `false` for stale or unknown handles.
    pub fn activate_node(&mut self, node: NodeId) -> bool {
        let Some(location) = self.sink.location(node).cloned() else {
            return false;
        };
        self.request(&location);
        true
    }
}

impl<S: ResultSink> ConnectionHandler for QueryView<S> {
    fn on_data_ready(&mut self, batch: LocationList) {
        self.received += batch.len();
        if self.first_received.is_none() {
            self.first_received = batch.first().cloned();
        }
        self.sink.add_batch(batch);
    }

    fn on_progress(&mut self, text: &str, current: usize, total: usize) {
        self.progress = Some(Progress {
            text: text.to_string(),
            current,
            total,
        });
    }

    fn on_finished(&mut self) {
        self.state = ViewState::Finished;
        self.progress = None;
        debug!(results = self.received, "query view finished");

        if self.auto_select
            && !self.extending
            && self.received == 1
            && let Some(location) = self.first_received.take()
        {
            self.auto_selected = true;
            self.request(&location);
        }
    }

    fn on_aborted(&mut self) {
        self.state = ViewState::Aborted;
        self.progress = None;
        debug!(results = self.received, "query view aborted");
    }
}

impl<S: fmt::Debug> fmt::Debug for QueryView<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryView")
            .field("sink", &self.sink)
            .field("query", &self.query)
            .field("auto_select", &self.auto_select)
            .field("extending", &self.extending)
            .field("state", &self.state)
            .field("progress", &self.progress)
            .field("received", &self.received)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
