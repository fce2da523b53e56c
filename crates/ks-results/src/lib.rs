//! Result sinks for ks.
//!
//! Engines stream [`Location`](ks_query::Location) batches; this crate
//! accumulates them for display and navigation:
//!
//! - [`LocationListModel`] is a flat, ordered list with a fixed column projection.
//! - [`LocationTreeModel`] is an arena-backed tree populated incrementally, used
//!   for call graphs where expanding a node issues a follow-up query.
//! - [`QueryView`] consumes a [`Connection`](ks_engine::Connection)'s callbacks,
//!   feeds a sink and raises "location requested" events on selection or when a
//!   query produced exactly one result.

#![warn(missing_docs)]

mod column;
mod error;
mod event;
mod list;
mod sink;
mod tree;
mod view;

pub use column::Column;
pub use error::ResultsError;
pub use event::ModelEvent;
pub use list::LocationListModel;
pub use sink::ResultSink;
pub use tree::{LocationTreeModel, NodeId};
pub use view::{Progress, QueryView, ViewState};
