//! Error types for result sinks.

use thiserror::Error;

use crate::NodeId;

/// Errors raised when addressing tree nodes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResultsError {
    /// The handle was issued before the tree was last cleared.
    #[error("node {node} belongs to cycle {}, the tree is at cycle {current}", .node.cycle)]
    StaleNode {
        /// The rejected handle.
        node: NodeId,
        /// The tree's current accumulation cycle.
        current: u32,
    },

    /// The handle does not name a node of this tree.
    #[error("no node {node} in this tree")]
    UnknownNode {
        /// The rejected handle.
        node: NodeId,
    },
}
