//! Hierarchical result tree.
//!
//! Nodes live in an arena and are addressed by [`NodeId`] handles. Handles stay
//! valid while the tree only grows; [`LocationTreeModel::clear`] starts a new
//! accumulation cycle and every handle from an earlier cycle is rejected.

use std::fmt;

use ks_query::{Location, LocationList};
use tracing::warn;

use crate::{Column, ModelEvent, ResultSink, ResultsError, event::Observers};

/// Handle to a node of a [`LocationTreeModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    /// Accumulation cycle the handle was issued in.
    pub cycle: u32,
    /// Arena slot.
    pub index: usize,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.index, self.cycle)
    }
}

/// A node in the arena.
#[derive(Debug, Clone)]
struct Node {
    /// The node's location.
    location: Location,
    /// Parent slot, `None` for top-level nodes.
    parent: Option<usize>,
    /// Position among the parent's children.
    row: usize,
    /// Child slots in insertion order.
    children: Vec<usize>,
}

/// A tree of locations, populated incrementally.
///
/// Top-level rows come from the initial query; expanding a row issues a
/// follow-up query whose results are added under it.
#[derive(Debug, Default)]
pub struct LocationTreeModel {
    /// Columns shown, in display order.
    columns: Vec<Column>,
    /// Node storage.
    nodes: Vec<Node>,
    /// Top-level slots.
    roots: Vec<usize>,
    /// Current accumulation cycle.
    cycle: u32,
    /// Parent used by [`ResultSink::add_batch`].
    target: Option<NodeId>,
    /// Change subscribers.
    observers: Observers,
}

impl LocationTreeModel {
    /// Creates an empty tree showing `columns`.
    pub fn new(columns: impl Into<Vec<Column>>) -> Self {
        Self {
            columns: columns.into(),
            ..Self::default()
        }
    }

    /// Registers a change callback.
    pub fn subscribe(&mut self, callback: impl FnMut(&ModelEvent) + 'static) {
        self.observers.subscribe(callback);
    }

    /// Adds locations as children of `parent` (`None` = top level), returning
    /// their handles in order.
    pub fn add(
        &mut self,
        batch: LocationList,
        parent: Option<NodeId>,
    ) -> Result<Vec<NodeId>, ResultsError> {
        let parent_slot = parent.map(|id| self.slot(id)).transpose()?;
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let first = self.siblings(parent_slot).len();
        let mut ids = Vec::with_capacity(batch.len());
        for (offset, location) in batch.into_iter().enumerate() {
            let index = self.nodes.len();
            self.nodes.push(Node {
                location,
                parent: parent_slot,
                row: first + offset,
                children: Vec::new(),
            });
            match parent_slot {
                Some(slot) => self.nodes[slot].children.push(index),
                None => self.roots.push(index),
            }
            ids.push(self.id(index));
        }

        self.observers.emit(&ModelEvent::RowsInserted {
            parent,
            first,
            last: first + ids.len() - 1,
        });
        Ok(ids)
    }

    /// Removes every node, invalidates all handles and announces a reset.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
        self.target = None;
        self.cycle = self.cycle.wrapping_add(1);
        self.observers.emit(&ModelEvent::Reset);
    }

    /// Number of nodes at every depth.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The current accumulation cycle.
    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    /// Children of `parent` (`None` = top level), in insertion order.
    pub fn children(&self, parent: Option<NodeId>) -> Result<Vec<NodeId>, ResultsError> {
        let slot = parent.map(|id| self.slot(id)).transpose()?;
        Ok(self.siblings(slot).iter().map(|&i| self.id(i)).collect())
    }

    /// Parent of a node, `None` for top-level nodes.
    pub fn parent(&self, node: NodeId) -> Result<Option<NodeId>, ResultsError> {
        let slot = self.slot(node)?;
        Ok(self.nodes[slot].parent.map(|p| self.id(p)))
    }

    /// Location of a node, `None` for invalid handles.
    pub fn location(&self, node: NodeId) -> Option<&Location> {
        let slot = self.slot(node).ok()?;
        Some(&self.nodes[slot].location)
    }

    /// Cell text for a node, `None` for invalid handles or columns.
    pub fn data(&self, node: NodeId, column: usize) -> Option<String> {
        let column = self.columns.get(column)?;
        self.location(node).map(|loc| column.value(loc))
    }

    /// Header title of a displayed column.
    pub fn header(&self, column: usize) -> Option<&'static str> {
        self.columns.get(column).map(|c| c.title())
    }

    /// The first top-level location, if any.
    pub fn first_location(&self) -> Option<&Location> {
        self.roots.first().map(|&i| &self.nodes[i].location)
    }

    /// The node after `node` in depth-first order.
    pub fn next(&self, node: NodeId) -> Result<Option<NodeId>, ResultsError> {
        let slot = self.slot(node)?;
        if let Some(&child) = self.nodes[slot].children.first() {
            return Ok(Some(self.id(child)));
        }

        let mut current = slot;
        loop {
            let Node { parent, row, .. } = self.nodes[current];
            if let Some(&sibling) = self.siblings(parent).get(row + 1) {
                return Ok(Some(self.id(sibling)));
            }
            match parent {
                Some(p) => current = p,
                None => return Ok(None),
            }
        }
    }

    /// The node before `node` in depth-first order.
    pub fn prev(&self, node: NodeId) -> Result<Option<NodeId>, ResultsError> {
        let slot = self.slot(node)?;
        let Node { parent, row, .. } = self.nodes[slot];
        if row == 0 {
            return Ok(parent.map(|p| self.id(p)));
        }

        let mut current = self.siblings(parent)[row - 1];
        while let Some(&last) = self.nodes[current].children.last() {
            current = last;
        }
        Ok(Some(self.id(current)))
    }

    /// Sets the parent that [`ResultSink::add_batch`] adds under.
    ///
    /// Used while a follow-up query populates a subtree. The target resets to the
    /// top level when the tree is cleared.
    pub fn set_target(&mut self, target: Option<NodeId>) -> Result<(), ResultsError> {
        if let Some(id) = target {
            self.slot(id)?;
        }
        self.target = target;
        Ok(())
    }

    /// The parent used by [`ResultSink::add_batch`].
    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    /// Resolves a handle to an arena slot.
    fn slot(&self, node: NodeId) -> Result<usize, ResultsError> {
        if node.cycle != self.cycle {
            return Err(ResultsError::StaleNode {
                node,
                current: self.cycle,
            });
        }
        if node.index >= self.nodes.len() {
            return Err(ResultsError::UnknownNode { node });
        }
        Ok(node.index)
    }

    /// Builds a handle for a slot in the current cycle.
    fn id(&self, index: usize) -> NodeId {
        NodeId {
            cycle: self.cycle,
            index,
        }
    }

    /// Child slots of a parent slot, or the top-level slots.
    fn siblings(&self, parent: Option<usize>) -> &[usize] {
        match parent {
            Some(slot) => &self.nodes[slot].children,
            None => &self.roots,
        }
    }
}

impl ResultSink for LocationTreeModel {
    fn add_batch(&mut self, batch: LocationList) {
        if let Err(e) = self.add(batch, self.target) {
            warn!(error = %e, "dropping results for a stale tree target");
        }
    }

    fn clear(&mut self) {
        Self::clear(self);
    }

    fn first_location(&self) -> Option<&Location> {
        Self::first_location(self)
    }

    fn is_empty(&self) -> bool {
        Self::is_empty(self)
    }
}
