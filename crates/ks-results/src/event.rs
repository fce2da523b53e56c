//! Change notifications emitted by result models.

use std::fmt;

use crate::NodeId;

/// A change to a model's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelEvent {
    /// Rows `first..=last` were inserted under `parent` (`None` = top level).
    RowsInserted {
        /// Parent of the new rows; always `None` for lists.
        parent: Option<NodeId>,
        /// Index of the first new row among its siblings.
        first: usize,
        /// Index of the last new row among its siblings.
        last: usize,
    },
    /// Every row was removed.
    Reset,
}

/// Subscribers to a model's events, invoked synchronously in subscription order.
#[derive(Default)]
pub struct Observers {
    /// Registered callbacks.
    callbacks: Vec<Box<dyn FnMut(&ModelEvent)>>,
}

impl Observers {
    /// Registers a callback.
    pub fn subscribe(&mut self, callback: impl FnMut(&ModelEvent) + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    /// Delivers an event to every callback.
    pub fn emit(&mut self, event: &ModelEvent) {
        for callback in &mut self.callbacks {
            callback(event);
        }
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}
