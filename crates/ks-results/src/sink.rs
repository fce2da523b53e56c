//! The interface a query view feeds.

use ks_query::{Location, LocationList};

/// A structure accumulating streamed locations.
pub trait ResultSink {
    /// Appends a batch in arrival order.
    fn add_batch(&mut self, batch: LocationList);

    /// Removes every location.
    fn clear(&mut self);

    /// The first location, if any.
    fn first_location(&self) -> Option<&Location>;

    /// Whether the sink holds no locations.
    fn is_empty(&self) -> bool;
}
