//! Flat result list.

use ks_query::{Location, LocationList};

use crate::{Column, ModelEvent, ResultSink, event::Observers};

/// An ordered list of locations with a fixed column projection.
///
/// Rows keep arrival order; adding `[A]` then `[B]` is indistinguishable from
/// adding `[A, B]` at once, apart from the notifications sent.
#[derive(Debug, Default)]
pub struct LocationListModel {
    /// Columns shown, in display order.
    columns: Vec<Column>,
    /// Rows.
    locations: Vec<Location>,
    /// Change subscribers.
    observers: Observers,
}

impl LocationListModel {
    /// Creates an empty list showing `columns`.
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

    /// Appends locations and announces the inserted range. Empty batches are
    /// ignored.
    pub fn add(&mut self, batch: LocationList) {
        if batch.is_empty() {
            return;
        }
        let first = self.locations.len();
        self.locations.extend(batch);
        self.observers.emit(&ModelEvent::RowsInserted {
            parent: None,
            first,
            last: self.locations.len() - 1,
        });
    }

    /// Removes every row and announces a reset.
    pub fn clear(&mut self) {
        self.locations.clear();
        self.observers.emit(&ModelEvent::Reset);
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// The location at `row`.
    pub fn location(&self, row: usize) -> Option<&Location> {
        self.locations.get(row)
    }

    /// The first row, if any.
    pub fn first_location(&self) -> Option<&Location> {
        self.locations.first()
    }

    /// The displayed columns.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Cell text at `(row, column)`, `None` outside the list or the projection.
    pub fn data(&self, row: usize, column: usize) -> Option<String> {
        let column = self.columns.get(column)?;
        self.locations.get(row).map(|loc| column.value(loc))
    }

    /// Header title of a displayed column.
    pub fn header(&self, column: usize) -> Option<&'static str> {
        self.columns.get(column).map(|c| c.title())
    }

    /// Iterates over the rows in order.
    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }
}

impl ResultSink for LocationListModel {
    fn add_batch(&mut self, batch: LocationList) {
        self.add(batch);
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

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    fn loc(file: &str, line: u32) -> Location {
        Location::new(file, line).with_text(format!("{file} line {line}"))
    }

    fn recorded(model: &mut LocationListModel) -> Rc<RefCell<Vec<ModelEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        model.subscribe(move |e| sink.borrow_mut().push(*e));
        events
    }

    #[test]
    fn split_and_single_adds_give_the_same_rows() {
        let mut split = LocationListModel::new([Column::File, Column::Line]);
        split.add(vec![loc("a.c", 1)]);
        split.add(vec![loc("b.c", 2)]);

        let mut single = LocationListModel::new([Column::File, Column::Line]);
        single.add(vec![loc("a.c", 1), loc("b.c", 2)]);

        assert!(split.iter().eq(single.iter()));
    }

    #[test]
    fn add_announces_inserted_range() {
        let mut model = LocationListModel::new([Column::File]);
        let events = recorded(&mut model);

        model.add(vec![loc("a.c", 1), loc("a.c", 2)]);
        model.add(vec![loc("b.c", 3)]);
        model.add(Vec::new());

        assert_eq!(
            *events.borrow(),
            vec![
                ModelEvent::RowsInserted {
                    parent: None,
                    first: 0,
                    last: 1
                },
                ModelEvent::RowsInserted {
                    parent: None,
                    first: 2,
                    last: 2
                },
            ]
        );
    }

    #[test]
    fn clear_resets() {
        let mut model = LocationListModel::new([Column::File]);
        model.add(vec![loc("a.c", 1)]);
        let events = recorded(&mut model);

        model.clear();
        assert!(model.is_empty());
        assert_eq!(model.first_location(), None);
        assert_eq!(*events.borrow(), vec![ModelEvent::Reset]);
    }

    #[test]
    fn data_follows_the_projection() {
        let mut model = LocationListModel::new([Column::Scope, Column::File, Column::Line]);
        model.add(vec![loc("a.c", 10).with_scope("main")]);

        assert_eq!(model.data(0, 0).as_deref(), Some("main"));
        assert_eq!(model.data(0, 1).as_deref(), Some("a.c"));
        assert_eq!(model.data(0, 2).as_deref(), Some("10"));
        assert_eq!(model.header(2), Some("Line"));
    }

    #[test]
    fn out_of_range_cells_are_empty() {
        let mut model = LocationListModel::new([Column::File]);
        model.add(vec![loc("a.c", 1)]);

        assert_eq!(model.data(1, 0), None);
        assert_eq!(model.data(0, 1), None);
        assert_eq!(model.header(1), None);
        assert_eq!(model.location(3), None);
    }
}
