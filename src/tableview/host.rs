//! Boundary contracts: the host widget that displays the table and the
//! observer that receives its events.

use super::descriptor::Row;
use super::types::{Coordinate, RowAnimation, ScrollPosition};

/// Scroll offset of the host's content, in host units (lines for terminals).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContentOffset {
    /// Horizontal offset.
    pub x: usize,
    /// Vertical offset.
    pub y: usize,
}

impl ContentOffset {
    /// Creates an offset.
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Row changes animated together in one visual transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchUpdate {
    /// Coordinates of inserted rows, after the change.
    pub inserted: Vec<Coordinate>,
    /// Coordinates of deleted rows, before the change.
    pub deleted: Vec<Coordinate>,
    /// Animation for both lists.
    pub animation: RowAnimation,
}

impl BatchUpdate {
    /// A batch that only inserts.
    pub fn insert(coordinates: Vec<Coordinate>, animation: RowAnimation) -> Self {
        Self {
            inserted: coordinates,
            deleted: Vec::new(),
            animation,
        }
    }

    /// A batch that only deletes.
    pub fn delete(coordinates: Vec<Coordinate>, animation: RowAnimation) -> Self {
        Self {
            inserted: Vec::new(),
            deleted: coordinates,
            animation,
        }
    }
}

/// The list widget that displays a table.
///
/// The widget reads counts and content from a
/// [`DataSource`](super::DataSource); this trait covers the calls flowing the
/// other way.
pub trait HostWidget {
    /// Discards all displayed state and re-reads everything.
    fn reload_data(&mut self);

    /// Whether [`perform_batch_updates`](HostWidget::perform_batch_updates)
    /// should be used. Hosts returning `false` get a
    /// [`begin_updates`](HostWidget::begin_updates) /
    /// [`end_updates`](HostWidget::end_updates) bracket instead.
    fn supports_batch_updates(&self) -> bool {
        true
    }

    /// Runs `apply` (the structural change to the backing rows) and animates
    /// `update` as one transaction.
    fn perform_batch_updates(&mut self, apply: &mut dyn FnMut(), update: BatchUpdate) {
        self.begin_updates();
        apply();
        if !update.deleted.is_empty() {
            self.delete_rows(&update.deleted, update.animation);
        }
        if !update.inserted.is_empty() {
            self.insert_rows(&update.inserted, update.animation);
        }
        self.end_updates();
    }

    /// Opens an update bracket.
    fn begin_updates(&mut self) {}

    /// Closes an update bracket.
    fn end_updates(&mut self) {}

    /// Animates the insertion of rows.
    fn insert_rows(&mut self, at: &[Coordinate], animation: RowAnimation);

    /// Animates the deletion of rows.
    fn delete_rows(&mut self, at: &[Coordinate], animation: RowAnimation);

    /// Redraws rows in place.
    fn reload_rows(&mut self, at: &[Coordinate], animation: RowAnimation);

    /// Marks a row as selected.
    fn select_row(&mut self, at: Coordinate, animated: bool, scroll: ScrollPosition);
}

/// Scroll notifications forwarded from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollEvent {
    /// The content offset changed.
    DidScroll {
        /// New offset.
        offset: ContentOffset,
    },
    /// A drag gesture is about to start.
    WillBeginDragging {
        /// Offset at the start of the drag.
        offset: ContentOffset,
    },
    /// A drag gesture ended.
    DidEndDragging {
        /// Offset at the end of the drag.
        offset: ContentOffset,
        /// Whether scrolling continues after the drag.
        will_decelerate: bool,
    },
    /// Scrolling came to rest after a drag.
    DidEndDecelerating {
        /// Final offset.
        offset: ContentOffset,
    },
}

impl ScrollEvent {
    /// The offset carried by the event.
    pub fn offset(&self) -> ContentOffset {
        match *self {
            ScrollEvent::DidScroll { offset }
            | ScrollEvent::WillBeginDragging { offset }
            | ScrollEvent::DidEndDragging { offset, .. }
            | ScrollEvent::DidEndDecelerating { offset } => offset,
        }
    }
}

/// Events delivered to a [`TableObserver`].
#[derive(Debug, Clone)]
pub enum TableEvent {
    /// A row was selected.
    RowSelected {
        /// The selected row.
        row: Row,
        /// Where it is.
        coordinate: Coordinate,
    },
    /// A row is about to be displayed.
    WillDisplay {
        /// The row.
        row: Row,
        /// Where it is.
        coordinate: Coordinate,
    },
    /// A scroll notification.
    Scroll(ScrollEvent),
}

/// Receives table events. Notifications are fire-and-forget.
///
/// Any `Fn(&TableEvent) + Send + Sync` closure is an observer.
pub trait TableObserver: Send + Sync {
    /// Handles one event.
    fn on_event(&self, event: &TableEvent);
}

impl<F> TableObserver for F
where
    F: Fn(&TableEvent) + Send + Sync,
{
    fn on_event(&self, event: &TableEvent) {
        self(event)
    }
}
