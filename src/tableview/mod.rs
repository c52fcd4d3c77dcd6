//! Table view: binds row and group descriptors to a list widget.
//!
//! The host application hands a [`ListController`] a raw sequence of
//! [`ContentItem`]s. The sequence is reconciled into a [`DisplayModel`]:
//!
//! - with no groups the table is **flat**, a single section of rows;
//! - with groups the table is **grouped**; each group owns the rows that
//!   follow it, and rows before the first group are not displayed.
//!
//! The controller answers the host widget's questions through [`DataSource`]
//! (counts, rendering, heights, edit actions) and drives it through
//! [`HostWidget`] (reloads, animated inserts and deletes, selection). Flat
//! tables also support incremental [`insert`](ListController::insert) and
//! [`remove`](ListController::remove), applied in a single host transaction.
//!
//! Rows are [`Row`] handles (`Arc<RowDescriptor>`) and are located by instance
//! identity with [`coordinate_of`](ListController::coordinate_of). A row bound
//! into a table can ask to be redrawn with
//! [`RowDescriptor::reload_me`], which yields a command whose message is routed
//! back to the right table by id.
//!
//! [`TerminalTable`] is a ready-made host widget for bubbletea-rs programs.
//!
//! # Examples
//!
//! ```rust
//! use bubbletea_tableview::tableview::{
//!     default_templates, DefaultRow, ListController, RowAnimation, TerminalTable,
//! };
//! use bubbletea_tableview::template::TemplateCache;
//! use std::sync::Arc;
//!
//! let cache = Arc::new(TemplateCache::new(default_templates()));
//! let mut table = ListController::new(TerminalTable::new(40, 10), cache);
//!
//! let b = DefaultRow::new("b").into_row();
//! table.set_rows(vec![DefaultRow::new("a").into_row(), Arc::clone(&b)]);
//! table.insert_on_top(vec![DefaultRow::new("top")], RowAnimation::Top).unwrap();
//!
//! assert_eq!(table.coordinate_of(&b).map(|c| c.row), Some(2));
//! ```

mod api;
mod defaultrow;
mod descriptor;
mod host;
mod keys;
mod model;
mod reconcile;
mod rendering;
mod style;
mod terminal;
mod types;

#[cfg(test)]
mod tests;

pub use defaultrow::{default_templates, DefaultRow, DefaultSection};
pub use descriptor::{
    ContentItem, GroupDescriptor, ReloadRowMsg, ReloadTableMsg, Row, RowController,
    RowDescriptor, SectionController, TableId,
};
pub use host::{
    BatchUpdate, ContentOffset, HostWidget, ScrollEvent, TableEvent, TableObserver,
};
pub use keys::TableKeyMap;
pub use model::{DataSource, ListController};
pub use reconcile::{reconcile, DisplayModel};
pub use style::{TableStyles, CURSOR_MARK};
pub use terminal::{Action, Placement, TerminalTable};
pub use types::{
    Coordinate, DimensionMode, DisplayMode, EditAction, Entry, RowAnimation, ScrollPosition,
};
