#![warn(missing_docs)]
#![doc(html_root_url = "https://docs.rs/bubbletea-tableview/")]

//! # bubbletea-tableview
//!
//! A table view engine for [bubbletea-rs](https://github.com/joshka/bubbletea-rs)
//! applications: hand it an ordered mix of row and group descriptors and it
//! keeps a list widget in sync with them.
//!
//! ## Overview
//!
//! Each row or section header is a *descriptor* carrying its own behaviour
//! (a [`RowController`](tableview::RowController) or
//! [`SectionController`](tableview::SectionController)). The descriptor type
//! selects a visual template; views are instantiated from templates through a
//! shared [`TemplateCache`](template::TemplateCache).
//!
//! The [`ListController`](tableview::ListController) reconciles the raw
//! descriptor sequence into a flat or grouped display model, answers the host
//! widget's count and content queries, and drives animated inserts, removals,
//! reloads and selection.
//!
//! ## Features
//!
//! - **Flat or grouped** display, decided by the content itself
//! - **Identity lookups**: find where a row handle currently lives
//! - **Batched mutations** applied in one host transaction
//! - **Template reuse** with optional pinned, persistent views
//! - **Self-reloading rows** through bubbletea commands
//! - **Terminal host** ready to drop into a bubbletea-rs program
//!
//! ## Quick Start
//!
//! ```rust
//! use bubbletea_tableview::prelude::*;
//! use bubbletea_rs::Model as _;
//! use std::sync::Arc;
//!
//! let cache = Arc::new(TemplateCache::new(default_templates()));
//! let mut table = ListController::new(TerminalTable::new(40, 10), cache);
//!
//! table.set_items(vec![
//!     DefaultSection::new("Inbox").into(),
//!     DefaultRow::new("Reply to Sam").into(),
//!     DefaultSection::new("Later").into(),
//!     DefaultRow::new("Tidy the garage").into(),
//! ]);
//!
//! assert_eq!(table.mode(), DisplayMode::Grouped);
//! assert_eq!(table.section_count(), 2);
//! assert!(table.view().contains("Inbox"));
//! ```
//!
//! ## Custom Rows
//!
//! ```rust
//! use bubbletea_tableview::prelude::*;
//! use bubbletea_tableview::template::{Blueprint, View};
//! use lipgloss_extras::lipgloss::Style;
//! use std::sync::Arc;
//!
//! struct Download {
//!     name: String,
//!     percent: u8,
//! }
//!
//! impl RowController for Download {
//!     fn render(&self, view: &View, _selected: bool) -> String {
//!         view.render(&format!("{} {:>3}%", self.name, self.percent))
//!     }
//! }
//!
//! let registry = default_templates().with_template(
//!     std::any::type_name::<Download>(),
//!     None,
//!     Blueprint::new(Style::new().italic(true)),
//! );
//! let cache = Arc::new(TemplateCache::new(registry));
//! let mut table = ListController::new(TerminalTable::new(40, 10), cache);
//!
//! let row = RowDescriptor::new(Download { name: "iso".into(), percent: 40 }).into_row();
//! table.set_rows(vec![Arc::clone(&row)]);
//! assert_eq!(table.coordinate_of(&row), Some(Coordinate::new(0, 0)));
//! ```

pub mod error;
pub mod key;
pub mod tableview;
pub mod template;

pub use error::{TableError, TemplateError};
pub use key::{Binding, Help as KeyHelp, KeyMap};
pub use tableview::{
    Coordinate, ContentItem, DataSource, DefaultRow, DefaultSection, DisplayMode,
    GroupDescriptor, HostWidget, ListController, Row, RowAnimation, RowController,
    RowDescriptor, SectionController, TerminalTable,
};
pub use template::{Blueprint, TemplateCache, TemplateKey, TemplateLoader, TemplateRegistry};

/// Prelude module for convenient imports.
///
/// ```rust
/// use bubbletea_tableview::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{TableError, TemplateError};
    pub use crate::key::{Binding, KeyMap};
    pub use crate::tableview::{
        default_templates, ContentItem, Coordinate, DataSource, DefaultRow, DefaultSection,
        DimensionMode, DisplayMode, EditAction, GroupDescriptor, HostWidget, ListController, Row,
        RowAnimation, RowController, RowDescriptor, ScrollEvent, ScrollPosition,
        SectionController, TableEvent, TableKeyMap, TableObserver, TableStyles, TerminalTable,
    };
    pub use crate::template::{TemplateCache, TemplateRegistry};
}
