//! The list controller: owns the display model and answers the host widget.
//!
//! `ListController<H>` sits between the host application, which assigns
//! descriptors and requests mutations, and the host widget `H`, which reads
//! counts and content through [`DataSource`] and receives reload, animation
//! and selection requests through [`HostWidget`].

use super::descriptor::{ContentItem, GroupDescriptor, ReloadRowMsg, ReloadTableMsg, Row, TableId};
use super::host::{HostWidget, ScrollEvent, TableEvent, TableObserver};
use super::reconcile::{reconcile, unique_rows, DisplayModel};
use std::collections::HashSet;
use super::types::{Coordinate, DisplayMode, EditAction, Entry, RowAnimation, ScrollPosition};
use crate::error::TableError;
use crate::template::TemplateCache;
use bubbletea_rs::Msg;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

static LAST_TABLE_ID: AtomicU64 = AtomicU64::new(0);

fn next_table_id() -> TableId {
    LAST_TABLE_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// What a host widget reads to display a table.
///
/// Every method is best effort: unknown coordinates yield zero, `false`, or
/// `None` rather than an error. Only rendering can fail, when a descriptor's
/// template is missing.
pub trait DataSource {
    /// Number of sections.
    fn section_count(&self) -> usize;

    /// Rows in `section`.
    fn row_count(&self, section: usize) -> usize;

    /// Row at `coordinate`.
    fn descriptor_at(&self, coordinate: Coordinate) -> Option<&Row>;

    /// Headers and rows in display order.
    fn entries(&self) -> Vec<Entry>;

    /// Renders the row at `coordinate`; `Ok(None)` if there is no such row.
    fn cell_for_row(&self, coordinate: Coordinate, selected: bool) -> Result<Option<String>, TableError>;

    /// Renders the header of `section`; `Ok(None)` in flat mode.
    fn header_for_section(&self, section: usize) -> Result<Option<String>, TableError>;

    /// Height of the row at `coordinate` as reported by its controller.
    fn row_height(&self, coordinate: Coordinate) -> usize;

    /// Header height of `section`; 0 when there are no groups.
    fn header_height(&self, section: usize) -> usize;

    /// Plain title of `section`'s header.
    fn title_for_header(&self, section: usize) -> Option<String>;

    /// Whether the row at `coordinate` can be edited.
    fn can_edit_row(&self, coordinate: Coordinate) -> bool;

    /// Edit actions offered by the row at `coordinate`.
    fn edit_actions_for_row(&self, coordinate: Coordinate) -> Vec<EditAction>;

    /// Tells the table a row is about to be displayed.
    fn will_display_row(&self, coordinate: Coordinate);
}

/// Binds descriptors to a host widget.
///
/// # Examples
///
/// ```rust
/// use bubbletea_tableview::tableview::{DataSource, DefaultRow, DefaultSection, ListController, TerminalTable};
/// use bubbletea_tableview::template::TemplateCache;
/// use std::sync::Arc;
///
/// let cache = Arc::new(TemplateCache::new(bubbletea_tableview::tableview::default_templates()));
/// let mut table = ListController::new(TerminalTable::new(40, 10), cache);
///
/// table.set_items(vec![
///     DefaultSection::new("Fruit").into(),
///     DefaultRow::new("Apple").into(),
///     DefaultRow::new("Pear").into(),
/// ]);
/// assert_eq!(table.section_count(), 1);
/// assert_eq!(table.row_count(0), 2);
/// ```
pub struct ListController<H: HostWidget> {
    id: TableId,
    pub(super) model: DisplayModel,
    pub(super) host: H,
    cache: Arc<TemplateCache>,
    observer: Option<Weak<dyn TableObserver>>,
}

impl<H: HostWidget> ListController<H> {
    /// Creates an empty, flat table displayed by `host`.
    pub fn new(host: H, cache: Arc<TemplateCache>) -> Self {
        Self {
            id: next_table_id(),
            model: DisplayModel::default(),
            host,
            cache,
            observer: None,
        }
    }

    /// Unique id used to route descriptor messages.
    pub fn id(&self) -> TableId {
        self.id
    }

    /// The host widget.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host widget.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The template cache views are loaded from.
    pub fn cache(&self) -> &Arc<TemplateCache> {
        &self.cache
    }

    /// Current display model.
    pub fn model(&self) -> &DisplayModel {
        &self.model
    }

    /// Active display mode.
    pub fn mode(&self) -> DisplayMode {
        self.model.mode()
    }

    /// Rows of a flat model; `None` when grouped.
    pub fn rows(&self) -> Option<&[Row]> {
        match &self.model {
            DisplayModel::Flat { rows } => Some(rows),
            DisplayModel::Grouped { .. } => None,
        }
    }

    /// Groups of a grouped model; `None` when flat.
    pub fn groups(&self) -> Option<&[GroupDescriptor]> {
        match &self.model {
            DisplayModel::Flat { .. } => None,
            DisplayModel::Grouped { groups } => Some(groups),
        }
    }

    /// Group at `section`.
    pub fn section_at(&self, section: usize) -> Option<&GroupDescriptor> {
        self.model.group_at(section)
    }

    /// Registers the single observer. Only a weak reference is kept: dropping
    /// the last `Arc` stops delivery.
    pub fn set_observer<O: TableObserver + 'static>(&mut self, observer: &Arc<O>) {
        let weak: Weak<dyn TableObserver> = Arc::downgrade(observer) as Weak<O>;
        self.observer = Some(weak);
    }

    /// Removes the observer.
    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    fn notify(&self, event: TableEvent) {
        if let Some(observer) = self.observer.as_ref().and_then(Weak::upgrade) {
            observer.on_event(&event);
        }
    }

    /// Replaces the content with a raw sequence of rows and groups.
    ///
    /// The sequence is reconciled into a flat or grouped model and the host
    /// reloads everything.
    pub fn set_items(&mut self, items: Vec<ContentItem>) {
        self.model = reconcile(items);
        self.bind_all();
        tracing::debug!(table = self.id, mode = ?self.model.mode(), "content assigned");
        self.host.reload_data();
    }

    /// Replaces the content with a flat list of rows.
    ///
    /// A handle listed more than once is displayed only at its first position.
    pub fn set_rows(&mut self, rows: Vec<Row>) {
        let rows = unique_rows(rows, &mut HashSet::new());
        self.model = DisplayModel::Flat { rows };
        self.bind_all();
        tracing::debug!(table = self.id, "rows assigned");
        self.host.reload_data();
    }

    fn bind_all(&self) {
        if let DisplayModel::Grouped { groups } = &self.model {
            for group in groups {
                group.bind_table(self.id);
            }
        }
        for (_, row) in self.model.rows() {
            row.bind_table(self.id);
        }
    }

    /// Where `row` currently is, by instance identity.
    pub fn coordinate_of(&self, row: &Row) -> Option<Coordinate> {
        self.model.coordinate_of(row)
    }

    /// Mirrors a selection made by the application onto the host, without
    /// animating or scrolling. Does nothing if `row` is not displayed.
    pub fn mark_as_selected(&mut self, row: &Row) {
        if let Some(coordinate) = self.coordinate_of(row) {
            self.host
                .select_row(coordinate, false, ScrollPosition::None);
        }
    }

    /// Redraws `row` in place. Returns `false` if it is not displayed.
    pub fn reload_row(&mut self, row: &Row, animation: RowAnimation) -> bool {
        match self.coordinate_of(row) {
            Some(coordinate) => {
                self.host.reload_rows(&[coordinate], animation);
                true
            }
            None => false,
        }
    }

    /// Reloads everything.
    pub fn reload_data(&mut self) {
        self.host.reload_data();
    }

    /// Handles a reload request sent by a descriptor of this table.
    ///
    /// Returns `true` if `msg` was a reload message addressed to this table.
    pub fn handle_reload(&mut self, msg: &Msg) -> bool {
        if let Some(reload) = msg.downcast_ref::<ReloadRowMsg>() {
            if reload.table != self.id {
                return false;
            }
            match self.model.coordinate_of_id(reload.row) {
                Some((coordinate, _)) => self.host.reload_rows(&[coordinate], reload.animation),
                None => tracing::debug!(row = reload.row, "reload for a row no longer displayed"),
            }
            return true;
        }
        if let Some(reload) = msg.downcast_ref::<ReloadTableMsg>() {
            if reload.table != self.id {
                return false;
            }
            self.host.reload_data();
            return true;
        }
        false
    }

    /// Called by the host when the user selects the row at `coordinate`.
    pub fn did_select_row(&self, coordinate: Coordinate) {
        let Some(row) = self.model.row_at(coordinate) else {
            return;
        };
        row.controller().on_select(coordinate);
        self.notify(TableEvent::RowSelected {
            row: Arc::clone(row),
            coordinate,
        });
    }

    /// Forwards a scroll notification from the host to the observer.
    pub fn scroll(&self, event: ScrollEvent) {
        self.notify(TableEvent::Scroll(event));
    }
}

impl<H: HostWidget> DataSource for ListController<H> {
    fn section_count(&self) -> usize {
        self.model.section_count()
    }

    fn row_count(&self, section: usize) -> usize {
        self.model.row_count(section)
    }

    fn descriptor_at(&self, coordinate: Coordinate) -> Option<&Row> {
        self.model.row_at(coordinate)
    }

    fn entries(&self) -> Vec<Entry> {
        self.model.entries()
    }

    fn cell_for_row(&self, coordinate: Coordinate, selected: bool) -> Result<Option<String>, TableError> {
        let Some(row) = self.model.row_at(coordinate) else {
            return Ok(None);
        };
        row.bind_table(self.id);
        let view = row.load_view(&self.cache)?;
        Ok(Some(row.controller().render(&view, selected)))
    }

    fn header_for_section(&self, section: usize) -> Result<Option<String>, TableError> {
        let Some(group) = self.model.group_at(section) else {
            return Ok(None);
        };
        group.bind_table(self.id);
        let view = group.load_view(&self.cache)?;
        Ok(Some(group.controller().render_header(&view)))
    }

    fn row_height(&self, coordinate: Coordinate) -> usize {
        self.model
            .row_at(coordinate)
            .map_or(0, |row| row.controller().height())
    }

    fn header_height(&self, section: usize) -> usize {
        self.model
            .group_at(section)
            .map_or(0, |group| group.controller().header_height())
    }

    fn title_for_header(&self, section: usize) -> Option<String> {
        self.model
            .group_at(section)
            .map(|group| group.controller().title())
    }

    fn can_edit_row(&self, coordinate: Coordinate) -> bool {
        self.model
            .row_at(coordinate)
            .is_some_and(|row| row.controller().can_edit())
    }

    fn edit_actions_for_row(&self, coordinate: Coordinate) -> Vec<EditAction> {
        self.model
            .row_at(coordinate)
            .map(|row| row.controller().edit_actions())
            .unwrap_or_default()
    }

    fn will_display_row(&self, coordinate: Coordinate) {
        if let Some(row) = self.model.row_at(coordinate) {
            self.notify(TableEvent::WillDisplay {
                row: Arc::clone(row),
                coordinate,
            });
        }
    }
}
