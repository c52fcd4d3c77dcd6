//! Row and group descriptors.
//!
//! A descriptor is the host's representation of one row or one section header.
//! It carries the behaviour for that line (through a [`RowController`] or
//! [`SectionController`]) but is not itself a view: views come from the
//! [`TemplateCache`] using the descriptor's reuse key, which is derived from the
//! concrete controller type.
//!
//! Rows are shared as [`Row`] (`Arc<RowDescriptor>`) and compared by instance
//! identity, so the host can keep its own handle and later ask the table where
//! that exact row lives. Groups are handed over by value; the engine fills in
//! their row lists.

use super::types::{Coordinate, EditAction, RowAnimation};
use crate::error::TemplateError;
use crate::template::{TemplateCache, TemplateKey, View, ViewOwner, ViewSlot};
use bubbletea_rs::{Cmd, Msg};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static LAST_ID: AtomicU64 = AtomicU64::new(0);

fn next_id() -> u64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Identifies a [`ListController`](super::ListController) instance.
pub type TableId = u64;

const UNBOUND: TableId = 0;

/// Per-type behaviour of a row.
///
/// Only [`render`](RowController::render) is required. The type implementing
/// this trait also selects the row's template: its type name is the reuse key.
///
/// ```rust
/// use bubbletea_tableview::tableview::RowController;
/// use bubbletea_tableview::template::View;
///
/// struct TaskRow {
///     title: String,
/// }
///
/// impl RowController for TaskRow {
///     fn render(&self, view: &View, selected: bool) -> String {
///         let marker = if selected { "> " } else { "  " };
///         view.render(&format!("{marker}{}", self.title))
///     }
/// }
/// ```
pub trait RowController: Send + Sync + 'static {
    /// Renders the row's content into its bound view.
    fn render(&self, view: &View, selected: bool) -> String;

    /// Height in lines when the table uses automatic dimensions.
    fn height(&self) -> usize {
        1
    }

    /// Whether the row may be edited.
    fn can_edit(&self) -> bool {
        false
    }

    /// Actions offered while editing the row.
    fn edit_actions(&self) -> Vec<EditAction> {
        Vec::new()
    }

    /// Called when the row is selected at `coordinate`.
    fn on_select(&self, _coordinate: Coordinate) {}
}

/// Per-type behaviour of a section header.
pub trait SectionController: Send + Sync + 'static {
    /// Renders the header into its bound view.
    fn render_header(&self, view: &View) -> String;

    /// Header height in lines.
    fn header_height(&self) -> usize {
        1
    }

    /// Plain-text header title.
    fn title(&self) -> String {
        String::new()
    }
}

/// A row descriptor. See the module docs.
pub struct RowDescriptor {
    id: u64,
    reuse_key: &'static str,
    origin: Option<String>,
    pinned: bool,
    views: ViewSlot,
    table: AtomicU64,
    controller: Box<dyn RowController>,
}

/// Shared handle to a row; equality is instance identity (`Arc::ptr_eq`).
pub type Row = Arc<RowDescriptor>;

impl RowDescriptor {
    /// Creates a descriptor for `controller`, using its type name as reuse key.
    pub fn new<C: RowController>(controller: C) -> Self {
        Self {
            id: next_id(),
            reuse_key: std::any::type_name::<C>(),
            origin: None,
            pinned: false,
            views: ViewSlot::default(),
            table: AtomicU64::new(UNBOUND),
            controller: Box::new(controller),
        }
    }

    /// Loads the template from the `origin` namespace instead of the default.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Keeps one persistent view for the lifetime of this descriptor.
    pub fn pinned(mut self) -> Self {
        self.pinned = true;
        self
    }

    /// Wraps the descriptor into a shareable [`Row`].
    pub fn into_row(self) -> Row {
        Arc::new(self)
    }

    /// Process-unique id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Reuse key derived from the controller type.
    pub fn reuse_key(&self) -> &'static str {
        self.reuse_key
    }

    /// Origin namespace, if any.
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Template key used to resolve this row's views.
    pub fn template_key(&self) -> TemplateKey {
        TemplateKey::new(self.reuse_key, self.origin.as_deref())
    }

    /// The row's behaviour.
    pub fn controller(&self) -> &dyn RowController {
        self.controller.as_ref()
    }

    /// View currently bound to this row.
    pub fn bound_view(&self) -> Option<Arc<View>> {
        self.views.bound()
    }

    /// Table this row was last bound into.
    pub fn table(&self) -> Option<TableId> {
        match self.table.load(Ordering::SeqCst) {
            UNBOUND => None,
            id => Some(id),
        }
    }

    pub(crate) fn bind_table(&self, table: TableId) {
        self.table.store(table, Ordering::SeqCst);
    }

    /// Obtains a view for this row from `cache`.
    pub fn load_view(&self, cache: &TemplateCache) -> Result<Arc<View>, TemplateError> {
        cache.load_or_get(&self.template_key(), self)
    }

    /// Asks the owning table to redraw this row.
    ///
    /// Returns `None` while the row has not been bound into a table.
    pub fn reload_me(&self, animation: RowAnimation) -> Option<Cmd> {
        let table = self.table()?;
        let msg = ReloadRowMsg {
            table,
            row: self.id,
            animation,
        };
        Some(Box::pin(async move { Some(Box::new(msg) as Msg) }))
    }
}

impl ViewOwner for RowDescriptor {
    fn view_slot(&self) -> &ViewSlot {
        &self.views
    }

    fn is_pinned(&self) -> bool {
        self.pinned
    }
}

impl fmt::Debug for RowDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowDescriptor")
            .field("id", &self.id)
            .field("reuse_key", &self.reuse_key)
            .field("origin", &self.origin)
            .field("pinned", &self.pinned)
            .finish_non_exhaustive()
    }
}

/// A group (section) descriptor.
pub struct GroupDescriptor {
    id: u64,
    reuse_key: &'static str,
    origin: Option<String>,
    rows: Option<Vec<Row>>,
    views: ViewSlot,
    table: AtomicU64,
    controller: Box<dyn SectionController>,
}

impl GroupDescriptor {
    /// Creates a group for `controller`, using its type name as reuse key.
    pub fn new<C: SectionController>(controller: C) -> Self {
        Self {
            id: next_id(),
            reuse_key: std::any::type_name::<C>(),
            origin: None,
            rows: None,
            views: ViewSlot::default(),
            table: AtomicU64::new(UNBOUND),
            controller: Box::new(controller),
        }
    }

    /// Loads the header template from the `origin` namespace.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Process-unique id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Reuse key derived from the controller type.
    pub fn reuse_key(&self) -> &'static str {
        self.reuse_key
    }

    /// Origin namespace, if any.
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Template key used to resolve the header view.
    pub fn template_key(&self) -> TemplateKey {
        TemplateKey::new(self.reuse_key, self.origin.as_deref())
    }

    /// The header's behaviour.
    pub fn controller(&self) -> &dyn SectionController {
        self.controller.as_ref()
    }

    /// Rows assigned by the engine; `None` until the group has been reconciled.
    pub fn rows(&self) -> Option<&[Row]> {
        self.rows.as_deref()
    }

    /// Number of assigned rows.
    pub fn row_count(&self) -> usize {
        self.rows.as_ref().map_or(0, Vec::len)
    }

    pub(crate) fn assign_rows(&mut self, rows: Vec<Row>) {
        self.rows = Some(rows);
    }

    /// View currently bound to the header.
    pub fn bound_view(&self) -> Option<Arc<View>> {
        self.views.bound()
    }

    /// Table this group was last bound into.
    pub fn table(&self) -> Option<TableId> {
        match self.table.load(Ordering::SeqCst) {
            UNBOUND => None,
            id => Some(id),
        }
    }

    pub(crate) fn bind_table(&self, table: TableId) {
        self.table.store(table, Ordering::SeqCst);
    }

    /// Obtains a header view from `cache`.
    pub fn load_view(&self, cache: &TemplateCache) -> Result<Arc<View>, TemplateError> {
        cache.load_or_get(&self.template_key(), self)
    }

    /// Asks the owning table to reload everything.
    pub fn reload_me(&self) -> Option<Cmd> {
        let table = self.table()?;
        Some(Box::pin(async move {
            Some(Box::new(ReloadTableMsg { table }) as Msg)
        }))
    }
}

impl ViewOwner for GroupDescriptor {
    fn view_slot(&self) -> &ViewSlot {
        &self.views
    }
}

impl fmt::Debug for GroupDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupDescriptor")
            .field("id", &self.id)
            .field("reuse_key", &self.reuse_key)
            .field("origin", &self.origin)
            .field("rows", &self.rows.as_ref().map(Vec::len))
            .finish_non_exhaustive()
    }
}

/// One element of the raw sequence assigned to a table.
#[derive(Debug)]
pub enum ContentItem {
    /// A row.
    Row(Row),
    /// A section header; the rows following it belong to it.
    Group(GroupDescriptor),
}

impl ContentItem {
    /// True for [`ContentItem::Group`].
    pub fn is_group(&self) -> bool {
        matches!(self, ContentItem::Group(_))
    }
}

impl From<Row> for ContentItem {
    fn from(row: Row) -> Self {
        ContentItem::Row(row)
    }
}

impl From<RowDescriptor> for ContentItem {
    fn from(row: RowDescriptor) -> Self {
        ContentItem::Row(row.into_row())
    }
}

impl From<GroupDescriptor> for ContentItem {
    fn from(group: GroupDescriptor) -> Self {
        ContentItem::Group(group)
    }
}

/// Sent by [`RowDescriptor::reload_me`]; routed to the owning table by id.
#[derive(Debug, Clone)]
pub struct ReloadRowMsg {
    /// Target table.
    pub table: TableId,
    /// Id of the row to reload.
    pub row: u64,
    /// Requested animation.
    pub animation: RowAnimation,
}

/// Sent by [`GroupDescriptor::reload_me`].
#[derive(Debug, Clone)]
pub struct ReloadTableMsg {
    /// Target table.
    pub table: TableId,
}
