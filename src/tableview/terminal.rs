//! A terminal host widget.
//!
//! `TerminalTable` displays a table as lines of text inside a fixed viewport.
//! Rows and headers are stacked top to bottom; the viewport scrolls by whole
//! lines and the cursor row is marked in a one-column gutter. It keeps a small
//! record of the calls it received (reloads, transactions, reloaded rows) so
//! applications and tests can observe what the table asked for.
//!
//! Content is read through a [`DataSource`], so the widget never holds a
//! reference to the table that drives it.

use super::host::{BatchUpdate, ContentOffset, HostWidget};
use super::keys::TableKeyMap;
use super::model::DataSource;
use super::style::{TableStyles, CURSOR_MARK};
use super::types::{Coordinate, DimensionMode, Entry, RowAnimation, ScrollPosition};
use crate::error::TableError;
use bubbletea_rs::KeyMsg;
use std::cell::RefCell;
use std::collections::HashSet;

/// Where an entry sits in the content, in lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// The header or row.
    pub entry: Entry,
    /// First line.
    pub top: usize,
    /// Number of lines.
    pub height: usize,
}

impl Placement {
    fn bottom(&self) -> usize {
        self.top + self.height
    }

    fn row(&self) -> Option<Coordinate> {
        match self.entry {
            Entry::Row(coordinate) => Some(coordinate),
            Entry::Header(_) => None,
        }
    }
}

/// A user action recognised by [`TerminalTable::action_for`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Move the cursor one row up.
    CursorUp,
    /// Move the cursor one row down.
    CursorDown,
    /// Scroll one page up.
    PageUp,
    /// Scroll one page down.
    PageDown,
    /// Jump to the first row.
    GoToStart,
    /// Jump to the last row.
    GoToEnd,
    /// Select the cursor row.
    Select,
}

/// Line-based host widget for terminal applications.
#[derive(Debug, Clone)]
pub struct TerminalTable {
    width: usize,
    height: usize,
    offset: ContentOffset,
    cursor: Option<Coordinate>,
    selected: Option<Coordinate>,
    dimension_mode: DimensionMode,
    row_height: usize,
    styles: TableStyles,
    keymap: TableKeyMap,
    reloads: usize,
    transactions: usize,
    depth: usize,
    pending: Option<BatchUpdate>,
    last_batch: Option<BatchUpdate>,
    reloaded_rows: Vec<Coordinate>,
    scroll_request: Option<(Coordinate, ScrollPosition)>,
    // Ids of the rows visible after the last render.
    displayed: RefCell<HashSet<u64>>,
}

impl TerminalTable {
    /// Creates a widget with a `width` x `height` viewport.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            offset: ContentOffset::default(),
            cursor: None,
            selected: None,
            dimension_mode: DimensionMode::default(),
            row_height: 1,
            styles: TableStyles::default(),
            keymap: TableKeyMap::default(),
            reloads: 0,
            transactions: 0,
            depth: 0,
            pending: None,
            last_batch: None,
            reloaded_rows: Vec::new(),
            scroll_request: None,
            displayed: RefCell::default(),
        }
    }

    /// Replaces the styles.
    pub fn with_styles(mut self, styles: TableStyles) -> Self {
        self.styles = styles;
        self
    }

    /// Replaces the key bindings.
    pub fn with_keymap(mut self, keymap: TableKeyMap) -> Self {
        self.keymap = keymap;
        self
    }

    /// Chooses between a fixed row height and per-row heights.
    pub fn with_dimension_mode(mut self, mode: DimensionMode) -> Self {
        self.dimension_mode = mode;
        self
    }

    /// Sets the row height used in [`DimensionMode::Static`]. Clamped to 1.
    pub fn with_row_height(mut self, height: usize) -> Self {
        self.row_height = height.max(1);
        self
    }

    /// Resizes the viewport.
    pub fn set_size(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
    }

    /// Viewport width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Viewport height in lines.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Current scroll offset.
    pub fn offset(&self) -> ContentOffset {
        self.offset
    }

    /// Scrolls to `offset`. The vertical offset is clamped on the next layout.
    pub fn set_offset(&mut self, offset: ContentOffset) {
        self.offset = offset;
    }

    /// Row under the cursor.
    pub fn cursor(&self) -> Option<Coordinate> {
        self.cursor
    }

    /// Moves the cursor without selecting.
    pub fn set_cursor(&mut self, cursor: Option<Coordinate>) {
        self.cursor = cursor;
    }

    /// Row marked as selected.
    pub fn selected(&self) -> Option<Coordinate> {
        self.selected
    }

    /// Dimension mode.
    pub fn dimension_mode(&self) -> DimensionMode {
        self.dimension_mode
    }

    /// Styles.
    pub fn styles(&self) -> &TableStyles {
        &self.styles
    }

    /// Key bindings.
    pub fn keymap(&self) -> &TableKeyMap {
        &self.keymap
    }

    /// Number of full reloads received.
    pub fn reloads(&self) -> usize {
        self.reloads
    }

    /// Number of completed update transactions.
    pub fn transactions(&self) -> usize {
        self.transactions
    }

    /// Changes animated by the last completed transaction.
    pub fn last_batch(&self) -> Option<&BatchUpdate> {
        self.last_batch.as_ref()
    }

    /// Rows redrawn in place since the last full reload.
    pub fn reloaded_rows(&self) -> &[Coordinate] {
        &self.reloaded_rows
    }

    /// Maps a key press to an action.
    pub fn action_for(&self, key: &KeyMsg) -> Option<Action> {
        let km = &self.keymap;
        if km.cursor_up.matches(key) {
            Some(Action::CursorUp)
        } else if km.cursor_down.matches(key) {
            Some(Action::CursorDown)
        } else if km.page_up.matches(key) {
            Some(Action::PageUp)
        } else if km.page_down.matches(key) {
            Some(Action::PageDown)
        } else if km.go_to_start.matches(key) {
            Some(Action::GoToStart)
        } else if km.go_to_end.matches(key) {
            Some(Action::GoToEnd)
        } else if km.select.matches(key) {
            Some(Action::Select)
        } else {
            None
        }
    }

    /// Stacks every header and row of `source`.
    pub fn layout(&self, source: &dyn DataSource) -> Vec<Placement> {
        let mut top = 0;
        source
            .entries()
            .into_iter()
            .map(|entry| {
                let height = match entry {
                    Entry::Header(section) => source.header_height(section),
                    Entry::Row(coordinate) => match self.dimension_mode {
                        DimensionMode::Static => self.row_height,
                        DimensionMode::Automatic => source.row_height(coordinate),
                    },
                };
                let placement = Placement { entry, top, height };
                top += height;
                placement
            })
            .collect()
    }

    fn content_height(layout: &[Placement]) -> usize {
        layout.last().map_or(0, Placement::bottom)
    }

    fn max_offset(&self, layout: &[Placement]) -> usize {
        Self::content_height(layout).saturating_sub(self.height)
    }

    fn rows(layout: &[Placement]) -> impl Iterator<Item = &Placement> + '_ {
        layout.iter().filter(|p| p.row().is_some())
    }

    fn placement_of(layout: &[Placement], coordinate: Coordinate) -> Option<&Placement> {
        layout.iter().find(|p| p.row() == Some(coordinate))
    }

    /// Puts the cursor back on a displayed row after the content changed,
    /// preferring the nearest row at or after its old coordinate.
    pub fn clamp_cursor(&mut self, layout: &[Placement]) {
        let rows: Vec<Coordinate> = Self::rows(layout).filter_map(Placement::row).collect();
        self.cursor = match self.cursor {
            _ if rows.is_empty() => None,
            None => rows.first().copied(),
            Some(cursor) => rows
                .iter()
                .find(|c| **c >= cursor)
                .or_else(|| rows.last())
                .copied(),
        };
        self.offset.y = self.offset.y.min(self.max_offset(layout));
    }

    /// Scrolls so the cursor row is fully visible. Returns whether the offset
    /// changed.
    pub fn ensure_cursor_visible(&mut self, layout: &[Placement]) -> bool {
        let Some(cursor) = self.cursor else {
            return false;
        };
        let Some(placement) = Self::placement_of(layout, cursor).copied() else {
            return false;
        };
        let before = self.offset.y;
        if placement.top < self.offset.y {
            self.offset.y = placement.top;
        } else if placement.bottom() > self.offset.y + self.height {
            self.offset.y = placement.bottom().saturating_sub(self.height);
        }
        self.offset.y = self.offset.y.min(self.max_offset(layout));
        self.offset.y != before
    }

    /// Moves the cursor by `delta` rows, staying within the content.
    pub fn move_cursor(&mut self, layout: &[Placement], delta: isize) {
        let rows: Vec<Coordinate> = Self::rows(layout).filter_map(Placement::row).collect();
        if rows.is_empty() {
            self.cursor = None;
            return;
        }
        let current = self
            .cursor
            .and_then(|c| rows.iter().position(|r| *r == c))
            .unwrap_or(0);
        let next = current
            .saturating_add_signed(delta)
            .min(rows.len() - 1);
        self.cursor = Some(rows[next]);
    }

    /// Moves the cursor to the first or last row.
    pub fn jump(&mut self, layout: &[Placement], to_end: bool) {
        let mut rows = Self::rows(layout).filter_map(Placement::row);
        self.cursor = if to_end { rows.last() } else { rows.next() };
    }

    /// Scrolls one viewport up or down and puts the cursor on the first row
    /// starting inside the new viewport.
    pub fn page(&mut self, layout: &[Placement], down: bool) {
        let page = self.height.max(1);
        self.offset.y = if down {
            (self.offset.y + page).min(self.max_offset(layout))
        } else {
            self.offset.y.saturating_sub(page)
        };
        let top = self.offset.y;
        if let Some(first) = Self::rows(layout).find(|p| p.top >= top) {
            self.cursor = first.row();
        }
    }

    /// Applies a scroll position requested through
    /// [`select_row`](HostWidget::select_row), if any.
    pub fn apply_scroll_request(&mut self, layout: &[Placement]) -> bool {
        let Some((coordinate, position)) = self.scroll_request.take() else {
            return false;
        };
        let Some(placement) = Self::placement_of(layout, coordinate).copied() else {
            return false;
        };
        let before = self.offset.y;
        let wanted = match position {
            ScrollPosition::None => return self.ensure_cursor_visible(layout),
            ScrollPosition::Top => placement.top,
            ScrollPosition::Middle => {
                (placement.top + placement.height / 2).saturating_sub(self.height / 2)
            }
            ScrollPosition::Bottom => placement.bottom().saturating_sub(self.height),
        };
        self.offset.y = wanted.min(self.max_offset(layout));
        self.offset.y != before
    }

    /// Renders the visible part of `source`.
    ///
    /// Rows that were not visible in the previous render, or that became
    /// visible again after a full reload, are announced through
    /// [`DataSource::will_display_row`]. If a template is missing the error is
    /// logged and shown in place of the table.
    pub fn render(&self, source: &dyn DataSource) -> String {
        match self.render_lines(source) {
            Ok(lines) if lines.is_empty() => self.styles.no_rows.render("No rows."),
            Ok(lines) => lines.join("\n"),
            Err(err) => {
                tracing::error!(error = %err, "table render failed");
                self.styles.error.render(&err.to_string())
            }
        }
    }

    fn render_lines(&self, source: &dyn DataSource) -> Result<Vec<String>, TableError> {
        let layout = self.layout(source);
        let top = self.offset.y.min(self.max_offset(&layout));
        let bottom = top + self.height;
        let mut lines = Vec::new();
        let previous = self.displayed.take();
        let mut visible = HashSet::new();

        for placement in layout
            .iter()
            .filter(|p| p.height > 0 && p.bottom() > top && p.top < bottom)
        {
            let (content, gutter) = match placement.entry {
                Entry::Header(section) => (source.header_for_section(section)?, "  ".to_string()),
                Entry::Row(coordinate) => {
                    if let Some(id) = source.descriptor_at(coordinate).map(|row| row.id()) {
                        if !previous.contains(&id) {
                            source.will_display_row(coordinate);
                        }
                        visible.insert(id);
                    }
                    let gutter = if self.cursor == Some(coordinate) {
                        format!("{} ", self.styles.cursor.render(CURSOR_MARK))
                    } else {
                        "  ".to_string()
                    };
                    let selected = self.selected == Some(coordinate);
                    (source.cell_for_row(coordinate, selected)?, gutter)
                }
            };
            let Some(content) = content else {
                continue;
            };

            let mut content_lines = content.lines();
            for line in placement.top..placement.bottom() {
                let text = content_lines.next().unwrap_or_default();
                if line >= top && line < bottom {
                    lines.push(format!("{gutter}{text}"));
                }
            }
        }
        self.displayed.replace(visible);
        Ok(lines)
    }

    fn record(&mut self, apply: impl FnOnce(&mut BatchUpdate)) {
        match self.pending.as_mut() {
            Some(pending) => apply(pending),
            None => {
                let mut batch = BatchUpdate::default();
                apply(&mut batch);
                self.transactions += 1;
                self.last_batch = Some(batch);
            }
        }
    }
}

impl HostWidget for TerminalTable {
    fn reload_data(&mut self) {
        self.reloads += 1;
        self.reloaded_rows.clear();
        self.displayed.get_mut().clear();
    }

    fn begin_updates(&mut self) {
        if self.depth == 0 {
            self.pending = Some(BatchUpdate::default());
        }
        self.depth += 1;
    }

    fn end_updates(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 {
            if let Some(batch) = self.pending.take() {
                self.transactions += 1;
                self.last_batch = Some(batch);
            }
        }
    }

    fn insert_rows(&mut self, at: &[Coordinate], animation: RowAnimation) {
        if let Some(cursor) = self.cursor.as_mut() {
            // `at` holds post-insert indices; each one at or above the cursor
            // pushes it down before the next is compared.
            let mut inserted: Vec<usize> = at
                .iter()
                .filter(|c| c.section == cursor.section)
                .map(|c| c.row)
                .collect();
            inserted.sort_unstable();
            for row in inserted {
                if row <= cursor.row {
                    cursor.row += 1;
                }
            }
        }
        self.record(|batch| {
            batch.inserted.extend_from_slice(at);
            batch.animation = animation;
        });
    }

    fn delete_rows(&mut self, at: &[Coordinate], animation: RowAnimation) {
        if let Some(cursor) = self.cursor.as_mut() {
            let shift = at
                .iter()
                .filter(|c| c.section == cursor.section && c.row < cursor.row)
                .count();
            cursor.row = cursor.row.saturating_sub(shift);
        }
        if self.selected.is_some_and(|s| at.contains(&s)) {
            self.selected = None;
        }
        self.record(|batch| {
            batch.deleted.extend_from_slice(at);
            batch.animation = animation;
        });
    }

    fn reload_rows(&mut self, at: &[Coordinate], _animation: RowAnimation) {
        self.reloaded_rows.extend_from_slice(at);
    }

    fn select_row(&mut self, at: Coordinate, _animated: bool, scroll: ScrollPosition) {
        self.selected = Some(at);
        self.cursor = Some(at);
        if scroll != ScrollPosition::None {
            self.scroll_request = Some((at, scroll));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(heights: &[usize]) -> Vec<Placement> {
        let mut top = 0;
        heights
            .iter()
            .enumerate()
            .map(|(row, height)| {
                let p = Placement {
                    entry: Entry::Row(Coordinate::new(0, row)),
                    top,
                    height: *height,
                };
                top += height;
                p
            })
            .collect()
    }

    #[test]
    fn test_move_cursor_stays_in_bounds() {
        let layout = layout(&[1, 1, 1]);
        let mut table = TerminalTable::new(20, 2);
        table.move_cursor(&layout, -1);
        assert_eq!(table.cursor(), Some(Coordinate::new(0, 0)));
        table.move_cursor(&layout, 5);
        assert_eq!(table.cursor(), Some(Coordinate::new(0, 2)));
    }

    #[test]
    fn test_ensure_cursor_visible_scrolls_down() {
        let layout = layout(&[1, 1, 1, 1]);
        let mut table = TerminalTable::new(20, 2);
        table.set_cursor(Some(Coordinate::new(0, 3)));
        assert!(table.ensure_cursor_visible(&layout));
        assert_eq!(table.offset().y, 2);
        assert!(!table.ensure_cursor_visible(&layout));
    }

    #[test]
    fn test_page_moves_cursor_into_viewport() {
        let layout = layout(&[1, 1, 1, 1, 1]);
        let mut table = TerminalTable::new(20, 2);
        table.page(&layout, true);
        assert_eq!(table.offset().y, 2);
        assert_eq!(table.cursor(), Some(Coordinate::new(0, 2)));
        table.page(&layout, true);
        assert_eq!(table.offset().y, 3);
        table.page(&layout, false);
        assert_eq!(table.offset().y, 1);
    }

    #[test]
    fn test_clamp_cursor_after_shrink() {
        let mut table = TerminalTable::new(20, 2);
        table.set_cursor(Some(Coordinate::new(0, 4)));
        table.clamp_cursor(&layout(&[1, 1]));
        assert_eq!(table.cursor(), Some(Coordinate::new(0, 1)));
        table.clamp_cursor(&[]);
        assert_eq!(table.cursor(), None);
    }

    #[test]
    fn test_bracket_records_one_transaction() {
        let mut table = TerminalTable::new(20, 5);
        table.begin_updates();
        table.delete_rows(&[Coordinate::new(0, 0)], RowAnimation::Fade);
        table.insert_rows(&[Coordinate::new(0, 1)], RowAnimation::Fade);
        assert_eq!(table.transactions(), 0);
        table.end_updates();
        assert_eq!(table.transactions(), 1);
        let batch = table.last_batch().unwrap();
        assert_eq!(batch.deleted, vec![Coordinate::new(0, 0)]);
        assert_eq!(batch.inserted, vec![Coordinate::new(0, 1)]);
    }

    #[test]
    fn test_insert_above_cursor_shifts_it() {
        let mut table = TerminalTable::new(20, 5);
        table.set_cursor(Some(Coordinate::new(0, 1)));
        table.insert_rows(
            &[Coordinate::new(0, 0), Coordinate::new(0, 1)],
            RowAnimation::Automatic,
        );
        assert_eq!(table.cursor(), Some(Coordinate::new(0, 3)));
        table.delete_rows(&[Coordinate::new(0, 0)], RowAnimation::Automatic);
        assert_eq!(table.cursor(), Some(Coordinate::new(0, 2)));

        // Rows inserted at and just below the cursor push it past both.
        table.set_cursor(Some(Coordinate::new(0, 1)));
        table.insert_rows(
            &[Coordinate::new(0, 2), Coordinate::new(0, 1)],
            RowAnimation::Automatic,
        );
        assert_eq!(table.cursor(), Some(Coordinate::new(0, 3)));

        // Rows inserted below the cursor leave it alone.
        table.insert_rows(&[Coordinate::new(0, 4)], RowAnimation::Automatic);
        assert_eq!(table.cursor(), Some(Coordinate::new(0, 3)));
    }

    #[test]
    fn test_delete_more_rows_than_cursor_index_saturates() {
        let mut table = TerminalTable::new(20, 5);
        table.set_cursor(Some(Coordinate::new(0, 1)));
        table.delete_rows(
            &[Coordinate::new(0, 0), Coordinate::new(0, 0)],
            RowAnimation::Automatic,
        );
        assert_eq!(table.cursor(), Some(Coordinate::new(0, 0)));
    }

    #[test]
    fn test_select_row_with_scroll_request() {
        let layout = layout(&[1, 1, 1, 1, 1, 1]);
        let mut table = TerminalTable::new(20, 2);
        table.select_row(Coordinate::new(0, 4), false, ScrollPosition::Top);
        assert_eq!(table.selected(), Some(Coordinate::new(0, 4)));
        assert!(table.apply_scroll_request(&layout));
        assert_eq!(table.offset().y, 4);

        table.select_row(Coordinate::new(0, 1), false, ScrollPosition::None);
        assert!(!table.apply_scroll_request(&layout));
        assert_eq!(table.offset().y, 4);
    }
}
