//! Incremental row mutations for flat tables.
//!
//! Each mutation stages the new row list, resolves the coordinates the host
//! must animate, and then swaps the staged list in from inside a single host
//! transaction, so the widget's row count and the backing rows never disagree.

use super::descriptor::{ContentItem, Row};
use super::host::{BatchUpdate, HostWidget};
use super::reconcile::{unique_rows, DisplayModel};
use super::types::{Coordinate, RowAnimation};
use super::ListController;
use crate::error::TableError;
use std::collections::HashSet;
use std::sync::Arc;

impl<H: HostWidget> ListController<H> {
    /// Inserts rows at `position`, keeping their relative order.
    ///
    /// Groups among `items` are ignored, as are rows already in the table and
    /// repeats of a handle within `items`. Returns the coordinates that were
    /// animated, one per inserted row.
    ///
    /// # Errors
    ///
    /// [`TableError::NotFlat`] when the table is grouped and
    /// [`TableError::PositionOutOfRange`] when `position` is past the end.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use bubbletea_tableview::tableview::{default_templates, DefaultRow, ListController, RowAnimation, TerminalTable};
    /// # use bubbletea_tableview::template::TemplateCache;
    /// # use std::sync::Arc;
    /// let cache = Arc::new(TemplateCache::new(default_templates()));
    /// let mut table = ListController::new(TerminalTable::new(40, 10), cache);
    /// table.set_rows(vec![DefaultRow::new("a").into_row(), DefaultRow::new("c").into_row()]);
    ///
    /// let inserted = table.insert(vec![DefaultRow::new("b")], 1, RowAnimation::Fade).unwrap();
    /// assert_eq!(inserted.len(), 1);
    /// assert_eq!(inserted[0].row, 1);
    /// ```
    pub fn insert<I, T>(
        &mut self,
        items: I,
        position: usize,
        animation: RowAnimation,
    ) -> Result<Vec<Coordinate>, TableError>
    where
        I: IntoIterator<Item = T>,
        T: Into<ContentItem>,
    {
        let DisplayModel::Flat { rows } = &self.model else {
            tracing::warn!(table = self.id(), "insert rejected: table is grouped");
            return Err(TableError::NotFlat);
        };
        if position > rows.len() {
            tracing::warn!(table = self.id(), position, len = rows.len(), "insert rejected: position out of range");
            return Err(TableError::PositionOutOfRange {
                position,
                len: rows.len(),
            });
        }

        let new_rows: Vec<Row> = items
            .into_iter()
            .filter_map(|item| match item.into() {
                ContentItem::Row(row) => Some(row),
                ContentItem::Group(_) => None,
            })
            .collect();
        let mut seen: HashSet<_> = rows.iter().map(Arc::as_ptr).collect();
        let new_rows = unique_rows(new_rows, &mut seen);

        let mut staged = rows.clone();
        staged.splice(position..position, new_rows.iter().cloned());
        let staged = DisplayModel::Flat { rows: staged };
        let coordinates: Vec<Coordinate> = (position..position + new_rows.len())
            .map(|index| Coordinate::new(0, index))
            .collect();

        for row in &new_rows {
            row.bind_table(self.id());
        }

        tracing::debug!(table = self.id(), position, count = new_rows.len(), "inserting rows");
        self.commit(staged, BatchUpdate::insert(coordinates.clone(), animation));
        Ok(coordinates)
    }

    /// Inserts rows at the top of the table.
    pub fn insert_on_top<I, T>(
        &mut self,
        items: I,
        animation: RowAnimation,
    ) -> Result<Vec<Coordinate>, TableError>
    where
        I: IntoIterator<Item = T>,
        T: Into<ContentItem>,
    {
        self.insert(items, 0, animation)
    }

    /// Removes the rows at indices `position ..= position + count`.
    ///
    /// The upper bound is inclusive, so `count + 1` rows are removed when
    /// enough rows exist. A range starting past the end removes nothing.
    /// Returns the coordinates that were animated away.
    ///
    /// # Errors
    ///
    /// [`TableError::NotFlat`] when the table is grouped.
    pub fn remove(
        &mut self,
        position: usize,
        count: usize,
        animation: RowAnimation,
    ) -> Result<Vec<Coordinate>, TableError> {
        let DisplayModel::Flat { rows } = &self.model else {
            tracing::warn!(table = self.id(), "remove rejected: table is grouped");
            return Err(TableError::NotFlat);
        };

        let last = position.saturating_add(count);
        let in_range = |index: usize| index >= position && index <= last;

        let coordinates: Vec<Coordinate> = rows
            .iter()
            .enumerate()
            .filter(|(index, _)| in_range(*index))
            .map(|(index, _)| Coordinate::new(0, index))
            .collect();
        let kept: Vec<Row> = rows
            .iter()
            .enumerate()
            .filter(|(index, _)| !in_range(*index))
            .map(|(_, row)| Row::clone(row))
            .collect();

        tracing::debug!(table = self.id(), position, removed = coordinates.len(), "removing rows");
        self.commit(
            DisplayModel::Flat { rows: kept },
            BatchUpdate::delete(coordinates.clone(), animation),
        );
        Ok(coordinates)
    }

    /// Swaps `staged` in as the display model inside one host transaction.
    fn commit(&mut self, staged: DisplayModel, update: BatchUpdate) {
        let mut staged = Some(staged);
        let model = &mut self.model;
        let mut apply = || {
            if let Some(next) = staged.take() {
                *model = next;
            }
        };

        let host = &mut self.host;
        if host.supports_batch_updates() {
            host.perform_batch_updates(&mut apply, update);
        } else {
            host.begin_updates();
            apply();
            if !update.deleted.is_empty() {
                host.delete_rows(&update.deleted, update.animation);
            }
            if !update.inserted.is_empty() {
                host.insert_rows(&update.inserted, update.animation);
            }
            host.end_updates();
        }
    }
}
