//! Classification of a raw descriptor sequence into a display model.
//!
//! A sequence without any group is shown as a single flat section. As soon as
//! one group is present the sequence is split into sections: every group
//! collects the rows that follow it, up to the next group.
//!
//! Two shape outcomes are intentional and covered by tests:
//! - rows that appear before the first group belong to no section and are
//!   dropped;
//! - a group at the very end of the sequence becomes one section with an
//!   empty row list.

use super::descriptor::{ContentItem, GroupDescriptor, Row, RowDescriptor};
use super::types::{Coordinate, DisplayMode, Entry};
use std::collections::HashSet;
use std::sync::Arc;

/// Keeps the first occurrence of every row handle; `seen` carries handles
/// already placed elsewhere in the model.
pub(crate) fn unique_rows(rows: Vec<Row>, seen: &mut HashSet<*const RowDescriptor>) -> Vec<Row> {
    let before = rows.len();
    let rows: Vec<Row> = rows
        .into_iter()
        .filter(|row| seen.insert(Arc::as_ptr(row)))
        .collect();
    if rows.len() < before {
        tracing::warn!(dropped = before - rows.len(), "duplicate row handles ignored");
    }
    rows
}

/// The reconciled structure the table reads from.
#[derive(Debug)]
pub enum DisplayModel {
    /// One section holding every row.
    Flat {
        /// Rows in display order.
        rows: Vec<Row>,
    },
    /// Rows grouped into sections.
    Grouped {
        /// Sections in display order, each owning its rows.
        groups: Vec<GroupDescriptor>,
    },
}

impl Default for DisplayModel {
    fn default() -> Self {
        DisplayModel::Flat { rows: Vec::new() }
    }
}

impl DisplayModel {
    /// Active variant.
    pub fn mode(&self) -> DisplayMode {
        match self {
            DisplayModel::Flat { .. } => DisplayMode::Flat,
            DisplayModel::Grouped { .. } => DisplayMode::Grouped,
        }
    }

    /// Number of sections: 1 in flat mode, the group count otherwise.
    pub fn section_count(&self) -> usize {
        match self {
            DisplayModel::Flat { .. } => 1,
            DisplayModel::Grouped { groups } => groups.len(),
        }
    }

    /// Rows in `section`; 0 for a section that does not exist.
    pub fn row_count(&self, section: usize) -> usize {
        match self {
            DisplayModel::Flat { rows } => rows.len(),
            DisplayModel::Grouped { groups } => groups.get(section).map_or(0, |g| g.row_count()),
        }
    }

    /// Total rows across all sections.
    pub fn total_rows(&self) -> usize {
        match self {
            DisplayModel::Flat { rows } => rows.len(),
            DisplayModel::Grouped { groups } => groups.iter().map(|g| g.row_count()).sum(),
        }
    }

    /// Row at `coordinate`, by direct indexing.
    pub fn row_at(&self, coordinate: Coordinate) -> Option<&Row> {
        match self {
            DisplayModel::Flat { rows } => rows.get(coordinate.row),
            DisplayModel::Grouped { groups } => groups
                .get(coordinate.section)?
                .rows()?
                .get(coordinate.row),
        }
    }

    /// Group at `section`; always `None` in flat mode.
    pub fn group_at(&self, section: usize) -> Option<&GroupDescriptor> {
        match self {
            DisplayModel::Flat { .. } => None,
            DisplayModel::Grouped { groups } => groups.get(section),
        }
    }

    /// Finds `row` by instance identity. First match wins, scanning sections
    /// and rows in storage order.
    pub fn coordinate_of(&self, row: &Row) -> Option<Coordinate> {
        match self {
            DisplayModel::Flat { rows } => rows
                .iter()
                .position(|r| Arc::ptr_eq(r, row))
                .map(|i| Coordinate::new(0, i)),
            DisplayModel::Grouped { groups } => {
                groups.iter().enumerate().find_map(|(section, group)| {
                    group
                        .rows()?
                        .iter()
                        .position(|r| Arc::ptr_eq(r, row))
                        .map(|i| Coordinate::new(section, i))
                })
            }
        }
    }

    /// Finds a row by descriptor id.
    pub fn coordinate_of_id(&self, id: u64) -> Option<(Coordinate, &Row)> {
        self.rows()
            .find(|(_, row)| row.id() == id)
    }

    /// Every row with its coordinate, in display order.
    pub fn rows(&self) -> impl Iterator<Item = (Coordinate, &Row)> + '_ {
        let (flat, grouped) = match self {
            DisplayModel::Flat { rows } => (Some(rows), None),
            DisplayModel::Grouped { groups } => (None, Some(groups)),
        };
        let flat = flat
            .into_iter()
            .flat_map(|rows| rows.iter().enumerate().map(|(i, r)| (Coordinate::new(0, i), r)));
        let grouped = grouped.into_iter().flat_map(|groups| {
            groups.iter().enumerate().flat_map(|(section, group)| {
                group
                    .rows()
                    .unwrap_or_default()
                    .iter()
                    .enumerate()
                    .map(move |(i, r)| (Coordinate::new(section, i), r))
            })
        });
        flat.chain(grouped)
    }

    /// Headers interleaved with their rows, in display order.
    ///
    /// Flat models have no headers.
    pub fn entries(&self) -> Vec<Entry> {
        match self {
            DisplayModel::Flat { rows } => (0..rows.len())
                .map(|i| Entry::Row(Coordinate::new(0, i)))
                .collect(),
            DisplayModel::Grouped { groups } => {
                let mut entries = Vec::with_capacity(groups.len() + self.total_rows());
                for (section, group) in groups.iter().enumerate() {
                    entries.push(Entry::Header(section));
                    entries.extend(
                        (0..group.row_count()).map(|i| Entry::Row(Coordinate::new(section, i))),
                    );
                }
                entries
            }
        }
    }
}

/// Builds a display model from a raw sequence of rows and groups.
///
/// ```rust
/// # use bubbletea_tableview::tableview::{reconcile, DisplayMode};
/// let model = reconcile(Vec::new());
/// assert_eq!(model.mode(), DisplayMode::Flat);
/// ```
pub fn reconcile(items: Vec<ContentItem>) -> DisplayModel {
    if !items.iter().any(ContentItem::is_group) {
        let rows: Vec<Row> = items
            .into_iter()
            .filter_map(|item| match item {
                ContentItem::Row(row) => Some(row),
                ContentItem::Group(_) => None,
            })
            .collect();
        let rows = unique_rows(rows, &mut HashSet::new());
        tracing::debug!(rows = rows.len(), "reconciled flat model");
        return DisplayModel::Flat { rows };
    }

    let mut groups = Vec::new();
    let mut pending: Vec<Row> = Vec::new();
    let mut current: Option<GroupDescriptor> = None;
    let mut dropped = 0;
    let mut seen = HashSet::new();

    for item in items {
        match item {
            ContentItem::Row(row) => pending.push(row),
            ContentItem::Group(group) => {
                match current.take() {
                    Some(mut open) => {
                        open.assign_rows(unique_rows(std::mem::take(&mut pending), &mut seen));
                        groups.push(open);
                    }
                    None => {
                        dropped += pending.len();
                        pending.clear();
                    }
                }
                current = Some(group);
            }
        }
    }

    if let Some(mut open) = current {
        open.assign_rows(unique_rows(pending, &mut seen));
        groups.push(open);
    }

    if dropped > 0 {
        tracing::debug!(dropped, "rows before the first group were dropped");
    }
    tracing::debug!(groups = groups.len(), "reconciled grouped model");

    DisplayModel::Grouped { groups }
}
