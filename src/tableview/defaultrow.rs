//! Ready-made row and section controllers.
//!
//! `DefaultRow` shows a title and an optional description line; `DefaultSection`
//! shows a title underlined to its display width. [`default_templates`]
//! returns a registry with blueprints for both.
//!
//! ```rust
//! use bubbletea_tableview::tableview::{default_templates, DefaultRow, DefaultSection, ListController, TerminalTable};
//! use bubbletea_tableview::template::TemplateCache;
//! use bubbletea_rs::Model as _;
//! use std::sync::Arc;
//!
//! let cache = Arc::new(TemplateCache::new(default_templates()));
//! let mut table = ListController::new(TerminalTable::new(40, 10), cache);
//! table.set_items(vec![
//!     DefaultSection::new("Today").into(),
//!     DefaultRow::new("Write docs").with_description("tableview module").into(),
//! ]);
//! assert!(table.view().contains("Write docs"));
//! ```

use super::descriptor::{ContentItem, GroupDescriptor, Row, RowController, RowDescriptor, SectionController};
use crate::template::{Blueprint, TemplateRegistry, View};
use lipgloss_extras::prelude::*;
use unicode_width::UnicodeWidthStr;

/// A title with an optional description.
#[derive(Debug, Clone)]
pub struct DefaultRow {
    title: String,
    description: Option<String>,
}

impl DefaultRow {
    /// Creates a row with a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
        }
    }

    /// Adds a second line.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Title text.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Description text.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Wraps this controller in a shareable row.
    pub fn into_row(self) -> Row {
        RowDescriptor::new(self).into_row()
    }
}

impl RowController for DefaultRow {
    fn render(&self, view: &View, selected: bool) -> String {
        let title = if selected {
            view.style().clone().bold(true).render(&self.title)
        } else {
            view.render(&self.title)
        };
        match &self.description {
            Some(description) => format!("{title}\n{}", view.style().clone().faint(true).render(description)),
            None => title,
        }
    }

    fn height(&self) -> usize {
        if self.description.is_some() {
            2
        } else {
            1
        }
    }
}

impl From<DefaultRow> for ContentItem {
    fn from(row: DefaultRow) -> Self {
        ContentItem::Row(row.into_row())
    }
}

/// A section header showing an underlined title.
#[derive(Debug, Clone)]
pub struct DefaultSection {
    title: String,
}

impl DefaultSection {
    /// Creates a header with a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

impl SectionController for DefaultSection {
    fn render_header(&self, view: &View) -> String {
        let rule = "─".repeat(self.title.width());
        format!("{}\n{}", view.render(&self.title), view.render(&rule))
    }

    fn header_height(&self) -> usize {
        2
    }

    fn title(&self) -> String {
        self.title.clone()
    }
}

impl From<DefaultSection> for ContentItem {
    fn from(section: DefaultSection) -> Self {
        ContentItem::Group(GroupDescriptor::new(section))
    }
}

/// Templates for [`DefaultRow`] and [`DefaultSection`] in the default origin.
pub fn default_templates() -> TemplateRegistry {
    TemplateRegistry::new()
        .with_template(
            std::any::type_name::<DefaultRow>(),
            None,
            Blueprint::new(Style::new().foreground(AdaptiveColor {
                Light: "#1a1a1a",
                Dark: "#dddddd",
            })),
        )
        .with_template(
            std::any::type_name::<DefaultSection>(),
            None,
            Blueprint::new(
                Style::new()
                    .foreground(AdaptiveColor {
                        Light: "#5A56E0",
                        Dark: "#7571F9",
                    })
                    .bold(true),
            ),
        )
}
