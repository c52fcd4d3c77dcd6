//! Core value types shared by the table view modules.

use std::fmt;

/// A (section, row) pair addressing a row in the active display model.
///
/// In flat mode every row lives in section 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coordinate {
    /// Section index.
    pub section: usize,
    /// Row index within the section.
    pub row: usize,
}

impl Coordinate {
    /// Creates a coordinate.
    pub fn new(section: usize, row: usize) -> Self {
        Self { section, row }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.section, self.row)
    }
}

/// Which variant of the display model is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// A single section holding every row.
    #[default]
    Flat,
    /// Rows grouped under section headers.
    Grouped,
}

/// Animation style requested from the host for row changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowAnimation {
    /// Let the host pick.
    #[default]
    Automatic,
    /// No animation.
    None,
    /// Cross-fade.
    Fade,
    /// Slide from/to the top.
    Top,
    /// Slide from/to the bottom.
    Bottom,
    /// Slide from/to the left.
    Left,
    /// Slide from/to the right.
    Right,
    /// Collapse into / expand from the middle.
    Middle,
}

/// Where the host should scroll a row after selecting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollPosition {
    /// Leave the scroll offset unchanged.
    #[default]
    None,
    /// Scroll the row to the top of the viewport.
    Top,
    /// Scroll the row to the middle of the viewport.
    Middle,
    /// Scroll the row to the bottom of the viewport.
    Bottom,
}

/// How row heights are determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DimensionMode {
    /// Every row uses the host's configured row height.
    Static,
    /// Each row reports its own height.
    #[default]
    Automatic,
}

/// An action offered when a row is edited (e.g. swiped).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditAction {
    /// Button title.
    pub title: String,
    /// Whether the action is destructive.
    pub destructive: bool,
}

impl EditAction {
    /// A regular action.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            destructive: false,
        }
    }

    /// A destructive action, rendered as such by hosts that distinguish it.
    pub fn destructive(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            destructive: true,
        }
    }
}

/// One line of the flattened header/row sequence of a display model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    /// Header of the given section.
    Header(usize),
    /// A row.
    Row(Coordinate),
}
