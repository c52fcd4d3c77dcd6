//! Styling for the terminal table host.
//!
//! Row and header content is styled by the templates each descriptor is bound
//! to. `TableStyles` only covers what the table draws itself: the cursor
//! gutter, the empty state, and the error line shown when rendering aborts.

use lipgloss_extras::prelude::*;

/// Gutter mark drawn left of the cursor row.
pub const CURSOR_MARK: &str = "│";

/// Table-level styles.
#[derive(Debug, Clone)]
pub struct TableStyles {
    /// Gutter mark of the cursor row.
    pub cursor: Style,
    /// Message shown when the table has nothing to display.
    pub no_rows: Style,
    /// Line shown in place of the table when a template is missing.
    pub error: Style,
}

impl Default for TableStyles {
    fn default() -> Self {
        Self {
            cursor: Style::new().foreground(AdaptiveColor {
                Light: "#F793FF",
                Dark: "#AD58B4",
            }),
            no_rows: Style::new().foreground(AdaptiveColor {
                Light: "#909090",
                Dark: "#626262",
            }),
            error: Style::new().foreground(AdaptiveColor {
                Light: "#FF4672",
                Dark: "#ED567A",
            }),
        }
    }
}
