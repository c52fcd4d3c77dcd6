//! Key bindings for the terminal table host.
//!
//! - **Cursor**: `↑/k`, `↓/j`
//! - **Pages**: `pgup/b`, `pgdn/f/space`
//! - **Jumps**: `g/home`, `G/end`
//! - **Select**: `enter`

use crate::key;
use crossterm::event::KeyCode;

/// Key bindings used by [`TerminalTable`](super::TerminalTable).
#[derive(Debug, Clone)]
pub struct TableKeyMap {
    /// Move the cursor up one row.
    pub cursor_up: key::Binding,
    /// Move the cursor down one row.
    pub cursor_down: key::Binding,
    /// Scroll up one page.
    pub page_up: key::Binding,
    /// Scroll down one page.
    pub page_down: key::Binding,
    /// Jump to the first row.
    pub go_to_start: key::Binding,
    /// Jump to the last row.
    pub go_to_end: key::Binding,
    /// Select the cursor row.
    pub select: key::Binding,
}

impl Default for TableKeyMap {
    fn default() -> Self {
        Self {
            cursor_up: key::Binding::new(vec![KeyCode::Up, KeyCode::Char('k')])
                .with_help("↑/k", "up"),
            cursor_down: key::Binding::new(vec![KeyCode::Down, KeyCode::Char('j')])
                .with_help("↓/j", "down"),
            page_up: key::Binding::new(vec![KeyCode::PageUp, KeyCode::Char('b')])
                .with_help("b/pgup", "page up"),
            page_down: key::Binding::new(vec![
                KeyCode::PageDown,
                KeyCode::Char('f'),
                KeyCode::Char(' '),
            ])
            .with_help("f/pgdn", "page down"),
            go_to_start: key::Binding::new(vec![KeyCode::Home, KeyCode::Char('g')])
                .with_help("g/home", "go to start"),
            go_to_end: key::Binding::new(vec![KeyCode::End, KeyCode::Char('G')])
                .with_help("G/end", "go to end"),
            select: key::Binding::new(vec![KeyCode::Enter]).with_help("enter", "select"),
        }
    }
}

impl key::KeyMap for TableKeyMap {
    fn short_help(&self) -> Vec<&key::Binding> {
        vec![&self.cursor_up, &self.cursor_down, &self.select]
    }

    fn full_help(&self) -> Vec<Vec<&key::Binding>> {
        vec![
            vec![&self.cursor_up, &self.cursor_down, &self.select],
            vec![
                &self.page_up,
                &self.page_down,
                &self.go_to_start,
                &self.go_to_end,
            ],
        ]
    }
}
