//! bubbletea-rs integration for tables displayed by a [`TerminalTable`].
//!
//! `update` routes descriptor reload messages to the table, resizes the
//! viewport on window changes and turns key presses into cursor movement,
//! scrolling and selection. Scrolling is reported to the observer the way a
//! drag would be: page moves emit the begin/scroll/end sequence, cursor moves
//! only emit `DidScroll` when the viewport had to follow the cursor.

use super::defaultrow::default_templates;
use super::host::{HostWidget, ScrollEvent};
use super::terminal::{Action, Placement, TerminalTable};
use super::types::ScrollPosition;
use super::ListController;
use crate::template::TemplateCache;
use bubbletea_rs::{Cmd, KeyMsg, Model as BubbleTeaModel, Msg, WindowSizeMsg};
use std::sync::Arc;

impl ListController<TerminalTable> {
    fn layout(&self) -> Vec<Placement> {
        self.host.layout(self)
    }

    fn perform(&mut self, action: Action) {
        let layout = self.layout();
        self.host.clamp_cursor(&layout);
        let before = self.host.offset();

        match action {
            Action::CursorUp | Action::CursorDown => {
                let delta = if action == Action::CursorUp { -1 } else { 1 };
                self.host.move_cursor(&layout, delta);
                if self.host.ensure_cursor_visible(&layout) {
                    self.scroll(ScrollEvent::DidScroll {
                        offset: self.host.offset(),
                    });
                }
            }
            Action::GoToStart | Action::GoToEnd => {
                self.host.jump(&layout, action == Action::GoToEnd);
                if self.host.ensure_cursor_visible(&layout) {
                    self.scroll(ScrollEvent::DidScroll {
                        offset: self.host.offset(),
                    });
                }
            }
            Action::PageUp | Action::PageDown => {
                self.scroll(ScrollEvent::WillBeginDragging { offset: before });
                self.host.page(&layout, action == Action::PageDown);
                let after = self.host.offset();
                if after != before {
                    self.scroll(ScrollEvent::DidScroll { offset: after });
                }
                self.scroll(ScrollEvent::DidEndDragging {
                    offset: after,
                    will_decelerate: true,
                });
                self.scroll(ScrollEvent::DidEndDecelerating { offset: after });
            }
            Action::Select => {
                if let Some(coordinate) = self.host.cursor() {
                    self.host
                        .select_row(coordinate, true, ScrollPosition::None);
                    self.did_select_row(coordinate);
                }
            }
        }
    }
}

impl BubbleTeaModel for ListController<TerminalTable> {
    /// Creates an empty 80x24 table backed by the shared template cache, or
    /// by the default templates when no shared cache was installed.
    fn init() -> (Self, Option<Cmd>) {
        let cache = TemplateCache::shared()
            .unwrap_or_else(|| Arc::new(TemplateCache::new(default_templates())));
        (Self::new(TerminalTable::new(80, 24), cache), None)
    }

    fn update(&mut self, msg: Msg) -> Option<Cmd> {
        if self.handle_reload(&msg) {
            return None;
        }

        if let Some(size) = msg.downcast_ref::<WindowSizeMsg>() {
            self.host
                .set_size(usize::from(size.width), usize::from(size.height));
            let layout = self.layout();
            self.host.clamp_cursor(&layout);
            self.host.ensure_cursor_visible(&layout);
            return None;
        }

        let key_msg = msg.downcast_ref::<KeyMsg>()?;
        let layout = self.layout();
        if self.host.apply_scroll_request(&layout) {
            self.scroll(ScrollEvent::DidScroll {
                offset: self.host.offset(),
            });
        }
        if let Some(action) = self.host.action_for(key_msg) {
            self.perform(action);
        }
        None
    }

    fn view(&self) -> String {
        self.host.render(self)
    }
}
