//! UI rendering
//!
//! Rendering functions that convert App state into a ratatui [`Buffer`].
//! All functions are pure (no I/O); the buffer is encoded to terminal bytes
//! by [`crate::MenuRenderer`].
//!
//! The layout has a fixed size ([`UI_WIDTH`] x [`UI_HEIGHT`]) and is centred
//! on the session's terminal. Only the part of it that fits is kept, in
//! screen coordinates, so buffers stay bounded by the layout whatever size
//! the peer reports. A terminal smaller than the layout shows its top-left
//! part.

mod content;
mod hints;
mod menu;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
};
use termsite_app::App;

/// Menu panel width, border included.
const MENU_WIDTH: u16 = 20;
/// Space between the menu and content panels.
const PANEL_GAP: u16 = 2;
/// Content panel width, border included.
const CONTENT_WIDTH: u16 = 47;
/// Height of both panels, border included.
const PANEL_HEIGHT: u16 = 18;
/// Title line plus one blank line.
const TITLE_HEIGHT: u16 = 2;
/// One blank line plus the key help.
const HELP_HEIGHT: u16 = 2;

/// Width of the full layout.
pub const UI_WIDTH: u16 = MENU_WIDTH + PANEL_GAP + CONTENT_WIDTH;
/// Height of the full layout.
pub const UI_HEIGHT: u16 = TITLE_HEIGHT + PANEL_HEIGHT + HELP_HEIGHT;

/// Render the UI for the app's terminal size.
///
/// The returned buffer covers only the visible part of the centred layout;
/// its area is in screen coordinates and every cell outside it is blank.
pub fn render(app: &App) -> Buffer {
    let (cols, rows) = app.terminal_size();
    let screen = Rect::new(0, 0, cols, rows);
    let placed = Rect::new(
        cols.saturating_sub(UI_WIDTH) / 2,
        rows.saturating_sub(UI_HEIGHT) / 2,
        UI_WIDTH,
        UI_HEIGHT,
    );

    let mut layout = Buffer::empty(placed);
    draw(&mut layout, app);

    let visible = placed.intersection(screen);
    let mut frame = Buffer::empty(visible);
    for y in visible.top()..visible.bottom() {
        for x in visible.left()..visible.right() {
            frame[(x, y)] = layout[(x, y)].clone();
        }
    }
    frame
}

/// Draw the layout into a buffer of exactly [`UI_WIDTH`] x [`UI_HEIGHT`].
fn draw(buf: &mut Buffer, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(TITLE_HEIGHT),
            Constraint::Length(PANEL_HEIGHT),
            Constraint::Length(HELP_HEIGHT),
        ])
        .split(buf.area);

    let [title_area, panels_area, help_area] = rows.as_ref() else {
        return;
    };

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(MENU_WIDTH),
            Constraint::Length(PANEL_GAP),
            Constraint::Length(CONTENT_WIDTH),
        ])
        .split(*panels_area);

    let [menu_area, _, content_area] = panels.as_ref() else {
        return;
    };

    hints::render_title(buf, *title_area);
    menu::render(buf, app, *menu_area);
    content::render(buf, app, *content_area);
    hints::render_help(buf, app, *help_area);
}
