//! Content panel
//!
//! Displays the body of the page currently selected.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Block, BorderType, Borders, Padding, Paragraph, Widget},
};
use termsite_app::App;

use super::menu::BORDER_COLOR;

/// Render the content panel.
pub fn render(buf: &mut Buffer, app: &App, area: Rect) {
    let body = app.current_page().body.trim_matches('\n');

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
        .padding(Padding::new(2, 2, 1, 1));

    Paragraph::new(body).block(block).render(area, buf);
}
