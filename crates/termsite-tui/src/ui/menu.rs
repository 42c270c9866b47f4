//! Menu panel
//!
//! Lists every page in menu order with a marker on the cursor entry.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, BorderType, Borders, Padding, Paragraph, Widget},
};
use termsite_app::App;

const SELECTED_PREFIX: &str = ">";
const NORMAL_PREFIX: &str = " ";

pub(super) const BORDER_COLOR: Color = Color::Indexed(63);
const SELECTED_COLOR: Color = Color::Indexed(212);
const NORMAL_COLOR: Color = Color::Indexed(252);

/// Render the menu panel.
pub fn render(buf: &mut Buffer, app: &App, area: Rect) {
    let lines: Vec<Line> = app
        .pages()
        .menu()
        .enumerate()
        .map(|(position, page)| {
            let (prefix, style) = if position == app.cursor() {
                (SELECTED_PREFIX, Style::default().fg(SELECTED_COLOR).add_modifier(Modifier::BOLD))
            } else {
                (NORMAL_PREFIX, Style::default().fg(NORMAL_COLOR))
            };
            Line::styled(format!("{prefix} {}. {}", position + 1, page.title), style)
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_COLOR))
        .padding(Padding::horizontal(1));

    Paragraph::new(lines).block(block).render(area, buf);
}
