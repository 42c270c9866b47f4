//! Title and key help lines

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Paragraph, Widget},
};
use termsite_app::App;

const TITLE: &str = "termsite";

const TITLE_COLOR: Color = Color::Indexed(212);
const HELP_COLOR: Color = Color::Indexed(241);

/// Render the title on the first line of `area`.
pub fn render_title(buf: &mut Buffer, area: Rect) {
    Paragraph::new(TITLE)
        .style(Style::default().fg(TITLE_COLOR).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .render(area, buf);
}

/// Render the key help on the last line of `area`.
pub fn render_help(buf: &mut Buffer, app: &App, area: Rect) {
    // Digits only reach the first nine pages.
    let last_digit = app.pages().len().min(9);
    let help = format!(
        "\u{2191}/\u{2193} or j/k: navigate \u{2022} enter: select \u{2022} 1-{last_digit}: quick access \u{2022} q: quit"
    );

    Paragraph::new(vec![Line::default(), Line::from(help)])
        .style(Style::default().fg(HELP_COLOR))
        .alignment(Alignment::Center)
        .render(area, buf);
}
