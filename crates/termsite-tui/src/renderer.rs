//! ANSI frame encoding.

use std::io::{self, Write};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    queue,
    terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    buffer::Buffer,
};
use termsite_app::{App, Renderer};

use crate::ui;

const GOODBYE: &str = "Goodbye!\r\n";

/// [`Renderer`] drawing the termsite menu layout.
///
/// Every frame clears the screen and repaints every non-blank cell, so a
/// frame never depends on what the terminal showed before.
#[derive(Debug, Default, Clone, Copy)]
pub struct MenuRenderer;

impl MenuRenderer {
    /// Create a renderer.
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for MenuRenderer {
    fn enter(&self) -> Vec<u8> {
        let mut out = Vec::new();
        if let Err(e) = queue!(out, EnterAlternateScreen, Hide, Clear(ClearType::All)) {
            tracing::error!("Failed to encode screen setup: {}", e);
        }
        out
    }

    fn render(&mut self, app: &App) -> Vec<u8> {
        encode(&ui::render(app)).unwrap_or_else(|e| {
            tracing::error!("Failed to encode frame: {}", e);
            Vec::new()
        })
    }

    fn leave(&self) -> Vec<u8> {
        let mut out = Vec::new();
        if let Err(e) = queue!(out, Show, LeaveAlternateScreen) {
            tracing::error!("Failed to encode screen restore: {}", e);
        }
        out.extend_from_slice(GOODBYE.as_bytes());
        out
    }
}

/// Encode `frame` as a full-frame replacement.
///
/// Cells carry screen coordinates, so the backend positions each run with
/// its own cursor move.
fn encode(frame: &Buffer) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;

    // Diffing against a blank buffer yields every visible cell, with wide
    // characters already accounted for.
    let blank = Buffer::empty(frame.area);
    let mut backend = CrosstermBackend::new(&mut out);
    backend.draw(blank.diff(frame).into_iter())?;
    Backend::flush(&mut backend)?;
    drop(backend);

    out.flush()?;
    Ok(out)
}
