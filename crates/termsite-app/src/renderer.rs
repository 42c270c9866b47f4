//! Screen rendering contract.
//!
//! The runtime decides *when* to draw; a [`Renderer`] decides *what* the
//! screen looks like. Every call to [`Renderer::render`] produces a complete
//! frame that replaces whatever the terminal showed before.

use crate::App;

/// Formats application state into terminal output bytes.
pub trait Renderer: Send {
    /// Bytes written once before the first frame (e.g. enter the alternate
    /// screen, hide the cursor).
    fn enter(&self) -> Vec<u8>;

    /// Full-frame output for the current state.
    fn render(&mut self, app: &App) -> Vec<u8>;

    /// Bytes written once when the user quits (restore the terminal).
    fn leave(&self) -> Vec<u8>;
}
