//! Terminal UI for termsite
//!
//! Turns [`termsite_app::App`] state into full-frame ANSI output. Nothing here
//! touches a real terminal: frames are drawn into a ratatui buffer sized to
//! the session and encoded to bytes the transport sends to the remote end.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod renderer;
pub mod ui;

pub use renderer::MenuRenderer;
