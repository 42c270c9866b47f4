//! Side-effects requested by the state machine.
//!
//! This module defines [`AppAction`], the instructions produced by the
//! [`crate::App`] state machine for the [`crate::Runtime`] to execute.

/// Actions produced by the App state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    /// Re-render the full screen.
    Render,

    /// End the session.
    Quit,
}
