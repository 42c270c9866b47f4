//! Application state machine.
//!
//! This module defines the [`App`] state machine, which holds the interactive
//! state of one session completely decoupled from I/O.
//!
//! This is a pure state machine: it consumes [`crate::AppEvent`] inputs and
//! produces [`crate::AppAction`] instructions for the runtime to execute.
//!
//! # Responsibilities
//!
//! - Tracks the menu cursor and the page currently displayed.
//! - Stores terminal dimensions to handle resize events.
//! - Enters an absorbing quit state on `q` or Ctrl-C.

use std::sync::Arc;

use crate::{AppAction, AppEvent, KeyInput, Page, PageRegistry};

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies - fully testable without a transport.
#[derive(Debug, Clone)]
pub struct App {
    /// Shared read-only page table.
    pages: Arc<PageRegistry>,
    /// Highlighted menu entry. Always `< pages.len()`.
    cursor: usize,
    /// Menu position of the displayed page. Always `< pages.len()`.
    current: usize,
    /// Terminal dimensions (columns, rows), both at least 1.
    terminal_size: (u16, u16),
    /// Set once the user quits; no event is processed afterwards.
    quitting: bool,
}

impl App {
    /// Create a new App showing the first menu page.
    pub fn new(pages: Arc<PageRegistry>) -> Self {
        Self { pages, cursor: 0, current: 0, terminal_size: (80, 24), quitting: false }
    }

    /// Process an event and return actions.
    ///
    /// An empty list means nothing visible changed.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        if self.quitting {
            return vec![];
        }

        match event {
            AppEvent::Resize(cols, rows) => {
                self.terminal_size = (cols.max(1), rows.max(1));
                vec![AppAction::Render]
            },
            AppEvent::Key(key) => self.handle_key(key),
        }
    }

    fn handle_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        match key {
            KeyInput::Char('q') | KeyInput::Interrupt => self.quit(),
            KeyInput::Up | KeyInput::Char('k') => match self.cursor.checked_sub(1) {
                Some(position) => self.select(position),
                None => vec![],
            },
            KeyInput::Down | KeyInput::Char('j') => {
                let position = self.cursor + 1;
                if position < self.pages.len() { self.select(position) } else { vec![] }
            },
            KeyInput::Enter => self.select(self.cursor),
            KeyInput::Char(digit @ '1'..='9') => {
                let position = digit as usize - '1' as usize;
                if position < self.pages.len() { self.select(position) } else { vec![] }
            },
            _ => vec![],
        }
    }

    /// Move the cursor to `position` and display that page.
    fn select(&mut self, position: usize) -> Vec<AppAction> {
        if self.cursor == position && self.current == position {
            return vec![];
        }
        self.cursor = position;
        self.current = position;
        vec![AppAction::Render]
    }

    /// Enter the quit state.
    fn quit(&mut self) -> Vec<AppAction> {
        self.quitting = true;
        vec![AppAction::Quit]
    }

    /// Highlighted menu position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Page currently displayed.
    pub fn current_page(&self) -> &Page {
        self.pages.clamped(self.current)
    }

    /// Shared page table.
    pub fn pages(&self) -> &PageRegistry {
        &self.pages
    }

    /// Terminal dimensions (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    /// Whether the session has quit.
    pub fn is_quitting(&self) -> bool {
        self.quitting
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        App::new(Arc::new(PageRegistry::builtin()))
    }

    fn key(app: &mut App, key: KeyInput) -> Vec<AppAction> {
        app.handle(AppEvent::Key(key))
    }

    #[test]
    fn starts_on_first_page() {
        let app = app();
        assert_eq!(app.cursor(), 0);
        assert_eq!(app.current_page().id, "home");
        assert_eq!(app.terminal_size(), (80, 24));
        assert!(!app.is_quitting());
    }

    #[test]
    fn up_at_top_is_noop() {
        let mut app = app();
        assert!(key(&mut app, KeyInput::Up).is_empty());
        assert_eq!(app.cursor(), 0);
    }

    #[test]
    fn down_at_bottom_does_not_wrap() {
        let mut app = app();
        let _ = key(&mut app, KeyInput::Char('4'));
        assert!(key(&mut app, KeyInput::Down).is_empty());
        assert_eq!(app.cursor(), 3);
        assert_eq!(app.current_page().id, "contact");
    }

    #[test]
    fn vim_keys_navigate() {
        let mut app = app();
        assert_eq!(key(&mut app, KeyInput::Char('j')), [AppAction::Render]);
        assert_eq!(app.current_page().id, "about");
        assert_eq!(key(&mut app, KeyInput::Char('k')), [AppAction::Render]);
        assert_eq!(app.current_page().id, "home");
    }

    #[test]
    fn enter_on_selected_page_is_idempotent() {
        let mut app = app();
        let _ = key(&mut app, KeyInput::Down);
        assert!(key(&mut app, KeyInput::Enter).is_empty());
        assert_eq!(app.current_page().id, "about");
    }

    #[test]
    fn out_of_range_digits_are_ignored() {
        let mut app = app();
        assert!(key(&mut app, KeyInput::Char('5')).is_empty());
        assert!(key(&mut app, KeyInput::Char('0')).is_empty());
        assert_eq!(app.cursor(), 0);
    }

    #[test]
    fn unknown_keys_request_nothing() {
        let mut app = app();
        assert!(key(&mut app, KeyInput::Char('x')).is_empty());
        assert!(key(&mut app, KeyInput::Esc).is_empty());
        assert!(key(&mut app, KeyInput::Left).is_empty());
    }

    #[test]
    fn resize_always_renders_and_clamps() {
        let mut app = app();
        assert_eq!(app.handle(AppEvent::Resize(120, 40)), [AppAction::Render]);
        assert_eq!(app.terminal_size(), (120, 40));
        assert_eq!(app.handle(AppEvent::Resize(120, 40)), [AppAction::Render]);
        let _ = app.handle(AppEvent::Resize(0, 0));
        assert_eq!(app.terminal_size(), (1, 1));
    }

    #[test]
    fn q_quits_and_absorbs_keys() {
        let mut app = app();
        assert_eq!(key(&mut app, KeyInput::Char('q')), [AppAction::Quit]);
        assert!(key(&mut app, KeyInput::Char('2')).is_empty());
        assert!(key(&mut app, KeyInput::Char('q')).is_empty());
        assert_eq!(app.current_page().id, "home");
    }

    #[test]
    fn interrupt_quits() {
        let mut app = app();
        assert_eq!(key(&mut app, KeyInput::Interrupt), [AppAction::Quit]);
        assert!(app.is_quitting());
        assert!(app.handle(AppEvent::Resize(10, 10)).is_empty());
        assert_eq!(app.terminal_size(), (80, 24));
    }
}
