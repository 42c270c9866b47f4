//! Property-based tests for frame rendering.
//!
//! Any terminal size and any navigation history must produce a full frame
//! whose size does not grow with the terminal.

use std::sync::Arc;

use proptest::prelude::*;
use termsite_app::{App, AppEvent, KeyInput, PageRegistry, Renderer};
use termsite_tui::MenuRenderer;

fn key_strategy() -> impl Strategy<Value = KeyInput> {
    prop_oneof![
        Just(KeyInput::Up),
        Just(KeyInput::Down),
        Just(KeyInput::Enter),
        (b'1'..=b'4').prop_map(|d| KeyInput::Char(d as char)),
    ]
}

proptest! {
    #[test]
    fn prop_every_frame_is_a_full_replace(
        cols in any::<u16>(),
        rows in any::<u16>(),
        keys in prop::collection::vec(key_strategy(), 0..20),
    ) {
        let mut app = App::new(Arc::new(PageRegistry::builtin()));
        let _ = app.handle(AppEvent::Resize(cols, rows));
        for key in keys {
            let _ = app.handle(AppEvent::Key(key));
        }

        let frame = MenuRenderer::new().render(&app);
        prop_assert!(frame.starts_with(b"\x1b[2J"));
        // Output is bounded by the layout, not by the reported size.
        prop_assert!(frame.len() < 16 * 1024, "{} bytes", frame.len());
    }

    #[test]
    fn prop_selected_title_is_visible(digit in 1usize..=4) {
        let pages = Arc::new(PageRegistry::builtin());
        let mut app = App::new(Arc::clone(&pages));
        let _ = app.handle(AppEvent::Resize(80, 24));
        let _ = app.handle(AppEvent::Key(KeyInput::Char(char::from_digit(digit as u32, 10).unwrap())));

        let frame = String::from_utf8(MenuRenderer::new().render(&app)).unwrap();
        let title = &pages.at(digit - 1).unwrap().title;
        // Menu cells are written one run at a time, so the label survives
        // intact in the byte stream.
        prop_assert!(frame.contains(title.as_str()));
    }
}
