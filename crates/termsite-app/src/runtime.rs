//! Per-session render loop.
//!
//! The Runtime drives one session's event loop, coordinating between:
//! - [`App`]: menu state machine
//! - [`Renderer`]: screen formatting
//! - [`Terminal`]: transport-specific I/O
//!
//! It owns all three exclusively; nothing else touches a session's state.

use std::sync::Arc;

use crate::{App, AppAction, AppEvent, KeyDecoder, PageRegistry, Renderer, ResizeEvents, Terminal};

/// Size assumed until the terminal reports one.
pub const DEFAULT_SIZE: (u16, u16) = (80, 24);

/// Bytes requested from the terminal per read.
const READ_BUFFER_SIZE: usize = 1024;

/// Why a session loop ended without an I/O error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user quit.
    Quit,
    /// The input stream ended (peer disconnected).
    Disconnected,
}

/// One event taken from the terminal.
enum Input {
    Bytes(usize),
    Resize(u16, u16),
    Eof,
}

/// Generic runtime that orchestrates App, Renderer, and Terminal.
///
/// # Type Parameters
///
/// - `T`: Transport adapter
/// - `R`: Screen renderer
pub struct Runtime<T, R>
where
    T: Terminal,
    R: Renderer,
{
    terminal: T,
    renderer: R,
    app: App,
    decoder: KeyDecoder,
}

impl<T, R> Runtime<T, R>
where
    T: Terminal,
    R: Renderer,
{
    /// Create a runtime with a fresh [`App`] over `pages`.
    pub fn new(terminal: T, renderer: R, pages: Arc<PageRegistry>) -> Self {
        Self { terminal, renderer, app: App::new(pages), decoder: KeyDecoder::new() }
    }

    /// Run the session to completion.
    ///
    /// 1. Applies the terminal's initial size and draws the first frame
    /// 2. Waits for whichever of input or resize arrives first
    /// 3. Feeds it to the App and redraws when asked to
    ///
    /// The terminal is closed on every exit path.
    ///
    /// # Errors
    ///
    /// Returns the terminal's error if a write fails. The loop stops at the
    /// first failed write; nothing is retried.
    pub async fn run(mut self) -> Result<SessionEnd, T::Error> {
        let result = self.event_loop().await;

        if matches!(result, Ok(SessionEnd::Quit)) {
            let leave = self.renderer.leave();
            if let Err(e) = self.terminal.write(&leave).await {
                tracing::debug!("Failed to restore terminal: {}", e);
            }
        }

        self.terminal.close().await;
        result
    }

    async fn event_loop(&mut self) -> Result<SessionEnd, T::Error> {
        let (cols, rows) = self.terminal.initial_size().unwrap_or(DEFAULT_SIZE);
        let _ = self.app.handle(AppEvent::Resize(cols, rows));

        let enter = self.renderer.enter();
        self.terminal.write(&enter).await?;
        self.render().await?;

        let mut resizes = self.terminal.resize_events();
        let mut buf = [0u8; READ_BUFFER_SIZE];

        loop {
            let input = tokio::select! {
                read = self.terminal.read(&mut buf) => match read? {
                    0 => Input::Eof,
                    n => Input::Bytes(n),
                },
                (cols, rows) = next_resize(&mut resizes) => Input::Resize(cols, rows),
            };

            let events = match input {
                Input::Eof => return Ok(SessionEnd::Disconnected),
                Input::Resize(cols, rows) => vec![AppEvent::Resize(cols, rows)],
                Input::Bytes(n) => {
                    self.decoder.feed(&buf[..n]).into_iter().map(AppEvent::Key).collect()
                },
            };

            for event in events {
                let actions = self.app.handle(event);
                if self.process_actions(actions).await? {
                    return Ok(SessionEnd::Quit);
                }
            }
        }
    }

    /// Execute actions returned by the App.
    ///
    /// Returns `true` if the session should end.
    async fn process_actions(&mut self, actions: Vec<AppAction>) -> Result<bool, T::Error> {
        for action in actions {
            match action {
                AppAction::Render => self.render().await?,
                AppAction::Quit => return Ok(true),
            }
        }
        Ok(false)
    }

    /// Emit a full frame for the current state.
    async fn render(&mut self) -> Result<(), T::Error> {
        let frame = self.renderer.render(&self.app);
        self.terminal.write(&frame).await
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }
}

/// Next resize, or never if the stream is absent or finished.
///
/// Once the stream ends it is dropped so later iterations stop polling it.
async fn next_resize(resizes: &mut Option<ResizeEvents>) -> (u16, u16) {
    let Some(rx) = resizes.as_mut() else {
        return std::future::pending().await;
    };

    match rx.recv().await {
        Some(size) => size,
        None => {
            *resizes = None;
            std::future::pending().await
        },
    }
}
