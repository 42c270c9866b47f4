//! Application layer for termsite
//!
//! Pure menu state machine plus the transport-agnostic pieces every session
//! needs: key decoding, the uniform terminal I/O contract and the generic
//! render loop that drives one [`App`] per connection.
//!
//! # Components
//!
//! - [`App`]: Menu state machine (cursor, displayed page, terminal size)
//! - [`PageRegistry`]: Immutable page table shared by all sessions
//! - [`KeyDecoder`]: Raw terminal bytes to [`KeyInput`]
//! - [`Terminal`]: Trait each transport adapter implements
//! - [`Renderer`]: Trait for turning [`App`] state into screen bytes
//! - [`Runtime`]: Per-session render loop over a [`Terminal`]

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod action;
mod app;
mod event;
mod input;
mod pages;
mod renderer;
mod runtime;
mod terminal;

pub use action::AppAction;
pub use app::App;
pub use event::AppEvent;
pub use input::{KeyDecoder, KeyInput};
pub use pages::{Page, PageRegistry, RegistryError};
pub use renderer::Renderer;
pub use runtime::{DEFAULT_SIZE, Runtime, SessionEnd};
pub use terminal::{INPUT_QUEUE_CAPACITY, InputQueue, ResizeEvents, Terminal};
