//! Browser transport.
//!
//! Serves a single page that runs a terminal emulator in the browser and
//! connects back over a WebSocket. Each WebSocket is one session: every text
//! frame the browser sends is raw keyboard input, and every frame the server
//! sends is terminal output.
//!
//! # Routes
//!
//! - `GET /`: the embedded terminal page
//! - `GET /ws`: WebSocket upgrade
//! - anything else: `404 Not Found`

use std::{fmt::Display, net::SocketAddr, sync::Arc, time::Instant};

use axum::{
    Router,
    extract::{
        ConnectInfo, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::{Html, Response},
    routing::get,
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use termsite_app::{DEFAULT_SIZE, InputQueue, PageRegistry, ResizeEvents, Runtime, Terminal};
use termsite_tui::MenuRenderer;
use tokio::{
    sync::{Mutex, mpsc},
    task::JoinHandle,
};

use crate::{SessionTracker, TerminalError};

const INDEX_HTML: &str = include_str!("../static/index.html");

#[derive(Clone)]
struct WebState {
    pages: Arc<PageRegistry>,
    tracker: SessionTracker,
}

/// HTTP routes for the browser client.
///
/// Must be served with connection info
/// (`into_make_service_with_connect_info::<SocketAddr>`).
pub fn router(pages: Arc<PageRegistry>, tracker: SessionTracker) -> Router {
    Router::new()
        .route("/", get(index).fallback(not_found))
        .route("/ws", get(upgrade).fallback(not_found))
        .fallback(not_found)
        .with_state(WebState { pages, tracker })
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

async fn upgrade(
    ws: WebSocketUpgrade,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(state): State<WebState>,
) -> Response {
    ws.on_upgrade(move |socket| async move { start_session(socket, peer, state) })
}

/// Hand an upgraded socket to its own tracked session task.
fn start_session(socket: WebSocket, peer: SocketAddr, state: WebState) {
    let (sink, stream) = socket.split();
    let terminal = WsTerminal::new(sink, stream);
    let WebState { pages, tracker } = state;

    let spawned = tracker.spawn(async move {
        tracing::info!("WebSocket connection from {}", peer);
        let started = Instant::now();

        let runtime = Runtime::new(terminal, MenuRenderer::new(), pages);
        match runtime.run().await {
            Ok(end) => tracing::debug!("WebSocket session for {} ended: {:?}", peer, end),
            Err(e) => tracing::debug!("WebSocket session for {} failed: {}", peer, e),
        }

        tracing::info!("WebSocket connection from {} closed after {:?}", peer, started.elapsed());
    });

    if !spawned {
        tracing::debug!("Refused WebSocket connection from {} during shutdown", peer);
    }
}

/// [`Terminal`] over a WebSocket split into its two halves.
///
/// A receive task moves inbound frames into an [`InputQueue`]. Each write
/// goes out as exactly one text frame. Browsers report no size, so the
/// session runs at the default size and never resizes.
pub struct WsTerminal<Si> {
    sink: Mutex<Si>,
    input: InputQueue,
    receiver: JoinHandle<()>,
}

impl<Si> WsTerminal<Si>
where
    Si: Sink<Message> + Unpin + Send + 'static,
    Si::Error: Display,
{
    /// Start receiving from `stream` and writing to `sink`.
    ///
    /// Must be called within a tokio runtime.
    pub fn new<St, E>(sink: Si, stream: St) -> Self
    where
        St: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
        E: Display + Send + 'static,
    {
        let (input_tx, input) = InputQueue::channel();
        let receiver = tokio::spawn(receive(stream, input_tx));
        Self { sink: Mutex::new(sink), input, receiver }
    }
}

/// Forward inbound frames until the socket closes or the session ends.
async fn receive<St, E>(mut stream: St, input: mpsc::Sender<Vec<u8>>)
where
    St: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    while let Some(message) = stream.next().await {
        let bytes = match message {
            Ok(Message::Text(text)) => text.as_str().as_bytes().to_vec(),
            Ok(Message::Binary(data)) => data.to_vec(),
            Ok(Message::Close(_)) => break,
            Ok(Message::Ping(_) | Message::Pong(_)) => continue,
            Err(e) => {
                tracing::debug!("WebSocket read failed: {}", e);
                break;
            },
        };

        if input.send(bytes).await.is_err() {
            break;
        }
    }
}

impl<Si> Terminal for WsTerminal<Si>
where
    Si: Sink<Message> + Unpin + Send + 'static,
    Si::Error: Display,
{
    type Error = TerminalError;

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        Ok(self.input.read(buf).await)
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        let text = String::from_utf8_lossy(bytes).into_owned();
        let mut sink = self.sink.lock().await;
        sink.send(Message::Text(text.into()))
            .await
            .map_err(|e| TerminalError::Socket(e.to_string()))
    }

    fn resize_events(&mut self) -> Option<ResizeEvents> {
        None
    }

    fn initial_size(&self) -> Option<(u16, u16)> {
        Some(DEFAULT_SIZE)
    }

    async fn close(&mut self) {
        self.input.close();
        self.receiver.abort();

        let mut sink = self.sink.lock().await;
        // The peer may already be gone; nothing left to report to.
        let _ = sink.send(Message::Close(None)).await;
        let _ = sink.close().await;
    }
}

impl<Si> Drop for WsTerminal<Si> {
    fn drop(&mut self) {
        self.receiver.abort();
    }
}
