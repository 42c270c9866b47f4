//! SSH transport.
//!
//! Accepts TCP connections and speaks the SSH server protocol through
//! `russh`. Any user is let in without credentials. A connection gets one
//! session channel; after a `pty-req` and a `shell` request the channel is
//! wrapped in an [`SshTerminal`] and driven by a [`Runtime`].
//!
//! # Data flow
//!
//! ```text
//! channel data ──► SshHandler::data ──► InputQueue ──► Runtime::read
//! window-change ─► SshHandler ──► resize queue ──► Runtime
//! Runtime::write ─► russh Handle ──► channel data
//! ```

use std::{net::SocketAddr, sync::Arc, time::Instant};

use russh::{
    Channel, ChannelId, CryptoVec, Pty,
    keys::{PrivateKey, PublicKey},
    server::{Auth, Config, Handle, Handler, Msg, Session},
};
use termsite_app::{InputQueue, PageRegistry, ResizeEvents, Runtime, Terminal};
use termsite_tui::MenuRenderer;
use tokio::{net::TcpListener, sync::mpsc};

use crate::{ServerError, SessionTracker, TerminalError};

/// Pending window-change notifications per session. Extra ones are dropped;
/// the next one carries the latest size anyway.
const RESIZE_QUEUE_CAPACITY: usize = 8;

/// SSH accept loop.
pub struct SshListener {
    listener: TcpListener,
    config: Arc<Config>,
}

impl SshListener {
    /// Bind `addr`, identifying the server with `host_key`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address cannot be bound.
    pub async fn bind(addr: SocketAddr, host_key: PrivateKey) -> Result<Self, ServerError> {
        let listener =
            TcpListener::bind(addr).await.map_err(|source| ServerError::Bind { addr, source })?;

        let config = Config {
            keys: vec![host_key],
            auth_rejection_time: std::time::Duration::from_secs(1),
            auth_rejection_time_initial: Some(std::time::Duration::ZERO),
            inactivity_timeout: None,
            ..Default::default()
        };

        Ok(Self { listener, config: Arc::new(config) })
    }

    /// Local address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever, running each on `tracker`.
    ///
    /// Accept errors are logged and the loop continues.
    pub async fn serve(self, pages: Arc<PageRegistry>, tracker: SessionTracker) {
        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::error!("SSH accept error: {}", e);
                    continue;
                },
            };

            if let Err(e) = stream.set_nodelay(true) {
                tracing::debug!("Failed to set TCP_NODELAY for {}: {}", peer, e);
            }

            let handler = SshHandler::new(peer, Arc::clone(&pages), tracker.clone());
            let config = Arc::clone(&self.config);
            let spawned = tracker.spawn(async move {
                tracing::info!("SSH connection from {}", peer);
                let started = Instant::now();

                match russh::server::run_stream(config, stream, handler).await {
                    Ok(session) => {
                        if let Err(e) = session.await {
                            tracing::debug!("SSH session error for {}: {}", peer, e);
                        }
                    },
                    Err(e) => tracing::debug!("SSH handshake with {} failed: {}", peer, e),
                }

                tracing::info!(
                    "SSH connection from {} closed after {:?}",
                    peer,
                    started.elapsed()
                );
            });

            if !spawned {
                tracing::debug!("Refused SSH connection from {} during shutdown", peer);
            }
        }
    }
}

/// Per-connection SSH protocol callbacks.
///
/// Holds the negotiated pty size until the shell starts, then the producer
/// ends of the session's input and resize queues.
pub struct SshHandler {
    peer: SocketAddr,
    pages: Arc<PageRegistry>,
    tracker: SessionTracker,
    channel: Option<ChannelId>,
    pty_size: Option<(u16, u16)>,
    input: Option<mpsc::Sender<Vec<u8>>>,
    resize: Option<mpsc::Sender<(u16, u16)>>,
}

impl SshHandler {
    /// Create a handler for a connection from `peer`.
    pub fn new(peer: SocketAddr, pages: Arc<PageRegistry>, tracker: SessionTracker) -> Self {
        Self { peer, pages, tracker, channel: None, pty_size: None, input: None, resize: None }
    }

    fn is_session_channel(&self, channel: ChannelId) -> bool {
        self.channel == Some(channel)
    }

    /// Refuse a request on `channel` and close it.
    fn refuse(&self, channel: ChannelId, session: &mut Session) -> Result<(), russh::Error> {
        session.channel_failure(channel)?;
        session.close(channel)?;
        Ok(())
    }

    /// End the session's input; the runtime sees end of stream.
    fn end_input(&mut self) {
        self.input = None;
        self.resize = None;
    }
}

impl Handler for SshHandler {
    type Error = russh::Error;

    async fn auth_none(&mut self, _user: &str) -> Result<Auth, Self::Error> {
        Ok(Auth::Accept)
    }

    async fn auth_password(&mut self, _user: &str, _password: &str) -> Result<Auth, Self::Error> {
        Ok(Auth::Accept)
    }

    async fn auth_publickey(
        &mut self,
        _user: &str,
        _public_key: &PublicKey,
    ) -> Result<Auth, Self::Error> {
        Ok(Auth::Accept)
    }

    async fn channel_open_session(
        &mut self,
        channel: Channel<Msg>,
        _session: &mut Session,
    ) -> Result<bool, Self::Error> {
        if self.channel.is_some() {
            tracing::debug!("Refusing second session channel from {}", self.peer);
            return Ok(false);
        }

        // Data arrives through the handler callbacks; the channel's own
        // receiver is not needed.
        self.channel = Some(channel.id());
        Ok(true)
    }

    #[allow(clippy::too_many_arguments)]
    async fn pty_request(
        &mut self,
        channel: ChannelId,
        term: &str,
        col_width: u32,
        row_height: u32,
        _pix_width: u32,
        _pix_height: u32,
        _modes: &[(Pty, u32)],
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        if !self.is_session_channel(channel) || self.input.is_some() {
            return self.refuse(channel, session);
        }

        let size = (clamp_dimension(col_width), clamp_dimension(row_height));
        tracing::debug!("PTY {} {}x{} for {}", term, size.0, size.1, self.peer);
        self.pty_size = Some(size);
        session.channel_success(channel)?;
        Ok(())
    }

    async fn shell_request(
        &mut self,
        channel: ChannelId,
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        if !self.is_session_channel(channel) || self.input.is_some() {
            return self.refuse(channel, session);
        }

        let Some(size) = self.pty_size else {
            tracing::info!("Refusing shell without PTY from {}", self.peer);
            return self.refuse(channel, session);
        };

        let (input_tx, input) = InputQueue::channel();
        let (resize_tx, resizes) = mpsc::channel(RESIZE_QUEUE_CAPACITY);
        let terminal = SshTerminal::new(session.handle(), channel, input, resizes, size);

        let pages = Arc::clone(&self.pages);
        let peer = self.peer;
        let spawned = self.tracker.spawn(async move {
            let runtime = Runtime::new(terminal, MenuRenderer::new(), pages);
            match runtime.run().await {
                Ok(end) => tracing::debug!("SSH session for {} ended: {:?}", peer, end),
                Err(e) => tracing::debug!("SSH session for {} failed: {}", peer, e),
            }
        });

        if !spawned {
            return self.refuse(channel, session);
        }

        self.input = Some(input_tx);
        self.resize = Some(resize_tx);
        session.channel_success(channel)?;
        Ok(())
    }

    async fn exec_request(
        &mut self,
        channel: ChannelId,
        _data: &[u8],
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        self.refuse(channel, session)
    }

    async fn subsystem_request(
        &mut self,
        channel: ChannelId,
        _name: &str,
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        self.refuse(channel, session)
    }

    async fn data(
        &mut self,
        channel: ChannelId,
        data: &[u8],
        _session: &mut Session,
    ) -> Result<(), Self::Error> {
        if !self.is_session_channel(channel) {
            return Ok(());
        }

        if let Some(input) = &self.input {
            // Waits while the queue is full; input is never dropped.
            if input.send(data.to_vec()).await.is_err() {
                self.end_input();
            }
        }
        Ok(())
    }

    async fn window_change_request(
        &mut self,
        channel: ChannelId,
        col_width: u32,
        row_height: u32,
        _pix_width: u32,
        _pix_height: u32,
        _session: &mut Session,
    ) -> Result<(), Self::Error> {
        if !self.is_session_channel(channel) {
            return Ok(());
        }

        let size = (clamp_dimension(col_width), clamp_dimension(row_height));
        match &self.resize {
            Some(resize) => {
                if resize.try_send(size).is_err() {
                    tracing::trace!("Dropped resize {}x{} for {}", size.0, size.1, self.peer);
                }
            },
            None => self.pty_size = Some(size),
        }
        Ok(())
    }

    async fn channel_eof(
        &mut self,
        channel: ChannelId,
        _session: &mut Session,
    ) -> Result<(), Self::Error> {
        if self.is_session_channel(channel) {
            self.end_input();
        }
        Ok(())
    }

    async fn channel_close(
        &mut self,
        channel: ChannelId,
        _session: &mut Session,
    ) -> Result<(), Self::Error> {
        if self.is_session_channel(channel) {
            self.end_input();
        }
        Ok(())
    }
}

impl Drop for SshHandler {
    fn drop(&mut self) {
        // Connection gone: let a running session see end of input.
        self.end_input();
    }
}

/// SSH dimensions are `u32`; terminals never exceed `u16`.
fn clamp_dimension(value: u32) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

/// [`Terminal`] over one SSH session channel.
pub struct SshTerminal {
    handle: Handle,
    channel: ChannelId,
    input: InputQueue,
    resizes: Option<ResizeEvents>,
    size: (u16, u16),
}

impl SshTerminal {
    fn new(
        handle: Handle,
        channel: ChannelId,
        input: InputQueue,
        resizes: ResizeEvents,
        size: (u16, u16),
    ) -> Self {
        Self { handle, channel, input, resizes: Some(resizes), size }
    }
}

impl Terminal for SshTerminal {
    type Error = TerminalError;

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        Ok(self.input.read(buf).await)
    }

    async fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        self.handle
            .data(self.channel, CryptoVec::from_slice(bytes))
            .await
            .map_err(|_| TerminalError::Closed)
    }

    fn resize_events(&mut self) -> Option<ResizeEvents> {
        self.resizes.take()
    }

    fn initial_size(&self) -> Option<(u16, u16)> {
        Some(self.size)
    }

    async fn close(&mut self) {
        self.input.close();
        // The connection may already be gone; nothing left to report to.
        let _ = self.handle.exit_status_request(self.channel, 0).await;
        let _ = self.handle.eof(self.channel).await;
        let _ = self.handle.close(self.channel).await;
    }
}
