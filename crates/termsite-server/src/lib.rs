//! termsite server.
//!
//! Serves the termsite menu over two transports at once: SSH through
//! `russh` and browser WebSockets through `axum`. Every connection gets its
//! own [`termsite_app::Runtime`] and therefore its own menu state; the only
//! thing sessions share is the read-only [`PageRegistry`].
//!
//! # Components
//!
//! - [`Server`]: Binds both listeners and runs them until shutdown
//! - [`SshListener`]: SSH accept loop and per-connection [`SshHandler`]
//! - [`WsTerminal`]: WebSocket adapter implementing [`termsite_app::Terminal`]
//! - [`SessionTracker`]: Owns every connection task for graceful shutdown
//! - [`host_key`]: Persistent Ed25519 host key

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
pub mod host_key;
mod ssh;
mod tracker;
pub mod web;

use std::{
    future::{Future, IntoFuture},
    net::SocketAddr,
    sync::Arc,
};

pub use config::{
    DEFAULT_HOST_KEY_PATH, DEFAULT_SHUTDOWN_GRACE, DEFAULT_SSH_PORT, DEFAULT_WEB_PORT,
    ServerConfig,
};
pub use error::{ServerError, TerminalError};
pub use ssh::{SshHandler, SshListener, SshTerminal};
use termsite_app::PageRegistry;
use tokio::net::TcpListener;
pub use tracker::SessionTracker;
pub use web::WsTerminal;

/// Both listeners, bound and ready to serve.
pub struct Server {
    config: ServerConfig,
    pages: Arc<PageRegistry>,
    ssh: SshListener,
    web: TcpListener,
    tracker: SessionTracker,
}

impl Server {
    /// Validate `config`, load the host key and bind both listeners.
    ///
    /// # Errors
    ///
    /// Returns the first startup failure: invalid configuration, an unusable
    /// host key, or an address that cannot be bound.
    pub async fn bind(config: ServerConfig, pages: Arc<PageRegistry>) -> Result<Self, ServerError> {
        config.validate()?;

        let host_key = host_key::load_or_generate(&config.host_key_path)?;
        let ssh = SshListener::bind(config.ssh_addr, host_key).await?;

        let addr = config.web_addr;
        let web =
            TcpListener::bind(addr).await.map_err(|source| ServerError::Bind { addr, source })?;

        Ok(Self { config, pages, ssh, web, tracker: SessionTracker::new() })
    }

    /// Address of the SSH listener.
    pub fn ssh_addr(&self) -> Result<SocketAddr, ServerError> {
        self.ssh.local_addr()
    }

    /// Address of the HTTP/WebSocket listener.
    pub fn web_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.web.local_addr()?)
    }

    /// Handle on the set of running sessions.
    pub fn tracker(&self) -> SessionTracker {
        self.tracker.clone()
    }

    /// Serve both transports until `shutdown` resolves.
    ///
    /// Then both listeners stop accepting, running sessions get the
    /// configured grace period to finish, and the rest are aborted.
    ///
    /// # Errors
    ///
    /// Returns an error if the web listener fails. Sessions are drained
    /// either way.
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<(), ServerError> {
        let Self { config, pages, ssh, web, tracker } = self;

        tracing::info!("SSH server listening on {}", ssh.local_addr()?);
        tracing::info!("Web server listening on {}", web.local_addr()?);

        let ssh = ssh.serve(Arc::clone(&pages), tracker.clone());
        let app = web::router(pages, tracker.clone());
        let web = axum::serve(web, app.into_make_service_with_connect_info::<SocketAddr>())
            .into_future();

        let result = tokio::select! {
            () = ssh => Ok(()),
            result = web => result.map_err(ServerError::from),
            () = shutdown => {
                tracing::info!("Shutdown requested, draining sessions");
                Ok(())
            },
        };

        let aborted = tracker.drain(config.shutdown_grace).await;
        tracing::info!("Server stopped ({} sessions aborted)", aborted);
        result
    }
}
