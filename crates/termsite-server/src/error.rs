//! Server error types.

use std::{io, net::SocketAddr};

use thiserror::Error;

/// Errors that stop the server from starting or running.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Invalid configuration.
    ///
    /// Fatal: fix the configuration and restart.
    #[error("configuration error: {0}")]
    Config(String),

    /// A listener could not bind its address.
    ///
    /// Usually the port is in use or needs privileges.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested
        addr: SocketAddr,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The SSH host key could not be loaded, generated or persisted.
    #[error("host key error: {0}")]
    HostKey(String),

    /// Other listener I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors from a single session's transport.
///
/// These end the session they occur in and nothing else.
#[derive(Debug, Error)]
pub enum TerminalError {
    /// The remote end went away.
    #[error("connection closed")]
    Closed,

    /// The socket reported an error.
    #[error("socket error: {0}")]
    Socket(String),
}
