//! Server configuration.

use std::{
    net::{Ipv4Addr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use crate::ServerError;

/// Default SSH listener port.
pub const DEFAULT_SSH_PORT: u16 = 2222;

/// Default HTTP/WebSocket listener port.
pub const DEFAULT_WEB_PORT: u16 = 8080;

/// Default location of the persisted SSH host key.
pub const DEFAULT_HOST_KEY_PATH: &str = ".ssh/term_info_ed25519";

/// Default time sessions get to finish after shutdown is requested.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Listener addresses, key material and lifecycle limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address of the SSH listener
    pub ssh_addr: SocketAddr,
    /// Address of the HTTP/WebSocket listener
    pub web_addr: SocketAddr,
    /// Ed25519 host key; generated on first start if missing
    pub host_key_path: PathBuf,
    /// How long running sessions may continue after shutdown is requested
    /// before they are aborted
    pub shutdown_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ssh_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_SSH_PORT)),
            web_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_WEB_PORT)),
            host_key_path: PathBuf::from(DEFAULT_HOST_KEY_PATH),
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

impl ServerConfig {
    /// Check the configuration for conflicts before binding anything.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Config`] if both listeners would bind the same
    /// fixed address or the host key path is empty.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.ssh_addr == self.web_addr && self.ssh_addr.port() != 0 {
            return Err(ServerError::Config(format!(
                "SSH and web listeners both configured on {}",
                self.ssh_addr
            )));
        }
        if self.host_key_path.as_os_str().is_empty() {
            return Err(ServerError::Config("host key path is empty".to_string()));
        }
        Ok(())
    }
}
