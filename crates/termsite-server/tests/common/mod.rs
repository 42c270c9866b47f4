//! Shared harness: a real server on loopback ports.

#![allow(dead_code)]

use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use tempfile::TempDir;
use termsite_app::PageRegistry;
use termsite_server::{Server, ServerConfig, ServerError, SessionTracker};
use tokio::{sync::oneshot, task::JoinHandle};

pub const TIMEOUT: Duration = Duration::from_secs(10);

/// A server running in the background until [`TestServer::shutdown`].
pub struct TestServer {
    pub ssh_addr: SocketAddr,
    pub web_addr: SocketAddr,
    pub tracker: SessionTracker,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<(), ServerError>>,
    _key_dir: TempDir,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::with_grace(Duration::from_secs(5)).await
    }

    pub async fn with_grace(shutdown_grace: Duration) -> Self {
        let key_dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            ssh_addr: "127.0.0.1:0".parse().unwrap(),
            web_addr: "127.0.0.1:0".parse().unwrap(),
            host_key_path: key_dir.path().join("host_ed25519"),
            shutdown_grace,
        };

        let server = Server::bind(config, Arc::new(PageRegistry::builtin())).await.unwrap();
        let ssh_addr = server.ssh_addr().unwrap();
        let web_addr = server.web_addr().unwrap();
        let tracker = server.tracker();

        let (tx, rx) = oneshot::channel();
        let task = tokio::spawn(server.run(async {
            let _ = rx.await;
        }));

        Self { ssh_addr, web_addr, tracker, shutdown: Some(tx), task, _key_dir: key_dir }
    }

    /// Request shutdown and wait for [`Server::run`] to return.
    pub async fn shutdown(mut self) -> Result<(), ServerError> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        tokio::time::timeout(TIMEOUT, self.task).await.expect("server did not stop").unwrap()
    }

    /// Wait until no session task is running.
    pub async fn wait_idle(&self) {
        within(async {
            while self.tracker.active() > 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
    }
}

/// Run `future` or fail the test after [`TIMEOUT`].
pub async fn within<F: Future>(future: F) -> F::Output {
    tokio::time::timeout(TIMEOUT, future).await.expect("timed out")
}
