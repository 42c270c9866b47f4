//! termsite server binary.
//!
//! # Usage
//!
//! ```bash
//! # SSH on 2222, browser on 8080
//! termsite-server
//!
//! # Custom ports and key location
//! termsite-server --ssh-port 22 --web-port 80 --host-key /var/lib/termsite/host_ed25519
//! ```

use std::{net::IpAddr, path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use termsite_app::PageRegistry;
use termsite_server::{
    DEFAULT_HOST_KEY_PATH, DEFAULT_SHUTDOWN_GRACE, DEFAULT_SSH_PORT, DEFAULT_WEB_PORT, Server,
    ServerConfig,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// termsite: a small menu site served over SSH and WebSocket
#[derive(Parser, Debug)]
#[command(name = "termsite-server")]
#[command(about = "Serve the termsite menu over SSH and WebSocket")]
#[command(version)]
struct Args {
    /// Address both listeners bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// SSH listener port
    #[arg(long, default_value_t = DEFAULT_SSH_PORT)]
    ssh_port: u16,

    /// HTTP/WebSocket listener port
    #[arg(long, default_value_t = DEFAULT_WEB_PORT)]
    web_port: u16,

    /// SSH host key (generated if missing)
    #[arg(long, default_value = DEFAULT_HOST_KEY_PATH)]
    host_key: PathBuf,

    /// Seconds sessions may keep running after shutdown is requested
    #[arg(long, default_value_t = DEFAULT_SHUTDOWN_GRACE.as_secs())]
    shutdown_grace_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let config = ServerConfig {
        ssh_addr: (args.host, args.ssh_port).into(),
        web_addr: (args.host, args.web_port).into(),
        host_key_path: args.host_key,
        shutdown_grace: Duration::from_secs(args.shutdown_grace_secs),
    };

    let server = match Server::bind(config, Arc::new(PageRegistry::builtin())).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start: {}", e);
            return Err(e.into());
        },
    };

    server.run(shutdown_signal()).await?;

    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
