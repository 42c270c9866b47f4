//! End-to-end tests for the SSH transport, using russh's client.

mod common;

use std::{net::SocketAddr, sync::Arc};

use common::{TestServer, within};
use russh::{ChannelMsg, client, keys::PublicKey};

/// Client that trusts any host key.
struct AcceptAnyHost;

impl client::Handler for AcceptAnyHost {
    type Error = russh::Error;

    async fn check_server_key(&mut self, _key: &PublicKey) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

type Channel = russh::Channel<client::Msg>;

async fn connect(addr: SocketAddr) -> client::Handle<AcceptAnyHost> {
    let config = Arc::new(client::Config::default());
    let mut session = client::connect(config, addr, AcceptAnyHost).await.unwrap();
    let _auth = session.authenticate_none("guest").await.unwrap();
    session
}

async fn open_shell(session: &client::Handle<AcceptAnyHost>, cols: u32, rows: u32) -> Channel {
    let channel = session.channel_open_session().await.unwrap();
    channel.request_pty(true, "xterm-256color", cols, rows, 0, 0, &[]).await.unwrap();
    channel.request_shell(true).await.unwrap();
    channel
}

async fn send(channel: &Channel, keys: &[u8]) {
    channel.data(keys).await.unwrap();
}

/// Read output until it contains `needle`. Output may arrive split across
/// any number of data messages.
async fn read_until(channel: &mut Channel, needle: &str) {
    within(async {
        let mut seen = Vec::new();
        loop {
            match channel.wait().await {
                Some(ChannelMsg::Data { data }) => {
                    seen.extend_from_slice(&data);
                    if String::from_utf8_lossy(&seen).contains(needle) {
                        return;
                    }
                },
                Some(_) => {},
                None => panic!("channel closed before {needle:?}"),
            }
        }
    })
    .await;
}

/// Drain the channel until it closes, returning every message kind seen.
async fn read_to_close(channel: &mut Channel) -> Vec<ChannelMsg> {
    within(async {
        let mut messages = Vec::new();
        while let Some(message) = channel.wait().await {
            let closed = matches!(message, ChannelMsg::Close);
            messages.push(message);
            if closed {
                break;
            }
        }
        messages
    })
    .await
}

#[tokio::test]
async fn ssh_session_navigates_and_quits() {
    let server = TestServer::start().await;
    let session = connect(server.ssh_addr).await;
    let mut channel = open_shell(&session, 100, 30).await;

    read_until(&mut channel, "> 1. Home").await;

    send(&channel, b"2").await;
    read_until(&mut channel, "> 2. About").await;

    // An arrow key split across two packets still decodes.
    send(&channel, b"\x1b[").await;
    send(&channel, b"B").await;
    read_until(&mut channel, "> 3. Interests").await;

    // Resizing redraws the current state.
    channel.window_change(120, 40, 0, 0).await.unwrap();
    read_until(&mut channel, "> 3. Interests").await;

    send(&channel, b"q").await;
    read_until(&mut channel, "Goodbye!").await;

    let messages = read_to_close(&mut channel).await;
    assert!(
        messages.iter().any(|m| matches!(m, ChannelMsg::ExitStatus { exit_status: 0 })),
        "{messages:?}"
    );

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn oversized_pty_keeps_server_serving() {
    let server = TestServer::start().await;
    let oversized = connect(server.ssh_addr).await;
    let mut huge = open_shell(&oversized, u32::MAX, u32::MAX).await;
    read_until(&mut huge, "> 1. Home").await;

    send(&huge, b"3").await;
    read_until(&mut huge, "> 3. Interests").await;

    huge.window_change(u32::MAX, 100, 0, 0).await.unwrap();
    read_until(&mut huge, "> 3. Interests").await;

    // Other connections are unaffected.
    let session = connect(server.ssh_addr).await;
    let mut channel = open_shell(&session, 80, 24).await;
    read_until(&mut channel, "> 1. Home").await;

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn shell_without_pty_is_refused() {
    let server = TestServer::start().await;
    let session = connect(server.ssh_addr).await;

    let mut channel = session.channel_open_session().await.unwrap();
    channel.request_shell(true).await.unwrap();

    let messages = read_to_close(&mut channel).await;
    assert!(messages.iter().any(|m| matches!(m, ChannelMsg::Failure)), "{messages:?}");
    assert!(!messages.iter().any(|m| matches!(m, ChannelMsg::Data { .. })), "{messages:?}");

    server.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn ssh_and_browser_sessions_are_independent() {
    use futures::{SinkExt, StreamExt};
    use tokio_tungstenite::{connect_async, tungstenite::Message};

    let server = TestServer::start().await;
    let session = connect(server.ssh_addr).await;
    let mut channel = open_shell(&session, 80, 24).await;
    read_until(&mut channel, "> 1. Home").await;

    let (mut ws, _) = connect_async(format!("ws://{}/ws", server.web_addr)).await.unwrap();
    ws.send(Message::text("4".to_owned())).await.unwrap();

    within(async {
        while let Some(Ok(message)) = ws.next().await {
            if message.to_text().is_ok_and(|text| text.contains("> 4. Contact")) {
                return;
            }
        }
        panic!("browser session ended early");
    })
    .await;

    send(&channel, b"j").await;
    read_until(&mut channel, "> 2. About").await;
    assert_eq!(server.tracker.active(), 3, "SSH connection, SSH session, browser session");

    server.shutdown().await.unwrap();
}
