//! Uniform terminal I/O contract.
//!
//! The [`Terminal`] trait decouples the [`crate::Runtime`] from the transport a
//! session arrived on. Each listener wraps its connection in an adapter that
//! provides a byte source, a byte sink and a stream of resize notifications;
//! the runtime never sees transport types.
//!
//! [`InputQueue`] is the blocking-read bridge adapters share: a producer task
//! pushes inbound chunks onto a bounded channel and [`InputQueue::read`] hands
//! them out in order, splitting a chunk across calls when the caller's buffer
//! is smaller than the chunk.

use std::future::Future;

use tokio::sync::mpsc;

/// Capacity of a session's inbound chunk queue.
///
/// When the queue is full the producer waits; chunks are never dropped.
pub const INPUT_QUEUE_CAPACITY: usize = 100;

/// Resize notifications (columns, rows) for one session.
pub type ResizeEvents = mpsc::Receiver<(u16, u16)>;

/// Abstracts one connection's terminal I/O.
///
/// # Implementations
///
/// - **SSH**: wraps the session channel of a russh connection
/// - **WebSocket**: bridges text frames of a browser socket
/// - **Tests**: in-memory channels
pub trait Terminal: Send {
    /// Transport-specific error type.
    type Error: std::error::Error + Send + 'static;

    /// Read input bytes into `buf`.
    ///
    /// Waits until input is available. Returns `Ok(0)` once the input stream
    /// has ended. Must be cancel-safe: dropping the future before completion
    /// loses no input.
    fn read(&mut self, buf: &mut [u8]) -> impl Future<Output = Result<usize, Self::Error>> + Send;

    /// Write `bytes` to the remote terminal as one unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is broken.
    fn write(&mut self, bytes: &[u8]) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Take the resize stream.
    ///
    /// Returns `None` if the transport has no resize notifications or the
    /// stream was already taken. The stream is not restartable.
    fn resize_events(&mut self) -> Option<ResizeEvents>;

    /// Terminal size negotiated when the connection was set up, if any.
    fn initial_size(&self) -> Option<(u16, u16)>;

    /// Close the connection and release transport resources.
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// Blocking byte-stream view over a queue of input chunks.
///
/// The queue is closed when every sender has been dropped; after the remaining
/// chunks are drained, [`InputQueue::read`] returns `0`.
#[derive(Debug)]
pub struct InputQueue {
    rx: mpsc::Receiver<Vec<u8>>,
    /// Last dequeued chunk.
    chunk: Vec<u8>,
    /// Bytes of `chunk` already handed out.
    consumed: usize,
}

impl InputQueue {
    /// Wrap the receiving half of a chunk channel.
    pub fn new(rx: mpsc::Receiver<Vec<u8>>) -> Self {
        Self { rx, chunk: Vec::new(), consumed: 0 }
    }

    /// Create a queue with [`INPUT_QUEUE_CAPACITY`] and return its sender.
    pub fn channel() -> (mpsc::Sender<Vec<u8>>, Self) {
        let (tx, rx) = mpsc::channel(INPUT_QUEUE_CAPACITY);
        (tx, Self::new(rx))
    }

    /// Copy the next input bytes into `buf`.
    ///
    /// Leftover bytes of the previous chunk are returned first. Returns `0` at
    /// end of stream or if `buf` is empty. Cancel-safe.
    pub async fn read(&mut self, buf: &mut [u8]) -> usize {
        if buf.is_empty() {
            return 0;
        }

        while self.consumed == self.chunk.len() {
            match self.rx.recv().await {
                Some(chunk) => {
                    self.chunk = chunk;
                    self.consumed = 0;
                },
                None => return 0,
            }
        }

        let remaining = &self.chunk[self.consumed..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.consumed += n;
        n
    }

    /// Stop accepting chunks. Buffered chunks can still be read.
    pub fn close(&mut self) {
        self.rx.close();
    }
}
