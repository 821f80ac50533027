//! Connection Channel
//!
//! Byte-level primitives over an accepted client stream.

use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use crate::error::Result;

/// An accepted client connection
///
/// Thin wrapper over the stream that records the peer address for logging
/// and exposes the primitives the transport layer needs: whole-buffer
/// send, single-byte receive, and a timeout-bounded probe. Handles may be
/// cloned so one side can force a shutdown while another is blocked.
pub struct Connection {
    stream: TcpStream,

    /// Peer address for logging and the connect hook
    peer_addr: String,
}

impl Connection {
    /// Wrap an accepted stream
    ///
    /// Disables Nagle's algorithm: the protocol exchanges tiny packets and
    /// single ack bytes in lock-step.
    pub fn new(stream: TcpStream) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(true)?;

        Ok(Self { stream, peer_addr })
    }

    /// Clone a handle to the same underlying socket
    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            stream: self.stream.try_clone()?,
            peer_addr: self.peer_addr.clone(),
        })
    }

    /// Send a complete buffer
    pub fn send_all(&mut self, bytes: &[u8]) -> Result<()> {
        self.stream.write_all(bytes)?;
        self.stream.flush()?;
        Ok(())
    }

    /// Block for exactly one byte
    pub fn recv_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.stream.read_exact(&mut byte)?;
        Ok(byte[0])
    }

    /// Probe for one byte within the timeout.
    ///
    /// Returns `None` when nothing arrives in time. The read timeout is
    /// cleared again afterwards so the main receive path stays unbounded.
    pub fn recv_byte_timeout(&mut self, timeout: Duration) -> Result<Option<u8>> {
        self.stream.set_read_timeout(Some(timeout))?;
        let mut byte = [0u8; 1];
        let result = self.stream.read_exact(&mut byte);
        self.stream.set_read_timeout(None)?;

        match result {
            Ok(()) => Ok(Some(byte[0])),
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Force both directions of the socket closed.
    ///
    /// Unblocks any handle currently sitting in a blocking read; the
    /// unblocked call surfaces an expected-disconnect error.
    pub fn shutdown(&self) {
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            tracing::trace!("socket shutdown for {}: {}", self.peer_addr, e);
        }
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

// The codec's streaming decoder drives the connection directly.

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.stream.flush()
    }
}
