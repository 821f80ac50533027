//! Protocol Server
//!
//! Owns the listener, the single-client connection lifecycle, the
//! reliable transport discipline, and the serve loop.
//!
//! ## Concurrency Model
//! One dedicated worker thread drives the whole accept → serve →
//! disconnect cycle with blocking I/O. The run flag, the connection slot,
//! and the handler table are the only state shared with the controlling
//! side. `stop` is a polite request checked at loop boundaries; blocking
//! socket calls are only unblocked by forcing the socket closed, which
//! surfaces as an expected disconnect.

use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::{Result, RspError};
use crate::network::Connection;
use crate::protocol::{encode_packet, read_packet, ACK};

/// Hook invoked with the peer address when a client connects
pub type ConnectHook = Box<dyn Fn(&str) + Send + Sync>;

/// Hook invoked when the active client is torn down
pub type DisconnectHook = Box<dyn Fn() + Send + Sync>;

/// Remote debug protocol server
///
/// Serves exactly one debugger client at a time over TCP, framing
/// commands and responses with the packet codec and routing commands
/// through the registered handler table. Constructed once and bound to a
/// port; cycles through connect → serve → disconnect epochs until stopped.
pub struct RspServer {
    config: Config,

    /// Port actually bound (resolves a configured port of 0)
    port: u16,

    /// Listener kept for the server's lifetime so the port stays ours
    listener: TcpListener,

    /// The single active client, if any
    conn: Mutex<Option<Connection>>,

    /// Opcode → handler table
    dispatcher: Dispatcher,

    /// Serve-loop run flag; checked at loop iteration boundaries only
    running: AtomicBool,

    /// Background worker started by `run_async`
    worker: Mutex<Option<JoinHandle<()>>>,

    on_connect: RwLock<Option<ConnectHook>>,
    on_disconnect: RwLock<Option<DisconnectHook>>,
}

impl RspServer {
    /// Delivery attempts per payload before giving up and disconnecting
    pub const MAX_SEND_ATTEMPTS: usize = 10;

    /// Bind a server to the configured port.
    ///
    /// A configured port of 0 lets the platform choose; the resolved port
    /// is fixed from here on and available through [`port`](Self::port).
    pub fn new(config: Config) -> Result<Self> {
        let listener = TcpListener::bind(("0.0.0.0", config.port))?;
        let port = listener.local_addr()?.port();

        tracing::info!("bound to port {}", port);

        Ok(Self {
            config,
            port,
            listener,
            conn: Mutex::new(None),
            dispatcher: Dispatcher::new(),
            running: AtomicBool::new(false),
            worker: Mutex::new(None),
            on_connect: RwLock::new(None),
            on_disconnect: RwLock::new(None),
        })
    }

    /// The port this server is bound to
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether a client is currently connected
    pub fn is_connected(&self) -> bool {
        self.conn.lock().is_some()
    }

    /// Whether the serve loop is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Handler Registration
    // =========================================================================

    /// Register a command handler, replacing any previous one for the opcode.
    pub fn register_handler<F>(&self, opcode: impl Into<String>, handler: F)
    where
        F: Fn(&str) -> Result<String> + Send + Sync + 'static,
    {
        self.dispatcher.register(opcode, handler);
    }

    /// Remove the handler for an opcode.
    pub fn unregister_handler(&self, opcode: &str) {
        self.dispatcher.unregister(opcode);
    }

    /// Set the hook invoked with the peer address on every connect.
    pub fn set_connect_hook<F>(&self, hook: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        *self.on_connect.write() = Some(Box::new(hook));
    }

    /// Set the hook invoked on every disconnect.
    pub fn set_disconnect_hook<F>(&self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.on_disconnect.write() = Some(Box::new(hook));
    }

    // =========================================================================
    // Connection Lifecycle
    // =========================================================================

    /// Block until exactly one client connects.
    ///
    /// Further clients are not accepted until the current connection has
    /// ended and `listen` is called again. Invokes the connect hook with
    /// the peer's address string.
    pub fn listen(&self) -> Result<()> {
        let (stream, _) = self.listener.accept()?;
        let conn = Connection::new(stream)?;
        let peer = conn.peer_addr().to_string();

        *self.conn.lock() = Some(conn);
        tracing::info!("client connected from {}", peer);

        if let Some(hook) = self.on_connect.read().as_ref() {
            hook(&peer);
        }
        Ok(())
    }

    /// Tear down the active connection, if any.
    ///
    /// Idempotent; invokes the disconnect hook only when a connection was
    /// actually torn down.
    pub fn disconnect(&self) {
        let conn = self.conn.lock().take();
        if let Some(conn) = conn {
            conn.shutdown();
            tracing::debug!("client {} disconnected", conn.peer_addr());

            if let Some(hook) = self.on_disconnect.read().as_ref() {
                hook();
            }
        }
    }

    /// Clone a handle to the active connection.
    ///
    /// Calling transport operations while disconnected is a contract
    /// violation, reported as [`RspError::NotConnected`].
    fn channel(&self) -> Result<Connection> {
        match self.conn.lock().as_ref() {
            Some(conn) => conn.try_clone(),
            None => Err(RspError::NotConnected),
        }
    }

    // =========================================================================
    // Transport Discipline
    // =========================================================================

    /// Reliably send a response payload.
    ///
    /// Encodes the payload once and retransmits the identical packet until
    /// the client acknowledges with `+`, up to
    /// [`MAX_SEND_ATTEMPTS`](Self::MAX_SEND_ATTEMPTS) attempts. Exhausting
    /// the attempts abandons the send and force-disconnects without
    /// raising an error.
    pub fn send_packet(&self, payload: &str) -> Result<()> {
        let mut conn = self.channel()?;
        let packet = encode_packet(payload);

        for _ in 0..Self::MAX_SEND_ATTEMPTS {
            if self.config.echo {
                tracing::debug!("sending packet '{}'", packet);
            }
            conn.send_all(packet.as_bytes())?;

            let ack = conn.recv_byte()?;
            if self.config.echo {
                tracing::debug!("received ack '{}'", ack as char);
            }
            if ack == ACK {
                return Ok(());
            }
        }

        tracing::error!(
            "giving up sending packet after {} attempts",
            Self::MAX_SEND_ATTEMPTS
        );
        self.disconnect();
        Ok(())
    }

    /// Reliably receive one command payload.
    ///
    /// Drives the packet decoder against the connection; acks and nacks
    /// are emitted by the decoder itself.
    pub fn recv_packet(&self) -> Result<String> {
        let mut conn = self.channel()?;
        read_packet(&mut conn, self.config.echo)
    }

    /// Probe for an out-of-band signal byte.
    ///
    /// Returns 0 when no client is connected or nothing arrives within the
    /// timeout; otherwise consumes and returns exactly one raw byte
    /// without interpreting it as packet framing. Lets a caller notice an
    /// asynchronous break/attention byte while the target runs freely.
    pub fn recv_signal(&self, timeout: Duration) -> Result<u8> {
        let mut conn = match self.channel() {
            Ok(conn) => conn,
            Err(RspError::NotConnected) => return Ok(0),
            Err(e) => return Err(e),
        };
        match conn.recv_byte_timeout(timeout)? {
            Some(byte) => Ok(byte),
            None => Ok(0),
        }
    }

    // =========================================================================
    // Serve Loop & Control
    // =========================================================================

    /// Serve clients until stopped (blocking).
    ///
    /// Repeats connect → serve → disconnect epochs while the run flag
    /// holds. Session-end conditions return to listening; any other error
    /// terminates the loop until `run`/`run_async` is invoked again.
    pub fn run(&self) {
        self.running.store(true, Ordering::SeqCst);

        while self.running.load(Ordering::SeqCst) {
            self.disconnect();

            if let Err(e) = self.listen() {
                tracing::error!("serve loop terminated: {}", e);
                return;
            }

            while self.running.load(Ordering::SeqCst) && self.is_connected() {
                match self.serve_one() {
                    Ok(()) => {}
                    Err(e) if e.is_session_end() => {
                        tracing::debug!("session ended: {}", e);
                        break;
                    }
                    Err(e) => {
                        tracing::error!("serve loop terminated: {}", e);
                        return;
                    }
                }
            }
        }
    }

    /// Receive one command, dispatch it, send the response.
    fn serve_one(&self) -> Result<()> {
        let command = self.recv_packet()?;
        let response = self.dispatcher.dispatch(&command);

        // The handler (or a send give-up) may have dropped the client.
        if self.is_connected() {
            self.send_packet(&response)?;
        }
        Ok(())
    }

    /// Start the serve loop on a background worker thread and return
    /// immediately.
    pub fn run_async(self: &Arc<Self>) -> Result<()> {
        let server = Arc::clone(self);
        let handle = std::thread::Builder::new()
            .name(format!("rsp-{}", self.port))
            .spawn(move || server.run())?;

        *self.worker.lock() = Some(handle);
        Ok(())
    }

    /// Request the serve loop to stop.
    ///
    /// Contract violation ([`RspError::NotRunning`]) unless the loop was
    /// started. Only clears the flag: a blocking accept or receive keeps
    /// the loop alive until it returns, naturally or because the socket
    /// was forced closed (see [`shutdown`](Self::shutdown)).
    pub fn stop(&self) -> Result<()> {
        if !self.running.swap(false, Ordering::SeqCst) {
            return Err(RspError::NotRunning);
        }
        Ok(())
    }

    /// Stop serving, unblock the worker, and join it.
    ///
    /// Clears the run flag, force-closes the active connection, and pokes
    /// the listener with a loopback connect so a blocked accept returns.
    /// Idempotent; safe to call whether or not the loop was running.
    pub fn shutdown(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.disconnect();

        // Wake a worker blocked in accept. The wake connection may be
        // briefly installed as a client before the loop observes the
        // cleared flag; the trailing disconnect drops it again.
        let _ = TcpStream::connect(("127.0.0.1", self.port));

        self.join();
        self.disconnect();
    }

    /// Join the background worker, if one was started.
    pub fn join(&self) {
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                tracing::error!("serve worker panicked");
            }
        }
    }
}

impl Drop for RspServer {
    fn drop(&mut self) {
        // Last reference may be dropped by the worker itself; never join
        // the current thread.
        if let Some(handle) = self.worker.get_mut().take() {
            if handle.thread().id() != std::thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}
