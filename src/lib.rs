//! # rsplink
//!
//! A remote debug protocol server: lets an external debugger control a
//! simulated target over a byte stream, with
//! - checksummed, escaped packet framing
//! - ack/retry transport discipline with a give-up-and-disconnect policy
//! - a single-client connection lifecycle with connect/disconnect hooks
//! - a dynamic opcode → handler dispatch table
//!
//! Debug-command semantics (registers, memory, run control) are supplied
//! by the caller as registered handlers; this crate is the machinery
//! around them.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       TCP Listener                           │
//! │                  (one client at a time)                      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ bytes
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     Packet Codec                             │
//! │         ($…#XY framing, checksum, ack/nack)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ command text
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                  Command Dispatcher                          │
//! │        (opcode lookup, registered handlers, E03)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ response text
//!                       ▼
//!            reliable send (10-attempt ack retry)
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod dispatch;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, RspError};
pub use config::Config;
pub use dispatch::{Dispatcher, Handler};
pub use network::RspServer;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of rsplink
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
