//! Network Module
//!
//! Listener, client connection, and the serving loop.
//!
//! ## Architecture
//! - One listener bound for the server's lifetime
//! - Exactly one active client connection at a time
//! - A dedicated worker thread drives accept → serve → disconnect

mod connection;
mod server;

pub use connection::Connection;
pub use server::{ConnectHook, DisconnectHook, RspServer};
