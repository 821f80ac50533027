//! Protocol Module
//!
//! Defines the wire protocol between the debugger and the server.
//!
//! ## Packet Format
//! ```text
//! ┌─────┬─────────────────────┬─────┬───────────────┐
//! │  $  │  escaped payload    │  #  │ checksum (XY) │
//! └─────┴─────────────────────┴─────┴───────────────┘
//! ```
//!
//! - Literal `$` and `#` inside the payload are backslash-escaped.
//! - The checksum is the sum of all bytes between `$` and `#` as they
//!   appear on the wire (escape markers included), modulo 256, rendered
//!   as two uppercase hex digits.
//! - The receiver answers every packet with a single byte: `+` to accept,
//!   `-` to reject and resume scanning for the next `$`.
//!
//! ## Command Text
//! A command's opcode is the text up to (not including) the first comma,
//! or the whole string if no comma is present. Responses are free-form
//! payloads; the canonical `E01`..`E05` codes signal standardized failure
//! classes and travel like any other payload.

mod codec;
mod command;

pub use codec::{checksum, encode_packet, escape, read_packet, ACK, NACK};
pub use command::{
    opcode, ERR_COMMAND, ERR_INTERNAL, ERR_PARAM, ERR_PROTOCOL, ERR_UNKNOWN,
};
