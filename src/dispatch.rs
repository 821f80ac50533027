//! Command dispatch
//!
//! Maps opcodes to registered handler capabilities and isolates the serve
//! loop from handler faults.
//!
//! ## Responsibilities
//! - Own the opcode → handler table
//! - Extract the opcode and invoke the handler with the full command text
//! - Degrade handler faults to the `E03` response, never to a dead session

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};

use parking_lot::RwLock;

use crate::protocol::{opcode, ERR_INTERNAL};
use crate::Result;

/// Handler capability: maps a raw command string to a response payload.
///
/// Handlers receive the entire original command, opcode prefix included,
/// and are responsible for any further parsing.
pub type Handler = Box<dyn Fn(&str) -> Result<String> + Send + Sync>;

/// Opcode → handler table with fault-isolating dispatch
///
/// Registration is expected from the controlling side before or between
/// sessions; the table itself is behind a lock so that late registration
/// cannot race an in-flight dispatch.
#[derive(Default)]
pub struct Dispatcher {
    handlers: RwLock<HashMap<String, Handler>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for an opcode, replacing any previous one.
    pub fn register<F>(&self, opcode: impl Into<String>, handler: F)
    where
        F: Fn(&str) -> Result<String> + Send + Sync + 'static,
    {
        self.handlers.write().insert(opcode.into(), Box::new(handler));
    }

    /// Remove the handler for an opcode, if any.
    pub fn unregister(&self, opcode: &str) {
        self.handlers.write().remove(opcode);
    }

    /// Whether a handler is registered for the opcode.
    pub fn is_registered(&self, opcode: &str) -> bool {
        self.handlers.read().contains_key(opcode)
    }

    /// Dispatch a raw command and produce the response payload.
    ///
    /// An unregistered opcode yields the empty string, the protocol's
    /// convention for "command not supported". Handler faults are logged
    /// and degrade to [`ERR_INTERNAL`]; dispatch itself never fails.
    pub fn dispatch(&self, command: &str) -> String {
        let op = opcode(command);
        let handlers = self.handlers.read();
        let Some(handler) = handlers.get(op) else {
            return String::new();
        };

        match catch_unwind(AssertUnwindSafe(|| handler(command))) {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::error!("handler for '{}' failed: {}", op, e);
                ERR_INTERNAL.to_string()
            }
            Err(panic) => {
                tracing::warn!("handler for '{}' panicked: {}", op, panic_message(&panic));
                ERR_INTERNAL.to_string()
            }
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
