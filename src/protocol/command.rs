//! Command text conventions
//!
//! Opcode extraction and the canonical error-code responses.

// =============================================================================
// Canonical Error Codes
// =============================================================================

/// Malformed or unrecognized command content
pub const ERR_COMMAND: &str = "E01";

/// Invalid parameter value
pub const ERR_PARAM: &str = "E02";

/// Internal failure; also the dispatcher's fallback for handler faults
pub const ERR_INTERNAL: &str = "E03";

/// Unspecified/unknown failure
pub const ERR_UNKNOWN: &str = "E04";

/// Protocol-level violation
pub const ERR_PROTOCOL: &str = "E05";

// =============================================================================
// Opcode Extraction
// =============================================================================

/// Extract the opcode from a raw command.
///
/// The opcode is the text up to (not including) the first comma, or the
/// whole command if no comma is present. Opcodes are case-sensitive.
pub fn opcode(command: &str) -> &str {
    match command.find(',') {
        Some(pos) => &command[..pos],
        None => command,
    }
}
