//! Codec Tests
//!
//! Tests for packet encoding, escaping, checksums, and the streaming
//! decoder's ack/nack behavior.

use std::io::{Cursor, Read, Write};

use rsplink::protocol::{checksum, encode_packet, escape, read_packet};
use rsplink::RspError;

// =============================================================================
// Helper: duplex mock stream
// =============================================================================

/// In-memory stream: reads from a fixed input, captures writes.
struct MockStream {
    input: Cursor<Vec<u8>>,
    output: Vec<u8>,
}

impl MockStream {
    fn new(input: &[u8]) -> Self {
        Self {
            input: Cursor::new(input.to_vec()),
            output: Vec::new(),
        }
    }
}

impl Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.input.read(buf)
    }
}

impl Write for MockStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.output.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn decode(wire: &[u8]) -> (rsplink::Result<String>, Vec<u8>) {
    let mut stream = MockStream::new(wire);
    let result = read_packet(&mut stream, false);
    (result, stream.output)
}

// =============================================================================
// Encoding Tests
// =============================================================================

#[test]
fn test_checksum_is_sum_mod_256() {
    assert_eq!(checksum(b""), 0);
    assert_eq!(checksum(b"OK"), 0x9A); // 79 + 75 = 154
    assert_eq!(checksum(&[0xFF, 0x02]), 0x01); // wraps mod 256
}

#[test]
fn test_escape_only_touches_dollar_and_hash() {
    assert_eq!(escape("plain"), "plain");
    assert_eq!(escape("a#b"), "a\\#b");
    assert_eq!(escape("$"), "\\$");
    assert_eq!(escape("\\n"), "\\n"); // backslash itself is not escaped
}

#[test]
fn test_encode_checksum_vector() {
    assert_eq!(encode_packet("OK"), "$OK#9A");
}

#[test]
fn test_encode_empty_payload() {
    assert_eq!(encode_packet(""), "$#00");
}

#[test]
fn test_encode_escapes_and_checksums_wire_bytes() {
    // 'a' + '\' + '#' + 'b' = 97 + 92 + 35 + 98 = 322 -> 0x42.
    // The checksum covers the escaped representation, not the original.
    assert_eq!(encode_packet("a#b"), "$a\\#b#42");

    // '\' + '$' = 92 + 36 = 128 -> 0x80
    assert_eq!(encode_packet("$"), "$\\$#80");
}

// =============================================================================
// Decoding Tests
// =============================================================================

#[test]
fn test_decode_acks_valid_packet() {
    let (result, output) = decode(b"$ab#C3");
    assert_eq!(result.unwrap(), "ab");
    assert_eq!(output, b"+");
}

#[test]
fn test_decode_empty_payload() {
    let (result, output) = decode(b"$#00");
    assert_eq!(result.unwrap(), "");
    assert_eq!(output, b"+");
}

#[test]
fn test_round_trip_plain_payloads() {
    for payload in ["m0,4", "c", "OK", "hello world", "", "qSupported:xmlRegisters"] {
        let (result, output) = decode(encode_packet(payload).as_bytes());
        assert_eq!(result.unwrap(), payload);
        assert_eq!(output, b"+");
    }
}

#[test]
fn test_round_trip_escaped_payloads() {
    for payload in ["a#b", "$", "#", "$start#end$"] {
        let (result, _) = decode(encode_packet(payload).as_bytes());
        assert_eq!(result.unwrap(), payload);
    }
}

#[test]
fn test_nack_and_resume_on_checksum_mismatch() {
    // First frame carries a wrong checksum; the decoder must nack it and
    // keep scanning the same stream for the next packet.
    let (result, output) = decode(b"$ab#00$ab#C3");
    assert_eq!(result.unwrap(), "ab");
    assert_eq!(output, b"-+");
}

#[test]
fn test_nack_on_unparseable_checksum_digits() {
    let (result, output) = decode(b"$ab#zz$ab#C3");
    assert_eq!(result.unwrap(), "ab");
    assert_eq!(output, b"-+");
}

#[test]
fn test_dollar_restarts_capture() {
    // A new '$' mid-frame discards what was captured so far.
    let (result, output) = decode(b"$xy$ab#C3");
    assert_eq!(result.unwrap(), "ab");
    assert_eq!(output, b"+");
}

#[test]
fn test_leading_noise_is_discarded() {
    let (result, _) = decode(b"noise$ab#C3");
    assert_eq!(result.unwrap(), "ab");
}

#[test]
fn test_eof_mid_packet_is_session_end() {
    let (result, output) = decode(b"$ab");
    let err = result.unwrap_err();
    assert!(matches!(err, RspError::Io(_)));
    assert!(err.is_session_end());
    assert!(output.is_empty());
}

#[test]
fn test_eof_before_checksum_digits_is_session_end() {
    let (result, _) = decode(b"$ab#");
    assert!(result.unwrap_err().is_session_end());
}
