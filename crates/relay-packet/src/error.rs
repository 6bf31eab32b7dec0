//! Codec error types.

use thiserror::Error;

/// A date/time field outside its declared bounds.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{field} out of range: {value} (expected {min}..={max})")]
pub struct RangeError {
    /// Name of the offending field.
    pub field: &'static str,
    /// Value found in the field.
    pub value: u32,
    /// Smallest accepted value.
    pub min: u32,
    /// Largest accepted value.
    pub max: u32,
}

/// Errors that can occur when decoding a packet.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// Buffer is shorter than the fixed format width.
    #[error("truncated input: expected {expected} bytes, got {actual}")]
    TruncatedInput {
        /// Width of the format being decoded.
        expected: usize,
        /// Length of the supplied buffer.
        actual: usize,
    },

    /// Type byte is not a known packet kind.
    #[error("invalid packet type: 0x{0:02X}")]
    InvalidPacketType(u8),

    /// Status byte is not a known status code.
    #[error("invalid status code: 0x{0:02X}")]
    InvalidStatusCode(u8),

    /// Date/time field outside its bounds.
    #[error(transparent)]
    FieldOutOfRange(#[from] RangeError),
}

/// Errors that can occur when encoding a packet.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeError {
    /// Date/time field outside its bounds.
    #[error(transparent)]
    FieldOutOfRange(#[from] RangeError),
}

/// A wire format name that is not recognised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown wire format: {0} (expected extended, compact or ack)")]
pub struct UnknownFormat(pub String);
