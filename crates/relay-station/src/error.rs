//! Error types for the base station.

use relay_packet::{DecodeError, EncodeError};
use thiserror::Error;

/// Errors raised by the station and the `relayctl` tool.
#[derive(Debug, Error)]
pub enum StationError {
    /// Frame length does not match the configured wire format.
    #[error("unexpected frame size: expected {expected} bytes, got {actual}")]
    UnexpectedSize {
        /// Size of the configured format.
        expected: usize,
        /// Size of the received frame.
        actual: usize,
    },

    /// Frame could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Packet could not be encoded.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// Configuration is not usable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed hex input.
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// Errors raised while delivering an event to a sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Writing to the sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The event could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The backend refused the event.
    #[error("rejected by backend: {0}")]
    Rejected(String),
}
