//! Status Relay Packet Codec
//!
//! This crate provides the wire types and the encode/decode functions for the
//! packets exchanged between handhelds, relay towers and the base station.
//!
//! # Protocol Overview
//!
//! Every message is a fixed-size, unpadded, little-endian byte sequence. There is
//! no header, length prefix, version byte or checksum: the transport decides which
//! format it is carrying and delimits the bytes of each message.
//!
//! - **Extended status payload** (23 bytes): handheld → tower → base, carries the
//!   reporting date and UTC seconds-of-day.
//! - **Compact status payload** (14 bytes): the tower-local leg, no date/time.
//! - **Ack** (3 bytes): base → tower, acknowledges a `msg_id`.
//!
//! # Example
//!
//! ```rust
//! use relay_packet::{decode_ack, encode_ack, Ack};
//!
//! let bytes = encode_ack(&Ack::accepted(42));
//! assert_eq!(bytes, [0x01, 0x2A, 0x00]);
//! assert_eq!(decode_ack(&bytes).unwrap().msg_id, 42);
//! ```

mod codec;
mod constants;
mod error;
mod format;
mod types;

pub use codec::*;
pub use constants::*;
pub use error::*;
pub use format::*;
pub use types::*;
