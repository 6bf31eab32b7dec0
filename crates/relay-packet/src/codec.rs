//! Packet encoding and decoding.
//!
//! Every field is written at a fixed offset in little-endian byte order, with no
//! padding. This matches the packed structs used by the handheld and tower
//! firmware.
//!
//! ## Extended Status Payload (23 bytes)
//!
//! | Offset | Field         | Type | Description                          |
//! |--------|---------------|------|--------------------------------------|
//! | 0-1    | year          | u16  | Calendar year                        |
//! | 2      | month         | u8   | 1-12                                 |
//! | 3      | day           | u8   | 1-31                                 |
//! | 4-7    | timestamp_utc | u32  | Seconds since start of day, 0-86399  |
//! | 8      | type          | u8   | 1 = status, 2 = response             |
//! | 9      | handheld_id   | u8   |                                      |
//! | 10     | tower_id      | u8   |                                      |
//! | 11-14  | latitude      | i32  | Degrees * 1e7                        |
//! | 15-18  | longitude     | i32  | Degrees * 1e7                        |
//! | 19     | status        | u8   | 1 = red, 2 = green, 3 = blue         |
//! | 20-21  | msg_id        | u16  |                                      |
//! | 22     | response_code | u8   | Response packets only                |
//!
//! ## Compact Status Payload (14 bytes)
//!
//! | Offset | Field       | Type |
//! |--------|-------------|------|
//! | 0      | type        | u8   |
//! | 1      | handheld_id | u8   |
//! | 2      | tower_id    | u8   |
//! | 3-6    | latitude    | i32  |
//! | 7-10   | longitude   | i32  |
//! | 11     | status      | u8   |
//! | 12-13  | msg_id      | u16  |
//!
//! ## Ack (3 bytes)
//!
//! | Offset | Field  | Type |
//! |--------|--------|------|
//! | 0      | ack_ok | u8   |
//! | 1-2    | msg_id | u16  |
//!
//! Decoders read exactly the format width from the front of the buffer and
//! ignore anything after it.

use bytes::{Buf, BufMut};

use crate::{
    Ack, DecodeError, EncodeError, PacketKind, StatusCode, StatusPayload, StatusPayloadCompact,
    ACK_SIZE, COMPACT_PAYLOAD_SIZE, STATUS_PAYLOAD_SIZE,
};

// ============================================================================
// Encoding Functions
// ============================================================================

/// Encode an extended status payload.
///
/// Fails if month, day or timestamp are outside their bounds.
pub fn encode(payload: &StatusPayload) -> Result<[u8; STATUS_PAYLOAD_SIZE], EncodeError> {
    payload.validate()?;

    let mut out = [0u8; STATUS_PAYLOAD_SIZE];
    let mut buf = &mut out[..];

    buf.put_u16_le(payload.year);
    buf.put_u8(payload.month);
    buf.put_u8(payload.day);
    buf.put_u32_le(payload.timestamp_utc);
    buf.put_u8(payload.kind.into());
    buf.put_u8(payload.handheld_id);
    buf.put_u8(payload.tower_id);
    buf.put_i32_le(payload.latitude);
    buf.put_i32_le(payload.longitude);
    buf.put_u8(payload.status.into());
    buf.put_u16_le(payload.msg_id);
    buf.put_u8(payload.response_code);

    Ok(out)
}

/// Encode a compact status payload.
pub fn encode_compact(payload: &StatusPayloadCompact) -> [u8; COMPACT_PAYLOAD_SIZE] {
    let mut out = [0u8; COMPACT_PAYLOAD_SIZE];
    let mut buf = &mut out[..];

    buf.put_u8(payload.kind.into());
    buf.put_u8(payload.handheld_id);
    buf.put_u8(payload.tower_id);
    buf.put_i32_le(payload.latitude);
    buf.put_i32_le(payload.longitude);
    buf.put_u8(payload.status.into());
    buf.put_u16_le(payload.msg_id);

    out
}

/// Encode an ack.
pub fn encode_ack(ack: &Ack) -> [u8; ACK_SIZE] {
    let mut out = [0u8; ACK_SIZE];
    let mut buf = &mut out[..];

    buf.put_u8(ack.ack_ok);
    buf.put_u16_le(ack.msg_id);

    out
}

// ============================================================================
// Decoding Functions
// ============================================================================

/// Decode an extended status payload from the first 23 bytes of `data`.
pub fn decode(data: &[u8]) -> Result<StatusPayload, DecodeError> {
    let mut buf = take(data, STATUS_PAYLOAD_SIZE)?;

    let payload = StatusPayload {
        year: buf.get_u16_le(),
        month: buf.get_u8(),
        day: buf.get_u8(),
        timestamp_utc: buf.get_u32_le(),
        kind: PacketKind::try_from(buf.get_u8())?,
        handheld_id: buf.get_u8(),
        tower_id: buf.get_u8(),
        latitude: buf.get_i32_le(),
        longitude: buf.get_i32_le(),
        status: StatusCode::try_from(buf.get_u8())?,
        msg_id: buf.get_u16_le(),
        response_code: buf.get_u8(),
    };

    payload.validate()?;
    Ok(payload)
}

/// Decode a compact status payload from the first 14 bytes of `data`.
pub fn decode_compact(data: &[u8]) -> Result<StatusPayloadCompact, DecodeError> {
    let mut buf = take(data, COMPACT_PAYLOAD_SIZE)?;

    Ok(StatusPayloadCompact {
        kind: PacketKind::try_from(buf.get_u8())?,
        handheld_id: buf.get_u8(),
        tower_id: buf.get_u8(),
        latitude: buf.get_i32_le(),
        longitude: buf.get_i32_le(),
        status: StatusCode::try_from(buf.get_u8())?,
        msg_id: buf.get_u16_le(),
    })
}

/// Decode an ack from the first 3 bytes of `data`.
pub fn decode_ack(data: &[u8]) -> Result<Ack, DecodeError> {
    let mut buf = take(data, ACK_SIZE)?;

    Ok(Ack {
        ack_ok: buf.get_u8(),
        msg_id: buf.get_u16_le(),
    })
}

/// The first `size` bytes of `data`, or `TruncatedInput`.
fn take(data: &[u8], size: usize) -> Result<&[u8], DecodeError> {
    data.get(..size).ok_or(DecodeError::TruncatedInput {
        expected: size,
        actual: data.len(),
    })
}

// ============================================================================
// Inherent shortcuts
// ============================================================================

impl StatusPayload {
    /// Encode to the 23-byte wire form. See [`encode`].
    pub fn encode(&self) -> Result<[u8; STATUS_PAYLOAD_SIZE], EncodeError> {
        encode(self)
    }

    /// Decode from the 23-byte wire form. See [`decode`].
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        decode(data)
    }
}

impl StatusPayloadCompact {
    /// Encode to the 14-byte wire form.
    pub fn encode(&self) -> [u8; COMPACT_PAYLOAD_SIZE] {
        encode_compact(self)
    }

    /// Decode from the 14-byte wire form.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        decode_compact(data)
    }
}

impl Ack {
    /// Encode to the 3-byte wire form.
    pub fn encode(&self) -> [u8; ACK_SIZE] {
        encode_ack(self)
    }

    /// Decode from the 3-byte wire form.
    pub fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        decode_ack(data)
    }
}

// ============================================================================
// Tests
// ============================================================================
