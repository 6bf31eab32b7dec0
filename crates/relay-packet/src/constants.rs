//! Protocol constants
//!
//! Discriminant bytes, wire sizes and field bounds shared by handheld, tower
//! and base station firmware.

// ============================================================================
// Packet Types
// ============================================================================

/// Status report (handheld → tower → base).
pub const PKT_STATUS: u8 = 0x01;
/// Response to a status report (base → tower → handheld).
pub const PKT_RESPONSE: u8 = 0x02;

// ============================================================================
// Status Codes
// ============================================================================

/// Emergency / critical.
pub const STATUS_RED: u8 = 1;
/// Safe / OK.
pub const STATUS_GREEN: u8 = 2;
/// Need food, water or medical supplies.
pub const STATUS_BLUE: u8 = 3;

// ============================================================================
// Response Codes
// ============================================================================

/// Negative response (`response_code` of a RESPONSE packet).
pub const RESPONSE_CODE_NEGATIVE: u8 = 0;
/// Positive response (`response_code` of a RESPONSE packet).
pub const RESPONSE_CODE_POSITIVE: u8 = 1;

// ============================================================================
// Ack Values
// ============================================================================

/// Message rejected.
pub const ACK_REJECTED: u8 = 0;
/// Message accepted. Any nonzero `ack_ok` also means accepted.
pub const ACK_OK: u8 = 1;

// ============================================================================
// Sizes
// ============================================================================

/// Size of an extended status payload on the wire.
pub const STATUS_PAYLOAD_SIZE: usize = 23;
/// Size of a compact status payload on the wire.
pub const COMPACT_PAYLOAD_SIZE: usize = 14;
/// Size of an ack on the wire.
pub const ACK_SIZE: usize = 3;

// ============================================================================
// Field Bounds
// ============================================================================

/// Fixed-point scale of latitude/longitude (degrees * 1e7).
pub const COORD_SCALE: i32 = 10_000_000;
/// Number of seconds in a day; `timestamp_utc` must be below this.
pub const SECONDS_PER_DAY: u32 = 86_400;
/// Largest valid month.
pub const MAX_MONTH: u8 = 12;
/// Largest valid day of month.
pub const MAX_DAY: u8 = 31;
