//! Packet types carried over the relay network.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{DecodeError, RangeError};

// ============================================================================
// Enumerations
// ============================================================================

/// Kind of a status payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketKind {
    /// Status report from a handheld.
    Status,
    /// Response from the base station.
    Response,
}

impl TryFrom<u8> for PacketKind {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            PKT_STATUS => Ok(PacketKind::Status),
            PKT_RESPONSE => Ok(PacketKind::Response),
            _ => Err(DecodeError::InvalidPacketType(value)),
        }
    }
}

impl From<PacketKind> for u8 {
    fn from(kind: PacketKind) -> Self {
        match kind {
            PacketKind::Status => PKT_STATUS,
            PacketKind::Response => PKT_RESPONSE,
        }
    }
}

/// Status reported by a handheld operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusCode {
    /// Emergency / critical.
    Red,
    /// Safe / OK.
    Green,
    /// Need food, water or medical supplies.
    Blue,
}

impl StatusCode {
    /// Operator-facing meaning of the status, as shown by the base station.
    pub const fn label(&self) -> &'static str {
        match self {
            StatusCode::Red => "EMERGENCY / CRITICAL",
            StatusCode::Green => "SAFE / OK",
            StatusCode::Blue => "NEED FOOD / WATER / MEDICAL SUPPLIES",
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<u8> for StatusCode {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            STATUS_RED => Ok(StatusCode::Red),
            STATUS_GREEN => Ok(StatusCode::Green),
            STATUS_BLUE => Ok(StatusCode::Blue),
            _ => Err(DecodeError::InvalidStatusCode(value)),
        }
    }
}

impl From<StatusCode> for u8 {
    fn from(code: StatusCode) -> Self {
        match code {
            StatusCode::Red => STATUS_RED,
            StatusCode::Green => STATUS_GREEN,
            StatusCode::Blue => STATUS_BLUE,
        }
    }
}

// ============================================================================
// Fixed-point coordinates
// ============================================================================

/// Convert degrees to the wire's fixed-point representation (degrees * 1e7).
///
/// Values outside roughly ±214.748 degrees saturate to `i32::MIN`/`i32::MAX`
/// and NaN becomes 0. Use [`checked_degrees_to_fixed`] to detect either case.
pub fn degrees_to_fixed(degrees: f64) -> i32 {
    (degrees * COORD_SCALE as f64).round() as i32
}

/// Convert degrees to fixed point, or `None` if the result does not fit an
/// `i32` or the input is not finite.
pub fn checked_degrees_to_fixed(degrees: f64) -> Option<i32> {
    let scaled = (degrees * COORD_SCALE as f64).round();
    if (i32::MIN as f64..=i32::MAX as f64).contains(&scaled) {
        Some(scaled as i32)
    } else {
        None
    }
}

/// Convert a fixed-point coordinate back to degrees.
pub fn fixed_to_degrees(fixed: i32) -> f64 {
    fixed as f64 / COORD_SCALE as f64
}

// ============================================================================
// Extended status payload
// ============================================================================

/// Status payload with reporting date and time (23 bytes on the wire).
///
/// Used on the handheld → tower and tower → base legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPayload {
    /// Calendar year, e.g. 2025.
    pub year: u16,
    /// Month, 1-12.
    pub month: u8,
    /// Day of month, 1-31.
    pub day: u8,
    /// Seconds since start of the UTC day, 0-86399.
    pub timestamp_utc: u32,
    /// Packet kind.
    #[serde(rename = "type")]
    pub kind: PacketKind,
    /// Originating handheld.
    pub handheld_id: u8,
    /// Relaying tower.
    pub tower_id: u8,
    /// Latitude in degrees * 1e7.
    pub latitude: i32,
    /// Longitude in degrees * 1e7.
    pub longitude: i32,
    /// Reported status.
    pub status: StatusCode,
    /// Correlates a report with its response.
    pub msg_id: u16,
    /// Only meaningful when `kind` is [`PacketKind::Response`].
    pub response_code: u8,
}

impl StatusPayload {
    /// Create a status report stamped with the given UTC date and time.
    ///
    /// The location is zero until set with [`StatusPayload::with_location`].
    pub fn report(
        reported_at: NaiveDateTime,
        handheld_id: u8,
        tower_id: u8,
        status: StatusCode,
        msg_id: u16,
    ) -> Self {
        StatusPayload {
            year: 0,
            month: 1,
            day: 1,
            timestamp_utc: 0,
            kind: PacketKind::Status,
            handheld_id,
            tower_id,
            latitude: 0,
            longitude: 0,
            status,
            msg_id,
            response_code: RESPONSE_CODE_NEGATIVE,
        }
        .stamp(reported_at)
    }

    /// Set the location from degrees. Out-of-range values saturate, see
    /// [`degrees_to_fixed`].
    pub fn with_location(mut self, lat: f64, lon: f64) -> Self {
        self.latitude = degrees_to_fixed(lat);
        self.longitude = degrees_to_fixed(lon);
        self
    }

    /// Fill the date and time fields from a UTC date/time.
    pub fn stamp(mut self, at: NaiveDateTime) -> Self {
        self.year = at.year().clamp(0, u16::MAX as i32) as u16;
        self.month = at.month() as u8;
        self.day = at.day() as u8;
        self.timestamp_utc = at.num_seconds_from_midnight();
        self
    }

    /// The reporting date and time, or `None` if the fields do not form a real
    /// calendar date (e.g. 2025-02-31).
    pub fn reported_at(&self) -> Option<NaiveDateTime> {
        let date = NaiveDate::from_ymd_opt(self.year as i32, self.month as u32, self.day as u32)?;
        let time = NaiveTime::from_num_seconds_from_midnight_opt(self.timestamp_utc, 0)?;
        Some(date.and_time(time))
    }

    /// Latitude in degrees.
    pub fn latitude_degrees(&self) -> f64 {
        fixed_to_degrees(self.latitude)
    }

    /// Longitude in degrees.
    pub fn longitude_degrees(&self) -> f64 {
        fixed_to_degrees(self.longitude)
    }

    /// Check the date/time fields against their declared bounds.
    pub fn validate(&self) -> Result<(), RangeError> {
        check_range("month", self.month as u32, 1, MAX_MONTH as u32)?;
        check_range("day", self.day as u32, 1, MAX_DAY as u32)?;
        check_range("timestamp_utc", self.timestamp_utc, 0, SECONDS_PER_DAY - 1)?;
        Ok(())
    }

    /// Build the base station's response to this report.
    ///
    /// IDs, location, date/time and `msg_id` are carried over.
    pub fn response(&self, accepted: bool) -> Self {
        StatusPayload {
            kind: PacketKind::Response,
            response_code: if accepted {
                RESPONSE_CODE_POSITIVE
            } else {
                RESPONSE_CODE_NEGATIVE
            },
            ..*self
        }
    }

    /// Whether the base accepted the report, for RESPONSE payloads only.
    ///
    /// Any nonzero response code counts as positive.
    pub fn response_accepted(&self) -> Option<bool> {
        match self.kind {
            PacketKind::Response => Some(self.response_code != RESPONSE_CODE_NEGATIVE),
            PacketKind::Status => None,
        }
    }

    /// Drop the date/time and response fields for the compact leg.
    pub fn to_compact(&self) -> StatusPayloadCompact {
        StatusPayloadCompact {
            kind: self.kind,
            handheld_id: self.handheld_id,
            tower_id: self.tower_id,
            latitude: self.latitude,
            longitude: self.longitude,
            status: self.status,
            msg_id: self.msg_id,
        }
    }
}

fn check_range(field: &'static str, value: u32, min: u32, max: u32) -> Result<(), RangeError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(RangeError {
            field,
            value,
            min,
            max,
        })
    }
}

// ============================================================================
// Compact status payload
// ============================================================================

/// Status payload without date/time (14 bytes on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPayloadCompact {
    /// Packet kind.
    #[serde(rename = "type")]
    pub kind: PacketKind,
    /// Originating handheld.
    pub handheld_id: u8,
    /// Relaying tower.
    pub tower_id: u8,
    /// Latitude in degrees * 1e7.
    pub latitude: i32,
    /// Longitude in degrees * 1e7.
    pub longitude: i32,
    /// Reported status.
    pub status: StatusCode,
    /// Correlates a report with its response.
    pub msg_id: u16,
}

impl StatusPayloadCompact {
    /// Create a compact status report with zero location.
    pub fn report(handheld_id: u8, tower_id: u8, status: StatusCode, msg_id: u16) -> Self {
        StatusPayloadCompact {
            kind: PacketKind::Status,
            handheld_id,
            tower_id,
            latitude: 0,
            longitude: 0,
            status,
            msg_id,
        }
    }

    /// Set the location from degrees. Out-of-range values saturate, see
    /// [`degrees_to_fixed`].
    pub fn with_location(mut self, lat: f64, lon: f64) -> Self {
        self.latitude = degrees_to_fixed(lat);
        self.longitude = degrees_to_fixed(lon);
        self
    }

    /// Latitude in degrees.
    pub fn latitude_degrees(&self) -> f64 {
        fixed_to_degrees(self.latitude)
    }

    /// Longitude in degrees.
    pub fn longitude_degrees(&self) -> f64 {
        fixed_to_degrees(self.longitude)
    }

    /// Add a reporting date/time to get an extended payload.
    pub fn extend(&self, reported_at: NaiveDateTime) -> StatusPayload {
        StatusPayload {
            year: 0,
            month: 1,
            day: 1,
            timestamp_utc: 0,
            kind: self.kind,
            handheld_id: self.handheld_id,
            tower_id: self.tower_id,
            latitude: self.latitude,
            longitude: self.longitude,
            status: self.status,
            msg_id: self.msg_id,
            response_code: RESPONSE_CODE_NEGATIVE,
        }
        .stamp(reported_at)
    }
}

impl From<&StatusPayload> for StatusPayloadCompact {
    fn from(payload: &StatusPayload) -> Self {
        payload.to_compact()
    }
}

// ============================================================================
// Ack
// ============================================================================

/// Acknowledgement of a `msg_id` (3 bytes on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ack {
    /// Zero means rejected, anything else accepted.
    pub ack_ok: u8,
    /// The acknowledged message.
    pub msg_id: u16,
}

impl Ack {
    /// Positive acknowledgement.
    pub const fn accepted(msg_id: u16) -> Self {
        Ack {
            ack_ok: ACK_OK,
            msg_id,
        }
    }

    /// Negative acknowledgement.
    pub const fn rejected(msg_id: u16) -> Self {
        Ack {
            ack_ok: ACK_REJECTED,
            msg_id,
        }
    }

    /// Check if the message was accepted.
    pub const fn is_accepted(&self) -> bool {
        self.ack_ok != ACK_REJECTED
    }
}
