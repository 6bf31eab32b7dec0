//! Status events forwarded to the backend.

use chrono::NaiveDateTime;
use relay_packet::{StatusPayload, StatusPayloadCompact};
use serde::{Deserialize, Serialize};

/// Format of the station's receive timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A decoded status report, in the shape the backend stores.
///
/// `type` and `status` keep their numeric wire values; `status_str` carries
/// the operator-facing meaning and coordinates are in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    /// Local time the station received the frame.
    pub timestamp: String,
    /// Packet type byte.
    #[serde(rename = "type")]
    pub kind: u8,
    /// Originating handheld.
    pub handheld_id: u8,
    /// Relaying tower.
    pub tower_id: u8,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Status byte.
    pub status: u8,
    /// Meaning of the status.
    pub status_str: String,
    /// Message ID.
    pub msg_id: u16,
    /// Date/time reported by the handheld (extended format only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_at: Option<NaiveDateTime>,
}

impl StatusEvent {
    /// Event for a compact payload received at `received_at`.
    pub fn from_compact(payload: &StatusPayloadCompact, received_at: NaiveDateTime) -> Self {
        StatusEvent {
            timestamp: received_at.format(TIMESTAMP_FORMAT).to_string(),
            kind: payload.kind.into(),
            handheld_id: payload.handheld_id,
            tower_id: payload.tower_id,
            lat: payload.latitude_degrees(),
            lon: payload.longitude_degrees(),
            status: payload.status.into(),
            status_str: payload.status.label().to_string(),
            msg_id: payload.msg_id,
            reported_at: None,
        }
    }

    /// Event for an extended payload received at `received_at`.
    pub fn from_extended(payload: &StatusPayload, received_at: NaiveDateTime) -> Self {
        StatusEvent {
            reported_at: payload.reported_at(),
            ..Self::from_compact(&payload.to_compact(), received_at)
        }
    }
}
