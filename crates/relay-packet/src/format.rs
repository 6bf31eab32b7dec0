//! Wire format selection.
//!
//! Nothing in the bytes identifies which format they are in. The transport
//! (or the operator, through configuration) picks a [`WireFormat`] out of band
//! and the codec decodes accordingly.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    decode, decode_ack, decode_compact, encode, encode_ack, encode_compact, Ack, DecodeError,
    EncodeError, StatusPayload, StatusPayloadCompact, UnknownFormat, ACK_SIZE,
    COMPACT_PAYLOAD_SIZE, STATUS_PAYLOAD_SIZE,
};

/// One of the three fixed-size wire formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// 23-byte status payload with date/time.
    Extended,
    /// 14-byte status payload without date/time.
    Compact,
    /// 3-byte acknowledgement.
    Ack,
}

impl WireFormat {
    /// Size of the format on the wire.
    pub const fn size(&self) -> usize {
        match self {
            WireFormat::Extended => STATUS_PAYLOAD_SIZE,
            WireFormat::Compact => COMPACT_PAYLOAD_SIZE,
            WireFormat::Ack => ACK_SIZE,
        }
    }

    /// Lowercase name used in configuration and on the command line.
    pub const fn as_str(&self) -> &'static str {
        match self {
            WireFormat::Extended => "extended",
            WireFormat::Compact => "compact",
            WireFormat::Ack => "ack",
        }
    }

    /// Whether the format carries a status report.
    pub const fn is_status(&self) -> bool {
        matches!(self, WireFormat::Extended | WireFormat::Compact)
    }
}

impl std::fmt::Display for WireFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WireFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "extended" => Ok(WireFormat::Extended),
            "compact" => Ok(WireFormat::Compact),
            "ack" => Ok(WireFormat::Ack),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// A decoded packet in any of the wire formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Packet {
    /// Extended status payload.
    Extended(StatusPayload),
    /// Compact status payload.
    Compact(StatusPayloadCompact),
    /// Acknowledgement.
    Ack(Ack),
}

impl Packet {
    /// Decode `data` as the given format.
    pub fn decode(format: WireFormat, data: &[u8]) -> Result<Self, DecodeError> {
        match format {
            WireFormat::Extended => decode(data).map(Packet::Extended),
            WireFormat::Compact => decode_compact(data).map(Packet::Compact),
            WireFormat::Ack => decode_ack(data).map(Packet::Ack),
        }
    }

    /// Encode to the packet's wire format.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        Ok(match self {
            Packet::Extended(payload) => encode(payload)?.to_vec(),
            Packet::Compact(payload) => encode_compact(payload).to_vec(),
            Packet::Ack(ack) => encode_ack(ack).to_vec(),
        })
    }

    /// The packet's wire format.
    pub fn format(&self) -> WireFormat {
        match self {
            Packet::Extended(_) => WireFormat::Extended,
            Packet::Compact(_) => WireFormat::Compact,
            Packet::Ack(_) => WireFormat::Ack,
        }
    }

    /// The message ID carried by the packet.
    pub fn msg_id(&self) -> u16 {
        match self {
            Packet::Extended(payload) => payload.msg_id,
            Packet::Compact(payload) => payload.msg_id,
            Packet::Ack(ack) => ack.msg_id,
        }
    }
}

impl From<StatusPayload> for Packet {
    fn from(payload: StatusPayload) -> Self {
        Packet::Extended(payload)
    }
}

impl From<StatusPayloadCompact> for Packet {
    fn from(payload: StatusPayloadCompact) -> Self {
        Packet::Compact(payload)
    }
}

impl From<Ack> for Packet {
    fn from(ack: Ack) -> Self {
        Packet::Ack(ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StatusCode;

    #[test]
    fn test_format_sizes() {
        assert_eq!(WireFormat::Extended.size(), 23);
        assert_eq!(WireFormat::Compact.size(), 14);
        assert_eq!(WireFormat::Ack.size(), 3);
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("extended".parse::<WireFormat>().unwrap(), WireFormat::Extended);
        assert_eq!("Compact".parse::<WireFormat>().unwrap(), WireFormat::Compact);
        assert_eq!("ack".parse::<WireFormat>().unwrap(), WireFormat::Ack);
        assert!("envelope".parse::<WireFormat>().is_err());
        assert_eq!(WireFormat::Compact.to_string(), "compact");
    }

    #[test]
    fn test_packet_dispatch() {
        let compact = StatusPayloadCompact::report(3, 4, StatusCode::Green, 99);
        let packet = Packet::from(compact);
        let bytes = packet.encode().unwrap();
        assert_eq!(bytes.len(), WireFormat::Compact.size());

        let decoded = Packet::decode(WireFormat::Compact, &bytes).unwrap();
        assert_eq!(decoded, packet);
        assert_eq!(decoded.format(), WireFormat::Compact);
        assert_eq!(decoded.msg_id(), 99);
    }

    #[test]
    fn test_same_bytes_different_formats() {
        // Fourteen bytes are a complete compact payload but a truncated extended one.
        let bytes = StatusPayloadCompact::report(1, 1, StatusCode::Red, 1).encode();
        assert!(Packet::decode(WireFormat::Compact, &bytes).is_ok());
        assert_eq!(
            Packet::decode(WireFormat::Extended, &bytes),
            Err(DecodeError::TruncatedInput {
                expected: 23,
                actual: 14
            })
        );
        // And the first three bytes read as an ack.
        assert_eq!(
            Packet::decode(WireFormat::Ack, &bytes).unwrap().format(),
            WireFormat::Ack
        );
    }
}
