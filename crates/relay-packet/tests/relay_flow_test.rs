//! End-to-end tests of a report travelling handheld → tower → base and back.

use chrono::NaiveDate;
use relay_packet::{
    decode, decode_ack, decode_compact, encode, encode_ack, encode_compact, Ack, Packet,
    PacketKind, StatusCode, StatusPayload, WireFormat, COMPACT_PAYLOAD_SIZE, STATUS_PAYLOAD_SIZE,
};

fn reported_at() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

#[test]
fn test_handheld_report_reaches_base() {
    // Handheld builds and sends the extended report.
    let report = StatusPayload::report(reported_at(), 5, 1, StatusCode::Red, 42)
        .with_location(40.0, -74.0);
    let on_air = encode(&report).expect("valid report");
    assert_eq!(on_air.len(), STATUS_PAYLOAD_SIZE);

    // Tower decodes it and forwards the compact form on its local leg.
    let at_tower = decode(&on_air).expect("tower decodes report");
    assert_eq!(at_tower, report);
    let forwarded = encode_compact(&at_tower.to_compact());
    assert_eq!(forwarded.len(), COMPACT_PAYLOAD_SIZE);

    // Base decodes the compact form and acknowledges.
    let at_base = decode_compact(&forwarded).expect("base decodes report");
    assert_eq!(at_base.kind, PacketKind::Status);
    assert_eq!(at_base.status, StatusCode::Red);
    assert_eq!(at_base.latitude, 400_000_000);
    assert_eq!(at_base.longitude, -740_000_000);

    let ack = encode_ack(&Ack::accepted(at_base.msg_id));
    assert_eq!(ack, [0x01, 0x2A, 0x00]);
    assert_eq!(decode_ack(&ack).unwrap(), Ack { ack_ok: 1, msg_id: 42 });
}

#[test]
fn test_base_response_reaches_handheld() {
    let report = StatusPayload::report(reported_at(), 5, 1, StatusCode::Blue, 42);
    let response = report.response(true);

    let bytes = Packet::from(response).encode().unwrap();
    match Packet::decode(WireFormat::Extended, &bytes).unwrap() {
        Packet::Extended(received) => {
            assert_eq!(received.kind, PacketKind::Response);
            assert_eq!(received.msg_id, report.msg_id);
            assert_eq!(received.response_accepted(), Some(true));
        }
        other => panic!("Expected extended payload, got {:?}", other),
    }
}

#[test]
fn test_roundtrip_extremes() {
    let payloads = [
        StatusPayload {
            year: 0,
            month: 1,
            day: 1,
            timestamp_utc: 0,
            kind: PacketKind::Status,
            handheld_id: 0,
            tower_id: 0,
            latitude: i32::MIN,
            longitude: i32::MIN,
            status: StatusCode::Red,
            msg_id: 0,
            response_code: 0,
        },
        StatusPayload {
            year: u16::MAX,
            month: 12,
            day: 31,
            timestamp_utc: 86_399,
            kind: PacketKind::Response,
            handheld_id: u8::MAX,
            tower_id: u8::MAX,
            latitude: i32::MAX,
            longitude: i32::MAX,
            status: StatusCode::Blue,
            msg_id: u16::MAX,
            response_code: u8::MAX,
        },
    ];

    for payload in payloads {
        assert_eq!(decode(&encode(&payload).unwrap()).unwrap(), payload);
        let compact = payload.to_compact();
        assert_eq!(decode_compact(&encode_compact(&compact)).unwrap(), compact);
    }

    for ack in [Ack::rejected(0), Ack { ack_ok: u8::MAX, msg_id: u16::MAX }] {
        assert_eq!(decode_ack(&encode_ack(&ack)).unwrap(), ack);
    }
}
