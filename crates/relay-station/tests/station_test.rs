//! Integration tests for the base station.
//!
//! These drive the station with encoded frames the way the radio loop does and
//! check the acks and the JSON events that reach the sink.

use chrono::{NaiveDate, NaiveDateTime};
use relay_packet::{
    decode_ack, encode, encode_compact, StatusCode, StatusPayload, StatusPayloadCompact,
    WireFormat,
};
use relay_station::{
    load_config_from_str, BaseStation, EventSink, FixedClock, FlushOutcome, JsonLinesSink,
    SinkError, StationConfig, StationError, StatusEvent,
};

fn received_at() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 1)
        .unwrap()
        .and_hms_opt(14, 30, 0)
        .unwrap()
}

fn station_from_yaml(yaml: &str) -> BaseStation<FixedClock> {
    let config = load_config_from_str(yaml).expect("valid config");
    BaseStation::with_clock(config, FixedClock(received_at())).expect("station starts")
}

/// A backend that is down until `down_for` deliveries have been refused.
struct FlakyBackend {
    down_for: u32,
    stored: Vec<StatusEvent>,
}

impl EventSink for FlakyBackend {
    fn deliver(&mut self, event: &StatusEvent) -> Result<(), SinkError> {
        if self.down_for > 0 {
            self.down_for -= 1;
            return Err(SinkError::Rejected("503 Service Unavailable".to_string()));
        }
        self.stored.push(event.clone());
        Ok(())
    }
}

// ============================================================================
// Frame intake
// ============================================================================

#[test]
fn test_compact_frames_to_json_lines() {
    let mut station = station_from_yaml("station_name: field-base\nretry_delay_ms: 0\n");
    let mut sink = JsonLinesSink::new(Vec::new());

    let frames = [
        StatusPayloadCompact::report(5, 1, StatusCode::Red, 42).with_location(40.0, -74.0),
        StatusPayloadCompact::report(6, 1, StatusCode::Blue, 43).with_location(37.7749, -122.4194),
    ];

    for payload in &frames {
        let reception = station.receive(&encode_compact(payload)).unwrap();
        let ack = decode_ack(&reception.ack_bytes).unwrap();
        assert!(ack.is_accepted());
        assert_eq!(ack.msg_id, payload.msg_id);
        assert_eq!(station.flush_all(&mut sink), 1);
    }

    let output = String::from_utf8(sink.into_inner()).unwrap();
    let events: Vec<StatusEvent> = output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].status_str, "EMERGENCY / CRITICAL");
    assert_eq!(events[0].timestamp, "2025-06-01 14:30:00");
    assert_eq!(events[1].handheld_id, 6);
    approx::assert_relative_eq!(events[1].lat, 37.7749, epsilon = 1e-7);
    approx::assert_relative_eq!(events[1].lon, -122.4194, epsilon = 1e-7);
}

#[test]
fn test_extended_station_rejects_compact_frames() {
    let mut station = station_from_yaml("format: extended\n");
    let compact = encode_compact(&StatusPayloadCompact::report(1, 1, StatusCode::Green, 1));

    match station.receive(&compact) {
        Err(StationError::UnexpectedSize { expected, actual }) => {
            assert_eq!(expected, 23);
            assert_eq!(actual, 14);
        }
        other => panic!("Expected size rejection, got {:?}", other),
    }
    assert_eq!(station.pending(), 0);
}

#[test]
fn test_extended_station_reports_handheld_time() {
    let mut station = station_from_yaml("format: extended\n");
    let sent_at = NaiveDate::from_ymd_opt(2025, 6, 1)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    let payload = StatusPayload::report(sent_at, 5, 1, StatusCode::Red, 42);

    let reception = station.receive(&encode(&payload).unwrap()).unwrap();
    assert_eq!(reception.event.reported_at, Some(sent_at));

    let json = serde_json::to_value(&reception.event).unwrap();
    assert_eq!(json["reported_at"], "2025-06-01T12:00:00");
}

#[test]
fn test_extended_station_rejects_bad_month() {
    let mut station = station_from_yaml("format: extended\n");
    let payload = StatusPayload::report(received_at(), 5, 1, StatusCode::Red, 42);
    let mut frame = encode(&payload).unwrap();
    frame[2] = 13;

    assert!(matches!(
        station.receive(&frame),
        Err(StationError::Decode(_))
    ));
}

// ============================================================================
// Outbox
// ============================================================================

#[test]
fn test_outbox_survives_backend_outage() {
    let mut station = station_from_yaml("max_attempts: 2\nretry_delay_ms: 0\n");
    let mut backend = FlakyBackend {
        down_for: 3,
        stored: Vec::new(),
    };

    station
        .receive(&encode_compact(&StatusPayloadCompact::report(1, 1, StatusCode::Red, 10)))
        .unwrap();
    station
        .receive(&encode_compact(&StatusPayloadCompact::report(2, 1, StatusCode::Green, 11)))
        .unwrap();

    // Both attempts for msg 10 fail; it goes behind msg 11.
    assert_eq!(
        station.flush_one(&mut backend),
        FlushOutcome::Requeued {
            msg_id: 10,
            attempts: 2
        }
    );
    // First attempt for msg 11 fails, second succeeds.
    assert_eq!(
        station.flush_one(&mut backend),
        FlushOutcome::Delivered {
            msg_id: 11,
            attempts: 2
        }
    );
    assert_eq!(
        station.flush_one(&mut backend),
        FlushOutcome::Delivered {
            msg_id: 10,
            attempts: 1
        }
    );
    assert_eq!(station.flush_one(&mut backend), FlushOutcome::Idle);

    let order: Vec<u16> = backend.stored.iter().map(|e| e.msg_id).collect();
    assert_eq!(order, vec![11, 10]);
}

#[test]
fn test_default_config_matches_base_station() {
    let config = StationConfig::default();
    assert_eq!(config.format, WireFormat::Compact);
    assert_eq!(config.format.size(), 14);
    assert_eq!(config.max_attempts, 3);
}
