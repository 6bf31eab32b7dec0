//! Destinations for status events.

use std::io::Write;

use crate::error::SinkError;
use crate::event::StatusEvent;

/// Receives events drained from the station's outbox.
///
/// Returning an error counts as one failed delivery attempt.
pub trait EventSink {
    /// Deliver one event.
    fn deliver(&mut self, event: &StatusEvent) -> Result<(), SinkError>;
}

/// Writes each event as one line of JSON.
///
/// Each line reaches the writer in a single `write_all`.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    /// Create a sink over `writer`.
    pub fn new(writer: W) -> Self {
        JsonLinesSink { writer }
    }

    /// Unwrap the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn deliver(&mut self, event: &StatusEvent) -> Result<(), SinkError> {
        // One write per event; a failed event leaves no partial line.
        let mut line = serde_json::to_vec(event)?;
        line.push(b'\n');
        self.writer.write_all(&line)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use relay_packet::{StatusCode, StatusPayloadCompact};
    use std::io;

    /// Accepts `writes_left` calls to `write`, then refuses the rest.
    struct LimitedWriter {
        written: Vec<u8>,
        writes_left: usize,
    }

    impl Write for LimitedWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.writes_left == 0 {
                return Err(io::Error::new(io::ErrorKind::WriteZero, "disk full"));
            }
            self.writes_left -= 1;
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_json_lines() {
        let at = NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        let mut sink = JsonLinesSink::new(Vec::new());
        for msg_id in [1, 2] {
            let payload = StatusPayloadCompact::report(1, 1, StatusCode::Green, msg_id);
            sink.deliver(&StatusEvent::from_compact(&payload, at)).unwrap();
        }

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let second: StatusEvent = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.msg_id, 2);
        assert_eq!(second.timestamp, "2025-01-02 03:04:05");
    }

    #[test]
    fn test_event_written_in_one_piece() {
        let at = NaiveDate::from_ymd_opt(2025, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        let event = StatusEvent::from_compact(
            &StatusPayloadCompact::report(1, 1, StatusCode::Red, 7),
            at,
        );

        let mut sink = JsonLinesSink::new(LimitedWriter {
            written: Vec::new(),
            writes_left: 0,
        });
        assert!(matches!(sink.deliver(&event), Err(SinkError::Io(_))));
        assert!(sink.writer.written.is_empty());

        // One write call is enough for a whole line.
        sink.writer.writes_left = 1;
        sink.deliver(&event).unwrap();
        assert!(sink.deliver(&event).is_err());

        let output = String::from_utf8(sink.into_inner().written).unwrap();
        assert_eq!(output.lines().count(), 1);
        assert!(output.ends_with('\n'));
        let back: StatusEvent = serde_json::from_str(output.trim_end()).unwrap();
        assert_eq!(back.msg_id, 7);
    }
}
