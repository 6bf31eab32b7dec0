//! The base station: frame intake, acknowledgement and the event outbox.

use std::collections::VecDeque;

use relay_metrics::{metric_defs, metrics, StationLabels};
use relay_packet::{decode, decode_compact, encode_ack, Ack, WireFormat, ACK_SIZE};
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::StationConfig;
use crate::error::StationError;
use crate::event::StatusEvent;
use crate::sink::EventSink;

/// Result of accepting a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Reception {
    /// The event queued for delivery.
    pub event: StatusEvent,
    /// Acknowledgement for the tower.
    pub ack: Ack,
    /// `ack` in wire form.
    pub ack_bytes: [u8; ACK_SIZE],
}

/// Result of one outbox flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing was queued.
    Idle,
    /// The oldest event was delivered.
    Delivered {
        /// Message ID of the delivered event.
        msg_id: u16,
        /// Attempts used, including the successful one.
        attempts: u32,
    },
    /// Every attempt failed; the event went to the back of the queue.
    Requeued {
        /// Message ID of the requeued event.
        msg_id: u16,
        /// Attempts made.
        attempts: u32,
    },
}

/// A base station receiving status frames of one configured wire format.
pub struct BaseStation<C: Clock = SystemClock> {
    config: StationConfig,
    clock: C,
    outbox: VecDeque<StatusEvent>,
    labels: StationLabels,
}

impl BaseStation<SystemClock> {
    /// Create a station using the system clock.
    pub fn new(config: StationConfig) -> Result<Self, StationError> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> BaseStation<C> {
    /// Create a station with a custom clock.
    pub fn with_clock(config: StationConfig, clock: C) -> Result<Self, StationError> {
        config.validate()?;
        let labels = StationLabels::new(config.station_name.clone(), config.format.as_str());
        info!(
            station = %config.station_name,
            format = %config.format,
            frame_size = config.format.size(),
            "Base station ready"
        );
        Ok(BaseStation {
            config,
            clock,
            outbox: VecDeque::new(),
            labels,
        })
    }

    /// Get the configuration.
    pub fn config(&self) -> &StationConfig {
        &self.config
    }

    /// Number of events waiting in the outbox.
    pub fn pending(&self) -> usize {
        self.outbox.len()
    }

    /// Accept one frame from the radio.
    ///
    /// Frames whose length differs from the configured format are dropped
    /// without an ack, as are frames that fail to decode.
    pub fn receive(&mut self, frame: &[u8]) -> Result<Reception, StationError> {
        metrics::counter!(metric_defs::FRAMES_RECEIVED.name, &self.labels.to_labels())
            .increment(1);

        let expected = self.config.format.size();
        if frame.len() != expected {
            warn!(expected, actual = frame.len(), "Ignored frame of unexpected size");
            self.count_reject("size");
            return Err(StationError::UnexpectedSize {
                expected,
                actual: frame.len(),
            });
        }

        let received_at = self.clock.now();
        let decoded = match self.config.format {
            WireFormat::Extended => {
                decode(frame).map(|payload| StatusEvent::from_extended(&payload, received_at))
            }
            WireFormat::Compact => decode_compact(frame)
                .map(|payload| StatusEvent::from_compact(&payload, received_at)),
            WireFormat::Ack => {
                return Err(StationError::InvalidConfig(
                    "station cannot receive ack frames".to_string(),
                ))
            }
        };

        let event = match decoded {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "Dropped undecodable frame");
                self.count_reject("decode");
                return Err(e.into());
            }
        };

        info!(
            msg_id = event.msg_id,
            handheld_id = event.handheld_id,
            tower_id = event.tower_id,
            status = %event.status_str,
            lat = event.lat,
            lon = event.lon,
            "Status received"
        );

        let ack = Ack::accepted(event.msg_id);
        let ack_bytes = encode_ack(&ack);
        metrics::counter!(metric_defs::ACKS_SENT.name, &self.labels.to_labels()).increment(1);
        debug!(msg_id = ack.msg_id, ack = %hex::encode(ack_bytes), "Ack prepared");

        self.outbox.push_back(event.clone());
        self.record_depth();

        Ok(Reception {
            event,
            ack,
            ack_bytes,
        })
    }

    /// Try to deliver the oldest queued event.
    ///
    /// Makes up to `max_attempts` attempts, pausing `retry_delay` between
    /// failures. An event that fails every attempt is moved to the back of the
    /// queue.
    pub fn flush_one<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> FlushOutcome {
        let Some(event) = self.outbox.pop_front() else {
            return FlushOutcome::Idle;
        };

        let max_attempts = self.config.max_attempts;
        let delay = self.config.retry_delay();
        let labels = self.labels.to_labels();

        for attempt in 1..=max_attempts {
            match sink.deliver(&event) {
                Ok(()) => {
                    debug!(msg_id = event.msg_id, attempt, "Event delivered");
                    metrics::counter!(metric_defs::EVENTS_DELIVERED.name, &labels).increment(1);
                    metrics::histogram!(metric_defs::DELIVERY_ATTEMPTS.name, &labels)
                        .record(attempt as f64);
                    self.record_depth();
                    return FlushOutcome::Delivered {
                        msg_id: event.msg_id,
                        attempts: attempt,
                    };
                }
                Err(e) => {
                    warn!(msg_id = event.msg_id, attempt, error = %e, "Event delivery failed");
                    if attempt < max_attempts && !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                }
            }
        }

        warn!(
            msg_id = event.msg_id,
            attempts = max_attempts,
            "Giving up on event for now, requeued"
        );
        metrics::counter!(metric_defs::EVENTS_REQUEUED.name, &labels).increment(1);
        metrics::histogram!(metric_defs::DELIVERY_ATTEMPTS.name, &labels)
            .record(max_attempts as f64);

        let msg_id = event.msg_id;
        self.outbox.push_back(event);
        self.record_depth();

        FlushOutcome::Requeued {
            msg_id,
            attempts: max_attempts,
        }
    }

    /// Deliver queued events until the outbox is empty or one is requeued.
    ///
    /// Returns the number of events delivered.
    pub fn flush_all<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> usize {
        let mut delivered = 0;
        loop {
            match self.flush_one(sink) {
                FlushOutcome::Delivered { .. } => delivered += 1,
                FlushOutcome::Idle | FlushOutcome::Requeued { .. } => return delivered,
            }
        }
    }

    fn count_reject(&self, reason: &'static str) {
        metrics::counter!(
            metric_defs::FRAMES_REJECTED.name,
            &self.labels.with(&[("reason", reason.to_string())])
        )
        .increment(1);
    }

    fn record_depth(&self) {
        metrics::gauge!(metric_defs::OUTBOX_DEPTH.name, &self.labels.to_labels())
            .set(self.outbox.len() as f64);
    }
}
