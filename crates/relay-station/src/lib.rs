//! Base station for the status relay network.
//!
//! The station sits at the end of the handheld → tower → base chain. For every
//! frame the radio hands it, it:
//!
//! 1. drops frames whose length does not match the configured wire format,
//! 2. decodes the status payload,
//! 3. turns it into a [`StatusEvent`] and queues it in the outbox,
//! 4. returns the [`Ack`](relay_packet::Ack) to send back to the tower.
//!
//! Queued events are drained into an [`EventSink`] with a bounded number of
//! delivery attempts per flush. Events that exhaust their attempts go to the
//! back of the queue.
//!
//! The radio driver and the backend are outside this crate: frames arrive as
//! byte slices and events leave through the sink trait.

pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod metrics_export;
pub mod sink;
pub mod station;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{load_config, load_config_from_str, StationConfig};
pub use error::{SinkError, StationError};
pub use event::StatusEvent;
pub use metrics_export::{InMemoryRecorder, MetricsExport};
pub use sink::{EventSink, JsonLinesSink};
pub use station::{BaseStation, FlushOutcome, Reception};
