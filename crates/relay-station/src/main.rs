//! `relayctl`: encode, decode and receive status relay packets.
//!
//! ```text
//! relayctl decode --format compact 01 05 01 0084d717 007fe4d3 01 2a00
//! relayctl encode --format ack '{"ack_ok":1,"msg_id":42}'
//! relayctl ack --msg-id 42
//! relayctl station --config station.yaml --metrics-out metrics.json < frames.txt
//! ```
//!
//! Logs go to stderr (filter with `RUST_LOG`); results go to stdout.

use std::fs::File;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use relay_metrics::{metric_defs, metrics};
use relay_packet::{Ack, Packet, WireFormat};
use relay_station::{
    load_config, BaseStation, InMemoryRecorder, JsonLinesSink, StationConfig, StationError,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "relayctl", version, about = "Encode, decode and receive status relay packets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a hex frame and print it as JSON.
    Decode {
        /// Wire format of the frame (extended, compact, ack).
        #[arg(short, long, default_value = "compact")]
        format: WireFormat,
        /// Frame bytes as hex. Whitespace is ignored.
        #[arg(required = true, num_args = 1..)]
        hex: Vec<String>,
    },

    /// Encode a JSON packet and print its bytes as hex.
    Encode {
        /// Wire format of the packet (extended, compact, ack).
        #[arg(short, long)]
        format: WireFormat,
        /// Packet as JSON, using the field names of `decode` output.
        json: String,
    },

    /// Print the ack bytes for a message ID.
    Ack {
        /// Message ID to acknowledge.
        #[arg(long)]
        msg_id: u16,
        /// Produce a negative ack.
        #[arg(long)]
        rejected: bool,
    },

    /// Run a base station over hex frames read from stdin, one per line.
    Station {
        /// YAML configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Override the configured wire format.
        #[arg(long)]
        format: Option<WireFormat>,
        /// Override the configured delivery attempts.
        #[arg(long)]
        max_attempts: Option<u32>,
        /// Write a JSON metrics snapshot here when input ends.
        #[arg(long)]
        metrics_out: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "relayctl failed");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), StationError> {
    match cli.command {
        Commands::Decode { format, hex } => {
            let bytes = parse_hex(&hex.concat())?;
            let packet = Packet::decode(format, &bytes)?;
            if bytes.len() > format.size() {
                warn!(
                    extra = bytes.len() - format.size(),
                    "Ignored trailing bytes after {} packet", format
                );
            }
            println!("{}", serde_json::to_string_pretty(&packet)?);
        }

        Commands::Encode { format, json } => {
            let packet = match format {
                WireFormat::Extended => Packet::Extended(serde_json::from_str(&json)?),
                WireFormat::Compact => Packet::Compact(serde_json::from_str(&json)?),
                WireFormat::Ack => Packet::Ack(serde_json::from_str(&json)?),
            };
            println!("{}", hex::encode(packet.encode()?));
        }

        Commands::Ack { msg_id, rejected } => {
            let ack = if rejected {
                Ack::rejected(msg_id)
            } else {
                Ack::accepted(msg_id)
            };
            println!("{}", hex::encode(ack.encode()));
        }

        Commands::Station {
            config,
            format,
            max_attempts,
            metrics_out,
        } => {
            let mut config = match config {
                Some(path) => load_config(&path)?,
                None => StationConfig::default(),
            };
            if let Some(format) = format {
                config.format = format;
            }
            if let Some(max_attempts) = max_attempts {
                config.max_attempts = max_attempts;
            }
            run_station(config, metrics_out.as_deref())?;
        }
    }

    Ok(())
}

fn run_station(config: StationConfig, metrics_out: Option<&Path>) -> Result<(), StationError> {
    let recorder = Arc::new(InMemoryRecorder::new());
    if metrics::set_global_recorder(recorder.clone()).is_err() {
        warn!("A metrics recorder is already installed, station metrics will not be exported");
    }
    relay_metrics::describe_metrics();

    let mut station = BaseStation::new(config)?;
    let mut sink = JsonLinesSink::new(io::stdout().lock());

    for line in io::stdin().lock().split(b'\n') {
        let line = line?;
        let Ok(text) = std::str::from_utf8(&line) else {
            warn!(bytes = line.len(), "Skipping line that is not UTF-8");
            continue;
        };
        let text = text.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        let frame = match parse_hex(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "Skipping line that is not hex");
                continue;
            }
        };

        // Rejected frames are already logged by the station.
        if let Ok(reception) = station.receive(&frame) {
            info!(
                msg_id = reception.ack.msg_id,
                ack = %hex::encode(reception.ack_bytes),
                "Ack sent"
            );
        }

        station.flush_all(&mut sink);
    }

    let pending = station.pending();
    if pending > 0 {
        warn!(pending, "Input ended with undelivered events");
    }

    let received = recorder.counter(metric_defs::FRAMES_RECEIVED.name, &[]);
    let rejected = recorder.counter(metric_defs::FRAMES_REJECTED.name, &[]);
    info!(received, rejected, pending, "Station stopped");

    if let Some(path) = metrics_out {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, &recorder.export())?;
        info!(path = %path.display(), "Wrote metrics");
    }
    Ok(())
}

fn parse_hex(input: &str) -> Result<Vec<u8>, StationError> {
    let digits: String = input.split_whitespace().collect();
    Ok(hex::decode(digits)?)
}
