//! Station configuration.
//!
//! Loaded from YAML. Every field is optional:
//!
//! ```yaml
//! station_name: base
//! format: compact        # extended | compact
//! max_attempts: 3
//! retry_delay_ms: 500
//! ```

use std::path::Path;
use std::time::Duration;

use relay_packet::WireFormat;
use serde::{Deserialize, Serialize};

use crate::error::StationError;

/// Default number of delivery attempts per flush.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default pause between failed delivery attempts.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 500;

/// Configuration for a base station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StationConfig {
    /// Name used in logs and metric labels.
    #[serde(default = "default_station_name")]
    pub station_name: String,
    /// Wire format of incoming status frames.
    #[serde(default = "default_format")]
    pub format: WireFormat,
    /// Delivery attempts per event per flush.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Pause between failed delivery attempts, in milliseconds.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_station_name() -> String {
    "base".to_string()
}

fn default_format() -> WireFormat {
    WireFormat::Compact
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_retry_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}

impl Default for StationConfig {
    fn default() -> Self {
        StationConfig {
            station_name: default_station_name(),
            format: default_format(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl StationConfig {
    /// Check that the configuration can drive a station.
    pub fn validate(&self) -> Result<(), StationError> {
        if !self.format.is_status() {
            return Err(StationError::InvalidConfig(format!(
                "format must be extended or compact, got {}",
                self.format
            )));
        }
        if self.max_attempts == 0 {
            return Err(StationError::InvalidConfig(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Pause between failed delivery attempts.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Load and validate a configuration from a YAML file.
pub fn load_config(path: &Path) -> Result<StationConfig, StationError> {
    let contents = std::fs::read_to_string(path)?;
    load_config_from_str(&contents)
}

/// Load and validate a configuration from a YAML string.
pub fn load_config_from_str(yaml: &str) -> Result<StationConfig, StationError> {
    let config: StationConfig = serde_yaml::from_str(yaml)?;
    config.validate()?;
    Ok(config)
}
