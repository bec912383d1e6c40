//! Network configuration
//!
//! Every field has a default, so a JSON file only needs the values it changes:
//!
//! ```json
//! { "speeds": { "subway_kmh": 40.0 }, "max_line_attempts": 200 }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use transit_common::{Error, Result};

use crate::core::identity::Mode;

/// Constant travel speeds per layer, in km/h
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelSpeeds {
    pub walk_kmh: f64,
    pub bus_kmh: f64,
    pub subway_kmh: f64,
}

impl Default for TravelSpeeds {
    fn default() -> Self {
        Self {
            walk_kmh: 5.0,
            bus_kmh: 20.0,
            subway_kmh: 35.0,
        }
    }
}

impl TravelSpeeds {
    pub fn speed_for(&self, mode: Mode) -> f64 {
        match mode {
            Mode::Base => self.walk_kmh,
            Mode::Bus => self.bus_kmh,
            Mode::Subway => self.subway_kmh,
        }
    }

    /// Fastest speed on the network, the divisor of the A* lower bound
    pub fn fastest_kmh(&self) -> f64 {
        self.walk_kmh.max(self.bus_kmh).max(self.subway_kmh)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub speeds: TravelSpeeds,
    /// All-pairs search refuses graphs with more vertices than this
    pub floyd_warshall_max_vertices: usize,
    /// Sampling attempts shared by all lines of one mode in a synthesis call
    pub max_line_attempts: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            speeds: TravelSpeeds::default(),
            floyd_warshall_max_vertices: 2000,
            max_line_attempts: 1000,
        }
    }
}

impl NetworkConfig {
    /// Load and validate a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, speed) in [
            ("walk_kmh", self.speeds.walk_kmh),
            ("bus_kmh", self.speeds.bus_kmh),
            ("subway_kmh", self.speeds.subway_kmh),
        ] {
            if !speed.is_finite() || speed <= 0.0 {
                return Err(Error::Config(format!(
                    "{name} must be a positive speed, got {speed}"
                )));
            }
        }
        if self.max_line_attempts == 0 {
            return Err(Error::Config(
                "max_line_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Number and minimum length of lines to synthesize per mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRequest {
    pub subway_lines: usize,
    pub subway_min_stops: usize,
    pub bus_lines: usize,
    pub bus_min_stops: usize,
}

impl LineRequest {
    pub fn is_empty(&self) -> bool {
        self.subway_lines == 0 && self.bus_lines == 0
    }
}
