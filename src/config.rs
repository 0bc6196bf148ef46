//! Scene configuration.
//!
//! The visual constants here are legibility choices tuned for the dashboard,
//! not physics. Every field has a default, so a JSON document only needs the
//! values it overrides.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;
use crate::projection::SceneScale;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid scene config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Scene geometry and visual-override settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneConfig {
    /// Radius of the rendered Earth sphere (scene units).
    pub globe_radius: f64,
    /// Radius at which surface markers and link targets sit.
    pub marker_radius: f64,
    /// Fraction of true altitude kept when drawing satellites (1.0 = physical).
    pub altitude_compression: f64,
    /// Receiver link radius, as a multiple of `globe_radius`.
    pub receiver_altitude: f64,
    /// Transmitter link radius floor, as a multiple of `globe_radius`.
    pub transmitter_min_altitude: f64,
    /// Satellites linked to an active target.
    pub link_count: usize,
    /// Points per orbit path.
    pub orbit_path_samples: usize,
}

impl Default for SceneConfig {
    fn default() -> Self {
        SceneConfig {
            globe_radius: GLOBE_RADIUS,
            marker_radius: MARKER_RADIUS,
            altitude_compression: ALTITUDE_COMPRESSION,
            receiver_altitude: RECEIVER_ALTITUDE,
            transmitter_min_altitude: TRANSMITTER_MIN_ALTITUDE,
            link_count: LINK_COUNT,
            orbit_path_samples: ORBIT_PATH_SAMPLES,
        }
    }
}

impl SceneConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Semantic checks that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("globe_radius", self.globe_radius)?;
        positive("marker_radius", self.marker_radius)?;
        positive("altitude_compression", self.altitude_compression)?;
        positive("receiver_altitude", self.receiver_altitude)?;
        positive("transmitter_min_altitude", self.transmitter_min_altitude)?;

        if self.marker_radius < self.globe_radius {
            return Err(invalid(
                "marker_radius",
                format!("{} is below globe_radius {}", self.marker_radius, self.globe_radius),
            ));
        }
        if self.receiver_altitude < 1.0 {
            return Err(invalid(
                "receiver_altitude",
                format!("{} would put the receiver inside the globe", self.receiver_altitude),
            ));
        }
        if self.link_count == 0 {
            return Err(invalid("link_count", "must be at least 1".to_string()));
        }
        if self.orbit_path_samples < 2 {
            return Err(invalid("orbit_path_samples", "must be at least 2".to_string()));
        }
        Ok(())
    }

    /// Physical km → scene scale for this globe.
    pub fn scale(&self) -> SceneScale {
        SceneScale::for_globe(self.globe_radius)
    }

    pub fn receiver_radius(&self) -> f64 {
        self.globe_radius * self.receiver_altitude
    }

    pub fn transmitter_floor_radius(&self) -> f64 {
        self.globe_radius * self.transmitter_min_altitude
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, format!("{value} must be finite and positive")))
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}
