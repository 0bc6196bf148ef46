//! Orbit path sampling for the static path lines drawn behind each satellite.

use chrono::{DateTime, Duration, Utc};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::propagator::SatellitePropagator;
use crate::projection::ScenePosition;

/// One satellite's sampled path over one orbital period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitPath {
    /// Catalog index.
    pub satellite_index: usize,
    pub start: DateTime<Utc>,
    pub period_minutes: f64,
    pub points: Vec<ScenePosition>,
}

impl OrbitPath {
    pub fn is_complete(&self, samples: usize) -> bool {
        self.points.len() == samples
    }
}

/// Instants spanning one period from `start`, both ends included.
pub fn sample_times(start: DateTime<Utc>, period_minutes: f64, samples: usize) -> Vec<DateTime<Utc>> {
    if samples == 0 {
        return Vec::new();
    }
    let step_ms = if samples > 1 {
        period_minutes * 60_000.0 / (samples - 1) as f64
    } else {
        0.0
    };
    (0..samples)
        .map(|k| start + Duration::milliseconds((k as f64 * step_ms).round() as i64))
        .collect()
}

/// Sample one period of `propagator` starting at `start`, mapping each
/// inertial position through `to_scene`. Instants that fail to propagate are
/// left out of the path.
pub fn sample_orbit_path<F>(
    satellite_index: usize,
    propagator: &SatellitePropagator,
    start: DateTime<Utc>,
    samples: usize,
    to_scene: F,
) -> OrbitPath
where
    F: Fn(&Vector3<f64>) -> ScenePosition,
{
    let period_minutes = propagator.period_minutes();
    let points = sample_times(start, period_minutes, samples)
        .into_iter()
        .filter_map(|at| match propagator.propagate(at) {
            Ok(state) => Some(to_scene(&state.position)),
            Err(e) => {
                log::debug!("Orbit path sample for satellite #{satellite_index} at {at} skipped: {e}");
                None
            }
        })
        .collect();

    OrbitPath {
        satellite_index,
        start,
        period_minutes,
        points,
    }
}
