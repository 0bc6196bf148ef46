//! Orbit propagation: SGP4 evaluation of catalog element sets.
//!
//! SGP4 itself comes from the `sgp4` crate; this module owns the contract
//! around it: one initialisation per element set, minutes-since-epoch
//! bookkeeping, and rejection of states that must never reach the scene
//! (non-finite components, radius below the surface).
//!
//! Output positions are TEME (true equator, mean equinox) in km: right-handed,
//! Z along the rotation axis.
use chrono::{DateTime, NaiveDateTime, Utc};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::OrbitalElementSet;
use crate::constants::*;

/// Why a satellite has no position at a given instant.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropagationError {
    #[error("SGP4 rejected the element set: {reason}")]
    Initialisation { reason: String },

    #[error("SGP4 failed {minutes:.1} min from epoch: {reason}")]
    Model { minutes: f64, reason: String },

    #[error("orbit has decayed: radius {radius_km:.1} km is inside the Earth")]
    Decayed { radius_km: f64 },

    #[error("propagation produced a non-finite state")]
    NonFinite,
}

// ── State vector ──

/// Inertial state of one satellite at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropagatedState {
    /// Position (km), TEME.
    pub position: Vector3<f64>,
    /// Velocity (km/s), TEME.
    pub velocity: Vector3<f64>,
    /// Instant the state is valid for.
    pub at: DateTime<Utc>,
    /// Time since the element set epoch (minutes).
    pub minutes_since_epoch: f64,
}

impl PropagatedState {
    /// Distance from Earth's center (km).
    pub fn radius(&self) -> f64 {
        self.position.norm()
    }

    /// Speed (km/s).
    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }

    /// Altitude above the equatorial radius (km).
    pub fn altitude(&self) -> f64 {
        self.radius() - R_EARTH
    }

    /// Age of the element set at this instant (days, negative before epoch).
    pub fn element_age_days(&self) -> f64 {
        self.minutes_since_epoch / MINUTES_PER_DAY
    }
}

// ── Propagator ──

/// SGP4 propagator bound to one element set.
///
/// Initialisation runs once; `propagate` is a pure function of the instant,
/// so the same (element set, instant) pair always yields the same state.
#[derive(Clone)]
pub struct SatellitePropagator {
    constants: sgp4::Constants,
    epoch: NaiveDateTime,
    period_minutes: f64,
}

impl std::fmt::Debug for SatellitePropagator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SatellitePropagator")
            .field("epoch", &self.epoch)
            .field("period_minutes", &self.period_minutes)
            .finish_non_exhaustive()
    }
}

impl SatellitePropagator {
    pub fn new(set: &OrbitalElementSet) -> Result<Self, PropagationError> {
        let elements = sgp4::Elements::from_tle(
            Some(set.name.clone()),
            set.line1().as_bytes(),
            set.line2().as_bytes(),
        )
        .map_err(rejected)?;
        let constants = sgp4::Constants::from_elements(&elements).map_err(rejected)?;

        Ok(SatellitePropagator {
            constants,
            epoch: elements.datetime,
            period_minutes: set.tle.period_minutes(),
        })
    }

    /// Element set epoch (UTC).
    pub fn epoch(&self) -> DateTime<Utc> {
        self.epoch.and_utc()
    }

    /// Nominal orbital period from mean motion (minutes).
    pub fn period_minutes(&self) -> f64 {
        self.period_minutes
    }

    pub fn minutes_since_epoch(&self, at: DateTime<Utc>) -> f64 {
        (at.naive_utc() - self.epoch).num_milliseconds() as f64 / 60_000.0
    }

    /// Evaluate SGP4 at `at`.
    pub fn propagate(&self, at: DateTime<Utc>) -> Result<PropagatedState, PropagationError> {
        let minutes = self.minutes_since_epoch(at);
        let prediction = self
            .constants
            .propagate(sgp4::MinutesSinceEpoch(minutes))
            .map_err(|e| PropagationError::Model {
                minutes,
                reason: e.to_string(),
            })?;

        let position = Vector3::from(prediction.position);
        let velocity = Vector3::from(prediction.velocity);
        check_state(&position, &velocity)?;

        Ok(PropagatedState {
            position,
            velocity,
            at,
            minutes_since_epoch: minutes,
        })
    }
}

fn rejected(e: impl std::fmt::Display) -> PropagationError {
    PropagationError::Initialisation { reason: e.to_string() }
}

/// Reject states the scene must never see.
fn check_state(position: &Vector3<f64>, velocity: &Vector3<f64>) -> Result<(), PropagationError> {
    if !position.iter().chain(velocity.iter()).all(|c| c.is_finite()) {
        return Err(PropagationError::NonFinite);
    }
    let radius_km = position.norm();
    if radius_km < R_EARTH {
        return Err(PropagationError::Decayed { radius_km });
    }
    Ok(())
}
