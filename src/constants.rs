//! Physical constants, unit conversions and scene defaults.
//!
//! Earth values follow WGS-72, which is what SGP4 element sets are fitted
//! against. Scene defaults are the globe dashboard's tuned values.

/// Earth gravitational parameter (km³/s²), WGS-72
pub const MU_EARTH: f64 = 398600.8;

/// Earth equatorial radius (km), WGS-72
pub const R_EARTH: f64 = 6378.135;

/// Seconds per solar day
pub const SOLAR_DAY: f64 = 86400.0;

/// Minutes per solar day
pub const MINUTES_PER_DAY: f64 = 1440.0;

/// Two pi
pub const TAU: f64 = std::f64::consts::TAU;

// ── Scene defaults ──

/// Radius of the rendered Earth sphere (scene units).
pub const GLOBE_RADIUS: f64 = 2.0;

/// Radius at which surface markers are drawn, just above the globe.
pub const MARKER_RADIUS: f64 = 2.05;

/// Fraction of true altitude kept when drawing satellites above the globe.
pub const ALTITUDE_COMPRESSION: f64 = 0.6;

/// Receiver link altitude, as a multiple of the globe radius.
pub const RECEIVER_ALTITUDE: f64 = 1.25;

/// Transmitter link altitude floor, as a multiple of the globe radius.
pub const TRANSMITTER_MIN_ALTITUDE: f64 = 3.5;

/// Satellites linked to an active target.
pub const LINK_COUNT: usize = 2;

/// Points sampled along one orbit path.
pub const ORBIT_PATH_SAMPLES: usize = 128;

/// Polar angle offset: `phi = POLAR_OFFSET_DEG - lat`.
pub const POLAR_OFFSET_DEG: f64 = 90.0;

/// Azimuth offset: `theta = lon + AZIMUTH_OFFSET_DEG`.
pub const AZIMUTH_OFFSET_DEG: f64 = 180.0;
