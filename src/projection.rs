//! Scene projection: inertial and geodetic coordinates to renderer space.
//!
//! Scene space is Y-up: inertial Z (the rotation axis) maps to +Y, inertial Y
//! to −Z, inertial X stays X. The mapping keeps right-handedness. One uniform
//! scale turns kilometres into scene units so that the Earth's equatorial
//! radius lands exactly on the rendered globe.
//!
//! Surface markers use a fixed spherical convention shared with the globe
//! texture: polar angle `phi = 90° − lat`, azimuth `theta = lon + 180°`,
//! `x = r·sinφ·cosθ`, `y = r·cosφ`, `z = −r·sinφ·sinθ`. Anything that places
//! markers must use the same offsets or it drifts off the texture.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::constants::*;

/// A point in the renderer's local Cartesian space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenePosition(pub Vector3<f64>);

impl ScenePosition {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        ScenePosition(Vector3::new(x, y, z))
    }

    pub fn x(&self) -> f64 {
        self.0.x
    }

    /// Up component.
    pub fn y(&self) -> f64 {
        self.0.y
    }

    pub fn z(&self) -> f64 {
        self.0.z
    }

    /// Distance from the globe center.
    pub fn radius(&self) -> f64 {
        self.0.norm()
    }

    pub fn distance_to(&self, other: &ScenePosition) -> f64 {
        (self.0 - other.0).norm()
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|c| c.is_finite())
    }

    /// Same direction from the center, new distance. A zero vector stays put.
    pub fn with_radius(&self, radius: f64) -> ScenePosition {
        match self.0.try_normalize(f64::EPSILON) {
            Some(unit) => ScenePosition(unit * radius),
            None => *self,
        }
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.0.x, self.0.y, self.0.z]
    }
}

/// Latitude/longitude of a point of interest, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodeticCoordinate {
    pub lat_deg: f64,
    pub lon_deg: f64,
}

impl GeodeticCoordinate {
    /// Baltic Sea sector of the "dark ship" alert.
    pub const BALTIC_SECTOR: GeodeticCoordinate = GeodeticCoordinate {
        lat_deg: 54.2,
        lon_deg: 12.1,
    };

    pub fn new(lat_deg: f64, lon_deg: f64) -> Self {
        GeodeticCoordinate { lat_deg, lon_deg }
    }

    /// Finite, latitude within ±90°, longitude within ±180°.
    pub fn is_valid(&self) -> bool {
        self.lat_deg.is_finite()
            && self.lon_deg.is_finite()
            && (-90.0..=90.0).contains(&self.lat_deg)
            && (-180.0..=180.0).contains(&self.lon_deg)
    }

    pub fn to_scene(&self, radius: f64) -> ScenePosition {
        project_geodetic(self.lat_deg, self.lon_deg, radius)
    }
}

/// Uniform km → scene-unit factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneScale {
    factor: f64,
}

impl SceneScale {
    /// Physical scale: Earth's equatorial radius maps to `globe_radius`.
    pub fn for_globe(globe_radius: f64) -> Self {
        SceneScale {
            factor: globe_radius / R_EARTH,
        }
    }

    /// Additional cosmetic sub-scale, multiplied into the physical one.
    pub fn with_cosmetic(self, sub_scale: f64) -> Self {
        SceneScale {
            factor: self.factor * sub_scale,
        }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Scene distance for a physical distance in km.
    pub fn to_scene(&self, km: f64) -> f64 {
        km * self.factor
    }
}

impl Default for SceneScale {
    fn default() -> Self {
        SceneScale::for_globe(GLOBE_RADIUS)
    }
}

/// Map an inertial position (km, Z = rotation axis) to scene space.
pub fn project_inertial(position: &Vector3<f64>, scale: SceneScale) -> ScenePosition {
    let f = scale.factor();
    ScenePosition::new(position.x * f, position.z * f, -position.y * f)
}

/// Place a latitude/longitude on a sphere of `radius` scene units.
pub fn project_geodetic(lat_deg: f64, lon_deg: f64, radius: f64) -> ScenePosition {
    let phi = (POLAR_OFFSET_DEG - lat_deg).to_radians();
    let theta = (lon_deg + AZIMUTH_OFFSET_DEG).to_radians();
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();
    ScenePosition::new(
        radius * sin_phi * cos_theta,
        radius * cos_phi,
        -radius * sin_phi * sin_theta,
    )
}

/// Inverse of [`project_geodetic`]: latitude/longitude of a scene direction.
///
/// Returns `None` for the zero vector. Longitude is wrapped to [−180°, 180°)
/// and is arbitrary exactly at the poles.
pub fn geodetic_from_scene(position: &ScenePosition) -> Option<GeodeticCoordinate> {
    if !position.is_finite() || position.radius() <= f64::EPSILON {
        return None;
    }
    let p = position.0;
    let horizontal = (p.x * p.x + p.z * p.z).sqrt();
    let phi = horizontal.atan2(p.y).to_degrees();
    let theta = (-p.z).atan2(p.x).to_degrees();

    Some(GeodeticCoordinate {
        lat_deg: POLAR_OFFSET_DEG - phi,
        lon_deg: wrap_degrees(theta - AZIMUTH_OFFSET_DEG),
    })
}

/// Wrap an angle to [−180°, 180°).
pub fn wrap_degrees(angle: f64) -> f64 {
    (angle + 180.0).rem_euclid(360.0) - 180.0
}
