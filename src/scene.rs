//! Per-frame evaluation of the whole constellation.
//!
//! `SentinelScene` is built once from the catalog and a config, then asked
//! for a fresh [`FrameSnapshot`] every rendered frame. Nothing carries over
//! between frames: a satellite that fails at one instant is simply absent
//! from that snapshot and is tried again on the next call.
//!
//! # Example
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use gnssr_sentinel::projection::GeodeticCoordinate;
//! use gnssr_sentinel::scene::SentinelScene;
//!
//! let scene = SentinelScene::builtin().unwrap();
//! let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
//!
//! let frame = scene.evaluate(now, Some(GeodeticCoordinate::BALTIC_SECTOR));
//! assert_eq!(frame.satellites.len(), scene.catalog().len());
//! assert!(frame.links.len() <= 2);
//!
//! let next = scene.evaluate(now + Duration::milliseconds(16), None);
//! assert!(next.links.is_empty());
//! ```

use chrono::{DateTime, Utc};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{Catalog, CatalogError};
use crate::config::{ConfigError, SceneConfig};
use crate::orbit_path::{sample_orbit_path, OrbitPath};
use crate::projection::{project_inertial, GeodeticCoordinate, ScenePosition};
use crate::propagator::{PropagatedState, PropagationError, SatellitePropagator};
use crate::selection::{build_links, compress_altitude, LinkRole, SignalLink};

#[derive(Error, Debug)]
pub enum SceneError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// One catalog satellite as seen in one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatelliteView {
    /// Catalog index.
    pub index: usize,
    pub name: String,
    pub norad_id: u32,
    /// Physically scaled scene position; `None` when propagation failed.
    pub true_position: Option<ScenePosition>,
    /// Where the marker is drawn: altitude-compressed, or the link override.
    pub render_position: Option<ScenePosition>,
    /// Set when this satellite carries a signal link this frame.
    pub link_role: Option<LinkRole>,
}

impl SatelliteView {
    pub fn is_visible(&self) -> bool {
        self.render_position.is_some()
    }
}

/// Everything the presentation layer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub at: DateTime<Utc>,
    /// One entry per catalog satellite, in catalog order.
    pub satellites: Vec<SatelliteView>,
    /// Target marker position, when a valid target is selected.
    pub target: Option<ScenePosition>,
    /// 0..=link_count links, closest first.
    pub links: Vec<SignalLink>,
}

impl FrameSnapshot {
    pub fn visible_count(&self) -> usize {
        self.satellites.iter().filter(|s| s.is_visible()).count()
    }

    pub fn link(&self, role: LinkRole) -> Option<&SignalLink> {
        self.links.iter().find(|l| l.role == role)
    }
}

/// Catalog propagators plus scene settings.
#[derive(Debug, Clone)]
pub struct SentinelScene {
    catalog: Catalog,
    propagators: Vec<SatellitePropagator>,
    config: SceneConfig,
}

impl SentinelScene {
    /// Built-in constellation with default settings.
    pub fn builtin() -> Result<Self, SceneError> {
        Self::new(Catalog::builtin()?, SceneConfig::default())
    }

    /// Initialise SGP4 for every catalog entry. A rejected entry fails the
    /// whole scene, since the catalog is static data.
    pub fn new(catalog: Catalog, config: SceneConfig) -> Result<Self, SceneError> {
        config.validate()?;

        let propagators = catalog
            .iter()
            .enumerate()
            .map(|(index, set)| {
                SatellitePropagator::new(set).map_err(|e| {
                    log::error!("SGP4 rejected catalog entry #{index} ({}): {e}", set.name);
                    CatalogError::ModelRejected {
                        index,
                        name: set.name.clone(),
                        reason: e.to_string(),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        log::info!("Scene ready with {} satellites", propagators.len());
        Ok(SentinelScene {
            catalog,
            propagators,
            config,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn propagators(&self) -> &[SatellitePropagator] {
        &self.propagators
    }

    /// Propagate every satellite at `at`, in catalog order.
    pub fn propagate_all(&self, at: DateTime<Utc>) -> Vec<Result<PropagatedState, PropagationError>> {
        self.propagators.iter().map(|p| p.propagate(at)).collect()
    }

    /// Physically scaled scene position of an inertial position.
    pub fn to_scene(&self, position: &Vector3<f64>) -> ScenePosition {
        project_inertial(position, self.config.scale())
    }

    /// Scene position a satellite marker is drawn at, before link overrides.
    pub fn to_rendered(&self, position: &Vector3<f64>) -> ScenePosition {
        compress_altitude(
            &self.to_scene(position),
            self.config.globe_radius,
            self.config.altitude_compression,
        )
    }

    /// Evaluate one frame.
    pub fn evaluate(&self, at: DateTime<Utc>, target: Option<GeodeticCoordinate>) -> FrameSnapshot {
        let true_positions: Vec<Option<ScenePosition>> = self
            .propagate_all(at)
            .into_iter()
            .enumerate()
            .map(|(index, result)| match result {
                Ok(state) => Some(self.to_scene(&state.position)).filter(ScenePosition::is_finite),
                Err(e) => {
                    log::debug!("Satellite #{index} not renderable at {at}: {e}");
                    None
                }
            })
            .collect();

        let target = target.and_then(|coord| {
            if coord.is_valid() {
                Some(coord.to_scene(self.config.marker_radius))
            } else {
                log::warn!("Ignoring invalid target coordinate {coord:?}");
                None
            }
        });

        let links = match &target {
            Some(target) => build_links(target, &true_positions, &self.config),
            None => Vec::new(),
        };

        let satellites = self
            .catalog
            .iter()
            .zip(&true_positions)
            .enumerate()
            .map(|(index, (set, true_position))| {
                let link = links.iter().find(|l| l.satellite_index == index);
                let render_position = match link {
                    Some(link) => Some(link.satellite),
                    None => true_position.map(|p| {
                        compress_altitude(&p, self.config.globe_radius, self.config.altitude_compression)
                    }),
                };
                SatelliteView {
                    index,
                    name: set.name.clone(),
                    norad_id: set.norad_id(),
                    true_position: *true_position,
                    render_position,
                    link_role: link.map(|l| l.role),
                }
            })
            .collect();

        FrameSnapshot {
            at,
            satellites,
            target,
            links,
        }
    }

    /// Sample one orbital period per satellite from `start`, in rendered
    /// (altitude-compressed) scene coordinates.
    pub fn orbit_paths(&self, start: DateTime<Utc>) -> Vec<OrbitPath> {
        self.propagators
            .iter()
            .enumerate()
            .map(|(index, propagator)| {
                sample_orbit_path(
                    index,
                    propagator,
                    start,
                    self.config.orbit_path_samples,
                    |p| self.to_rendered(p),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::BUILTIN_CATALOG;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone};

    const DECAY_TLE: &str = "\
DECAY-TEST
1 99001U 24001A   24001.25000000  .05000000  00000-0  50000-1 0  9991
2 99001  51.6000  10.0000 0005000  90.0000 270.0000 16.20000000  1007
";

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_builtin_scene_all_visible() {
        let scene = SentinelScene::builtin().unwrap();
        let frame = scene.evaluate(noon(), None);
        assert_eq!(frame.satellites.len(), 9);
        assert_eq!(frame.visible_count(), 9);
        assert!(frame.target.is_none());
        assert!(frame.links.is_empty());
        assert!(frame.satellites.iter().all(|s| s.link_role.is_none()));
    }

    #[test]
    fn test_rendered_altitude_is_compressed() {
        let scene = SentinelScene::builtin().unwrap();
        let config = scene.config().clone();
        let frame = scene.evaluate(noon(), None);
        for sat in &frame.satellites {
            let true_r = sat.true_position.unwrap().radius();
            let drawn_r = sat.render_position.unwrap().radius();
            let expected = config.globe_radius + (true_r - config.globe_radius) * config.altitude_compression;
            assert_relative_eq!(drawn_r, expected, epsilon = 1e-9);
            assert!(drawn_r > config.globe_radius);
        }
    }

    #[test]
    fn test_target_links_two_nearest() {
        let scene = SentinelScene::builtin().unwrap();
        let frame = scene.evaluate(noon(), Some(GeodeticCoordinate::BALTIC_SECTOR));
        let target = frame.target.unwrap();
        assert_relative_eq!(target.radius(), scene.config().marker_radius, epsilon = 1e-12);
        assert_eq!(frame.links.len(), 2);

        let receiver = frame.link(LinkRole::Receiver).unwrap();
        let transmitter = frame.link(LinkRole::Transmitter).unwrap();
        assert!(receiver.true_distance <= transmitter.true_distance);
        assert_relative_eq!(receiver.satellite.radius(), 2.5, epsilon = 1e-9);
        assert!(transmitter.satellite.radius() >= 7.0 - 1e-9);

        // No unlinked satellite is closer than the transmitter.
        for sat in frame.satellites.iter().filter(|s| s.link_role.is_none()) {
            let d = sat.true_position.unwrap().distance_to(&target);
            assert!(d >= transmitter.true_distance);
        }

        let view = &frame.satellites[receiver.satellite_index];
        assert_eq!(view.link_role, Some(LinkRole::Receiver));
        assert_eq!(view.render_position, Some(receiver.satellite));
    }

    #[test]
    fn test_invalid_target_is_ignored() {
        let scene = SentinelScene::builtin().unwrap();
        let frame = scene.evaluate(noon(), Some(GeodeticCoordinate::new(f64::NAN, 10.0)));
        assert!(frame.target.is_none());
        assert!(frame.links.is_empty());
    }

    #[test]
    fn test_frames_are_independent() {
        let scene = SentinelScene::builtin().unwrap();
        let a = scene.evaluate(noon(), Some(GeodeticCoordinate::BALTIC_SECTOR));
        let _ = scene.evaluate(noon() + Duration::hours(3), None);
        let b = scene.evaluate(noon(), Some(GeodeticCoordinate::BALTIC_SECTOR));
        assert_eq!(a, b);
    }

    #[test]
    fn test_orbit_paths_pass_through_rendered_markers() {
        let scene = SentinelScene::builtin().unwrap();
        let start = noon();
        let paths = scene.orbit_paths(start);
        let frame = scene.evaluate(start, None);
        assert_eq!(paths.len(), 9);
        for (path, sat) in paths.iter().zip(&frame.satellites) {
            assert!(path.is_complete(scene.config().orbit_path_samples));
            assert_relative_eq!(
                path.points[0].0,
                sat.render_position.unwrap().0,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SceneConfig {
            link_count: 0,
            ..SceneConfig::default()
        };
        let catalog = Catalog::parse(BUILTIN_CATALOG).unwrap();
        assert!(matches!(
            SentinelScene::new(catalog, config),
            Err(SceneError::Config(ConfigError::Invalid { field: "link_count", .. }))
        ));
    }

    #[test]
    fn test_failed_satellite_omitted_for_the_frame() {
        let scene = SentinelScene::builtin().unwrap();
        let at = noon() + Duration::days(5 * 365);
        let frame = scene.evaluate(at, Some(GeodeticCoordinate::BALTIC_SECTOR));

        // The ISS entry is years past its epoch and SGP4 gives up on it.
        assert!(scene.propagate_all(at)[0].is_err());
        assert_eq!(frame.visible_count(), 8);
        let iss = &frame.satellites[0];
        assert!(iss.true_position.is_none());
        assert!(iss.render_position.is_none());
        assert!(iss.link_role.is_none());

        assert_eq!(frame.links.len(), 2);
        assert!(frame.links.iter().all(|l| l.satellite_index != 0));
        for sat in &frame.satellites[1..] {
            assert!(sat.render_position.unwrap().is_finite());
        }

        let paths = scene.orbit_paths(at);
        assert!(paths[0].points.is_empty());
        assert!(paths[1..]
            .iter()
            .all(|p| p.is_complete(scene.config().orbit_path_samples)));
    }

    #[test]
    fn test_decayed_satellite_is_retried_each_frame() {
        let catalog = Catalog::parse(DECAY_TLE).unwrap();
        let scene = SentinelScene::new(catalog, SceneConfig::default()).unwrap();
        let epoch = scene.propagators()[0].epoch();
        let target = Some(GeodeticCoordinate::BALTIC_SECTOR);

        let fresh = scene.evaluate(epoch, target);
        assert_eq!(fresh.visible_count(), 1);
        assert_eq!(fresh.links.len(), 1);

        let decayed = scene.evaluate(epoch + Duration::days(10), target);
        assert_eq!(decayed.visible_count(), 0);
        assert!(decayed.links.is_empty());
        assert!(decayed.target.is_some());

        // Nothing sticks from the failed frame.
        assert_eq!(scene.evaluate(epoch, target), fresh);
    }
}
