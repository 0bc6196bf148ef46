//! Signal-link selection and the visual overrides applied to linked satellites.
//!
//! Selection works on true scene positions. The overrides only ever touch
//! the rendered copy handed to the presentation layer.

use serde::{Deserialize, Serialize};

use crate::config::SceneConfig;
use crate::projection::ScenePosition;

/// Role of a linked satellite, by distance rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkRole {
    /// Closest satellite, drawn at the receiver altitude.
    Receiver,
    /// Second closest, drawn no lower than the transmitter floor.
    Transmitter,
    /// Any further rank when more than two links are configured.
    Auxiliary,
}

impl LinkRole {
    pub fn for_rank(rank: usize) -> Self {
        match rank {
            0 => LinkRole::Receiver,
            1 => LinkRole::Transmitter,
            _ => LinkRole::Auxiliary,
        }
    }
}

/// A satellite picked for a target, with its true scene distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearestSatellite {
    /// Catalog index.
    pub index: usize,
    pub distance: f64,
}

/// Dashed line between one satellite and the target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalLink {
    /// Catalog index of the satellite end.
    pub satellite_index: usize,
    pub role: LinkRole,
    /// Rendered satellite end, after overrides.
    pub satellite: ScenePosition,
    pub target: ScenePosition,
    /// True scene distance used for ranking.
    pub true_distance: f64,
}

impl SignalLink {
    /// Drawn length of the link.
    pub fn length(&self) -> f64 {
        self.satellite.distance_to(&self.target)
    }
}

/// Pick the `count` satellites closest to `target`.
///
/// `satellites` is indexed by catalog order; `None` marks a satellite that
/// failed to propagate this frame. Ties keep catalog order. Returns fewer
/// than `count` entries when fewer positions exist.
pub fn select_nearest(
    target: &ScenePosition,
    satellites: &[Option<ScenePosition>],
    count: usize,
) -> Vec<NearestSatellite> {
    let mut ranked: Vec<NearestSatellite> = satellites
        .iter()
        .enumerate()
        .filter_map(|(index, pos)| {
            let pos = pos.as_ref().filter(|p| p.is_finite())?;
            Some(NearestSatellite {
                index,
                distance: pos.distance_to(target),
            })
        })
        .collect();

    // Stable: equal distances stay in catalog order.
    ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    ranked.truncate(count);
    ranked
}

/// Rendered position of a satellite: altitude above the globe scaled by
/// `compression`, direction unchanged.
pub fn compress_altitude(position: &ScenePosition, globe_radius: f64, compression: f64) -> ScenePosition {
    let radius = position.radius();
    position.with_radius(globe_radius + (radius - globe_radius) * compression)
}

/// Rendered position of a linked satellite of the given role.
pub fn link_override(position: &ScenePosition, role: LinkRole, config: &SceneConfig) -> ScenePosition {
    match role {
        LinkRole::Receiver => position.with_radius(config.receiver_radius()),
        LinkRole::Transmitter => {
            let floor = config.transmitter_floor_radius();
            if position.radius() < floor {
                position.with_radius(floor)
            } else {
                *position
            }
        }
        LinkRole::Auxiliary => {
            compress_altitude(position, config.globe_radius, config.altitude_compression)
        }
    }
}

/// Select the nearest satellites to `target` and build their links.
pub fn build_links(
    target: &ScenePosition,
    satellites: &[Option<ScenePosition>],
    config: &SceneConfig,
) -> Vec<SignalLink> {
    let links: Vec<SignalLink> = select_nearest(target, satellites, config.link_count)
        .into_iter()
        .enumerate()
        .filter_map(|(rank, nearest)| {
            let true_position = satellites.get(nearest.index).copied().flatten()?;
            let role = LinkRole::for_rank(rank);
            Some(SignalLink {
                satellite_index: nearest.index,
                role,
                satellite: link_override(&true_position, role, config),
                target: *target,
                true_distance: nearest.distance,
            })
        })
        .collect();

    log::trace!("Linked {} of {} satellites to target", links.len(), satellites.len());
    links
}
