//! # GNSS-R Sentinel
//!
//! Geometry core for the Sentinel globe dashboard.
//!
//! Turns a fixed catalog of two-line element sets into per-frame satellite
//! positions in a Y-up scene, picks the satellites closest to a selected
//! ground target and lays out the signal links and orbit paths the renderer
//! draws. Everything here is pure computation: no rendering, no I/O beyond
//! parsing, no state carried between frames.
//!
//! Pipeline: [`catalog`] → [`propagator`] → [`projection`] → [`selection`],
//! tied together per frame by [`scene::SentinelScene`].

pub mod constants;
pub mod tle;
pub mod catalog;
pub mod propagator;
pub mod projection;
pub mod selection;
pub mod orbit_path;
pub mod config;
pub mod scene;

pub use catalog::{Catalog, CatalogError, OrbitalElementSet};
pub use config::{ConfigError, SceneConfig};
pub use projection::{GeodeticCoordinate, ScenePosition};
pub use propagator::{PropagatedState, PropagationError, SatellitePropagator};
pub use scene::{FrameSnapshot, SceneError, SentinelScene};
pub use selection::{LinkRole, SignalLink};
