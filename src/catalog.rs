//! Compiled-in orbital element catalog.
//!
//! The dashboard flies a fixed constellation: six GNSS-R receivers on 35°
//! inclined orbits, two sun-synchronous receivers and the ISS as a reference
//! object. The catalog is parsed once at startup and is read-only afterwards.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tle::{Tle, TleError};

/// Built-in constellation, 3-line TLE format.
pub const BUILTIN_CATALOG: &str = "\
ISS (ZARYA)
1 25544U 98067A   24001.25000000  .00016717  00000-0  30087-3 0  9997
2 25544  51.6416 208.5490 0001278  71.9840 288.1430 15.50035124432124
SENTINEL-R1
1 41884U 16078A   24001.25000000  .00001120  00000-0  31276-4 0  9998
2 41884  35.0000 120.0000 0001500 270.0000  90.0000 15.14203012402311
SENTINEL-R2
1 41885U 16078B   24001.25000000  .00001085  00000-0  30112-4 0  9997
2 41885  35.0000 120.0000 0001480 270.0000 135.0000 15.14198765402294
SENTINEL-R3
1 41886U 16078C   24001.25000000  .00001240  00000-0  34620-4 0  9999
2 41886  35.0000 160.0000 0001520 265.0000 180.0000 15.14215544402350
SENTINEL-R4
1 41887U 16078D   24001.25000000  .00001198  00000-0  33407-4 0  9994
2 41887  35.0000 160.0000 0001490 272.0000 225.0000 15.14190032402281
SENTINEL-R5
1 41888U 16078E   24001.25000000  .00001105  00000-0  30855-4 0  9997
2 41888  35.0000 200.0000 0001510 268.0000 270.0000 15.14201287402303
SENTINEL-R6
1 41889U 16078F   24001.25000000  .00001163  00000-0  32490-4 0  9999
2 41889  35.0000 200.0000 0001470 271.0000 315.0000 15.14207741402337
SENTINEL-P1
1 40076U 14037H   24001.25000000  .00000412  00000-0  48213-4 0  9995
2 40076  98.3000  45.0000 0001180  85.0000  10.0000 14.83012477504121
SENTINEL-P2
1 40077U 14037J   24001.25000000  .00000398  00000-0  46870-4 0  9996
2 40077  98.3000  45.0000 0001165  88.0000 190.0000 14.83008215504100
";

/// Catalog loading errors. All of them are startup-time data bugs.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog entry {index} ({name}) is malformed: {source}")]
    MalformedElementSet {
        index: usize,
        name: String,
        source: TleError,
    },

    #[error("catalog entry {index} ({name}) rejected by SGP4 initialisation: {reason}")]
    ModelRejected {
        index: usize,
        name: String,
        reason: String,
    },

    #[error("catalog number {norad_id} appears at entries {first} and {second}")]
    DuplicateNoradId {
        norad_id: u32,
        first: usize,
        second: usize,
    },

    #[error("catalog contains no element sets")]
    Empty,
}

/// One satellite of the catalog: display name plus its validated element lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElementSet {
    pub name: String,
    pub tle: Tle,
}

impl OrbitalElementSet {
    pub fn from_tle(tle: Tle) -> Self {
        OrbitalElementSet { name: tle.label(), tle }
    }

    pub fn norad_id(&self) -> u32 {
        self.tle.norad_id
    }

    pub fn line1(&self) -> &str {
        &self.tle.line1
    }

    pub fn line2(&self) -> &str {
        &self.tle.line2
    }
}

/// Ordered, immutable set of element records. Order is the tie-break order
/// for link selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    sets: Vec<OrbitalElementSet>,
}

impl Catalog {
    /// Parse the compiled-in constellation.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::parse(BUILTIN_CATALOG)
    }

    /// Parse a TLE text block. Any malformed entry fails the whole load.
    pub fn parse(input: &str) -> Result<Self, CatalogError> {
        let entries = Tle::split_entries(input);
        if entries.is_empty() {
            log::error!("Element catalog is empty");
            return Err(CatalogError::Empty);
        }

        let mut sets: Vec<OrbitalElementSet> = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let tle = entry.parse().map_err(|source| {
                let name = entry.name.unwrap_or("<unnamed>").trim().to_string();
                log::error!("Malformed element set #{index} ({name}): {source}");
                CatalogError::MalformedElementSet { index, name, source }
            })?;

            if let Some(first) = sets.iter().position(|s| s.norad_id() == tle.norad_id) {
                log::error!("Duplicate catalog number {} in element catalog", tle.norad_id);
                return Err(CatalogError::DuplicateNoradId {
                    norad_id: tle.norad_id,
                    first,
                    second: index,
                });
            }
            sets.push(OrbitalElementSet::from_tle(tle));
        }

        log::info!("Loaded {} element sets", sets.len());
        Ok(Catalog { sets })
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&OrbitalElementSet> {
        self.sets.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OrbitalElementSet> {
        self.sets.iter()
    }

    /// Look up a satellite by display name.
    pub fn find(&self, name: &str) -> Option<&OrbitalElementSet> {
        self.sets.iter().find(|s| s.name == name)
    }
}
