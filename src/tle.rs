//! Two-Line Element (TLE) set parser and validator.
//!
//! Parses the standard NORAD fixed-column format, 2-line or 3-line with a
//! name line. Every field is checked at parse time so that a bad catalog entry
//! is reported once, at load, instead of surfacing as a propagation failure
//! on every frame.
//!
//! # TLE Format Reference
//! ```text
//! Line 0 (optional): Satellite Name (up to 24 chars)
//! Line 1: 1 NNNNNC NNNNNAAA NNNNN.NNNNNNNN +.NNNNNNNN +NNNNN-N +NNNNN-N N NNNNN
//! Line 2: 2 NNNNN NNN.NNNN NNN.NNNN NNNNNNN NNN.NNNN NNN.NNNN NN.NNNNNNNNNNNNNN
//! ```
//!
//! # Example
//! ```
//! use gnssr_sentinel::tle::Tle;
//!
//! let line1 = "1 25544U 98067A   20194.88612269 -.00002218  00000-0 -31515-4 0  9992";
//! let line2 = "2 25544  51.6461 221.2784 0001413  89.1723 280.4612 15.49507896236008";
//!
//! let tle = Tle::parse(line1, line2).unwrap();
//! assert_eq!(tle.norad_id, 25544);
//! ```

use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;

/// Fixed width of both element lines, checksum included.
pub const LINE_LENGTH: usize = 69;

/// TLE parsing errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TleError {
    #[error("line {line} must start with '{line}', got '{found}'")]
    LineNumber { line: u8, found: char },

    #[error("line {line} must be 69 characters, got {length}")]
    Length { line: u8, length: usize },

    #[error("line {line} contains non-ASCII characters")]
    NonAscii { line: u8 },

    #[error("catalog numbers don't match between lines: {0} vs {1}")]
    NoradIdMismatch(u32, u32),

    #[error("checksum failed on line {line}: expected {expected}, computed {computed}")]
    Checksum { line: u8, expected: u8, computed: u8 },

    #[error("line {line} checksum column holds '{found}', not a digit")]
    ChecksumDigit { line: u8, found: char },

    #[error("failed to parse field '{field}' from {value:?}")]
    Field { field: &'static str, value: String },

    #[error("no element sets found in input")]
    Empty,
}

/// A parsed Two-Line Element set.
///
/// The input lines are kept verbatim; the propagator initialises SGP4
/// from them rather than from the decoded fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tle {
    /// Satellite name (from line 0, if present).
    pub name: Option<String>,
    /// NORAD catalog number.
    pub norad_id: u32,
    /// International designator (launch year, launch number, piece).
    pub intl_designator: String,
    /// Classification (U=unclassified, C=classified, S=secret).
    pub classification: char,
    /// Epoch year (full 4-digit year).
    pub epoch_year: u16,
    /// Epoch day of year (fractional, 1-based).
    pub epoch_day: f64,
    /// First derivative of mean motion (rev/day²) / 2.
    pub mean_motion_dot: f64,
    /// Second derivative of mean motion (rev/day³) / 6.
    pub mean_motion_ddot: f64,
    /// B* drag term (1/Earth radii).
    pub bstar: f64,
    /// Inclination (degrees).
    pub inclination_deg: f64,
    /// Right ascension of ascending node (degrees).
    pub raan_deg: f64,
    /// Eccentricity (dimensionless).
    pub eccentricity: f64,
    /// Argument of perigee (degrees).
    pub arg_perigee_deg: f64,
    /// Mean anomaly (degrees).
    pub mean_anomaly_deg: f64,
    /// Mean motion (revolutions per day).
    pub mean_motion_rev_day: f64,
    /// Revolution number at epoch.
    pub rev_number: u32,
    /// Line 1, verbatim.
    pub line1: String,
    /// Line 2, verbatim.
    pub line2: String,
}

/// One unparsed entry of a multi-TLE text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TleEntry<'a> {
    pub name: Option<&'a str>,
    pub line1: &'a str,
    pub line2: &'a str,
}

impl TleEntry<'_> {
    pub fn parse(&self) -> Result<Tle, TleError> {
        Tle::parse_with_name(self.name.map(|n| n.trim().to_string()), self.line1, self.line2)
    }
}

impl Tle {
    /// Parse a TLE from two lines (without satellite name).
    pub fn parse(line1: &str, line2: &str) -> Result<Self, TleError> {
        Self::parse_with_name(None, line1, line2)
    }

    /// Parse a TLE from three lines (with satellite name on line 0).
    pub fn parse_3line(line0: &str, line1: &str, line2: &str) -> Result<Self, TleError> {
        Self::parse_with_name(Some(line0.trim().to_string()), line1, line2)
    }

    fn parse_with_name(name: Option<String>, line1: &str, line2: &str) -> Result<Self, TleError> {
        let l1 = check_line(line1.trim(), 1)?;
        let l2 = check_line(line2.trim(), 2)?;

        // ── Line 1 ──
        let norad_id_1: u32 = column(l1, 2..7, "norad_id (line 1)")?;
        let classification = l1.as_bytes()[7] as char;
        let intl_designator = l1[9..17].trim().to_string();

        let epoch_year_2d: u16 = column(l1, 18..20, "epoch_year")?;
        // Two-digit years pivot at 1957 (Sputnik).
        let epoch_year = if epoch_year_2d >= 57 {
            1900 + epoch_year_2d
        } else {
            2000 + epoch_year_2d
        };
        let epoch_day: f64 = column(l1, 20..32, "epoch_day")?;
        let mean_motion_dot: f64 = column(l1, 33..43, "mean_motion_dot")?;
        let mean_motion_ddot = parse_implied_decimal(&l1[44..52], "mean_motion_ddot")?;
        let bstar = parse_implied_decimal(&l1[53..61], "bstar")?;

        // ── Line 2 ──
        let norad_id_2: u32 = column(l2, 2..7, "norad_id (line 2)")?;
        if norad_id_1 != norad_id_2 {
            return Err(TleError::NoradIdMismatch(norad_id_1, norad_id_2));
        }

        let inclination_deg: f64 = column(l2, 8..16, "inclination")?;
        let raan_deg: f64 = column(l2, 17..25, "raan")?;
        // Eccentricity carries an implied leading decimal point.
        let eccentricity = format!("0.{}", l2[26..33].trim())
            .parse::<f64>()
            .map_err(|_| field_error("eccentricity", &l2[26..33]))?;
        let arg_perigee_deg: f64 = column(l2, 34..42, "arg_perigee")?;
        let mean_anomaly_deg: f64 = column(l2, 43..51, "mean_anomaly")?;
        let mean_motion_rev_day: f64 = column(l2, 52..63, "mean_motion")?;
        let rev_number: u32 = column(l2, 63..68, "rev_number")?;

        if !(0.0..1.0).contains(&eccentricity) {
            return Err(field_error("eccentricity", &l2[26..33]));
        }
        if mean_motion_rev_day <= 0.0 {
            return Err(field_error("mean_motion", &l2[52..63]));
        }

        Ok(Tle {
            name: name.filter(|n| !n.is_empty()),
            norad_id: norad_id_1,
            intl_designator,
            classification,
            epoch_year,
            epoch_day,
            mean_motion_dot,
            mean_motion_ddot,
            bstar,
            inclination_deg,
            raan_deg,
            eccentricity,
            arg_perigee_deg,
            mean_anomaly_deg,
            mean_motion_rev_day,
            rev_number,
            line1: l1.to_string(),
            line2: l2.to_string(),
        })
    }

    /// Split a block of 2-line and 3-line TLEs into entries without parsing them.
    ///
    /// Lines starting with '1' followed by a line starting with '2' form a
    /// 2-line entry; any other non-empty line directly before such a pair is
    /// its name. Unrecognised lines are skipped.
    pub fn split_entries(input: &str) -> Vec<TleEntry<'_>> {
        let lines: Vec<&str> = input
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        let mut entries = Vec::new();
        let mut i = 0;
        while i < lines.len() {
            let is_pair_at = |k: usize| {
                k + 1 < lines.len() && lines[k].starts_with("1 ") && lines[k + 1].starts_with("2 ")
            };
            if is_pair_at(i) {
                entries.push(TleEntry { name: None, line1: lines[i], line2: lines[i + 1] });
                i += 2;
            } else if is_pair_at(i + 1) {
                entries.push(TleEntry {
                    name: Some(lines[i]),
                    line1: lines[i + 1],
                    line2: lines[i + 2],
                });
                i += 3;
            } else {
                i += 1;
            }
        }
        entries
    }

    /// Parse a string containing multiple TLEs (2-line or 3-line format).
    pub fn parse_batch(input: &str) -> Result<Vec<Self>, TleError> {
        let entries = Self::split_entries(input);
        if entries.is_empty() {
            return Err(TleError::Empty);
        }
        entries.iter().map(TleEntry::parse).collect()
    }

    /// Display name: line 0 if present, otherwise the catalog number.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("NORAD {}", self.norad_id),
        }
    }

    /// Semi-major axis derived from mean motion (km).
    ///
    /// Kepler's third law: a = (μ / n²)^(1/3), n in rad/s.
    pub fn semi_major_axis(&self) -> f64 {
        let n_rad_s = self.mean_motion_rev_day * TAU / SOLAR_DAY;
        (MU_EARTH / n_rad_s.powi(2)).powf(1.0 / 3.0)
    }

    /// Altitude above Earth's surface (km), assuming circular orbit.
    pub fn altitude(&self) -> f64 {
        self.semi_major_axis() - R_EARTH
    }

    /// Orbital period (minutes).
    pub fn period_minutes(&self) -> f64 {
        MINUTES_PER_DAY / self.mean_motion_rev_day
    }
}

impl std::fmt::Display for Tle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (NORAD {}) — {:.1} km, {:.1}° inc, {:.4} ecc, {:.2} rev/day",
            self.name.as_deref().unwrap_or("UNKNOWN"),
            self.norad_id,
            self.altitude(),
            self.inclination_deg,
            self.eccentricity,
            self.mean_motion_rev_day,
        )
    }
}

/// Structural checks shared by both lines: ASCII, length, leading digit, checksum.
fn check_line(line: &str, number: u8) -> Result<&str, TleError> {
    if !line.is_ascii() {
        return Err(TleError::NonAscii { line: number });
    }
    if line.len() != LINE_LENGTH {
        return Err(TleError::Length { line: number, length: line.len() });
    }

    let bytes = line.as_bytes();
    let lead = bytes[0] as char;
    if lead.to_digit(10) != Some(number as u32) {
        return Err(TleError::LineNumber { line: number, found: lead });
    }

    let found = bytes[LINE_LENGTH - 1] as char;
    let expected = found
        .to_digit(10)
        .ok_or(TleError::ChecksumDigit { line: number, found })? as u8;
    let computed = compute_checksum(&line[..LINE_LENGTH - 1]);
    if expected != computed {
        return Err(TleError::Checksum { line: number, expected, computed });
    }
    Ok(line)
}

/// Parse a trimmed fixed-width column.
fn column<T: FromStr>(line: &str, range: Range<usize>, field: &'static str) -> Result<T, TleError> {
    let raw = &line[range];
    raw.trim().parse::<T>().map_err(|_| field_error(field, raw))
}

fn field_error(field: &'static str, raw: &str) -> TleError {
    TleError::Field { field, value: raw.to_string() }
}

/// Parse the TLE "implied decimal" format: " NNNNN-N" → float.
///
/// Examples: " 16538-4" → 0.16538e-4, "-11606-4" → -0.11606e-4
fn parse_implied_decimal(raw: &str, field: &'static str) -> Result<f64, TleError> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(0.0);
    }

    let (sign, body) = match s.as_bytes()[0] {
        b'-' => (-1.0, &s[1..]),
        b'+' => (1.0, &s[1..]),
        _ => (1.0, s),
    };
    let (mantissa, exponent) = match body.rfind(['+', '-']).filter(|&pos| pos > 0) {
        Some(pos) => (&body[..pos], &body[pos..]),
        None => (body, "0"),
    };

    format!("0.{}e{}", mantissa.trim(), exponent)
        .parse::<f64>()
        .map(|v| sign * v)
        .map_err(|_| field_error(field, raw))
}

/// Compute TLE checksum (mod-10 of sum of digits, '-' counts as 1).
fn compute_checksum(line: &str) -> u8 {
    let sum: u32 = line
        .bytes()
        .map(|b| match b {
            b'0'..=b'9' => (b - b'0') as u32,
            b'-' => 1,
            _ => 0,
        })
        .sum();
    (sum % 10) as u8
}
