//! Query coordinates, coordinate reference systems, and line interpolation.
//!
//! The street graph stores planar `(x, y)` coordinates where `x` is the
//! easting/longitude axis and `y` the northing/latitude axis.  Callers speak
//! `(lat, lon)`, so [`LatLon`] is the only place the two orders are swapped.

use std::fmt;
use std::str::FromStr;

use geo::{Coord, LineString};

use crate::CoreError;

// ── LatLon ────────────────────────────────────────────────────────────────────

/// A caller-facing coordinate pair in `(lat, lon)` order.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Graph-space coordinate: `x = lon`, `y = lat`.
    #[inline]
    pub fn to_coord(self) -> Coord<f64> {
        Coord { x: self.lon, y: self.lat }
    }

    /// Inverse of [`to_coord`](Self::to_coord).
    #[inline]
    pub fn from_coord(c: Coord<f64>) -> Self {
        Self { lat: c.y, lon: c.x }
    }

    /// Reject non-finite components.
    pub fn validate(&self) -> Result<(), CoreError> {
        check_finite(self.lat, "latitude")?;
        check_finite(self.lon, "longitude")
    }
}

impl FromStr for LatLon {
    type Err = CoreError;

    /// Parse `"lat, lon"` as typed into a search box.
    ///
    /// Exactly two comma-separated finite numbers are accepted; surrounding
    /// whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [lat, lon] = parts.as_slice() else {
            return Err(CoreError::InvalidInput(format!(
                "expected \"lat, lon\" with exactly two values, got {} in {s:?}",
                parts.len()
            )));
        };
        Ok(Self::new(parse_component(lat, "latitude")?, parse_component(lon, "longitude")?))
    }
}

fn parse_component(raw: &str, what: &str) -> Result<f64, CoreError> {
    let value = raw
        .parse::<f64>()
        .map_err(|_| CoreError::InvalidInput(format!("{what} {raw:?} is not a number")))?;
    check_finite(value, what)?;
    Ok(value)
}

fn check_finite(value: f64, what: &str) -> Result<(), CoreError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(CoreError::InvalidInput(format!("{what} {value} is not finite")))
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

// ── Crs ───────────────────────────────────────────────────────────────────────

/// Coordinate reference system, identified by its EPSG code.
///
/// The core never reprojects; it only checks that every layer agrees.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Crs {
    pub epsg: u32,
}

impl Crs {
    /// Geographic WGS-84 (degrees).
    pub const WGS84: Crs = Crs { epsg: 4326 };

    #[inline]
    pub const fn epsg(code: u32) -> Self {
        Self { epsg: code }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg)
    }
}

// ── Line helpers ──────────────────────────────────────────────────────────────

/// Two-vertex line from `a` to `b`.
#[inline]
pub fn straight_segment(a: Coord<f64>, b: Coord<f64>) -> LineString<f64> {
    LineString::new(vec![a, b])
}

/// The point lying `fraction` of the way along `line`, measured by planar arc
/// length.  `fraction` is clamped to `[0, 1]`.
///
/// Returns `None` for a line without vertices.  A zero-length line returns its
/// first vertex.
pub fn point_at_fraction(line: &LineString<f64>, fraction: f64) -> Option<Coord<f64>> {
    let first = *line.0.first()?;
    let total: f64 = line.lines().map(|l| l.dx().hypot(l.dy())).sum();
    if total <= 0.0 {
        return Some(first);
    }

    let target = total * fraction.clamp(0.0, 1.0);
    let mut walked = 0.0;
    for segment in line.lines() {
        let seg_len = segment.dx().hypot(segment.dy());
        if seg_len > 0.0 && walked + seg_len >= target {
            let t = (target - walked) / seg_len;
            return Some(Coord {
                x: segment.start.x + t * segment.dx(),
                y: segment.start.y + t * segment.dy(),
            });
        }
        walked += seg_len;
    }

    // Floating-point shortfall on the final segment.
    line.0.last().copied()
}

/// Point at 50 % of the arc length of `line`.
#[inline]
pub fn midpoint(line: &LineString<f64>) -> Option<Coord<f64>> {
    point_at_fraction(line, 0.5)
}
