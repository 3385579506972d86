//! Input layers joined against the street graph.
//!
//! Both layers carry the CRS they are expressed in.  Reprojection happens
//! upstream; [`SpatialIndex::build`](crate::SpatialIndex::build) only checks
//! that every layer matches the graph.

use geo::{Coord, Geometry, MultiPolygon, Point};

use sr_core::Crs;

// ── RiskZone ──────────────────────────────────────────────────────────────────

/// A polygon region with a risk score.
#[derive(Clone, Debug, PartialEq)]
pub struct RiskZone {
    /// Unique zone identifier (e.g. an administrative unit code).
    pub code: String,
    pub polygon: MultiPolygon<f64>,
    /// Risk in `[0, 1]`; `None` when no score is known for the zone.
    pub risk: Option<f64>,
}

impl RiskZone {
    pub fn new(code: impl Into<String>, polygon: impl Into<MultiPolygon<f64>>, risk: Option<f64>) -> Self {
        Self {
            code: code.into(),
            polygon: polygon.into(),
            risk,
        }
    }
}

/// Risk zones in a single CRS.
#[derive(Clone, Debug)]
pub struct ZoneLayer {
    pub crs: Crs,
    pub zones: Vec<RiskZone>,
}

impl ZoneLayer {
    pub fn new(crs: Crs, zones: Vec<RiskZone>) -> Self {
        Self { crs, zones }
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

// ── FacilityLayer ─────────────────────────────────────────────────────────────

/// Safety-facility geometries in a single CRS.
///
/// Facilities are usually points, but polygon footprints are accepted and
/// reduced to their centroid when the index is built.
#[derive(Clone, Debug)]
pub struct FacilityLayer {
    pub crs: Crs,
    pub geometries: Vec<Geometry<f64>>,
}

impl FacilityLayer {
    pub fn new(crs: Crs, geometries: Vec<Geometry<f64>>) -> Self {
        Self { crs, geometries }
    }

    /// Point-only layer.
    pub fn from_points(crs: Crs, points: impl IntoIterator<Item = Coord<f64>>) -> Self {
        Self {
            crs,
            geometries: points
                .into_iter()
                .map(|c| Geometry::Point(Point::from(c)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }
}
