//! Spatial index over the risk-zone and facility layers.
//!
//! Two R-trees (via `rstar`):
//!
//! - **zones**: one bounding rectangle per zone.  A point query returns every
//!   zone whose rectangle covers the point; the caller then tests exact
//!   containment on that short list instead of on every polygon.
//! - **facilities**: one `[x, y]` point per facility, queried for the
//!   nearest neighbour.
//!
//! Zones are stored sorted by `code` and identified by their position
//! ([`ZoneId`]), and candidate lists are returned in ascending `ZoneId`
//! order.  Candidate order is therefore independent of R-tree layout.
//!
//! The index is immutable once built.  Rebuild it when a layer changes.

use geo::{BoundingRect, Centroid, Coord, Geometry};
use log::{info, warn};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{AABB, RTree};

use sr_core::{Crs, ZoneId};

use crate::layers::{FacilityLayer, RiskZone, ZoneLayer};
use crate::{SpatialError, SpatialResult};

type ZoneEntry = GeomWithData<Rectangle<[f64; 2]>, ZoneId>;

/// Coarse zone lookup plus nearest-facility lookup, in the street graph's CRS.
pub struct SpatialIndex {
    crs:        Crs,
    zones:      Vec<RiskZone>,
    zone_tree:  RTree<ZoneEntry>,
    facilities: RTree<[f64; 2]>,
}

impl SpatialIndex {
    /// Build the index for a street graph expressed in `graph_crs`.
    ///
    /// # Errors
    ///
    /// - [`SpatialError::CrsMismatch`] if either layer is in another CRS.
    /// - [`SpatialError::InvalidData`] on duplicate zone codes or a zone risk
    ///   outside `[0, 1]`.
    pub fn build(graph_crs: Crs, zones: ZoneLayer, facilities: FacilityLayer) -> SpatialResult<Self> {
        check_crs("risk zone", graph_crs, zones.crs)?;
        check_crs("facility", graph_crs, facilities.crs)?;

        let mut zones = zones.zones;
        for zone in &zones {
            if let Some(r) = zone.risk {
                if !(0.0..=1.0).contains(&r) {
                    return Err(SpatialError::InvalidData(format!(
                        "zone {:?} has risk {r}, expected a value in [0, 1]",
                        zone.code
                    )));
                }
            }
        }
        zones.sort_by(|a, b| a.code.cmp(&b.code));
        if let Some(pair) = zones.windows(2).find(|w| w[0].code == w[1].code) {
            return Err(SpatialError::InvalidData(format!(
                "duplicate zone code {:?}",
                pair[0].code
            )));
        }

        let zone_entries: Vec<ZoneEntry> = zones
            .iter()
            .enumerate()
            .filter_map(|(i, zone)| {
                let Some(rect) = zone.polygon.bounding_rect() else {
                    warn!("zone {:?} has an empty polygon and can never match", zone.code);
                    return None;
                };
                let (min, max) = (rect.min(), rect.max());
                Some(GeomWithData::new(
                    Rectangle::from_corners([min.x, min.y], [max.x, max.y]),
                    ZoneId(i as u32),
                ))
            })
            .collect();

        let mut reduced = 0usize;
        let mut points: Vec<[f64; 2]> = Vec::with_capacity(facilities.len());
        for geometry in &facilities.geometries {
            let point = match geometry {
                Geometry::Point(p) => Some(*p),
                other => {
                    reduced += 1;
                    other.centroid()
                }
            };
            match point {
                Some(p) if p.x().is_finite() && p.y().is_finite() => points.push([p.x(), p.y()]),
                _ => warn!("skipping facility without a usable location"),
            }
        }
        if reduced > 0 {
            info!("reduced {reduced} non-point facility geometries to centroids");
        }

        info!(
            "spatial index built: {} zones, {} facilities ({})",
            zone_entries.len(),
            points.len(),
            graph_crs
        );

        Ok(Self {
            crs:        graph_crs,
            zones,
            zone_tree:  RTree::bulk_load(zone_entries),
            facilities: RTree::bulk_load(points),
        })
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    pub fn facility_count(&self) -> usize {
        self.facilities.size()
    }

    #[inline]
    pub fn zone(&self, id: ZoneId) -> &RiskZone {
        &self.zones[id.index()]
    }

    /// Zones sorted by code; `zones()[i]` is `ZoneId(i)`.
    pub fn zones(&self) -> &[RiskZone] {
        &self.zones
    }

    /// Zones whose bounding rectangle covers `p`, in ascending `ZoneId`
    /// order.
    ///
    /// This is the coarse phase only: a candidate may not actually contain
    /// `p`.
    pub fn polygons_containing(&self, p: Coord<f64>) -> impl Iterator<Item = (ZoneId, &RiskZone)> + '_ {
        let mut ids: Vec<ZoneId> = self
            .zone_tree
            .locate_in_envelope_intersecting(&AABB::from_point([p.x, p.y]))
            .map(|entry| entry.data)
            .collect();
        ids.sort_unstable();
        ids.into_iter().map(move |id| (id, &self.zones[id.index()]))
    }

    /// Nearest facility to `p` and its planar distance in CRS units.
    ///
    /// Returns `None` only if the facility layer is empty.
    pub fn nearest_point(&self, p: Coord<f64>) -> Option<(Coord<f64>, f64)> {
        self.facilities.nearest_neighbor(&[p.x, p.y]).map(|f| {
            let distance = (f[0] - p.x).hypot(f[1] - p.y);
            (Coord { x: f[0], y: f[1] }, distance)
        })
    }
}

fn check_crs(layer: &'static str, expected: Crs, found: Crs) -> SpatialResult<()> {
    if expected == found {
        Ok(())
    } else {
        Err(SpatialError::CrsMismatch { layer, expected, found })
    }
}
