//! Per-edge risk and facility-distance assignment.
//!
//! Each edge is represented by its **midpoint**: the point at 50 % of the
//! arc length of its geometry (or of the straight endpoint segment when the
//! edge has no geometry yet).  For that point:
//!
//! - `risk` comes from the first zone, in ascending `ZoneId` (= zone code)
//!   order, whose polygon strictly contains it.  Overlapping zones are not
//!   combined.  No containing zone → [`RiskConfig::unmatched_risk`]; a
//!   containing zone without a prediction → [`RiskConfig::null_zone_risk`].
//! - `facility_distance` is the planar distance to the nearest facility.
//!
//! Cost is one coarse R-tree lookup, a handful of exact containment tests,
//! and one nearest-neighbour lookup per edge.

use std::borrow::Cow;

use geo::{Contains, Coord, Point};
use log::info;

use sr_core::{EdgeId, RiskConfig, ZoneId, midpoint};
use sr_spatial::{SpatialError, SpatialIndex, StreetGraph};

use crate::{RiskError, RiskResult};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

// ── Results ───────────────────────────────────────────────────────────────────

/// How an edge midpoint resolved against the zone layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ZoneMatch {
    /// Inside this zone, which has a risk value.
    Matched(ZoneId),
    /// Inside this zone, which has no risk value.
    NullRisk(ZoneId),
    /// Inside no zone.
    Unmatched,
}

/// Everything computed for one edge, before it is written back.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EdgeAnnotation {
    pub midpoint:          Coord<f64>,
    pub zone:              ZoneMatch,
    pub risk:              f64,
    pub facility_distance: f64,
}

/// Summary of one [`RiskAssigner::assign`] pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AssignmentStats {
    pub edges:     usize,
    pub matched:   usize,
    pub null_risk: usize,
    pub unmatched: usize,
}

// ── RiskAssigner ──────────────────────────────────────────────────────────────

/// Annotates street edges by spatial join against a [`SpatialIndex`].
pub struct RiskAssigner<'a> {
    index:  &'a SpatialIndex,
    config: RiskConfig,
}

impl<'a> RiskAssigner<'a> {
    pub fn new(index: &'a SpatialIndex, config: RiskConfig) -> RiskResult<Self> {
        config.validate()?;
        Ok(Self { index, config })
    }

    /// Compute the annotation for one edge without touching the graph.
    pub fn annotate(&self, graph: &StreetGraph, edge: EdgeId) -> RiskResult<EdgeAnnotation> {
        let mid = edge_midpoint(graph, edge);
        let point = Point::from(mid);

        let zone = self
            .index
            .polygons_containing(mid)
            .find(|(_, z)| z.polygon.contains(&point))
            .map(|(id, z)| (id, z.risk));

        let (zone, risk) = match zone {
            Some((id, Some(r))) => (ZoneMatch::Matched(id), r),
            Some((id, None))    => (ZoneMatch::NullRisk(id), self.config.null_zone_risk),
            None                => (ZoneMatch::Unmatched, self.config.unmatched_risk),
        };

        let (_, facility_distance) = self
            .index
            .nearest_point(mid)
            .ok_or(RiskError::NoFacilities)?;

        Ok(EdgeAnnotation { midpoint: mid, zone, risk, facility_distance })
    }

    /// Annotate every edge of `graph` exactly once and write `risk` and
    /// `facility_distance` back.
    ///
    /// Re-running with the same inputs yields identical attributes.  Any
    /// composite weights already on the graph become stale and must be
    /// recomputed.
    ///
    /// # Errors
    ///
    /// - [`RiskError::Spatial`] if the index was built for another CRS.
    /// - [`RiskError::NoFacilities`] if the facility layer is empty.
    ///
    /// The graph is left untouched on error.
    pub fn assign(&self, graph: &mut StreetGraph) -> RiskResult<AssignmentStats> {
        if graph.crs != self.index.crs() {
            return Err(SpatialError::CrsMismatch {
                layer:    "street graph",
                expected: self.index.crs(),
                found:    graph.crs,
            }
            .into());
        }
        if graph.edge_count() > 0 && self.index.facility_count() == 0 {
            return Err(RiskError::NoFacilities);
        }

        let annotations = self.annotate_all(graph)?;

        let mut stats = AssignmentStats { edges: annotations.len(), ..Default::default() };
        for (attrs, ann) in graph.edges.iter_mut().zip(&annotations) {
            attrs.risk = ann.risk;
            attrs.facility_distance = ann.facility_distance;
            match ann.zone {
                ZoneMatch::Matched(_)  => stats.matched += 1,
                ZoneMatch::NullRisk(_) => stats.null_risk += 1,
                ZoneMatch::Unmatched   => stats.unmatched += 1,
            }
        }
        graph.mark_risk_assigned();

        info!(
            "risk assigned to {} edges: {} in a scored zone, {} in an unscored zone, {} outside every zone",
            stats.edges, stats.matched, stats.null_risk, stats.unmatched
        );
        Ok(stats)
    }

    #[cfg(not(feature = "parallel"))]
    fn annotate_all(&self, graph: &StreetGraph) -> RiskResult<Vec<EdgeAnnotation>> {
        graph.edge_ids().map(|e| self.annotate(graph, e)).collect()
    }

    #[cfg(feature = "parallel")]
    fn annotate_all(&self, graph: &StreetGraph) -> RiskResult<Vec<EdgeAnnotation>> {
        (0..graph.edge_count() as u32)
            .into_par_iter()
            .map(|e| self.annotate(graph, EdgeId(e)))
            .collect()
    }
}

/// Point at half the arc length of `edge`'s path.
///
/// Uses the edge geometry when it has at least two vertices, otherwise the
/// straight segment between its endpoints.
pub fn edge_midpoint(graph: &StreetGraph, edge: EdgeId) -> Coord<f64> {
    let line = match &graph.edge(edge).geometry {
        Some(g) if g.0.len() >= 2 => Cow::Borrowed(g),
        _ => Cow::Owned(graph.endpoint_segment(edge)),
    };
    midpoint(&line).unwrap_or_else(|| graph.node_coord(graph.edge_from[edge.index()]))
}
