//! Route results.

use sr_core::{LatLon, NodeId};

/// One path prepared for display.
///
/// Each hop between consecutive nodes is drawn from the **shortest** parallel
/// edge joining them, whichever metric chose the path, so `segments`,
/// `edge_risks`, `risk_total` and `length_total` all describe that edge.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouteCoordinates {
    pub nodes: Vec<NodeId>,
    /// One `(lat, lon)` polyline per hop.
    pub segments: Vec<Vec<LatLon>>,
    /// Zone risk of each hop.
    pub edge_risks: Vec<f64>,
    pub risk_total: f64,
    pub length_total: f64,
    /// Sum of the metric the search minimised.
    pub cost: f64,
}

impl RouteCoordinates {
    /// `true` if the route starts and ends at the same node.
    pub fn is_trivial(&self) -> bool {
        self.segments.is_empty()
    }

    /// All points in travel order.  Hops share their joining vertex, which
    /// appears once.
    pub fn polyline(&self) -> Vec<LatLon> {
        let mut out: Vec<LatLon> = Vec::new();
        for seg in &self.segments {
            let skip = usize::from(!out.is_empty() && out.last() == seg.first());
            out.extend_from_slice(&seg[skip..]);
        }
        out
    }
}

/// Answer to one routing query: both paths between the same snapped nodes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DualRoute {
    pub start: NodeId,
    pub end: NodeId,
    /// Minimum physical length.
    pub shortest: RouteCoordinates,
    /// Minimum composite weight.
    pub safest: RouteCoordinates,
    pub risk_shortest: f64,
    pub risk_safest: f64,
}

impl DualRoute {
    /// `true` if the safest path carries strictly less risk than the
    /// shortest one.
    ///
    /// Callers that present a single alternative show `safest` only in this
    /// case.
    pub fn safest_improves(&self) -> bool {
        self.risk_safest < self.risk_shortest
    }
}
