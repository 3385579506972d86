//! Dual shortest / safest routing.
//!
//! # Query flow
//!
//! 1. Each `(lat, lon)` endpoint is read as `(x = lon, y = lat)` in the graph
//!    CRS and snapped to the nearest node.
//! 2. Two Dijkstra searches run between the snapped nodes: one on `length`,
//!    one on `composite_weight`.
//! 3. Each path is turned into display coordinates, transposed back to
//!    `(lat, lon)`, and its zone risk is summed.
//!
//! A [`DualRouter`] only reads the graph.  Holding one keeps the graph
//! borrowed, so no enrichment stage can run while queries are in flight.

use log::debug;

use sr_core::{LatLon, NodeId};
use sr_spatial::StreetGraph;

use crate::dijkstra::{EdgeMetric, Path, shortest_path};
use crate::route::{DualRoute, RouteCoordinates};
use crate::{RouteError, RouteResult};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

pub struct DualRouter<'g> {
    graph: &'g StreetGraph,
}

impl<'g> DualRouter<'g> {
    /// Wrap a prepared graph.
    ///
    /// # Errors
    ///
    /// [`RouteError::Unprepared`] unless risk assignment and weighting have
    /// both run on `graph`.
    pub fn new(graph: &'g StreetGraph) -> RouteResult<Self> {
        if !graph.is_prepared() {
            return Err(RouteError::Unprepared);
        }
        Ok(Self { graph })
    }

    pub fn graph(&self) -> &'g StreetGraph {
        self.graph
    }

    /// Nearest graph node to `point`.
    ///
    /// # Errors
    ///
    /// - [`RouteError::Core`] if either component is NaN or infinite.
    /// - [`RouteError::EmptyGraph`] if there is no node to snap to.
    pub fn resolve(&self, point: LatLon) -> RouteResult<NodeId> {
        point.validate()?;
        self.graph
            .snap_to_node(point.to_coord())
            .ok_or(RouteError::EmptyGraph)
    }

    /// Shortest and safest routes between the nodes nearest `start` and `end`.
    pub fn route(&self, start: LatLon, end: LatLon) -> RouteResult<DualRoute> {
        let from = self.resolve(start)?;
        let to = self.resolve(end)?;
        debug!("query {start} -> {end} snapped to {from} -> {to}");
        self.route_between_nodes(from, to)
    }

    /// Like [`route`](Self::route) with `"lat, lon"` text endpoints.
    pub fn route_text(&self, start: &str, end: &str) -> RouteResult<DualRoute> {
        self.route(start.parse()?, end.parse()?)
    }

    /// Shortest and safest routes between two already-resolved nodes.
    ///
    /// # Errors
    ///
    /// [`RouteError::NoPath`] if `to` is unreachable from `from`.
    pub fn route_between_nodes(&self, from: NodeId, to: NodeId) -> RouteResult<DualRoute> {
        let shortest = self.describe(shortest_path(self.graph, from, to, EdgeMetric::Length)?)?;
        let safest = self.describe(shortest_path(self.graph, from, to, EdgeMetric::Composite)?)?;

        debug!(
            "{from} -> {to}: shortest {:.1} m risk {:.3}; safest {:.1} m risk {:.3}",
            shortest.length_total, shortest.risk_total, safest.length_total, safest.risk_total
        );
        Ok(DualRoute {
            start: from,
            end: to,
            risk_shortest: shortest.risk_total,
            risk_safest: safest.risk_total,
            shortest,
            safest,
        })
    }

    /// Answer a batch of queries.  Results are in query order; each query
    /// fails or succeeds on its own.
    #[cfg(not(feature = "parallel"))]
    pub fn route_many(&self, queries: &[(LatLon, LatLon)]) -> Vec<RouteResult<DualRoute>> {
        queries.iter().map(|&(s, e)| self.route(s, e)).collect()
    }

    /// Answer a batch of queries on Rayon's pool.  Results are in query
    /// order; each query fails or succeeds on its own.
    #[cfg(feature = "parallel")]
    pub fn route_many(&self, queries: &[(LatLon, LatLon)]) -> Vec<RouteResult<DualRoute>> {
        queries.par_iter().map(|&(s, e)| self.route(s, e)).collect()
    }

    /// Display coordinates and risk for `path`, one shortest parallel edge
    /// per hop.
    fn describe(&self, path: Path) -> RouteResult<RouteCoordinates> {
        let hops = path.nodes.len().saturating_sub(1);
        let mut segments   = Vec::with_capacity(hops);
        let mut edge_risks = Vec::with_capacity(hops);
        let mut length_total = 0.0;

        for pair in path.nodes.windows(2) {
            let (u, v) = (pair[0], pair[1]);
            let edge = self
                .graph
                .edges_between(u, v)
                .min_by(|a, b| self.graph.edge(*a).length.total_cmp(&self.graph.edge(*b).length))
                .ok_or(RouteError::NoPath { from: u, to: v })?;
            let attrs = self.graph.edge(edge);
            let geometry = attrs
                .geometry
                .as_ref()
                .ok_or(RouteError::MissingAttribute { edge, attribute: "geometry" })?;

            segments.push(geometry.coords().map(|c| LatLon::from_coord(*c)).collect());
            edge_risks.push(attrs.risk);
            length_total += attrs.length;
        }

        Ok(RouteCoordinates {
            risk_total: edge_risks.iter().sum(),
            nodes: path.nodes,
            segments,
            edge_risks,
            length_total,
            cost: path.cost,
        })
    }
}
