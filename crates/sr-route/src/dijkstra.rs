//! Single-source, single-target Dijkstra over the CSR street graph.
//!
//! Costs are `f64` edge attributes selected by [`EdgeMetric`].  Both metrics
//! are non-negative on a prepared graph (lengths and weighting coefficients
//! are validated before weighting), which is all Dijkstra needs.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use sr_core::{EdgeId, NodeId};
use sr_spatial::{EdgeAttrs, StreetGraph};

use crate::{RouteError, RouteResult};

// ── Metric ────────────────────────────────────────────────────────────────────

/// Which edge attribute a search minimises.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgeMetric {
    /// Physical length.
    Length,
    /// Risk-aware composite weight.
    Composite,
}

impl EdgeMetric {
    #[inline]
    pub fn cost(self, attrs: &EdgeAttrs) -> f64 {
        match self {
            EdgeMetric::Length    => attrs.length,
            EdgeMetric::Composite => attrs.composite_weight,
        }
    }
}

// ── Path ──────────────────────────────────────────────────────────────────────

/// Result of one search.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    /// Visited nodes, source first.  A single node when source = target.
    pub nodes: Vec<NodeId>,
    /// Edges the search relaxed along the path (`nodes.len() - 1` of them).
    pub edges: Vec<EdgeId>,
    /// Sum of the metric over `edges`.
    pub cost: f64,
}

// ── Heap entry ────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq)]
struct State {
    cost: f64,
    node: NodeId,
}

impl Eq for State {}

impl Ord for State {
    /// Reversed so `BinaryHeap` pops the cheapest state; ties go to the lower
    /// `NodeId` for deterministic output.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ── Search ────────────────────────────────────────────────────────────────────

/// Minimum-`metric` path from `from` to `to`.
///
/// # Errors
///
/// - [`RouteError::NodeNotFound`] if either node is out of range.
/// - [`RouteError::NoPath`] if `to` is unreachable from `from`.
pub fn shortest_path(
    graph:  &StreetGraph,
    from:   NodeId,
    to:     NodeId,
    metric: EdgeMetric,
) -> RouteResult<Path> {
    for node in [from, to] {
        if node.index() >= graph.node_count() {
            return Err(RouteError::NodeNotFound(node));
        }
    }
    if from == to {
        return Ok(Path { nodes: vec![from], edges: vec![], cost: 0.0 });
    }

    let n = graph.node_count();
    let mut dist      = vec![f64::INFINITY; n];
    let mut prev_edge = vec![EdgeId::INVALID; n];

    dist[from.index()] = 0.0;
    let mut heap = BinaryHeap::new();
    heap.push(State { cost: 0.0, node: from });

    while let Some(State { cost, node }) = heap.pop() {
        if node == to {
            return Ok(reconstruct(graph, &prev_edge, from, to, cost));
        }
        // Stale entry.
        if cost > dist[node.index()] {
            continue;
        }

        for edge in graph.out_edges(node) {
            let next = graph.edge_to[edge.index()];
            let next_cost = cost + metric.cost(graph.edge(edge));
            if next_cost < dist[next.index()] {
                dist[next.index()] = next_cost;
                prev_edge[next.index()] = edge;
                heap.push(State { cost: next_cost, node: next });
            }
        }
    }

    Err(RouteError::NoPath { from, to })
}

fn reconstruct(
    graph:     &StreetGraph,
    prev_edge: &[EdgeId],
    from:      NodeId,
    to:        NodeId,
    cost:      f64,
) -> Path {
    let mut edges = Vec::new();
    let mut nodes = vec![to];
    let mut cur = to;
    while cur != from {
        let e = prev_edge[cur.index()];
        edges.push(e);
        cur = graph.edge_from[e.index()];
        nodes.push(cur);
    }
    edges.reverse();
    nodes.reverse();
    Path { nodes, edges, cost }
}

/// Cheapest `metric` cost of walking `nodes` in order, taking the cheapest
/// parallel edge for every hop.
///
/// `None` if some consecutive pair is not joined by an edge.
pub fn path_cost(graph: &StreetGraph, nodes: &[NodeId], metric: EdgeMetric) -> Option<f64> {
    nodes.windows(2).try_fold(0.0, |total, pair| {
        graph
            .edges_between(pair[0], pair[1])
            .map(|e| metric.cost(graph.edge(e)))
            .min_by(f64::total_cmp)
            .map(|c| total + c)
    })
}
