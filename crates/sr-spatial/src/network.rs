//! Street multigraph representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the slice:
//!
//! ```text
//! edges[ node_out_start[n] .. node_out_start[n+1] ]
//! ```
//!
//! All edge arrays (`edge_from`, `edge_to`, `edges`) are sorted by source
//! node and indexed by `EdgeId`.  The sort is stable, so parallel edges
//! between the same ordered node pair keep the order in which they were
//! added and `EdgeAttrs::key` counts them `0, 1, 2, …`.
//!
//! # Enrichment state
//!
//! Edges start with `risk = 0`, `facility_distance = 0`,
//! `composite_weight = 0` and possibly no geometry.  Risk assignment and
//! weighting fill those in and flip the graph's stage flags; routing refuses
//! a graph that is not [`prepared`](StreetGraph::is_prepared).
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(x, y)` to the nearest `NodeId`.  Used at
//! query time to snap caller coordinates to graph nodes.

use geo::{Coord, LineString};
use rstar::{AABB, PointDistance, RTree, RTreeObject};
use rustc_hash::FxHashMap;

use sr_core::{Crs, EdgeId, NodeId, straight_segment};

use crate::{SpatialError, SpatialResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

/// Entry stored in the R-tree spatial index: a 2-D `[x, y]` point with the
/// associated `NodeId`.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2], // [x, y]
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared planar distance in CRS units.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── EdgeAttrs ─────────────────────────────────────────────────────────────────

/// Attributes of one directed street segment.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeAttrs {
    /// Parallel-edge key among edges sharing the same `(from, to)` pair.
    pub key: u32,
    /// Physical length, metres.
    pub length: f64,
    /// Path of the segment.  `None` until synthesised by the weighting stage
    /// when the source data carried no geometry.
    pub geometry: Option<LineString<f64>>,
    /// Zone risk in `[0, 1]`.
    pub risk: f64,
    /// Distance from the segment midpoint to the nearest safety facility,
    /// CRS units.
    pub facility_distance: f64,
    /// Cost used by the safest-route search.
    pub composite_weight: f64,
}

// ── StreetGraph ───────────────────────────────────────────────────────────────

/// Directed street multigraph in CSR format plus a spatial index for node
/// snapping.
///
/// All topology fields are `pub` for direct indexed access on hot paths.  Do
/// not construct directly; use [`StreetGraphBuilder`].
pub struct StreetGraph {
    /// CRS shared by node coordinates and every layer joined against them.
    pub crs: Crs,

    // ── Node data ─────────────────────────────────────────────────────────
    /// Planar position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<Coord<f64>>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// CSR row pointer.  Outgoing edges of node `n` are at EdgeIds
    /// `node_out_start[n] .. node_out_start[n+1]`.
    /// Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId = position in sorted order) ──────────
    /// Source node of each edge.  Redundant with CSR but required for
    /// route reconstruction (trace the predecessor edge back to its source).
    pub edge_from: Vec<NodeId>,

    /// Destination node of each edge.
    pub edge_to: Vec<NodeId>,

    /// Per-edge attributes.
    pub edges: Vec<EdgeAttrs>,

    risk_assigned: bool,
    weighted: bool,

    // ── Spatial index ─────────────────────────────────────────────────────
    spatial_idx: RTree<NodeEntry>,
}

impl StreetGraph {
    /// Construct an empty graph with no nodes or edges.
    pub fn empty(crs: Crs) -> Self {
        StreetGraphBuilder::new(crs).build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`.
    ///
    /// A contiguous index range; no heap allocation.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    /// Out-degree of `node` (number of outgoing edges).
    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// All parallel edges `from → to`, in key order.
    pub fn edges_between(&self, from: NodeId, to: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        self.out_edges(from)
            .filter(move |e| self.edge_to[e.index()] == to)
    }

    /// All edge ids, in CSR order.
    #[inline]
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        (0..self.edges.len() as u32).map(EdgeId)
    }

    #[inline]
    pub fn edge(&self, edge: EdgeId) -> &EdgeAttrs {
        &self.edges[edge.index()]
    }

    #[inline]
    pub fn node_coord(&self, node: NodeId) -> Coord<f64> {
        self.node_pos[node.index()]
    }

    /// Straight line between the endpoints of `edge`.
    pub fn endpoint_segment(&self, edge: EdgeId) -> LineString<f64> {
        straight_segment(
            self.node_coord(self.edge_from[edge.index()]),
            self.node_coord(self.edge_to[edge.index()]),
        )
    }

    // ── Enrichment stage ──────────────────────────────────────────────────

    /// Record that every edge carries `risk` and `facility_distance`.
    ///
    /// Any previously computed composite weights are now stale.
    pub fn mark_risk_assigned(&mut self) {
        self.risk_assigned = true;
        self.weighted = false;
    }

    /// Record that every edge carries a geometry and `composite_weight`.
    pub fn mark_weighted(&mut self) {
        self.weighted = true;
    }

    pub fn is_risk_assigned(&self) -> bool {
        self.risk_assigned
    }

    /// `true` once both enrichment stages have run, in order.
    pub fn is_prepared(&self) -> bool {
        self.risk_assigned && self.weighted
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Return the `NodeId` of the nearest graph node to `pos`.
    ///
    /// Returns `None` only if the graph has no nodes.  `pos` must be finite.
    pub fn snap_to_node(&self, pos: Coord<f64>) -> Option<NodeId> {
        self.spatial_idx
            .nearest_neighbor(&[pos.x, pos.y])
            .map(|e| e.id)
    }
}

// ── StreetGraphBuilder ────────────────────────────────────────────────────────

/// Construct a [`StreetGraph`] incrementally, then call [`build`](Self::build).
///
/// The builder accepts nodes and directed edges in any order.  `build()`
/// stably sorts edges by source node, constructs the CSR arrays, and
/// bulk-loads the R-tree.
///
/// # Example
///
/// ```
/// use geo::Coord;
/// use sr_core::Crs;
/// use sr_spatial::StreetGraphBuilder;
///
/// let mut b = StreetGraphBuilder::new(Crs::epsg(3116));
/// let a = b.add_node(Coord { x: 0.0, y: 0.0 });
/// let c = b.add_node(Coord { x: 0.0, y: 100.0 });
/// b.add_street(a, c, 100.0, None).unwrap();
/// let graph = b.build();
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.edge_count(), 2); // both directions
/// ```
pub struct StreetGraphBuilder {
    crs:       Crs,
    nodes:     Vec<Coord<f64>>,
    raw_edges: Vec<RawEdge>,
    next_key:  FxHashMap<(NodeId, NodeId), u32>,
}

struct RawEdge {
    from:  NodeId,
    to:    NodeId,
    attrs: EdgeAttrs,
}

impl StreetGraphBuilder {
    pub fn new(crs: Crs) -> Self {
        Self::with_capacity(crs, 0, 0)
    }

    /// Pre-allocate for the expected number of nodes and edges to reduce
    /// reallocations when bulk-loading.
    pub fn with_capacity(crs: Crs, nodes: usize, edges: usize) -> Self {
        Self {
            crs,
            nodes:     Vec::with_capacity(nodes),
            raw_edges: Vec::with_capacity(edges),
            next_key:  FxHashMap::default(),
        }
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, pos: Coord<f64>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        id
    }

    /// Add a **directed** edge from `from` to `to` and return its parallel
    /// key.
    ///
    /// - `length`: physical length in metres.
    /// - `geometry`: path from `from` to `to`; `None` when the source has
    ///   none (a straight segment is synthesised later).
    pub fn add_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        length: f64,
        geometry: Option<LineString<f64>>,
    ) -> SpatialResult<u32> {
        for node in [from, to] {
            if node.index() >= self.nodes.len() {
                return Err(SpatialError::NodeNotFound(node));
            }
        }

        let slot = self.next_key.entry((from, to)).or_insert(0);
        let key = *slot;
        *slot += 1;

        self.raw_edges.push(RawEdge {
            from,
            to,
            attrs: EdgeAttrs {
                key,
                length,
                geometry,
                risk: 0.0,
                facility_distance: 0.0,
                composite_weight: 0.0,
            },
        });
        Ok(key)
    }

    /// Convenience: add edges in **both directions** for a two-way street.
    /// The reverse edge gets the reversed geometry.
    pub fn add_street(
        &mut self,
        a: NodeId,
        b: NodeId,
        length: f64,
        geometry: Option<LineString<f64>>,
    ) -> SpatialResult<()> {
        let reversed = geometry.as_ref().map(|g| {
            let mut coords = g.0.clone();
            coords.reverse();
            LineString::new(coords)
        });
        self.add_edge(a, b, length, geometry)?;
        self.add_edge(b, a, length, reversed)?;
        Ok(())
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.raw_edges.len() }

    /// Consume the builder and produce a [`StreetGraph`].
    ///
    /// Time complexity: O(E log E) for edge sort + O(N log N) for R-tree bulk
    /// load, where N = nodes, E = edges.
    pub fn build(self) -> StreetGraph {
        let node_count = self.nodes.len();
        let edge_count = self.raw_edges.len();

        // Stable: parallel edges keep insertion (key) order.
        let mut raw = self.raw_edges;
        raw.sort_by_key(|e| e.from.0);

        let edge_from: Vec<NodeId> = raw.iter().map(|e| e.from).collect();
        let edge_to:   Vec<NodeId> = raw.iter().map(|e| e.to).collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &raw {
            node_out_start[e.from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        let edges: Vec<EdgeAttrs> = raw.into_iter().map(|e| e.attrs).collect();

        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, pos)| NodeEntry {
                point: [pos.x, pos.y],
                id: NodeId(i as u32),
            })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        StreetGraph {
            crs: self.crs,
            node_pos: self.nodes,
            node_out_start,
            edge_from,
            edge_to,
            edges,
            risk_assigned: false,
            weighted: false,
            spatial_idx,
        }
    }
}
