//! Unit tests for sr-route.
//!
//! Graphs are hand-crafted in a projected CRS and prepared with `sr-risk`
//! before routing.  Query points are `LatLon { lat: y, lon: x }`.

#[cfg(test)]
mod helpers {
    use geo::{Coord, Polygon, Rect};
    use sr_core::{Crs, LatLon, RiskConfig, WeightingConfig};
    use sr_spatial::{FacilityLayer, RiskZone, SpatialIndex, StreetGraph, StreetGraphBuilder, ZoneLayer};

    pub const CRS: Crs = Crs::epsg(3116);

    pub fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    /// Query point at planar `(x, y)`.
    pub fn at(x: f64, y: f64) -> LatLon {
        LatLon::new(y, x)
    }

    pub fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon<f64> {
        Rect::new(c(x0, y0), c(x1, y1)).to_polygon()
    }

    pub fn prepare(graph: &mut StreetGraph, zones: Vec<RiskZone>, facilities: &[Coord<f64>]) {
        let index = SpatialIndex::build(
            CRS,
            ZoneLayer::new(CRS, zones),
            FacilityLayer::from_points(CRS, facilities.iter().copied()),
        )
        .unwrap();
        sr_risk::prepare_graph(graph, &index, RiskConfig::default(), WeightingConfig::default())
            .unwrap();
    }

    /// ```text
    ///   3 ── 4 ── 5
    ///   │         │
    ///   0 ── 1 ── 2
    /// ```
    /// Every street is 100 m and two-way.  The bottom row lies in a zone of
    /// risk 1.0; the top has no zone.  One facility at (100, 50).
    pub fn detour_graph() -> StreetGraph {
        let mut b = StreetGraphBuilder::new(CRS);
        let n: Vec<_> = [(0.0, 0.0), (100.0, 0.0), (200.0, 0.0), (0.0, 100.0), (100.0, 100.0), (200.0, 100.0)]
            .into_iter()
            .map(|(x, y)| b.add_node(c(x, y)))
            .collect();
        for (u, v) in [(0, 1), (1, 2), (0, 3), (3, 4), (4, 5), (5, 2)] {
            b.add_street(n[u], n[v], 100.0, None).unwrap();
        }
        let mut graph = b.build();
        prepare(
            &mut graph,
            vec![RiskZone::new("bottom", square(-10.0, -10.0, 210.0, 10.0), Some(1.0))],
            &[c(100.0, 50.0)],
        );
        graph
    }
}

// ── Dijkstra ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod dijkstra {
    use sr_core::NodeId;

    use super::helpers::detour_graph;
    use crate::{EdgeMetric, RouteError, path_cost, shortest_path};

    #[test]
    fn length_metric() {
        let graph = detour_graph();
        let path = shortest_path(&graph, NodeId(0), NodeId(2), EdgeMetric::Length).unwrap();
        assert_eq!(path.nodes, vec![NodeId(0), NodeId(1), NodeId(2)]);
        assert_eq!(path.edges.len(), 2);
        assert_eq!(path.cost, 200.0);
    }

    #[test]
    fn composite_metric_detours() {
        let graph = detour_graph();
        let path = shortest_path(&graph, NodeId(0), NodeId(2), EdgeMetric::Composite).unwrap();
        assert_eq!(path.nodes, vec![NodeId(0), NodeId(3), NodeId(4), NodeId(5), NodeId(2)]);
        let walked = path_cost(&graph, &path.nodes, EdgeMetric::Composite).unwrap();
        assert!((walked - path.cost).abs() < 1e-9);
    }

    #[test]
    fn same_node() {
        let graph = detour_graph();
        let path = shortest_path(&graph, NodeId(4), NodeId(4), EdgeMetric::Length).unwrap();
        assert_eq!(path.nodes, vec![NodeId(4)]);
        assert!(path.edges.is_empty());
        assert_eq!(path.cost, 0.0);
    }

    #[test]
    fn out_of_range_node() {
        let graph = detour_graph();
        let err = shortest_path(&graph, NodeId(0), NodeId(99), EdgeMetric::Length);
        assert!(matches!(err, Err(RouteError::NodeNotFound(NodeId(99)))));
    }

    #[test]
    fn path_cost_requires_adjacency() {
        let graph = detour_graph();
        assert_eq!(path_cost(&graph, &[NodeId(0), NodeId(2)], EdgeMetric::Length), None);
        assert_eq!(path_cost(&graph, &[NodeId(0)], EdgeMetric::Length), Some(0.0));
    }
}

// ── DualRouter ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod router {
    use geo::LineString;
    use sr_core::{CoreError, LatLon, NodeId, RiskConfig};
    use sr_spatial::{FacilityLayer, RiskZone, SpatialIndex, StreetGraph, StreetGraphBuilder, ZoneLayer};

    use super::helpers::{CRS, at, c, detour_graph, prepare, square};
    use crate::{DualRouter, RouteError};

    #[test]
    fn safest_avoids_risky_row() {
        let graph = detour_graph();
        let router = DualRouter::new(&graph).unwrap();
        let route = router.route(at(0.0, 0.0), at(200.0, 0.0)).unwrap();

        assert_eq!(route.start, NodeId(0));
        assert_eq!(route.end, NodeId(2));
        assert_eq!(route.shortest.nodes, vec![NodeId(0), NodeId(1), NodeId(2)]);
        assert_eq!(route.safest.nodes.len(), 5);
        assert_eq!(route.risk_shortest, 2.0);
        assert_eq!(route.risk_safest, 0.0);
        assert_eq!(route.shortest.length_total, 200.0);
        assert_eq!(route.safest.length_total, 400.0);
        assert!(route.safest_improves());
    }

    #[test]
    fn coordinates_are_lat_lon() {
        let graph = detour_graph();
        let router = DualRouter::new(&graph).unwrap();
        let route = router.route(at(1.0, -2.0), at(199.0, 3.0)).unwrap();

        // First safest hop: (0,0) → (0,100) in planar (x, y).
        assert_eq!(
            route.safest.segments[0],
            vec![LatLon::new(0.0, 0.0), LatLon::new(100.0, 0.0)]
        );
        let line = route.shortest.polyline();
        assert_eq!(line, vec![LatLon::new(0.0, 0.0), LatLon::new(0.0, 100.0), LatLon::new(0.0, 200.0)]);
    }

    #[test]
    fn parallel_edges_display_the_shorter_one() {
        // Two A→B edges: 50 m bending north through a risk-0.9 zone, 70 m
        // bending south through a risk-0.1 zone.
        let mut b = StreetGraphBuilder::new(CRS);
        let a = b.add_node(c(0.0, 0.0));
        let z = b.add_node(c(100.0, 0.0));
        let north = LineString::from(vec![(0.0, 0.0), (50.0, 40.0), (100.0, 0.0)]);
        let south = LineString::from(vec![(0.0, 0.0), (50.0, -40.0), (100.0, 0.0)]);
        b.add_edge(a, z, 50.0, Some(north)).unwrap();
        b.add_edge(a, z, 70.0, Some(south)).unwrap();
        let mut graph = b.build();
        prepare(
            &mut graph,
            vec![
                RiskZone::new("N", square(40.0, 30.0, 60.0, 50.0), Some(0.9)),
                RiskZone::new("S", square(40.0, -50.0, 60.0, -30.0), Some(0.1)),
            ],
            &[c(0.0, 0.0)],
        );

        let router = DualRouter::new(&graph).unwrap();
        let route = router.route_between_nodes(a, z).unwrap();

        let north_display = vec![LatLon::new(0.0, 0.0), LatLon::new(40.0, 50.0), LatLon::new(0.0, 100.0)];
        assert_eq!(route.shortest.segments, vec![north_display.clone()]);
        assert_eq!(route.shortest.edge_risks, vec![0.9]);
        assert_eq!(route.shortest.cost, 50.0);

        // The composite search prefers the southern edge (0.7·70 + 0.2·100 +
        // 0.1·|(50,-40)|), yet the hop is still displayed with the 50 m edge.
        let expected_cost = 49.0 + 20.0 + 0.1 * (50.0f64).hypot(40.0);
        assert!((route.safest.cost - expected_cost).abs() < 1e-9, "got {}", route.safest.cost);
        assert_eq!(route.safest.segments, vec![north_display]);
        assert_eq!(route.risk_safest, 0.9);
        assert_eq!(route.risk_shortest, 0.9);
        assert!(!route.safest_improves());
    }

    #[test]
    fn same_start_and_end() {
        let graph = detour_graph();
        let router = DualRouter::new(&graph).unwrap();
        let route = router.route(at(98.0, 97.0), at(102.0, 101.0)).unwrap();
        assert_eq!(route.start, NodeId(4));
        assert!(route.shortest.is_trivial());
        assert!(route.safest.is_trivial());
        assert_eq!(route.risk_shortest, 0.0);
        assert_eq!(route.risk_safest, 0.0);
        assert!(!route.safest_improves());
    }

    #[test]
    fn disconnected_components() {
        let mut b = StreetGraphBuilder::new(CRS);
        let a = b.add_node(c(0.0, 0.0));
        let z = b.add_node(c(100.0, 0.0));
        let p = b.add_node(c(1_000.0, 0.0));
        let q = b.add_node(c(1_100.0, 0.0));
        b.add_street(a, z, 100.0, None).unwrap();
        b.add_street(p, q, 100.0, None).unwrap();
        let mut graph = b.build();
        prepare(&mut graph, vec![], &[c(0.0, 0.0)]);

        let router = DualRouter::new(&graph).unwrap();
        let err = router.route(at(0.0, 0.0), at(1_100.0, 0.0));
        assert!(matches!(err, Err(RouteError::NoPath { from, to }) if from == a && to == q));
    }

    #[test]
    fn one_way_street_has_no_return() {
        let mut b = StreetGraphBuilder::new(CRS);
        let a = b.add_node(c(0.0, 0.0));
        let z = b.add_node(c(100.0, 0.0));
        b.add_edge(a, z, 100.0, None).unwrap();
        let mut graph = b.build();
        prepare(&mut graph, vec![], &[c(0.0, 0.0)]);

        let router = DualRouter::new(&graph).unwrap();
        assert!(router.route_between_nodes(a, z).is_ok());
        assert!(matches!(router.route_between_nodes(z, a), Err(RouteError::NoPath { .. })));
    }

    #[test]
    fn unprepared_graph_rejected() {
        let mut b = StreetGraphBuilder::new(CRS);
        let a = b.add_node(c(0.0, 0.0));
        let z = b.add_node(c(100.0, 0.0));
        b.add_street(a, z, 100.0, None).unwrap();
        let mut graph = b.build();
        assert!(matches!(DualRouter::new(&graph), Err(RouteError::Unprepared)));

        // Risk alone is not enough.
        let index = SpatialIndex::build(
            CRS,
            ZoneLayer::new(CRS, vec![]),
            FacilityLayer::from_points(CRS, [c(0.0, 0.0)]),
        )
        .unwrap();
        sr_risk::RiskAssigner::new(&index, RiskConfig::default())
            .unwrap()
            .assign(&mut graph)
            .unwrap();
        assert!(matches!(DualRouter::new(&graph), Err(RouteError::Unprepared)));
    }

    #[test]
    fn empty_graph() {
        let mut graph = StreetGraph::empty(CRS);
        prepare(&mut graph, vec![], &[]);
        let router = DualRouter::new(&graph).unwrap();
        assert!(matches!(router.resolve(at(0.0, 0.0)), Err(RouteError::EmptyGraph)));
    }

    #[test]
    fn text_endpoints() {
        let graph = detour_graph();
        let router = DualRouter::new(&graph).unwrap();
        let route = router.route_text("0.0, 0.0", " 100.0 ,200.0 ").unwrap();
        assert_eq!(route.end, NodeId(5));

        assert!(matches!(router.route_text("0.0; 0.0", "1, 1"), Err(RouteError::Core(_))));
        assert!(matches!(router.route_text("0, 0", "north, 1"), Err(RouteError::Core(_))));
    }

    #[test]
    fn batch_keeps_query_order() {
        let mut b = StreetGraphBuilder::new(CRS);
        let a = b.add_node(c(0.0, 0.0));
        let z = b.add_node(c(100.0, 0.0));
        let p = b.add_node(c(1_000.0, 0.0));
        b.add_street(a, z, 100.0, None).unwrap();
        let mut graph = b.build();
        prepare(&mut graph, vec![], &[c(0.0, 0.0)]);

        let router = DualRouter::new(&graph).unwrap();
        let results = router.route_many(&[
            (at(0.0, 0.0), at(100.0, 0.0)),
            (at(0.0, 0.0), at(1_000.0, 0.0)),
            (at(100.0, 0.0), at(0.0, 0.0)),
        ]);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().end, z);
        assert!(matches!(results[1], Err(RouteError::NoPath { to, .. }) if to == p));
        assert_eq!(results[2].as_ref().unwrap().end, a);
    }

    #[test]
    fn non_finite_endpoints_rejected() {
        let graph = detour_graph();
        let router = DualRouter::new(&graph).unwrap();
        let good = at(200.0, 0.0);
        let bad = [
            LatLon::new(f64::NAN, 0.0),
            LatLon::new(0.0, f64::NAN),
            LatLon::new(f64::INFINITY, 0.0),
            LatLon::new(0.0, f64::NEG_INFINITY),
        ];

        for p in bad {
            assert!(matches!(router.resolve(p), Err(RouteError::Core(CoreError::InvalidInput(_)))));
            assert!(matches!(router.route(p, good), Err(RouteError::Core(CoreError::InvalidInput(_)))));
            assert!(matches!(router.route(good, p), Err(RouteError::Core(CoreError::InvalidInput(_)))));
        }

        let queries: Vec<_> = bad.iter().map(|&p| (p, good)).chain([(at(0.0, 0.0), good)]).collect();
        let results = router.route_many(&queries);
        assert_eq!(results.len(), 5);
        for r in &results[..4] {
            assert!(matches!(r, Err(RouteError::Core(CoreError::InvalidInput(_)))));
        }
        assert_eq!(results[4].as_ref().unwrap().end, NodeId(2));
    }
}

// ── Randomised invariants ─────────────────────────────────────────────────────

#[cfg(test)]
mod invariants {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};
    use sr_core::NodeId;
    use sr_spatial::{RiskZone, StreetGraph, StreetGraphBuilder};

    use super::helpers::{CRS, at, c, prepare, square};
    use crate::{DualRouter, EdgeMetric, path_cost};

    const SIDE: usize = 6;
    const SPACING: f64 = 100.0;

    /// SIDE×SIDE grid of two-way streets with jittered lengths, a few extra
    /// parallel edges, random zones and facilities.  Always connected.
    fn random_grid(seed: u64) -> StreetGraph {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut b = StreetGraphBuilder::new(CRS);
        let mut ids: Vec<NodeId> = Vec::with_capacity(SIDE * SIDE);
        for row in 0..SIDE {
            for col in 0..SIDE {
                ids.push(b.add_node(c(col as f64 * SPACING, row as f64 * SPACING)));
            }
        }
        for row in 0..SIDE {
            for col in 0..SIDE {
                let i = row * SIDE + col;
                let mut neighbours = Vec::new();
                if col + 1 < SIDE {
                    neighbours.push(i + 1);
                }
                if row + 1 < SIDE {
                    neighbours.push(i + SIDE);
                }
                for j in neighbours {
                    let len = rng.gen_range(SPACING..1.5 * SPACING);
                    b.add_street(ids[i], ids[j], len, None).unwrap();
                    if rng.gen_bool(0.1) {
                        let extra = rng.gen_range(SPACING..2.0 * SPACING);
                        b.add_edge(ids[i], ids[j], extra, None).unwrap();
                    }
                }
            }
        }
        let mut graph = b.build();

        let extent = SPACING * (SIDE - 1) as f64;
        let zones = (0..8)
            .map(|i| {
                let x0 = rng.gen_range(-50.0..extent);
                let y0 = rng.gen_range(-50.0..extent);
                let w = rng.gen_range(50.0..250.0);
                RiskZone::new(format!("Z{i}"), square(x0, y0, x0 + w, y0 + w), Some(rng.gen_range(0.0..=1.0)))
            })
            .collect();
        let facilities: Vec<_> = (0..3)
            .map(|_| c(rng.gen_range(0.0..extent), rng.gen_range(0.0..extent)))
            .collect();
        prepare(&mut graph, zones, &facilities);
        graph
    }

    #[test]
    fn safest_never_costs_more_than_shortest() {
        let extent = SPACING * (SIDE - 1) as f64;
        for seed in 0..25 {
            let graph = random_grid(seed);
            let router = DualRouter::new(&graph).unwrap();
            let mut rng = SmallRng::seed_from_u64(seed ^ 0x5eed);

            for _ in 0..10 {
                let s = at(rng.gen_range(0.0..extent), rng.gen_range(0.0..extent));
                let e = at(rng.gen_range(0.0..extent), rng.gen_range(0.0..extent));
                let route = router.route(s, e).unwrap();

                let shortest_composite =
                    path_cost(&graph, &route.shortest.nodes, EdgeMetric::Composite).unwrap();
                let safest_length = path_cost(&graph, &route.safest.nodes, EdgeMetric::Length).unwrap();
                assert!(route.safest.cost <= shortest_composite + 1e-9, "seed {seed}");
                assert!(route.shortest.cost <= safest_length + 1e-9, "seed {seed}");
                assert!((route.shortest.cost - route.shortest.length_total).abs() < 1e-6);

                assert!(route.risk_shortest >= 0.0);
                assert!(route.risk_safest >= 0.0);
                if route.start != route.end {
                    assert!(!route.shortest.segments.is_empty());
                    assert!(!route.safest.segments.is_empty());
                    assert!(route.shortest.segments.iter().all(|s| s.len() >= 2));
                }
                assert_eq!(route.shortest.segments.len(), route.shortest.nodes.len() - 1);
                assert_eq!(route.safest.edge_risks.len(), route.safest.nodes.len() - 1);
            }
        }
    }

    #[test]
    fn queries_are_deterministic() {
        let graph = random_grid(7);
        let router = DualRouter::new(&graph).unwrap();
        let queries: Vec<_> = (0..SIDE)
            .map(|k| (at(0.0, 0.0), at(k as f64 * SPACING, (SIDE - 1 - k) as f64 * SPACING)))
            .collect();
        let first = router.route_many(&queries);
        let second = router.route_many(&queries);
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.as_ref().unwrap(), b.as_ref().unwrap());
        }
    }

    /// `route_many` (on Rayon's pool with `--features parallel`) answers
    /// exactly what one-by-one `route` calls do, in query order.
    #[test]
    fn batch_matches_single_queries() {
        let extent = SPACING * (SIDE - 1) as f64;
        for seed in 0..5 {
            let graph = random_grid(seed);
            let router = DualRouter::new(&graph).unwrap();
            let mut rng = SmallRng::seed_from_u64(seed + 100);
            let queries: Vec<_> = (0..40)
                .map(|_| {
                    (
                        at(rng.gen_range(0.0..extent), rng.gen_range(0.0..extent)),
                        at(rng.gen_range(0.0..extent), rng.gen_range(0.0..extent)),
                    )
                })
                .collect();

            let batch = router.route_many(&queries);
            assert_eq!(batch.len(), queries.len());
            for (&(s, e), got) in queries.iter().zip(&batch) {
                assert_eq!(got.as_ref().unwrap(), &router.route(s, e).unwrap(), "seed {seed}");
            }
        }
    }
}
