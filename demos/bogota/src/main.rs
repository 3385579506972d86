//! bogota — shortest vs. lowest-risk routing on a synthetic Bogotá grid.
//!
//! ```text
//! bogota [START END] [--weights weights.json] [--json]
//! ```
//!
//! `START` and `END` are `"lat, lon"` strings.  `--weights` loads a
//! `WeightingConfig` (`alpha`, `beta`, `gamma`, `risk_scale`) from JSON;
//! `--json` prints the full `DualRoute` instead of the summary.
//!
//! Set `RUST_LOG=debug` for per-query detail.

mod network;

use std::io::Cursor;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use log::info;

use sr_core::{LatLon, RiskConfig, WeightingConfig};
use sr_risk::{RiskTable, prepare_graph};
use sr_route::{DualRoute, DualRouter, RouteCoordinates};
use sr_spatial::{SpatialIndex, ZoneLayer};

use network::{CRS, PREDICTIONS_CSV, build_network, facilities, project, unproject, zone_polygons};

// ── Defaults ──────────────────────────────────────────────────────────────────

// South-west corner to north-east corner, straight through UPZ05.
const DEFAULT_START: &str = "4.600, -74.100";
const DEFAULT_END:   &str = "4.660, -74.040";

// ── Arguments ─────────────────────────────────────────────────────────────────

struct Args {
    start:   LatLon,
    end:     LatLon,
    weights: Option<PathBuf>,
    json:    bool,
}

fn parse_args() -> Result<Args> {
    let mut positional = Vec::new();
    let mut weights = None;
    let mut json = false;

    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--weights" => {
                let path = it.next().context("--weights needs a file path")?;
                weights = Some(PathBuf::from(path));
            }
            "--json" => json = true,
            _ => positional.push(arg),
        }
    }

    let (start, end) = match positional.as_slice() {
        [] => (DEFAULT_START, DEFAULT_END),
        [s, e] => (s.as_str(), e.as_str()),
        _ => bail!("expected START and END as \"lat, lon\", or neither"),
    };
    Ok(Args {
        start: start.parse().with_context(|| format!("start {start:?}"))?,
        end:   end.parse().with_context(|| format!("end {end:?}"))?,
        weights,
        json,
    })
}

fn load_weights(path: Option<&PathBuf>) -> Result<WeightingConfig> {
    let Some(path) = path else {
        return Ok(WeightingConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let config: WeightingConfig = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    info!("weights from {}: {config:?}", path.display());
    Ok(config)
}

// ── Projection ────────────────────────────────────────────────────────────────

/// Graph-space query point for a geographic position.  The router reads
/// `LatLon` as `(y, x)` in the graph CRS.
fn to_graph(p: LatLon) -> LatLon {
    LatLon::from_coord(project(p))
}

/// Rewrite route coordinates from EPSG:3116 back to geographic degrees.
fn to_geographic(route: &mut DualRoute) {
    for coords in [&mut route.shortest, &mut route.safest] {
        for p in coords.segments.iter_mut().flatten() {
            *p = unproject(p.to_coord());
        }
    }
}

// ── Output ────────────────────────────────────────────────────────────────────

fn print_route(label: &str, route: &RouteCoordinates) {
    println!(
        "{label:<9} {:>4} segments  {:>8.0} m  risk {:>6.3}  cost {:>10.1}",
        route.segments.len(),
        route.length_total,
        route.risk_total,
        route.cost
    );
}

fn print_summary(route: &DualRoute) {
    println!("{:<9} {:>13}  {:>10}  {:>10}  {:>15}", "Route", "Segments", "Length", "Risk", "Cost");
    println!("{}", "-".repeat(66));
    print_route("shortest", &route.shortest);
    print_route("safest", &route.safest);
    println!();

    if route.safest_improves() {
        println!(
            "Safer alternative: {:.3} less risk for {:.0} m extra.",
            route.risk_shortest - route.risk_safest,
            route.safest.length_total - route.shortest.length_total
        );
    } else {
        println!("The shortest route is already the lowest-risk option.");
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args()?;
    let weights = load_weights(args.weights.as_ref())?;

    println!("=== bogota — shortest vs. lowest-risk routing ===");
    println!("From {}  to {}", args.start, args.end);
    println!();

    // 1. Street graph.
    let mut graph = build_network()?;
    println!("Street graph: {} nodes, {} edges ({CRS})", graph.node_count(), graph.edge_count());

    // 2. Risk zones: normalise predictions and join them onto the UPZ polygons.
    let table = RiskTable::load_reader(Cursor::new(PREDICTIONS_CSV))?;
    let zones = ZoneLayer::new(CRS, table.join(zone_polygons()));
    let index = SpatialIndex::build(CRS, zones, facilities())?;
    println!("Risk zones: {}  |  Facilities: {}", index.zone_count(), index.facility_count());

    // 3. Enrich every edge once, then freeze the graph.
    let t0 = Instant::now();
    let report = prepare_graph(&mut graph, &index, RiskConfig::default(), weights)?;
    println!(
        "Prepared in {:.3} ms: {} edges in a scored zone, {} unscored, {} outside; {} geometries synthesised",
        t0.elapsed().as_secs_f64() * 1e3,
        report.assignment.matched,
        report.assignment.null_risk,
        report.assignment.unmatched,
        report.weighting.synthesized_geometries
    );
    println!();

    // 4. Route.
    let router = DualRouter::new(&graph)?;
    let mut route = router.route(to_graph(args.start), to_graph(args.end))?;
    to_geographic(&mut route);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&route)?);
    } else {
        print_summary(&route);
    }
    Ok(())
}
