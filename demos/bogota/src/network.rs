//! Synthetic Bogotá street grid and risk layers.
//!
//! A 7×7 grid of two-way streets at 0.01° spacing over central Bogotá, nine
//! square UPZ-like zones on top, and a handful of police posts.  Everything
//! is laid out in geographic degrees and then projected to planar metres in
//! MAGNA-SIRGAS / Colombia Bogotá (EPSG:3116), so street lengths, zone
//! shapes and facility distances all share one unit.

use geo::{Coord, Geometry, LineString, MultiPolygon, Point, Rect};

use sr_core::{Crs, LatLon, NodeId};
use sr_spatial::{FacilityLayer, StreetGraph, StreetGraphBuilder};

pub const CRS: Crs = Crs::epsg(3116);

const ROWS: usize = 7;
const COLS: usize = 7;
const LAT0: f64 = 4.600;
const LON0: f64 = -74.100;
const STEP: f64 = 0.010;

// ── Projection ────────────────────────────────────────────────────────────────

// EPSG:3116 origin and false easting/northing.
const ORIGIN_LAT: f64 = 4.596_200_417;
const ORIGIN_LON: f64 = -74.077_507_917;
const FALSE_EASTING: f64 = 1_000_000.0;
const FALSE_NORTHING: f64 = 1_000_000.0;
// Metres per degree at the origin latitude.
const M_PER_DEG_LAT: f64 = 110_574.0;
const M_PER_DEG_LON: f64 = 110_961.0;

/// Geographic `(lat, lon)` to EPSG:3116 `(x, y)`.
///
/// Linearised about the projection origin, which is close enough for a
/// demo grid a few kilometres across.
pub fn project(p: LatLon) -> Coord<f64> {
    Coord {
        x: FALSE_EASTING + (p.lon - ORIGIN_LON) * M_PER_DEG_LON,
        y: FALSE_NORTHING + (p.lat - ORIGIN_LAT) * M_PER_DEG_LAT,
    }
}

/// Inverse of [`project`].
pub fn unproject(c: Coord<f64>) -> LatLon {
    LatLon::new(
        ORIGIN_LAT + (c.y - FALSE_NORTHING) / M_PER_DEG_LAT,
        ORIGIN_LON + (c.x - FALSE_EASTING) / M_PER_DEG_LON,
    )
}

fn geo_coord(lat: f64, lon: f64) -> Coord<f64> {
    project(LatLon::new(lat, lon))
}

// ── Risk predictions ──────────────────────────────────────────────────────────

// Raw model output per zone.  UPZ08 has no prediction.
pub const PREDICTIONS_CSV: &str = "\
zone_id,prediction\n\
UPZ01,12.0\n\
UPZ02,48.5\n\
UPZ03,20.0\n\
UPZ04,35.0\n\
UPZ05,96.0\n\
UPZ06,41.0\n\
UPZ07,8.0\n\
UPZ08,\n\
UPZ09,27.5\n\
";

fn node_coord(row: usize, col: usize) -> Coord<f64> {
    geo_coord(LAT0 + row as f64 * STEP, LON0 + col as f64 * STEP)
}

fn metres(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

fn polyline_metres(line: &LineString<f64>) -> f64 {
    line.0.windows(2).map(|w| metres(w[0], w[1])).sum()
}

/// Build the street graph.
///
/// East-west streets on odd rows follow a slight northward bend and carry
/// their geometry; all other streets are straight with no geometry.  The
/// middle avenue (row 3) also has a slower service road running alongside
/// it as a parallel edge.
pub fn build_network() -> anyhow::Result<StreetGraph> {
    let mut b = StreetGraphBuilder::with_capacity(CRS, ROWS * COLS, 4 * ROWS * COLS);
    let mut ids: Vec<NodeId> = Vec::with_capacity(ROWS * COLS);
    for row in 0..ROWS {
        for col in 0..COLS {
            ids.push(b.add_node(node_coord(row, col)));
        }
    }

    for row in 0..ROWS {
        for col in 0..COLS {
            let here = node_coord(row, col);
            if col + 1 < COLS {
                let east = node_coord(row, col + 1);
                let (a, z) = (ids[row * COLS + col], ids[row * COLS + col + 1]);
                if row % 2 == 1 {
                    let bend = Coord { x: (here.x + east.x) / 2.0, y: here.y + STEP * 0.08 * M_PER_DEG_LAT };
                    let line = LineString::new(vec![here, bend, east]);
                    b.add_street(a, z, polyline_metres(&line), Some(line))?;
                } else {
                    b.add_street(a, z, metres(here, east), None)?;
                }
                if row == ROWS / 2 {
                    b.add_street(a, z, metres(here, east) * 1.15, None)?;
                }
            }
            if row + 1 < ROWS {
                let north = node_coord(row + 1, col);
                b.add_street(ids[row * COLS + col], ids[(row + 1) * COLS + col], metres(here, north), None)?;
            }
        }
    }
    Ok(b.build())
}

/// UPZ polygons: a 3×3 tiling of the grid, coded `UPZ01`..`UPZ09` row by row
/// from the south-west.
pub fn zone_polygons() -> Vec<(String, MultiPolygon<f64>)> {
    let (lat_min, lon_min) = (LAT0 - STEP / 2.0, LON0 - STEP / 2.0);
    let span = STEP * COLS as f64 / 3.0;
    let mut out = Vec::with_capacity(9);
    for zr in 0..3 {
        for zc in 0..3 {
            let (lat, lon) = (lat_min + zr as f64 * span, lon_min + zc as f64 * span);
            let lo = geo_coord(lat, lon);
            let hi = geo_coord(lat + span, lon + span);
            let code = format!("UPZ{:02}", zr * 3 + zc + 1);
            out.push((code, MultiPolygon::from(Rect::new(lo, hi).to_polygon())));
        }
    }
    out
}

/// Police posts.  The station on the east side is a building footprint and
/// is reduced to its centroid by the spatial index.
pub fn facilities() -> FacilityLayer {
    let posts = [(4.605, -74.095), (4.615, -74.055), (4.655, -74.085)]
        .into_iter()
        .map(|(lat, lon)| Geometry::Point(Point::from(geo_coord(lat, lon))));
    let station = Rect::new(geo_coord(4.644, -74.044), geo_coord(4.647, -74.041)).to_polygon();

    let mut layer = FacilityLayer::new(CRS, posts.collect());
    layer.geometries.push(Geometry::Polygon(station));
    layer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_maps_to_false_origin() {
        let c = project(LatLon::new(ORIGIN_LAT, ORIGIN_LON));
        assert_eq!(c, Coord { x: FALSE_EASTING, y: FALSE_NORTHING });
        let back = unproject(project(LatLon::new(4.63, -74.07)));
        assert!((back.lat - 4.63).abs() < 1e-9 && (back.lon + 74.07).abs() < 1e-9);
    }

    #[test]
    fn grid_is_in_metres() {
        let graph = build_network().unwrap();
        assert_eq!(graph.crs, CRS);
        // 0.01° is a little over a kilometre at this latitude.
        let (a, b) = (node_coord(0, 0), node_coord(0, 1));
        assert!((metres(a, b) - 1_109.61).abs() < 0.01);
        let (a, b) = (node_coord(0, 0), node_coord(1, 0));
        assert!((metres(a, b) - 1_105.74).abs() < 0.01);
    }
}
