//! `sr-route` — dual routing over a prepared street graph.
//!
//! Every query returns two paths between the same pair of nodes: the
//! shortest by physical length and the safest by composite weight, each with
//! its display coordinates and summed zone risk.
//!
//! # Crate layout
//!
//! | Module       | Contents                                              |
//! |--------------|-------------------------------------------------------|
//! | [`dijkstra`] | `EdgeMetric`, `Path`, `shortest_path`, `path_cost`    |
//! | [`router`]   | `DualRouter`: snapping, both searches, batches        |
//! | [`route`]    | `RouteCoordinates`, `DualRoute`                       |
//! | [`error`]    | `RouteError`, `RouteResult<T>`                        |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `serde`    | Derives `Serialize`/`Deserialize` on route results.     |
//! | `parallel` | `DualRouter::route_many` runs queries on Rayon.         |

pub mod dijkstra;
pub mod error;
pub mod route;
pub mod router;

#[cfg(test)]
mod tests;

pub use dijkstra::{EdgeMetric, Path, path_cost, shortest_path};
pub use error::{RouteError, RouteResult};
pub use route::{DualRoute, RouteCoordinates};
pub use router::DualRouter;
