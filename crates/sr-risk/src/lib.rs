//! `sr-risk` — fuse zone risk and facility proximity into street edges.
//!
//! # Pipeline
//!
//! ```text
//! RiskTable::load_csv ──► RiskTable::join ──► ZoneLayer ─┐
//!                                         FacilityLayer ─┴─► SpatialIndex
//!
//! StreetGraph ──► RiskAssigner::assign      (risk, facility_distance)
//!             ──► CompositeWeighter::weight (geometry, composite_weight)
//!             ──► ready for routing
//! ```
//!
//! [`prepare_graph`] runs both mutating stages in order.  Once it returns,
//! the graph is read-only for the rest of the session.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Computes per-edge annotations on Rayon's thread pool.  |

pub mod assign;
pub mod error;
pub mod pipeline;
pub mod table;
pub mod weight;


pub use assign::{AssignmentStats, EdgeAnnotation, RiskAssigner, ZoneMatch, edge_midpoint};
pub use error::{RiskError, RiskResult};
pub use pipeline::{PreparationReport, prepare_graph};
pub use table::RiskTable;
pub use weight::{CompositeWeighter, WeightingStats};
