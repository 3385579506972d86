//! `sr-core` — foundational types for the `saferoute` workspace.
//!
//! This crate is a dependency of every other `sr-*` crate.  It intentionally
//! has no `sr-*` dependencies and minimal external ones (only `geo` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `EdgeId`, `ZoneId`                          |
//! | [`coords`]      | `LatLon`, `Crs`, arc-length interpolation helpers     |
//! | [`config`]      | `WeightingConfig`, `RiskConfig`                       |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public value types.  |

pub mod config;
pub mod coords;
pub mod error;
pub mod ids;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{RiskConfig, WeightingConfig};
pub use coords::{Crs, LatLon, midpoint, point_at_fraction, straight_segment};
pub use error::{CoreError, CoreResult};
pub use ids::{EdgeId, NodeId, ZoneId};
