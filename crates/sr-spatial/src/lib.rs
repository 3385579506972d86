//! `sr-spatial` — street graph, input layers, and spatial indexing.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`network`] | `StreetGraph` (CSR multigraph + R-tree), `StreetGraphBuilder`, `EdgeAttrs` |
//! | [`layers`]  | `RiskZone`, `ZoneLayer`, `FacilityLayer`                      |
//! | [`index`]   | `SpatialIndex`: zone candidates and nearest facility          |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                            |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public value types.     |

pub mod error;
pub mod index;
pub mod layers;
pub mod network;


pub use error::{SpatialError, SpatialResult};
pub use index::SpatialIndex;
pub use layers::{FacilityLayer, RiskZone, ZoneLayer};
pub use network::{EdgeAttrs, StreetGraph, StreetGraphBuilder};
