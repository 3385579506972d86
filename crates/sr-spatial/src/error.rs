//! Spatial-subsystem error type.

use thiserror::Error;

use sr_core::{Crs, NodeId};

/// Errors produced by `sr-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    /// A layer was not reprojected into the street graph's CRS.
    #[error("{layer} layer is in {found}, expected {expected}")]
    CrsMismatch {
        layer:    &'static str,
        expected: Crs,
        found:    Crs,
    },

    #[error("node {0} not found in street graph")]
    NodeNotFound(NodeId),

    #[error("invalid layer data: {0}")]
    InvalidData(String),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
