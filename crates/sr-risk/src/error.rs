use thiserror::Error;

use sr_core::{CoreError, EdgeId};
use sr_spatial::SpatialError;

#[derive(Debug, Error)]
pub enum RiskError {
    /// An edge lacks an attribute that cannot be synthesised.
    #[error("edge {edge} has no usable {attribute}")]
    MissingAttribute {
        edge:      EdgeId,
        attribute: &'static str,
    },

    #[error("facility layer is empty: no facility distance can be assigned")]
    NoFacilities,

    #[error("risk table parse error: {0}")]
    Parse(String),

    #[error("spatial error: {0}")]
    Spatial(#[from] SpatialError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RiskResult<T> = Result<T, RiskError>;
