//! Routing error type.

use thiserror::Error;

use sr_core::{CoreError, EdgeId, NodeId};

/// Errors produced by `sr-route`.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The two nodes lie in different components of the directed graph.
    #[error("no path from {from} to {to}")]
    NoPath { from: NodeId, to: NodeId },

    /// A query point could not be snapped because the graph has no nodes.
    #[error("street graph has no nodes")]
    EmptyGraph,

    /// Risk assignment and weighting have not both run on the graph.
    #[error("street graph is not prepared; run risk assignment and weighting first")]
    Unprepared,

    #[error("node {0} not found in street graph")]
    NodeNotFound(NodeId),

    #[error("edge {edge} has no usable {attribute}")]
    MissingAttribute {
        edge:      EdgeId,
        attribute: &'static str,
    },

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type RouteResult<T> = Result<T, RouteError>;
