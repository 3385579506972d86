//! One-call graph preparation.

use sr_core::{RiskConfig, WeightingConfig};
use sr_spatial::{SpatialIndex, StreetGraph};

use crate::{AssignmentStats, CompositeWeighter, RiskAssigner, RiskResult, WeightingStats};

/// Statistics from both preparation stages.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PreparationReport {
    pub assignment: AssignmentStats,
    pub weighting:  WeightingStats,
}

/// Run risk assignment, then weighting, on `graph`.
///
/// This is the whole mutation phase of a session: when it returns `Ok`,
/// [`StreetGraph::is_prepared`] holds and the graph can be shared read-only
/// with any number of routers.
pub fn prepare_graph(
    graph:     &mut StreetGraph,
    index:     &SpatialIndex,
    risk:      RiskConfig,
    weighting: WeightingConfig,
) -> RiskResult<PreparationReport> {
    let assigner = RiskAssigner::new(index, risk)?;
    let weighter = CompositeWeighter::new(weighting)?;

    let assignment = assigner.assign(graph)?;
    let weighting = weighter.weight(graph)?;
    Ok(PreparationReport { assignment, weighting })
}
