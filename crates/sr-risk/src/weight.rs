//! Composite edge weighting and geometry normalisation.
//!
//! After [`CompositeWeighter::weight`] every edge has a geometry (a straight
//! endpoint segment is synthesised where the source had none, or had fewer
//! than two vertices) and a `composite_weight` from
//! [`WeightingConfig::composite`].  Downstream code may rely on both.

use log::{info, warn};

use sr_core::{EdgeId, WeightingConfig};
use sr_spatial::StreetGraph;

use crate::{RiskError, RiskResult};

/// Summary of one [`CompositeWeighter::weight`] pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct WeightingStats {
    pub edges: usize,
    /// Edges that received a synthesised straight-segment geometry.
    pub synthesized_geometries: usize,
}

pub struct CompositeWeighter {
    config: WeightingConfig,
}

impl CompositeWeighter {
    pub fn new(config: WeightingConfig) -> RiskResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &WeightingConfig {
        &self.config
    }

    /// Normalise geometries and compute `composite_weight` for every edge.
    ///
    /// # Errors
    ///
    /// [`RiskError::MissingAttribute`] if an edge length is negative or not
    /// finite.  Lengths are checked before anything is written, so the graph
    /// is left untouched on error.
    pub fn weight(&self, graph: &mut StreetGraph) -> RiskResult<WeightingStats> {
        if let Some(bad) = graph.edges.iter().position(|e| !(e.length.is_finite() && e.length >= 0.0)) {
            return Err(RiskError::MissingAttribute {
                edge:      EdgeId(bad as u32),
                attribute: "length",
            });
        }
        if !graph.is_risk_assigned() {
            warn!("weighting edges before risk assignment; risk and facility distance are still 0");
        }

        let mut stats = WeightingStats { edges: graph.edge_count(), ..Default::default() };
        for i in 0..graph.edge_count() {
            let edge = EdgeId(i as u32);
            let needs_geometry = match &graph.edges[i].geometry {
                None => true,
                Some(g) if g.0.len() < 2 => {
                    warn!("edge {edge} has a degenerate geometry; replacing it with its endpoint segment");
                    true
                }
                Some(_) => false,
            };
            if needs_geometry {
                let segment = graph.endpoint_segment(edge);
                graph.edges[i].geometry = Some(segment);
                stats.synthesized_geometries += 1;
            }

            let attrs = &mut graph.edges[i];
            attrs.composite_weight =
                self.config.composite(attrs.length, attrs.risk, attrs.facility_distance);
        }
        graph.mark_weighted();

        info!(
            "composite weights computed for {} edges (alpha {}, beta {}, gamma {}); {} geometries synthesised",
            stats.edges,
            self.config.alpha,
            self.config.beta,
            self.config.gamma,
            stats.synthesized_geometries
        );
        Ok(stats)
    }
}
