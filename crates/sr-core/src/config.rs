//! Tunable weighting and risk-assignment configuration.
//!
//! # Composite edge cost
//!
//! ```text
//! composite_weight = alpha · length
//!                  + beta  · (risk · risk_scale)
//!                  + gamma · facility_distance
//! ```
//!
//! `risk` is normalised to `[0, 1]` while `length` is in metres, so
//! `risk_scale` (default 1000) lifts risk into the magnitude of a typical
//! street segment.  `facility_distance` is used raw, in CRS units.
//!
//! Both structs are plain data.  Applications typically load them from a
//! JSON/TOML file (feature `serde`) and pass them into the pipeline.

use crate::CoreError;

// ── WeightingConfig ───────────────────────────────────────────────────────────

/// Linear coefficients for the composite ("safest") edge cost.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeightingConfig {
    /// Weight on physical edge length.
    pub alpha: f64,
    /// Weight on scaled zone risk.
    pub beta: f64,
    /// Weight on distance to the nearest safety facility.
    pub gamma: f64,
    /// Multiplier applied to `risk` before `beta`.
    pub risk_scale: f64,
}

impl WeightingConfig {
    pub const DEFAULT_RISK_SCALE: f64 = 1_000.0;

    /// Distance + risk only; facility proximity is ignored.
    pub fn legacy() -> Self {
        Self {
            alpha:      0.7,
            beta:       0.3,
            gamma:      0.0,
            risk_scale: Self::DEFAULT_RISK_SCALE,
        }
    }

    /// Reject negative or non-finite coefficients.  Non-negative terms are
    /// what keep every composite weight usable by Dijkstra.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (name, value) in [
            ("alpha", self.alpha),
            ("beta", self.beta),
            ("gamma", self.gamma),
            ("risk_scale", self.risk_scale),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(CoreError::Config(format!(
                    "weighting coefficient {name} must be finite and >= 0, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Composite cost of one edge.
    #[inline]
    pub fn composite(&self, length: f64, risk: f64, facility_distance: f64) -> f64 {
        self.alpha * length
            + self.beta * (risk * self.risk_scale)
            + self.gamma * facility_distance
    }
}

impl Default for WeightingConfig {
    /// `alpha = 0.7`, `beta = 0.2`, `gamma = 0.1`, `risk_scale = 1000`.
    fn default() -> Self {
        Self {
            alpha:      0.7,
            beta:       0.2,
            gamma:      0.1,
            risk_scale: Self::DEFAULT_RISK_SCALE,
        }
    }
}

// ── RiskConfig ────────────────────────────────────────────────────────────────

/// Fallback risk values used by the spatial join.
///
/// Both default to `0.0`: an edge outside every zone, or inside a zone with no
/// prediction, is treated as carrying no additional risk.  That conflates
/// "known safe" with "unknown"; override here rather than in the join.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RiskConfig {
    /// Risk for an edge whose midpoint lies in no zone.
    pub unmatched_risk: f64,
    /// Risk for an edge whose containing zone has a null risk value.
    pub null_zone_risk: f64,
}

impl RiskConfig {
    pub fn validate(&self) -> Result<(), CoreError> {
        for (name, value) in [
            ("unmatched_risk", self.unmatched_risk),
            ("null_zone_risk", self.null_zone_risk),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(CoreError::Config(format!(
                    "{name} must lie in [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self { unmatched_risk: 0.0, null_zone_risk: 0.0 }
    }
}
