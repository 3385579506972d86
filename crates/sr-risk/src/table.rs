//! Per-zone risk table.
//!
//! # CSV format
//!
//! One row per zone.  `prediction` is a raw model output on any scale; an
//! empty field means no prediction is available for that zone.
//!
//! ```csv
//! zone_id,prediction
//! UPZ01,132.0
//! UPZ02,87.5
//! UPZ03,
//! ```
//!
//! Predictions are min-max normalised into `[0, 1]` over the non-empty rows.
//! If every prediction is equal the spread is zero and all of them normalise
//! to `0.0`.
//!
//! # Join
//!
//! [`RiskTable::join`] is a left join from zone polygons onto the table:
//! every polygon becomes a [`RiskZone`], and polygons with no row (or an
//! empty prediction) get `risk = None`.

use std::io::Read;
use std::path::Path;

use geo::MultiPolygon;
use log::{debug, warn};
use rustc_hash::FxHashMap;
use serde::Deserialize;

use sr_spatial::RiskZone;

use crate::{RiskError, RiskResult};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct PredictionRecord {
    zone_id:    String,
    prediction: Option<f64>,
}

// ── RiskTable ─────────────────────────────────────────────────────────────────

/// Normalised risk per zone code.
#[derive(Clone, Debug, Default)]
pub struct RiskTable {
    risks: FxHashMap<String, Option<f64>>,
}

impl RiskTable {
    /// Build from raw `(zone code, prediction)` pairs, normalising the
    /// predictions into `[0, 1]`.
    ///
    /// # Errors
    ///
    /// [`RiskError::Parse`] on a duplicate zone code or a non-finite
    /// prediction.
    pub fn from_predictions<I, S>(rows: I) -> RiskResult<Self>
    where
        I: IntoIterator<Item = (S, Option<f64>)>,
        S: Into<String>,
    {
        let rows: Vec<(String, Option<f64>)> =
            rows.into_iter().map(|(code, p)| (code.into(), p)).collect();

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for (code, prediction) in &rows {
            if let Some(p) = *prediction {
                if !p.is_finite() {
                    return Err(RiskError::Parse(format!(
                        "zone {code:?} has non-finite prediction {p}"
                    )));
                }
                min = min.min(p);
                max = max.max(p);
            }
        }
        let spread = max - min;

        let mut risks = FxHashMap::with_capacity_and_hasher(rows.len(), Default::default());
        for (code, prediction) in rows {
            let risk = prediction.map(|p| if spread > 0.0 { (p - min) / spread } else { 0.0 });
            if risks.insert(code.clone(), risk).is_some() {
                return Err(RiskError::Parse(format!("duplicate zone_id {code:?}")));
            }
        }

        debug!("risk table: {} zones, prediction range [{min}, {max}]", risks.len());
        Ok(Self { risks })
    }

    /// Load and normalise a `zone_id,prediction` CSV file.
    pub fn load_csv(path: &Path) -> RiskResult<Self> {
        let file = std::fs::File::open(path).map_err(RiskError::Io)?;
        Self::load_reader(file)
    }

    /// Like [`load_csv`](Self::load_csv) but accepts any `Read` source.
    pub fn load_reader<R: Read>(reader: R) -> RiskResult<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let rows = csv_reader
            .deserialize::<PredictionRecord>()
            .map(|row| {
                row.map(|r| (r.zone_id, r.prediction))
                    .map_err(|e| RiskError::Parse(e.to_string()))
            })
            .collect::<RiskResult<Vec<_>>>()?;
        Self::from_predictions(rows)
    }

    /// Normalised risk for `code`.  `None` if the zone is absent or had no
    /// prediction.
    pub fn risk(&self, code: &str) -> Option<f64> {
        self.risks.get(code).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.risks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.risks.is_empty()
    }

    /// Left-join zone polygons onto this table.
    pub fn join<I, S>(&self, polygons: I) -> Vec<RiskZone>
    where
        I: IntoIterator<Item = (S, MultiPolygon<f64>)>,
        S: Into<String>,
    {
        let zones: Vec<RiskZone> = polygons
            .into_iter()
            .map(|(code, polygon)| {
                let code = code.into();
                let risk = self.risk(&code);
                RiskZone { code, polygon, risk }
            })
            .collect();

        let missing = zones.iter().filter(|z| z.risk.is_none()).count();
        if missing > 0 {
            warn!("{missing} of {} zones have no risk prediction", zones.len());
        }
        zones
    }
}
