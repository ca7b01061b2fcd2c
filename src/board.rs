//! Leaderboard snapshot files.
//!
//! A snapshot maps category names to score blocks:
//!
//! ```json
//! {
//!   "full": {
//!     "elo_rating_final": { "model-a": 1203.4, "model-b": "1187.9" },
//!     "bootstrap_df": { "model-a": { "0": 1201.0, "1": 1206.2 } },
//!     "confidence_intervals": { "model-b": { "low": 1180.0, "high": 1195.5 } }
//!   }
//! }
//! ```
//!
//! Bootstrap samples may be an array or an index-keyed object. Unknown keys
//! in a category are ignored.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::entries::{ConfidenceSource, RatingValue};
use crate::error::BoardError;
use crate::leaderboard::ScoreSnapshot;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SampleSet {
    List(Vec<Option<f64>>),
    Indexed(BTreeMap<String, Option<f64>>),
}

impl SampleSet {
    /// Present sample values; nulls are dropped.
    pub fn values(&self) -> Vec<f64> {
        match self {
            Self::List(values) => values.iter().flatten().copied().collect(),
            Self::Indexed(values) => values.values().flatten().copied().collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntervalRecord {
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
}

/// Scores for one leaderboard category.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryScores {
    #[serde(default)]
    pub elo_rating_final: BTreeMap<String, RatingValue>,
    #[serde(default)]
    pub bootstrap_df: BTreeMap<String, SampleSet>,
    #[serde(default)]
    pub confidence_intervals: BTreeMap<String, IntervalRecord>,
}

impl CategoryScores {
    /// Flatten into a snapshot. Precomputed intervals take precedence over
    /// bootstrap samples for the same id.
    pub fn snapshot(&self) -> ScoreSnapshot {
        let ratings = self
            .elo_rating_final
            .iter()
            .map(|(id, rating)| (id.clone(), rating.clone()))
            .collect();

        let mut confidence: BTreeMap<String, ConfidenceSource> = self
            .bootstrap_df
            .iter()
            .map(|(id, samples)| (id.clone(), ConfidenceSource::Samples(samples.values())))
            .collect();
        for (id, interval) in &self.confidence_intervals {
            confidence.insert(
                id.clone(),
                ConfidenceSource::Bounds {
                    low: interval.low,
                    high: interval.high,
                },
            );
        }

        ScoreSnapshot {
            ratings,
            confidence,
        }
    }
}

/// A loaded snapshot file.
#[derive(Debug, Clone, Default)]
pub struct Board {
    categories: BTreeMap<String, CategoryScores>,
}

impl Board {
    pub fn from_json(raw: &str) -> Result<Self, BoardError> {
        let categories: BTreeMap<String, CategoryScores> = serde_json::from_str(raw)?;
        Ok(Self { categories })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, BoardError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    pub fn category_names(&self) -> Vec<&str> {
        self.categories.keys().map(String::as_str).collect()
    }

    pub fn category(&self, name: &str) -> Result<&CategoryScores, BoardError> {
        self.categories
            .get(name)
            .ok_or_else(|| BoardError::UnknownCategory {
                name: name.to_string(),
                available: self.category_names().join(", "),
            })
    }
}
