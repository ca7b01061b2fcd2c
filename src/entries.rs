//! Entry building: ratings + confidence data -> ranked-entry records.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::BoardError;

/// Lower percentile of the bootstrap distribution used as `ci_low`.
pub const CI_LOW_QUANTILE: f64 = 0.025;
/// Upper percentile of the bootstrap distribution used as `ci_high`.
pub const CI_HIGH_QUANTILE: f64 = 0.975;

/// One ranked leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub rating: f64,
    pub ci_low: f64,
    pub ci_high: f64,
    /// 1-based display rank; 0 until ranks are assigned.
    pub rank: usize,
}

impl Entry {
    /// Entry with no confidence data: both bounds collapse to the rating.
    pub fn point(id: impl Into<String>, rating: f64) -> Self {
        Self {
            id: id.into(),
            rating,
            ci_low: rating,
            ci_high: rating,
            rank: 0,
        }
    }

    pub fn with_bounds(id: impl Into<String>, rating: f64, ci_low: f64, ci_high: f64) -> Self {
        Self {
            id: id.into(),
            rating,
            ci_low,
            ci_high,
            rank: 0,
        }
    }
}

/// A rating as supplied by the score source: numeric or string-encoded.
///
/// Any other JSON value is kept as `Other` so that coercion can reject it
/// with the offending id instead of failing the whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RatingValue {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl RatingValue {
    /// Coerce to a finite number, or fail naming `id`.
    pub fn coerce(&self, id: &str) -> Result<f64, BoardError> {
        let parsed = match self {
            Self::Number(v) => Some(*v),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
            Self::Other(_) => None,
        };
        match parsed {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(BoardError::invalid_rating(id, self.to_string())),
        }
    }
}

impl fmt::Display for RatingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
            Self::Other(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for RatingValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for RatingValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Confidence information for one id.
///
/// Deserializes from a bare sample array, `{ "sampleValues": [...] }`, or
/// `{ "low": .., "high": .. }`. Objects with any other key are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged, from = "ConfidenceRecord")]
pub enum ConfidenceSource {
    /// Bootstrap-resampled ratings.
    Samples(Vec<f64>),
    /// Precomputed interval; either side may be missing.
    Bounds { low: Option<f64>, high: Option<f64> },
}

#[derive(Deserialize)]
#[serde(untagged, deny_unknown_fields)]
enum ConfidenceRecord {
    List(Vec<f64>),
    Keyed {
        #[serde(rename = "sampleValues", alias = "sample_values")]
        sample_values: Vec<f64>,
    },
    Bounds {
        #[serde(default)]
        low: Option<f64>,
        #[serde(default)]
        high: Option<f64>,
    },
}

impl From<ConfidenceRecord> for ConfidenceSource {
    fn from(record: ConfidenceRecord) -> Self {
        match record {
            ConfidenceRecord::List(samples)
            | ConfidenceRecord::Keyed {
                sample_values: samples,
            } => Self::Samples(samples),
            ConfidenceRecord::Bounds { low, high } => Self::Bounds { low, high },
        }
    }
}

impl ConfidenceSource {
    pub fn bounds(low: f64, high: f64) -> Self {
        Self::Bounds {
            low: Some(low),
            high: Some(high),
        }
    }

    /// Resolve to `(low, high)`, falling back to `rating` per side.
    pub fn resolve(&self, rating: f64) -> (f64, f64) {
        let (low, high) = match self {
            Self::Samples(samples) => sample_bounds(samples),
            Self::Bounds { low, high } => (*low, *high),
        };
        (finite_or(low, rating), finite_or(high, rating))
    }
}

fn finite_or(value: Option<f64>, fallback: f64) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => fallback,
    }
}

/// Percentile picks over sorted samples: `floor(n * q)`.
fn sample_bounds(samples: &[f64]) -> (Option<f64>, Option<f64>) {
    if samples.is_empty() {
        return (None, None);
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    let pick = |q: f64| {
        let idx = ((n as f64) * q).floor() as usize;
        sorted.get(idx.min(n - 1)).copied()
    };
    (pick(CI_LOW_QUANTILE), pick(CI_HIGH_QUANTILE))
}

/// Build one entry per rated id, in input order.
///
/// Ids without confidence data get point bounds. Duplicate ids keep the first
/// occurrence. A rating that is not a finite number fails the whole build.
pub fn build_entries<'a, I>(
    ratings: I,
    confidence: &BTreeMap<String, ConfidenceSource>,
) -> Result<Vec<Entry>, BoardError>
where
    I: IntoIterator<Item = (&'a str, &'a RatingValue)>,
{
    let mut seen: HashSet<&str> = HashSet::new();
    let mut entries = Vec::new();

    for (id, raw) in ratings {
        if !seen.insert(id) {
            warn!(id, "duplicate rating id; keeping first occurrence");
            continue;
        }
        let rating = raw.coerce(id)?;
        let entry = match confidence.get(id) {
            Some(source) => {
                let (ci_low, ci_high) = source.resolve(rating);
                if ci_low == rating && ci_high == rating {
                    debug!(id, "confidence data degraded to point rating");
                }
                Entry::with_bounds(id, rating, ci_low, ci_high)
            }
            None => Entry::point(id, rating),
        };
        entries.push(entry);
    }

    Ok(entries)
}

/// Rating-descending comparator; ties compare equal so a stable sort keeps
/// input order.
pub(crate) fn by_rating_desc(a: &Entry, b: &Entry) -> Ordering {
    b.rating.total_cmp(&a.rating)
}
