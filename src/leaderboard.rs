//! End-to-end leaderboard run: build entries, band ranks, filter.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::attributes::AttributeTable;
use crate::entries::{build_entries, ConfidenceSource, Entry, RatingValue};
use crate::error::BoardError;
use crate::filter::{filter_entries, FilterConfig, FilterStats};
use crate::rank::{rank_entries, RankConfig};

/// Ratings plus confidence data for one leaderboard, as supplied by the
/// score source. Rating order is the tie-break order for equal ratings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub ratings: Vec<(String, RatingValue)>,
    #[serde(default)]
    pub confidence: BTreeMap<String, ConfidenceSource>,
}

impl ScoreSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rating(mut self, id: impl Into<String>, rating: impl Into<RatingValue>) -> Self {
        self.ratings.push((id.into(), rating.into()));
        self
    }

    pub fn with_confidence(mut self, id: impl Into<String>, source: ConfidenceSource) -> Self {
        self.confidence.insert(id.into(), source);
        self
    }

    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }
}

/// Visible entries, sorted by rating descending, with their ranks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedBoard {
    pub entries: Vec<Entry>,
    pub stats: FilterStats,
}

/// Rank and filter one snapshot.
///
/// Ranks are assigned before any filtering, so a text search or price filter
/// never changes the rank a model is shown with. Whether entries hidden by the
/// display policy consume rank slots is controlled by `rank.counting`.
pub fn rank_and_filter(
    snapshot: &ScoreSnapshot,
    attrs: &AttributeTable,
    rank: &RankConfig,
    filter: &FilterConfig,
) -> Result<RankedBoard, BoardError> {
    let mut entries = build_entries(
        snapshot.ratings.iter().map(|(id, r)| (id.as_str(), r)),
        &snapshot.confidence,
    )?;
    rank_entries(&mut entries, rank, filter.display_policy, attrs);
    debug!(
        entries = entries.len(),
        banding = ?rank.banding,
        counting = ?rank.counting,
        "ranked leaderboard"
    );

    let (entries, stats) = filter_entries(entries, attrs, filter);
    Ok(RankedBoard { entries, stats })
}
