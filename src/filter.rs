//! Filter pipeline.
//!
//! Stages run in a fixed order, each narrowing the output of the previous
//! one: text search, open-source toggle, price tiers, display policy. The
//! display policy runs last and only sees what the earlier stages kept.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::attributes::AttributeTable;
use crate::entries::Entry;
use crate::policy::DisplayPolicy;
use crate::pricing::{price_tier, PriceTier};

/// Per-run viewer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Case-insensitive substrings; an id matching any of them is kept.
    pub search: Vec<String>,
    /// Keep only models known to be open source.
    pub open_source_only: bool,
    /// Empty means "any price, including unknown".
    pub price_tiers: BTreeSet<PriceTier>,
    pub display_policy: DisplayPolicy,
    /// Multiplier applied to the stored price before tier lookup.
    pub price_scale: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            search: Vec::new(),
            open_source_only: false,
            price_tiers: BTreeSet::new(),
            display_policy: DisplayPolicy::ShowAll,
            price_scale: 1.0,
        }
    }
}

/// How many entries each stage removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStats {
    pub input: usize,
    pub removed_by_search: usize,
    pub removed_by_source: usize,
    pub removed_by_price: usize,
    pub removed_by_policy: usize,
    pub visible: usize,
}

/// Lowercased search terms with empty strings dropped. Whitespace is kept
/// as part of the term.
pub fn normalize_terms(terms: &[String]) -> Vec<String> {
    terms
        .iter()
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

/// OR-of-substrings match. No terms means everything matches.
pub fn matches_search(id: &str, normalized_terms: &[String]) -> bool {
    if normalized_terms.is_empty() {
        return true;
    }
    let id = id.to_lowercase();
    normalized_terms.iter().any(|term| id.contains(term.as_str()))
}

pub fn passes_source_filter(entry: &Entry, attrs: &AttributeTable, open_only: bool) -> bool {
    !open_only || attrs.get(&entry.id).is_open_source()
}

/// Unknown prices fail as soon as any tier is selected.
pub fn passes_price_filter(
    entry: &Entry,
    attrs: &AttributeTable,
    tiers: &BTreeSet<PriceTier>,
    price_scale: f64,
) -> bool {
    if tiers.is_empty() {
        return true;
    }
    let price = attrs.get(&entry.id).price.map(|p| p * price_scale);
    price_tier(price).is_some_and(|tier| tiers.contains(&tier))
}

/// Run every stage over `entries`, preserving their order.
pub fn filter_entries(
    entries: Vec<Entry>,
    attrs: &AttributeTable,
    config: &FilterConfig,
) -> (Vec<Entry>, FilterStats) {
    let mut stats = FilterStats {
        input: entries.len(),
        ..FilterStats::default()
    };
    let terms = normalize_terms(&config.search);

    let candidates: Vec<Entry> = entries
        .into_iter()
        .filter(|entry| {
            if !matches_search(&entry.id, &terms) {
                stats.removed_by_search += 1;
                return false;
            }
            if !passes_source_filter(entry, attrs, config.open_source_only) {
                stats.removed_by_source += 1;
                return false;
            }
            if !passes_price_filter(entry, attrs, &config.price_tiers, config.price_scale) {
                stats.removed_by_price += 1;
                return false;
            }
            true
        })
        .collect();

    let before_policy = candidates.len();
    let visible = config.display_policy.apply(candidates, attrs);
    stats.removed_by_policy = before_policy - visible.len();
    stats.visible = visible.len();

    debug!(
        input = stats.input,
        search = stats.removed_by_search,
        source = stats.removed_by_source,
        price = stats.removed_by_price,
        policy = stats.removed_by_policy,
        visible = stats.visible,
        display_policy = %config.display_policy,
        "filtered leaderboard"
    );

    (visible, stats)
}
