//! Rank banding.
//!
//! Entries are walked in rating order while a running `bar` tracks the
//! reference bound of the current tier. An entry whose separation score falls
//! below the bar opens a new tier and takes its own ordinal position as rank;
//! everything else shares the current tier's rank. Ranks therefore repeat
//! inside a tier and only ever take values that are real positions.

use serde::{Deserialize, Serialize};

use crate::attributes::AttributeTable;
use crate::entries::{by_rating_desc, Entry};
use crate::policy::DisplayPolicy;

/// Default margin (rating points) for fixed-gap banding.
pub const DEFAULT_FIXED_GAP: f64 = 70.0;

/// How the separation score and tier bar are derived from an entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BandingMode {
    /// Score = `ci_high`, bar = `ci_low`: a new tier starts once an entry's
    /// interval no longer reaches the tier leader's lower bound.
    CiOverlap,
    /// Score = `rating`, bar = `rating - margin`.
    #[serde(alias = "league")]
    FixedGap { margin: f64 },
}

impl Default for BandingMode {
    fn default() -> Self {
        Self::CiOverlap
    }
}

impl BandingMode {
    pub fn fixed_gap() -> Self {
        Self::FixedGap {
            margin: DEFAULT_FIXED_GAP,
        }
    }

    fn separation(&self, entry: &Entry) -> f64 {
        match self {
            Self::CiOverlap => entry.ci_high,
            Self::FixedGap { .. } => entry.rating,
        }
    }

    fn candidate_bar(&self, entry: &Entry) -> f64 {
        match self {
            Self::CiOverlap => entry.ci_low,
            Self::FixedGap { margin } => entry.rating - margin,
        }
    }
}

/// Which entries consume a rank slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankCounting {
    /// Every entry counts, whatever the display policy hides later.
    AllEntries,
    /// Only entries the display policy keeps count; hidden entries neither
    /// take a position nor move the bar.
    #[default]
    VisibleOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RankConfig {
    pub banding: BandingMode,
    pub counting: RankCounting,
}

/// Stable sort by rating, highest first.
pub fn sort_by_rating(entries: &mut [Entry]) {
    entries.sort_by(by_rating_desc);
}

/// Assign ranks to entries already sorted by rating.
///
/// `counted[i]` says whether entry `i` takes part in banding. Entries that do
/// not count inherit the rank in force when they are passed.
pub fn band_sorted(entries: &mut [Entry], banding: BandingMode, counted: &[bool]) {
    debug_assert_eq!(entries.len(), counted.len());

    let mut bar: Option<f64> = None;
    let mut rank = 1usize;
    let mut position = 0usize;

    for (entry, &counts) in entries.iter_mut().zip(counted) {
        if counts {
            position += 1;
            let score = banding.separation(entry);
            let next_bar = banding.candidate_bar(entry);
            match bar {
                None => bar = Some(next_bar),
                Some(current) if score < current => {
                    bar = Some(next_bar);
                    rank = position;
                }
                Some(_) => {}
            }
        }
        entry.rank = rank;
    }
}

/// Sort `entries` and assign ranks under `config`.
///
/// With [`RankCounting::VisibleOnly`], visibility is judged by `policy` over
/// the whole entry set.
pub fn rank_entries(
    entries: &mut [Entry],
    config: &RankConfig,
    policy: DisplayPolicy,
    attrs: &AttributeTable,
) {
    sort_by_rating(entries);
    let counted = match config.counting {
        RankCounting::AllEntries => vec![true; entries.len()],
        RankCounting::VisibleOnly => policy.visibility(entries, attrs),
    };
    band_sorted(entries, config.banding, &counted);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::ModelAttributes;

    fn ranks(entries: &[Entry]) -> Vec<(&str, usize)> {
        entries.iter().map(|e| (e.id.as_str(), e.rank)).collect()
    }

    fn rank_all(entries: &mut [Entry], banding: BandingMode) {
        let config = RankConfig {
            banding,
            counting: RankCounting::AllEntries,
        };
        rank_entries(entries, &config, DisplayPolicy::ShowAll, &AttributeTable::new());
    }

    #[test]
    fn ci_overlap_scenario() {
        let mut entries = vec![
            Entry::with_bounds("C", 1100.0, 1080.0, 1120.0),
            Entry::with_bounds("A", 1200.0, 1190.0, 1210.0),
            Entry::with_bounds("B", 1195.0, 1180.0, 1205.0),
        ];
        rank_all(&mut entries, BandingMode::CiOverlap);
        assert_eq!(ranks(&entries), vec![("A", 1), ("B", 1), ("C", 3)]);
    }

    #[test]
    fn bar_moves_only_when_a_tier_opens() {
        // B overlaps A's bar (1190) so the bar stays at 1190, even though
        // B's own low bound is lower. C reaches 1185 < 1190 -> new tier.
        let mut entries = vec![
            Entry::with_bounds("A", 1200.0, 1190.0, 1210.0),
            Entry::with_bounds("B", 1180.0, 1100.0, 1195.0),
            Entry::with_bounds("C", 1170.0, 1160.0, 1185.0),
            Entry::with_bounds("D", 1160.0, 1150.0, 1170.0),
        ];
        rank_all(&mut entries, BandingMode::CiOverlap);
        assert_eq!(ranks(&entries), vec![("A", 1), ("B", 1), ("C", 3), ("D", 3)]);
    }

    #[test]
    fn fixed_gap_bands_by_margin() {
        let mut entries = vec![
            Entry::point("a", 1300.0),
            Entry::point("b", 1240.0),
            Entry::point("c", 1229.0),
            Entry::point("d", 1200.0),
            Entry::point("e", 1100.0),
        ];
        rank_all(&mut entries, BandingMode::fixed_gap());
        // bar 1230 -> c (1229) opens tier at 3, bar 1159 -> d stays, e opens at 5
        assert_eq!(
            ranks(&entries),
            vec![("a", 1), ("b", 1), ("c", 3), ("d", 3), ("e", 5)]
        );
    }

    #[test]
    fn fixed_gap_margin_is_configurable() {
        let mut entries = vec![Entry::point("a", 10.0), Entry::point("b", 8.0)];
        rank_all(&mut entries, BandingMode::FixedGap { margin: 1.0 });
        assert_eq!(ranks(&entries), vec![("a", 1), ("b", 2)]);
    }

    #[test]
    fn zero_bar_is_a_real_bar() {
        // First tier bar is exactly 0; a later entry with ci_high < 0 must
        // still open a new tier.
        let mut entries = vec![
            Entry::with_bounds("a", 1.0, 0.0, 2.0),
            Entry::with_bounds("b", -1.0, -2.0, -0.5),
        ];
        rank_all(&mut entries, BandingMode::CiOverlap);
        assert_eq!(ranks(&entries), vec![("a", 1), ("b", 2)]);
    }

    #[test]
    fn equal_ratings_keep_input_order() {
        let mut entries = vec![
            Entry::point("first", 5.0),
            Entry::point("second", 5.0),
            Entry::point("top", 6.0),
        ];
        rank_all(&mut entries, BandingMode::CiOverlap);
        let order: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(order, vec!["top", "first", "second"]);
    }

    #[test]
    fn hidden_entries_do_not_consume_positions() {
        let attrs: AttributeTable = [
            ("gone".to_string(), ModelAttributes::new().with_retired(true)),
        ]
        .into_iter()
        .collect();
        let make = || {
            vec![
                Entry::point("a", 100.0),
                Entry::point("gone", 90.0),
                Entry::point("b", 80.0),
            ]
        };

        let mut visible_only = make();
        let config = RankConfig {
            banding: BandingMode::CiOverlap,
            counting: RankCounting::VisibleOnly,
        };
        rank_entries(&mut visible_only, &config, DisplayPolicy::HideDeprecated, &attrs);
        assert_eq!(ranks(&visible_only), vec![("a", 1), ("gone", 1), ("b", 2)]);

        let mut all = make();
        let config = RankConfig {
            banding: BandingMode::CiOverlap,
            counting: RankCounting::AllEntries,
        };
        rank_entries(&mut all, &config, DisplayPolicy::HideDeprecated, &attrs);
        assert_eq!(ranks(&all), vec![("a", 1), ("gone", 2), ("b", 3)]);
    }

    #[test]
    fn hidden_entries_do_not_reset_the_bar() {
        let attrs: AttributeTable = [
            ("gone".to_string(), ModelAttributes::new().with_retired(true)),
        ]
        .into_iter()
        .collect();
        let make = || {
            vec![
                Entry::with_bounds("a", 100.0, 95.0, 105.0),
                Entry::with_bounds("gone", 80.0, 60.0, 90.0),
                Entry::with_bounds("b", 75.0, 70.0, 92.0),
                Entry::with_bounds("c", 72.0, 55.0, 65.0),
            ]
        };

        // Skipping "gone": b opens a tier with bar 70, which c misses.
        let mut visible_only = make();
        rank_entries(
            &mut visible_only,
            &RankConfig::default(),
            DisplayPolicy::HideDeprecated,
            &attrs,
        );
        assert_eq!(
            ranks(&visible_only),
            vec![("a", 1), ("gone", 1), ("b", 2), ("c", 3)]
        );

        // Counting "gone": its bar of 60 absorbs both b and c.
        let mut all = make();
        let config = RankConfig {
            banding: BandingMode::CiOverlap,
            counting: RankCounting::AllEntries,
        };
        rank_entries(&mut all, &config, DisplayPolicy::HideDeprecated, &attrs);
        assert_eq!(ranks(&all), vec![("a", 1), ("gone", 2), ("b", 2), ("c", 2)]);
    }

    #[test]
    fn empty_input_is_fine() {
        let mut entries: Vec<Entry> = Vec::new();
        rank_all(&mut entries, BandingMode::CiOverlap);
        assert!(entries.is_empty());
    }

    #[test]
    fn config_serde_accepts_league_alias() {
        let config: RankConfig =
            serde_json::from_str(r#"{ "banding": { "mode": "league", "margin": 70.0 } }"#)
                .unwrap();
        assert_eq!(config.banding, BandingMode::fixed_gap());
        assert_eq!(config.counting, RankCounting::VisibleOnly);
    }

    mod props {
        use super::super::*;
        use proptest::prelude::*;

        fn entry_strategy() -> impl Strategy<Value = (f64, f64, f64)> {
            (800.0f64..1400.0, 0.0f64..40.0, 0.0f64..40.0)
        }

        fn entries_from(raw: &[(f64, f64, f64)]) -> Vec<Entry> {
            raw.iter()
                .enumerate()
                .map(|(i, (r, lo, hi))| Entry::with_bounds(format!("m{i}"), *r, r - lo, r + hi))
                .collect()
        }

        fn banding_strategy() -> impl Strategy<Value = BandingMode> {
            prop_oneof![
                Just(BandingMode::CiOverlap),
                (1.0f64..150.0).prop_map(|margin| BandingMode::FixedGap { margin }),
            ]
        }

        proptest! {
            /// Ranks never decrease as rating decreases, and each rank value
            /// is the 1-based position of some counted entry.
            #[test]
            fn prop_rank_monotone_and_positional(
                raw in prop::collection::vec(entry_strategy(), 0..40),
                flags in prop::collection::vec(any::<bool>(), 40),
                banding in banding_strategy(),
            ) {
                let mut entries = entries_from(&raw);
                sort_by_rating(&mut entries);
                let counted = &flags[..entries.len()];
                band_sorted(&mut entries, banding, counted);

                for w in entries.windows(2) {
                    prop_assert!(w[0].rating >= w[1].rating);
                    prop_assert!(w[0].rank <= w[1].rank);
                }

                let counted_total = counted.iter().filter(|c| **c).count();
                let mut position = 0usize;
                for (entry, &c) in entries.iter().zip(counted) {
                    if c {
                        position += 1;
                        prop_assert!(entry.rank >= 1 && entry.rank <= position);
                    }
                    prop_assert!(entry.rank >= 1);
                    prop_assert!(entry.rank == 1 || entry.rank <= counted_total);
                }
            }

            /// In CI mode, a follower whose ci_high reaches the current bar
            /// shares its predecessor's rank.
            #[test]
            fn prop_ci_tier_containment(raw in prop::collection::vec(entry_strategy(), 1..40)) {
                let mut entries = entries_from(&raw);
                sort_by_rating(&mut entries);
                let counted = vec![true; entries.len()];
                band_sorted(&mut entries, BandingMode::CiOverlap, &counted);

                let mut bar = entries[0].ci_low;
                for w in entries.windows(2) {
                    let (a, b) = (&w[0], &w[1]);
                    if b.ci_high >= bar {
                        prop_assert_eq!(a.rank, b.rank);
                    } else {
                        bar = b.ci_low;
                    }
                }
            }

            /// Re-running on identical input yields identical output.
            #[test]
            fn prop_ranking_is_idempotent(raw in prop::collection::vec(entry_strategy(), 0..40)) {
                let mut first = entries_from(&raw);
                let mut second = entries_from(&raw);
                let config = RankConfig { counting: RankCounting::AllEntries, ..RankConfig::default() };
                let attrs = AttributeTable::new();
                rank_entries(&mut first, &config, DisplayPolicy::ShowAll, &attrs);
                rank_entries(&mut second, &config, DisplayPolicy::ShowAll, &attrs);
                prop_assert_eq!(first, second);
            }
        }
    }
}
