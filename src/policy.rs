//! Display policies: which ranked entries a viewer gets to see.
//!
//! Exactly one policy is active per run. Each policy is a pure predicate over
//! one entry, the candidate set it competes against, and the attribute table.
//! Missing attributes never hide an entry on their own.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::attributes::AttributeTable;
use crate::entries::Entry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DisplayPolicy {
    /// Every entry is visible.
    #[default]
    #[serde(alias = "show_all", alias = "show-all")]
    ShowAll,
    /// Hide retired models.
    #[serde(alias = "hide_deprecated", alias = "hide-deprecated")]
    HideDeprecated,
    /// Hide retired models and models dominated by a cheaper, better sibling.
    #[serde(alias = "hide_old", alias = "hide-old")]
    HideOld,
    /// Keep only the best-rated model of each organization.
    #[serde(alias = "one_per_org", alias = "one-per-org")]
    OnePerOrg,
}

impl DisplayPolicy {
    pub const ALL: [DisplayPolicy; 4] = [
        DisplayPolicy::ShowAll,
        DisplayPolicy::HideDeprecated,
        DisplayPolicy::HideOld,
        DisplayPolicy::OnePerOrg,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::ShowAll => "showAll",
            Self::HideDeprecated => "hideDeprecated",
            Self::HideOld => "hideOld",
            Self::OnePerOrg => "onePerOrg",
        }
    }

    /// Short label shown next to the policy picker.
    pub fn description(self) -> &'static str {
        match self {
            Self::ShowAll => "Never",
            Self::HideDeprecated => "Drop deprecated",
            Self::HideOld => "Drop old",
            Self::OnePerOrg => "Best / org",
        }
    }

    /// Whether `entry` survives this policy when competing against `candidates`.
    pub fn is_visible(self, entry: &Entry, candidates: &[Entry], attrs: &AttributeTable) -> bool {
        match self {
            Self::ShowAll => true,
            Self::HideDeprecated => hide_deprecated_visible(entry, attrs),
            Self::HideOld => hide_old_visible(entry, candidates, attrs),
            Self::OnePerOrg => one_per_org_visible(entry, candidates, attrs),
        }
    }

    /// Visibility flag for every candidate, in order.
    pub fn visibility(self, candidates: &[Entry], attrs: &AttributeTable) -> Vec<bool> {
        candidates
            .iter()
            .map(|entry| self.is_visible(entry, candidates, attrs))
            .collect()
    }

    /// Keep the visible candidates, preserving order.
    pub fn apply(self, candidates: Vec<Entry>, attrs: &AttributeTable) -> Vec<Entry> {
        if self == Self::ShowAll {
            return candidates;
        }
        let flags = self.visibility(&candidates, attrs);
        candidates
            .into_iter()
            .zip(flags)
            .filter_map(|(entry, keep)| keep.then_some(entry))
            .collect()
    }
}

impl fmt::Display for DisplayPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DisplayPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "showall" => Ok(Self::ShowAll),
            "hidedeprecated" | "hideretired" => Ok(Self::HideDeprecated),
            "hideold" => Ok(Self::HideOld),
            "oneperorg" => Ok(Self::OnePerOrg),
            _ => {
                let available = Self::ALL
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>()
                    .join(", ");
                Err(format!("unknown display policy {s:?} (available: {available})"))
            }
        }
    }
}

fn hide_deprecated_visible(entry: &Entry, attrs: &AttributeTable) -> bool {
    !attrs.get(&entry.id).is_retired()
}

fn hide_old_visible(entry: &Entry, candidates: &[Entry], attrs: &AttributeTable) -> bool {
    let meta = attrs.get(&entry.id);
    if meta.is_retired() {
        return false;
    }
    let (Some(org), Some(price)) = (meta.organization.as_deref(), meta.price) else {
        return true;
    };
    // A rating of exactly zero means "not rated yet"; never suppress it.
    if entry.rating == 0.0 {
        return true;
    }

    !candidates.iter().any(|other| {
        let other_meta = attrs.get(&other.id);
        other_meta.organization.as_deref() == Some(org)
            && other_meta.price.is_some_and(|p| p <= price)
            && other.rating > entry.rating
    })
}

fn one_per_org_visible(entry: &Entry, candidates: &[Entry], attrs: &AttributeTable) -> bool {
    let Some(org) = attrs.get(&entry.id).organization.as_deref() else {
        return true;
    };

    // First-encountered wins ties.
    let best = candidates
        .iter()
        .filter(|c| attrs.get(&c.id).organization.as_deref() == Some(org))
        .reduce(|best, current| {
            if current.rating > best.rating {
                current
            } else {
                best
            }
        });

    best.map_or(true, |b| b.id == entry.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::ModelAttributes;

    fn table(rows: &[(&str, ModelAttributes)]) -> AttributeTable {
        rows.iter()
            .map(|(id, a)| (id.to_string(), a.clone()))
            .collect()
    }

    fn ids(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.id.as_str()).collect()
    }

    #[test]
    fn show_all_is_identity() {
        let entries = vec![Entry::point("a", 2.0), Entry::point("b", 1.0)];
        let kept = DisplayPolicy::ShowAll.apply(entries.clone(), &AttributeTable::new());
        assert_eq!(kept, entries);
    }

    #[test]
    fn hide_deprecated_keeps_unknown() {
        let attrs = table(&[
            ("old", ModelAttributes::new().with_retired(true)),
            ("live", ModelAttributes::new().with_retired(false)),
        ]);
        let entries = vec![
            Entry::point("old", 3.0),
            Entry::point("live", 2.0),
            Entry::point("mystery", 1.0),
        ];
        let kept = DisplayPolicy::HideDeprecated.apply(entries, &attrs);
        assert_eq!(ids(&kept), vec!["live", "mystery"]);
    }

    #[test]
    fn hide_old_drops_dominated_model() {
        let attrs = table(&[
            ("a", ModelAttributes::new().with_organization("X").with_price(5.0)),
            ("b", ModelAttributes::new().with_organization("X").with_price(3.0)),
            ("c", ModelAttributes::new().with_organization("X").with_price(2.0)),
        ]);
        let entries = vec![
            Entry::point("c", 99.0),
            Entry::point("b", 95.0),
            Entry::point("a", 90.0),
        ];
        let kept = DisplayPolicy::HideOld.apply(entries, &attrs);
        // c is cheaper and better than both others.
        assert_eq!(ids(&kept), vec!["c"]);
    }

    #[test]
    fn hide_old_pair_from_dominance_example() {
        let attrs = table(&[
            ("a", ModelAttributes::new().with_organization("X").with_price(5.0)),
            ("b", ModelAttributes::new().with_organization("X").with_price(3.0)),
        ]);
        let entries = vec![Entry::point("b", 95.0), Entry::point("a", 90.0)];
        let kept = DisplayPolicy::HideOld.apply(entries, &attrs);
        assert_eq!(ids(&kept), vec!["b"]);
    }

    #[test]
    fn hide_old_needs_org_and_price_to_judge() {
        let attrs = table(&[
            ("cheap", ModelAttributes::new().with_organization("X").with_price(1.0)),
            ("no-price", ModelAttributes::new().with_organization("X")),
            ("no-org", ModelAttributes::new().with_price(50.0)),
        ]);
        let entries = vec![
            Entry::point("cheap", 100.0),
            Entry::point("no-price", 90.0),
            Entry::point("no-org", 80.0),
        ];
        let kept = DisplayPolicy::HideOld.apply(entries, &attrs);
        assert_eq!(ids(&kept), vec!["cheap", "no-price", "no-org"]);
    }

    #[test]
    fn hide_old_ignores_competitors_without_price() {
        let attrs = table(&[
            ("mystery", ModelAttributes::new().with_organization("X")),
            ("priced", ModelAttributes::new().with_organization("X").with_price(4.0)),
        ]);
        let entries = vec![Entry::point("mystery", 100.0), Entry::point("priced", 90.0)];
        let kept = DisplayPolicy::HideOld.apply(entries, &attrs);
        assert_eq!(ids(&kept), vec!["mystery", "priced"]);
    }

    #[test]
    fn hide_old_other_orgs_do_not_dominate() {
        let attrs = table(&[
            ("x", ModelAttributes::new().with_organization("X").with_price(1.0)),
            ("y", ModelAttributes::new().with_organization("Y").with_price(9.0)),
        ]);
        let entries = vec![Entry::point("x", 100.0), Entry::point("y", 90.0)];
        let kept = DisplayPolicy::HideOld.apply(entries, &attrs);
        assert_eq!(ids(&kept), vec!["x", "y"]);
    }

    #[test]
    fn hide_old_equal_rating_does_not_dominate() {
        let attrs = table(&[
            ("a", ModelAttributes::new().with_organization("X").with_price(1.0)),
            ("b", ModelAttributes::new().with_organization("X").with_price(2.0)),
        ]);
        let entries = vec![Entry::point("a", 90.0), Entry::point("b", 90.0)];
        let kept = DisplayPolicy::HideOld.apply(entries, &attrs);
        assert_eq!(ids(&kept), vec!["a", "b"]);
    }

    #[test]
    fn hide_old_zero_price_is_known() {
        let attrs = table(&[
            ("free", ModelAttributes::new().with_organization("X").with_price(0.0)),
            ("paid", ModelAttributes::new().with_organization("X").with_price(2.0)),
        ]);
        let entries = vec![Entry::point("free", 100.0), Entry::point("paid", 90.0)];
        let kept = DisplayPolicy::HideOld.apply(entries, &attrs);
        assert_eq!(ids(&kept), vec!["free"]);
    }

    #[test]
    fn hide_old_zero_rating_is_always_shown() {
        let attrs = table(&[
            ("new", ModelAttributes::new().with_organization("X").with_price(9.0)),
            ("best", ModelAttributes::new().with_organization("X").with_price(1.0)),
        ]);
        let entries = vec![Entry::point("best", 100.0), Entry::point("new", 0.0)];
        let kept = DisplayPolicy::HideOld.apply(entries, &attrs);
        assert_eq!(ids(&kept), vec!["best", "new"]);
    }

    #[test]
    fn hide_old_hides_retired() {
        let attrs = table(&[("gone", ModelAttributes::new().with_retired(true))]);
        let kept = DisplayPolicy::HideOld.apply(vec![Entry::point("gone", 1.0)], &attrs);
        assert!(kept.is_empty());
    }

    #[test]
    fn one_per_org_keeps_best_and_orphans() {
        let attrs = table(&[
            ("x1", ModelAttributes::new().with_organization("X")),
            ("x2", ModelAttributes::new().with_organization("X")),
            ("y1", ModelAttributes::new().with_organization("Y")),
        ]);
        let entries = vec![
            Entry::point("x2", 80.0),
            Entry::point("y1", 85.0),
            Entry::point("x1", 90.0),
            Entry::point("orphan", 70.0),
        ];
        let kept = DisplayPolicy::OnePerOrg.apply(entries, &attrs);
        assert_eq!(ids(&kept), vec!["y1", "x1", "orphan"]);
    }

    #[test]
    fn one_per_org_tie_goes_to_first_candidate() {
        let attrs = table(&[
            ("first", ModelAttributes::new().with_organization("X")),
            ("second", ModelAttributes::new().with_organization("X")),
        ]);
        let entries = vec![Entry::point("first", 90.0), Entry::point("second", 90.0)];
        let kept = DisplayPolicy::OnePerOrg.apply(entries, &attrs);
        assert_eq!(ids(&kept), vec!["first"]);
    }

    #[test]
    fn parse_names() {
        assert_eq!("hideOld".parse::<DisplayPolicy>().unwrap(), DisplayPolicy::HideOld);
        assert_eq!("one-per-org".parse::<DisplayPolicy>().unwrap(), DisplayPolicy::OnePerOrg);
        assert_eq!("SHOW_ALL".parse::<DisplayPolicy>().unwrap(), DisplayPolicy::ShowAll);
        let err = "newest".parse::<DisplayPolicy>().unwrap_err();
        assert!(err.contains("hideDeprecated"), "{err}");
    }

    #[test]
    fn serde_uses_camel_case() {
        let json = serde_json::to_string(&DisplayPolicy::OnePerOrg).unwrap();
        assert_eq!(json, "\"onePerOrg\"");
        let parsed: DisplayPolicy = serde_json::from_str("\"hide_old\"").unwrap();
        assert_eq!(parsed, DisplayPolicy::HideOld);
    }
}
