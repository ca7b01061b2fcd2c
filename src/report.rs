//! Report generation for leaderboard runs.

use serde::Serialize;

use crate::attributes::{AttributeTable, ModelAttributes};
use crate::error::BoardError;
use crate::filter::{FilterConfig, FilterStats};
use crate::leaderboard::{RankedBoard, ScoreSnapshot};
use crate::pricing::{price_tier, PriceTier};
use crate::rank::RankConfig;

#[derive(Debug, Clone, Serialize)]
pub struct BoardReport {
    /// blake3 over every input of the run; equal hashes mean equal output.
    pub input_hash: String,
    pub category: String,
    pub rank: RankConfig,
    pub filter: FilterConfig,
    pub stats: FilterStats,
    pub entries: Vec<ReportEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportEntry {
    pub rank: usize,
    pub id: String,
    pub rating: f64,
    pub ci_low: f64,
    pub ci_high: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_tier: Option<PriceTier>,
}

pub fn build_report(
    category: &str,
    snapshot: &ScoreSnapshot,
    attrs: &AttributeTable,
    rank: &RankConfig,
    filter: &FilterConfig,
    board: &RankedBoard,
) -> Result<BoardReport, BoardError> {
    let entries = board
        .entries
        .iter()
        .map(|entry| {
            let meta = attrs.get(&entry.id);
            ReportEntry {
                rank: entry.rank,
                id: entry.id.clone(),
                rating: entry.rating,
                ci_low: entry.ci_low,
                ci_high: entry.ci_high,
                organization: meta.organization.clone(),
                price_tier: price_tier(meta.price.map(|p| p * filter.price_scale)),
            }
        })
        .collect();

    Ok(BoardReport {
        input_hash: hash_inputs(category, snapshot, attrs, rank, filter)?,
        category: category.to_string(),
        rank: *rank,
        filter: filter.clone(),
        stats: board.stats.clone(),
        entries,
    })
}

pub fn render_report_markdown(report: &BoardReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Leaderboard: {}\n\n", report.category));
    out.push_str(&format!("- Input hash: `{}`\n", report.input_hash));
    out.push_str(&format!("- Banding: {:?}\n", report.rank.banding));
    out.push_str(&format!("- Counting: {:?}\n", report.rank.counting));
    out.push_str(&format!(
        "- Display policy: {} ({})\n",
        report.filter.display_policy,
        report.filter.display_policy.description()
    ));
    if !report.filter.search.is_empty() {
        out.push_str(&format!("- Search: {}\n", report.filter.search.join(", ")));
    }
    if report.filter.open_source_only {
        out.push_str("- Open source only: true\n");
    }
    if !report.filter.price_tiers.is_empty() {
        let tiers: Vec<String> = report
            .filter
            .price_tiers
            .iter()
            .map(|t| format!("{} ({})", t.symbol(), t.label()))
            .collect();
        out.push_str(&format!("- Price tiers: {}\n", tiers.join(", ")));
    }
    out.push_str(&format!(
        "- Visible/input: {}/{} (search -{}, source -{}, price -{}, policy -{})\n",
        report.stats.visible,
        report.stats.input,
        report.stats.removed_by_search,
        report.stats.removed_by_source,
        report.stats.removed_by_price,
        report.stats.removed_by_policy
    ));

    out.push_str("\n| Rank | Model | Rating | 95% CI | Organization | Price |\n");
    out.push_str("|---:|---|---:|---|---|---|\n");
    for entry in &report.entries {
        out.push_str(&format!(
            "| {} | {} | {:.1} | {:.1} - {:.1} | {} | {} |\n",
            entry.rank,
            entry.id,
            entry.rating,
            entry.ci_low,
            entry.ci_high,
            entry.organization.as_deref().unwrap_or("-"),
            entry.price_tier.map(PriceTier::symbol).unwrap_or("-"),
        ));
    }

    out
}

#[derive(Serialize)]
struct HashedInputs<'a> {
    category: &'a str,
    snapshot: &'a ScoreSnapshot,
    attributes: Vec<(&'a String, &'a ModelAttributes)>,
    rank: &'a RankConfig,
    filter: &'a FilterConfig,
}

fn hash_inputs(
    category: &str,
    snapshot: &ScoreSnapshot,
    attrs: &AttributeTable,
    rank: &RankConfig,
    filter: &FilterConfig,
) -> Result<String, BoardError> {
    let inputs = HashedInputs {
        category,
        snapshot,
        attributes: attrs.sorted_records(),
        rank,
        filter,
    };
    let bytes = serde_json::to_vec(&inputs)?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}
