#![forbid(unsafe_code)]

//! # rankboard
//!
//! Turns a leaderboard of rated models into the list a viewer actually sees.
//!
//! Ratings arrive with bootstrap samples or precomputed confidence bounds.
//! Models whose intervals overlap the current tier leader share one rank, so
//! the displayed ranks reflect what the data can statistically distinguish
//! rather than raw rating order. The ranked set is then narrowed by text
//! search, an open-source toggle, price tiers and one display policy
//! (show all, hide retired, hide dominated, best per organization).
//!
//! Every call recomputes from its inputs; nothing is cached or persisted.

pub mod attributes;
pub mod board;
pub mod config;
pub mod entries;
pub mod error;
pub mod filter;
pub mod leaderboard;
pub mod policy;
pub mod pricing;
pub mod rank;
pub mod report;

pub use attributes::{AttributeTable, ModelAttributes};
pub use board::Board;
pub use config::{load_view_config_from_path, ViewConfig};
pub use entries::{build_entries, ConfidenceSource, Entry, RatingValue};
pub use error::BoardError;
pub use filter::{filter_entries, FilterConfig, FilterStats};
pub use leaderboard::{rank_and_filter, RankedBoard, ScoreSnapshot};
pub use policy::DisplayPolicy;
pub use pricing::{price_tier, PriceBlend, PriceTier};
pub use rank::{rank_entries, BandingMode, RankConfig, RankCounting};
pub use report::{build_report, render_report_markdown, BoardReport};
