//! View config file loader.
//!
//! ```json
//! {
//!   "rank": { "banding": { "mode": "fixed_gap", "margin": 70 }, "counting": "visible_only" },
//!   "filter": { "search": ["gpt"], "price_tiers": ["t1", "t2"], "display_policy": "hideOld" }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::BoardError;
use crate::filter::FilterConfig;
use crate::rank::{BandingMode, RankConfig};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub rank: RankConfig,
    pub filter: FilterConfig,
}

pub fn validate_view_config(config: &ViewConfig) -> Result<(), String> {
    if let BandingMode::FixedGap { margin } = config.rank.banding {
        if !margin.is_finite() || margin <= 0.0 {
            return Err("fixed-gap margin must be a finite number > 0".to_string());
        }
    }
    let scale = config.filter.price_scale;
    if !scale.is_finite() || scale <= 0.0 {
        return Err("price_scale must be a finite number > 0".to_string());
    }
    Ok(())
}

pub fn parse_view_config(raw: &str) -> Result<ViewConfig, BoardError> {
    let config: ViewConfig = serde_json::from_str(raw)?;
    validate_view_config(&config).map_err(BoardError::InvalidConfig)?;
    Ok(config)
}

pub fn load_view_config_from_path(path: impl AsRef<Path>) -> Result<ViewConfig, BoardError> {
    let raw = std::fs::read_to_string(path.as_ref())?;
    parse_view_config(&raw)
}
