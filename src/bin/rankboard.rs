#![forbid(unsafe_code)]

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use rankboard::attributes::load_attribute_table;
use rankboard::config::{load_view_config_from_path, validate_view_config, ViewConfig};
use rankboard::rank::DEFAULT_FIXED_GAP;
use rankboard::{
    build_report, rank_and_filter, render_report_markdown, AttributeTable, BandingMode, Board,
    DisplayPolicy, PriceBlend, PriceTier, RankCounting,
};

#[derive(Parser)]
#[command(name = "rankboard", version, about = "Leaderboard ranking CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank and filter one leaderboard category
    Rank {
        /// Leaderboard snapshot JSON
        #[arg(long)]
        board: PathBuf,

        #[arg(long, default_value = "full")]
        category: String,

        /// Attribute table JSON (organization, price, open source, retired)
        #[arg(long)]
        attributes: Option<PathBuf>,

        /// View config JSON; flags below override it
        #[arg(long)]
        config: Option<PathBuf>,

        /// Case-insensitive id substrings (comma-separated)
        #[arg(long, value_delimiter = ',')]
        search: Vec<String>,

        /// Only show models known to be open source
        #[arg(long)]
        open_only: bool,

        /// Price tiers to keep: $, $$, $$$, $$$$ or t1..t4 (comma-separated)
        #[arg(long, value_delimiter = ',')]
        tier: Vec<PriceTier>,

        /// showAll, hideDeprecated, hideOld or onePerOrg
        #[arg(long)]
        policy: Option<DisplayPolicy>,

        #[arg(long, value_enum)]
        banding: Option<CliBanding>,

        /// Rating margin for fixed-gap banding
        #[arg(long)]
        margin: Option<f64>,

        #[arg(long, value_enum)]
        count: Option<CliCounting>,

        /// Multiplier applied to attribute prices before tier lookup
        #[arg(long)]
        price_scale: Option<f64>,

        #[arg(long, value_enum, default_value = "md")]
        format: CliFormat,

        /// Output path (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List categories in a snapshot
    Categories {
        #[arg(long)]
        board: PathBuf,
    },
    /// List display policies
    Policies,
    /// List price tiers
    Tiers,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliBanding {
    Ci,
    #[value(alias = "league")]
    FixedGap,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliCounting {
    Visible,
    All,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliFormat {
    Md,
    Json,
}

struct ViewOverrides {
    search: Vec<String>,
    open_only: bool,
    tier: Vec<PriceTier>,
    policy: Option<DisplayPolicy>,
    banding: Option<CliBanding>,
    margin: Option<f64>,
    count: Option<CliCounting>,
    price_scale: Option<f64>,
}

fn apply_overrides(mut view: ViewConfig, o: ViewOverrides) -> Result<ViewConfig, String> {
    if !o.search.is_empty() {
        view.filter.search = o.search;
    }
    if o.open_only {
        view.filter.open_source_only = true;
    }
    if !o.tier.is_empty() {
        view.filter.price_tiers = o.tier.into_iter().collect();
    }
    if let Some(policy) = o.policy {
        view.filter.display_policy = policy;
    }
    if let Some(scale) = o.price_scale {
        view.filter.price_scale = scale;
    }
    if let Some(count) = o.count {
        view.rank.counting = match count {
            CliCounting::Visible => RankCounting::VisibleOnly,
            CliCounting::All => RankCounting::AllEntries,
        };
    }

    let current_margin = match view.rank.banding {
        BandingMode::FixedGap { margin } => Some(margin),
        BandingMode::CiOverlap => None,
    };
    view.rank.banding = match (o.banding, o.margin) {
        (Some(CliBanding::Ci), Some(_)) => {
            return Err("--margin only applies to fixed-gap banding".to_string())
        }
        (Some(CliBanding::Ci), None) => BandingMode::CiOverlap,
        (Some(CliBanding::FixedGap), margin) => BandingMode::FixedGap {
            margin: margin.or(current_margin).unwrap_or(DEFAULT_FIXED_GAP),
        },
        (None, Some(margin)) => match view.rank.banding {
            BandingMode::FixedGap { .. } => BandingMode::FixedGap { margin },
            BandingMode::CiOverlap => {
                return Err("--margin only applies to fixed-gap banding".to_string())
            }
        },
        (None, None) => view.rank.banding,
    };

    validate_view_config(&view)?;
    Ok(view)
}

fn write_output(out: Option<PathBuf>, body: &str) -> std::io::Result<()> {
    match out {
        Some(path) => std::fs::write(path, body),
        None => {
            print!("{body}");
            Ok(())
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Rank {
            board,
            category,
            attributes,
            config,
            search,
            open_only,
            tier,
            policy,
            banding,
            margin,
            count,
            price_scale,
            format,
            out,
        } => {
            let board = Board::load(&board)?;
            let snapshot = board.category(&category)?.snapshot();
            let attrs = match attributes {
                Some(path) => load_attribute_table(path, &PriceBlend::default())?,
                None => AttributeTable::new(),
            };
            let view = match config {
                Some(path) => load_view_config_from_path(path)?,
                None => ViewConfig::default(),
            };
            let view = apply_overrides(
                view,
                ViewOverrides {
                    search,
                    open_only,
                    tier,
                    policy,
                    banding,
                    margin,
                    count,
                    price_scale,
                },
            )?;

            let ranked = rank_and_filter(&snapshot, &attrs, &view.rank, &view.filter)?;
            let report = build_report(
                &category,
                &snapshot,
                &attrs,
                &view.rank,
                &view.filter,
                &ranked,
            )?;
            let body = match format {
                CliFormat::Json => serde_json::to_string_pretty(&report)? + "\n",
                CliFormat::Md => render_report_markdown(&report),
            };
            write_output(out, &body)?;
        }
        Commands::Categories { board } => {
            let board = Board::load(&board)?;
            for name in board.category_names() {
                println!("{name}");
            }
        }
        Commands::Policies => {
            for policy in DisplayPolicy::ALL {
                println!("{}\t{}", policy.name(), policy.description());
            }
        }
        Commands::Tiers => {
            for tier in PriceTier::ALL {
                println!("{}\t{}", tier.symbol(), tier.label());
            }
        }
    }

    Ok(())
}
