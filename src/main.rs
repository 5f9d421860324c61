//! ALTILI: pick-six coupon planner.
//!
//! Entry point. Loads configuration, initialises structured logging and
//! dispatches to the `plan` or `backtest` command.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use altili::backtest::{BacktestReport, Backtester, ResolvedCard};
use altili::config::AppConfig;
use altili::report::{self, TicketRecord};
use altili::source::JsonCardSource;
use altili::storage;
use altili::strategy::chaos::ChaosGauge;
use altili::strategy::{CouponPlanner, PlanRecord};

#[derive(Parser)]
#[command(name = "altili")]
#[command(author, version, about = "Pick-six coupon planner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan coupons for one or more scored race cards
    Plan {
        /// Path to config.toml (built-in defaults if omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Scratched runner, case-insensitive (repeatable)
        #[arg(short, long = "exclude")]
        exclude: Vec<String>,

        /// Print JSON records instead of the markdown sheet
        #[arg(long)]
        json: bool,

        /// Save the coupon sheet to this file
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Race card JSON files
        #[arg(required = true)]
        cards: Vec<PathBuf>,
    },

    /// Replay resolved cards and report hit statistics
    Backtest {
        /// Path to config.toml (built-in defaults if omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// JSON file holding a list of resolved cards
        history: PathBuf,
    },
}

fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();
    init_logging();

    let cli = Cli::parse();
    match cli.command {
        Commands::Plan {
            config,
            exclude,
            json,
            out,
            cards,
        } => {
            let planner = build_planner(config.as_deref())?;
            run_plan(&planner, &cards, &exclude, json, out.as_deref())
        }
        Commands::Backtest { config, history } => {
            let planner = build_planner(config.as_deref())?;
            run_backtest(planner, &history)
        }
    }
}

fn build_planner(path: Option<&Path>) -> Result<CouponPlanner> {
    let cfg = match path {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let planner = CouponPlanner::new(
        cfg.resolve_strategies()?,
        ChaosGauge::new(cfg.chaos),
        cfg.coupon,
    );
    let settings = planner.settings();
    info!(
        strategies = ?planner.strategies().map(|s| s.id.as_str()).collect::<Vec<_>>(),
        unit_price = settings.unit_price,
        tolerance = settings.tolerance,
        legs = settings.legs,
        "Configuration loaded"
    );
    Ok(planner)
}

fn run_plan(
    planner: &CouponPlanner,
    cards: &[PathBuf],
    exclude: &[String],
    json: bool,
    out: Option<&Path>,
) -> Result<()> {
    let source = JsonCardSource::default();
    let mut sheet: Vec<TicketRecord> = Vec::new();
    let mut sections = Vec::new();

    for path in cards {
        let key = path.to_string_lossy();
        let (card, tickets, records) = planner.plan_from(&source, &key, exclude)?;
        for record in &records {
            match record {
                PlanRecord::Skipped { venue, reason } => {
                    warn!(path = %key, %venue, %reason, "Card produced no coupon");
                }
                PlanRecord::Failed {
                    strategy_id,
                    reason,
                } => {
                    warn!(path = %key, strategy = %strategy_id, %reason, "Strategy produced no coupon");
                }
                PlanRecord::Planned { .. } | PlanRecord::OverBudget { .. } => {}
            }
        }
        if !tickets.is_empty() {
            sections.push(report::render_card(&card, &tickets));
        }
        sheet.extend(tickets.iter().map(TicketRecord::from));
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&sheet).context("Failed to serialise coupon sheet")?
        );
    } else {
        println!("{}", sections.join("\n"));
    }

    if let Some(out) = out {
        let out = out.to_string_lossy();
        storage::save_sheet(&sheet, Some(&out))?;
        info!(path = %out, coupons = sheet.len(), "Sheet written");
    }
    Ok(())
}

fn run_backtest(planner: CouponPlanner, history: &Path) -> Result<()> {
    let json = std::fs::read_to_string(history)
        .with_context(|| format!("Failed to read history: {}", history.display()))?;
    let cards: Vec<ResolvedCard> = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse history: {}", history.display()))?;

    let report = Backtester::new(planner).run(&cards);
    print_backtest(&report);
    Ok(())
}

fn print_backtest(report: &BacktestReport) {
    println!(
        "Cards played: {}  skipped: {}",
        report.cards_played, report.cards_skipped
    );
    for (id, stats) in &report.strategies {
        let legs: Vec<String> = stats
            .leg_hit_rates()
            .iter()
            .map(|r| format!("{:.0}%", r * 100.0))
            .collect();
        println!(
            "{id:<10} coupons {:>4}  wins {:>3}  hit {:>5.1}%  staked {:>10.2}  legs hit {:.2}  per leg [{}]",
            stats.coupons,
            stats.wins,
            stats.hit_rate() * 100.0,
            stats.total_staked,
            stats.mean_legs_hit(),
            legs.join(" ")
        );
    }
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("altili=info"));

    let json_logging = std::env::var("ALTILI_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
