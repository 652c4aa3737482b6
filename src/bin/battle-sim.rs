//! Battle Simulator CLI Tool
//!
//! Command-line tool for exercising the ranking engine end to end without a
//! UI: builds a library of items, runs full battle sessions with simulated
//! judgments, and prints the resulting rankings.
//!
//! Usage:
//!   cargo run --bin battle-sim -- simulate --items 20 --sessions 3
//!   cargo run --bin battle-sim -- simulate --items-file songs.json --skip-rate 0.1
//!   cargo run --bin battle-sim -- expected --rating-a 1500 --rating-b 1900

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::Rng;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use trackduel::config::AppConfig;
use trackduel::rating::EloCalculator;
use trackduel::{
    BattleEngine, BattleOutcome, InMemoryRatingStorage, ItemKind, RankableItem, RatingStore,
};

/// Trackduel Battle Simulator - judge-free ranking sessions
#[derive(Parser)]
#[command(
    name = "battle-sim",
    version,
    about = "Simulate head-to-head ranking sessions against the trackduel engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one or more full battle sessions with simulated judgments
    Simulate {
        /// Number of synthetic items to generate
        #[arg(short, long, default_value = "20")]
        items: usize,
        /// JSON file with an array of items (overrides --items)
        #[arg(long, value_name = "FILE")]
        items_file: Option<PathBuf>,
        /// Context key to rank under
        #[arg(short, long, default_value = "global_songs")]
        context: String,
        /// Number of sessions to run back to back
        #[arg(short, long, default_value = "1")]
        sessions: usize,
        /// Probability that a matchup is skipped instead of judged
        #[arg(long, default_value = "0.0")]
        skip_rate: f64,
        /// Rows to print in the final ranking table
        #[arg(long, default_value = "10")]
        top: usize,
    },
    /// Print the Elo expected score for a single hypothetical matchup
    Expected {
        #[arg(long)]
        rating_a: f64,
        #[arg(long)]
        rating_b: f64,
    },
}

fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::from_env()?;
    let log_level = cli
        .log_level
        .unwrap_or_else(|| config.service.log_level.clone());
    init_logging(&log_level)?;

    match cli.command {
        Commands::Simulate {
            items,
            items_file,
            context,
            sessions,
            skip_rate,
            top,
        } => run_simulation(&config, items, items_file, context, sessions, skip_rate, top),
        Commands::Expected { rating_a, rating_b } => {
            let calculator = EloCalculator::new(config.rating)?;
            let expected = calculator.expected_score(rating_a, rating_b);
            println!(
                "P(A beats B) = {expected:.4}   P(B beats A) = {:.4}",
                1.0 - expected
            );
            Ok(())
        }
    }
}

fn run_simulation(
    config: &AppConfig,
    item_count: usize,
    items_file: Option<PathBuf>,
    context: String,
    sessions: usize,
    skip_rate: f64,
    top: usize,
) -> Result<()> {
    let items = match items_file {
        Some(path) => load_items(&path)?,
        None => synthetic_items(item_count),
    };

    info!(items = items.len(), context = %context, sessions, "Starting simulation");

    let storage = Arc::new(InMemoryRatingStorage::new());
    let store = Arc::new(RatingStore::with_calculator(
        storage.clone(),
        EloCalculator::new(config.rating.clone())?,
    ));
    let mut engine = BattleEngine::with_config(store, storage, config.pairing.clone());

    // Hidden preference order: earlier items are "better" and win most of
    // the time, so the final table should roughly recover item order.
    let mut rng = rand::rng();

    for session in 0..sessions {
        engine.setup(items.clone(), context.clone())?;
        let total = engine.session().map(|s| s.total_battles).unwrap_or(0);
        info!(session = session + 1, total_battles = total, "Session set up");

        while let Some(matchup) = engine.current_matchup().cloned() {
            let outcome = if rng.random::<f64>() < skip_rate {
                BattleOutcome::Skipped
            } else {
                simulate_judgment(&items, &matchup, &mut rng)
            };
            engine.record_outcome(outcome)?;
        }

        info!(
            session = session + 1,
            completed = engine.completed_count(),
            skipped = engine.skipped_count(),
            progress = engine.progress(),
            "Session finished"
        );
    }

    print_rankings(&engine, &context, top);
    Ok(())
}

fn simulate_judgment(
    items: &[RankableItem],
    matchup: &trackduel::Matchup,
    rng: &mut impl Rng,
) -> BattleOutcome {
    let position = |id: &str| items.iter().position(|item| item.id == id).unwrap_or(0);
    let first_is_better = position(&matchup.first.id) < position(&matchup.second.id);

    // The better item wins 75% of the time, and 5% of judgments are ties.
    if rng.random::<f64>() < 0.05 {
        return BattleOutcome::BothLiked;
    }
    let first_wins = rng.random::<f64>() < if first_is_better { 0.75 } else { 0.25 };
    BattleOutcome::WinnerSelected {
        winner_id: if first_wins {
            matchup.first.id.clone()
        } else {
            matchup.second.id.clone()
        },
    }
}

fn synthetic_items(count: usize) -> Vec<RankableItem> {
    (0..count)
        .map(|i| {
            RankableItem::new(
                format!("song-{i:03}"),
                format!("Track {i:03}"),
                "Synthetic Artist",
                ItemKind::Song,
            )
        })
        .collect()
}

fn load_items(path: &PathBuf) -> Result<Vec<RankableItem>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read items file {}", path.display()))?;
    let items: Vec<RankableItem> =
        serde_json::from_str(&contents).context("Items file is not a valid JSON item array")?;
    Ok(items)
}

fn print_rankings(engine: &BattleEngine, context: &str, top: usize) {
    let stats = engine.context_statistics(context);
    println!();
    println!(
        "Context {context}: {} items, {} battles, average rating {:.1}",
        stats.item_count, stats.total_battles, stats.average_rating
    );
    println!(
        "{:<4} {:<24} {:>8} {:>8} {:>6} {:>6} {:>6} {:>6}",
        "#", "Title", "Rating", "Battles", "W", "L", "T", "Conf"
    );

    for (rank, record) in engine.rankings(context, Some(top)).iter().enumerate() {
        println!(
            "{:<4} {:<24} {:>8.1} {:>8} {:>6} {:>6} {:>6} {:>6.2}",
            rank + 1,
            record.item_id,
            record.rating,
            record.battles,
            record.wins,
            record.losses,
            record.ties,
            record.confidence()
        );
    }
}
