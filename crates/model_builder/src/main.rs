//! Model Builder CLI
//!
//! Discretized game files → trained model artifact, plus query tools.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use model_builder::{collect_game_files, train, TrainReport};
use puckcast_core::{
    load_model, GameState, PowerCache, Propagator, RestoredModel, Zone,
};

#[derive(Parser)]
#[command(name = "model_builder")]
#[command(about = "Train and query hockey win-probability Markov models", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a model from discretized game files
    Train {
        /// Game files or directories of .json game files
        #[arg(long, required = true, num_args = 1..)]
        games: Vec<PathBuf>,

        /// Output model artifact path
        #[arg(long)]
        out: PathBuf,

        /// Output metadata JSON file
        #[arg(long)]
        metadata: Option<PathBuf>,
    },

    /// Forecast the 3-way outcome from a game state
    Forecast {
        /// Trained model artifact
        #[arg(long)]
        model: PathBuf,

        /// Score differential (home minus away)
        #[arg(long)]
        score: i32,

        /// Situation code (e.g. 1551 for 5v5)
        #[arg(long, default_value = "1551")]
        situation: u16,

        /// Zone letter: O, N, or D
        #[arg(long, default_value = "N")]
        zone: String,

        /// Number of 10-second ticks to propagate
        #[arg(long)]
        steps: u32,

        /// Directory for cached matrix powers
        #[arg(long)]
        cache_dir: Option<PathBuf>,
    },

    /// Print metadata of a model artifact
    Inspect {
        /// Model artifact path
        #[arg(long)]
        model: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Train { games, out, metadata } => {
            println!("🔨 Training model...");
            let game_files = collect_game_files(&games)?;
            println!("   Games:  {}", game_files.len());
            println!("   Output: {}", out.display());

            let report = train(&game_files, &out)?;
            print_report(&report);

            if let Some(metadata_path) = metadata {
                let json = serde_json::to_string_pretty(&report)?;
                std::fs::write(&metadata_path, json)?;
                println!("\n📄 Metadata saved to: {}", metadata_path.display());
            }
        }

        Commands::Forecast { model, score, situation, zone, steps, cache_dir } => {
            let Some(zone) = Zone::from_str(&zone) else {
                bail!("Invalid zone {:?}: expected O, N, or D", zone);
            };
            let start = GameState::clamped(score, situation, zone);

            let snapshot = load_model(&model)
                .with_context(|| format!("Failed to load model: {}", model.display()))?;
            let (space, matrix) = match snapshot.restore()? {
                RestoredModel::Trained { space, matrix, .. } => (space, matrix),
                // A raw-counts artifact still answers queries; normalize on the fly
                RestoredModel::Counts(model) => {
                    let matrix = model.normalized();
                    (model.space().clone(), matrix)
                }
            };

            let mut propagator = match cache_dir {
                Some(dir) => Propagator::with_cache(space, matrix, PowerCache::new(dir)),
                None => Propagator::new(space, matrix),
            };
            let probs = propagator.forecast(&start, steps)?;

            println!("Forecast after {} ticks ({}s of play):", steps, steps * 10);
            println!("   Away win: {:.1}%", probs.away_win * 100.0);
            println!("   Draw:     {:.1}%", probs.draw * 100.0);
            println!("   Home win: {:.1}%", probs.home_win * 100.0);
            let lost = 1.0 - probs.total();
            if lost > 1e-9 {
                println!("   ({:.3}% of mass reached unobserved states)", lost * 100.0);
            }
        }

        Commands::Inspect { model } => {
            let snapshot = load_model(&model)
                .with_context(|| format!("Failed to load model: {}", model.display()))?;
            println!("Model artifact: {}", model.display());
            println!("   Version:    {}", snapshot.version);
            println!("   Normalized: {}", snapshot.normalized);
            println!("   States:     {}", snapshot.dim);
            println!("   Dropped:    {} transition pairs", snapshot.dropped);
        }
    }

    Ok(())
}

fn print_report(report: &TrainReport) {
    println!("\n✅ Model trained successfully!");
    println!("   Artifact size: {} bytes ({:.2} KB)", report.artifact_size, report.artifact_size as f64 / 1024.0);
    println!("   States:        {}", report.dim);
    println!("   Observed:      {} transitions", report.observed_transitions);
    println!("   Dropped:       {} transition pairs", report.dropped_transitions);
    println!("   Checksum:      {}", report.checksum);
    println!("   Created:       {}", report.created_at);
}
