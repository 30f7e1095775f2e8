//! Insurance cost trainer CLI
//!
//! Grid-searches the regressor families and writes `model.json`,
//! `scaler.json` and `model.hash` for the prediction server.

use anyhow::{Context, Result};
use clap::Parser;
use insurance_core::ModelFamily;
use insurance_trainer::{Dataset, Trainer, TrainingParams};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "cost-train")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train and select an insurance cost regressor", long_about = None)]
struct Args {
    /// Input CSV dataset (age,sex,bmi,children,smoker,region,charges)
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for model.json, scaler.json and model.hash
    #[arg(short, long, default_value = "artifacts")]
    output: PathBuf,

    /// Fraction of rows held out for testing
    #[arg(long, default_value = "0.2")]
    test_ratio: f64,

    /// Cross-validation folds
    #[arg(long, default_value = "5")]
    folds: usize,

    /// Random seed for deterministic shuffling
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Restrict the search to these families (ridge, tree, boosting)
    #[arg(long = "family")]
    families: Vec<ModelFamily>,

    /// Skip dataset shuffling
    #[arg(long)]
    no_shuffle: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Insurance cost trainer v{}", env!("CARGO_PKG_VERSION"));

    info!("Loading dataset from: {}", args.input.display());
    let dataset = Dataset::from_csv(&args.input).context("Failed to load dataset")?;
    info!("Loaded {} rows", dataset.len());
    if let Some(summary) = dataset.target_summary() {
        info!(
            "  charges: min={:.2} max={:.2} mean={:.2}",
            summary.min, summary.max, summary.mean
        );
    }

    let params = TrainingParams {
        test_ratio: args.test_ratio,
        folds: args.folds,
        seed: args.seed,
        shuffle: !args.no_shuffle,
        families: if args.families.is_empty() {
            ModelFamily::ALL.to_vec()
        } else {
            args.families
        },
    };

    info!("Training configuration:");
    info!("  Test ratio: {}", params.test_ratio);
    info!("  Folds: {}", params.folds);
    info!("  Seed: {} (shuffle: {})", params.seed, params.shuffle);
    info!(
        "  Families: {}",
        params
            .families
            .iter()
            .map(|f| f.name())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let outcome = Trainer::new(params).train(dataset).context("Training failed")?;

    info!("Leaderboard:");
    info!("  {:<10} {:>10} {:>12} {:>12}", "family", "test r2", "test rmse", "cv mse");
    for report in &outcome.leaderboard {
        info!(
            "  {:<10} {:>10.4} {:>12.2} {:>12.2}",
            report.family().name(),
            report.metrics.test_r2,
            report.metrics.test_rmse,
            report.metrics.cv_mse
        );
    }
    info!("Selected: {}", outcome.artifacts.model().hyperparams);

    let saved = outcome
        .artifacts
        .save(&args.output)
        .with_context(|| format!("Failed to write artifacts to {}", args.output.display()))?;

    info!("Training completed successfully");
    info!("  Model: {}", saved.model_path.display());
    info!("  Scaler: {}", saved.scaler_path.display());
    info!("  Hash: {} ({})", saved.hash_path.display(), saved.model_hash);

    Ok(())
}
