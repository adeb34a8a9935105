//! Survival Trainer CLI
//!
//! Fits a random forest survival classifier on the dataset named by
//! `DATA_PATH` and prints its accuracy and confusion matrix.

use anyhow::{Context, Result};
use clap::Parser;
use survival_trainer::{
    load_dotenv, train_and_evaluate, EnvSettings, Frame, MaxFeatures, PipelineConfig, SplitOptions, TARGET_COLUMN,
};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "survival-train")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Random forest parameters", long_about = None)]
struct Args {
    /// Number of trees
    #[arg(long = "n_trees", default_value = "20")]
    n_trees: usize,

    /// Maximum tree depth (unbounded when omitted)
    #[arg(long = "max_depth")]
    max_depth: Option<usize>,

    /// Features examined per split: sqrt, log2, all, a count or a fraction
    #[arg(long = "max_features", default_value = "sqrt")]
    max_features: MaxFeatures,

    /// Fraction of rows held out for evaluation
    #[arg(long = "test_size", default_value = "0.1")]
    test_size: f64,

    /// Random seed for the split and the forest (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Print the evaluation as JSON
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Survival Trainer v{}", env!("CARGO_PKG_VERSION"));

    load_dotenv();
    let settings = EnvSettings::from_env();
    println!("{}", settings.api_token_status());

    // Load dataset
    let frame = Frame::from_csv(&settings.data_path)
        .with_context(|| format!("Failed to load dataset from {}", settings.data_path.display()))?;
    info!("Loaded {} rows", frame.len());

    let config = PipelineConfig::new(args.n_trees)
        .with_max_depth(args.max_depth)
        .with_max_features(args.max_features)
        .with_random_state(args.seed);

    info!("Training configuration:");
    info!("  Trees: {}", config.n_trees);
    info!(
        "  Max depth: {}",
        config.max_depth.map_or_else(|| "none".to_string(), |d| d.to_string())
    );
    info!("  Max features: {}", config.max_features);
    info!("  Test size: {}", args.test_size);

    let split = SplitOptions {
        test_size: args.test_size,
        seed: args.seed,
    };

    let evaluation = train_and_evaluate(&frame, TARGET_COLUMN, config, &split)
        .context("Training failed")?;

    if args.json {
        let json = serde_json::to_string_pretty(&evaluation)
            .context("Failed to serialize evaluation")?;
        println!("{}", json);
    } else {
        println!("{}", evaluation.report());
    }

    Ok(())
}
