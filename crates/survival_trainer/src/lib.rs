//! Survival Trainer - passenger survival classifier
//!
//! Loads a passenger table, holds out a test split, fits a
//! preprocessing-plus-random-forest pipeline and reports accuracy and a
//! confusion matrix.

pub mod cart;
pub mod config;
pub mod dataset;
pub mod errors;
pub mod forest;
pub mod metrics;
pub mod pipeline;
pub mod preprocessing;
pub mod split;

use std::path::Path;

use tracing::info;

pub use config::{load_dotenv, EnvSettings, TARGET_COLUMN};
pub use dataset::{Column, Frame};
pub use errors::{Result, TrainerError};
pub use forest::{FittedForest, ForestConfig, MaxFeatures, RandomForestClassifier};
pub use metrics::{accuracy_score, evaluate_model, ConfusionMatrix, Evaluation};
pub use pipeline::{create_pipeline, FittedPipeline, Pipeline, PipelineConfig};
pub use split::{train_test_split, SplitOptions, TrainTestSplit};

/// Split `frame`, fit a pipeline on the training rows and evaluate it on
/// the held-out rows.
pub fn train_and_evaluate(
    frame: &Frame,
    target: &str,
    config: PipelineConfig,
    split: &SplitOptions,
) -> Result<Evaluation> {
    let (x, y) = frame.split_target(target)?;
    let parts = train_test_split(&x, &y, split)?;
    info!(
        "Training on {} rows, evaluating on {} rows",
        parts.y_train.len(),
        parts.y_test.len()
    );

    let pipe = create_pipeline(config)?;
    let fitted = pipe.fit(&parts.x_train, &parts.y_train)?;
    evaluate_model(&fitted, &parts.x_test, &parts.y_test)
}

/// Load a CSV file and run [`train_and_evaluate`] on it
pub fn train_and_evaluate_csv(
    path: &Path,
    target: &str,
    config: PipelineConfig,
    split: &SplitOptions,
) -> Result<Evaluation> {
    let frame = Frame::from_csv(path)?;
    info!("Loaded {} rows from {}", frame.len(), path.display());
    train_and_evaluate(&frame, target, config, split)
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
