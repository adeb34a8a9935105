//! Preprocessing-plus-classifier pipeline
//!
//! `create_pipeline` wires a numeric branch (median imputation, min-max
//! scaling) and a categorical branch (most-frequent imputation, one-hot
//! encoding) in front of a random forest. Feature names are not checked
//! against any table until `fit`.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dataset::Frame;
use crate::errors::{Result, TrainerError};
use crate::forest::{FittedForest, ForestConfig, MaxFeatures, RandomForestClassifier};
use crate::metrics::accuracy_score;
use crate::preprocessing::{ColumnTransformer, FittedColumnTransformer, HandleUnknown, TransformLayout};

/// Default numeric feature columns
pub const NUMERIC_FEATURES: [&str; 2] = ["Age", "Fare"];
/// Default categorical feature columns
pub const CATEGORICAL_FEATURES: [&str; 2] = ["Embarked", "Sex"];

/// Pipeline configuration, fixed for the life of a run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub n_trees: usize,
    pub numeric_features: Vec<String>,
    pub categorical_features: Vec<String>,
    pub max_depth: Option<usize>,
    pub max_features: MaxFeatures,
    pub random_state: Option<u64>,
    #[serde(default)]
    pub handle_unknown: HandleUnknown,
}

impl PipelineConfig {
    /// Default feature lists with the given tree count
    pub fn new(n_trees: usize) -> Self {
        Self {
            n_trees,
            numeric_features: NUMERIC_FEATURES.iter().map(|s| s.to_string()).collect(),
            categorical_features: CATEGORICAL_FEATURES.iter().map(|s| s.to_string()).collect(),
            max_depth: None,
            max_features: MaxFeatures::Sqrt,
            random_state: None,
            handle_unknown: HandleUnknown::Error,
        }
    }

    pub fn with_numeric_features<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.numeric_features = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_categorical_features<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.categorical_features = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_random_state(mut self, seed: Option<u64>) -> Self {
        self.random_state = seed;
        self
    }

    pub fn with_handle_unknown(mut self, handle_unknown: HandleUnknown) -> Self {
        self.handle_unknown = handle_unknown;
        self
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(20)
    }
}

/// Unfitted pipeline: column transformer followed by a random forest
#[derive(Clone, Debug)]
pub struct Pipeline {
    preprocessor: ColumnTransformer,
    classifier: RandomForestClassifier,
}

/// Build an unfitted pipeline from `config`.
///
/// Fails only on invalid classifier hyperparameters (for example a tree
/// count of zero).
pub fn create_pipeline(config: PipelineConfig) -> Result<Pipeline> {
    let preprocessor = ColumnTransformer::new(
        config.numeric_features,
        config.categorical_features,
        config.handle_unknown,
    );
    let classifier = RandomForestClassifier::new(ForestConfig {
        n_trees: config.n_trees,
        max_depth: config.max_depth,
        max_features: config.max_features,
        random_state: config.random_state,
        ..ForestConfig::default()
    })?;
    Ok(Pipeline {
        preprocessor,
        classifier,
    })
}

impl Pipeline {
    pub fn preprocessor(&self) -> &ColumnTransformer {
        &self.preprocessor
    }

    pub fn classifier(&self) -> &RandomForestClassifier {
        &self.classifier
    }

    /// Fit the preprocessing branches, transform `x`, then fit the forest
    pub fn fit(&self, x: &Frame, y: &[i64]) -> Result<FittedPipeline> {
        if x.len() != y.len() {
            return Err(TrainerError::ShapeMismatch {
                expected: x.len(),
                actual: y.len(),
            });
        }

        let preprocessor = self.preprocessor.fit(x)?;
        let features = preprocessor.transform(x)?;
        info!(
            "Preprocessed {} rows into {} features",
            features.len(),
            preprocessor.n_features()
        );

        let classifier = self.classifier.fit(&features, y)?;
        Ok(FittedPipeline {
            preprocessor,
            classifier,
        })
    }
}

/// Fitted preprocessing transforms plus the fitted ensemble
#[derive(Clone, Debug)]
pub struct FittedPipeline {
    preprocessor: FittedColumnTransformer,
    classifier: FittedForest,
}

impl FittedPipeline {
    /// Preprocessing output only, without the classifier
    pub fn transform(&self, x: &Frame) -> Result<Vec<Vec<f64>>> {
        self.preprocessor.transform(x)
    }

    pub fn predict(&self, x: &Frame) -> Result<Vec<i64>> {
        self.classifier.predict(&self.transform(x)?)
    }

    pub fn predict_proba(&self, x: &Frame) -> Result<Vec<Vec<f64>>> {
        self.classifier.predict_proba(&self.transform(x)?)
    }

    /// Mean accuracy on `x` against `y`
    pub fn score(&self, x: &Frame, y: &[i64]) -> Result<f64> {
        let predicted = self.predict(x)?;
        accuracy_score(y, &predicted)
    }

    pub fn classes(&self) -> &[i64] {
        self.classifier.classes()
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.layout().feature_names
    }

    pub fn layout(&self) -> TransformLayout {
        self.preprocessor.layout()
    }

    pub fn n_trees(&self) -> usize {
        self.classifier.n_trees()
    }

    pub fn forest(&self) -> &FittedForest {
        &self.classifier
    }
}
