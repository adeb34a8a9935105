//! Random forest classifier
//!
//! Bagged ensemble of CART trees. Each tree is grown on a bootstrap sample
//! with random feature subsampling at every node; predictions average the
//! per-tree class probabilities.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cart::{CartBuilder, DecisionTree, TreeConfig};
use crate::errors::{Result, TrainerError};

/// Number of features examined when looking for the best split
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    #[default]
    Sqrt,
    Log2,
    All,
    Count(usize),
    Fraction(f64),
}

impl MaxFeatures {
    /// Resolve the policy against the actual feature count
    pub fn resolve(&self, n_features: usize) -> usize {
        let n = n_features as f64;
        let resolved = match *self {
            MaxFeatures::Sqrt => n.sqrt() as usize,
            MaxFeatures::Log2 => {
                if n_features == 0 {
                    0
                } else {
                    n.log2() as usize
                }
            }
            MaxFeatures::All => n_features,
            MaxFeatures::Count(count) => count,
            MaxFeatures::Fraction(fraction) => (fraction * n) as usize,
        };
        resolved.clamp(1, n_features.max(1))
    }

    fn validate(&self) -> Result<()> {
        match *self {
            MaxFeatures::Count(0) => Err(TrainerError::InvalidParameter(
                "max_features count must be positive".into(),
            )),
            MaxFeatures::Fraction(f) if !(f > 0.0 && f <= 1.0) => Err(TrainerError::InvalidParameter(
                format!("max_features fraction must be in (0, 1], got {}", f),
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for MaxFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxFeatures::Sqrt => write!(f, "sqrt"),
            MaxFeatures::Log2 => write!(f, "log2"),
            MaxFeatures::All => write!(f, "all"),
            MaxFeatures::Count(n) => write!(f, "{}", n),
            MaxFeatures::Fraction(x) => write!(f, "{}", x),
        }
    }
}

impl FromStr for MaxFeatures {
    type Err = TrainerError;

    /// Accepts `sqrt`, `log2`, `all` (or `none`), an integer count, or a
    /// fraction such as `0.5`
    fn from_str(s: &str) -> Result<Self> {
        let policy = match s.trim().to_ascii_lowercase().as_str() {
            "sqrt" | "auto" => MaxFeatures::Sqrt,
            "log2" => MaxFeatures::Log2,
            "all" | "none" => MaxFeatures::All,
            other => {
                if let Ok(count) = other.parse::<usize>() {
                    MaxFeatures::Count(count)
                } else if let Ok(fraction) = other.parse::<f64>() {
                    MaxFeatures::Fraction(fraction)
                } else {
                    return Err(TrainerError::InvalidParameter(format!(
                        "unrecognised max_features policy: {}",
                        s
                    )));
                }
            }
        };
        policy.validate()?;
        Ok(policy)
    }
}

/// Random forest hyperparameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub max_features: MaxFeatures,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub bootstrap: bool,
    /// Seed for bootstrap and feature sampling; `None` draws from OS entropy
    pub random_state: Option<u64>,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            max_features: MaxFeatures::Sqrt,
            min_samples_split: 2,
            min_samples_leaf: 1,
            bootstrap: true,
            random_state: None,
        }
    }
}

/// Unfitted random forest classifier
#[derive(Clone, Debug)]
pub struct RandomForestClassifier {
    config: ForestConfig,
}

/// Fitted random forest
#[derive(Clone, Debug)]
pub struct FittedForest {
    classes: Vec<i64>,
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl RandomForestClassifier {
    /// Validate hyperparameters and build an unfitted classifier
    pub fn new(config: ForestConfig) -> Result<Self> {
        if config.n_trees == 0 {
            return Err(TrainerError::InvalidParameter(
                "n_trees must be a positive integer".into(),
            ));
        }
        if config.max_depth == Some(0) {
            return Err(TrainerError::InvalidParameter(
                "max_depth must be positive when set".into(),
            ));
        }
        if config.min_samples_split < 2 {
            return Err(TrainerError::InvalidParameter(
                "min_samples_split must be at least 2".into(),
            ));
        }
        if config.min_samples_leaf == 0 {
            return Err(TrainerError::InvalidParameter(
                "min_samples_leaf must be positive".into(),
            ));
        }
        config.max_features.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Fit the ensemble on a dense feature matrix and integer labels
    pub fn fit(&self, features: &[Vec<f64>], labels: &[i64]) -> Result<FittedForest> {
        if features.is_empty() {
            return Err(TrainerError::EmptyDataset);
        }
        if features.len() != labels.len() {
            return Err(TrainerError::ShapeMismatch {
                expected: features.len(),
                actual: labels.len(),
            });
        }
        let n_features = features[0].len();
        if let Some(row) = features.iter().find(|r| r.len() != n_features) {
            return Err(TrainerError::ShapeMismatch {
                expected: n_features,
                actual: row.len(),
            });
        }

        let classes: Vec<i64> = labels.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let encoded: Vec<usize> = labels
            .iter()
            .map(|label| classes.binary_search(label).unwrap_or_default())
            .collect();

        let tree_config = TreeConfig {
            max_depth: self.config.max_depth,
            max_features: self.config.max_features.resolve(n_features),
            min_samples_split: self.config.min_samples_split,
            min_samples_leaf: self.config.min_samples_leaf,
        };

        info!(
            "Fitting random forest: {} trees, {} samples, {} features ({} per split), {} classes",
            self.config.n_trees,
            features.len(),
            n_features,
            tree_config.max_features,
            classes.len()
        );

        let mut seeder = match self.config.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let builder = CartBuilder::new(features, &encoded, classes.len(), tree_config);
        let n_samples = features.len();
        let all_samples: Vec<usize> = (0..n_samples).collect();

        let mut trees = Vec::with_capacity(self.config.n_trees);
        for tree_idx in 0..self.config.n_trees {
            let mut rng = StdRng::seed_from_u64(seeder.gen());

            let tree = if self.config.bootstrap {
                let samples: Vec<usize> = (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
                builder.build(&samples, &mut rng)
            } else {
                builder.build(&all_samples, &mut rng)
            };

            debug!(
                "Tree {}/{}: {} nodes, depth {}",
                tree_idx + 1,
                self.config.n_trees,
                tree.nodes.len(),
                tree.depth()
            );
            trees.push(tree);
        }

        Ok(FittedForest {
            classes,
            trees,
            n_features,
        })
    }
}

impl FittedForest {
    /// Sorted distinct training labels; column order of `predict_proba`
    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Mean class probabilities across trees, one row per input row
    pub fn predict_proba(&self, features: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        features
            .iter()
            .map(|row| {
                if row.len() != self.n_features {
                    return Err(TrainerError::ShapeMismatch {
                        expected: self.n_features,
                        actual: row.len(),
                    });
                }
                let mut proba = vec![0.0; self.classes.len()];
                for tree in &self.trees {
                    for (acc, p) in proba.iter_mut().zip(tree.predict_proba(row)) {
                        *acc += p;
                    }
                }
                let n_trees = self.trees.len() as f64;
                proba.iter_mut().for_each(|p| *p /= n_trees);
                Ok(proba)
            })
            .collect()
    }

    /// Most probable class per row; ties go to the smaller label
    pub fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<i64>> {
        Ok(self
            .predict_proba(features)?
            .iter()
            .map(|proba| {
                let mut best = 0;
                for (idx, &p) in proba.iter().enumerate() {
                    if p > proba[best] {
                        best = idx;
                    }
                }
                self.classes[best]
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (Vec<Vec<f64>>, Vec<i64>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            let x = i as f64;
            features.push(vec![x, (i % 3) as f64]);
            labels.push(if i < 10 { 0 } else { 1 });
        }
        (features, labels)
    }

    fn seeded(n_trees: usize, seed: u64) -> RandomForestClassifier {
        RandomForestClassifier::new(ForestConfig {
            n_trees,
            random_state: Some(seed),
            ..ForestConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_max_features_resolve() {
        assert_eq!(MaxFeatures::Sqrt.resolve(6), 2);
        assert_eq!(MaxFeatures::Sqrt.resolve(1), 1);
        assert_eq!(MaxFeatures::Log2.resolve(8), 3);
        assert_eq!(MaxFeatures::All.resolve(6), 6);
        assert_eq!(MaxFeatures::Count(10).resolve(6), 6);
        assert_eq!(MaxFeatures::Fraction(0.5).resolve(6), 3);
        assert_eq!(MaxFeatures::Fraction(0.01).resolve(6), 1);
    }

    #[test]
    fn test_max_features_parse() {
        assert_eq!("sqrt".parse::<MaxFeatures>().unwrap(), MaxFeatures::Sqrt);
        assert_eq!("LOG2".parse::<MaxFeatures>().unwrap(), MaxFeatures::Log2);
        assert_eq!("none".parse::<MaxFeatures>().unwrap(), MaxFeatures::All);
        assert_eq!("4".parse::<MaxFeatures>().unwrap(), MaxFeatures::Count(4));
        assert_eq!("0.5".parse::<MaxFeatures>().unwrap(), MaxFeatures::Fraction(0.5));
        assert!("0".parse::<MaxFeatures>().is_err());
        assert!("1.5".parse::<MaxFeatures>().is_err());
        assert!("half".parse::<MaxFeatures>().is_err());
    }

    #[test]
    fn test_rejects_zero_trees() {
        let result = RandomForestClassifier::new(ForestConfig {
            n_trees: 0,
            ..ForestConfig::default()
        });
        assert!(matches!(result, Err(TrainerError::InvalidParameter(_))));
    }

    #[test]
    fn test_fit_predict_separable() {
        let (features, labels) = separable();
        let forest = seeded(25, 7).fit(&features, &labels).unwrap();

        assert_eq!(forest.n_trees(), 25);
        assert_eq!(forest.classes(), &[0, 1]);
        assert_eq!(forest.predict(&[vec![1.0, 0.0], vec![18.0, 0.0]]).unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (features, labels) = separable();
        let forest = seeded(10, 3).fit(&features, &labels).unwrap();

        for proba in forest.predict_proba(&features).unwrap() {
            let total: f64 = proba.iter().sum();
            assert!((total - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_seeded_fit_is_deterministic() {
        let (features, labels) = separable();
        let a = seeded(5, 11).fit(&features, &labels).unwrap();
        let b = seeded(5, 11).fit(&features, &labels).unwrap();
        assert_eq!(a.trees(), b.trees());
    }

    #[test]
    fn test_non_contiguous_labels() {
        let features = vec![vec![0.0], vec![1.0], vec![10.0], vec![11.0]];
        let labels = vec![-1, -1, 5, 5];
        let forest = RandomForestClassifier::new(ForestConfig {
            n_trees: 3,
            bootstrap: false,
            random_state: Some(1),
            ..ForestConfig::default()
        })
        .unwrap()
        .fit(&features, &labels)
        .unwrap();

        assert_eq!(forest.classes(), &[-1, 5]);
        assert_eq!(forest.predict(&features).unwrap(), labels);
    }

    #[test]
    fn test_predict_rejects_wrong_width() {
        let (features, labels) = separable();
        let forest = seeded(2, 1).fit(&features, &labels).unwrap();
        assert!(matches!(
            forest.predict(&[vec![1.0]]),
            Err(TrainerError::ShapeMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }
}
