//! Random train/test splitting

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::Frame;
use crate::errors::{Result, TrainerError};

/// How a dataset is divided into training and held-out rows
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplitOptions {
    /// Fraction of rows held out for evaluation, in (0, 1)
    pub test_size: f64,
    /// Shuffle seed; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            test_size: 0.1,
            seed: None,
        }
    }
}

/// Training and held-out partitions of a labelled table
#[derive(Clone, Debug)]
pub struct TrainTestSplit {
    pub x_train: Frame,
    pub x_test: Frame,
    pub y_train: Vec<i64>,
    pub y_test: Vec<i64>,
}

/// Shuffle rows and hold out `ceil(test_size * n)` of them.
///
/// Both partitions must end up non-empty.
pub fn train_test_split(x: &Frame, y: &[i64], options: &SplitOptions) -> Result<TrainTestSplit> {
    if x.len() != y.len() {
        return Err(TrainerError::ShapeMismatch {
            expected: x.len(),
            actual: y.len(),
        });
    }
    if !(options.test_size > 0.0 && options.test_size < 1.0) {
        return Err(TrainerError::InvalidParameter(format!(
            "test_size must be in (0, 1), got {}",
            options.test_size
        )));
    }

    let n = x.len();
    let n_test = (options.test_size * n as f64).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(TrainerError::InvalidParameter(format!(
            "test_size {} leaves an empty partition for {} rows",
            options.test_size, n
        )));
    }

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut rng);

    let (test_rows, train_rows) = order.split_at(n_test);
    debug!("Split {} rows into {} train / {} test", n, train_rows.len(), test_rows.len());

    Ok(TrainTestSplit {
        x_train: x.select_rows(train_rows),
        x_test: x.select_rows(test_rows),
        y_train: train_rows.iter().map(|&r| y[r]).collect(),
        y_test: test_rows.iter().map(|&r| y[r]).collect(),
    })
}
