//! Classification metrics and evaluation report

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dataset::Frame;
use crate::errors::{Result, TrainerError};
use crate::pipeline::FittedPipeline;

/// Fraction of predictions equal to the true label
pub fn accuracy_score(y_true: &[i64], y_pred: &[i64]) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    Ok(correct as f64 / y_true.len() as f64)
}

fn check_lengths(y_true: &[i64], y_pred: &[i64]) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(TrainerError::ShapeMismatch {
            expected: y_true.len(),
            actual: y_pred.len(),
        });
    }
    if y_true.is_empty() {
        return Err(TrainerError::EmptyDataset);
    }
    Ok(())
}

/// Counts of actual (rows) against predicted (columns) labels
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub labels: Vec<i64>,
    pub counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    /// Build a matrix over `labels` plus any label present in the inputs
    /// but missing from `labels`. Rows and columns are in sorted label order.
    pub fn new(labels: &[i64], y_true: &[i64], y_pred: &[i64]) -> Result<Self> {
        check_lengths(y_true, y_pred)?;

        let labels: Vec<i64> = labels
            .iter()
            .chain(y_true)
            .chain(y_pred)
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut counts = vec![vec![0usize; labels.len()]; labels.len()];
        for (t, p) in y_true.iter().zip(y_pred) {
            let row = labels.binary_search(t).unwrap_or_default();
            let col = labels.binary_search(p).unwrap_or_default();
            counts[row][col] += 1;
        }
        Ok(Self { labels, counts })
    }

    /// Matrix over the labels observed in the inputs only
    pub fn from_predictions(y_true: &[i64], y_pred: &[i64]) -> Result<Self> {
        Self::new(&[], y_true, y_pred)
    }

    /// Number of rows (and columns)
    pub fn size(&self) -> usize {
        self.labels.len()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn correct(&self) -> usize {
        (0..self.size()).map(|i| self.counts[i][i]).sum()
    }

    pub fn get(&self, actual: i64, predicted: i64) -> usize {
        match (self.labels.binary_search(&actual), self.labels.binary_search(&predicted)) {
            (Ok(row), Ok(col)) => self.counts[row][col],
            _ => 0,
        }
    }
}

/// Rendered like a numpy integer array, e.g. `[[50  6]\n [10 24]]`
impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .counts
            .iter()
            .flatten()
            .map(|c| c.to_string().len())
            .max()
            .unwrap_or(1);

        write!(f, "[")?;
        for (i, row) in self.counts.iter().enumerate() {
            if i > 0 {
                write!(f, "\n ")?;
            }
            let cells: Vec<String> = row.iter().map(|c| format!("{:>width$}", c, width = width)).collect();
            write!(f, "[{}]", cells.join(" "))?;
        }
        write!(f, "]")
    }
}

/// Result of scoring a fitted pipeline on held-out data
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub accuracy: f64,
    pub confusion_matrix: ConfusionMatrix,
    pub n_samples: usize,
}

impl Evaluation {
    /// Human-readable report: accuracy line, separator, confusion matrix
    pub fn report(&self) -> String {
        format!(
            "{:.1}% de bonnes réponses sur les données de test pour validation\n{}\nmatrice de confusion\n{}",
            self.accuracy * 100.0,
            "-".repeat(20),
            self.confusion_matrix
        )
    }
}

/// Predict on `x_test` and compare with `y_test`.
///
/// The confusion matrix always spans the classes seen during fit, so a
/// binary model yields a 2x2 matrix even when the test split holds a
/// single class.
pub fn evaluate_model(pipeline: &FittedPipeline, x_test: &Frame, y_test: &[i64]) -> Result<Evaluation> {
    let predicted = pipeline.predict(x_test)?;
    let accuracy = accuracy_score(y_test, &predicted)?;
    let confusion_matrix = ConfusionMatrix::new(pipeline.classes(), y_test, &predicted)?;
    Ok(Evaluation {
        accuracy,
        confusion_matrix,
        n_samples: y_test.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy_score(&[1, 0, 1, 1], &[1, 0, 0, 1]).unwrap(), 0.75);
        assert_eq!(accuracy_score(&[0], &[0]).unwrap(), 1.0);
    }

    #[test]
    fn test_accuracy_errors() {
        assert!(matches!(
            accuracy_score(&[1, 0], &[1]),
            Err(TrainerError::ShapeMismatch { .. })
        ));
        assert!(matches!(accuracy_score(&[], &[]), Err(TrainerError::EmptyDataset)));
    }

    #[test]
    fn test_confusion_matrix_layout() {
        let y_true = [0, 0, 0, 1, 1];
        let y_pred = [0, 1, 0, 1, 0];
        let matrix = ConfusionMatrix::from_predictions(&y_true, &y_pred).unwrap();

        assert_eq!(matrix.labels, vec![0, 1]);
        assert_eq!(matrix.counts, vec![vec![2, 1], vec![1, 1]]);
        assert_eq!(matrix.get(0, 1), 1);
        assert_eq!(matrix.total(), 5);
        assert_eq!(matrix.correct(), 3);
    }

    #[test]
    fn test_fitted_labels_keep_full_shape() {
        let matrix = ConfusionMatrix::new(&[0, 1], &[1, 1], &[1, 1]).unwrap();
        assert_eq!(matrix.size(), 2);
        assert_eq!(matrix.counts, vec![vec![0, 0], vec![0, 2]]);
    }

    #[test]
    fn test_display_like_numpy() {
        let matrix = ConfusionMatrix {
            labels: vec![0, 1],
            counts: vec![vec![50, 6], vec![10, 24]],
        };
        assert_eq!(matrix.to_string(), "[[50  6]\n [10 24]]");
    }

    #[test]
    fn test_report_format() {
        let evaluation = Evaluation {
            accuracy: 0.8333,
            confusion_matrix: ConfusionMatrix {
                labels: vec![0, 1],
                counts: vec![vec![3, 1], vec![0, 2]],
            },
            n_samples: 6,
        };
        let report = evaluation.report();
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(
            lines[0],
            "83.3% de bonnes réponses sur les données de test pour validation"
        );
        assert_eq!(lines[1], "--------------------");
        assert_eq!(lines[2], "matrice de confusion");
        assert_eq!(lines[3], "[[3 1]");
        assert_eq!(lines[4], " [0 2]]");
    }
}
