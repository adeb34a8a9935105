//! Property tests for accuracy and confusion matrix invariants

use proptest::prelude::*;
use survival_trainer::{accuracy_score, ConfusionMatrix};

fn paired_labels() -> impl Strategy<Value = (Vec<i64>, Vec<i64>)> {
    (1usize..200).prop_flat_map(|len| {
        (
            prop::collection::vec(0i64..2, len),
            prop::collection::vec(0i64..2, len),
        )
    })
}

proptest! {
    #[test]
    fn accuracy_in_unit_interval((y_true, y_pred) in paired_labels()) {
        let accuracy = accuracy_score(&y_true, &y_pred).unwrap();
        prop_assert!((0.0..=1.0).contains(&accuracy));
    }

    #[test]
    fn binary_matrix_is_two_by_two_and_sums_to_len((y_true, y_pred) in paired_labels()) {
        let matrix = ConfusionMatrix::new(&[0, 1], &y_true, &y_pred).unwrap();
        prop_assert_eq!(matrix.size(), 2);
        prop_assert_eq!(matrix.total(), y_true.len());
    }

    #[test]
    fn diagonal_matches_accuracy((y_true, y_pred) in paired_labels()) {
        let matrix = ConfusionMatrix::from_predictions(&y_true, &y_pred).unwrap();
        let accuracy = accuracy_score(&y_true, &y_pred).unwrap();
        let from_matrix = matrix.correct() as f64 / matrix.total() as f64;
        prop_assert!((accuracy - from_matrix).abs() < 1e-12);
    }
}
