//! Min-max feature scaling

use crate::errors::{Result, TrainerError};

/// Rescales a numeric column to [0, 1] using the training range
#[derive(Clone, Debug, Default)]
pub struct MinMaxScaler;

/// Fitted min-max scaler. Values outside the training range are not clipped.
#[derive(Clone, Debug, PartialEq)]
pub struct FittedMinMaxScaler {
    pub min: f64,
    pub range: f64,
}

impl MinMaxScaler {
    pub fn fit(&self, column: &str, values: &[f64]) -> Result<FittedMinMaxScaler> {
        let (min, max) = values
            .iter()
            .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
            .ok_or_else(|| TrainerError::EmptyColumn(column.to_string()))?;

        Ok(FittedMinMaxScaler {
            min,
            range: max - min,
        })
    }
}

impl FittedMinMaxScaler {
    pub fn transform(&self, values: &[f64]) -> Vec<f64> {
        // A constant training column only gets shifted
        let divisor = if self.range > 0.0 { self.range } else { 1.0 };
        values.iter().map(|v| (v - self.min) / divisor).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scales_to_unit_range() {
        let values = [10.0, 20.0, 30.0];
        let fitted = MinMaxScaler.fit("Fare", &values).unwrap();
        assert_eq!(fitted.transform(&values), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_out_of_range_not_clipped() {
        let fitted = MinMaxScaler.fit("Age", &[0.0, 10.0]).unwrap();
        assert_eq!(fitted.transform(&[-5.0, 20.0]), vec![-0.5, 2.0]);
    }

    #[test]
    fn test_constant_column() {
        let fitted = MinMaxScaler.fit("Age", &[4.0, 4.0]).unwrap();
        assert_eq!(fitted.transform(&[4.0, 5.0]), vec![0.0, 1.0]);
    }

    #[test]
    fn test_empty_input() {
        assert!(MinMaxScaler.fit("Age", &[]).is_err());
    }
}
