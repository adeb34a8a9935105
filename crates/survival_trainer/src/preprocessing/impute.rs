//! Missing-value imputation

use std::collections::BTreeMap;

use crate::errors::{Result, TrainerError};

/// Fills missing numeric cells with the training median
#[derive(Clone, Debug, Default)]
pub struct MedianImputer;

/// Fitted median imputer
#[derive(Clone, Debug, PartialEq)]
pub struct FittedMedianImputer {
    pub median: f64,
}

impl MedianImputer {
    pub fn fit(&self, column: &str, values: &[Option<f64>]) -> Result<FittedMedianImputer> {
        let mut observed: Vec<f64> = values.iter().flatten().copied().collect();
        if observed.is_empty() {
            return Err(TrainerError::EmptyColumn(column.to_string()));
        }
        observed.sort_by(f64::total_cmp);

        let mid = observed.len() / 2;
        let median = if observed.len() % 2 == 0 {
            (observed[mid - 1] + observed[mid]) / 2.0
        } else {
            observed[mid]
        };
        Ok(FittedMedianImputer { median })
    }
}

impl FittedMedianImputer {
    pub fn transform(&self, values: &[Option<f64>]) -> Vec<f64> {
        values.iter().map(|v| v.unwrap_or(self.median)).collect()
    }
}

/// Fills missing categorical cells with the most frequent training value.
///
/// Ties resolve to the smallest value in lexicographic order.
#[derive(Clone, Debug, Default)]
pub struct MostFrequentImputer;

/// Fitted most-frequent imputer
#[derive(Clone, Debug, PartialEq)]
pub struct FittedMostFrequentImputer {
    pub fill_value: String,
}

impl MostFrequentImputer {
    pub fn fit(&self, column: &str, values: &[Option<String>]) -> Result<FittedMostFrequentImputer> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for value in values.iter().flatten() {
            *counts.entry(value.as_str()).or_default() += 1;
        }

        // BTreeMap iterates in ascending key order, so the first maximum wins ties
        let mut best: Option<(&str, usize)> = None;
        for (value, count) in counts {
            if best.map_or(true, |(_, c)| count > c) {
                best = Some((value, count));
            }
        }

        best.map(|(value, _)| FittedMostFrequentImputer {
            fill_value: value.to_string(),
        })
        .ok_or_else(|| TrainerError::EmptyColumn(column.to_string()))
    }
}

impl FittedMostFrequentImputer {
    pub fn transform(&self, values: &[Option<String>]) -> Vec<String> {
        values
            .iter()
            .map(|v| v.clone().unwrap_or_else(|| self.fill_value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(str::to_string)).collect()
    }

    #[test]
    fn test_median_odd_and_even() {
        let fitted = MedianImputer.fit("Age", &[Some(3.0), Some(1.0), Some(2.0)]).unwrap();
        assert_eq!(fitted.median, 2.0);

        let fitted = MedianImputer
            .fit("Age", &[Some(4.0), None, Some(1.0), Some(2.0), Some(3.0)])
            .unwrap();
        assert_eq!(fitted.median, 2.5);
    }

    #[test]
    fn test_median_fills_missing() {
        let values = [Some(10.0), None, Some(30.0)];
        let fitted = MedianImputer.fit("Fare", &values).unwrap();
        assert_eq!(fitted.transform(&values), vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_median_all_missing() {
        assert!(matches!(
            MedianImputer.fit("Age", &[None, None]),
            Err(TrainerError::EmptyColumn(_))
        ));
    }

    #[test]
    fn test_most_frequent() {
        let values = strings(&[Some("S"), Some("C"), None, Some("S"), Some("Q")]);
        let fitted = MostFrequentImputer.fit("Embarked", &values).unwrap();
        assert_eq!(fitted.fill_value, "S");
        assert_eq!(fitted.transform(&values), vec!["S", "C", "S", "S", "Q"]);
    }

    #[test]
    fn test_most_frequent_tie_picks_smallest() {
        let values = strings(&[Some("male"), Some("female"), Some("male"), Some("female")]);
        let fitted = MostFrequentImputer.fit("Sex", &values).unwrap();
        assert_eq!(fitted.fill_value, "female");
    }

    #[test]
    fn test_most_frequent_all_missing() {
        assert!(MostFrequentImputer.fit("Sex", &strings(&[None])).is_err());
    }
}
