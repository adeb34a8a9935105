//! One-hot encoding of categorical columns

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, TrainerError};

/// What to do with a category that was not seen during fit
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    /// Fail the transform
    #[default]
    Error,
    /// Emit an all-zero block
    Ignore,
}

/// Encodes each distinct training value as its own binary column
#[derive(Clone, Debug, Default)]
pub struct OneHotEncoder {
    pub handle_unknown: HandleUnknown,
}

/// Fitted encoder holding the sorted training categories
#[derive(Clone, Debug, PartialEq)]
pub struct FittedOneHotEncoder {
    column: String,
    categories: Vec<String>,
    handle_unknown: HandleUnknown,
}

impl OneHotEncoder {
    pub fn new(handle_unknown: HandleUnknown) -> Self {
        Self { handle_unknown }
    }

    pub fn fit(&self, column: &str, values: &[String]) -> Result<FittedOneHotEncoder> {
        let categories: Vec<String> = values
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if categories.is_empty() {
            return Err(TrainerError::EmptyColumn(column.to_string()));
        }
        Ok(FittedOneHotEncoder {
            column: column.to_string(),
            categories,
            handle_unknown: self.handle_unknown,
        })
    }
}

impl FittedOneHotEncoder {
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Output column names, `<column>_<category>`
    pub fn feature_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|c| format!("{}_{}", self.column, c))
            .collect()
    }

    /// One row of `categories().len()` indicators per input value
    pub fn transform(&self, values: &[String]) -> Result<Vec<Vec<f64>>> {
        values
            .iter()
            .map(|value| {
                let mut row = vec![0.0; self.categories.len()];
                match self.categories.binary_search(value) {
                    Ok(pos) => row[pos] = 1.0,
                    Err(_) if self.handle_unknown == HandleUnknown::Ignore => {}
                    Err(_) => {
                        return Err(TrainerError::UnknownCategory {
                            column: self.column.clone(),
                            value: value.clone(),
                        })
                    }
                }
                Ok(row)
            })
            .collect()
    }
}
