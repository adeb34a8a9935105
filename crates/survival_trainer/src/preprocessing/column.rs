//! Column routing: numeric and categorical branches over named columns

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::Frame;
use crate::errors::Result;

use super::encode::{FittedOneHotEncoder, HandleUnknown, OneHotEncoder};
use super::impute::{FittedMedianImputer, FittedMostFrequentImputer, MedianImputer, MostFrequentImputer};
use super::scale::{FittedMinMaxScaler, MinMaxScaler};

/// Median imputation followed by min-max scaling
#[derive(Clone, Debug, Default)]
pub struct NumericTransformer {
    imputer: MedianImputer,
    scaler: MinMaxScaler,
}

/// Most-frequent imputation followed by one-hot encoding
#[derive(Clone, Debug, Default)]
pub struct CategoricalTransformer {
    imputer: MostFrequentImputer,
    encoder: OneHotEncoder,
}

impl CategoricalTransformer {
    pub fn new(handle_unknown: HandleUnknown) -> Self {
        Self {
            imputer: MostFrequentImputer,
            encoder: OneHotEncoder::new(handle_unknown),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct FittedNumericColumn {
    name: String,
    imputer: FittedMedianImputer,
    scaler: FittedMinMaxScaler,
}

#[derive(Clone, Debug, PartialEq)]
struct FittedCategoricalColumn {
    name: String,
    imputer: FittedMostFrequentImputer,
    encoder: FittedOneHotEncoder,
}

/// Routes named columns through their branch; other columns are dropped
#[derive(Clone, Debug, Default)]
pub struct ColumnTransformer {
    numeric: NumericTransformer,
    numeric_columns: Vec<String>,
    categorical: CategoricalTransformer,
    categorical_columns: Vec<String>,
}

/// Output feature names, in output order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformLayout {
    pub feature_names: Vec<String>,
}

/// Fitted column transformer
#[derive(Clone, Debug, PartialEq)]
pub struct FittedColumnTransformer {
    numeric: Vec<FittedNumericColumn>,
    categorical: Vec<FittedCategoricalColumn>,
}

impl ColumnTransformer {
    pub fn new(
        numeric_columns: Vec<String>,
        categorical_columns: Vec<String>,
        handle_unknown: HandleUnknown,
    ) -> Self {
        Self {
            numeric: NumericTransformer::default(),
            numeric_columns,
            categorical: CategoricalTransformer::new(handle_unknown),
            categorical_columns,
        }
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical_columns
    }

    /// Fit every branch on its columns. A declared column absent from
    /// `frame` fails with `MissingColumn`.
    pub fn fit(&self, frame: &Frame) -> Result<FittedColumnTransformer> {
        let mut numeric = Vec::with_capacity(self.numeric_columns.len());
        for name in &self.numeric_columns {
            let values = frame.column(name)?.parse_numeric()?;
            let imputer = self.numeric.imputer.fit(name, &values)?;
            let scaler = self.numeric.scaler.fit(name, &imputer.transform(&values))?;
            debug!(
                "Numeric column {}: median={}, min={}, range={}",
                name, imputer.median, scaler.min, scaler.range
            );
            numeric.push(FittedNumericColumn {
                name: name.clone(),
                imputer,
                scaler,
            });
        }

        let mut categorical = Vec::with_capacity(self.categorical_columns.len());
        for name in &self.categorical_columns {
            let values = &frame.column(name)?.values;
            let imputer = self.categorical.imputer.fit(name, values)?;
            let encoder = self.categorical.encoder.fit(name, &imputer.transform(values))?;
            debug!(
                "Categorical column {}: fill={:?}, categories={:?}",
                name,
                imputer.fill_value,
                encoder.categories()
            );
            categorical.push(FittedCategoricalColumn {
                name: name.clone(),
                imputer,
                encoder,
            });
        }

        Ok(FittedColumnTransformer {
            numeric,
            categorical,
        })
    }
}

impl FittedColumnTransformer {
    /// Output feature names: numeric columns first, then one-hot blocks
    pub fn layout(&self) -> TransformLayout {
        let mut feature_names: Vec<String> = self.numeric.iter().map(|c| c.name.clone()).collect();
        for column in &self.categorical {
            feature_names.extend(column.encoder.feature_names());
        }
        TransformLayout { feature_names }
    }

    pub fn n_features(&self) -> usize {
        self.numeric.len()
            + self
                .categorical
                .iter()
                .map(|c| c.encoder.categories().len())
                .sum::<usize>()
    }

    /// Transform `frame` into a dense row-major feature matrix
    pub fn transform(&self, frame: &Frame) -> Result<Vec<Vec<f64>>> {
        let mut rows = vec![Vec::with_capacity(self.n_features()); frame.len()];

        for column in &self.numeric {
            let values = frame.column(&column.name)?.parse_numeric()?;
            let scaled = column.scaler.transform(&column.imputer.transform(&values));
            for (row, value) in rows.iter_mut().zip(scaled) {
                row.push(value);
            }
        }

        for column in &self.categorical {
            let values = &frame.column(&column.name)?.values;
            let encoded = column.encoder.transform(&column.imputer.transform(values))?;
            for (row, block) in rows.iter_mut().zip(encoded) {
                row.extend(block);
            }
        }

        Ok(rows)
    }
}
