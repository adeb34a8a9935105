//! Preprocessing primitives
//!
//! - Median and most-frequent imputation
//! - Min-max scaling
//! - One-hot encoding
//! - Column routing that applies a numeric and a categorical branch to
//!   named columns and concatenates their output

pub mod column;
pub mod encode;
pub mod impute;
pub mod scale;

pub use column::{CategoricalTransformer, ColumnTransformer, FittedColumnTransformer, NumericTransformer, TransformLayout};
pub use encode::{FittedOneHotEncoder, HandleUnknown, OneHotEncoder};
pub use impute::{FittedMedianImputer, FittedMostFrequentImputer, MedianImputer, MostFrequentImputer};
pub use scale::{FittedMinMaxScaler, MinMaxScaler};
