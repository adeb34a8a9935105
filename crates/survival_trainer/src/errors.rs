use thiserror::Error;

/// Errors returned while loading data, fitting or evaluating a pipeline.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("env file error: {0}")]
    EnvFile(#[from] dotenvy::Error),

    #[error("column not found in dataset: {0}")]
    MissingColumn(String),

    #[error("column {column}, row {row}: cannot parse {value:?} as a number")]
    InvalidNumber {
        column: String,
        row: usize,
        value: String,
    },

    #[error("row {row}: invalid label {value:?}")]
    InvalidLabel { row: usize, value: String },

    #[error("column {0} has no observed values to fit on")]
    EmptyColumn(String),

    #[error("dataset is empty")]
    EmptyDataset,

    #[error("column {column}: category {value:?} was not seen during fit")]
    UnknownCategory { column: String, value: String },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },
}

/// Result type for trainer operations
pub type Result<T> = std::result::Result<T, TrainerError>;
