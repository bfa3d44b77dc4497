use crate::column_transformations::ColumnTransformationError;
use thiserror::Error;

/// Raised at the loading boundary; the pipeline is never invoked on a
/// dataset that failed to parse.
#[derive(Error, Debug)]
pub enum DatasetLoadError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("input contains no columns")]
    Empty,
}

#[derive(Error, Debug)]
#[error("epsilon must be > 0 (got {epsilon})")]
pub struct InvalidConfig {
    pub epsilon: f64,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] DatasetLoadError),

    #[error(transparent)]
    InvalidConfig(#[from] InvalidConfig),

    #[error(transparent)]
    ColumnTransformation(#[from] ColumnTransformationError),

    #[error("column '{column}' has {got} rows, expected {expected}")]
    MismatchedRowCount {
        column: String,
        expected: usize,
        got: usize,
    },

    #[error("duplicate column name '{0}'")]
    DuplicateColumn(String),
}
