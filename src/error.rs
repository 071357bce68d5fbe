use thiserror::Error;

/// Crate-wide error type.
///
/// Fatal pipeline failures are surfaced through these variants; non-fatal
/// findings (imbalance, cardinality drift, target anomalies) never become
/// errors and ride in the audit payloads instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error")]
    Io(#[source] std::io::Error),

    #[error("CSV error")]
    Csv(#[source] csv::Error),

    #[error("JSON error")]
    Json(#[source] serde_json::Error),

    #[error("YAML error")]
    Yaml(#[source] serde_yaml::Error),

    #[error("malformed contract schema: {0}")]
    Schema(String),

    #[error("invalid decision: {0}")]
    DecisionValidation(String),

    #[error("scope violation: {0}")]
    ScopeViolation(String),

    #[error("statistic undefined: column '{column}' has no non-null values; use an explicit constant strategy")]
    StatisticUndefined { column: String },

    #[error("mapping coverage failure: {0}")]
    Coverage(String),

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("duplicate column name: {0}")]
    DuplicateColumnName(String),

    #[error("inconsistent row count: expected {expected}, found {found}")]
    InconsistentRowCount { expected: usize, found: usize },

    #[error("column type mismatch: column '{name}', expected {expected:?}, found {found:?}")]
    ColumnTypeMismatch {
        name: String,
        expected: crate::column::ColumnType,
        found: crate::column::ColumnType,
    },

    #[error("index out of bounds: index {index}, size {size}")]
    IndexOutOfBounds { index: usize, size: usize },

    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Yaml(err)
    }
}
