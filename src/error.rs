//! Error types for the amara library.

use thiserror::Error;

/// Result type alias for amara operations.
pub type Result<T> = std::result::Result<T, AmaraError>;

/// Errors that can occur while assembling datasets or fitting models.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AmaraError {
    /// Two input lists that must pair up have different lengths.
    #[error("arity mismatch: {what} expects {expected} entries, got {got}")]
    ArityMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    /// A date value could not be parsed under the requested format.
    #[error("could not parse date in column '{column}': {value}")]
    ParseError { column: String, value: String },

    /// An operation was called before the step it depends on.
    #[error("not ready: {0} must be called first")]
    NotReady(&'static str),

    /// No historically comparable year pair exists for a dataset.
    #[error("no valid prior year found for dataset {dataset}")]
    NoValidPriorYear { dataset: usize },

    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// A named column does not exist.
    #[error("column not found: {0}")]
    ColumnNotFound(String),

    /// A column name is used twice in one table.
    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    /// Index out of bounds.
    #[error("index out of bounds: {index} (size: {size})")]
    IndexOutOfBounds { index: usize, size: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),
}
