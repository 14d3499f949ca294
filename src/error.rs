use thiserror::Error;

/// Errors returned by clustering algorithms in this crate.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// Input slice is empty.
    #[error("empty input")]
    EmptyInput,

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: &'static str,
    },

    /// Requested cluster count is incompatible with the dataset.
    #[error("invalid cluster count: requested {requested}, but dataset has {n_items} items")]
    InvalidClusterCount {
        /// Requested number of clusters.
        requested: usize,
        /// Number of items in the dataset.
        n_items: usize,
    },

    /// Points in a dataset have inconsistent dimensionality.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimensionality.
        expected: usize,
        /// Found dimensionality.
        found: usize,
    },

    /// A point has the right number of dimensions but not the same named set.
    #[error("point {index} does not share the dimension names of point 0")]
    SchemaMismatch {
        /// Index of the offending point.
        index: usize,
    },

    /// A point carries a NaN or infinite coordinate.
    #[error("point {index} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Index of the offending point.
        index: usize,
    },

    /// The run was stopped through its cancellation flag.
    #[error("clustering cancelled")]
    Cancelled,

    /// The run did not finish before its deadline.
    #[error("clustering deadline exceeded")]
    DeadlineExceeded,
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
