//! Error types for the tabular loaders.

use thiserror::Error;

/// Errors raised while loading release files into the graph.
#[derive(Error, Debug)]
pub enum LoadError {
    /// I/O error reading a source file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Graph or schema rejection while writing a row.
    #[error(transparent)]
    Graph(#[from] loinc_graph::GraphError),

    /// A source file is missing from the release layout.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was probed.
        path: String,
    },

    /// The header row does not have the expected number of columns.
    #[error("invalid header: expected {expected} columns, found {found}")]
    HeaderColumnCount {
        /// Expected column count.
        expected: usize,
        /// Actual column count.
        found: usize,
    },

    /// A data row does not have the expected number of columns.
    #[error("row {row}: expected {expected} columns, found {found}")]
    ColumnCount {
        /// 1-based data row number.
        row: usize,
        /// Expected column count.
        expected: usize,
        /// Actual column count.
        found: usize,
    },

    /// A part-link row names a property outside the link vocabulary.
    #[error("row {row}: unknown part-link property {value:?}")]
    UnknownLinkProperty {
        /// 1-based data row number.
        row: usize,
        /// The unrecognized property value.
        value: String,
    },
}

/// Result type for loader operations.
pub type LoadResult<T> = Result<T, LoadError>;
