//! Error types for schema registration and graph mutation.

use thiserror::Error;

/// Errors raised by the schema registry.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A node type was registered twice under the same key.
    #[error("duplicate node type: {key}")]
    DuplicateType {
        /// Code of the already-registered key.
        key: String,
    },

    /// A node type lookup failed and the schema is strict.
    #[error("unknown node type: {key}")]
    UnknownType {
        /// Code of the missing key.
        key: String,
    },

    /// A property type lookup failed and the node type is strict.
    #[error("unknown property type {key} on node type {node_type}")]
    UnknownProperty {
        /// Code of the owning node type.
        node_type: String,
        /// Code of the missing property key.
        key: String,
    },

    /// An edge type lookup failed and the node type is strict.
    #[error("unknown edge type {key} on node type {node_type}")]
    UnknownEdge {
        /// Code of the owning node type.
        node_type: String,
        /// Code of the missing edge key.
        key: String,
    },
}

/// Errors raised by graph mutation and persistence.
#[derive(Error, Debug)]
pub enum GraphError {
    /// Schema contract violation.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A code does not match its node type's identifier pattern.
    ///
    /// Identifier disjointness between node types sharing a base URL (LOINC
    /// terms and parts both live under `https://loinc.org/`) depends on this
    /// check.
    #[error("code {code:?} is not valid for node type {node_type}")]
    InvalidCode {
        /// Code of the node type.
        node_type: String,
        /// The rejected code.
        code: String,
    },

    /// A single-valued edge kind already points at a different target.
    ///
    /// Signals a source-data anomaly (e.g. a term claiming two primary
    /// components) rather than a bug in the pipeline.
    #[error("conflicting {kind} edge from {from}: existing target {existing}, new target {new}")]
    ConflictingEdge {
        /// Identifier of the source node.
        from: String,
        /// Code of the edge kind.
        kind: String,
        /// Identifier of the already-linked target.
        existing: String,
        /// Identifier of the newly-asserted target.
        new: String,
    },

    /// I/O error during graph persistence.
    #[error("IO error during graph persistence: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error during graph persistence.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;
