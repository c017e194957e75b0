//! Dialogue error types.

use thiserror::Error;

use crate::node::NodeId;

/// Dialogue loading errors.
#[derive(Error, Debug)]
pub enum DialogError {
    /// Script could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Script file extension is not a known format
    #[error("Unsupported dialogue format: {0}")]
    UnsupportedFormat(String),

    /// Script text is not valid for its format
    #[error("Parse error: {0}")]
    Parse(String),

    /// Top-level value is neither a map nor a list of nodes
    #[error("Dialogue document is not a table of nodes")]
    NotATable,

    /// Script declared no nodes
    #[error("Dialogue document contains no nodes")]
    Empty,

    /// Two nodes resolved to the same id
    #[error("Duplicate node id {id} (node '{label}')")]
    DuplicateId { id: NodeId, label: String },

    /// Explicit id is zero or negative
    #[error("Invalid node id {id} (node '{label}'); ids must be positive")]
    InvalidId { id: NodeId, label: String },
}
