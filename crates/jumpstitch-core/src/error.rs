//! Error handling for Jumpstitch
//!
//! Provides error types for every layer of the jump-to-stroke pipeline:
//! - Document errors (node lookup and tree mutation)
//! - Path data errors (SVG `d` parsing)
//! - Transform errors (SVG `transform` parsing and inversion)
//! - Jump errors (selection preconditions and stitch plan failures)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Document error type
///
/// Represents failures of the host document: unknown handles, operations on
/// nodes of the wrong kind, and forbidden tree mutations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    /// No node with this id exists in the document
    #[error("Node {id} not found")]
    NodeNotFound {
        /// The id that was looked up.
        id: u64,
    },

    /// The node cannot hold children
    #[error("Node {id} is not a container")]
    NotAContainer {
        /// The id of the offending node.
        id: u64,
    },

    /// The node has no path geometry
    #[error("Node {id} is not a path")]
    NotAPath {
        /// The id of the offending node.
        id: u64,
    },

    /// The node has no parent (only the root is parentless)
    #[error("Node {id} has no parent")]
    Orphan {
        /// The id of the offending node.
        id: u64,
    },

    /// The drawing root cannot be removed
    #[error("The document root cannot be removed")]
    RemoveRoot,
}

/// Path data error type
///
/// Represents errors encountered while parsing SVG path data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathDataError {
    /// Path data is syntactically invalid
    #[error("Invalid path data at token {position}: {reason}")]
    InvalidSyntax {
        /// Index of the token where parsing failed.
        position: usize,
        /// The reason for the syntax error.
        reason: String,
    },

    /// Path data does not start with a moveto
    #[error("Path data must start with a moveto command")]
    MissingMoveTo,
}

/// Transform error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    /// The transform attribute could not be parsed
    #[error("Invalid transform '{value}': {reason}")]
    InvalidSyntax {
        /// The attribute text.
        value: String,
        /// The reason the text was rejected.
        reason: String,
    },

    /// The transform has no inverse
    #[error("Transform is not invertible (determinant {determinant})")]
    Singular {
        /// The determinant of the linear part.
        determinant: f64,
    },
}

/// Jump conversion error type
///
/// Represents the precondition and collaborator failures of a jump-to-stroke run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JumpError {
    /// Fewer than two embroidery elements are selected
    #[error("Please select at least two elements to convert the jump stitch to a running stitch.")]
    InsufficientSelection {
        /// The number of eligible elements found.
        count: usize,
    },

    /// The stitch planner produced no stitches for an element
    #[error("Element {node} produced no stitches")]
    EmptyStitchPlan {
        /// The node the element was built from.
        node: u64,
    },
}

/// Main error type for Jumpstitch
///
/// Aggregates the domain errors plus I/O and option failures.
#[derive(Error, Debug)]
pub enum Error {
    /// Document error
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Path data error
    #[error(transparent)]
    PathData(#[from] PathDataError),

    /// Transform error
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// Jump conversion error
    #[error(transparent)]
    Jump(#[from] JumpError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Options rejected before a run
    #[error("Invalid options: {0}")]
    InvalidOptions(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
    /// Check if this is a user-facing precondition failure
    pub fn is_precondition(&self) -> bool {
        matches!(self, Error::Jump(JumpError::InsufficientSelection { .. }))
    }

    /// Check if this is a document error
    pub fn is_document_error(&self) -> bool {
        matches!(self, Error::Document(_))
    }
}

/// Result type for Jumpstitch operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_error_display() {
        let err = DocumentError::NodeNotFound { id: 42 };
        assert_eq!(err.to_string(), "Node 42 not found");

        let err = DocumentError::RemoveRoot;
        assert_eq!(err.to_string(), "The document root cannot be removed");
    }

    #[test]
    fn test_insufficient_selection_message() {
        let err: Error = JumpError::InsufficientSelection { count: 1 }.into();
        assert!(err.is_precondition());
        assert_eq!(
            err.to_string(),
            "Please select at least two elements to convert the jump stitch to a running stitch."
        );
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = PathDataError::MissingMoveTo.into();
        assert!(matches!(err, Error::PathData(_)));
        assert!(!err.is_precondition());

        let err: Error = DocumentError::NotAPath { id: 3 }.into();
        assert!(err.is_document_error());

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
