//! Error types for atrous-optimizer
//!
//! This module defines all error types used throughout the crate.
//! Failures are tagged values propagated with `?`; a transform never
//! produces a partial output graph.

use thiserror::Error;

/// Main error type for graph transformation operations
#[derive(Error, Debug)]
pub enum TransformError {
    /// A rewrite builder indexed a match whose arity does not line up with
    /// its own pattern. Indicates a malformed pattern descriptor.
    #[error("pattern/match input count mismatch at node '{node}': expected at least {expected} inputs, found {actual}")]
    PatternInputCountMismatch {
        /// Node bound at the inconsistent match position
        node: String,
        /// Inputs the builder expected the match to carry
        expected: usize,
        /// Inputs the match actually carries
        actual: usize,
    },

    /// A node that must hold a statically known constant tensor does not
    #[error("missing constant value: {0}")]
    MissingConstantValue(String),

    /// A convolution variant outside the accepted set reached the builder
    #[error("unsupported op variant: {0}")]
    UnsupportedOpVariant(String),

    /// A referenced node name does not exist in the graph
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// Two nodes with the same name were inserted into one graph
    #[error("duplicate node name: {0}")]
    DuplicateNodeName(String),

    /// A constant tensor has an unexpected dtype, shape, or element count
    #[error("invalid tensor: {0}")]
    InvalidTensor(String),

    /// A transform name was not found in the registry
    #[error("unknown transform: {0}")]
    UnknownTransform(String),
}

/// Result type alias for graph transformation operations
pub type GraphResult<T> = Result<T, TransformError>;
