//! # Atrous Optimizer
//!
//! Dataflow-graph rewriting engine whose shipped rule collapses
//! space-to-batch wrapped ("atrous") convolutions into single native dilated
//! convolutions.
//!
//! ## Features
//!
//! - **Pattern Matching**: tree-shaped subgraph patterns with wildcard
//!   positions and op-type alternatives
//! - **Safe Splicing**: non-overlapping matches applied in one atomic pass,
//!   with single-consumer checks before any node is deleted
//! - **Constant Inference**: rewrite parameters read from constant-valued
//!   graph nodes
//!
//! ## Example
//!
//! ```ignore
//! use atrous_optimizer::prelude::*;
//!
//! let registry = TransformRegistry::default();
//! let optimized = registry.run("atrous_to_native", &graph, &TransformConfig::new())?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod graph;
pub mod pattern;
pub mod tensor;
pub mod transform;
pub mod transformers;

/// Prelude module - import commonly used types with `use atrous_optimizer::prelude::*`
pub mod prelude {
    pub use crate::error::{GraphResult, TransformError};
    pub use crate::graph::{AttrValue, GraphDef, NodeDef};
    pub use crate::pattern::{GraphMatcher, NodeMatch, OpTypePattern};
    pub use crate::tensor::{DataType, TensorValue};
    pub use crate::transform::{
        replace_matching_op_types, TransformConfig, TransformFn, TransformRegistry,
    };
    pub use crate::transformers::{atrous_to_native, ATROUS_TO_NATIVE};
}

pub use error::{GraphResult, TransformError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
