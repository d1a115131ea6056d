//! Concrete rewrite rules
//!
//! Each rule lives in its own file: a pattern describing the subgraph it
//! fires on, a generator that synthesizes replacement nodes from a match,
//! and the transform entry point registered by name in
//! [`TransformRegistry::default`](crate::transform::TransformRegistry).

pub mod atrous_to_native;

pub use atrous_to_native::{atrous_to_native, TRANSFORM_NAME as ATROUS_TO_NATIVE};
