//! Transform dispatch: configuration, function type, and registry
//!
//! Transforms are pure functions from one graph value to a fresh graph
//! value. A [`TransformRegistry`] maps stable string identifiers to
//! transforms so callers can sequence them by name.

pub mod replace;

pub use replace::replace_matching_op_types;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::error::{GraphResult, TransformError};
use crate::graph::GraphDef;

/// Opaque per-invocation parameters, passed uniformly to every transform
///
/// Individual transforms may ignore it; it exists so a registry can invoke
/// all transforms through one signature.
#[derive(Debug, Clone, Default)]
pub struct TransformConfig {
    /// Parameter name → values
    pub params: FxHashMap<String, Vec<String>>,
}

impl TransformConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Values of a named parameter, if present
    pub fn param(&self, name: &str) -> Option<&[String]> {
        self.params.get(name).map(Vec::as_slice)
    }
}

/// Signature every registered transform conforms to
pub type TransformFn = fn(&GraphDef, &TransformConfig) -> GraphResult<GraphDef>;

/// Name-addressed transform collection, registration order preserved
pub struct TransformRegistry {
    transforms: IndexMap<String, TransformFn>,
}

impl TransformRegistry {
    /// Create a registry with nothing registered
    pub fn empty() -> Self {
        Self {
            transforms: IndexMap::new(),
        }
    }

    /// Register a transform under a stable identifier
    ///
    /// Re-registering a name replaces the previous entry.
    pub fn register(&mut self, name: impl Into<String>, transform: TransformFn) {
        self.transforms.insert(name.into(), transform);
    }

    /// Look up a transform by name
    pub fn get(&self, name: &str) -> Option<TransformFn> {
        self.transforms.get(name).copied()
    }

    /// Registered names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.transforms.keys().map(String::as_str)
    }

    /// Run one named transform
    pub fn run(
        &self,
        name: &str,
        graph: &GraphDef,
        config: &TransformConfig,
    ) -> GraphResult<GraphDef> {
        let transform = self
            .get(name)
            .ok_or_else(|| TransformError::UnknownTransform(name.to_string()))?;
        transform(graph, config)
    }

    /// Run several named transforms in caller-specified order
    pub fn run_sequence(
        &self,
        names: &[&str],
        graph: &GraphDef,
        config: &TransformConfig,
    ) -> GraphResult<GraphDef> {
        let mut current = graph.clone();
        for name in names {
            current = self.run(name, &current, config)?;
        }
        Ok(current)
    }
}

impl Default for TransformRegistry {
    /// Registry with all transforms shipped by this crate
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(
            crate::transformers::atrous_to_native::TRANSFORM_NAME,
            crate::transformers::atrous_to_native::atrous_to_native,
        );
        registry
    }
}
