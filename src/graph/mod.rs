//! Name-addressed dataflow graph model
//!
//! A [`GraphDef`] exclusively owns its [`NodeDef`] values, keyed by unique
//! name with declaration order preserved. Edges are name references, not
//! object pointers, so the structure is acyclic only by convention of the
//! producing system; consumers resolve names through the graph.
//!
//! # Example
//!
//! ```
//! use atrous_optimizer::graph::{GraphDef, NodeDef};
//!
//! let graph = GraphDef::from_nodes([
//!     NodeDef::new("x", "Placeholder"),
//!     NodeDef::new("relu", "Relu").with_input("x"),
//! ])
//! .unwrap();
//!
//! assert_eq!(graph.node("relu").unwrap().op, "Relu");
//! ```

pub mod attrs;
pub mod maps;

pub use attrs::AttrValue;
pub use maps::{
    build_consumer_counts, build_consumer_map, canonical_input_name, is_control_input,
    ConsumerCountMap, ConsumerMap,
};

use std::collections::BTreeMap;

use indexmap::IndexMap;

use crate::error::{GraphResult, TransformError};
use crate::tensor::TensorValue;

/// A single operation node
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDef {
    /// Unique name within the owning graph
    pub name: String,
    /// Operation type tag (e.g. `"Conv2D"`)
    pub op: String,
    /// Ordered input references by producer name, optionally `name:index`
    /// for an explicit output index or `^name` for a control dependency
    pub input: Vec<String>,
    /// Device placement string; empty when unconstrained
    pub device: String,
    /// Attribute map; BTreeMap keeps iteration deterministic
    pub attr: BTreeMap<String, AttrValue>,
}

impl NodeDef {
    /// Create a node with no inputs, attributes, or device
    pub fn new(name: impl Into<String>, op: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            op: op.into(),
            input: Vec::new(),
            device: String::new(),
            attr: BTreeMap::new(),
        }
    }

    /// Append an input reference
    pub fn add_input(&mut self, input: impl Into<String>) {
        self.input.push(input.into());
    }

    /// Builder-style [`add_input`](Self::add_input)
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.add_input(input);
        self
    }

    /// Builder-style device assignment
    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = device.into();
        self
    }

    /// Set or replace an attribute
    pub fn set_attr(&mut self, name: impl Into<String>, value: AttrValue) {
        self.attr.insert(name.into(), value);
    }

    /// Builder-style [`set_attr`](Self::set_attr)
    pub fn with_attr(mut self, name: impl Into<String>, value: AttrValue) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Get an attribute by name
    pub fn get_attr(&self, name: &str) -> Option<&AttrValue> {
        self.attr.get(name)
    }

    /// Whether the node carries the named attribute
    pub fn has_attr(&self, name: &str) -> bool {
        self.attr.contains_key(name)
    }

    /// Get a tensor attribute by name
    pub fn attr_tensor(&self, name: &str) -> Option<&TensorValue> {
        self.get_attr(name).and_then(AttrValue::as_tensor)
    }

    /// Get a string attribute by name
    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.get_attr(name).and_then(AttrValue::as_str)
    }

    /// Get an integer-list attribute by name
    pub fn attr_ints(&self, name: &str) -> Option<&[i64]> {
        self.get_attr(name).and_then(AttrValue::as_ints)
    }

    /// Get a boolean attribute by name
    pub fn attr_bool(&self, name: &str) -> Option<bool> {
        self.get_attr(name).and_then(AttrValue::as_bool)
    }

    /// Iterate over data inputs, skipping control dependencies
    pub fn non_control_inputs(&self) -> impl Iterator<Item = &str> {
        self.input
            .iter()
            .map(String::as_str)
            .filter(|input| !maps::is_control_input(input))
    }
}

/// A name-addressed collection of nodes, declaration order preserved
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphDef {
    nodes: IndexMap<String, NodeDef>,
}

impl GraphDef {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from nodes, erroring on a duplicate name
    pub fn from_nodes(nodes: impl IntoIterator<Item = NodeDef>) -> GraphResult<Self> {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node)?;
        }
        Ok(graph)
    }

    /// Insert a node; names must be unique within the graph
    pub fn add_node(&mut self, node: NodeDef) -> GraphResult<()> {
        if self.nodes.contains_key(&node.name) {
            return Err(TransformError::DuplicateNodeName(node.name));
        }
        self.nodes.insert(node.name.clone(), node);
        Ok(())
    }

    /// Look up a node by name
    pub fn node(&self, name: &str) -> Option<&NodeDef> {
        self.nodes.get(name)
    }

    /// Look up a node by name, erroring when absent
    pub fn require_node(&self, name: &str) -> GraphResult<&NodeDef> {
        self.node(name)
            .ok_or_else(|| TransformError::NodeNotFound(name.to_string()))
    }

    /// Whether a node with the given name exists
    pub fn has_node(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over nodes in declaration order
    pub fn nodes(&self) -> impl Iterator<Item = &NodeDef> {
        self.nodes.values()
    }

    /// Iterate over node names in declaration order
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Check that every input reference resolves to an existing node
    pub fn validate(&self) -> GraphResult<()> {
        for node in self.nodes() {
            for input in &node.input {
                let producer = maps::canonical_input_name(input);
                if !self.has_node(producer) {
                    return Err(TransformError::NodeNotFound(producer.to_string()));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::DataType;

    #[test]
    fn test_duplicate_name_rejected() {
        let mut graph = GraphDef::new();
        graph.add_node(NodeDef::new("a", "Const")).unwrap();
        let err = graph.add_node(NodeDef::new("a", "Relu")).unwrap_err();
        assert!(matches!(err, TransformError::DuplicateNodeName(name) if name == "a"));
    }

    #[test]
    fn test_declaration_order_preserved() {
        let graph = GraphDef::from_nodes([
            NodeDef::new("z", "Const"),
            NodeDef::new("a", "Relu").with_input("z"),
        ])
        .unwrap();
        let names: Vec<_> = graph.node_names().collect();
        assert_eq!(names, ["z", "a"]);
    }

    #[test]
    fn test_validate_missing_reference() {
        let graph =
            GraphDef::from_nodes([NodeDef::new("relu", "Relu").with_input("ghost")]).unwrap();
        let err = graph.validate().unwrap_err();
        assert!(matches!(err, TransformError::NodeNotFound(name) if name == "ghost"));
    }

    #[test]
    fn test_validate_resolves_decorated_inputs() {
        let graph = GraphDef::from_nodes([
            NodeDef::new("split", "Split"),
            NodeDef::new("use", "Relu").with_input("split:1").with_input("^split"),
        ])
        .unwrap();
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_attr_accessors() {
        let node = NodeDef::new("conv", "Conv2D")
            .with_attr("T", AttrValue::Type(DataType::Float))
            .with_attr("strides", AttrValue::IntList(vec![1, 1, 1, 1]))
            .with_attr("padding", AttrValue::Str("VALID".into()))
            .with_attr("use_cudnn_on_gpu", AttrValue::Bool(true));

        assert_eq!(node.attr_str("padding"), Some("VALID"));
        assert_eq!(node.attr_ints("strides"), Some(&[1, 1, 1, 1][..]));
        assert_eq!(node.attr_bool("use_cudnn_on_gpu"), Some(true));
        assert!(node.has_attr("T"));
        assert!(node.attr_str("strides").is_none());
    }

    #[test]
    fn test_non_control_inputs() {
        let node = NodeDef::new("n", "Add")
            .with_input("a")
            .with_input("^deps")
            .with_input("b:2");
        let inputs: Vec<_> = node.non_control_inputs().collect();
        assert_eq!(inputs, ["a", "b:2"]);
    }
}
