//! Tree-shaped subgraph pattern matching
//!
//! A rewrite rule describes the subgraph it fires on as an [`OpTypePattern`]
//! tree: each position names the op types it accepts (or is a wildcard) and
//! carries one child pattern per expected input. The [`GraphMatcher`] binds a
//! pattern against candidate root nodes and yields [`NodeMatch`] trees.
//!
//! # Example
//!
//! ```
//! use atrous_optimizer::graph::{GraphDef, NodeDef};
//! use atrous_optimizer::pattern::{GraphMatcher, OpTypePattern};
//!
//! let graph = GraphDef::from_nodes([
//!     NodeDef::new("x", "Placeholder"),
//!     NodeDef::new("relu", "Relu").with_input("x"),
//! ])
//! .unwrap();
//!
//! let pattern = OpTypePattern::op("Relu", vec![OpTypePattern::any()]);
//! let matcher = GraphMatcher::new(&graph);
//! let matches = matcher.find_matches(&pattern).unwrap();
//! assert_eq!(matches.len(), 1);
//! assert_eq!(matches[0].node.name, "relu");
//! ```

pub mod matcher;

pub use matcher::{GraphMatcher, NodeMatch, OpTypePattern};
