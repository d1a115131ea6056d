//! Pattern descriptor trees and the recursive subgraph matcher

use rustc_hash::FxHashSet;

use crate::error::{GraphResult, TransformError};
use crate::graph::{maps, GraphDef, NodeDef};

/// A position in a pattern tree
///
/// Immutable once built; rules construct their pattern once at registration
/// time and reuse it for every invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum OpTypePattern {
    /// Wildcard: accepts any node and does not recurse into its inputs
    Any,
    /// Accepts nodes whose op is in `ops`; `inputs` are matched position by
    /// position against the node's data inputs
    Op {
        /// Accepted op-type alternatives
        ops: Vec<String>,
        /// Child patterns aligned to input positions
        inputs: Vec<OpTypePattern>,
    },
}

impl OpTypePattern {
    /// The wildcard pattern
    pub fn any() -> Self {
        OpTypePattern::Any
    }

    /// An op pattern; alternatives are separated by `|`
    /// (e.g. `"Conv2D|DepthwiseConv2dNative"`)
    pub fn op(ops: &str, inputs: Vec<OpTypePattern>) -> Self {
        OpTypePattern::Op {
            ops: ops.split('|').map(str::to_string).collect(),
            inputs,
        }
    }

    /// Whether this position is the wildcard
    pub fn is_wildcard(&self) -> bool {
        matches!(self, OpTypePattern::Any)
    }

    /// Child patterns; empty for the wildcard
    pub fn inputs(&self) -> &[OpTypePattern] {
        match self {
            OpTypePattern::Any => &[],
            OpTypePattern::Op { inputs, .. } => inputs,
        }
    }

    /// Whether the given op type is accepted at this position
    pub fn accepts(&self, op: &str) -> bool {
        match self {
            OpTypePattern::Any => true,
            OpTypePattern::Op { ops, .. } => ops.iter().any(|candidate| candidate == op),
        }
    }
}

/// A successful binding of a pattern tree to concrete nodes
///
/// `inputs` mirrors the pattern's children; a wildcard position binds its
/// node with no children.
#[derive(Debug, Clone)]
pub struct NodeMatch<'g> {
    /// The bound node
    pub node: &'g NodeDef,
    /// Child matches aligned to the pattern's child positions
    pub inputs: Vec<NodeMatch<'g>>,
}

impl<'g> NodeMatch<'g> {
    /// Names of every node bound anywhere in this match tree, preorder
    pub fn node_names(&self) -> Vec<&'g str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names(&self, out: &mut Vec<&'g str>) {
        let node: &'g NodeDef = self.node;
        out.push(node.name.as_str());
        for child in &self.inputs {
            child.collect_names(out);
        }
    }
}

/// Matches pattern trees against a graph
///
/// Holds the consumer counts needed for the single-consumer safety check, so
/// build one matcher per pass rather than per candidate.
pub struct GraphMatcher<'g> {
    graph: &'g GraphDef,
    consumer_counts: maps::ConsumerCountMap,
}

impl<'g> GraphMatcher<'g> {
    /// Create a matcher over the given graph
    pub fn new(graph: &'g GraphDef) -> Self {
        Self {
            graph,
            consumer_counts: maps::build_consumer_counts(graph),
        }
    }

    fn consumer_count(&self, name: &str) -> usize {
        self.consumer_counts.get(name).copied().unwrap_or(0)
    }

    fn resolve_input(&self, input: &str) -> GraphResult<&'g NodeDef> {
        let name = maps::canonical_input_name(input);
        self.graph
            .node(name)
            .ok_or_else(|| TransformError::NodeNotFound(name.to_string()))
    }

    /// Match a pattern tree rooted at the given node
    ///
    /// A wildcard binds the node without recursing. An op position fails
    /// when the node's op is not accepted or its data input count differs
    /// from the pattern's child count; otherwise every child pattern must
    /// match the corresponding resolved input node. An input name that does
    /// not resolve is an error, not a failed match.
    pub fn match_pattern(
        &self,
        pattern: &OpTypePattern,
        node: &'g NodeDef,
    ) -> GraphResult<Option<NodeMatch<'g>>> {
        if pattern.is_wildcard() {
            return Ok(Some(NodeMatch {
                node,
                inputs: Vec::new(),
            }));
        }

        if !pattern.accepts(&node.op) {
            return Ok(None);
        }

        let data_inputs: Vec<&str> = node.non_control_inputs().collect();
        if data_inputs.len() != pattern.inputs().len() {
            return Ok(None);
        }

        let mut children = Vec::with_capacity(data_inputs.len());
        for (child_pattern, input) in pattern.inputs().iter().zip(data_inputs) {
            let producer = self.resolve_input(input)?;
            match self.match_pattern(child_pattern, producer)? {
                Some(child) => children.push(child),
                None => return Ok(None),
            }
        }

        Ok(Some(NodeMatch {
            node,
            inputs: children,
        }))
    }

    /// Collect all non-overlapping matches in one pass
    ///
    /// Candidates are enumerated in declaration order. An otherwise
    /// successful match is rejected when a non-root, non-wildcard member has
    /// more than one consumer graph-wide (deleting it would dangle an
    /// unrelated reference), or when any node in its tree was already
    /// claimed by an earlier match in the same pass. An accepted match
    /// claims every node it binds, wildcard leaves included: a wildcard
    /// leaf's original copy is re-emitted by the rewrite, so letting a
    /// later match root or rebind it would splice two conflicting
    /// definitions of one name into the output. The overlapping site stays
    /// untouched this pass and becomes eligible on a subsequent run.
    pub fn find_matches(&self, pattern: &OpTypePattern) -> GraphResult<Vec<NodeMatch<'g>>> {
        let mut claimed: FxHashSet<&'g str> = FxHashSet::default();
        let mut matches = Vec::new();

        for node in self.graph.nodes() {
            if claimed.contains(node.name.as_str()) {
                continue;
            }
            let candidate = match self.match_pattern(pattern, node)? {
                Some(m) => m,
                None => continue,
            };

            let bound = candidate.node_names();
            if bound.iter().any(|name| claimed.contains(name)) {
                continue;
            }
            let private = private_members(pattern, &candidate);
            if private.iter().any(|name| self.consumer_count(name) != 1) {
                continue;
            }

            claimed.extend(bound);
            matches.push(candidate);
        }

        Ok(matches)
    }
}

/// Names bound at non-root, non-wildcard positions of a match
///
/// These are the nodes the rewrite deletes without replacement, so they must
/// be private to the match.
fn private_members<'g>(pattern: &OpTypePattern, m: &NodeMatch<'g>) -> Vec<&'g str> {
    fn walk<'g>(
        pattern: &OpTypePattern,
        m: &NodeMatch<'g>,
        is_root: bool,
        out: &mut Vec<&'g str>,
    ) {
        if pattern.is_wildcard() {
            return;
        }
        if !is_root {
            let node: &'g NodeDef = m.node;
            out.push(node.name.as_str());
        }
        for (child_pattern, child) in pattern.inputs().iter().zip(&m.inputs) {
            walk(child_pattern, child, false, out);
        }
    }

    let mut out = Vec::new();
    walk(pattern, m, true, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeDef;

    fn chain_graph() -> GraphDef {
        // x -> neg1 -> neg2 -> neg3
        GraphDef::from_nodes([
            NodeDef::new("x", "Placeholder"),
            NodeDef::new("neg1", "Neg").with_input("x"),
            NodeDef::new("neg2", "Neg").with_input("neg1"),
            NodeDef::new("neg3", "Neg").with_input("neg2"),
        ])
        .unwrap()
    }

    #[test]
    fn test_wildcard_binds_without_recursion() {
        let graph = chain_graph();
        let matcher = GraphMatcher::new(&graph);
        let m = matcher
            .match_pattern(&OpTypePattern::any(), graph.node("neg2").unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(m.node.name, "neg2");
        assert!(m.inputs.is_empty());
    }

    #[test]
    fn test_op_mismatch_fails() {
        let graph = chain_graph();
        let matcher = GraphMatcher::new(&graph);
        let pattern = OpTypePattern::op("Relu", vec![OpTypePattern::any()]);
        let m = matcher
            .match_pattern(&pattern, graph.node("neg2").unwrap())
            .unwrap();
        assert!(m.is_none());
    }

    #[test]
    fn test_alternative_ops() {
        let graph = chain_graph();
        let matcher = GraphMatcher::new(&graph);
        let pattern = OpTypePattern::op("Relu|Neg", vec![OpTypePattern::any()]);
        let m = matcher
            .match_pattern(&pattern, graph.node("neg2").unwrap())
            .unwrap();
        assert!(m.is_some());
    }

    #[test]
    fn test_input_count_mismatch_fails() {
        let graph = chain_graph();
        let matcher = GraphMatcher::new(&graph);
        // neg2 has one input, pattern expects two
        let pattern =
            OpTypePattern::op("Neg", vec![OpTypePattern::any(), OpTypePattern::any()]);
        let m = matcher
            .match_pattern(&pattern, graph.node("neg2").unwrap())
            .unwrap();
        assert!(m.is_none());
    }

    #[test]
    fn test_recursive_match_binds_tree() {
        let graph = chain_graph();
        let matcher = GraphMatcher::new(&graph);
        let pattern = OpTypePattern::op(
            "Neg",
            vec![OpTypePattern::op("Neg", vec![OpTypePattern::any()])],
        );
        let m = matcher
            .match_pattern(&pattern, graph.node("neg3").unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(m.node.name, "neg3");
        assert_eq!(m.inputs[0].node.name, "neg2");
        assert_eq!(m.inputs[0].inputs[0].node.name, "neg1");
        assert_eq!(m.node_names(), ["neg3", "neg2", "neg1"]);
    }

    #[test]
    fn test_unresolved_input_is_error() {
        let graph =
            GraphDef::from_nodes([NodeDef::new("neg", "Neg").with_input("ghost")]).unwrap();
        let matcher = GraphMatcher::new(&graph);
        let pattern = OpTypePattern::op("Neg", vec![OpTypePattern::any()]);
        let err = matcher
            .match_pattern(&pattern, graph.node("neg").unwrap())
            .unwrap_err();
        assert!(matches!(err, TransformError::NodeNotFound(name) if name == "ghost"));
    }

    #[test]
    fn test_control_inputs_ignored_for_arity() {
        let graph = GraphDef::from_nodes([
            NodeDef::new("x", "Placeholder"),
            NodeDef::new("init", "NoOp"),
            NodeDef::new("neg", "Neg").with_input("x").with_input("^init"),
        ])
        .unwrap();
        let matcher = GraphMatcher::new(&graph);
        let pattern = OpTypePattern::op("Neg", vec![OpTypePattern::any()]);
        let m = matcher
            .match_pattern(&pattern, graph.node("neg").unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(m.inputs[0].node.name, "x");
    }

    #[test]
    fn test_find_matches_excludes_overlap() {
        // neg3 -> neg2 -> neg1 chain: the Neg[Neg[*]] pattern first fires at
        // neg2 (claiming neg1), leaving neg3 unable to claim neg2.
        let graph = chain_graph();
        let matcher = GraphMatcher::new(&graph);
        let pattern = OpTypePattern::op(
            "Neg",
            vec![OpTypePattern::op("Neg", vec![OpTypePattern::any()])],
        );
        let matches = matcher.find_matches(&pattern).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].node.name, "neg2");
    }

    #[test]
    fn test_find_matches_rejects_shared_interior() {
        // neg1 feeds both neg2 and branch, so a match at neg2 would delete a
        // node something else still references.
        let graph = GraphDef::from_nodes([
            NodeDef::new("x", "Placeholder"),
            NodeDef::new("neg1", "Neg").with_input("x"),
            NodeDef::new("neg2", "Neg").with_input("neg1"),
            NodeDef::new("branch", "Relu").with_input("neg1"),
        ])
        .unwrap();
        let matcher = GraphMatcher::new(&graph);
        let pattern = OpTypePattern::op(
            "Neg",
            vec![OpTypePattern::op("Neg", vec![OpTypePattern::any()])],
        );
        let matches = matcher.find_matches(&pattern).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_find_matches_rejects_replaced_wildcard_leaf() {
        // neg2 matches first and will be replaced; neg4's candidate binds
        // neg2 as its wildcard leaf, so it must not fire in the same pass.
        let graph = GraphDef::from_nodes([
            NodeDef::new("x", "Placeholder"),
            NodeDef::new("neg1", "Neg").with_input("x"),
            NodeDef::new("neg2", "Neg").with_input("neg1"),
            NodeDef::new("neg3", "Neg").with_input("neg2"),
            NodeDef::new("neg4", "Neg").with_input("neg3"),
        ])
        .unwrap();
        let matcher = GraphMatcher::new(&graph);
        let pattern = OpTypePattern::op(
            "Neg",
            vec![OpTypePattern::op("Neg", vec![OpTypePattern::any()])],
        );
        let matches = matcher.find_matches(&pattern).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].node.name, "neg2");
    }

    #[test]
    fn test_find_matches_deterministic_order() {
        // Two disjoint Relu(x) sites match in declaration order.
        let graph = GraphDef::from_nodes([
            NodeDef::new("a", "Placeholder"),
            NodeDef::new("relu_a", "Relu").with_input("a"),
            NodeDef::new("b", "Placeholder"),
            NodeDef::new("relu_b", "Relu").with_input("b"),
        ])
        .unwrap();
        let matcher = GraphMatcher::new(&graph);
        let pattern = OpTypePattern::op("Relu", vec![OpTypePattern::any()]);
        let matches = matcher.find_matches(&pattern).unwrap();
        let roots: Vec<_> = matches.iter().map(|m| m.node.name.as_str()).collect();
        assert_eq!(roots, ["relu_a", "relu_b"]);
    }
}
