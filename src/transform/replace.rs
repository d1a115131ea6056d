//! Match-and-splice engine
//!
//! One stateless pass: collect all non-overlapping matches of a pattern,
//! ask the rule's generator for replacement nodes per match, then rebuild
//! the graph from the untouched nodes plus the replacements.

use rustc_hash::FxHashSet;

use crate::error::GraphResult;
use crate::graph::{GraphDef, NodeDef};
use crate::pattern::{GraphMatcher, NodeMatch, OpTypePattern};

/// Replace every non-overlapping occurrence of `pattern` in `graph`
///
/// `node_generator` receives each match and returns the nodes that survive
/// it; every node bound anywhere in a match tree is dropped from the output
/// unless the generator re-emits it, so generators return untouched leaves
/// alongside their synthesized nodes. Generators preserve downstream edges
/// by naming a replacement after the match root.
///
/// The pass is atomic: the first generator error aborts with no output
/// graph. Untouched nodes keep their declaration order; replacements are
/// appended in match order. Matches never share a bound node (the matcher
/// claims whole trees), so a replacement colliding with an emitted name is
/// a generator bug surfaced as
/// [`DuplicateNodeName`](crate::error::TransformError::DuplicateNodeName).
pub fn replace_matching_op_types<F>(
    graph: &GraphDef,
    pattern: &OpTypePattern,
    mut node_generator: F,
) -> GraphResult<GraphDef>
where
    F: FnMut(&NodeMatch<'_>) -> GraphResult<Vec<NodeDef>>,
{
    let matcher = GraphMatcher::new(graph);
    let matches = matcher.find_matches(pattern)?;

    let mut matched_names: FxHashSet<&str> = FxHashSet::default();
    for m in &matches {
        matched_names.extend(m.node_names());
    }

    let mut replacements = Vec::with_capacity(matches.len());
    for m in &matches {
        replacements.push(node_generator(m)?);
    }

    let mut output = GraphDef::new();
    for node in graph.nodes() {
        if !matched_names.contains(node.name.as_str()) {
            output.add_node(node.clone())?;
        }
    }
    for nodes in replacements {
        for node in nodes {
            output.add_node(node)?;
        }
    }

    Ok(output)
}
