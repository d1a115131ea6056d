//! Derived lookup maps and input-name helpers
//!
//! Edges in a [`GraphDef`](super::GraphDef) are name references. An input
//! string may carry an explicit output index (`"node:1"`) or mark a control
//! dependency (`"^node"`); the helpers here canonicalize those forms back to
//! the producer node name before lookup.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::GraphDef;

/// Maps producer node name → consumer node names
pub type ConsumerMap = FxHashMap<String, SmallVec<[String; 4]>>;

/// Maps producer node name → number of distinct consumer nodes
pub type ConsumerCountMap = FxHashMap<String, usize>;

/// Whether an input string is a control dependency (`^name`)
pub fn is_control_input(input: &str) -> bool {
    input.starts_with('^')
}

/// Strip control-dependency and output-index decoration from an input string
///
/// `"^node"` and `"node:1"` both canonicalize to `"node"`.
pub fn canonical_input_name(input: &str) -> &str {
    let name = input.strip_prefix('^').unwrap_or(input);
    match name.find(':') {
        Some(idx) => &name[..idx],
        None => name,
    }
}

/// Build the consumer map for a graph
///
/// Control dependencies count as consumption: deleting a node referenced
/// only by `^name` would still dangle. Each consumer node appears at most
/// once per producer, however many edges connect the pair.
pub fn build_consumer_map(graph: &GraphDef) -> ConsumerMap {
    let mut map: ConsumerMap = FxHashMap::default();

    for node in graph.nodes() {
        let mut seen: SmallVec<[&str; 4]> = SmallVec::new();
        for input in &node.input {
            let producer = canonical_input_name(input);
            if seen.contains(&producer) {
                continue;
            }
            seen.push(producer);
            map.entry(producer.to_string())
                .or_default()
                .push(node.name.clone());
        }
    }

    map
}

/// Build the consumer-count map for a graph
pub fn build_consumer_counts(graph: &GraphDef) -> ConsumerCountMap {
    build_consumer_map(graph)
        .into_iter()
        .map(|(producer, consumers)| (producer, consumers.len()))
        .collect()
}
