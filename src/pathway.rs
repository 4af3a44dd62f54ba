//! Pathway synthesis (`form_pathways`): merges every test's edge list
//! into one graph and labels connected components.

use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap;

use crate::edge::{EdgeSet, NodeId};

/// Connected-component labels, one per reaction ID, keyed the same way
/// the results table is. Reactions absent from every edge list get `0`.
pub fn form_pathways(reaction_ids: &[String], edges: &EdgeSet) -> IndexMap<String, u32> {
    let mut adjacency: FxHashMap<&NodeId, Vec<&NodeId>> = FxHashMap::default();
    for (a, b) in edges.iter() {
        adjacency.entry(a).or_default().push(b);
        adjacency.entry(b).or_default().push(a);
    }

    let mut labels: FxHashMap<&NodeId, u32> = FxHashMap::default();
    let mut next_label = 1u32;
    let nodes: IndexSet<NodeId> = edges.nodes();

    for start in &nodes {
        if labels.contains_key(start) {
            continue;
        }
        let label = next_label;
        next_label += 1;
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            if labels.insert(node, label).is_some() {
                continue;
            }
            if let Some(neighbors) = adjacency.get(node) {
                for n in neighbors {
                    if !labels.contains_key(n) {
                        stack.push(n);
                    }
                }
            }
        }
    }

    reaction_ids
        .iter()
        .map(|id| {
            let label = labels.get(&NodeId::reaction(id.clone())).copied().unwrap_or(0);
            (id.clone(), label)
        })
        .collect()
}
