//! The duplicate test: four orthogonal equivalence classifications over
//! canonical stoichiometric signatures, no LP.

mod signature;

use indexmap::IndexMap;
use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::config::RedoxConfig;
use crate::edge::{EdgeSet, NodeId};
use crate::model::Model;
use crate::verdict::DuplicateVerdict;

use signature::{coefficients_signature, exact_signature, redox_remainder, ExactSig};

pub struct DuplicateResult {
    pub exact: IndexMap<String, DuplicateVerdict>,
    pub directions: IndexMap<String, DuplicateVerdict>,
    pub coefficients: IndexMap<String, DuplicateVerdict>,
    pub redox: IndexMap<String, DuplicateVerdict>,
    pub edges: EdgeSet,
}

/// Groups reaction IDs by signature, preserving first-seen order within
/// each group so output lists are deterministic.
fn group_by<K: Eq + std::hash::Hash>(items: Vec<(String, K)>) -> FxHashMap<K, Vec<String>> {
    let mut groups: FxHashMap<K, Vec<String>> = FxHashMap::default();
    for (id, key) in items {
        groups.entry(key).or_default().push(id);
    }
    groups
}

/// Builds a verdict column from signature groups, applying a predicate
/// that further restricts which group-mates count as duplicates of a
/// given reaction (used to exclude members already covered by the exact
/// classification, and to require differing redox pairs).
fn verdicts_from_groups<K: Eq + std::hash::Hash>(
    reaction_ids: &[String],
    items: Vec<(String, K)>,
    edges: &mut EdgeSet,
    same_class: impl Fn(&str, &str) -> bool,
) -> IndexMap<String, DuplicateVerdict> {
    let groups = group_by(items);
    let group_of: FxHashMap<&str, &Vec<String>> = groups
        .iter()
        .flat_map(|(_, members)| members.iter().map(move |m| (m.as_str(), members)))
        .collect();

    let mut out = IndexMap::new();
    for id in reaction_ids {
        let Some(members) = group_of.get(id.as_str()) else {
            out.insert(id.clone(), DuplicateVerdict::Ok);
            continue;
        };
        let others: Vec<String> = members
            .iter()
            .filter(|m| m.as_str() != id.as_str() && same_class(id, m))
            .cloned()
            .sorted()
            .collect();
        if others.is_empty() {
            out.insert(id.clone(), DuplicateVerdict::Ok);
        } else {
            for other in &others {
                edges.insert(NodeId::reaction(id.clone()), NodeId::reaction(other.clone()));
            }
            out.insert(id.clone(), DuplicateVerdict::DuplicateOf(others));
        }
    }
    out
}

pub fn run(model: &Model, redox: &RedoxConfig) -> DuplicateResult {
    let reaction_ids: Vec<String> = model.reaction_ids().map(|s| s.to_string()).collect();
    let mut edges = EdgeSet::new();

    let exact_sigs: FxHashMap<String, ExactSig> = reaction_ids
        .iter()
        .map(|id| (id.clone(), exact_signature(model.reaction(id).unwrap())))
        .collect();
    let same_exact = |a: &str, b: &str| exact_sigs[a] == exact_sigs[b];

    let exact_items: Vec<(String, ExactSig)> = reaction_ids
        .iter()
        .map(|id| (id.clone(), exact_sigs[id].clone()))
        .collect();
    let exact = verdicts_from_groups(&reaction_ids, exact_items, &mut edges, |_, _| true);

    let directions_items: Vec<_> = reaction_ids
        .iter()
        .map(|id| (id.clone(), signature::directions_signature(model.reaction(id).unwrap())))
        .collect();
    let directions =
        verdicts_from_groups(&reaction_ids, directions_items, &mut edges, |a, b| !same_exact(a, b));

    let coefficients_items: Vec<_> = reaction_ids
        .iter()
        .map(|id| (id.clone(), coefficients_signature(model.reaction(id).unwrap())))
        .collect();
    let coefficients = verdicts_from_groups(&reaction_ids, coefficients_items, &mut edges, |a, b| {
        !same_exact(a, b)
    });

    let redox_pairs: FxHashMap<String, (usize, signature::DirectionsSig)> = reaction_ids
        .iter()
        .filter_map(|id| {
            redox_remainder(model.reaction(id).unwrap(), redox).map(|(idx, sig)| (id.clone(), (idx, sig)))
        })
        .collect();
    let redox_items: Vec<_> = redox_pairs
        .iter()
        .map(|(id, (_, sig))| (id.clone(), sig.clone()))
        .collect();
    let redox_ids: Vec<String> = redox_pairs.keys().cloned().collect();
    let redox_verdicts = verdicts_from_groups(&redox_ids, redox_items, &mut edges, |a, b| {
        redox_pairs[a].0 != redox_pairs[b].0
    });
    let mut redox = IndexMap::new();
    for id in &reaction_ids {
        redox.insert(
            id.clone(),
            redox_verdicts.get(id).cloned().unwrap_or(DuplicateVerdict::Ok),
        );
    }

    DuplicateResult { exact, directions, coefficients, redox, edges }
}
