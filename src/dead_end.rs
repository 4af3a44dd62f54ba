//! The dead-end test: a purely structural graph walk, no LP.
//!
//! Dead-end status propagates transitively: once a metabolite is
//! structurally one-sided, every irreversible reaction that requires it
//! is forced to zero flux, which can in turn make a metabolite further
//! down the network one-sided too (its only remaining supplier/consumer
//! has just been forced off). We iterate the structural sign check to a
//! fixed point rather than a single pass, so a whole unsupplied linear
//! chain (`A -> B -> C -> D`, no exchanges) is fully flagged rather than
//! just its two endpoints. See DESIGN.md for this resolution.

use indexmap::IndexMap;
use itertools::Itertools;
use num_traits::Zero;
use rustc_hash::FxHashSet;

use crate::edge::{EdgeSet, NodeId};
use crate::model::Model;
use crate::verdict::DeadEndVerdict;

pub struct DeadEndResult {
    pub verdicts: IndexMap<String, DeadEndVerdict>,
    pub edges: EdgeSet,
}

/// The signed directions a metabolite can be pushed in, given a set of
/// reactions to consider: `sign(coef) * dir` for each reaction and each
/// direction its bounds permit. Returns the sign set plus which of
/// `candidates` actually contributed a term.
fn signs_over<'a>(
    model: &'a Model,
    metabolite_id: &str,
    excluded: &FxHashSet<String>,
) -> (FxHashSet<i8>, Vec<&'a str>) {
    let mut signs = FxHashSet::default();
    let mut contributors = Vec::new();
    for r in model.reactions_touching(metabolite_id) {
        if excluded.contains(&r.id) {
            continue;
        }
        let coef = r.coefficient_f64(metabolite_id).unwrap_or(0.0);
        if coef == 0.0 {
            continue;
        }
        let coef_sign: i8 = if coef > 0.0 { 1 } else { -1 };
        if r.bounds.can_go_forward() {
            signs.insert(coef_sign);
        }
        if r.bounds.can_go_backward() {
            signs.insert(-coef_sign);
        }
        contributors.push(r.id.as_str());
    }
    (signs, contributors)
}

pub fn run(model: &Model) -> DeadEndResult {
    let no_exclusions = FxHashSet::default();

    // Seed with the purely structural dead ends (bounds alone, nothing excluded).
    let mut dead_end_mets: FxHashSet<String> = model
        .metabolite_ids()
        .filter(|m| signs_over(model, m, &no_exclusions).0.len() == 1)
        .map(|m| m.to_string())
        .collect();

    let mut blocked: FxHashSet<String> = FxHashSet::default();

    loop {
        let mut changed = false;

        // Any irreversible reaction touching a known dead end is forced
        // to zero flux.
        for r in model.reactions() {
            if blocked.contains(&r.id) || r.is_reversible() {
                continue;
            }
            if r.stoichiometry().keys().any(|m| dead_end_mets.contains(m)) {
                blocked.insert(r.id.clone());
                changed = true;
            }
        }

        // Recompute: excluding blocked reactions, does any metabolite
        // become newly one-sided?
        for m in model.metabolite_ids() {
            if dead_end_mets.contains(m) {
                continue;
            }
            let (signs, contributors) = signs_over(model, m, &blocked);
            if signs.len() == 1 && !contributors.is_empty() {
                dead_end_mets.insert(m.to_string());
                changed = true;
            }
        }

        if !changed {
            break;
        }
    }

    let mut verdicts = IndexMap::new();
    let mut edges = EdgeSet::new();

    for r in model.reactions() {
        if blocked.contains(&r.id) {
            let offending: Vec<String> = r
                .stoichiometry()
                .keys()
                .filter(|m| dead_end_mets.contains(*m))
                .cloned()
                .sorted()
                .collect();
            for m in &offending {
                edges.insert(NodeId::reaction(&r.id), NodeId::metabolite(m));
            }
            verdicts.insert(r.id.clone(), DeadEndVerdict::BlockedBy(offending));
            continue;
        }

        // Step 3: a reversible reaction whose participant is one-sided
        // across the *other*, non-blocked reactions touching it.
        if r.is_reversible() {
            let mut forced_forward = false;
            let mut forced_backward = false;
            let mut self_excluded = blocked.clone();
            self_excluded.insert(r.id.clone());
            for (m, coef) in r.stoichiometry() {
                let (signs, contributors) = signs_over(model, m, &self_excluded);
                if signs.len() != 1 || contributors.is_empty() {
                    continue;
                }
                let other_sign = *signs.iter().next().unwrap();
                let coef_sign: i8 = if *coef > crate::model::Coefficient::zero() { 1 } else { -1 };
                if coef_sign == other_sign {
                    forced_forward = true;
                } else {
                    forced_backward = true;
                }
                edges.insert(NodeId::reaction(&r.id), NodeId::metabolite(m));
            }
            if forced_forward && !forced_backward {
                verdicts.insert(r.id.clone(), DeadEndVerdict::OnlyForwards);
                continue;
            }
            if forced_backward && !forced_forward {
                verdicts.insert(r.id.clone(), DeadEndVerdict::OnlyBackwards);
                continue;
            }
        }

        verdicts.insert(r.id.clone(), DeadEndVerdict::Ok);
    }

    DeadEndResult { verdicts, edges }
}
