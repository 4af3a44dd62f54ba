//! The loop test: phase 1 finds reactions that can carry flux with
//! every exchange closed (a thermodynamically impossible internal cycle
//! unless it's a true loop); phase 2 clusters those reactions by
//! correlated sampled flux.

use rustc_hash::FxHashMap;

use crate::config::LoopConfig;
use crate::edge::{EdgeSet, NodeId};
use crate::error::MacawResult;
use crate::lp::{CancellationToken, LpSolver};
use crate::model::Model;
use crate::verdict::LoopVerdict;
use indexmap::IndexMap;

pub struct LoopResult {
    pub verdicts: IndexMap<String, LoopVerdict>,
    pub edges: EdgeSet,
}

/// Phase 1: clone the model, flatten every non-zero lower bound to zero,
/// close every exchange reaction, then probe each remaining reaction by
/// maximizing and minimizing its flux in isolation.
fn phase1(
    model: &Model,
    solver: &dyn LpSolver,
    config: &LoopConfig,
    cancel: &CancellationToken,
) -> MacawResult<Vec<String>> {
    let mut working = model.cloned();
    for id in model.reaction_ids() {
        let r = model.reaction(id).unwrap();
        if r.is_exchange() {
            working.set_bounds(id, crate::model::Bounds::new(0.0, 0.0))?;
        } else if r.bounds.lb != 0.0 {
            working.set_bounds(id, crate::model::Bounds::new(0.0, r.bounds.ub))?;
        }
    }

    let mut in_loop = Vec::new();
    for r in model.reactions() {
        if r.is_exchange() {
            continue;
        }
        cancel.check()?;
        let mut obj = FxHashMap::default();
        obj.insert(r.id.clone(), 1.0);
        let max_v = working.run_fba(solver, &obj, true)?.objective_value;
        let min_v = working.run_fba(solver, &obj, false)?.objective_value;
        if max_v.abs() > config.zero_thresh || min_v.abs() > config.zero_thresh {
            in_loop.push(r.id.clone());
        }
    }
    Ok(in_loop)
}

/// Pearson correlation coefficient between two equal-length samples.
/// Returns `0.0` if either series has zero variance (no linear relation
/// is observable, and the formula would otherwise divide by zero).
fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    let mean_a = a.iter().sum::<f64>() / n;
    let mean_b = b.iter().sum::<f64>() / n;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        let da = x - mean_a;
        let db = y - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    if var_a <= 1e-15 || var_b <= 1e-15 {
        return 0.0;
    }
    cov / (var_a.sqrt() * var_b.sqrt())
}

/// Phase 2: sample the original (unmodified) feasible polytope and
/// correlate sampled fluxes between reactions that phase 1 flagged and
/// that share at least one metabolite.
fn phase2(
    model: &Model,
    solver: &dyn LpSolver,
    config: &LoopConfig,
    in_loop: &[String],
) -> MacawResult<EdgeSet> {
    let mut edges = EdgeSet::new();
    if in_loop.len() < 2 {
        return Ok(edges);
    }

    let working = model.cloned();
    let samples = working.run_sampling(solver, config.n_samples, config.sampling_seed)?;

    let series: FxHashMap<&str, Vec<f64>> = in_loop
        .iter()
        .map(|id| (id.as_str(), samples.iter().map(|s| s[id]).collect()))
        .collect();

    for i in 0..in_loop.len() {
        for j in (i + 1)..in_loop.len() {
            let (r, s) = (&in_loop[i], &in_loop[j]);
            let shares_metabolite = model
                .reaction(r)
                .unwrap()
                .stoichiometry()
                .keys()
                .any(|m| model.reaction(s).unwrap().participates(m));
            if !shares_metabolite {
                continue;
            }
            let corr = pearson(&series[r.as_str()], &series[s.as_str()]);
            if corr.is_finite() && corr.abs() >= config.corr_thresh {
                edges.insert(NodeId::reaction(r.clone()), NodeId::reaction(s.clone()));
            }
        }
    }
    Ok(edges)
}

pub fn run(model: &Model, solver: &dyn LpSolver, config: &LoopConfig) -> MacawResult<LoopResult> {
    run_cancellable(model, solver, config, &CancellationToken::new())
}

/// Same as [`run`], but checked against `cancel` between phase-1 work
/// units.
pub fn run_cancellable(
    model: &Model,
    solver: &dyn LpSolver,
    config: &LoopConfig,
    cancel: &CancellationToken,
) -> MacawResult<LoopResult> {
    let in_loop = phase1(model, solver, config, cancel)?;
    cancel.check()?;
    let in_loop_set: rustc_hash::FxHashSet<&str> = in_loop.iter().map(|s| s.as_str()).collect();

    let mut verdicts = IndexMap::new();
    for id in model.reaction_ids() {
        let verdict = if in_loop_set.contains(id) { LoopVerdict::InLoop } else { LoopVerdict::Ok };
        verdicts.insert(id.to_string(), verdict);
    }

    let edges = phase2(model, solver, config, &in_loop)?;
    Ok(LoopResult { verdicts, edges })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lp::reference::DenseLpSolver;
    use crate::model::reaction::{Bounds, Coefficient};
    use crate::model::{Metabolite, Reaction};
    use rustc_hash::FxHashMap as Map;

    fn futile_cycle_model() -> Model {
        // A<->B via two irreversible reactions running opposite ways with
        // no exchange: a pure internal cycle, unsustainable at any other
        // nonzero flux but able to carry circulating flux on its own.
        let mets = vec![Metabolite::new("a"), Metabolite::new("b")];
        let mut fwd = Map::default();
        fwd.insert("a".to_string(), Coefficient::from_integer(-1));
        fwd.insert("b".to_string(), Coefficient::from_integer(1));
        let mut rev = Map::default();
        rev.insert("b".to_string(), Coefficient::from_integer(-1));
        rev.insert("a".to_string(), Coefficient::from_integer(1));
        let rxns = vec![
            Reaction::new("R_fwd", fwd, Bounds::new(0.0, 1000.0)),
            Reaction::new("R_rev", rev, Bounds::new(0.0, 1000.0)),
        ];
        Model::build(mets, rxns).unwrap()
    }

    #[test]
    fn futile_cycle_reactions_are_flagged_in_loop() {
        let model = futile_cycle_model();
        let solver = DenseLpSolver;
        let result = run(&model, &solver, &LoopConfig::default()).unwrap();
        assert_eq!(result.verdicts["R_fwd"], LoopVerdict::InLoop);
        assert_eq!(result.verdicts["R_rev"], LoopVerdict::InLoop);
    }

    #[test]
    fn linear_pathway_with_exchanges_has_no_loops() {
        let mets = vec![Metabolite::new("a"), Metabolite::new("b")];
        let mut ex_a = Map::default();
        ex_a.insert("a".to_string(), Coefficient::from_integer(-1));
        let mut transport = Map::default();
        transport.insert("a".to_string(), Coefficient::from_integer(-1));
        transport.insert("b".to_string(), Coefficient::from_integer(1));
        let mut ex_b = Map::default();
        ex_b.insert("b".to_string(), Coefficient::from_integer(-1));
        let rxns = vec![
            Reaction::new("EX_a", ex_a, Bounds::new(-10.0, 0.0)),
            Reaction::new("R1", transport, Bounds::new(0.0, 1000.0)),
            Reaction::new("EX_b", ex_b, Bounds::new(0.0, 1000.0)),
        ];
        let model = Model::build(mets, rxns).unwrap();
        let solver = DenseLpSolver;
        let result = run(&model, &solver, &LoopConfig::default()).unwrap();
        assert_eq!(result.verdicts["R1"], LoopVerdict::Ok);
        assert!(result.edges.is_empty());
    }
}
