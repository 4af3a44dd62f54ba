//! The dilution test: per metabolite, impose a dilution sink coupled to
//! the metabolite's total traffic and see which reactions become unable
//! to carry nonzero flux.

use std::sync::Arc;

use indexmap::IndexMap;
use itertools::Itertools;
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::DilutionConfig;
use crate::dead_end::DeadEndResult;
use crate::edge::{EdgeSet, NodeId};
use crate::error::{MacawError, MacawResult};
use crate::lp::{with_retry, with_timeout, CancellationToken, LpSolver};
use crate::model::reaction::{Bounds, Coefficient};
use crate::model::{LinearConstraint, Model, Reaction, WorkingModel};
use crate::verdict::{DeadEndVerdict, DilutionVerdict};

pub struct DilutionResult {
    pub verdicts: IndexMap<String, DilutionVerdict>,
    pub edges: EdgeSet,
}

fn apply_media_and_dead_end(
    model: &Model,
    working: &mut WorkingModel,
    media_mets: Option<&FxHashSet<String>>,
    dead_end: Option<&DeadEndResult>,
) -> MacawResult<()> {
    if let Some(media) = media_mets {
        if !media.is_empty() {
            for id in model.reaction_ids() {
                let r = model.reaction(id).unwrap();
                if r.is_exchange() && !media.contains(r.stoichiometry().keys().next().unwrap()) {
                    working.set_bounds(id, Bounds::new(0.0, r.bounds.ub))?;
                }
            }
        }
    }
    if let Some(dead_end) = dead_end {
        for (id, verdict) in &dead_end.verdicts {
            if matches!(verdict, DeadEndVerdict::BlockedBy(_)) {
                working.set_bounds(id, Bounds::new(0.0, 0.0))?;
            }
        }
    }
    Ok(())
}

/// Builds the extended working model for metabolite `met_id`'s
/// experiment: media/dead-end zeroing, a dilution sink, and the
/// forward/reverse-split coupling constraint.
fn build_experiment(
    model: &Model,
    met_id: &str,
    media_mets: Option<&FxHashSet<String>>,
    dead_end: Option<&DeadEndResult>,
    alpha: f64,
) -> MacawResult<(WorkingModel, Vec<String>)> {
    let mut working = model.cloned();
    apply_media_and_dead_end(model, &mut working, media_mets, dead_end)?;

    let participants: Vec<String> =
        model.reactions_touching(met_id).iter().map(|r| r.id.clone()).collect();

    let dilution_id = format!("__dilution_{met_id}");
    let mut dilution_stoich = FxHashMap::default();
    dilution_stoich.insert(met_id.to_string(), Coefficient::from_integer(-1));
    working.add_reaction(Reaction::new(
        dilution_id.clone(),
        dilution_stoich,
        Bounds::new(0.0, f64::INFINITY),
    ))?;

    let mut coupling_terms = FxHashMap::default();
    coupling_terms.insert(dilution_id.clone(), 1.0);
    for r in &participants {
        let fwd_id = format!("__dil_fwd_{r}_{met_id}");
        let rev_id = format!("__dil_rev_{r}_{met_id}");
        working.add_reaction(Reaction::new(
            fwd_id.clone(),
            FxHashMap::default(),
            Bounds::new(0.0, f64::INFINITY),
        ))?;
        working.add_reaction(Reaction::new(
            rev_id.clone(),
            FxHashMap::default(),
            Bounds::new(0.0, f64::INFINITY),
        ))?;
        let mut split = FxHashMap::default();
        split.insert(r.clone(), 1.0);
        split.insert(fwd_id.clone(), -1.0);
        split.insert(rev_id.clone(), 1.0);
        working.add_linear_constraint(LinearConstraint::new(split, 0.0));
        coupling_terms.insert(fwd_id, -alpha);
        coupling_terms.insert(rev_id, -alpha);
    }
    working.add_linear_constraint(LinearConstraint::new(coupling_terms, 0.0));

    Ok((working, participants))
}

fn probe_reaction(
    working: &WorkingModel,
    solver: &dyn LpSolver,
    reaction_id: &str,
    zero_thresh: f64,
) -> MacawResult<bool> {
    let mut obj_pos = FxHashMap::default();
    obj_pos.insert(reaction_id.to_string(), 1.0);
    let max_v = working.run_fba(solver, &obj_pos, true)?.objective_value;
    let mut obj_neg = FxHashMap::default();
    obj_neg.insert(reaction_id.to_string(), 1.0);
    let min_v = working.run_fba(solver, &obj_neg, false)?.objective_value;
    Ok(max_v.abs() <= zero_thresh && min_v.abs() <= zero_thresh)
}

fn run_experiment_once(
    model: &Model,
    met_id: &str,
    media_mets: Option<&FxHashSet<String>>,
    dead_end: Option<&DeadEndResult>,
    alpha: f64,
    zero_thresh: f64,
    solver: &dyn LpSolver,
) -> MacawResult<FxHashSet<String>> {
    let (working, participants) = build_experiment(model, met_id, media_mets, dead_end, alpha)?;
    let mut blocked = FxHashSet::default();
    for r in &participants {
        if probe_reaction(&working, solver, r, zero_thresh)? {
            blocked.insert(r.clone());
        }
    }
    Ok(blocked)
}

/// Runs one metabolite's experiment under the timeout/retry watchdog.
/// On final exhaustion, every reaction participating in `met_id` is
/// conservatively marked blocked.
fn run_experiment_with_watchdog(
    model: &Model,
    met_id: &str,
    media_mets: Option<&FxHashSet<String>>,
    dead_end: Option<&DeadEndResult>,
    config: &DilutionConfig,
    solver: Arc<dyn LpSolver>,
) -> FxHashSet<String> {
    let model_owned = model.clone();
    let met = met_id.to_string();
    let media = media_mets.cloned();
    let dead_end_owned = dead_end.map(|d| d.verdicts.clone());
    let alpha = config.alpha;
    let zero_thresh = config.zero_thresh;
    let timeout = config.timeout;

    let result: MacawResult<FxHashSet<String>> = with_retry(config.max_attempts, || {
        let model_owned = model_owned.clone();
        let met = met.clone();
        let media = media.clone();
        let dead_end_owned = dead_end_owned.clone();
        let solver = Arc::clone(&solver);
        with_timeout(timeout, move || {
            let dead_end_result = dead_end_owned.map(|verdicts| DeadEndResult {
                verdicts,
                edges: EdgeSet::new(),
            });
            run_experiment_once(
                &model_owned,
                &met,
                media.as_ref(),
                dead_end_result.as_ref(),
                alpha,
                zero_thresh,
                solver.as_ref(),
            )
        })
    });

    match result {
        Ok(blocked) => blocked,
        Err(e) => {
            log::warn!(
                "dilution experiment for {met_id} exhausted its retries ({e}); \
                 conservatively flagging every participating reaction"
            );
            model.reactions_touching(met_id).iter().map(|r| r.id.clone()).collect()
        }
    }
}

pub fn run(
    model: &Model,
    solver: Arc<dyn LpSolver>,
    config: &DilutionConfig,
    dead_end: Option<&DeadEndResult>,
    worker_threads: Option<usize>,
) -> MacawResult<DilutionResult> {
    run_cancellable(model, solver, config, dead_end, worker_threads, &CancellationToken::new())
}

/// Same as [`run`], but checked against `cancel` between work units so a
/// raised token is observed within one LP quantum rather than only after
/// the whole pool drains.
pub fn run_cancellable(
    model: &Model,
    solver: Arc<dyn LpSolver>,
    config: &DilutionConfig,
    dead_end: Option<&DeadEndResult>,
    worker_threads: Option<usize>,
    cancel: &CancellationToken,
) -> MacawResult<DilutionResult> {
    // Baseline pre-pass: feasibility with media/dead-end zeroing applied,
    // but no dilution sink imposed.
    let mut baseline = model.cloned();
    apply_media_and_dead_end(model, &mut baseline, config.media_mets.as_ref(), dead_end)?;
    let mut baseline_blocked = FxHashSet::default();
    for r in model.reactions() {
        cancel.check()?;
        if probe_reaction(&baseline, solver.as_ref(), &r.id, config.zero_thresh)? {
            baseline_blocked.insert(r.id.clone());
        }
    }

    let met_ids: Vec<String> = model.metabolite_ids().map(|s| s.to_string()).collect();

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = worker_threads {
        builder = builder.num_threads(n);
    }
    let pool = builder
        .build()
        .map_err(|e| MacawError::ConfigurationError(format!("failed to build worker pool: {e}")))?;

    let per_metabolite: FxHashMap<String, FxHashSet<String>> = pool.install(|| {
        met_ids
            .par_iter()
            .map(|met| {
                if cancel.is_cancelled() {
                    return (met.clone(), FxHashSet::default());
                }
                let blocked = run_experiment_with_watchdog(
                    model,
                    met,
                    config.media_mets.as_ref(),
                    dead_end,
                    config,
                    Arc::clone(&solver),
                );
                (met.clone(), blocked)
            })
            .collect()
    });
    cancel.check()?;

    let mut verdicts = IndexMap::new();
    let mut edges = EdgeSet::new();
    for r in model.reactions() {
        let participating_mets: Vec<&str> = r.stoichiometry().keys().map(|s| s.as_str()).collect();
        let blocked_under: Vec<&str> = participating_mets
            .iter()
            .filter(|m| per_metabolite.get(**m).is_some_and(|b| b.contains(&r.id)))
            .copied()
            .collect();
        let feasible_under_any = participating_mets
            .iter()
            .any(|m| per_metabolite.get(*m).is_some_and(|b| !b.contains(&r.id)));

        let verdict = if baseline_blocked.contains(&r.id) {
            if feasible_under_any {
                DilutionVerdict::UnblockedByDilution
            } else {
                DilutionVerdict::AlwaysBlocked
            }
        } else if !blocked_under.is_empty() {
            for m in &blocked_under {
                edges.insert(NodeId::reaction(r.id.clone()), NodeId::metabolite(m.to_string()));
            }
            let ids: Vec<String> = blocked_under.iter().map(|s| s.to_string()).sorted().collect();
            DilutionVerdict::BlockedByDilution(ids)
        } else {
            DilutionVerdict::Ok
        };
        verdicts.insert(r.id.clone(), verdict);
    }

    Ok(DilutionResult { verdicts, edges })
}
