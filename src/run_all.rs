//! Drives all five tests and pathway synthesis.

use std::sync::Arc;

use anyhow::{Context, Result as AnyhowResult};
use log::info;

use crate::config::MacawConfig;
use crate::edge::EdgeSet;
use crate::lp::{CancellationToken, LpSolver};
use crate::model::Model;
use crate::results::{render_equation, ResultRow, ResultsTable};
use crate::{dead_end, dilution, diphosphate, duplicate, loop_test, pathway};

/// Runs dead-end first (dilution consumes its verdicts), the three
/// independent tests, then pathway synthesis over the unioned edge list.
/// Dilution and the loop test each reach through `solver` and so may
/// fail structurally (e.g. a non-finite lower bound the reference solver
/// can't shift); those failures surface to the caller rather than being
/// absorbed into a verdict.
pub fn run_all_tests(
    model: &Model,
    solver: Arc<dyn LpSolver>,
    config: &MacawConfig,
) -> AnyhowResult<(ResultsTable, EdgeSet)> {
    run_all_tests_cancellable(model, solver, config, &CancellationToken::new())
}

/// Same as [`run_all_tests`], but checked against `cancel` between the
/// dilution and loop tests' work units, so a raised token discards
/// partial results and propagates immediately.
pub fn run_all_tests_cancellable(
    model: &Model,
    solver: Arc<dyn LpSolver>,
    config: &MacawConfig,
    cancel: &CancellationToken,
) -> AnyhowResult<(ResultsTable, EdgeSet)> {
    info!("running dead-end test over {} reactions", model.reaction_ids().count());
    let dead_end_result = dead_end::run(model);

    info!("running dilution test");
    let dilution_result = dilution::run_cancellable(
        model,
        Arc::clone(&solver),
        &config.dilution,
        Some(&dead_end_result),
        config.run.worker_threads,
        cancel,
    )
    .context("dilution test failed")?;

    info!("running diphosphate test");
    let diphosphate_verdicts = diphosphate::run(model, &config.diphosphate);

    info!("running duplicate test");
    let duplicate_result = duplicate::run(model, &config.redox);

    info!("running loop test");
    let loop_result = loop_test::run_cancellable(model, solver.as_ref(), &config.loop_cfg, cancel)
        .context("loop test failed")?;

    let mut edges = EdgeSet::new();
    edges.extend(dead_end_result.edges.clone());
    edges.extend(dilution_result.edges.clone());
    edges.extend(duplicate_result.edges.clone());
    edges.extend(loop_result.edges.clone());

    let reaction_ids: Vec<String> = model.reaction_ids().map(|s| s.to_string()).collect();
    let pathways = pathway::form_pathways(&reaction_ids, &edges);

    let rows = reaction_ids
        .iter()
        .map(|id| ResultRow {
            reaction_id: id.clone(),
            reaction_equation: render_equation(model, id, &config.run),
            dead_end_test: dead_end_result.verdicts[id].to_string(),
            dilution_test: dilution_result.verdicts[id].to_string(),
            diphosphate_test: diphosphate_verdicts[id].to_string(),
            duplicate_test_exact: duplicate_result.exact[id].to_string(),
            duplicate_test_directions: duplicate_result.directions[id].to_string(),
            duplicate_test_coefficients: duplicate_result.coefficients[id].to_string(),
            duplicate_test_redox: duplicate_result.redox[id].to_string(),
            loop_test: loop_result.verdicts[id].to_string(),
            pathway: pathways[id],
        })
        .collect();

    info!("run_all_tests complete");
    Ok((ResultsTable { rows }, edges))
}
