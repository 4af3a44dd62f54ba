//! A minimal in-crate `LpSolver`: a dense two-phase simplex for FBA and a
//! documented hit-and-run sampler for flux sampling. Sized for the small
//! hand-built models the test suite exercises — not a substitute for a
//! real backend (GLPK/HiGHS/CPLEX), which stays an external collaborator.
//!
//! Assumes every reaction's lower bound is finite (true of every GSMM
//! convention in practice — irreversible reactions have lb=0, reversible
//! ones a finite negative lb) so each flux can be shifted to a
//! nonnegative variable before handing the problem to the simplex.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;

use super::simplex::{self, SolveStatus};
use super::{FbaOutcome, LpSolver};
use crate::error::{MacawError, MacawResult};
use crate::model::WorkingModel;

#[derive(Debug, Default)]
pub struct DenseLpSolver;

struct ShiftedSystem {
    ids: Vec<String>,
    lb: Vec<f64>,
    upper: Vec<f64>,
    eq_rows: Vec<Vec<f64>>,
    eq_rhs: Vec<f64>,
}

fn build_system(model: &WorkingModel) -> MacawResult<ShiftedSystem> {
    let ids: Vec<String> = model.reaction_ids().map(|s| s.to_string()).collect();
    let n = ids.len();
    let mut lb = vec![0.0; n];
    let mut ub = vec![0.0; n];
    for (i, id) in ids.iter().enumerate() {
        let r = model
            .reaction(id)
            .ok_or_else(|| MacawError::InvalidModel(format!("missing reaction {id}")))?;
        if !r.bounds.lb.is_finite() {
            return Err(MacawError::InvalidModel(format!(
                "reaction {id} has a non-finite lower bound, unsupported by the \
                 reference solver"
            )));
        }
        lb[i] = r.bounds.lb;
        ub[i] = r.bounds.ub;
    }
    let upper: Vec<f64> = (0..n)
        .map(|i| if ub[i].is_finite() { ub[i] - lb[i] } else { f64::INFINITY })
        .collect();

    let mut eq_rows = Vec::new();
    let mut eq_rhs = Vec::new();
    for met_id in model.metabolite_ids() {
        let mut row = vec![0.0; n];
        let mut offset = 0.0;
        for (i, id) in ids.iter().enumerate() {
            if let Some(c) = model.reaction(id).and_then(|r| r.coefficient_f64(met_id)) {
                row[i] = c;
                offset += c * lb[i];
            }
        }
        if row.iter().any(|v| v.abs() > 1e-12) {
            eq_rows.push(row);
            eq_rhs.push(-offset);
        }
    }
    for constraint in model.extra_constraints() {
        let mut row = vec![0.0; n];
        let mut offset = 0.0;
        for (i, id) in ids.iter().enumerate() {
            if let Some(&c) = constraint.terms.get(id) {
                row[i] = c;
                offset += c * lb[i];
            }
        }
        eq_rows.push(row);
        eq_rhs.push(constraint.rhs - offset);
    }

    Ok(ShiftedSystem { ids, lb, upper, eq_rows, eq_rhs })
}

impl LpSolver for DenseLpSolver {
    fn solve(
        &self,
        model: &WorkingModel,
        objective: &FxHashMap<String, f64>,
        maximize: bool,
    ) -> MacawResult<FbaOutcome> {
        let sys = build_system(model)?;
        let n = sys.ids.len();
        let c: Vec<f64> =
            sys.ids.iter().map(|id| *objective.get(id).unwrap_or(&0.0)).collect();
        let out = simplex::solve_bounded(&sys.eq_rows, &sys.eq_rhs, &sys.upper, &c, maximize);
        match out.status {
            SolveStatus::Infeasible => Err(MacawError::SolverInfeasible),
            SolveStatus::Unbounded => Err(MacawError::SolverUnbounded),
            SolveStatus::Optimal => {
                let mut fluxes = FxHashMap::default();
                let mut offset = 0.0;
                for i in 0..n {
                    fluxes.insert(sys.ids[i].clone(), out.values[i] + sys.lb[i]);
                    offset += c[i] * sys.lb[i];
                }
                Ok(FbaOutcome { fluxes, objective_value: out.objective_value + offset })
            }
        }
    }

    fn sample(
        &self,
        model: &WorkingModel,
        n_samples: usize,
        seed: u64,
    ) -> MacawResult<Vec<FxHashMap<String, f64>>> {
        let sys = build_system(model)?;
        let n = sys.ids.len();
        let zero_obj = vec![0.0; n];
        let start = simplex::solve_bounded(&sys.eq_rows, &sys.eq_rhs, &sys.upper, &zero_obj, true);
        if start.status != SolveStatus::Optimal {
            return Err(MacawError::SolverInfeasible);
        }
        let basis = null_space_basis(&sys.eq_rows, n);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut current = start.values;
        let mut samples = Vec::with_capacity(n_samples);
        for _ in 0..n_samples {
            if !basis.is_empty() {
                let direction = random_direction(&basis, &mut rng);
                if let Some((t_lo, t_hi)) = feasible_interval(&current, &direction, &sys.upper) {
                    if t_hi > t_lo {
                        let t: f64 = rng.gen_range(t_lo..=t_hi);
                        for i in 0..n {
                            current[i] += t * direction[i];
                        }
                    }
                }
            }
            let mut fluxes = FxHashMap::default();
            for i in 0..n {
                fluxes.insert(sys.ids[i].clone(), current[i] + sys.lb[i]);
            }
            samples.push(fluxes);
        }
        Ok(samples)
    }
}

/// Null space basis of `a` (an `m x n` coefficient matrix) via row
/// reduction to RREF, reading off the standard free-variable
/// parametrization. Returns one basis vector per free column; an
/// unconstrained system (`a` empty) yields the standard basis.
fn null_space_basis(a: &[Vec<f64>], n: usize) -> Vec<Vec<f64>> {
    if a.is_empty() {
        return (0..n)
            .map(|i| {
                let mut v = vec![0.0; n];
                v[i] = 1.0;
                v
            })
            .collect();
    }
    let mut m: Vec<Vec<f64>> = a.to_vec();
    let rows = m.len();
    let mut pivot_col_of_row: Vec<Option<usize>> = vec![None; rows];
    let mut row = 0;
    for col in 0..n {
        if row >= rows {
            break;
        }
        let pivot = (row..rows)
            .max_by(|&r1, &r2| m[r1][col].abs().partial_cmp(&m[r2][col].abs()).unwrap());
        let Some(pivot) = pivot else { continue };
        if m[pivot][col].abs() < 1e-9 {
            continue;
        }
        m.swap(row, pivot);
        let piv_val = m[row][col];
        for v in m[row].iter_mut() {
            *v /= piv_val;
        }
        for r in 0..rows {
            if r != row {
                let factor = m[r][col];
                if factor.abs() > 1e-12 {
                    let pivot_row = m[row].clone();
                    for j in 0..n {
                        m[r][j] -= factor * pivot_row[j];
                    }
                }
            }
        }
        pivot_col_of_row[row] = Some(col);
        row += 1;
    }
    let pivot_cols: Vec<usize> = pivot_col_of_row.iter().filter_map(|c| *c).collect();
    let free_cols: Vec<usize> =
        (0..n).filter(|c| !pivot_cols.contains(c)).collect();

    free_cols
        .iter()
        .map(|&f| {
            let mut v = vec![0.0; n];
            v[f] = 1.0;
            for (r, pc) in pivot_col_of_row.iter().enumerate() {
                if let Some(p) = pc {
                    v[*p] = -m[r][f];
                }
            }
            v
        })
        .collect()
}

fn random_direction(basis: &[Vec<f64>], rng: &mut StdRng) -> Vec<f64> {
    let n = basis[0].len();
    let mut d = vec![0.0; n];
    for b in basis {
        let coeff: f64 = rng.gen_range(-1.0..1.0);
        for i in 0..n {
            d[i] += coeff * b[i];
        }
    }
    d
}

/// The interval of step sizes `t` for which `current + t*direction` stays
/// within `[0, upper]` componentwise.
fn feasible_interval(current: &[f64], direction: &[f64], upper: &[f64]) -> Option<(f64, f64)> {
    let mut lo = f64::NEG_INFINITY;
    let mut hi = f64::INFINITY;
    for i in 0..current.len() {
        let d = direction[i];
        if d.abs() < 1e-12 {
            continue;
        }
        let to_zero = (0.0 - current[i]) / d;
        let to_upper = if upper[i].is_finite() { (upper[i] - current[i]) / d } else { f64::INFINITY * d.signum() };
        let (a, b) = if d > 0.0 { (to_zero, to_upper) } else { (to_upper, to_zero) };
        lo = lo.max(a);
        hi = hi.min(b);
    }
    if lo.is_finite() && hi.is_finite() && lo <= hi {
        Some((lo, hi))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::reaction::{Bounds, Coefficient};
    use crate::model::{Metabolite, Model, Reaction};
    use rustc_hash::FxHashMap as Map;

    fn chain_model() -> Model {
        // A -> B -> C, irreversible, with exchanges on A (uptake) and C (export).
        let mets = vec![
            Metabolite::new("A"),
            Metabolite::new("B"),
            Metabolite::new("C"),
        ];
        let mut r1 = Map::default();
        r1.insert("A".to_string(), Coefficient::from_integer(-1));
        let mut r2 = Map::default();
        r2.insert("A".to_string(), Coefficient::from_integer(-1));
        r2.insert("B".to_string(), Coefficient::from_integer(1));
        let mut r3 = Map::default();
        r3.insert("B".to_string(), Coefficient::from_integer(-1));
        r3.insert("C".to_string(), Coefficient::from_integer(1));
        let mut r4 = Map::default();
        r4.insert("C".to_string(), Coefficient::from_integer(-1));
        let rxns = vec![
            Reaction::new("EX_A", r1, Bounds::new(-10.0, 0.0)),
            Reaction::new("R1", r2, Bounds::new(0.0, 1000.0)),
            Reaction::new("R2", r3, Bounds::new(0.0, 1000.0)),
            Reaction::new("EX_C", r4, Bounds::new(0.0, 1000.0)),
        ];
        Model::build(mets, rxns).unwrap()
    }

    #[test]
    fn fba_maximizes_throughput() {
        let model = chain_model();
        let working = model.cloned();
        let solver = DenseLpSolver;
        let mut obj = Map::default();
        obj.insert("R2".to_string(), 1.0);
        let outcome = working.run_fba(&solver, &obj, true).unwrap();
        assert!((outcome.objective_value - 10.0).abs() < 1e-6);
        assert!((outcome.fluxes["EX_A"] + 10.0).abs() < 1e-6);
    }

    #[test]
    fn fba_zero_flux_when_key_reaction_blocked() {
        let model = chain_model();
        let mut working = model.cloned();
        working.set_bounds("R1", Bounds::new(0.0, 0.0)).unwrap();
        let solver = DenseLpSolver;
        let mut obj = Map::default();
        obj.insert("R2".to_string(), 1.0);
        let outcome = working.run_fba(&solver, &obj, true).unwrap();
        assert!(outcome.objective_value.abs() < 1e-6);
    }

    #[test]
    fn sampling_respects_mass_balance() {
        let model = chain_model();
        let working = model.cloned();
        let solver = DenseLpSolver;
        let samples = working.run_sampling(&solver, 25, 7).unwrap();
        assert_eq!(samples.len(), 25);
        for s in &samples {
            // R1 flux must equal R2 flux (B has no other participants).
            assert!((s["R1"] - s["R2"]).abs() < 1e-6);
        }
    }
}
