//! A small two-phase dense simplex solver, sized for the toy/test models
//! `reference::DenseLpSolver` is built to handle. Not meant to compete
//! with a real LP backend (GLPK/HiGHS/CPLEX) — see `lp::LpSolver`.

const EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
}

#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    /// Indexed the same as the `n_structural` columns passed in.
    pub values: Vec<f64>,
    pub objective_value: f64,
}

struct Tableau {
    /// `rows` constraint rows, each `cols` wide, plus a trailing rhs column.
    tab: Vec<Vec<f64>>,
    basis: Vec<usize>,
    cols: usize,
}

impl Tableau {
    fn rhs_col(&self) -> usize {
        self.cols
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let width = self.cols + 1;
        let piv = self.tab[row][col];
        for j in 0..width {
            self.tab[row][j] /= piv;
        }
        let pivot_row = self.tab[row].clone();
        for r in 0..self.tab.len() {
            if r == row {
                continue;
            }
            let factor = self.tab[r][col];
            if factor.abs() > EPS {
                for j in 0..width {
                    self.tab[r][j] -= factor * pivot_row[j];
                }
            }
        }
        self.basis[row] = col;
    }

    /// Runs simplex iterations against the objective stored in row
    /// `self.tab.len() - 1` (reduced-cost convention: negative entry in
    /// column j means increasing x_j decreases the objective further).
    /// Bland's rule (lowest index) is used throughout for anti-cycling —
    /// acceptable since these tableaux are tiny.
    fn run(&mut self) -> Result<(), ()> {
        let obj_row = self.tab.len() - 1;
        loop {
            let entering = (0..self.cols)
                .find(|&j| self.tab[obj_row][j] < -EPS);
            let Some(entering) = entering else {
                return Ok(());
            };
            let mut leaving: Option<usize> = None;
            let mut best_ratio = f64::INFINITY;
            for r in 0..obj_row {
                let a = self.tab[r][entering];
                if a > EPS {
                    let ratio = self.tab[r][self.rhs_col()] / a;
                    if ratio < best_ratio - EPS
                        || (ratio < best_ratio + EPS
                            && (leaving.is_none()
                                || self.basis[r] < self.basis[leaving.unwrap()]))
                    {
                        best_ratio = ratio;
                        leaving = Some(r);
                    }
                }
            }
            match leaving {
                None => return Err(()),
                Some(r) => self.pivot(r, entering),
            }
        }
    }
}

/// Solves `maximize c^T x` subject to `eq_rows . x = eq_rhs` and
/// `0 <= x <= upper` (an infinite entry in `upper` means unbounded above).
/// `eq_rows[i]` has length `n` (one entry per structural variable).
pub fn solve_bounded(
    eq_rows: &[Vec<f64>],
    eq_rhs: &[f64],
    upper: &[f64],
    obj: &[f64],
    maximize: bool,
) -> SolveOutcome {
    let n = obj.len();
    let finite_upper: Vec<usize> =
        (0..n).filter(|&i| upper[i].is_finite()).collect();
    let n_slack = finite_upper.len();
    let structural_and_slack = n + n_slack;

    // Build the equality rows: original rows (padded with slack zeros)
    // plus one `x_i + s_i = upper[i]` row per finite upper bound.
    let mut rows: Vec<Vec<f64>> = Vec::new();
    let mut rhs: Vec<f64> = Vec::new();
    for (row, &b) in eq_rows.iter().zip(eq_rhs.iter()) {
        let mut padded = vec![0.0; structural_and_slack];
        padded[..n].copy_from_slice(row);
        rows.push(padded);
        rhs.push(b);
    }
    for (k, &i) in finite_upper.iter().enumerate() {
        let mut padded = vec![0.0; structural_and_slack];
        padded[i] = 1.0;
        padded[n + k] = 1.0;
        rows.push(padded);
        rhs.push(upper[i]);
    }

    // Flip rows with negative rhs so phase-1 artificials start nonnegative.
    for (row, b) in rows.iter_mut().zip(rhs.iter_mut()) {
        if *b < 0.0 {
            for v in row.iter_mut() {
                *v = -*v;
            }
            *b = -*b;
        }
    }

    let m = rows.len();
    let total_cols = structural_and_slack + m; // + artificials
    let mut tab = vec![vec![0.0; total_cols + 1]; m + 1];
    for i in 0..m {
        tab[i][..structural_and_slack].copy_from_slice(&rows[i]);
        tab[i][structural_and_slack + i] = 1.0;
        tab[i][total_cols] = rhs[i];
    }
    let mut basis: Vec<usize> = (0..m).map(|i| structural_and_slack + i).collect();

    // Phase 1: minimize sum of artificials. The row stores -c_j for the
    // quantity being maximized (c = -sum(artificials)), so artificial
    // columns get +1; entering on a negative entry still means "this
    // column would increase the maximand".
    for j in 0..total_cols {
        tab[m][j] = if j >= structural_and_slack { 1.0 } else { 0.0 };
    }
    // Canonicalize: zero out the objective row under the (all-artificial) basis.
    for i in 0..m {
        let factor = tab[m][basis[i]];
        if factor.abs() > EPS {
            let row_i = tab[i].clone();
            for j in 0..=total_cols {
                tab[m][j] -= factor * row_i[j];
            }
        }
    }
    let mut tableau = Tableau { tab, basis, cols: total_cols };
    if tableau.run().is_err() {
        // Phase 1 is always bounded (artificial objective is bounded above by 0).
        return SolveOutcome { status: SolveStatus::Infeasible, values: vec![], objective_value: 0.0 };
    }
    let phase1_obj = -tableau.tab[m][total_cols];
    if phase1_obj > 1e-6 {
        return SolveOutcome { status: SolveStatus::Infeasible, values: vec![], objective_value: 0.0 };
    }
    // Drive any residual zero-level artificials out of the basis where possible.
    for i in 0..m {
        if tableau.basis[i] >= structural_and_slack {
            if let Some(j) = (0..structural_and_slack)
                .find(|&j| tableau.tab[i][j].abs() > EPS)
            {
                tableau.pivot(i, j);
            }
        }
    }

    // Phase 2: optimize the real objective over structural variables only.
    let sign = if maximize { -1.0 } else { 1.0 };
    for j in 0..total_cols {
        tableau.tab[m][j] = if j < n { sign * obj[j] } else { 0.0 };
    }
    for i in 0..m {
        let factor = tableau.tab[m][tableau.basis[i]];
        if factor.abs() > EPS {
            let row_i = tableau.tab[i].clone();
            for j in 0..=total_cols {
                tableau.tab[m][j] -= factor * row_i[j];
            }
        }
    }
    // Artificial columns must not re-enter.
    for j in structural_and_slack..total_cols {
        tableau.tab[m][j] = tableau.tab[m][j].max(0.0);
    }

    if tableau.run().is_err() {
        return SolveOutcome { status: SolveStatus::Unbounded, values: vec![], objective_value: 0.0 };
    }

    let mut values = vec![0.0; n];
    for i in 0..m {
        if tableau.basis[i] < n {
            values[tableau.basis[i]] = tableau.tab[i][total_cols];
        }
    }
    let objective_value: f64 = (0..n).map(|i| obj[i] * values[i]).sum();
    SolveOutcome { status: SolveStatus::Optimal, values, objective_value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_bounded_max() {
        // maximize x0 + x1 subject to x0 + x1 = 5, 0<=x0<=3, 0<=x1<=10
        let out = solve_bounded(
            &[vec![1.0, 1.0]],
            &[5.0],
            &[3.0, 10.0],
            &[1.0, 1.0],
            true,
        );
        assert_eq!(out.status, SolveStatus::Optimal);
        assert!((out.objective_value - 5.0).abs() < 1e-6);
    }

    #[test]
    fn infeasible_detected() {
        // x0 = 5 and x0 = 2 can't both hold.
        let out = solve_bounded(
            &[vec![1.0, 0.0], vec![1.0, 0.0]],
            &[5.0, 2.0],
            &[f64::INFINITY, f64::INFINITY],
            &[1.0, 0.0],
            true,
        );
        assert_eq!(out.status, SolveStatus::Infeasible);
    }

    #[test]
    fn unbounded_detected() {
        // maximize x0, no constraints, x0 unbounded above.
        let out = solve_bounded(&[], &[], &[f64::INFINITY], &[1.0], true);
        assert_eq!(out.status, SolveStatus::Unbounded);
    }
}
