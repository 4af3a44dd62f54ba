//! LP primitives: the `LpSolver` boundary, a timeout/retry wrapper
//! around it, and (for tests only) a small reference implementation.

pub mod reference;
mod simplex;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rustc_hash::FxHashMap;

use crate::error::{MacawError, MacawResult};
use crate::model::WorkingModel;

/// A shared flag a caller can raise to ask outstanding dilution/loop
/// workers to stop starting new LP solves, so a cancel request is
/// observed within one LP quantum rather than left to run to
/// completion. Cloning shares the same underlying flag; the default
/// token is never cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Returns `Err(MacawError::Cancelled)` iff this token has been raised.
    /// Call between work units so a cancel request is observed within one
    /// LP quantum rather than only at the end of the whole pool.
    pub fn check(&self) -> MacawResult<()> {
        if self.is_cancelled() {
            Err(MacawError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// The primal solution of a successful FBA solve: flux value per reaction
/// and the achieved objective value.
#[derive(Debug, Clone)]
pub struct FbaOutcome {
    pub fluxes: FxHashMap<String, f64>,
    pub objective_value: f64,
}

/// The external LP solver contract: out of scope to implement for real
/// (GLPK/HiGHS/CPLEX-equivalent) but specified here as the seam MACAW
/// calls through. A production binary wires in a real backend;
/// `reference::DenseLpSolver` is a minimal in-crate implementation
/// sized for the test suite's small models.
pub trait LpSolver: Send + Sync {
    /// Maximizes (or minimizes) `objective` subject to steady-state mass
    /// balance, `model`'s bounds, and `model`'s extra linear constraints.
    fn solve(
        &self,
        model: &WorkingModel,
        objective: &FxHashMap<String, f64>,
        maximize: bool,
    ) -> MacawResult<FbaOutcome>;

    /// Draws `n` flux vectors from the feasible polytope.
    fn sample(
        &self,
        model: &WorkingModel,
        n: usize,
        seed: u64,
    ) -> MacawResult<Vec<FxHashMap<String, f64>>>;
}

/// Runs `f` on a worker thread and enforces `timeout`; on timeout returns
/// `MacawError::SolverTimeout`. The worker thread is detached on timeout
/// rather than joined, since `LpSolver` implementations are not assumed
/// to be cancel-safe mid-solve; it will finish and drop its result.
pub fn with_timeout<T, F>(timeout: Duration, f: F) -> MacawResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> MacawResult<T> + Send + 'static,
{
    let (tx, rx) = crossbeam_channel::bounded(1);
    std::thread::spawn(move || {
        let result = f();
        let _ = tx.send(result);
    });
    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
            Err(MacawError::SolverTimeout(timeout))
        }
        Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
            Err(MacawError::SolverNumerical(
                "solver worker thread panicked".to_string(),
            ))
        }
    }
}

/// Retries `f` up to `max_attempts` times, returning the first success or
/// propagating the last `SolverTimeout`. Non-timeout errors return
/// immediately without consuming a retry.
pub fn with_retry<T, F>(max_attempts: u32, mut f: F) -> MacawResult<T>
where
    F: FnMut() -> MacawResult<T>,
{
    let mut last_err = MacawError::SolverNumerical("no attempts made".to_string());
    for attempt in 1..=max_attempts.max(1) {
        match f() {
            Ok(v) => return Ok(v),
            Err(MacawError::SolverTimeout(d)) => {
                log::warn!(
                    "solve attempt {attempt}/{max_attempts} timed out after {d:?}"
                );
                last_err = MacawError::SolverTimeout(d);
            }
            Err(other) => return Err(other),
        }
    }
    Err(last_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn cancellation_token_shares_state_across_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(token.check().is_ok());
        clone.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(MacawError::Cancelled)));
    }

    #[test]
    fn with_timeout_propagates_timeout_error() {
        let result: MacawResult<()> = with_timeout(Duration::from_millis(20), || {
            std::thread::sleep(Duration::from_millis(200));
            Ok(())
        });
        assert!(matches!(result, Err(MacawError::SolverTimeout(_))));
    }

    #[test]
    fn with_retry_gives_up_after_max_attempts() {
        let mut attempts = 0;
        let result: MacawResult<()> = with_retry(3, || {
            attempts += 1;
            Err(MacawError::SolverTimeout(Duration::from_secs(1)))
        });
        assert!(matches!(result, Err(MacawError::SolverTimeout(_))));
        assert_eq!(attempts, 3);
    }

    #[test]
    fn with_retry_does_not_consume_a_retry_on_non_timeout_error() {
        let mut attempts = 0;
        let result: MacawResult<()> = with_retry(3, || {
            attempts += 1;
            Err(MacawError::SolverInfeasible)
        });
        assert!(matches!(result, Err(MacawError::SolverInfeasible)));
        assert_eq!(attempts, 1);
    }
}
