use thiserror::Error;

/// Error kinds surfaced by the model layer and the LP solver boundary.
///
/// Solver-local variants (`SolverInfeasible`, `SolverUnbounded`,
/// `SolverNumerical`, `SolverTimeout`) are meant to be absorbed into a
/// verdict by the test that triggered them, not propagated past the test
/// body. `InvalidModel`, `ConfigurationError`, and `Cancelled` surface to
/// the caller.
#[derive(Debug, Error)]
pub enum MacawError {
    #[error("invalid model: {0}")]
    InvalidModel(String),

    #[error("LP infeasible")]
    SolverInfeasible,

    #[error("LP unbounded")]
    SolverUnbounded,

    #[error("LP numerical failure: {0}")]
    SolverNumerical(String),

    #[error("LP solve timed out after {0:?}")]
    SolverTimeout(std::time::Duration),

    #[error("configuration error: {0}")]
    ConfigurationError(String),

    #[error("cancelled")]
    Cancelled,
}

pub type MacawResult<T> = Result<T, MacawError>;
