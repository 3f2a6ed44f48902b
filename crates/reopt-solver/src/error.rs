//! Solver error types.

use crate::SolverStatus;

/// Error type for solver operations.
///
/// The model layer surfaces these unchanged; it does not interpret or retry them.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Problem has no columns.
    EmptyModel,
    /// `optimize` was called before any problem was loaded.
    NotLoaded,
    /// Problem image or patch is malformed for this backend.
    InvalidProblem(String),
    /// The backend does not implement the requested operation.
    Unsupported {
        /// Name of the rejected operation.
        operation: &'static str,
    },
    /// Solver failed to find a usable solution.
    SolveFailure {
        /// The solver status that caused the failure.
        status: SolverStatus,
    },
    /// Backend-specific error not covered by other variants.
    SolverSpecific(String),
}

impl SolverError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            SolverError::EmptyModel => "SOLVER_EMPTY_MODEL",
            SolverError::NotLoaded => "SOLVER_NOT_LOADED",
            SolverError::InvalidProblem(_) => "SOLVER_INVALID_PROBLEM",
            SolverError::Unsupported { .. } => "SOLVER_UNSUPPORTED",
            SolverError::SolveFailure { status } => match status {
                SolverStatus::Infeasible => "SOLVER_INFEASIBLE",
                SolverStatus::Unbounded => "SOLVER_UNBOUNDED",
                SolverStatus::ReachedTimeLimit => "SOLVER_TIME_LIMIT",
                SolverStatus::ReachedIterationLimit => "SOLVER_ITERATION_LIMIT",
                _ => "SOLVER_SOLVE_FAILURE",
            },
            SolverError::SolverSpecific(_) => "SOLVER_SPECIFIC",
        }
    }
}

impl std::fmt::Display for SolverError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverError::EmptyModel => write!(f, "[{}] Model has no variables", self.code()),
            SolverError::NotLoaded => {
                write!(f, "[{}] No problem loaded into the solver", self.code())
            }
            SolverError::InvalidProblem(reason) => {
                write!(f, "[{}] Invalid problem: {}", self.code(), reason)
            }
            SolverError::Unsupported { operation } => write!(
                f,
                "[{}] Solver does not support {}",
                self.code(),
                operation
            ),
            SolverError::SolveFailure { status } => {
                write!(f, "[{}] Solve failed with status: {}", self.code(), status)
            }
            SolverError::SolverSpecific(msg) => {
                write!(f, "[{}] Solver error: {}", self.code(), msg)
            }
        }
    }
}

impl std::error::Error for SolverError {}
