//! Solver trait for abstraction over different solver backends.

use crate::{Problem, ProblemChange, Solution, SolverError};

/// What a configured backend can do between two solves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SolverCapabilities {
    /// The backend accepts [`ProblemChange`] patches on top of a loaded problem.
    pub supports_incremental_modification: bool,
    /// The backend can start from a previous primal solution.
    pub supports_warm_start: bool,
}

impl SolverCapabilities {
    /// A backend that only accepts whole problems and always starts cold.
    pub fn full_only() -> Self {
        Self::default()
    }
}

/// Starting point for a hot-started solve, indexed by column position.
#[derive(Debug, Clone, PartialEq)]
pub struct WarmStart {
    pub primal: Vec<f64>,
}

/// Trait for solver implementations.
///
/// A solver holds at most one loaded problem. [`Solver::load`] replaces all
/// state, so a loaded problem never depends on what was loaded before it.
/// [`Solver::apply_changes`] edits the loaded problem in place and is only
/// called when [`SolverCapabilities::supports_incremental_modification`] is set.
pub trait Solver {
    /// Short backend name used in logs.
    fn name(&self) -> &'static str;

    /// Capabilities under the current configuration.
    fn capabilities(&self) -> SolverCapabilities;

    /// Replace any loaded problem with `problem`.
    fn load(&mut self, problem: &Problem) -> Result<(), SolverError>;

    /// Patch the loaded problem.
    ///
    /// # Errors
    ///
    /// The default implementation returns [`SolverError::Unsupported`].
    fn apply_changes(&mut self, _changes: &[ProblemChange]) -> Result<(), SolverError> {
        Err(SolverError::Unsupported {
            operation: "apply_changes",
        })
    }

    /// Solve the loaded problem.
    fn optimize(&mut self, warm_start: Option<&WarmStart>) -> Result<Solution, SolverError>;
}

impl<S: Solver + ?Sized> Solver for &mut S {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn capabilities(&self) -> SolverCapabilities {
        (**self).capabilities()
    }

    fn load(&mut self, problem: &Problem) -> Result<(), SolverError> {
        (**self).load(problem)
    }

    fn apply_changes(&mut self, changes: &[ProblemChange]) -> Result<(), SolverError> {
        (**self).apply_changes(changes)
    }

    fn optimize(&mut self, warm_start: Option<&WarmStart>) -> Result<Solution, SolverError> {
        (**self).optimize(warm_start)
    }
}

impl<S: Solver + ?Sized> Solver for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn capabilities(&self) -> SolverCapabilities {
        (**self).capabilities()
    }

    fn load(&mut self, problem: &Problem) -> Result<(), SolverError> {
        (**self).load(problem)
    }

    fn apply_changes(&mut self, changes: &[ProblemChange]) -> Result<(), SolverError> {
        (**self).apply_changes(changes)
    }

    fn optimize(&mut self, warm_start: Option<&WarmStart>) -> Result<Solution, SolverError> {
        (**self).optimize(warm_start)
    }
}
