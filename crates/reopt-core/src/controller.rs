//! Re-solve controller: decides how each solve reaches the solver.
//!
//! The controller remembers which model revision its solver holds. When the
//! solver can be patched and still holds the model as of its last recorded
//! solve, only the logged changes are sent. Otherwise the whole model is
//! lowered and loaded again. A hot start is offered for continuous models
//! that have a previous solution.

use std::time::Instant;

use reopt_solver::{Solution, Solver, SolverError, WarmStart};

use crate::model::{Model, SolveState, default_primal_value};
use crate::types::Bounds;

/// How a solve delivers the model to the solver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStrategy {
    /// Lower the whole model and load it, replacing solver state.
    FullResubmission,
    /// Send only the changes logged since the last solve.
    IncrementalPatch,
}

impl SolveStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            SolveStrategy::FullResubmission => "full_resubmission",
            SolveStrategy::IncrementalPatch => "incremental_patch",
        }
    }
}

impl std::fmt::Display for SolveStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the controller did on its last successful solve.
#[derive(Debug, Clone, PartialEq)]
pub struct SolveReport {
    pub strategy: SolveStrategy,
    /// A warm start was passed to the solver.
    pub hot_start: bool,
    /// The model had never been solved before.
    pub cold: bool,
    /// Number of changes sent; zero for full resubmission.
    pub changes_applied: usize,
    pub duration_ms: f64,
}

/// Drives a [`Solver`] over successive solves of a [`Model`].
#[derive(Debug)]
pub struct ReSolveController<S> {
    solver: S,
    /// Model identity and revision the solver currently holds.
    synced: Option<(u64, u64)>,
    last_report: Option<SolveReport>,
}

impl<S: Solver> ReSolveController<S> {
    pub fn new(solver: S) -> Self {
        Self {
            solver,
            synced: None,
            last_report: None,
        }
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// Mutable access to the solver. Anything done through it may
    /// desynchronise the solver, so the next solve re-submits.
    pub fn solver_mut(&mut self) -> &mut S {
        self.synced = None;
        &mut self.solver
    }

    pub fn into_inner(self) -> S {
        self.solver
    }

    pub fn last_report(&self) -> Option<&SolveReport> {
        self.last_report.as_ref()
    }

    /// Strategy the next [`solve`](Self::solve) of `model` would use.
    pub fn select_strategy(&self, model: &Model) -> SolveStrategy {
        let capabilities = self.solver.capabilities();
        let in_sync = model.solve_state() != SolveState::Unsolved
            && self.synced == Some((model.uid(), model.solved_revision()));
        if capabilities.supports_incremental_modification && in_sync {
            SolveStrategy::IncrementalPatch
        } else {
            SolveStrategy::FullResubmission
        }
    }

    /// Solve `model`, record the solution on it and return it.
    ///
    /// # Errors
    ///
    /// Solver errors are returned unchanged. On error the model keeps its
    /// state and change log, and the next solve re-submits in full.
    pub fn solve<'m>(&mut self, model: &'m mut Model) -> Result<&'m Solution, SolverError> {
        let start = Instant::now();
        if model.num_variables() == 0 {
            return Err(SolverError::EmptyModel);
        }

        let strategy = self.select_strategy(model);
        let cold = model.solve_state() == SolveState::Unsolved;
        let mut changes_applied = 0;
        let delivered = match strategy {
            SolveStrategy::FullResubmission => self.solver.load(&model.to_problem()),
            SolveStrategy::IncrementalPatch => {
                let changes = model.lowered_changes();
                changes_applied = changes.len();
                self.solver.apply_changes(&changes)
            }
        };
        if let Err(err) = delivered {
            return Err(self.fail(strategy, err));
        }

        let warm_start = self.warm_start(model);
        let hot_start = warm_start.is_some();
        let solution = match self.solver.optimize(warm_start.as_ref()) {
            Ok(solution) => solution,
            Err(err) => return Err(self.fail(strategy, err)),
        };
        if solution.primal_values.len() != model.num_variables() {
            let err = SolverError::SolverSpecific(format!(
                "solver returned {} primal values for {} variables",
                solution.primal_values.len(),
                model.num_variables()
            ));
            return Err(self.fail(strategy, err));
        }

        self.synced = Some((model.uid(), model.revision()));
        let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
        tracing::debug!(
            component = "controller",
            operation = "solve",
            status = "success",
            solver = self.solver.name(),
            strategy = strategy.as_str(),
            hot_start,
            cold,
            changes_applied,
            revision = model.revision(),
            solver_status = solution.status.as_str(),
            duration_ms,
            "Solved model"
        );
        self.last_report = Some(SolveReport {
            strategy,
            hot_start,
            cold,
            changes_applied,
            duration_ms,
        });
        Ok(model.record_solution(solution))
    }

    fn warm_start(&self, model: &Model) -> Option<WarmStart> {
        if !self.solver.capabilities().supports_warm_start || model.is_mip() {
            return None;
        }
        let previous = model.last_solution()?;
        let primal = model
            .variables()
            .map(|(var_id, variable)| {
                let Bounds { lower, upper } = variable.bounds;
                match previous.get_primal(var_id.index()) {
                    // Bounds may have moved since the previous solve.
                    Some(value) => value.clamp(lower, upper),
                    None => default_primal_value(lower, upper),
                }
            })
            .collect();
        Some(WarmStart { primal })
    }

    fn fail(&mut self, strategy: SolveStrategy, err: SolverError) -> SolverError {
        self.synced = None;
        self.last_report = None;
        tracing::warn!(
            component = "controller",
            operation = "solve",
            status = "error",
            solver = self.solver.name(),
            strategy = strategy.as_str(),
            error_code = err.code(),
            "Solve failed; next solve will re-submit the model"
        );
        err
    }
}
