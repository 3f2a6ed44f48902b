//! Model module for building and incrementally editing optimization models.
//!
//! This module provides the core [`Model`] type and related structures for
//! linear and mixed-integer programs that are edited between solves.
//!
//! # Module Organization
//!
//! - [`error`]: Model error types
//! - [`registry`]: Constraint identities and append-only term lists
//! - [`changes`]: Change log entries recorded between solves
//! - [`builder`]: Adding variables and constraints, editing bounds, RHS and objective
//! - [`sos`]: Special ordered sets
//! - [`storage`]: Read access
//! - [`lower`]: Deterministic lowering into the solver-facing [`Problem`](reopt_solver::Problem)
//! - [`fixed`]: Fixed-model derivation for dual recovery

mod builder;
mod changes;
mod error;
mod fixed;
mod lower;
mod registry;
mod sos;
mod storage;

use crate::types::{Objective, SosSet, Variable};
use reopt_solver::Solution;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

pub use changes::ModelChange;
pub use error::ModelError;
pub use fixed::{FixConfig, FixedModel};
pub use registry::{Constraint, ConstraintRegistry};

static NEXT_MODEL_UID: AtomicU64 = AtomicU64::new(1);

fn next_model_uid() -> u64 {
    NEXT_MODEL_UID.fetch_add(1, Ordering::Relaxed)
}

/// Where a model stands relative to its last solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveState {
    /// Never solved successfully.
    Unsolved,
    /// The recorded solution describes the current contents.
    Solved,
    /// Mutated since the recorded solution.
    Dirty,
}

impl SolveState {
    pub fn as_str(self) -> &'static str {
        match self {
            SolveState::Unsolved => "unsolved",
            SolveState::Solved => "solved",
            SolveState::Dirty => "dirty",
        }
    }
}

/// An optimization model that can be edited after it has been solved.
///
/// Variables are never physically removed: removal zeroes their bounds and
/// every [`VariableId`](reopt_expr::VariableId) stays valid for the model's
/// lifetime. Edits take effect in memory immediately and reach the solver on
/// the next solve, either as a fresh [`Problem`](reopt_solver::Problem) or as
/// the logged [`ModelChange`]s.
#[derive(Debug)]
pub struct Model {
    uid: u64,
    pub(crate) variables: Vec<Variable>,
    pub(crate) constraints: ConstraintRegistry,
    pub(crate) objective: Objective,
    pub(crate) sos_sets: Vec<SosSet>,
    state: SolveState,
    revision: u64,
    solved_revision: u64,
    pending: Vec<ModelChange>,
    last_solution: Option<Arc<Solution>>,
}

impl Model {
    /// Create a new empty model.
    pub fn new() -> Self {
        Self {
            uid: next_model_uid(),
            variables: Vec::new(),
            constraints: ConstraintRegistry::default(),
            objective: Objective::new(),
            sos_sets: Vec::new(),
            state: SolveState::Unsolved,
            revision: 0,
            solved_revision: 0,
            pending: Vec::new(),
            last_solution: None,
        }
    }

    /// Unsolved model over existing contents.
    pub(crate) fn from_parts(
        variables: Vec<Variable>,
        constraints: ConstraintRegistry,
        objective: Objective,
        sos_sets: Vec<SosSet>,
    ) -> Self {
        Self {
            variables,
            constraints,
            objective,
            sos_sets,
            ..Self::new()
        }
    }

    /// Current solve state.
    pub fn solve_state(&self) -> SolveState {
        self.state
    }

    /// True when mutated since the last recorded solve.
    pub fn is_dirty(&self) -> bool {
        self.state == SolveState::Dirty
    }

    /// Number of mutations applied over the model's lifetime.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Revision at which the last solution was recorded.
    pub fn solved_revision(&self) -> u64 {
        self.solved_revision
    }

    /// Changes recorded since the last solve. Empty while unsolved.
    pub fn pending_changes(&self) -> &[ModelChange] {
        &self.pending
    }

    /// Last recorded solution, possibly stale when the model is dirty.
    pub fn last_solution(&self) -> Option<&Solution> {
        self.last_solution.as_deref()
    }

    /// Shared handle on the last recorded solution.
    pub fn solution_snapshot(&self) -> Option<Arc<Solution>> {
        self.last_solution.clone()
    }

    pub(crate) fn uid(&self) -> u64 {
        self.uid
    }

    /// Bump the revision and log the change for the next incremental solve.
    pub(crate) fn record_change(&mut self, change: ModelChange) {
        self.revision += 1;
        tracing::trace!(
            component = "model",
            operation = "record_change",
            status = "success",
            change = change.kind(),
            revision = self.revision,
            state = self.state.as_str(),
            "Recorded model change"
        );
        match self.state {
            // Nothing to patch against yet; the first solve loads everything.
            SolveState::Unsolved => {}
            SolveState::Solved => {
                self.state = SolveState::Dirty;
                self.pending.push(change);
            }
            SolveState::Dirty => self.pending.push(change),
        }
    }

    /// Store a solution for the current contents and clear the change log.
    pub(crate) fn record_solution(&mut self, solution: Solution) -> &Solution {
        self.state = SolveState::Solved;
        self.solved_revision = self.revision;
        self.pending.clear();
        tracing::debug!(
            component = "model",
            operation = "record_solution",
            status = "success",
            revision = self.revision,
            objective_value = solution.objective_value,
            solver_status = solution.status.as_str(),
            "Recorded solution"
        );
        self.last_solution.insert(Arc::new(solution))
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Model {
    /// Clones get their own identity, so a solver synchronised with the
    /// original never receives the clone's changes as a patch.
    fn clone(&self) -> Self {
        Self {
            uid: next_model_uid(),
            variables: self.variables.clone(),
            constraints: self.constraints.clone(),
            objective: self.objective.clone(),
            sos_sets: self.sos_sets.clone(),
            state: self.state,
            revision: self.revision,
            solved_revision: self.solved_revision,
            pending: self.pending.clone(),
            last_solution: self.last_solution.clone(),
        }
    }
}

/// Starting value for a column with no previous solution value: the feasible
/// point of `[lower, upper]` closest to zero.
pub(crate) fn default_primal_value(lower: f64, upper: f64) -> f64 {
    if lower.is_finite() && upper.is_finite() {
        if lower <= 0.0 && 0.0 <= upper {
            0.0
        } else if 0.0 < lower {
            lower
        } else {
            upper
        }
    } else if lower.is_finite() {
        if 0.0 < lower { lower } else { 0.0 }
    } else if upper.is_finite() {
        if 0.0 > upper { upper } else { 0.0 }
    } else {
        0.0
    }
}
