//! Solver-agnostic solution values.

use crate::SolverStatus;
use std::collections::BTreeMap;

/// Solution from an optimization solve.
///
/// All vectors are positional: index `i` of `primal_values` is column `i` of
/// the loaded [`Problem`](crate::Problem), which for reopt models is the
/// variable with id `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Primal values of variables indexed by their column position.
    pub primal_values: Vec<f64>,
    /// Dual values of variables (reduced costs) indexed by their column position.
    pub variable_duals: Vec<f64>,
    /// Dual values of constraints (shadow prices) indexed by their row position.
    pub constraint_duals: Vec<f64>,
    /// Row activity values (constraint LHS evaluated at the solution) indexed by row position.
    pub row_values: Vec<f64>,
    /// Objective value of the solution.
    pub objective_value: f64,
    /// Status of the solution.
    pub status: SolverStatus,
    /// Solve time in seconds.
    pub solve_time_seconds: f64,
    /// Solver-specific metadata (e.g., iteration counts, gaps).
    pub metadata: BTreeMap<String, f64>,
}

impl Solution {
    /// Get the primal value at the given index.
    pub fn get_primal(&self, index: usize) -> Option<f64> {
        self.primal_values.get(index).copied()
    }

    /// Get the variable dual (reduced cost) at the given index.
    pub fn get_variable_dual(&self, index: usize) -> Option<f64> {
        self.variable_duals.get(index).copied()
    }

    /// Get the constraint dual (shadow price) at the given index.
    pub fn get_constraint_dual(&self, index: usize) -> Option<f64> {
        self.constraint_duals.get(index).copied()
    }

    /// Get the row activity value (constraint LHS at solution) at the given index.
    pub fn get_row_value(&self, index: usize) -> Option<f64> {
        self.row_values.get(index).copied()
    }

    /// Get a metadata entry by key.
    pub fn get_metadata(&self, key: &str) -> Option<f64> {
        self.metadata.get(key).copied()
    }

    /// Check if the solution is optimal.
    pub fn is_optimal(&self) -> bool {
        self.status.is_optimal()
    }

    /// Check if the solution is feasible.
    pub fn is_feasible(&self) -> bool {
        self.status.is_feasible()
    }

    /// Get a human-readable status string.
    pub fn status_string(&self) -> &'static str {
        self.status.as_str()
    }
}
