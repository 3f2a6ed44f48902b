//! Lowering into the positional problem image solvers consume.
//!
//! Variable `i` becomes column `i`, constraint `j` becomes row `j` and SOS
//! set `k` becomes entry `k` of [`Problem::sos`]. The result depends only on
//! the current contents, so patching the image from the last solve with
//! [`Model::lowered_changes`] lands on the same problem as lowering again.

use reopt_solver::{Column, Problem, ProblemChange, Row, SosConstraint};

use crate::model::Model;

impl Model {
    /// Build the full solver-facing problem for the current contents.
    pub fn to_problem(&self) -> Problem {
        let mut objective = vec![0.0; self.variables.len()];
        for (var_id, coeff) in &self.objective.terms {
            if let Some(slot) = objective.get_mut(var_id.index()) {
                *slot += *coeff;
            }
        }

        let columns: Vec<Column> = self
            .variables
            .iter()
            .zip(objective)
            .map(|(variable, objective)| Column {
                lower: variable.bounds.lower,
                upper: variable.bounds.upper,
                objective,
                is_integer: variable.is_integer(),
            })
            .collect();

        let rows: Vec<Row> = self
            .constraints
            .iter()
            .map(|(_, constraint)| {
                let (lower, upper) = constraint.row_bounds();
                Row {
                    lower,
                    upper,
                    terms: constraint
                        .terms()
                        .iter()
                        .map(|(var_id, coeff)| (var_id.index(), *coeff))
                        .collect(),
                }
            })
            .collect();

        let sos = self
            .sos_sets
            .iter()
            .map(|set| SosConstraint {
                kind: set.kind,
                members: set.members.iter().map(|var_id| var_id.index()).collect(),
                weights: set.weights.clone(),
            })
            .collect();

        let problem = Problem {
            sense: self.objective.sense,
            objective_offset: self.objective.constant,
            columns,
            rows,
            sos,
        };
        tracing::trace!(
            component = "model",
            operation = "to_problem",
            status = "success",
            columns = problem.num_columns(),
            rows = problem.num_rows(),
            nonzeros = problem.num_nonzeros(),
            sos = problem.sos.len(),
            "Lowered model"
        );
        problem
    }

    /// Pending changes in solver-facing form, oldest first.
    pub fn lowered_changes(&self) -> Vec<ProblemChange> {
        self.pending_changes().iter().map(|change| change.lower()).collect()
    }
}
