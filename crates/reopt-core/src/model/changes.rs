//! Change log of mutations since the last recorded solve.
//!
//! Each entry carries the data as it was when the mutation happened, so
//! later edits (a term appended to a constraint, say) never leak into
//! earlier entries.

use reopt_expr::expr::ComparisonSense;
use reopt_expr::ids::{ConstraintId, SosId, VariableId};
use reopt_solver::{Column, ProblemChange, Row, Sense, SosConstraint};

use crate::types::{Bounds, SosSet, Variable};

/// One mutation of a [`Model`](crate::Model).
#[derive(Debug, Clone, PartialEq)]
pub enum ModelChange {
    AddVariable {
        id: VariableId,
        variable: Variable,
        objective: f64,
        column: Vec<(ConstraintId, f64)>,
    },
    SetBounds {
        id: VariableId,
        bounds: Bounds,
    },
    AddConstraint {
        id: ConstraintId,
        sense: ComparisonSense,
        rhs: f64,
        terms: Vec<(VariableId, f64)>,
    },
    SetRhs {
        id: ConstraintId,
        sense: ComparisonSense,
        rhs: f64,
    },
    SetObjective {
        sense: Sense,
        terms: Vec<(VariableId, f64)>,
        constant: f64,
    },
    AddSos {
        id: SosId,
        set: SosSet,
    },
}

impl ModelChange {
    pub fn kind(&self) -> &'static str {
        match self {
            ModelChange::AddVariable { .. } => "add_variable",
            ModelChange::SetBounds { .. } => "set_bounds",
            ModelChange::AddConstraint { .. } => "add_constraint",
            ModelChange::SetRhs { .. } => "set_constraint_rhs",
            ModelChange::SetObjective { .. } => "set_objective",
            ModelChange::AddSos { .. } => "add_sos",
        }
    }

    /// Positional form understood by solvers.
    pub fn lower(&self) -> ProblemChange {
        match self {
            ModelChange::AddVariable {
                variable,
                objective,
                column,
                ..
            } => ProblemChange::AddColumn {
                column: Column {
                    lower: variable.bounds.lower,
                    upper: variable.bounds.upper,
                    objective: *objective,
                    is_integer: variable.is_integer(),
                },
                entries: column
                    .iter()
                    .map(|(con_id, coeff)| (con_id.index(), *coeff))
                    .collect(),
            },
            ModelChange::SetBounds { id, bounds } => ProblemChange::SetColumnBounds {
                index: id.index(),
                lower: bounds.lower,
                upper: bounds.upper,
            },
            ModelChange::AddConstraint {
                sense, rhs, terms, ..
            } => {
                let (lower, upper) = sense.row_bounds(*rhs);
                ProblemChange::AddRow(Row {
                    lower,
                    upper,
                    terms: terms
                        .iter()
                        .map(|(var_id, coeff)| (var_id.index(), *coeff))
                        .collect(),
                })
            }
            ModelChange::SetRhs { id, sense, rhs } => {
                let (lower, upper) = sense.row_bounds(*rhs);
                ProblemChange::SetRowBounds {
                    index: id.index(),
                    lower,
                    upper,
                }
            }
            ModelChange::SetObjective {
                sense,
                terms,
                constant,
            } => ProblemChange::SetObjective {
                sense: *sense,
                offset: *constant,
                coefficients: terms
                    .iter()
                    .map(|(var_id, coeff)| (var_id.index(), *coeff))
                    .collect(),
            },
            ModelChange::AddSos { set, .. } => ProblemChange::AddSos(SosConstraint {
                kind: set.kind,
                members: set.members.iter().map(|id| id.index()).collect(),
                weights: set.weights.clone(),
            }),
        }
    }
}
