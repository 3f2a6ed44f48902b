//! Fixed-model derivation for recovering duals from a solved MIP.
//!
//! The derived model is a continuous relaxation of the source in which every
//! integer decision is pinned to its solved value. Solving it yields duals
//! that price the constraints around the incumbent.
//!
//! SOS handling, per set, from the members whose solved value is nonzero:
//!
//! - SOS1: nonzero members stay free, the rest are fixed to zero.
//! - SOS2: two or more nonzeros stay free. A single nonzero at position `i`
//!   frees `i` and its right neighbour, or its left neighbour when `i` is
//!   the last member.
//! - No nonzeros: every member is fixed to zero.
//!
//! A variable fixed by any set stays fixed even if another set frees it.

use std::sync::Arc;

use reopt_expr::ids::VariableId;
use reopt_solver::{Solution, Solver, SolverError};

use crate::controller::ReSolveController;
use crate::model::error::ModelError;
use crate::model::{Model, SolveState};
use crate::types::{Bounds, SosKind, SosSet, Variable};

/// Options for [`Model::fixed_model_with`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FixConfig {
    /// Values with magnitude at or below this count as zero.
    pub zero_tolerance: f64,
}

impl FixConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zero_tolerance(mut self, tolerance: f64) -> Self {
        self.zero_tolerance = tolerance.abs();
        self
    }
}

/// A relaxed copy of a solved model, independent of its source.
#[derive(Debug, Clone)]
pub struct FixedModel {
    model: Model,
    freed: Vec<VariableId>,
    fixed: Vec<VariableId>,
}

impl FixedModel {
    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    pub fn into_model(self) -> Model {
        self.model
    }

    /// SOS members left free, in id order.
    pub fn freed(&self) -> &[VariableId] {
        &self.freed
    }

    /// Variables pinned to a value, in id order.
    pub fn fixed(&self) -> &[VariableId] {
        &self.fixed
    }

    pub fn is_freed(&self, var_id: VariableId) -> bool {
        self.freed.binary_search(&var_id).is_ok()
    }

    pub fn is_fixed(&self, var_id: VariableId) -> bool {
        self.fixed.binary_search(&var_id).is_ok()
    }

    /// Solve the relaxed model with any solver.
    pub fn solve_with<S: Solver>(&mut self, solver: S) -> Result<&Solution, SolverError> {
        let mut controller = ReSolveController::new(solver);
        controller.solve(&mut self.model)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Decision {
    Keep,
    Free,
    Fix(f64),
}

impl Model {
    /// Derive the fixed model with default options.
    pub fn fixed_model(&self) -> Result<FixedModel, ModelError> {
        self.fixed_model_with(FixConfig::default())
    }

    /// Derive a relaxed copy with integer and SOS decisions fixed.
    ///
    /// Requires a solution describing the current contents: an unsolved or
    /// dirty model fails with [`ModelError::NotSolved`].
    pub fn fixed_model_with(&self, config: FixConfig) -> Result<FixedModel, ModelError> {
        if self.solve_state() != SolveState::Solved {
            return Err(ModelError::NotSolved);
        }
        let solution: Arc<Solution> = self.solution_snapshot().ok_or(ModelError::NotSolved)?;
        if solution.primal_values.len() < self.variables.len() {
            return Err(ModelError::NotSolved);
        }
        let values = &solution.primal_values;
        let tolerance = config.zero_tolerance;

        let mut decisions: Vec<Decision> = self
            .variables
            .iter()
            .zip(values)
            .map(|(variable, value)| {
                if variable.is_integer() {
                    Decision::Fix(*value)
                } else {
                    Decision::Keep
                }
            })
            .collect();
        // SOS members are decided by their sets alone.
        let mut sos_member = vec![false; self.variables.len()];
        for set in &self.sos_sets {
            for var_id in &set.members {
                sos_member[var_id.index()] = true;
            }
        }
        for (decision, member) in decisions.iter_mut().zip(&sos_member) {
            if *member {
                *decision = Decision::Keep;
            }
        }

        let mut sos_fixed = vec![false; self.variables.len()];
        for (set_index, set) in self.sos_sets.iter().enumerate() {
            let free_positions = free_positions(set, values, tolerance, set_index);
            for (position, var_id) in set.members.iter().enumerate() {
                let index = var_id.index();
                if free_positions.contains(&position) {
                    if !sos_fixed[index] {
                        decisions[index] = Decision::Free;
                    }
                } else {
                    sos_fixed[index] = true;
                    decisions[index] = Decision::Fix(0.0);
                }
            }
        }

        let mut freed = Vec::new();
        let mut fixed = Vec::new();
        let variables: Vec<Variable> = self
            .variables
            .iter()
            .zip(&decisions)
            .enumerate()
            .map(|(index, (variable, decision))| match decision {
                Decision::Keep => *variable,
                Decision::Free => {
                    freed.push(VariableId::new(index as u32));
                    Variable::continuous(variable.bounds)
                }
                Decision::Fix(value) => {
                    fixed.push(VariableId::new(index as u32));
                    Variable::continuous(Bounds::fixed(*value))
                }
            })
            .collect();

        tracing::debug!(
            component = "model",
            operation = "fixed_model",
            status = "success",
            variables = variables.len(),
            sos_sets = self.sos_sets.len(),
            freed = freed.len(),
            fixed = fixed.len(),
            zero_tolerance = tolerance,
            "Derived fixed model"
        );

        let model = Model::from_parts(
            variables,
            self.constraints.clone(),
            self.objective.clone(),
            Vec::new(),
        );
        Ok(FixedModel {
            model,
            freed,
            fixed,
        })
    }
}

/// Positions (in weight order) of the members a set leaves free.
fn free_positions(set: &SosSet, values: &[f64], tolerance: f64, set_index: usize) -> Vec<usize> {
    let nonzero: Vec<usize> = set
        .members
        .iter()
        .enumerate()
        .filter(|(_, var_id)| values[var_id.index()].abs() > tolerance)
        .map(|(position, _)| position)
        .collect();

    let consistent = match set.kind {
        SosKind::Sos1 => nonzero.len() <= 1,
        SosKind::Sos2 => match nonzero.as_slice() {
            [first, second] => second - first == 1,
            other => other.len() <= 2,
        },
    };
    if !consistent {
        tracing::warn!(
            component = "model",
            operation = "fixed_model",
            status = "inconsistent",
            sos_index = set_index,
            kind = set.kind.as_str(),
            nonzeros = nonzero.len(),
            "SOS solution pattern violates its type; freeing every nonzero member"
        );
    }

    match (set.kind, nonzero.as_slice()) {
        (SosKind::Sos2, [position]) => {
            let last = set.members.len() - 1;
            if last == 0 {
                vec![*position]
            } else if *position == last {
                vec![position - 1, *position]
            } else {
                vec![*position, position + 1]
            }
        }
        _ => nonzero,
    }
}
