//! Storage access methods for the model.

use reopt_expr::ids::{ConstraintId, VariableId};

use crate::model::error::ModelError;
use crate::model::registry::{Constraint, ConstraintRegistry};
use crate::model::Model;
use crate::types::{Objective, Variable};

impl Model {
    /// Get the number of variables, removed ones included.
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Get the number of constraints
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Get the number of constraint coefficients in the model.
    pub fn num_coefficients(&self) -> usize {
        self.constraints
            .iter()
            .map(|(_, constraint)| constraint.terms().len())
            .sum()
    }

    /// True when any variable is integer or any SOS set is declared.
    pub fn is_mip(&self) -> bool {
        !self.sos_sets.is_empty() || self.variables.iter().any(Variable::is_integer)
    }

    /// Get a variable by ID.
    pub fn variable(&self, var_id: VariableId) -> Result<&Variable, ModelError> {
        self.variables
            .get(var_id.index())
            .ok_or(ModelError::UnknownVariable(var_id))
    }

    /// Iterate over variables in id order.
    pub fn variables(&self) -> impl Iterator<Item = (VariableId, &Variable)> {
        self.variables
            .iter()
            .enumerate()
            .map(|(index, variable)| (VariableId::new(index as u32), variable))
    }

    /// Get a constraint by ID.
    pub fn constraint(&self, con_id: ConstraintId) -> Result<&Constraint, ModelError> {
        self.constraints.get(con_id)
    }

    pub fn constraints(&self) -> &ConstraintRegistry {
        &self.constraints
    }

    /// Terms of a constraint in insertion order.
    pub fn constraint_terms(&self, con_id: ConstraintId) -> Result<&[(VariableId, f64)], ModelError> {
        Ok(self.constraints.get(con_id)?.terms())
    }

    /// Coefficients of a variable across all constraints, in constraint order.
    pub fn column(&self, var_id: VariableId) -> Result<Vec<(ConstraintId, f64)>, ModelError> {
        self.ensure_variable_exists(var_id)?;
        Ok(self
            .constraints
            .iter()
            .filter_map(|(con_id, constraint)| {
                constraint
                    .terms()
                    .iter()
                    .any(|(id, _)| *id == var_id)
                    .then(|| (con_id, constraint.coefficient(var_id)))
            })
            .collect())
    }

    pub fn objective(&self) -> &Objective {
        &self.objective
    }

    /// Current objective coefficient of a variable, zero when absent.
    pub fn objective_coefficient(&self, var_id: VariableId) -> Result<f64, ModelError> {
        self.ensure_variable_exists(var_id)?;
        Ok(self.objective.coefficient(var_id))
    }

    /// True when the variable has been removed, i.e. both bounds are zero.
    pub fn is_removed(&self, var_id: VariableId) -> Result<bool, ModelError> {
        Ok(self.variable(var_id)?.bounds.is_zeroed())
    }

    /// Value of a variable in the last recorded solution.
    ///
    /// On a dirty model this is the value from before the pending edits.
    /// Variables added after that solve have no value and fail with
    /// [`ModelError::NotSolved`].
    pub fn value(&self, var_id: VariableId) -> Result<f64, ModelError> {
        self.ensure_variable_exists(var_id)?;
        self.last_solution()
            .and_then(|solution| solution.get_primal(var_id.index()))
            .ok_or(ModelError::NotSolved)
    }

    /// Dual value of a constraint in the last recorded solution.
    pub fn constraint_dual(&self, con_id: ConstraintId) -> Result<f64, ModelError> {
        self.constraints.ensure_exists(con_id)?;
        self.last_solution()
            .and_then(|solution| solution.get_constraint_dual(con_id.index()))
            .ok_or(ModelError::NotSolved)
    }

    /// Reduced cost of a variable in the last recorded solution.
    pub fn reduced_cost(&self, var_id: VariableId) -> Result<f64, ModelError> {
        self.ensure_variable_exists(var_id)?;
        self.last_solution()
            .and_then(|solution| solution.get_variable_dual(var_id.index()))
            .ok_or(ModelError::NotSolved)
    }
}
