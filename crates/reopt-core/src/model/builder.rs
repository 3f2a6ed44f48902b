//! Model builder methods: variables, constraints, bounds, RHS and objective.

use std::collections::BTreeMap;

use reopt_expr::expr::{ComparisonSense, ConstraintExpr, Expr, LinearExprError, zip_terms};
use reopt_expr::ids::{ConstraintId, VariableId};

use crate::model::error::ModelError;
use crate::model::{Model, ModelChange};
use crate::types::{Bounds, NewVariable, Sense};

impl Model {
    /// Add a variable, entering it into existing constraints and the objective.
    ///
    /// Every check runs before the model is touched: on error nothing changes.
    /// Repeated constraint references are summed; zero coefficients add no term.
    pub fn add_variable(&mut self, new: impl Into<NewVariable>) -> Result<VariableId, ModelError> {
        let NewVariable {
            variable,
            objective,
            constraints,
            coefficients,
        } = new.into();

        if !variable.bounds.is_valid() {
            return Err(ModelError::InvalidVariableBounds {
                lower: variable.bounds.lower,
                upper: variable.bounds.upper,
            });
        }
        if !objective.is_finite() {
            return Err(ModelError::InvalidCoefficient {
                coefficient: objective,
            });
        }
        let non_finite = coefficients.iter().copied().find(|c| !c.is_finite());
        let pairs = zip_terms(constraints, coefficients).map_err(|err| match err {
            LinearExprError::MismatchedLengths { ids, coefficients } => ModelError::ArityMismatch {
                items: ids,
                coefficients,
            },
            LinearExprError::NonFiniteCoefficient => ModelError::InvalidCoefficient {
                coefficient: non_finite.unwrap_or(f64::NAN),
            },
        })?;
        let mut column: BTreeMap<ConstraintId, f64> = BTreeMap::new();
        for (con_id, coeff) in pairs {
            self.constraints.ensure_exists(con_id)?;
            *column.entry(con_id).or_insert(0.0) += coeff;
        }
        let column: Vec<(ConstraintId, f64)> =
            column.into_iter().filter(|(_, c)| *c != 0.0).collect();

        let id = VariableId::new(self.variables.len() as u32);
        self.variables.push(variable);
        for (con_id, coeff) in &column {
            self.constraints.append_term(*con_id, id, *coeff)?;
        }
        if objective != 0.0 {
            self.objective.terms.push((id, objective));
        }

        tracing::debug!(
            component = "model",
            operation = "add_variable",
            status = "success",
            var_id = id.inner(),
            kind = variable.kind.as_str(),
            lower = variable.bounds.lower,
            upper = variable.bounds.upper,
            objective,
            constraints = column.len(),
            "Added variable"
        );
        self.record_change(ModelChange::AddVariable {
            id,
            variable,
            objective,
            column,
        });
        Ok(id)
    }

    /// Replace the bounds of a variable.
    ///
    /// Takes effect in memory at once and reaches the solver on the next solve.
    pub fn set_bounds(&mut self, var_id: VariableId, lower: f64, upper: f64) -> Result<(), ModelError> {
        self.ensure_variable_exists(var_id)?;
        let bounds = Bounds::new(lower, upper);
        if !bounds.is_valid() {
            return Err(ModelError::InvalidVariableBounds { lower, upper });
        }
        self.variables[var_id.index()].bounds = bounds;
        tracing::debug!(
            component = "model",
            operation = "set_bounds",
            status = "success",
            var_id = var_id.inner(),
            lower,
            upper,
            "Updated variable bounds"
        );
        self.record_change(ModelChange::SetBounds { id: var_id, bounds });
        Ok(())
    }

    /// Remove a variable by zeroing its bounds.
    ///
    /// The id stays valid and the variable keeps its constraint and objective
    /// terms; it is still sent to the solver.
    pub fn remove_variable(&mut self, var_id: VariableId) -> Result<(), ModelError> {
        self.set_bounds(var_id, 0.0, 0.0)
    }

    /// Replace the objective wholesale.
    ///
    /// Duplicate terms are merged, so repeating a call with the same
    /// arguments leaves the model as a single call would.
    pub fn set_objective(&mut self, sense: Sense, expr: Expr) -> Result<(), ModelError> {
        self.validate_terms(expr.linear_terms())?;
        if !expr.constant().is_finite() {
            return Err(ModelError::InvalidCoefficient {
                coefficient: expr.constant(),
            });
        }
        let terms = expr.normalized_terms();
        let constant = expr.constant();
        self.objective.sense = sense;
        self.objective.terms = terms.clone();
        self.objective.constant = constant;
        tracing::debug!(
            component = "model",
            operation = "set_objective",
            status = "success",
            sense = sense.as_str(),
            terms = terms.len(),
            "Set objective function"
        );
        self.record_change(ModelChange::SetObjective {
            sense,
            terms,
            constant,
        });
        Ok(())
    }

    /// Minimize a linear expression.
    pub fn minimize(&mut self, expr: Expr) -> Result<(), ModelError> {
        self.set_objective(Sense::Minimize, expr)
    }

    /// Maximize a linear expression.
    pub fn maximize(&mut self, expr: Expr) -> Result<(), ModelError> {
        self.set_objective(Sense::Maximize, expr)
    }

    /// Add the constraint `expr <sense> rhs`.
    ///
    /// A constant in `expr` is moved to the right-hand side.
    pub fn add_constraint(
        &mut self,
        sense: ComparisonSense,
        expr: Expr,
        rhs: f64,
    ) -> Result<ConstraintId, ModelError> {
        self.validate_terms(expr.linear_terms())?;
        let rhs = rhs - expr.constant();
        if rhs.is_nan() {
            return Err(ModelError::InvalidRhs { rhs });
        }
        let terms = expr.normalized_terms();
        let id = self.constraints.register(sense, rhs, terms.clone());
        tracing::debug!(
            component = "model",
            operation = "add_constraint",
            status = "success",
            constraint_id = id.inner(),
            sense = sense.as_str(),
            rhs,
            terms = terms.len(),
            "Added constraint"
        );
        self.record_change(ModelChange::AddConstraint {
            id,
            sense,
            rhs,
            terms,
        });
        Ok(id)
    }

    /// Add a constraint built with the expression comparison helpers.
    pub fn add_constraint_expr(&mut self, constraint: ConstraintExpr) -> Result<ConstraintId, ModelError> {
        let (expr, sense, rhs) = constraint.into_parts();
        self.add_constraint(sense, expr, rhs)
    }

    /// Replace the right-hand side of a `<=` or `>=` constraint.
    pub fn set_constraint_rhs(&mut self, con_id: ConstraintId, rhs: f64) -> Result<(), ModelError> {
        self.constraints.ensure_exists(con_id)?;
        if rhs.is_nan() {
            return Err(ModelError::InvalidRhs { rhs });
        }
        let sense = self.constraints.set_rhs(con_id, rhs)?;
        tracing::debug!(
            component = "model",
            operation = "set_constraint_rhs",
            status = "success",
            constraint_id = con_id.inner(),
            rhs,
            "Updated constraint right-hand side"
        );
        self.record_change(ModelChange::SetRhs {
            id: con_id,
            sense,
            rhs,
        });
        Ok(())
    }

    /// Coefficients are immutable once set; this always fails for known ids.
    pub fn change_coefficient(
        &mut self,
        var_id: VariableId,
        con_id: ConstraintId,
        value: f64,
    ) -> Result<(), ModelError> {
        self.ensure_variable_exists(var_id)?;
        self.constraints.ensure_exists(con_id)?;
        tracing::debug!(
            component = "model",
            operation = "change_coefficient",
            status = "rejected",
            var_id = var_id.inner(),
            constraint_id = con_id.inner(),
            value,
            "Rejected coefficient change"
        );
        Err(ModelError::UnsupportedMutation {
            operation: "change_coefficient",
            reason: "constraint coefficients cannot change after they are set",
        })
    }

    pub(crate) fn ensure_variable_exists(&self, var_id: VariableId) -> Result<(), ModelError> {
        if var_id.index() < self.variables.len() {
            Ok(())
        } else {
            Err(ModelError::UnknownVariable(var_id))
        }
    }

    fn validate_terms(&self, terms: &[(VariableId, f64)]) -> Result<(), ModelError> {
        for (var_id, coeff) in terms {
            self.ensure_variable_exists(*var_id)?;
            if !coeff.is_finite() {
                return Err(ModelError::InvalidCoefficient {
                    coefficient: *coeff,
                });
            }
        }
        Ok(())
    }
}
