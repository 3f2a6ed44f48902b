//! Constraint identities and their append-only term lists.

use reopt_expr::expr::ComparisonSense;
use reopt_expr::ids::{ConstraintId, VariableId};

use crate::model::error::ModelError;

/// A linear constraint `sum(terms) <sense> rhs`.
///
/// Terms are never edited in place. New terms arrive only when a variable
/// is added with this constraint in its column.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    sense: ComparisonSense,
    rhs: f64,
    terms: Vec<(VariableId, f64)>,
}

impl Constraint {
    pub fn sense(&self) -> ComparisonSense {
        self.sense
    }

    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    pub fn terms(&self) -> &[(VariableId, f64)] {
        &self.terms
    }

    /// Coefficient of `var_id`, zero when absent.
    pub fn coefficient(&self, var_id: VariableId) -> f64 {
        self.terms
            .iter()
            .filter(|(id, _)| *id == var_id)
            .map(|(_, coeff)| *coeff)
            .sum()
    }

    /// `(lower, upper)` row bounds.
    pub fn row_bounds(&self) -> (f64, f64) {
        self.sense.row_bounds(self.rhs)
    }
}

/// Registry of constraints keyed by dense, stable [`ConstraintId`]s.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintRegistry {
    constraints: Vec<Constraint>,
}

impl ConstraintRegistry {
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn contains(&self, id: ConstraintId) -> bool {
        id.index() < self.constraints.len()
    }

    pub fn get(&self, id: ConstraintId) -> Result<&Constraint, ModelError> {
        self.constraints
            .get(id.index())
            .ok_or(ModelError::UnknownConstraint(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (ConstraintId, &Constraint)> {
        self.constraints
            .iter()
            .enumerate()
            .map(|(index, constraint)| (ConstraintId::new(index as u32), constraint))
    }

    pub(crate) fn ensure_exists(&self, id: ConstraintId) -> Result<(), ModelError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(ModelError::UnknownConstraint(id))
        }
    }

    pub(crate) fn register(
        &mut self,
        sense: ComparisonSense,
        rhs: f64,
        terms: Vec<(VariableId, f64)>,
    ) -> ConstraintId {
        let id = ConstraintId::new(self.constraints.len() as u32);
        self.constraints.push(Constraint { sense, rhs, terms });
        id
    }

    /// Append a term for a freshly created variable.
    pub(crate) fn append_term(
        &mut self,
        id: ConstraintId,
        var_id: VariableId,
        coefficient: f64,
    ) -> Result<(), ModelError> {
        let constraint = self
            .constraints
            .get_mut(id.index())
            .ok_or(ModelError::UnknownConstraint(id))?;
        constraint.terms.push((var_id, coefficient));
        Ok(())
    }

    /// Replace the right-hand side of an inequality.
    pub(crate) fn set_rhs(&mut self, id: ConstraintId, rhs: f64) -> Result<ComparisonSense, ModelError> {
        let constraint = self
            .constraints
            .get_mut(id.index())
            .ok_or(ModelError::UnknownConstraint(id))?;
        if constraint.sense == ComparisonSense::Equal {
            return Err(ModelError::UnsupportedMutation {
                operation: "set_constraint_rhs",
                reason: "equality constraints have a fixed right-hand side",
            });
        }
        constraint.rhs = rhs;
        Ok(constraint.sense)
    }
}
