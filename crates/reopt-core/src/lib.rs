//! Incrementally editable optimization models.
//!
//! A [`Model`] is built once, solved, edited and solved again. Edits apply
//! in memory at once and are logged; a [`ReSolveController`] then decides
//! whether the solver gets the whole model or just the log, and whether a
//! previous solution seeds the next solve. [`Model::fixed_model`] derives the
//! relaxed copy used to recover duals from a solved MIP.

pub mod controller;
pub mod model;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use controller::{ReSolveController, SolveReport, SolveStrategy};
pub use model::{
    Constraint, ConstraintRegistry, FixConfig, FixedModel, Model, ModelChange, ModelError,
    SolveState,
};
pub use types::{Bounds, NewVariable, Objective, Sense, SosKind, SosSet, Variable, VariableKind};
