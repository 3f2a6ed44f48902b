//! Typed identifiers and linear expressions for reopt models.

pub mod expr;
pub mod ids;

pub use expr::{ComparisonSense, ConstraintExpr, Expr, LinearExprError, zip_terms};
pub use ids::{ConstraintId, SosId, VariableId};
