//! Expression types for optimization modeling.
//!
//! - `core`: Expr: linear terms + constant
//! - `constraint`: ConstraintExpr: expression with comparison sense and RHS
//! - `builders`: Helpers pairing ids with coefficients
//! - `error`: Expression construction errors

pub mod builders;
pub mod constraint;
pub mod core;
pub mod error;

pub use builders::zip_terms;
pub use constraint::{ComparisonSense, ConstraintExpr};
pub use core::Expr;
pub use error::LinearExprError;
