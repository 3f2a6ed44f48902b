//! Model error types.

use reopt_expr::ids::{ConstraintId, SosId, VariableId};

/// Errors that can occur during model operations.
///
/// Every failing operation returns before touching model state.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Variable ID not present in this model
    UnknownVariable(VariableId),
    /// Constraint ID not present in this model
    UnknownConstraint(ConstraintId),
    /// SOS ID not present in this model
    UnknownSos(SosId),
    /// Paired vectors differ in length
    ArityMismatch { items: usize, coefficients: usize },
    /// The requested edit is not allowed on this model
    UnsupportedMutation {
        operation: &'static str,
        reason: &'static str,
    },
    /// Model has no solution describing its current contents
    NotSolved,
    /// Invalid variable bounds
    InvalidVariableBounds { lower: f64, upper: f64 },
    /// NaN or infinite coefficient
    InvalidCoefficient { coefficient: f64 },
    /// NaN right-hand side
    InvalidRhs { rhs: f64 },
    /// Malformed special ordered set
    InvalidSosSet { reason: String },
}

impl ModelError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::UnknownVariable(_) => "MODEL_UNKNOWN_VARIABLE",
            ModelError::UnknownConstraint(_) => "MODEL_UNKNOWN_CONSTRAINT",
            ModelError::UnknownSos(_) => "MODEL_UNKNOWN_SOS",
            ModelError::ArityMismatch { .. } => "MODEL_ARITY_MISMATCH",
            ModelError::UnsupportedMutation { .. } => "MODEL_UNSUPPORTED_MUTATION",
            ModelError::NotSolved => "MODEL_NOT_SOLVED",
            ModelError::InvalidVariableBounds { .. } => "VARIABLE_INVALID_BOUNDS",
            ModelError::InvalidCoefficient { .. } => "MODEL_INVALID_COEFFICIENT",
            ModelError::InvalidRhs { .. } => "CONSTRAINT_INVALID_RHS",
            ModelError::InvalidSosSet { .. } => "SOS_INVALID",
        }
    }
}

impl std::fmt::Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::UnknownVariable(id) => {
                write!(f, "[{}] Variable ID {} does not exist", self.code(), id)
            }
            ModelError::UnknownConstraint(id) => {
                write!(f, "[{}] Constraint ID {} does not exist", self.code(), id)
            }
            ModelError::UnknownSos(id) => {
                write!(f, "[{}] SOS ID {} does not exist", self.code(), id)
            }
            ModelError::ArityMismatch {
                items,
                coefficients,
            } => write!(
                f,
                "[{}] {} items paired with {} coefficients",
                self.code(),
                items,
                coefficients
            ),
            ModelError::UnsupportedMutation { operation, reason } => {
                write!(f, "[{}] {} is not supported: {}", self.code(), operation, reason)
            }
            ModelError::NotSolved => write!(
                f,
                "[{}] Model has no solution for its current contents",
                self.code()
            ),
            ModelError::InvalidVariableBounds { lower, upper } => write!(
                f,
                "[{}] Variable bounds invalid: lower ({}) > upper ({})",
                self.code(),
                lower,
                upper
            ),
            ModelError::InvalidCoefficient { coefficient } => write!(
                f,
                "[{}] Coefficient must be finite (got {})",
                self.code(),
                coefficient
            ),
            ModelError::InvalidRhs { rhs } => {
                write!(f, "[{}] Right-hand side must not be NaN (got {})", self.code(), rhs)
            }
            ModelError::InvalidSosSet { reason } => {
                write!(f, "[{}] Invalid SOS set: {}", self.code(), reason)
            }
        }
    }
}

impl std::error::Error for ModelError {}
