//! Expression construction errors.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinearExprError {
    MismatchedLengths { ids: usize, coefficients: usize },
    NonFiniteCoefficient,
}

impl LinearExprError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            LinearExprError::MismatchedLengths { .. } => "EXPR_MISMATCHED_LENGTHS",
            LinearExprError::NonFiniteCoefficient => "EXPR_NON_FINITE_COEFFICIENT",
        }
    }
}

impl std::fmt::Display for LinearExprError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinearExprError::MismatchedLengths { ids, coefficients } => write!(
                f,
                "[{}] {} ids but {} coefficients",
                self.code(),
                ids,
                coefficients
            ),
            LinearExprError::NonFiniteCoefficient => {
                write!(f, "[{}] coefficients must be finite", self.code())
            }
        }
    }
}

impl std::error::Error for LinearExprError {}
