//! Builder functions for pairing ids with coefficients.

use crate::expr::error::LinearExprError;

/// Zip ids with coefficients into `(id, coefficient)` pairs, keeping order.
///
/// Fails when the two vectors differ in length or a coefficient is NaN or
/// infinite. Zero coefficients are kept: callers decide whether a zero term
/// is meaningful.
pub fn zip_terms<I>(ids: Vec<I>, coefficients: Vec<f64>) -> Result<Vec<(I, f64)>, LinearExprError> {
    if ids.len() != coefficients.len() {
        return Err(LinearExprError::MismatchedLengths {
            ids: ids.len(),
            coefficients: coefficients.len(),
        });
    }
    if coefficients.iter().any(|c| !c.is_finite()) {
        return Err(LinearExprError::NonFiniteCoefficient);
    }
    Ok(ids.into_iter().zip(coefficients).collect())
}
