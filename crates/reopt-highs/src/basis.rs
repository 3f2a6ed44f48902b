//! Simplex basis carried between LP solves.
//!
//! A basis taken after one solve is stretched to the next problem: columns
//! added since then start nonbasic at a finite bound, added rows start
//! basic. Statuses that point at a bound which is now infinite are moved to
//! the other bound so HiGHS accepts the basis.

use highs_sys::HighsInt;
use reopt_solver::Problem;

/// Basis status of one column or row, with the HiGHS status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasisStatus {
    Lower,
    Basic,
    Upper,
    Zero,
    Nonbasic,
}

impl BasisStatus {
    pub(crate) fn code(self) -> HighsInt {
        match self {
            BasisStatus::Lower => 0,
            BasisStatus::Basic => 1,
            BasisStatus::Upper => 2,
            BasisStatus::Zero => 3,
            BasisStatus::Nonbasic => 4,
        }
    }

    pub(crate) fn from_code(code: HighsInt) -> Option<Self> {
        match code {
            0 => Some(BasisStatus::Lower),
            1 => Some(BasisStatus::Basic),
            2 => Some(BasisStatus::Upper),
            3 => Some(BasisStatus::Zero),
            4 => Some(BasisStatus::Nonbasic),
            _ => None,
        }
    }

    /// Nonbasic status for an entry with the given bounds.
    fn at_bound(lower: f64, upper: f64) -> Self {
        if lower.is_finite() {
            BasisStatus::Lower
        } else if upper.is_finite() {
            BasisStatus::Upper
        } else {
            BasisStatus::Zero
        }
    }

    fn repaired(self, lower: f64, upper: f64) -> Self {
        match self {
            BasisStatus::Lower if !lower.is_finite() => Self::at_bound(lower, upper),
            BasisStatus::Upper if !upper.is_finite() => Self::at_bound(lower, upper),
            BasisStatus::Zero if lower.is_finite() || upper.is_finite() => {
                Self::at_bound(lower, upper)
            }
            status => status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Basis {
    pub columns: Vec<BasisStatus>,
    pub rows: Vec<BasisStatus>,
}

impl Basis {
    pub fn num_basic(&self) -> usize {
        self.columns
            .iter()
            .chain(&self.rows)
            .filter(|status| **status == BasisStatus::Basic)
            .count()
    }

    /// Basis for `problem`, which must extend the problem this basis was
    /// taken from. `None` when `problem` is smaller.
    pub fn extend_to(&self, problem: &Problem) -> Option<Basis> {
        if self.columns.len() > problem.num_columns() || self.rows.len() > problem.num_rows() {
            return None;
        }
        let columns = problem
            .columns
            .iter()
            .enumerate()
            .map(|(index, column)| match self.columns.get(index) {
                Some(status) => status.repaired(column.lower, column.upper),
                None => BasisStatus::at_bound(column.lower, column.upper),
            })
            .collect();
        let rows = problem
            .rows
            .iter()
            .enumerate()
            .map(|(index, row)| match self.rows.get(index) {
                Some(status) => status.repaired(row.lower, row.upper),
                None => BasisStatus::Basic,
            })
            .collect();
        Some(Basis { columns, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reopt_solver::{Column, Row};

    fn column(lower: f64, upper: f64) -> Column {
        Column {
            lower,
            upper,
            objective: 0.0,
            is_integer: false,
        }
    }

    fn row(lower: f64, upper: f64) -> Row {
        Row {
            lower,
            upper,
            terms: vec![(0, 1.0)],
        }
    }

    #[test]
    fn codes_match_highs_constants() {
        for status in [
            BasisStatus::Lower,
            BasisStatus::Basic,
            BasisStatus::Upper,
            BasisStatus::Zero,
            BasisStatus::Nonbasic,
        ] {
            assert_eq!(BasisStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(BasisStatus::from_code(9), None);
    }

    #[test]
    fn new_columns_are_nonbasic_and_new_rows_basic() {
        let saved = Basis {
            columns: vec![BasisStatus::Basic],
            rows: vec![BasisStatus::Upper],
        };
        let problem = Problem {
            columns: vec![
                column(0.0, 1.0),
                column(0.0, 1.0),
                column(f64::NEG_INFINITY, 3.0),
                column(f64::NEG_INFINITY, f64::INFINITY),
            ],
            rows: vec![row(f64::NEG_INFINITY, 1.0), row(0.0, 0.3)],
            ..Problem::default()
        };

        let extended = saved.extend_to(&problem).unwrap();
        assert_eq!(
            extended.columns,
            vec![
                BasisStatus::Basic,
                BasisStatus::Lower,
                BasisStatus::Upper,
                BasisStatus::Zero,
            ]
        );
        assert_eq!(extended.rows, vec![BasisStatus::Upper, BasisStatus::Basic]);
        // One basic entry per row keeps the basis square.
        assert_eq!(extended.num_basic(), problem.num_rows());
    }

    #[test]
    fn statuses_on_dropped_bounds_move_to_the_finite_side() {
        let saved = Basis {
            columns: vec![BasisStatus::Lower, BasisStatus::Upper],
            rows: vec![BasisStatus::Basic],
        };
        let problem = Problem {
            columns: vec![column(f64::NEG_INFINITY, 2.0), column(0.0, f64::INFINITY)],
            rows: vec![row(0.0, 1.0)],
            ..Problem::default()
        };
        let extended = saved.extend_to(&problem).unwrap();
        assert_eq!(extended.columns, vec![BasisStatus::Upper, BasisStatus::Lower]);
    }

    #[test]
    fn smaller_problem_has_no_extension() {
        let saved = Basis {
            columns: vec![BasisStatus::Lower; 2],
            rows: vec![],
        };
        let problem = Problem {
            columns: vec![column(0.0, 1.0)],
            ..Problem::default()
        };
        assert_eq!(saved.extend_to(&problem), None);
    }
}
