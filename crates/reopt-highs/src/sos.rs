//! Special ordered sets as binary indicator rows.
//!
//! HiGHS has no native SOS constraints. Each member `x` of a set gets a
//! binary indicator `y` with `l * y <= x <= u * y`, so `y = 0` forces
//! `x = 0`. The indicators of a set are then limited to one (SOS1) or two
//! adjacent (SOS2) nonzeros. Indicator columns and rows are appended after
//! the originals, so original positions are unchanged.

use std::borrow::Cow;

use reopt_solver::{Column, Problem, Row, SolverError, SosKind};
use tracing::debug;

/// Problem handed to HiGHS plus the size of the caller's problem.
#[derive(Debug)]
pub(crate) struct Expanded<'a> {
    pub problem: Cow<'a, Problem>,
    pub original_columns: usize,
    pub original_rows: usize,
}

impl Expanded<'_> {
    pub fn indicator_columns(&self) -> usize {
        self.problem.num_columns() - self.original_columns
    }
}

pub(crate) fn expand(problem: &Problem) -> Result<Expanded<'_>, SolverError> {
    let original_columns = problem.num_columns();
    let original_rows = problem.num_rows();
    if problem.sos.is_empty() {
        return Ok(Expanded {
            problem: Cow::Borrowed(problem),
            original_columns,
            original_rows,
        });
    }

    let mut expanded = Problem {
        sense: problem.sense,
        objective_offset: problem.objective_offset,
        columns: problem.columns.clone(),
        rows: problem.rows.clone(),
        sos: Vec::new(),
    };

    for (set_index, set) in problem.sos.iter().enumerate() {
        let mut indicators = Vec::with_capacity(set.members.len());
        for &member in &set.members {
            let column = problem.columns.get(member).ok_or_else(|| {
                SolverError::InvalidProblem(format!(
                    "SOS set {set_index} references column {member} of {original_columns}"
                ))
            })?;
            if !column.lower.is_finite() || !column.upper.is_finite() {
                return Err(SolverError::InvalidProblem(format!(
                    "SOS set {} member column {} needs finite bounds, got [{}, {}]",
                    set_index, member, column.lower, column.upper
                )));
            }

            let indicator = expanded.columns.len();
            expanded.columns.push(Column {
                lower: 0.0,
                upper: 1.0,
                objective: 0.0,
                is_integer: true,
            });
            indicators.push(indicator);

            if column.upper != 0.0 {
                expanded.rows.push(Row {
                    lower: f64::NEG_INFINITY,
                    upper: 0.0,
                    terms: vec![(member, 1.0), (indicator, -column.upper)],
                });
            }
            if column.lower != 0.0 {
                expanded.rows.push(Row {
                    lower: 0.0,
                    upper: f64::INFINITY,
                    terms: vec![(member, 1.0), (indicator, -column.lower)],
                });
            }
        }

        expanded.rows.push(Row {
            lower: f64::NEG_INFINITY,
            upper: set.kind.max_nonzeros() as f64,
            terms: indicators.iter().map(|&y| (y, 1.0)).collect(),
        });
        if set.kind == SosKind::Sos2 {
            for (position, &first) in indicators.iter().enumerate() {
                for &second in indicators.iter().skip(position + 2) {
                    expanded.rows.push(Row {
                        lower: f64::NEG_INFINITY,
                        upper: 1.0,
                        terms: vec![(first, 1.0), (second, 1.0)],
                    });
                }
            }
        }
    }

    debug!(
        component = "highs",
        operation = "expand_sos",
        status = "success",
        sos_sets = problem.sos.len(),
        indicator_columns = expanded.columns.len() - original_columns,
        indicator_rows = expanded.rows.len() - original_rows,
        "Reformulated SOS sets with binary indicators"
    );

    Ok(Expanded {
        problem: Cow::Owned(expanded),
        original_columns,
        original_rows,
    })
}
