//! Solver-facing problem image and the patches that evolve it.
//!
//! A [`Problem`] is the positional, backend-neutral form of a model: columns
//! and rows are addressed by index, row bounds replace comparison senses.
//! Lowering a model is deterministic, so two equal models produce equal
//! problems. [`ProblemChange`] is the same vocabulary expressed as a delta;
//! applying the changes recorded since the last solve to the problem loaded at
//! that solve yields exactly the problem a cold lowering would produce.

use crate::SolverError;
use tracing::trace;

/// Optimization sense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sense {
    #[default]
    Minimize,
    Maximize,
}

impl Sense {
    pub fn as_str(self) -> &'static str {
        match self {
            Sense::Minimize => "minimize",
            Sense::Maximize => "maximize",
        }
    }
}

/// Special ordered set type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SosKind {
    /// At most one member nonzero.
    Sos1,
    /// At most two members nonzero, and they must be adjacent.
    Sos2,
}

impl SosKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SosKind::Sos1 => "sos1",
            SosKind::Sos2 => "sos2",
        }
    }

    /// Largest number of members allowed to be nonzero.
    pub fn max_nonzeros(self) -> usize {
        match self {
            SosKind::Sos1 => 1,
            SosKind::Sos2 => 2,
        }
    }
}

/// A column (variable) of the lowered problem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub lower: f64,
    pub upper: f64,
    pub objective: f64,
    pub is_integer: bool,
}

/// A row (constraint) of the lowered problem, `lower <= sum(terms) <= upper`.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub lower: f64,
    pub upper: f64,
    /// `(column index, coefficient)` in model order.
    pub terms: Vec<(usize, f64)>,
}

/// A special ordered set over column indices, members in ascending weight order.
#[derive(Debug, Clone, PartialEq)]
pub struct SosConstraint {
    pub kind: SosKind,
    pub members: Vec<usize>,
    pub weights: Vec<f64>,
}

/// Positional problem image handed to a [`Solver`](crate::Solver).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Problem {
    pub sense: Sense,
    pub objective_offset: f64,
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    pub sos: Vec<SosConstraint>,
}

/// One structural or numeric edit of a [`Problem`].
#[derive(Debug, Clone, PartialEq)]
pub enum ProblemChange {
    /// Append a column; `entries` are `(row index, coefficient)` appended to those rows.
    AddColumn {
        column: Column,
        entries: Vec<(usize, f64)>,
    },
    /// Replace the bounds of an existing column.
    SetColumnBounds {
        index: usize,
        lower: f64,
        upper: f64,
    },
    /// Append a row.
    AddRow(Row),
    /// Replace the bounds of an existing row.
    SetRowBounds {
        index: usize,
        lower: f64,
        upper: f64,
    },
    /// Replace the whole objective; columns not listed get coefficient zero.
    SetObjective {
        sense: Sense,
        offset: f64,
        coefficients: Vec<(usize, f64)>,
    },
    /// Append a special ordered set.
    AddSos(SosConstraint),
}

impl ProblemChange {
    pub fn kind(&self) -> &'static str {
        match self {
            ProblemChange::AddColumn { .. } => "add_column",
            ProblemChange::SetColumnBounds { .. } => "set_column_bounds",
            ProblemChange::AddRow(_) => "add_row",
            ProblemChange::SetRowBounds { .. } => "set_row_bounds",
            ProblemChange::SetObjective { .. } => "set_objective",
            ProblemChange::AddSos(_) => "add_sos",
        }
    }
}

impl Problem {
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of nonzero entries across all rows.
    pub fn num_nonzeros(&self) -> usize {
        self.rows.iter().map(|row| row.terms.len()).sum()
    }

    /// True when any column is integer or any SOS set is present.
    pub fn is_mip(&self) -> bool {
        !self.sos.is_empty() || self.columns.iter().any(|column| column.is_integer)
    }

    /// Apply a sequence of changes in order.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::InvalidProblem`] on the first change that names
    /// a column or row outside the current image. Changes before it stay applied.
    pub fn apply_all(&mut self, changes: &[ProblemChange]) -> Result<(), SolverError> {
        for change in changes {
            self.apply(change)?;
        }
        Ok(())
    }

    /// Apply a single change.
    pub fn apply(&mut self, change: &ProblemChange) -> Result<(), SolverError> {
        trace!(
            component = "problem",
            operation = "apply_change",
            status = "success",
            change = change.kind(),
            columns = self.columns.len(),
            rows = self.rows.len(),
            "Applying problem change"
        );
        match change {
            ProblemChange::AddColumn { column, entries } => {
                self.check_rows(entries.iter().map(|(row, _)| *row))?;
                let index = self.columns.len();
                self.columns.push(*column);
                for (row, coeff) in entries {
                    self.rows[*row].terms.push((index, *coeff));
                }
            }
            ProblemChange::SetColumnBounds {
                index,
                lower,
                upper,
            } => {
                let column = self.columns.get_mut(*index).ok_or_else(|| {
                    SolverError::InvalidProblem(format!("column {index} out of range"))
                })?;
                column.lower = *lower;
                column.upper = *upper;
            }
            ProblemChange::AddRow(row) => {
                self.check_columns(row.terms.iter().map(|(col, _)| *col))?;
                self.rows.push(row.clone());
            }
            ProblemChange::SetRowBounds {
                index,
                lower,
                upper,
            } => {
                let row = self.rows.get_mut(*index).ok_or_else(|| {
                    SolverError::InvalidProblem(format!("row {index} out of range"))
                })?;
                row.lower = *lower;
                row.upper = *upper;
            }
            ProblemChange::SetObjective {
                sense,
                offset,
                coefficients,
            } => {
                self.check_columns(coefficients.iter().map(|(col, _)| *col))?;
                for column in &mut self.columns {
                    column.objective = 0.0;
                }
                for (col, coeff) in coefficients {
                    self.columns[*col].objective = *coeff;
                }
                self.sense = *sense;
                self.objective_offset = *offset;
            }
            ProblemChange::AddSos(set) => {
                self.check_columns(set.members.iter().copied())?;
                self.sos.push(set.clone());
            }
        }
        Ok(())
    }

    fn check_columns(&self, mut indices: impl Iterator<Item = usize>) -> Result<(), SolverError> {
        match indices.find(|index| *index >= self.columns.len()) {
            Some(index) => Err(SolverError::InvalidProblem(format!(
                "column {index} out of range ({} columns)",
                self.columns.len()
            ))),
            None => Ok(()),
        }
    }

    fn check_rows(&self, mut indices: impl Iterator<Item = usize>) -> Result<(), SolverError> {
        match indices.find(|index| *index >= self.rows.len()) {
            Some(index) => Err(SolverError::InvalidProblem(format!(
                "row {index} out of range ({} rows)",
                self.rows.len()
            ))),
            None => Ok(()),
        }
    }
}
