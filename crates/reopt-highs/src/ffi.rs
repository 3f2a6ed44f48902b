//! Safe wrapper over the HiGHS library.
//!
//! This module contains the crate's only unsafe code: in-place edits of a
//! live HiGHS instance, basis transfer, reads of solve info values and the
//! version string through `highs-sys`.
#![allow(unsafe_code)]

use crate::basis::{Basis, BasisStatus};
use highs::{Col, HighsModelStatus, Model, RowProblem, Sense as HighsSense, SolvedModel};
use highs_sys::HighsInt;
use reopt_solver::Sense;
use std::ffi::{CStr, CString};
use std::fmt;
use tracing::{debug, trace, warn};

/// HiGHS `basis_validity` info value of a valid basis.
const BASIS_VALID: u64 = 1;

/// Model status reported by HiGHS after a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighsStatus {
    Optimal,
    Infeasible,
    Unbounded,
    UnboundedOrInfeasible,
    ReachedTimeLimit,
    ReachedIterationLimit,
    Unknown,
}

/// Errors returned by the HiGHS model wrapper.
#[derive(Debug, Clone, PartialEq)]
pub enum HighsModelError {
    ColumnIndexOutOfBounds { column_index: usize, num_columns: usize },
    RowIndexOutOfBounds { row_index: usize, num_rows: usize },
    IndexOverflow { index: usize },
    PrimalStartLengthMismatch { expected: usize, got: usize },
    BasisShapeMismatch {
        columns: usize,
        rows: usize,
        num_columns: usize,
        num_rows: usize,
    },
    SolveRequired { operation: &'static str },
    CallFailed { call: &'static str },
    InstanceLost,
}

impl HighsModelError {
    pub fn code(&self) -> &'static str {
        match self {
            HighsModelError::ColumnIndexOutOfBounds { .. } => "HIGHS_COLUMN_OUT_OF_BOUNDS",
            HighsModelError::RowIndexOutOfBounds { .. } => "HIGHS_ROW_OUT_OF_BOUNDS",
            HighsModelError::IndexOverflow { .. } => "HIGHS_INDEX_OVERFLOW",
            HighsModelError::PrimalStartLengthMismatch { .. } => "HIGHS_PRIMAL_START_LENGTH",
            HighsModelError::BasisShapeMismatch { .. } => "HIGHS_BASIS_SHAPE",
            HighsModelError::SolveRequired { .. } => "HIGHS_SOLVE_REQUIRED",
            HighsModelError::CallFailed { .. } => "HIGHS_CALL_FAILED",
            HighsModelError::InstanceLost => "HIGHS_INSTANCE_LOST",
        }
    }
}

impl fmt::Display for HighsModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HighsModelError::ColumnIndexOutOfBounds {
                column_index,
                num_columns,
            } => write!(
                f,
                "[{}] column index {} out of bounds (num_columns = {})",
                self.code(),
                column_index,
                num_columns
            ),
            HighsModelError::RowIndexOutOfBounds {
                row_index,
                num_rows,
            } => write!(
                f,
                "[{}] row index {} out of bounds (num_rows = {})",
                self.code(),
                row_index,
                num_rows
            ),
            HighsModelError::IndexOverflow { index } => {
                write!(f, "[{}] index {} does not fit a HiGHS index", self.code(), index)
            }
            HighsModelError::PrimalStartLengthMismatch { expected, got } => write!(
                f,
                "[{}] primal start has {} values for {} columns",
                self.code(),
                got,
                expected
            ),
            HighsModelError::BasisShapeMismatch {
                columns,
                rows,
                num_columns,
                num_rows,
            } => write!(
                f,
                "[{}] basis covers {}x{} but the model is {}x{}",
                self.code(),
                columns,
                rows,
                num_columns,
                num_rows
            ),
            HighsModelError::SolveRequired { operation } => {
                write!(f, "[{}] solve must be called before {}", self.code(), operation)
            }
            HighsModelError::CallFailed { call } => {
                write!(f, "[{}] {} returned an error status", self.code(), call)
            }
            HighsModelError::InstanceLost => {
                write!(f, "[{}] the HiGHS instance was dropped by a failed run", self.code())
            }
        }
    }
}

impl std::error::Error for HighsModelError {}

/// Primal and dual values copied out of a solved model.
#[derive(Debug, Clone, PartialEq)]
pub struct SolutionSnapshot {
    pub col_values: Vec<f64>,
    pub col_duals: Vec<f64>,
    pub row_values: Vec<f64>,
    pub row_duals: Vec<f64>,
}

/// Option value types for HiGHS solver configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum HighsOption {
    Bool(bool),
    Int(i32),
    Float(f64),
    Str(String),
}

#[derive(Debug)]
enum Instance {
    /// Columns and rows collected before the first solve.
    Building { problem: RowProblem, columns: Vec<Col> },
    Ready(Model),
    Solved(SolvedModel),
    /// A failed run consumed the instance.
    Lost,
}

/// A HiGHS instance that survives solves.
///
/// The first solve hands the collected problem to HiGHS in one pass. After
/// that, edits go straight to the live instance, which keeps its basis
/// until [`HighsModel::clear_solver`] is called.
pub struct HighsModel {
    instance: Instance,
    sense: Sense,
    num_cols: usize,
    num_rows: usize,
    primal_start: Option<Vec<f64>>,
    options: Vec<(String, HighsOption)>,
    quiet: bool,
}

impl HighsModel {
    pub fn new() -> Self {
        HighsModel {
            instance: Instance::Building {
                problem: RowProblem::default(),
                columns: Vec::new(),
            },
            sense: Sense::Minimize,
            num_cols: 0,
            num_rows: 0,
            primal_start: None,
            options: Vec::new(),
            quiet: true,
        }
    }

    /// Add a column with `(row, coefficient)` entries in existing rows and
    /// return its index.
    pub fn add_col(
        &mut self,
        lower: f64,
        upper: f64,
        objective: f64,
        is_integer: bool,
        entries: &[(usize, f64)],
    ) -> Result<usize, HighsModelError> {
        let index = self.num_cols;
        if let Instance::Building { problem, columns } = &mut self.instance {
            if entries.is_empty() {
                let col = if is_integer {
                    problem.add_integer_column(objective, lower..=upper)
                } else {
                    problem.add_column(objective, lower..=upper)
                };
                columns.push(col);
                self.num_cols += 1;
                return Ok(index);
            }
        }

        let mut rows = Vec::with_capacity(entries.len());
        let mut values = Vec::with_capacity(entries.len());
        for (row_index, coeff) in entries {
            rows.push(self.row_index(*row_index)?);
            values.push(*coeff);
        }
        let count = to_highs_int(entries.len())?;
        let col = to_highs_int(index)?;
        let model = self.model_mut()?;
        let status = unsafe {
            highs_sys::Highs_addCol(
                model.as_mut_ptr(),
                objective,
                lower,
                upper,
                count,
                rows.as_ptr(),
                values.as_ptr(),
            )
        };
        check("Highs_addCol", status)?;
        if is_integer {
            let status =
                unsafe { highs_sys::Highs_changeColIntegrality(model.as_mut_ptr(), col, 1) };
            check("Highs_changeColIntegrality", status)?;
        }
        self.num_cols += 1;
        trace!(
            component = "highs",
            operation = "add_col",
            status = "success",
            column_index = index,
            num_entries = entries.len(),
            "Added column to live instance"
        );
        Ok(index)
    }

    /// Add a row over existing columns and return its index.
    pub fn add_row(
        &mut self,
        lower: f64,
        upper: f64,
        terms: &[(usize, f64)],
    ) -> Result<usize, HighsModelError> {
        let index = self.num_rows;
        for (column_index, _) in terms {
            self.column_index(*column_index)?;
        }
        if let Instance::Building { problem, columns } = &mut self.instance {
            let factors: Vec<(Col, f64)> = terms
                .iter()
                .map(|(column_index, coeff)| (columns[*column_index], *coeff))
                .collect();
            problem.add_row(lower..=upper, factors);
            self.num_rows += 1;
            return Ok(index);
        }

        let mut cols = Vec::with_capacity(terms.len());
        let mut values = Vec::with_capacity(terms.len());
        for (column_index, coeff) in terms {
            cols.push(to_highs_int(*column_index)?);
            values.push(*coeff);
        }
        let count = to_highs_int(terms.len())?;
        let model = self.model_mut()?;
        let status = unsafe {
            highs_sys::Highs_addRow(
                model.as_mut_ptr(),
                lower,
                upper,
                count,
                cols.as_ptr(),
                values.as_ptr(),
            )
        };
        check("Highs_addRow", status)?;
        self.num_rows += 1;
        Ok(index)
    }

    pub fn set_col_bounds(
        &mut self,
        column_index: usize,
        lower: f64,
        upper: f64,
    ) -> Result<(), HighsModelError> {
        let col = self.column_index(column_index)?;
        let model = self.model_mut()?;
        let status =
            unsafe { highs_sys::Highs_changeColBounds(model.as_mut_ptr(), col, lower, upper) };
        check("Highs_changeColBounds", status)
    }

    pub fn set_row_bounds(
        &mut self,
        row_index: usize,
        lower: f64,
        upper: f64,
    ) -> Result<(), HighsModelError> {
        let row = self.row_index(row_index)?;
        let model = self.model_mut()?;
        let status =
            unsafe { highs_sys::Highs_changeRowBounds(model.as_mut_ptr(), row, lower, upper) };
        check("Highs_changeRowBounds", status)
    }

    pub fn set_col_cost(&mut self, column_index: usize, cost: f64) -> Result<(), HighsModelError> {
        let col = self.column_index(column_index)?;
        let model = self.model_mut()?;
        let status = unsafe { highs_sys::Highs_changeColCost(model.as_mut_ptr(), col, cost) };
        check("Highs_changeColCost", status)
    }

    pub fn set_sense(&mut self, sense: Sense) -> Result<(), HighsModelError> {
        self.sense = sense;
        if matches!(self.instance, Instance::Building { .. }) {
            return Ok(());
        }
        let code = match sense {
            Sense::Minimize => highs_sys::OBJECTIVE_SENSE_MINIMIZE,
            Sense::Maximize => highs_sys::OBJECTIVE_SENSE_MAXIMIZE,
        };
        let model = self.model_mut()?;
        let status = unsafe { highs_sys::Highs_changeObjectiveSense(model.as_mut_ptr(), code) };
        check("Highs_changeObjectiveSense", status)
    }

    /// Keep HiGHS output switched on for the next solve.
    pub fn set_output(&mut self, enabled: bool) {
        self.quiet = !enabled;
    }

    pub fn set_option(&mut self, option: impl Into<String>, value: HighsOption) {
        self.options.push((option.into(), value));
    }

    /// Initial primal point for the next solve, one value per column.
    pub fn set_primal_start(&mut self, cols: Vec<f64>) -> Result<(), HighsModelError> {
        if cols.len() != self.num_cols {
            return Err(HighsModelError::PrimalStartLengthMismatch {
                expected: self.num_cols,
                got: cols.len(),
            });
        }
        self.primal_start = Some(cols);
        Ok(())
    }

    /// Install a starting basis for the next solve.
    pub fn set_basis(&mut self, basis: &Basis) -> Result<(), HighsModelError> {
        if basis.columns.len() != self.num_cols || basis.rows.len() != self.num_rows {
            return Err(HighsModelError::BasisShapeMismatch {
                columns: basis.columns.len(),
                rows: basis.rows.len(),
                num_columns: self.num_cols,
                num_rows: self.num_rows,
            });
        }
        let col_status: Vec<HighsInt> = basis.columns.iter().map(|s| s.code()).collect();
        let row_status: Vec<HighsInt> = basis.rows.iter().map(|s| s.code()).collect();
        let model = self.model_mut()?;
        let status = unsafe {
            highs_sys::Highs_setBasis(model.as_mut_ptr(), col_status.as_ptr(), row_status.as_ptr())
        };
        check("Highs_setBasis", status)?;
        debug!(
            component = "highs",
            operation = "set_basis",
            status = "success",
            num_cols = col_status.len(),
            num_rows = row_status.len(),
            "Installed starting basis"
        );
        Ok(())
    }

    /// Basis of the last solve, `None` when HiGHS holds no valid basis.
    pub fn basis(&self) -> Option<Basis> {
        let solved = self.solved()?;
        if self.int_info("basis_validity") != Some(BASIS_VALID) {
            return None;
        }
        let mut col_status: Vec<HighsInt> = vec![0; self.num_cols];
        let mut row_status: Vec<HighsInt> = vec![0; self.num_rows];
        let status = unsafe {
            highs_sys::Highs_getBasis(
                solved.as_ptr(),
                col_status.as_mut_ptr(),
                row_status.as_mut_ptr(),
            )
        };
        check("Highs_getBasis", status).ok()?;
        Some(Basis {
            columns: statuses(&col_status)?,
            rows: statuses(&row_status)?,
        })
    }

    /// Drop the solution and basis kept by the instance.
    pub fn clear_solver(&mut self) -> Result<(), HighsModelError> {
        if matches!(self.instance, Instance::Building { .. }) {
            return Ok(());
        }
        let model = self.model_mut()?;
        let status = unsafe { highs_sys::Highs_clearSolver(model.as_mut_ptr()) };
        check("Highs_clearSolver", status)
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// True once the problem lives inside HiGHS.
    pub fn is_live(&self) -> bool {
        matches!(self.instance, Instance::Ready(_) | Instance::Solved(_))
    }

    /// Run HiGHS on the instance. Options and the primal start are applied
    /// first; the instance stays available for edits afterwards.
    pub fn solve(&mut self) -> Result<HighsStatus, HighsModelError> {
        debug!(
            component = "highs",
            operation = "solve",
            status = "started",
            num_cols = self.num_cols,
            num_rows = self.num_rows,
            sense = self.sense.as_str(),
            live = self.is_live(),
            "Solving HiGHS model"
        );

        let mut model = self.take_model()?;
        if self.quiet {
            model.make_quiet();
        } else {
            model.set_option("output_flag", true);
            model.set_option("log_to_console", true);
        }
        for (option, value) in self.options.drain(..) {
            match value {
                HighsOption::Bool(val) => model.set_option(option.as_str(), val),
                HighsOption::Int(val) => model.set_option(option.as_str(), val),
                HighsOption::Float(val) => model.set_option(option.as_str(), val),
                HighsOption::Str(val) => model.set_option(option.as_str(), val.as_str()),
            }
        }
        if let Some(cols) = self.primal_start.take() {
            if let Err(err) = model.try_set_solution(Some(cols.as_slice()), None, None, None) {
                warn!(
                    component = "highs",
                    operation = "set_primal_start",
                    status = "warn",
                    ?err,
                    "HiGHS rejected the warm start, continuing cold"
                );
            }
        }

        let solved = model.try_solve().map_err(|err| {
            warn!(
                component = "highs",
                operation = "solve",
                status = "error",
                ?err,
                "HiGHS run failed"
            );
            HighsModelError::CallFailed { call: "Highs_run" }
        })?;
        let status = map_status(solved.status());
        trace!(
            component = "highs",
            operation = "solve",
            status = "success",
            ?status,
            "HiGHS status received"
        );
        self.instance = Instance::Solved(solved);
        Ok(status)
    }

    pub fn objective_value(&self) -> Result<f64, HighsModelError> {
        self.solved()
            .map(SolvedModel::objective_value)
            .ok_or(HighsModelError::SolveRequired {
                operation: "objective_value",
            })
    }

    /// Relative MIP gap, NaN before a solve.
    pub fn mip_gap(&self) -> f64 {
        self.solved().map_or(f64::NAN, SolvedModel::mip_gap)
    }

    /// Integer info value by HiGHS name, `None` when unavailable.
    ///
    /// Interior point counts are unavailable after a simplex solve.
    pub fn int_info(&self, name: &str) -> Option<u64> {
        let solved = self.solved()?;
        let c_name = CString::new(name).ok()?;
        let mut value: HighsInt = 0;
        let status = unsafe {
            highs_sys::Highs_getIntInfoValue(solved.as_ptr(), c_name.as_ptr(), &raw mut value)
        };
        if status == highs_sys::STATUS_OK && value >= 0 {
            Some(value as u64)
        } else {
            trace!(
                component = "highs",
                operation = "solve_info",
                status = "unavailable",
                info = name,
                status_code = status,
                "Info value not available"
            );
            None
        }
    }

    pub fn solution_snapshot(&self) -> Result<SolutionSnapshot, HighsModelError> {
        let solved = self.solved().ok_or(HighsModelError::SolveRequired {
            operation: "solution_snapshot",
        })?;
        let solution = solved.get_solution();
        Ok(SolutionSnapshot {
            col_values: solution.columns().to_vec(),
            col_duals: solution.dual_columns().to_vec(),
            row_values: solution.rows().to_vec(),
            row_duals: solution.dual_rows().to_vec(),
        })
    }

    fn solved(&self) -> Option<&SolvedModel> {
        match &self.instance {
            Instance::Solved(solved) => Some(solved),
            _ => None,
        }
    }

    fn column_index(&self, column_index: usize) -> Result<HighsInt, HighsModelError> {
        if column_index >= self.num_cols {
            warn!(
                component = "highs",
                operation = "column_index",
                status = "error",
                column_index,
                num_columns = self.num_cols,
                "Column index out of bounds"
            );
            return Err(HighsModelError::ColumnIndexOutOfBounds {
                column_index,
                num_columns: self.num_cols,
            });
        }
        to_highs_int(column_index)
    }

    fn row_index(&self, row_index: usize) -> Result<HighsInt, HighsModelError> {
        if row_index >= self.num_rows {
            return Err(HighsModelError::RowIndexOutOfBounds {
                row_index,
                num_rows: self.num_rows,
            });
        }
        to_highs_int(row_index)
    }

    /// Move the instance out as an editable HiGHS model, passing a
    /// collected problem to HiGHS first. Leaves `Lost` behind.
    fn take_model(&mut self) -> Result<Model, HighsModelError> {
        match std::mem::replace(&mut self.instance, Instance::Lost) {
            Instance::Building { problem, .. } => {
                let sense = match self.sense {
                    Sense::Minimize => HighsSense::Minimise,
                    Sense::Maximize => HighsSense::Maximise,
                };
                problem.try_optimise(sense).map_err(|err| {
                    warn!(
                        component = "highs",
                        operation = "pass_model",
                        status = "error",
                        ?err,
                        "HiGHS rejected the problem"
                    );
                    HighsModelError::CallFailed {
                        call: "Highs_passModel",
                    }
                })
            }
            Instance::Ready(model) => Ok(model),
            Instance::Solved(solved) => Ok(Model::from(solved)),
            Instance::Lost => Err(HighsModelError::InstanceLost),
        }
    }

    fn model_mut(&mut self) -> Result<&mut Model, HighsModelError> {
        let model = self.take_model()?;
        self.instance = Instance::Ready(model);
        match &mut self.instance {
            Instance::Ready(model) => Ok(model),
            _ => Err(HighsModelError::InstanceLost),
        }
    }
}

impl Default for HighsModel {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HighsModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HighsModel")
            .field("num_cols", &self.num_cols)
            .field("num_rows", &self.num_rows)
            .field("sense", &self.sense)
            .field("live", &self.is_live())
            .field("solved", &self.solved().is_some())
            .finish_non_exhaustive()
    }
}

/// HiGHS version string, if the library reports one.
pub fn highs_version() -> Option<String> {
    unsafe {
        let ptr = highs_sys::Highs_version();
        if ptr.is_null() {
            None
        } else {
            CStr::from_ptr(ptr).to_str().ok().map(str::to_string)
        }
    }
}

fn check(call: &'static str, status: HighsInt) -> Result<(), HighsModelError> {
    if status == highs_sys::STATUS_ERROR {
        warn!(
            component = "highs",
            operation = call,
            status = "error",
            "HiGHS call failed"
        );
        return Err(HighsModelError::CallFailed { call });
    }
    Ok(())
}

fn to_highs_int(index: usize) -> Result<HighsInt, HighsModelError> {
    HighsInt::try_from(index).map_err(|_| HighsModelError::IndexOverflow { index })
}

fn statuses(codes: &[HighsInt]) -> Option<Vec<BasisStatus>> {
    codes.iter().map(|code| BasisStatus::from_code(*code)).collect()
}

fn map_status(status: HighsModelStatus) -> HighsStatus {
    match status {
        HighsModelStatus::Optimal => HighsStatus::Optimal,
        HighsModelStatus::Infeasible => HighsStatus::Infeasible,
        HighsModelStatus::Unbounded => HighsStatus::Unbounded,
        HighsModelStatus::UnboundedOrInfeasible => HighsStatus::UnboundedOrInfeasible,
        HighsModelStatus::ReachedTimeLimit => HighsStatus::ReachedTimeLimit,
        HighsModelStatus::ReachedIterationLimit => HighsStatus::ReachedIterationLimit,
        _ => HighsStatus::Unknown,
    }
}
