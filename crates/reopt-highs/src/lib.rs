//! HiGHS backend for reopt models.
//!
//! [`HighsSolver`] implements [`reopt_solver::Solver`]. It keeps one HiGHS
//! instance alive across solves, edits it in place for incremental
//! re-solves, and restarts LPs from the previous simplex basis.
//! Special ordered sets are solved through binary indicator rows.

mod basis;
pub mod ffi;
pub mod solver;
mod sos;
mod status;

pub use basis::{Basis, BasisStatus};
pub use ffi::{HighsModel, HighsModelError, HighsOption, HighsStatus, SolutionSnapshot, highs_version};
pub use solver::HighsSolver;
