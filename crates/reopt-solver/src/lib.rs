//! Shared solver abstractions for reopt.
//!
//! This crate provides the solver-facing side of the model: the lowered
//! [`Problem`] image, the [`ProblemChange`] patches used for incremental
//! re-solves, and the [`Solver`] trait backends implement.
//!
//! # Overview
//!
//! - [`SolverConfig`]: Configuration options for solver behavior
//! - [`SolverCapabilities`]: What a configured backend can do between solves
//! - [`SolverStatus`]: Common status values across solvers
//! - [`SolverError`]: Error types for solver operations
//! - [`Solver`]: Trait for solver implementations
//! - [`Solution`]: Solver-agnostic solution values

mod config;
mod error;
pub mod problem;
mod solution;
mod status;
mod traits;

pub use config::SolverConfig;
pub use error::SolverError;
pub use problem::{Column, Problem, ProblemChange, Row, Sense, SosConstraint, SosKind};
pub use solution::Solution;
pub use status::SolverStatus;
pub use traits::{Solver, SolverCapabilities, WarmStart};
