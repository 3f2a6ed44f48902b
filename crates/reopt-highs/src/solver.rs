//! HiGHS solver implementation.

use crate::basis::Basis;
use crate::ffi::{HighsModel, HighsModelError, HighsOption, HighsStatus};
use crate::sos::{self, Expanded};
use crate::status::{highs_has_solution, highs_status_string, to_solver_status};
use reopt_core::ReSolveController;
use reopt_solver::{
    Problem, ProblemChange, Solution, Solver, SolverCapabilities, SolverConfig, SolverError,
    WarmStart,
};
use reopt_tools::StageMemory;
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, trace, warn};

fn highs_model_error_to_solver_error(err: HighsModelError) -> SolverError {
    SolverError::SolverSpecific(err.to_string())
}

/// HiGHS backend.
///
/// The backend keeps an image of the loaded problem next to a live HiGHS
/// instance built from it. `load` replaces both; `apply_changes` patches
/// the image and edits the instance in place. Problems with special
/// ordered sets are rebuilt on the next `optimize` instead, because their
/// indicator rows depend on member bounds.
///
/// After an LP solve the simplex basis is kept. A warm-started re-solve
/// extends it to the patched problem and hands it back to HiGHS; a cold
/// solve clears it.
#[derive(Debug, Default)]
pub struct HighsSolver {
    config: SolverConfig,
    image: Option<Problem>,
    instance: Option<HighsModel>,
    basis: Option<Basis>,
}

impl HighsSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Get access to the current solver configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Set the solver configuration used from the next solve on.
    pub fn set_config(&mut self, config: SolverConfig) {
        self.config = config;
    }

    /// The problem the next `optimize` will solve.
    pub fn loaded_problem(&self) -> Option<&Problem> {
        self.image.as_ref()
    }

    /// True when the next `optimize` reuses the HiGHS instance of the
    /// previous one.
    pub fn has_live_instance(&self) -> bool {
        self.instance.is_some()
    }

    /// Wrap this backend in a re-solve controller.
    pub fn into_controller(self) -> ReSolveController<Self> {
        ReSolveController::new(self)
    }

    fn discard_instance(&mut self) {
        self.instance = None;
        self.basis = None;
    }
}

impl Solver for HighsSolver {
    fn name(&self) -> &'static str {
        "highs"
    }

    fn capabilities(&self) -> SolverCapabilities {
        SolverCapabilities {
            supports_incremental_modification: self.config.allows_incremental(),
            supports_warm_start: self.config.allows_warm_start(),
        }
    }

    fn load(&mut self, problem: &Problem) -> Result<(), SolverError> {
        debug!(
            component = "solver",
            operation = "load",
            status = "success",
            solver = "highs",
            num_cols = problem.num_columns(),
            num_rows = problem.num_rows(),
            nnz = problem.num_nonzeros(),
            sos_sets = problem.sos.len(),
            "Loaded problem image"
        );
        self.image = Some(problem.clone());
        self.discard_instance();
        Ok(())
    }

    fn apply_changes(&mut self, changes: &[ProblemChange]) -> Result<(), SolverError> {
        let image = self.image.as_mut().ok_or(SolverError::NotLoaded)?;
        if let Err(err) = image.apply_all(changes) {
            self.instance = None;
            self.basis = None;
            return Err(err);
        }

        let mut patched_in_place = false;
        if !image.sos.is_empty() {
            self.instance = None;
            self.basis = None;
        } else if let Some(instance) = self.instance.as_mut() {
            match patch_instance(instance, changes) {
                Ok(()) => patched_in_place = true,
                Err(err) => {
                    warn!(
                        component = "solver",
                        operation = "apply_changes",
                        status = "warn",
                        solver = "highs",
                        error = %err,
                        "Could not edit the HiGHS instance, rebuilding on next solve"
                    );
                    self.instance = None;
                    self.basis = None;
                }
            }
        }

        debug!(
            component = "solver",
            operation = "apply_changes",
            status = "success",
            solver = "highs",
            num_changes = changes.len(),
            num_cols = image.num_columns(),
            num_rows = image.num_rows(),
            patched_in_place,
            "Patched problem image"
        );
        Ok(())
    }

    fn optimize(&mut self, warm_start: Option<&WarmStart>) -> Result<Solution, SolverError> {
        let image = self.image.as_ref().ok_or(SolverError::NotLoaded)?;
        if image.num_columns() == 0 {
            return Err(SolverError::EmptyModel);
        }
        let expanded = sos::expand(image)?;
        let reused = self.instance.is_some();
        let mut instance = match self.instance.take() {
            Some(instance) => instance,
            None => build_highs_model(&expanded)?,
        };
        let basis = self.basis.take();

        let outcome = solve_instance(
            &mut instance,
            &expanded,
            &self.config,
            warm_start,
            basis,
            reused,
        );
        if instance.is_live() {
            self.instance = Some(instance);
        }
        let (solution, basis) = outcome?;
        self.basis = basis;
        Ok(solution)
    }
}

/// Mirror `changes` on a live instance of a problem without sets.
fn patch_instance(
    instance: &mut HighsModel,
    changes: &[ProblemChange],
) -> Result<(), HighsModelError> {
    for change in changes {
        match change {
            ProblemChange::AddColumn { column, entries } => {
                instance.add_col(
                    column.lower,
                    column.upper,
                    column.objective,
                    column.is_integer,
                    entries,
                )?;
            }
            ProblemChange::SetColumnBounds {
                index,
                lower,
                upper,
            } => instance.set_col_bounds(*index, *lower, *upper)?,
            ProblemChange::AddRow(row) => {
                instance.add_row(row.lower, row.upper, &row.terms)?;
            }
            ProblemChange::SetRowBounds {
                index,
                lower,
                upper,
            } => instance.set_row_bounds(*index, *lower, *upper)?,
            ProblemChange::SetObjective {
                sense,
                coefficients,
                ..
            } => {
                // The offset stays in the image and is added after the solve.
                instance.set_sense(*sense)?;
                let mut costs = vec![0.0; instance.num_cols()];
                for (index, coeff) in coefficients {
                    if let Some(cost) = costs.get_mut(*index) {
                        *cost = *coeff;
                    }
                }
                for (index, cost) in costs.into_iter().enumerate() {
                    instance.set_col_cost(index, cost)?;
                }
            }
            // Problems with sets are rebuilt, never patched.
            ProblemChange::AddSos(_) => {}
        }
        trace!(
            component = "solver",
            operation = "patch_instance",
            status = "success",
            change = change.kind(),
            "Applied change to HiGHS instance"
        );
    }
    Ok(())
}

fn apply_solver_config(highs_model: &mut HighsModel, config: &SolverConfig) {
    let output = config.log_to_console.unwrap_or(false) || config.verbosity.unwrap_or(0) > 0;
    highs_model.set_output(output);

    if let Some(limit) = config.time_limit {
        highs_model.set_option("time_limit", HighsOption::Float(limit));
    }
    if let Some(gap) = config.mip_gap {
        highs_model.set_option("mip_rel_gap", HighsOption::Float(gap));
    }
    if let Some(presolve) = config.presolve {
        let presolve_str = if presolve { "on" } else { "off" };
        highs_model.set_option("presolve", HighsOption::Str(presolve_str.to_string()));
    }
    if let Some(threads) = config.threads {
        highs_model.set_option("threads", HighsOption::Int(threads as i32));
    }
    if let Some(tolerance) = config.tolerance {
        highs_model.set_option(
            "primal_feasibility_tolerance",
            HighsOption::Float(tolerance),
        );
        highs_model.set_option("dual_feasibility_tolerance", HighsOption::Float(tolerance));
    }
}

fn build_highs_model(expanded: &Expanded<'_>) -> Result<HighsModel, SolverError> {
    let build_started = Instant::now();
    let problem = expanded.problem.as_ref();
    let mut highs_model = HighsModel::new();
    highs_model
        .set_sense(problem.sense)
        .map_err(highs_model_error_to_solver_error)?;

    for column in &problem.columns {
        highs_model
            .add_col(column.lower, column.upper, column.objective, column.is_integer, &[])
            .map_err(highs_model_error_to_solver_error)?;
    }
    for (row_index, row) in problem.rows.iter().enumerate() {
        highs_model
            .add_row(row.lower, row.upper, &row.terms)
            .map_err(highs_model_error_to_solver_error)?;
        trace!(
            component = "solver",
            operation = "add_row",
            status = "success",
            row_index,
            lower = row.lower,
            upper = row.upper,
            num_coeffs = row.terms.len(),
            "Added row to HiGHS"
        );
    }

    debug!(
        component = "solver",
        operation = "build",
        status = "success",
        num_cols = highs_model.num_cols(),
        num_rows = highs_model.num_rows(),
        indicator_cols = expanded.indicator_columns(),
        duration_ms = build_started.elapsed().as_secs_f64() * 1000.0,
        "Built HiGHS model"
    );
    Ok(highs_model)
}

fn solve_instance(
    highs_model: &mut HighsModel,
    expanded: &Expanded<'_>,
    config: &SolverConfig,
    warm_start: Option<&WarmStart>,
    basis: Option<Basis>,
    reused: bool,
) -> Result<(Solution, Option<Basis>), SolverError> {
    let solver_version = crate::ffi::highs_version().unwrap_or_else(|| "unknown".to_string());
    let mut memory = StageMemory::new();
    let rss_before = memory.sample("solve_start");
    let solve_started = Instant::now();
    let is_mip = expanded.problem.is_mip();

    debug!(
        component = "solver",
        operation = "solve",
        status = "started",
        solver = "highs",
        solver_version = %solver_version,
        rss_bytes = ?rss_before,
        warm_start = warm_start.is_some(),
        reused_instance = reused,
        "Starting solve process"
    );

    apply_solver_config(highs_model, config);
    let warm_basis = match warm_start {
        Some(start) if !is_mip => install_warm_start(highs_model, expanded, start, basis)?,
        Some(_) => {
            debug!(
                component = "solver",
                operation = "warm_start",
                status = "skipped",
                reason = "mip",
                "Ignoring warm start for a MIP"
            );
            highs_model
                .clear_solver()
                .map_err(highs_model_error_to_solver_error)?;
            false
        }
        None => {
            highs_model
                .clear_solver()
                .map_err(highs_model_error_to_solver_error)?;
            false
        }
    };

    let status = highs_model
        .solve()
        .map_err(highs_model_error_to_solver_error)?;
    let solve_ms = solve_started.elapsed().as_secs_f64() * 1000.0;
    let rss_after = memory.sample("solve_end");
    let rss_delta = memory.growth_bytes();
    let simplex_iterations = highs_model.int_info("simplex_iteration_count").unwrap_or(0);
    let barrier_iterations = highs_model.int_info("ipm_iteration_count").unwrap_or(0);
    let optimality_gap = highs_model.mip_gap();
    let objective_value_log = highs_model.objective_value().unwrap_or(f64::NAN);

    debug!(
        component = "solver",
        operation = "solve",
        status = "success",
        solver = "highs",
        solver_version = %solver_version,
        solver_status = highs_status_string(status),
        simplex_iterations,
        barrier_iterations,
        total_iterations = simplex_iterations + barrier_iterations,
        objective_value = objective_value_log,
        optimality_gap,
        duration_ms = solve_ms,
        rss_bytes = ?rss_after,
        rss_delta_bytes = ?rss_delta,
        "HiGHS solve completed"
    );

    if !highs_has_solution(status) {
        warn!(
            component = "solver",
            operation = "solve",
            status = "warn",
            solver = "highs",
            solver_status = highs_status_string(status),
            simplex_iterations,
            barrier_iterations,
            duration_ms = solve_ms,
            "Solver did not find a solution"
        );
        return Err(SolverError::SolveFailure {
            status: to_solver_status(status),
        });
    }

    if status != HighsStatus::Optimal {
        warn!(
            component = "solver",
            operation = "solve",
            status = "warn",
            solver = "highs",
            solver_status = highs_status_string(status),
            objective_value = objective_value_log,
            optimality_gap,
            duration_ms = solve_ms,
            "Solver hit limit but returning best solution found"
        );
    }

    let snapshot = highs_model
        .solution_snapshot()
        .map_err(highs_model_error_to_solver_error)?;
    let objective_value = highs_model
        .objective_value()
        .map_err(highs_model_error_to_solver_error)?
        + expanded.problem.objective_offset;

    // Indicator columns and their rows sit after the caller's problem.
    let mut primal_values = snapshot.col_values;
    let mut variable_duals = snapshot.col_duals;
    let mut row_values = snapshot.row_values;
    let mut constraint_duals = snapshot.row_duals;
    primal_values.truncate(expanded.original_columns);
    variable_duals.truncate(expanded.original_columns);
    row_values.truncate(expanded.original_rows);
    constraint_duals.truncate(expanded.original_rows);

    let mut metadata = BTreeMap::new();
    metadata.insert("simplex_iterations".to_string(), simplex_iterations as f64);
    metadata.insert("barrier_iterations".to_string(), barrier_iterations as f64);
    metadata.insert("warm_basis".to_string(), f64::from(u8::from(warm_basis)));
    metadata.insert("reused_instance".to_string(), f64::from(u8::from(reused)));
    if optimality_gap.is_finite() && is_mip {
        metadata.insert("mip_gap".to_string(), optimality_gap);
    }
    if expanded.indicator_columns() > 0 {
        metadata.insert(
            "sos_indicator_columns".to_string(),
            expanded.indicator_columns() as f64,
        );
    }
    if let Some(rss) = rss_after {
        metadata.insert("rss_bytes".to_string(), rss as f64);
    }
    if let Some(delta) = rss_delta {
        metadata.insert("rss_delta_bytes".to_string(), delta as f64);
    }

    debug!(
        component = "solver",
        operation = "extract_solution",
        status = "success",
        objective_value,
        num_primal_values = primal_values.len(),
        num_variable_duals = variable_duals.len(),
        num_constraint_duals = constraint_duals.len(),
        "Solution extracted"
    );

    let next_basis = if is_mip { None } else { highs_model.basis() };
    let solution = Solution {
        primal_values,
        variable_duals,
        constraint_duals,
        row_values,
        objective_value,
        status: to_solver_status(status),
        solve_time_seconds: solve_started.elapsed().as_secs_f64(),
        metadata,
    };
    Ok((solution, next_basis))
}

/// Start an LP from the kept basis, or from the primal point when no basis
/// fits. Returns whether a basis was installed.
fn install_warm_start(
    highs_model: &mut HighsModel,
    expanded: &Expanded<'_>,
    start: &WarmStart,
    basis: Option<Basis>,
) -> Result<bool, SolverError> {
    if let Some(extended) = basis.and_then(|basis| basis.extend_to(&expanded.problem)) {
        match highs_model.set_basis(&extended) {
            Ok(()) => return Ok(true),
            Err(err) => warn!(
                component = "solver",
                operation = "warm_start",
                status = "warn",
                error = %err,
                "HiGHS rejected the kept basis, using the primal point"
            ),
        }
    }
    highs_model
        .set_primal_start(start.primal.clone())
        .map_err(highs_model_error_to_solver_error)?;
    debug!(
        component = "solver",
        operation = "warm_start",
        status = "success",
        source = "primal",
        num_values = start.primal.len(),
        "Passing primal point to HiGHS"
    );
    Ok(false)
}
