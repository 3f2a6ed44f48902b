//! Recording solver used by unit tests.

use std::collections::BTreeMap;

use reopt_solver::{
    Problem, ProblemChange, Solution, Solver, SolverCapabilities, SolverError, SolverStatus,
    WarmStart,
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Load(Problem),
    Apply(Vec<ProblemChange>),
    Optimize(Option<WarmStart>),
}

/// Keeps a problem image like a real backend and answers `optimize` with
/// scripted primal values (missing entries read as zero).
#[derive(Debug, Default)]
pub(crate) struct ScriptedSolver {
    pub capabilities: SolverCapabilities,
    pub image: Option<Problem>,
    pub calls: Vec<Call>,
    pub primal: Vec<f64>,
    /// Fail the optimize call with this zero-based index.
    pub fail_at: Option<(usize, SolverError)>,
    optimizations: usize,
}

impl ScriptedSolver {
    pub fn full_only() -> Self {
        Self::default()
    }

    pub fn incremental() -> Self {
        Self {
            capabilities: SolverCapabilities {
                supports_incremental_modification: true,
                supports_warm_start: true,
            },
            ..Self::default()
        }
    }

    pub fn with_primal(mut self, primal: Vec<f64>) -> Self {
        self.primal = primal;
        self
    }

    pub fn failing_at(mut self, call: usize, err: SolverError) -> Self {
        self.fail_at = Some((call, err));
        self
    }

    pub fn loads(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, Call::Load(_)))
            .count()
    }

    pub fn patches(&self) -> Vec<&[ProblemChange]> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Apply(changes) => Some(changes.as_slice()),
                _ => None,
            })
            .collect()
    }

    pub fn last_warm_start(&self) -> Option<&WarmStart> {
        self.calls.iter().rev().find_map(|call| match call {
            Call::Optimize(warm_start) => Some(warm_start.as_ref()),
            _ => None,
        })?
    }
}

impl Solver for ScriptedSolver {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn capabilities(&self) -> SolverCapabilities {
        self.capabilities
    }

    fn load(&mut self, problem: &Problem) -> Result<(), SolverError> {
        self.calls.push(Call::Load(problem.clone()));
        self.image = Some(problem.clone());
        Ok(())
    }

    fn apply_changes(&mut self, changes: &[ProblemChange]) -> Result<(), SolverError> {
        self.calls.push(Call::Apply(changes.to_vec()));
        let image = self.image.as_mut().ok_or(SolverError::NotLoaded)?;
        image.apply_all(changes)
    }

    fn optimize(&mut self, warm_start: Option<&WarmStart>) -> Result<Solution, SolverError> {
        self.calls.push(Call::Optimize(warm_start.cloned()));
        let call = self.optimizations;
        self.optimizations += 1;
        match &self.fail_at {
            Some((at, err)) if *at == call => return Err(err.clone()),
            _ => {}
        }
        let image = self.image.as_ref().ok_or(SolverError::NotLoaded)?;
        let mut primal = self.primal.clone();
        primal.resize(image.num_columns(), 0.0);
        let objective_value = image.objective_offset
            + image
                .columns
                .iter()
                .zip(&primal)
                .map(|(column, value)| column.objective * value)
                .sum::<f64>();
        let row_values = image
            .rows
            .iter()
            .map(|row| row.terms.iter().map(|(col, coeff)| coeff * primal[*col]).sum())
            .collect();
        Ok(Solution {
            variable_duals: vec![0.0; primal.len()],
            constraint_duals: vec![0.0; image.num_rows()],
            primal_values: primal,
            row_values,
            objective_value,
            status: SolverStatus::Optimal,
            solve_time_seconds: 0.0,
            metadata: BTreeMap::new(),
        })
    }
}
