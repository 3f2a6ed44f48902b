#![allow(clippy::float_cmp)]

use reopt_core::{
    Bounds, FixConfig, Model, ReSolveController, Sense, SolveState, SolveStrategy, SosKind, Variable,
};
use reopt_expr::{ComparisonSense, ConstraintId, Expr, VariableId};
use reopt_highs::HighsSolver;
use reopt_solver::{SolverConfig, SolverError, SolverStatus};

const TOL: f64 = 1e-6;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < TOL,
        "expected {expected}, got {actual}"
    );
}

struct Documented {
    model: Model,
    x: VariableId,
    y: VariableId,
    con: ConstraintId,
}

/// `max 5x + y` subject to `con: x + y <= 1`, both variables in `[0, 1]`.
fn documented_model() -> Documented {
    let mut model = Model::new();
    let x = model
        .add_variable(Variable::continuous(Bounds::new(0.0, 1.0)))
        .unwrap();
    let y = model
        .add_variable(Variable::continuous(Bounds::new(0.0, 1.0)))
        .unwrap();
    let con = model
        .add_constraint(
            ComparisonSense::LessEqual,
            Expr::var(x) + Expr::var(y),
            1.0,
        )
        .unwrap();
    model
        .maximize(Expr::term(x, 5.0) + Expr::var(y))
        .unwrap();
    Documented { model, x, y, con }
}

#[test]
fn test_documented_example_adds_column_and_resolves() {
    init_tracing();
    let mut doc = documented_model();
    let mut controller = HighsSolver::new().into_controller();

    let solution = controller.solve(&mut doc.model).unwrap();
    assert_close(solution.objective_value, 5.0);
    assert_close(doc.model.value(doc.x).unwrap(), 1.0);
    let report = controller.last_report().unwrap();
    assert_eq!(report.strategy, SolveStrategy::FullResubmission);
    assert!(report.cold);

    let z = doc
        .model
        .add_variable(
            Variable::continuous(Bounds::new(0.0, 1.0))
                .with_objective(10.0)
                .in_constraints(vec![doc.con], vec![1.0]),
        )
        .unwrap();
    assert_eq!(doc.model.solve_state(), SolveState::Dirty);
    assert_eq!(doc.model.objective_coefficient(z).unwrap(), 10.0);

    let solution = controller.solve(&mut doc.model).unwrap();
    assert_close(solution.objective_value, 10.0);
    assert_close(doc.model.value(z).unwrap(), 1.0);
    assert_close(doc.model.value(doc.x).unwrap(), 0.0);
    assert_close(doc.model.value(doc.y).unwrap(), 0.0);

    let report = controller.last_report().unwrap();
    assert_eq!(report.strategy, SolveStrategy::IncrementalPatch);
    assert_eq!(report.changes_applied, 1);
    assert!(report.hot_start);
    assert!(!report.cold);
    assert_eq!(doc.model.solve_state(), SolveState::Solved);
}

#[test]
fn test_bound_change_is_visible_on_resolve() {
    init_tracing();
    let mut doc = documented_model();
    let mut controller = HighsSolver::new().into_controller();
    controller.solve(&mut doc.model).unwrap();

    doc.model.set_bounds(doc.x, 0.0, 0.5).unwrap();
    let solution = controller.solve(&mut doc.model).unwrap();
    assert_close(solution.objective_value, 3.0);
    assert_close(doc.model.value(doc.x).unwrap(), 0.5);
    assert_close(doc.model.value(doc.y).unwrap(), 0.5);
}

#[test]
fn test_rhs_change_on_documented_model() {
    init_tracing();
    let mut doc = documented_model();
    let mut controller = HighsSolver::new().into_controller();
    controller.solve(&mut doc.model).unwrap();

    doc.model.set_constraint_rhs(doc.con, 2.0).unwrap();
    let solution = controller.solve(&mut doc.model).unwrap();
    assert_close(solution.objective_value, 6.0);
    assert_close(doc.model.constraint_dual(doc.con).unwrap(), 0.0);
    assert!(controller.last_report().unwrap().hot_start);
    assert_eq!(solution.get_metadata("reused_instance"), Some(1.0));
}

struct Chain {
    model: Model,
    first: ConstraintId,
}

/// `max 3a + b + c + 3d` over four chained rows and a cap on `a`; the
/// optimum `(3, 1, 3, 5)` is nondegenerate, with `b + c <= 6` slack.
fn chain_model() -> Chain {
    let mut model = Model::new();
    let vars: Vec<VariableId> = (0..4)
        .map(|_| {
            model
                .add_variable(Variable::continuous(Bounds::non_negative()))
                .unwrap()
        })
        .collect();
    let first = model
        .add_constraint(
            ComparisonSense::LessEqual,
            Expr::var(vars[0]) + Expr::var(vars[1]),
            4.0,
        )
        .unwrap();
    let rows = [
        (Expr::var(vars[1]) + Expr::var(vars[2]), 6.0),
        (Expr::var(vars[2]) + Expr::var(vars[3]), 8.0),
        (Expr::var(vars[3]), 5.0),
        (Expr::var(vars[0]), 3.0),
    ];
    for (expr, rhs) in rows {
        model
            .add_constraint(ComparisonSense::LessEqual, expr, rhs)
            .unwrap();
    }
    model
        .maximize(
            Expr::term(vars[0], 3.0)
                + Expr::var(vars[1])
                + Expr::var(vars[2])
                + Expr::term(vars[3], 3.0),
        )
        .unwrap();
    Chain { model, first }
}

#[test]
fn test_rhs_change_hot_starts() {
    init_tracing();
    let mut chain = chain_model();
    let mut controller =
        HighsSolver::with_config(SolverConfig::new().with_presolve(false)).into_controller();

    let cold = controller.solve(&mut chain.model).unwrap();
    assert_close(cold.objective_value, 28.0);
    assert_eq!(cold.get_metadata("warm_basis"), Some(0.0));
    let cold_iterations = cold.get_metadata("simplex_iterations").unwrap();
    assert!(cold_iterations > 0.0);

    chain.model.set_constraint_rhs(chain.first, 5.0).unwrap();
    let hot = controller.solve(&mut chain.model).unwrap();
    assert_close(hot.objective_value, 29.0);
    let report = controller.last_report().unwrap();
    assert_eq!(report.strategy, SolveStrategy::IncrementalPatch);
    assert!(report.hot_start);
    assert_eq!(hot.get_metadata("warm_basis"), Some(1.0));
    assert_eq!(hot.get_metadata("reused_instance"), Some(1.0));
    let hot_iterations = hot.get_metadata("simplex_iterations").unwrap();
    assert!(
        hot_iterations < cold_iterations,
        "hot start took {hot_iterations} iterations, cold took {cold_iterations}"
    );
}

#[test]
fn test_cold_resolve_clears_kept_basis() {
    init_tracing();
    let mut chain = chain_model();
    let mut controller = HighsSolver::with_config(
        SolverConfig::new()
            .with_presolve(false)
            .with_warm_start(false),
    )
    .into_controller();

    controller.solve(&mut chain.model).unwrap();
    chain.model.set_constraint_rhs(chain.first, 5.0).unwrap();
    let second = controller.solve(&mut chain.model).unwrap();
    assert_close(second.objective_value, 29.0);
    let report = controller.last_report().unwrap();
    assert_eq!(report.strategy, SolveStrategy::IncrementalPatch);
    assert!(!report.hot_start);
    assert_eq!(second.get_metadata("reused_instance"), Some(1.0));
    assert_eq!(second.get_metadata("warm_basis"), Some(0.0));
    // Four structural columns have to enter a slack basis again.
    assert!(second.get_metadata("simplex_iterations").unwrap() >= 4.0);
}

#[test]
fn test_removed_variable_and_new_constraint() {
    init_tracing();
    let mut doc = documented_model();
    let mut controller = HighsSolver::new().into_controller();
    controller.solve(&mut doc.model).unwrap();

    doc.model
        .add_constraint(ComparisonSense::LessEqual, Expr::var(doc.x), 0.3)
        .unwrap();
    let solution = controller.solve(&mut doc.model).unwrap();
    assert_close(solution.objective_value, 2.2);

    doc.model.remove_variable(doc.x).unwrap();
    let solution = controller.solve(&mut doc.model).unwrap();
    assert_close(solution.objective_value, 1.0);
    assert!(doc.model.is_removed(doc.x).unwrap());
    assert_close(doc.model.value(doc.x).unwrap(), 0.0);
}

#[test]
fn test_incremental_and_full_resubmission_agree() {
    init_tracing();
    let edit = |doc: &mut Documented| {
        let w = doc
            .model
            .add_variable(
                Variable::continuous(Bounds::new(0.0, 2.0))
                    .with_objective(3.0)
                    .in_constraints(vec![doc.con], vec![2.0]),
            )
            .unwrap();
        doc.model.set_constraint_rhs(doc.con, 3.0).unwrap();
        doc.model
            .set_objective(
                Sense::Maximize,
                Expr::term(doc.x, 1.0) + Expr::term(doc.y, 2.0) + Expr::term(w, 3.0),
            )
            .unwrap();
        w
    };

    let mut incremental = documented_model();
    let mut patched = HighsSolver::new().into_controller();
    patched.solve(&mut incremental.model).unwrap();
    let w_incremental = edit(&mut incremental);
    let patched_objective = patched.solve(&mut incremental.model).unwrap().objective_value;
    assert_eq!(
        patched.last_report().unwrap().strategy,
        SolveStrategy::IncrementalPatch
    );

    let mut full = documented_model();
    let mut resubmitted =
        HighsSolver::with_config(SolverConfig::new().with_incremental(false)).into_controller();
    resubmitted.solve(&mut full.model).unwrap();
    let w_full = edit(&mut full);
    let full_objective = resubmitted.solve(&mut full.model).unwrap().objective_value;
    assert_eq!(
        resubmitted.last_report().unwrap().strategy,
        SolveStrategy::FullResubmission
    );

    assert_close(patched_objective, full_objective);
    assert_close(
        incremental.model.value(w_incremental).unwrap(),
        full.model.value(w_full).unwrap(),
    );
    assert_eq!(
        patched.solver().loaded_problem(),
        Some(&incremental.model.to_problem())
    );
}

#[test]
fn test_sos1_model_and_fixed_duals() {
    init_tracing();
    let mut model = Model::new();
    let members: Vec<VariableId> = (0..3)
        .map(|_| {
            model
                .add_variable(Variable::continuous(Bounds::new(0.0, 20.0)))
                .unwrap()
        })
        .collect();
    let total = model
        .add_constraint(
            ComparisonSense::LessEqual,
            Expr::var(members[0]) + Expr::var(members[1]) + Expr::var(members[2]),
            10.0,
        )
        .unwrap();
    let cap = model
        .add_constraint(ComparisonSense::LessEqual, Expr::var(members[2]), 4.0)
        .unwrap();
    model
        .maximize(
            Expr::term(members[0], 1.0) + Expr::term(members[1], 2.0) + Expr::term(members[2], 3.0),
        )
        .unwrap();
    model.add_sos(SosKind::Sos1, members.clone(), None).unwrap();

    let mut controller = HighsSolver::new().into_controller();
    let solution = controller.solve(&mut model).unwrap();
    assert_close(solution.objective_value, 20.0);
    assert_eq!(solution.primal_values.len(), 3);
    assert_close(model.value(members[1]).unwrap(), 10.0);
    assert!(!controller.last_report().unwrap().hot_start);

    let mut fixed = model
        .fixed_model_with(FixConfig::new().with_zero_tolerance(1e-6))
        .unwrap();
    assert_eq!(fixed.freed(), &[members[1]]);
    assert_eq!(fixed.fixed(), &[members[0], members[2]]);

    let solution = fixed.solve_with(HighsSolver::new()).unwrap();
    assert_close(solution.objective_value, 20.0);
    let derived = fixed.model();
    assert_close(derived.constraint_dual(total).unwrap().abs(), 2.0);
    assert_close(derived.constraint_dual(cap).unwrap(), 0.0);
}

#[test]
fn test_sos2_allows_adjacent_pair_only() {
    init_tracing();
    let mut model = Model::new();
    let members: Vec<VariableId> = (0..4)
        .map(|_| {
            model
                .add_variable(Variable::continuous(Bounds::new(0.0, 1.0)))
                .unwrap()
        })
        .collect();
    model
        .maximize(
            Expr::term(members[0], 4.0)
                + Expr::term(members[1], 1.0)
                + Expr::term(members[2], 4.0)
                + Expr::term(members[3], 1.0),
        )
        .unwrap();
    model.add_sos(SosKind::Sos2, members.clone(), None).unwrap();

    let mut controller = HighsSolver::new().into_controller();
    let solution = controller.solve(&mut model).unwrap();
    // Members 0 and 2 are not adjacent; the best pair is worth 5.
    assert_close(solution.objective_value, 5.0);
    let nonzero = members
        .iter()
        .filter(|&&member| model.value(member).unwrap().abs() > TOL)
        .count();
    assert!(nonzero <= 2);
    assert!(solution.get_metadata("sos_indicator_columns").is_some());
}

#[test]
fn test_sos_member_without_finite_bounds_is_rejected() {
    init_tracing();
    let mut model = Model::new();
    let a = model
        .add_variable(Variable::continuous(Bounds::non_negative()).with_objective(1.0))
        .unwrap();
    let b = model
        .add_variable(Variable::continuous(Bounds::new(0.0, 1.0)))
        .unwrap();
    model.add_sos(SosKind::Sos1, vec![a, b], None).unwrap();

    let mut controller = HighsSolver::new().into_controller();
    let err = controller.solve(&mut model).unwrap_err();
    assert_eq!(err.code(), "SOLVER_INVALID_PROBLEM");
    assert_eq!(model.solve_state(), SolveState::Unsolved);
}

#[test]
fn test_infeasible_model_reports_failure() {
    init_tracing();
    let mut model = Model::new();
    let x = model
        .add_variable(Variable::continuous(Bounds::new(0.0, 1.0)).with_objective(1.0))
        .unwrap();
    model
        .add_constraint(ComparisonSense::GreaterEqual, Expr::var(x), 2.0)
        .unwrap();

    let mut controller = HighsSolver::new().into_controller();
    let err = controller.solve(&mut model).unwrap_err();
    assert!(matches!(err, SolverError::SolveFailure { .. }));
    assert_eq!(model.solve_state(), SolveState::Unsolved);
    assert!(controller.last_report().is_none());
}

#[test]
fn test_integer_model_reports_gap_and_status() {
    init_tracing();
    let mut model = Model::new();
    let n = model
        .add_variable(Variable::integer(Bounds::new(0.0, 10.0)).with_objective(1.0))
        .unwrap();
    model
        .add_constraint(ComparisonSense::LessEqual, Expr::term(n, 2.0), 7.0)
        .unwrap();
    model.maximize(Expr::var(n)).unwrap();

    let mut controller = HighsSolver::new().into_controller();
    let solution = controller.solve(&mut model).unwrap();
    assert_eq!(solution.status, SolverStatus::Optimal);
    assert_close(solution.objective_value, 3.0);
    assert!(solution.get_metadata("mip_gap").is_some());

    let fixed = model.fixed_model().unwrap();
    assert_eq!(fixed.fixed(), &[n]);
    let relaxed = fixed.model().variable(n).unwrap();
    assert!(!relaxed.is_integer());
    assert_close(relaxed.bounds.lower, 3.0);
    assert_close(relaxed.bounds.upper, 3.0);
}

#[test]
fn test_objective_constant_is_reported() {
    init_tracing();
    let mut doc = documented_model();
    doc.model
        .maximize(Expr::term(doc.x, 5.0) + Expr::from_constant(2.5))
        .unwrap();
    let mut controller = ReSolveController::new(HighsSolver::new());
    let solution = controller.solve(&mut doc.model).unwrap();
    assert_close(solution.objective_value, 7.5);
}
