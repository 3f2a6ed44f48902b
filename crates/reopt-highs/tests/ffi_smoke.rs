use reopt_highs::{BasisStatus, HighsModel, HighsOption, HighsStatus, highs_version};
use reopt_solver::Sense;

#[test]
fn test_minimize_with_primal_start() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();

    // minimize x subject to x >= 1
    let mut model = HighsModel::new();
    let x = model.add_col(1.0, f64::INFINITY, 1.0, false, &[]).unwrap();
    model.set_sense(Sense::Minimize).unwrap();
    model
        .set_primal_start(vec![2.0])
        .expect("failed to set primal start");

    let status = model.solve().unwrap();
    assert_eq!(status, HighsStatus::Optimal);
    assert_eq!(model.num_cols(), 1);
    assert!(model.is_live());

    let obj_value = model.objective_value().expect("missing objective value");
    let snapshot = model.solution_snapshot().expect("missing solution");
    assert!(
        (obj_value - 1.0).abs() < 1e-6,
        "Expected objective value ~1.0, got {}",
        obj_value
    );
    assert!((snapshot.col_values[x] - 1.0).abs() < 1e-6);
}

#[test]
fn test_maximize_integer_row() {
    // maximize n subject to 2n <= 7, n integer
    let mut model = HighsModel::new();
    let n = model.add_col(0.0, 10.0, 1.0, true, &[]).unwrap();
    model.set_sense(Sense::Maximize).unwrap();
    model.add_row(f64::NEG_INFINITY, 7.0, &[(n, 2.0)]).unwrap();

    assert_eq!(model.solve().unwrap(), HighsStatus::Optimal);
    let snapshot = model.solution_snapshot().unwrap();
    assert!((snapshot.col_values[n] - 3.0).abs() < 1e-6);
    assert!((snapshot.row_values[0] - 6.0).abs() < 1e-6);
    assert!(model.mip_gap().is_finite());
}

#[test]
fn test_infeasible_bounds() {
    let mut model = HighsModel::new();
    let x = model.add_col(0.0, 1.0, 1.0, false, &[]).unwrap();
    model.add_row(2.0, f64::INFINITY, &[(x, 1.0)]).unwrap();
    assert_eq!(model.solve().unwrap(), HighsStatus::Infeasible);
}

#[test]
fn test_live_instance_edits_and_basis_round_trip() {
    // max x + 2y subject to x + y <= 4, x, y in [0, 3]
    let mut model = HighsModel::new();
    let x = model.add_col(0.0, 3.0, 1.0, false, &[]).unwrap();
    let y = model.add_col(0.0, 3.0, 2.0, false, &[]).unwrap();
    model.set_sense(Sense::Maximize).unwrap();
    let cap = model.add_row(f64::NEG_INFINITY, 4.0, &[(x, 1.0), (y, 1.0)]).unwrap();
    model.set_option("presolve", HighsOption::Str("off".to_string()));
    assert_eq!(model.solve().unwrap(), HighsStatus::Optimal);
    assert!((model.objective_value().unwrap() - 7.0).abs() < 1e-6);

    let basis = model.basis().expect("LP solve leaves a valid basis");
    assert_eq!(basis.columns.len(), 2);
    assert_eq!(basis.rows.len(), 1);
    assert_eq!(basis.num_basic(), 1);

    // New column z with entry 1 in `cap`, then a new row z <= 0.5.
    let z = model.add_col(0.0, 1.0, 5.0, false, &[(cap, 1.0)]).unwrap();
    model.add_row(f64::NEG_INFINITY, 0.5, &[(z, 1.0)]).unwrap();
    assert!(model.objective_value().is_err());
    model.set_row_bounds(cap, f64::NEG_INFINITY, 5.0).unwrap();

    let mut extended = basis.clone();
    extended.columns.push(BasisStatus::Lower);
    extended.rows.push(BasisStatus::Basic);
    model.set_basis(&extended).unwrap();
    assert_eq!(model.solve().unwrap(), HighsStatus::Optimal);
    // x = 1.5, y = 3, z = 0.5
    assert!((model.objective_value().unwrap() - 10.0).abs() < 1e-6);

    model.set_col_cost(z, 0.0).unwrap();
    model.set_col_bounds(x, 0.0, 0.0).unwrap();
    model.clear_solver().unwrap();
    assert_eq!(model.solve().unwrap(), HighsStatus::Optimal);
    assert!((model.objective_value().unwrap() - 6.0).abs() < 1e-6);
}

#[test]
fn test_version_is_reported() {
    let version = highs_version().expect("HiGHS version");
    assert!(!version.is_empty());
}
