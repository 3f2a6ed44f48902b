use reopt_expr::expr::{ComparisonSense, Expr};
use reopt_expr::ids::{ConstraintId, VariableId};

use crate::controller::ReSolveController;
use crate::model::Model;
use crate::test_support::ScriptedSolver;
use crate::types::{Bounds, Sense, Variable};

pub(super) struct Documented {
    pub model: Model,
    pub x: VariableId,
    pub y: VariableId,
    pub con: ConstraintId,
}

/// `max 5x + y` subject to `con: x + y <= 1`, both variables in `[0, 1]`.
pub(super) fn documented_model() -> Documented {
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
        .set_objective(Sense::Maximize, Expr::term(x, 5.0) + Expr::var(y))
        .unwrap();
    Documented { model, x, y, con }
}

/// Solve with a scripted solver that reports `primal` as the solution.
pub(super) fn solve_with_values(model: &mut Model, primal: Vec<f64>) {
    let mut controller = ReSolveController::new(ScriptedSolver::full_only().with_primal(primal));
    controller.solve(model).unwrap();
}
