use reopt_expr::ids::{ConstraintId, VariableId};

pub use reopt_solver::{Sense, SosKind};

/// Bounds for a variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Both bounds at `value`.
    pub fn fixed(value: f64) -> Self {
        Self::new(value, value)
    }

    /// `[0, +inf)`
    pub fn non_negative() -> Self {
        Self::new(0.0, f64::INFINITY)
    }

    /// Both bounds exactly zero: the representation of a removed variable.
    pub fn is_zeroed(&self) -> bool {
        self.lower == 0.0 && self.upper == 0.0
    }

    /// `[+inf, +inf]` and `[-inf, -inf]` are empty domains.
    pub(crate) fn is_valid(&self) -> bool {
        !self.lower.is_nan()
            && !self.upper.is_nan()
            && self.lower <= self.upper
            && self.lower != f64::INFINITY
            && self.upper != f64::NEG_INFINITY
    }
}

/// Domain of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VariableKind {
    #[default]
    Continuous,
    Integer,
}

impl VariableKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VariableKind::Continuous => "continuous",
            VariableKind::Integer => "integer",
        }
    }
}

/// A decision variable with bounds and domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variable {
    pub bounds: Bounds,
    pub kind: VariableKind,
}

impl Variable {
    /// Create a binary variable with bounds [0, 1] and integer domain.
    pub fn binary() -> Self {
        Self::integer(Bounds::new(0.0, 1.0))
    }

    /// Create a continuous variable with specified bounds.
    pub fn continuous(bounds: Bounds) -> Self {
        Self {
            bounds,
            kind: VariableKind::Continuous,
        }
    }

    /// Create an integer variable with specified bounds.
    pub fn integer(bounds: Bounds) -> Self {
        Self {
            bounds,
            kind: VariableKind::Integer,
        }
    }

    pub fn is_integer(&self) -> bool {
        self.kind == VariableKind::Integer
    }

    /// Start a [`NewVariable`] with an objective coefficient.
    pub fn with_objective(self, coefficient: f64) -> NewVariable {
        NewVariable::from(self).with_objective(coefficient)
    }

    /// Start a [`NewVariable`] that enters existing constraints.
    pub fn in_constraints(self, constraints: Vec<ConstraintId>, coefficients: Vec<f64>) -> NewVariable {
        NewVariable::from(self).in_constraints(constraints, coefficients)
    }
}

/// Everything `Model::add_variable` needs: the variable, its objective
/// coefficient and the constraints it enters.
///
/// `constraints` and `coefficients` are paired by position and validated
/// together when the variable is added.
#[derive(Debug, Clone, PartialEq)]
pub struct NewVariable {
    pub variable: Variable,
    pub objective: f64,
    pub constraints: Vec<ConstraintId>,
    pub coefficients: Vec<f64>,
}

impl NewVariable {
    pub fn with_objective(mut self, coefficient: f64) -> Self {
        self.objective = coefficient;
        self
    }

    pub fn in_constraints(mut self, constraints: Vec<ConstraintId>, coefficients: Vec<f64>) -> Self {
        self.constraints = constraints;
        self.coefficients = coefficients;
        self
    }
}

impl From<Variable> for NewVariable {
    fn from(variable: Variable) -> Self {
        Self {
            variable,
            objective: 0.0,
            constraints: Vec::new(),
            coefficients: Vec::new(),
        }
    }
}

/// Objective function: sense, merged linear terms and a constant offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    pub sense: Sense,
    pub terms: Vec<(VariableId, f64)>,
    pub constant: f64,
}

impl Objective {
    /// Create a new empty minimization objective.
    pub fn new() -> Self {
        Self {
            sense: Sense::Minimize,
            terms: Vec::new(),
            constant: 0.0,
        }
    }

    /// Coefficient of `var_id`, zero when absent.
    pub fn coefficient(&self, var_id: VariableId) -> f64 {
        self.terms
            .iter()
            .filter(|(id, _)| *id == var_id)
            .map(|(_, coeff)| *coeff)
            .sum()
    }
}

impl Default for Objective {
    fn default() -> Self {
        Self::new()
    }
}

/// A special ordered set, members in ascending weight order.
#[derive(Debug, Clone, PartialEq)]
pub struct SosSet {
    pub kind: SosKind,
    pub members: Vec<VariableId>,
    pub weights: Vec<f64>,
}

impl SosSet {
    pub fn contains(&self, var_id: VariableId) -> bool {
        self.members.contains(&var_id)
    }
}
