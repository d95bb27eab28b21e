use crate::error::SimplexError;

/// A linear program in standard form:
///
/// ```text
///   maximize   c'x + constant
///   subject to Ax <= b
///              x  >= 0
/// ```
///
/// `b` must be non-negative so that the all-slack basis is feasible at the origin.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LpProblem {
    /// Variable names
    pub variables: Vec<String>,
    /// Objective function to maximize
    pub objective: Objective,
    /// Constraints
    pub constraints: Vec<Constraint>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Constant term added to the objective value
    #[cfg_attr(feature = "serde", serde(default))]
    pub constant: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Right-hand side value
    pub rhs: f64,
}

impl LpProblem {
    pub fn new(variables: Vec<String>) -> Self {
        let n = variables.len();
        Self {
            variables,
            objective: Objective {
                coefficients: vec![0.0; n],
                constant: 0.0,
            },
            constraints: Vec::new(),
        }
    }

    /// Build a problem from the raw `(c, A, b, constant)` form.
    ///
    /// Variables are named `x1..xn` and constraints `c1..cm`. Shapes are not
    /// checked here; see [`LpProblem::validate`].
    pub fn from_matrix(c: Vec<f64>, a: Vec<Vec<f64>>, b: Vec<f64>, constant: f64) -> Self {
        let variables = (1..=c.len()).map(|j| format!("x{}", j)).collect();
        let mut problem = Self::new(variables);
        problem.set_objective(c);
        problem.set_constant(constant);
        // Unmatched rows or right-hand sides are kept so validation can report them.
        let m = a.len().max(b.len());
        let mut rows = a.into_iter();
        let mut rhs = b.into_iter();
        for i in 0..m {
            problem.constraints.push(Constraint {
                name: format!("c{}", i + 1),
                coefficients: rows.next().unwrap_or_default(),
                rhs: rhs.next().unwrap_or(f64::NAN),
            });
        }
        problem
    }

    pub fn set_objective(&mut self, coefficients: Vec<f64>) {
        self.objective.coefficients = coefficients;
    }

    pub fn set_constant(&mut self, constant: f64) {
        self.objective.constant = constant;
    }

    pub fn add_constraint(&mut self, name: impl Into<String>, coefficients: Vec<f64>, rhs: f64) {
        self.constraints.push(Constraint {
            name: name.into(),
            coefficients,
            rhs,
        });
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Check shapes, finiteness and the `b >= 0` precondition.
    pub fn validate(&self) -> Result<(), SimplexError> {
        let n = self.num_variables();
        if n == 0 {
            return Err(SimplexError::invalid("problem has no variables"));
        }
        if self.objective.coefficients.len() != n {
            return Err(SimplexError::invalid(format!(
                "objective has {} coefficients but there are {} variables",
                self.objective.coefficients.len(),
                n
            )));
        }
        if self.objective.coefficients.iter().any(|v| !v.is_finite()) || !self.objective.constant.is_finite() {
            return Err(SimplexError::invalid("objective contains a non-finite value"));
        }

        for c in &self.constraints {
            if c.coefficients.len() != n {
                return Err(SimplexError::invalid(format!(
                    "constraint {} has {} coefficients but there are {} variables",
                    c.name,
                    c.coefficients.len(),
                    n
                )));
            }
            if c.coefficients.iter().any(|v| !v.is_finite()) || !c.rhs.is_finite() {
                return Err(SimplexError::invalid(format!(
                    "constraint {} contains a non-finite value",
                    c.name
                )));
            }
            if c.rhs < 0.0 {
                return Err(SimplexError::invalid(format!(
                    "constraint {} has negative right-hand side {}; the origin must be feasible",
                    c.name, c.rhs
                )));
            }
        }

        Ok(())
    }
}
