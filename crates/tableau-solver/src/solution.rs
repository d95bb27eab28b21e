use crate::tableau::Tableau;

/// The result of optimizing a tableau
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Optimal values for each structural variable
    pub values: Vec<f64>,
    /// Optimal objective value, constant term included
    pub objective_value: f64,
    /// Number of pivots performed
    pub iterations: usize,
    /// Slack value for each constraint
    pub slack: Vec<f64>,
    /// Detailed analysis
    pub analysis: Analysis,
    /// Final (optimal) tableau
    pub tableau: Tableau,
}

/// Detailed analysis of the optimal solution
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Shadow prices (dual values) for each constraint
    /// Indicates how much the objective would change per unit relaxation
    pub shadow_prices: Vec<ShadowPrice>,

    /// Reduced costs for each structural variable
    pub reduced_costs: Vec<ReducedCost>,

    /// Indices of constraints that are tight at the optimum
    pub binding_constraints: Vec<usize>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowPrice {
    /// Constraint index (0-based)
    pub constraint: usize,
    /// Shadow price value
    pub value: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReducedCost {
    /// Variable index (0-based)
    pub variable: usize,
    /// Current value in solution
    pub value: f64,
    /// Row-0 coefficient of the variable
    pub reduced_cost: f64,
    /// Is this variable in the basis?
    pub is_basic: bool,
}

impl Solution {
    pub(crate) fn from_tableau(tableau: Tableau, iterations: usize, tolerance: f64) -> Self {
        let values = tableau.values(tolerance);
        let slack = tableau.slack_values(tolerance);
        let analysis = Analysis::from_tableau(&tableau, &values, &slack, tolerance);
        Self {
            values,
            objective_value: tableau.objective_value(),
            iterations,
            slack,
            analysis,
            tableau,
        }
    }
}

impl Analysis {
    fn from_tableau(tableau: &Tableau, values: &[f64], slack: &[f64], tolerance: f64) -> Self {
        let n = tableau.num_variables();
        let costs = tableau.reduced_costs();

        // Row-0 entries of the slack columns are the duals at optimum
        let shadow_prices = (0..tableau.num_constraints())
            .map(|i| ShadowPrice {
                constraint: i,
                value: costs[n + i],
            })
            .collect();

        let reduced_costs = values
            .iter()
            .enumerate()
            .map(|(j, &value)| ReducedCost {
                variable: j,
                value,
                reduced_cost: costs[j],
                is_basic: tableau.basic_row(j + 1, tolerance).is_some(),
            })
            .collect();

        let binding_constraints = slack
            .iter()
            .enumerate()
            .filter(|(_, s)| s.abs() <= tolerance)
            .map(|(i, _)| i)
            .collect();

        Self {
            shadow_prices,
            reduced_costs,
            binding_constraints,
        }
    }
}
