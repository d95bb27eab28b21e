use log::{debug, trace};

use crate::error::SimplexError;
use crate::problem::LpProblem;
use crate::solution::Solution;
use crate::tableau::{check_tolerance, Tableau};
use crate::trajectory::PivotObserver;

/// Pivot cell: `row` is the leaving row (1..=m), `col` the entering column (1..=n+m).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pivot {
    pub row: usize,
    pub col: usize,
}

/// Tableau simplex solver for linear programs in standard form
#[derive(Debug, Clone)]
pub struct Solver {
    /// Maximum pivots before giving up
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: 10000,
            tolerance: 1e-9,
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Build the initial tableau for `problem` and optimize it.
    pub fn solve(&self, problem: &LpProblem) -> Result<Solution, SimplexError> {
        let tableau = Tableau::build(problem)?;
        self.optimize(tableau)
    }

    /// Pivot until the tableau is optimal.
    pub fn optimize(&self, tableau: Tableau) -> Result<Solution, SimplexError> {
        self.optimize_with(tableau, &mut ())
    }

    /// Like [`Solver::optimize`], reporting every tableau to `observer`.
    ///
    /// Fails with [`SimplexError::InvalidInput`] if the configured tolerance is
    /// negative or not finite.
    pub fn optimize_with<O>(&self, tableau: Tableau, observer: &mut O) -> Result<Solution, SimplexError>
    where
        O: PivotObserver + ?Sized,
    {
        check_tolerance(self.tolerance)?;
        let mut tableau = tableau;
        let mut iterations = 0;
        observer.initial(&tableau);

        loop {
            debug!("tableau {}:\n{}", iterations, tableau);

            let Some(pivot) = self.select_pivot(&tableau)? else {
                break;
            };
            if iterations >= self.max_iterations {
                debug!("not optimal after {} iterations", iterations);
                return Err(SimplexError::NonConvergence { iterations });
            }

            tableau = tableau.pivot(pivot.row, pivot.col, self.tolerance)?;
            iterations += 1;
            observer.pivoted(iterations, pivot, &tableau);
        }

        debug!(
            "optimal after {} iterations, objective {}",
            iterations,
            tableau.objective_value()
        );
        Ok(Solution::from_tableau(tableau, iterations, self.tolerance))
    }

    /// True when no reduced cost is negative, i.e. no entering variable can
    /// improve the objective.
    pub fn is_optimal(&self, tableau: &Tableau) -> bool {
        tableau.reduced_costs().iter().all(|&v| v >= -self.tolerance)
    }

    /// Choose the next pivot cell.
    ///
    /// Returns `Ok(None)` when the tableau is already optimal, and
    /// [`SimplexError::Unbounded`] when the entering column has no positive
    /// entry among the constraint rows.
    pub fn select_pivot(&self, tableau: &Tableau) -> Result<Option<Pivot>, SimplexError> {
        let Some(col) = self.entering_column(tableau) else {
            return Ok(None);
        };
        let Some(row) = self.leaving_row(tableau, col) else {
            debug!("column {} has no positive entry, problem is unbounded", col);
            return Err(SimplexError::Unbounded { column: col });
        };
        Ok(Some(Pivot { row, col }))
    }

    /// Dantzig's rule: most negative reduced cost, lowest column on ties.
    pub fn entering_column(&self, tableau: &Tableau) -> Option<usize> {
        let mut min_val = -self.tolerance;
        let mut min_col = None;

        for (j, &cost) in tableau.reduced_costs().iter().enumerate() {
            if cost < min_val {
                min_val = cost;
                min_col = Some(j + 1);
            }
        }

        if let Some(col) = min_col {
            trace!("entering column {} (reduced cost {})", col, min_val);
        }
        min_col
    }

    /// Minimum ratio test over the constraint rows, lowest row on ties.
    ///
    /// Rows whose entry in `col` is not positive get an infinite ratio and can
    /// never be chosen.
    pub fn leaving_row(&self, tableau: &Tableau, col: usize) -> Option<usize> {
        let rhs_col = tableau.rhs_column();
        let mut min_ratio = f64::INFINITY;
        let mut min_row = None;

        for (i, row) in tableau.rows().iter().enumerate().skip(1) {
            let entry = row[col];
            let ratio = if entry > self.tolerance {
                row[rhs_col].max(0.0) / entry
            } else {
                f64::INFINITY
            };
            if ratio < min_ratio {
                min_ratio = ratio;
                min_row = Some(i);
            }
        }

        if let Some(row) = min_row {
            trace!("leaving row {} (ratio {})", row, min_ratio);
        }
        min_row
    }
}
