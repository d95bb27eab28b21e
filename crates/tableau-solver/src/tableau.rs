use std::fmt;

use crate::error::SimplexError;
use crate::problem::LpProblem;

/// Simplex tableau of shape `(m + 1) x (n + m + 2)`.
///
/// ```text
///   [ 1  -c  0 | constant ]
///   [ 0   A  I | b        ]
/// ```
///
/// Row 0 is the objective row, column 0 the coefficient of `z`, the last column
/// the right-hand side. `n` and `m` are derived from the shape alone.
///
/// Tableaus are values: [`Tableau::pivot`] returns a new tableau and leaves the
/// receiver untouched.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct Tableau {
    data: Vec<Vec<f64>>,
}

impl Tableau {
    /// Assemble the initial tableau for `problem`, with all slacks basic.
    pub fn build(problem: &LpProblem) -> Result<Self, SimplexError> {
        problem.validate()?;

        let n = problem.num_variables();
        let m = problem.num_constraints();
        let n_cols = n + m + 2;
        let rhs_col = n_cols - 1;

        let mut data = vec![vec![0.0; n_cols]; m + 1];

        // Objective row
        data[0][0] = 1.0;
        for (j, &coef) in problem.objective.coefficients.iter().enumerate() {
            data[0][j + 1] = -coef;
        }
        data[0][rhs_col] = problem.objective.constant;

        // Constraint rows with the slack identity block
        for (i, c) in problem.constraints.iter().enumerate() {
            let row = &mut data[i + 1];
            row[1..=n].copy_from_slice(&c.coefficients);
            row[n + 1 + i] = 1.0;
            row[rhs_col] = c.rhs;
        }

        Ok(Self { data })
    }

    /// Wrap an externally produced tableau after checking its shape.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, SimplexError> {
        let Some(first) = rows.first() else {
            return Err(SimplexError::invalid("tableau has no rows"));
        };
        let n_cols = first.len();
        if n_cols < rows.len() + 1 {
            return Err(SimplexError::invalid(format!(
                "tableau with {} rows needs at least {} columns, found {}",
                rows.len(),
                rows.len() + 1,
                n_cols
            )));
        }
        if let Some(i) = rows.iter().position(|r| r.len() != n_cols) {
            return Err(SimplexError::invalid(format!(
                "tableau row {} has {} entries, expected {}",
                i,
                rows[i].len(),
                n_cols
            )));
        }
        if rows.iter().flatten().any(|v| !v.is_finite()) {
            return Err(SimplexError::invalid("tableau contains a non-finite entry"));
        }
        Ok(Self { data: rows })
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.data
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.data.get(row).and_then(|r| r.get(col)).copied()
    }

    /// Number of constraints, `m = rows - 1`.
    pub fn num_constraints(&self) -> usize {
        self.data.len() - 1
    }

    /// Number of structural variables, `n = cols - m - 2`.
    pub fn num_variables(&self) -> usize {
        self.data[0].len() - self.num_constraints() - 2
    }

    pub fn rhs_column(&self) -> usize {
        self.data[0].len() - 1
    }

    /// Current objective value, the last entry of row 0.
    pub fn objective_value(&self) -> f64 {
        self.data[0][self.rhs_column()]
    }

    /// Row-0 coefficients of columns `1..=n+m`.
    pub fn reduced_costs(&self) -> &[f64] {
        &self.data[0][1..self.rhs_column()]
    }

    /// Pivot on `(row, col)`: scale the pivot row to a leading 1, then eliminate
    /// `col` from every other row, objective row included.
    pub fn pivot(&self, row: usize, col: usize, tolerance: f64) -> Result<Tableau, SimplexError> {
        check_tolerance(tolerance)?;
        let m = self.num_constraints();
        let rhs_col = self.rhs_column();
        if row == 0 || row > m {
            return Err(SimplexError::invalid(format!(
                "pivot row {} outside constraint rows 1..={}",
                row, m
            )));
        }
        if col == 0 || col >= rhs_col {
            return Err(SimplexError::invalid(format!(
                "pivot column {} outside variable columns 1..={}",
                col,
                rhs_col - 1
            )));
        }

        let pivot_val = self.data[row][col];
        if pivot_val.abs() <= tolerance {
            return Err(SimplexError::ZeroPivot { row, col });
        }

        let pivot_row: Vec<f64> = self.data[row].iter().map(|v| v / pivot_val).collect();

        let data = self
            .data
            .iter()
            .enumerate()
            .map(|(i, r)| {
                if i == row {
                    return pivot_row.clone();
                }
                let factor = r[col];
                if factor == 0.0 {
                    return r.clone();
                }
                r.iter().zip(&pivot_row).map(|(v, p)| v - factor * p).collect()
            })
            .collect();

        Ok(Tableau { data })
    }

    /// Row holding the value of column `col` if the column is basic, see
    /// [`Tableau::basis`].
    pub fn basic_row(&self, col: usize, tolerance: f64) -> Option<usize> {
        if col == 0 || col >= self.rhs_column() {
            return None;
        }
        self.basis(tolerance)[col - 1]
    }

    /// Basic row of every variable column `1..=n+m` (entry `j - 1` is column `j`).
    ///
    /// A column is basic when it has exactly one non-zero among the constraint
    /// rows, that entry is 1, and its row-0 entry is 0. Each constraint row
    /// belongs to at most one column; the lowest column claims it.
    pub fn basis(&self, tolerance: f64) -> Vec<Option<usize>> {
        let mut claimed = vec![false; self.data.len()];
        (1..self.rhs_column())
            .map(|col| {
                let row = self.unit_row(col, tolerance)?;
                if claimed[row] {
                    return None;
                }
                claimed[row] = true;
                Some(row)
            })
            .collect()
    }

    fn unit_row(&self, col: usize, tolerance: f64) -> Option<usize> {
        if self.data[0][col].abs() > tolerance {
            return None;
        }

        let mut found = None;
        for (i, r) in self.data.iter().enumerate().skip(1) {
            if r[col].abs() > tolerance {
                if found.is_some() {
                    return None;
                }
                found = Some(i);
            }
        }

        found.filter(|&i| (self.data[i][col] - 1.0).abs() <= tolerance)
    }

    fn column_values(&self, columns: std::ops::Range<usize>, tolerance: f64) -> Vec<f64> {
        let basis = self.basis(tolerance);
        let rhs_col = self.rhs_column();
        columns
            .map(|col| match basis[col - 1] {
                Some(i) => self.data[i][rhs_col],
                None => 0.0,
            })
            .collect()
    }

    /// Current values of the structural variables; non-basic ones are 0.
    pub fn values(&self, tolerance: f64) -> Vec<f64> {
        self.column_values(1..self.num_variables() + 1, tolerance)
    }

    /// Current values of the slack variables, one per constraint.
    pub fn slack_values(&self, tolerance: f64) -> Vec<f64> {
        let n = self.num_variables();
        self.column_values(n + 1..self.rhs_column(), tolerance)
    }
}

/// Tolerances must be finite and non-negative.
pub(crate) fn check_tolerance(tolerance: f64) -> Result<(), SimplexError> {
    if tolerance.is_finite() && tolerance >= 0.0 {
        Ok(())
    } else {
        Err(SimplexError::invalid(format!(
            "tolerance must be finite and non-negative, got {}",
            tolerance
        )))
    }
}

impl TryFrom<Vec<Vec<f64>>> for Tableau {
    type Error = SimplexError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        Tableau::from_rows(rows)
    }
}

impl From<Tableau> for Vec<Vec<f64>> {
    fn from(tableau: Tableau) -> Self {
        tableau.data
    }
}

impl fmt::Display for Tableau {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rhs_col = self.rhs_column();
        for (i, row) in self.data.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "[")?;
            for (j, v) in row.iter().enumerate() {
                if j == rhs_col {
                    write!(f, " |")?;
                }
                // Adding 0.0 turns -0.0 into 0.0
                write!(f, " {:>9.4}", v + 0.0)?;
            }
            write!(f, " ]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    fn scenario_a() -> Tableau {
        let problem = LpProblem::from_matrix(
            vec![3.0, 2.0],
            vec![vec![1.0, 2.0], vec![1.0, -1.0]],
            vec![4.0, 1.0],
            0.0,
        );
        Tableau::build(&problem).unwrap()
    }

    #[test]
    fn test_build_layout() {
        let tableau = scenario_a();
        assert_eq!(
            tableau.rows(),
            &[
                vec![1.0, -3.0, -2.0, 0.0, 0.0, 0.0],
                vec![0.0, 1.0, 2.0, 1.0, 0.0, 4.0],
                vec![0.0, 1.0, -1.0, 0.0, 1.0, 1.0],
            ]
        );
        assert_eq!(tableau.num_constraints(), 2);
        assert_eq!(tableau.num_variables(), 2);
        assert_eq!(tableau.rhs_column(), 5);
        assert_eq!(tableau.objective_value(), 0.0);
        assert_eq!(tableau.reduced_costs(), &[-3.0, -2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_build_with_constant() {
        let problem = LpProblem::from_matrix(vec![1.0], vec![vec![1.0]], vec![2.0], 7.5);
        let tableau = Tableau::build(&problem).unwrap();
        assert_eq!(tableau.objective_value(), 7.5);
    }

    #[test]
    fn test_build_rejects_shape_mismatch() {
        // c has 2 entries, A has 3 columns
        let problem = LpProblem::from_matrix(
            vec![1.0, 2.0],
            vec![vec![1.0, 1.0, 1.0]],
            vec![1.0],
            0.0,
        );
        let err = Tableau::build(&problem).unwrap_err();
        assert!(matches!(err, SimplexError::InvalidInput(_)), "got {:?}", err);
    }

    #[test]
    fn test_build_rejects_negative_rhs() {
        let problem = LpProblem::from_matrix(vec![1.0], vec![vec![1.0]], vec![-1.0], 0.0);
        assert!(matches!(Tableau::build(&problem), Err(SimplexError::InvalidInput(_))));
    }

    #[test]
    fn test_initial_basis_is_slacks() {
        let tableau = scenario_a();
        assert_eq!(tableau.basic_row(1, TOL), None);
        assert_eq!(tableau.basic_row(2, TOL), None);
        assert_eq!(tableau.basic_row(3, TOL), Some(1));
        assert_eq!(tableau.basic_row(4, TOL), Some(2));
        assert_eq!(tableau.values(TOL), vec![0.0, 0.0]);
        assert_eq!(tableau.slack_values(TOL), vec![4.0, 1.0]);
    }

    #[test]
    fn test_pivot_produces_unit_column() {
        let tableau = scenario_a();
        for (row, col) in [(1, 1), (2, 1), (1, 2), (2, 2), (1, 3)] {
            let next = tableau.pivot(row, col, TOL).unwrap();
            for i in 0..next.rows().len() {
                let expected = if i == row { 1.0 } else { 0.0 };
                assert_eq!(next.get(i, col), Some(expected), "pivot ({}, {}) row {}", row, col, i);
            }
        }
    }

    #[test]
    fn test_pivot_preserves_objective_column() {
        let tableau = scenario_a();
        let next = tableau.pivot(2, 1, TOL).unwrap();
        let next = next.pivot(1, 2, TOL).unwrap();
        let column: Vec<f64> = next.rows().iter().map(|r| r[0]).collect();
        assert_eq!(column, vec![1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_pivot_leaves_input_untouched() {
        let tableau = scenario_a();
        let before = tableau.clone();
        let next = tableau.pivot(2, 1, TOL).unwrap();
        assert_eq!(tableau, before);
        assert_ne!(next, before);
        assert_eq!(
            next.rows(),
            &[
                vec![1.0, 0.0, -5.0, 0.0, 3.0, 3.0],
                vec![0.0, 0.0, 3.0, 1.0, -1.0, 3.0],
                vec![0.0, 1.0, -1.0, 0.0, 1.0, 1.0],
            ]
        );
    }

    #[test]
    fn test_pivot_scales_negative_entry() {
        let tableau = scenario_a();
        let next = tableau.pivot(2, 2, TOL).unwrap();
        assert_eq!(next.get(2, 2), Some(1.0));
        assert_eq!(next.get(2, 5), Some(-1.0));
    }

    #[test]
    fn test_zero_pivot() {
        let tableau = scenario_a();
        // slack column of row 1 is zero in row 2
        let err = tableau.pivot(2, 3, TOL).unwrap_err();
        assert_eq!(err, SimplexError::ZeroPivot { row: 2, col: 3 });
    }

    #[test]
    fn test_pivot_out_of_range() {
        let tableau = scenario_a();
        assert!(matches!(tableau.pivot(0, 1, TOL), Err(SimplexError::InvalidInput(_))));
        assert!(matches!(tableau.pivot(3, 1, TOL), Err(SimplexError::InvalidInput(_))));
        assert!(matches!(tableau.pivot(1, 0, TOL), Err(SimplexError::InvalidInput(_))));
        assert!(matches!(tableau.pivot(1, 5, TOL), Err(SimplexError::InvalidInput(_))));
    }

    #[test]
    fn test_values_after_pivots() {
        let tableau = scenario_a()
            .pivot(2, 1, TOL)
            .and_then(|t| t.pivot(1, 2, TOL))
            .unwrap();
        let values = tableau.values(TOL);
        assert!((values[0] - 2.0).abs() < 1e-9, "x1 = {}", values[0]);
        assert!((values[1] - 1.0).abs() < 1e-9, "x2 = {}", values[1]);
        assert!((tableau.objective_value() - 8.0).abs() < 1e-9);
        assert_eq!(tableau.slack_values(TOL), vec![0.0, 0.0]);
    }

    #[test]
    fn test_basic_column_tolerates_rounding() {
        let tableau = Tableau::from_rows(vec![
            vec![1.0, 0.0, 2.0, 0.0, 9.0],
            vec![0.0, 1.0 + 1e-12, 1.0, 1.0, 4.0],
            vec![0.0, 1e-13, 0.5, 0.0, 0.0],
        ])
        .unwrap();
        assert_eq!(tableau.num_variables(), 1);
        assert_eq!(tableau.basic_row(1, TOL), Some(1));
        assert_eq!(tableau.values(TOL), vec![4.0]);
    }

    #[test]
    fn test_single_nonzero_not_one_is_not_basic() {
        let tableau = Tableau::from_rows(vec![
            vec![1.0, 0.0, 0.0, 0.0, 9.0],
            vec![0.0, 2.0, 1.0, 0.0, 4.0],
            vec![0.0, 0.0, 0.0, 1.0, 3.0],
        ])
        .unwrap();
        assert_eq!(tableau.basic_row(1, TOL), None);
        assert_eq!(tableau.values(TOL), vec![0.0]);
    }

    #[test]
    fn test_from_rows_shape_checks() {
        assert!(matches!(Tableau::from_rows(Vec::new()), Err(SimplexError::InvalidInput(_))));
        assert!(matches!(
            Tableau::from_rows(vec![vec![1.0, 0.0], vec![0.0]]),
            Err(SimplexError::InvalidInput(_))
        ));
        // two rows need at least three columns
        assert!(matches!(
            Tableau::from_rows(vec![vec![1.0, 0.0], vec![0.0, 1.0]]),
            Err(SimplexError::InvalidInput(_))
        ));
        assert!(matches!(
            Tableau::from_rows(vec![vec![1.0, f64::NAN, 0.0]]),
            Err(SimplexError::InvalidInput(_))
        ));
        let tableau = Tableau::from_rows(vec![vec![1.0, -1.0, 0.0]]).unwrap();
        assert_eq!(tableau.num_constraints(), 0);
        assert_eq!(tableau.num_variables(), 1);
    }

    #[test]
    fn test_unit_column_with_cost_is_not_basic() {
        // maximize -x s.t. x <= 2: the x column equals the slack column
        let problem = LpProblem::from_matrix(vec![-1.0], vec![vec![1.0]], vec![2.0], 0.0);
        let tableau = Tableau::build(&problem).unwrap();
        assert_eq!(tableau.basic_row(1, TOL), None);
        assert_eq!(tableau.basic_row(2, TOL), Some(1));
        assert_eq!(tableau.values(TOL), vec![0.0]);
        assert_eq!(tableau.slack_values(TOL), vec![2.0]);
    }

    #[test]
    fn test_leaving_slack_is_not_basic() {
        // maximize x s.t. x <= 2, after x entered on row 1
        let problem = LpProblem::from_matrix(vec![1.0], vec![vec![1.0]], vec![2.0], 0.0);
        let tableau = Tableau::build(&problem).unwrap().pivot(1, 1, TOL).unwrap();
        assert_eq!(tableau.basis(TOL), vec![Some(1), None]);
        assert_eq!(tableau.values(TOL), vec![2.0]);
        assert_eq!(tableau.slack_values(TOL), vec![0.0]);
    }

    #[test]
    fn test_row_claimed_by_one_column() {
        // Two identical unit columns with zero cost: only the first is basic
        let tableau = Tableau::from_rows(vec![
            vec![1.0, 0.0, 0.0, 1.0, 5.0],
            vec![0.0, 1.0, 1.0, 1.0, 5.0],
        ])
        .unwrap();
        assert_eq!(tableau.num_variables(), 2);
        assert_eq!(tableau.basis(TOL), vec![Some(1), None, None]);
        assert_eq!(tableau.values(TOL), vec![5.0, 0.0]);
    }

    #[test]
    fn test_pivot_rejects_bad_tolerance() {
        let tableau = scenario_a();
        for tol in [f64::NAN, -1.0, f64::INFINITY] {
            assert!(
                matches!(tableau.pivot(2, 1, tol), Err(SimplexError::InvalidInput(_))),
                "tolerance {} accepted",
                tol
            );
        }
        // Zero pivot stays detected with a zero tolerance
        assert_eq!(
            tableau.pivot(2, 3, 0.0),
            Err(SimplexError::ZeroPivot { row: 2, col: 3 })
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_checks_shape() {
        let json = serde_json::to_string(&scenario_a()).unwrap();
        assert!(json.starts_with("[[1.0,-3.0,-2.0"), "{}", json);
        let back: Tableau = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scenario_a());

        assert!(serde_json::from_str::<Tableau>("[[1.0, 0.0], [0.0]]").is_err());
    }

    #[test]
    fn test_display() {
        let text = Tableau::from_rows(vec![vec![1.0, -0.0, 2.5]]).unwrap().to_string();
        assert_eq!(text, "[    1.0000    0.0000 |    2.5000 ]");

        let text = scenario_a().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("[    1.0000   -3.0000"), "{}", lines[0]);
        assert!(lines[1].contains("|    4.0000 ]"), "{}", lines[1]);
        assert!(!text.contains("-0.0000"));
    }
}
