//! Tableau (dictionary) simplex method for small linear programs in standard form:
//!
//! ```text
//!   maximize   c'x + constant
//!   subject to Ax <= b,  x >= 0,  b >= 0
//! ```
//!
//! ```
//! use tableau_solver::{LpProblem, Solver};
//!
//! let problem = LpProblem::from_matrix(
//!     vec![3.0, 2.0],
//!     vec![vec![1.0, 2.0], vec![1.0, -1.0]],
//!     vec![4.0, 1.0],
//!     0.0,
//! );
//! let solution = Solver::new().solve(&problem).unwrap();
//! assert!((solution.objective_value - 8.0).abs() < 1e-9);
//! ```

mod error;
mod problem;
mod simplex;
mod solution;
mod tableau;
mod trajectory;

pub use error::SimplexError;
pub use problem::{Constraint, LpProblem, Objective};
pub use simplex::{Pivot, Solver};
pub use solution::{Analysis, ReducedCost, ShadowPrice, Solution};
pub use tableau::Tableau;
pub use trajectory::{PivotObserver, Trajectory, Vertex};
