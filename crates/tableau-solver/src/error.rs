use thiserror::Error;

/// Failures reported by the tableau builder, the pivot step and the optimizer.
///
/// All of them are recoverable from the caller's side: the inputs can be
/// corrected, or the problem abandoned. None of them is ever turned into a
/// NaN or infinite entry in a returned solution.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimplexError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Zero pivot at row {row}, column {col}")]
    ZeroPivot { row: usize, col: usize },
    #[error("Problem is unbounded: column {column} has no positive entry in any constraint row")]
    Unbounded { column: usize },
    #[error("No optimal tableau reached within {iterations} iterations")]
    NonConvergence { iterations: usize },
}

impl SimplexError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        SimplexError::InvalidInput(message.into())
    }
}
