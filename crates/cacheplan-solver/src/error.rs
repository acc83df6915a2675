use thiserror::Error;

/// Errors raised when a model handed to the engine is malformed.
///
/// Search outcomes such as infeasibility or an exhausted budget are not errors;
/// they are reported through [`crate::MipStatus`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Objective has {found} coefficients but the model has {expected} variables")]
    ObjectiveLength { expected: usize, found: usize },
    #[error("Constraint {constraint} references unknown variable {index}")]
    UnknownVariable { constraint: String, index: usize },
    #[error("Variable {variable} has invalid bounds [{lower}, {upper}]")]
    InvalidBounds {
        variable: String,
        lower: f64,
        upper: f64,
    },
    #[error("Initial solution has {found} values but the model has {expected} variables")]
    StartLength { expected: usize, found: usize },
    #[error("Initial solution is not feasible: {0}")]
    InfeasibleStart(String),
    #[error("LP relaxation is unbounded")]
    UnboundedRelaxation,
}
