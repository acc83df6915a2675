mod bnb;
mod error;
mod incumbent;
pub mod mps;
mod node;
mod outcome;
mod problem;
mod settings;
mod simplex;
mod solution;
mod stats;

pub use bnb::BranchAndBound;
pub use error::SolverError;
pub use incumbent::{Incumbent, SharedIncumbent};
pub use node::{Fixing, NodeState, SearchNode};
pub use outcome::{MipOutcome, MipStatus, StopReason, relative_gap};
pub use problem::{Constraint, ConstraintOp, MipProblem, Objective, VarBounds, VarKind, Variable};
pub use settings::SolverSettings;
pub use simplex::Solver;
pub use solution::{ConstraintViolation, Solution, SolutionStatus};
pub use stats::SearchStatistics;
