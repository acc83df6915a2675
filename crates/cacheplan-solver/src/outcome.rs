use crate::incumbent::Incumbent;
use crate::stats::SearchStatistics;

/// How a search ended, from the caller's point of view.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MipStatus {
    /// The tree was exhausted, or the bound met the incumbent exactly
    Optimal,
    /// The incumbent is within the configured relative gap of the bound
    GapLimit,
    /// A limit stopped the search; the incumbent is feasible but unproven
    BudgetExceeded,
    /// No integral point satisfies the constraints
    Infeasible,
    /// A limit stopped the search before any feasible solution was found
    NoFeasibleSolutionFound,
}

/// Why the search loop stopped.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Exhausted,
    GapReached,
    NodeLimit,
    TimeLimit,
    Interrupted,
    LpIterationLimit,
}

impl std::fmt::Display for MipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            MipStatus::Optimal => "optimal",
            MipStatus::GapLimit => "gap-bounded",
            MipStatus::BudgetExceeded => "budget exceeded",
            MipStatus::Infeasible => "infeasible",
            MipStatus::NoFeasibleSolutionFound => "no feasible solution found",
        };
        f.write_str(text)
    }
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            StopReason::Exhausted => "search tree exhausted",
            StopReason::GapReached => "gap target reached",
            StopReason::NodeLimit => "node limit reached",
            StopReason::TimeLimit => "time limit reached",
            StopReason::Interrupted => "interrupted",
            StopReason::LpIterationLimit => "LP iteration limit reached",
        };
        f.write_str(text)
    }
}

/// Result of a branch-and-bound run. Objective and bound are in the model's
/// own sense.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct MipOutcome {
    pub status: MipStatus,
    pub stop_reason: StopReason,
    /// Best integral solution found, if any
    pub solution: Option<Incumbent>,
    /// Best proven bound on the optimal objective
    pub best_bound: f64,
    /// Relative gap between bound and incumbent, when an incumbent exists
    pub gap: Option<f64>,
    pub statistics: SearchStatistics,
}

impl MipOutcome {
    pub fn objective(&self) -> Option<f64> {
        self.solution.as_ref().map(Incumbent::objective)
    }

    pub fn values(&self) -> Option<&[f64]> {
        self.solution.as_ref().map(Incumbent::values)
    }

    pub fn has_solution(&self) -> bool {
        self.solution.is_some()
    }
}

/// `(bound - incumbent) / max(1, |incumbent|)`, never negative.
pub fn relative_gap(bound: f64, incumbent: f64) -> f64 {
    let diff = bound - incumbent;
    if diff.is_nan() || diff <= 0.0 {
        return 0.0;
    }
    diff / incumbent.abs().max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_gap() {
        assert_eq!(relative_gap(100.0, 100.0), 0.0);
        assert!((relative_gap(101.0, 100.0) - 0.01).abs() < 1e-12);
        // Small incumbents are measured against 1
        assert_eq!(relative_gap(0.5, 0.0), 0.5);
        assert_eq!(relative_gap(f64::INFINITY, 10.0), f64::INFINITY);
        assert_eq!(relative_gap(90.0, 100.0), 0.0);
    }

    #[test]
    fn test_status_display() {
        assert_eq!(MipStatus::GapLimit.to_string(), "gap-bounded");
        assert_eq!(StopReason::NodeLimit.to_string(), "node limit reached");
    }
}
