//! End-to-end planning: instance to model, search, placement.

use crate::builder::build_model;
use crate::greedy::greedy_start;
use crate::instance::{InstanceError, ProblemInstance};
use crate::placement::Placement;
use cacheplan_solver::{BranchAndBound, MipStatus, SearchStatistics, SolverError, SolverSettings, StopReason};
use std::fmt;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum PlanError {
    #[error(transparent)]
    Instance(#[from] InstanceError),
    #[error("Solver rejected the model: {0}")]
    Solver(#[from] SolverError),
}

/// Options for [`plan`]
#[derive(Debug, Clone)]
pub struct PlanOptions {
    pub solver: SolverSettings,
    /// Seed the search with the greedy placement
    pub warm_start: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            solver: SolverSettings::default(),
            warm_start: true,
        }
    }
}

impl PlanOptions {
    pub fn with_solver(mut self, solver: SolverSettings) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_warm_start(mut self, enabled: bool) -> Self {
        self.warm_start = enabled;
        self
    }
}

/// Coarse quality of a plan
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStatus {
    /// Proven optimal
    Optimal,
    /// Feasible, with a proven gap to the optimum
    GapBounded,
    /// Nothing feasible to report; the placement is empty
    NoSolution,
}

impl From<MipStatus> for PlanStatus {
    fn from(status: MipStatus) -> Self {
        match status {
            MipStatus::Optimal => PlanStatus::Optimal,
            MipStatus::GapLimit | MipStatus::BudgetExceeded => PlanStatus::GapBounded,
            MipStatus::Infeasible | MipStatus::NoFeasibleSolutionFound => PlanStatus::NoSolution,
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PlanStatus::Optimal => "optimal",
            PlanStatus::GapBounded => "gap-bounded",
            PlanStatus::NoSolution => "no solution",
        })
    }
}

/// Everything known about a finished planning run
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct PlanReport {
    pub status: PlanStatus,
    pub mip_status: MipStatus,
    pub stop_reason: StopReason,
    /// Total latency saved by the placement; 0 without a solution
    pub objective: f64,
    /// Proven bound on the optimum; `None` when the root was never bounded
    pub best_bound: Option<f64>,
    pub gap: Option<f64>,
    pub placement: Placement,
    pub statistics: SearchStatistics,
}

impl PlanReport {
    pub fn is_optimal(&self) -> bool {
        self.status == PlanStatus::Optimal
    }
}

impl fmt::Display for PlanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status: {} ({})", self.status, self.stop_reason)?;
        writeln!(f, "Objective: {:.0}", self.objective)?;
        match self.best_bound {
            Some(bound) => writeln!(f, "Best bound: {:.2}", bound)?,
            None => writeln!(f, "Best bound: -")?,
        }
        match self.gap {
            Some(gap) => writeln!(f, "Gap: {:.4}%", gap * 100.0)?,
            None => writeln!(f, "Gap: -")?,
        }
        writeln!(f, "Caches used: {}", self.placement.num_used_caches())?;
        write!(f, "{}", self.statistics)
    }
}

/// Builds the model for `instance`, searches it and extracts the placement.
///
/// Running out of budget is not an error: the report carries the best
/// placement found together with its status and gap.
pub fn plan(instance: &ProblemInstance, options: &PlanOptions) -> Result<PlanReport, PlanError> {
    let started = Instant::now();
    let model = build_model(instance)?;
    info!(
        items = instance.num_items(),
        caches = instance.num_caches(),
        endpoints = instance.num_endpoints(),
        requests = instance.num_requests(),
        variables = model.problem().num_variables(),
        constraints = model.problem().num_constraints(),
        "planning"
    );

    let start = options.warm_start.then(|| greedy_start(instance, &model));
    let outcome = BranchAndBound::new(options.solver.clone()).solve_with_start(model.problem(), start.as_deref())?;

    let placement = outcome
        .values()
        .map(|values| Placement::from_values(&model, values))
        .unwrap_or_default();

    match outcome.status {
        MipStatus::Infeasible => warn!("model is infeasible, reporting an empty placement"),
        MipStatus::NoFeasibleSolutionFound => {
            warn!(reason = %outcome.stop_reason, "no feasible solution found, reporting an empty placement")
        }
        MipStatus::BudgetExceeded => {
            warn!(reason = %outcome.stop_reason, gap = ?outcome.gap, "search stopped before reaching the gap target")
        }
        MipStatus::Optimal | MipStatus::GapLimit => {}
    }

    let report = PlanReport {
        status: outcome.status.into(),
        mip_status: outcome.status,
        stop_reason: outcome.stop_reason,
        objective: outcome.objective().unwrap_or(0.0),
        best_bound: outcome.best_bound.is_finite().then_some(outcome.best_bound),
        gap: outcome.gap.filter(|gap| gap.is_finite()),
        placement,
        statistics: outcome.statistics,
    };

    info!(
        status = %report.status,
        objective = report.objective,
        caches = report.placement.num_used_caches(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "plan finished"
    );

    Ok(report)
}
