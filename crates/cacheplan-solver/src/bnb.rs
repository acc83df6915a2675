//! Best-bound branch-and-bound over the binary variables of a [`MipProblem`].
//!
//! Each node is bounded by the LP relaxation of the base model under the
//! node's fixings. Nodes whose bound cannot beat the incumbent are pruned,
//! integral relaxations become incumbent candidates, and everything else is
//! split on the most fractional binary of the highest priority class.
//!
//! Workers share one frontier (a max-heap on the inherited bound, guarded by a
//! `Mutex` with a `Condvar` for idle workers) and one [`SharedIncumbent`].
//! Budgets, the gap target and the interrupt flag are checked each time a node
//! is dequeued. With a single worker the search is fully deterministic.

use crate::error::SolverError;
use crate::incumbent::{Incumbent, SharedIncumbent};
use crate::node::{Fixing, NodeState, SearchNode};
use crate::outcome::{MipOutcome, MipStatus, StopReason, relative_gap};
use crate::problem::{MipProblem, VarBounds};
use crate::settings::SolverSettings;
use crate::simplex;
use crate::solution::SolutionStatus;
use crate::stats::SearchStatistics;
use std::collections::BinaryHeap;
use std::sync::atomic::Ordering;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, info, trace, warn};

/// Bounds within this distance of the incumbent cannot improve it.
const OBJECTIVE_EPS: f64 = 1e-6;

/// Branch-and-bound solver for 0/1 mixed integer models
pub struct BranchAndBound {
    settings: SolverSettings,
}

impl Default for BranchAndBound {
    fn default() -> Self {
        Self::new(SolverSettings::default())
    }
}

impl BranchAndBound {
    pub fn new(settings: SolverSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    /// Solve `problem` from scratch.
    pub fn solve(&self, problem: &MipProblem) -> Result<MipOutcome, SolverError> {
        self.solve_with_start(problem, None)
    }

    /// Solve `problem`, seeding the incumbent with `start` when given.
    ///
    /// The start must assign every variable and satisfy every constraint;
    /// anything else is rejected rather than silently ignored.
    pub fn solve_with_start(&self, problem: &MipProblem, start: Option<&[f64]>) -> Result<MipOutcome, SolverError> {
        problem.validate()?;

        let sign = if problem.objective.minimize { -1.0 } else { 1.0 };
        let model = problem.to_maximization();
        let lp = simplex::Solver::new()
            .with_max_iterations(self.settings.max_lp_iterations)
            .with_snap_tolerance(self.settings.integrality_tolerance);

        let search = Search::new(&model, &self.settings, lp);
        if let Some(values) = start {
            search.install_start(values)?;
        }

        info!(
            variables = model.num_variables(),
            constraints = model.num_constraints(),
            gap_tolerance = self.settings.gap_tolerance,
            threads = self.settings.threads,
            "starting branch-and-bound"
        );

        let workers = self.settings.threads.max(1);
        if workers == 1 {
            search.worker();
        } else {
            std::thread::scope(|scope| {
                for _ in 0..workers {
                    scope.spawn(|| search.worker());
                }
            });
        }

        search.finish(sign)
    }
}

struct Search<'a> {
    model: &'a MipProblem,
    base_bounds: Vec<VarBounds>,
    settings: &'a SolverSettings,
    lp: simplex::Solver,
    incumbent: SharedIncumbent,
    frontier: Mutex<Frontier>,
    wakeup: Condvar,
    started: Instant,
}

struct Frontier {
    open: BinaryHeap<SearchNode>,
    /// Nodes handed to a worker and not yet completed, with their bounds
    in_flight: Vec<(u64, f64)>,
    next_id: u64,
    dispatched: u64,
    stop: Option<StopReason>,
    error: Option<SolverError>,
    stats: SearchStatistics,
}

enum NodeReport {
    Infeasible,
    Dominated { bound: f64 },
    Branch { bound: f64, var: usize },
    Integral { bound: f64, solution: Incumbent },
    LpLimit,
    Failed(SolverError),
}

impl<'a> Search<'a> {
    fn new(model: &'a MipProblem, settings: &'a SolverSettings, lp: simplex::Solver) -> Self {
        let mut open = BinaryHeap::new();
        open.push(SearchNode::root());
        Self {
            model,
            base_bounds: model.bounds(),
            settings,
            lp,
            incumbent: SharedIncumbent::new(),
            frontier: Mutex::new(Frontier {
                open,
                in_flight: Vec::new(),
                next_id: 1,
                dispatched: 0,
                stop: None,
                error: None,
                stats: SearchStatistics::default(),
            }),
            wakeup: Condvar::new(),
            started: Instant::now(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Frontier> {
        self.frontier.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn install_start(&self, values: &[f64]) -> Result<(), SolverError> {
        if values.len() != self.model.num_variables() {
            return Err(SolverError::StartLength {
                expected: self.model.num_variables(),
                found: values.len(),
            });
        }

        let violations = self
            .model
            .find_violations(values, self.settings.integrality_tolerance);
        if let Some(worst) = violations.first() {
            return Err(SolverError::InfeasibleStart(worst.description.clone()));
        }

        let values = self.round_integral(values);
        let objective = self.model.evaluate(&values);
        if self.incumbent.try_install(Incumbent::new(values, objective)) {
            self.lock().stats.on_incumbent_update();
            debug!(objective, "installed initial solution");
        }
        Ok(())
    }

    fn worker(&self) {
        while let Some(mut node) = self.next_node() {
            let (report, iterations) = self.bound_node(&mut node);
            trace!(node = node.id, depth = node.depth, state = ?node.state, "node processed");
            self.complete(node, report, iterations);
        }
    }

    /// Dequeues the next node worth bounding, or `None` once the search stops.
    fn next_node(&self) -> Option<SearchNode> {
        let mut frontier = self.lock();
        loop {
            if frontier.stop.is_some() || frontier.error.is_some() {
                return None;
            }

            if frontier.open.is_empty() {
                if frontier.in_flight.is_empty() {
                    frontier.stop = Some(StopReason::Exhausted);
                    self.wakeup.notify_all();
                    return None;
                }
                frontier = self
                    .wakeup
                    .wait(frontier)
                    .unwrap_or_else(PoisonError::into_inner);
                continue;
            }

            if let Some(reason) = self.budget_exhausted(&frontier) {
                info!(%reason, "stopping search");
                frontier.stop = Some(reason);
                self.wakeup.notify_all();
                return None;
            }

            let Some(node) = frontier.open.pop() else {
                continue;
            };

            let best = self.incumbent.best_objective();
            if node.bound <= best + OBJECTIVE_EPS {
                frontier.stats.on_pruning_bound();
                continue;
            }

            if self.incumbent.is_set() {
                let bound = frontier
                    .in_flight
                    .iter()
                    .map(|&(_, b)| b)
                    .fold(node.bound, f64::max);
                if relative_gap(bound, best) <= self.settings.gap_tolerance {
                    frontier.open.push(node);
                    frontier.stop = Some(StopReason::GapReached);
                    self.wakeup.notify_all();
                    return None;
                }
            }

            frontier.in_flight.push((node.id, node.bound));
            frontier.dispatched += 1;
            return Some(node);
        }
    }

    fn budget_exhausted(&self, frontier: &Frontier) -> Option<StopReason> {
        if let Some(flag) = &self.settings.interrupt {
            if flag.load(Ordering::Relaxed) {
                return Some(StopReason::Interrupted);
            }
        }
        if let Some(limit) = self.settings.node_limit {
            if frontier.dispatched >= limit {
                return Some(StopReason::NodeLimit);
            }
        }
        if let Some(limit) = self.settings.time_limit {
            if self.started.elapsed() >= limit {
                return Some(StopReason::TimeLimit);
            }
        }
        None
    }

    /// Solves the node relaxation and classifies the node. Runs unlocked.
    fn bound_node(&self, node: &mut SearchNode) -> (NodeReport, usize) {
        let bounds = node.restrict(&self.base_bounds);
        let relaxation = self.lp.solve_with_bounds(self.model, &bounds);
        let iterations = relaxation.iterations;

        match relaxation.status {
            SolutionStatus::Optimal => {}
            SolutionStatus::Infeasible => {
                node.state = NodeState::Pruned;
                return (NodeReport::Infeasible, iterations);
            }
            SolutionStatus::Unbounded => {
                return (NodeReport::Failed(SolverError::UnboundedRelaxation), iterations);
            }
            SolutionStatus::IterationLimit => return (NodeReport::LpLimit, iterations),
        }

        node.state = NodeState::Bounded;
        let bound = relaxation.objective_value;

        if bound <= self.incumbent.best_objective() + OBJECTIVE_EPS {
            node.state = NodeState::Pruned;
            return (NodeReport::Dominated { bound }, iterations);
        }

        if let Some(var) = self.select_branching_variable(&relaxation.values) {
            node.state = NodeState::Branched;
            return (NodeReport::Branch { bound, var }, iterations);
        }

        let values = self.round_integral(&relaxation.values);
        let violations = self
            .model
            .find_violations(&values, self.settings.integrality_tolerance);
        if let Some(worst) = violations.first() {
            warn!(node = node.id, violation = %worst.description, "rounded relaxation is infeasible");
            node.state = NodeState::Pruned;
            return (NodeReport::Infeasible, iterations);
        }

        let objective = self.model.evaluate(&values);
        node.state = NodeState::IntegralFeasible;
        (
            NodeReport::Integral {
                bound,
                solution: Incumbent::new(values, objective),
            },
            iterations,
        )
    }

    /// Most fractional binary in the highest priority class; ties go to the
    /// lowest variable index.
    fn select_branching_variable(&self, values: &[f64]) -> Option<usize> {
        let tol = self.settings.integrality_tolerance;
        let mut best: Option<(usize, u32, f64)> = None;

        for (j, var) in self.model.variables.iter().enumerate() {
            if !var.is_binary() {
                continue;
            }
            let x = values[j];
            if (x - x.round()).abs() <= tol {
                continue;
            }
            let distance = (x - x.floor() - 0.5).abs();
            let better = match best {
                None => true,
                Some((_, priority, d)) => {
                    var.branch_priority > priority || (var.branch_priority == priority && distance < d)
                }
            };
            if better {
                best = Some((j, var.branch_priority, distance));
            }
        }

        best.map(|(j, _, _)| j)
    }

    fn round_integral(&self, values: &[f64]) -> Vec<f64> {
        self.model
            .variables
            .iter()
            .zip(values)
            .map(|(var, &x)| if var.is_binary() { x.round() } else { x })
            .collect()
    }

    fn complete(&self, node: SearchNode, report: NodeReport, iterations: usize) {
        let mut frontier = self.lock();
        frontier.in_flight.retain(|&(id, _)| id != node.id);
        frontier.stats.on_node_explored(node.depth, iterations);

        match report {
            NodeReport::Infeasible => frontier.stats.on_pruning_infeasible(),
            NodeReport::Dominated { bound } => {
                if node.id == 0 {
                    frontier.stats.set_root_bound(bound);
                }
                frontier.stats.on_pruning_bound();
            }
            NodeReport::Branch { bound, var } => {
                if node.id == 0 {
                    frontier.stats.set_root_bound(bound);
                }
                frontier.stats.on_branching();
                for value in [true, false] {
                    let id = frontier.next_id;
                    frontier.next_id += 1;
                    frontier.open.push(node.child(id, bound, Fixing { var, value }));
                }
            }
            NodeReport::Integral { bound, solution } => {
                if node.id == 0 {
                    frontier.stats.set_root_bound(bound);
                }
                frontier.stats.on_integral_node();
                let objective = solution.objective();
                if self.incumbent.try_install(solution) {
                    frontier.stats.on_incumbent_update();
                    debug!(objective, node = node.id, depth = node.depth, "new incumbent");
                }
            }
            NodeReport::LpLimit => {
                warn!(node = node.id, iterations, "LP iteration limit hit");
                frontier.open.push(node);
                if frontier.stop.is_none() {
                    frontier.stop = Some(StopReason::LpIterationLimit);
                }
            }
            NodeReport::Failed(error) => {
                if frontier.error.is_none() {
                    frontier.error = Some(error);
                }
            }
        }

        let interval = self.settings.log_interval;
        if interval > 0 && frontier.stats.nodes_explored % interval == 0 {
            self.log_progress(&frontier);
        }

        self.wakeup.notify_all();
    }

    fn global_bound(&self, frontier: &Frontier) -> f64 {
        let best = self.incumbent.best_objective();
        let open = frontier.open.peek().map_or(f64::NEG_INFINITY, |n| n.bound);
        frontier
            .in_flight
            .iter()
            .map(|&(_, b)| b)
            .fold(open.max(best), f64::max)
    }

    fn log_progress(&self, frontier: &Frontier) {
        let best = self.incumbent.best_objective();
        let bound = self.global_bound(frontier);
        info!(
            nodes = frontier.stats.nodes_explored,
            open = frontier.open.len(),
            incumbent = best,
            bound,
            gap = relative_gap(bound, best),
            elapsed = ?self.started.elapsed(),
            "search progress"
        );
    }

    fn finish(self, sign: f64) -> Result<MipOutcome, SolverError> {
        let bound = {
            let frontier = self.lock();
            self.global_bound(&frontier)
        };
        let frontier = self
            .frontier
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(error) = frontier.error {
            return Err(error);
        }

        let mut statistics = frontier.stats;
        statistics.set_total_time(self.started.elapsed());
        statistics.root_bound = statistics.root_bound.map(|b| sign * b);

        let stop_reason = frontier.stop.unwrap_or(StopReason::Exhausted);
        let solution = self.incumbent.into_inner();

        let status = match (stop_reason, &solution) {
            (StopReason::Exhausted, Some(_)) => MipStatus::Optimal,
            (StopReason::Exhausted, None) => MipStatus::Infeasible,
            (StopReason::GapReached, Some(s)) if bound - s.objective() <= OBJECTIVE_EPS => MipStatus::Optimal,
            (StopReason::GapReached, Some(_)) => MipStatus::GapLimit,
            (_, Some(_)) => MipStatus::BudgetExceeded,
            (_, None) => MipStatus::NoFeasibleSolutionFound,
        };

        let gap = solution.as_ref().map(|s| relative_gap(bound, s.objective()));
        let solution = if sign < 0.0 { solution.map(Incumbent::negated) } else { solution };
        let best_bound = sign * bound;

        match status {
            MipStatus::NoFeasibleSolutionFound => {
                warn!(reason = %stop_reason, "search stopped without a feasible solution")
            }
            MipStatus::Infeasible => warn!("model has no feasible integral solution"),
            _ => {}
        }
        info!(
            %status,
            reason = %stop_reason,
            objective = ?solution.as_ref().map(Incumbent::objective),
            best_bound,
            gap = ?gap,
            nodes = statistics.nodes_explored,
            "branch-and-bound finished"
        );

        Ok(MipOutcome {
            status,
            stop_reason,
            solution,
            best_bound,
            gap,
            statistics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{ConstraintOp, Variable};
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;

    /// max sum(v_i x_i) subject to sum(w_i x_i) <= capacity, x binary
    fn knapsack(values: &[f64], weights: &[f64], capacity: f64) -> MipProblem {
        let mut problem = MipProblem::new();
        let mut terms = Vec::new();
        for (i, (&v, &w)) in values.iter().zip(weights).enumerate() {
            let var = problem.add_variable(Variable::binary(format!("x{}", i)));
            problem.set_objective_coefficient(var, v);
            terms.push((var, w));
        }
        problem.add_constraint("capacity", terms, ConstraintOp::Le, capacity);
        problem
    }

    fn exact() -> SolverSettings {
        SolverSettings::default().with_gap_tolerance(0.0)
    }

    #[test]
    fn test_small_knapsack_is_solved_to_optimality() {
        // Relaxation takes item 0 and 3/4 of another; the integral optimum is items 1 and 2
        let problem = knapsack(&[10.0, 7.0, 7.0], &[5.0, 4.0, 4.0], 8.0);
        let outcome = BranchAndBound::new(exact()).solve(&problem).unwrap();

        assert_eq!(outcome.status, MipStatus::Optimal);
        assert_eq!(outcome.stop_reason, StopReason::Exhausted);
        assert_eq!(outcome.objective(), Some(14.0));
        assert_eq!(outcome.values().unwrap(), &[0.0, 1.0, 1.0]);
        assert_eq!(outcome.gap, Some(0.0));
        assert!(outcome.statistics.branchings >= 1);
        let root = outcome.statistics.root_bound.unwrap();
        assert!((root - 15.25).abs() < 1e-6);
    }

    #[test]
    fn test_minimization_is_reported_in_model_sense() {
        // min 3a + 2b subject to a + b >= 1
        let mut problem = MipProblem::new();
        problem.add_variable(Variable::binary("a"));
        problem.add_variable(Variable::binary("b"));
        problem.set_objective(vec![3.0, 2.0], true);
        problem.add_constraint("cover", vec![(0, 1.0), (1, 1.0)], ConstraintOp::Ge, 1.0);

        let outcome = BranchAndBound::new(exact()).solve(&problem).unwrap();

        assert_eq!(outcome.status, MipStatus::Optimal);
        assert_eq!(outcome.objective(), Some(2.0));
        assert_eq!(outcome.values().unwrap(), &[0.0, 1.0]);
        assert!((outcome.best_bound - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_infeasible_model() {
        let mut problem = MipProblem::new();
        problem.add_variable(Variable::binary("a"));
        problem.set_objective(vec![1.0], false);
        problem.add_constraint("impossible", vec![(0, 1.0)], ConstraintOp::Ge, 2.0);

        let outcome = BranchAndBound::default().solve(&problem).unwrap();

        assert_eq!(outcome.status, MipStatus::Infeasible);
        assert!(outcome.solution.is_none());
        assert!(outcome.gap.is_none());
    }

    #[test]
    fn test_integral_only_after_branching() {
        // x + y <= 1.5 with x, y binary: relaxation is fractional, optimum picks one
        let mut problem = MipProblem::new();
        problem.add_variable(Variable::binary("x"));
        problem.add_variable(Variable::binary("y"));
        problem.set_objective(vec![2.0, 2.0], false);
        problem.add_constraint("half", vec![(0, 1.0), (1, 1.0)], ConstraintOp::Le, 1.5);

        let outcome = BranchAndBound::new(exact()).solve(&problem).unwrap();

        assert_eq!(outcome.status, MipStatus::Optimal);
        assert_eq!(outcome.objective(), Some(2.0));
        assert!(outcome.statistics.pruned_bound + outcome.statistics.integral_nodes >= 2);
    }

    #[test]
    fn test_node_limit_without_incumbent() {
        let problem = knapsack(&[10.0, 7.0, 7.0], &[5.0, 4.0, 4.0], 8.0);
        let settings = exact().with_node_limit(0);
        let outcome = BranchAndBound::new(settings).solve(&problem).unwrap();

        assert_eq!(outcome.status, MipStatus::NoFeasibleSolutionFound);
        assert_eq!(outcome.stop_reason, StopReason::NodeLimit);
        assert!(outcome.solution.is_none());
        assert_eq!(outcome.statistics.nodes_explored, 0);
    }

    #[test]
    fn test_node_limit_keeps_initial_solution() {
        let problem = knapsack(&[10.0, 7.0, 7.0], &[5.0, 4.0, 4.0], 8.0);
        let settings = exact().with_node_limit(1);
        let outcome = BranchAndBound::new(settings)
            .solve_with_start(&problem, Some(&[1.0, 0.0, 0.0]))
            .unwrap();

        assert_eq!(outcome.status, MipStatus::BudgetExceeded);
        assert_eq!(outcome.objective(), Some(10.0));
        assert!(outcome.gap.unwrap() > 0.0);
        assert!(outcome.best_bound >= 14.0 - 1e-9);
    }

    #[test]
    fn test_time_limit_stops_search() {
        let problem = knapsack(&[10.0, 7.0, 7.0], &[5.0, 4.0, 4.0], 8.0);
        let settings = exact().with_time_limit(Duration::ZERO);

        let outcome = BranchAndBound::new(settings.clone()).solve(&problem).unwrap();
        assert_eq!(outcome.stop_reason, StopReason::TimeLimit);
        assert_eq!(outcome.status, MipStatus::NoFeasibleSolutionFound);
        assert!(!outcome.has_solution());
        assert_eq!(outcome.statistics.nodes_explored, 0);

        let outcome = BranchAndBound::new(settings)
            .solve_with_start(&problem, Some(&[1.0, 0.0, 0.0]))
            .unwrap();
        assert_eq!(outcome.stop_reason, StopReason::TimeLimit);
        assert_eq!(outcome.status, MipStatus::BudgetExceeded);
        assert!(outcome.has_solution());
        assert_eq!(outcome.objective(), Some(10.0));
    }

    #[test]
    fn test_lp_iteration_limit_keeps_incumbent() {
        let problem = knapsack(&[10.0, 7.0, 7.0], &[5.0, 4.0, 4.0], 8.0);
        let settings = exact().with_max_lp_iterations(0);
        let outcome = BranchAndBound::new(settings)
            .solve_with_start(&problem, Some(&[1.0, 0.0, 0.0]))
            .unwrap();

        assert_eq!(outcome.status, MipStatus::BudgetExceeded);
        assert_eq!(outcome.stop_reason, StopReason::LpIterationLimit);
        assert_eq!(outcome.objective(), Some(10.0));
        assert_eq!(outcome.values(), Some(&[1.0, 0.0, 0.0][..]));
    }

    #[test]
    fn test_interrupt_flag_stops_search() {
        let problem = knapsack(&[10.0, 7.0, 7.0], &[5.0, 4.0, 4.0], 8.0);
        let flag = Arc::new(AtomicBool::new(true));
        let settings = exact().with_interrupt(Arc::clone(&flag));
        let outcome = BranchAndBound::new(settings).solve(&problem).unwrap();

        assert_eq!(outcome.stop_reason, StopReason::Interrupted);
        assert_eq!(outcome.status, MipStatus::NoFeasibleSolutionFound);
    }

    #[test]
    fn test_infeasible_start_is_rejected() {
        let problem = knapsack(&[10.0, 7.0, 7.0], &[5.0, 4.0, 4.0], 8.0);
        let result = BranchAndBound::default().solve_with_start(&problem, Some(&[1.0, 1.0, 1.0]));
        assert!(matches!(result, Err(SolverError::InfeasibleStart(_))));

        let result = BranchAndBound::default().solve_with_start(&problem, Some(&[1.0]));
        assert_eq!(
            result.unwrap_err(),
            SolverError::StartLength { expected: 3, found: 1 }
        );
    }

    #[test]
    fn test_gap_target_stops_early() {
        // Root bound is 15.25 and the start is worth 14: within a 10% gap after the root
        let problem = knapsack(&[10.0, 7.0, 7.0], &[5.0, 4.0, 4.0], 8.0);
        let settings = SolverSettings::default().with_gap_tolerance(0.1);
        let outcome = BranchAndBound::new(settings)
            .solve_with_start(&problem, Some(&[0.0, 1.0, 1.0]))
            .unwrap();

        assert_eq!(outcome.status, MipStatus::GapLimit);
        assert_eq!(outcome.stop_reason, StopReason::GapReached);
        assert_eq!(outcome.objective(), Some(14.0));
        assert_eq!(outcome.statistics.nodes_explored, 1);
        let gap = outcome.gap.unwrap();
        assert!((gap - 1.25 / 14.0).abs() < 1e-6, "gap = {}", gap);
    }

    #[test]
    fn test_unbounded_relaxation_is_an_error() {
        let mut problem = MipProblem::new();
        problem.add_variable(Variable::continuous("x", 0.0, f64::INFINITY));
        problem.set_objective(vec![1.0], false);

        let result = BranchAndBound::default().solve(&problem);
        assert_eq!(result.unwrap_err(), SolverError::UnboundedRelaxation);
    }

    #[test]
    fn test_parallel_search_matches_serial_objective() {
        let values = [12.0, 11.0, 9.0, 8.0, 7.0, 6.0, 5.0, 3.0];
        let weights = [7.0, 6.0, 5.0, 5.0, 4.0, 3.0, 3.0, 2.0];
        let problem = knapsack(&values, &weights, 15.0);

        let serial = BranchAndBound::new(exact()).solve(&problem).unwrap();
        let parallel = BranchAndBound::new(exact().with_threads(4)).solve(&problem).unwrap();

        assert_eq!(serial.status, MipStatus::Optimal);
        assert_eq!(parallel.status, MipStatus::Optimal);
        assert_eq!(serial.objective(), parallel.objective());
    }

    #[test]
    fn test_serial_search_is_deterministic() {
        let values = [12.0, 11.0, 9.0, 8.0, 7.0, 6.0, 5.0, 3.0];
        let weights = [7.0, 6.0, 5.0, 5.0, 4.0, 3.0, 3.0, 2.0];
        let problem = knapsack(&values, &weights, 15.0);

        let first = BranchAndBound::new(exact()).solve(&problem).unwrap();
        let second = BranchAndBound::new(exact()).solve(&problem).unwrap();

        assert_eq!(first.values(), second.values());
        assert_eq!(first.statistics.nodes_explored, second.statistics.nodes_explored);
    }
}
