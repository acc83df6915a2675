use crate::problem::{ConstraintOp, MipProblem, VarBounds};
use crate::solution::{Solution, SolutionStatus};

/// Two-phase simplex solver for the continuous relaxation of a model.
///
/// Variable bounds are handled by substitution: every variable is shifted by
/// its lower bound, variables whose bounds coincide are folded into the
/// right-hand sides, and the remaining finite upper bounds become explicit
/// rows. The base model is only read, so one model can be solved under many
/// different bound sets concurrently.
pub struct Solver {
    /// Maximum pivots (both phases) before giving up
    max_iterations: usize,
    /// Tolerance for pivot and reduced cost comparisons
    tolerance: f64,
    /// Values this close to a bound are reported as exactly that bound
    snap_tolerance: f64,
    /// Consecutive degenerate pivots before switching to Bland's rule
    bland_after: usize,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: 50_000,
            tolerance: 1e-9,
            snap_tolerance: 1e-6,
            bland_after: 50,
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

    pub fn with_snap_tolerance(mut self, tol: f64) -> Self {
        self.snap_tolerance = tol;
        self
    }

    /// Solve the relaxation under the bounds declared on the variables
    pub fn solve(&self, problem: &MipProblem) -> Solution {
        self.solve_with_bounds(problem, &problem.bounds())
    }

    /// Solve the relaxation with `bounds` replacing the declared variable bounds.
    ///
    /// `bounds` must hold one entry per model variable.
    pub fn solve_with_bounds(&self, problem: &MipProblem, bounds: &[VarBounds]) -> Solution {
        debug_assert_eq!(bounds.len(), problem.num_variables());

        if bounds.iter().any(|b| b.lower > b.upper + self.snap_tolerance) {
            return Solution::infeasible(0);
        }

        let Some(mut tableau) = self.build_tableau(problem, bounds) else {
            return Solution::infeasible(0);
        };

        let mut iterations = 0;

        // Phase 1: Find initial basic feasible solution
        if tableau.n_artificial > 0 {
            match self.phase1(&mut tableau, &mut iterations) {
                PhaseOne::Feasible => {}
                PhaseOne::Infeasible => return Solution::infeasible(iterations),
                PhaseOne::IterationLimit => return Solution::iteration_limit(iterations),
            }
        }

        // Phase 2: Optimize over structural and slack columns only
        let exclude_from = tableau.artificial_start();
        match self.iterate(&mut tableau, exclude_from, &mut iterations) {
            SimplexResult::Optimal => {}
            SimplexResult::Unbounded => return Solution::unbounded(iterations),
            SimplexResult::IterationLimit => return Solution::iteration_limit(iterations),
        }

        self.extract_solution(&tableau, problem, bounds, iterations)
    }

    /// Returns `None` when a row without free variables is already violated.
    fn build_tableau(&self, problem: &MipProblem, bounds: &[VarBounds]) -> Option<Tableau> {
        let n_vars = problem.num_variables();

        // Map free model variables to structural columns
        let mut column_of = vec![None; n_vars];
        let mut columns = Vec::new();
        for (j, b) in bounds.iter().enumerate() {
            if b.upper - b.lower > self.snap_tolerance {
                column_of[j] = Some(columns.len());
                columns.push(j);
            }
        }

        let mut rows: Vec<Row> = Vec::with_capacity(problem.num_constraints() + columns.len());
        for c in &problem.constraints {
            let mut rhs = c.rhs;
            let mut coefficients = Vec::with_capacity(c.terms.len());
            for &(j, coef) in &c.terms {
                rhs -= coef * bounds[j].lower;
                if let Some(col) = column_of[j] {
                    if coef != 0.0 {
                        coefficients.push((col, coef));
                    }
                }
            }

            if coefficients.is_empty() {
                let satisfied = match c.op {
                    ConstraintOp::Le => rhs >= -self.snap_tolerance,
                    ConstraintOp::Ge => rhs <= self.snap_tolerance,
                    ConstraintOp::Eq => rhs.abs() <= self.snap_tolerance,
                };
                if !satisfied {
                    return None;
                }
                continue;
            }

            rows.push(Row {
                coefficients,
                op: c.op,
                rhs,
            });
        }

        for (col, &j) in columns.iter().enumerate() {
            let range = bounds[j].upper - bounds[j].lower;
            if range.is_finite() {
                rows.push(Row {
                    coefficients: vec![(col, 1.0)],
                    op: ConstraintOp::Le,
                    rhs: range,
                });
            }
        }

        // RHS (ensure non-negative)
        for row in &mut rows {
            if row.rhs < 0.0 {
                row.rhs = -row.rhs;
                for (_, coef) in &mut row.coefficients {
                    *coef = -*coef;
                }
                row.op = match row.op {
                    ConstraintOp::Le => ConstraintOp::Ge,
                    ConstraintOp::Ge => ConstraintOp::Le,
                    ConstraintOp::Eq => ConstraintOp::Eq,
                };
            }
        }

        // Count slack and artificial variables needed
        let mut n_slack = 0;
        let mut n_artificial = 0;
        for row in &rows {
            match row.op {
                ConstraintOp::Le => n_slack += 1,
                ConstraintOp::Ge => {
                    n_slack += 1; // surplus
                    n_artificial += 1;
                }
                ConstraintOp::Eq => n_artificial += 1,
            }
        }

        let n_structural = columns.len();
        let total_cols = n_structural + n_slack + n_artificial + 1; // +1 for RHS
        let n_rows = rows.len();

        let mut tableau = Tableau {
            data: vec![vec![0.0; total_cols]; n_rows + 1],
            basic_vars: vec![0; n_rows],
            columns,
            n_slack,
            n_artificial,
        };

        let mut slack_idx = n_structural;
        let mut artificial_idx = n_structural + n_slack;

        for (i, row) in rows.iter().enumerate() {
            for &(col, coef) in &row.coefficients {
                tableau.data[i][col] += coef;
            }
            tableau.data[i][total_cols - 1] = row.rhs;

            match row.op {
                ConstraintOp::Le => {
                    tableau.data[i][slack_idx] = 1.0;
                    tableau.basic_vars[i] = slack_idx;
                    slack_idx += 1;
                }
                ConstraintOp::Ge => {
                    tableau.data[i][slack_idx] = -1.0; // surplus
                    slack_idx += 1;
                    tableau.data[i][artificial_idx] = 1.0;
                    tableau.basic_vars[i] = artificial_idx;
                    artificial_idx += 1;
                }
                ConstraintOp::Eq => {
                    tableau.data[i][artificial_idx] = 1.0;
                    tableau.basic_vars[i] = artificial_idx;
                    artificial_idx += 1;
                }
            }
        }

        // Objective row holds the reduced costs of a maximization
        let sign = if problem.objective.minimize { -1.0 } else { 1.0 };
        for (col, &j) in tableau.columns.iter().enumerate() {
            tableau.data[n_rows][col] = sign * problem.objective.coefficients[j];
        }

        Some(tableau)
    }

    fn phase1(&self, tableau: &mut Tableau, iterations: &mut usize) -> PhaseOne {
        let obj_row = tableau.obj_row();
        let n_cols = tableau.data[0].len();
        let art_start = tableau.artificial_start();

        // Save original objective
        let orig_obj = std::mem::replace(&mut tableau.data[obj_row], vec![0.0; n_cols]);

        // Maximize -sum(artificials), made consistent with the artificial basis
        for j in art_start..(art_start + tableau.n_artificial) {
            tableau.data[obj_row][j] = -1.0;
        }
        for i in 0..obj_row {
            if tableau.basic_vars[i] >= art_start {
                for j in 0..n_cols {
                    tableau.data[obj_row][j] += tableau.data[i][j];
                }
            }
        }

        match self.iterate(tableau, n_cols - 1, iterations) {
            SimplexResult::Optimal => {}
            // Unbounded in phase 1 means infeasible original
            SimplexResult::Unbounded => return PhaseOne::Infeasible,
            SimplexResult::IterationLimit => return PhaseOne::IterationLimit,
        }

        let rhs_col = n_cols - 1;
        for i in 0..obj_row {
            if tableau.basic_vars[i] >= art_start && tableau.data[i][rhs_col] > self.snap_tolerance {
                return PhaseOne::Infeasible;
            }
        }

        // Drive zero-level artificials out of the basis; rows where that is
        // impossible are redundant and stay inert.
        for i in 0..obj_row {
            if tableau.basic_vars[i] < art_start {
                continue;
            }
            let mut best: Option<(usize, f64)> = None;
            for j in 0..art_start {
                let magnitude = tableau.data[i][j].abs();
                if magnitude > self.tolerance && best.is_none_or(|(_, m)| magnitude > m) {
                    best = Some((j, magnitude));
                }
            }
            if let Some((col, _)) = best {
                self.pivot(tableau, i, col);
                *iterations += 1;
            }
        }

        // Restore original objective and adjust for basic variables
        tableau.data[obj_row] = orig_obj;
        for i in 0..obj_row {
            let basic = tableau.basic_vars[i];
            let ratio = tableau.data[obj_row][basic];
            if ratio.abs() > self.tolerance {
                for j in 0..n_cols {
                    tableau.data[obj_row][j] -= ratio * tableau.data[i][j];
                }
            }
        }

        PhaseOne::Feasible
    }

    /// Pivots until no column below `limit` improves the objective row.
    fn iterate(&self, tableau: &mut Tableau, limit: usize, iterations: &mut usize) -> SimplexResult {
        let mut degenerate_run = 0;
        loop {
            if *iterations >= self.max_iterations {
                return SimplexResult::IterationLimit;
            }
            let bland = degenerate_run >= self.bland_after;
            let Some(pivot_col) = self.find_pivot_column(tableau, limit, bland) else {
                return SimplexResult::Optimal;
            };
            let Some((pivot_row, ratio)) = self.find_pivot_row(tableau, pivot_col) else {
                return SimplexResult::Unbounded;
            };
            if ratio <= self.tolerance {
                degenerate_run += 1;
            } else {
                degenerate_run = 0;
            }
            self.pivot(tableau, pivot_row, pivot_col);
            *iterations += 1;
        }
    }

    /// Dantzig pricing, or the lowest improving index under Bland's rule.
    fn find_pivot_column(&self, tableau: &Tableau, limit: usize, bland: bool) -> Option<usize> {
        let obj = &tableau.data[tableau.obj_row()];

        if bland {
            return (0..limit).find(|&j| obj[j] > self.tolerance);
        }

        let mut max_val = self.tolerance;
        let mut max_col = None;
        for (j, &value) in obj.iter().enumerate().take(limit) {
            if value > max_val {
                max_val = value;
                max_col = Some(j);
            }
        }
        max_col
    }

    /// Minimum ratio test; ties go to the lowest basic variable index.
    fn find_pivot_row(&self, tableau: &Tableau, col: usize) -> Option<(usize, f64)> {
        let rhs_col = tableau.rhs_col();

        let mut best: Option<(usize, f64)> = None;
        for i in 0..tableau.obj_row() {
            let val = tableau.data[i][col];
            if val <= self.tolerance {
                continue;
            }
            let ratio = tableau.data[i][rhs_col].max(0.0) / val;
            best = match best {
                None => Some((i, ratio)),
                Some((row, min_ratio)) => {
                    let tie = (ratio - min_ratio).abs() <= self.tolerance;
                    if (!tie && ratio < min_ratio)
                        || (tie && tableau.basic_vars[i] < tableau.basic_vars[row])
                    {
                        Some((i, ratio))
                    } else {
                        Some((row, min_ratio))
                    }
                }
            };
        }
        best
    }

    fn pivot(&self, tableau: &mut Tableau, row: usize, col: usize) {
        let n_cols = tableau.data[0].len();

        // Update basic variable
        tableau.basic_vars[row] = col;

        // Scale pivot row
        let pivot_val = tableau.data[row][col];
        for j in 0..n_cols {
            tableau.data[row][j] /= pivot_val;
        }

        // Eliminate column in other rows
        let pivot_row = tableau.data[row].clone();
        for (i, data_row) in tableau.data.iter_mut().enumerate() {
            if i == row {
                continue;
            }
            let factor = data_row[col];
            if factor == 0.0 {
                continue;
            }
            for (cell, &p) in data_row.iter_mut().zip(&pivot_row) {
                *cell -= factor * p;
            }
            data_row[col] = 0.0;
        }
    }

    fn extract_solution(&self, tableau: &Tableau, problem: &MipProblem, bounds: &[VarBounds], iterations: usize) -> Solution {
        let rhs_col = tableau.rhs_col();
        let n_structural = tableau.columns.len();

        let mut values: Vec<f64> = bounds.iter().map(|b| b.lower).collect();
        for (i, &basic) in tableau.basic_vars.iter().enumerate() {
            if basic < n_structural {
                values[tableau.columns[basic]] += tableau.data[i][rhs_col];
            }
        }

        for (value, b) in values.iter_mut().zip(bounds) {
            if (*value - b.lower).abs() <= self.snap_tolerance {
                *value = b.lower;
            } else if (*value - b.upper).abs() <= self.snap_tolerance {
                *value = b.upper;
            }
        }

        let objective_value = problem.evaluate(&values);

        Solution {
            status: SolutionStatus::Optimal,
            values,
            objective_value,
            iterations,
        }
    }
}

struct Row {
    coefficients: Vec<(usize, f64)>,
    op: ConstraintOp,
    rhs: f64,
}

struct Tableau {
    /// Constraint rows followed by the objective row; last column is the RHS
    data: Vec<Vec<f64>>,
    basic_vars: Vec<usize>,
    /// Model variable behind each structural column
    columns: Vec<usize>,
    n_slack: usize,
    n_artificial: usize,
}

impl Tableau {
    fn obj_row(&self) -> usize {
        self.data.len() - 1
    }

    fn rhs_col(&self) -> usize {
        self.data[0].len() - 1
    }

    fn artificial_start(&self) -> usize {
        self.columns.len() + self.n_slack
    }
}

enum SimplexResult {
    Optimal,
    Unbounded,
    IterationLimit,
}

enum PhaseOne {
    Feasible,
    Infeasible,
    IterationLimit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Variable;

    fn continuous(names: &[&str]) -> MipProblem {
        let mut problem = MipProblem::new();
        for name in names {
            problem.add_variable(Variable::continuous(*name, 0.0, f64::INFINITY));
        }
        problem
    }

    #[test]
    fn test_simple_maximization() {
        // Maximize: 3x + 2y
        // Subject to:
        //   x + y <= 4
        //   x <= 3
        //   y <= 3
        // Optimal: x=3, y=1, obj=11
        let mut problem = continuous(&["x", "y"]);
        problem.set_objective(vec![3.0, 2.0], false);
        problem.add_constraint("sum", vec![(0, 1.0), (1, 1.0)], ConstraintOp::Le, 4.0);
        problem.add_constraint("x_max", vec![(0, 1.0)], ConstraintOp::Le, 3.0);
        problem.add_constraint("y_max", vec![(1, 1.0)], ConstraintOp::Le, 3.0);

        let solution = Solver::new().solve(&problem);

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.values[0] - 3.0).abs() < 1e-6, "x = {} (expected 3)", solution.values[0]);
        assert!((solution.values[1] - 1.0).abs() < 1e-6, "y = {} (expected 1)", solution.values[1]);
        assert!((solution.objective_value - 11.0).abs() < 1e-6, "obj = {} (expected 11)", solution.objective_value);
    }

    #[test]
    fn test_minimization_with_ge() {
        // Minimize: 2x + 3y
        // Subject to:
        //   x + y >= 4
        //   x <= 3
        //   y <= 3
        // Optimal: x=3, y=1, obj=9
        let mut problem = continuous(&["x", "y"]);
        problem.set_objective(vec![2.0, 3.0], true);
        problem.add_constraint("sum", vec![(0, 1.0), (1, 1.0)], ConstraintOp::Ge, 4.0);
        problem.add_constraint("x_max", vec![(0, 1.0)], ConstraintOp::Le, 3.0);
        problem.add_constraint("y_max", vec![(1, 1.0)], ConstraintOp::Le, 3.0);

        let solution = Solver::new().solve(&problem);

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.values[0] - 3.0).abs() < 1e-6, "x = {} (expected 3)", solution.values[0]);
        assert!((solution.values[1] - 1.0).abs() < 1e-6, "y = {} (expected 1)", solution.values[1]);
        assert!((solution.objective_value - 9.0).abs() < 1e-6, "obj = {} (expected 9)", solution.objective_value);
    }

    #[test]
    fn test_infeasible() {
        // x >= 5
        // x <= 3
        let mut problem = continuous(&["x"]);
        problem.set_objective(vec![1.0], true);
        problem.add_constraint("lower", vec![(0, 1.0)], ConstraintOp::Ge, 5.0);
        problem.add_constraint("upper", vec![(0, 1.0)], ConstraintOp::Le, 3.0);

        let solution = Solver::new().solve(&problem);

        assert_eq!(solution.status, SolutionStatus::Infeasible);
    }

    #[test]
    fn test_unbounded() {
        let mut problem = continuous(&["x"]);
        problem.set_objective(vec![1.0], false);

        let solution = Solver::new().solve(&problem);

        assert_eq!(solution.status, SolutionStatus::Unbounded);
    }

    #[test]
    fn test_equality_constraint() {
        // Maximize x + 2y subject to x + y = 3, y <= 2
        let mut problem = continuous(&["x", "y"]);
        problem.set_objective(vec![1.0, 2.0], false);
        problem.add_constraint("total", vec![(0, 1.0), (1, 1.0)], ConstraintOp::Eq, 3.0);
        problem.add_constraint("y_max", vec![(1, 1.0)], ConstraintOp::Le, 2.0);

        let solution = Solver::new().with_tolerance(1e-10).solve(&problem);

        assert!(solution.is_optimal());
        assert!((solution.values[0] - 1.0).abs() < 1e-6);
        assert!((solution.values[1] - 2.0).abs() < 1e-6);
        assert!((solution.objective_value - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_model_has_zero_objective() {
        let problem = MipProblem::new();
        let solution = Solver::new().solve(&problem);

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!(solution.values.is_empty());
        assert_eq!(solution.objective_value, 0.0);
    }

    #[test]
    fn test_fractional_knapsack_relaxation() {
        // max 5a + 4b, 3a + 2b <= 4, a, b in [0, 1] -> b = 1, a = 2/3
        let mut problem = MipProblem::new();
        problem.add_variable(Variable::binary("a"));
        problem.add_variable(Variable::binary("b"));
        problem.set_objective(vec![5.0, 4.0], false);
        problem.add_constraint("cap", vec![(0, 3.0), (1, 2.0)], ConstraintOp::Le, 4.0);

        let solution = Solver::new().solve(&problem);

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.values[0] - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(solution.values[1], 1.0);
        assert!((solution.objective_value - (4.0 + 10.0 / 3.0)).abs() < 1e-6);
    }

    #[test]
    fn test_fixed_bounds_are_substituted() {
        // Same knapsack with a fixed to 1: b can only take 1/2
        let mut problem = MipProblem::new();
        problem.add_variable(Variable::binary("a"));
        problem.add_variable(Variable::binary("b"));
        problem.set_objective(vec![5.0, 4.0], false);
        problem.add_constraint("cap", vec![(0, 3.0), (1, 2.0)], ConstraintOp::Le, 4.0);

        let bounds = vec![
            VarBounds { lower: 1.0, upper: 1.0 },
            VarBounds { lower: 0.0, upper: 1.0 },
        ];
        let solution = Solver::new().solve_with_bounds(&problem, &bounds);

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(solution.values[0], 1.0);
        assert!((solution.values[1] - 0.5).abs() < 1e-6);
        assert!((solution.objective_value - 7.0).abs() < 1e-6);
    }

    #[test]
    fn test_fixing_that_overflows_a_row_is_infeasible() {
        let mut problem = MipProblem::new();
        problem.add_variable(Variable::binary("a"));
        problem.set_objective(vec![1.0], false);
        problem.add_constraint("cap", vec![(0, 600.0)], ConstraintOp::Le, 500.0);

        let bounds = vec![VarBounds { lower: 1.0, upper: 1.0 }];
        let solution = Solver::new().solve_with_bounds(&problem, &bounds);

        assert_eq!(solution.status, SolutionStatus::Infeasible);
    }

    #[test]
    fn test_fixing_to_one_with_free_partner_needs_phase_one() {
        // serve <= store with serve fixed to 1 forces store up through a negative rhs row
        let mut problem = MipProblem::new();
        problem.add_variable(Variable::binary("store"));
        problem.add_variable(Variable::binary("serve"));
        problem.set_objective(vec![-1.0, 3.0], false);
        problem.add_constraint("link", vec![(1, 1.0), (0, -1.0)], ConstraintOp::Le, 0.0);

        let bounds = vec![
            VarBounds { lower: 0.0, upper: 1.0 },
            VarBounds { lower: 1.0, upper: 1.0 },
        ];
        let solution = Solver::new().solve_with_bounds(&problem, &bounds);

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(solution.values, vec![1.0, 1.0]);
        assert!((solution.objective_value - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_iteration_limit_is_reported() {
        let mut problem = continuous(&["x", "y"]);
        problem.set_objective(vec![3.0, 2.0], false);
        problem.add_constraint("sum", vec![(0, 1.0), (1, 1.0)], ConstraintOp::Le, 4.0);

        let solution = Solver::new().with_max_iterations(0).solve(&problem);

        assert_eq!(solution.status, SolutionStatus::IterationLimit);
    }
}
