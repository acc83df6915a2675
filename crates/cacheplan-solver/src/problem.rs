use crate::error::SolverError;
use crate::solution::ConstraintViolation;

/// Represents a linear model whose variables may be restricted to 0/1
#[derive(Debug, Clone)]
pub struct MipProblem {
    /// Decision variables, indexed by position
    pub variables: Vec<Variable>,
    /// Objective function coefficients
    pub objective: Objective,
    /// Constraints
    pub constraints: Vec<Constraint>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// Any value within the bounds
    Continuous,
    /// Integral value within [0, 1]
    Binary,
}

#[derive(Debug, Clone)]
pub struct Variable {
    /// Name used in diagnostics and model export
    pub name: String,
    pub kind: VarKind,
    /// Finite lower bound
    pub lower: f64,
    /// Upper bound, possibly `f64::INFINITY`
    pub upper: f64,
    /// Branching prefers fractional variables of the highest priority class
    pub branch_priority: u32,
}

#[derive(Debug, Clone)]
pub struct Objective {
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Whether to minimize or maximize
    pub minimize: bool,
}

#[derive(Debug, Clone)]
pub struct Constraint {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    /// Sparse `(variable, coefficient)` terms
    pub terms: Vec<(usize, f64)>,
    /// Comparison operator
    pub op: ConstraintOp,
    /// Right-hand side value
    pub rhs: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

/// Lower and upper bound of one variable within a (restricted) model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarBounds {
    pub lower: f64,
    pub upper: f64,
}

impl Variable {
    pub fn binary(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VarKind::Binary,
            lower: 0.0,
            upper: 1.0,
            branch_priority: 0,
        }
    }

    pub fn continuous(name: impl Into<String>, lower: f64, upper: f64) -> Self {
        Self {
            name: name.into(),
            kind: VarKind::Continuous,
            lower,
            upper,
            branch_priority: 0,
        }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.branch_priority = priority;
        self
    }

    pub fn is_binary(&self) -> bool {
        self.kind == VarKind::Binary
    }
}

impl Constraint {
    /// Left-hand side value for the given assignment
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(j, coef)| coef * values.get(j).copied().unwrap_or(0.0))
            .sum()
    }
}

impl Default for MipProblem {
    fn default() -> Self {
        Self::new()
    }
}

impl MipProblem {
    pub fn new() -> Self {
        Self {
            variables: Vec::new(),
            objective: Objective {
                coefficients: Vec::new(),
                minimize: false,
            },
            constraints: Vec::new(),
        }
    }

    /// Appends a variable with a zero objective coefficient and returns its index
    pub fn add_variable(&mut self, variable: Variable) -> usize {
        self.variables.push(variable);
        self.objective.coefficients.push(0.0);
        self.variables.len() - 1
    }

    pub fn set_objective(&mut self, coefficients: Vec<f64>, minimize: bool) {
        self.objective = Objective { coefficients, minimize };
    }

    pub fn set_objective_coefficient(&mut self, var: usize, coefficient: f64) {
        if let Some(c) = self.objective.coefficients.get_mut(var) {
            *c = coefficient;
        }
    }

    pub fn add_constraint(&mut self, name: impl Into<String>, terms: Vec<(usize, f64)>, op: ConstraintOp, rhs: f64) {
        self.constraints.push(Constraint {
            name: name.into(),
            terms,
            op,
            rhs,
        });
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Bounds declared on the variables themselves
    pub fn bounds(&self) -> Vec<VarBounds> {
        self.variables
            .iter()
            .map(|v| VarBounds {
                lower: v.lower,
                upper: v.upper,
            })
            .collect()
    }

    /// Checks structural consistency: objective length, term indices, bounds
    pub fn validate(&self) -> Result<(), SolverError> {
        let n = self.num_variables();
        if self.objective.coefficients.len() != n {
            return Err(SolverError::ObjectiveLength {
                expected: n,
                found: self.objective.coefficients.len(),
            });
        }

        for c in &self.constraints {
            if let Some(&(index, _)) = c.terms.iter().find(|&&(j, _)| j >= n) {
                return Err(SolverError::UnknownVariable {
                    constraint: c.name.clone(),
                    index,
                });
            }
        }

        for v in &self.variables {
            let binary_ok = !v.is_binary() || (v.lower >= 0.0 && v.upper <= 1.0);
            if !v.lower.is_finite() || v.upper.is_nan() || v.lower > v.upper || !binary_ok {
                return Err(SolverError::InvalidBounds {
                    variable: v.name.clone(),
                    lower: v.lower,
                    upper: v.upper,
                });
            }
        }

        Ok(())
    }

    /// Objective value of an assignment, in the model's own sense
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.objective
            .coefficients
            .iter()
            .zip(values)
            .map(|(c, x)| c * x)
            .sum()
    }

    /// Copy of the model with the objective expressed as a maximization
    pub fn to_maximization(&self) -> MipProblem {
        let mut max_form = self.clone();
        if self.objective.minimize {
            for c in &mut max_form.objective.coefficients {
                *c = -*c;
            }
            max_form.objective.minimize = false;
        }
        max_form
    }

    /// Find which constraints and bounds are violated by a given assignment
    pub fn find_violations(&self, values: &[f64], tolerance: f64) -> Vec<ConstraintViolation> {
        let mut violations = Vec::new();

        for c in &self.constraints {
            let lhs = c.activity(values);

            let (is_violated, violation_amount, description) = match c.op {
                ConstraintOp::Le => {
                    if lhs > c.rhs + tolerance {
                        let amt = lhs - c.rhs;
                        (true, amt, format!("{} exceeds maximum of {:.2} by {:.2}", c.name, c.rhs, amt))
                    } else {
                        (false, 0.0, String::new())
                    }
                }
                ConstraintOp::Ge => {
                    if lhs < c.rhs - tolerance {
                        let amt = c.rhs - lhs;
                        (true, amt, format!("{} is below minimum of {:.2} by {:.2}", c.name, c.rhs, amt))
                    } else {
                        (false, 0.0, String::new())
                    }
                }
                ConstraintOp::Eq => {
                    let diff = (lhs - c.rhs).abs();
                    if diff > tolerance {
                        (true, diff, format!("{} requires exactly {:.2} but got {:.2}", c.name, c.rhs, lhs))
                    } else {
                        (false, 0.0, String::new())
                    }
                }
            };

            if is_violated {
                violations.push(ConstraintViolation {
                    constraint: c.name.clone(),
                    required: c.rhs,
                    actual: lhs,
                    violation_amount,
                    description,
                });
            }
        }

        for (v, &x) in self.variables.iter().zip(values) {
            let out_of_range = x < v.lower - tolerance || x > v.upper + tolerance;
            let fractional = v.is_binary() && (x - x.round()).abs() > tolerance;
            if out_of_range || fractional {
                violations.push(ConstraintViolation {
                    constraint: v.name.clone(),
                    required: x.round().clamp(v.lower, v.upper),
                    actual: x,
                    violation_amount: (x - x.round().clamp(v.lower, v.upper)).abs(),
                    description: format!("{} = {} is outside its domain", v.name, x),
                });
            }
        }

        // Sort by violation amount (worst first)
        violations.sort_by(|a, b| b.violation_amount.total_cmp(&a.violation_amount));

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knapsack() -> MipProblem {
        let mut problem = MipProblem::new();
        let a = problem.add_variable(Variable::binary("a"));
        let b = problem.add_variable(Variable::binary("b"));
        problem.set_objective(vec![5.0, 4.0], false);
        problem.add_constraint("cap", vec![(a, 3.0), (b, 2.0)], ConstraintOp::Le, 4.0);
        problem
    }

    #[test]
    fn test_validate_accepts_well_formed_model() {
        assert!(knapsack().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_variable() {
        let mut problem = knapsack();
        problem.add_constraint("bad", vec![(7, 1.0)], ConstraintOp::Le, 1.0);
        assert_eq!(
            problem.validate(),
            Err(SolverError::UnknownVariable {
                constraint: "bad".to_string(),
                index: 7
            })
        );
    }

    #[test]
    fn test_validate_rejects_binary_outside_unit_interval() {
        let mut problem = knapsack();
        problem.variables[1].upper = 2.0;
        assert!(matches!(problem.validate(), Err(SolverError::InvalidBounds { .. })));
    }

    #[test]
    fn test_find_violations_reports_capacity_and_fractional_values() {
        let problem = knapsack();
        assert!(problem.find_violations(&[1.0, 0.0], 1e-9).is_empty());

        let violations = problem.find_violations(&[1.0, 1.0], 1e-9);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].constraint, "cap");
        assert!((violations[0].violation_amount - 1.0).abs() < 1e-9);

        let violations = problem.find_violations(&[0.0, 0.5], 1e-9);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].constraint, "b");
    }

    #[test]
    fn test_to_maximization_negates_minimization() {
        let mut problem = knapsack();
        problem.set_objective(vec![1.0, -2.0], true);
        let max_form = problem.to_maximization();
        assert!(!max_form.objective.minimize);
        assert_eq!(max_form.objective.coefficients, vec![-1.0, 2.0]);
        assert_eq!(problem.evaluate(&[1.0, 1.0]), -1.0);
    }
}
