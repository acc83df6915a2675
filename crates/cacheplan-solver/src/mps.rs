//! Free-format MPS export, readable by common MILP solvers.

use crate::problem::{ConstraintOp, MipProblem, VarKind};
use std::io::{self, Write};

/// Writes `problem` in free MPS format. Binary columns are wrapped in
/// integer markers and declared `BV` in the bounds section.
pub fn write_mps<W: Write>(problem: &MipProblem, name: &str, out: &mut W) -> io::Result<()> {
    writeln!(out, "NAME {}", name)?;
    writeln!(out, "OBJSENSE")?;
    writeln!(out, "    {}", if problem.objective.minimize { "MIN" } else { "MAX" })?;

    writeln!(out, "ROWS")?;
    writeln!(out, " N obj")?;
    for c in &problem.constraints {
        let kind = match c.op {
            ConstraintOp::Le => "L",
            ConstraintOp::Ge => "G",
            ConstraintOp::Eq => "E",
        };
        writeln!(out, " {} {}", kind, c.name)?;
    }

    // Column-major view of the constraint terms
    let mut entries: Vec<Vec<(usize, f64)>> = vec![Vec::new(); problem.num_variables()];
    for (i, c) in problem.constraints.iter().enumerate() {
        for &(j, coef) in &c.terms {
            if coef != 0.0 {
                entries[j].push((i, coef));
            }
        }
    }

    writeln!(out, "COLUMNS")?;
    let mut in_integer_block = false;
    let mut marker = 0;
    for (j, var) in problem.variables.iter().enumerate() {
        let binary = var.kind == VarKind::Binary;
        if binary != in_integer_block {
            let tag = if binary { "INTORG" } else { "INTEND" };
            writeln!(out, "    MARKER{} 'MARKER' '{}'", marker, tag)?;
            marker += 1;
            in_integer_block = binary;
        }

        let cost = problem.objective.coefficients[j];
        if cost != 0.0 || entries[j].is_empty() {
            writeln!(out, "    {} obj {}", var.name, cost)?;
        }
        for &(i, coef) in &entries[j] {
            writeln!(out, "    {} {} {}", var.name, problem.constraints[i].name, coef)?;
        }
    }
    if in_integer_block {
        writeln!(out, "    MARKER{} 'MARKER' 'INTEND'", marker)?;
    }

    writeln!(out, "RHS")?;
    for c in &problem.constraints {
        if c.rhs != 0.0 {
            writeln!(out, "    RHS {} {}", c.name, c.rhs)?;
        }
    }

    writeln!(out, "BOUNDS")?;
    for var in &problem.variables {
        match var.kind {
            VarKind::Binary if var.lower == 0.0 && var.upper == 1.0 => {
                writeln!(out, " BV BND {}", var.name)?;
            }
            _ => {
                if var.lower != 0.0 {
                    writeln!(out, " LO BND {} {}", var.name, var.lower)?;
                }
                if var.upper.is_finite() {
                    writeln!(out, " UP BND {} {}", var.name, var.upper)?;
                }
            }
        }
    }

    writeln!(out, "ENDATA")?;
    Ok(())
}
