//! LP-format writer.
//!
//! Emits the CPLEX LP dialect read by SCIP and CBC. Objective constants are
//! not representable in the format and are dropped.

use super::linear::{Formulation, LinearExpr, ObjSense, Sense, VarDomain};

/// Renders a formulation as LP text.
pub fn write_lp(f: &Formulation) -> String {
    let mut out = String::new();
    out.push_str(&format!("\\ {}\n", f.name()));
    match f.objective().sense {
        ObjSense::Minimize => out.push_str("Minimize\n obj: "),
        ObjSense::Maximize => out.push_str("Maximize\n obj: "),
    }
    out.push_str(&fmt_lin(f, &f.objective().expr));
    out.push('\n');

    out.push_str("Subject To\n");
    for c in f.constraints() {
        out.push_str(&format!(
            " {}: {} {} {}\n",
            c.name,
            fmt_lin(f, &c.expr),
            fmt_sense(c.sense),
            fmt_num(c.rhs)
        ));
    }

    out.push_str("Bounds\n");
    for v in f.variables() {
        if let VarDomain::Continuous { lower, upper } = v.domain {
            out.push_str(&format!(" {} <= {} <= {}\n", fmt_num(lower), v.name, fmt_num(upper)));
        }
    }

    out.push_str("Binary\n");
    for v in f.variables().iter().filter(|v| v.domain.is_binary()) {
        out.push_str(&format!(" {}\n", v.name));
    }
    out.push_str("End\n");
    out
}

fn fmt_sense(s: Sense) -> &'static str {
    match s {
        Sense::Le => "<=",
        Sense::Ge => ">=",
        Sense::Eq => "=",
    }
}

fn fmt_num(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{}", v.round() as i64)
    } else {
        format!("{:.6}", v)
    }
}

fn fmt_lin(f: &Formulation, e: &LinearExpr) -> String {
    let mut parts: Vec<String> = vec![];
    for (var, c) in e.terms() {
        let name = &f.variable(var).name;
        if (c - 1.0).abs() < 1e-12 {
            parts.push(format!("+ {}", name));
        } else if (c + 1.0).abs() < 1e-12 {
            parts.push(format!("- {}", name));
        } else if c < 0.0 {
            parts.push(format!("- {} {}", fmt_num(-c), name));
        } else {
            parts.push(format!("+ {} {}", fmt_num(c), name));
        }
    }
    if parts.is_empty() {
        parts.push("0".to_string());
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lp::ConstraintKind;

    #[test]
    fn test_fmt_num_int() {
        assert_eq!(fmt_num(3.0), "3");
        assert_eq!(fmt_num(-2.0), "-2");
        assert_eq!(fmt_num(0.5), "0.500000");
    }

    #[test]
    fn test_write_lp_sections() {
        let mut f = Formulation::new("demo");
        let x = f.add_binary("x");
        let y = f.add_continuous("y", 0.0, 1.0);
        f.add_constraint(
            ConstraintKind::ItemUse,
            LinearExpr::from_var(y, 1.0).sub(LinearExpr::from_var(x, 1.0)),
            Sense::Le,
            0.0,
        );
        f.add_constraint(
            ConstraintKind::ShippingCapacity,
            LinearExpr::from_var(x, 2.0),
            Sense::Le,
            5.0,
        );
        f.maximize(LinearExpr::from_var(y, 10.0));

        let lp = write_lp(&f);
        assert!(lp.starts_with("\\ demo\nMaximize\n obj: + 10 y\n"));
        assert!(lp.contains(" item_use_0: - x + y <= 0\n"));
        assert!(lp.contains(" capacity_1: + 2 x <= 5\n"));
        assert!(lp.contains("Bounds\n 0 <= y <= 1\n"));
        assert!(lp.contains("Binary\n x\nEnd\n"));
    }

    #[test]
    fn test_empty_objective() {
        let f = Formulation::new("empty");
        let lp = write_lp(&f);
        assert!(lp.contains("obj: 0\n"));
    }
}
