//! LOI: bitwise complement insertion
//!
//! Wraps integral variable and field reads in `~`. Lvalues and the operands
//! of existing unary operators are left alone; the result would either fail
//! to parse or stack operators into shapes no other operator produces.

use crate::ast::{Fragment, NodeId, NodeKind, UnOp};
use crate::context;
use crate::mutator::{walk_expr, Emit, Mutator};

pub struct Loi;

impl Mutator for Loi {
    fn visit_expr(&mut self, em: &mut Emit<'_>, expr: NodeId) {
        match *em.unit.kind(expr) {
            NodeKind::Variable { .. } | NodeKind::FieldAccess { .. }
                if context::is_integral(em.unit, expr) =>
            {
                em.emit(
                    expr,
                    Fragment::Unary {
                        op: UnOp::BitNot,
                        operand: Box::new(Fragment::Keep(expr)),
                    },
                );
            }
            NodeKind::Unary { .. } => {}
            NodeKind::Assign { value, .. } => self.visit_expr(em, value),
            _ => walk_expr(self, em, expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drule::RunContext;
    use crate::emit::MemorySink;
    use crate::mutator::{run_mutator, OpId};
    use crate::parse::parse_unit;

    fn run(src: &str) -> Vec<String> {
        let unit = parse_unit(src, "A.java").unwrap();
        let ctx = RunContext::new([OpId::Loi]);
        let mut sink = MemorySink::default();
        run_mutator(&mut Loi, &unit, OpId::Loi, &ctx, Some(&mut sink));
        sink.mutants.iter().map(|m| m.description.clone()).collect()
    }

    #[test]
    fn wraps_integral_reads_only() {
        let descriptions = run("class A { int f(int x, double d) { return x + 1; } }");
        assert_eq!(descriptions, vec!["x => ~x"]);
        assert!(run("class A { double g(double d) { return d; } }").is_empty());
    }

    #[test]
    fn skips_assignment_targets() {
        let descriptions = run("class A { void f(int x, int y) { x = y; } }");
        assert_eq!(descriptions, vec!["y => ~y"]);
    }

    #[test]
    fn wraps_field_reads() {
        let descriptions = run("class A { int n; boolean f() { return n == 0; } }");
        assert_eq!(descriptions, vec!["n => ~n"]);
    }
}
