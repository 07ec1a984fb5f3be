//! ODL: operand deletion
//!
//! Replaces a binary expression by either of its operands, and a unary
//! expression by its operand. Comparisons are exempt: dropping one side would
//! change the expression's type, not its value.

use crate::ast::{BinOp, Fragment, NodeId, NodeKind, UnOp};
use crate::mutator::{walk_expr, Emit, Mutator};

pub struct Odl;

fn deletable(op: BinOp) -> bool {
    op.is_arithmetic()
        || matches!(
            op,
            BinOp::And | BinOp::Or | BinOp::BitAnd | BinOp::BitOr | BinOp::BitXor
        )
}

impl Mutator for Odl {
    fn visit_expr(&mut self, em: &mut Emit<'_>, expr: NodeId) {
        match *em.unit.kind(expr) {
            NodeKind::Binary { op, left, right } if deletable(op) => {
                em.emit(expr, Fragment::Keep(left));
                em.emit(expr, Fragment::Keep(right));
            }
            NodeKind::Unary {
                op: UnOp::Neg | UnOp::Not | UnOp::BitNot,
                operand,
            } => {
                em.emit(expr, Fragment::Keep(operand));
            }
            _ => {}
        }
        walk_expr(self, em, expr);
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
        let ctx = RunContext::new([OpId::Odl]);
        let mut sink = MemorySink::default();
        run_mutator(&mut Odl, &unit, OpId::Odl, &ctx, Some(&mut sink));
        sink.mutants.iter().map(|m| m.description.clone()).collect()
    }

    #[test]
    fn deletes_either_operand_of_arithmetic() {
        let descriptions = run("class A { int f(int a, int b) { return a + b; } }");
        assert_eq!(descriptions, vec!["a + b => a", "a + b => b"]);
    }

    #[test]
    fn deletes_unary_operators() {
        let descriptions = run("class A { boolean f(boolean p) { return !p; } }");
        assert_eq!(descriptions, vec!["!p => p"]);
    }

    #[test]
    fn comparisons_are_left_intact() {
        let descriptions =
            run("class A { boolean f(int a, int b) { return a < b; } }");
        assert!(descriptions.is_empty());
    }

    #[test]
    fn logical_connectives_drop_a_side() {
        let descriptions =
            run("class A { boolean f(boolean p, boolean q) { return p && q; } }");
        assert_eq!(descriptions, vec!["p && q => p", "p && q => q"]);
    }
}
