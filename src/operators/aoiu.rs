//! AOIU: unary minus insertion
//!
//! Negates arithmetic variable and field reads. Traversal is pruned the way
//! the classic catalog prescribes, so that one negation site stands in for
//! the family of sign-flipping mutants: additive operators negate the left
//! operand only, multiplicative operators negate one operand when negating
//! either would produce the same set of behaviors, and existing unary
//! operators block insertion entirely.

use crate::ast::{BinOp, Fragment, NodeId, NodeKind, UnOp};
use crate::context;
use crate::drule::RuleId;
use crate::mutator::{walk_expr, Emit, Mutator, SuppressionKind};
use crate::printer::flatten;

pub struct Aoiu;

fn is_simple_read(unit: &crate::ast::CompilationUnit, id: NodeId) -> bool {
    matches!(
        unit.kind(id),
        NodeKind::Variable { .. } | NodeKind::FieldAccess { .. }
    )
}

impl Aoiu {
    fn propose(&mut self, em: &mut Emit<'_>, id: NodeId) {
        if is_simple_read(em.unit, id) {
            if context::is_arithmetic(em.unit, id) {
                em.emit(
                    id,
                    Fragment::Unary {
                        op: UnOp::Neg,
                        operand: Box::new(Fragment::Keep(id)),
                    },
                );
            }
        } else {
            self.visit_expr(em, id);
        }
    }

    /// `x == 0` inside an `if` guard: negating `x` cannot change which branch
    /// runs.
    fn zero_equality_guard(&self, em: &Emit<'_>, cmp: NodeId, op: BinOp, other: NodeId) -> bool {
        matches!(op, BinOp::Eq | BinOp::Ne)
            && context::in_if_condition(em.unit, cmp)
            && matches!(em.unit.kind(other), NodeKind::Lit { value } if value.is_zero())
    }

    fn propose_comparison_side(
        &mut self,
        em: &mut Emit<'_>,
        cmp: NodeId,
        op: BinOp,
        side: NodeId,
        other: NodeId,
    ) {
        if is_simple_read(em.unit, side) {
            if !context::is_arithmetic(em.unit, side) {
                return;
            }
            if self.zero_equality_guard(em, cmp, op, other) {
                let detail = format!("-{}", flatten(em.unit, side));
                em.suppress(RuleId::E15, SuppressionKind::Equivalent, None, side, &detail);
            } else {
                em.emit(
                    side,
                    Fragment::Unary {
                        op: UnOp::Neg,
                        operand: Box::new(Fragment::Keep(side)),
                    },
                );
            }
        } else {
            self.visit_expr(em, side);
        }
    }
}

impl Mutator for Aoiu {
    fn visit_expr(&mut self, em: &mut Emit<'_>, expr: NodeId) {
        match *em.unit.kind(expr) {
            NodeKind::Variable { .. } | NodeKind::FieldAccess { .. } => self.propose(em, expr),
            // an existing unary operator blocks insertion below it
            NodeKind::Unary { .. } => {}
            NodeKind::Binary { op, left, right } => match op {
                BinOp::Add | BinOp::Sub | BinOp::Mod => self.propose(em, left),
                BinOp::Mul | BinOp::Div => {
                    // -(a * b) and (-a) * b coincide; one site is enough when
                    // both operands are plain reads
                    if is_simple_read(em.unit, left) && is_simple_read(em.unit, right) {
                        self.propose(em, left);
                    } else {
                        self.propose(em, left);
                        self.propose(em, right);
                    }
                }
                op if op.is_comparison() => {
                    self.propose_comparison_side(em, expr, op, left, right);
                    self.propose_comparison_side(em, expr, op, right, left);
                }
                _ => walk_expr(self, em, expr),
            },
            NodeKind::Assign { value, .. } => {
                // negating the target would not parse; only the stored value
                // is a candidate
                self.propose(em, value);
            }
            NodeKind::Lit { .. } => {}
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

    fn run(src: &str, ctx: &RunContext) -> (Vec<String>, Vec<RuleId>) {
        let unit = parse_unit(src, "A.java").unwrap();
        let mut sink = MemorySink::default();
        let outcome = run_mutator(&mut Aoiu, &unit, OpId::Aoiu, ctx, Some(&mut sink));
        (
            sink.mutants.iter().map(|m| m.description.clone()).collect(),
            outcome.suppressed.iter().map(|r| r.rule).collect(),
        )
    }

    #[test]
    fn additive_operands_negate_the_left_side_only() {
        let ctx = RunContext::new([OpId::Aoiu]);
        let (descriptions, _) = run("class A { int f(int a, int b) { return a + b; } }", &ctx);
        assert_eq!(descriptions, vec!["a => -a"]);
    }

    #[test]
    fn product_of_plain_reads_negates_once() {
        let ctx = RunContext::new([OpId::Aoiu]);
        let (descriptions, _) = run("class A { int f(int a, int b) { return a * b; } }", &ctx);
        assert_eq!(descriptions, vec!["a => -a"]);
    }

    #[test]
    fn product_with_a_compound_operand_negates_both_sides() {
        let ctx = RunContext::new([OpId::Aoiu]);
        let (descriptions, _) =
            run("class A { int f(int a, int b, int c) { return a * (b + c); } }", &ctx);
        // left read, then the left side of the inner sum
        assert_eq!(descriptions, vec!["a => -a", "b => -b"]);
    }

    #[test]
    fn comparisons_negate_both_sides() {
        let ctx = RunContext::new([OpId::Aoiu]);
        let (descriptions, _) =
            run("class A { boolean f(int a, int b) { return a < b; } }", &ctx);
        assert_eq!(descriptions, vec!["a => -a", "b => -b"]);
    }

    #[test]
    fn zero_equality_guard_suppresses_the_negation() {
        let ctx = RunContext::new([OpId::Aoiu]);
        let (descriptions, rules) = run(
            "class A { int f(int x) { if (x == 0) { return 1; } return 0; } }",
            &ctx,
        );
        assert!(descriptions.is_empty());
        assert_eq!(rules, vec![RuleId::E15]);
    }

    #[test]
    fn assignment_only_mutates_the_stored_value() {
        let ctx = RunContext::new([OpId::Aoiu]);
        let (descriptions, _) = run("class A { void f(int x, int y) { x = y; } }", &ctx);
        assert_eq!(descriptions, vec!["y => -y"]);
    }

    #[test]
    fn existing_unary_blocks_insertion() {
        let ctx = RunContext::new([OpId::Aoiu]);
        let (descriptions, _) = run("class A { int f(int x) { return -x; } }", &ctx);
        assert!(descriptions.is_empty());
    }

    #[test]
    fn mod_assign_value_defers_to_operator_replacement() {
        let ctx = RunContext::new([OpId::Aoiu, OpId::Asrs]);
        let (descriptions, rules) = run("class A { void f(int x, int m) { x %= m; } }", &ctx);
        assert!(descriptions.is_empty());
        assert_eq!(rules, vec![RuleId::D43]);
    }
}
