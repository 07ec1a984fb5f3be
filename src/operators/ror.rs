//! ROR: relational operator replacement
//!
//! Each comparison over arithmetic operands proposes the five other
//! comparison operators plus the two forced outcomes `true` and `false`.
//! Reference comparisons only support `==` and `!=`, so those propose the
//! single opposite operator.

use crate::ast::{BinOp, Fragment, Literal, NodeKind};
use crate::context;
use crate::mutator::{walk_expr, Emit, Mutator};

pub struct Ror;

impl Mutator for Ror {
    fn visit_expr(&mut self, em: &mut Emit<'_>, expr: crate::ast::NodeId) {
        if let NodeKind::Binary { op, left, right } = *em.unit.kind(expr) {
            if op.is_comparison() {
                let ordered = !matches!(op, BinOp::Eq | BinOp::Ne);
                let arithmetic =
                    context::is_arithmetic(em.unit, left) && context::is_arithmetic(em.unit, right);
                if ordered || arithmetic {
                    for other in BinOp::COMPARISONS {
                        if other != op {
                            em.emit(
                                expr,
                                Fragment::Binary {
                                    op: other,
                                    left: Box::new(Fragment::Keep(left)),
                                    right: Box::new(Fragment::Keep(right)),
                                },
                            );
                        }
                    }
                    em.emit(expr, Fragment::Literal(Literal::Bool(true)));
                    em.emit(expr, Fragment::Literal(Literal::Bool(false)));
                } else {
                    // reference equality supports only the opposite test
                    let opposite = if op == BinOp::Eq { BinOp::Ne } else { BinOp::Eq };
                    em.emit(
                        expr,
                        Fragment::Binary {
                            op: opposite,
                            left: Box::new(Fragment::Keep(left)),
                            right: Box::new(Fragment::Keep(right)),
                        },
                    );
                }
            }
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

    fn run(src: &str, ctx: &RunContext) -> (Vec<String>, usize) {
        let unit = parse_unit(src, "A.java").unwrap();
        let mut sink = MemorySink::default();
        let outcome = run_mutator(&mut Ror, &unit, OpId::Ror, ctx, Some(&mut sink));
        let descriptions = sink.mutants.iter().map(|m| m.description.clone()).collect();
        (descriptions, outcome.suppressed.len())
    }

    #[test]
    fn arithmetic_comparison_yields_seven_candidates() {
        let ctx = RunContext::new([OpId::Ror]);
        let (descriptions, suppressed) =
            run("class A { int f(int x) { if (x > 10) { return 1; } return 0; } }", &ctx);
        assert_eq!(suppressed, 0);
        assert_eq!(
            descriptions,
            vec![
                "x > 10 => x >= 10",
                "x > 10 => x < 10",
                "x > 10 => x <= 10",
                "x > 10 => x == 10",
                "x > 10 => x != 10",
                "x > 10 => true",
                "x > 10 => false",
            ]
        );
    }

    #[test]
    fn statement_deletion_absorbs_the_forced_outcomes() {
        let ctx = RunContext::new([OpId::Ror, OpId::Sdl]);
        let (descriptions, suppressed) =
            run("class A { int f(int x) { if (x > 10) { return 1; } return 0; } }", &ctx);
        assert_eq!(descriptions.len(), 5);
        assert_eq!(suppressed, 2);
        assert!(descriptions.iter().all(|d| !d.ends_with("true") && !d.ends_with("false")));
    }

    #[test]
    fn reference_comparison_proposes_only_the_opposite() {
        let ctx = RunContext::new([OpId::Ror]);
        let (descriptions, _) = run(
            "class A { boolean same(String a, String b) { if (a == b) { return true; } return false; } }",
            &ctx,
        );
        assert_eq!(descriptions, vec!["a == b => a != b"]);
    }

    #[test]
    fn length_guard_takes_the_arithmetic_path() {
        let ctx = RunContext::new([OpId::Ror]);
        let (descriptions, suppressed) = run(
            "class A { int f(int[] data) { if (data.length != 0) { return data[0]; } return -1; } }",
            &ctx,
        );
        // the read resolves to int, so the full fan applies; the two strict
        // variants of the emptiness test are screened out as equivalent
        assert_eq!(suppressed, 2);
        assert_eq!(
            descriptions,
            vec![
                "data.length != 0 => data.length >= 0",
                "data.length != 0 => data.length <= 0",
                "data.length != 0 => data.length == 0",
                "data.length != 0 => true",
                "data.length != 0 => false",
            ]
        );
    }

    #[test]
    fn nested_comparisons_are_all_visited() {
        let ctx = RunContext::new([OpId::Ror]);
        let (descriptions, _) = run(
            "class A { boolean f(int x, int y) { return x > 0 && y > 0; } }",
            &ctx,
        );
        // two comparison sites, seven candidates each
        assert_eq!(descriptions.len(), 14);
    }
}
