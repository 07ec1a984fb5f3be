//! AORB: binary arithmetic operator replacement

use crate::ast::{BinOp, Fragment, NodeId, NodeKind};
use crate::context;
use crate::mutator::{walk_expr, Emit, Mutator};

pub struct Aorb;

impl Mutator for Aorb {
    fn visit_expr(&mut self, em: &mut Emit<'_>, expr: NodeId) {
        if let NodeKind::Binary { op, left, right } = *em.unit.kind(expr) {
            // `+` over strings is concatenation; only numeric sites qualify
            if op.is_arithmetic()
                && context::is_arithmetic(em.unit, left)
                && context::is_arithmetic(em.unit, right)
            {
                for other in BinOp::ARITHMETIC {
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

    fn run(src: &str) -> Vec<String> {
        let unit = parse_unit(src, "A.java").unwrap();
        let ctx = RunContext::new([OpId::Aorb]);
        let mut sink = MemorySink::default();
        run_mutator(&mut Aorb, &unit, OpId::Aorb, &ctx, Some(&mut sink));
        sink.mutants.iter().map(|m| m.description.clone()).collect()
    }

    #[test]
    fn each_site_proposes_the_other_four() {
        let descriptions = run("class A { int f(int a, int b) { return a + b; } }");
        assert_eq!(
            descriptions,
            vec![
                "a + b => a - b",
                "a + b => a * b",
                "a + b => a / b",
                "a + b => a % b",
            ]
        );
    }

    #[test]
    fn string_concatenation_is_exempt() {
        let descriptions =
            run("class A { String f(String s, int n) { return s + n; } }");
        assert!(descriptions.is_empty());
    }
}
