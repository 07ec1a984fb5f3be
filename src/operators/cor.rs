//! COR: logical connective replacement

use crate::ast::{BinOp, Fragment, NodeId, NodeKind};
use crate::mutator::{walk_expr, Emit, Mutator};

pub struct Cor;

impl Mutator for Cor {
    fn visit_expr(&mut self, em: &mut Emit<'_>, expr: NodeId) {
        if let NodeKind::Binary { op, left, right } = *em.unit.kind(expr) {
            let swapped = match op {
                BinOp::And => Some(BinOp::Or),
                BinOp::Or => Some(BinOp::And),
                _ => None,
            };
            if let Some(swapped) = swapped {
                em.emit(
                    expr,
                    Fragment::Binary {
                        op: swapped,
                        left: Box::new(Fragment::Keep(left)),
                        right: Box::new(Fragment::Keep(right)),
                    },
                );
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

    #[test]
    fn swaps_each_connective() {
        let src = "class A { boolean f(boolean p, boolean q, boolean r) { return p && q || r; } }";
        let unit = parse_unit(src, "A.java").unwrap();
        let ctx = RunContext::new([OpId::Cor]);
        let mut sink = MemorySink::default();
        run_mutator(&mut Cor, &unit, OpId::Cor, &ctx, Some(&mut sink));
        let descriptions: Vec<_> =
            sink.mutants.iter().map(|m| m.description.as_str()).collect();
        assert_eq!(
            descriptions,
            vec!["p && q || r => p && q && r", "p && q => p || q"]
        );
    }
}
