//! LOD: bitwise complement deletion

use crate::ast::{Fragment, NodeId, NodeKind, UnOp};
use crate::mutator::{walk_expr, Emit, Mutator};

pub struct Lod;

impl Mutator for Lod {
    fn visit_expr(&mut self, em: &mut Emit<'_>, expr: NodeId) {
        if let NodeKind::Unary {
            op: UnOp::BitNot,
            operand,
        } = *em.unit.kind(expr)
        {
            em.emit(expr, Fragment::Keep(operand));
        }
        walk_expr(self, em, expr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drule::{RuleId, RunContext};
    use crate::emit::MemorySink;
    use crate::mutator::{run_mutator, OpId};
    use crate::parse::parse_unit;

    #[test]
    fn deletes_each_complement() {
        let src = "class A { int f(int x) { return ~x + ~(x + 1); } }";
        let unit = parse_unit(src, "A.java").unwrap();
        let ctx = RunContext::new([OpId::Lod]);
        let mut sink = MemorySink::default();
        run_mutator(&mut Lod, &unit, OpId::Lod, &ctx, Some(&mut sink));
        let descriptions: Vec<_> = sink.mutants.iter().map(|m| m.description.as_str()).collect();
        assert_eq!(descriptions, vec!["~x => x", "~(x + 1) => x + 1"]);
    }

    #[test]
    fn defers_to_operand_deletion_when_enabled() {
        let src = "class A { int f(int x) { return ~x; } }";
        let unit = parse_unit(src, "A.java").unwrap();
        let ctx = RunContext::new([OpId::Lod, OpId::Odl]);
        let outcome = run_mutator(&mut Lod, &unit, OpId::Lod, &ctx, None);
        assert!(outcome.emitted.is_empty());
        assert_eq!(outcome.suppressed[0].rule, RuleId::OdlComplement);
    }
}
