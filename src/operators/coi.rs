//! COI: guard negation
//!
//! Wraps each branch and loop guard in `!`, one mutant per guard.

use crate::ast::{Fragment, NodeId, NodeKind, UnOp};
use crate::mutator::{walk_stmt, Emit, Mutator};

pub struct Coi;

impl Coi {
    fn negate(&self, em: &mut Emit<'_>, cond: NodeId) {
        em.emit(
            cond,
            Fragment::Unary {
                op: UnOp::Not,
                operand: Box::new(Fragment::Keep(cond)),
            },
        );
    }
}

impl Mutator for Coi {
    fn visit_stmt(&mut self, em: &mut Emit<'_>, stmt: NodeId) {
        match *em.unit.kind(stmt) {
            NodeKind::If { cond, .. }
            | NodeKind::While { cond, .. }
            | NodeKind::DoWhile { cond, .. } => self.negate(em, cond),
            NodeKind::For {
                cond: Some(cond), ..
            } => self.negate(em, cond),
            _ => {}
        }
        walk_stmt(self, em, stmt);
    }

    fn visit_expr(&mut self, _em: &mut Emit<'_>, _expr: NodeId) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drule::RunContext;
    use crate::emit::MemorySink;
    use crate::mutator::{run_mutator, OpId};
    use crate::parse::parse_unit;

    #[test]
    fn negates_every_guard_once() {
        let src = "\
class A {
    int f(int x) {
        if (x > 0) { x = 1; }
        while (x < 10) { x = x + 1; }
        return x;
    }
}";
        let unit = parse_unit(src, "A.java").unwrap();
        let ctx = RunContext::new([OpId::Coi]);
        let mut sink = MemorySink::default();
        run_mutator(&mut Coi, &unit, OpId::Coi, &ctx, Some(&mut sink));
        let descriptions: Vec<_> =
            sink.mutants.iter().map(|m| m.description.as_str()).collect();
        assert_eq!(
            descriptions,
            vec!["x > 0 => !(x > 0)", "x < 10 => !(x < 10)"]
        );
    }
}
