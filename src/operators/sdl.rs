//! SDL: statement deletion
//!
//! Replaces each deletable statement with the empty statement, then recurses
//! so that the statements nested under a deleted candidate get their own
//! mutants. Declarations and blocks are not candidates; removing a
//! declaration takes every later use of the name with it.

use crate::ast::{Fragment, NodeId, NodeKind};
use crate::mutator::{walk_stmt, Emit, Mutator};

pub struct Sdl;

fn deletable(kind: &NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::ExprStmt { .. }
            | NodeKind::If { .. }
            | NodeKind::While { .. }
            | NodeKind::DoWhile { .. }
            | NodeKind::For { .. }
            | NodeKind::Return { .. }
            | NodeKind::Throw { .. }
            | NodeKind::Break
            | NodeKind::Continue
    )
}

impl Mutator for Sdl {
    fn visit_stmt(&mut self, em: &mut Emit<'_>, stmt: NodeId) {
        if deletable(em.unit.kind(stmt)) {
            em.emit(stmt, Fragment::Empty);
        }
        walk_stmt(self, em, stmt);
    }

    // statements only; expressions are other operators' business
    fn visit_expr(&mut self, _em: &mut Emit<'_>, _expr: NodeId) {}
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
        let ctx = RunContext::new([OpId::Sdl]);
        let mut sink = MemorySink::default();
        run_mutator(&mut Sdl, &unit, OpId::Sdl, &ctx, Some(&mut sink));
        sink.mutants.iter().map(|m| m.description.clone()).collect()
    }

    #[test]
    fn deletes_whole_and_nested_statements() {
        let descriptions = run(
            "class A { int f(int x) { if (x > 0) { x = 1; } return x; } }",
        );
        assert_eq!(
            descriptions,
            vec![
                "if (x > 0) { ... } => ;",
                "x = 1; => ;",
                "return x; => ;",
            ]
        );
    }

    #[test]
    fn declarations_survive() {
        let descriptions = run("class A { int f() { int v = 1; return v; } }");
        assert_eq!(descriptions, vec!["return v; => ;"]);
    }

    #[test]
    fn loop_bodies_are_recursed() {
        let descriptions = run(
            "class A { void f(int n) { while (n > 0) { n = n - 1; } } }",
        );
        assert_eq!(
            descriptions,
            vec!["while (n > 0) { ... } => ;", "n = n - 1; => ;"]
        );
    }
}
