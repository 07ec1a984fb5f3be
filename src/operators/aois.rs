//! AOIS: increment and decrement insertion
//!
//! Wraps arithmetic variable and field reads in the four short-cut forms.
//! The post forms are always candidates; the pre forms only matter where the
//! expression's value feeds a surrounding computation, since `v++` and `++v`
//! are the same program when the read value is not consumed further.
//!
//! A post form on a local variable's final read is equivalent to the original
//! program, because the deferred store dies with the frame. That check is
//! disarmed inside loops, where a later iteration re-reads the variable.

use std::collections::{HashMap, HashSet};

use crate::ast::{Fragment, NodeId, NodeKind, UnOp};
use crate::context;
use crate::drule::RuleId;
use crate::mutator::{walk_expr, walk_method, walk_stmt, Emit, Mutator, SuppressionKind};
use crate::printer::flatten;

#[derive(Default)]
pub struct Aois {
    loops: usize,
    in_return: bool,
    value_feeds_context: bool,
    locals: HashSet<String>,
    last_in_method: HashMap<String, NodeId>,
    last_in_return: HashMap<String, NodeId>,
}

impl Aois {
    /// The rule that proves a post form equivalent at this read, if any.
    fn post_equivalence(&self, em: &Emit<'_>, id: NodeId) -> Option<RuleId> {
        let name = match em.unit.kind(id) {
            NodeKind::Variable { name, .. } => name,
            _ => return None,
        };
        if !self.locals.contains(name) || self.loops > 0 || !self.in_return {
            return None;
        }
        if self.last_in_return.get(name) == Some(&id) {
            Some(RuleId::AoisLastUseReturn)
        } else if self.last_in_method.get(name) == Some(&id) {
            Some(RuleId::AoisLastUseMethod)
        } else {
            None
        }
    }

    fn propose(&mut self, em: &mut Emit<'_>, id: NodeId) {
        if !context::is_arithmetic(em.unit, id) {
            return;
        }
        let equivalence = self.post_equivalence(em, id);
        for op in [UnOp::PostInc, UnOp::PostDec] {
            match equivalence {
                Some(rule) => {
                    let detail = format!("{}{}", flatten(em.unit, id), op.symbol());
                    em.suppress(rule, SuppressionKind::Equivalent, None, id, &detail);
                }
                None => em.emit(
                    id,
                    Fragment::Unary {
                        op,
                        operand: Box::new(Fragment::Keep(id)),
                    },
                ),
            }
        }
        if self.value_feeds_context {
            for op in [UnOp::PreInc, UnOp::PreDec] {
                em.emit(
                    id,
                    Fragment::Unary {
                        op,
                        operand: Box::new(Fragment::Keep(id)),
                    },
                );
            }
        }
    }
}

impl Mutator for Aois {
    fn visit_method(&mut self, em: &mut Emit<'_>, method: NodeId) {
        self.locals = context::local_variable_names(em.unit, method)
            .into_iter()
            .collect();
        let names: Vec<String> = self.locals.iter().cloned().collect();
        self.last_in_method = context::last_variable_references(em.unit, method, &names);
        walk_method(self, em, method);
    }

    fn visit_stmt(&mut self, em: &mut Emit<'_>, stmt: NodeId) {
        match em.unit.kind(stmt) {
            NodeKind::While { .. } | NodeKind::DoWhile { .. } | NodeKind::For { .. } => {
                self.loops += 1;
                walk_stmt(self, em, stmt);
                self.loops -= 1;
            }
            NodeKind::Return { .. } => {
                let names: Vec<String> = self.locals.iter().cloned().collect();
                self.last_in_return = context::last_variable_references(em.unit, stmt, &names);
                self.in_return = true;
                walk_stmt(self, em, stmt);
                self.in_return = false;
            }
            _ => walk_stmt(self, em, stmt),
        }
    }

    fn visit_expr(&mut self, em: &mut Emit<'_>, expr: NodeId) {
        match *em.unit.kind(expr) {
            NodeKind::Variable { .. } | NodeKind::FieldAccess { .. } => self.propose(em, expr),
            // never stack onto an existing unary operator
            NodeKind::Unary { .. } => {}
            NodeKind::Binary { left, right, .. } => {
                let saved = self.value_feeds_context;
                self.value_feeds_context = true;
                self.visit_expr(em, left);
                self.visit_expr(em, right);
                self.value_feeds_context = saved;
            }
            NodeKind::Assign { value, .. } => {
                // the target is an lvalue; only the stored value is wrapped
                let saved = self.value_feeds_context;
                self.value_feeds_context = true;
                self.visit_expr(em, value);
                self.value_feeds_context = saved;
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

    fn run(src: &str) -> (Vec<String>, Vec<RuleId>) {
        let unit = parse_unit(src, "A.java").unwrap();
        let ctx = RunContext::new([OpId::Aois]);
        let mut sink = MemorySink::default();
        let outcome = run_mutator(&mut Aois::default(), &unit, OpId::Aois, &ctx, Some(&mut sink));
        (
            sink.mutants.iter().map(|m| m.description.clone()).collect(),
            outcome.suppressed.iter().map(|r| r.rule).collect(),
        )
    }

    #[test]
    fn dying_local_reads_drop_to_nothing() {
        let (descriptions, rules) = run(
            "class A { int f(int a, int b) { int v = a; return v; } }",
        );
        // `a` feeds the initializer: the post forms survive, the pre forms
        // are the same program with the value unconsumed further.
        // `v` is read once, in the return: both post forms are equivalent and
        // no pre form applies.
        assert_eq!(descriptions, vec!["a => a++", "a => a--"]);
        assert_eq!(rules, vec![RuleId::AoisLastUseReturn, RuleId::AoisLastUseReturn]);
    }

    #[test]
    fn value_consuming_contexts_enable_the_pre_forms() {
        let (descriptions, rules) = run("class A { int f(int a) { return a + 1; } }");
        // the post forms on the final read still die with the frame; only the
        // pre forms change the returned value
        assert_eq!(descriptions, vec!["a => ++a", "a => --a"]);
        assert_eq!(rules, vec![RuleId::AoisLastUseReturn, RuleId::AoisLastUseReturn]);
    }

    #[test]
    fn loops_disarm_the_last_use_check() {
        let (descriptions, rules) = run(
            "class A { int f(int n) { while (n > 0) { return n; } return 0; } }",
        );
        // the read of `n` in the loop's return is not provably final
        assert!(descriptions.iter().any(|d| d == "n => n++"));
        assert!(rules.is_empty());
    }

    #[test]
    fn every_final_read_in_a_return_is_suppressed() {
        let (descriptions, rules) = run(
            "class A { int f(int v, boolean c) { if (c) { return v; } return v; } }",
        );
        // each return exits the method, so the deferred store is lost on
        // either path
        assert!(descriptions.is_empty());
        assert_eq!(rules.len(), 4);
        assert!(rules.iter().all(|r| *r == RuleId::AoisLastUseReturn));
    }

    #[test]
    fn field_reads_are_never_proved_final() {
        let (descriptions, rules) = run("class A { int n; int f() { return n; } }");
        assert_eq!(descriptions, vec!["n => n++", "n => n--"]);
        assert!(rules.is_empty());
    }

    #[test]
    fn assignment_targets_are_not_wrapped() {
        let (descriptions, _) = run("class A { void f(int x, int y) { x = y; } }");
        assert_eq!(
            descriptions,
            vec!["y => y++", "y => y--", "y => ++y", "y => --y"]
        );
    }
}
