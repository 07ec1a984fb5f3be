//! JTD: this-qualifier deletion
//!
//! Deletes an explicit `this.` from a field access. A deletion only produces
//! a program with different meaning when the bare name still resolves to the
//! field, so accesses whose name is shadowed by a parameter or local are not
//! candidates: there the stripped form re-binds to the shadowing variable
//! and the mutant equals a different operator's rename, or fails to mean
//! anything at all.
//!
//! Runs in the class-level pass; mutants are filed under the class name.

use std::collections::HashSet;

use crate::ast::{Fragment, NodeId, NodeKind, Receiver};
use crate::context;
use crate::mutator::{Emit, Mutator};

pub struct Jtd;

impl Mutator for Jtd {
    fn visit_class(&mut self, em: &mut Emit<'_>, class: NodeId) {
        let (name, members) = match em.unit.kind(class) {
            NodeKind::Class { name, members, .. } => (name.clone(), members.clone()),
            _ => return,
        };
        let fields: HashSet<String> = members
            .iter()
            .filter_map(|m| match em.unit.kind(*m) {
                NodeKind::Field { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect();

        em.set_scope(Some(name));
        for member in members {
            if !matches!(
                em.unit.kind(member),
                NodeKind::Method { .. } | NodeKind::Ctor { .. }
            ) {
                continue;
            }
            let shadowed: HashSet<String> = context::local_variable_names(em.unit, member)
                .into_iter()
                .collect();
            for id in em.unit.descendants(member) {
                if let NodeKind::FieldAccess {
                    receiver: Some(Receiver::This),
                    name,
                    ty,
                } = em.unit.kind(id)
                {
                    if fields.contains(name) && !shadowed.contains(name) {
                        let fragment = Fragment::UnqualifiedField {
                            name: name.clone(),
                            ty: ty.clone(),
                        };
                        em.emit(id, fragment);
                    }
                }
            }
        }
        em.set_scope(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drule::RunContext;
    use crate::emit::MemorySink;
    use crate::mutator::{run_mutator, OpId};
    use crate::parse::parse_unit;

    fn run(src: &str) -> Vec<(String, String)> {
        let unit = parse_unit(src, "A.java").unwrap();
        let ctx = RunContext::new([OpId::Jtd]);
        let mut sink = MemorySink::default();
        run_mutator(&mut Jtd, &unit, OpId::Jtd, &ctx, Some(&mut sink));
        sink.mutants
            .iter()
            .map(|m| (m.id.label(), m.description.clone()))
            .collect()
    }

    #[test]
    fn unshadowed_qualifiers_are_deleted() {
        let mutants = run(
            "class Counter { int n; void bump(int by) { this.n = this.n + by; } }",
        );
        assert_eq!(
            mutants,
            vec![
                ("Counter/JTD_1".to_string(), "this.n => n".to_string()),
                ("Counter/JTD_2".to_string(), "this.n => n".to_string()),
            ]
        );
    }

    #[test]
    fn shadowed_qualifiers_are_not_candidates() {
        // stripping `this.` would re-bind the name to the parameter
        let mutants = run("class A { int n; A(int n) { this.n = n; } }");
        assert!(mutants.is_empty());
    }

    #[test]
    fn mix_of_shadowed_and_free_accesses() {
        let mutants = run(
            "class A { int n; int m; void f(int n) { this.n = n; this.m = n; } }",
        );
        assert_eq!(mutants.len(), 1);
        assert_eq!(mutants[0].1, "this.m => m");
    }
}
