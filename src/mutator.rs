//! Operator framework
//!
//! Every mutation operator implements [`Mutator`]: a visitor whose default
//! methods walk; an operator overrides only the node kinds it cares about and
//! inherits full traversal for the rest. Candidates flow through
//! [`Emit::emit`], which screens them against the suppression rules before
//! materializing a mutant.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::ast::{CompilationUnit, Fragment, NodeId, NodeKind};
use crate::context;
use crate::drule::{screen, RuleId, RunContext};
use crate::emit::MutantSink;
use crate::error::MutationError;
use crate::printer::{flatten, flatten_fragment};

/// Identifier of a mutation operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OpId {
    Aois,
    Aoiu,
    Aorb,
    Asrs,
    Coi,
    Cor,
    Jtd,
    Lod,
    Loi,
    Odl,
    Ror,
    Sdl,
}

impl OpId {
    pub const ALL: [OpId; 12] = [
        OpId::Aois,
        OpId::Aoiu,
        OpId::Aorb,
        OpId::Asrs,
        OpId::Coi,
        OpId::Cor,
        OpId::Jtd,
        OpId::Lod,
        OpId::Loi,
        OpId::Odl,
        OpId::Ror,
        OpId::Sdl,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OpId::Aois => "AOIS",
            OpId::Aoiu => "AOIU",
            OpId::Aorb => "AORB",
            OpId::Asrs => "ASRS",
            OpId::Coi => "COI",
            OpId::Cor => "COR",
            OpId::Jtd => "JTD",
            OpId::Lod => "LOD",
            OpId::Loi => "LOI",
            OpId::Odl => "ODL",
            OpId::Ror => "ROR",
            OpId::Sdl => "SDL",
        }
    }

    pub fn parse(name: &str) -> Option<OpId> {
        let upper = name.to_ascii_uppercase();
        OpId::ALL.into_iter().find(|op| op.name() == upper)
    }

    /// Class-level operators mutate declarations rather than method bodies
    /// and run in their own pass.
    pub fn is_class_level(self) -> bool {
        matches!(self, OpId::Jtd)
    }
}

impl std::fmt::Display for OpId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A proposed mutation: replace the subtree at `node` with `fragment`.
#[derive(Debug, Clone)]
pub struct MutationSite {
    pub op: OpId,
    pub node: NodeId,
    pub fragment: Fragment,
}

/// Stable identity of an emitted mutant, from which its output directory is
/// derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutantId {
    pub op: OpId,
    /// Flat signature of the enclosing method, or the class name for
    /// class-level operators.
    pub scope: String,
    pub seq: u32,
}

impl MutantId {
    /// Relative directory of this mutant: `<scope>/<OP>_<seq>`.
    pub fn dir(&self) -> PathBuf {
        PathBuf::from(&self.scope).join(format!("{}_{}", self.op.name(), self.seq))
    }

    pub fn label(&self) -> String {
        format!("{}/{}_{}", self.scope, self.op.name(), self.seq)
    }
}

/// A materialized mutant ready for a sink.
#[derive(Debug, Clone)]
pub struct Mutant {
    pub id: MutantId,
    pub unit: CompilationUnit,
    /// `original => replacement` in flattened source form.
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressionKind {
    Equivalent,
    Duplicated,
}

/// One audit entry for a candidate the rule engine turned away.
#[derive(Debug, Clone)]
pub struct SuppressionRecord {
    pub kind: SuppressionKind,
    pub rule: RuleId,
    pub op: OpId,
    /// The operator whose mutant this candidate duplicates, for duplicate
    /// records.
    pub competing: Option<OpId>,
    pub class_name: String,
    pub mutant_dir: String,
    pub description: String,
}

impl SuppressionRecord {
    /// Audit line format: `OP:COMPETING:dir:description` for duplicates and
    /// `OP:dir:description` for equivalents.
    pub fn audit_line(&self) -> String {
        match self.competing {
            Some(competing) => format!(
                "{}:{}:{}:{}",
                self.op.name(),
                competing.name(),
                self.mutant_dir,
                self.description
            ),
            None => format!("{}:{}:{}", self.op.name(), self.mutant_dir, self.description),
        }
    }
}

/// Per-operator emission state threaded through one traversal of one unit.
pub struct Emit<'a> {
    pub unit: &'a CompilationUnit,
    ctx: &'a RunContext,
    op: OpId,
    sink: Option<&'a mut dyn MutantSink>,
    current_scope: Option<String>,
    seq: HashMap<String, u32>,
    pub emitted: Vec<MutantId>,
    pub suppressed: Vec<SuppressionRecord>,
    pub failures: Vec<MutationError>,
}

impl<'a> Emit<'a> {
    pub fn new(
        unit: &'a CompilationUnit,
        ctx: &'a RunContext,
        op: OpId,
        sink: Option<&'a mut dyn MutantSink>,
    ) -> Self {
        Emit {
            unit,
            ctx,
            op,
            sink,
            current_scope: None,
            seq: HashMap::new(),
            emitted: Vec::new(),
            suppressed: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn op(&self) -> OpId {
        self.op
    }

    pub fn set_scope(&mut self, scope: Option<String>) {
        self.current_scope = scope;
    }

    fn scope(&self) -> String {
        self.current_scope
            .clone()
            .unwrap_or_else(|| "unit".to_string())
    }

    /// Reserve the next directory number in the current scope. Suppressed
    /// candidates consume a number too, so no two audit lines of one run
    /// name the same directory.
    fn next_seq(&mut self) -> (String, u32) {
        let scope = self.scope();
        let seq = self.seq.entry(scope.clone()).or_insert(0);
        *seq += 1;
        (scope, *seq)
    }

    /// Screen and, if approved, materialize and emit the replacement of
    /// `original` with `fragment`.
    pub fn emit(&mut self, original: NodeId, fragment: Fragment) {
        let site = MutationSite {
            op: self.op,
            node: original,
            fragment,
        };
        let (scope, seq) = self.next_seq();
        let dir = format!("{}/{}_{}", scope, self.op.name(), seq);
        if let Some(record) = screen(self.unit, &site, self.ctx, &dir) {
            self.ctx.record(record.clone());
            self.suppressed.push(record);
            return;
        }
        self.accept(site, scope, seq);
    }

    /// Record an operator-local suppression that the shared rule engine does
    /// not see, such as an equivalence the operator detects from its own
    /// traversal state.
    pub fn suppress(
        &mut self,
        rule: RuleId,
        kind: SuppressionKind,
        competing: Option<OpId>,
        original: NodeId,
        detail: &str,
    ) {
        let (scope, seq) = self.next_seq();
        let record = SuppressionRecord {
            kind,
            rule,
            op: self.op,
            competing,
            class_name: context::enclosing_class_name(self.unit, original).unwrap_or_default(),
            mutant_dir: format!("{}/{}_{}", scope, self.op.name(), seq),
            description: format!("{} => {}", flatten(self.unit, original), detail),
        };
        self.ctx.record(record.clone());
        self.suppressed.push(record);
    }

    fn accept(&mut self, site: MutationSite, scope: String, seq: u32) {
        let id = MutantId {
            op: self.op,
            scope,
            seq,
        };
        let description = format!(
            "{} => {}",
            flatten(self.unit, site.node),
            flatten_fragment(self.unit, &site.fragment)
        );
        if let Some(sink) = self.sink.as_deref_mut() {
            let (unit, _) = self.unit.apply(site.node, &site.fragment);
            let mutant = Mutant {
                id: id.clone(),
                unit,
                description,
            };
            if let Err(e) = sink.write(&mutant) {
                self.failures.push(e);
                return;
            }
        }
        self.emitted.push(id);
    }
}

/// Visitor over one compilation unit. Default methods walk; operators
/// override the kinds they mutate.
pub trait Mutator {
    fn visit_unit(&mut self, em: &mut Emit<'_>) {
        walk_unit(self, em);
    }

    fn visit_class(&mut self, em: &mut Emit<'_>, class: NodeId) {
        walk_class(self, em, class);
    }

    fn visit_method(&mut self, em: &mut Emit<'_>, method: NodeId) {
        walk_method(self, em, method);
    }

    fn visit_field(&mut self, em: &mut Emit<'_>, field: NodeId) {
        walk_field(self, em, field);
    }

    fn visit_stmt(&mut self, em: &mut Emit<'_>, stmt: NodeId) {
        walk_stmt(self, em, stmt);
    }

    fn visit_expr(&mut self, em: &mut Emit<'_>, expr: NodeId) {
        walk_expr(self, em, expr);
    }
}

pub fn walk_unit<M: Mutator + ?Sized>(m: &mut M, em: &mut Emit<'_>) {
    if let NodeKind::Unit { classes } = em.unit.kind(em.unit.root()) {
        for class in classes.clone() {
            m.visit_class(em, class);
        }
    }
}

pub fn walk_class<M: Mutator + ?Sized>(m: &mut M, em: &mut Emit<'_>, class: NodeId) {
    if let NodeKind::Class { members, .. } = em.unit.kind(class) {
        for member in members.clone() {
            match em.unit.kind(member) {
                NodeKind::Method { .. } | NodeKind::Ctor { .. } => m.visit_method(em, member),
                NodeKind::Field { .. } => m.visit_field(em, member),
                _ => {}
            }
        }
    }
}

pub fn walk_method<M: Mutator + ?Sized>(m: &mut M, em: &mut Emit<'_>, method: NodeId) {
    let body = match em.unit.kind(method) {
        NodeKind::Method { body, .. } | NodeKind::Ctor { body, .. } => *body,
        _ => return,
    };
    em.set_scope(context::method_signature(em.unit, method));
    m.visit_stmt(em, body);
    em.set_scope(None);
}

pub fn walk_field<M: Mutator + ?Sized>(_m: &mut M, _em: &mut Emit<'_>, _field: NodeId) {}

pub fn walk_stmt<M: Mutator + ?Sized>(m: &mut M, em: &mut Emit<'_>, stmt: NodeId) {
    match em.unit.kind(stmt).clone() {
        NodeKind::Block { stmts } => {
            for s in stmts {
                m.visit_stmt(em, s);
            }
        }
        NodeKind::ExprStmt { expr } => m.visit_expr(em, expr),
        NodeKind::LocalDecl { init, .. } => {
            if let Some(init) = init {
                m.visit_expr(em, init);
            }
        }
        NodeKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            m.visit_expr(em, cond);
            m.visit_stmt(em, then_branch);
            if let Some(else_branch) = else_branch {
                m.visit_stmt(em, else_branch);
            }
        }
        NodeKind::While { cond, body } => {
            m.visit_expr(em, cond);
            m.visit_stmt(em, body);
        }
        NodeKind::DoWhile { body, cond } => {
            m.visit_stmt(em, body);
            m.visit_expr(em, cond);
        }
        NodeKind::For {
            init,
            cond,
            update,
            body,
        } => {
            if let Some(init) = init {
                m.visit_stmt(em, init);
            }
            if let Some(cond) = cond {
                m.visit_expr(em, cond);
            }
            for u in update {
                m.visit_expr(em, u);
            }
            m.visit_stmt(em, body);
        }
        NodeKind::Return { value } => {
            if let Some(value) = value {
                m.visit_expr(em, value);
            }
        }
        NodeKind::Throw { value } => m.visit_expr(em, value),
        NodeKind::Break | NodeKind::Continue | NodeKind::Empty => {}
        // expression in statement position
        _ => m.visit_expr(em, stmt),
    }
}

pub fn walk_expr<M: Mutator + ?Sized>(m: &mut M, em: &mut Emit<'_>, expr: NodeId) {
    for child in em.unit.children(expr) {
        m.visit_expr(em, child);
    }
}

/// Traversal outcome of one operator over one unit.
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub emitted: Vec<MutantId>,
    pub suppressed: Vec<SuppressionRecord>,
    pub failures: Vec<MutationError>,
}

/// Run one operator over one unit, emitting approved mutants into `sink`.
pub fn run_mutator<'a>(
    mutator: &mut dyn Mutator,
    unit: &'a CompilationUnit,
    op: OpId,
    ctx: &'a RunContext,
    sink: Option<&'a mut dyn MutantSink>,
) -> RunOutcome {
    let mut em = Emit::new(unit, ctx, op, sink);
    mutator.visit_unit(&mut em);
    RunOutcome {
        emitted: em.emitted,
        suppressed: em.suppressed,
        failures: em.failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Literal;
    use crate::emit::MemorySink;
    use crate::parse::parse_unit;

    /// Toy operator: replaces every comparison with `true`.
    struct GuardForcer;

    impl Mutator for GuardForcer {
        fn visit_expr(&mut self, em: &mut Emit<'_>, expr: NodeId) {
            if let NodeKind::Binary { op, .. } = em.unit.kind(expr) {
                if op.is_comparison() {
                    em.emit(expr, Fragment::Literal(Literal::Bool(true)));
                }
            }
            walk_expr(self, em, expr);
        }
    }

    #[test]
    fn walk_sets_method_scope_and_numbers_mutants() {
        let src = "class A { int f(int x) { if (x > 1) { return 1; } return 0; } \
                   int g(int y) { if (y < 2) { return 2; } return 3; } }";
        let unit = parse_unit(src, "A.java").unwrap();
        let ctx = RunContext::new([OpId::Ror]);
        let mut sink = MemorySink::default();
        let outcome = run_mutator(&mut GuardForcer, &unit, OpId::Ror, &ctx, Some(&mut sink));

        assert_eq!(outcome.emitted.len(), 2);
        assert_eq!(outcome.emitted[0].label(), "int_f(int)/ROR_1");
        assert_eq!(outcome.emitted[1].label(), "int_g(int)/ROR_1");
        assert_eq!(sink.mutants.len(), 2);
        assert_eq!(sink.mutants[0].description, "x > 1 => true");
    }

    #[test]
    fn emitted_units_differ_by_one_node() {
        let src = "class A { int f(int x) { if (x > 1) { return 1; } return 0; } }";
        let unit = parse_unit(src, "A.java").unwrap();
        let ctx = RunContext::new([OpId::Ror]);
        let mut sink = MemorySink::default();
        run_mutator(&mut GuardForcer, &unit, OpId::Ror, &ctx, Some(&mut sink));
        for m in &sink.mutants {
            assert_eq!(crate::ast::structural_diff(&unit, &m.unit), 1);
        }
    }

    #[test]
    fn without_a_sink_nothing_is_materialized() {
        let src = "class A { int f(int x) { if (x > 1) { return 1; } return 0; } }";
        let unit = parse_unit(src, "A.java").unwrap();
        let ctx = RunContext::new([OpId::Ror]);
        let outcome = run_mutator(&mut GuardForcer, &unit, OpId::Ror, &ctx, None);
        assert_eq!(outcome.emitted.len(), 1);
    }

    #[test]
    fn consecutive_suppressions_reserve_distinct_directories() {
        // proposes both forced outcomes back to back; with SDL enabled both
        // are screened out, and each must log its own directory number
        struct BothOutcomes;
        impl Mutator for BothOutcomes {
            fn visit_expr(&mut self, em: &mut Emit<'_>, expr: NodeId) {
                if let NodeKind::Binary { op, .. } = em.unit.kind(expr) {
                    if op.is_comparison() {
                        em.emit(expr, Fragment::Literal(Literal::Bool(true)));
                        em.emit(expr, Fragment::Literal(Literal::Bool(false)));
                    }
                }
                walk_expr(self, em, expr);
            }
        }

        let src = "class A { int f(int x) { if (x > 1) { return 1; } return 0; } }";
        let unit = parse_unit(src, "A.java").unwrap();
        let ctx = RunContext::new([OpId::Ror, OpId::Sdl]);
        let outcome = run_mutator(&mut BothOutcomes, &unit, OpId::Ror, &ctx, None);

        assert!(outcome.emitted.is_empty());
        let dirs: Vec<_> = outcome
            .suppressed
            .iter()
            .map(|r| r.mutant_dir.as_str())
            .collect();
        assert_eq!(dirs, vec!["int_f(int)/ROR_1", "int_f(int)/ROR_2"]);
    }

    #[test]
    fn audit_line_formats() {
        let dup = SuppressionRecord {
            kind: SuppressionKind::Duplicated,
            rule: RuleId::SdlGuardTrue,
            op: OpId::Ror,
            competing: Some(OpId::Sdl),
            class_name: "A".into(),
            mutant_dir: "int_f(int)/ROR_3".into(),
            description: "x > 1 => true".into(),
        };
        assert_eq!(dup.audit_line(), "ROR:SDL:int_f(int)/ROR_3:x > 1 => true");

        let eq = SuppressionRecord {
            competing: None,
            kind: SuppressionKind::Equivalent,
            rule: RuleId::E13,
            ..dup
        };
        assert_eq!(eq.audit_line(), "ROR:int_f(int)/ROR_3:x > 1 => true");
    }
}
