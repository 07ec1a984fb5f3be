//! Equivalent- and duplicate-mutant suppression
//!
//! Candidates arrive here before they are materialized. A rule either proves
//! the candidate behaviorally equal to the original program (equivalent) or
//! equal to a mutant another enabled operator will produce (duplicate).
//! Duplicate rules only fire when the competing operator is actually enabled
//! for the run, which is why the shared [`RunContext`] carries the enabled
//! set.
//!
//! Every suppression is recorded, never silently dropped: the audit log keeps
//! mutant counts explainable after the fact.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use tracing::debug;

use crate::ast::{BinOp, CompilationUnit, Fragment, Literal, NodeId, NodeKind, Receiver, UnOp};
use crate::context;
use crate::error::{MutationError, Result};
use crate::mutator::{MutationSite, OpId, SuppressionKind, SuppressionRecord};
use crate::printer::{flatten, flatten_fragment};

/// Identifier of a suppression rule, used in logs and the audit files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleId {
    /// Forcing an `if` guard without `else` to `false` equals deleting the
    /// statement.
    SdlGuardFalse,
    /// Forcing a loop or `if` guard to `true` equals deleting the guard.
    SdlGuardTrue,
    /// Emptiness tests on strings and arrays inside an `if` guard.
    E13,
    /// Negating an operand of a comparison against zero inside an `if` guard.
    E15,
    /// Relaxing the exit comparison of a counting loop.
    E17,
    /// Relaxing a comparison whose equality case is overwritten by the body.
    E20,
    /// Comparisons against the extreme values of an integral type.
    E23,
    /// Negating the operand of a `%=` assignment.
    D43,
    /// Forcing a zero-comparison of a field to a constant truth value.
    D49,
    /// `!=` proposals over emptiness tests already covered by another
    /// relational mutant.
    D66,
    /// Truth-value forcing of a returned comparison.
    D70,
    /// Deleting a `~` equals the operand-level deletion mutant.
    OdlComplement,
    /// Post-increment of a variable's last read in a `return`.
    AoisLastUseReturn,
    /// Post-increment of a variable's method-wide last read, seen from a
    /// `return`.
    AoisLastUseMethod,
}

impl RuleId {
    pub fn name(self) -> &'static str {
        match self {
            RuleId::SdlGuardFalse => "SDL1",
            RuleId::SdlGuardTrue => "SDL2",
            RuleId::E13 => "E13",
            RuleId::E15 => "E15",
            RuleId::E17 => "E17",
            RuleId::E20 => "E20",
            RuleId::E23 => "E23",
            RuleId::D43 => "D43",
            RuleId::D49 => "D49",
            RuleId::D66 => "D66",
            RuleId::D70 => "D70",
            RuleId::OdlComplement => "ODL1",
            RuleId::AoisLastUseReturn => "AOIS1",
            RuleId::AoisLastUseMethod => "AOIS2",
        }
    }
}

/// Shared state of one generation run: which operators are enabled, and the
/// suppression audit log. Shared by reference across worker threads.
#[derive(Debug, Default)]
pub struct RunContext {
    enabled: Mutex<HashSet<OpId>>,
    log: Mutex<Vec<SuppressionRecord>>,
}

impl RunContext {
    pub fn new(ops: impl IntoIterator<Item = OpId>) -> Self {
        RunContext {
            enabled: Mutex::new(ops.into_iter().collect()),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn is_enabled(&self, op: OpId) -> bool {
        match self.enabled.lock() {
            Ok(set) => set.contains(&op),
            Err(_) => false,
        }
    }

    pub fn enable(&self, op: OpId) {
        if let Ok(mut set) = self.enabled.lock() {
            set.insert(op);
        }
    }

    pub fn record(&self, record: SuppressionRecord) {
        debug!(
            rule = record.rule.name(),
            op = record.op.name(),
            dir = %record.mutant_dir,
            "suppressed candidate"
        );
        if let Ok(mut log) = self.log.lock() {
            log.push(record);
        }
    }

    pub fn records(&self) -> Vec<SuppressionRecord> {
        match self.log.lock() {
            Ok(log) => log.clone(),
            Err(_) => Vec::new(),
        }
    }

    /// Append the audit log to `duplicated_mutants` and `equivalent_mutants`
    /// under `dir`, one line per suppressed candidate.
    pub fn write_audit(&self, dir: &Path) -> Result<()> {
        let records = self.records();
        if records.is_empty() {
            return Ok(());
        }
        std::fs::create_dir_all(dir).map_err(|e| MutationError::Emission {
            path: dir.to_path_buf(),
            error: e,
        })?;
        for (kind, file) in [
            (SuppressionKind::Duplicated, "duplicated_mutants"),
            (SuppressionKind::Equivalent, "equivalent_mutants"),
        ] {
            let lines: Vec<String> = records
                .iter()
                .filter(|r| r.kind == kind)
                .map(SuppressionRecord::audit_line)
                .collect();
            if lines.is_empty() {
                continue;
            }
            let path = dir.join(file);
            let mut out = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| MutationError::Emission {
                    path: path.clone(),
                    error: e,
                })?;
            for line in lines {
                writeln!(out, "{}", line).map_err(|e| MutationError::Emission {
                    path: path.clone(),
                    error: e,
                })?;
            }
        }
        Ok(())
    }
}

/// Screen one candidate. `Some` carries the suppression record to log; `None`
/// approves the candidate for emission. `pending_dir` is the directory the
/// mutant would have occupied, so audit lines stay traceable.
pub fn screen(
    unit: &CompilationUnit,
    site: &MutationSite,
    ctx: &RunContext,
    pending_dir: &str,
) -> Option<SuppressionRecord> {
    let hit = match site.op {
        OpId::Ror => screen_ror(unit, site, ctx),
        OpId::Lod if ctx.is_enabled(OpId::Odl) => Some((
            RuleId::OdlComplement,
            SuppressionKind::Duplicated,
            Some(OpId::Odl),
        )),
        OpId::Aoiu => screen_aoiu(unit, site, ctx),
        _ => None,
    }?;
    let (rule, kind, competing) = hit;
    Some(SuppressionRecord {
        kind,
        rule,
        op: site.op,
        competing,
        class_name: context::enclosing_class_name(unit, site.node).unwrap_or_default(),
        mutant_dir: pending_dir.to_string(),
        description: format!(
            "{} => {}",
            flatten(unit, site.node),
            flatten_fragment(unit, &site.fragment)
        ),
    })
}

type RuleHit = (RuleId, SuppressionKind, Option<OpId>);

fn screen_ror(unit: &CompilationUnit, site: &MutationSite, ctx: &RunContext) -> Option<RuleHit> {
    let (orig_op, left, right) = match unit.kind(site.node) {
        NodeKind::Binary { op, left, right } => (*op, *left, *right),
        _ => return None,
    };
    match &site.fragment {
        Fragment::Binary { op: new_op, .. } => {
            screen_ror_relational(unit, site.node, orig_op, left, right, *new_op)
        }
        Fragment::Literal(Literal::Bool(value)) => {
            screen_ror_literal(unit, site.node, orig_op, left, right, *value, ctx)
        }
        _ => None,
    }
}

/// Rules over `cmp -> cmp'` proposals.
fn screen_ror_relational(
    unit: &CompilationUnit,
    node: NodeId,
    orig: BinOp,
    left: NodeId,
    right: NodeId,
    proposed: BinOp,
) -> Option<RuleHit> {
    let guarded = context::in_if_condition(unit, node);
    let emptiness_shape = guarded
        && context::contains_zero_literal(unit, node)
        && context::contains_length_access(unit, node)
        && context::contains_string_or_array(unit, node);

    if emptiness_shape {
        // Lengths are non-negative, so over an emptiness guard a proposed
        // `!=` always coincides with another candidate of the same fan
        // (`v.length != 0` is `v.length > 0`), whatever the original test.
        if proposed == BinOp::Ne {
            return Some((RuleId::D66, SuppressionKind::Duplicated, Some(OpId::Ror)));
        }
        let equivalent = matches!(
            (orig, proposed),
            (BinOp::Ne, BinOp::Lt)
                | (BinOp::Ne, BinOp::Gt)
                | (BinOp::Gt, BinOp::Ne)
                | (BinOp::Lt, BinOp::Ne)
                | (BinOp::Eq, BinOp::Le)
        );
        if equivalent {
            return Some((RuleId::E13, SuppressionKind::Equivalent, None));
        }
    }

    if guarded && overwrites_equality_case(unit, node, left, right) {
        let relaxation = matches!(
            (orig, proposed),
            (BinOp::Lt, BinOp::Le) | (BinOp::Gt, BinOp::Ge)
        );
        if relaxation {
            return Some((RuleId::E20, SuppressionKind::Equivalent, None));
        }
    }

    if let Some(extreme) = extreme_constant(unit, left, right) {
        let equivalent = match extreme {
            Extreme::Max => orig == BinOp::Eq && proposed == BinOp::Ge,
            Extreme::Min => orig == BinOp::Eq && proposed == BinOp::Le,
        };
        if equivalent {
            return Some((RuleId::E23, SuppressionKind::Equivalent, None));
        }
    }

    if is_counting_loop_exit(unit, node, left, right) {
        let equivalent = matches!(
            (orig, proposed),
            (BinOp::Lt, BinOp::Ne) | (BinOp::Ne, BinOp::Lt)
        );
        if equivalent {
            return Some((RuleId::E17, SuppressionKind::Equivalent, None));
        }
    }

    None
}

/// Rules over `cmp -> true/false` proposals.
fn screen_ror_literal(
    unit: &CompilationUnit,
    node: NodeId,
    orig: BinOp,
    left: NodeId,
    right: NodeId,
    value: bool,
    ctx: &RunContext,
) -> Option<RuleHit> {
    if ctx.is_enabled(OpId::Sdl) {
        if let Some(parent) = unit.parent(node) {
            match unit.kind(parent) {
                NodeKind::If {
                    cond, else_branch, ..
                } if *cond == node => {
                    if !value && else_branch.is_none() {
                        // same effect as deleting the whole if statement
                        return Some((
                            RuleId::SdlGuardFalse,
                            SuppressionKind::Duplicated,
                            Some(OpId::Sdl),
                        ));
                    }
                    if value {
                        return Some((
                            RuleId::SdlGuardTrue,
                            SuppressionKind::Duplicated,
                            Some(OpId::Sdl),
                        ));
                    }
                }
                NodeKind::While { cond, .. } | NodeKind::DoWhile { cond, .. }
                    if *cond == node && value =>
                {
                    return Some((
                        RuleId::SdlGuardTrue,
                        SuppressionKind::Duplicated,
                        Some(OpId::Sdl),
                    ));
                }
                _ => {}
            }
        }
        if context::in_return(unit, node) {
            // SDL deletes the return; the forced truth value can't be told
            // apart from it by any caller of a deleted statement
            return Some((RuleId::D70, SuppressionKind::Duplicated, Some(OpId::Sdl)));
        }
    }

    if ctx.is_enabled(OpId::Loi) {
        // `field == 0` forced to false equals `~field == 0` and friends
        let forces_away_from_truth = match orig {
            BinOp::Lt | BinOp::Le | BinOp::Eq => !value,
            BinOp::Gt | BinOp::Ge | BinOp::Ne => value,
            _ => return None,
        };
        let field_against_zero = (is_field_read(unit, left) && is_zero_lit(unit, right))
            || (is_field_read(unit, right) && is_zero_lit(unit, left));
        if forces_away_from_truth && field_against_zero {
            return Some((RuleId::D49, SuppressionKind::Duplicated, Some(OpId::Loi)));
        }
    }

    None
}

fn screen_aoiu(unit: &CompilationUnit, site: &MutationSite, ctx: &RunContext) -> Option<RuleHit> {
    if !ctx.is_enabled(OpId::Asrs) {
        return None;
    }
    if !matches!(
        &site.fragment,
        Fragment::Unary {
            op: UnOp::Neg,
            ..
        }
    ) {
        return None;
    }
    // negating the RHS of `x %= e` equals swapping the operator, which the
    // assignment-operator replacement will do anyway
    let mut cur = site.node;
    for anc in unit.ancestors(site.node) {
        match unit.kind(anc) {
            NodeKind::Assign {
                op: crate::ast::AssignOp::ModAssign,
                value,
                ..
            } if *value == cur => {
                return Some((RuleId::D43, SuppressionKind::Duplicated, Some(OpId::Asrs)));
            }
            k if k.is_statement() => return None,
            _ => {}
        }
        cur = anc;
    }
    None
}

// ---- shape helpers ----

fn is_zero_lit(unit: &CompilationUnit, id: NodeId) -> bool {
    matches!(unit.kind(id), NodeKind::Lit { value } if value.is_zero())
}

fn is_field_read(unit: &CompilationUnit, id: NodeId) -> bool {
    matches!(
        unit.kind(id),
        NodeKind::FieldAccess {
            receiver: None | Some(Receiver::This),
            ..
        }
    )
}

/// `if (a < b) { a = b; ... }`: the comparison's equality case is
/// indistinguishable because the branch immediately overwrites `a` with `b`.
fn overwrites_equality_case(
    unit: &CompilationUnit,
    cond: NodeId,
    left: NodeId,
    right: NodeId,
) -> bool {
    let (lname, rname) = match (unit.kind(left), unit.kind(right)) {
        (NodeKind::Variable { name: l, .. }, NodeKind::Variable { name: r, .. }) => {
            (l.clone(), r.clone())
        }
        _ => return false,
    };
    let then_branch = match unit.parent(cond).map(|p| unit.kind(p)) {
        Some(NodeKind::If {
            cond: c,
            then_branch,
            ..
        }) if *c == cond => *then_branch,
        _ => return false,
    };
    unit.descendants(then_branch).into_iter().any(|id| {
        let NodeKind::Assign {
            op: crate::ast::AssignOp::Assign,
            target,
            value,
        } = unit.kind(id)
        else {
            return false;
        };
        matches!(unit.kind(*target), NodeKind::Variable { name, .. } if *name == lname)
            && matches!(unit.kind(*value), NodeKind::Variable { name, .. } if *name == rname)
    })
}

enum Extreme {
    Max,
    Min,
}

/// Comparison of a variable against `Integer.MAX_VALUE`/`MIN_VALUE` (or the
/// other integral carriers).
fn extreme_constant(unit: &CompilationUnit, left: NodeId, right: NodeId) -> Option<Extreme> {
    for side in [left, right] {
        if let NodeKind::FieldAccess {
            receiver: Some(Receiver::Type(_)),
            name,
            ..
        } = unit.kind(side)
        {
            match name.as_str() {
                "MAX_VALUE" => return Some(Extreme::Max),
                "MIN_VALUE" => return Some(Extreme::Min),
                _ => {}
            }
        }
    }
    None
}

/// `for (int i = ...; i < bound.length; i++)` where the body never writes the
/// counter: relaxing `<` to `!=` cannot change the iteration count.
fn is_counting_loop_exit(
    unit: &CompilationUnit,
    cond: NodeId,
    left: NodeId,
    right: NodeId,
) -> bool {
    let parent = match unit.parent(cond) {
        Some(p) => p,
        None => return false,
    };
    let (init, loop_cond, update, body) = match unit.kind(parent) {
        NodeKind::For {
            init,
            cond,
            update,
            body,
        } => (*init, *cond, update.clone(), *body),
        _ => return false,
    };
    if loop_cond != Some(cond) {
        return false;
    }
    let counter = match unit.kind(left) {
        NodeKind::Variable { name, ty } if matches!(ty, Some(t) if t.is_integral()) => {
            name.clone()
        }
        _ => return false,
    };
    // counter declared (or assigned) in the loop header
    let initialized = match init.map(|i| unit.kind(i)) {
        Some(NodeKind::LocalDecl { name, init, .. }) => *name == counter && init.is_some(),
        Some(NodeKind::ExprStmt { expr }) => matches!(
            unit.kind(*expr),
            NodeKind::Assign { target, .. }
                if matches!(unit.kind(*target), NodeKind::Variable { name, .. } if *name == counter)
        ),
        _ => false,
    };
    if !initialized {
        return false;
    }
    // update is exactly counter++/++counter
    let steps_by_one = update.iter().any(|u| {
        matches!(
            unit.kind(*u),
            NodeKind::Unary {
                op: UnOp::PostInc | UnOp::PreInc,
                operand,
            } if matches!(unit.kind(*operand), NodeKind::Variable { name, .. } if *name == counter)
        )
    });
    if !steps_by_one {
        return false;
    }
    // bound is a length or size read
    if !context::contains_length_access(unit, right) {
        return false;
    }
    // the body must not move the counter
    !unit.descendants(body).into_iter().any(|id| match unit.kind(id) {
        NodeKind::Assign { target, .. } => {
            matches!(unit.kind(*target), NodeKind::Variable { name, .. } if *name == counter)
        }
        NodeKind::Unary {
            op: UnOp::PreInc | UnOp::PreDec | UnOp::PostInc | UnOp::PostDec,
            operand,
        } => matches!(unit.kind(*operand), NodeKind::Variable { name, .. } if *name == counter),
        _ => false,
    })
}
