//! Source rendering
//!
//! Two render modes: [`render_unit`] pretty-prints a whole unit into
//! compilable source for the emitted mutant files, and [`flatten`] gives the
//! single-line form of one subtree used in mutant descriptions and the
//! suppression audit log.

use std::fmt::Write;

use crate::ast::{CompilationUnit, Fragment, NodeId, NodeKind, Receiver, UnOp};

const INDENT: &str = "    ";

/// Render the whole unit as indented source text.
pub fn render_unit(unit: &CompilationUnit) -> String {
    let mut out = String::new();
    if let NodeKind::Unit { classes } = unit.kind(unit.root()) {
        for (i, class) in classes.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            render_class(unit, *class, &mut out);
        }
    }
    out
}

fn render_class(unit: &CompilationUnit, id: NodeId, out: &mut String) {
    if let NodeKind::Class {
        name,
        modifiers,
        members,
    } = unit.kind(id)
    {
        for m in modifiers {
            let _ = write!(out, "{} ", m);
        }
        let _ = writeln!(out, "class {} {{", name);
        for (i, member) in members.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            render_member(unit, *member, out);
        }
        let _ = writeln!(out, "}}");
    }
}

fn render_member(unit: &CompilationUnit, id: NodeId, out: &mut String) {
    match unit.kind(id) {
        NodeKind::Field {
            name,
            modifiers,
            ty,
            init,
        } => {
            out.push_str(INDENT);
            for m in modifiers {
                let _ = write!(out, "{} ", m);
            }
            let _ = write!(out, "{} {}", ty, name);
            if let Some(init) = init {
                let _ = write!(out, " = {}", flatten(unit, *init));
            }
            out.push_str(";\n");
        }
        NodeKind::Method {
            name,
            modifiers,
            ret,
            params,
            body,
        } => {
            out.push_str(INDENT);
            for m in modifiers {
                let _ = write!(out, "{} ", m);
            }
            let sig: Vec<String> = params
                .iter()
                .map(|p| format!("{} {}", p.ty, p.name))
                .collect();
            let _ = write!(out, "{} {}({}) ", ret, name, sig.join(", "));
            render_block(unit, *body, 1, out);
            out.push('\n');
        }
        NodeKind::Ctor {
            name,
            modifiers,
            params,
            body,
        } => {
            out.push_str(INDENT);
            for m in modifiers {
                let _ = write!(out, "{} ", m);
            }
            let sig: Vec<String> = params
                .iter()
                .map(|p| format!("{} {}", p.ty, p.name))
                .collect();
            let _ = write!(out, "{}({}) ", name, sig.join(", "));
            render_block(unit, *body, 1, out);
            out.push('\n');
        }
        _ => {}
    }
}

fn render_block(unit: &CompilationUnit, id: NodeId, depth: usize, out: &mut String) {
    out.push_str("{\n");
    if let NodeKind::Block { stmts } = unit.kind(id) {
        for stmt in stmts {
            render_stmt(unit, *stmt, depth + 1, out);
        }
    }
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push('}');
}

fn render_stmt(unit: &CompilationUnit, id: NodeId, depth: usize, out: &mut String) {
    let pad = INDENT.repeat(depth);
    match unit.kind(id) {
        NodeKind::Block { .. } => {
            out.push_str(&pad);
            render_block(unit, id, depth, out);
            out.push('\n');
        }
        NodeKind::ExprStmt { expr } => {
            let _ = writeln!(out, "{}{};", pad, flatten(unit, *expr));
        }
        NodeKind::LocalDecl { name, ty, init } => {
            out.push_str(&pad);
            let _ = write!(out, "{} {}", ty, name);
            if let Some(init) = init {
                let _ = write!(out, " = {}", flatten(unit, *init));
            }
            out.push_str(";\n");
        }
        NodeKind::If {
            cond,
            then_branch,
            else_branch,
        } => {
            let _ = write!(out, "{}if ({}) ", pad, flatten(unit, *cond));
            render_branch(unit, *then_branch, depth, out);
            if let Some(else_branch) = else_branch {
                out.push_str(" else ");
                render_branch(unit, *else_branch, depth, out);
            }
            out.push('\n');
        }
        NodeKind::While { cond, body } => {
            let _ = write!(out, "{}while ({}) ", pad, flatten(unit, *cond));
            render_branch(unit, *body, depth, out);
            out.push('\n');
        }
        NodeKind::DoWhile { body, cond } => {
            let _ = write!(out, "{}do ", pad);
            render_branch(unit, *body, depth, out);
            let _ = writeln!(out, " while ({});", flatten(unit, *cond));
        }
        NodeKind::For {
            init,
            cond,
            update,
            body,
        } => {
            out.push_str(&pad);
            out.push_str("for (");
            if let Some(init) = init {
                out.push_str(&flatten_for_init(unit, *init));
            }
            out.push_str("; ");
            if let Some(cond) = cond {
                out.push_str(&flatten(unit, *cond));
            }
            out.push_str("; ");
            let steps: Vec<String> = update.iter().map(|u| flatten(unit, *u)).collect();
            out.push_str(&steps.join(", "));
            out.push_str(") ");
            render_branch(unit, *body, depth, out);
            out.push('\n');
        }
        NodeKind::Return { value } => match value {
            Some(v) => {
                let _ = writeln!(out, "{}return {};", pad, flatten(unit, *v));
            }
            None => {
                let _ = writeln!(out, "{}return;", pad);
            }
        },
        NodeKind::Throw { value } => {
            let _ = writeln!(out, "{}throw {};", pad, flatten(unit, *value));
        }
        NodeKind::Break => {
            let _ = writeln!(out, "{}break;", pad);
        }
        NodeKind::Continue => {
            let _ = writeln!(out, "{}continue;", pad);
        }
        NodeKind::Empty => {
            let _ = writeln!(out, "{};", pad);
        }
        _ => {
            // expression in statement position, from statement replacement
            let _ = writeln!(out, "{}{};", pad, flatten(unit, id));
        }
    }
}

fn render_branch(unit: &CompilationUnit, id: NodeId, depth: usize, out: &mut String) {
    if matches!(unit.kind(id), NodeKind::Block { .. }) {
        render_block(unit, id, depth, out);
    } else {
        out.push_str("{\n");
        render_stmt(unit, id, depth + 1, out);
        for _ in 0..depth {
            out.push_str(INDENT);
        }
        out.push('}');
    }
}

fn flatten_for_init(unit: &CompilationUnit, id: NodeId) -> String {
    match unit.kind(id) {
        NodeKind::LocalDecl { name, ty, init } => match init {
            Some(init) => format!("{} {} = {}", ty, name, flatten(unit, *init)),
            None => format!("{} {}", ty, name),
        },
        _ => flatten(unit, id),
    }
}

// Precedence ladder for parenthesization; higher binds tighter.
fn bin_prec(op: crate::ast::BinOp) -> u8 {
    use crate::ast::BinOp::*;
    match op {
        Or => 2,
        And => 3,
        BitOr => 4,
        BitXor => 5,
        BitAnd => 6,
        Eq | Ne => 7,
        Lt | Le | Gt | Ge => 8,
        Add | Sub => 9,
        Mul | Div | Mod => 10,
    }
}

const PREC_ASSIGN: u8 = 1;
const PREC_UNARY: u8 = 11;
const PREC_POSTFIX: u8 = 12;

/// Single-line rendering of the subtree at `id`.
pub fn flatten(unit: &CompilationUnit, id: NodeId) -> String {
    flatten_prec(unit, id, 0)
}

fn flatten_prec(unit: &CompilationUnit, id: NodeId, min: u8) -> String {
    let (text, prec) = match unit.kind(id) {
        NodeKind::Lit { value } => (value.to_string(), PREC_POSTFIX),
        NodeKind::Variable { name, .. } => (name.clone(), PREC_POSTFIX),
        NodeKind::FieldAccess { receiver, name, .. } => {
            (format!("{}{}", receiver_text(unit, receiver), name), PREC_POSTFIX)
        }
        NodeKind::MethodCall {
            receiver,
            name,
            args,
            ..
        } => {
            let rendered: Vec<String> =
                args.iter().map(|a| flatten_prec(unit, *a, 0)).collect();
            (
                format!(
                    "{}{}({})",
                    receiver_text(unit, receiver),
                    name,
                    rendered.join(", ")
                ),
                PREC_POSTFIX,
            )
        }
        NodeKind::Index { base, index } => (
            format!(
                "{}[{}]",
                flatten_prec(unit, *base, PREC_POSTFIX),
                flatten_prec(unit, *index, 0)
            ),
            PREC_POSTFIX,
        ),
        NodeKind::Binary { op, left, right } => {
            let p = bin_prec(*op);
            (
                format!(
                    "{} {} {}",
                    flatten_prec(unit, *left, p),
                    op.symbol(),
                    flatten_prec(unit, *right, p + 1)
                ),
                p,
            )
        }
        NodeKind::Unary { op, operand } => {
            let text = if op.is_prefix() {
                format!("{}{}", op.symbol(), flatten_prec(unit, *operand, PREC_UNARY))
            } else {
                format!("{}{}", flatten_prec(unit, *operand, PREC_POSTFIX), op.symbol())
            };
            (
                text,
                if op.is_prefix() { PREC_UNARY } else { PREC_POSTFIX },
            )
        }
        NodeKind::Assign { op, target, value } => (
            format!(
                "{} {} {}",
                flatten_prec(unit, *target, PREC_UNARY),
                op.symbol(),
                flatten_prec(unit, *value, PREC_ASSIGN)
            ),
            PREC_ASSIGN,
        ),
        NodeKind::Empty => (";".to_string(), PREC_POSTFIX),
        _ => (statement_caption(unit, id), PREC_POSTFIX),
    };
    if prec < min {
        format!("({})", text)
    } else {
        text
    }
}

fn receiver_text(unit: &CompilationUnit, receiver: &Option<Receiver>) -> String {
    match receiver {
        None => String::new(),
        Some(Receiver::This) => "this.".to_string(),
        Some(Receiver::Type(name)) => format!("{}.", name),
        Some(Receiver::Expr(e)) => format!("{}.", flatten_prec(unit, *e, PREC_POSTFIX)),
    }
}

/// One-line caption of a statement for description text, head-only for the
/// compound forms.
fn statement_caption(unit: &CompilationUnit, id: NodeId) -> String {
    match unit.kind(id) {
        NodeKind::ExprStmt { expr } => format!("{};", flatten(unit, *expr)),
        NodeKind::LocalDecl { name, ty, init } => match init {
            Some(init) => format!("{} {} = {};", ty, name, flatten(unit, *init)),
            None => format!("{} {};", ty, name),
        },
        NodeKind::If { cond, .. } => format!("if ({}) {{ ... }}", flatten(unit, *cond)),
        NodeKind::While { cond, .. } => format!("while ({}) {{ ... }}", flatten(unit, *cond)),
        NodeKind::DoWhile { cond, .. } => {
            format!("do {{ ... }} while ({});", flatten(unit, *cond))
        }
        NodeKind::For { cond, .. } => match cond {
            Some(cond) => format!("for (...; {}; ...) {{ ... }}", flatten(unit, *cond)),
            None => "for (...) { ... }".to_string(),
        },
        NodeKind::Return { value } => match value {
            Some(v) => format!("return {};", flatten(unit, *v)),
            None => "return;".to_string(),
        },
        NodeKind::Throw { value } => format!("throw {};", flatten(unit, *value)),
        NodeKind::Break => "break;".to_string(),
        NodeKind::Continue => "continue;".to_string(),
        NodeKind::Block { .. } => "{ ... }".to_string(),
        _ => String::new(),
    }
}

/// Single-line rendering of a replacement fragment, resolved against the unit
/// that its `Keep` leaves refer into.
pub fn flatten_fragment(unit: &CompilationUnit, fragment: &Fragment) -> String {
    fragment_prec(unit, fragment, 0)
}

fn fragment_prec(unit: &CompilationUnit, fragment: &Fragment, min: u8) -> String {
    let (text, prec) = match fragment {
        Fragment::Keep(id) => return flatten_prec(unit, *id, min),
        Fragment::Literal(value) => (value.to_string(), PREC_POSTFIX),
        Fragment::Binary { op, left, right } => {
            let p = bin_prec(*op);
            (
                format!(
                    "{} {} {}",
                    fragment_prec(unit, left, p),
                    op.symbol(),
                    fragment_prec(unit, right, p + 1)
                ),
                p,
            )
        }
        Fragment::Unary { op, operand } => {
            let text = if op.is_prefix() {
                format!("{}{}", op.symbol(), fragment_prec(unit, operand, PREC_UNARY))
            } else {
                format!(
                    "{}{}",
                    fragment_prec(unit, operand, PREC_POSTFIX),
                    op.symbol()
                )
            };
            (
                text,
                if matches!(op, UnOp::PostInc | UnOp::PostDec) {
                    PREC_POSTFIX
                } else {
                    PREC_UNARY
                },
            )
        }
        Fragment::Assign { op, target, value } => (
            format!(
                "{} {} {}",
                fragment_prec(unit, target, PREC_UNARY),
                op.symbol(),
                fragment_prec(unit, value, PREC_ASSIGN)
            ),
            PREC_ASSIGN,
        ),
        Fragment::UnqualifiedField { name, .. } => (name.clone(), PREC_POSTFIX),
        Fragment::Empty => (";".to_string(), PREC_POSTFIX),
    };
    if prec < min {
        format!("({})", text)
    } else {
        text
    }
}
