//! Contextual queries over a compilation unit
//!
//! The suppression rules reason about where a candidate sits (inside an `if`
//! guard, inside a loop, in a `for` header) and about static types. All of
//! that is answered here from the tree alone, so the rule engine stays free
//! of traversal code.

use std::collections::HashMap;

use crate::ast::{BinOp, CompilationUnit, NodeId, NodeKind, Receiver, TypeRef, UnOp};

/// Static type of an expression node, when the tree carries enough
/// information to know it.
pub fn expr_type(unit: &CompilationUnit, id: NodeId) -> Option<TypeRef> {
    match unit.kind(id) {
        NodeKind::Variable { ty, .. }
        | NodeKind::FieldAccess { ty, .. }
        | NodeKind::MethodCall { ty, .. } => ty.clone(),
        NodeKind::Lit { value } => value.ty(),
        NodeKind::Binary { op, left, .. } => match op {
            op if op.is_comparison() => Some(TypeRef::Boolean),
            BinOp::And | BinOp::Or => Some(TypeRef::Boolean),
            _ => expr_type(unit, *left),
        },
        NodeKind::Unary { op, operand } => match op {
            UnOp::Not => Some(TypeRef::Boolean),
            _ => expr_type(unit, *operand),
        },
        NodeKind::Assign { target, .. } => expr_type(unit, *target),
        NodeKind::Index { base, .. } => match expr_type(unit, *base) {
            Some(TypeRef::Array(elem)) => Some(*elem),
            _ => None,
        },
        _ => None,
    }
}

pub fn is_arithmetic(unit: &CompilationUnit, id: NodeId) -> bool {
    expr_type(unit, id).is_some_and(|t| t.is_arithmetic())
}

pub fn is_integral(unit: &CompilationUnit, id: NodeId) -> bool {
    expr_type(unit, id).is_some_and(|t| t.is_integral())
}

/// Nearest ancestor satisfying `pred`, if any.
pub fn nearest_enclosing<F>(unit: &CompilationUnit, id: NodeId, pred: F) -> Option<NodeId>
where
    F: Fn(&NodeKind) -> bool,
{
    unit.ancestors(id).find(|a| pred(unit.kind(*a)))
}

/// The method or constructor body the node sits in.
pub fn enclosing_method(unit: &CompilationUnit, id: NodeId) -> Option<NodeId> {
    nearest_enclosing(unit, id, |k| {
        matches!(k, NodeKind::Method { .. } | NodeKind::Ctor { .. })
    })
}

pub fn enclosing_class_name(unit: &CompilationUnit, id: NodeId) -> Option<String> {
    let class = nearest_enclosing(unit, id, |k| matches!(k, NodeKind::Class { .. }))?;
    match unit.kind(class) {
        NodeKind::Class { name, .. } => Some(name.clone()),
        _ => None,
    }
}

/// Directory-safe signature of a method or constructor node, e.g.
/// `int_clamp(int,int)` or `Counter(int)`.
pub fn method_signature(unit: &CompilationUnit, method: NodeId) -> Option<String> {
    match unit.kind(method) {
        NodeKind::Method {
            name, ret, params, ..
        } => {
            let args: Vec<String> = params.iter().map(|p| p.ty.to_string()).collect();
            Some(format!("{}_{}({})", ret, name, args.join(",")))
        }
        NodeKind::Ctor { name, params, .. } => {
            let args: Vec<String> = params.iter().map(|p| p.ty.to_string()).collect();
            Some(format!("{}({})", name, args.join(",")))
        }
        _ => None,
    }
}

/// True when `id` sits inside the condition expression of an `if` statement.
/// The walk stops at the enclosing method boundary.
pub fn in_if_condition(unit: &CompilationUnit, id: NodeId) -> bool {
    let mut cur = id;
    for anc in unit.ancestors(id) {
        match unit.kind(anc) {
            NodeKind::If { cond, .. } if *cond == cur => return true,
            NodeKind::Method { .. } | NodeKind::Ctor { .. } => return false,
            k if k.is_statement() => return false,
            _ => {}
        }
        cur = anc;
    }
    false
}

/// True when `id` sits inside a loop condition or a `for` header.
pub fn in_loop_header(unit: &CompilationUnit, id: NodeId) -> bool {
    let mut cur = id;
    for anc in unit.ancestors(id) {
        match unit.kind(anc) {
            NodeKind::While { cond, .. } | NodeKind::DoWhile { cond, .. } if *cond == cur => {
                return true
            }
            NodeKind::For {
                init,
                cond,
                update,
                body,
            } => {
                if *body != cur
                    && (*init == Some(cur) || *cond == Some(cur) || update.contains(&cur))
                {
                    return true;
                }
                return false;
            }
            NodeKind::Method { .. } | NodeKind::Ctor { .. } => return false,
            k if k.is_statement() => return false,
            _ => {}
        }
        cur = anc;
    }
    false
}

/// True when `id` sits inside a `return` statement's value.
pub fn in_return(unit: &CompilationUnit, id: NodeId) -> bool {
    nearest_enclosing(unit, id, |k| matches!(k, NodeKind::Return { .. })).is_some()
}

/// Whether the subtree contains a zero literal.
pub fn contains_zero_literal(unit: &CompilationUnit, id: NodeId) -> bool {
    unit.descendants(id)
        .into_iter()
        .any(|d| matches!(unit.kind(d), NodeKind::Lit { value } if value.is_zero()))
}

/// Whether the subtree reads a length: an array `.length` field or a
/// `length()`/`size()` call.
pub fn contains_length_access(unit: &CompilationUnit, id: NodeId) -> bool {
    unit.descendants(id).into_iter().any(|d| match unit.kind(d) {
        NodeKind::FieldAccess { name, .. } => name == "length",
        NodeKind::MethodCall { name, args, .. } => {
            args.is_empty() && (name == "length" || name == "size")
        }
        _ => false,
    })
}

/// Whether the subtree touches a string- or array-typed operand.
pub fn contains_string_or_array(unit: &CompilationUnit, id: NodeId) -> bool {
    unit.descendants(id).into_iter().any(|d| {
        expr_type(unit, d).is_some_and(|t| t.is_string() || t.is_array())
    })
    || unit.descendants(id).into_iter().any(|d| match unit.kind(d) {
        NodeKind::FieldAccess { receiver, name, .. } => {
            name == "length" && matches!(receiver, Some(Receiver::Expr(_)))
        }
        NodeKind::MethodCall { name, args, .. } => {
            args.is_empty() && (name == "length" || name == "size")
        }
        _ => false,
    })
}

/// Names of the parameters and local variables declared in a method or
/// constructor body.
pub fn local_variable_names(unit: &CompilationUnit, method: NodeId) -> Vec<String> {
    let mut names = Vec::new();
    match unit.kind(method) {
        NodeKind::Method { params, body, .. } | NodeKind::Ctor { params, body, .. } => {
            names.extend(params.iter().map(|p| p.name.clone()));
            for id in unit.descendants(*body) {
                if let NodeKind::LocalDecl { name, .. } = unit.kind(id) {
                    names.push(name.clone());
                }
            }
        }
        _ => {}
    }
    names
}

/// For each name in `names`, the id of its textually last read inside the
/// subtree rooted at `scope`. Source order follows the child-slot order of
/// the tree.
pub fn last_variable_references(
    unit: &CompilationUnit,
    scope: NodeId,
    names: &[String],
) -> HashMap<String, NodeId> {
    let mut last = HashMap::new();
    for id in ordered_descendants(unit, scope) {
        if let NodeKind::Variable { name, .. } = unit.kind(id) {
            if names.iter().any(|n| n == name) {
                last.insert(name.clone(), id);
            }
        }
    }
    last
}

/// Descendants of `scope` in source order (preorder with children visited in
/// declaration order).
fn ordered_descendants(unit: &CompilationUnit, scope: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    fn go(unit: &CompilationUnit, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        for child in unit.children(id) {
            go(unit, child, out);
        }
    }
    go(unit, scope, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AssignOp, Literal, Param, UnitBuilder};

    fn guard_unit() -> (CompilationUnit, NodeId, NodeId) {
        // class A { int f(int x) { if (x > 0) { x = 1; } while (x < 5) { x = x + 1; } return x; } }
        let mut b = UnitBuilder::new();
        let x1 = b.int_var("x");
        let zero = b.int(0);
        let guard = b.binary(BinOp::Gt, x1, zero);
        let x2 = b.int_var("x");
        let one = b.int(1);
        let asn = b.assign(AssignOp::Assign, x2, one);
        let asn_stmt = b.expr_stmt(asn);
        let then = b.block(vec![asn_stmt]);
        let iff = b.if_stmt(guard, then, None);

        let x3 = b.int_var("x");
        let five = b.int(5);
        let loop_cond = b.binary(BinOp::Lt, x3, five);
        let x4 = b.int_var("x");
        let x5 = b.int_var("x");
        let one2 = b.int(1);
        let sum = b.binary(BinOp::Add, x5, one2);
        let step = b.assign(AssignOp::Assign, x4, sum);
        let step_stmt = b.expr_stmt(step);
        let loop_body = b.block(vec![step_stmt]);
        let wh = b.while_stmt(loop_cond, loop_body);

        let x6 = b.int_var("x");
        let ret = b.ret(Some(x6));
        let body = b.block(vec![iff, wh, ret]);
        let m = b.method(
            "f",
            TypeRef::Int,
            vec![Param {
                name: "x".into(),
                ty: TypeRef::Int,
            }],
            body,
        );
        let class = b.class("A", vec![m]);
        (b.build("A.java", vec![class]), guard, x6)
    }

    #[test]
    fn comparisons_type_as_boolean() {
        let (unit, guard, _) = guard_unit();
        assert_eq!(expr_type(&unit, guard), Some(TypeRef::Boolean));
    }

    #[test]
    fn guard_position_is_detected() {
        let (unit, guard, ret_ref) = guard_unit();
        assert!(in_if_condition(&unit, guard));
        assert!(!in_if_condition(&unit, ret_ref));
        assert!(in_return(&unit, ret_ref));
    }

    #[test]
    fn method_signatures_render_flat() {
        let (unit, guard, _) = guard_unit();
        let m = enclosing_method(&unit, guard).unwrap();
        assert_eq!(method_signature(&unit, m).as_deref(), Some("int_f(int)"));
    }

    #[test]
    fn last_reference_wins_by_source_order() {
        let (unit, _, ret_ref) = guard_unit();
        let m = enclosing_method(&unit, ret_ref).unwrap();
        let names = vec!["x".to_string()];
        let last = last_variable_references(&unit, m, &names);
        assert_eq!(last.get("x"), Some(&ret_ref));
    }

    #[test]
    fn length_and_zero_detection() {
        let mut b = UnitBuilder::new();
        let arr = b.var("data", Some(TypeRef::Array(Box::new(TypeRef::Int))));
        let len = b.field_access(
            Some(Receiver::Expr(arr)),
            "length",
            Some(TypeRef::Int),
        );
        let zero = b.lit(Literal::Int(0));
        let cmp = b.binary(BinOp::Ne, len, zero);
        let ret = b.ret(Some(cmp));
        let body = b.block(vec![ret]);
        let m = b.method("nonEmpty", TypeRef::Boolean, vec![], body);
        let class = b.class("A", vec![m]);
        let unit = b.build("A.java", vec![class]);

        assert!(contains_zero_literal(&unit, cmp));
        assert!(contains_length_access(&unit, cmp));
        assert!(contains_string_or_array(&unit, cmp));
    }
}
