//! ASRS: compound assignment operator replacement

use crate::ast::{AssignOp, Fragment, NodeId, NodeKind};
use crate::mutator::{walk_expr, Emit, Mutator};

pub struct Asrs;

impl Mutator for Asrs {
    fn visit_expr(&mut self, em: &mut Emit<'_>, expr: NodeId) {
        if let NodeKind::Assign { op, target, value } = *em.unit.kind(expr) {
            if op != AssignOp::Assign {
                for other in AssignOp::COMPOUND {
                    if other != op {
                        em.emit(
                            expr,
                            Fragment::Assign {
                                op: other,
                                target: Box::new(Fragment::Keep(target)),
                                value: Box::new(Fragment::Keep(value)),
                            },
                        );
                    }
                }
            }
        }
        walk_expr(self, em, expr);
    }
}
