//! Arena-based syntax tree for one compilation unit
//!
//! Nodes live in a flat `Vec` and refer to each other through [`NodeId`]
//! indices. The parent link is stored as an index too, never as an owning
//! pointer, so copying a unit is a `Vec` clone and node identity survives the
//! copy: the node to mutate is located in the copy by its original id, never
//! by re-searching the tree.

use std::fmt;

/// Opaque index of a node inside its [`CompilationUnit`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Static type of a declaration or expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeRef {
    Int,
    Long,
    Short,
    Byte,
    Char,
    Float,
    Double,
    Boolean,
    Void,
    Named(String),
    Array(Box<TypeRef>),
}

impl TypeRef {
    /// Numeric types that arithmetic operators accept.
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            TypeRef::Int
                | TypeRef::Long
                | TypeRef::Short
                | TypeRef::Byte
                | TypeRef::Char
                | TypeRef::Float
                | TypeRef::Double
        )
    }

    /// Integral types on which bitwise operators are defined.
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            TypeRef::Int | TypeRef::Long | TypeRef::Short | TypeRef::Byte | TypeRef::Char
        )
    }

    pub fn is_string(&self) -> bool {
        matches!(self, TypeRef::Named(n) if n == "String")
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeRef::Array(_))
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Int => write!(f, "int"),
            TypeRef::Long => write!(f, "long"),
            TypeRef::Short => write!(f, "short"),
            TypeRef::Byte => write!(f, "byte"),
            TypeRef::Char => write!(f, "char"),
            TypeRef::Float => write!(f, "float"),
            TypeRef::Double => write!(f, "double"),
            TypeRef::Boolean => write!(f, "boolean"),
            TypeRef::Void => write!(f, "void"),
            TypeRef::Named(n) => write!(f, "{}", n),
            TypeRef::Array(t) => write!(f, "{}[]", t),
        }
    }
}

/// Typed constant literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Bool(bool),
    Char(char),
    Str(String),
    Null,
}

impl Literal {
    pub fn ty(&self) -> Option<TypeRef> {
        match self {
            Literal::Int(_) => Some(TypeRef::Int),
            Literal::Float(_) => Some(TypeRef::Double),
            Literal::Bool(_) => Some(TypeRef::Boolean),
            Literal::Char(_) => Some(TypeRef::Char),
            Literal::Str(_) => Some(TypeRef::Named("String".into())),
            Literal::Null => None,
        }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, Literal::Int(0)) || matches!(self, Literal::Float(f) if *f == 0.0)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(v) => write!(f, "{}", v),
            Literal::Float(v) => {
                if v.fract() == 0.0 {
                    write!(f, "{:.1}", v)
                } else {
                    write!(f, "{}", v)
                }
            }
            Literal::Bool(v) => write!(f, "{}", v),
            Literal::Char(c) => write!(f, "{:?}", c),
            Literal::Str(s) => write!(f, "{:?}", s),
            Literal::Null => write!(f, "null"),
        }
    }
}

/// Binary expression operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
}

impl BinOp {
    pub const COMPARISONS: [BinOp; 6] =
        [BinOp::Gt, BinOp::Ge, BinOp::Lt, BinOp::Le, BinOp::Eq, BinOp::Ne];

    pub const ARITHMETIC: [BinOp; 5] =
        [BinOp::Add, BinOp::Sub, BinOp::Mul, BinOp::Div, BinOp::Mod];

    pub fn is_comparison(self) -> bool {
        Self::COMPARISONS.contains(&self)
    }

    pub fn is_arithmetic(self) -> bool {
        Self::ARITHMETIC.contains(&self)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
        }
    }
}

/// Unary expression operators, including the pre/post increment short-cuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnOp {
    Neg,
    Not,
    BitNot,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl UnOp {
    pub fn is_prefix(self) -> bool {
        !matches!(self, UnOp::PostInc | UnOp::PostDec)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            UnOp::Neg => "-",
            UnOp::Not => "!",
            UnOp::BitNot => "~",
            UnOp::PreInc | UnOp::PostInc => "++",
            UnOp::PreDec | UnOp::PostDec => "--",
        }
    }
}

/// Assignment operators, plain and compound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
}

impl AssignOp {
    pub const COMPOUND: [AssignOp; 5] = [
        AssignOp::AddAssign,
        AssignOp::SubAssign,
        AssignOp::MulAssign,
        AssignOp::DivAssign,
        AssignOp::ModAssign,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::AddAssign => "+=",
            AssignOp::SubAssign => "-=",
            AssignOp::MulAssign => "*=",
            AssignOp::DivAssign => "/=",
            AssignOp::ModAssign => "%=",
        }
    }
}

/// Receiver of a field access or method call.
#[derive(Debug, Clone, PartialEq)]
pub enum Receiver {
    /// Explicit self-qualifier (`this.`)
    This,
    /// Static access through a type name (`Integer.MAX_VALUE`)
    Type(String),
    /// An ordinary expression receiver
    Expr(NodeId),
}

/// Formal parameter of a method or constructor.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeRef,
}

/// One node of the tree. Child links are arena indices; the declaration order
/// of the child slots matches source order, which traversal relies on.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Unit {
        classes: Vec<NodeId>,
    },
    Class {
        name: String,
        modifiers: Vec<String>,
        members: Vec<NodeId>,
    },
    Field {
        name: String,
        modifiers: Vec<String>,
        ty: TypeRef,
        init: Option<NodeId>,
    },
    Method {
        name: String,
        modifiers: Vec<String>,
        ret: TypeRef,
        params: Vec<Param>,
        body: NodeId,
    },
    Ctor {
        name: String,
        modifiers: Vec<String>,
        params: Vec<Param>,
        body: NodeId,
    },

    // Statements
    Block {
        stmts: Vec<NodeId>,
    },
    ExprStmt {
        expr: NodeId,
    },
    LocalDecl {
        name: String,
        ty: TypeRef,
        init: Option<NodeId>,
    },
    If {
        cond: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    },
    While {
        cond: NodeId,
        body: NodeId,
    },
    DoWhile {
        body: NodeId,
        cond: NodeId,
    },
    For {
        init: Option<NodeId>,
        cond: Option<NodeId>,
        update: Vec<NodeId>,
        body: NodeId,
    },
    Return {
        value: Option<NodeId>,
    },
    Throw {
        value: NodeId,
    },
    Break,
    Continue,
    Empty,

    // Expressions
    Variable {
        name: String,
        ty: Option<TypeRef>,
    },
    FieldAccess {
        receiver: Option<Receiver>,
        name: String,
        ty: Option<TypeRef>,
    },
    MethodCall {
        receiver: Option<Receiver>,
        name: String,
        args: Vec<NodeId>,
        ty: Option<TypeRef>,
    },
    Index {
        base: NodeId,
        index: NodeId,
    },
    Binary {
        op: BinOp,
        left: NodeId,
        right: NodeId,
    },
    Unary {
        op: UnOp,
        operand: NodeId,
    },
    Assign {
        op: AssignOp,
        target: NodeId,
        value: NodeId,
    },
    Lit {
        value: Literal,
    },
}

impl NodeKind {
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::Block { .. }
                | NodeKind::ExprStmt { .. }
                | NodeKind::LocalDecl { .. }
                | NodeKind::If { .. }
                | NodeKind::While { .. }
                | NodeKind::DoWhile { .. }
                | NodeKind::For { .. }
                | NodeKind::Return { .. }
                | NodeKind::Throw { .. }
                | NodeKind::Break
                | NodeKind::Continue
                | NodeKind::Empty
        )
    }
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
}

/// Root of one source file's tree. Immutable once built; mutants are produced
/// by [`CompilationUnit::apply`], which copies the whole arena and swaps a
/// single node.
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    nodes: Vec<Node>,
    root: NodeId,
    pub file_name: String,
}

impl CompilationUnit {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub(crate) fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.index()].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    /// Ancestors of `id`, nearest first, not including `id` itself.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            unit: self,
            cur: self.parent(id),
        }
    }

    /// Child ids of a node, in source order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        match self.kind(id) {
            NodeKind::Unit { classes } => out.extend(classes),
            NodeKind::Class { members, .. } => out.extend(members),
            NodeKind::Field { init, .. } => out.extend(init.iter()),
            NodeKind::Method { body, .. } | NodeKind::Ctor { body, .. } => out.push(*body),
            NodeKind::Block { stmts } => out.extend(stmts),
            NodeKind::ExprStmt { expr } => out.push(*expr),
            NodeKind::LocalDecl { init, .. } => out.extend(init.iter()),
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                out.push(*cond);
                out.push(*then_branch);
                out.extend(else_branch.iter());
            }
            NodeKind::While { cond, body } => {
                out.push(*cond);
                out.push(*body);
            }
            NodeKind::DoWhile { body, cond } => {
                out.push(*body);
                out.push(*cond);
            }
            NodeKind::For {
                init,
                cond,
                update,
                body,
            } => {
                out.extend(init.iter());
                out.extend(cond.iter());
                out.extend(update);
                out.push(*body);
            }
            NodeKind::Return { value } => out.extend(value.iter()),
            NodeKind::Throw { value } => out.push(*value),
            NodeKind::Break | NodeKind::Continue | NodeKind::Empty => {}
            NodeKind::Variable { .. } | NodeKind::Lit { .. } => {}
            NodeKind::FieldAccess { receiver, .. } => {
                if let Some(Receiver::Expr(e)) = receiver {
                    out.push(*e);
                }
            }
            NodeKind::MethodCall { receiver, args, .. } => {
                if let Some(Receiver::Expr(e)) = receiver {
                    out.push(*e);
                }
                out.extend(args);
            }
            NodeKind::Index { base, index } => {
                out.push(*base);
                out.push(*index);
            }
            NodeKind::Binary { left, right, .. } => {
                out.push(*left);
                out.push(*right);
            }
            NodeKind::Unary { operand, .. } => out.push(*operand),
            NodeKind::Assign { target, value, .. } => {
                out.push(*target);
                out.push(*value);
            }
        }
        out
    }

    /// Preorder listing of the subtree rooted at `id`, including `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            out.push(n);
            let mut kids = self.children(n);
            kids.reverse();
            stack.extend(kids);
        }
        out
    }

    /// Produce a full copy of this unit with the subtree at `target` replaced
    /// by `fragment`. Returns the copy together with the id of the node that
    /// now stands where `target` stood.
    ///
    /// The copy is identity-preserving: `target` names the same node in the
    /// copy as in the original, so no re-search is needed. Replacing the root
    /// is not supported (no operator proposes it).
    pub fn apply(&self, target: NodeId, fragment: &Fragment) -> (CompilationUnit, NodeId) {
        let mut copy = self.clone();
        let parent = copy
            .parent(target)
            .expect("mutation target must not be the unit root");
        let new_id = copy.materialize(fragment);
        copy.replace_slot(parent, target, new_id);
        copy.nodes[new_id.index()].parent = Some(parent);
        (copy, new_id)
    }

    /// Build `fragment` inside this arena and return its root id. `Keep`
    /// leaves resolve to the original subtree they name; the caller fixes the
    /// parent link of the returned root.
    fn materialize(&mut self, fragment: &Fragment) -> NodeId {
        match fragment {
            Fragment::Keep(id) => *id,
            Fragment::Literal(value) => self.push_detached(NodeKind::Lit {
                value: value.clone(),
            }),
            Fragment::Binary { op, left, right } => {
                let l = self.materialize(left);
                let r = self.materialize(right);
                let id = self.push_detached(NodeKind::Binary {
                    op: *op,
                    left: l,
                    right: r,
                });
                self.nodes[l.index()].parent = Some(id);
                self.nodes[r.index()].parent = Some(id);
                id
            }
            Fragment::Unary { op, operand } => {
                let o = self.materialize(operand);
                let id = self.push_detached(NodeKind::Unary {
                    op: *op,
                    operand: o,
                });
                self.nodes[o.index()].parent = Some(id);
                id
            }
            Fragment::Assign { op, target, value } => {
                let t = self.materialize(target);
                let v = self.materialize(value);
                let id = self.push_detached(NodeKind::Assign {
                    op: *op,
                    target: t,
                    value: v,
                });
                self.nodes[t.index()].parent = Some(id);
                self.nodes[v.index()].parent = Some(id);
                id
            }
            Fragment::UnqualifiedField { name, ty } => self.push_detached(NodeKind::FieldAccess {
                receiver: None,
                name: name.clone(),
                ty: ty.clone(),
            }),
            Fragment::Empty => self.push_detached(NodeKind::Empty),
        }
    }

    fn push_detached(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { kind, parent: None });
        id
    }

    /// Rewrite the child slot of `parent` that pointed at `old` to `new`.
    fn replace_slot(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        let swap = |slot: &mut NodeId| {
            if *slot == old {
                *slot = new;
            }
        };
        let swap_opt = |slot: &mut Option<NodeId>| {
            if *slot == Some(old) {
                *slot = Some(new);
            }
        };
        let swap_vec = |slots: &mut Vec<NodeId>| {
            for slot in slots {
                if *slot == old {
                    *slot = new;
                }
            }
        };
        match &mut self.nodes[parent.index()].kind {
            NodeKind::Unit { classes } => swap_vec(classes),
            NodeKind::Class { members, .. } => swap_vec(members),
            NodeKind::Field { init, .. } => swap_opt(init),
            NodeKind::Method { body, .. } | NodeKind::Ctor { body, .. } => swap(body),
            NodeKind::Block { stmts } => swap_vec(stmts),
            NodeKind::ExprStmt { expr } => swap(expr),
            NodeKind::LocalDecl { init, .. } => swap_opt(init),
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                swap(cond);
                swap(then_branch);
                swap_opt(else_branch);
            }
            NodeKind::While { cond, body } => {
                swap(cond);
                swap(body);
            }
            NodeKind::DoWhile { body, cond } => {
                swap(body);
                swap(cond);
            }
            NodeKind::For {
                init,
                cond,
                update,
                body,
            } => {
                swap_opt(init);
                swap_opt(cond);
                swap_vec(update);
                swap(body);
            }
            NodeKind::Return { value } => swap_opt(value),
            NodeKind::Throw { value } => swap(value),
            NodeKind::FieldAccess { receiver, .. } => {
                if matches!(receiver, Some(Receiver::Expr(e)) if *e == old) {
                    *receiver = Some(Receiver::Expr(new));
                }
            }
            NodeKind::MethodCall { receiver, args, .. } => {
                if matches!(receiver, Some(Receiver::Expr(e)) if *e == old) {
                    *receiver = Some(Receiver::Expr(new));
                }
                swap_vec(args);
            }
            NodeKind::Index { base, index } => {
                swap(base);
                swap(index);
            }
            NodeKind::Binary { left, right, .. } => {
                swap(left);
                swap(right);
            }
            NodeKind::Unary { operand, .. } => swap(operand),
            NodeKind::Assign { target, value, .. } => {
                swap(target);
                swap(value);
            }
            NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Empty
            | NodeKind::Variable { .. }
            | NodeKind::Lit { .. } => {}
        }
    }
}

/// Iterator over ancestor ids, nearest first.
pub struct Ancestors<'a> {
    unit: &'a CompilationUnit,
    cur: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.cur?;
        self.cur = self.unit.parent(id);
        Some(id)
    }
}

/// A proposed replacement subtree, built as a standalone value before the
/// suppression engine has approved the candidate. `Keep` leaves re-use an
/// original subtree by id, which is what keeps the structural diff of an
/// approved mutant at exactly one node.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    Keep(NodeId),
    Literal(Literal),
    Binary {
        op: BinOp,
        left: Box<Fragment>,
        right: Box<Fragment>,
    },
    Unary {
        op: UnOp,
        operand: Box<Fragment>,
    },
    Assign {
        op: AssignOp,
        target: Box<Fragment>,
        value: Box<Fragment>,
    },
    /// A field access with its self-qualifier removed
    UnqualifiedField {
        name: String,
        ty: Option<TypeRef>,
    },
    /// An empty statement, used for statement deletion
    Empty,
}

/// Count the shape-differing subtrees between the reachable trees of two
/// units. A well-formed mutant yields exactly 1.
pub fn structural_diff(a: &CompilationUnit, b: &CompilationUnit) -> usize {
    fn shallow_sig(unit: &CompilationUnit, id: NodeId) -> String {
        let child_count = unit.children(id).len();
        let tag = match unit.kind(id) {
            NodeKind::Unit { .. } => "unit".to_string(),
            NodeKind::Class { name, .. } => format!("class {}", name),
            NodeKind::Field { name, ty, .. } => format!("field {} {}", ty, name),
            NodeKind::Method { name, ret, .. } => format!("method {} {}", ret, name),
            NodeKind::Ctor { name, .. } => format!("ctor {}", name),
            NodeKind::Block { .. } => "block".to_string(),
            NodeKind::ExprStmt { .. } => "expr-stmt".to_string(),
            NodeKind::LocalDecl { name, ty, .. } => format!("local {} {}", ty, name),
            NodeKind::If { else_branch, .. } => format!("if {}", else_branch.is_some()),
            NodeKind::While { .. } => "while".to_string(),
            NodeKind::DoWhile { .. } => "do-while".to_string(),
            NodeKind::For { .. } => "for".to_string(),
            NodeKind::Return { .. } => "return".to_string(),
            NodeKind::Throw { .. } => "throw".to_string(),
            NodeKind::Break => "break".to_string(),
            NodeKind::Continue => "continue".to_string(),
            NodeKind::Empty => "empty".to_string(),
            NodeKind::Variable { name, .. } => format!("var {}", name),
            NodeKind::FieldAccess { receiver, name, .. } => {
                let recv = match receiver {
                    None => "none",
                    Some(Receiver::This) => "this",
                    Some(Receiver::Type(_)) => "type",
                    Some(Receiver::Expr(_)) => "expr",
                };
                format!("field-access {} {}", recv, name)
            }
            NodeKind::MethodCall { name, .. } => format!("call {}", name),
            NodeKind::Index { .. } => "index".to_string(),
            NodeKind::Binary { op, .. } => format!("binary {}", op.symbol()),
            NodeKind::Unary { op, .. } => {
                format!("unary {} {}", op.symbol(), op.is_prefix())
            }
            NodeKind::Assign { op, .. } => format!("assign {}", op.symbol()),
            NodeKind::Lit { value } => format!("lit {}", value),
        };
        format!("{} #{}", tag, child_count)
    }

    fn go(a: &CompilationUnit, na: NodeId, b: &CompilationUnit, nb: NodeId, count: &mut usize) {
        if shallow_sig(a, na) != shallow_sig(b, nb) {
            *count += 1;
            return;
        }
        for (ca, cb) in a.children(na).into_iter().zip(b.children(nb)) {
            go(a, ca, b, cb, count);
        }
    }

    let mut count = 0;
    go(a, a.root(), b, b.root(), &mut count);
    count
}

/// Incremental builder for a [`CompilationUnit`], used by the parser and by
/// tests. Nodes are created bottom-up; `build` wires the parent links by
/// walking down from the root.
#[derive(Debug, Default)]
pub struct UnitBuilder {
    nodes: Vec<Node>,
}

impl UnitBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { kind, parent: None });
        id
    }

    pub fn lit(&mut self, value: Literal) -> NodeId {
        self.node(NodeKind::Lit { value })
    }

    pub fn int(&mut self, v: i64) -> NodeId {
        self.lit(Literal::Int(v))
    }

    pub fn var(&mut self, name: &str, ty: Option<TypeRef>) -> NodeId {
        self.node(NodeKind::Variable {
            name: name.to_string(),
            ty,
        })
    }

    pub fn int_var(&mut self, name: &str) -> NodeId {
        self.var(name, Some(TypeRef::Int))
    }

    pub fn binary(&mut self, op: BinOp, left: NodeId, right: NodeId) -> NodeId {
        self.node(NodeKind::Binary { op, left, right })
    }

    pub fn unary(&mut self, op: UnOp, operand: NodeId) -> NodeId {
        self.node(NodeKind::Unary { op, operand })
    }

    pub fn assign(&mut self, op: AssignOp, target: NodeId, value: NodeId) -> NodeId {
        self.node(NodeKind::Assign { op, target, value })
    }

    pub fn field_access(
        &mut self,
        receiver: Option<Receiver>,
        name: &str,
        ty: Option<TypeRef>,
    ) -> NodeId {
        self.node(NodeKind::FieldAccess {
            receiver,
            name: name.to_string(),
            ty,
        })
    }

    pub fn expr_stmt(&mut self, expr: NodeId) -> NodeId {
        self.node(NodeKind::ExprStmt { expr })
    }

    pub fn local(&mut self, name: &str, ty: TypeRef, init: Option<NodeId>) -> NodeId {
        self.node(NodeKind::LocalDecl {
            name: name.to_string(),
            ty,
            init,
        })
    }

    pub fn if_stmt(
        &mut self,
        cond: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    ) -> NodeId {
        self.node(NodeKind::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    pub fn while_stmt(&mut self, cond: NodeId, body: NodeId) -> NodeId {
        self.node(NodeKind::While { cond, body })
    }

    pub fn ret(&mut self, value: Option<NodeId>) -> NodeId {
        self.node(NodeKind::Return { value })
    }

    pub fn block(&mut self, stmts: Vec<NodeId>) -> NodeId {
        self.node(NodeKind::Block { stmts })
    }

    pub fn method(
        &mut self,
        name: &str,
        ret: TypeRef,
        params: Vec<Param>,
        body: NodeId,
    ) -> NodeId {
        self.node(NodeKind::Method {
            name: name.to_string(),
            modifiers: Vec::new(),
            ret,
            params,
            body,
        })
    }

    pub fn ctor(&mut self, name: &str, params: Vec<Param>, body: NodeId) -> NodeId {
        self.node(NodeKind::Ctor {
            name: name.to_string(),
            modifiers: Vec::new(),
            params,
            body,
        })
    }

    pub fn field_decl(&mut self, name: &str, ty: TypeRef, init: Option<NodeId>) -> NodeId {
        self.node(NodeKind::Field {
            name: name.to_string(),
            modifiers: Vec::new(),
            ty,
            init,
        })
    }

    pub fn class(&mut self, name: &str, members: Vec<NodeId>) -> NodeId {
        self.node(NodeKind::Class {
            name: name.to_string(),
            modifiers: Vec::new(),
            members,
        })
    }

    /// Finish the unit: create the root, then wire every reachable node's
    /// parent back-reference.
    pub fn build(mut self, file_name: &str, classes: Vec<NodeId>) -> CompilationUnit {
        let root = self.node(NodeKind::Unit { classes });
        let mut unit = CompilationUnit {
            nodes: self.nodes,
            root,
            file_name: file_name.to_string(),
        };
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            for child in unit.children(id) {
                unit.nodes[child.index()].parent = Some(id);
                stack.push(child);
            }
        }
        unit
    }
}
