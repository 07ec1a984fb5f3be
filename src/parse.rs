//! Recursive-descent parser for the supported source subset
//!
//! Parses classes, fields, constructors, methods, the usual statement forms,
//! and the expression grammar with standard precedence. A post-parse resolve
//! pass fills in static types for variable and field reads from the
//! declarations in scope; the operators and the suppression rules read those
//! types off the tree and never look at the raw source again.

use std::collections::HashMap;

use crate::ast::{
    AssignOp, BinOp, CompilationUnit, Literal, NodeId, NodeKind, Param, Receiver, TypeRef, UnOp,
    UnitBuilder,
};
use crate::error::{MutationError, Result};
use crate::lexer::{tokenize, Token, TokenKind};

/// Parse one source file into a typed compilation unit.
pub fn parse_unit(source: &str, file_name: &str) -> Result<CompilationUnit> {
    let tokens = tokenize(source, file_name)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        file_name: file_name.to_string(),
        builder: UnitBuilder::new(),
    };
    let classes = parser.parse_classes()?;
    let mut unit = parser.builder.build(file_name, classes);
    resolve_types(&mut unit);
    Ok(unit)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    file_name: String,
    builder: UnitBuilder,
}

const MODIFIERS: [&str; 7] = [
    "public",
    "private",
    "protected",
    "static",
    "final",
    "abstract",
    "synchronized",
];

impl Parser {
    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn peek_at(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| &t.kind)
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos.min(self.tokens.len().saturating_sub(1)))
            .map(|t| t.line)
            .unwrap_or(0)
    }

    fn bump(&mut self) -> Option<TokenKind> {
        let kind = self.tokens.get(self.pos).map(|t| t.kind.clone());
        if kind.is_some() {
            self.pos += 1;
        }
        kind
    }

    fn error(&self, message: impl Into<String>) -> MutationError {
        MutationError::Parse {
            file: self.file_name.clone(),
            line: self.line(),
            message: message.into(),
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<()> {
        match self.peek() {
            Some(k) if *k == kind => {
                self.pos += 1;
                Ok(())
            }
            Some(k) => Err(self.error(format!("expected {:?}, found {:?}", kind, k))),
            None => Err(self.error(format!("expected {:?}, found end of input", kind))),
        }
    }

    fn eat_ident(&mut self, text: &str) -> bool {
        if matches!(self.peek(), Some(TokenKind::Ident(t)) if t == text) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_ident(&mut self) -> Result<String> {
        match self.bump() {
            Some(TokenKind::Ident(t)) => Ok(t),
            Some(other) => Err(self.error(format!("expected identifier, found {:?}", other))),
            None => Err(self.error("expected identifier, found end of input")),
        }
    }

    fn ident_text(&self) -> Option<&str> {
        match self.peek() {
            Some(TokenKind::Ident(t)) => Some(t.as_str()),
            _ => None,
        }
    }

    // ---- declarations ----

    fn parse_classes(&mut self) -> Result<Vec<NodeId>> {
        let mut classes = Vec::new();
        while self.peek().is_some() {
            // package and import headers are accepted and skipped
            if self.eat_ident("package") || self.eat_ident("import") {
                while !matches!(self.peek(), Some(TokenKind::Semi) | None) {
                    self.pos += 1;
                }
                self.expect(TokenKind::Semi)?;
                continue;
            }
            classes.push(self.parse_class()?);
        }
        if classes.is_empty() {
            return Err(self.error("no class declaration found"));
        }
        Ok(classes)
    }

    fn parse_class(&mut self) -> Result<NodeId> {
        let modifiers = self.parse_modifiers();
        if !self.eat_ident("class") {
            return Err(self.error("expected class declaration"));
        }
        let name = self.expect_ident()?;
        // extends/implements clauses are accepted and skipped
        while !matches!(self.peek(), Some(TokenKind::LBrace) | None) {
            self.pos += 1;
        }
        self.expect(TokenKind::LBrace)?;
        let mut members = Vec::new();
        while !matches!(self.peek(), Some(TokenKind::RBrace)) {
            if self.peek().is_none() {
                return Err(self.error(format!("unclosed class {}", name)));
            }
            members.push(self.parse_member(&name)?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(self.builder.node(NodeKind::Class {
            name,
            modifiers,
            members,
        }))
    }

    fn parse_modifiers(&mut self) -> Vec<String> {
        let mut mods = Vec::new();
        while let Some(text) = self.ident_text() {
            if MODIFIERS.contains(&text) {
                mods.push(text.to_string());
                self.pos += 1;
            } else {
                break;
            }
        }
        mods
    }

    fn parse_member(&mut self, class_name: &str) -> Result<NodeId> {
        let modifiers = self.parse_modifiers();

        // constructor: the class name followed directly by an argument list
        if self.ident_text() == Some(class_name)
            && matches!(self.peek_at(1), Some(TokenKind::LParen))
        {
            let name = self.expect_ident()?;
            let params = self.parse_params()?;
            let body = self.parse_block()?;
            return Ok(self.builder.node(NodeKind::Ctor {
                name,
                modifiers,
                params,
                body,
            }));
        }

        let ty = self.parse_type()?;
        let name = self.expect_ident()?;
        if matches!(self.peek(), Some(TokenKind::LParen)) {
            let params = self.parse_params()?;
            let body = self.parse_block()?;
            Ok(self.builder.node(NodeKind::Method {
                name,
                modifiers,
                ret: ty,
                params,
                body,
            }))
        } else {
            let init = if matches!(self.peek(), Some(TokenKind::Eq)) {
                self.pos += 1;
                Some(self.parse_expr()?)
            } else {
                None
            };
            self.expect(TokenKind::Semi)?;
            Ok(self.builder.node(NodeKind::Field {
                name,
                modifiers,
                ty,
                init,
            }))
        }
    }

    fn parse_type(&mut self) -> Result<TypeRef> {
        let name = self.expect_ident()?;
        let mut ty = match name.as_str() {
            "int" => TypeRef::Int,
            "long" => TypeRef::Long,
            "short" => TypeRef::Short,
            "byte" => TypeRef::Byte,
            "char" => TypeRef::Char,
            "float" => TypeRef::Float,
            "double" => TypeRef::Double,
            "boolean" => TypeRef::Boolean,
            "void" => TypeRef::Void,
            other => TypeRef::Named(other.to_string()),
        };
        while matches!(self.peek(), Some(TokenKind::LBracket))
            && matches!(self.peek_at(1), Some(TokenKind::RBracket))
        {
            self.pos += 2;
            ty = TypeRef::Array(Box::new(ty));
        }
        Ok(ty)
    }

    fn parse_params(&mut self) -> Result<Vec<Param>> {
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !matches!(self.peek(), Some(TokenKind::RParen)) {
            loop {
                let ty = self.parse_type()?;
                let name = self.expect_ident()?;
                params.push(Param { name, ty });
                if matches!(self.peek(), Some(TokenKind::Comma)) {
                    self.pos += 1;
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(params)
    }

    // ---- statements ----

    fn parse_block(&mut self) -> Result<NodeId> {
        self.expect(TokenKind::LBrace)?;
        let mut stmts = Vec::new();
        while !matches!(self.peek(), Some(TokenKind::RBrace)) {
            if self.peek().is_none() {
                return Err(self.error("unclosed block"));
            }
            stmts.push(self.parse_stmt()?);
        }
        self.expect(TokenKind::RBrace)?;
        Ok(self.builder.node(NodeKind::Block { stmts }))
    }

    fn parse_stmt(&mut self) -> Result<NodeId> {
        match self.peek() {
            Some(TokenKind::LBrace) => self.parse_block(),
            Some(TokenKind::Semi) => {
                self.pos += 1;
                Ok(self.builder.node(NodeKind::Empty))
            }
            Some(TokenKind::Ident(text)) => match text.as_str() {
                "if" => self.parse_if(),
                "while" => self.parse_while(),
                "do" => self.parse_do_while(),
                "for" => self.parse_for(),
                "return" => {
                    self.pos += 1;
                    let value = if matches!(self.peek(), Some(TokenKind::Semi)) {
                        None
                    } else {
                        Some(self.parse_expr()?)
                    };
                    self.expect(TokenKind::Semi)?;
                    Ok(self.builder.node(NodeKind::Return { value }))
                }
                "throw" => {
                    self.pos += 1;
                    let value = self.parse_expr()?;
                    self.expect(TokenKind::Semi)?;
                    Ok(self.builder.node(NodeKind::Throw { value }))
                }
                "break" => {
                    self.pos += 1;
                    self.expect(TokenKind::Semi)?;
                    Ok(self.builder.node(NodeKind::Break))
                }
                "continue" => {
                    self.pos += 1;
                    self.expect(TokenKind::Semi)?;
                    Ok(self.builder.node(NodeKind::Continue))
                }
                _ if self.looks_like_decl() => {
                    let stmt = self.parse_local_decl()?;
                    self.expect(TokenKind::Semi)?;
                    Ok(stmt)
                }
                _ => {
                    let expr = self.parse_expr()?;
                    self.expect(TokenKind::Semi)?;
                    Ok(self.builder.node(NodeKind::ExprStmt { expr }))
                }
            },
            _ => {
                let expr = self.parse_expr()?;
                self.expect(TokenKind::Semi)?;
                Ok(self.builder.node(NodeKind::ExprStmt { expr }))
            }
        }
    }

    /// Lookahead for a local declaration head: `type name` where the type is
    /// an identifier optionally followed by `[]` pairs.
    fn looks_like_decl(&self) -> bool {
        if !matches!(self.peek(), Some(TokenKind::Ident(t)) if !t.is_empty()) {
            return false;
        }
        let mut offset = 1;
        while matches!(self.peek_at(offset), Some(TokenKind::LBracket))
            && matches!(self.peek_at(offset + 1), Some(TokenKind::RBracket))
        {
            offset += 2;
        }
        matches!(self.peek_at(offset), Some(TokenKind::Ident(_)))
            && matches!(
                self.peek_at(offset + 1),
                Some(TokenKind::Eq) | Some(TokenKind::Semi) | Some(TokenKind::Comma)
            )
    }

    fn parse_local_decl(&mut self) -> Result<NodeId> {
        let ty = self.parse_type()?;
        let name = self.expect_ident()?;
        let init = if matches!(self.peek(), Some(TokenKind::Eq)) {
            self.pos += 1;
            Some(self.parse_expr()?)
        } else {
            None
        };
        Ok(self.builder.node(NodeKind::LocalDecl { name, ty, init }))
    }

    fn parse_if(&mut self) -> Result<NodeId> {
        self.pos += 1;
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        let then_branch = self.parse_stmt()?;
        let else_branch = if self.eat_ident("else") {
            Some(self.parse_stmt()?)
        } else {
            None
        };
        Ok(self.builder.node(NodeKind::If {
            cond,
            then_branch,
            else_branch,
        }))
    }

    fn parse_while(&mut self) -> Result<NodeId> {
        self.pos += 1;
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        let body = self.parse_stmt()?;
        Ok(self.builder.node(NodeKind::While { cond, body }))
    }

    fn parse_do_while(&mut self) -> Result<NodeId> {
        self.pos += 1;
        let body = self.parse_stmt()?;
        if !self.eat_ident("while") {
            return Err(self.error("expected while after do body"));
        }
        self.expect(TokenKind::LParen)?;
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RParen)?;
        self.expect(TokenKind::Semi)?;
        Ok(self.builder.node(NodeKind::DoWhile { body, cond }))
    }

    fn parse_for(&mut self) -> Result<NodeId> {
        self.pos += 1;
        self.expect(TokenKind::LParen)?;
        let init = if matches!(self.peek(), Some(TokenKind::Semi)) {
            None
        } else if self.looks_like_decl() {
            Some(self.parse_local_decl()?)
        } else {
            let expr = self.parse_expr()?;
            Some(self.builder.node(NodeKind::ExprStmt { expr }))
        };
        self.expect(TokenKind::Semi)?;
        let cond = if matches!(self.peek(), Some(TokenKind::Semi)) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::Semi)?;
        let mut update = Vec::new();
        if !matches!(self.peek(), Some(TokenKind::RParen)) {
            loop {
                update.push(self.parse_expr()?);
                if matches!(self.peek(), Some(TokenKind::Comma)) {
                    self.pos += 1;
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        let body = self.parse_stmt()?;
        Ok(self.builder.node(NodeKind::For {
            init,
            cond,
            update,
            body,
        }))
    }

    // ---- expressions ----

    fn parse_expr(&mut self) -> Result<NodeId> {
        self.parse_assign()
    }

    fn parse_assign(&mut self) -> Result<NodeId> {
        let target = self.parse_or()?;
        let op = match self.peek() {
            Some(TokenKind::Eq) => AssignOp::Assign,
            Some(TokenKind::PlusEq) => AssignOp::AddAssign,
            Some(TokenKind::MinusEq) => AssignOp::SubAssign,
            Some(TokenKind::StarEq) => AssignOp::MulAssign,
            Some(TokenKind::SlashEq) => AssignOp::DivAssign,
            Some(TokenKind::PercentEq) => AssignOp::ModAssign,
            _ => return Ok(target),
        };
        self.pos += 1;
        let value = self.parse_assign()?;
        Ok(self.builder.node(NodeKind::Assign { op, target, value }))
    }

    fn parse_or(&mut self) -> Result<NodeId> {
        let mut left = self.parse_and()?;
        while matches!(self.peek(), Some(TokenKind::PipePipe)) {
            self.pos += 1;
            let right = self.parse_and()?;
            left = self.builder.binary(BinOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<NodeId> {
        let mut left = self.parse_bit_or()?;
        while matches!(self.peek(), Some(TokenKind::AmpAmp)) {
            self.pos += 1;
            let right = self.parse_bit_or()?;
            left = self.builder.binary(BinOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_bit_or(&mut self) -> Result<NodeId> {
        let mut left = self.parse_bit_xor()?;
        while matches!(self.peek(), Some(TokenKind::Pipe)) {
            self.pos += 1;
            let right = self.parse_bit_xor()?;
            left = self.builder.binary(BinOp::BitOr, left, right);
        }
        Ok(left)
    }

    fn parse_bit_xor(&mut self) -> Result<NodeId> {
        let mut left = self.parse_bit_and()?;
        while matches!(self.peek(), Some(TokenKind::Caret)) {
            self.pos += 1;
            let right = self.parse_bit_and()?;
            left = self.builder.binary(BinOp::BitXor, left, right);
        }
        Ok(left)
    }

    fn parse_bit_and(&mut self) -> Result<NodeId> {
        let mut left = self.parse_equality()?;
        while matches!(self.peek(), Some(TokenKind::Amp)) {
            self.pos += 1;
            let right = self.parse_equality()?;
            left = self.builder.binary(BinOp::BitAnd, left, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<NodeId> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::EqEq) => BinOp::Eq,
                Some(TokenKind::BangEq) => BinOp::Ne,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_relational()?;
            left = self.builder.binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_relational(&mut self) -> Result<NodeId> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Lt) => BinOp::Lt,
                Some(TokenKind::Le) => BinOp::Le,
                Some(TokenKind::Gt) => BinOp::Gt,
                Some(TokenKind::Ge) => BinOp::Ge,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_additive()?;
            left = self.builder.binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<NodeId> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Plus) => BinOp::Add,
                Some(TokenKind::Minus) => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_multiplicative()?;
            left = self.builder.binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<NodeId> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Star) => BinOp::Mul,
                Some(TokenKind::Slash) => BinOp::Div,
                Some(TokenKind::Percent) => BinOp::Mod,
                _ => break,
            };
            self.pos += 1;
            let right = self.parse_unary()?;
            left = self.builder.binary(op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<NodeId> {
        let op = match self.peek() {
            Some(TokenKind::Minus) => Some(UnOp::Neg),
            Some(TokenKind::Bang) => Some(UnOp::Not),
            Some(TokenKind::Tilde) => Some(UnOp::BitNot),
            Some(TokenKind::PlusPlus) => Some(UnOp::PreInc),
            Some(TokenKind::MinusMinus) => Some(UnOp::PreDec),
            _ => None,
        };
        if let Some(op) = op {
            self.pos += 1;
            let operand = self.parse_unary()?;
            return Ok(self.builder.unary(op, operand));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<NodeId> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek() {
                Some(TokenKind::Dot) => {
                    self.pos += 1;
                    let name = self.expect_ident()?;
                    expr = self.finish_access(Some(Receiver::Expr(expr)), name)?;
                }
                Some(TokenKind::LBracket) => {
                    self.pos += 1;
                    let index = self.parse_expr()?;
                    self.expect(TokenKind::RBracket)?;
                    expr = self.builder.node(NodeKind::Index { base: expr, index });
                }
                Some(TokenKind::PlusPlus) => {
                    self.pos += 1;
                    expr = self.builder.unary(UnOp::PostInc, expr);
                }
                Some(TokenKind::MinusMinus) => {
                    self.pos += 1;
                    expr = self.builder.unary(UnOp::PostDec, expr);
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn finish_access(&mut self, receiver: Option<Receiver>, name: String) -> Result<NodeId> {
        if matches!(self.peek(), Some(TokenKind::LParen)) {
            let args = self.parse_args()?;
            Ok(self.builder.node(NodeKind::MethodCall {
                receiver,
                name,
                args,
                ty: None,
            }))
        } else {
            Ok(self.builder.node(NodeKind::FieldAccess {
                receiver,
                name,
                ty: None,
            }))
        }
    }

    fn parse_args(&mut self) -> Result<Vec<NodeId>> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if !matches!(self.peek(), Some(TokenKind::RParen)) {
            loop {
                args.push(self.parse_expr()?);
                if matches!(self.peek(), Some(TokenKind::Comma)) {
                    self.pos += 1;
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<NodeId> {
        match self.bump() {
            Some(TokenKind::IntLit(v)) => Ok(self.builder.lit(Literal::Int(v))),
            Some(TokenKind::FloatLit(v)) => Ok(self.builder.lit(Literal::Float(v))),
            Some(TokenKind::CharLit(c)) => Ok(self.builder.lit(Literal::Char(c))),
            Some(TokenKind::StrLit(s)) => Ok(self.builder.lit(Literal::Str(s))),
            Some(TokenKind::LParen) => {
                let expr = self.parse_expr()?;
                self.expect(TokenKind::RParen)?;
                Ok(expr)
            }
            Some(TokenKind::Ident(text)) => match text.as_str() {
                "true" => Ok(self.builder.lit(Literal::Bool(true))),
                "false" => Ok(self.builder.lit(Literal::Bool(false))),
                "null" => Ok(self.builder.lit(Literal::Null)),
                "this" => {
                    self.expect(TokenKind::Dot)?;
                    let name = self.expect_ident()?;
                    self.finish_access(Some(Receiver::This), name)
                }
                "new" => {
                    let ty = self.parse_type()?;
                    let name = ty.to_string();
                    let args = self.parse_args()?;
                    Ok(self.builder.node(NodeKind::MethodCall {
                        receiver: None,
                        name,
                        args,
                        ty: Some(ty),
                    }))
                }
                _ => {
                    if matches!(self.peek(), Some(TokenKind::LParen)) {
                        self.finish_access(None, text)
                    } else {
                        Ok(self.builder.var(&text, None))
                    }
                }
            },
            Some(other) => Err(self.error(format!("unexpected token {:?}", other))),
            None => Err(self.error("unexpected end of input")),
        }
    }
}

// ---- type resolution ----

/// Fill in the `ty` slots of variable reads, field accesses, and calls from
/// the declarations visible at each point, and normalize static receivers
/// such as `Integer.MAX_VALUE` into type receivers.
fn resolve_types(unit: &mut CompilationUnit) {
    let classes = match unit.kind(unit.root()) {
        NodeKind::Unit { classes } => classes.clone(),
        _ => return,
    };
    for class in classes {
        resolve_class(unit, class);
    }
}

fn resolve_class(unit: &mut CompilationUnit, class: NodeId) {
    let members = match unit.kind(class) {
        NodeKind::Class { members, .. } => members.clone(),
        _ => return,
    };

    let mut fields: HashMap<String, TypeRef> = HashMap::new();
    let mut method_returns: HashMap<String, TypeRef> = HashMap::new();
    for member in &members {
        match unit.kind(*member) {
            NodeKind::Field { name, ty, .. } => {
                fields.insert(name.clone(), ty.clone());
            }
            NodeKind::Method { name, ret, .. } => {
                method_returns.insert(name.clone(), ret.clone());
            }
            _ => {}
        }
    }

    for member in members {
        match unit.kind(member) {
            NodeKind::Method { params, body, .. } | NodeKind::Ctor { params, body, .. } => {
                let mut scope: HashMap<String, TypeRef> = HashMap::new();
                for p in params {
                    scope.insert(p.name.clone(), p.ty.clone());
                }
                let body = *body;
                resolve_body(unit, body, &fields, &method_returns, scope);
            }
            NodeKind::Field { init: Some(init), .. } => {
                let init = *init;
                resolve_body(unit, init, &fields, &method_returns, HashMap::new());
            }
            _ => {}
        }
    }
}

fn resolve_body(
    unit: &mut CompilationUnit,
    scope_root: NodeId,
    fields: &HashMap<String, TypeRef>,
    method_returns: &HashMap<String, TypeRef>,
    mut scope: HashMap<String, TypeRef>,
) {
    // Locals are collected up front; the source subset declares each name
    // once per body, so flat scoping is enough.
    for id in unit.descendants(scope_root) {
        if let NodeKind::LocalDecl { name, ty, .. } = unit.kind(id) {
            scope.insert(name.clone(), ty.clone());
        }
    }

    // Reversed preorder visits children before parents, so a receiver's type
    // is already filled in when the access reading it is resolved.
    for id in unit.descendants(scope_root).into_iter().rev() {
        match unit.kind(id).clone() {
            NodeKind::Variable { name, .. } => {
                if let Some(ty) = scope.get(&name) {
                    let ty = ty.clone();
                    if let NodeKind::Variable { ty: slot, .. } = unit.kind_mut(id) {
                        *slot = Some(ty);
                    }
                } else if let Some(ty) = fields.get(&name) {
                    // a bare read of a class field
                    let ty = ty.clone();
                    *unit.kind_mut(id) = NodeKind::FieldAccess {
                        receiver: None,
                        name,
                        ty: Some(ty),
                    };
                }
            }
            NodeKind::FieldAccess { receiver, name, .. } => {
                let resolved = self::resolve_receiver(unit, &receiver, &scope);
                let ty = match &resolved {
                    Some(Receiver::This) | None => fields.get(&name).cloned(),
                    Some(Receiver::Type(owner)) => well_known_constant(owner, &name),
                    Some(Receiver::Expr(e)) => match crate::context::expr_type(unit, *e) {
                        Some(t) if t.is_array() && name == "length" => Some(TypeRef::Int),
                        _ => None,
                    },
                };
                if let NodeKind::FieldAccess {
                    receiver: recv_slot,
                    ty: ty_slot,
                    ..
                } = unit.kind_mut(id)
                {
                    *recv_slot = resolved;
                    if ty.is_some() {
                        *ty_slot = ty;
                    }
                }
            }
            NodeKind::MethodCall { receiver, name, .. } => {
                let resolved = self::resolve_receiver(unit, &receiver, &scope);
                let ty = if name == "length" || name == "size" {
                    Some(TypeRef::Int)
                } else {
                    match &resolved {
                        Some(Receiver::This) | None => method_returns.get(&name).cloned(),
                        _ => None,
                    }
                };
                if let NodeKind::MethodCall {
                    receiver: recv_slot,
                    ty: ty_slot,
                    ..
                } = unit.kind_mut(id)
                {
                    *recv_slot = resolved;
                    if ty.is_some() {
                        *ty_slot = ty;
                    }
                }
            }
            _ => {}
        }
    }
}

/// An expression receiver whose head is an unresolvable capitalized name is a
/// static access through a type, e.g. `Integer.MAX_VALUE`.
fn resolve_receiver(
    unit: &CompilationUnit,
    receiver: &Option<Receiver>,
    scope: &HashMap<String, TypeRef>,
) -> Option<Receiver> {
    match receiver {
        Some(Receiver::Expr(e)) => match unit.kind(*e) {
            NodeKind::Variable { name, ty: None }
                if !scope.contains_key(name)
                    && name.chars().next().is_some_and(|c| c.is_uppercase()) =>
            {
                Some(Receiver::Type(name.clone()))
            }
            _ => receiver.clone(),
        },
        other => other.clone(),
    }
}

fn well_known_constant(owner: &str, name: &str) -> Option<TypeRef> {
    match (owner, name) {
        ("Integer", "MAX_VALUE") | ("Integer", "MIN_VALUE") => Some(TypeRef::Int),
        ("Long", "MAX_VALUE") | ("Long", "MIN_VALUE") => Some(TypeRef::Long),
        ("Double", "MAX_VALUE") | ("Double", "MIN_VALUE") => Some(TypeRef::Double),
        _ => None,
    }
}
