//! Positions of nodes.
//!
//! [Positioned::pos] is the position recorded when the node was created, which is not
//! necessarily where the node's source text starts: a binary operation is positioned at its
//! operator, an index expression at its `[`. [start_pos] and [end_pos] compute the extent of
//! the source text a node covers.

use crate::decl::*;
use crate::expr::*;
use crate::file::File;
use crate::stmt::*;
use sugo_tokens::pos::{Pos, Positioned};

macro_rules! positioned {
    ($($ty:ty),* $(,)?) => {
        $(
        impl Positioned for $ty {
            fn pos(&self) -> Pos {
                self.pos.clone()
            }
        }
        )*
    };
}

positioned! {
    Name, BasicLit, BadExpr, CompositeLit, KeyValueExpr, FuncLit, ParenExpr, SelectorExpr,
    IndexExpr, SliceExpr, AssertExpr, TypeSwitchGuard, Operation, CallExpr, ListExpr,
    ArrayType, SliceType, DotsType, StructType, Field, FuncType, InterfaceType, MapType,
    ChanType,
    EmptyStmt, LabeledStmt, BlockStmt, ExprStmt, SendStmt, DeclStmt, AssignStmt, BranchStmt,
    CallStmt, ReturnStmt, IfStmt, ForStmt, SwitchStmt, SelectStmt, RangeClause, CaseClause,
    CommClause,
    Group, Pragma, ImportDecl, ConstDecl, TypeDecl, VarDecl, FuncDecl,
    File,
}

impl Positioned for Expr {
    fn pos(&self) -> Pos {
        match self {
            Expr::Bad(x) => x.pos(),
            Expr::Name(x) => x.pos(),
            Expr::BasicLit(x) => x.pos(),
            Expr::CompositeLit(x) => x.pos(),
            Expr::KeyValue(x) => x.pos(),
            Expr::FuncLit(x) => x.pos(),
            Expr::Paren(x) => x.pos(),
            Expr::Selector(x) => x.pos(),
            Expr::Index(x) => x.pos(),
            Expr::Slice(x) => x.pos(),
            Expr::Assert(x) => x.pos(),
            Expr::TypeSwitchGuard(x) => x.pos(),
            Expr::Operation(x) => x.pos(),
            Expr::Call(x) => x.pos(),
            Expr::List(x) => x.pos(),
            Expr::ArrayType(x) => x.pos(),
            Expr::SliceType(x) => x.pos(),
            Expr::DotsType(x) => x.pos(),
            Expr::StructType(x) => x.pos(),
            Expr::FuncType(x) => x.pos(),
            Expr::InterfaceType(x) => x.pos(),
            Expr::MapType(x) => x.pos(),
            Expr::ChanType(x) => x.pos(),
        }
    }
}

impl Positioned for Stmt {
    fn pos(&self) -> Pos {
        match self {
            Stmt::Empty(s) => s.pos(),
            Stmt::Labeled(s) => s.pos(),
            Stmt::Block(s) => s.pos(),
            Stmt::Expr(s) => s.pos(),
            Stmt::Send(s) => s.pos(),
            Stmt::Decl(s) => s.pos(),
            Stmt::Assign(s) => s.pos(),
            Stmt::Branch(s) => s.pos(),
            Stmt::Call(s) => s.pos(),
            Stmt::Return(s) => s.pos(),
            Stmt::If(s) => s.pos(),
            Stmt::For(s) => s.pos(),
            Stmt::Switch(s) => s.pos(),
            Stmt::Select(s) => s.pos(),
            Stmt::Range(s) => s.pos(),
        }
    }
}

impl Positioned for Decl {
    fn pos(&self) -> Pos {
        match self {
            Decl::Import(d) => d.pos(),
            Decl::Const(d) => d.pos(),
            Decl::Type(d) => d.pos(),
            Decl::Var(d) => d.pos(),
            Decl::Func(d) => d.pos(),
        }
    }
}

/// The position where the source text of `x` starts
pub fn start_pos(x: &Expr) -> Pos {
    match x {
        Expr::CompositeLit(lit) => match &lit.ty {
            Some(ty) => start_pos(ty),
            None => lit.pos(),
        },
        Expr::KeyValue(kv) => start_pos(&kv.key),
        Expr::Selector(s) => start_pos(&s.x),
        Expr::Index(i) => start_pos(&i.x),
        Expr::Slice(s) => start_pos(&s.x),
        Expr::Assert(a) => start_pos(&a.x),
        Expr::TypeSwitchGuard(g) => match &g.lhs {
            Some(lhs) => lhs.pos(),
            None => start_pos(&g.x),
        },
        Expr::Operation(op) if op.y.is_some() => start_pos(&op.x),
        Expr::Call(call) => start_pos(&call.fun),
        Expr::List(list) => match list.elems.first() {
            Some(first) => start_pos(first),
            None => list.pos(),
        },
        other => other.pos(),
    }
}

/// The position where the source text of `s` starts
pub fn stmt_start_pos(s: &Stmt) -> Pos {
    match s {
        Stmt::Expr(e) => start_pos(&e.x),
        Stmt::Send(send) => start_pos(&send.chan),
        Stmt::Assign(assign) => start_pos(&assign.lhs),
        Stmt::Range(range) => match &range.lhs {
            Some(lhs) => start_pos(lhs),
            None => range.pos(),
        },
        other => other.pos(),
    }
}

fn after(pos: Pos, text: &str) -> Pos {
    pos.offset_col(text.len() as u32)
}

/// The position just after the source text of `x`. Approximate for nodes whose closing
/// token is not recorded.
pub fn end_pos(x: &Expr) -> Pos {
    match x {
        Expr::Bad(b) => b.pos(),
        Expr::Name(n) => after(n.pos(), n.value()),
        Expr::BasicLit(lit) => after(lit.pos(), &lit.value),
        Expr::CompositeLit(lit) => lit.rbrace.clone(),
        Expr::KeyValue(kv) => end_pos(&kv.value),
        Expr::FuncLit(f) => f.body.rbrace.clone(),
        Expr::Paren(p) => end_pos(&p.x),
        Expr::Selector(s) => after(s.sel.pos(), s.sel.value()),
        Expr::Index(i) => end_pos(&i.index),
        Expr::Slice(s) => match s.index.iter().rev().flatten().next() {
            Some(last) => end_pos(last),
            None => end_pos(&s.x),
        },
        Expr::Assert(a) => end_pos(&a.ty),
        Expr::TypeSwitchGuard(g) => end_pos(&g.x),
        Expr::Operation(op) => match &op.y {
            Some(y) => end_pos(y),
            None => end_pos(&op.x),
        },
        Expr::Call(call) => match call.args.last() {
            Some(last) => end_pos(last),
            None => end_pos(&call.fun),
        },
        Expr::List(list) => match list.elems.last() {
            Some(last) => end_pos(last),
            None => list.pos(),
        },
        Expr::ArrayType(a) => end_pos(&a.elem),
        Expr::SliceType(s) => end_pos(&s.elem),
        Expr::DotsType(d) => end_pos(&d.elem),
        Expr::StructType(s) => match s.fields.last() {
            Some(f) => end_pos(&f.ty),
            None => s.pos(),
        },
        Expr::FuncType(f) => func_type_end_pos(f),
        Expr::InterfaceType(i) => match i.methods.last() {
            Some(f) => end_pos(&f.ty),
            None => i.pos(),
        },
        Expr::MapType(m) => end_pos(&m.value),
        Expr::ChanType(c) => end_pos(&c.elem),
    }
}

fn func_type_end_pos(f: &FuncType) -> Pos {
    match f.results.last().or(f.params.last()) {
        Some(field) => end_pos(&field.ty),
        None => f.pos(),
    }
}

/// The position just after the source text of `s`.
pub fn stmt_end_pos(s: &Stmt) -> Pos {
    match s {
        Stmt::Empty(e) => e.pos(),
        Stmt::Labeled(l) => stmt_end_pos(&l.stmt),
        Stmt::Block(b) => b.rbrace.clone(),
        Stmt::Expr(e) => end_pos(&e.x),
        Stmt::Send(send) => end_pos(&send.value),
        Stmt::Decl(d) => match d.decls.last() {
            Some(decl) => decl_end_pos(decl),
            None => d.pos(),
        },
        Stmt::Assign(a) => match &a.rhs {
            Some(rhs) => end_pos(rhs),
            None => end_pos(&a.lhs).offset_col(2),
        },
        Stmt::Branch(b) => match &b.label {
            Some(label) => after(label.pos(), label.value()),
            None => after(b.pos(), b.tok.as_str()),
        },
        Stmt::Call(c) => end_pos(&c.call),
        Stmt::Return(r) => match &r.results {
            Some(results) => end_pos(results),
            None => after(r.pos(), "return"),
        },
        Stmt::If(i) => match &i.els {
            Some(els) => stmt_end_pos(els),
            None => i.then.rbrace.clone(),
        },
        Stmt::For(f) => f.body.rbrace.clone(),
        Stmt::Switch(s) => s.rbrace.clone(),
        Stmt::Select(s) => s.rbrace.clone(),
        Stmt::Range(r) => end_pos(&r.x),
    }
}

/// The position just after the source text of `d`.
pub fn decl_end_pos(d: &Decl) -> Pos {
    match d {
        Decl::Import(i) => end_pos(&Expr::BasicLit(i.path.clone())),
        Decl::Const(ConstDecl {
            names, ty, values, ..
        })
        | Decl::Var(VarDecl {
            names, ty, values, ..
        }) => match (values, ty, names.last()) {
            (Some(values), _, _) => end_pos(values),
            (None, Some(ty), _) => end_pos(ty),
            (None, None, Some(name)) => after(name.pos(), name.value()),
            (None, None, None) => d.pos(),
        },
        Decl::Type(t) => end_pos(&t.ty),
        Decl::Func(f) => match &f.body {
            Some(body) => body.rbrace.clone(),
            None => func_type_end_pos(&f.ty),
        },
    }
}
