//! Statements

use crate::decl::Decl;
use crate::expr::{Expr, Name};
use std::sync::Arc;
use sugo_tokens::pos::Pos;
use sugo_tokens::token::{Operator, Token};

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Empty(EmptyStmt),
    Labeled(LabeledStmt),
    Block(BlockStmt),
    Expr(ExprStmt),
    Send(SendStmt),
    Decl(DeclStmt),
    Assign(AssignStmt),
    Branch(BranchStmt),
    Call(CallStmt),
    Return(ReturnStmt),
    If(IfStmt),
    For(ForStmt),
    Switch(SwitchStmt),
    Select(SelectStmt),
    /// Only appears as the init statement of a [ForStmt]
    Range(RangeClause),
}

macro_rules! stmt_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
        impl From<$ty> for Stmt {
            fn from(value: $ty) -> Self {
                Stmt::$variant(value)
            }
        }
        )*
    };
}

stmt_from! {
    Empty(EmptyStmt),
    Labeled(LabeledStmt),
    Block(BlockStmt),
    Expr(ExprStmt),
    Send(SendStmt),
    Decl(DeclStmt),
    Assign(AssignStmt),
    Branch(BranchStmt),
    Call(CallStmt),
    Return(ReturnStmt),
    If(IfStmt),
    For(ForStmt),
    Switch(SwitchStmt),
    Select(SelectStmt),
    Range(RangeClause),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmptyStmt {
    pub(crate) pos: Pos,
}

impl EmptyStmt {
    pub fn new(pos: Pos) -> Self {
        Self { pos }
    }
}

/// `Label: Stmt`
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledStmt {
    pub(crate) pos: Pos,
    pub label: Arc<Name>,
    pub stmt: Box<Stmt>,
}

impl LabeledStmt {
    pub fn new(pos: Pos, label: Arc<Name>, stmt: Stmt) -> Self {
        Self {
            pos,
            label,
            stmt: Box::new(stmt),
        }
    }
}

/// `{ Stmts }`
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStmt {
    pub(crate) pos: Pos,
    pub stmts: Vec<Stmt>,
    pub rbrace: Pos,
}

impl BlockStmt {
    pub fn new(pos: Pos, stmts: Vec<Stmt>, rbrace: Pos) -> Self {
        Self { pos, stmts, rbrace }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub(crate) pos: Pos,
    pub x: Expr,
}

impl ExprStmt {
    pub fn new(pos: Pos, x: Expr) -> Self {
        Self { pos, x }
    }
}

/// `Chan <- Value`
#[derive(Debug, Clone, PartialEq)]
pub struct SendStmt {
    pub(crate) pos: Pos,
    pub chan: Expr,
    pub value: Expr,
}

impl SendStmt {
    pub fn new(pos: Pos, chan: Expr, value: Expr) -> Self {
        Self { pos, chan, value }
    }
}

/// A `const`, `type` or `var` declaration inside a function body
#[derive(Debug, Clone, PartialEq)]
pub struct DeclStmt {
    pub(crate) pos: Pos,
    pub decls: Vec<Decl>,
}

impl DeclStmt {
    pub fn new(pos: Pos, decls: Vec<Decl>) -> Self {
        Self { pos, decls }
    }
}

/// The operator of an [AssignStmt]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AssignOp {
    /// `=`
    Assign,
    /// `:=`
    Define,
    /// `op=`, or `++`/`--` when the statement has no right hand side
    Op(Operator),
}

/// `Lhs = Rhs`, `Lhs := Rhs`, `Lhs op= Rhs`, `Lhs++` or `Lhs--`
#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub(crate) pos: Pos,
    pub op: AssignOp,
    pub lhs: Expr,
    /// `None` for `Lhs++` and `Lhs--`
    pub rhs: Option<Expr>,
}

impl AssignStmt {
    pub fn new(pos: Pos, op: AssignOp, lhs: Expr, rhs: Option<Expr>) -> Self {
        Self { pos, op, lhs, rhs }
    }
}

/// `break`, `continue`, `fallthrough` or `goto`, with an optional label
#[derive(Debug, Clone, PartialEq)]
pub struct BranchStmt {
    pub(crate) pos: Pos,
    pub tok: Token,
    pub label: Option<Arc<Name>>,
}

impl BranchStmt {
    pub fn new(pos: Pos, tok: Token, label: Option<Arc<Name>>) -> Self {
        Self { pos, tok, label }
    }
}

/// `go Call` or `defer Call`
#[derive(Debug, Clone, PartialEq)]
pub struct CallStmt {
    pub(crate) pos: Pos,
    pub tok: Token,
    pub call: Expr,
}

impl CallStmt {
    pub fn new(pos: Pos, tok: Token, call: Expr) -> Self {
        Self { pos, tok, call }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub(crate) pos: Pos,
    pub results: Option<Expr>,
}

impl ReturnStmt {
    pub fn new(pos: Pos, results: Option<Expr>) -> Self {
        Self { pos, results }
    }
}

/// `if Init; Cond { Then } else Else`
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub(crate) pos: Pos,
    pub init: Option<Box<Stmt>>,
    pub cond: Expr,
    pub then: BlockStmt,
    /// Either an [IfStmt] or a [BlockStmt]
    pub els: Option<Box<Stmt>>,
}

impl IfStmt {
    pub fn new(
        pos: Pos,
        init: Option<Stmt>,
        cond: Expr,
        then: BlockStmt,
        els: Option<Stmt>,
    ) -> Self {
        Self {
            pos,
            init: init.map(Box::new),
            cond,
            then,
            els: els.map(Box::new),
        }
    }
}

/// `for Init; Cond; Post { Body }`, or `for Init { Body }` if `init` is a [RangeClause]
#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub(crate) pos: Pos,
    pub init: Option<Box<Stmt>>,
    pub cond: Option<Expr>,
    pub post: Option<Box<Stmt>>,
    pub body: BlockStmt,
}

impl ForStmt {
    pub fn new(
        pos: Pos,
        init: Option<Stmt>,
        cond: Option<Expr>,
        post: Option<Stmt>,
        body: BlockStmt,
    ) -> Self {
        Self {
            pos,
            init: init.map(Box::new),
            cond,
            post: post.map(Box::new),
            body,
        }
    }
}

/// `switch Init; Tag { Body }`
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStmt {
    pub(crate) pos: Pos,
    pub init: Option<Box<Stmt>>,
    /// An expression, a [TypeSwitchGuard](crate::expr::TypeSwitchGuard) or nothing
    pub tag: Option<Expr>,
    pub body: Vec<CaseClause>,
    pub rbrace: Pos,
}

impl SwitchStmt {
    pub fn new(
        pos: Pos,
        init: Option<Stmt>,
        tag: Option<Expr>,
        body: Vec<CaseClause>,
        rbrace: Pos,
    ) -> Self {
        Self {
            pos,
            init: init.map(Box::new),
            tag,
            body,
            rbrace,
        }
    }
}

/// `select { Body }`
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStmt {
    pub(crate) pos: Pos,
    pub body: Vec<CommClause>,
    pub rbrace: Pos,
}

impl SelectStmt {
    pub fn new(pos: Pos, body: Vec<CommClause>, rbrace: Pos) -> Self {
        Self { pos, body, rbrace }
    }
}

/// `Lhs = range X` or `Lhs := range X`
#[derive(Debug, Clone, PartialEq)]
pub struct RangeClause {
    pub(crate) pos: Pos,
    pub lhs: Option<Expr>,
    pub def: bool,
    pub x: Expr,
}

impl RangeClause {
    pub fn new(pos: Pos, lhs: Option<Expr>, def: bool, x: Expr) -> Self {
        Self { pos, lhs, def, x }
    }
}

/// `case Cases: Body`, or `default: Body` if `cases` is `None`
#[derive(Debug, Clone, PartialEq)]
pub struct CaseClause {
    pub(crate) pos: Pos,
    pub cases: Option<Expr>,
    pub body: Vec<Stmt>,
    pub colon: Pos,
}

impl CaseClause {
    pub fn new(pos: Pos, cases: Option<Expr>, body: Vec<Stmt>, colon: Pos) -> Self {
        Self {
            pos,
            cases,
            body,
            colon,
        }
    }
}

/// `case Comm: Body`, or `default: Body` if `comm` is `None`
#[derive(Debug, Clone, PartialEq)]
pub struct CommClause {
    pub(crate) pos: Pos,
    /// A send statement, a receive expression statement or a receive assignment
    pub comm: Option<Box<Stmt>>,
    pub body: Vec<Stmt>,
    pub colon: Pos,
}

impl CommClause {
    pub fn new(pos: Pos, comm: Option<Stmt>, body: Vec<Stmt>, colon: Pos) -> Self {
        Self {
            pos,
            comm: comm.map(Box::new),
            body,
            colon,
        }
    }
}
