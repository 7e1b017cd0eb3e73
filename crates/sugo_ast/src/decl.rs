//! Declarations

use crate::expr::{BasicLit, Expr, Field, FuncType, Name};
use crate::stmt::BlockStmt;
use std::sync::Arc;
use sugo_tokens::pos::Pos;

/// Marks the declarations of one parenthesized block, e.g. `const ( A = 1; B = 2 )`.
///
/// All declarations of a block share the same `Arc<Group>`; compare with [Arc::ptr_eq].
#[derive(Debug, PartialEq)]
pub struct Group {
    pub(crate) pos: Pos,
}

impl Group {
    pub fn new(pos: Pos) -> Self {
        Self { pos }
    }
}

/// A compiler directive comment, such as `//go:noinline`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pragma {
    pub(crate) pos: Pos,
    pub text: String,
}

impl Pragma {
    pub fn new(pos: Pos, text: impl Into<String>) -> Self {
        Self {
            pos,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Import(ImportDecl),
    Const(ConstDecl),
    Type(TypeDecl),
    Var(VarDecl),
    Func(FuncDecl),
}

impl Decl {
    /// The group this declaration was declared in, if any
    pub fn group(&self) -> Option<&Arc<Group>> {
        match self {
            Decl::Import(d) => d.group.as_ref(),
            Decl::Const(d) => d.group.as_ref(),
            Decl::Type(d) => d.group.as_ref(),
            Decl::Var(d) => d.group.as_ref(),
            Decl::Func(_) => None,
        }
    }
}

impl From<ImportDecl> for Decl {
    fn from(value: ImportDecl) -> Self {
        Decl::Import(value)
    }
}

impl From<ConstDecl> for Decl {
    fn from(value: ConstDecl) -> Self {
        Decl::Const(value)
    }
}

impl From<TypeDecl> for Decl {
    fn from(value: TypeDecl) -> Self {
        Decl::Type(value)
    }
}

impl From<VarDecl> for Decl {
    fn from(value: VarDecl) -> Self {
        Decl::Var(value)
    }
}

impl From<FuncDecl> for Decl {
    fn from(value: FuncDecl) -> Self {
        Decl::Func(value)
    }
}

/// `import LocalPkgName Path`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub(crate) pos: Pos,
    pub group: Option<Arc<Group>>,
    pub pragmas: Vec<Pragma>,
    pub local_pkg_name: Option<Arc<Name>>,
    pub path: BasicLit,
}

impl ImportDecl {
    pub fn new(
        pos: Pos,
        group: Option<Arc<Group>>,
        local_pkg_name: Option<Arc<Name>>,
        path: BasicLit,
    ) -> Self {
        Self {
            pos,
            group,
            pragmas: vec![],
            local_pkg_name,
            path,
        }
    }
}

/// `const Names Type = Values`
#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    pub(crate) pos: Pos,
    pub group: Option<Arc<Group>>,
    pub pragmas: Vec<Pragma>,
    pub names: Vec<Arc<Name>>,
    pub ty: Option<Expr>,
    pub values: Option<Expr>,
}

impl ConstDecl {
    pub fn new(
        pos: Pos,
        group: Option<Arc<Group>>,
        names: Vec<Arc<Name>>,
        ty: Option<Expr>,
        values: Option<Expr>,
    ) -> Self {
        Self {
            pos,
            group,
            pragmas: vec![],
            names,
            ty,
            values,
        }
    }
}

/// `type Name[TParams] Type` or `type Name[TParams] = Type`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub(crate) pos: Pos,
    pub group: Option<Arc<Group>>,
    pub pragmas: Vec<Pragma>,
    pub name: Arc<Name>,
    pub tparams: Vec<Field>,
    pub alias: bool,
    pub ty: Expr,
}

impl TypeDecl {
    pub fn new(
        pos: Pos,
        group: Option<Arc<Group>>,
        name: Arc<Name>,
        tparams: Vec<Field>,
        alias: bool,
        ty: Expr,
    ) -> Self {
        Self {
            pos,
            group,
            pragmas: vec![],
            name,
            tparams,
            alias,
            ty,
        }
    }
}

/// `var Names Type = Values`
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub(crate) pos: Pos,
    pub group: Option<Arc<Group>>,
    pub pragmas: Vec<Pragma>,
    pub names: Vec<Arc<Name>>,
    pub ty: Option<Expr>,
    pub values: Option<Expr>,
}

impl VarDecl {
    pub fn new(
        pos: Pos,
        group: Option<Arc<Group>>,
        names: Vec<Arc<Name>>,
        ty: Option<Expr>,
        values: Option<Expr>,
    ) -> Self {
        Self {
            pos,
            group,
            pragmas: vec![],
            names,
            ty,
            values,
        }
    }
}

/// `func (Recv) Name[TParams] Type { Body }`
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub(crate) pos: Pos,
    pub pragmas: Vec<Pragma>,
    pub recv: Option<Field>,
    pub name: Arc<Name>,
    pub tparams: Vec<Field>,
    pub ty: FuncType,
    pub body: Option<BlockStmt>,
}

impl FuncDecl {
    pub fn new(
        pos: Pos,
        recv: Option<Field>,
        name: Arc<Name>,
        tparams: Vec<Field>,
        ty: FuncType,
        body: Option<BlockStmt>,
    ) -> Self {
        Self {
            pos,
            pragmas: vec![],
            recv,
            name,
            tparams,
            ty,
            body,
        }
    }

    /// Whether this is a `func main()` with no receiver and no parameters
    pub fn is_entry_point(&self) -> bool {
        self.recv.is_none()
            && self.tparams.is_empty()
            && self.ty.params.is_empty()
            && self.name.value() == crate::ENTRY_POINT
    }
}
