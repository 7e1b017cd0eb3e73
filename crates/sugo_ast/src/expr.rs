//! Expressions and type expressions

use crate::stmt::BlockStmt;
use std::sync::Arc;
use sugo_tokens::pos::Pos;
use sugo_tokens::token::{LitKind, Operator};

/// An identifier.
///
/// Names are immutable once created and are shared through [Arc] wherever the same
/// identifier is referenced from several places.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name {
    pub(crate) pos: Pos,
    value: String,
}

impl Name {
    pub fn new(pos: Pos, value: impl Into<String>) -> Self {
        Self {
            pos,
            value: value.into(),
        }
    }

    /// The blank identifier `_`
    pub fn blank(pos: Pos) -> Self {
        Self::new(pos, "_")
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_blank(&self) -> bool {
        self.value == "_"
    }
}

/// A basic literal, kept as its source text
#[derive(Debug, Clone, PartialEq)]
pub struct BasicLit {
    pub(crate) pos: Pos,
    pub value: String,
    pub kind: LitKind,
    /// Set if the literal had a syntax error
    pub bad: bool,
}

impl BasicLit {
    pub fn new(pos: Pos, value: impl Into<String>, kind: LitKind) -> Self {
        Self {
            pos,
            value: value.into(),
            kind,
            bad: false,
        }
    }

    /// A string literal whose value is `text`
    pub fn string(pos: Pos, text: &str) -> Self {
        Self::new(pos, quote(text), LitKind::String)
    }

    /// A decimal integer literal
    pub fn int(pos: Pos, value: usize) -> Self {
        Self::new(pos, value.to_string(), LitKind::Int)
    }

    /// The value of a string literal without its quotes, if it has no escapes to interpret.
    pub fn unquoted(&self) -> Option<&str> {
        if self.kind != LitKind::String || self.value.len() < 2 {
            return None;
        }
        let inner = &self.value[1..self.value.len() - 1];
        match self.value.as_bytes()[0] {
            b'`' => Some(inner),
            b'"' if !inner.contains('\\') => Some(inner),
            _ => None,
        }
    }
}

/// Quotes `text` as an interpreted string literal.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Any expression, including type expressions
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Bad(BadExpr),
    Name(Arc<Name>),
    BasicLit(BasicLit),
    CompositeLit(CompositeLit),
    KeyValue(KeyValueExpr),
    FuncLit(FuncLit),
    Paren(ParenExpr),
    Selector(SelectorExpr),
    Index(IndexExpr),
    Slice(SliceExpr),
    Assert(AssertExpr),
    TypeSwitchGuard(TypeSwitchGuard),
    Operation(Operation),
    Call(CallExpr),
    List(ListExpr),
    ArrayType(ArrayType),
    SliceType(SliceType),
    DotsType(DotsType),
    StructType(StructType),
    FuncType(FuncType),
    InterfaceType(InterfaceType),
    MapType(MapType),
    ChanType(ChanType),
}

macro_rules! expr_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
        impl From<$ty> for Expr {
            fn from(value: $ty) -> Self {
                Expr::$variant(value)
            }
        }
        )*
    };
}

expr_from! {
    Bad(BadExpr),
    Name(Arc<Name>),
    BasicLit(BasicLit),
    CompositeLit(CompositeLit),
    KeyValue(KeyValueExpr),
    FuncLit(FuncLit),
    Paren(ParenExpr),
    Selector(SelectorExpr),
    Index(IndexExpr),
    Slice(SliceExpr),
    Assert(AssertExpr),
    TypeSwitchGuard(TypeSwitchGuard),
    Operation(Operation),
    Call(CallExpr),
    List(ListExpr),
    ArrayType(ArrayType),
    SliceType(SliceType),
    DotsType(DotsType),
    StructType(StructType),
    FuncType(FuncType),
    InterfaceType(InterfaceType),
    MapType(MapType),
    ChanType(ChanType),
}

impl From<Name> for Expr {
    fn from(value: Name) -> Self {
        Expr::Name(Arc::new(value))
    }
}

impl Expr {
    /// A name expression
    pub fn name(pos: Pos, value: impl Into<String>) -> Self {
        Name::new(pos, value).into()
    }

    /// Strips any number of enclosing parentheses
    pub fn unparen(&self) -> &Expr {
        let mut x = self;
        while let Expr::Paren(p) = x {
            x = &p.x;
        }
        x
    }

    pub fn as_name(&self) -> Option<&Arc<Name>> {
        match self {
            Expr::Name(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_basic_lit(&self) -> Option<&BasicLit> {
        match self {
            Expr::BasicLit(lit) => Some(lit),
            _ => None,
        }
    }

    /// The elements of this expression if it is an expression list, otherwise the expression
    /// itself.
    pub fn unpack_list(&self) -> &[Expr] {
        match self {
            Expr::List(list) => &list.elems,
            other => std::slice::from_ref(other),
        }
    }

    /// The inverse of [Expr::unpack_list]; `elems` must not be empty.
    pub fn pack_list(pos: Pos, mut elems: Vec<Expr>) -> Expr {
        if elems.len() == 1 {
            elems.remove(0)
        } else {
            ListExpr::new(pos, elems).into()
        }
    }
}

/// A placeholder for an erroneous expression
#[derive(Debug, Clone, PartialEq)]
pub struct BadExpr {
    pub(crate) pos: Pos,
}

impl BadExpr {
    pub fn new(pos: Pos) -> Self {
        Self { pos }
    }
}

/// `Type { ElemList[0], ElemList[1], ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeLit {
    pub(crate) pos: Pos,
    /// `None` if the type was elided inside another composite literal
    pub ty: Option<Box<Expr>>,
    pub elems: Vec<Expr>,
    pub rbrace: Pos,
}

impl CompositeLit {
    pub fn new(pos: Pos, ty: Option<Expr>, elems: Vec<Expr>, rbrace: Pos) -> Self {
        Self {
            pos,
            ty: ty.map(Box::new),
            elems,
            rbrace,
        }
    }

    /// The number of elements that are `key: value` pairs
    pub fn n_keys(&self) -> usize {
        self.elems
            .iter()
            .filter(|e| matches!(e, Expr::KeyValue(_)))
            .count()
    }
}

/// `Key: Value`
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValueExpr {
    pub(crate) pos: Pos,
    pub key: Box<Expr>,
    pub value: Box<Expr>,
}

impl KeyValueExpr {
    pub fn new(pos: Pos, key: Expr, value: Expr) -> Self {
        Self {
            pos,
            key: Box::new(key),
            value: Box::new(value),
        }
    }
}

/// `func Type { Body }`
#[derive(Debug, Clone, PartialEq)]
pub struct FuncLit {
    pub(crate) pos: Pos,
    pub ty: FuncType,
    pub body: BlockStmt,
}

impl FuncLit {
    pub fn new(pos: Pos, ty: FuncType, body: BlockStmt) -> Self {
        Self { pos, ty, body }
    }
}

/// `(X)`
#[derive(Debug, Clone, PartialEq)]
pub struct ParenExpr {
    pub(crate) pos: Pos,
    pub x: Box<Expr>,
}

impl ParenExpr {
    pub fn new(pos: Pos, x: Expr) -> Self {
        Self { pos, x: Box::new(x) }
    }
}

/// `X.Sel`
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorExpr {
    pub(crate) pos: Pos,
    pub x: Box<Expr>,
    pub sel: Arc<Name>,
}

impl SelectorExpr {
    pub fn new(pos: Pos, x: Expr, sel: Arc<Name>) -> Self {
        Self {
            pos,
            x: Box::new(x),
            sel,
        }
    }
}

/// `X[Index]`, also used for generic instantiations `X[T1, T2]`
#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpr {
    pub(crate) pos: Pos,
    pub x: Box<Expr>,
    pub index: Box<Expr>,
}

impl IndexExpr {
    pub fn new(pos: Pos, x: Expr, index: Expr) -> Self {
        Self {
            pos,
            x: Box::new(x),
            index: Box::new(index),
        }
    }
}

/// `X[Index[0] : Index[1] : Index[2]]`
#[derive(Debug, Clone, PartialEq)]
pub struct SliceExpr {
    pub(crate) pos: Pos,
    pub x: Box<Expr>,
    pub index: [Option<Box<Expr>>; 3],
    /// Whether this is a 3-index slice
    pub full: bool,
}

impl SliceExpr {
    pub fn new(pos: Pos, x: Expr, index: [Option<Expr>; 3], full: bool) -> Self {
        Self {
            pos,
            x: Box::new(x),
            index: index.map(|i| i.map(Box::new)),
            full,
        }
    }
}

/// `X.(Type)`
#[derive(Debug, Clone, PartialEq)]
pub struct AssertExpr {
    pub(crate) pos: Pos,
    pub x: Box<Expr>,
    pub ty: Box<Expr>,
}

impl AssertExpr {
    pub fn new(pos: Pos, x: Expr, ty: Expr) -> Self {
        Self {
            pos,
            x: Box::new(x),
            ty: Box::new(ty),
        }
    }
}

/// `[Lhs :=] X.(type)`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSwitchGuard {
    pub(crate) pos: Pos,
    pub lhs: Option<Arc<Name>>,
    pub x: Box<Expr>,
}

impl TypeSwitchGuard {
    pub fn new(pos: Pos, lhs: Option<Arc<Name>>, x: Expr) -> Self {
        Self {
            pos,
            lhs,
            x: Box::new(x),
        }
    }
}

/// A unary (`Y` is `None`) or binary operation.
///
/// Pointer types `*T` are represented as unary operations with [Operator::Mul].
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub(crate) pos: Pos,
    pub op: Operator,
    pub x: Box<Expr>,
    pub y: Option<Box<Expr>>,
}

impl Operation {
    pub fn unary(pos: Pos, op: Operator, x: Expr) -> Self {
        Self {
            pos,
            op,
            x: Box::new(x),
            y: None,
        }
    }

    pub fn binary(pos: Pos, op: Operator, x: Expr, y: Expr) -> Self {
        Self {
            pos,
            op,
            x: Box::new(x),
            y: Some(Box::new(y)),
        }
    }
}

/// `Fun(Args[0], Args[1], ...)`
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub(crate) pos: Pos,
    pub fun: Box<Expr>,
    pub args: Vec<Expr>,
    /// Whether the last argument is followed by `...`
    pub has_dots: bool,
}

impl CallExpr {
    pub fn new(pos: Pos, fun: Expr, args: Vec<Expr>, has_dots: bool) -> Self {
        Self {
            pos,
            fun: Box::new(fun),
            args,
            has_dots,
        }
    }
}

/// `Elems[0], Elems[1], ...`
#[derive(Debug, Clone, PartialEq)]
pub struct ListExpr {
    pub(crate) pos: Pos,
    pub elems: Vec<Expr>,
}

impl ListExpr {
    pub fn new(pos: Pos, elems: Vec<Expr>) -> Self {
        Self { pos, elems }
    }
}

/// `[Len]Elem`, or `[...]Elem` if `len` is `None`
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    pub(crate) pos: Pos,
    pub len: Option<Box<Expr>>,
    pub elem: Box<Expr>,
}

impl ArrayType {
    pub fn new(pos: Pos, len: Option<Expr>, elem: Expr) -> Self {
        Self {
            pos,
            len: len.map(Box::new),
            elem: Box::new(elem),
        }
    }
}

/// `[]Elem`
#[derive(Debug, Clone, PartialEq)]
pub struct SliceType {
    pub(crate) pos: Pos,
    pub elem: Box<Expr>,
}

impl SliceType {
    pub fn new(pos: Pos, elem: Expr) -> Self {
        Self {
            pos,
            elem: Box::new(elem),
        }
    }
}

/// `...Elem`
#[derive(Debug, Clone, PartialEq)]
pub struct DotsType {
    pub(crate) pos: Pos,
    pub elem: Box<Expr>,
}

impl DotsType {
    pub fn new(pos: Pos, elem: Expr) -> Self {
        Self {
            pos,
            elem: Box::new(elem),
        }
    }
}

/// `struct { Fields[0] Tags[0]; Fields[1] Tags[1]; ... }`
///
/// `tags` is either empty or exactly as long as `fields`.
#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    pub(crate) pos: Pos,
    pub fields: Vec<Field>,
    pub tags: Vec<Option<BasicLit>>,
}

impl StructType {
    pub fn new(pos: Pos) -> Self {
        Self {
            pos,
            fields: vec![],
            tags: vec![],
        }
    }
}

/// A struct field, parameter, result, type parameter, interface method or embedded element.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub(crate) pos: Pos,
    pub name: Option<Arc<Name>>,
    pub ty: Expr,
}

impl Field {
    pub fn new(pos: Pos, name: Option<Arc<Name>>, ty: Expr) -> Self {
        Self { pos, name, ty }
    }
}

/// `func(Params) Results`
#[derive(Debug, Clone, PartialEq)]
pub struct FuncType {
    pub(crate) pos: Pos,
    pub params: Vec<Field>,
    pub results: Vec<Field>,
}

impl FuncType {
    pub fn new(pos: Pos, params: Vec<Field>, results: Vec<Field>) -> Self {
        Self {
            pos,
            params,
            results,
        }
    }
}

/// `interface { Methods[0]; Methods[1]; ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceType {
    pub(crate) pos: Pos,
    pub methods: Vec<Field>,
}

impl InterfaceType {
    pub fn new(pos: Pos, methods: Vec<Field>) -> Self {
        Self { pos, methods }
    }
}

/// `map[Key]Value`
#[derive(Debug, Clone, PartialEq)]
pub struct MapType {
    pub(crate) pos: Pos,
    pub key: Box<Expr>,
    pub value: Box<Expr>,
}

impl MapType {
    pub fn new(pos: Pos, key: Expr, value: Expr) -> Self {
        Self {
            pos,
            key: Box::new(key),
            value: Box::new(value),
        }
    }
}

/// The direction of a channel type
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum ChanDir {
    #[default]
    Both,
    SendOnly,
    RecvOnly,
}

/// `chan Elem`, `chan<- Elem` or `<-chan Elem`
#[derive(Debug, Clone, PartialEq)]
pub struct ChanType {
    pub(crate) pos: Pos,
    pub dir: ChanDir,
    pub elem: Box<Expr>,
}

impl ChanType {
    pub fn new(pos: Pos, dir: ChanDir, elem: Expr) -> Self {
        Self {
            pos,
            dir,
            elem: Box::new(elem),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sugo_tokens::pos::PosBase;

    fn pos(col: u32) -> Pos {
        Pos::new(PosBase::file("test"), 1, col)
    }

    #[test]
    fn test_n_keys_tracks_elements() {
        let key = KeyValueExpr::new(pos(3), Expr::name(pos(2), "a"), BasicLit::int(pos(4), 1).into());
        let mut lit = CompositeLit::new(pos(1), None, vec![key.into()], pos(5));
        assert_eq!(lit.n_keys(), 1);
        lit.elems.push(BasicLit::int(pos(6), 2).into());
        assert_eq!(lit.n_keys(), 1);
        lit.elems.clear();
        assert_eq!(lit.n_keys(), 0);
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("OK"), r#""OK""#);
        assert_eq!(quote("a\"b\\"), r#""a\"b\\""#);
        assert_eq!(quote("é\n"), "\"é\\n\"");
        assert_eq!(BasicLit::string(pos(1), "x").unquoted(), Some("x"));
    }

    #[test]
    fn test_unparen() {
        let inner = Expr::name(pos(2), "x");
        let x: Expr = ParenExpr::new(pos(1), ParenExpr::new(pos(1), inner.clone()).into()).into();
        assert_eq!(x.unparen(), &inner);
    }
}
