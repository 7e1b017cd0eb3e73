//! Type expressions, parameter lists and the bodies of struct and interface types

use super::error::ErrorKind;
use super::{Handler, Parser};
use std::sync::Arc;
use sugo_ast::expr::{
    ArrayType, BadExpr, BasicLit, ChanDir, ChanType, DotsType, Expr, Field, FuncType, IndexExpr,
    InterfaceType, ListExpr, MapType, Name, Operation, SelectorExpr, SliceType, StructType,
};
use sugo_ast::positions::start_pos;
use sugo_tokens::pos::{Pos, Positioned};
use sugo_tokens::token::{Operator, Token};

/// A parameter while its list is being parsed. Either part may be missing until types are
/// distributed over the whole list.
struct Param {
    pos: Pos,
    name: Option<Arc<Name>>,
    ty: Option<Expr>,
}

impl Param {
    fn into_field(self) -> Field {
        let ty = self
            .ty
            .unwrap_or_else(|| BadExpr::new(self.pos.clone()).into());
        Field::new(self.pos, self.name, ty)
    }
}

fn new_indirect(pos: Pos, ty: Expr) -> Expr {
    Operation::unary(pos, Operator::Mul, ty).into()
}

impl<H: Handler + ?Sized> Parser<'_, H> {
    pub(super) fn type_(&mut self) -> Expr {
        match self.type_or_nil() {
            Some(ty) => ty,
            None => {
                let ty = self.bad_expr();
                self.syntax_error("expected type");
                self.advance(&[
                    Token::Comma,
                    Token::Colon,
                    Token::Semi,
                    Token::Rparen,
                    Token::Rbrack,
                    Token::Rbrace,
                ]);
                ty
            }
        }
    }

    /// Like [type_](Self::type_) but returns `None` instead of complaining if there is no type.
    pub(super) fn type_or_nil(&mut self) -> Option<Expr> {
        let pos = self.pos();
        let ty = match self.tok {
            Token::Star => {
                // ptrtype
                self.next();
                new_indirect(pos, self.type_())
            }
            Token::Arrow => {
                // recvchantype
                self.next();
                self.want(Token::Chan);
                let elem = self.chan_elem();
                ChanType::new(pos, ChanDir::RecvOnly, elem).into()
            }
            Token::Func => {
                self.next();
                let (_, ty) = self.func_type("function type");
                ty.into()
            }
            Token::Lbrack => {
                // '[' oexpr ']' ntype
                // '[' _DotDotDot ']' ntype
                self.next();
                if self.got(Token::Rbrack) {
                    return Some(self.slice_type(pos));
                }
                self.array_type(pos, None)
            }
            Token::Chan => {
                // _Chan non_recvchantype
                // _Chan _Comm ntype
                self.next();
                let dir = if self.got(Token::Arrow) {
                    ChanDir::SendOnly
                } else {
                    ChanDir::Both
                };
                let elem = self.chan_elem();
                ChanType::new(pos, dir, elem).into()
            }
            Token::Map => {
                // _Map '[' ntype ']' ntype
                self.next();
                self.want(Token::Lbrack);
                let key = self.type_();
                self.want(Token::Rbrack);
                let value = self.type_();
                MapType::new(pos, key, value).into()
            }
            Token::Struct => self.struct_type().into(),
            Token::Interface => self.interface_type().into(),
            Token::Name => self.qualified_name(None),
            Token::Lparen => {
                self.next();
                let ty = self.type_();
                self.want(Token::Rparen);
                ty
            }
            _ => return None,
        };
        Some(ty)
    }

    fn type_instance(&mut self, ty: Expr) -> Expr {
        let pos = self.pos();
        self.want(Token::Lbrack);
        let index = if self.tok == Token::Rbrack {
            self.syntax_error("expected type argument list");
            self.bad_expr()
        } else {
            self.type_list(true).0
        };
        self.want(Token::Rbrack);
        IndexExpr::new(pos, ty, index).into()
    }

    /// Parses `[ TypeParams ] Parameters [ Result ]`. Type parameters are only permitted if
    /// `context` is empty.
    pub(super) fn func_type(&mut self, context: &str) -> (Vec<Field>, FuncType) {
        let pos = self.pos();
        let mut tparams = vec![];
        if self.got(Token::Lbrack) {
            if !context.is_empty() {
                // accept but complain
                self.syntax_error_at(
                    pos.clone(),
                    &format!("{context} must have no type parameters"),
                );
            }
            if self.tok == Token::Rbrack {
                self.syntax_error("empty type parameter list");
                self.next();
            } else {
                tparams = self.param_list(None, None, Token::Rbrack, true);
            }
        }

        self.want(Token::Lparen);
        let params = self.param_list(None, None, Token::Rparen, false);
        let results = self.func_result();
        (tparams, FuncType::new(pos, params, results))
    }

    /// `[` has been consumed and `pos` is its position. `len` is the array length if it has
    /// already been parsed.
    pub(super) fn array_type(&mut self, pos: Pos, len: Option<Expr>) -> Expr {
        let len = match len {
            Some(len) => Some(len),
            None if self.got(Token::DotDotDot) => None,
            None => {
                self.xnest += 1;
                let len = self.expr();
                self.xnest -= 1;
                Some(len)
            }
        };
        if self.tok == Token::Comma {
            // trailing commas are only accepted in type parameter lists
            self.syntax_error("unexpected comma; expecting ]");
            self.next();
        }
        self.want(Token::Rbrack);
        let elem = self.type_();
        ArrayType::new(pos, len, elem).into()
    }

    /// `[` and `]` have been consumed and `pos` is the position of `[`.
    pub(super) fn slice_type(&mut self, pos: Pos) -> Expr {
        let elem = self.type_();
        SliceType::new(pos, elem).into()
    }

    fn chan_elem(&mut self) -> Expr {
        match self.type_or_nil() {
            Some(elem) => elem,
            None => {
                let elem = self.bad_expr();
                // assume the element type is simply absent
                self.syntax_error("missing channel element type");
                elem
            }
        }
    }

    /// StructType = "struct" "{" { FieldDecl ";" } "}" .
    fn struct_type(&mut self) -> StructType {
        let mut ty = StructType::new(self.pos());
        self.want(Token::Struct);
        self.want(Token::Lbrace);
        self.list("struct type", Token::Semi, Token::Rbrace, |p| {
            p.field_decl(&mut ty);
            false
        });
        if !ty.tags.is_empty() {
            ty.tags.resize(ty.fields.len(), None);
        }
        ty
    }

    fn add_field(
        &mut self,
        ty: &mut StructType,
        pos: Pos,
        name: Option<Arc<Name>>,
        field_ty: Expr,
        tag: Option<BasicLit>,
    ) {
        if let Some(tag) = tag {
            ty.tags.resize(ty.fields.len(), None);
            ty.tags.push(Some(tag));
            if self.mode.check_invariants {
                assert_eq!(
                    ty.fields.len() + 1,
                    ty.tags.len(),
                    "inconsistent struct field list"
                );
            }
        }
        ty.fields.push(Field::new(pos, name, field_ty));
    }

    /// FieldDecl      = (IdentifierList Type | EmbeddedField) [ Tag ] .
    /// EmbeddedField  = [ "*" ] TypeName [ TypeArgs ] .
    fn field_decl(&mut self, ty: &mut StructType) {
        let pos = self.pos();
        match self.tok {
            Token::Name => {
                let name = self.name();
                if matches!(
                    self.tok,
                    Token::Dot | Token::Literal | Token::Semi | Token::Rbrace
                ) {
                    // embedded type
                    let field_ty = self.qualified_name(Some(name));
                    let tag = self.oliteral();
                    self.add_field(ty, pos, None, field_ty, tag);
                    return;
                }

                // name1, name2, ... Type [ tag ]
                let names = self.name_list(name.clone());
                let field_ty = if names.len() == 1 && self.tok == Token::Lbrack {
                    // an embedded instantiated type T[P1, P2, ...] or a field T of array or
                    // slice type [P]E or []E
                    match self.array_or_targs() {
                        Expr::Index(mut index) => {
                            // embedded type T[P1, P2, ...]
                            index.x = Box::new(name.into());
                            let tag = self.oliteral();
                            self.add_field(ty, pos, None, index.into(), tag);
                            return;
                        }
                        field_ty => field_ty,
                    }
                } else {
                    // T P
                    self.type_()
                };

                let tag = self.oliteral();
                for name in names {
                    self.add_field(ty, name.pos(), Some(name), field_ty.clone(), tag.clone());
                }
            }
            Token::Star => {
                self.next();
                let field_ty = if self.tok == Token::Lparen {
                    // *(T)
                    self.syntax_error("cannot parenthesize embedded type");
                    self.next();
                    let field_ty = self.qualified_name(None);
                    // no need to complain if missing
                    self.got(Token::Rparen);
                    field_ty
                } else {
                    // *T
                    self.qualified_name(None)
                };
                let tag = self.oliteral();
                self.add_field(ty, pos.clone(), None, new_indirect(pos, field_ty), tag);
            }
            Token::Lparen => {
                self.syntax_error("cannot parenthesize embedded type");
                self.next();
                let field_ty = if self.tok == Token::Star {
                    // (*T)
                    let pos = self.pos();
                    self.next();
                    new_indirect(pos, self.qualified_name(None))
                } else {
                    // (T)
                    self.qualified_name(None)
                };
                self.got(Token::Rparen);
                let tag = self.oliteral();
                self.add_field(ty, pos, None, field_ty, tag);
            }
            _ => {
                self.syntax_error("expected field name or embedded type");
                self.advance(&[Token::Semi, Token::Rbrace]);
            }
        }
    }

    /// Parses `[n]E` or the type arguments `[n,]`, `[n1, n2]` after a name. In the second
    /// case an [IndexExpr] is returned whose `x` must be filled in by the caller.
    fn array_or_targs(&mut self) -> Expr {
        let pos = self.pos();
        self.want(Token::Lbrack);
        if self.got(Token::Rbrack) {
            return self.slice_type(pos);
        }

        // x [n]E or x[n,], x[n1, n2], ...
        let (n, comma) = self.type_list(false);
        self.want(Token::Rbrack);
        if !comma {
            if let Some(elem) = self.type_or_nil() {
                // x [n]E
                return ArrayType::new(pos, Some(n), elem).into();
            }
        }

        // x[n,], x[n1, n2], ...
        IndexExpr::new(pos.clone(), BadExpr::new(pos).into(), n).into()
    }

    /// InterfaceType = "interface" "{" { ( MethodDecl | EmbeddedElem ) ";" } "}" .
    fn interface_type(&mut self) -> InterfaceType {
        let pos = self.pos();
        self.want(Token::Interface);
        self.want(Token::Lbrace);
        let mut methods = vec![];
        self.list("interface type", Token::Semi, Token::Rbrace, |p| {
            let f = (p.tok == Token::Name).then(|| p.method_decl());
            let f = match f {
                Some(f) if f.name.is_some() => f,
                f => p.embedded_elem(f),
            };
            methods.push(f);
            false
        });
        InterfaceType::new(pos, methods)
    }

    /// MethodSpec = MethodName Signature | InterfaceTypeName .
    fn method_decl(&mut self) -> Field {
        const CONTEXT: &str = "interface method";

        let pos = self.pos();
        let name = self.name();

        match self.tok {
            Token::Lparen => {
                // method
                let (_, ty) = self.func_type(CONTEXT);
                Field::new(pos, Some(name), ty.into())
            }
            Token::Lbrack => {
                // A generic method m[T C](x T) or an embedded instantiated type T[P1, P2].
                // Generic methods are parsed but rejected.
                let lbrack = self.pos();
                self.next();

                if self.tok == Token::Rbrack {
                    // name[]
                    let rbrack = self.pos();
                    self.next();
                    if self.tok == Token::Lparen {
                        self.error_at(
                            rbrack,
                            ErrorKind::Invalid("empty type parameter list".into()),
                        );
                        let (_, ty) = self.func_type(CONTEXT);
                        return Field::new(pos, Some(name), ty.into());
                    }
                    self.error_at(rbrack, ErrorKind::Invalid("empty type argument list".into()));
                    return Field::new(pos, None, name.into());
                }

                // A type argument list looks like a parameter list with only types.
                let mut list = self.param_list(None, None, Token::Rbrack, false);
                if list.is_empty() {
                    // only possible after errors in the list
                    return Field::new(pos, None, name.into());
                }

                if list[0].name.is_some() {
                    // generic method
                    let (_, ty) = self.func_type(CONTEXT);
                    self.error_at(
                        lbrack,
                        ErrorKind::Invalid("interface method must have no type parameters".into()),
                    );
                    return Field::new(pos, Some(name), ty.into());
                }

                // embedded instantiated type
                let index = if list.len() == 1 {
                    list.remove(0).ty
                } else {
                    let list_pos = list[0].pos();
                    ListExpr::new(list_pos, list.into_iter().map(|f| f.ty).collect()).into()
                };
                Field::new(pos, None, IndexExpr::new(lbrack, name.into(), index).into())
            }
            _ => {
                // embedded type
                let ty = self.qualified_name(Some(name));
                Field::new(pos, None, ty)
            }
        }
    }

    /// EmbeddedElem = MethodSpec | EmbeddedTerm { "|" EmbeddedTerm } .
    fn embedded_elem(&mut self, f: Option<Field>) -> Field {
        let mut f = match f {
            Some(f) => f,
            None => {
                let pos = self.pos();
                let ty = self.embedded_term();
                Field::new(pos, None, ty)
            }
        };

        while self.is_op(Operator::Or) {
            let pos = self.pos();
            self.next();
            let y = self.embedded_term();
            let x = std::mem::replace(&mut f.ty, BadExpr::new(pos.clone()).into());
            f.ty = Operation::binary(pos, Operator::Or, x, y).into();
        }
        f
    }

    /// EmbeddedTerm = [ "~" ] Type .
    fn embedded_term(&mut self) -> Expr {
        if self.is_op(Operator::Tilde) {
            let pos = self.pos();
            self.next();
            let ty = self.type_();
            return Operation::unary(pos, Operator::Tilde, ty).into();
        }

        match self.type_or_nil() {
            Some(ty) => ty,
            None => {
                let ty = self.bad_expr();
                self.syntax_error("expected ~ term or type");
                self.advance(&[
                    Token::Operator,
                    Token::Semi,
                    Token::Rparen,
                    Token::Rbrack,
                    Token::Rbrace,
                ]);
                ty
            }
        }
    }

    /// Result = Parameters | Type .
    fn func_result(&mut self) -> Vec<Field> {
        if self.got(Token::Lparen) {
            return self.param_list(None, None, Token::Rparen, false);
        }
        let pos = self.pos();
        match self.type_or_nil() {
            Some(ty) => vec![Field::new(pos, None, ty)],
            None => vec![],
        }
    }

    /// ParameterDecl = [ IdentifierList ] [ "..." ] Type .
    ///
    /// `name` is the already parsed name of the parameter, if any.
    fn param_decl_or_nil(&mut self, name: Option<Arc<Name>>, follow: Token) -> Option<Param> {
        // type set notation is ok in type parameter lists
        let type_sets_ok = follow == Token::Rbrack;

        let pos = match &name {
            Some(name) => name.pos(),
            None if type_sets_ok && self.is_op(Operator::Tilde) => {
                // "~" ...
                let f = self.embedded_elem(None);
                return Some(Param {
                    pos: f.pos(),
                    name: None,
                    ty: Some(f.ty),
                });
            }
            None => self.pos(),
        };
        let mut param = Param {
            pos,
            name: None,
            ty: None,
        };

        if self.tok == Token::Name || name.is_some() {
            let name = match name {
                Some(name) => name,
                None => self.name(),
            };

            if self.tok == Token::Lbrack {
                // name "[" ...
                match self.array_or_targs() {
                    Expr::Index(mut index) => {
                        // name "[" ... "]"
                        index.x = Box::new(name.into());
                        param.ty = Some(index.into());
                    }
                    ty => {
                        // name "[" n "]" E
                        param.name = Some(name);
                        param.ty = Some(ty);
                    }
                }
                if type_sets_ok && self.is_op(Operator::Or) {
                    // name "[" ... "]" "|" ...
                    // name "[" n "]" E "|" ...
                    param = self.embedded_param(param);
                }
                return Some(param);
            }

            if self.tok == Token::Dot {
                // name "." ...
                param.ty = Some(self.qualified_name(Some(name)));
                if type_sets_ok && self.is_op(Operator::Or) {
                    // name "." name "|" ...
                    param = self.embedded_param(param);
                }
                return Some(param);
            }

            if type_sets_ok && self.is_op(Operator::Or) {
                // name "|" ...
                param.ty = Some(name.into());
                return Some(self.embedded_param(param));
            }

            param.name = Some(name);
        }

        if self.tok == Token::DotDotDot {
            // [name] "..." ...
            let pos = self.pos();
            self.next();
            let elem = match self.type_or_nil() {
                Some(elem) => elem,
                None => {
                    let elem = self.bad_expr();
                    self.syntax_error("... is missing type");
                    elem
                }
            };
            param.ty = Some(DotsType::new(pos, elem).into());
            return Some(param);
        }

        if type_sets_ok && self.is_op(Operator::Tilde) {
            // [name] "~" ...
            param.ty = Some(self.embedded_elem(None).ty);
            return Some(param);
        }

        param.ty = self.type_or_nil();
        if type_sets_ok && param.ty.is_some() && self.is_op(Operator::Or) {
            // [name] type "|"
            param = self.embedded_param(param);
        }
        if param.name.is_none() && param.ty.is_none() {
            self.syntax_error(&format!("expected {}", follow.describe()));
            self.advance(&[Token::Comma, follow]);
            return None;
        }
        Some(param)
    }

    /// Continues the type of `param` as a union of embedded terms.
    fn embedded_param(&mut self, param: Param) -> Param {
        let Param { pos, name, ty } = param;
        let ty = ty.unwrap_or_else(|| BadExpr::new(pos.clone()).into());
        let f = self.embedded_elem(Some(Field::new(pos.clone(), None, ty)));
        Param {
            pos,
            name,
            ty: Some(f.ty),
        }
    }

    /// Parses a parameter list closed by `close`. If `name` and `ty` are present they are the
    /// already parsed first parameter. `require_names` is set for type parameter lists.
    pub(super) fn param_list(
        &mut self,
        mut name: Option<Arc<Name>>,
        mut ty: Option<Expr>,
        close: Token,
        require_names: bool,
    ) -> Vec<Field> {
        // list won't call back at the end of the list, so handle a complete first parameter
        if let (Some(name), Some(ty)) = (&name, &ty) {
            if self.tok == close {
                self.next();
                return vec![Field::new(name.pos(), Some(name.clone()), ty.clone())];
            }
        }

        let mut list: Vec<Param> = vec![];
        // parameters with an explicit name and type
        let mut named = 0;
        // parameters with an explicit type
        let mut typed = 0;
        let end = self.list("parameter list", Token::Comma, close, |p| {
            let param = match ty.take() {
                Some(ty) => {
                    let name = name.take();
                    Some(Param {
                        pos: name.as_ref().map_or_else(|| ty.pos(), |n| n.pos()),
                        name,
                        ty: Some(ty),
                    })
                }
                None => p.param_decl_or_nil(name.take(), close),
            };
            if let Some(param) = param {
                if param.name.is_some() && param.ty.is_some() {
                    named += 1;
                }
                if param.ty.is_some() {
                    typed += 1;
                }
                list.push(param);
            }
            false
        });

        if list.is_empty() {
            return vec![];
        }

        // distribute parameter types
        if named == 0 && !require_names {
            // all unnamed => found names are named types
            for param in &mut list {
                if let Some(name) = param.name.take() {
                    param.ty = Some(name.into());
                }
            }
        } else if named != list.len() {
            // some named or we're in a type parameter list => all must be named
            let mut err_pos = None;
            let mut ty: Option<Expr> = None;
            for param in list.iter_mut().rev() {
                if let Some(pty) = param.ty.clone() {
                    if param.name.is_none() {
                        let pos = start_pos(&pty);
                        param.name = Some(Arc::new(Name::blank(pos.clone())));
                        err_pos = Some(pos);
                    }
                    ty = Some(pty);
                } else if let Some(ty) = &ty {
                    param.ty = Some(ty.clone());
                } else {
                    // only a name
                    let pos = param
                        .name
                        .as_ref()
                        .map_or_else(|| param.pos.clone(), |n| n.pos());
                    param.ty = Some(BadExpr::new(pos.clone()).into());
                    err_pos = Some(pos);
                }
            }
            if let Some(mut err_pos) = err_pos {
                let msg = if require_names {
                    // Parameters without types can only be at the end of the list,
                    // otherwise the types would have been assigned to them.
                    if named == typed {
                        err_pos = end;
                        "missing type constraint"
                    } else if list.len() == 1 {
                        "missing type parameter name or invalid array length"
                    } else {
                        "missing type parameter name"
                    }
                } else {
                    "mixed named and unnamed parameters"
                };
                self.syntax_error_at(err_pos, msg);
            }
        }

        list.into_iter().map(Param::into_field).collect()
    }

    /// Parses a possibly qualified and instantiated type name. `name` is the first name if it
    /// has already been parsed.
    pub(super) fn qualified_name(&mut self, name: Option<Arc<Name>>) -> Expr {
        let mut x: Expr = match name {
            Some(name) => name.into(),
            None if self.tok == Token::Name => self.name().into(),
            None => {
                let x = Expr::name(self.pos(), "_");
                self.syntax_error("expected name");
                self.advance(&[Token::Dot, Token::Semi, Token::Rbrace]);
                x
            }
        };

        if self.tok == Token::Dot {
            let pos = self.pos();
            self.next();
            let sel = self.name();
            x = SelectorExpr::new(pos, x, sel).into();
        }

        if self.tok == Token::Lbrack {
            x = self.type_instance(x);
        }
        x
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::tests_support::{parse_errors, parse_ok};
    use sugo_ast::decl::Decl;
    use sugo_ast::expr::Expr;
    use test_log::test;

    fn first_type(src: &str) -> Expr {
        let file = parse_ok(&format!("package p\ntype T {src}\n"));
        match file.decls.into_iter().next() {
            Some(Decl::Type(decl)) => decl.ty,
            other => panic!("expected a type declaration, got {other:?}"),
        }
    }

    #[test]
    fn test_struct_tags_are_padded() {
        let Expr::StructType(st) = first_type("struct {\n\ta int\n\tb string `json:\"b\"`\n\tc bool\n}")
        else {
            panic!("expected a struct type");
        };
        assert_eq!(st.fields.len(), 3);
        assert_eq!(st.tags.len(), 3);
        assert!(st.tags[0].is_none());
        assert!(st.tags[1].is_some());
        assert!(st.tags[2].is_none());

        let Expr::StructType(st) = first_type("struct { a, b int }") else {
            panic!("expected a struct type");
        };
        assert_eq!(st.fields.len(), 2);
        assert!(st.tags.is_empty());
    }

    #[test]
    fn test_embedded_fields() {
        let Expr::StructType(st) =
            first_type("struct {\n\tio.Reader\n\t*Buffer\n\tList[int]\n\tarr [4]int\n}")
        else {
            panic!("expected a struct type");
        };
        let names: Vec<_> = st
            .fields
            .iter()
            .map(|f| f.name.as_ref().map(|n| n.value().to_string()))
            .collect();
        assert_eq!(names, [None, None, None, Some("arr".to_string())]);
        assert_eq!(st.fields[2].ty.to_string(), "List[int]");
    }

    #[test]
    fn test_interface_elements() {
        let Expr::InterfaceType(it) =
            first_type("interface {\n\tRead(p []byte) (int, error)\n\t~int | ~string\n\tfmt.Stringer\n}")
        else {
            panic!("expected an interface type");
        };
        assert_eq!(it.methods.len(), 3);
        assert!(it.methods[0].name.is_some());
        assert_eq!(it.methods[1].ty.to_string(), "~int | ~string");
        assert_eq!(it.methods[2].ty.to_string(), "fmt.Stringer");
    }

    #[test]
    fn test_parameter_type_distribution() {
        let file = parse_ok("package p\nfunc f(a, b int, c string) {}\nfunc g(int, string) {}\n");
        let funcs: Vec<_> = file.funcs().collect();
        let params: Vec<_> = funcs[0]
            .ty
            .params
            .iter()
            .map(|f| (f.name.as_ref().map(|n| n.value()), f.ty.to_string()))
            .collect();
        assert_eq!(
            params,
            [
                (Some("a"), "int".to_string()),
                (Some("b"), "int".to_string()),
                (Some("c"), "string".to_string())
            ]
        );
        assert!(funcs[1].ty.params.iter().all(|f| f.name.is_none()));
    }

    #[test]
    fn test_mixed_parameters() {
        assert_eq!(
            parse_errors("package p\nfunc f(a int, string) {}\n"),
            ["test.sugo:2:15: syntax error: mixed named and unnamed parameters"]
        );
    }

    #[test]
    fn test_missing_type_constraint() {
        assert_eq!(
            parse_errors("package p\nfunc f[T any, U]() {}\n"),
            ["test.sugo:2:16: syntax error: missing type constraint"]
        );
    }

    #[test]
    fn test_variadic() {
        let file = parse_ok("package p\nfunc f(format string, args ...any) {}\n");
        let f = file.funcs().next().expect("no function");
        assert_eq!(f.ty.params[1].ty.to_string(), "...any");
    }
}
