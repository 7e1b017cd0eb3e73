//! The file level and declarations

use super::{Handler, Parser};
use std::sync::Arc;
use sugo_ast::decl::{ConstDecl, Decl, FuncDecl, Group, ImportDecl, TypeDecl, VarDecl};
use sugo_ast::expr::{BasicLit, CallExpr, Expr, FuncType, Name, Operation};
use sugo_ast::File;
use sugo_tokens::pos::{Pos, Positioned};
use sugo_tokens::token::{LitKind, Operator, Token};
use tracing::{debug, trace};

/// Where top level parsing resumes after an error
const DECL_FOLLOW: [Token; 6] = [
    Token::Import,
    Token::Const,
    Token::Type,
    Token::Var,
    Token::Func,
    Token::Enum,
];

impl<H: Handler + ?Sized> Parser<'_, H> {
    /// SourceFile = [ PackageClause ";" ] { ImportDecl ";" } { TopLevelDecl ";" | Statement ";" } .
    pub(super) fn file(&mut self) -> File {
        let pos = self.pos();

        let (pkg_name, pragmas) = if self.got(Token::Package) {
            let pragmas = self.take_pragma();
            let name = self.name();
            self.want(Token::Semi);
            // don't bother continuing if the package clause has errors
            if self.first.is_some() {
                let mut file = File::new(pos, name, vec![], self.pos());
                file.pragmas = pragmas;
                return file;
            }
            (name, pragmas)
        } else {
            debug!("no package clause, assuming package {}", sugo_ast::ENTRY_PACKAGE);
            (
                Arc::new(Name::new(pos.clone(), sugo_ast::ENTRY_PACKAGE)),
                vec![],
            )
        };

        let mut decls: Vec<Decl> = vec![];
        let mut prev = Token::Import;
        while self.tok != Token::Eof {
            if self.tok == Token::Import && prev != Token::Import {
                self.syntax_error("imports must appear before other declarations");
            }
            prev = self.tok;

            let mut statement = false;
            match self.tok {
                Token::Import => {
                    self.next();
                    self.append_group(&mut decls, Self::import_decl);
                }
                Token::Const => {
                    self.next();
                    self.append_group(&mut decls, Self::const_decl);
                }
                Token::Type => {
                    self.next();
                    self.append_group(&mut decls, Self::type_decl);
                }
                Token::Var => {
                    self.next();
                    self.append_group(&mut decls, Self::var_decl);
                }
                Token::Func => {
                    let pos = self.pos();
                    self.next();
                    decls.push(self.func_decl(pos).into());
                }
                Token::Enum => {
                    self.enum_decl(&mut decls);
                }
                Token::Semi => {
                    // empty statement
                    self.next();
                    continue;
                }
                Token::Lbrace if decls.last().is_some_and(is_empty_func_decl) => {
                    // opening { of function declaration on next line
                    self.syntax_error("unexpected semicolon or newline before {");
                    self.advance(&DECL_FOLLOW);
                    continue;
                }
                _ => {
                    if !self.top_level_stmt() {
                        self.syntax_error("non-declaration statement outside function body");
                        self.advance(&DECL_FOLLOW);
                        continue;
                    }
                    statement = true;
                }
            }

            // Reset the pragmas before consuming ';' since the comments that follow may hold
            // pragmas for the next declaration.
            self.clear_pragma();
            if self.tok != Token::Eof && !self.got(Token::Semi) {
                if statement {
                    self.syntax_error("at end of statement");
                    self.advance(&[Token::Semi, Token::Rbrace]);
                    self.got(Token::Semi);
                } else {
                    self.syntax_error("after top level declaration");
                    self.advance(&DECL_FOLLOW);
                }
            }
        }
        self.clear_pragma();

        let mut file = File::new(pos, pkg_name, decls, self.pos());
        file.pragmas = pragmas;
        self.entry_point(&mut file);
        file
    }

    /// Parses a statement outside of any function and keeps it for the entry point. Returns
    /// `false` if there was no statement.
    fn top_level_stmt(&mut self) -> bool {
        let errcnt = self.errcnt;
        self.fnest += 1;
        let stmt = self.stmt_or_nil();
        self.fnest -= 1;
        if self.errcnt != errcnt {
            self.top_level_errors = true;
        }
        match stmt {
            Some(stmt) => {
                trace!("top level statement at {}", stmt.pos());
                self.top_level.push(stmt);
                true
            }
            None => false,
        }
    }

    /// Parses a single declaration or a parenthesized group of them, after the keyword.
    pub(super) fn append_group(
        &mut self,
        list: &mut Vec<Decl>,
        mut f: impl FnMut(&mut Self, Option<Arc<Group>>) -> Decl,
    ) {
        if self.tok == Token::Lparen {
            let group = Arc::new(Group::new(self.pos()));
            self.clear_pragma();
            // must consume "(" after clearing the pragmas
            self.next();
            self.list("grouped declaration", Token::Semi, Token::Rparen, |p| {
                list.push(f(p, Some(group.clone())));
                false
            });
        } else {
            list.push(f(self, None));
        }
    }

    /// ImportSpec = [ "." | PackageName ] ImportPath .
    fn import_decl(&mut self, group: Option<Arc<Group>>) -> Decl {
        let pos = self.pos();
        let pragmas = self.take_pragma();
        let local_pkg_name = match self.tok {
            Token::Name => Some(self.name()),
            Token::Dot => {
                let name = Arc::new(Name::new(self.pos(), "."));
                self.next();
                Some(name)
            }
            _ => None,
        };

        let path = match self.oliteral() {
            Some(mut path) => {
                if !path.bad && path.kind != LitKind::String {
                    self.syntax_error_at(path.pos(), "import path must be a string");
                    path.bad = true;
                }
                path
            }
            None => {
                let mut path = BasicLit::new(self.pos(), "", LitKind::String);
                path.bad = true;
                self.syntax_error("missing import path");
                self.advance(&[Token::Semi, Token::Rparen]);
                path
            }
        };

        let mut decl = ImportDecl::new(pos, group, local_pkg_name, path);
        decl.pragmas = pragmas;
        decl.into()
    }

    /// ConstSpec = IdentifierList [ [ Type ] "=" ExpressionList ] .
    pub(super) fn const_decl(&mut self, group: Option<Arc<Group>>) -> Decl {
        let pos = self.pos();
        let pragmas = self.take_pragma();
        let first = self.name();
        let names = self.name_list(first);
        let mut ty = None;
        let mut values = None;
        if !matches!(self.tok, Token::Eof | Token::Semi | Token::Rparen) {
            ty = self.type_or_nil();
            if self.got_assign() {
                values = Some(self.expr_list());
            }
        }
        let mut decl = ConstDecl::new(pos, group, names, ty, values);
        decl.pragmas = pragmas;
        decl.into()
    }

    /// TypeSpec = identifier [ TypeParams ] [ "=" ] Type .
    pub(super) fn type_decl(&mut self, group: Option<Arc<Group>>) -> Decl {
        let pos = self.pos();
        let pragmas = self.take_pragma();
        let name = self.name();
        let mut tparams = vec![];
        let mut alias = false;

        let ty = if self.tok == Token::Lbrack {
            // array/slice type or type parameter list
            let lbrack = self.pos();
            self.next();
            match self.tok {
                Token::Name => {
                    // An index or slice expression is never a valid array length, so a name
                    // followed by "[" must start a type parameter with a slice or array
                    // constraint. Otherwise parse a full expression and analyze it.
                    let mut x: Expr = self.name().into();
                    if self.tok != Token::Lbrack {
                        self.xnest += 1;
                        let operand = self.pexpr(Some(x), false);
                        x = self.binary_expr(Some(operand), Default::default());
                        self.xnest -= 1;
                    }
                    // A single name followed by "]" is an array length, a possible type
                    // parameter type followed by a comma makes this a type parameter list.
                    match extract_name(x, self.tok == Token::Comma) {
                        Ok((pname, ptype)) if ptype.is_some() || self.tok != Token::Rbrack => {
                            tparams = self.param_list(Some(pname), ptype, Token::Rbrack, true);
                            alias = self.got_assign();
                            self.type_or_nil()
                        }
                        Ok((pname, _)) => Some(self.array_type(lbrack, Some(pname.into()))),
                        Err(x) => Some(self.array_type(lbrack, Some(x))),
                    }
                }
                Token::Rbrack => {
                    self.next();
                    Some(self.slice_type(lbrack))
                }
                _ => Some(self.array_type(lbrack, None)),
            }
        } else {
            alias = self.got_assign();
            self.type_or_nil()
        };

        let ty = ty.unwrap_or_else(|| {
            let bad = self.bad_expr();
            self.syntax_error("in type declaration");
            self.advance(&[Token::Semi, Token::Rparen]);
            bad
        });

        let mut decl = TypeDecl::new(pos, group, name, tparams, alias, ty);
        decl.pragmas = pragmas;
        decl.into()
    }

    /// VarSpec = IdentifierList ( Type [ "=" ExpressionList ] | "=" ExpressionList ) .
    pub(super) fn var_decl(&mut self, group: Option<Arc<Group>>) -> Decl {
        let pos = self.pos();
        let pragmas = self.take_pragma();
        let first = self.name();
        let names = self.name_list(first);
        let mut ty = None;
        let mut values = None;
        if self.got_assign() {
            values = Some(self.expr_list());
        } else {
            ty = Some(self.type_());
            if self.got_assign() {
                values = Some(self.expr_list());
            }
        }
        let mut decl = VarDecl::new(pos, group, names, ty, values);
        decl.pragmas = pragmas;
        decl.into()
    }

    /// FunctionDecl = "func" FunctionName [ TypeParams ] ( Function | Signature ) .
    /// MethodDecl   = "func" Receiver MethodName ( Function | Signature ) .
    ///
    /// `pos` is the position of the `func` keyword, which has been consumed.
    fn func_decl(&mut self, pos: Pos) -> FuncDecl {
        let pragmas = self.take_pragma();

        let mut context = "";
        let mut recv = None;
        if self.got(Token::Lparen) {
            context = "method";
            let mut receivers = self.param_list(None, None, Token::Rparen, false);
            match receivers.len() {
                0 => self.error("method has no receiver"),
                1 => {}
                _ => self.error("method has multiple receivers"),
            }
            if !receivers.is_empty() {
                recv = Some(receivers.swap_remove(0));
            }
        }

        let (name, tparams, ty) = if self.tok == Token::Name {
            let name = self.name();
            let (tparams, ty) = self.func_type(context);
            (name, tparams, ty)
        } else {
            let name = Arc::new(Name::blank(self.pos()));
            let ty = FuncType::new(self.pos(), vec![], vec![]);
            self.syntax_error(if context.is_empty() {
                "expected name or ("
            } else {
                "expected name"
            });
            self.advance(&[Token::Lbrace, Token::Semi]);
            (name, vec![], ty)
        };

        let body = (self.tok == Token::Lbrace).then(|| self.func_body());
        let mut decl = FuncDecl::new(pos, recv, name, tparams, ty, body);
        decl.pragmas = pragmas;
        decl
    }
}

fn is_empty_func_decl(decl: &Decl) -> bool {
    matches!(decl, Decl::Func(f) if f.body.is_none())
}

/// Splits `x` into a type parameter name and, if present, its constraint. `force` makes an
/// ambiguous constraint count as a type. On failure `x` is given back unchanged.
pub(super) fn extract_name(x: Expr, force: bool) -> Result<(Arc<Name>, Option<Expr>), Expr> {
    match x {
        Expr::Name(name) => Ok((name, None)),
        Expr::Operation(operation) if operation.y.is_some() => {
            let pos = operation.pos();
            let Operation { op, x, y, .. } = operation;
            match (op, *x, y) {
                (Operator::Mul, Expr::Name(name), Some(y)) if force || is_type_elem(&y) => {
                    // name *y
                    Ok((name, Some(Operation::unary(pos, Operator::Mul, *y).into())))
                }
                (Operator::Or, lhs, Some(y)) => {
                    let force = force || is_type_elem(&y);
                    match extract_name(lhs, force) {
                        // name lhs|y
                        Ok((name, Some(lhs))) => Ok((
                            name,
                            Some(Operation::binary(pos, Operator::Or, lhs, *y).into()),
                        )),
                        Ok((name, None)) => {
                            Err(Operation::binary(pos, Operator::Or, name.into(), *y).into())
                        }
                        Err(lhs) => Err(Operation::binary(pos, Operator::Or, lhs, *y).into()),
                    }
                }
                (op, x, y) => {
                    let mut operation = Operation::unary(pos, op, x);
                    operation.y = y;
                    Err(operation.into())
                }
            }
        }
        Expr::Call(call)
            if matches!(*call.fun, Expr::Name(_))
                && call.args.len() == 1
                && !call.has_dots
                && (force || is_type_elem(&call.args[0])) =>
        {
            // name (arg)
            let pos = call.pos();
            let CallExpr { fun, mut args, .. } = call;
            match *fun {
                Expr::Name(name) => Ok((name, Some(args.remove(0)))),
                fun => Err(CallExpr::new(pos, fun, args, false).into()),
            }
        }
        x => Err(x),
    }
}

/// Whether `x` is a (possibly parenthesized) type element expression. This is `false` if `x`
/// could be a type element or an ordinary value.
pub(super) fn is_type_elem(x: &Expr) -> bool {
    match x {
        Expr::ArrayType(_)
        | Expr::StructType(_)
        | Expr::FuncType(_)
        | Expr::InterfaceType(_)
        | Expr::SliceType(_)
        | Expr::MapType(_)
        | Expr::ChanType(_) => true,
        Expr::Operation(op) => {
            is_type_elem(&op.x)
                || op.y.as_deref().is_some_and(is_type_elem)
                || op.op == Operator::Tilde
        }
        Expr::Paren(p) => is_type_elem(&p.x),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::tests_support::parse_ok;
    use sugo_ast::decl::Decl;
    use sugo_ast::expr::Expr;
    use test_log::test;

    fn type_decl(src: &str) -> sugo_ast::decl::TypeDecl {
        let file = parse_ok(&format!("package p\n{src}\n"));
        match file.decls.into_iter().next() {
            Some(Decl::Type(decl)) => decl,
            other => panic!("expected a type declaration, got {other:?}"),
        }
    }

    #[test]
    fn test_array_or_type_parameters() {
        // a single name followed by "]" is an array length
        let decl = type_decl("type T[N]int");
        assert!(decl.tparams.is_empty());
        assert!(matches!(decl.ty, Expr::ArrayType(_)));

        // a trailing comma forces a type parameter list
        let decl = type_decl("type T[P *C,] struct{}");
        assert_eq!(decl.tparams.len(), 1);
        assert_eq!(decl.tparams[0].ty.to_string(), "*C");

        let decl = type_decl("type T[P any, Q interface{ ~int }] struct{}");
        assert_eq!(decl.tparams.len(), 2);

        // N * M is an ordinary array length
        let decl = type_decl("type T[N * M]int");
        assert!(decl.tparams.is_empty());
        assert_eq!(decl.ty.to_string(), "[N * M]int");

        let decl = type_decl("type T[P *[]int] struct{}");
        assert_eq!(decl.tparams.len(), 1);
        assert_eq!(decl.tparams[0].ty.to_string(), "*[]int");
    }

    #[test]
    fn test_grouped_declarations_share_group() {
        let file = parse_ok("package p\nconst (\n\tA = 1\n\tB = 2\n)\nvar x int\n");
        let groups: Vec<_> = file.decls.iter().map(|d| d.group().cloned()).collect();
        let (Some(a), Some(b), None) = (&groups[0], &groups[1], &groups[2]) else {
            panic!("unexpected groups {groups:?}");
        };
        assert!(std::sync::Arc::ptr_eq(a, b));
    }

    #[test]
    fn test_pragmas_attach_to_next_declaration() {
        let file = parse_ok("//go:build x\npackage p\n\n//go:noinline\nfunc f() {}\n");
        assert_eq!(file.pragmas.len(), 1);
        assert_eq!(file.pragmas[0].text, "go:build x");
        let f = file.funcs().next().expect("no function");
        assert_eq!(f.pragmas.len(), 1);
        assert_eq!(f.pragmas[0].text, "go:noinline");
    }

    #[test]
    fn test_method_receiver() {
        let file = parse_ok("package p\nfunc (s *S) M(x int) string { return \"\" }\n");
        let f = file.funcs().next().expect("no function");
        let recv = f.recv.as_ref().expect("no receiver");
        assert_eq!(recv.name.as_ref().map(|n| n.value()), Some("s"));
        assert_eq!(recv.ty.to_string(), "*S");
        assert_eq!(f.ty.results.len(), 1);
    }
}
