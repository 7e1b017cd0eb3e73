//! Expressions

use super::{Handler, Parser};
use sugo_ast::expr::{
    AssertExpr, CallExpr, ChanDir, CompositeLit, Expr, FuncLit, IndexExpr, KeyValueExpr,
    ListExpr, Operation, ParenExpr, SelectorExpr, SliceExpr, TypeSwitchGuard,
};
use sugo_tokens::pos::Positioned;
use sugo_tokens::token::{Operator, Prec, Token};

impl<H: Handler + ?Sized> Parser<'_, H> {
    pub(super) fn expr(&mut self) -> Expr {
        self.binary_expr(None, Prec::None)
    }

    /// Climbs binary operators binding tighter than `prec`, starting from `x` if it has
    /// already been parsed.
    pub(super) fn binary_expr(&mut self, x: Option<Expr>, prec: Prec) -> Expr {
        let mut x = match x {
            Some(x) => x,
            None => self.unary_expr(),
        };
        while matches!(self.tok, Token::Operator | Token::Star) && self.prec > prec {
            let pos = self.pos();
            let Some(op) = self.op else { break };
            let tprec = self.prec;
            self.next();
            let y = self.binary_expr(None, tprec);
            x = Operation::binary(pos, op, x, y).into();
        }
        x
    }

    pub(super) fn unary_expr(&mut self) -> Expr {
        self.unary(false)
    }

    /// The index of `x # i`: a unary expression whose primary expression ends before the next
    /// `#`, so that `m#1#2` is `(m#1)#2`.
    pub(super) fn hash_index(&mut self) -> Expr {
        self.unary(true)
    }

    fn unary(&mut self, stop_at_hash: bool) -> Expr {
        match (self.tok, self.op) {
            (
                Token::Operator | Token::Star,
                Some(
                    op @ (Operator::Mul
                    | Operator::Add
                    | Operator::Sub
                    | Operator::Not
                    | Operator::Xor
                    | Operator::Tilde),
                ),
            ) => {
                let pos = self.pos();
                self.next();
                let x = self.unary(stop_at_hash);
                Operation::unary(pos, op, x).into()
            }
            (Token::Operator, Some(Operator::And)) => {
                let pos = self.pos();
                self.next();
                // a parenthesized composite literal loses its parentheses
                let x = unparen(self.unary(stop_at_hash));
                Operation::unary(pos, Operator::And, x).into()
            }
            (Token::Arrow, _) => {
                // receive op (<-x) or receive-only channel (<-chan E)
                let pos = self.pos();
                self.next();
                let mut x = self.unary(stop_at_hash);
                if matches!(x, Expr::ChanType(_)) {
                    // <-(chan E)  =>  (<-chan E)
                    // <-(chan<-E) =>  (<-chan (<-E))
                    self.recv_chan(&mut x);
                    return x;
                }
                Operation::unary(pos, Operator::Recv, x).into()
            }
            _ => self.primary_expr(None, true, stop_at_hash),
        }
    }

    /// Re-associates a leading `<-` with the channel type `x`.
    fn recv_chan(&mut self, x: &mut Expr) {
        let mut dir = ChanDir::SendOnly;
        let mut t = x;
        while dir == ChanDir::SendOnly {
            match t {
                Expr::ChanType(c) => {
                    dir = c.dir;
                    if dir == ChanDir::RecvOnly {
                        // <-<-chan E is not permitted
                        self.syntax_error("unexpected <-, expected chan");
                    }
                    c.dir = ChanDir::RecvOnly;
                    t = &mut *c.elem;
                }
                other => {
                    // <-chan<-E where E is not a channel
                    let msg = format!("unexpected {other}, expected chan");
                    self.syntax_error(&msg);
                    return;
                }
            }
        }
    }

    /// Operand = Literal | OperandName | "(" Expression ")" | sugared literal .
    fn operand(&mut self, keep_parens: bool) -> Expr {
        match self.tok {
            Token::Name => self.name().into(),
            Token::Literal => match self.oliteral() {
                Some(lit) => lit.into(),
                None => self.bad_expr(),
            },
            Token::Lparen => {
                let pos = self.pos();
                self.next();
                self.xnest += 1;
                let x = self.expr();
                self.xnest -= 1;
                self.want(Token::Rparen);
                // Parentheses are kept where they matter for error reporting: around a
                // possible composite literal type and in go/defer statements.
                if keep_parens || self.tok == Token::Lbrace {
                    ParenExpr::new(pos, x).into()
                } else {
                    x
                }
            }
            Token::Func => {
                let pos = self.pos();
                self.next();
                let (_, ftyp) = self.func_type("function type");
                if self.tok == Token::Lbrace {
                    self.xnest += 1;
                    let body = self.func_body();
                    self.xnest -= 1;
                    return FuncLit::new(pos, ftyp, body).into();
                }
                ftyp.into()
            }
            Token::Lbrace => {
                let pos = self.pos();
                self.map_lit(pos)
            }
            Token::Lbrack => self.bracket_operand(),
            Token::Map => self.map_operand(),
            Token::Chan | Token::Struct | Token::Interface => self.type_(),
            _ => {
                let x = self.bad_expr();
                self.syntax_error("expected expression");
                self.advance(&[Token::Rparen, Token::Rbrack, Token::Rbrace]);
                x
            }
        }
    }

    /// PrimaryExpr = Operand | PrimaryExpr ( Selector | Index | Slice | TypeAssertion |
    ///               Arguments | "#" UnaryExpr ) .
    pub(super) fn pexpr(&mut self, x: Option<Expr>, keep_parens: bool) -> Expr {
        self.primary_expr(x, keep_parens, false)
    }

    fn primary_expr(&mut self, x: Option<Expr>, keep_parens: bool, stop_at_hash: bool) -> Expr {
        let mut x = match x {
            Some(x) => x,
            None => self.operand(keep_parens),
        };

        loop {
            let pos = self.pos();
            match self.tok {
                Token::Dot => {
                    self.next();
                    match self.tok {
                        Token::Name => {
                            let sel = self.name();
                            x = SelectorExpr::new(pos, x, sel).into();
                        }
                        Token::Lparen => {
                            self.next();
                            if self.got(Token::Type) {
                                // the lhs is filled in by simple_stmt
                                x = TypeSwitchGuard::new(pos, None, x).into();
                            } else {
                                let ty = self.type_();
                                x = AssertExpr::new(pos, x, ty).into();
                            }
                            self.want(Token::Rparen);
                        }
                        _ => {
                            self.syntax_error("expected name or (");
                            self.advance(&[Token::Semi, Token::Rparen]);
                        }
                    }
                }
                Token::Lbrack => {
                    self.next();
                    let mut i = None;
                    if self.tok != Token::Colon {
                        let (index, comma) = if self.tok == Token::Rbrack {
                            // x[] is accepted with a complaint
                            self.syntax_error("expected operand");
                            (self.bad_expr(), false)
                        } else {
                            self.type_list(false)
                        };
                        if comma || self.tok == Token::Rbrack {
                            self.want(Token::Rbrack);
                            // x[], x[i,] or x[i, j, ...]
                            x = IndexExpr::new(pos, x, index).into();
                            continue;
                        }
                        i = Some(index);
                    }

                    // x[i:...
                    if !self.got(Token::Colon) {
                        self.syntax_error("expected comma, : or ]");
                        self.advance(&[Token::Comma, Token::Colon, Token::Rbrack]);
                    }
                    self.xnest += 1;
                    let mut j = None;
                    let mut k = None;
                    let mut full = false;
                    if self.tok != Token::Colon && self.tok != Token::Rbrack {
                        // x[i:j...
                        j = Some(self.expr());
                    }
                    if self.tok == Token::Colon {
                        full = true;
                        // x[i:j:...]
                        if j.is_none() {
                            self.error("middle index required in 3-index slice");
                        }
                        self.next();
                        if self.tok != Token::Rbrack {
                            k = Some(self.expr());
                        } else {
                            self.error("final index required in 3-index slice");
                        }
                    }
                    self.xnest -= 1;
                    self.want(Token::Rbrack);
                    x = SliceExpr::new(pos, x, [i, j, k], full).into();
                }
                Token::Lparen => {
                    self.next();
                    let (args, has_dots) = self.arg_list();
                    x = CallExpr::new(pos, x, args, has_dots).into();
                }
                Token::Hash if !stop_at_hash => {
                    x = self.one_indexed(x);
                }
                Token::Lbrace => {
                    // determine if '{' belongs to a composite literal or a block statement
                    let t = x.unparen();
                    let complit_ok = match t {
                        Expr::Name(_) | Expr::Selector(_) => self.xnest >= 0,
                        Expr::Index(_) => self.xnest >= 0 && !is_value(t),
                        Expr::ArrayType(_)
                        | Expr::SliceType(_)
                        | Expr::StructType(_)
                        | Expr::MapType(_) => true,
                        _ => false,
                    };
                    if !complit_ok {
                        break;
                    }
                    if matches!(x, Expr::Paren(_)) {
                        self.syntax_error("cannot parenthesize type in composite literal");
                    }
                    let mut lit = self.complitexpr();
                    lit.ty = Some(Box::new(x));
                    x = lit.into();
                }
                _ => break,
            }
        }
        x
    }

    /// Element = Expression | LiteralValue .
    pub(super) fn bare_complitexpr(&mut self) -> Expr {
        if self.tok == Token::Lbrace {
            // '{' start_complit braced_keyval_list '}'
            return self.complitexpr().into();
        }
        self.expr()
    }

    /// LiteralValue = "{" [ ElementList [ "," ] ] "}" .
    pub(super) fn complitexpr(&mut self) -> CompositeLit {
        let pos = self.pos();
        self.xnest += 1;
        self.want(Token::Lbrace);
        let mut elems = vec![];
        let rbrace = self.list("composite literal", Token::Comma, Token::Rbrace, |p| {
            let e = p.bare_complitexpr();
            if p.tok == Token::Colon {
                // key ':' value
                let pos = p.pos();
                p.next();
                let value = p.bare_complitexpr();
                elems.push(KeyValueExpr::new(pos, e, value).into());
            } else {
                elems.push(e);
            }
            false
        });
        self.xnest -= 1;
        CompositeLit::new(pos, None, elems, rbrace)
    }

    pub(super) fn expr_list(&mut self) -> Expr {
        let x = self.expr();
        if !self.got(Token::Comma) {
            return x;
        }
        let pos = x.pos();
        let mut list = vec![x, self.expr()];
        while self.got(Token::Comma) {
            list.push(self.expr());
        }
        ListExpr::new(pos, list).into()
    }

    /// Parses `arg { "," arg } [ "," ]`, where every argument is a type if `strict` is set
    /// and the first may be any expression otherwise. Also returns whether there was a comma.
    pub(super) fn type_list(&mut self, strict: bool) -> (Expr, bool) {
        self.xnest += 1;
        let mut x = if strict { self.type_() } else { self.expr() };
        let mut comma = false;
        if self.got(Token::Comma) {
            comma = true;
            if let Some(t) = self.type_or_nil() {
                let pos = x.pos();
                let mut list = vec![x, t];
                while self.got(Token::Comma) {
                    match self.type_or_nil() {
                        Some(t) => list.push(t),
                        None => break,
                    }
                }
                x = ListExpr::new(pos, list).into();
            }
        }
        self.xnest -= 1;
        (x, comma)
    }

    /// Parses a possibly empty argument list closed by `)`. Also returns whether the last
    /// argument was followed by `...`.
    pub(super) fn arg_list(&mut self) -> (Vec<Expr>, bool) {
        self.xnest += 1;
        let mut args = vec![];
        let mut has_dots = false;
        self.list("argument list", Token::Comma, Token::Rparen, |p| {
            args.push(p.expr());
            has_dots = p.got(Token::DotDotDot);
            has_dots
        });
        self.xnest -= 1;
        (args, has_dots)
    }
}

pub(super) fn unparen(mut x: Expr) -> Expr {
    while let Expr::Paren(p) = x {
        x = *p.x;
    }
    x
}

/// Whether `x` must be a value and cannot be a type
fn is_value(x: &Expr) -> bool {
    match x {
        Expr::BasicLit(_)
        | Expr::CompositeLit(_)
        | Expr::FuncLit(_)
        | Expr::Slice(_)
        | Expr::Assert(_)
        | Expr::TypeSwitchGuard(_)
        | Expr::Call(_) => true,
        // *T may be a type
        Expr::Operation(op) => op.op != Operator::Mul || op.y.is_some(),
        Expr::Paren(p) => is_value(&p.x),
        Expr::Index(i) => is_value(&i.x) || is_value(&i.index),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::tests_support::{parse_errors, parse_expr};
    use sugo_ast::expr::{ChanDir, Expr};
    use sugo_tokens::token::Operator;
    use test_log::test;

    #[test]
    fn test_precedence() {
        assert_eq!(parse_expr("a + b * c").to_string(), "a + b * c");
        assert_eq!(parse_expr("(a + b) * c").to_string(), "(a + b) * c");
        assert_eq!(parse_expr("a || b && c == d").to_string(), "a || b && c == d");
        match parse_expr("a - b - c") {
            Expr::Operation(op) => assert_eq!(op.x.to_string(), "a - b"),
            other => panic!("expected an operation, got {other}"),
        }
    }

    #[test]
    fn test_receive_or_channel_type() {
        match parse_expr("<-chan int") {
            Expr::ChanType(c) => assert_eq!(c.dir, ChanDir::RecvOnly),
            other => panic!("expected a channel type, got {other}"),
        }
        // only known to be a receive once the conversion is seen
        match parse_expr("<-chan int(ch)") {
            Expr::Operation(op) => {
                assert_eq!(op.op, Operator::Recv);
                assert!(matches!(*op.x, Expr::Call(_)));
            }
            other => panic!("expected a receive, got {other}"),
        }
    }

    #[test]
    fn test_nested_receive_channel() {
        let src = "package p\ntype T = <-chan chan<- int\n";
        let file = crate::parser::tests_support::parse_ok(src);
        let Some(sugo_ast::decl::Decl::Type(decl)) = file.decls.first() else {
            panic!("expected a type declaration");
        };
        let Expr::ChanType(outer) = &decl.ty else {
            panic!("expected a channel type");
        };
        assert_eq!(outer.dir, ChanDir::RecvOnly);
    }

    #[test]
    fn test_receive_of_non_channel() {
        let errors = parse_errors("package p\nvar x = <-chan<- y\n");
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(
            errors[0].ends_with("syntax error: unexpected y, expected chan"),
            "{errors:?}"
        );
    }

    #[test]
    fn test_composite_literals() {
        assert_eq!(
            parse_expr("[]int{1, 2, 3}").to_string(),
            "[]int{1, 2, 3}"
        );
        assert_eq!(parse_expr("T{a: 1}").to_string(), "T{a: 1}");
        assert_eq!(parse_expr("pkg.T{}").to_string(), "pkg.T{}");
    }

    #[test]
    fn test_composite_literal_not_in_header() {
        let errors = parse_errors("package p\nfunc f() {\n\tif x == T {\n\t}\n}\n");
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn test_slices() {
        assert_eq!(parse_expr("a[1:2]").to_string(), "a[1:2]");
        assert_eq!(parse_expr("a[:]").to_string(), "a[:]");
        assert_eq!(parse_expr("a[i:j:k]").to_string(), "a[i:j:k]");
        let errors = parse_errors("package p\nvar x = a[i::k]\n");
        assert_eq!(
            errors,
            ["test.sugo:2:13: middle index required in 3-index slice"]
        );
    }

    #[test]
    fn test_parenthesized_composite_literal_type() {
        let errors = parse_errors("package p\nvar x = (T){}\n");
        assert_eq!(
            errors,
            ["test.sugo:2:12: syntax error: cannot parenthesize type in composite literal"]
        );
    }
}
