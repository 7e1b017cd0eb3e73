//! Statements

use super::error::ErrorKind;
use super::expr::unparen;
use super::{Handler, Parser};
use std::sync::Arc;
use sugo_ast::decl::{Decl, Group};
use sugo_ast::expr::{BadExpr, Expr, Name};
use sugo_ast::stmt::{
    AssignOp, AssignStmt, BlockStmt, BranchStmt, CallStmt, CaseClause, CommClause, DeclStmt,
    EmptyStmt, ExprStmt, ForStmt, IfStmt, LabeledStmt, RangeClause, ReturnStmt, SelectStmt,
    SendStmt, Stmt, SwitchStmt,
};
use sugo_tokens::pos::{Pos, Positioned};
use sugo_tokens::token::{Operator, Token};

impl<H: Handler + ?Sized> Parser<'_, H> {
    pub(super) fn func_body(&mut self) -> BlockStmt {
        self.fnest += 1;
        let errcnt = self.errcnt;
        let body = self.block_stmt("");
        self.fnest -= 1;

        // incomplete trees lead to spurious branch errors
        if self.mode.check_branches && errcnt == self.errcnt {
            self.check_branches(&body);
        }
        body
    }

    /// SimpleStmt = EmptyStmt | ExpressionStmt | SendStmt | IncDecStmt | Assignment |
    ///              ShortVarDecl .
    ///
    /// `lhs` is the already parsed left hand side, if any. `keyword` is the statement whose
    /// header is being parsed, which decides whether a range clause or a type switch guard is
    /// permitted.
    pub(super) fn simple_stmt(&mut self, lhs: Option<Expr>, keyword: Option<Token>) -> Stmt {
        if keyword == Some(Token::For) && self.tok == Token::Range {
            // _Range expr
            return self.new_range_clause(None, false);
        }

        let lhs = match lhs {
            Some(lhs) => lhs,
            None => self.expr_list(),
        };

        if !matches!(lhs, Expr::List(_)) && self.tok != Token::Assign && self.tok != Token::Define
        {
            let pos = self.pos();
            return match (self.tok, self.op) {
                (Token::AssignOp, Some(op)) => {
                    // lhs op= rhs
                    self.next();
                    let rhs = self.expr();
                    AssignStmt::new(pos, AssignOp::Op(op), lhs, Some(rhs)).into()
                }
                (Token::IncOp, Some(op)) => {
                    // lhs++ or lhs--
                    self.next();
                    AssignStmt::new(pos, AssignOp::Op(op), lhs, None).into()
                }
                (Token::Arrow, _) => {
                    // lhs <- rhs
                    self.next();
                    let value = self.expr();
                    SendStmt::new(pos, lhs, value).into()
                }
                _ => ExprStmt::new(lhs.pos(), lhs).into(),
            };
        }

        match self.tok {
            Token::Assign | Token::Define => {
                let pos = self.pos();
                let op = if self.tok == Token::Define {
                    AssignOp::Define
                } else {
                    AssignOp::Assign
                };
                self.next();

                if keyword == Some(Token::For) && self.tok == Token::Range {
                    // expr_list op= _Range expr
                    return self.new_range_clause(Some(lhs), op == AssignOp::Define);
                }

                // expr_list op= expr_list
                let mut rhs = self.expr_list();

                if keyword == Some(Token::Switch) && op == AssignOp::Define {
                    if let (Expr::TypeSwitchGuard(guard), Expr::Name(name)) = (&mut rhs, &lhs) {
                        // switch … lhs := rhs.(type)
                        guard.lhs = Some(name.clone());
                        let pos = guard.pos();
                        return ExprStmt::new(pos, rhs).into();
                    }
                }

                AssignStmt::new(pos, op, lhs, Some(rhs)).into()
            }
            _ => {
                self.syntax_error("expected := or = or comma");
                self.advance(&[Token::Semi, Token::Rbrace]);
                // make the best of what we have
                let x = match lhs {
                    Expr::List(list) if !list.elems.is_empty() => {
                        list.elems.into_iter().next().unwrap_or_else(|| self.bad_expr())
                    }
                    lhs => lhs,
                };
                ExprStmt::new(x.pos(), x).into()
            }
        }
    }

    fn new_range_clause(&mut self, lhs: Option<Expr>, def: bool) -> Stmt {
        let pos = self.pos();
        // range
        self.next();
        let x = self.expr();
        RangeClause::new(pos, lhs, def, x).into()
    }

    pub(super) fn block_stmt(&mut self, context: &str) -> BlockStmt {
        let pos = self.pos();

        // braces are mandatory
        if !self.got(Token::Lbrace) {
            self.syntax_error(&format!("expected {{ after {context}"));
            self.advance(&[Token::Name, Token::Rbrace]);
            let rbrace = self.pos();
            if self.got(Token::Rbrace) {
                return BlockStmt::new(pos, vec![], rbrace);
            }
        }

        let stmts = self.stmt_list();
        let rbrace = self.pos();
        self.want(Token::Rbrace);
        BlockStmt::new(pos, stmts, rbrace)
    }

    fn decl_stmt(&mut self, f: impl FnMut(&mut Self, Option<Arc<Group>>) -> Decl) -> Stmt {
        let pos = self.pos();
        // const, type or var
        self.next();
        let mut decls = vec![];
        self.append_group(&mut decls, f);
        DeclStmt::new(pos, decls).into()
    }

    fn for_stmt(&mut self) -> Stmt {
        let pos = self.pos();
        let (init, cond, post) = self.header(Token::For);
        let body = self.block_stmt("for clause");
        ForStmt::new(pos, init, cond, post, body).into()
    }

    /// Parses the header of an `if`, `for` or `switch` statement, including the keyword.
    fn header(&mut self, keyword: Token) -> (Option<Stmt>, Option<Expr>, Option<Stmt>) {
        self.want(keyword);

        if self.tok == Token::Lbrace {
            let mut cond = None;
            if keyword == Token::If {
                self.syntax_error("missing condition in if statement");
                cond = Some(self.bad_expr());
            }
            return (None, cond, None);
        }

        let outer = self.xnest;
        self.xnest = -1;

        let mut init = None;
        if self.tok != Token::Semi {
            // accept potential var declaration but complain
            if self.got(Token::Var) {
                self.syntax_error(&format!(
                    "var declaration not allowed in {keyword} initializer"
                ));
            }
            let stmt = self.simple_stmt(None, Some(keyword));
            if matches!(stmt, Stmt::Range(_)) {
                // only possible for keyword == for
                self.xnest = outer;
                return (Some(stmt), None, None);
            }
            init = Some(stmt);
        }

        let mut cond_stmt = None;
        let mut post = None;
        let mut semi: Option<(Pos, String)> = None;
        if self.tok != Token::Lbrace {
            if self.tok == Token::Semi {
                semi = Some((self.pos(), self.lit.clone()));
                self.next();
            } else {
                self.want(Token::Lbrace);
                if self.tok != Token::Lbrace {
                    self.advance(&[Token::Lbrace, Token::Rbrace]);
                }
            }
            if keyword == Token::For {
                'done: {
                    if self.tok != Token::Semi {
                        if self.tok == Token::Lbrace {
                            self.syntax_error("expected for loop condition");
                            break 'done;
                        }
                        // range not permitted
                        cond_stmt = Some(self.simple_stmt(None, None));
                    }
                    self.want(Token::Semi);
                    if self.tok != Token::Lbrace {
                        let stmt = self.simple_stmt(None, None);
                        if let Stmt::Assign(assign) = &stmt {
                            if assign.op == AssignOp::Define {
                                self.syntax_error_at(
                                    assign.pos(),
                                    "cannot declare in post statement of for loop",
                                );
                            }
                        }
                        post = Some(stmt);
                    }
                }
            } else if self.tok != Token::Lbrace {
                cond_stmt = Some(self.simple_stmt(None, Some(keyword)));
            }
        } else {
            cond_stmt = init.take();
        }

        let cond = match cond_stmt {
            None => match semi {
                Some((pos, lit)) if keyword == Token::If => {
                    if lit == "semicolon" {
                        self.syntax_error_at(pos.clone(), "missing condition in if statement");
                    } else {
                        self.error_at(
                            pos.clone(),
                            ErrorKind::Invalid(
                                "unexpected newline, expected { after if clause".to_string(),
                            ),
                        );
                    }
                    Some(BadExpr::new(pos).into())
                }
                _ => None,
            },
            Some(Stmt::Expr(s)) => Some(s.x),
            Some(s) => {
                // "if x := 0 {" instead of "if x := 0; x == 0 {"
                let text = match &s {
                    Stmt::Assign(assign) if assign.op == AssignOp::Assign => format!(
                        "assignment {} = {}",
                        emphasize(&assign.lhs),
                        assign.rhs.as_ref().map(emphasize).unwrap_or_default()
                    ),
                    s => s.to_string(),
                };
                self.syntax_error_at(s.pos(), &format!("cannot use {text} as value"));
                None
            }
        };

        self.xnest = outer;
        (init, cond, post)
    }

    fn if_stmt(&mut self) -> IfStmt {
        let pos = self.pos();
        let (init, cond, _) = self.header(Token::If);
        let cond = cond.unwrap_or_else(|| BadExpr::new(pos.clone()).into());
        let then = self.block_stmt("if clause");

        let mut els = None;
        if self.got(Token::Else) {
            match self.tok {
                Token::If => els = Some(self.if_stmt().into()),
                Token::Lbrace => els = Some(self.block_stmt("").into()),
                _ => {
                    self.syntax_error("else must be followed by if or statement block");
                    self.advance(&[Token::Name, Token::Rbrace]);
                }
            }
        }
        IfStmt::new(pos, init, cond, then, els)
    }

    fn switch_stmt(&mut self) -> Stmt {
        let pos = self.pos();
        let (init, tag, _) = self.header(Token::Switch);

        if !self.got(Token::Lbrace) {
            self.syntax_error("missing { after switch clause");
            self.advance(&[Token::Case, Token::Default, Token::Rbrace]);
        }
        let mut body = vec![];
        while self.tok != Token::Eof && self.tok != Token::Rbrace {
            body.push(self.case_clause());
        }
        let rbrace = self.pos();
        self.want(Token::Rbrace);
        SwitchStmt::new(pos, init, tag, body, rbrace).into()
    }

    fn select_stmt(&mut self) -> Stmt {
        let pos = self.pos();
        self.want(Token::Select);
        if !self.got(Token::Lbrace) {
            self.syntax_error("missing { after select clause");
            self.advance(&[Token::Case, Token::Default, Token::Rbrace]);
        }
        let mut body = vec![];
        while self.tok != Token::Eof && self.tok != Token::Rbrace {
            body.push(self.comm_clause());
        }
        let rbrace = self.pos();
        self.want(Token::Rbrace);
        SelectStmt::new(pos, body, rbrace).into()
    }

    fn case_clause(&mut self) -> CaseClause {
        let pos = self.pos();
        let mut cases = None;
        match self.tok {
            Token::Case => {
                self.next();
                cases = Some(self.expr_list());
            }
            Token::Default => self.next(),
            _ => {
                self.syntax_error("expected case or default or }");
                self.advance(&[Token::Colon, Token::Case, Token::Default, Token::Rbrace]);
            }
        }
        let colon = self.pos();
        self.want(Token::Colon);
        let body = self.stmt_list();
        CaseClause::new(pos, cases, body, colon)
    }

    fn comm_clause(&mut self) -> CommClause {
        let pos = self.pos();
        let mut comm = None;
        match self.tok {
            Token::Case => {
                self.next();
                // Only sends, receives and receive assignments are valid here. Anything else
                // is left for later stages to reject.
                comm = Some(self.simple_stmt(None, None));
            }
            Token::Default => self.next(),
            _ => {
                self.syntax_error("expected case or default or }");
                self.advance(&[Token::Colon, Token::Case, Token::Default, Token::Rbrace]);
            }
        }
        let colon = self.pos();
        self.want(Token::Colon);
        let body = self.stmt_list();
        CommClause::new(pos, comm, body, colon)
    }

    fn labeled_stmt_or_nil(&mut self, label: Arc<Name>) -> Option<Stmt> {
        let pos = self.pos();
        self.want(Token::Colon);

        if self.tok == Token::Rbrace {
            // the semicolon after the labeled statement may be omitted before "}"
            let empty = EmptyStmt::new(self.pos());
            return Some(LabeledStmt::new(pos, label, empty.into()).into());
        }

        match self.stmt_or_nil() {
            Some(stmt) => Some(LabeledStmt::new(pos, label, stmt).into()),
            None => {
                // reported at the ':', there is nothing to skip
                self.syntax_error_at(pos, "missing statement after label");
                None
            }
        }
    }

    /// Parses a statement, or returns `None` if the current token cannot start one.
    pub(super) fn stmt_or_nil(&mut self) -> Option<Stmt> {
        // most statements start with a name
        if self.tok == Token::Name {
            self.clear_pragma();
            let lhs = self.expr_list();
            if let Expr::Name(label) = &lhs {
                if self.tok == Token::Colon {
                    let label = label.clone();
                    return self.labeled_stmt_or_nil(label);
                }
            }
            return Some(self.simple_stmt(Some(lhs), None));
        }

        match self.tok {
            Token::Var => return Some(self.decl_stmt(Self::var_decl)),
            Token::Const => return Some(self.decl_stmt(Self::const_decl)),
            Token::Type => return Some(self.decl_stmt(Self::type_decl)),
            _ => {}
        }

        self.clear_pragma();

        let stmt = match self.tok {
            Token::Lbrace => self.block_stmt("").into(),
            Token::Operator | Token::Star => match self.op {
                Some(
                    Operator::Add
                    | Operator::Sub
                    | Operator::Mul
                    | Operator::And
                    | Operator::Xor
                    | Operator::Not,
                ) => self.simple_stmt(None, None),
                _ => return None,
            },
            // operands, composite types and the receive operator
            Token::Literal
            | Token::Func
            | Token::Lparen
            | Token::Lbrack
            | Token::Struct
            | Token::Map
            | Token::Chan
            | Token::Interface
            | Token::Arrow => self.simple_stmt(None, None),
            Token::For => self.for_stmt(),
            Token::Switch => self.switch_stmt(),
            Token::Select => self.select_stmt(),
            Token::If => self.if_stmt().into(),
            Token::Fallthrough => {
                let pos = self.pos();
                self.next();
                BranchStmt::new(pos, Token::Fallthrough, None).into()
            }
            Token::Break | Token::Continue => {
                let pos = self.pos();
                let tok = self.tok;
                self.next();
                let label = (self.tok == Token::Name).then(|| self.name());
                BranchStmt::new(pos, tok, label).into()
            }
            Token::Go | Token::Defer => self.call_stmt(),
            Token::Goto => {
                let pos = self.pos();
                self.next();
                let label = self.name();
                BranchStmt::new(pos, Token::Goto, Some(label)).into()
            }
            Token::Return => {
                let pos = self.pos();
                self.next();
                let results = (self.tok != Token::Semi && self.tok != Token::Rbrace)
                    .then(|| self.expr_list());
                ReturnStmt::new(pos, results).into()
            }
            Token::Semi => EmptyStmt::new(self.pos()).into(),
            _ => return None,
        };
        Some(stmt)
    }

    /// StatementList = { Statement ";" } .
    pub(super) fn stmt_list(&mut self) -> Vec<Stmt> {
        let mut list = vec![];
        while !matches!(
            self.tok,
            Token::Eof | Token::Rbrace | Token::Case | Token::Default
        ) {
            let stmt = self.stmt_or_nil();
            self.clear_pragma();
            let Some(stmt) = stmt else {
                break;
            };
            list.push(stmt);
            // ";" is optional before "}"
            if !self.got(Token::Semi) && self.tok != Token::Rbrace {
                self.syntax_error("at end of statement");
                self.advance(&[Token::Semi, Token::Rbrace, Token::Case, Token::Default]);
                // avoid a spurious empty statement
                self.got(Token::Semi);
            }
        }
        list
    }

    /// `go` or `defer` followed by a call
    fn call_stmt(&mut self) -> Stmt {
        let pos = self.pos();
        let tok = self.tok;
        self.next();

        // parentheses are kept so they can be reported
        let mut x = self.pexpr(None, self.tok == Token::Lparen);
        if matches!(x, Expr::Paren(_)) {
            self.error_at(
                x.pos(),
                ErrorKind::Invalid(format!("expression in {tok} must not be parenthesized")),
            );
            x = unparen(x);
        }
        if !matches!(x, Expr::Call(_)) {
            self.error_at(
                x.pos(),
                ErrorKind::Invalid(format!("expression in {tok} must be function call")),
            );
        }
        CallStmt::new(pos, tok, x).into()
    }
}

/// Renders `x`, parenthesized if it is a binary expression
fn emphasize(x: &Expr) -> String {
    match x {
        Expr::Operation(op) if op.y.is_some() => format!("({x})"),
        _ => x.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::tests_support::{parse_errors, parse_ok};
    use sugo_ast::stmt::{AssignOp, Stmt};
    use test_log::test;

    fn body(src: &str) -> Vec<Stmt> {
        let file = parse_ok(&format!("package p\nfunc f() {{\n{src}\n}}\n"));
        let f = file.funcs().next().expect("no function");
        f.body.clone().expect("no body").stmts
    }

    #[test]
    fn test_simple_statements() {
        let stmts = body("\tx := 1\n\tx += 2\n\tx++\n\tch <- x\n\tf(x)");
        assert!(matches!(&stmts[0], Stmt::Assign(a) if a.op == AssignOp::Define));
        assert!(matches!(&stmts[1], Stmt::Assign(a) if a.rhs.is_some()));
        assert!(matches!(&stmts[2], Stmt::Assign(a) if a.rhs.is_none()));
        assert!(matches!(&stmts[3], Stmt::Send(_)));
        assert!(matches!(&stmts[4], Stmt::Expr(_)));
    }

    #[test]
    fn test_for_headers() {
        let stmts = body("\tfor i := 0; i < 10; i++ {\n\t}\n\tfor k, v := range m {\n\t}\n\tfor {\n\t}");
        let Stmt::For(three) = &stmts[0] else {
            panic!("expected a for statement");
        };
        assert!(three.init.is_some() && three.cond.is_some() && three.post.is_some());
        let Stmt::For(range) = &stmts[1] else {
            panic!("expected a for statement");
        };
        assert!(matches!(range.init.as_deref(), Some(Stmt::Range(r)) if r.def));
        let Stmt::For(forever) = &stmts[2] else {
            panic!("expected a for statement");
        };
        assert!(forever.init.is_none() && forever.cond.is_none());
    }

    #[test]
    fn test_type_switch_guard() {
        let stmts = body("\tswitch v := x.(type) {\n\tcase int:\n\t\t_ = v\n\tdefault:\n\t}");
        let Stmt::Switch(switch) = &stmts[0] else {
            panic!("expected a switch statement");
        };
        assert_eq!(switch.body.len(), 2);
        let Some(sugo_ast::expr::Expr::TypeSwitchGuard(guard)) = &switch.tag else {
            panic!("expected a type switch guard");
        };
        assert_eq!(guard.lhs.as_ref().map(|n| n.value()), Some("v"));
    }

    #[test]
    fn test_if_header_errors() {
        assert_eq!(
            parse_errors("package p\nfunc f() {\n\tif x := 0 {\n\t}\n}\n"),
            ["test.sugo:3:7: syntax error: cannot use x := 0 as value"]
        );
        assert_eq!(
            parse_errors("package p\nfunc f() {\n\tif x = a + b {\n\t}\n}\n"),
            ["test.sugo:3:7: syntax error: cannot use assignment x = (a + b) as value"]
        );
        assert_eq!(
            parse_errors("package p\nfunc f() {\n\tif {\n\t}\n}\n"),
            ["test.sugo:3:5: syntax error: missing condition in if statement"]
        );
    }

    #[test]
    fn test_for_post_declaration() {
        assert_eq!(
            parse_errors("package p\nfunc f() {\n\tfor i := 0; i < 3; j := 1 {\n\t}\n}\n"),
            ["test.sugo:3:23: syntax error: cannot declare in post statement of for loop"]
        );
    }

    #[test]
    fn test_go_requires_call() {
        assert_eq!(
            parse_errors("package p\nfunc f() {\n\tgo (g())\n\tdefer x\n}\n"),
            [
                "test.sugo:3:5: expression in go must not be parenthesized",
                "test.sugo:4:8: expression in defer must be function call",
            ]
        );
    }

    #[test]
    fn test_missing_statement_after_label() {
        assert_eq!(
            parse_errors("package p\nfunc f() {\nL:\n}\n"),
            Vec::<String>::new()
        );
        let stmts = body("L:\n\tfor {\n\t\tbreak L\n\t}");
        assert!(matches!(&stmts[0], Stmt::Labeled(l) if l.label.value() == "L"));
    }
}
