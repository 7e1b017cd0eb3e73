//! Recursive descent parser for sugo source files.
//!
//! The parser follows the grammar of Go and lowers every sugared construct into plain syntax
//! tree shapes as soon as it is recognized, so the [File] it produces never contains anything
//! a Go front end would not.

use crate::lexer::{Lexeme, ScanEvent, Scanner};
use crate::parser::error::{ErrorKind, ParseFailure, SyntaxError};
use std::mem;
use std::sync::Arc;
use sugo_ast::decl::Pragma;
use sugo_ast::expr::{BadExpr, BasicLit, Expr, Name};
use sugo_ast::stmt::Stmt;
use sugo_ast::File;
use sugo_tokens::pos::{Pos, PosBase, Positioned, POS_MAX};
use sugo_tokens::token::{LitKind, Operator, Prec, Token, TokenSet};
use tracing::{debug, trace};

mod branches;
mod decl;
pub mod error;
mod expr;
mod stmt;
mod sugar;
mod types;

/// Receives the diagnostics and directives found while parsing
pub trait Handler {
    /// Called for every error, in source order
    fn on_error(&mut self, error: &SyntaxError);

    /// Called for every `//go:` directive with the position of `go:`. The directive is attached
    /// to the next declaration if this returns `true`.
    fn on_pragma(&mut self, _pos: &Pos, _text: &str) -> bool {
        true
    }

    /// Called whenever a line directive changes the base of subsequent positions
    fn on_line_directive(&mut self, _base: &Arc<PosBase>) {}
}

impl Handler for Vec<SyntaxError> {
    fn on_error(&mut self, error: &SyntaxError) {
        self.push(error.clone());
    }
}

/// Optional checks performed while parsing
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Mode {
    /// Report misplaced branch statements and undefined or unused labels
    pub check_branches: bool,
    /// Panic if the parser builds an inconsistent tree
    pub check_invariants: bool,
}

impl Mode {
    pub const STRICT: Mode = Mode {
        check_branches: true,
        check_invariants: true,
    };
}

/// Statement keywords `advance` stops at inside function bodies
const STOPSET: TokenSet = TokenSet::of(&[
    Token::Break,
    Token::Const,
    Token::Continue,
    Token::Defer,
    Token::Fallthrough,
    Token::For,
    Token::Go,
    Token::Goto,
    Token::If,
    Token::Return,
    Token::Select,
    Token::Switch,
    Token::Type,
    Token::Var,
]);

/// Parses a single file.
pub struct Parser<'h, H: Handler + ?Sized> {
    scanner: Scanner,
    handler: &'h mut H,
    mode: Mode,

    file_base: Arc<PosBase>,
    /// The base of the current token, changed by line directives
    base: Arc<PosBase>,
    first: Option<SyntaxError>,
    errcnt: usize,
    /// `//go:` directives waiting for the next declaration
    pragmas: Vec<Pragma>,
    /// Function nesting level, for error recovery
    fnest: i32,
    /// Expression nesting level. Negative inside control clause headers, where `{` cannot start
    /// a composite literal.
    xnest: i32,
    /// Statements found outside of any function
    top_level: Vec<Stmt>,
    top_level_errors: bool,

    // current token
    line: u32,
    col: u32,
    tok: Token,
    lit: String,
    kind: LitKind,
    bad: bool,
    op: Option<Operator>,
    prec: Prec,
}

impl<'h, H: Handler + ?Sized> Parser<'h, H> {
    pub fn new(filename: &str, src: &[u8], handler: &'h mut H, mode: Mode) -> Self {
        let file_base = PosBase::file(filename);
        let mut parser = Self {
            scanner: Scanner::new(src),
            handler,
            mode,
            base: file_base.clone(),
            file_base,
            first: None,
            errcnt: 0,
            pragmas: vec![],
            fnest: 0,
            xnest: 0,
            top_level: vec![],
            top_level_errors: false,
            line: 1,
            col: 1,
            tok: Token::Eof,
            lit: String::new(),
            kind: LitKind::default(),
            bad: false,
            op: None,
            prec: Prec::None,
        };
        parser.next();
        parser
    }

    /// Parses the whole file. If any error was reported the partially parsed file is returned
    /// along with the first error.
    pub fn parse(mut self) -> Result<File, ParseFailure> {
        let file = self.file();
        debug!(
            "parsed {} with {} declarations and {} errors",
            self.file_base.filename(),
            file.decls.len(),
            self.errcnt
        );
        match self.first.take() {
            None => Ok(file),
            Some(first) => Err(ParseFailure {
                partial: file,
                first,
                count: self.errcnt,
            }),
        }
    }

    // ---------------------------------------------------------------------------------------
    // tokens

    fn next(&mut self) {
        let lexeme = self.scanner.next_lexeme();
        for event in self.scanner.take_events() {
            match event {
                ScanEvent::Error { line, col, msg } => {
                    let pos = self.pos_at(line, col);
                    self.error_at(pos, ErrorKind::Lex(msg));
                }
                ScanEvent::Directive { line, col, text } => self.directive(line, col, &text),
            }
        }
        let Lexeme {
            line,
            col,
            tok,
            lit,
            kind,
            bad,
            op,
            prec,
        } = lexeme;
        self.line = line;
        self.col = col;
        self.tok = tok;
        self.lit = lit;
        self.kind = kind;
        self.bad = bad;
        self.op = op;
        self.prec = prec;
    }

    /// The position of the current token
    fn pos(&self) -> Pos {
        self.pos_at(self.line, self.col)
    }

    fn pos_at(&self, line: u32, col: u32) -> Pos {
        Pos::new(self.base.clone(), line, col)
    }

    fn got(&mut self, tok: Token) -> bool {
        if self.tok == tok {
            self.next();
            true
        } else {
            false
        }
    }

    fn want(&mut self, tok: Token) {
        if !self.got(tok) {
            self.syntax_error(&format!("expected {}", tok.describe()));
            self.advance(&[]);
        }
    }

    /// Consumes `=`, complaining about but also accepting `:=`
    fn got_assign(&mut self) -> bool {
        match self.tok {
            Token::Define => {
                self.syntax_error("expected =");
                self.next();
                true
            }
            Token::Assign => {
                self.next();
                true
            }
            _ => false,
        }
    }

    /// Whether the current token is the operator `op`
    fn is_op(&self, op: Operator) -> bool {
        self.tok == Token::Operator && self.op == Some(op)
    }

    // ---------------------------------------------------------------------------------------
    // directives

    fn directive(&mut self, line: u32, col: u32, text: &str) {
        let line_comment = text.starts_with("//");
        let body = comment_text(text);
        if col == 1 || !line_comment {
            if let Some(rest) = body.strip_prefix("line ") {
                // the position immediately following the comment
                let origin = if line_comment {
                    Pos::new(self.file_base.clone(), line + 1, 1)
                } else {
                    Pos::new(self.file_base.clone(), line, col + text.len() as u32)
                };
                self.update_base(origin, line, col + 2 + 5, rest);
                return;
            }
        }
        if body.starts_with("go:") {
            let pos = self.pos_at(line, col + 2);
            if self.handler.on_pragma(&pos, body) {
                trace!("pending pragma {body:?} at {pos}");
                self.pragmas.push(Pragma::new(pos, body));
            }
        }
    }

    /// Applies a line directive whose text after `line ` is `text`, located at `tline:tcol`.
    fn update_base(&mut self, origin: Pos, tline: u32, tcol: u32, text: &str) {
        let Some((i, n)) = trailing_digits(text) else {
            // not a line directive
            return;
        };
        let Some(n) = n else {
            // text has a suffix :xxx but xxx is not a number
            let pos = self.pos_at(tline, tcol + i as u32);
            self.error_at(pos, ErrorKind::Lex(format!("invalid line number: {}", &text[i..])));
            return;
        };

        let (line, col, text, i) = match trailing_digits(&text[..i - 1]) {
            Some((i2, Some(n2))) => {
                // line filename:line:col
                if n == 0 || n > u64::from(POS_MAX) {
                    let pos = self.pos_at(tline, tcol + i as u32);
                    self.error_at(
                        pos,
                        ErrorKind::Lex(format!("invalid column number: {}", &text[i..])),
                    );
                    return;
                }
                (n2, n, &text[..i - 1], i2)
            }
            // line filename:line
            _ => (n, 0, text, i),
        };
        if line == 0 || line > u64::from(POS_MAX) {
            let pos = self.pos_at(tline, tcol + i as u32);
            self.error_at(pos, ErrorKind::Lex(format!("invalid line number: {}", &text[i..])));
            return;
        }

        // With a column, an empty filename means the previous filename.
        let mut filename = &text[..i - 1];
        let mut trimmed = false;
        let previous = self.base.clone();
        if filename.is_empty() && col != 0 {
            filename = previous.filename();
            trimmed = previous.trimmed();
        }
        self.base = PosBase::line_directive(&origin, filename, trimmed, line as u32, col as u32);
        trace!("line directive at {tline}:{tcol} now reports {filename}:{line}");
        self.handler.on_line_directive(&self.base);
    }

    fn take_pragma(&mut self) -> Vec<Pragma> {
        mem::take(&mut self.pragmas)
    }

    /// Reports directives that were not followed by a declaration
    fn clear_pragma(&mut self) {
        for pragma in self.take_pragma() {
            self.error_at(
                pragma.pos(),
                ErrorKind::Invalid("misplaced compiler directive".to_string()),
            );
        }
    }

    // ---------------------------------------------------------------------------------------
    // errors

    fn report(&mut self, error: SyntaxError) {
        trace!("{error}");
        if self.first.is_none() {
            self.first = Some(error.clone());
        }
        self.errcnt += 1;
        self.handler.on_error(&error);
    }

    fn error_at(&mut self, pos: Pos, kind: ErrorKind) {
        self.report(SyntaxError::new(kind, pos));
    }

    /// Reports an error that is not a grammar violation at the current token
    fn error(&mut self, msg: impl Into<String>) {
        self.error_at(self.pos(), ErrorKind::Invalid(msg.into()));
    }

    fn syntax_error(&mut self, msg: &str) {
        self.syntax_error_at(self.pos(), msg);
    }

    /// Reports a syntax error. Messages starting with `in `, `at `, `after ` or `expected ` are
    /// appended to a description of the current token.
    fn syntax_error_at(&mut self, pos: Pos, msg: &str) {
        if self.tok == Token::Eof && self.first.is_some() {
            // avoid meaningless follow-up errors
            return;
        }

        let msg = if msg.is_empty() {
            String::new()
        } else if msg.starts_with("in ") || msg.starts_with("at ") || msg.starts_with("after ")
        {
            format!(" {msg}")
        } else if msg.starts_with("expected ") {
            format!(", {msg}")
        } else {
            // plain error, the current token does not matter
            self.error_at(pos, ErrorKind::Syntax(msg.to_string()));
            return;
        };

        let op = self.op.map(Operator::as_str).unwrap_or_default();
        let tok = match self.tok {
            Token::Name => format!("name {}", self.lit),
            Token::Semi => self.lit.clone(),
            Token::Literal => format!("literal {}", self.lit),
            Token::Operator => op.to_string(),
            Token::AssignOp => format!("{op}="),
            Token::IncOp => format!("{op}{op}"),
            other => other.describe().to_string(),
        };
        self.error_at(pos, ErrorKind::Syntax(format!("unexpected {tok}{msg}")));
    }

    /// Skips tokens until one in `follow` is found. Inside function bodies statement keywords
    /// also stop the skipping, and `EOF` always does. With an empty `follow` a single token is
    /// skipped.
    fn advance(&mut self, follow: &[Token]) {
        let mut followset = TokenSet::of(&[Token::Eof]);
        if !follow.is_empty() {
            if self.fnest > 0 {
                followset = followset.union(STOPSET);
            }
            followset = followset.union(TokenSet::of(follow));
        }
        while !followset.contains(self.tok) {
            trace!("skipping {}", self.tok);
            self.next();
            if follow.is_empty() {
                break;
            }
        }
    }

    // ---------------------------------------------------------------------------------------
    // common productions

    /// Parses `{ f sep } close`, where the separator is optional before `close`. `f` returns
    /// `true` to end the list early. Returns the position of `close`.
    fn list(
        &mut self,
        context: &str,
        sep: Token,
        close: Token,
        mut f: impl FnMut(&mut Self) -> bool,
    ) -> Pos {
        let mut done = false;
        while self.tok != Token::Eof && self.tok != close && !done {
            done = f(self);
            if !self.got(sep) && self.tok != close {
                self.syntax_error(&format!(
                    "in {context}; possibly missing {} or {}",
                    sep.describe(),
                    close.describe()
                ));
                self.advance(&[Token::Rparen, Token::Rbrack, Token::Rbrace]);
                if self.tok != close {
                    return self.pos();
                }
            }
        }
        let pos = self.pos();
        self.want(close);
        pos
    }

    fn name(&mut self) -> Arc<Name> {
        if self.tok == Token::Name {
            let name = Arc::new(Name::new(self.pos(), mem::take(&mut self.lit)));
            self.next();
            return name;
        }
        let name = Arc::new(Name::blank(self.pos()));
        self.syntax_error("expected name");
        self.advance(&[]);
        name
    }

    fn name_list(&mut self, first: Arc<Name>) -> Vec<Arc<Name>> {
        let mut names = vec![first];
        while self.got(Token::Comma) {
            names.push(self.name());
        }
        names
    }

    fn oliteral(&mut self) -> Option<BasicLit> {
        if self.tok != Token::Literal {
            return None;
        }
        let mut lit = BasicLit::new(self.pos(), mem::take(&mut self.lit), self.kind);
        lit.bad = self.bad;
        self.next();
        Some(lit)
    }

    fn bad_expr(&self) -> Expr {
        BadExpr::new(self.pos()).into()
    }
}

/// The text of a comment without its markers
fn comment_text(s: &str) -> &str {
    if let Some(inner) = s.strip_prefix("/*") {
        return inner.strip_suffix("*/").unwrap_or(inner);
    }
    let s = s.strip_prefix("//").unwrap_or(s);
    s.strip_suffix('\r').unwrap_or(s)
}

/// Finds the number after the last `:` of `text`. Returns the index just past the `:` and the
/// number, if it is one.
fn trailing_digits(text: &str) -> Option<(usize, Option<u64>)> {
    let i = text.rfind(':')?;
    let digits = &text[i + 1..];
    let n = if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        digits.parse().ok()
    } else {
        None
    };
    Some((i + 1, n))
}

#[cfg(test)]
pub(crate) mod tests_support {
    use super::*;
    use sugo_ast::decl::Decl;

    pub fn parse_ok(src: &str) -> File {
        let mut errors: Vec<SyntaxError> = vec![];
        let result = Parser::new("test.sugo", src.as_bytes(), &mut errors, Mode::default()).parse();
        assert!(errors.is_empty(), "unexpected errors: {errors:#?}");
        result.expect("no errors were reported")
    }

    pub fn parse_errors(src: &str) -> Vec<String> {
        let mut errors: Vec<SyntaxError> = vec![];
        let _ = Parser::new("test.sugo", src.as_bytes(), &mut errors, Mode::default()).parse();
        errors.iter().map(|e| e.to_string()).collect()
    }

    /// Parses `src` as the value of a variable
    pub fn parse_expr(src: &str) -> Expr {
        let file = parse_ok(&format!("package p\nvar _ = {src}\n"));
        match file.decls.into_iter().next() {
            Some(Decl::Var(var)) => var.values.expect("initializer"),
            other => panic!("expected a variable, got {other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tests_support::parse_errors as errors;
    use test_log::test;

    #[test]
    fn test_trailing_digits() {
        assert_eq!(trailing_digits("a.go:10"), Some((5, Some(10))));
        assert_eq!(trailing_digits("a.go:x"), Some((5, None)));
        assert_eq!(trailing_digits("c:\\a.go:3"), Some((8, Some(3))));
        assert_eq!(trailing_digits("nocolon"), None);
    }

    #[test]
    fn test_comment_text() {
        assert_eq!(comment_text("//line a.go:1\r"), "line a.go:1");
        assert_eq!(comment_text("/*line a.go:1*/"), "line a.go:1");
    }

    #[test]
    fn test_syntax_error_formats_current_token() {
        assert_eq!(
            errors("package main\nfunc f() { x := }\n"),
            ["test.sugo:2:17: syntax error: unexpected }, expected expression"]
        );
        assert_eq!(
            errors("package main\nvar x = (1\n"),
            ["test.sugo:2:11: syntax error: unexpected newline, expected )"]
        );
    }

    #[test]
    fn test_list_reports_missing_separator() {
        assert_eq!(
            errors("package main\nfunc f(a int b int) {}\n"),
            ["test.sugo:2:14: syntax error: unexpected name b in parameter list; possibly missing comma or )"]
        );
    }

    #[test]
    fn test_invalid_line_directives() {
        assert_eq!(
            errors("//line a.go:x\npackage main\n"),
            ["test.sugo:1:13: invalid line number: x"]
        );
        assert_eq!(
            errors("//line a.go:1:0\npackage main\n"),
            ["test.sugo:1:15: invalid column number: 0"]
        );
        assert_eq!(
            errors("//line a.go:0\npackage main\n"),
            ["test.sugo:1:13: invalid line number: 0"]
        );
    }

    #[test]
    fn test_misplaced_pragma() {
        assert_eq!(
            errors("package main\nfunc f() {\n\t//go:noinline\n\tx := 1\n\t_ = x\n}\n"),
            ["test.sugo:3:4: misplaced compiler directive"]
        );
    }
}
