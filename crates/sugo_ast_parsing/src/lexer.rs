//! Responsible for converting source bytes into a token stream

use crate::lexer::token_parsing::{base_name, unicode_repr, Escape};
use std::mem;
use sugo_tokens::keywords;
use sugo_tokens::token::{LitKind, Operator, Prec, Token};

pub mod token_parsing;

/// Something the scanner found that is not a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// A recoverable lexical error
    Error { line: u32, col: u32, msg: String },
    /// A `//go:`, `//line` or `/*line` comment, including its opening and closing markers
    Directive { line: u32, col: u32, text: String },
}

/// A single token and its attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub line: u32,
    pub col: u32,
    pub tok: Token,
    /// The source text of names and literals, or `"semicolon"`, `"newline"` or `"EOF"` for
    /// [Token::Semi]
    pub lit: String,
    pub kind: LitKind,
    /// Set if a literal had a syntax error
    pub bad: bool,
    /// Set for [Token::Operator], [Token::AssignOp], [Token::IncOp] and [Token::Star]
    pub op: Option<Operator>,
    pub prec: Prec,
}

impl Lexeme {
    fn new(line: u32, col: u32, tok: Token) -> Self {
        Self {
            line,
            col,
            tok,
            lit: String::new(),
            kind: LitKind::default(),
            bad: false,
            op: None,
            prec: Prec::None,
        }
    }

    fn with_lit(mut self, lit: impl Into<String>) -> Self {
        self.lit = lit.into();
        self
    }

    fn with_op(mut self, op: Operator) -> Self {
        self.op = Some(op);
        self.prec = op.precedence();
        self
    }
}

/// Converts source bytes into tokens, one per [Scanner::next_lexeme] call.
///
/// Lines and columns are 1-based and columns count bytes. Errors and directive comments do not
/// interrupt scanning; they are queued as [ScanEvent]s for the caller to collect with
/// [Scanner::take_events].
#[derive(Debug)]
pub struct Scanner {
    src: String,
    /// Offsets in `src` of replacement characters standing in for invalid UTF-8, with the
    /// number of source bytes they replace
    invalid: Vec<(usize, usize)>,

    // cursor
    ch: Option<char>,
    chw: usize,
    offset: usize,
    line: u32,
    col: u32,
    /// End of the last consumed character
    end: usize,

    // current token
    start: usize,
    tok_line: u32,
    tok_col: u32,

    nlsemi: bool,
    prev: Option<Token>,
    events: Vec<ScanEvent>,
}

impl Scanner {
    pub fn new(src: &[u8]) -> Self {
        let (src, invalid) = decode_utf8(src);
        let mut scanner = Self {
            src,
            invalid,
            ch: None,
            chw: 0,
            offset: 0,
            line: 1,
            col: 1,
            end: 0,
            start: 0,
            tok_line: 1,
            tok_col: 1,
            nlsemi: false,
            prev: None,
            events: vec![],
        };
        scanner.load();
        scanner
    }

    /// Takes all errors and directives found so far
    pub fn take_events(&mut self) -> Vec<ScanEvent> {
        mem::take(&mut self.events)
    }

    /// The decoded source text
    pub fn source(&self) -> &str {
        &self.src
    }

    /// Scans the next token
    pub fn next_lexeme(&mut self) -> Lexeme {
        let nlsemi = mem::take(&mut self.nlsemi);
        let lexeme = loop {
            while matches!(self.ch, Some(' ' | '\t' | '\r')) || (self.ch == Some('\n') && !nlsemi)
            {
                self.nextch();
            }
            self.start = self.offset;
            self.end = self.offset;
            self.tok_line = self.line;
            self.tok_col = self.col;
            if let Some(lexeme) = self.token(nlsemi) {
                break lexeme;
            }
        };
        self.prev = Some(lexeme.tok);
        lexeme
    }

    /// Scans one token starting at the current character, or returns `None` if only a comment
    /// or an invalid character was consumed.
    fn token(&mut self, nlsemi: bool) -> Option<Lexeme> {
        let Some(c) = self.ch else {
            return Some(if nlsemi {
                self.lexeme(Token::Semi).with_lit("EOF")
            } else {
                self.lexeme(Token::Eof)
            });
        };
        if c == '_' || c.is_alphabetic() {
            return Some(self.ident());
        }
        if !c.is_ascii() && c.is_numeric() {
            self.error_here(format!(
                "identifier cannot begin with digit {}",
                unicode_repr(c as u32)
            ));
            return Some(self.ident());
        }

        let tok = match c {
            '\n' => {
                self.nextch();
                return Some(self.lexeme(Token::Semi).with_lit("newline"));
            }
            '0'..='9' => return Some(self.number(false)),
            '"' => return Some(self.std_string()),
            '`' => return Some(self.raw_string()),
            '\'' => return Some(self.rune()),
            '(' => self.single(Token::Lparen),
            '[' => self.single(Token::Lbrack),
            '{' => self.single(Token::Lbrace),
            ',' => self.single(Token::Comma),
            ';' => {
                self.nextch();
                return Some(self.lexeme(Token::Semi).with_lit("semicolon"));
            }
            ')' | ']' | '}' => {
                self.nlsemi = true;
                self.single(match c {
                    ')' => Token::Rparen,
                    ']' => Token::Rbrack,
                    _ => Token::Rbrace,
                })
            }
            ':' => {
                self.nextch();
                if self.got('=') {
                    Token::Define
                } else {
                    Token::Colon
                }
            }
            '.' => {
                self.nextch();
                if self.ch.is_some_and(|c| c.is_ascii_digit()) {
                    return Some(self.number(true));
                }
                if self.src[self.offset..].starts_with("..") {
                    self.nextch();
                    self.nextch();
                    Token::DotDotDot
                } else {
                    Token::Dot
                }
            }
            '+' | '-' => {
                self.nextch();
                let op = if c == '+' { Operator::Add } else { Operator::Sub };
                if self.got(c) {
                    self.nlsemi = true;
                    return Some(self.lexeme(Token::IncOp).with_op(op));
                }
                return Some(self.assign_op(op));
            }
            '*' => {
                self.nextch();
                let tok = if self.got('=') {
                    Token::AssignOp
                } else {
                    Token::Star
                };
                return Some(self.lexeme(tok).with_op(Operator::Mul));
            }
            '/' => {
                self.nextch();
                if self.got('/') {
                    self.line_comment();
                    return None;
                }
                if self.got('*') {
                    self.full_comment();
                    if self.line != self.tok_line && nlsemi {
                        // a multi-line comment acts like a newline
                        return Some(self.lexeme(Token::Semi).with_lit("newline"));
                    }
                    return None;
                }
                return Some(self.assign_op(Operator::Div));
            }
            '%' => {
                self.nextch();
                return Some(self.assign_op(Operator::Rem));
            }
            '&' => {
                self.nextch();
                if self.got('&') {
                    return Some(self.lexeme(Token::Operator).with_op(Operator::AndAnd));
                }
                let op = if self.got('^') {
                    Operator::AndNot
                } else {
                    Operator::And
                };
                return Some(self.assign_op(op));
            }
            '|' => {
                self.nextch();
                if self.got('|') {
                    return Some(self.lexeme(Token::Operator).with_op(Operator::OrOr));
                }
                return Some(self.assign_op(Operator::Or));
            }
            '^' => {
                self.nextch();
                return Some(self.assign_op(Operator::Xor));
            }
            '<' => {
                self.nextch();
                if self.got('=') {
                    return Some(self.lexeme(Token::Operator).with_op(Operator::Leq));
                }
                if self.got('<') {
                    return Some(self.assign_op(Operator::Shl));
                }
                if self.got('-') {
                    Token::Arrow
                } else {
                    return Some(self.lexeme(Token::Operator).with_op(Operator::Lss));
                }
            }
            '>' => {
                self.nextch();
                if self.got('=') {
                    return Some(self.lexeme(Token::Operator).with_op(Operator::Geq));
                }
                if self.got('>') {
                    return Some(self.assign_op(Operator::Shr));
                }
                return Some(self.lexeme(Token::Operator).with_op(Operator::Gtr));
            }
            '=' => {
                self.nextch();
                if self.got('=') {
                    return Some(self.lexeme(Token::Operator).with_op(Operator::Eql));
                }
                Token::Assign
            }
            '!' => {
                self.nextch();
                let op = if self.got('=') {
                    Operator::Neq
                } else {
                    Operator::Not
                };
                return Some(self.lexeme(Token::Operator).with_op(op));
            }
            '~' => {
                self.nextch();
                return Some(self.lexeme(Token::Operator).with_op(Operator::Tilde));
            }
            '#' if self.hash_is_operator() => self.single(Token::Hash),
            '#' => {
                // also covers a `#!` line at the very start of the file
                self.skip_line();
                return None;
            }
            _ => {
                self.error_here(format!("invalid character {}", unicode_repr(c as u32)));
                self.nextch();
                return None;
            }
        };
        Some(self.lexeme(tok))
    }

    /// `#` indexes if it directly follows something that can be indexed on the same line.
    fn hash_is_operator(&self) -> bool {
        matches!(
            self.prev,
            Some(Token::Name | Token::Literal | Token::Rparen | Token::Rbrack | Token::Rbrace)
        )
    }

    fn lexeme(&self, tok: Token) -> Lexeme {
        Lexeme::new(self.tok_line, self.tok_col, tok)
    }

    fn single(&mut self, tok: Token) -> Token {
        self.nextch();
        tok
    }

    fn assign_op(&mut self, op: Operator) -> Lexeme {
        let tok = if self.got('=') {
            Token::AssignOp
        } else {
            Token::Operator
        };
        self.lexeme(tok).with_op(op)
    }

    fn segment(&self) -> &str {
        &self.src[self.start..self.end]
    }

    fn literal(&mut self, kind: LitKind, ok: bool) -> Lexeme {
        self.nlsemi = true;
        let mut lexeme = self.lexeme(Token::Literal).with_lit(self.segment());
        lexeme.kind = kind;
        lexeme.bad = !ok;
        lexeme
    }

    fn ident(&mut self) -> Lexeme {
        let len = match token_parsing::identifier(&self.src[self.offset..]) {
            Ok((_, word)) => word.len(),
            Err(_) => 0,
        };
        self.skip_to(self.offset + len);
        if let Some(tok) = keywords::lookup(self.segment()) {
            self.nlsemi = matches!(
                tok,
                Token::Break | Token::Continue | Token::Fallthrough | Token::Return
            );
            return self.lexeme(tok);
        }
        self.nlsemi = true;
        self.lexeme(Token::Name).with_lit(self.segment())
    }

    fn number(&mut self, mut seen_point: bool) -> Lexeme {
        let mut ok = true;
        let mut kind = LitKind::Int;
        let mut base = 10;
        // one of 'x', 'o', 'b' or '0' for a legacy octal literal
        let mut prefix = None;
        let mut digsep = 0;
        let mut invalid = None;

        if !seen_point {
            if self.ch == Some('0') {
                self.nextch();
                match self.ch.map(|c| c.to_ascii_lowercase()) {
                    Some(p @ ('x' | 'o' | 'b')) => {
                        self.nextch();
                        base = match p {
                            'x' => 16,
                            'o' => 8,
                            _ => 2,
                        };
                        prefix = Some(p);
                    }
                    _ => {
                        base = 8;
                        prefix = Some('0');
                        digsep = 1;
                    }
                }
            }
            digsep |= self.digits(base, Some(&mut invalid));
            if self.ch == Some('.') {
                if matches!(prefix, Some('o' | 'b')) {
                    self.error_here(format!("invalid radix point in {} literal", base_name(base)));
                    ok = false;
                }
                self.nextch();
                seen_point = true;
            }
        }

        if seen_point {
            kind = LitKind::Float;
            digsep |= self.digits(base, Some(&mut invalid));
        }

        if digsep & 1 == 0 && ok {
            self.error_here(format!("{} literal has no digits", base_name(base)));
            ok = false;
        }

        match self.ch {
            Some(e @ ('e' | 'E' | 'p' | 'P')) => {
                let lower = e.to_ascii_lowercase();
                if ok {
                    if lower == 'e' && prefix.is_some_and(|p| p != '0') {
                        self.error_here(format!("{e:?} exponent requires decimal mantissa"));
                        ok = false;
                    } else if lower == 'p' && prefix != Some('x') {
                        self.error_here(format!("{e:?} exponent requires hexadecimal mantissa"));
                        ok = false;
                    }
                }
                self.nextch();
                kind = LitKind::Float;
                if matches!(self.ch, Some('+' | '-')) {
                    self.nextch();
                }
                digsep = self.digits(10, None) | (digsep & 2);
                if digsep & 1 == 0 && ok {
                    self.error_here("exponent has no digits");
                    ok = false;
                }
            }
            _ if prefix == Some('x') && kind == LitKind::Float && ok => {
                self.error_here("hexadecimal mantissa requires a 'p' exponent");
                ok = false;
            }
            _ => {}
        }

        if self.got('i') {
            kind = LitKind::Imag;
        }

        let mut lexeme = self.literal(kind, ok);
        if kind == LitKind::Int && ok {
            if let Some(i) = invalid {
                let digit = lexeme.lit.as_bytes()[i] as char;
                self.error_at_tok(
                    i,
                    format!("invalid digit {digit:?} in {} literal", base_name(base)),
                );
                ok = false;
            }
        }
        if digsep & 2 != 0 && ok {
            if let Some(i) = token_parsing::invalid_sep(&lexeme.lit) {
                self.error_at_tok(i, "'_' must separate successive digits");
                ok = false;
            }
        }
        lexeme.bad = !ok;
        lexeme
    }

    fn digits(&mut self, base: u32, invalid: Option<&mut Option<usize>>) -> u8 {
        let start = self.offset;
        let digits = token_parsing::digits(&self.src[start..], base);
        if let Some(invalid) = invalid {
            if invalid.is_none() {
                *invalid = digits.invalid.map(|i| start - self.start + i);
            }
        }
        self.skip_to(start + digits.len);
        digits.digsep
    }

    fn std_string(&mut self) -> Lexeme {
        let mut ok = true;
        self.nextch();
        loop {
            match self.ch {
                Some('"') => {
                    self.nextch();
                    break;
                }
                Some('\\') => {
                    self.nextch();
                    ok &= self.escape('"');
                }
                Some('\n') => {
                    self.error_here("newline in string");
                    ok = false;
                    break;
                }
                None => {
                    self.error_at_tok(0, "string not terminated");
                    ok = false;
                    break;
                }
                Some(_) => self.nextch(),
            }
        }
        self.literal(LitKind::String, ok)
    }

    fn raw_string(&mut self) -> Lexeme {
        let mut ok = true;
        self.nextch();
        loop {
            match self.ch {
                Some('`') => {
                    self.nextch();
                    break;
                }
                None => {
                    self.error_at_tok(0, "string not terminated");
                    ok = false;
                    break;
                }
                Some(_) => self.nextch(),
            }
        }
        self.literal(LitKind::String, ok)
    }

    fn rune(&mut self) -> Lexeme {
        let mut ok = true;
        self.nextch();
        let mut n = 0;
        loop {
            match self.ch {
                Some('\'') => {
                    if ok {
                        if n == 0 {
                            self.error_here("empty rune literal or unescaped ' in rune literal");
                            ok = false;
                        } else if n != 1 {
                            self.error_at_tok(0, "more than one character in rune literal");
                            ok = false;
                        }
                    }
                    self.nextch();
                    break;
                }
                Some('\\') => {
                    self.nextch();
                    ok &= self.escape('\'');
                }
                Some('\n') => {
                    if ok {
                        self.error_here("newline in rune literal");
                        ok = false;
                    }
                    break;
                }
                None => {
                    if ok {
                        self.error_at_tok(0, "rune literal not terminated");
                        ok = false;
                    }
                    break;
                }
                Some(_) => self.nextch(),
            }
            n += 1;
        }
        self.literal(LitKind::Rune, ok)
    }

    fn escape(&mut self, quote: char) -> bool {
        match token_parsing::escape(&self.src[self.offset..], quote) {
            Escape::Valid(len) | Escape::Truncated(len) => {
                self.skip_to(self.offset + len);
                true
            }
            Escape::Invalid { at, len, msg } => {
                self.error(self.line, self.col + at as u32, msg);
                self.skip_to(self.offset + len);
                false
            }
        }
    }

    fn line_comment(&mut self) {
        let directive = token_parsing::directive_prefix(&self.src[self.offset..]).is_ok();
        self.skip_line();
        if directive {
            self.directive();
        }
    }

    fn full_comment(&mut self) {
        let directive = self.src[self.offset..].starts_with("line ");
        if self.skip_comment() && directive {
            self.directive();
        }
    }

    fn directive(&mut self) {
        let text = self.segment().to_string();
        self.events.push(ScanEvent::Directive {
            line: self.tok_line,
            col: self.tok_col,
            text,
        });
    }

    fn skip_line(&mut self) {
        while self.ch.is_some_and(|c| c != '\n') {
            self.nextch();
        }
    }

    fn skip_comment(&mut self) -> bool {
        while let Some(c) = self.ch {
            self.nextch();
            if c == '*' && self.got('/') {
                return true;
            }
        }
        self.error_at_tok(0, "comment not terminated");
        false
    }

    /// Consumes the current character if it is `c`
    fn got(&mut self, c: char) -> bool {
        if self.ch == Some(c) {
            self.nextch();
            true
        } else {
            false
        }
    }

    fn skip_to(&mut self, offset: usize) {
        while self.offset < offset && self.ch.is_some() {
            self.nextch();
        }
    }

    fn nextch(&mut self) {
        let Some(c) = self.ch else {
            return;
        };
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += self.chw as u32;
        }
        self.offset += self.chw;
        self.end = self.offset;
        self.load();
    }

    /// Loads the character at the cursor, reporting and skipping invalid UTF-8, NUL and BOM
    fn load(&mut self) {
        loop {
            let Some(c) = self.src[self.offset..].chars().next() else {
                self.ch = None;
                self.chw = 0;
                return;
            };
            let width = c.len_utf8();
            if let Ok(i) = self
                .invalid
                .binary_search_by_key(&self.offset, |&(offset, _)| offset)
            {
                let source_len = self.invalid[i].1;
                self.error_here("invalid UTF-8 encoding");
                self.offset += width;
                self.col += source_len as u32;
                continue;
            }
            match c {
                '\0' => {
                    self.error_here("invalid NUL character");
                    self.offset += width;
                    self.col += 1;
                    continue;
                }
                '\u{FEFF}' => {
                    if self.offset > 0 {
                        self.error_here("invalid BOM in the middle of the file");
                    }
                    self.offset += width;
                    self.col += width as u32;
                    continue;
                }
                _ => {}
            }
            self.ch = Some(c);
            self.chw = width;
            return;
        }
    }

    fn error(&mut self, line: u32, col: u32, msg: impl Into<String>) {
        self.events.push(ScanEvent::Error {
            line,
            col,
            msg: msg.into(),
        });
    }

    fn error_here(&mut self, msg: impl Into<String>) {
        self.error(self.line, self.col, msg)
    }

    fn error_at_tok(&mut self, offset: usize, msg: impl Into<String>) {
        self.error(self.tok_line, self.tok_col + offset as u32, msg)
    }
}

impl Iterator for Scanner {
    type Item = Lexeme;

    /// Yields every token up to, but not including, [Token::Eof]
    fn next(&mut self) -> Option<Self::Item> {
        let lexeme = self.next_lexeme();
        (lexeme.tok != Token::Eof).then_some(lexeme)
    }
}

/// Decodes `bytes` as UTF-8, replacing each invalid sequence by U+FFFD. Returns the text and
/// the offsets of the replacements together with the length of the bytes they replace.
fn decode_utf8(mut bytes: &[u8]) -> (String, Vec<(usize, usize)>) {
    let mut text = String::with_capacity(bytes.len());
    let mut invalid = vec![];
    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                text.push_str(valid);
                return (text, invalid);
            }
            Err(e) => {
                let (valid, rest) = bytes.split_at(e.valid_up_to());
                text.push_str(std::str::from_utf8(valid).unwrap_or_default());
                let len = e.error_len().unwrap_or(rest.len());
                invalid.push((text.len(), len));
                text.push(char::REPLACEMENT_CHARACTER);
                bytes = &rest[len..];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn tokens(src: &str) -> Vec<Token> {
        Scanner::new(src.as_bytes()).map(|l| l.tok).collect()
    }

    fn errors(src: &[u8]) -> Vec<String> {
        let mut scanner = Scanner::new(src);
        scanner.by_ref().for_each(drop);
        scanner
            .take_events()
            .into_iter()
            .filter_map(|e| match e {
                ScanEvent::Error { msg, .. } => Some(msg),
                ScanEvent::Directive { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_semicolon_insertion() {
        let lexemes: Vec<_> = Scanner::new(b"x\ny(\n)\nreturn\n").collect();
        let toks: Vec<_> = lexemes.iter().map(|l| l.tok).collect();
        assert_eq!(
            toks,
            [
                Token::Name,
                Token::Semi,
                Token::Name,
                Token::Lparen,
                Token::Rparen,
                Token::Semi,
                Token::Return,
                Token::Semi
            ]
        );
        assert_eq!(lexemes[1].lit, "newline");
        assert_eq!(tokens("x"), [Token::Name, Token::Semi]);
        assert_eq!(Scanner::new(b"x").nth(1).unwrap().lit, "EOF");
    }

    #[test]
    fn test_hash_after_operand_is_operator() {
        assert_eq!(
            tokens("z#1"),
            [Token::Name, Token::Hash, Token::Literal, Token::Semi]
        );
        assert_eq!(
            tokens("f()#1"),
            [
                Token::Name,
                Token::Lparen,
                Token::Rparen,
                Token::Hash,
                Token::Literal,
                Token::Semi
            ]
        );
    }

    #[test]
    fn test_hash_elsewhere_is_comment() {
        assert_eq!(tokens("# a comment\nx"), [Token::Name, Token::Semi]);
        assert_eq!(
            tokens("a, # trailing\nb"),
            [Token::Name, Token::Comma, Token::Name, Token::Semi]
        );
        assert_eq!(
            tokens("x = # comment"),
            [Token::Name, Token::Assign]
        );
        assert_eq!(
            tokens("x\n#1"),
            [Token::Name, Token::Semi]
        );
        assert_eq!(
            tokens("\t# indented\nx"),
            [Token::Name, Token::Semi]
        );
        assert_eq!(
            tokens("x; # after a semicolon\ny"),
            [Token::Name, Token::Semi, Token::Name, Token::Semi]
        );
    }

    #[test]
    fn test_next_lexeme_stays_at_eof() {
        let mut scanner = Scanner::new(b"x");
        assert_eq!(scanner.next_lexeme().tok, Token::Name);
        assert_eq!(scanner.next_lexeme().tok, Token::Semi);
        assert_eq!(scanner.next_lexeme().tok, Token::Eof);
        assert_eq!(scanner.next_lexeme().tok, Token::Eof);
    }

    #[test]
    fn test_shebang() {
        assert_eq!(
            tokens("#!/usr/bin/env sugo\nx := 1\n"),
            [Token::Name, Token::Define, Token::Literal, Token::Semi]
        );
    }

    #[test]
    fn test_keywords_and_alternate_spellings() {
        assert_eq!(tokens("fn"), [Token::Func]);
        assert_eq!(tokens("func"), [Token::Func]);
        assert_eq!(tokens("enum"), [Token::Enum]);
        assert_eq!(tokens("fnord"), [Token::Name, Token::Semi]);
    }

    #[test]
    fn test_operators() {
        let ops: Vec<_> = Scanner::new(b"a &^= b << c && <-d")
            .filter_map(|l| l.op.map(|op| (l.tok, op)))
            .collect();
        assert_eq!(
            ops,
            [
                (Token::AssignOp, Operator::AndNot),
                (Token::Operator, Operator::Shl),
                (Token::Operator, Operator::AndAnd),
            ]
        );
        assert_eq!(
            tokens("x++"),
            [Token::Name, Token::IncOp, Token::Semi]
        );
        assert_eq!(tokens("a...b"), [Token::Name, Token::DotDotDot, Token::Name, Token::Semi]);
    }

    #[test]
    fn test_numbers() {
        let lits: Vec<_> = Scanner::new(b"0x1p-2 1_000 .5 0o17 1e3i 'a'")
            .filter(|l| l.tok == Token::Literal)
            .map(|l| (l.lit, l.kind))
            .collect();
        assert_eq!(
            lits,
            [
                ("0x1p-2".to_string(), LitKind::Float),
                ("1_000".to_string(), LitKind::Int),
                (".5".to_string(), LitKind::Float),
                ("0o17".to_string(), LitKind::Int),
                ("1e3i".to_string(), LitKind::Imag),
                ("'a'".to_string(), LitKind::Rune),
            ]
        );
    }

    #[test]
    fn test_number_errors() {
        assert_eq!(
            errors(b"0x1.8"),
            ["hexadecimal mantissa requires a 'p' exponent"]
        );
        assert_eq!(errors(b"1__2"), ["'_' must separate successive digits"]);
        assert_eq!(errors(b"09"), ["invalid digit '9' in octal literal"]);
        assert_eq!(errors(b"0b102"), ["invalid digit '2' in binary literal"]);
        assert_eq!(errors(b"0x"), ["hexadecimal literal has no digits"]);
        assert_eq!(errors(b"1e"), ["exponent has no digits"]);
    }

    #[test]
    fn test_string_errors() {
        assert_eq!(errors(b"\"abc"), ["string not terminated"]);
        assert_eq!(errors(b"\"a\nb\""), ["newline in string", "string not terminated"]);
        assert_eq!(errors(b"'ab'"), ["more than one character in rune literal"]);
        assert_eq!(
            errors(b"''"),
            ["empty rune literal or unescaped ' in rune literal"]
        );
        assert_eq!(errors(br#""\q""#), ["unknown escape"]);
        assert_eq!(errors(b"/* open"), ["comment not terminated"]);
    }

    #[test]
    fn test_invalid_input() {
        assert_eq!(errors(b"x\xffy"), ["invalid UTF-8 encoding"]);
        assert_eq!(errors(b"a\0b"), ["invalid NUL character"]);
        assert_eq!(errors(b"\xEF\xBB\xBFx"), Vec::<String>::new());
        assert_eq!(errors(b"x\xEF\xBB\xBF"), ["invalid BOM in the middle of the file"]);
        assert_eq!(errors(b"@"), ["invalid character U+0040 '@'"]);
    }

    #[test]
    fn test_invalid_utf8_is_not_part_of_name() {
        let names: Vec<_> = Scanner::new(b"ab\xffcd")
            .filter(|l| l.tok == Token::Name)
            .map(|l| (l.lit, l.col))
            .collect();
        assert_eq!(names, [("ab".to_string(), 1), ("cd".to_string(), 4)]);
    }

    #[test]
    fn test_directives_are_reported() {
        let mut scanner = Scanner::new(b"//go:noinline\n/*line a.go:3*/ x // plain\n");
        scanner.by_ref().for_each(drop);
        let directives: Vec<_> = scanner
            .take_events()
            .into_iter()
            .filter_map(|e| match e {
                ScanEvent::Directive { line, col, text } => Some((line, col, text)),
                ScanEvent::Error { .. } => None,
            })
            .collect();
        assert_eq!(
            directives,
            [
                (1, 1, "//go:noinline".to_string()),
                (2, 1, "/*line a.go:3*/".to_string())
            ]
        );
    }
}
