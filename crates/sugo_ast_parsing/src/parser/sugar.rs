//! Lowering of the sugared constructs into plain syntax.
//!
//! Every construct here is rewritten as soon as it is parsed:
//!
//! | sugar                     | lowered to                                  |
//! |---------------------------|---------------------------------------------|
//! | `x # i`                   | `x[i - 1]`                                  |
//! | `[a, b]`, `[]`            | `[]any{a, b}`, `[]any{}`                    |
//! | `{k: v}`, `map{k: v}`     | `map[any]any{"k": v}`                       |
//! | `map[k: v k2: v2]`        | `map[any]any{"k": v, "k2": v2}`             |
//! | `enum E { A, B }`         | `type E int`, constants and a `String` method |
//! | top level statements      | `func main() { ... }`                       |

use super::error::{ErrorKind, SugarError, SyntaxError};
use super::{Handler, Parser};
use std::mem;
use std::sync::Arc;
use sugo_ast::decl::{ConstDecl, Decl, FuncDecl, Group, TypeDecl};
use sugo_ast::expr::{
    ArrayType, BasicLit, CompositeLit, Expr, Field, FuncType, IndexExpr, KeyValueExpr, MapType,
    Name, Operation, SliceType,
};
use sugo_ast::positions::{end_pos, stmt_start_pos};
use sugo_ast::stmt::{BlockStmt, ReturnStmt};
use sugo_ast::File;
use sugo_tokens::pos::{Pos, Positioned};
use sugo_tokens::token::{LitKind, Operator, Token};
use tracing::{debug, trace};

/// The element type of sequence literals and the key and value type of map literals
const DYNAMIC: &str = "any";

/// The name of the receiver of the `String` method generated for enums
const ENUM_RECEIVER: &str = "v";

impl<H: Handler + ?Sized> Parser<'_, H> {
    /// `x # i`, the current token is `#`
    pub(super) fn one_indexed(&mut self, x: Expr) -> Expr {
        let pos = self.pos();
        self.next();
        let i = self.hash_index();
        let end = end_pos(&i);
        trace!("one-indexed access at {pos}");
        let one = BasicLit::int(end.clone(), 1);
        let index = Operation::binary(end, Operator::Sub, i, one.into());
        IndexExpr::new(pos, x, index.into()).into()
    }

    /// An operand starting with `[`: an array or slice type, or a sequence literal.
    pub(super) fn bracket_operand(&mut self) -> Expr {
        let pos = self.pos();
        self.next();

        if self.tok == Token::Rbrack {
            let rbrack = self.pos();
            self.next();
            if starts_type(self.tok) {
                return self.slice_type(pos);
            }
            trace!("empty sequence literal at {pos}");
            return sequence(pos, vec![], rbrack);
        }
        if self.tok == Token::DotDotDot {
            return self.array_type(pos, None);
        }

        self.xnest += 1;
        let first = self.expr();
        let x = if self.tok == Token::Rbrack {
            let rbrack = self.pos();
            self.next();
            if could_be_len(&first) && self.tok == Token::Lbrack {
                self.array_or_indexed_sequence(pos, first, rbrack)
            } else if could_be_len(&first) && starts_type(self.tok) {
                let elem = self.type_();
                ArrayType::new(pos, Some(first), elem).into()
            } else {
                trace!("sequence literal with one element at {pos}");
                sequence(pos, vec![first], rbrack)
            }
        } else {
            let mut elems = vec![first];
            let rbrack = if self.got(Token::Comma) {
                self.list("sequence literal", Token::Comma, Token::Rbrack, |p| {
                    elems.push(p.expr());
                    false
                })
            } else {
                self.syntax_error("in sequence literal; possibly missing comma or ]");
                self.advance(&[Token::Rparen, Token::Rbrack, Token::Rbrace]);
                let rbrack = self.pos();
                self.got(Token::Rbrack);
                rbrack
            };
            trace!("sequence literal with {} elements at {pos}", elems.len());
            sequence(pos, elems, rbrack)
        };
        self.xnest -= 1;
        x
    }

    /// `[n]` followed by `[`: either an array of arrays `[n][m]T` or the one element sequence
    /// `[n]` indexed by `m`. The current token is the second `[`.
    fn array_or_indexed_sequence(&mut self, pos: Pos, len: Expr, rbrack: Pos) -> Expr {
        let lbrack = self.pos();
        self.next();
        match self.tok {
            Token::Rbrack => {
                self.next();
                let elem = self.slice_type(lbrack);
                return ArrayType::new(pos, Some(len), elem).into();
            }
            Token::DotDotDot => {
                let elem = self.array_type(lbrack, None);
                return ArrayType::new(pos, Some(len), elem).into();
            }
            _ => {}
        }

        self.xnest += 1;
        let index = self.expr();
        self.xnest -= 1;
        self.want(Token::Rbrack);
        if could_be_len(&index) && starts_type(self.tok) {
            let elem = self.type_();
            let inner = ArrayType::new(lbrack, Some(index), elem);
            return ArrayType::new(pos, Some(len), inner.into()).into();
        }
        trace!("indexed sequence literal at {pos}");
        IndexExpr::new(lbrack, sequence(pos, vec![len], rbrack), index).into()
    }

    /// An operand starting with `map`: a map type, or a map literal in brace or bracket form.
    pub(super) fn map_operand(&mut self) -> Expr {
        let pos = self.pos();
        self.next();
        match self.tok {
            Token::Lbrace => self.map_lit(pos),
            Token::Lbrack => {
                let lbrack = self.pos();
                self.next();
                self.xnest += 1;
                let key = self.expr();
                self.xnest -= 1;
                if self.tok == Token::Colon {
                    return self.bracket_map_lit(pos, lbrack, key);
                }
                self.want(Token::Rbrack);
                let value = self.type_();
                MapType::new(pos, key, value).into()
            }
            _ => {
                let x = self.bad_expr();
                self.want(Token::Lbrack);
                x
            }
        }
    }

    /// `{ k: v, ... }`, where `pos` is the position the synthesized map type is reported at.
    pub(super) fn map_lit(&mut self, pos: Pos) -> Expr {
        let lbrace = self.pos();
        self.xnest += 1;
        self.want(Token::Lbrace);
        let mut elems = vec![];
        let rbrace = self.list("map literal", Token::Comma, Token::Rbrace, |p| {
            let key = p.expr();
            elems.push(p.map_entry(key));
            false
        });
        self.xnest -= 1;
        trace!("map literal with {} entries at {lbrace}", elems.len());
        CompositeLit::new(lbrace, Some(dynamic_map(pos)), elems, rbrace).into()
    }

    /// `map[ k: v k: v ]` after the first key
    fn bracket_map_lit(&mut self, pos: Pos, lbrack: Pos, first: Expr) -> Expr {
        let mut elems = vec![];
        let mut key = Some(first);
        self.xnest += 1;
        loop {
            let start = (self.line, self.col);
            let k = match key.take() {
                Some(k) => k,
                None => self.expr(),
            };
            elems.push(self.map_entry(k));
            while self.got(Token::Comma) || self.got(Token::Semi) {}
            if matches!(
                self.tok,
                Token::Rbrack | Token::Rparen | Token::Rbrace | Token::Eof
            ) || start == (self.line, self.col)
            {
                break;
            }
        }
        self.xnest -= 1;

        let rbrack = self.pos();
        if !self.got(Token::Rbrack) {
            self.syntax_error("in map literal; possibly missing comma or ]");
            self.advance(&[Token::Rparen, Token::Rbrack, Token::Rbrace]);
            self.got(Token::Rbrack);
        }
        trace!("bracketed map literal with {} entries at {lbrack}", elems.len());
        CompositeLit::new(lbrack, Some(dynamic_map(pos)), elems, rbrack).into()
    }

    /// `key: value`, where the key has been parsed. Bare names are turned into strings.
    fn map_entry(&mut self, key: Expr) -> Expr {
        if self.tok != Token::Colon {
            self.error_at(key.pos(), SugarError::MissingMapKey.into());
            return key;
        }
        let pos = self.pos();
        self.next();
        let value = self.expr();
        let key = match key {
            Expr::Name(name) => BasicLit::string(name.pos(), name.value()).into(),
            key => key,
        };
        KeyValueExpr::new(pos, key, value).into()
    }

    /// `enum Name { A, B, ... }`, the current token is `enum`
    pub(super) fn enum_decl(&mut self, decls: &mut Vec<Decl>) {
        let pos = self.pos();
        let pragmas = self.take_pragma();
        self.next();
        let name = self.name();

        let mut members: Vec<Arc<Name>> = vec![];
        let mut rbrace = self.pos();
        if self.tok == Token::Lbrace {
            self.next();
            loop {
                while self.got(Token::Comma) || self.got(Token::Semi) {}
                if matches!(self.tok, Token::Rbrace | Token::Eof) {
                    break;
                }
                if self.tok != Token::Name {
                    self.syntax_error("in enum declaration; possibly missing comma or }");
                    self.advance(&[Token::Rbrace]);
                    break;
                }
                members.push(self.name());
            }
            rbrace = self.pos();
            self.want(Token::Rbrace);
        } else {
            self.want(Token::Lbrace);
        }

        let mut ty = TypeDecl::new(
            pos.clone(),
            None,
            name.clone(),
            vec![],
            false,
            Expr::name(pos.clone(), "int"),
        );
        ty.pragmas = pragmas;
        decls.push(ty.into());

        if members.is_empty() {
            self.error_at(
                pos,
                SugarError::EmptyEnum {
                    name: name.value().to_string(),
                }
                .into(),
            );
            return;
        }
        debug!("lowering enum {} with {} members", name.value(), members.len());

        let group = Arc::new(Group::new(pos.clone()));
        let mut strings = Vec::with_capacity(members.len());
        for (i, member) in members.into_iter().enumerate() {
            let member_pos = member.pos();
            strings.push(BasicLit::string(member_pos.clone(), member.value()).into());
            let value = BasicLit::int(member_pos.clone(), i);
            decls.push(
                ConstDecl::new(
                    member_pos.clone(),
                    Some(group.clone()),
                    vec![member],
                    Some(Expr::name(member_pos, name.value())),
                    Some(value.into()),
                )
                .into(),
            );
        }
        decls.push(enum_stringer(pos, &name, strings, rbrace).into());
    }

    /// Moves the statements found outside of any function into a synthesized `func main()`.
    pub(super) fn entry_point(&mut self, file: &mut File) {
        let stmts = mem::take(&mut self.top_level);
        let Some(first) = stmts.first() else {
            return;
        };
        let pos = stmt_start_pos(first);

        if let Some(main) = file.entry_point() {
            let cause = SyntaxError::new(
                ErrorKind::Invalid("func main declared here".to_string()),
                main.name.pos(),
            );
            self.report(SyntaxError::with_cause(
                SugarError::EntryPointConflict.into(),
                pos,
                cause,
            ));
            file.top_level = stmts;
            return;
        }

        debug!("collecting {} top level statements into func main", stmts.len());
        let body = BlockStmt::new(pos.clone(), stmts, file.eof().clone());
        if self.mode.check_branches && !self.top_level_errors {
            self.check_branches(&body);
        }
        let name = Arc::new(Name::new(pos.clone(), sugo_ast::ENTRY_POINT));
        let ty = FuncType::new(pos.clone(), vec![], vec![]);
        file.decls
            .push(FuncDecl::new(pos, None, name, vec![], ty, Some(body)).into());
    }
}

/// Whether a type can start with `tok`
fn starts_type(tok: Token) -> bool {
    matches!(
        tok,
        Token::Name
            | Token::Lbrack
            | Token::Star
            | Token::Func
            | Token::Chan
            | Token::Map
            | Token::Struct
            | Token::Interface
            | Token::Arrow
            | Token::Lparen
    )
}

/// Whether `x` may be the length of an array type
fn could_be_len(x: &Expr) -> bool {
    match x {
        Expr::BasicLit(lit) => lit.kind == LitKind::Int,
        Expr::Name(_)
        | Expr::Selector(_)
        | Expr::Operation(_)
        | Expr::Paren(_)
        | Expr::Call(_) => true,
        _ => false,
    }
}

/// `[]any{elems}`
fn sequence(pos: Pos, elems: Vec<Expr>, rbrack: Pos) -> Expr {
    let ty = SliceType::new(pos.clone(), Expr::name(pos.clone(), DYNAMIC));
    CompositeLit::new(pos, Some(ty.into()), elems, rbrack).into()
}

/// `map[any]any`
fn dynamic_map(pos: Pos) -> Expr {
    MapType::new(
        pos.clone(),
        Expr::name(pos.clone(), DYNAMIC),
        Expr::name(pos, DYNAMIC),
    )
    .into()
}

/// `func (v Name) String() string { return [N]string{"A", ...}[v] }`
fn enum_stringer(pos: Pos, name: &Name, strings: Vec<Expr>, rbrace: Pos) -> FuncDecl {
    let receiver = Arc::new(Name::new(pos.clone(), ENUM_RECEIVER));
    let recv = Field::new(
        pos.clone(),
        Some(receiver),
        Expr::name(pos.clone(), name.value()),
    );
    let ty = FuncType::new(
        pos.clone(),
        vec![],
        vec![Field::new(pos.clone(), None, Expr::name(pos.clone(), "string"))],
    );

    let names = ArrayType::new(
        pos.clone(),
        Some(BasicLit::int(pos.clone(), strings.len()).into()),
        Expr::name(pos.clone(), "string"),
    );
    let table = CompositeLit::new(pos.clone(), Some(names.into()), strings, rbrace.clone());
    let lookup = IndexExpr::new(
        pos.clone(),
        table.into(),
        Expr::name(pos.clone(), ENUM_RECEIVER),
    );
    let body = BlockStmt::new(
        pos.clone(),
        vec![ReturnStmt::new(pos.clone(), Some(lookup.into())).into()],
        rbrace,
    );
    FuncDecl::new(
        pos.clone(),
        Some(recv),
        Arc::new(Name::new(pos, "String")),
        vec![],
        ty,
        Some(body),
    )
}

#[cfg(test)]
mod tests {
    use crate::parser::tests_support::{parse_errors, parse_expr, parse_ok};
    use sugo_ast::decl::Decl;
    use sugo_ast::expr::Expr;
    use test_log::test;

    #[test]
    fn test_one_indexed_access() {
        assert_eq!(parse_expr("z#1").to_string(), "z[1 - 1]");
        assert_eq!(parse_expr("z#i+1").to_string(), "z[i - 1] + 1");
        assert_eq!(parse_expr("m#2#1").to_string(), "m[2 - 1][1 - 1]");
        assert_eq!(parse_expr("z#-n").to_string(), "z[-n - 1]");
        assert_eq!(parse_expr("f()#1#2").to_string(), "f()[1 - 1][2 - 1]");
        assert_eq!(parse_expr("m#k.n#1").to_string(), "m[k.n - 1][1 - 1]");
        assert_eq!(parse_expr("z#f(a#1)").to_string(), "z[f(a[1 - 1]) - 1]");
    }

    #[test]
    fn test_sequence_literals() {
        assert_eq!(parse_expr("[1, 2, 3]").to_string(), "[]any{1, 2, 3}");
        assert_eq!(parse_expr("[]").to_string(), "[]any{}");
        assert_eq!(parse_expr("[x]").to_string(), "[]any{x}");
        assert_eq!(parse_expr("[\"a\",]").to_string(), "[]any{\"a\"}");
        assert_eq!(parse_expr("[[1], []]").to_string(), "[]any{[]any{1}, []any{}}");
    }

    #[test]
    fn test_indexed_sequence_literal() {
        assert_eq!(parse_expr("[1][0]").to_string(), "[]any{1}[0]");
        assert_eq!(parse_expr("[x][i].y").to_string(), "[]any{x}[i].y");
        assert_eq!(parse_expr("[x][0][1]").to_string(), "[]any{x}[0][1]");
        assert!(matches!(parse_expr("[2][3]int{}"), Expr::CompositeLit(_)));
        let Expr::CompositeLit(lit) = parse_expr("[2][3]int{}") else {
            panic!("expected a composite literal");
        };
        let Some(Expr::ArrayType(outer)) = lit.ty.as_deref() else {
            panic!("expected an array type");
        };
        assert!(matches!(&*outer.elem, Expr::ArrayType(_)));
        assert!(matches!(parse_expr("[2][]int{}"), Expr::CompositeLit(_)));
    }

    #[test]
    fn test_bracket_types_are_kept() {
        let Expr::CompositeLit(lit) = parse_expr("[]int{1}") else {
            panic!("expected a composite literal");
        };
        assert!(matches!(lit.ty.as_deref(), Some(Expr::SliceType(_))));
        let Expr::CompositeLit(lit) = parse_expr("[2]string{\"a\", \"b\"}") else {
            panic!("expected a composite literal");
        };
        assert!(matches!(lit.ty.as_deref(), Some(Expr::ArrayType(_))));
        let Expr::CompositeLit(lit) = parse_expr("[...]int{1}") else {
            panic!("expected a composite literal");
        };
        assert!(matches!(lit.ty.as_deref(), Some(Expr::ArrayType(_))));
    }

    #[test]
    fn test_map_literals() {
        let expected = "map[any]any{\"a\": 1, \"b\": \"x\"}";
        assert_eq!(parse_expr("{a: 1, b: \"x\"}").to_string(), expected);
        assert_eq!(parse_expr("map{a: 1, b: \"x\"}").to_string(), expected);
        assert_eq!(parse_expr("map[a: 1 b: \"x\"]").to_string(), expected);
        assert_eq!(parse_expr("map[a: 1, b: \"x\",]").to_string(), expected);
        assert_eq!(parse_expr("{}").to_string(), "map[any]any{}");
        assert_eq!(
            parse_expr("{\"k\": {n: 1}}").to_string(),
            "map[any]any{\"k\": map[any]any{\"n\": 1}}"
        );
    }

    #[test]
    fn test_map_literals_with_other_keys() {
        assert_eq!(
            parse_expr("{1: \"a\", b: 2}").to_string(),
            "map[any]any{1: \"a\", \"b\": 2}"
        );
        assert_eq!(
            parse_expr("map[a: 1 2: 3]").to_string(),
            "map[any]any{\"a\": 1, 2: 3}"
        );
        let Expr::CompositeLit(lit) = parse_expr("map[k.x: 1]") else {
            panic!("expected a composite literal");
        };
        let Some(Expr::MapType(ty)) = lit.ty.as_deref() else {
            panic!("expected a map type");
        };
        assert_eq!(ty.key.to_string(), "any");
        assert_eq!(ty.value.to_string(), "any");
    }

    #[test]
    fn test_map_types_are_kept() {
        assert!(matches!(parse_expr("map[string]int"), Expr::MapType(_)));
        let Expr::CompositeLit(lit) = parse_expr("map[string]int{\"a\": 1}") else {
            panic!("expected a composite literal");
        };
        assert!(matches!(lit.ty.as_deref(), Some(Expr::MapType(_))));
    }

    #[test]
    fn test_bracket_map_literal_across_lines() {
        let file = parse_ok("x := map[\n\ta: 1\n\tb: 2\n]\nprintln(x)\n");
        let main = file.entry_point().expect("main");
        assert_eq!(
            main.body.as_ref().expect("body").stmts[0].to_string(),
            "x := map[any]any{\"a\": 1, \"b\": 2}"
        );
    }

    #[test]
    fn test_missing_map_key() {
        assert_eq!(
            parse_errors("package main\nvar m = {a: 1, 2}\n"),
            ["test.sugo:2:16: syntax error: missing key in map literal"]
        );
    }

    #[test]
    fn test_enum_lowering() {
        let file = parse_ok("package main\nenum Color { Red, Green\n Blue }\n");
        let decls = &file.decls;
        assert_eq!(decls.len(), 5);
        assert_eq!(decls[0].to_string(), "type Color int");
        for (i, decl) in decls[1..4].iter().enumerate() {
            let Decl::Const(c) = decl else {
                panic!("expected a constant");
            };
            assert_eq!(c.values.as_ref().expect("value").to_string(), i.to_string());
            assert!(std::sync::Arc::ptr_eq(
                decls[1].group().expect("group"),
                c.group.as_ref().expect("group")
            ));
        }
        let Decl::Func(stringer) = &decls[4] else {
            panic!("expected a method");
        };
        assert_eq!(stringer.name.value(), "String");
        assert_eq!(
            stringer.body.as_ref().expect("body").stmts[0].to_string(),
            "return [3]string{\"Red\", \"Green\", \"Blue\"}[v]"
        );
    }

    #[test]
    fn test_empty_enum() {
        assert_eq!(
            parse_errors("package main\nenum Nothing {}\n"),
            ["test.sugo:2:1: syntax error: enum Nothing has no members"]
        );
    }

    #[test]
    fn test_top_level_statements() {
        let file = parse_ok("x := 1\nprintln(x)\n");
        assert_eq!(file.pkg_name.value(), "main");
        let main = file.entry_point().expect("main");
        assert_eq!(main.body.as_ref().expect("body").stmts.len(), 2);
        assert!(file.top_level.is_empty());
    }

    #[test]
    fn test_top_level_statements_with_main() {
        assert_eq!(
            parse_errors("package main\nfunc main() {}\nprintln(1)\n"),
            ["test.sugo:3:1: syntax error: top-level statements are not allowed when func main is declared\n\
              caused by: test.sugo:2:6: func main declared here"]
        );
    }
}
