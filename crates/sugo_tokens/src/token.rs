//! The tokens produced by the scanner, the operators they carry and the precedence table
//! used by the parser's expression climber.

use itertools::Itertools;
use std::fmt::{Debug, Display, Formatter};
use strum::{EnumCount, EnumIter, IntoEnumIterator, IntoStaticStr};

/// A token kind.
///
/// Token kinds are used as bit indices in a [TokenSet], so there can be at most 64 of them.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, EnumCount, EnumIter, IntoStaticStr,
)]
#[repr(u8)]
pub enum Token {
    #[strum(serialize = "EOF")]
    Eof,

    // names and literals
    #[strum(serialize = "name")]
    Name,
    #[strum(serialize = "literal")]
    Literal,

    // operators and operations
    #[strum(serialize = "op")]
    Operator,
    #[strum(serialize = "op=")]
    AssignOp,
    #[strum(serialize = "opop")]
    IncOp,
    #[strum(serialize = "=")]
    Assign,
    #[strum(serialize = ":=")]
    Define,
    #[strum(serialize = "<-")]
    Arrow,
    #[strum(serialize = "*")]
    Star,
    /// The one-indexed access operator `#`
    #[strum(serialize = "#")]
    Hash,

    // delimiters
    #[strum(serialize = "(")]
    Lparen,
    #[strum(serialize = "[")]
    Lbrack,
    #[strum(serialize = "{")]
    Lbrace,
    #[strum(serialize = ")")]
    Rparen,
    #[strum(serialize = "]")]
    Rbrack,
    #[strum(serialize = "}")]
    Rbrace,
    #[strum(serialize = ",")]
    Comma,
    #[strum(serialize = ";")]
    Semi,
    #[strum(serialize = ":")]
    Colon,
    #[strum(serialize = ".")]
    Dot,
    #[strum(serialize = "...")]
    DotDotDot,

    // keywords
    #[strum(serialize = "break")]
    Break,
    #[strum(serialize = "case")]
    Case,
    #[strum(serialize = "chan")]
    Chan,
    #[strum(serialize = "const")]
    Const,
    #[strum(serialize = "continue")]
    Continue,
    #[strum(serialize = "default")]
    Default,
    #[strum(serialize = "defer")]
    Defer,
    #[strum(serialize = "else")]
    Else,
    #[strum(serialize = "enum")]
    Enum,
    #[strum(serialize = "fallthrough")]
    Fallthrough,
    #[strum(serialize = "for")]
    For,
    #[strum(serialize = "func")]
    Func,
    #[strum(serialize = "go")]
    Go,
    #[strum(serialize = "goto")]
    Goto,
    #[strum(serialize = "if")]
    If,
    #[strum(serialize = "import")]
    Import,
    #[strum(serialize = "interface")]
    Interface,
    #[strum(serialize = "map")]
    Map,
    #[strum(serialize = "package")]
    Package,
    #[strum(serialize = "range")]
    Range,
    #[strum(serialize = "return")]
    Return,
    #[strum(serialize = "select")]
    Select,
    #[strum(serialize = "struct")]
    Struct,
    #[strum(serialize = "switch")]
    Switch,
    #[strum(serialize = "type")]
    Type,
    #[strum(serialize = "var")]
    Var,
}

const _: () = assert!(Token::COUNT <= 64, "token kinds must fit in a TokenSet");

impl Token {
    /// The source spelling of this token, or a description for tokens without a fixed
    /// spelling.
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// Whether this token is a keyword
    pub fn is_keyword(self) -> bool {
        self >= Token::Break
    }

    /// All keyword tokens
    pub fn keywords() -> impl Iterator<Item = Token> {
        Token::iter().filter(|t| t.is_keyword())
    }

    /// Describes this token the way diagnostics mention it.
    pub fn describe(self) -> &'static str {
        match self {
            Token::Comma => "comma",
            Token::Semi => "semicolon or newline",
            other => other.as_str(),
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of tokens, stored as a bitset indexed by token kind.
#[derive(Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct TokenSet(u64);

impl TokenSet {
    pub const EMPTY: TokenSet = TokenSet(0);

    /// Creates a set containing the given tokens
    pub const fn of(tokens: &[Token]) -> Self {
        let mut bits = 0u64;
        let mut i = 0;
        while i < tokens.len() {
            bits |= 1 << tokens[i] as u8;
            i += 1;
        }
        Self(bits)
    }

    pub const fn contains(&self, token: Token) -> bool {
        self.0 & (1 << token as u8) != 0
    }

    pub const fn with(self, token: Token) -> Self {
        Self(self.0 | 1 << token as u8)
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Token> + '_ {
        Token::iter().filter(|t| self.contains(*t))
    }
}

impl Debug for TokenSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}", self.iter().join(", "))
    }
}

impl FromIterator<Token> for TokenSet {
    fn from_iter<T: IntoIterator<Item = Token>>(iter: T) -> Self {
        iter.into_iter().fold(TokenSet::EMPTY, TokenSet::with)
    }
}

/// An operator code
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
pub enum Operator {
    /// `:`, only used to mark short variable declarations
    #[strum(serialize = ":")]
    Def,
    #[strum(serialize = "!")]
    Not,
    #[strum(serialize = "<-")]
    Recv,
    #[strum(serialize = "~")]
    Tilde,

    #[strum(serialize = "||")]
    OrOr,

    #[strum(serialize = "&&")]
    AndAnd,

    #[strum(serialize = "==")]
    Eql,
    #[strum(serialize = "!=")]
    Neq,
    #[strum(serialize = "<")]
    Lss,
    #[strum(serialize = "<=")]
    Leq,
    #[strum(serialize = ">")]
    Gtr,
    #[strum(serialize = ">=")]
    Geq,

    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Sub,
    #[strum(serialize = "|")]
    Or,
    #[strum(serialize = "^")]
    Xor,

    #[strum(serialize = "*")]
    Mul,
    #[strum(serialize = "/")]
    Div,
    #[strum(serialize = "%")]
    Rem,
    #[strum(serialize = "&")]
    And,
    #[strum(serialize = "&^")]
    AndNot,
    #[strum(serialize = "<<")]
    Shl,
    #[strum(serialize = ">>")]
    Shr,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    /// The binary precedence of this operator. Operators that are never binary have
    /// [Prec::None].
    pub const fn precedence(self) -> Prec {
        match self {
            Operator::OrOr => Prec::OrOr,
            Operator::AndAnd => Prec::AndAnd,
            Operator::Eql
            | Operator::Neq
            | Operator::Lss
            | Operator::Leq
            | Operator::Gtr
            | Operator::Geq => Prec::Cmp,
            Operator::Add | Operator::Sub | Operator::Or | Operator::Xor => Prec::Add,
            Operator::Mul
            | Operator::Div
            | Operator::Rem
            | Operator::And
            | Operator::AndNot
            | Operator::Shl
            | Operator::Shr => Prec::Mul,
            Operator::Def | Operator::Not | Operator::Recv | Operator::Tilde => Prec::None,
        }
    }
}

impl Display for Operator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binary operator precedence, lowest to highest.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Prec {
    #[default]
    None,
    OrOr,
    AndAnd,
    Cmp,
    Add,
    Mul,
}

/// The kind of a basic literal
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, IntoStaticStr)]
pub enum LitKind {
    #[default]
    Int,
    Float,
    Imag,
    Rune,
    String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_kinds_fit_in_set() {
        assert!(Token::COUNT <= 64, "{} token kinds", Token::COUNT);
        let all: TokenSet = Token::iter().collect();
        assert_eq!(all.iter().count(), Token::COUNT);
    }

    #[test]
    fn test_token_set_membership() {
        let set = TokenSet::of(&[Token::Rparen, Token::Rbrack, Token::Rbrace]);
        assert!(set.contains(Token::Rbrack));
        assert!(!set.contains(Token::Lbrack));
        assert!(set.with(Token::Eof).contains(Token::Eof));
        assert_eq!(format!("{set:?}"), "{), ], }}");
    }

    #[test]
    fn test_five_precedence_levels() {
        let mut levels = Operator::iter()
            .map(Operator::precedence)
            .filter(|p| *p != Prec::None)
            .collect::<Vec<_>>();
        levels.sort();
        levels.dedup();
        assert_eq!(
            levels,
            vec![Prec::OrOr, Prec::AndAnd, Prec::Cmp, Prec::Add, Prec::Mul]
        );
        assert!(Operator::Mul.precedence() > Operator::Add.precedence());
        assert!(Operator::Eql.precedence() > Operator::AndAnd.precedence());
    }

    #[test]
    fn test_describe() {
        assert_eq!(Token::Semi.describe(), "semicolon or newline");
        assert_eq!(Token::Lbrace.describe(), "{");
        assert!(Token::Enum.is_keyword());
        assert!(!Token::DotDotDot.is_keyword());
    }
}
