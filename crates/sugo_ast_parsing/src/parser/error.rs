use std::fmt::{Display, Formatter};
use std::io;
use sugo_ast::File;
use sugo_tokens::pos::Pos;
use sugo_tokens::PosError;

/// Represents an error found while scanning or parsing a file
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub struct SyntaxError {
    pub kind: PosError<ErrorKind, SyntaxError>,
}

impl SyntaxError {
    /// Creates a new error
    pub fn new(kind: ErrorKind, pos: Pos) -> Self {
        Self {
            kind: PosError::new(kind, pos, None),
        }
    }

    /// Creates a new error pointing at a related location
    pub fn with_cause(kind: ErrorKind, pos: Pos, cause: SyntaxError) -> Self {
        Self {
            kind: PosError::new(kind, pos, cause),
        }
    }

    pub fn pos(&self) -> Option<&Pos> {
        self.kind.location()
    }

    pub fn error_kind(&self) -> &ErrorKind {
        self.kind.error()
    }

    /// The message of this error without its position
    pub fn message(&self) -> String {
        self.kind.error().to_string()
    }
}

impl Display for SyntaxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)
    }
}

/// [SyntaxError] kind
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    /// A malformed token, comment or directive
    #[error("{0}")]
    Lex(String),
    #[error("syntax error: {0}")]
    Syntax(String),
    /// A well-formed construct that is not allowed where it appears, such as a misplaced
    /// branch statement
    #[error("{0}")]
    Invalid(String),
    #[error("syntax error: {0}")]
    Sugar(#[from] SugarError),
}

/// Errors in the constructs that are lowered while parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SugarError {
    #[error("enum {name} has no members")]
    EmptyEnum { name: String },
    #[error("top-level statements are not allowed when func main is declared")]
    EntryPointConflict,
    #[error("missing key in map literal")]
    MissingMapKey,
}

/// Returned when a file had errors. The partially parsed file is kept so it can still be
/// inspected.
#[derive(Debug, thiserror::Error)]
#[error("{first}{}", more_errors(.count))]
pub struct ParseFailure {
    pub partial: File,
    pub first: SyntaxError,
    /// The total number of errors, including `first`
    pub count: usize,
}

fn more_errors(count: &usize) -> String {
    match *count {
        0 | 1 => String::new(),
        2 => " (and 1 more error)".to_string(),
        n => format!(" (and {} more errors)", n - 1),
    }
}

/// An error while parsing a file from disk
#[derive(Debug, thiserror::Error)]
pub enum ParseFileError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Parse(#[from] ParseFailure),
}

#[cfg(test)]
mod tests {
    use super::*;
    use sugo_tokens::pos::PosBase;

    #[test]
    fn test_display() {
        let pos = Pos::new(PosBase::file("a.sugo"), 3, 4);
        let error = SyntaxError::new(ErrorKind::Syntax("unexpected name x".into()), pos.clone());
        assert_eq!(error.to_string(), "a.sugo:3:4: syntax error: unexpected name x");
        assert_eq!(error.message(), "syntax error: unexpected name x");
        assert_eq!(error.pos(), Some(&pos));

        let lex = SyntaxError::new(ErrorKind::Lex("newline in string".into()), pos.clone());
        assert_eq!(lex.to_string(), "a.sugo:3:4: newline in string");

        let sugar = SyntaxError::new(SugarError::EntryPointConflict.into(), pos);
        assert_eq!(
            sugar.message(),
            "syntax error: top-level statements are not allowed when func main is declared"
        );
    }

    #[test]
    fn test_more_errors() {
        assert_eq!(more_errors(&1), "");
        assert_eq!(more_errors(&2), " (and 1 more error)");
        assert_eq!(more_errors(&5), " (and 4 more errors)");
    }
}
