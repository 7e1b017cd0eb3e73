//! A sugoc error

use itertools::Itertools as _;
use std::io;
use std::path::PathBuf;
use sugo_ast_parsing::parser::error::SyntaxError;
use sugo_tokens::pos::Pos;
use sugo_tokens::PosError;
use thiserror::Error;

/// The kind of error
#[derive(Debug, Error)]
pub enum SugoCErrorKind {
    #[error(transparent)]
    Io(#[from] io::Error),
    /// A file had syntax errors. Holds every error that was reported, in source order.
    #[error("{} has {} syntax error(s):\n{}", .path.display(), .diagnostics.len(), .diagnostics.iter().join("\n"))]
    Parse {
        path: PathBuf,
        diagnostics: Vec<SyntaxError>,
    },
    #[error("{}", .0.iter().join("\n"))]
    Multi(Vec<SugoCError>),
}

/// An error occurred while processing sugo files
#[derive(Debug, Error)]
#[error(transparent)]
pub struct SugoCError(PosError<SugoCErrorKind, SugoCError>);

impl SugoCError {
    /// Creates a new [SugoCError] using a quick constructor
    #[inline]
    pub fn new(
        error: impl Into<SugoCErrorKind>,
        location: impl Into<Option<Pos>>,
        caused_by: impl Into<Option<SugoCError>>,
    ) -> Self {
        Self(PosError::new(error.into(), location.into(), caused_by.into()))
    }

    pub fn kind(&self) -> &SugoCErrorKind {
        self.0.error()
    }

    pub fn location(&self) -> Option<&Pos> {
        self.0.location()
    }

    /// Every syntax error carried by this error, including those of nested errors
    pub fn diagnostics(&self) -> Vec<(&PathBuf, &SyntaxError)> {
        match self.kind() {
            SugoCErrorKind::Io(_) => vec![],
            SugoCErrorKind::Parse { path, diagnostics } => {
                diagnostics.iter().map(|d| (path, d)).collect()
            }
            SugoCErrorKind::Multi(errors) => {
                errors.iter().flat_map(|e| e.diagnostics()).collect()
            }
        }
    }
}

impl<T> From<T> for SugoCError
where
    SugoCErrorKind: From<T>,
{
    fn from(value: T) -> Self {
        Self::new(SugoCErrorKind::from(value), None, None)
    }
}

impl From<Vec<SugoCError>> for SugoCErrorKind {
    fn from(value: Vec<SugoCError>) -> Self {
        SugoCErrorKind::Multi(value)
    }
}

/// A type alias for general results in sugoc
pub type SugoCResult<T> = Result<T, SugoCError>;

#[cfg(test)]
mod tests {
    use super::*;
    use sugo_ast_parsing::parser::error::ErrorKind;
    use sugo_tokens::pos::PosBase;

    #[test]
    fn test_multi_lists_every_error() {
        let pos = Pos::new(PosBase::file("a.sugo"), 1, 2);
        let parse = SugoCError::from(SugoCErrorKind::Parse {
            path: PathBuf::from("a.sugo"),
            diagnostics: vec![SyntaxError::new(ErrorKind::Syntax("unexpected x".into()), pos)],
        });
        let io = SugoCError::from(io::Error::new(io::ErrorKind::NotFound, "b.sugo not found"));
        let multi = SugoCError::from(vec![parse, io]);
        assert_eq!(
            multi.to_string(),
            "a.sugo has 1 syntax error(s):\na.sugo:1:2: syntax error: unexpected x\nb.sugo not found"
        );
        assert_eq!(multi.diagnostics().len(), 1);
    }
}
