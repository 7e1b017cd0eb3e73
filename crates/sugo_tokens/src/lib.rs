//! Positions, tokens and operators shared by the sugo front end.

use crate::pos::Pos;
use std::fmt::{Display, Formatter};

pub mod keywords;
pub mod pos;
pub mod token;

/// An error with an optional location and cause
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub struct PosError<E, C> {
    error: E,
    location: Option<Pos>,
    cause: Option<Box<C>>,
}

impl<E, C> PosError<E, C> {
    pub fn new(error: E, location: impl Into<Option<Pos>>, cause: impl Into<Option<C>>) -> Self {
        Self {
            error,
            location: location.into(),
            cause: cause.into().map(Box::new),
        }
    }

    pub fn error(&self) -> &E {
        &self.error
    }

    pub fn location(&self) -> Option<&Pos> {
        self.location.as_ref()
    }

    pub fn cause(&self) -> Option<&C> {
        self.cause.as_deref()
    }
}

impl<E: Display, C: Display> Display for PosError<E, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{location}: {}", self.error)?,
            None => write!(f, "{}", self.error)?,
        }
        if let Some(cause) = &self.cause {
            write!(f, "\ncaused by: {cause}")?;
        }
        Ok(())
    }
}
