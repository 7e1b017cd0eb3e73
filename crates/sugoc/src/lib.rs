#![doc = include_str!("../README.md")]

pub mod compiler;
pub use compiler::{BuildSugoCError, SugoC, SugoCBuilder, Unit};
pub use compiler::error::{SugoCError, SugoCErrorKind, SugoCResult};
