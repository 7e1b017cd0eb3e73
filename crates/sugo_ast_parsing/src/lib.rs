#![doc = include_str!("../README.md")]

use crate::parser::error::{ParseFailure, ParseFileError};
use crate::parser::{Handler, Mode, Parser};
use std::fs;
use std::path::Path;
use sugo_ast::File;
use tracing::instrument;

pub mod lexer;
pub mod parser;

/// Parses a source file held in memory.
///
/// Errors are passed to `handler` as they are found. If there was any, the partially parsed
/// file is returned inside the [ParseFailure].
pub fn parse_source<H: Handler + ?Sized>(
    filename: &str,
    src: &[u8],
    handler: &mut H,
    mode: Mode,
) -> Result<File, ParseFailure> {
    Parser::new(filename, src, handler, mode).parse()
}

/// Reads and parses the file at `path`.
#[instrument(skip(handler))]
pub fn parse_file<H: Handler + ?Sized>(
    path: &Path,
    handler: &mut H,
    mode: Mode,
) -> Result<File, ParseFileError> {
    let src = fs::read(path)?;
    let filename = path.to_string_lossy();
    Ok(parse_source(&filename, &src, handler, mode)?)
}
