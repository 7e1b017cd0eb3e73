#![doc = include_str!("../README.md")]

pub mod decl;
pub mod expr;
pub mod file;
pub mod positions;
pub mod printer;
pub mod stmt;
pub mod visitor;

pub use file::File;

/// The name of the function that top level statements are collected into
pub const ENTRY_POINT: &str = "main";

/// The package name assumed when a file has no package clause
pub const ENTRY_PACKAGE: &str = "main";
