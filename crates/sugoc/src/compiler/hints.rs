//! Shallow type hints for simple names.
//!
//! A name is hinted when it is assigned a literal, as in `n := 3` or `a, s = 1, "x"`. Only
//! statements inside function bodies are looked at. There is no notion of scope or control
//! flow: the last assignment in source order wins, even if it is in another function, a
//! branch that never runs, or shadows an outer variable. Passes must treat hints as a guess.

use indexmap::IndexMap;
use std::convert::Infallible;
use sugo_ast::decl::Decl;
use sugo_ast::expr::Expr;
use sugo_ast::stmt::{AssignOp, Stmt};
use sugo_ast::visitor::{visit_stmt, Visitor};
use sugo_ast::File;
use sugo_tokens::token::LitKind;
use tracing::trace;

/// The guessed type of a name
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Hint {
    Int,
    String,
}

/// Hints for the names of a single file
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Hints {
    hints: IndexMap<String, Hint>,
}

impl Hints {
    /// Collects the hints of every function body of `file`
    pub fn collect(file: &File) -> Self {
        let mut collector = Collector::default();
        for decl in &file.decls {
            if let Decl::Func(func) = decl {
                if let Some(body) = &func.body {
                    infallible(collector.visit_block_stmt(body));
                }
            }
        }
        collector.hints
    }

    pub fn get(&self, name: &str) -> Option<Hint> {
        self.hints.get(name).copied()
    }

    /// Whether `name` is guessed to be an integer
    pub fn is_int(&self, name: &str) -> bool {
        self.get(name) == Some(Hint::Int)
    }

    pub fn len(&self) -> usize {
        self.hints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }

    /// The hinted names in the order they were first assigned
    pub fn iter(&self) -> impl Iterator<Item = (&str, Hint)> {
        self.hints.iter().map(|(name, hint)| (name.as_str(), *hint))
    }

    fn record(&mut self, name: &str, kind: LitKind) {
        let hint = match kind {
            LitKind::Int => Hint::Int,
            LitKind::String => Hint::String,
            _ => {
                // the latest assignment is not something we can hint
                self.hints.shift_remove(name);
                return;
            }
        };
        trace!("hinting {name} as {hint:?}");
        self.hints.insert(name.to_string(), hint);
    }
}

fn infallible(result: Result<(), Infallible>) {
    match result {
        Ok(()) => {}
        Err(never) => match never {},
    }
}

#[derive(Default)]
struct Collector {
    hints: Hints,
}

impl Visitor for Collector {
    type Err = Infallible;

    fn visit_stmt(&mut self, stmt: &Stmt) -> Result<(), Self::Err> {
        if let Stmt::Assign(assign) = stmt {
            if let (AssignOp::Assign | AssignOp::Define, Some(rhs)) = (assign.op, &assign.rhs) {
                let lhs = assign.lhs.unpack_list();
                let rhs = rhs.unpack_list();
                let literals = rhs
                    .iter()
                    .map(Expr::as_basic_lit)
                    .collect::<Option<Vec<_>>>();
                if let Some(literals) = literals.filter(|lits| lits.len() == lhs.len()) {
                    for (name, lit) in lhs.iter().zip(literals) {
                        match name.as_name() {
                            Some(name) if !name.is_blank() => {
                                self.hints.record(name.value(), lit.kind)
                            }
                            _ => {}
                        }
                    }
                }
            }
        }
        visit_stmt(self, stmt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sugo_ast_parsing::parse_source;
    use sugo_ast_parsing::parser::error::SyntaxError;
    use sugo_ast_parsing::parser::Mode;
    use test_log::test;

    fn hints(src: &str) -> Hints {
        let mut errors: Vec<SyntaxError> = vec![];
        let file = parse_source("hints.sugo", src.as_bytes(), &mut errors, Mode::default())
            .expect("no errors");
        Hints::collect(&file)
    }

    #[test]
    fn test_literal_assignments() {
        let hints = hints("n := 1\ns := \"x\"\na, b = 2, `y`\nf := 1.5\n");
        assert_eq!(hints.get("n"), Some(Hint::Int));
        assert_eq!(hints.get("s"), Some(Hint::String));
        assert_eq!(hints.get("a"), Some(Hint::Int));
        assert_eq!(hints.get("b"), Some(Hint::String));
        assert_eq!(hints.get("f"), None);
        assert_eq!(hints.len(), 4);
    }

    #[test]
    fn test_only_literal_lists_of_equal_length() {
        let hints = hints("a, b := 1, f()\nc := d\n_ = 3\n");
        assert!(hints.is_empty());
    }

    #[test]
    fn test_last_assignment_wins() {
        let shadowed = hints("n := 1\nif true {\n\tn := \"shadow\"\n\t_ = n\n}\n");
        assert_eq!(shadowed.get("n"), Some(Hint::String));

        let reassigned = hints("n := \"a\"\nn = 2\nn = 2.5\n");
        assert_eq!(reassigned.get("n"), None);
    }

    #[test]
    fn test_package_level_variables_are_ignored() {
        let hints = hints("package main\nvar n = 1\nfunc main() {\n\tm := 2\n\t_ = m\n}\n");
        assert!(!hints.is_int("n"));
        assert!(hints.is_int("m"));
    }

    #[test]
    fn test_nested_function_literals() {
        let hints = hints("package main\nfunc main() {\n\tf := func() {\n\t\tk := 1\n\t\t_ = k\n\t}\n\tf()\n}\n");
        assert!(hints.is_int("k"));
    }
}
