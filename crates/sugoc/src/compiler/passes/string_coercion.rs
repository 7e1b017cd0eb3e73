use crate::compiler::hints::Hints;
use crate::compiler::pipeline::Pass;
use std::convert::Infallible;
use std::sync::Arc;
use sugo_ast::expr::{BasicLit, CallExpr, Expr, Name, Operation, SelectorExpr};
use sugo_ast::visitor::{visit_expr, visit_expr_mut, Visitor, VisitorMut};
use sugo_ast::File;
use sugo_tokens::pos::Positioned;
use sugo_tokens::token::{LitKind, Operator};
use tracing::trace;

const FMT: &str = "fmt";
const SPRINTF: &str = "Sprintf";
const INT_VERB: &str = "%d";

/// Turns `"text" + n`, where `n` is hinted to be an integer, into
/// `"text" + fmt.Sprintf("%d", n)`.
///
/// Only a string literal on the left is recognized, `n + "text"` is left as is.
#[derive(Debug, Default, Copy, Clone)]
pub struct StringCoercion;

impl StringCoercion {
    pub const NAME: &'static str = "string-coercion";
}

/// The integer operand of a concatenation that needs coercion
fn coerced_operand<'a>(op: &'a Operation, hints: &Hints) -> Option<&'a Arc<Name>> {
    if op.op != Operator::Add {
        return None;
    }
    let y = op.y.as_deref()?;
    let is_string = op
        .x
        .as_basic_lit()
        .is_some_and(|lit| lit.kind == LitKind::String);
    if !is_string {
        return None;
    }
    y.as_name().filter(|name| hints.is_int(name.value()))
}

fn sprintf(name: Arc<Name>) -> Expr {
    let pos = name.pos();
    let fun = SelectorExpr::new(
        pos.clone(),
        Expr::name(pos.clone(), FMT),
        Arc::new(Name::new(pos.clone(), SPRINTF)),
    );
    let args = vec![BasicLit::string(pos.clone(), INT_VERB).into(), Expr::Name(name)];
    CallExpr::new(pos, fun.into(), args, false).into()
}

struct Found;

struct Finder<'a> {
    hints: &'a Hints,
}

impl Visitor for Finder<'_> {
    type Err = Found;

    fn visit_expr(&mut self, expr: &Expr) -> Result<(), Self::Err> {
        if let Expr::Operation(op) = expr {
            if coerced_operand(op, self.hints).is_some() {
                return Err(Found);
            }
        }
        visit_expr(self, expr)
    }
}

struct Rewriter<'a> {
    hints: &'a Hints,
    rewrites: usize,
}

impl VisitorMut for Rewriter<'_> {
    type Err = Infallible;

    fn visit_expr_mut(&mut self, expr: &mut Expr) -> Result<(), Self::Err> {
        visit_expr_mut(self, expr)?;
        if let Expr::Operation(op) = expr {
            if let Some(name) = coerced_operand(op, self.hints).cloned() {
                trace!("coercing {} at {}", name.value(), name.pos());
                op.y = Some(Box::new(sprintf(name)));
                self.rewrites += 1;
            }
        }
        Ok(())
    }
}

impl Pass for StringCoercion {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn wants(&self, file: &File, hints: &Hints) -> bool {
        Finder { hints }.visit_file(file).is_err()
    }

    fn required_imports(&self) -> &[&str] {
        &[FMT]
    }

    fn apply(&self, file: &mut File, hints: &Hints) -> bool {
        let mut rewriter = Rewriter { hints, rewrites: 0 };
        match rewriter.visit_file_mut(file) {
            Ok(()) => {}
            Err(never) => match never {},
        }
        rewriter.rewrites > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sugo_ast_parsing::parse_source;
    use sugo_ast_parsing::parser::error::SyntaxError;
    use sugo_ast_parsing::parser::Mode;
    use test_log::test;

    fn parse(src: &str) -> File {
        let mut errors: Vec<SyntaxError> = vec![];
        parse_source("coerce.sugo", src.as_bytes(), &mut errors, Mode::default())
            .expect("no errors")
    }

    fn coerce(src: &str) -> (bool, File) {
        let mut file = parse(src);
        let hints = Hints::collect(&file);
        let wants = StringCoercion.wants(&file, &hints);
        let changed = StringCoercion.apply(&mut file, &hints);
        assert_eq!(wants, changed);
        (changed, file)
    }

    #[test]
    fn test_literal_plus_int() {
        let (changed, file) = coerce("n := 3\ns := \"n = \" + n\n");
        assert!(changed);
        let main = file.entry_point().expect("main");
        let printed = main.body.as_ref().expect("body").to_string();
        assert!(
            printed.contains(r#"s := "n = " + fmt.Sprintf("%d", n)"#),
            "{printed}"
        );
    }

    #[test]
    fn test_int_plus_literal_is_unchanged() {
        let (changed, file) = coerce("n := 3\ns := n + \" apples\"\n");
        assert!(!changed);
        assert_eq!(file, parse("n := 3\ns := n + \" apples\"\n"));
    }

    #[test]
    fn test_only_int_hints() {
        let (changed, _) = coerce("n := \"3\"\ns := \"n = \" + n\n");
        assert!(!changed);
        let (changed, _) = coerce("s := \"n = \" + unknown\n");
        assert!(!changed);
        let (changed, _) = coerce("n := 3\ns := \"n = \" - n\n");
        assert!(!changed);
    }

    #[test]
    fn test_nested_concatenations() {
        let (changed, file) = coerce("a, b := 1, 2\nprintln(\"a\" + a, f(\"b\" + b))\n");
        assert!(changed);
        let printed = file.to_string();
        assert!(printed.contains(r#""a" + fmt.Sprintf("%d", a)"#), "{printed}");
        assert!(printed.contains(r#"f("b" + fmt.Sprintf("%d", b))"#), "{printed}");
    }
}
