use sugo_ast::File;
use sugo_ast_parsing::parse_source;
use sugo_ast_parsing::parser::error::{ErrorKind, SugarError, SyntaxError};
use sugo_ast_parsing::parser::Mode;
use test_log::test;

fn parse(src: &str) -> Result<File, Vec<SyntaxError>> {
    let mut errors: Vec<SyntaxError> = vec![];
    match parse_source("sugar.sugo", src.as_bytes(), &mut errors, Mode::STRICT) {
        Ok(file) => Ok(file),
        Err(_) => Err(errors),
    }
}

fn print(src: &str) -> String {
    parse(src).expect("no errors").to_string()
}

#[test]
fn one_indexed_access_is_zero_indexed_minus_one() {
    assert_eq!(
        print("package p\nvar z = []int{1}\nvar a = z#1\n"),
        print("package p\nvar z = []int{1}\nvar a = z[1-1]\n")
    );
    assert_eq!(
        print("package p\nvar a = z#1\n"),
        "package p\n\nvar a = z[1 - 1]\n"
    );
}

#[test]
fn hash_at_start_of_line_is_a_comment() {
    let src = "package p\n# the values\nvar z = [3, 4]\nvar a = z # 2 // trailing comment\n";
    assert_eq!(
        print(src),
        "package p\n\nvar z = []any{3, 4}\n\nvar a = z[2 - 1]\n"
    );
}

#[test]
fn enum_lowering() {
    assert_eq!(
        print("package main\n\nenum Color {\n\tRed\n\tGreen\n}\n"),
        "package main\n\n\
         type Color int\n\n\
         const (\n\tRed Color = 0\n\tGreen Color = 1\n)\n\n\
         func (v Color) String() string {\n\treturn [2]string{\"Red\", \"Green\"}[v]\n}\n"
    );
}

#[test]
fn empty_enum_is_an_error() {
    let errors = parse("package main\nenum Empty {}\n").expect_err("empty enum");
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].error_kind(),
        &ErrorKind::Sugar(SugarError::EmptyEnum {
            name: "Empty".to_string()
        })
    );
    assert_eq!(errors[0].pos().map(|p| (p.line(), p.col())), Some((2, 1)));
}

#[test]
fn map_literal_forms_are_equivalent() {
    let expected = print("package p\nvar m = map[any]any{\"a\": 1, \"b\": []any{2}}\n");
    for form in [
        "{a: 1, b: [2]}",
        "map{a: 1, b: [2]}",
        "map[a: 1 b: [2]]",
        "map[\n\ta: 1\n\tb: [2]\n]",
        "{\"a\": 1, \"b\": [2]}",
    ] {
        assert_eq!(print(&format!("package p\nvar m = {form}\n")), expected, "{form}");
    }
}

#[test]
fn map_types_are_not_sugar() {
    assert_eq!(
        print("package p\nvar m = make(map[string]int)\n"),
        "package p\n\nvar m = make(map[string]int)\n"
    );
}

#[test]
fn sequence_literals() {
    assert_eq!(
        print("package p\nvar s = [1, \"two\", [3]]\nvar e = []\nvar t = []string{}\nvar a = [2]int{}\n"),
        "package p\n\nvar s = []any{1, \"two\", []any{3}}\n\nvar e = []any{}\n\n\
         var t = []string{}\n\nvar a = [2]int{}\n"
    );
}

#[test]
fn top_level_statements_become_main() {
    let file = parse("x := 1\nif x > 0 {\n\tprintln(x)\n}\n").expect("no errors");
    assert!(file.is_main_package());
    assert!(file.top_level.is_empty());
    assert_eq!(
        file.to_string(),
        "package main\n\nfunc main() {\n\tx := 1\n\tif x > 0 {\n\t\tprintln(x)\n\t}\n}\n"
    );
}

#[test]
fn top_level_statements_conflict_with_main() {
    let errors = parse("package main\n\nfunc main() {}\n\nprintln(\"hi\")\n").expect_err("conflict");
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].error_kind(),
        &ErrorKind::Sugar(SugarError::EntryPointConflict)
    );
    assert_eq!(errors[0].pos().map(|p| (p.line(), p.col())), Some((5, 1)));
    let cause = errors[0].kind.cause().expect("cause");
    assert_eq!(cause.pos().map(|p| (p.line(), p.col())), Some((3, 6)));
}

#[test]
fn method_named_main_is_not_an_entry_point() {
    let file = parse("package main\nfunc (s S) main() {}\nprintln(1)\n").expect("no errors");
    assert_eq!(file.funcs().filter(|f| f.is_entry_point()).count(), 1);
}

#[test]
fn main_with_parameters_is_not_an_entry_point() {
    let file = parse("package main\nfunc main(x int) {}\nprintln(1)\n").expect("no errors");
    assert_eq!(file.funcs().filter(|f| f.name.value() == "main").count(), 2);
    let main = file.entry_point().expect("synthesized main");
    assert!(main.ty.params.is_empty());
    assert_eq!(main.body.as_ref().map(|b| b.stmts.len()), Some(1));
}

#[test]
fn shebang_with_implicit_package() {
    let file = parse("#!/usr/bin/env sugo\nprintln(\"hi\")\n").expect("no errors");
    assert_eq!(file.pkg_name.value(), "main");
    assert!(file.entry_point().is_some());
}

#[test]
fn branch_checks_apply_to_top_level_statements() {
    let errors = parse("for {\n}\nbreak\n").expect_err("misplaced break");
    assert_eq!(
        errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>(),
        ["sugar.sugo:3:1: break is not in a loop, switch, or select"]
    );
}
