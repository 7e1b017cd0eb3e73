use std::io::Write;
use std::sync::Arc;
use sugo_ast::decl::Decl;
use sugo_ast_parsing::parser::error::{ParseFileError, SyntaxError};
use sugo_ast_parsing::parser::{Handler, Mode};
use sugo_ast_parsing::{parse_file, parse_source};
use sugo_tokens::pos::{Pos, PosBase};
use tempfile::NamedTempFile;
use test_log::test;

#[derive(Default)]
struct Recorder {
    errors: Vec<String>,
    pragmas: Vec<String>,
    bases: Vec<String>,
}

impl Handler for Recorder {
    fn on_error(&mut self, error: &SyntaxError) {
        self.errors.push(error.to_string());
    }

    fn on_pragma(&mut self, _pos: &Pos, text: &str) -> bool {
        self.pragmas.push(text.to_string());
        text == "go:noinline"
    }

    fn on_line_directive(&mut self, base: &Arc<PosBase>) {
        self.bases.push(format!("{}:{}", base.filename(), base.line()));
    }
}

#[test]
fn parse_from_disk() {
    let mut file = NamedTempFile::new().expect("temp file");
    writeln!(file, "package main\n\nimport \"fmt\"\n\nfmt.Println(\"hi\")").expect("write");

    let mut errors: Vec<SyntaxError> = vec![];
    let parsed = parse_file(file.path(), &mut errors, Mode::STRICT).expect("parsed");
    assert!(errors.is_empty());
    assert!(parsed.imports_path("fmt"));
    assert!(parsed.entry_point().is_some());
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut errors: Vec<SyntaxError> = vec![];
    let result = parse_file(&dir.path().join("missing.sugo"), &mut errors, Mode::default());
    assert!(matches!(result, Err(ParseFileError::Io(_))));
}

#[test]
fn failure_keeps_the_partial_file() {
    let mut errors: Vec<SyntaxError> = vec![];
    let failure = parse_source(
        "bad.sugo",
        b"package main\nvar x = )\nfunc f() {}\n",
        &mut errors,
        Mode::default(),
    )
    .expect_err("syntax errors");
    assert_eq!(failure.count, errors.len());
    assert_eq!(failure.first, errors[0]);
    assert_eq!(
        failure.first.to_string(),
        "bad.sugo:2:9: syntax error: unexpected ), expected expression"
    );
    assert!(failure.partial.funcs().any(|f| f.name.value() == "f"));
}

#[test]
fn line_directives_move_positions() {
    let mut handler = Recorder::default();
    let _ = parse_source(
        "gen.sugo",
        b"package main\n//line original.sugo:10\nvar x = )\n",
        &mut handler,
        Mode::default(),
    );
    assert_eq!(handler.bases, ["original.sugo:10"]);
    assert_eq!(
        handler.errors.first().map(String::as_str),
        Some("original.sugo:10: syntax error: unexpected ), expected expression")
    );
}

#[test]
fn pragmas_attach_to_the_next_declaration() {
    let mut handler = Recorder::default();
    let file = parse_source(
        "pragmas.sugo",
        b"package main\n\n//go:noinline\n//go:ignored\nfunc f() {}\n",
        &mut handler,
        Mode::default(),
    )
    .expect("no errors");
    assert_eq!(handler.pragmas, ["go:noinline", "go:ignored"]);
    let Some(Decl::Func(f)) = file.decls.first() else {
        panic!("expected a function");
    };
    assert_eq!(
        f.pragmas.iter().map(|p| p.text.as_str()).collect::<Vec<_>>(),
        ["go:noinline"]
    );
}

#[test]
fn strict_mode_checks_function_bodies() {
    let src = b"package main\nfunc f() {\nL:\n\tfor {\n\t}\n\tcontinue\n}\n";
    let mut errors: Vec<SyntaxError> = vec![];
    let _ = parse_source("strict.sugo", src, &mut errors, Mode::STRICT);
    let messages = errors.iter().map(|e| e.to_string()).collect::<Vec<_>>();
    assert_eq!(
        messages,
        [
            "strict.sugo:6:2: continue is not in a loop",
            "strict.sugo:3:1: label L defined and not used"
        ]
    );

    errors.clear();
    assert!(parse_source("lenient.sugo", src, &mut errors, Mode::default()).is_ok());
}
