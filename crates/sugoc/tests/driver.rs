use std::sync::Arc;
use sugo_ast::decl::Decl;
use sugo_ast_parsing::parser::Mode;
use sugoc::compiler::pipeline::Pipeline;
use sugoc::{SugoC, SugoCErrorKind};
use tracing::info;

mod common;

const GREETER: &str = r#"#!/usr/bin/env sugo
import "os"

n := 3
s := "count: " + n
t := n + " left"
println(s, t, os.Args)
"#;

#[test_log::test(tokio::test)]
async fn test_compile_single_file() -> eyre::Result<()> {
    let (_dir, paths) = common::sources(&[("greeter.sugo", GREETER)]);
    let sugoc = SugoC::builder().jobs(1).build()?;
    let unit = sugoc.compile(&paths[0]).await?;
    info!("compiled:\n{}", unit.file);

    assert_eq!(unit.path, paths[0]);
    assert_eq!(unit.report.changed, ["string-coercion"]);
    assert_eq!(unit.report.imports, ["fmt"]);

    let imports = unit
        .file
        .imports()
        .filter_map(|i| i.path.unquoted())
        .collect::<Vec<_>>();
    assert_eq!(imports, ["os", "fmt"]);
    assert!(matches!(unit.file.decls[1], Decl::Import(_)));

    let printed = unit.file.to_string();
    assert!(printed.contains(r#"s := "count: " + fmt.Sprintf("%d", n)"#), "{printed}");
    assert!(printed.contains(r#"t := n + " left""#), "{printed}");
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_pipeline_is_idempotent() -> eyre::Result<()> {
    let (_dir, paths) = common::sources(&[("greeter.sugo", GREETER)]);
    let sugoc = SugoC::builder().build()?;
    let mut unit = sugoc.compile(&paths[0]).await?;

    let before = unit.file.clone();
    let report = Pipeline::standard().run(&mut unit.file);
    assert!(report.is_unchanged(), "{report:?}");
    assert_eq!(unit.file, before);
    assert_eq!(
        unit.file.imports().filter(|i| i.path.unquoted() == Some("fmt")).count(),
        1
    );
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_existing_import_is_reused() -> eyre::Result<()> {
    let src = "import \"fmt\"\nn := 1\nfmt.Println(\"n=\" + n)\n";
    let (_dir, paths) = common::sources(&[("reuse.sugo", src)]);
    let unit = SugoC::builder().build()?.compile(&paths[0]).await?;
    assert_eq!(unit.report.changed, ["string-coercion"]);
    assert!(unit.report.imports.is_empty());
    assert_eq!(unit.file.imports().count(), 1);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_library_packages_are_not_transformed() -> eyre::Result<()> {
    let src = "package lib\n\nfunc Label() string {\n\tn := 2\n\treturn \"n\" + n\n}\n";
    let (_dir, paths) = common::sources(&[("lib.sugo", src)]);
    let unit = SugoC::builder().build()?.compile(&paths[0]).await?;
    assert!(unit.report.is_unchanged());
    assert_eq!(unit.file.imports().count(), 0);
    assert!(unit.file.to_string().contains("return \"n\" + n"));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_units_keep_input_order() -> eyre::Result<()> {
    let files = (0..8)
        .map(|i| (format!("f{i}.sugo"), format!("package p{i}\n")))
        .collect::<Vec<_>>();
    let borrowed = files
        .iter()
        .map(|(name, src)| (name.as_str(), src.as_str()))
        .collect::<Vec<_>>();
    let (_dir, paths) = common::sources(&borrowed);

    let sugoc = SugoC::builder().jobs(3).build()?;
    let units = sugoc.compile_all(paths.clone()).await?;
    let packages = units
        .iter()
        .map(|u| u.file.pkg_name.value().to_string())
        .collect::<Vec<_>>();
    assert_eq!(packages, (0..8).map(|i| format!("p{i}")).collect::<Vec<_>>());
    assert_eq!(units.iter().map(|u| u.path.clone()).collect::<Vec<_>>(), paths);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_every_failure_is_reported() -> eyre::Result<()> {
    let (dir, mut paths) = common::sources(&[
        ("good.sugo", "println(1)\n"),
        ("bad.sugo", "x := (1\ny := 2 +\n"),
        ("empty.sugo", "package e\nenum E {}\n"),
    ]);
    paths.push(dir.path().join("missing.sugo"));

    let error = SugoC::builder()
        .build()?
        .compile_all(paths)
        .await
        .expect_err("three files fail");
    let SugoCErrorKind::Multi(errors) = error.kind() else {
        panic!("expected several errors, got {error}");
    };
    assert_eq!(errors.len(), 3);
    assert!(matches!(errors[0].kind(), SugoCErrorKind::Parse { .. }));
    assert!(matches!(errors[2].kind(), SugoCErrorKind::Io(_)));

    let diagnostics = error.diagnostics();
    assert!(diagnostics.len() >= 2, "{diagnostics:?}");
    assert!(diagnostics[0].0.ends_with("bad.sugo"));
    let last = diagnostics.last().expect("diagnostics");
    assert!(last.0.ends_with("empty.sugo"));
    assert!(last.1.to_string().ends_with("enum E has no members"), "{}", last.1);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_strict_mode_reaches_parser() -> eyre::Result<()> {
    let (_dir, paths) = common::sources(&[("strict.sugo", "continue\n")]);
    let relaxed = SugoC::builder().build()?;
    assert!(relaxed.compile(&paths[0]).await.is_ok());

    let strict = SugoC::builder()
        .mode(Mode::STRICT)
        .pipeline(Arc::new(Pipeline::empty()))
        .build()?;
    let error = strict.compile(&paths[0]).await.expect_err("misplaced continue");
    let diagnostics = error.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert!(
        diagnostics[0].1.to_string().ends_with("continue is not in a loop"),
        "{}",
        diagnostics[0].1
    );
    Ok(())
}
