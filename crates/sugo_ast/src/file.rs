//! The root of a parsed source file

use crate::decl::{Decl, FuncDecl, ImportDecl, Pragma};
use crate::expr::Name;
use crate::stmt::Stmt;
use log::debug;
use std::sync::Arc;
use sugo_tokens::pos::{Pos, Positioned as _};

/// A parsed source file
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub(crate) pos: Pos,
    pub pragmas: Vec<Pragma>,
    pub pkg_name: Arc<Name>,
    pub decls: Vec<Decl>,
    /// Statements found outside of any function that have not been moved into an entry point
    pub top_level: Vec<Stmt>,
    eof: Pos,
}

impl File {
    pub fn new(pos: Pos, pkg_name: Arc<Name>, decls: Vec<Decl>, eof: Pos) -> Self {
        Self {
            pos,
            pragmas: vec![],
            pkg_name,
            decls,
            top_level: vec![],
            eof,
        }
    }

    pub fn eof(&self) -> &Pos {
        &self.eof
    }

    /// Whether this file belongs to the entry package
    pub fn is_main_package(&self) -> bool {
        self.pkg_name.value() == crate::ENTRY_PACKAGE
    }

    pub fn imports(&self) -> impl Iterator<Item = &ImportDecl> {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Import(import) => Some(import),
            _ => None,
        })
    }

    pub fn funcs(&self) -> impl Iterator<Item = &FuncDecl> {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Func(func) => Some(func),
            _ => None,
        })
    }

    pub fn funcs_mut(&mut self) -> impl Iterator<Item = &mut FuncDecl> {
        self.decls.iter_mut().filter_map(|decl| match decl {
            Decl::Func(func) => Some(func),
            _ => None,
        })
    }

    /// Finds the `func main()` of this file
    pub fn entry_point(&self) -> Option<&FuncDecl> {
        self.funcs().find(|f| f.is_entry_point())
    }

    /// Whether `path` is imported under its own package name, so that `<name>.X` resolves
    /// to it.
    pub fn imports_path(&self, path: &str) -> bool {
        let default_name = path.rsplit('/').next().unwrap_or(path);
        self.imports().any(|import| {
            import.path.unquoted() == Some(path)
                && import
                    .local_pkg_name
                    .as_ref()
                    .map_or(true, |name| name.value() == default_name)
        })
    }

    /// Adds `import "path"` after the last import of this file. Does nothing if the path is
    /// already imported under its own name. Returns whether an import was added.
    pub fn add_import(&mut self, path: &str) -> bool {
        if self.imports_path(path) {
            return false;
        }
        let index = self
            .decls
            .iter()
            .rposition(|decl| matches!(decl, Decl::Import(_)))
            .map_or(0, |i| i + 1);
        let pos = self.pkg_name.pos();
        debug!("adding import {path:?} to package {}", self.pkg_name.value());
        let import = ImportDecl::new(
            pos.clone(),
            None,
            None,
            crate::expr::BasicLit::string(pos, path),
        );
        self.decls.insert(index, import.into());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::BasicLit;
    use sugo_tokens::pos::{PosBase, Positioned};
    use test_log::test;

    fn file() -> File {
        let base = PosBase::file("t.sugo");
        let pos = Pos::new(base.clone(), 1, 1);
        File::new(
            pos.clone(),
            Arc::new(Name::new(Pos::new(base.clone(), 1, 9), "main")),
            vec![],
            Pos::new(base, 3, 1),
        )
    }

    #[test]
    fn test_add_import_once() {
        let mut file = file();
        assert!(file.add_import("fmt"));
        assert!(!file.add_import("fmt"));
        assert_eq!(file.imports().count(), 1);
        assert!(file.imports_path("fmt"));
    }

    #[test]
    fn test_aliased_import_does_not_count() {
        let mut file = file();
        let pos = file.pkg_name.pos();
        file.decls.push(
            ImportDecl::new(
                pos.clone(),
                None,
                Some(Arc::new(Name::new(pos.clone(), "f"))),
                BasicLit::string(pos, "fmt"),
            )
            .into(),
        );
        assert!(!file.imports_path("fmt"));
        assert!(file.add_import("fmt"));
        assert_eq!(file.imports().count(), 2);
    }

    #[test]
    fn test_import_inserted_after_existing_imports() {
        let mut file = file();
        file.add_import("os");
        let pos = file.pkg_name.pos();
        file.decls.push(
            crate::decl::VarDecl::new(pos.clone(), None, vec![Arc::new(Name::new(pos, "x"))], None, None)
                .into(),
        );
        file.add_import("fmt");
        assert!(matches!(&file.decls[1], Decl::Import(i) if i.path.value == "\"fmt\""));
        assert!(matches!(&file.decls[2], Decl::Var(_)));
    }
}
