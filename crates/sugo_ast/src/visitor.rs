//! Visitors over the syntax tree.
//!
//! [Visitor] walks a tree by reference and [VisitorMut] by mutable reference. Both visit every
//! declaration, statement, field and expression reachable from the node they are started on.

use crate::decl::Decl;
use crate::expr::{Expr, Field};
use crate::file::File;
use crate::stmt::{BlockStmt, Stmt};
use sugo_visitor_gen::{visit, visit_mut};

visit! {
    pub trait Visitor {
        pub visit(v, file: &File) -> Result<()> {
            for decl in &file.decls {
                v.visit_decl(decl)?;
            }
            for stmt in &file.top_level {
                v.visit_stmt(stmt)?;
            }
            Ok(())
        }

        pub visit(v, decl: &Decl) -> Result<()> {
            match decl {
                Decl::Import(_) => {}
                Decl::Const(c) => {
                    if let Some(ty) = &c.ty {
                        v.visit_expr(ty)?;
                    }
                    if let Some(values) = &c.values {
                        v.visit_expr(values)?;
                    }
                }
                Decl::Var(var) => {
                    if let Some(ty) = &var.ty {
                        v.visit_expr(ty)?;
                    }
                    if let Some(values) = &var.values {
                        v.visit_expr(values)?;
                    }
                }
                Decl::Type(t) => {
                    for field in &t.tparams {
                        v.visit_field(field)?;
                    }
                    v.visit_expr(&t.ty)?;
                }
                Decl::Func(f) => {
                    if let Some(recv) = &f.recv {
                        v.visit_field(recv)?;
                    }
                    for field in f.tparams.iter().chain(&f.ty.params).chain(&f.ty.results) {
                        v.visit_field(field)?;
                    }
                    if let Some(body) = &f.body {
                        v.visit_block_stmt(body)?;
                    }
                }
            }
            Ok(())
        }

        pub visit(v, block: &BlockStmt) -> Result<()> {
            for stmt in &block.stmts {
                v.visit_stmt(stmt)?;
            }
            Ok(())
        }

        pub visit(v, stmt: &Stmt) -> Result<()> {
            match stmt {
                Stmt::Empty(_) | Stmt::Branch(_) => {}
                Stmt::Labeled(l) => v.visit_stmt(&l.stmt)?,
                Stmt::Block(b) => v.visit_block_stmt(b)?,
                Stmt::Expr(e) => v.visit_expr(&e.x)?,
                Stmt::Send(s) => {
                    v.visit_expr(&s.chan)?;
                    v.visit_expr(&s.value)?;
                }
                Stmt::Decl(d) => {
                    for decl in &d.decls {
                        v.visit_decl(decl)?;
                    }
                }
                Stmt::Assign(a) => {
                    v.visit_expr(&a.lhs)?;
                    if let Some(rhs) = &a.rhs {
                        v.visit_expr(rhs)?;
                    }
                }
                Stmt::Call(c) => v.visit_expr(&c.call)?,
                Stmt::Return(r) => {
                    if let Some(results) = &r.results {
                        v.visit_expr(results)?;
                    }
                }
                Stmt::If(i) => {
                    if let Some(init) = &i.init {
                        v.visit_stmt(init)?;
                    }
                    v.visit_expr(&i.cond)?;
                    v.visit_block_stmt(&i.then)?;
                    if let Some(els) = &i.els {
                        v.visit_stmt(els)?;
                    }
                }
                Stmt::For(f) => {
                    if let Some(init) = &f.init {
                        v.visit_stmt(init)?;
                    }
                    if let Some(cond) = &f.cond {
                        v.visit_expr(cond)?;
                    }
                    if let Some(post) = &f.post {
                        v.visit_stmt(post)?;
                    }
                    v.visit_block_stmt(&f.body)?;
                }
                Stmt::Switch(s) => {
                    if let Some(init) = &s.init {
                        v.visit_stmt(init)?;
                    }
                    if let Some(tag) = &s.tag {
                        v.visit_expr(tag)?;
                    }
                    for clause in &s.body {
                        if let Some(cases) = &clause.cases {
                            v.visit_expr(cases)?;
                        }
                        for stmt in &clause.body {
                            v.visit_stmt(stmt)?;
                        }
                    }
                }
                Stmt::Select(s) => {
                    for clause in &s.body {
                        if let Some(comm) = &clause.comm {
                            v.visit_stmt(comm)?;
                        }
                        for stmt in &clause.body {
                            v.visit_stmt(stmt)?;
                        }
                    }
                }
                Stmt::Range(r) => {
                    if let Some(lhs) = &r.lhs {
                        v.visit_expr(lhs)?;
                    }
                    v.visit_expr(&r.x)?;
                }
            }
            Ok(())
        }

        pub visit(v, field: &Field) -> Result<()> {
            v.visit_expr(&field.ty)
        }

        pub visit(v, expr: &Expr) -> Result<()> {
            match expr {
                Expr::Bad(_) | Expr::Name(_) | Expr::BasicLit(_) => {}
                Expr::CompositeLit(c) => {
                    if let Some(ty) = &c.ty {
                        v.visit_expr(ty)?;
                    }
                    for elem in &c.elems {
                        v.visit_expr(elem)?;
                    }
                }
                Expr::KeyValue(kv) => {
                    v.visit_expr(&kv.key)?;
                    v.visit_expr(&kv.value)?;
                }
                Expr::FuncLit(f) => {
                    for field in f.ty.params.iter().chain(&f.ty.results) {
                        v.visit_field(field)?;
                    }
                    v.visit_block_stmt(&f.body)?;
                }
                Expr::Paren(p) => v.visit_expr(&p.x)?,
                Expr::Selector(s) => v.visit_expr(&s.x)?,
                Expr::Index(i) => {
                    v.visit_expr(&i.x)?;
                    v.visit_expr(&i.index)?;
                }
                Expr::Slice(s) => {
                    v.visit_expr(&s.x)?;
                    for index in s.index.iter().flatten() {
                        v.visit_expr(index)?;
                    }
                }
                Expr::Assert(a) => {
                    v.visit_expr(&a.x)?;
                    v.visit_expr(&a.ty)?;
                }
                Expr::TypeSwitchGuard(g) => v.visit_expr(&g.x)?,
                Expr::Operation(op) => {
                    v.visit_expr(&op.x)?;
                    if let Some(y) = &op.y {
                        v.visit_expr(y)?;
                    }
                }
                Expr::Call(c) => {
                    v.visit_expr(&c.fun)?;
                    for arg in &c.args {
                        v.visit_expr(arg)?;
                    }
                }
                Expr::List(l) => {
                    for elem in &l.elems {
                        v.visit_expr(elem)?;
                    }
                }
                Expr::ArrayType(a) => {
                    if let Some(len) = &a.len {
                        v.visit_expr(len)?;
                    }
                    v.visit_expr(&a.elem)?;
                }
                Expr::SliceType(s) => v.visit_expr(&s.elem)?,
                Expr::DotsType(d) => v.visit_expr(&d.elem)?,
                Expr::StructType(s) => {
                    for field in &s.fields {
                        v.visit_field(field)?;
                    }
                }
                Expr::FuncType(f) => {
                    for field in f.params.iter().chain(&f.results) {
                        v.visit_field(field)?;
                    }
                }
                Expr::InterfaceType(i) => {
                    for field in &i.methods {
                        v.visit_field(field)?;
                    }
                }
                Expr::MapType(m) => {
                    v.visit_expr(&m.key)?;
                    v.visit_expr(&m.value)?;
                }
                Expr::ChanType(c) => v.visit_expr(&c.elem)?,
            }
            Ok(())
        }
    }
}

visit_mut! {
    pub trait VisitorMut {
        pub visit(v, file: &mut File) -> Result<()> {
            for decl in &mut file.decls {
                v.visit_decl_mut(decl)?;
            }
            for stmt in &mut file.top_level {
                v.visit_stmt_mut(stmt)?;
            }
            Ok(())
        }

        pub visit(v, decl: &mut Decl) -> Result<()> {
            match decl {
                Decl::Import(_) => {}
                Decl::Const(c) => {
                    if let Some(ty) = &mut c.ty {
                        v.visit_expr_mut(ty)?;
                    }
                    if let Some(values) = &mut c.values {
                        v.visit_expr_mut(values)?;
                    }
                }
                Decl::Var(var) => {
                    if let Some(ty) = &mut var.ty {
                        v.visit_expr_mut(ty)?;
                    }
                    if let Some(values) = &mut var.values {
                        v.visit_expr_mut(values)?;
                    }
                }
                Decl::Type(t) => {
                    for field in &mut t.tparams {
                        v.visit_field_mut(field)?;
                    }
                    v.visit_expr_mut(&mut t.ty)?;
                }
                Decl::Func(f) => {
                    if let Some(recv) = &mut f.recv {
                        v.visit_field_mut(recv)?;
                    }
                    for field in f
                        .tparams
                        .iter_mut()
                        .chain(&mut f.ty.params)
                        .chain(&mut f.ty.results)
                    {
                        v.visit_field_mut(field)?;
                    }
                    if let Some(body) = &mut f.body {
                        v.visit_block_stmt_mut(body)?;
                    }
                }
            }
            Ok(())
        }

        pub visit(v, block: &mut BlockStmt) -> Result<()> {
            for stmt in &mut block.stmts {
                v.visit_stmt_mut(stmt)?;
            }
            Ok(())
        }

        pub visit(v, stmt: &mut Stmt) -> Result<()> {
            match stmt {
                Stmt::Empty(_) | Stmt::Branch(_) => {}
                Stmt::Labeled(l) => v.visit_stmt_mut(&mut l.stmt)?,
                Stmt::Block(b) => v.visit_block_stmt_mut(b)?,
                Stmt::Expr(e) => v.visit_expr_mut(&mut e.x)?,
                Stmt::Send(s) => {
                    v.visit_expr_mut(&mut s.chan)?;
                    v.visit_expr_mut(&mut s.value)?;
                }
                Stmt::Decl(d) => {
                    for decl in &mut d.decls {
                        v.visit_decl_mut(decl)?;
                    }
                }
                Stmt::Assign(a) => {
                    v.visit_expr_mut(&mut a.lhs)?;
                    if let Some(rhs) = &mut a.rhs {
                        v.visit_expr_mut(rhs)?;
                    }
                }
                Stmt::Call(c) => v.visit_expr_mut(&mut c.call)?,
                Stmt::Return(r) => {
                    if let Some(results) = &mut r.results {
                        v.visit_expr_mut(results)?;
                    }
                }
                Stmt::If(i) => {
                    if let Some(init) = &mut i.init {
                        v.visit_stmt_mut(init)?;
                    }
                    v.visit_expr_mut(&mut i.cond)?;
                    v.visit_block_stmt_mut(&mut i.then)?;
                    if let Some(els) = &mut i.els {
                        v.visit_stmt_mut(els)?;
                    }
                }
                Stmt::For(f) => {
                    if let Some(init) = &mut f.init {
                        v.visit_stmt_mut(init)?;
                    }
                    if let Some(cond) = &mut f.cond {
                        v.visit_expr_mut(cond)?;
                    }
                    if let Some(post) = &mut f.post {
                        v.visit_stmt_mut(post)?;
                    }
                    v.visit_block_stmt_mut(&mut f.body)?;
                }
                Stmt::Switch(s) => {
                    if let Some(init) = &mut s.init {
                        v.visit_stmt_mut(init)?;
                    }
                    if let Some(tag) = &mut s.tag {
                        v.visit_expr_mut(tag)?;
                    }
                    for clause in &mut s.body {
                        if let Some(cases) = &mut clause.cases {
                            v.visit_expr_mut(cases)?;
                        }
                        for stmt in &mut clause.body {
                            v.visit_stmt_mut(stmt)?;
                        }
                    }
                }
                Stmt::Select(s) => {
                    for clause in &mut s.body {
                        if let Some(comm) = &mut clause.comm {
                            v.visit_stmt_mut(comm)?;
                        }
                        for stmt in &mut clause.body {
                            v.visit_stmt_mut(stmt)?;
                        }
                    }
                }
                Stmt::Range(r) => {
                    if let Some(lhs) = &mut r.lhs {
                        v.visit_expr_mut(lhs)?;
                    }
                    v.visit_expr_mut(&mut r.x)?;
                }
            }
            Ok(())
        }

        pub visit(v, field: &mut Field) -> Result<()> {
            v.visit_expr_mut(&mut field.ty)
        }

        pub visit(v, expr: &mut Expr) -> Result<()> {
            match expr {
                Expr::Bad(_) | Expr::Name(_) | Expr::BasicLit(_) => {}
                Expr::CompositeLit(c) => {
                    if let Some(ty) = &mut c.ty {
                        v.visit_expr_mut(ty)?;
                    }
                    for elem in &mut c.elems {
                        v.visit_expr_mut(elem)?;
                    }
                }
                Expr::KeyValue(kv) => {
                    v.visit_expr_mut(&mut kv.key)?;
                    v.visit_expr_mut(&mut kv.value)?;
                }
                Expr::FuncLit(f) => {
                    for field in f.ty.params.iter_mut().chain(&mut f.ty.results) {
                        v.visit_field_mut(field)?;
                    }
                    v.visit_block_stmt_mut(&mut f.body)?;
                }
                Expr::Paren(p) => v.visit_expr_mut(&mut p.x)?,
                Expr::Selector(s) => v.visit_expr_mut(&mut s.x)?,
                Expr::Index(i) => {
                    v.visit_expr_mut(&mut i.x)?;
                    v.visit_expr_mut(&mut i.index)?;
                }
                Expr::Slice(s) => {
                    v.visit_expr_mut(&mut s.x)?;
                    for index in s.index.iter_mut().flatten() {
                        v.visit_expr_mut(index)?;
                    }
                }
                Expr::Assert(a) => {
                    v.visit_expr_mut(&mut a.x)?;
                    v.visit_expr_mut(&mut a.ty)?;
                }
                Expr::TypeSwitchGuard(g) => v.visit_expr_mut(&mut g.x)?,
                Expr::Operation(op) => {
                    v.visit_expr_mut(&mut op.x)?;
                    if let Some(y) = &mut op.y {
                        v.visit_expr_mut(y)?;
                    }
                }
                Expr::Call(c) => {
                    v.visit_expr_mut(&mut c.fun)?;
                    for arg in &mut c.args {
                        v.visit_expr_mut(arg)?;
                    }
                }
                Expr::List(l) => {
                    for elem in &mut l.elems {
                        v.visit_expr_mut(elem)?;
                    }
                }
                Expr::ArrayType(a) => {
                    if let Some(len) = &mut a.len {
                        v.visit_expr_mut(len)?;
                    }
                    v.visit_expr_mut(&mut a.elem)?;
                }
                Expr::SliceType(s) => v.visit_expr_mut(&mut s.elem)?,
                Expr::DotsType(d) => v.visit_expr_mut(&mut d.elem)?,
                Expr::StructType(s) => {
                    for field in &mut s.fields {
                        v.visit_field_mut(field)?;
                    }
                }
                Expr::FuncType(f) => {
                    for field in f.params.iter_mut().chain(&mut f.results) {
                        v.visit_field_mut(field)?;
                    }
                }
                Expr::InterfaceType(i) => {
                    for field in &mut i.methods {
                        v.visit_field_mut(field)?;
                    }
                }
                Expr::MapType(m) => {
                    v.visit_expr_mut(&mut m.key)?;
                    v.visit_expr_mut(&mut m.value)?;
                }
                Expr::ChanType(c) => v.visit_expr_mut(&mut c.elem)?,
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{BasicLit, Operation};
    use crate::stmt::ExprStmt;
    use std::convert::Infallible;
    use sugo_tokens::pos::{Pos, PosBase};
    use sugo_tokens::token::Operator;

    struct CountLits(usize);

    impl Visitor for CountLits {
        type Err = Infallible;

        fn visit_expr(&mut self, expr: &Expr) -> Result<(), Self::Err> {
            if let Expr::BasicLit(_) = expr {
                self.0 += 1;
            }
            visit_expr(self, expr)
        }
    }

    struct Negate;

    impl VisitorMut for Negate {
        type Err = Infallible;

        fn visit_expr_mut(&mut self, expr: &mut Expr) -> Result<(), Self::Err> {
            if let Expr::Operation(op) = expr {
                op.op = Operator::Sub;
            }
            visit_expr_mut(self, expr)
        }
    }

    #[test]
    fn test_walks_nested_operations() {
        let pos = Pos::new(PosBase::file("t"), 1, 1);
        let inner = Operation::binary(
            pos.clone(),
            Operator::Add,
            BasicLit::int(pos.clone(), 1).into(),
            BasicLit::int(pos.clone(), 2).into(),
        );
        let outer = Operation::binary(
            pos.clone(),
            Operator::Add,
            inner.into(),
            BasicLit::int(pos.clone(), 3).into(),
        );
        let mut stmt: Stmt = ExprStmt::new(pos, outer.into()).into();

        let mut count = CountLits(0);
        count.visit_stmt(&stmt).unwrap();
        assert_eq!(count.0, 3);

        Negate.visit_stmt_mut(&mut stmt).unwrap();
        let Stmt::Expr(ExprStmt { x: Expr::Operation(outer), .. }) = &stmt else {
            panic!("expected an operation");
        };
        assert_eq!(outer.op, Operator::Sub);
        assert!(matches!(&*outer.x, Expr::Operation(inner) if inner.op == Operator::Sub));
    }
}
