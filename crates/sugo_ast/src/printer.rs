//! Renders syntax trees back into source text.
//!
//! The output is plain Go. Sugar has already been lowered by the time a tree exists, so a
//! printed tree is what the rest of the toolchain would see. Formatting is close to, but not
//! the same as, `gofmt`: consecutive parameters of the same type are not merged and blank
//! lines are only placed between top level declarations.

use crate::decl::*;
use crate::expr::*;
use crate::file::File;
use crate::stmt::*;
use std::fmt::{self, Display, Formatter, Write};
use std::sync::Arc;
use sugo_tokens::token::{Operator, Prec, Token};

/// Writes source text into any [fmt::Write]
pub struct Printer<'a, W: Write + ?Sized> {
    out: &'a mut W,
    indent: usize,
}

impl<'a, W: Write + ?Sized> Printer<'a, W> {
    pub fn new(out: &'a mut W) -> Self {
        Self { out, indent: 0 }
    }

    fn newline(&mut self) -> fmt::Result {
        self.out.write_char('\n')?;
        for _ in 0..self.indent {
            self.out.write_char('\t')?;
        }
        Ok(())
    }

    fn list<T>(
        &mut self,
        items: &[T],
        sep: &str,
        mut each: impl FnMut(&mut Self, &T) -> fmt::Result,
    ) -> fmt::Result {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.write_str(sep)?;
            }
            each(self, item)?;
        }
        Ok(())
    }

    pub fn file(&mut self, file: &File) -> fmt::Result {
        write!(self.out, "package {}", file.pkg_name.value())?;
        let mut rest = file.decls.as_slice();
        while !rest.is_empty() {
            self.out.write_char('\n')?;
            self.newline()?;
            let n = self.decl_group(rest)?;
            rest = &rest[n..];
        }
        if !file.top_level.is_empty() {
            self.out.write_char('\n')?;
            for stmt in &file.top_level {
                self.newline()?;
                self.stmt(stmt)?;
            }
        }
        self.out.write_char('\n')
    }

    /// Prints the first declaration of `decls` together with all following declarations of
    /// the same group. Returns how many declarations were printed.
    fn decl_group(&mut self, decls: &[Decl]) -> Result<usize, fmt::Error> {
        let Some(group) = decls[0].group() else {
            self.decl(&decls[0], true)?;
            return Ok(1);
        };
        let n = decls
            .iter()
            .take_while(|d| d.group().is_some_and(|g| Arc::ptr_eq(g, group)))
            .count();
        write!(self.out, "{} (", decl_keyword(&decls[0]))?;
        self.indent += 1;
        for decl in &decls[..n] {
            self.newline()?;
            self.decl(decl, false)?;
        }
        self.indent -= 1;
        self.newline()?;
        self.out.write_char(')')?;
        Ok(n)
    }

    pub fn decl(&mut self, decl: &Decl, keyword: bool) -> fmt::Result {
        if keyword && !matches!(decl, Decl::Func(_)) {
            write!(self.out, "{} ", decl_keyword(decl))?;
        }
        match decl {
            Decl::Import(import) => {
                if let Some(name) = &import.local_pkg_name {
                    write!(self.out, "{} ", name.value())?;
                }
                self.out.write_str(&import.path.value)
            }
            Decl::Const(ConstDecl {
                names, ty, values, ..
            })
            | Decl::Var(VarDecl {
                names, ty, values, ..
            }) => {
                self.list(names, ", ", |p, n| p.out.write_str(n.value()))?;
                if let Some(ty) = ty {
                    self.out.write_char(' ')?;
                    self.expr(ty)?;
                }
                if let Some(values) = values {
                    self.out.write_str(" = ")?;
                    self.expr(values)?;
                }
                Ok(())
            }
            Decl::Type(t) => {
                self.out.write_str(t.name.value())?;
                if !t.tparams.is_empty() {
                    self.out.write_char('[')?;
                    self.fields(&t.tparams)?;
                    self.out.write_char(']')?;
                }
                self.out.write_str(if t.alias { " = " } else { " " })?;
                self.expr(&t.ty)
            }
            Decl::Func(f) => {
                self.out.write_str("func ")?;
                if let Some(recv) = &f.recv {
                    self.out.write_char('(')?;
                    self.field(recv)?;
                    self.out.write_str(") ")?;
                }
                self.out.write_str(f.name.value())?;
                if !f.tparams.is_empty() {
                    self.out.write_char('[')?;
                    self.fields(&f.tparams)?;
                    self.out.write_char(']')?;
                }
                self.signature(&f.ty)?;
                if let Some(body) = &f.body {
                    self.out.write_char(' ')?;
                    self.block(body)?;
                }
                Ok(())
            }
        }
    }

    fn field(&mut self, field: &Field) -> fmt::Result {
        if let Some(name) = &field.name {
            write!(self.out, "{} ", name.value())?;
        }
        self.expr(&field.ty)
    }

    fn fields(&mut self, fields: &[Field]) -> fmt::Result {
        self.list(fields, ", ", |p, f| p.field(f))
    }

    /// `(params) results`
    fn signature(&mut self, ty: &FuncType) -> fmt::Result {
        self.out.write_char('(')?;
        self.fields(&ty.params)?;
        self.out.write_char(')')?;
        match ty.results.as_slice() {
            [] => Ok(()),
            [single] if single.name.is_none() => {
                self.out.write_char(' ')?;
                self.expr(&single.ty)
            }
            results => {
                self.out.write_str(" (")?;
                self.fields(results)?;
                self.out.write_char(')')
            }
        }
    }

    pub fn block(&mut self, block: &BlockStmt) -> fmt::Result {
        self.stmts_in_braces(&block.stmts)
    }

    fn stmts_in_braces(&mut self, stmts: &[Stmt]) -> fmt::Result {
        if stmts.is_empty() {
            return self.out.write_str("{}");
        }
        self.out.write_char('{')?;
        self.indent += 1;
        self.stmt_lines(stmts)?;
        self.indent -= 1;
        self.newline()?;
        self.out.write_char('}')
    }

    fn stmt_lines(&mut self, stmts: &[Stmt]) -> fmt::Result {
        for stmt in stmts {
            self.newline()?;
            self.stmt(stmt)?;
        }
        Ok(())
    }

    pub fn stmt(&mut self, stmt: &Stmt) -> fmt::Result {
        match stmt {
            Stmt::Empty(_) => Ok(()),
            Stmt::Labeled(l) => {
                write!(self.out, "{}: ", l.label.value())?;
                self.stmt(&l.stmt)
            }
            Stmt::Block(b) => self.block(b),
            Stmt::Expr(e) => self.expr(&e.x),
            Stmt::Send(s) => {
                self.expr(&s.chan)?;
                self.out.write_str(" <- ")?;
                self.expr(&s.value)
            }
            Stmt::Decl(d) => {
                let mut rest = d.decls.as_slice();
                while !rest.is_empty() {
                    if rest.len() != d.decls.len() {
                        self.newline()?;
                    }
                    let n = self.decl_group(rest)?;
                    rest = &rest[n..];
                }
                Ok(())
            }
            Stmt::Assign(a) => self.assign(a),
            Stmt::Branch(b) => {
                self.out.write_str(b.tok.as_str())?;
                if let Some(label) = &b.label {
                    write!(self.out, " {}", label.value())?;
                }
                Ok(())
            }
            Stmt::Call(c) => {
                write!(self.out, "{} ", c.tok.as_str())?;
                self.expr(&c.call)
            }
            Stmt::Return(r) => {
                self.out.write_str("return")?;
                if let Some(results) = &r.results {
                    self.out.write_char(' ')?;
                    self.expr(results)?;
                }
                Ok(())
            }
            Stmt::If(i) => self.if_stmt(i),
            Stmt::For(f) => {
                self.out.write_str("for ")?;
                match (&f.init, &f.cond, &f.post) {
                    (Some(init), None, None) if matches!(**init, Stmt::Range(_)) => {
                        self.stmt(init)?;
                        self.out.write_char(' ')?;
                    }
                    (None, None, None) => {}
                    (None, Some(cond), None) => {
                        self.expr(cond)?;
                        self.out.write_char(' ')?;
                    }
                    (init, cond, post) => {
                        if let Some(init) = init {
                            self.stmt(init)?;
                        }
                        self.out.write_str("; ")?;
                        if let Some(cond) = cond {
                            self.expr(cond)?;
                        }
                        self.out.write_str("; ")?;
                        if let Some(post) = post {
                            self.stmt(post)?;
                            self.out.write_char(' ')?;
                        }
                    }
                }
                self.block(&f.body)
            }
            Stmt::Switch(s) => {
                self.out.write_str("switch ")?;
                if let Some(init) = &s.init {
                    self.stmt(init)?;
                    self.out.write_str("; ")?;
                }
                if let Some(tag) = &s.tag {
                    self.expr(tag)?;
                    self.out.write_char(' ')?;
                }
                self.out.write_char('{')?;
                for clause in &s.body {
                    self.newline()?;
                    match &clause.cases {
                        Some(cases) => {
                            self.out.write_str("case ")?;
                            self.expr(cases)?;
                            self.out.write_char(':')?;
                        }
                        None => self.out.write_str("default:")?,
                    }
                    self.clause_body(&clause.body)?;
                }
                self.newline()?;
                self.out.write_char('}')
            }
            Stmt::Select(s) => {
                self.out.write_str("select {")?;
                for clause in &s.body {
                    self.newline()?;
                    match &clause.comm {
                        Some(comm) => {
                            self.out.write_str("case ")?;
                            self.stmt(comm)?;
                            self.out.write_char(':')?;
                        }
                        None => self.out.write_str("default:")?,
                    }
                    self.clause_body(&clause.body)?;
                }
                self.newline()?;
                self.out.write_char('}')
            }
            Stmt::Range(r) => {
                if let Some(lhs) = &r.lhs {
                    self.expr(lhs)?;
                    self.out.write_str(if r.def { " := " } else { " = " })?;
                }
                self.out.write_str("range ")?;
                self.expr(&r.x)
            }
        }
    }

    fn clause_body(&mut self, body: &[Stmt]) -> fmt::Result {
        self.indent += 1;
        self.stmt_lines(body)?;
        self.indent -= 1;
        Ok(())
    }

    fn if_stmt(&mut self, i: &IfStmt) -> fmt::Result {
        self.out.write_str("if ")?;
        if let Some(init) = &i.init {
            self.stmt(init)?;
            self.out.write_str("; ")?;
        }
        self.expr(&i.cond)?;
        self.out.write_char(' ')?;
        self.block(&i.then)?;
        match i.els.as_deref() {
            Some(Stmt::If(elif)) => {
                self.out.write_str(" else ")?;
                self.if_stmt(elif)
            }
            Some(els) => {
                self.out.write_str(" else ")?;
                self.stmt(els)
            }
            None => Ok(()),
        }
    }

    fn assign(&mut self, a: &AssignStmt) -> fmt::Result {
        self.expr(&a.lhs)?;
        match (a.op, &a.rhs) {
            (AssignOp::Op(Operator::Add), None) => self.out.write_str("++"),
            (AssignOp::Op(Operator::Sub), None) => self.out.write_str("--"),
            (op, rhs) => {
                match op {
                    AssignOp::Assign => self.out.write_str(" = ")?,
                    AssignOp::Define => self.out.write_str(" := ")?,
                    AssignOp::Op(op) => write!(self.out, " {op}= ")?,
                }
                match rhs {
                    Some(rhs) => self.expr(rhs),
                    None => Ok(()),
                }
            }
        }
    }

    pub fn expr(&mut self, expr: &Expr) -> fmt::Result {
        match expr {
            Expr::Bad(_) => self.out.write_str("BadExpr"),
            Expr::Name(name) => self.out.write_str(name.value()),
            Expr::BasicLit(lit) => self.out.write_str(&lit.value),
            Expr::CompositeLit(lit) => {
                if let Some(ty) = &lit.ty {
                    self.expr(ty)?;
                }
                self.out.write_char('{')?;
                self.list(&lit.elems, ", ", |p, e| p.expr(e))?;
                self.out.write_char('}')
            }
            Expr::KeyValue(kv) => {
                self.expr(&kv.key)?;
                self.out.write_str(": ")?;
                self.expr(&kv.value)
            }
            Expr::FuncLit(f) => {
                self.out.write_str("func")?;
                self.signature(&f.ty)?;
                self.out.write_char(' ')?;
                self.block(&f.body)
            }
            Expr::Paren(p) => {
                self.out.write_char('(')?;
                self.expr(&p.x)?;
                self.out.write_char(')')
            }
            Expr::Selector(s) => {
                self.expr(&s.x)?;
                write!(self.out, ".{}", s.sel.value())
            }
            Expr::Index(i) => {
                self.expr(&i.x)?;
                self.out.write_char('[')?;
                self.expr(&i.index)?;
                self.out.write_char(']')
            }
            Expr::Slice(s) => {
                self.expr(&s.x)?;
                self.out.write_char('[')?;
                let n = if s.full { 3 } else { 2 };
                for (i, index) in s.index.iter().take(n).enumerate() {
                    if i > 0 {
                        self.out.write_char(':')?;
                    }
                    if let Some(index) = index {
                        self.expr(index)?;
                    }
                }
                self.out.write_char(']')
            }
            Expr::Assert(a) => {
                self.expr(&a.x)?;
                self.out.write_str(".(")?;
                self.expr(&a.ty)?;
                self.out.write_char(')')
            }
            Expr::TypeSwitchGuard(g) => {
                if let Some(lhs) = &g.lhs {
                    write!(self.out, "{} := ", lhs.value())?;
                }
                self.expr(&g.x)?;
                self.out.write_str(".(type)")
            }
            Expr::Operation(op) => self.operation(op),
            Expr::Call(c) => {
                self.expr(&c.fun)?;
                self.out.write_char('(')?;
                self.list(&c.args, ", ", |p, e| p.expr(e))?;
                if c.has_dots {
                    self.out.write_str("...")?;
                }
                self.out.write_char(')')
            }
            Expr::List(l) => self.list(&l.elems, ", ", |p, e| p.expr(e)),
            Expr::ArrayType(a) => {
                self.out.write_char('[')?;
                match &a.len {
                    Some(len) => self.expr(len)?,
                    None => self.out.write_str("...")?,
                }
                self.out.write_char(']')?;
                self.expr(&a.elem)
            }
            Expr::SliceType(s) => {
                self.out.write_str("[]")?;
                self.expr(&s.elem)
            }
            Expr::DotsType(d) => {
                self.out.write_str("...")?;
                self.expr(&d.elem)
            }
            Expr::StructType(s) => {
                if s.fields.is_empty() {
                    return self.out.write_str("struct{}");
                }
                self.out.write_str("struct {")?;
                for (i, field) in s.fields.iter().enumerate() {
                    self.out.write_str(if i == 0 { " " } else { "; " })?;
                    self.field(field)?;
                    if let Some(Some(tag)) = s.tags.get(i) {
                        write!(self.out, " {}", tag.value)?;
                    }
                }
                self.out.write_str(" }")
            }
            Expr::FuncType(f) => {
                self.out.write_str("func")?;
                self.signature(f)
            }
            Expr::InterfaceType(i) => {
                if i.methods.is_empty() {
                    return self.out.write_str("interface{}");
                }
                self.out.write_str("interface {")?;
                for (n, method) in i.methods.iter().enumerate() {
                    self.out.write_str(if n == 0 { " " } else { "; " })?;
                    match (&method.name, &method.ty) {
                        (Some(name), Expr::FuncType(sig)) => {
                            self.out.write_str(name.value())?;
                            self.signature(sig)?;
                        }
                        _ => self.field(method)?,
                    }
                }
                self.out.write_str(" }")
            }
            Expr::MapType(m) => {
                self.out.write_str("map[")?;
                self.expr(&m.key)?;
                self.out.write_char(']')?;
                self.expr(&m.value)
            }
            Expr::ChanType(c) => {
                self.out.write_str(match c.dir {
                    ChanDir::Both => "chan ",
                    ChanDir::SendOnly => "chan<- ",
                    ChanDir::RecvOnly => "<-chan ",
                })?;
                self.expr(&c.elem)
            }
        }
    }

    fn operation(&mut self, op: &Operation) -> fmt::Result {
        let Some(y) = &op.y else {
            self.out.write_str(op.op.as_str())?;
            return self.operand(&op.x, Prec::Mul, true);
        };
        let prec = op.op.precedence();
        self.operand(&op.x, prec, false)?;
        write!(self.out, " {} ", op.op)?;
        self.operand(y, prec, true)
    }

    /// Prints `x`, parenthesized if it is a binary operation that binds less tightly than its
    /// parent.
    fn operand(&mut self, x: &Expr, parent: Prec, right: bool) -> fmt::Result {
        let needs_parens = match x {
            Expr::Operation(Operation {
                op, y: Some(_), ..
            }) => {
                let prec = op.precedence();
                prec < parent || (right && prec == parent)
            }
            _ => false,
        };
        if needs_parens {
            self.out.write_char('(')?;
            self.expr(x)?;
            self.out.write_char(')')
        } else {
            self.expr(x)
        }
    }
}

fn decl_keyword(decl: &Decl) -> &'static str {
    match decl {
        Decl::Import(_) => Token::Import.as_str(),
        Decl::Const(_) => Token::Const.as_str(),
        Decl::Type(_) => Token::Type.as_str(),
        Decl::Var(_) => Token::Var.as_str(),
        Decl::Func(_) => Token::Func.as_str(),
    }
}

macro_rules! display {
    ($($ty:ty => $method:ident),* $(,)?) => {
        $(
        impl Display for $ty {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                Printer::new(f).$method(self)
            }
        }
        )*
    };
}

display! {
    File => file,
    Stmt => stmt,
    Expr => expr,
    BlockStmt => block,
}

impl Display for Decl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Printer::new(f).decl(self, true)
    }
}
