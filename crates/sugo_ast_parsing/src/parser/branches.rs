//! Checks the targets of `break`, `continue`, `goto` and `fallthrough` statements and the
//! use of labels within a function body.

use super::error::ErrorKind;
use super::{Handler, Parser};
use indexmap::IndexMap;
use std::ptr;
use sugo_ast::decl::Decl;
use sugo_ast::expr::Expr;
use sugo_ast::stmt::{AssignOp, BlockStmt, BranchStmt, LabeledStmt, Stmt, SwitchStmt};
use sugo_tokens::pos::{Pos, Positioned};
use sugo_tokens::token::Token;
use tracing::trace;

impl<H: Handler + ?Sized> Parser<'_, H> {
    /// Reports every misplaced branch statement and every undefined or unused label of `body`.
    pub(super) fn check_branches(&mut self, body: &BlockStmt) {
        for (pos, msg) in branch_errors(body) {
            self.error_at(pos, ErrorKind::Invalid(msg));
        }
    }
}

/// Finds the branch errors of a function body, in the order they are discovered.
pub(crate) fn branch_errors(body: &BlockStmt) -> Vec<(Pos, String)> {
    let mut scope = LabelScope::default();
    let fwd_gotos = scope.block_branches(None, Targets::default(), None, body.pos(), &body.stmts);

    // Forward gotos left over never found their label: it is either undefined or inside a
    // block the goto cannot jump into.
    for fwd in fwd_gotos {
        let Some(name) = &fwd.label else { continue };
        let name = name.value();
        match scope.labels.get_mut(name) {
            Some(label) => {
                label.used = true;
                let start = scope.blocks[label.block].start.clone();
                scope.err(
                    label_pos(fwd),
                    format!("goto {name} jumps into block starting at {start}"),
                );
            }
            None => scope.err(label_pos(fwd), format!("label {name} not defined")),
        }
    }

    let unused = scope
        .labels
        .values()
        .filter(|label| !label.used)
        .map(|label| {
            let name = &label.stmt.label;
            (name.pos(), format!("label {} defined and not used", name.value()))
        })
        .collect::<Vec<_>>();
    scope.errors.extend(unused);
    scope.errors
}

fn label_pos(branch: &BranchStmt) -> Pos {
    branch
        .label
        .as_ref()
        .map_or_else(|| branch.pos(), |label| label.pos())
}

#[derive(Default)]
struct LabelScope<'a> {
    /// All labels declared in the function
    labels: IndexMap<&'a str, Label<'a>>,
    blocks: Vec<Block<'a>>,
    errors: Vec<(Pos, String)>,
}

struct Label<'a> {
    /// The block containing the declaration
    block: usize,
    stmt: &'a LabeledStmt,
    used: bool,
}

struct Block<'a> {
    parent: Option<usize>,
    start: Pos,
    /// The labeled statement this block belongs to
    label: Option<&'a LabeledStmt>,
}

/// The statements a branch without a label may refer to
#[derive(Default, Clone, Copy)]
struct Targets<'a> {
    breaks: Option<BreakTarget<'a>>,
    continues: bool,
    /// Index of the case clause in the immediately enclosing switch
    case_index: Option<usize>,
}

#[derive(Clone, Copy)]
enum BreakTarget<'a> {
    Loop,
    Switch(&'a SwitchStmt),
    Select,
}

impl<'a> LabelScope<'a> {
    fn err(&mut self, pos: Pos, msg: String) {
        trace!("branch error at {pos}: {msg}");
        self.errors.push((pos, msg));
    }

    fn declare(&mut self, block: usize, stmt: &'a LabeledStmt) {
        let name = stmt.label.value();
        if let Some(alt) = self.labels.get(name) {
            let msg = format!("label {name} already defined at {}", alt.stmt.label.pos());
            self.err(stmt.label.pos(), msg);
            return;
        }
        self.labels.insert(
            name,
            Label {
                block,
                stmt,
                used: false,
            },
        );
    }

    /// The labeled statement named `name` that is declared in `block` or one of its parents.
    fn goto_target(&mut self, block: usize, name: &str) -> Option<&'a LabeledStmt> {
        let label = self.labels.get_mut(name)?;
        label.used = true;
        let mut b = Some(block);
        while let Some(i) = b {
            if label.block == i {
                return Some(label.stmt);
            }
            b = self.blocks[i].parent;
        }
        None
    }

    /// The innermost enclosing statement labeled `name`. `Some(None)` means the label exists
    /// but does not label an enclosing statement.
    fn enclosing_target(&mut self, block: usize, name: &str) -> Option<Option<&'a LabeledStmt>> {
        let label = self.labels.get_mut(name)?;
        label.used = true;
        let mut b = Some(block);
        while let Some(i) = b {
            if self.blocks[i].label.is_some_and(|l| ptr::eq(l, label.stmt)) {
                return Some(Some(label.stmt));
            }
            b = self.blocks[i].parent;
        }
        Some(None)
    }

    /// Checks the statements of a block and returns the gotos whose label has not been seen
    /// yet.
    fn block_branches(
        &mut self,
        parent: Option<usize>,
        ctxt: Targets<'a>,
        label: Option<&'a LabeledStmt>,
        start: Pos,
        body: &'a [Stmt],
    ) -> Vec<&'a BranchStmt> {
        let b = self.blocks.len();
        self.blocks.push(Block {
            parent,
            start,
            label,
        });

        let mut var_decl: Option<Pos> = None;
        let mut fwd_gotos: Vec<&'a BranchStmt> = vec![];
        let mut bad_gotos: Vec<&'a BranchStmt> = vec![];

        for (index, stmt) in body.iter().enumerate() {
            let mut lstmt = None;
            let mut stmt = stmt;
            while let Stmt::Labeled(s) = stmt {
                if !s.label.is_blank() {
                    let name = s.label.value();
                    self.declare(b, s);
                    let mut resolved = false;
                    let mut remaining = vec![];
                    for fwd in fwd_gotos.drain(..) {
                        if fwd.label.as_ref().is_some_and(|l| l.value() == name) {
                            resolved = true;
                            if let Some(var_pos) = &var_decl {
                                if bad_gotos.iter().any(|bad| ptr::eq(*bad, fwd)) {
                                    self.err(
                                        label_pos(fwd),
                                        format!(
                                            "goto {name} jumps over variable declaration at line {}",
                                            var_pos.rel_line()
                                        ),
                                    );
                                }
                            }
                        } else {
                            remaining.push(fwd);
                        }
                    }
                    fwd_gotos = remaining;
                    if resolved {
                        if let Some(l) = self.labels.get_mut(name) {
                            l.used = true;
                        }
                    }
                    lstmt = Some(s);
                }
                stmt = s.stmt.as_ref();
            }

            let inner = |breaks, continues| Targets {
                breaks,
                continues,
                case_index: None,
            };
            match stmt {
                Stmt::Decl(s) => {
                    if let Some(pos) = s.decls.iter().find_map(|d| match d {
                        Decl::Var(v) => Some(v.pos()),
                        _ => None,
                    }) {
                        var_decl = Some(pos);
                        bad_gotos.clone_from(&fwd_gotos);
                    }
                }
                Stmt::Assign(s) if s.op == AssignOp::Define => {
                    var_decl = Some(s.pos());
                    bad_gotos.clone_from(&fwd_gotos);
                }
                Stmt::Branch(s) => {
                    if let Some(fwd) = self.branch(b, ctxt, s, index + 1 == body.len()) {
                        fwd_gotos.push(fwd);
                    }
                }
                Stmt::Block(s) => {
                    let ctxt = inner(ctxt.breaks, ctxt.continues);
                    fwd_gotos.extend(self.block_branches(Some(b), ctxt, lstmt, s.pos(), &s.stmts));
                }
                Stmt::If(s) => {
                    let ctxt = inner(ctxt.breaks, ctxt.continues);
                    fwd_gotos.extend(self.block_branches(
                        Some(b),
                        ctxt,
                        lstmt,
                        s.then.pos(),
                        &s.then.stmts,
                    ));
                    if let Some(els) = &s.els {
                        fwd_gotos.extend(self.block_branches(
                            Some(b),
                            ctxt,
                            lstmt,
                            els.pos(),
                            std::slice::from_ref(els.as_ref()),
                        ));
                    }
                }
                Stmt::For(s) => {
                    let ctxt = inner(Some(BreakTarget::Loop), true);
                    fwd_gotos.extend(self.block_branches(
                        Some(b),
                        ctxt,
                        lstmt,
                        s.body.pos(),
                        &s.body.stmts,
                    ));
                }
                Stmt::Switch(s) => {
                    for (i, clause) in s.body.iter().enumerate() {
                        let ctxt = Targets {
                            breaks: Some(BreakTarget::Switch(s)),
                            continues: ctxt.continues,
                            case_index: Some(i),
                        };
                        fwd_gotos.extend(self.block_branches(
                            Some(b),
                            ctxt,
                            lstmt,
                            clause.pos(),
                            &clause.body,
                        ));
                    }
                }
                Stmt::Select(s) => {
                    let ctxt = inner(Some(BreakTarget::Select), ctxt.continues);
                    for clause in &s.body {
                        fwd_gotos.extend(self.block_branches(
                            Some(b),
                            ctxt,
                            lstmt,
                            clause.pos(),
                            &clause.body,
                        ));
                    }
                }
                _ => {}
            }
        }
        fwd_gotos
    }

    /// Checks a branch statement. Returns the statement if it is a goto to a label that has
    /// not been declared yet.
    fn branch(
        &mut self,
        block: usize,
        ctxt: Targets<'a>,
        s: &'a BranchStmt,
        last_in_block: bool,
    ) -> Option<&'a BranchStmt> {
        let Some(label) = &s.label else {
            match s.tok {
                Token::Break if ctxt.breaks.is_none() => {
                    self.err(s.pos(), "break is not in a loop, switch, or select".to_string());
                }
                Token::Continue if !ctxt.continues => {
                    self.err(s.pos(), "continue is not in a loop".to_string());
                }
                Token::Fallthrough => {
                    if let Some(msg) = fallthrough_error(ctxt, last_in_block) {
                        self.err(s.pos(), msg.to_string());
                    }
                }
                _ => {}
            }
            return None;
        };

        let name = label.value();
        match s.tok {
            Token::Break => match self.enclosing_target(block, name) {
                Some(Some(t)) => {
                    if !matches!(*t.stmt, Stmt::For(_) | Stmt::Switch(_) | Stmt::Select(_)) {
                        self.err(label.pos(), format!("invalid break label {name}"));
                    }
                }
                Some(None) => self.err(label.pos(), format!("invalid break label {name}")),
                None => self.err(label.pos(), format!("break label not defined: {name}")),
            },
            Token::Continue => match self.enclosing_target(block, name) {
                Some(Some(t)) => {
                    if !matches!(*t.stmt, Stmt::For(_)) {
                        self.err(label.pos(), format!("invalid continue label {name}"));
                    }
                }
                Some(None) => self.err(label.pos(), format!("invalid continue label {name}")),
                None => self.err(label.pos(), format!("continue label not defined: {name}")),
            },
            Token::Goto => {
                if self.goto_target(block, name).is_none() {
                    // the label may be declared later
                    return Some(s);
                }
            }
            _ => {}
        }
        None
    }
}

fn fallthrough_error(ctxt: Targets, last_in_block: bool) -> Option<&'static str> {
    let Some(BreakTarget::Switch(switch)) = ctxt.breaks else {
        return Some("fallthrough statement out of place");
    };
    if matches!(switch.tag, Some(Expr::TypeSwitchGuard(_))) {
        return Some("cannot fallthrough in type switch");
    }
    match ctxt.case_index {
        // nested in a block or not the last statement of the clause
        None => Some("fallthrough statement out of place"),
        Some(_) if !last_in_block => Some("fallthrough statement out of place"),
        Some(i) if i + 1 == switch.body.len() => Some("cannot fallthrough final case in switch"),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tests_support::parse_ok;
    use test_log::test;

    fn check(body: &str) -> Vec<String> {
        let file = parse_ok(&format!("package main\nfunc f() {{\n{body}\n}}\n"));
        let f = file.funcs().next().expect("func");
        branch_errors(f.body.as_ref().expect("body"))
            .into_iter()
            .map(|(pos, msg)| format!("{}:{}: {msg}", pos.line(), pos.col()))
            .collect()
    }

    #[test]
    fn test_valid_branches() {
        assert!(check("L:\n\tfor {\n\t\tbreak L\n\t}").is_empty());
        assert!(check("for {\n\tcontinue\n}").is_empty());
        assert!(check("goto L\nL:\n\tprintln()").is_empty());
        assert!(check("switch x {\ncase 1:\n\tfallthrough\ncase 2:\n}").is_empty());
        assert!(check("select {\ndefault:\n\tbreak\n}").is_empty());
    }

    #[test]
    fn test_misplaced_branches() {
        assert_eq!(check("break"), ["3:1: break is not in a loop, switch, or select"]);
        assert_eq!(check("switch {\ndefault:\n\tcontinue\n}"), ["5:2: continue is not in a loop"]);
        assert_eq!(check("fallthrough"), ["3:1: fallthrough statement out of place"]);
        assert_eq!(
            check("switch x {\ncase 1:\n\tfallthrough\n}"),
            ["5:2: cannot fallthrough final case in switch"]
        );
        assert_eq!(
            check("switch x.(type) {\ncase int:\n\tfallthrough\ncase string:\n}"),
            ["5:2: cannot fallthrough in type switch"]
        );
    }

    #[test]
    fn test_labels() {
        assert_eq!(check("L:\n\tprintln()"), ["3:1: label L defined and not used"]);
        assert_eq!(check("goto M"), ["3:6: label M not defined"]);
        assert_eq!(
            check("L:\n\tfor {\n\t\tbreak L\n\t}\nL:\n\tfor {\n\t\tbreak L\n\t}"),
            [
                "7:1: label L already defined at test.sugo:3:1",
                "9:9: invalid break label L"
            ]
        );
        assert_eq!(
            check("L:\n\tprintln()\nfor {\n\tbreak L\n}"),
            ["6:8: invalid break label L"]
        );
        assert_eq!(check("for {\n\tcontinue M\n}"), ["4:11: continue label not defined: M"]);
    }

    #[test]
    fn test_goto_into_block() {
        assert_eq!(
            check("goto L\n{\nL:\n\tprintln()\n}"),
            ["3:6: goto L jumps into block starting at test.sugo:4:1"]
        );
    }

    #[test]
    fn test_goto_over_variable() {
        assert_eq!(
            check("goto L\nx := 1\n_ = x\nL:\n\tprintln()"),
            ["3:6: goto L jumps over variable declaration at line 4"]
        );
    }
}
