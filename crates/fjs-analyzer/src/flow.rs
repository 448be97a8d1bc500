//! Control flow analysis: unreachable code and missing returns.
//!
//! Works on the statement tree directly rather than building a CFG; the
//! statement set is structured (no goto, no labeled breaks), so "does this
//! block guarantee exit" is a syntactic predicate.

use fjs_common::{AnalysisIssue, codes};
use fjs_ir::{ClassDecl, ExprKind, FileIr, FunctionDecl, LiteralValue, StmtIr, StmtKind};

#[derive(Debug, Default)]
pub struct FlowAnalyzer {
    issues: Vec<AnalysisIssue>,
}

impl FlowAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn analyze_file(mut self, file: &FileIr) -> Vec<AnalysisIssue> {
        tracing::debug!(file = %file.path, "analyzing control flow");
        for class in &file.classes {
            self.analyze_class(class);
        }
        for function in &file.functions {
            self.analyze_function(function);
        }
        self.issues
    }

    fn analyze_class(&mut self, class: &ClassDecl) {
        for method in &class.methods {
            self.analyze_function(method);
        }
        for ctor in &class.constructors {
            if let Some(body) = &ctor.body {
                self.check_reachability(&body.statements);
            }
        }
    }

    fn analyze_function(&mut self, function: &FunctionDecl) {
        let Some(body) = &function.body else {
            return;
        };
        self.check_reachability(&body.statements);
        self.check_missing_return(function, &body.statements);
    }

    // =========================================================================
    // Unreachable code
    // =========================================================================

    /// Report the first statement after a point where control has provably
    /// left the block. One report per block keeps a long dead tail from
    /// drowning the real finding.
    fn check_reachability(&mut self, stmts: &[StmtIr]) {
        let mut exited = false;
        for stmt in stmts {
            if exited {
                self.issues.push(AnalysisIssue::warning(
                    codes::UNREACHABLE_CODE,
                    format!("unreachable {} statement", stmt.kind_name()),
                    stmt.span.clone(),
                ));
                break;
            }
            self.check_nested_reachability(stmt);
            if guarantees_exit_stmt(stmt) {
                exited = true;
            }
        }
    }

    fn check_nested_reachability(&mut self, stmt: &StmtIr) {
        match &stmt.kind {
            StmtKind::Block(stmts) => self.check_reachability(stmts),
            StmtKind::If {
                then_branch,
                else_branch,
                ..
            } => {
                self.check_reachability(then_branch);
                if let Some(else_branch) = else_branch {
                    self.check_reachability(else_branch);
                }
            }
            StmtKind::For { body, .. }
            | StmtKind::ForIn { body, .. }
            | StmtKind::While { body, .. } => self.check_reachability(body),
            StmtKind::TryCatch {
                body,
                catch_clauses,
                finally_block,
            } => {
                self.check_reachability(body);
                for clause in catch_clauses {
                    self.check_reachability(&clause.body);
                }
                if let Some(finally_block) = finally_block {
                    self.check_reachability(finally_block);
                }
            }
            _ => {}
        }
    }

    // =========================================================================
    // Missing return
    // =========================================================================

    fn check_missing_return(&mut self, function: &FunctionDecl, body: &[StmtIr]) {
        let ret = &function.return_type;
        if ret.is_void() || ret.is_dynamic() {
            return;
        }
        // Async bodies complete into their future without an explicit return;
        // generators produce values through yields; setters return nothing.
        if function.is_async() || function.is_generator() || function.is_setter() {
            return;
        }
        if !block_guarantees_exit(body) {
            self.issues.push(
                AnalysisIssue::error(
                    codes::MISSING_RETURN,
                    format!(
                        "'{}' declares return type {} but can complete without returning",
                        function.name, ret
                    ),
                    function.span.clone(),
                )
                .with_suggestion("add a return statement to every path"),
            );
        }
    }
}

/// Whether a block guarantees that control never falls off its end.
fn block_guarantees_exit(stmts: &[StmtIr]) -> bool {
    stmts.iter().any(guarantees_exit_stmt)
}

fn guarantees_exit_stmt(stmt: &StmtIr) -> bool {
    match &stmt.kind {
        StmtKind::Return(_) | StmtKind::Throw(_) => true,
        // break/continue leave the current block, which is enough for
        // reachability within it.
        StmtKind::Break | StmtKind::Continue => true,
        StmtKind::Block(stmts) => block_guarantees_exit(stmts),
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => match else_branch {
            Some(else_branch) => {
                block_guarantees_exit(then_branch) && block_guarantees_exit(else_branch)
            }
            None => false,
        },
        // `while (true)` without a break never falls through.
        StmtKind::While {
            condition,
            body,
            is_do_while: _,
        } => {
            matches!(
                condition.kind,
                ExprKind::Literal(LiteralValue::Bool(true))
            ) && !contains_break(body)
        }
        StmtKind::TryCatch {
            body,
            catch_clauses,
            finally_block,
        } => {
            let all_paths = block_guarantees_exit(body)
                && catch_clauses
                    .iter()
                    .all(|clause| block_guarantees_exit(&clause.body));
            let finally_exits = finally_block
                .as_ref()
                .is_some_and(|block| block_guarantees_exit(block));
            all_paths || finally_exits
        }
        _ => false,
    }
}

/// Whether the statement list contains a `break` binding to the enclosing
/// loop. Nested loops capture their own breaks.
fn contains_break(stmts: &[StmtIr]) -> bool {
    stmts.iter().any(|stmt| match &stmt.kind {
        StmtKind::Break => true,
        StmtKind::Block(stmts) => contains_break(stmts),
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => {
            contains_break(then_branch)
                || else_branch.as_ref().is_some_and(|b| contains_break(b))
        }
        StmtKind::TryCatch {
            body,
            catch_clauses,
            finally_block,
        } => {
            contains_break(body)
                || catch_clauses.iter().any(|c| contains_break(&c.body))
                || finally_block.as_ref().is_some_and(|b| contains_break(b))
        }
        // While/For/ForIn own their breaks.
        _ => false,
    })
}
