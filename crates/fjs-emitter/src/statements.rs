//! Statement emission.
//!
//! Mostly 1:1 with JS. The exceptions: cascade expression statements become
//! a temp-var statement sequence instead of an IIFE, and Dart's typed
//! `on Type catch` clauses merge into one JS catch with an instanceof
//! chain that rethrows anything unmatched.

use crate::precedence;
use crate::printer::JsEmitter;
use fjs_ir::{CatchClause, ExprKind, StmtIr, StmtKind};

impl JsEmitter {
    pub(crate) fn emit_stmt(&mut self, stmt: &StmtIr) {
        match &stmt.kind {
            StmtKind::Block(stmts) => {
                self.line("{");
                self.increase_indent();
                for s in stmts {
                    self.emit_stmt(s);
                }
                self.decrease_indent();
                self.line("}");
            }

            StmtKind::If { .. } => {
                self.emit_if(stmt);
                self.write_line();
            }

            StmtKind::For {
                init,
                condition,
                update,
                body,
            } => {
                self.write("for (");
                match init {
                    Some(init) => self.emit_inline_stmt(init),
                    None => {}
                }
                self.write("; ");
                if let Some(condition) = condition {
                    self.emit_expr(condition, precedence::ASSIGN);
                }
                self.write("; ");
                if let Some(update) = update {
                    self.emit_expr(update, precedence::ASSIGN);
                }
                self.write(") ");
                self.emit_body(body);
                self.write_line();
            }

            StmtKind::ForIn {
                variable,
                iterable,
                body,
            } => {
                self.write("for (const ");
                self.write(variable);
                self.write(" of ");
                self.emit_expr(iterable, precedence::ASSIGN);
                self.write(") ");
                self.emit_body(body);
                self.write_line();
            }

            StmtKind::While {
                condition,
                body,
                is_do_while,
            } => {
                if *is_do_while {
                    self.write("do ");
                    self.emit_body(body);
                    self.write(" while (");
                    self.emit_expr(condition, precedence::ASSIGN);
                    self.line(");");
                } else {
                    self.write("while (");
                    self.emit_expr(condition, precedence::ASSIGN);
                    self.write(") ");
                    self.emit_body(body);
                    self.write_line();
                }
            }

            StmtKind::Return(value) => match value {
                Some(value) => {
                    self.write("return ");
                    self.emit_expr(value, precedence::ASSIGN);
                    self.line(";");
                }
                None => self.line("return;"),
            },

            StmtKind::Break => self.line("break;"),
            StmtKind::Continue => self.line("continue;"),

            StmtKind::Throw(value) => {
                self.write("throw ");
                self.emit_expr(value, precedence::ASSIGN);
                self.line(";");
            }

            StmtKind::TryCatch {
                body,
                catch_clauses,
                finally_block,
            } => {
                self.write("try ");
                self.emit_body(body);
                if !catch_clauses.is_empty() {
                    self.emit_catches(catch_clauses);
                }
                if let Some(finally_block) = finally_block {
                    self.write(" finally ");
                    self.emit_body(finally_block);
                }
                self.write_line();
            }

            StmtKind::VariableDecl {
                name,
                initializer,
                is_final,
                is_const,
                ..
            } => {
                self.write(if *is_final || *is_const { "const " } else { "let " });
                self.write(name);
                if let Some(init) = initializer {
                    self.write(" = ");
                    self.emit_expr(init, precedence::ASSIGN);
                }
                self.line(";");
            }

            StmtKind::ExpressionStmt(expr) => {
                // Statement-position cascades get a readable temp sequence
                // instead of the expression-position IIFE.
                if let ExprKind::Cascade { target, sections } = &expr.kind {
                    let temp = self.fresh_temp();
                    self.write(&format!("const {temp} = "));
                    self.emit_expr(target, precedence::ASSIGN);
                    self.line(";");
                    for section in sections {
                        self.emit_cascade_section(&temp, section);
                        self.write_line();
                    }
                } else {
                    self.emit_expr(expr, 0);
                    self.line(";");
                }
            }
        }
    }

    /// `if`/`else if` chain; leaves the cursor after the final `}`.
    fn emit_if(&mut self, stmt: &StmtIr) {
        let StmtKind::If {
            condition,
            then_branch,
            else_branch,
        } = &stmt.kind
        else {
            return;
        };
        self.write("if (");
        self.emit_expr(condition, precedence::ASSIGN);
        self.write(") ");
        self.emit_body(then_branch);
        if let Some(else_branch) = else_branch {
            self.write(" else ");
            // Collapse `else { if ... }` into `else if ...`.
            if let [only] = else_branch.as_slice() {
                if matches!(only.kind, StmtKind::If { .. }) {
                    self.emit_if(only);
                    return;
                }
            }
            self.emit_body(else_branch);
        }
    }

    /// A braced body; leaves the cursor after the closing `}`.
    pub(crate) fn emit_body(&mut self, stmts: &[StmtIr]) {
        if stmts.is_empty() {
            self.write("{}");
            return;
        }
        self.write("{");
        self.write_line();
        self.increase_indent();
        for stmt in stmts {
            self.emit_stmt(stmt);
        }
        self.decrease_indent();
        self.write("}");
    }

    /// A statement inside a `for (...)` header: no trailing `;` or newline.
    fn emit_inline_stmt(&mut self, stmt: &StmtIr) {
        match &stmt.kind {
            StmtKind::VariableDecl {
                name,
                initializer,
                is_final,
                is_const,
                ..
            } => {
                self.write(if *is_final || *is_const { "const " } else { "let " });
                self.write(name);
                if let Some(init) = initializer {
                    self.write(" = ");
                    self.emit_expr(init, precedence::ASSIGN);
                }
            }
            StmtKind::ExpressionStmt(expr) => self.emit_expr(expr, 0),
            _ => self.unsupported(stmt.kind_name(), &stmt.span, "in a for-loop header"),
        }
    }

    /// Dart allows several typed catch clauses; JS allows one catch. Merge
    /// into one binding with an instanceof chain, rethrowing what nothing
    /// matched.
    fn emit_catches(&mut self, clauses: &[CatchClause]) {
        let binding = clauses
            .iter()
            .find_map(|c| c.exception_var.clone())
            .unwrap_or_else(|| "e".to_string());

        if let [only] = clauses {
            if only.exception_type.is_none() {
                self.write(&format!(" catch ({binding}) "));
                self.emit_body(&only.body);
                return;
            }
        }

        self.write(&format!(" catch ({binding}) "));
        self.write("{");
        self.write_line();
        self.increase_indent();
        let mut has_untyped = false;
        for (i, clause) in clauses.iter().enumerate() {
            match &clause.exception_type {
                Some(ty) => {
                    if i > 0 {
                        self.write(" else ");
                    }
                    // Generics are erased; instanceof wants the bare class.
                    let class = match ty {
                        fjs_ir::TypeIr::Named { name, .. } => name.clone(),
                        other => other.to_string(),
                    };
                    self.write(&format!("if ({binding} instanceof {class}) "));
                    self.emit_clause_body(&binding, clause);
                }
                None => {
                    has_untyped = true;
                    if i > 0 {
                        self.write(" else ");
                    }
                    self.emit_clause_body(&binding, clause);
                }
            }
        }
        if !has_untyped {
            self.write(&format!(" else {{ throw {binding}; }}"));
        }
        self.write_line();
        self.decrease_indent();
        self.write("}");
    }

    fn emit_clause_body(&mut self, binding: &str, clause: &CatchClause) {
        // A clause may bind its own name; alias it to the shared binding.
        let needs_alias = clause
            .exception_var
            .as_deref()
            .is_some_and(|name| name != binding);
        if clause.body.is_empty() && !needs_alias {
            self.write("{}");
            return;
        }
        self.write("{");
        self.write_line();
        self.increase_indent();
        if needs_alias {
            if let Some(name) = &clause.exception_var {
                self.line(&format!("const {name} = {binding};"));
            }
        }
        for stmt in &clause.body {
            self.emit_stmt(stmt);
        }
        self.decrease_indent();
        self.write("}");
    }
}
