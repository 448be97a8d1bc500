//! Statement IR.
//!
//! Same shape as the expression family: a shared base struct and a closed
//! kind union. The exact statement set is the one the extraction stage
//! produces; anything it cannot classify is a malformed-AST failure there,
//! never an open variant here.

use crate::expr::ExprIr;
use crate::ids::NodeId;
use crate::ty::TypeIr;
use fjs_common::SourceSpan;

/// A `catch` / `on Type catch` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    /// `on SomeException` filter, if present.
    pub exception_type: Option<TypeIr>,
    /// The bound exception variable (`catch (e)`).
    pub exception_var: Option<String>,
    /// The bound stack-trace variable (`catch (e, st)`).
    pub stack_var: Option<String>,
    pub body: Vec<StmtIr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StmtIr {
    pub id: NodeId,
    pub span: SourceSpan,
    pub kind: StmtKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Block(Vec<StmtIr>),

    If {
        condition: ExprIr,
        then_branch: Vec<StmtIr>,
        else_branch: Option<Vec<StmtIr>>,
    },

    /// C-style `for (init; cond; update)`.
    For {
        init: Option<Box<StmtIr>>,
        condition: Option<ExprIr>,
        update: Option<ExprIr>,
        body: Vec<StmtIr>,
    },

    /// `for (x in iterable)`.
    ForIn {
        variable: String,
        iterable: ExprIr,
        body: Vec<StmtIr>,
    },

    While {
        condition: ExprIr,
        body: Vec<StmtIr>,
        is_do_while: bool,
    },

    Return(Option<ExprIr>),

    Break,

    Continue,

    Throw(ExprIr),

    TryCatch {
        body: Vec<StmtIr>,
        catch_clauses: Vec<CatchClause>,
        finally_block: Option<Vec<StmtIr>>,
    },

    VariableDecl {
        name: String,
        declared_type: Option<TypeIr>,
        initializer: Option<ExprIr>,
        is_final: bool,
        is_const: bool,
    },

    ExpressionStmt(ExprIr),
}

impl StmtIr {
    pub fn new(id: NodeId, span: SourceSpan, kind: StmtKind) -> Self {
        Self { id, span, kind }
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            StmtKind::Block(_) => "block",
            StmtKind::If { .. } => "if",
            StmtKind::For { .. } => "for",
            StmtKind::ForIn { .. } => "forIn",
            StmtKind::While { .. } => "while",
            StmtKind::Return(_) => "return",
            StmtKind::Break => "break",
            StmtKind::Continue => "continue",
            StmtKind::Throw(_) => "throw",
            StmtKind::TryCatch { .. } => "tryCatch",
            StmtKind::VariableDecl { .. } => "variableDecl",
            StmtKind::ExpressionStmt(_) => "expressionStmt",
        }
    }

    pub fn to_short_string(&self) -> String {
        match &self.kind {
            StmtKind::VariableDecl { name, .. } => format!("var({name})"),
            StmtKind::ExpressionStmt(e) => format!("expr({})", e.to_short_string()),
            other => {
                let _ = other;
                self.kind_name().to_string()
            }
        }
    }

    /// Whether this statement unconditionally transfers control away
    /// (used by flow analysis for unreachable-code detection).
    pub fn is_terminator(&self) -> bool {
        matches!(
            self.kind,
            StmtKind::Return(_) | StmtKind::Break | StmtKind::Continue | StmtKind::Throw(_)
        )
    }
}
