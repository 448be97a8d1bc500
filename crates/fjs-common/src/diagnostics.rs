//! The diagnostic model shared by every analysis pass.
//!
//! Passes produce `AnalysisIssue` values and hand them to the
//! `IssueCollector` (fjs-analyzer); nothing in this crate decides whether an
//! issue aborts compilation — that is caller policy.

use crate::span::SourceSpan;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Issue severity. The derived `Ord` is the report sort order: errors first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Hint => "hint",
        };
        f.write_str(s)
    }
}

/// Coarse grouping used for report sections and auto-categorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueCategory {
    Syntax,
    Semantics,
    Types,
    ControlFlow,
    Lifecycle,
    Performance,
    CodeGen,
    General,
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IssueCategory::Syntax => "syntax",
            IssueCategory::Semantics => "semantics",
            IssueCategory::Types => "types",
            IssueCategory::ControlFlow => "controlFlow",
            IssueCategory::Lifecycle => "lifecycle",
            IssueCategory::Performance => "performance",
            IssueCategory::CodeGen => "codeGen",
            IssueCategory::General => "general",
        };
        f.write_str(s)
    }
}

/// One diagnostic produced by an analysis pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisIssue {
    pub code: String,
    pub severity: Severity,
    pub category: IssueCategory,
    pub message: String,
    pub span: SourceSpan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub related: Vec<SourceSpan>,
}

impl AnalysisIssue {
    pub fn new(
        severity: Severity,
        category: IssueCategory,
        code: impl Into<String>,
        message: impl Into<String>,
        span: SourceSpan,
    ) -> Self {
        Self {
            code: code.into(),
            severity,
            category,
            message: message.into(),
            span,
            suggestion: None,
            related: Vec::new(),
        }
    }

    pub fn error(code: impl Into<String>, message: impl Into<String>, span: SourceSpan) -> Self {
        Self::new(Severity::Error, IssueCategory::General, code, message, span)
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>, span: SourceSpan) -> Self {
        Self::new(Severity::Warning, IssueCategory::General, code, message, span)
    }

    pub fn info(code: impl Into<String>, message: impl Into<String>, span: SourceSpan) -> Self {
        Self::new(Severity::Info, IssueCategory::General, code, message, span)
    }

    pub fn hint(code: impl Into<String>, message: impl Into<String>, span: SourceSpan) -> Self {
        Self::new(Severity::Hint, IssueCategory::General, code, message, span)
    }

    pub fn with_category(mut self, category: IssueCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_related(mut self, span: SourceSpan) -> Self {
        self.related.push(span);
        self
    }
}

impl fmt::Display for AnalysisIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}",
            self.span, self.severity, self.code, self.message
        )
    }
}

/// Stable diagnostic codes. String codes rather than numeric so reports stay
/// self-describing; the set is closed and append-only.
pub mod codes {
    pub const MALFORMED_AST: &str = "malformed_ast";
    pub const DUPLICATE_DECLARATION: &str = "duplicate_declaration";
    pub const UNRESOLVED_IDENTIFIER: &str = "unresolved_identifier";
    pub const TYPE_MISMATCH: &str = "type_mismatch";
    pub const NO_COMMON_SUPERTYPE: &str = "no_common_supertype";
    pub const UNREACHABLE_CODE: &str = "unreachable_code";
    pub const MISSING_RETURN: &str = "missing_return";
    pub const RESOURCE_LEAK: &str = "resource_leak";
    pub const USE_BEFORE_INIT: &str = "use_before_init";
    pub const MISSING_SUPER_CALL: &str = "missing_super_call";
    pub const LIFECYCLE_ORDER: &str = "lifecycle_order";
    pub const UNNECESSARY_REBUILD: &str = "unnecessary_rebuild";
    pub const EXPENSIVE_REBUILD: &str = "expensive_rebuild";
    pub const REBUILD_CASCADE: &str = "rebuild_cascade";
    pub const CODEGEN_UNSUPPORTED: &str = "codegen_unsupported";
    pub const INVALID_MODIFIERS: &str = "invalid_modifiers";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_sort_order_puts_errors_first() {
        let mut sevs = vec![Severity::Hint, Severity::Error, Severity::Info, Severity::Warning];
        sevs.sort();
        assert_eq!(
            sevs,
            vec![Severity::Error, Severity::Warning, Severity::Info, Severity::Hint]
        );
    }

    #[test]
    fn builder_attaches_suggestion_and_related() {
        let span = SourceSpan::new("a.dart", 3, 1, 40, 8);
        let issue = AnalysisIssue::error(codes::RESOURCE_LEAK, "leak of _controller", span.clone())
            .with_category(IssueCategory::Lifecycle)
            .with_suggestion("call _controller.dispose() in dispose()")
            .with_related(SourceSpan::new("a.dart", 10, 1, 120, 8));

        assert_eq!(issue.category, IssueCategory::Lifecycle);
        assert!(issue.suggestion.is_some());
        assert_eq!(issue.related.len(), 1);
        assert_eq!(issue.span, span);
    }

    #[test]
    fn display_is_location_first() {
        let issue = AnalysisIssue::warning(
            codes::UNREACHABLE_CODE,
            "unreachable statement",
            SourceSpan::new("w.dart", 7, 3, 88, 12),
        );
        assert_eq!(
            issue.to_string(),
            "w.dart:7:3: warning [unreachable_code] unreachable statement"
        );
    }
}
