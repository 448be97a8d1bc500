//! Issue aggregation.
//!
//! Every pass hands its `AnalysisIssue`s to one `IssueCollector` per file
//! (the driver merges them afterwards). The collector deduplicates on
//! insert, fills in the category for issues that arrive uncategorized, and
//! produces the sorted report views.

use fjs_common::{AnalysisIssue, IssueCategory, Severity, codes};
use rustc_hash::FxHashSet;
use serde_json::{Value, json};

/// How aggressively duplicate issues are dropped.
///
/// `Exact` keeps two issues apart unless code, location and message all
/// match. `Loose` collapses issues with the same code on the same line, so
/// a pass re-run over shared IR cannot double-report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupStrategy {
    #[default]
    Exact,
    Loose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IssueStatistics {
    pub total: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub hints: usize,
}

#[derive(Debug, Default)]
pub struct IssueCollector {
    issues: Vec<AnalysisIssue>,
    strategy: DedupStrategy,
    seen: FxHashSet<String>,
    sorted: bool,
}

impl IssueCollector {
    pub fn new(strategy: DedupStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Add one issue. Returns `false` when the issue was dropped as a
    /// duplicate under the active strategy.
    pub fn add(&mut self, mut issue: AnalysisIssue) -> bool {
        let key = self.dedup_key(&issue);
        if !self.seen.insert(key) {
            return false;
        }
        if issue.category == IssueCategory::General {
            issue.category = categorize(&issue.code);
        }
        self.issues.push(issue);
        self.sorted = false;
        true
    }

    pub fn extend(&mut self, issues: impl IntoIterator<Item = AnalysisIssue>) {
        for issue in issues {
            self.add(issue);
        }
    }

    fn dedup_key(&self, issue: &AnalysisIssue) -> String {
        match self.strategy {
            DedupStrategy::Exact => format!(
                "{}\u{0}{}\u{0}{}\u{0}{}\u{0}{}",
                issue.code, issue.span.file, issue.span.line, issue.span.column, issue.message
            ),
            DedupStrategy::Loose => {
                format!("{}\u{0}{}\u{0}{}", issue.code, issue.span.file, issue.span.line)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn statistics(&self) -> IssueStatistics {
        let mut stats = IssueStatistics {
            total: self.issues.len(),
            ..IssueStatistics::default()
        };
        for issue in &self.issues {
            match issue.severity {
                Severity::Error => stats.errors += 1,
                Severity::Warning => stats.warnings += 1,
                Severity::Info => stats.infos += 1,
                Severity::Hint => stats.hints += 1,
            }
        }
        stats
    }

    fn ensure_sorted(&mut self) {
        if self.sorted {
            return;
        }
        // Stable order: severity first, then source position, then code, so
        // reports are byte-identical across runs and thread schedules.
        self.issues.sort_by(|a, b| {
            (a.severity, &*a.span.file, a.span.line, a.span.column, &a.code).cmp(&(
                b.severity,
                &*b.span.file,
                b.span.line,
                b.span.column,
                &b.code,
            ))
        });
        self.sorted = true;
    }

    /// The deduplicated issues in report order.
    pub fn sorted_issues(&mut self) -> &[AnalysisIssue] {
        self.ensure_sorted();
        &self.issues
    }

    /// Consume the collector, returning the issues in report order.
    pub fn into_sorted(mut self) -> Vec<AnalysisIssue> {
        self.ensure_sorted();
        self.issues
    }

    pub fn to_json(&mut self) -> Value {
        self.ensure_sorted();
        let stats = self.statistics();
        json!({
            "issues": self.issues,
            "statistics": {
                "total": stats.total,
                "errors": stats.errors,
                "warnings": stats.warnings,
                "infos": stats.infos,
                "hints": stats.hints,
            },
        })
    }

    pub fn to_text(&mut self) -> String {
        self.ensure_sorted();
        let mut out = String::new();
        for issue in &self.issues {
            out.push_str(&issue.to_string());
            out.push('\n');
            if let Some(suggestion) = &issue.suggestion {
                out.push_str("  suggestion: ");
                out.push_str(suggestion);
                out.push('\n');
            }
        }
        let stats = self.statistics();
        out.push_str(&format!(
            "{} issue(s): {} error(s), {} warning(s), {} info(s), {} hint(s)\n",
            stats.total, stats.errors, stats.warnings, stats.infos, stats.hints
        ));
        out
    }
}

/// Map a diagnostic code to its report category. Codes outside the closed
/// set stay `General`.
pub fn categorize(code: &str) -> IssueCategory {
    match code {
        codes::MALFORMED_AST | codes::INVALID_MODIFIERS => IssueCategory::Syntax,
        codes::DUPLICATE_DECLARATION | codes::UNRESOLVED_IDENTIFIER => IssueCategory::Semantics,
        codes::TYPE_MISMATCH | codes::NO_COMMON_SUPERTYPE => IssueCategory::Types,
        codes::UNREACHABLE_CODE | codes::MISSING_RETURN => IssueCategory::ControlFlow,
        codes::RESOURCE_LEAK
        | codes::USE_BEFORE_INIT
        | codes::MISSING_SUPER_CALL
        | codes::LIFECYCLE_ORDER => IssueCategory::Lifecycle,
        codes::UNNECESSARY_REBUILD | codes::EXPENSIVE_REBUILD | codes::REBUILD_CASCADE => {
            IssueCategory::Performance
        }
        codes::CODEGEN_UNSUPPORTED => IssueCategory::CodeGen,
        _ => IssueCategory::General,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fjs_common::SourceSpan;

    fn at(line: u32, column: u32) -> SourceSpan {
        SourceSpan::new("main.dart", line, column, line * 40, 4)
    }

    #[test]
    fn exact_dedup_keeps_distinct_messages() {
        let mut collector = IssueCollector::new(DedupStrategy::Exact);
        assert!(collector.add(AnalysisIssue::error(codes::TYPE_MISMATCH, "a", at(3, 1))));
        assert!(collector.add(AnalysisIssue::error(codes::TYPE_MISMATCH, "b", at(3, 1))));
        assert!(!collector.add(AnalysisIssue::error(codes::TYPE_MISMATCH, "a", at(3, 1))));
        assert_eq!(collector.len(), 2);
    }

    #[test]
    fn loose_dedup_collapses_per_line() {
        let mut collector = IssueCollector::new(DedupStrategy::Loose);
        assert!(collector.add(AnalysisIssue::error(codes::TYPE_MISMATCH, "a", at(3, 1))));
        assert!(!collector.add(AnalysisIssue::error(codes::TYPE_MISMATCH, "b", at(3, 9))));
        assert!(collector.add(AnalysisIssue::error(codes::TYPE_MISMATCH, "a", at(4, 1))));
        assert_eq!(collector.len(), 2);
    }

    #[test]
    fn adding_is_idempotent_across_repeat_runs() {
        let issues = vec![
            AnalysisIssue::warning(codes::UNREACHABLE_CODE, "unreachable", at(9, 5)),
            AnalysisIssue::error(codes::UNRESOLVED_IDENTIFIER, "unknown 'x'", at(2, 3)),
        ];
        let mut collector = IssueCollector::default();
        collector.extend(issues.clone());
        collector.extend(issues);
        assert_eq!(collector.len(), 2);
    }

    #[test]
    fn report_order_is_severity_then_position() {
        let mut collector = IssueCollector::default();
        collector.add(AnalysisIssue::hint(codes::REBUILD_CASCADE, "cascade", at(1, 1)));
        collector.add(AnalysisIssue::warning(codes::UNREACHABLE_CODE, "dead", at(8, 1)));
        collector.add(AnalysisIssue::error(codes::MISSING_RETURN, "no return", at(20, 1)));
        collector.add(AnalysisIssue::warning(codes::TYPE_MISMATCH, "mismatch", at(2, 4)));

        let order: Vec<&str> = collector
            .sorted_issues()
            .iter()
            .map(|i| i.code.as_str())
            .collect();
        assert_eq!(
            order,
            vec![
                codes::MISSING_RETURN,
                codes::TYPE_MISMATCH,
                codes::UNREACHABLE_CODE,
                codes::REBUILD_CASCADE,
            ]
        );
    }

    #[test]
    fn uncategorized_issues_are_categorized_by_code() {
        let mut collector = IssueCollector::default();
        collector.add(AnalysisIssue::warning(codes::RESOURCE_LEAK, "leak", at(5, 3)));
        collector.add(
            AnalysisIssue::warning(codes::EXPENSIVE_REBUILD, "cost 62", at(6, 3))
                .with_category(IssueCategory::Performance),
        );
        let issues = collector.sorted_issues();
        assert!(issues.iter().all(|i| i.category != IssueCategory::General));
        assert_eq!(
            issues.iter().find(|i| i.code == codes::RESOURCE_LEAK).map(|i| i.category),
            Some(IssueCategory::Lifecycle)
        );
    }

    #[test]
    fn statistics_count_by_severity() {
        let mut collector = IssueCollector::default();
        collector.add(AnalysisIssue::error(codes::MISSING_RETURN, "e", at(1, 1)));
        collector.add(AnalysisIssue::warning(codes::UNREACHABLE_CODE, "w1", at(2, 1)));
        collector.add(AnalysisIssue::warning(codes::TYPE_MISMATCH, "w2", at(3, 1)));
        collector.add(AnalysisIssue::info(codes::REBUILD_CASCADE, "i", at(4, 1)));

        let stats = collector.statistics();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.warnings, 2);
        assert_eq!(stats.infos, 1);
        assert_eq!(stats.hints, 0);
        assert!(collector.has_errors());
    }

    #[test]
    fn text_report_ends_with_summary_line() {
        let mut collector = IssueCollector::default();
        collector.add(
            AnalysisIssue::warning(codes::RESOURCE_LEAK, "leak of _timer", at(12, 5))
                .with_suggestion("cancel _timer in dispose()"),
        );
        let text = collector.to_text();
        assert!(text.contains("[resource_leak] leak of _timer"));
        assert!(text.contains("suggestion: cancel _timer in dispose()"));
        assert!(text.ends_with("1 issue(s): 0 error(s), 1 warning(s), 0 info(s), 0 hint(s)\n"));
    }
}
