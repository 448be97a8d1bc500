//! The multi-file driver.
//!
//! Three phases: parallel extraction (each worker owns its `IdGenerator`),
//! a single-threaded merge of the per-file exports into one immutable
//! `GlobalSymbolTable`, then parallel analysis and code generation against
//! the read-only table. Results come back in input order, so a project
//! compile is deterministic regardless of thread schedule.

use crate::options::CompileOptions;
use crate::pipeline::{self, CompileResult};
use fjs_analyzer::{DedupStrategy, GlobalSymbolTable, IssueCollector};
use fjs_common::{AnalysisIssue, CancelToken, SourceSpan, codes};
use fjs_extract::{AstNode, ExtractError, file_exports};
use fjs_ir::FileIr;
use rayon::prelude::*;

#[derive(Debug)]
pub struct ProjectResult {
    /// Per-file results, in input order.
    pub files: Vec<CompileResult>,
    /// All diagnostics across the project, deduplicated and sorted,
    /// including the cross-file ones no single file owns.
    pub diagnostics: Vec<AnalysisIssue>,
}

pub fn compile_project(
    asts: &[AstNode],
    options: &CompileOptions,
) -> Result<ProjectResult, ExtractError> {
    compile_project_with(asts, options, &CancelToken::new())
}

/// Like [`compile_project`] with cooperative cancellation: workers check
/// the token between passes and skip the remaining work once it trips.
pub fn compile_project_with(
    asts: &[AstNode],
    options: &CompileOptions,
    cancel: &CancelToken,
) -> Result<ProjectResult, ExtractError> {
    tracing::info!(files = asts.len(), "compiling project");

    let files: Vec<FileIr> = asts
        .par_iter()
        .map(pipeline::extract)
        .collect::<Result<_, _>>()?;

    // Merge order is input order, so "first declaration wins" is stable.
    let mut global = GlobalSymbolTable::new();
    let mut project_issues = Vec::new();
    for file in &files {
        for name in global.merge(file_exports(file)) {
            project_issues.push(AnalysisIssue::error(
                codes::DUPLICATE_DECLARATION,
                format!("'{name}' is already declared in another file"),
                decl_span(file, &name),
            ));
        }
    }

    let results: Vec<CompileResult> = files
        .into_par_iter()
        .map(|ir| pipeline::analyze_and_emit(ir, options, Some(&global), cancel))
        .collect();

    let mut collector = IssueCollector::new(DedupStrategy::Exact);
    collector.extend(project_issues);
    for result in &results {
        collector.extend(result.diagnostics.iter().cloned());
    }

    Ok(ProjectResult {
        files: results,
        diagnostics: collector.into_sorted(),
    })
}

/// The span of the top-level declaration `name` in `file`, falling back to
/// the start of the file.
fn decl_span(file: &FileIr, name: &str) -> SourceSpan {
    if let Some(class) = file.class(name) {
        return class.span.clone();
    }
    if let Some(function) = file.functions.iter().find(|f| f.name == name) {
        return function.span.clone();
    }
    SourceSpan::new(file.path.clone(), 1, 1, 0, 0)
}
