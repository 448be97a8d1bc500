//! The per-file pipeline: extract, analyze, emit.

use crate::options::CompileOptions;
use fjs_analyzer::{
    DedupStrategy, FlowAnalyzer, GlobalSymbolTable, IssueCollector, IssueStatistics,
    LifecycleAnalyzer, RebuildGraph, Resolver, TypeInference,
};
use fjs_common::{AnalysisIssue, CancelToken, codes};
use fjs_emitter::JsEmitter;
use fjs_extract::{AstNode, ExtractError, Extractor};
use fjs_ir::{FileIr, IdGenerator};

/// Per-file counters, reported alongside the diagnostics.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileStats {
    pub classes: usize,
    pub functions: usize,
    pub issues: IssueStatistics,
    pub generated_bytes: usize,
}

/// Everything one file produced. `generated_code` is `None` only when
/// `fail_on_error` suppressed emission or the run was cancelled; the
/// diagnostics are complete either way.
#[derive(Debug)]
pub struct CompileResult {
    pub ir: FileIr,
    pub diagnostics: Vec<AnalysisIssue>,
    pub generated_code: Option<String>,
    pub stats: CompileStats,
}

/// Compile a single file in isolation: no cross-file symbol table, so
/// identifiers declared in other files resolve through the ambient set or
/// not at all.
pub fn compile_unit(ast: &AstNode, options: &CompileOptions) -> Result<CompileResult, ExtractError> {
    let ir = extract(ast)?;
    Ok(analyze_and_emit(ir, options, None, &CancelToken::new()))
}

pub(crate) fn extract(ast: &AstNode) -> Result<FileIr, ExtractError> {
    let _span = tracing::info_span!("extract", file = %ast.file).entered();
    let mut extractor = Extractor::new(IdGenerator::hash(ast.file.clone()));
    extractor.extract_file(ast)
}

/// The analysis passes plus code generation over already-extracted IR.
/// Shared by the single-file and project drivers; `global` is the read-only
/// project symbol table when there is one.
pub(crate) fn analyze_and_emit(
    ir: FileIr,
    options: &CompileOptions,
    global: Option<&GlobalSymbolTable>,
    cancel: &CancelToken,
) -> CompileResult {
    let mut collector = IssueCollector::new(DedupStrategy::Exact);

    let resolution = {
        let _span = tracing::info_span!("resolve", file = %ir.path).entered();
        let resolver = match global {
            Some(global) => Resolver::with_global(global),
            None => Resolver::new(),
        };
        resolver.resolve_file(&ir)
    };
    collector.extend(resolution.issues);

    if cancel.is_cancelled() {
        return finish(ir, collector, None);
    }

    {
        let _span = tracing::info_span!("infer", file = %ir.path).entered();
        let (_types, issues) =
            TypeInference::new(&resolution.table, &resolution.bindings).infer_file(&ir);
        collector.extend(issues);
    }

    if cancel.is_cancelled() {
        return finish(ir, collector, None);
    }

    {
        let _span = tracing::info_span!("flow", file = %ir.path).entered();
        collector.extend(FlowAnalyzer::new().analyze_file(&ir));
    }
    {
        let _span = tracing::info_span!("lifecycle", file = %ir.path).entered();
        let analyzer = LifecycleAnalyzer::new(options.lifecycle.clone());
        for lifecycle_report in analyzer.analyze_file(&ir) {
            collector.extend(lifecycle_report.issues);
        }
    }
    {
        let _span = tracing::info_span!("rebuild", file = %ir.path).entered();
        let graph = RebuildGraph::build_with(&ir, options.rebuild_thresholds);
        collector.extend(graph.issues());
    }

    if cancel.is_cancelled() {
        return finish(ir, collector, None);
    }

    if options.fail_on_error && collector.has_errors() {
        tracing::warn!(file = %ir.path, "skipping code generation: file has errors");
        return finish(ir, collector, None);
    }

    let code = {
        let _span = tracing::info_span!("codegen", file = %ir.path).entered();
        let output = JsEmitter::new(options.emit_options()).emit_file(&ir);
        for error in output.errors {
            collector.add(
                AnalysisIssue::error(
                    codes::CODEGEN_UNSUPPORTED,
                    format!("cannot emit {}: {}", error.node_kind, error.message),
                    error.span,
                ),
            );
        }
        output.code
    };

    finish(ir, collector, Some(code))
}

fn finish(ir: FileIr, collector: IssueCollector, code: Option<String>) -> CompileResult {
    let stats = CompileStats {
        classes: ir.classes.len(),
        functions: ir.functions.len(),
        issues: collector.statistics(),
        generated_bytes: code.as_ref().map_or(0, String::len),
    };
    CompileResult {
        ir,
        diagnostics: collector.into_sorted(),
        generated_code: code,
        stats,
    }
}
