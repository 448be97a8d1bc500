//! fjs: a Flutter/Dart to JavaScript transpiler core.
//!
//! The pipeline runs in fixed stages: extraction of the front-end AST into
//! IR (`fjs-extract`), symbol resolution, type inference and the widget
//! analyses (`fjs-analyzer`), then JavaScript generation (`fjs-emitter`).
//! This crate is the driver tying the stages together, for one file
//! ([`compile_unit`]) or a whole project ([`compile_project`], parallel via
//! rayon with a shared read-only symbol table).
//!
//! Compilation is collect-and-proceed by default: analysis issues never
//! abort the pipeline, and the result carries both the diagnostics and
//! whatever code could be generated. Set
//! [`CompileOptions::fail_on_error`] to suppress code generation for files
//! with errors.

mod options;
mod pipeline;
mod project;
pub mod report;

pub use options::CompileOptions;
pub use pipeline::{CompileResult, CompileStats, compile_unit};
pub use project::{ProjectResult, compile_project, compile_project_with};

pub use fjs_analyzer::{LifecycleConfig, RebuildThresholds};
pub use fjs_common::{AnalysisIssue, CancelToken, Severity};
pub use fjs_emitter::ModuleFormat;
pub use fjs_extract::{AstNode, ExtractError};
