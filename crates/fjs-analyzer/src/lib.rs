//! Static analysis passes over the fjs IR.
//!
//! The passes run in order per file — symbol resolution, type inference,
//! then the three independent analyses (control flow, widget lifecycle,
//! rebuild trigger graph) — and report everything through `AnalysisIssue`
//! values aggregated by the `IssueCollector`. No pass aborts the pipeline:
//! unresolved or ambiguous facts degrade to `Dynamic` and are reported.
//!
//! All derived facts live in side tables keyed by `NodeId` (`BindingMap`,
//! `TypeMap`); IR nodes are never mutated after extraction.

pub mod collector;
pub mod flow;
pub mod infer;
pub mod lifecycle;
pub mod rebuild;
pub mod resolver;
pub mod scopes;

pub use collector::{DedupStrategy, IssueCollector, IssueStatistics};
pub use flow::FlowAnalyzer;
pub use infer::{TypeInference, TypeMap};
pub use lifecycle::{
    LifecycleAnalyzer, LifecycleConfig, LifecycleOp, LifecycleReport, ResourceLeak, UseBeforeInit,
};
pub use rebuild::{RebuildEdge, RebuildGraph, RebuildThresholds, UnnecessaryRebuild};
pub use resolver::{BindingMap, Resolution, Resolver};
pub use scopes::{GlobalSymbolTable, Symbol, SymbolId, SymbolKind, SymbolTable};
