//! Common types and utilities for the fjs transpiler.
//!
//! This crate provides foundational types used across all fjs crates:
//! - Source spans (`SourceSpan`) with range queries
//! - The diagnostic model (`AnalysisIssue`, `Severity`, `IssueCategory`)
//! - Stable diagnostic codes (`codes`)
//! - Centralized limits and thresholds (`limits`)
//! - Cooperative cancellation (`CancelToken`)

pub mod cancel;
pub mod diagnostics;
pub mod limits;
pub mod span;

pub use cancel::CancelToken;
pub use diagnostics::{AnalysisIssue, IssueCategory, Severity, codes};
pub use span::SourceSpan;
