//! Rendering diagnostics for humans and tools.
//!
//! The only place the driver touches the filesystem, and the only place
//! `anyhow` appears; everything upstream reports through typed issues.

use anyhow::Context;
use fjs_analyzer::{DedupStrategy, IssueCollector};
use fjs_common::AnalysisIssue;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// One line per issue plus a summary line.
    #[default]
    Text,
    /// `{ "issues": [...], "statistics": {...} }`
    Json,
}

pub fn render(issues: &[AnalysisIssue], format: ReportFormat) -> anyhow::Result<String> {
    let mut collector = IssueCollector::new(DedupStrategy::Exact);
    collector.extend(issues.iter().cloned());
    match format {
        ReportFormat::Text => Ok(collector.to_text()),
        ReportFormat::Json => {
            serde_json::to_string_pretty(&collector.to_json()).context("serializing report")
        }
    }
}

pub fn write_report(
    issues: &[AnalysisIssue],
    format: ReportFormat,
    path: &Path,
) -> anyhow::Result<()> {
    let rendered = render(issues, format)?;
    fs::write(path, rendered).with_context(|| format!("writing report to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fjs_common::{SourceSpan, codes};

    fn sample() -> Vec<AnalysisIssue> {
        vec![
            AnalysisIssue::warning(
                codes::RESOURCE_LEAK,
                "leak of _controller",
                SourceSpan::new("a.dart", 4, 3, 60, 11),
            ),
            AnalysisIssue::error(
                codes::UNRESOLVED_IDENTIFIER,
                "unknown identifier 'foo'",
                SourceSpan::new("a.dart", 9, 5, 130, 3),
            ),
        ]
    }

    #[test]
    fn text_report_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("issues.txt");
        write_report(&sample(), ReportFormat::Text, &path).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("[unresolved_identifier]"));
        assert!(text.ends_with("2 issue(s): 1 error(s), 1 warning(s), 0 info(s), 0 hint(s)\n"));
    }

    #[test]
    fn json_report_carries_statistics() {
        let rendered = render(&sample(), ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["statistics"]["errors"], 1);
        assert_eq!(value["issues"].as_array().unwrap().len(), 2);
        // Errors sort first.
        assert_eq!(value["issues"][0]["code"], "unresolved_identifier");
    }
}
