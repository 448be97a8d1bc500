//! Source location tracking.
//!
//! `SourceSpan` is the single location type threaded through the whole
//! pipeline: extraction stamps it onto every IR node, analysis passes attach
//! it to issues, and the emitter uses it for source comments.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A half-open byte range in a named source file, with the 1-based line and
/// column of its start.
///
/// Value-equality type: two spans are equal iff every field is equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceSpan {
    pub file: Arc<str>,
    pub line: u32,
    pub column: u32,
    pub offset: u32,
    pub length: u32,
}

impl SourceSpan {
    pub fn new(file: impl Into<Arc<str>>, line: u32, column: u32, offset: u32, length: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            offset,
            length,
        }
    }

    /// Span for nodes synthesized by the compiler itself (lowering temps,
    /// default values). Zero-width at the start of the pseudo-file.
    pub fn synthetic() -> Self {
        Self::new("<synthetic>", 0, 0, 0, 0)
    }

    /// Byte offset one past the end of the span.
    pub const fn end_offset(&self) -> u32 {
        self.offset + self.length
    }

    /// Whether `other` lies entirely within this span. Spans in different
    /// files never contain each other.
    pub fn contains(&self, other: &SourceSpan) -> bool {
        self.file == other.file
            && other.offset >= self.offset
            && other.end_offset() <= self.end_offset()
    }

    /// Absolute distance in bytes between the starts of two spans, used for
    /// nearest-declaration queries. `u32::MAX` across files.
    pub fn distance_from(&self, other: &SourceSpan) -> u32 {
        if self.file != other.file {
            return u32::MAX;
        }
        self.offset.abs_diff(other.offset)
    }

    pub fn is_synthetic(&self) -> bool {
        &*self.file == "<synthetic>"
    }
}

impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_requires_same_file() {
        let outer = SourceSpan::new("a.dart", 1, 1, 0, 100);
        let inner = SourceSpan::new("a.dart", 2, 5, 10, 20);
        let elsewhere = SourceSpan::new("b.dart", 2, 5, 10, 20);

        assert!(outer.contains(&inner));
        assert!(!outer.contains(&elsewhere));
        assert!(!inner.contains(&outer));
    }

    #[test]
    fn contains_is_inclusive_of_boundaries() {
        let outer = SourceSpan::new("a.dart", 1, 1, 10, 20);
        let same = outer.clone();
        let at_end = SourceSpan::new("a.dart", 1, 1, 25, 5);
        let past_end = SourceSpan::new("a.dart", 1, 1, 25, 6);

        assert!(outer.contains(&same));
        assert!(outer.contains(&at_end));
        assert!(!outer.contains(&past_end));
    }

    #[test]
    fn distance_is_symmetric() {
        let a = SourceSpan::new("a.dart", 1, 1, 10, 5);
        let b = SourceSpan::new("a.dart", 3, 1, 42, 5);

        assert_eq!(a.distance_from(&b), 32);
        assert_eq!(b.distance_from(&a), 32);
        assert_eq!(a.distance_from(&SourceSpan::new("b.dart", 1, 1, 10, 5)), u32::MAX);
    }

    #[test]
    fn value_equality() {
        let a = SourceSpan::new("a.dart", 1, 2, 3, 4);
        let b = SourceSpan::new("a.dart", 1, 2, 3, 4);
        assert_eq!(a, b);
    }
}
