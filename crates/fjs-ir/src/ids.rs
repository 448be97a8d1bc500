//! Node identity and ID generation.
//!
//! Every IR node carries a `NodeId` assigned at construction. IDs are unique
//! within one compilation unit; side tables (result types, symbol bindings)
//! are keyed by them.
//!
//! Three strategies, selected per use:
//! - `Counter` — `type_context_name_N`. O(1), session-unique, the default
//!   for single-file passes. Per-file state: call `reset()` between files
//!   and never share one generator across parallel workers.
//! - `Hash` — deterministic `type_<fnv1a(type:fqn:file)>`. No mutable
//!   state, safe to share, stable across runs for incremental caching.
//! - `Simple` — `type_N`, for temporary and synthesized nodes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Opaque node identifier. Cheap to clone, hashable, ordered only for
/// deterministic iteration of side tables.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Arc<str>);

impl NodeId {
    pub fn from_raw(raw: impl Into<Arc<str>>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(input: &str) -> u64 {
    let mut hash = FNV_OFFSET;
    for byte in input.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// ID generator threaded explicitly through extraction. No ambient statics:
/// parallel per-file workers each own their generator.
#[derive(Debug, Clone)]
pub enum IdGenerator {
    Counter { counter: u64 },
    Hash { file: Arc<str> },
    Simple { counter: u64 },
}

impl IdGenerator {
    /// Session-unique counter strategy (the per-file default).
    pub fn counter() -> Self {
        IdGenerator::Counter { counter: 0 }
    }

    /// Deterministic hash strategy for cross-run stability.
    pub fn hash(file: impl Into<Arc<str>>) -> Self {
        IdGenerator::Hash { file: file.into() }
    }

    /// Bare counter for temporary/synthetic nodes.
    pub fn simple() -> Self {
        IdGenerator::Simple { counter: 0 }
    }

    /// Reset counter state between independent files. A no-op for the hash
    /// strategy, which has no state to reset.
    pub fn reset(&mut self) {
        match self {
            IdGenerator::Counter { counter } | IdGenerator::Simple { counter } => *counter = 0,
            IdGenerator::Hash { .. } => {}
        }
    }

    /// Produce the next id. `context` is the enclosing scope (usually the
    /// class name), `name` the declared or summarized name; either may be
    /// empty and is then omitted from the id.
    pub fn make(&mut self, node_type: &str, context: &str, name: &str) -> NodeId {
        match self {
            IdGenerator::Counter { counter } => {
                *counter += 1;
                let mut id = String::with_capacity(node_type.len() + context.len() + name.len() + 8);
                id.push_str(node_type);
                for segment in [context, name] {
                    if !segment.is_empty() {
                        id.push('_');
                        id.push_str(segment);
                    }
                }
                id.push('_');
                id.push_str(&counter.to_string());
                NodeId::from_raw(id)
            }
            IdGenerator::Hash { file } => {
                let key = format!("{node_type}:{context}.{name}:{file}");
                NodeId::from_raw(format!("{node_type}_{:016x}", fnv1a(&key)))
            }
            IdGenerator::Simple { counter } => {
                *counter += 1;
                NodeId::from_raw(format!("{node_type}_{counter}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_ids_are_unique_and_reset() {
        let mut ids = IdGenerator::counter();
        let a = ids.make("expr", "Counter", "build");
        let b = ids.make("expr", "Counter", "build");
        assert_ne!(a, b);
        assert_eq!(a.as_str(), "expr_Counter_build_1");

        ids.reset();
        let c = ids.make("expr", "Counter", "build");
        assert_eq!(a, c);
    }

    #[test]
    fn counter_omits_empty_segments() {
        let mut ids = IdGenerator::counter();
        assert_eq!(ids.make("stmt", "", "").as_str(), "stmt_1");
        assert_eq!(ids.make("stmt", "Counter", "").as_str(), "stmt_Counter_2");
    }

    #[test]
    fn hash_ids_are_deterministic_and_stateless() {
        let mut a = IdGenerator::hash("lib/main.dart");
        let mut b = IdGenerator::hash("lib/main.dart");
        assert_eq!(
            a.make("class", "", "Counter"),
            b.make("class", "", "Counter")
        );
        assert_ne!(
            a.make("class", "", "Counter"),
            a.make("class", "", "Other")
        );

        let mut other_file = IdGenerator::hash("lib/other.dart");
        assert_ne!(
            a.make("class", "", "Counter"),
            other_file.make("class", "", "Counter")
        );
    }

    #[test]
    fn simple_ids_ignore_context() {
        let mut ids = IdGenerator::simple();
        assert_eq!(ids.make("temp", "ignored", "ignored").as_str(), "temp_1");
        assert_eq!(ids.make("temp", "", "").as_str(), "temp_2");
    }
}
