//! Symbol tables.
//!
//! `SymbolTable` is per-file and owned by the resolver. The
//! `GlobalSymbolTable` is built once by the driver's merge phase from
//! per-file exports and is immutable afterwards, so phase-3 workers can
//! share it by reference.

use fjs_common::SourceSpan;
use fjs_extract::SymbolExport;
use fjs_ir::TypeIr;
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

impl SymbolId {
    /// The shared Dynamic placeholder every unresolved identifier binds to.
    pub const DYNAMIC: SymbolId = SymbolId(0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    /// Placeholder for unresolved names.
    Dynamic,
    Local,
    Parameter,
    Field,
    Method,
    Getter,
    Class,
    Function,
    Import,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub ty: TypeIr,
    pub span: Option<SourceSpan>,
}

/// Per-file symbol arena. Index 0 is always the Dynamic placeholder.
#[derive(Debug)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    /// Declared type of `(class, member)` pairs, filled while declaring
    /// classes; consulted by property-access inference.
    class_members: IndexMap<(String, String), TypeIr>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            symbols: vec![Symbol {
                name: "<dynamic>".to_string(),
                kind: SymbolKind::Dynamic,
                ty: TypeIr::Dynamic,
                span: None,
            }],
            class_members: IndexMap::new(),
        }
    }

    pub fn declare(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        // The Dynamic placeholder is always present.
        self.symbols.len() <= 1
    }

    pub fn record_class_member(&mut self, class: &str, member: &str, ty: TypeIr) {
        self.class_members
            .insert((class.to_string(), member.to_string()), ty);
    }

    pub fn class_member_type(&self, class: &str, member: &str) -> Option<&TypeIr> {
        self.class_members
            .get(&(class.to_string(), member.to_string()))
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable project-wide table of top-level symbols, produced by the
/// single-threaded merge between the two parallel phases. `IndexMap` keeps
/// merge order deterministic for reporting.
#[derive(Debug, Default)]
pub struct GlobalSymbolTable {
    entries: IndexMap<String, SymbolExport>,
}

impl GlobalSymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one file's exports. Returns the names that were already
    /// present (duplicate declarations) for the caller to report.
    pub fn merge(&mut self, exports: Vec<SymbolExport>) -> Vec<String> {
        let mut duplicates = Vec::new();
        for export in exports {
            if self.entries.contains_key(&export.name) {
                duplicates.push(export.name.clone());
            } else {
                self.entries.insert(export.name.clone(), export);
            }
        }
        duplicates
    }

    pub fn lookup(&self, name: &str) -> Option<&SymbolExport> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SymbolExport)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fjs_extract::ExportKind;

    #[test]
    fn dynamic_placeholder_is_slot_zero() {
        let table = SymbolTable::new();
        let dynamic = table.get(SymbolId::DYNAMIC);
        assert_eq!(dynamic.kind, SymbolKind::Dynamic);
        assert!(dynamic.ty.is_dynamic());
        assert!(table.is_empty());
    }

    #[test]
    fn merge_reports_duplicates_and_keeps_first() {
        let mut global = GlobalSymbolTable::new();
        let export = |name: &str| SymbolExport {
            name: name.to_string(),
            kind: ExportKind::Class,
            ty: TypeIr::named(name),
        };
        assert!(global.merge(vec![export("Counter"), export("App")]).is_empty());
        let dups = global.merge(vec![export("Counter"), export("Other")]);
        assert_eq!(dups, vec!["Counter".to_string()]);
        assert_eq!(global.len(), 3);
    }
}
