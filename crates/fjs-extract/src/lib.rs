//! Declaration/Extraction stage: converts the external source AST into IR
//! declarations.
//!
//! The input contract (`AstNode`) is front-end agnostic: any Dart parser
//! that can produce kind-tagged nodes with spans and token values plugs in
//! here, usually via JSON. Extraction is the trusted boundary of the
//! pipeline — a structurally malformed AST aborts the file with
//! `ExtractError::MalformedAst`; everything downstream degrades gracefully
//! instead.

pub mod ast;
pub mod extractor;

pub use ast::AstNode;
pub use extractor::{ExportKind, ExtractError, Extractor, SymbolExport, file_exports};
