//! The external AST contract.
//!
//! A provider hands over, for every node: a kind tag, an ordered child
//! list, a source span, an optional token/literal value, and a string
//! attribute map. Nothing else is assumed about the front end.

use fjs_common::SourceSpan;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstNode {
    pub kind: String,
    #[serde(default)]
    pub children: Vec<AstNode>,
    /// Token or literal text (identifier name, operator, literal lexeme).
    #[serde(default)]
    pub value: Option<String>,
    /// Free-form string attributes (`type`, `static`, `prefix`, ...).
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub offset: u32,
    pub length: u32,
}

impl AstNode {
    pub fn span(&self) -> SourceSpan {
        SourceSpan::new(
            self.file.clone(),
            self.line,
            self.column,
            self.offset,
            self.length,
        )
    }

    pub fn value_str(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn attr_bool(&self, name: &str) -> bool {
        self.attr(name) == Some("true")
    }

    pub fn children_of(&self, kind: &str) -> impl Iterator<Item = &AstNode> {
        self.children.iter().filter(move |c| c.kind == kind)
    }

    pub fn first_child_of(&self, kind: &str) -> Option<&AstNode> {
        self.children.iter().find(|c| c.kind == kind)
    }
}
