//! Emission options.

/// Target module system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModuleFormat {
    /// `export class Foo { ... }`
    #[default]
    Esm,
    /// Plain declarations plus a `module.exports.Foo = Foo;` trailer.
    Cjs,
}

#[derive(Debug, Clone)]
pub struct EmitOptions {
    pub module_format: ModuleFormat,
    /// Prefix each class, member and function with `// <file>:<line>`.
    pub emit_source_comments: bool,
    pub indent_width: usize,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            module_format: ModuleFormat::Esm,
            emit_source_comments: false,
            indent_width: 2,
        }
    }
}
