//! The emitter core: output buffer, indentation, error recording.
//!
//! Emission methods live in the sibling modules (`expressions`,
//! `statements`, `classes`) as further `impl JsEmitter` blocks; this module
//! owns the struct, the write helpers they share, and the top-level file
//! walk.

use crate::options::{EmitOptions, ModuleFormat};
use fjs_common::SourceSpan;
use fjs_ir::FileIr;
use std::fmt;

/// A node the emitter could not translate. Recorded, never thrown; the
/// emitter writes a stub comment and keeps going.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeGenError {
    pub node_kind: String,
    pub span: SourceSpan,
    pub message: String,
}

impl fmt::Display for CodeGenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: cannot emit {}: {}",
            self.span, self.node_kind, self.message
        )
    }
}

impl std::error::Error for CodeGenError {}

/// The generated source plus everything that could not be generated.
#[derive(Debug)]
pub struct EmitOutput {
    pub code: String,
    pub errors: Vec<CodeGenError>,
}

pub struct JsEmitter {
    pub(crate) options: EmitOptions,
    pub(crate) out: String,
    pub(crate) indent: usize,
    pub(crate) at_line_start: bool,
    pub(crate) errors: Vec<CodeGenError>,
    temp_counter: u32,
}

impl JsEmitter {
    pub fn new(options: EmitOptions) -> Self {
        Self {
            options,
            out: String::new(),
            indent: 0,
            at_line_start: true,
            errors: Vec::new(),
            temp_counter: 0,
        }
    }

    pub fn emit_file(mut self, file: &FileIr) -> EmitOutput {
        tracing::debug!(file = %file.path, "emitting javascript");
        let mut first = true;
        for class in &file.classes {
            if !first {
                self.write_line();
            }
            first = false;
            self.emit_class(class);
        }
        for function in &file.functions {
            if !first {
                self.write_line();
            }
            first = false;
            self.emit_top_level_function(function);
        }

        if self.options.module_format == ModuleFormat::Cjs {
            self.emit_cjs_trailer(file);
        }

        EmitOutput {
            code: self.out,
            errors: self.errors,
        }
    }

    fn emit_cjs_trailer(&mut self, file: &FileIr) {
        if file.classes.is_empty() && file.functions.is_empty() {
            return;
        }
        self.write_line();
        for class in &file.classes {
            self.line(&format!("module.exports.{0} = {0};", class.name));
        }
        for function in &file.functions {
            self.line(&format!("module.exports.{0} = {0};", function.name));
        }
    }

    // =========================================================================
    // Output helpers
    // =========================================================================

    pub(crate) fn write(&mut self, text: &str) {
        if self.at_line_start && !text.is_empty() {
            for _ in 0..self.indent * self.options.indent_width {
                self.out.push(' ');
            }
            self.at_line_start = false;
        }
        self.out.push_str(text);
    }

    pub(crate) fn write_line(&mut self) {
        self.out.push('\n');
        self.at_line_start = true;
    }

    /// Write one full line at the current indent.
    pub(crate) fn line(&mut self, text: &str) {
        self.write(text);
        self.write_line();
    }

    pub(crate) fn increase_indent(&mut self) {
        self.indent += 1;
    }

    pub(crate) fn decrease_indent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    pub(crate) fn fresh_temp(&mut self) -> String {
        let name = format!("_t{}", self.temp_counter);
        self.temp_counter += 1;
        name
    }

    pub(crate) fn source_comment(&mut self, span: &SourceSpan) {
        if self.options.emit_source_comments && !span.is_synthetic() {
            self.line(&format!("// {}:{}", span.file, span.line));
        }
    }

    /// Record an unsupported construct and write its stub in place.
    pub(crate) fn unsupported(&mut self, node_kind: &str, span: &SourceSpan, message: &str) {
        self.errors.push(CodeGenError {
            node_kind: node_kind.to_string(),
            span: span.clone(),
            message: message.to_string(),
        });
        self.write(&format!("/* fjs: unsupported {node_kind} */"));
    }
}
