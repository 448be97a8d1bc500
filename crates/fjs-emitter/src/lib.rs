//! JavaScript code generation.
//!
//! `JsEmitter` walks the IR structurally and prints JavaScript, one emitter
//! family per IR family. Parenthesization is re-derived from the operator
//! precedence table in `precedence`, never from source formatting. Nodes
//! with no JS equivalent are lowered (cascades, null-aware operators, `~/`,
//! named constructors); nodes that cannot be lowered emit a
//! `/* fjs: unsupported ... */` stub, record a `CodeGenError`, and emission
//! continues so output stays maximal.

mod classes;
mod expressions;
pub mod precedence;
mod printer;
mod statements;

pub mod options;

pub use options::{EmitOptions, ModuleFormat};
pub use printer::{CodeGenError, EmitOutput, JsEmitter};
