//! Typed intermediate representation for the fjs transpiler.
//!
//! The IR sits between the external Dart AST and generated JavaScript. Node
//! families are closed tagged unions over a shared base struct
//! (`{ id, span, kind }`); exhaustive matching replaces runtime kind checks
//! everywhere except the serialization boundary, where `from_json` stays
//! total over the closed discriminator set and fails fatally on anything
//! outside it.
//!
//! Nodes are immutable once constructed. Derived facts (result types, symbol
//! bindings, widget costs) live in side tables keyed by `NodeId` in the
//! analyzer crate, never in the nodes themselves.

pub mod decl;
pub mod expr;
pub mod ids;
pub mod json;
pub mod stmt;
pub mod ty;

pub use decl::{
    ClassDecl, ConstructorDecl, CtorInitializer, CtorRedirect, FieldDecl, FileIr, FunctionBody,
    FunctionDecl, MemberFlags, ParamPosition, ParameterDecl, SuperCall, WidgetKind,
};
pub use expr::{
    BinaryOp, CascadeSection, ExprIr, ExprKind, InterpolationPart, LiteralValue, NamedArg, UnaryOp,
};
pub use ids::{IdGenerator, NodeId};
pub use json::{IrError, ToJson, content_equals};
pub use stmt::{CatchClause, StmtIr, StmtKind};
pub use ty::{PrimKind, TypeIr};
