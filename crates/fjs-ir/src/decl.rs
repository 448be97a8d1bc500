//! Declarations: files, classes, fields, functions, constructors, parameters.
//!
//! Modifier combinations are validated at construction (`try_new`) so an
//! invalid declaration can never enter the pipeline; downstream passes match
//! on flags without re-checking.

use crate::expr::{ExprIr, NamedArg};
use crate::ids::NodeId;
use crate::json::IrError;
use crate::stmt::StmtIr;
use crate::ty::TypeIr;
use bitflags::bitflags;
use fjs_common::SourceSpan;
use std::collections::BTreeMap;
use std::sync::Arc;

bitflags! {
    /// Modifiers carried by functions, methods and constructors.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MemberFlags: u32 {
        const ASYNC = 1 << 0;
        /// `async*`
        const GENERATOR = 1 << 1;
        /// `sync*`
        const SYNC_GENERATOR = 1 << 2;
        const STATIC = 1 << 3;
        const ABSTRACT = 1 << 4;
        const GETTER = 1 << 5;
        const SETTER = 1 << 6;
        const OPERATOR = 1 << 7;
        const FACTORY = 1 << 8;
        const CONST = 1 << 9;
        const OVERRIDE = 1 << 10;
        const EXTERNAL = 1 << 11;
    }
}

impl MemberFlags {
    /// Reject the modifier combinations Dart itself forbids.
    pub fn validate(self) -> Result<(), IrError> {
        let illegal = |msg: &str| Err(IrError::InvalidModifiers(msg.to_string()));

        if self.contains(MemberFlags::GENERATOR) && self.contains(MemberFlags::SYNC_GENERATOR) {
            return illegal("generator and sync-generator are mutually exclusive");
        }
        if self.contains(MemberFlags::ASYNC)
            && self.intersects(MemberFlags::GENERATOR | MemberFlags::SYNC_GENERATOR)
        {
            return illegal("async and generators are mutually exclusive");
        }
        let accessor_ish = [MemberFlags::GETTER, MemberFlags::SETTER, MemberFlags::OPERATOR]
            .iter()
            .filter(|f| self.contains(**f))
            .count();
        if accessor_ish > 1 {
            return illegal("getter, setter and operator are mutually exclusive");
        }
        if self.contains(MemberFlags::FACTORY)
            && self.intersects(MemberFlags::ABSTRACT | MemberFlags::STATIC)
        {
            return illegal("factory is incompatible with abstract and static");
        }
        if self.contains(MemberFlags::CONST)
            && self.intersects(
                MemberFlags::ASYNC | MemberFlags::GENERATOR | MemberFlags::SYNC_GENERATOR,
            )
        {
            return illegal("const is incompatible with async and generators");
        }
        Ok(())
    }
}

/// Whether a parameter is positional or named. Exactly one; enforced at
/// construction via `ParameterDecl::try_new`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamPosition {
    Positional,
    Named,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDecl {
    pub id: NodeId,
    pub span: SourceSpan,
    pub name: String,
    pub declared_type: TypeIr,
    pub default_value: Option<ExprIr>,
    pub is_required: bool,
    pub position: ParamPosition,
}

impl ParameterDecl {
    /// Construct a parameter from the raw flag pair the extraction stage
    /// sees. Fails unless exactly one of `is_positional` / `is_named` holds.
    pub fn try_new(
        id: NodeId,
        span: SourceSpan,
        name: impl Into<String>,
        declared_type: TypeIr,
        default_value: Option<ExprIr>,
        is_required: bool,
        is_positional: bool,
        is_named: bool,
    ) -> Result<Self, IrError> {
        let position = match (is_positional, is_named) {
            (true, false) => ParamPosition::Positional,
            (false, true) => ParamPosition::Named,
            _ => {
                return Err(IrError::InvalidParameter(format!(
                    "parameter '{}' must be exactly one of positional/named",
                    name.into()
                )));
            }
        };
        Ok(Self {
            id,
            span,
            name: name.into(),
            declared_type,
            default_value,
            is_required,
            position,
        })
    }

    pub fn is_positional(&self) -> bool {
        self.position == ParamPosition::Positional
    }

    pub fn is_named(&self) -> bool {
        self.position == ParamPosition::Named
    }
}

/// A function or method body plus extraction metadata (widget counts,
/// source-shape notes). The metadata map is free-form and deterministic.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionBody {
    pub statements: Vec<StmtIr>,
    pub metadata: BTreeMap<String, String>,
}

impl FunctionBody {
    pub fn new(statements: Vec<StmtIr>) -> Self {
        Self {
            statements,
            metadata: BTreeMap::new(),
        }
    }
}

/// A top-level function or a class method; the two share a representation
/// and are distinguished by where they hang off `FileIr` / `ClassDecl`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub id: NodeId,
    pub span: SourceSpan,
    pub name: String,
    pub return_type: TypeIr,
    pub params: Vec<ParameterDecl>,
    /// `None` for abstract/external members.
    pub body: Option<FunctionBody>,
    pub flags: MemberFlags,
}

impl FunctionDecl {
    pub fn try_new(
        id: NodeId,
        span: SourceSpan,
        name: impl Into<String>,
        return_type: TypeIr,
        params: Vec<ParameterDecl>,
        body: Option<FunctionBody>,
        flags: MemberFlags,
    ) -> Result<Self, IrError> {
        flags.validate()?;
        Ok(Self {
            id,
            span,
            name: name.into(),
            return_type,
            params,
            body,
            flags,
        })
    }

    pub fn is_async(&self) -> bool {
        self.flags.contains(MemberFlags::ASYNC)
    }

    pub fn is_generator(&self) -> bool {
        self.flags
            .intersects(MemberFlags::GENERATOR | MemberFlags::SYNC_GENERATOR)
    }

    pub fn is_static(&self) -> bool {
        self.flags.contains(MemberFlags::STATIC)
    }

    pub fn is_abstract(&self) -> bool {
        self.flags.contains(MemberFlags::ABSTRACT)
    }

    pub fn is_getter(&self) -> bool {
        self.flags.contains(MemberFlags::GETTER)
    }

    pub fn is_setter(&self) -> bool {
        self.flags.contains(MemberFlags::SETTER)
    }
}

/// `field = value` entry in a constructor initializer list, extracted
/// verbatim into a value type (never inline expression text).
#[derive(Debug, Clone, PartialEq)]
pub struct CtorInitializer {
    pub field: String,
    pub value: ExprIr,
}

/// An explicit `super(...)` / `super.named(...)` call in the initializer
/// list.
#[derive(Debug, Clone, PartialEq)]
pub struct SuperCall {
    pub ctor_name: Option<String>,
    pub args: Vec<ExprIr>,
    pub named_args: Vec<NamedArg>,
}

/// A redirecting constructor (`Foo.a(...) : this.b(...)`).
#[derive(Debug, Clone, PartialEq)]
pub struct CtorRedirect {
    /// Target constructor name; `None` redirects to the unnamed constructor.
    pub target: Option<String>,
    pub args: Vec<ExprIr>,
    pub named_args: Vec<NamedArg>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorDecl {
    pub id: NodeId,
    pub span: SourceSpan,
    pub class_name: String,
    /// `None` for the unnamed constructor, `Some("named")` for
    /// `Class.named(...)`.
    pub name: Option<String>,
    pub params: Vec<ParameterDecl>,
    pub initializers: Vec<CtorInitializer>,
    pub super_call: Option<SuperCall>,
    pub redirect: Option<CtorRedirect>,
    pub body: Option<FunctionBody>,
    pub is_const: bool,
    pub is_factory: bool,
}

/// How a class participates in the widget model. Attached as metadata on the
/// class, never as a separate subclass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidgetKind {
    #[default]
    None,
    Stateless,
    Stateful,
    /// A `State<T>` subclass; the lifecycle and rebuild analyses apply.
    State,
}

impl WidgetKind {
    /// Classify by declared superclass name.
    pub fn from_superclass(superclass: Option<&str>) -> WidgetKind {
        match superclass {
            Some("StatelessWidget") => WidgetKind::Stateless,
            Some("StatefulWidget") => WidgetKind::Stateful,
            Some(s) if s == "State" || s.starts_with("State<") => WidgetKind::State,
            _ => WidgetKind::None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WidgetKind::None => "none",
            WidgetKind::Stateless => "stateless",
            WidgetKind::Stateful => "stateful",
            WidgetKind::State => "state",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub id: NodeId,
    pub span: SourceSpan,
    pub name: String,
    pub declared_type: TypeIr,
    pub initializer: Option<ExprIr>,
    pub is_final: bool,
    pub is_const: bool,
    pub is_static: bool,
    pub is_late: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub id: NodeId,
    pub span: SourceSpan,
    pub name: String,
    pub superclass: Option<String>,
    pub interfaces: Vec<String>,
    pub mixins: Vec<String>,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<FunctionDecl>,
    pub constructors: Vec<ConstructorDecl>,
    pub is_abstract: bool,
    pub widget_kind: WidgetKind,
}

impl ClassDecl {
    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&FunctionDecl> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn is_state_class(&self) -> bool {
        self.widget_kind == WidgetKind::State
    }
}

/// One compilation unit's worth of IR.
#[derive(Debug, Clone, PartialEq)]
pub struct FileIr {
    pub path: Arc<str>,
    pub classes: Vec<ClassDecl>,
    pub functions: Vec<FunctionDecl>,
    pub metadata: BTreeMap<String, String>,
}

impl FileIr {
    pub fn new(path: impl Into<Arc<str>>) -> Self {
        Self {
            path: path.into(),
            classes: Vec::new(),
            functions: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn class(&self, name: &str) -> Option<&ClassDecl> {
        self.classes.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::IdGenerator;

    #[test]
    fn parameter_must_be_exactly_one_position() {
        let mut ids = IdGenerator::simple();
        let both = ParameterDecl::try_new(
            ids.make("param", "", "x"),
            SourceSpan::synthetic(),
            "x",
            TypeIr::INT,
            None,
            false,
            true,
            true,
        );
        assert!(both.is_err());

        let neither = ParameterDecl::try_new(
            ids.make("param", "", "x"),
            SourceSpan::synthetic(),
            "x",
            TypeIr::INT,
            None,
            false,
            false,
            false,
        );
        assert!(neither.is_err());

        let named = ParameterDecl::try_new(
            ids.make("param", "", "x"),
            SourceSpan::synthetic(),
            "x",
            TypeIr::INT,
            None,
            true,
            false,
            true,
        )
        .expect("valid named parameter");
        assert!(named.is_named());
        assert!(!named.is_positional());
    }

    #[test]
    fn modifier_exclusions_are_enforced() {
        assert!((MemberFlags::ASYNC | MemberFlags::SYNC_GENERATOR).validate().is_err());
        assert!((MemberFlags::ASYNC | MemberFlags::GENERATOR).validate().is_err());
        assert!((MemberFlags::GENERATOR | MemberFlags::SYNC_GENERATOR).validate().is_err());
        assert!((MemberFlags::GETTER | MemberFlags::SETTER).validate().is_err());
        assert!((MemberFlags::SETTER | MemberFlags::OPERATOR).validate().is_err());
        assert!((MemberFlags::FACTORY | MemberFlags::STATIC).validate().is_err());
        assert!((MemberFlags::FACTORY | MemberFlags::ABSTRACT).validate().is_err());
        assert!((MemberFlags::CONST | MemberFlags::ASYNC).validate().is_err());
        assert!((MemberFlags::ASYNC | MemberFlags::OVERRIDE).validate().is_ok());
        assert!(MemberFlags::empty().validate().is_ok());
    }

    #[test]
    fn widget_classification_by_superclass() {
        assert_eq!(
            WidgetKind::from_superclass(Some("StatelessWidget")),
            WidgetKind::Stateless
        );
        assert_eq!(
            WidgetKind::from_superclass(Some("StatefulWidget")),
            WidgetKind::Stateful
        );
        assert_eq!(
            WidgetKind::from_superclass(Some("State<Counter>")),
            WidgetKind::State
        );
        assert_eq!(WidgetKind::from_superclass(Some("Animal")), WidgetKind::None);
        assert_eq!(WidgetKind::from_superclass(None), WidgetKind::None);
    }
}
