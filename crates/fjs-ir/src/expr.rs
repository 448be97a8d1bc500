//! Expression IR.
//!
//! One shared base struct (`ExprIr`) carrying identity and source span, plus
//! a closed `ExprKind` union. Children are boxed; the tree owns its nodes
//! outright (no back references), so plain ownership is enough and no arena
//! is needed at this layer.

use crate::ids::NodeId;
use crate::ty::TypeIr;
use fjs_common::SourceSpan;
use std::fmt;

/// Literal constant values. Doubles keep their bit pattern through
/// serialization; content equality compares them with `==` (NaN literals do
/// not occur in valid Dart source).
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Int(i64),
    Double(f64),
    Bool(bool),
    String(String),
    Null,
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Int(v) => write!(f, "{v}"),
            LiteralValue::Double(v) => write!(f, "{v}"),
            LiteralValue::Bool(v) => write!(f, "{v}"),
            LiteralValue::String(v) => write!(f, "{v:?}"),
            LiteralValue::Null => f.write_str("null"),
        }
    }
}

/// Binary operators, Dart spelling. `IntDiv` is `~/`, which has no JS
/// equivalent and is lowered by the emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    IntDiv,
    Mod,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinaryOp {
    pub fn from_dart(op: &str) -> Option<BinaryOp> {
        Some(match op {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "~/" => BinaryOp::IntDiv,
            "%" => BinaryOp::Mod,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::Ne,
            "<" => BinaryOp::Lt,
            ">" => BinaryOp::Gt,
            "<=" => BinaryOp::Le,
            ">=" => BinaryOp::Ge,
            "&&" => BinaryOp::And,
            "||" => BinaryOp::Or,
            "&" => BinaryOp::BitAnd,
            "|" => BinaryOp::BitOr,
            "^" => BinaryOp::BitXor,
            "<<" => BinaryOp::Shl,
            ">>" => BinaryOp::Shr,
            _ => return None,
        })
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::IntDiv => "~/",
            BinaryOp::Mod => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
        }
    }

    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge
        )
    }

    pub const fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub const fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::IntDiv | BinaryOp::Mod
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// `-x`
    Neg,
    /// `!x`
    Not,
    /// `~x`
    BitNot,
    /// `++x` / `x++`
    Inc,
    /// `--x` / `x--`
    Dec,
}

impl UnaryOp {
    pub fn from_dart(op: &str) -> Option<UnaryOp> {
        Some(match op {
            "-" => UnaryOp::Neg,
            "!" => UnaryOp::Not,
            "~" => UnaryOp::BitNot,
            "++" => UnaryOp::Inc,
            "--" => UnaryOp::Dec,
            _ => return None,
        })
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::Inc => "++",
            UnaryOp::Dec => "--",
        }
    }
}

/// A named argument in a call or constructor invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedArg {
    pub name: String,
    pub value: ExprIr,
}

/// One section of a cascade (`..method(...)` or `..prop = value`).
#[derive(Debug, Clone, PartialEq)]
pub enum CascadeSection {
    MethodCall {
        method: String,
        args: Vec<ExprIr>,
        named_args: Vec<NamedArg>,
    },
    PropertySet {
        property: String,
        value: ExprIr,
    },
}

/// One piece of an interpolated string.
#[derive(Debug, Clone, PartialEq)]
pub enum InterpolationPart {
    Text(String),
    Expr(Box<ExprIr>),
}

/// Expression node: shared base plus closed kind union.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprIr {
    pub id: NodeId,
    pub span: SourceSpan,
    pub kind: ExprKind,
}

/// The closed expression variant set.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// `42`, `3.14`, `'hi'`, `true`, `null`
    Literal(LiteralValue),

    /// `foo`
    Identifier { name: String },

    /// `left op right`
    Binary {
        op: BinaryOp,
        left: Box<ExprIr>,
        right: Box<ExprIr>,
    },

    /// `-x`, `!x`, `x++`
    Unary {
        op: UnaryOp,
        operand: Box<ExprIr>,
        prefix: bool,
    },

    /// `target.method(args)`; `target == None` is a bare function call.
    MethodCall {
        target: Option<Box<ExprIr>>,
        method: String,
        args: Vec<ExprIr>,
        named_args: Vec<NamedArg>,
    },

    /// `target.property`
    PropertyAccess {
        target: Box<ExprIr>,
        property: String,
    },

    /// `target[index]`
    IndexAccess {
        target: Box<ExprIr>,
        index: Box<ExprIr>,
    },

    /// `cond ? a : b`
    Conditional {
        condition: Box<ExprIr>,
        then_expr: Box<ExprIr>,
        else_expr: Box<ExprIr>,
    },

    /// `target = value`
    Assignment {
        target: Box<ExprIr>,
        value: Box<ExprIr>,
    },

    /// `target op= value`
    CompoundAssignment {
        op: BinaryOp,
        target: Box<ExprIr>,
        value: Box<ExprIr>,
    },

    /// `operand as T`
    Cast {
        operand: Box<ExprIr>,
        target_type: TypeIr,
    },

    /// `operand is T` / `operand is! T`
    IsCheck {
        operand: Box<ExprIr>,
        tested_type: TypeIr,
        negated: bool,
    },

    /// `target..a()..b = c`
    Cascade {
        target: Box<ExprIr>,
        sections: Vec<CascadeSection>,
    },

    /// `target?.property`
    NullAwareAccess {
        target: Box<ExprIr>,
        property: String,
    },

    /// `left ?? right`
    NullCoalescing {
        left: Box<ExprIr>,
        right: Box<ExprIr>,
    },

    /// `[a, b, c]`
    ListLiteral { elements: Vec<ExprIr> },

    /// `{k: v, ...}`
    MapLiteral { entries: Vec<(ExprIr, ExprIr)> },

    /// `{a, b, c}`
    SetLiteral { elements: Vec<ExprIr> },

    /// `'count: $count'`
    StringInterpolation { parts: Vec<InterpolationPart> },

    /// `ClassName(...)`, `ClassName.named(...)`, `const ClassName(...)`
    ConstructorCall {
        class_name: String,
        ctor_name: Option<String>,
        args: Vec<ExprIr>,
        named_args: Vec<NamedArg>,
        is_const: bool,
    },

    /// `(a, b) { ... }` / `(a) => expr`
    FunctionExpr {
        params: Vec<String>,
        body: Vec<crate::stmt::StmtIr>,
    },

    /// `this`
    This,

    /// `super`
    Super,

    /// `(inner)` — grouping preserved from source; emission re-derives
    /// parenthesization from precedence, so this only affects `is_constant`
    /// and debugging output.
    Parenthesized { inner: Box<ExprIr> },
}

impl ExprIr {
    pub fn new(id: NodeId, span: SourceSpan, kind: ExprKind) -> Self {
        Self { id, span, kind }
    }

    /// Whether the expression is a compile-time constant. Derived
    /// structurally on demand rather than stored, so it can never go stale.
    pub fn is_constant(&self) -> bool {
        match &self.kind {
            ExprKind::Literal(_) => true,
            ExprKind::Unary { op, operand, .. } => {
                matches!(op, UnaryOp::Neg | UnaryOp::Not | UnaryOp::BitNot) && operand.is_constant()
            }
            ExprKind::Binary { left, right, .. } => left.is_constant() && right.is_constant(),
            ExprKind::Parenthesized { inner } => inner.is_constant(),
            ExprKind::ConstructorCall { is_const, args, named_args, .. } => {
                *is_const
                    && args.iter().all(ExprIr::is_constant)
                    && named_args.iter().all(|a| a.value.is_constant())
            }
            ExprKind::ListLiteral { elements } | ExprKind::SetLiteral { elements } => {
                elements.iter().all(ExprIr::is_constant)
            }
            ExprKind::MapLiteral { entries } => entries
                .iter()
                .all(|(k, v)| k.is_constant() && v.is_constant()),
            ExprKind::StringInterpolation { parts } => parts
                .iter()
                .all(|p| matches!(p, InterpolationPart::Text(_))),
            _ => false,
        }
    }

    /// Discriminator string used by serialization and debug output.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ExprKind::Literal(_) => "literal",
            ExprKind::Identifier { .. } => "identifier",
            ExprKind::Binary { .. } => "binary",
            ExprKind::Unary { .. } => "unary",
            ExprKind::MethodCall { .. } => "methodCall",
            ExprKind::PropertyAccess { .. } => "propertyAccess",
            ExprKind::IndexAccess { .. } => "indexAccess",
            ExprKind::Conditional { .. } => "conditional",
            ExprKind::Assignment { .. } => "assignment",
            ExprKind::CompoundAssignment { .. } => "compoundAssignment",
            ExprKind::Cast { .. } => "cast",
            ExprKind::IsCheck { .. } => "is",
            ExprKind::Cascade { .. } => "cascade",
            ExprKind::NullAwareAccess { .. } => "nullAwareAccess",
            ExprKind::NullCoalescing { .. } => "nullCoalescing",
            ExprKind::ListLiteral { .. } => "listLiteral",
            ExprKind::MapLiteral { .. } => "mapLiteral",
            ExprKind::SetLiteral { .. } => "setLiteral",
            ExprKind::StringInterpolation { .. } => "stringInterpolation",
            ExprKind::ConstructorCall { .. } => "constructorCall",
            ExprKind::FunctionExpr { .. } => "functionExpr",
            ExprKind::This => "this",
            ExprKind::Super => "super",
            ExprKind::Parenthesized { .. } => "parenthesized",
        }
    }

    /// One-line debug rendering.
    pub fn to_short_string(&self) -> String {
        match &self.kind {
            ExprKind::Literal(v) => format!("lit({v})"),
            ExprKind::Identifier { name } => format!("id({name})"),
            ExprKind::Binary { op, .. } => format!("binary({})", op.as_str()),
            ExprKind::Unary { op, .. } => format!("unary({})", op.as_str()),
            ExprKind::MethodCall { method, .. } => format!("call({method})"),
            ExprKind::PropertyAccess { property, .. } => format!("prop({property})"),
            ExprKind::ConstructorCall { class_name, ctor_name, .. } => match ctor_name {
                Some(n) => format!("new({class_name}.{n})"),
                None => format!("new({class_name})"),
            },
            other_kind => format!("{}", kind_label(other_kind)),
        }
    }
}

fn kind_label(kind: &ExprKind) -> &'static str {
    match kind {
        ExprKind::IndexAccess { .. } => "index",
        ExprKind::Conditional { .. } => "conditional",
        ExprKind::Assignment { .. } => "assign",
        ExprKind::CompoundAssignment { .. } => "compoundAssign",
        ExprKind::Cast { .. } => "cast",
        ExprKind::IsCheck { .. } => "is",
        ExprKind::Cascade { .. } => "cascade",
        ExprKind::NullAwareAccess { .. } => "nullAware",
        ExprKind::NullCoalescing { .. } => "nullCoalesce",
        ExprKind::ListLiteral { .. } => "list",
        ExprKind::MapLiteral { .. } => "map",
        ExprKind::SetLiteral { .. } => "set",
        ExprKind::StringInterpolation { .. } => "interp",
        ExprKind::FunctionExpr { .. } => "lambda",
        ExprKind::This => "this",
        ExprKind::Super => "super",
        ExprKind::Parenthesized { .. } => "paren",
        _ => "expr",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::IdGenerator;

    fn lit(ids: &mut IdGenerator, v: LiteralValue) -> ExprIr {
        ExprIr::new(
            ids.make("expr", "", ""),
            SourceSpan::synthetic(),
            ExprKind::Literal(v),
        )
    }

    #[test]
    fn constness_is_structural() {
        let mut ids = IdGenerator::simple();
        let one = lit(&mut ids, LiteralValue::Int(1));
        let two = lit(&mut ids, LiteralValue::Int(2));
        let sum = ExprIr::new(
            ids.make("expr", "", ""),
            SourceSpan::synthetic(),
            ExprKind::Binary {
                op: BinaryOp::Add,
                left: Box::new(one),
                right: Box::new(two),
            },
        );
        assert!(sum.is_constant());

        let read = ExprIr::new(
            ids.make("expr", "", ""),
            SourceSpan::synthetic(),
            ExprKind::Identifier { name: "count".into() },
        );
        let mixed = ExprIr::new(
            ids.make("expr", "", ""),
            SourceSpan::synthetic(),
            ExprKind::Binary {
                op: BinaryOp::Add,
                left: Box::new(sum),
                right: Box::new(read),
            },
        );
        assert!(!mixed.is_constant());
    }

    #[test]
    fn const_constructor_call_is_constant_only_with_const_args() {
        let mut ids = IdGenerator::simple();
        let call = ExprIr::new(
            ids.make("expr", "", ""),
            SourceSpan::synthetic(),
            ExprKind::ConstructorCall {
                class_name: "EdgeInsets".into(),
                ctor_name: Some("all".into()),
                args: vec![lit(&mut ids, LiteralValue::Double(8.0))],
                named_args: vec![],
                is_const: true,
            },
        );
        assert!(call.is_constant());
    }

    #[test]
    fn operator_tables_round_trip() {
        for op in ["+", "-", "*", "/", "~/", "%", "==", "!=", "<", ">", "<=", ">=", "&&", "||", "&", "|", "^", "<<", ">>"] {
            let parsed = BinaryOp::from_dart(op).expect("known operator");
            assert_eq!(parsed.as_str(), op);
        }
        assert!(BinaryOp::from_dart("??").is_none());
    }
}
