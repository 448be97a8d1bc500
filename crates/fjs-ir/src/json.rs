//! IR serialization.
//!
//! Every node serializes to `{id, sourceLocation, kind, <kind fields>}` and
//! reconstructs through a `from_json` that is total over the closed
//! discriminator set. An unrecognized discriminator is `UnknownNodeKind` and
//! fatal for that subtree: this boundary is trusted, unlike analysis-time
//! issues which degrade gracefully.
//!
//! `content_equals` compares two nodes structurally, ignoring identity
//! (node ids) and source locations; it is the round-trip test predicate.

use crate::decl::{
    ClassDecl, ConstructorDecl, CtorInitializer, CtorRedirect, FieldDecl, FileIr, FunctionBody,
    FunctionDecl, MemberFlags, ParameterDecl, SuperCall, WidgetKind,
};
use crate::expr::{
    BinaryOp, CascadeSection, ExprIr, ExprKind, InterpolationPart, LiteralValue, NamedArg, UnaryOp,
};
use crate::ids::NodeId;
use crate::stmt::{CatchClause, StmtIr, StmtKind};
use crate::ty::TypeIr;
use fjs_common::SourceSpan;
use serde_json::{Value, json};
use std::fmt;

// =============================================================================
// Errors
// =============================================================================

/// Fatal IR construction/deserialization failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrError {
    /// Serialized discriminator outside the closed set. Fatal for the
    /// subtree being reconstructed.
    UnknownNodeKind { kind: String },
    MissingField { field: String },
    InvalidField { field: String, reason: String },
    InvalidParameter(String),
    InvalidModifiers(String),
}

impl fmt::Display for IrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrError::UnknownNodeKind { kind } => write!(f, "unknown IR node kind '{kind}'"),
            IrError::MissingField { field } => write!(f, "missing field '{field}'"),
            IrError::InvalidField { field, reason } => {
                write!(f, "invalid field '{field}': {reason}")
            }
            IrError::InvalidParameter(msg) => write!(f, "invalid parameter: {msg}"),
            IrError::InvalidModifiers(msg) => write!(f, "invalid modifiers: {msg}"),
        }
    }
}

impl std::error::Error for IrError {}

// =============================================================================
// Helpers
// =============================================================================

fn field<'a>(v: &'a Value, name: &str) -> Result<&'a Value, IrError> {
    v.get(name).ok_or_else(|| IrError::MissingField {
        field: name.to_string(),
    })
}

fn opt_field<'a>(v: &'a Value, name: &str) -> Option<&'a Value> {
    match v.get(name) {
        Some(Value::Null) | None => None,
        Some(other) => Some(other),
    }
}

fn str_field<'a>(v: &'a Value, name: &str) -> Result<&'a str, IrError> {
    field(v, name)?.as_str().ok_or_else(|| IrError::InvalidField {
        field: name.to_string(),
        reason: "expected string".to_string(),
    })
}

fn bool_field(v: &Value, name: &str) -> Result<bool, IrError> {
    field(v, name)?.as_bool().ok_or_else(|| IrError::InvalidField {
        field: name.to_string(),
        reason: "expected bool".to_string(),
    })
}

fn opt_bool_field(v: &Value, name: &str) -> bool {
    v.get(name).and_then(Value::as_bool).unwrap_or(false)
}

fn array_field<'a>(v: &'a Value, name: &str) -> Result<&'a [Value], IrError> {
    field(v, name)?
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| IrError::InvalidField {
            field: name.to_string(),
            reason: "expected array".to_string(),
        })
}

fn opt_array<'a>(v: &'a Value, name: &str) -> &'a [Value] {
    v.get(name).and_then(Value::as_array).map_or(&[], Vec::as_slice)
}

fn id_from(v: &Value) -> Result<NodeId, IrError> {
    Ok(NodeId::from_raw(str_field(v, "id")?))
}

fn span_from(v: &Value) -> Result<SourceSpan, IrError> {
    let loc = field(v, "sourceLocation")?;
    serde_json::from_value(loc.clone()).map_err(|e| IrError::InvalidField {
        field: "sourceLocation".to_string(),
        reason: e.to_string(),
    })
}

fn type_json(ty: &TypeIr) -> Value {
    serde_json::to_value(ty).unwrap_or(Value::Null)
}

fn type_from(v: &Value, name: &str) -> Result<TypeIr, IrError> {
    serde_json::from_value(field(v, name)?.clone()).map_err(|e| IrError::InvalidField {
        field: name.to_string(),
        reason: e.to_string(),
    })
}

fn opt_type_from(v: &Value, name: &str) -> Result<Option<TypeIr>, IrError> {
    match opt_field(v, name) {
        None => Ok(None),
        Some(val) => serde_json::from_value(val.clone())
            .map(Some)
            .map_err(|e| IrError::InvalidField {
                field: name.to_string(),
                reason: e.to_string(),
            }),
    }
}

fn exprs_json(exprs: &[ExprIr]) -> Value {
    Value::Array(exprs.iter().map(ExprIr::to_json).collect())
}

fn exprs_from(values: &[Value]) -> Result<Vec<ExprIr>, IrError> {
    values.iter().map(ExprIr::from_json).collect()
}

fn opt_expr_json(expr: Option<&ExprIr>) -> Value {
    expr.map_or(Value::Null, ExprIr::to_json)
}

fn opt_expr_from(v: &Value, name: &str) -> Result<Option<ExprIr>, IrError> {
    opt_field(v, name).map(ExprIr::from_json).transpose()
}

fn named_args_json(args: &[NamedArg]) -> Value {
    Value::Array(
        args.iter()
            .map(|a| json!({ "name": a.name, "value": a.value.to_json() }))
            .collect(),
    )
}

fn named_args_from(values: &[Value]) -> Result<Vec<NamedArg>, IrError> {
    values
        .iter()
        .map(|v| {
            Ok(NamedArg {
                name: str_field(v, "name")?.to_string(),
                value: ExprIr::from_json(field(v, "value")?)?,
            })
        })
        .collect()
}

fn stmts_json(stmts: &[StmtIr]) -> Value {
    Value::Array(stmts.iter().map(StmtIr::to_json).collect())
}

fn stmts_from(values: &[Value]) -> Result<Vec<StmtIr>, IrError> {
    values.iter().map(StmtIr::from_json).collect()
}

fn base_json(id: &NodeId, span: &SourceSpan, kind: &str) -> Value {
    json!({
        "id": id.as_str(),
        "sourceLocation": span,
        "kind": kind,
    })
}

fn merge(mut base: Value, extra: Value) -> Value {
    if let (Value::Object(b), Value::Object(e)) = (&mut base, extra) {
        for (k, v) in e {
            b.insert(k, v);
        }
    }
    base
}

// =============================================================================
// Serialization trait
// =============================================================================

/// Implemented by every IR family that participates in the JSON contract.
pub trait ToJson {
    fn to_json(&self) -> Value;
}

impl ToJson for ExprIr {
    fn to_json(&self) -> Value {
        ExprIr::to_json(self)
    }
}

impl ToJson for StmtIr {
    fn to_json(&self) -> Value {
        StmtIr::to_json(self)
    }
}

impl ToJson for ParameterDecl {
    fn to_json(&self) -> Value {
        ParameterDecl::to_json(self)
    }
}

impl ToJson for FunctionDecl {
    fn to_json(&self) -> Value {
        FunctionDecl::to_json(self)
    }
}

impl ToJson for ConstructorDecl {
    fn to_json(&self) -> Value {
        ConstructorDecl::to_json(self)
    }
}

impl ToJson for FieldDecl {
    fn to_json(&self) -> Value {
        FieldDecl::to_json(self)
    }
}

impl ToJson for ClassDecl {
    fn to_json(&self) -> Value {
        ClassDecl::to_json(self)
    }
}

impl ToJson for FileIr {
    fn to_json(&self) -> Value {
        FileIr::to_json(self)
    }
}

/// Deep structural comparison ignoring node identity: serialized forms are
/// compared with `id` and `sourceLocation` stripped recursively.
pub fn content_equals<T: ToJson + ?Sized>(a: &T, b: &T) -> bool {
    strip_identity(a.to_json()) == strip_identity(b.to_json())
}

fn strip_identity(v: Value) -> Value {
    match v {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(k, _)| k != "id" && k != "sourceLocation")
                .map(|(k, v)| (k, strip_identity(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_identity).collect()),
        other => other,
    }
}

// =============================================================================
// Expressions
// =============================================================================

impl ExprIr {
    pub fn to_json(&self) -> Value {
        let base = base_json(&self.id, &self.span, self.kind_name());
        let extra = match &self.kind {
            ExprKind::Literal(value) => match value {
                LiteralValue::Int(v) => json!({ "literalType": "int", "value": v }),
                LiteralValue::Double(v) => json!({ "literalType": "double", "value": v }),
                LiteralValue::Bool(v) => json!({ "literalType": "bool", "value": v }),
                LiteralValue::String(v) => json!({ "literalType": "string", "value": v }),
                LiteralValue::Null => json!({ "literalType": "null" }),
            },
            ExprKind::Identifier { name } => json!({ "name": name }),
            ExprKind::Binary { op, left, right } => json!({
                "op": op.as_str(),
                "left": left.to_json(),
                "right": right.to_json(),
            }),
            ExprKind::Unary { op, operand, prefix } => json!({
                "op": op.as_str(),
                "operand": operand.to_json(),
                "prefix": prefix,
            }),
            ExprKind::MethodCall { target, method, args, named_args } => json!({
                "target": opt_expr_json(target.as_deref()),
                "method": method,
                "args": exprs_json(args),
                "namedArgs": named_args_json(named_args),
            }),
            ExprKind::PropertyAccess { target, property } => json!({
                "target": target.to_json(),
                "property": property,
            }),
            ExprKind::IndexAccess { target, index } => json!({
                "target": target.to_json(),
                "index": index.to_json(),
            }),
            ExprKind::Conditional { condition, then_expr, else_expr } => json!({
                "condition": condition.to_json(),
                "then": then_expr.to_json(),
                "else": else_expr.to_json(),
            }),
            ExprKind::Assignment { target, value } => json!({
                "target": target.to_json(),
                "value": value.to_json(),
            }),
            ExprKind::CompoundAssignment { op, target, value } => json!({
                "op": op.as_str(),
                "target": target.to_json(),
                "value": value.to_json(),
            }),
            ExprKind::Cast { operand, target_type } => json!({
                "operand": operand.to_json(),
                "targetType": type_json(target_type),
            }),
            ExprKind::IsCheck { operand, tested_type, negated } => json!({
                "operand": operand.to_json(),
                "testedType": type_json(tested_type),
                "negated": negated,
            }),
            ExprKind::Cascade { target, sections } => json!({
                "target": target.to_json(),
                "sections": sections.iter().map(cascade_section_json).collect::<Vec<_>>(),
            }),
            ExprKind::NullAwareAccess { target, property } => json!({
                "target": target.to_json(),
                "property": property,
            }),
            ExprKind::NullCoalescing { left, right } => json!({
                "left": left.to_json(),
                "right": right.to_json(),
            }),
            ExprKind::ListLiteral { elements } => json!({ "elements": exprs_json(elements) }),
            ExprKind::MapLiteral { entries } => json!({
                "entries": entries
                    .iter()
                    .map(|(k, v)| json!({ "key": k.to_json(), "value": v.to_json() }))
                    .collect::<Vec<_>>(),
            }),
            ExprKind::SetLiteral { elements } => json!({ "elements": exprs_json(elements) }),
            ExprKind::StringInterpolation { parts } => json!({
                "parts": parts
                    .iter()
                    .map(|p| match p {
                        InterpolationPart::Text(t) => json!({ "text": t }),
                        InterpolationPart::Expr(e) => json!({ "expr": e.to_json() }),
                    })
                    .collect::<Vec<_>>(),
            }),
            ExprKind::ConstructorCall { class_name, ctor_name, args, named_args, is_const } => json!({
                "className": class_name,
                "ctorName": ctor_name,
                "args": exprs_json(args),
                "namedArgs": named_args_json(named_args),
                "isConst": is_const,
            }),
            ExprKind::FunctionExpr { params, body } => json!({
                "params": params,
                "body": stmts_json(body),
            }),
            ExprKind::This | ExprKind::Super => json!({}),
            ExprKind::Parenthesized { inner } => json!({ "inner": inner.to_json() }),
        };
        merge(base, extra)
    }

    /// Total over the closed discriminator set; anything else is
    /// `IrError::UnknownNodeKind`.
    pub fn from_json(v: &Value) -> Result<ExprIr, IrError> {
        let id = id_from(v)?;
        let span = span_from(v)?;
        let kind_tag = str_field(v, "kind")?;

        let kind = match kind_tag {
            "literal" => ExprKind::Literal(literal_from(v)?),
            "identifier" => ExprKind::Identifier {
                name: str_field(v, "name")?.to_string(),
            },
            "binary" => ExprKind::Binary {
                op: binary_op_from(v)?,
                left: Box::new(ExprIr::from_json(field(v, "left")?)?),
                right: Box::new(ExprIr::from_json(field(v, "right")?)?),
            },
            "unary" => {
                let op_str = str_field(v, "op")?;
                ExprKind::Unary {
                    op: UnaryOp::from_dart(op_str).ok_or_else(|| IrError::InvalidField {
                        field: "op".to_string(),
                        reason: format!("unknown unary operator '{op_str}'"),
                    })?,
                    operand: Box::new(ExprIr::from_json(field(v, "operand")?)?),
                    prefix: bool_field(v, "prefix")?,
                }
            }
            "methodCall" => ExprKind::MethodCall {
                target: opt_expr_from(v, "target")?.map(Box::new),
                method: str_field(v, "method")?.to_string(),
                args: exprs_from(array_field(v, "args")?)?,
                named_args: named_args_from(opt_array(v, "namedArgs"))?,
            },
            "propertyAccess" => ExprKind::PropertyAccess {
                target: Box::new(ExprIr::from_json(field(v, "target")?)?),
                property: str_field(v, "property")?.to_string(),
            },
            "indexAccess" => ExprKind::IndexAccess {
                target: Box::new(ExprIr::from_json(field(v, "target")?)?),
                index: Box::new(ExprIr::from_json(field(v, "index")?)?),
            },
            "conditional" => ExprKind::Conditional {
                condition: Box::new(ExprIr::from_json(field(v, "condition")?)?),
                then_expr: Box::new(ExprIr::from_json(field(v, "then")?)?),
                else_expr: Box::new(ExprIr::from_json(field(v, "else")?)?),
            },
            "assignment" => ExprKind::Assignment {
                target: Box::new(ExprIr::from_json(field(v, "target")?)?),
                value: Box::new(ExprIr::from_json(field(v, "value")?)?),
            },
            "compoundAssignment" => ExprKind::CompoundAssignment {
                op: binary_op_from(v)?,
                target: Box::new(ExprIr::from_json(field(v, "target")?)?),
                value: Box::new(ExprIr::from_json(field(v, "value")?)?),
            },
            "cast" => ExprKind::Cast {
                operand: Box::new(ExprIr::from_json(field(v, "operand")?)?),
                target_type: type_from(v, "targetType")?,
            },
            "is" => ExprKind::IsCheck {
                operand: Box::new(ExprIr::from_json(field(v, "operand")?)?),
                tested_type: type_from(v, "testedType")?,
                negated: bool_field(v, "negated")?,
            },
            "cascade" => ExprKind::Cascade {
                target: Box::new(ExprIr::from_json(field(v, "target")?)?),
                sections: array_field(v, "sections")?
                    .iter()
                    .map(cascade_section_from)
                    .collect::<Result<_, _>>()?,
            },
            "nullAwareAccess" => ExprKind::NullAwareAccess {
                target: Box::new(ExprIr::from_json(field(v, "target")?)?),
                property: str_field(v, "property")?.to_string(),
            },
            "nullCoalescing" => ExprKind::NullCoalescing {
                left: Box::new(ExprIr::from_json(field(v, "left")?)?),
                right: Box::new(ExprIr::from_json(field(v, "right")?)?),
            },
            "listLiteral" => ExprKind::ListLiteral {
                elements: exprs_from(array_field(v, "elements")?)?,
            },
            "mapLiteral" => ExprKind::MapLiteral {
                entries: array_field(v, "entries")?
                    .iter()
                    .map(|e| {
                        Ok((
                            ExprIr::from_json(field(e, "key")?)?,
                            ExprIr::from_json(field(e, "value")?)?,
                        ))
                    })
                    .collect::<Result<_, IrError>>()?,
            },
            "setLiteral" => ExprKind::SetLiteral {
                elements: exprs_from(array_field(v, "elements")?)?,
            },
            "stringInterpolation" => ExprKind::StringInterpolation {
                parts: array_field(v, "parts")?
                    .iter()
                    .map(|p| {
                        if let Some(text) = p.get("text").and_then(Value::as_str) {
                            Ok(InterpolationPart::Text(text.to_string()))
                        } else {
                            Ok(InterpolationPart::Expr(Box::new(ExprIr::from_json(
                                field(p, "expr")?,
                            )?)))
                        }
                    })
                    .collect::<Result<_, IrError>>()?,
            },
            "constructorCall" => ExprKind::ConstructorCall {
                class_name: str_field(v, "className")?.to_string(),
                ctor_name: opt_field(v, "ctorName")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                args: exprs_from(array_field(v, "args")?)?,
                named_args: named_args_from(opt_array(v, "namedArgs"))?,
                is_const: bool_field(v, "isConst")?,
            },
            "functionExpr" => ExprKind::FunctionExpr {
                params: array_field(v, "params")?
                    .iter()
                    .map(|p| {
                        p.as_str().map(str::to_string).ok_or_else(|| IrError::InvalidField {
                            field: "params".to_string(),
                            reason: "expected string".to_string(),
                        })
                    })
                    .collect::<Result<_, _>>()?,
                body: stmts_from(array_field(v, "body")?)?,
            },
            "this" => ExprKind::This,
            "super" => ExprKind::Super,
            "parenthesized" => ExprKind::Parenthesized {
                inner: Box::new(ExprIr::from_json(field(v, "inner")?)?),
            },
            unknown => {
                return Err(IrError::UnknownNodeKind {
                    kind: unknown.to_string(),
                });
            }
        };

        Ok(ExprIr { id, span, kind })
    }
}

fn binary_op_from(v: &Value) -> Result<BinaryOp, IrError> {
    let op_str = str_field(v, "op")?;
    BinaryOp::from_dart(op_str).ok_or_else(|| IrError::InvalidField {
        field: "op".to_string(),
        reason: format!("unknown binary operator '{op_str}'"),
    })
}

fn literal_from(v: &Value) -> Result<LiteralValue, IrError> {
    let lit_type = str_field(v, "literalType")?;
    let invalid = |reason: &str| IrError::InvalidField {
        field: "value".to_string(),
        reason: reason.to_string(),
    };
    Ok(match lit_type {
        "int" => LiteralValue::Int(
            field(v, "value")?
                .as_i64()
                .ok_or_else(|| invalid("expected integer"))?,
        ),
        "double" => LiteralValue::Double(
            field(v, "value")?
                .as_f64()
                .ok_or_else(|| invalid("expected number"))?,
        ),
        "bool" => LiteralValue::Bool(
            field(v, "value")?
                .as_bool()
                .ok_or_else(|| invalid("expected bool"))?,
        ),
        "string" => LiteralValue::String(str_field(v, "value")?.to_string()),
        "null" => LiteralValue::Null,
        other => {
            return Err(IrError::InvalidField {
                field: "literalType".to_string(),
                reason: format!("unknown literal type '{other}'"),
            });
        }
    })
}

fn cascade_section_json(section: &CascadeSection) -> Value {
    match section {
        CascadeSection::MethodCall { method, args, named_args } => json!({
            "sectionKind": "methodCall",
            "method": method,
            "args": exprs_json(args),
            "namedArgs": named_args_json(named_args),
        }),
        CascadeSection::PropertySet { property, value } => json!({
            "sectionKind": "propertySet",
            "property": property,
            "value": value.to_json(),
        }),
    }
}

fn cascade_section_from(v: &Value) -> Result<CascadeSection, IrError> {
    match str_field(v, "sectionKind")? {
        "methodCall" => Ok(CascadeSection::MethodCall {
            method: str_field(v, "method")?.to_string(),
            args: exprs_from(array_field(v, "args")?)?,
            named_args: named_args_from(opt_array(v, "namedArgs"))?,
        }),
        "propertySet" => Ok(CascadeSection::PropertySet {
            property: str_field(v, "property")?.to_string(),
            value: ExprIr::from_json(field(v, "value")?)?,
        }),
        unknown => Err(IrError::UnknownNodeKind {
            kind: format!("cascadeSection:{unknown}"),
        }),
    }
}

// =============================================================================
// Statements
// =============================================================================

impl StmtIr {
    pub fn to_json(&self) -> Value {
        let base = base_json(&self.id, &self.span, self.kind_name());
        let extra = match &self.kind {
            StmtKind::Block(stmts) => json!({ "statements": stmts_json(stmts) }),
            StmtKind::If { condition, then_branch, else_branch } => json!({
                "condition": condition.to_json(),
                "then": stmts_json(then_branch),
                "else": else_branch.as_ref().map_or(Value::Null, |b| stmts_json(b)),
            }),
            StmtKind::For { init, condition, update, body } => json!({
                "init": init.as_ref().map_or(Value::Null, |s| s.to_json()),
                "condition": opt_expr_json(condition.as_ref()),
                "update": opt_expr_json(update.as_ref()),
                "body": stmts_json(body),
            }),
            StmtKind::ForIn { variable, iterable, body } => json!({
                "variable": variable,
                "iterable": iterable.to_json(),
                "body": stmts_json(body),
            }),
            StmtKind::While { condition, body, is_do_while } => json!({
                "condition": condition.to_json(),
                "body": stmts_json(body),
                "isDoWhile": is_do_while,
            }),
            StmtKind::Return(value) => json!({ "value": opt_expr_json(value.as_ref()) }),
            StmtKind::Break | StmtKind::Continue => json!({}),
            StmtKind::Throw(value) => json!({ "value": value.to_json() }),
            StmtKind::TryCatch { body, catch_clauses, finally_block } => json!({
                "body": stmts_json(body),
                "catchClauses": catch_clauses
                    .iter()
                    .map(|c| json!({
                        "exceptionType": c.exception_type.as_ref().map_or(Value::Null, type_json),
                        "exceptionVar": c.exception_var,
                        "stackVar": c.stack_var,
                        "body": stmts_json(&c.body),
                    }))
                    .collect::<Vec<_>>(),
                "finally": finally_block.as_ref().map_or(Value::Null, |b| stmts_json(b)),
            }),
            StmtKind::VariableDecl { name, declared_type, initializer, is_final, is_const } => json!({
                "name": name,
                "declaredType": declared_type.as_ref().map_or(Value::Null, type_json),
                "initializer": opt_expr_json(initializer.as_ref()),
                "isFinal": is_final,
                "isConst": is_const,
            }),
            StmtKind::ExpressionStmt(expr) => json!({ "expression": expr.to_json() }),
        };
        merge(base, extra)
    }

    pub fn from_json(v: &Value) -> Result<StmtIr, IrError> {
        let id = id_from(v)?;
        let span = span_from(v)?;
        let kind_tag = str_field(v, "kind")?;

        let kind = match kind_tag {
            "block" => StmtKind::Block(stmts_from(array_field(v, "statements")?)?),
            "if" => StmtKind::If {
                condition: ExprIr::from_json(field(v, "condition")?)?,
                then_branch: stmts_from(array_field(v, "then")?)?,
                else_branch: match opt_field(v, "else") {
                    None => None,
                    Some(b) => Some(stmts_from(b.as_array().map(Vec::as_slice).unwrap_or(&[]))?),
                },
            },
            "for" => StmtKind::For {
                init: opt_field(v, "init").map(StmtIr::from_json).transpose()?.map(Box::new),
                condition: opt_expr_from(v, "condition")?,
                update: opt_expr_from(v, "update")?,
                body: stmts_from(array_field(v, "body")?)?,
            },
            "forIn" => StmtKind::ForIn {
                variable: str_field(v, "variable")?.to_string(),
                iterable: ExprIr::from_json(field(v, "iterable")?)?,
                body: stmts_from(array_field(v, "body")?)?,
            },
            "while" => StmtKind::While {
                condition: ExprIr::from_json(field(v, "condition")?)?,
                body: stmts_from(array_field(v, "body")?)?,
                is_do_while: bool_field(v, "isDoWhile")?,
            },
            "return" => StmtKind::Return(opt_expr_from(v, "value")?),
            "break" => StmtKind::Break,
            "continue" => StmtKind::Continue,
            "throw" => StmtKind::Throw(ExprIr::from_json(field(v, "value")?)?),
            "tryCatch" => StmtKind::TryCatch {
                body: stmts_from(array_field(v, "body")?)?,
                catch_clauses: array_field(v, "catchClauses")?
                    .iter()
                    .map(|c| {
                        Ok(CatchClause {
                            exception_type: opt_type_from(c, "exceptionType")?,
                            exception_var: opt_field(c, "exceptionVar")
                                .and_then(Value::as_str)
                                .map(str::to_string),
                            stack_var: opt_field(c, "stackVar")
                                .and_then(Value::as_str)
                                .map(str::to_string),
                            body: stmts_from(array_field(c, "body")?)?,
                        })
                    })
                    .collect::<Result<_, IrError>>()?,
                finally_block: match opt_field(v, "finally") {
                    None => None,
                    Some(b) => Some(stmts_from(b.as_array().map(Vec::as_slice).unwrap_or(&[]))?),
                },
            },
            "variableDecl" => StmtKind::VariableDecl {
                name: str_field(v, "name")?.to_string(),
                declared_type: opt_type_from(v, "declaredType")?,
                initializer: opt_expr_from(v, "initializer")?,
                is_final: bool_field(v, "isFinal")?,
                is_const: bool_field(v, "isConst")?,
            },
            "expressionStmt" => {
                StmtKind::ExpressionStmt(ExprIr::from_json(field(v, "expression")?)?)
            }
            unknown => {
                return Err(IrError::UnknownNodeKind {
                    kind: unknown.to_string(),
                });
            }
        };

        Ok(StmtIr { id, span, kind })
    }
}

// =============================================================================
// Declarations
// =============================================================================

fn flags_json(flags: MemberFlags) -> Value {
    let mut names = Vec::new();
    let table = [
        (MemberFlags::ASYNC, "async"),
        (MemberFlags::GENERATOR, "generator"),
        (MemberFlags::SYNC_GENERATOR, "syncGenerator"),
        (MemberFlags::STATIC, "static"),
        (MemberFlags::ABSTRACT, "abstract"),
        (MemberFlags::GETTER, "getter"),
        (MemberFlags::SETTER, "setter"),
        (MemberFlags::OPERATOR, "operator"),
        (MemberFlags::FACTORY, "factory"),
        (MemberFlags::CONST, "const"),
        (MemberFlags::OVERRIDE, "override"),
        (MemberFlags::EXTERNAL, "external"),
    ];
    for (flag, name) in table {
        if flags.contains(flag) {
            names.push(name);
        }
    }
    json!(names)
}

fn flags_from(v: &Value) -> Result<MemberFlags, IrError> {
    let mut flags = MemberFlags::empty();
    for name in opt_array(v, "flags") {
        let name = name.as_str().ok_or_else(|| IrError::InvalidField {
            field: "flags".to_string(),
            reason: "expected string".to_string(),
        })?;
        flags |= match name {
            "async" => MemberFlags::ASYNC,
            "generator" => MemberFlags::GENERATOR,
            "syncGenerator" => MemberFlags::SYNC_GENERATOR,
            "static" => MemberFlags::STATIC,
            "abstract" => MemberFlags::ABSTRACT,
            "getter" => MemberFlags::GETTER,
            "setter" => MemberFlags::SETTER,
            "operator" => MemberFlags::OPERATOR,
            "factory" => MemberFlags::FACTORY,
            "const" => MemberFlags::CONST,
            "override" => MemberFlags::OVERRIDE,
            "external" => MemberFlags::EXTERNAL,
            unknown => {
                return Err(IrError::InvalidField {
                    field: "flags".to_string(),
                    reason: format!("unknown flag '{unknown}'"),
                });
            }
        };
    }
    Ok(flags)
}

fn body_json(body: Option<&FunctionBody>) -> Value {
    body.map_or(Value::Null, |b| {
        json!({ "statements": stmts_json(&b.statements), "metadata": b.metadata })
    })
}

fn body_from(v: &Value, name: &str) -> Result<Option<FunctionBody>, IrError> {
    match opt_field(v, name) {
        None => Ok(None),
        Some(b) => Ok(Some(FunctionBody {
            statements: stmts_from(array_field(b, "statements")?)?,
            metadata: b
                .get("metadata")
                .cloned()
                .map(serde_json::from_value)
                .transpose()
                .map_err(|e| IrError::InvalidField {
                    field: "metadata".to_string(),
                    reason: e.to_string(),
                })?
                .unwrap_or_default(),
        })),
    }
}

impl ParameterDecl {
    pub fn to_json(&self) -> Value {
        merge(
            base_json(&self.id, &self.span, "parameter"),
            json!({
                "name": self.name,
                "declaredType": type_json(&self.declared_type),
                "defaultValue": opt_expr_json(self.default_value.as_ref()),
                "isRequired": self.is_required,
                "isPositional": self.is_positional(),
                "isNamed": self.is_named(),
            }),
        )
    }

    pub fn from_json(v: &Value) -> Result<ParameterDecl, IrError> {
        match str_field(v, "kind")? {
            "parameter" => ParameterDecl::try_new(
                id_from(v)?,
                span_from(v)?,
                str_field(v, "name")?,
                type_from(v, "declaredType")?,
                opt_expr_from(v, "defaultValue")?,
                bool_field(v, "isRequired")?,
                bool_field(v, "isPositional")?,
                bool_field(v, "isNamed")?,
            ),
            unknown => Err(IrError::UnknownNodeKind {
                kind: unknown.to_string(),
            }),
        }
    }
}

impl FunctionDecl {
    pub fn to_json(&self) -> Value {
        merge(
            base_json(&self.id, &self.span, "function"),
            json!({
                "name": self.name,
                "returnType": type_json(&self.return_type),
                "params": self.params.iter().map(ParameterDecl::to_json).collect::<Vec<_>>(),
                "body": body_json(self.body.as_ref()),
                "flags": flags_json(self.flags),
            }),
        )
    }

    pub fn from_json(v: &Value) -> Result<FunctionDecl, IrError> {
        match str_field(v, "kind")? {
            "function" => FunctionDecl::try_new(
                id_from(v)?,
                span_from(v)?,
                str_field(v, "name")?,
                type_from(v, "returnType")?,
                array_field(v, "params")?
                    .iter()
                    .map(ParameterDecl::from_json)
                    .collect::<Result<_, _>>()?,
                body_from(v, "body")?,
                flags_from(v)?,
            ),
            unknown => Err(IrError::UnknownNodeKind {
                kind: unknown.to_string(),
            }),
        }
    }
}

impl ConstructorDecl {
    pub fn to_json(&self) -> Value {
        merge(
            base_json(&self.id, &self.span, "constructor"),
            json!({
                "className": self.class_name,
                "name": self.name,
                "params": self.params.iter().map(ParameterDecl::to_json).collect::<Vec<_>>(),
                "initializers": self.initializers
                    .iter()
                    .map(|i| json!({ "field": i.field, "value": i.value.to_json() }))
                    .collect::<Vec<_>>(),
                "superCall": self.super_call.as_ref().map_or(Value::Null, |s| json!({
                    "ctorName": s.ctor_name,
                    "args": exprs_json(&s.args),
                    "namedArgs": named_args_json(&s.named_args),
                })),
                "redirect": self.redirect.as_ref().map_or(Value::Null, |r| json!({
                    "target": r.target,
                    "args": exprs_json(&r.args),
                    "namedArgs": named_args_json(&r.named_args),
                })),
                "body": body_json(self.body.as_ref()),
                "isConst": self.is_const,
                "isFactory": self.is_factory,
            }),
        )
    }

    pub fn from_json(v: &Value) -> Result<ConstructorDecl, IrError> {
        match str_field(v, "kind")? {
            "constructor" => Ok(ConstructorDecl {
                id: id_from(v)?,
                span: span_from(v)?,
                class_name: str_field(v, "className")?.to_string(),
                name: opt_field(v, "name").and_then(Value::as_str).map(str::to_string),
                params: array_field(v, "params")?
                    .iter()
                    .map(ParameterDecl::from_json)
                    .collect::<Result<_, _>>()?,
                initializers: array_field(v, "initializers")?
                    .iter()
                    .map(|i| {
                        Ok(CtorInitializer {
                            field: str_field(i, "field")?.to_string(),
                            value: ExprIr::from_json(field(i, "value")?)?,
                        })
                    })
                    .collect::<Result<_, IrError>>()?,
                super_call: match opt_field(v, "superCall") {
                    None => None,
                    Some(s) => Some(SuperCall {
                        ctor_name: opt_field(s, "ctorName")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                        args: exprs_from(array_field(s, "args")?)?,
                        named_args: named_args_from(opt_array(s, "namedArgs"))?,
                    }),
                },
                redirect: match opt_field(v, "redirect") {
                    None => None,
                    Some(r) => Some(CtorRedirect {
                        target: opt_field(r, "target")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                        args: exprs_from(array_field(r, "args")?)?,
                        named_args: named_args_from(opt_array(r, "namedArgs"))?,
                    }),
                },
                body: body_from(v, "body")?,
                is_const: bool_field(v, "isConst")?,
                is_factory: bool_field(v, "isFactory")?,
            }),
            unknown => Err(IrError::UnknownNodeKind {
                kind: unknown.to_string(),
            }),
        }
    }
}

impl FieldDecl {
    pub fn to_json(&self) -> Value {
        merge(
            base_json(&self.id, &self.span, "field"),
            json!({
                "name": self.name,
                "declaredType": type_json(&self.declared_type),
                "initializer": opt_expr_json(self.initializer.as_ref()),
                "isFinal": self.is_final,
                "isConst": self.is_const,
                "isStatic": self.is_static,
                "isLate": self.is_late,
            }),
        )
    }

    pub fn from_json(v: &Value) -> Result<FieldDecl, IrError> {
        match str_field(v, "kind")? {
            "field" => Ok(FieldDecl {
                id: id_from(v)?,
                span: span_from(v)?,
                name: str_field(v, "name")?.to_string(),
                declared_type: type_from(v, "declaredType")?,
                initializer: opt_expr_from(v, "initializer")?,
                is_final: bool_field(v, "isFinal")?,
                is_const: bool_field(v, "isConst")?,
                is_static: bool_field(v, "isStatic")?,
                is_late: opt_bool_field(v, "isLate"),
            }),
            unknown => Err(IrError::UnknownNodeKind {
                kind: unknown.to_string(),
            }),
        }
    }
}

impl ClassDecl {
    pub fn to_json(&self) -> Value {
        merge(
            base_json(&self.id, &self.span, "class"),
            json!({
                "name": self.name,
                "superclass": self.superclass,
                "interfaces": self.interfaces,
                "mixins": self.mixins,
                "fields": self.fields.iter().map(FieldDecl::to_json).collect::<Vec<_>>(),
                "methods": self.methods.iter().map(FunctionDecl::to_json).collect::<Vec<_>>(),
                "constructors": self.constructors.iter().map(ConstructorDecl::to_json).collect::<Vec<_>>(),
                "isAbstract": self.is_abstract,
                "widgetKind": self.widget_kind.as_str(),
            }),
        )
    }

    pub fn from_json(v: &Value) -> Result<ClassDecl, IrError> {
        match str_field(v, "kind")? {
            "class" => {
                let widget_kind = match str_field(v, "widgetKind")? {
                    "none" => WidgetKind::None,
                    "stateless" => WidgetKind::Stateless,
                    "stateful" => WidgetKind::Stateful,
                    "state" => WidgetKind::State,
                    unknown => {
                        return Err(IrError::InvalidField {
                            field: "widgetKind".to_string(),
                            reason: format!("unknown widget kind '{unknown}'"),
                        });
                    }
                };
                let string_list = |name: &str| -> Result<Vec<String>, IrError> {
                    opt_array(v, name)
                        .iter()
                        .map(|s| {
                            s.as_str().map(str::to_string).ok_or_else(|| IrError::InvalidField {
                                field: name.to_string(),
                                reason: "expected string".to_string(),
                            })
                        })
                        .collect()
                };
                Ok(ClassDecl {
                    id: id_from(v)?,
                    span: span_from(v)?,
                    name: str_field(v, "name")?.to_string(),
                    superclass: opt_field(v, "superclass")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                    interfaces: string_list("interfaces")?,
                    mixins: string_list("mixins")?,
                    fields: array_field(v, "fields")?
                        .iter()
                        .map(FieldDecl::from_json)
                        .collect::<Result<_, _>>()?,
                    methods: array_field(v, "methods")?
                        .iter()
                        .map(FunctionDecl::from_json)
                        .collect::<Result<_, _>>()?,
                    constructors: array_field(v, "constructors")?
                        .iter()
                        .map(ConstructorDecl::from_json)
                        .collect::<Result<_, _>>()?,
                    is_abstract: bool_field(v, "isAbstract")?,
                    widget_kind,
                })
            }
            unknown => Err(IrError::UnknownNodeKind {
                kind: unknown.to_string(),
            }),
        }
    }
}

impl FileIr {
    pub fn to_json(&self) -> Value {
        json!({
            "kind": "file",
            "path": &*self.path,
            "classes": self.classes.iter().map(ClassDecl::to_json).collect::<Vec<_>>(),
            "functions": self.functions.iter().map(FunctionDecl::to_json).collect::<Vec<_>>(),
            "metadata": self.metadata,
        })
    }

    pub fn from_json(v: &Value) -> Result<FileIr, IrError> {
        match str_field(v, "kind")? {
            "file" => Ok(FileIr {
                path: str_field(v, "path")?.into(),
                classes: array_field(v, "classes")?
                    .iter()
                    .map(ClassDecl::from_json)
                    .collect::<Result<_, _>>()?,
                functions: array_field(v, "functions")?
                    .iter()
                    .map(FunctionDecl::from_json)
                    .collect::<Result<_, _>>()?,
                metadata: v
                    .get("metadata")
                    .cloned()
                    .map(serde_json::from_value)
                    .transpose()
                    .map_err(|e| IrError::InvalidField {
                        field: "metadata".to_string(),
                        reason: e.to_string(),
                    })?
                    .unwrap_or_default(),
            }),
            unknown => Err(IrError::UnknownNodeKind {
                kind: unknown.to_string(),
            }),
        }
    }
}
