//! Expression emission.
//!
//! `emit_expr` takes the minimum precedence its context requires and wraps
//! the node in parens only when its emitted form binds looser. Dart-only
//! constructs lower here: `~/` to `Math.trunc`, `is` to typeof/instanceof,
//! null-aware operators to explicit null checks, cascades and named
//! constructor calls to IIFEs.

use crate::precedence::{self, binary_precedence, expr_precedence};
use crate::printer::JsEmitter;
use fjs_ir::{
    BinaryOp, CascadeSection, ExprIr, ExprKind, InterpolationPart, LiteralValue, NamedArg, PrimKind,
    TypeIr, UnaryOp,
};

impl JsEmitter {
    pub(crate) fn emit_expr(&mut self, expr: &ExprIr, min_prec: u8) {
        if expr_precedence(expr) < min_prec {
            self.write("(");
            self.emit_expr_inner(expr);
            self.write(")");
        } else {
            self.emit_expr_inner(expr);
        }
    }

    fn emit_expr_inner(&mut self, expr: &ExprIr) {
        match &expr.kind {
            ExprKind::Literal(value) => self.emit_literal(value),
            ExprKind::Identifier { name } => self.write(name),
            ExprKind::This => self.write("this"),
            ExprKind::Super => self.write("super"),

            ExprKind::Binary { op, left, right } => self.emit_binary(*op, left, right),

            ExprKind::Unary {
                op,
                operand,
                prefix,
            } => {
                if *prefix {
                    self.write(op.as_str());
                    if needs_unary_space(*op, operand) {
                        self.write(" ");
                    }
                    self.emit_expr(operand, precedence::UNARY);
                } else {
                    self.emit_expr(operand, precedence::POSTFIX);
                    self.write(op.as_str());
                }
            }

            ExprKind::MethodCall {
                target,
                method,
                args,
                named_args,
            } => {
                if let Some(target) = target {
                    self.emit_expr(target, precedence::CALL);
                    self.write(".");
                }
                self.write(method);
                self.emit_call_args(args, named_args);
            }

            ExprKind::PropertyAccess { target, property } => {
                self.emit_expr(target, precedence::CALL);
                self.write(".");
                self.write(property);
            }

            ExprKind::IndexAccess { target, index } => {
                self.emit_expr(target, precedence::CALL);
                self.write("[");
                self.emit_expr(index, precedence::ASSIGN);
                self.write("]");
            }

            ExprKind::Conditional {
                condition,
                then_expr,
                else_expr,
            } => {
                self.emit_expr(condition, precedence::CONDITIONAL + 1);
                self.write(" ? ");
                self.emit_expr(then_expr, precedence::CONDITIONAL);
                self.write(" : ");
                self.emit_expr(else_expr, precedence::CONDITIONAL);
            }

            ExprKind::Assignment { target, value } => {
                self.emit_expr(target, precedence::POSTFIX);
                self.write(" = ");
                self.emit_expr(value, precedence::ASSIGN);
            }

            ExprKind::CompoundAssignment { op, target, value } => {
                if *op == BinaryOp::IntDiv {
                    // `a ~/= b` has no JS operator form.
                    self.emit_expr(target, precedence::POSTFIX);
                    self.write(" = Math.trunc(");
                    self.emit_expr(target, precedence::MULTIPLICATIVE);
                    self.write(" / ");
                    self.emit_expr(value, precedence::MULTIPLICATIVE + 1);
                    self.write(")");
                } else {
                    self.emit_expr(target, precedence::POSTFIX);
                    self.write(" ");
                    self.write(compound_op_text(*op));
                    self.write("= ");
                    self.emit_expr(value, precedence::ASSIGN);
                }
            }

            // JS is untyped; a cast is its operand.
            ExprKind::Cast { operand, .. } => self.emit_expr_inner(operand),

            ExprKind::IsCheck {
                operand,
                tested_type,
                negated,
            } => self.emit_is_check(operand, tested_type, *negated, expr),

            ExprKind::Cascade { target, sections } => self.emit_cascade_expr(target, sections),

            ExprKind::NullAwareAccess { target, property } => {
                if is_simple_target(target) {
                    // `a?.b` -> `a == null ? null : a.b`
                    self.emit_expr(target, precedence::EQUALITY);
                    self.write(" == null ? null : ");
                    self.emit_expr(target, precedence::CALL);
                    self.write(".");
                    self.write(property);
                } else {
                    let temp = self.fresh_temp();
                    self.write(&format!("(({temp}) => {temp} == null ? null : {temp}."));
                    self.write(property);
                    self.write(")(");
                    self.emit_expr(target, precedence::ASSIGN);
                    self.write(")");
                }
            }

            ExprKind::NullCoalescing { left, right } => {
                if is_simple_target(left) {
                    // `a ?? b` -> `a == null ? b : a`
                    self.emit_expr(left, precedence::EQUALITY);
                    self.write(" == null ? ");
                    self.emit_expr(right, precedence::CONDITIONAL);
                    self.write(" : ");
                    self.emit_expr(left, precedence::CONDITIONAL);
                } else {
                    let temp = self.fresh_temp();
                    self.write(&format!("(({temp}) => {temp} == null ? "));
                    self.emit_expr(right, precedence::CONDITIONAL);
                    self.write(&format!(" : {temp})("));
                    self.emit_expr(left, precedence::ASSIGN);
                    self.write(")");
                }
            }

            ExprKind::ListLiteral { elements } => {
                self.write("[");
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.emit_expr(element, precedence::ASSIGN);
                }
                self.write("]");
            }

            ExprKind::SetLiteral { elements } => {
                self.write("new Set([");
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.emit_expr(element, precedence::ASSIGN);
                }
                self.write("])");
            }

            ExprKind::MapLiteral { entries } => {
                self.write("new Map([");
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.write("[");
                    self.emit_expr(key, precedence::ASSIGN);
                    self.write(", ");
                    self.emit_expr(value, precedence::ASSIGN);
                    self.write("]");
                }
                self.write("])");
            }

            ExprKind::StringInterpolation { parts } => {
                self.write("`");
                for part in parts {
                    match part {
                        InterpolationPart::Text(text) => {
                            let escaped = escape_template(text);
                            self.write(&escaped);
                        }
                        InterpolationPart::Expr(inner) => {
                            self.write("${");
                            self.emit_expr(inner, precedence::ASSIGN);
                            self.write("}");
                        }
                    }
                }
                self.write("`");
            }

            ExprKind::ConstructorCall {
                class_name,
                ctor_name,
                args,
                named_args,
                ..
            } => match ctor_name {
                None => {
                    self.write("new ");
                    self.write(class_name);
                    self.emit_call_args(args, named_args);
                }
                Some(name) => {
                    // Named constructors are instance methods in JS; call
                    // sites construct first, then run the named initializer.
                    let temp = self.fresh_temp();
                    self.write(&format!(
                        "(() => {{ const {temp} = new {class_name}(); {temp}.constructor_{name}"
                    ));
                    self.emit_call_args(args, named_args);
                    self.write(&format!("; return {temp}; }})()"));
                }
            },

            ExprKind::FunctionExpr { params, body } => {
                self.write("(");
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        self.write(", ");
                    }
                    self.write(param);
                }
                self.write(") => ");
                if body.is_empty() {
                    self.write("{}");
                } else {
                    self.write("{");
                    self.write_line();
                    self.increase_indent();
                    for stmt in body {
                        self.emit_stmt(stmt);
                    }
                    self.decrease_indent();
                    self.write("}");
                }
            }

            // Grouping is re-derived from precedence.
            ExprKind::Parenthesized { inner } => self.emit_expr_inner(inner),
        }
    }

    fn emit_binary(&mut self, op: BinaryOp, left: &ExprIr, right: &ExprIr) {
        if op == BinaryOp::IntDiv {
            self.write("Math.trunc(");
            self.emit_expr(left, precedence::MULTIPLICATIVE);
            self.write(" / ");
            self.emit_expr(right, precedence::MULTIPLICATIVE + 1);
            self.write(")");
            return;
        }
        let prec = binary_precedence(op);
        self.emit_expr(left, prec);
        self.write(" ");
        self.write(js_binary_op(op));
        self.write(" ");
        // Left-associative: the right operand needs one level more.
        self.emit_expr(right, prec + 1);
    }

    fn emit_is_check(
        &mut self,
        operand: &ExprIr,
        tested_type: &TypeIr,
        negated: bool,
        whole: &ExprIr,
    ) {
        if negated {
            self.write("!(");
            self.emit_is_check(operand, tested_type, false, whole);
            self.write(")");
            return;
        }
        match tested_type {
            TypeIr::Primitive { prim } => {
                self.write("typeof ");
                self.emit_expr(operand, precedence::UNARY);
                self.write(" === ");
                let type_name = match prim {
                    PrimKind::Int | PrimKind::Double => "\"number\"",
                    PrimKind::Bool => "\"boolean\"",
                    PrimKind::String => "\"string\"",
                };
                self.write(type_name);
            }
            TypeIr::Named { name, .. } => {
                self.emit_expr(operand, precedence::RELATIONAL);
                self.write(" instanceof ");
                self.write(name);
            }
            // `x is dynamic` always holds.
            TypeIr::Dynamic => self.write("true"),
            _ => {
                self.unsupported("is", &whole.span, "type test against a non-class type");
            }
        }
    }

    fn emit_cascade_expr(&mut self, target: &ExprIr, sections: &[CascadeSection]) {
        let temp = self.fresh_temp();
        self.write(&format!("(({temp}) => {{ "));
        for section in sections {
            self.emit_cascade_section(&temp, section);
            self.write(" ");
        }
        self.write(&format!("return {temp}; }})("));
        self.emit_expr(target, precedence::ASSIGN);
        self.write(")");
    }

    pub(crate) fn emit_cascade_section(&mut self, temp: &str, section: &CascadeSection) {
        match section {
            CascadeSection::MethodCall {
                method,
                args,
                named_args,
            } => {
                self.write(temp);
                self.write(".");
                self.write(method);
                self.emit_call_args(args, named_args);
                self.write(";");
            }
            CascadeSection::PropertySet { property, value } => {
                self.write(temp);
                self.write(".");
                self.write(property);
                self.write(" = ");
                self.emit_expr(value, precedence::ASSIGN);
                self.write(";");
            }
        }
    }

    /// Positional arguments, then one trailing object literal for the named
    /// ones.
    pub(crate) fn emit_call_args(&mut self, args: &[ExprIr], named_args: &[NamedArg]) {
        self.write("(");
        let mut first = true;
        for arg in args {
            if !first {
                self.write(", ");
            }
            first = false;
            self.emit_expr(arg, precedence::ASSIGN);
        }
        if !named_args.is_empty() {
            if !first {
                self.write(", ");
            }
            self.write("{");
            for (i, named) in named_args.iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                self.write(&named.name);
                self.write(": ");
                self.emit_expr(&named.value, precedence::ASSIGN);
            }
            self.write("}");
        }
        self.write(")");
    }

    fn emit_literal(&mut self, value: &LiteralValue) {
        match value {
            LiteralValue::Int(v) => self.write(&v.to_string()),
            LiteralValue::Double(v) => self.write(&v.to_string()),
            LiteralValue::Bool(v) => self.write(if *v { "true" } else { "false" }),
            LiteralValue::String(v) => {
                let escaped = escape_single_quoted(v);
                self.write("'");
                self.write(&escaped);
                self.write("'");
            }
            LiteralValue::Null => self.write("null"),
        }
    }
}

/// Dart `==`/`!=` are value equality on primitives; strict equality is the
/// closest JS spelling. Everything else is shared syntax.
fn js_binary_op(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Eq => "===",
        BinaryOp::Ne => "!==",
        other => other.as_str(),
    }
}

fn compound_op_text(op: BinaryOp) -> &'static str {
    op.as_str()
}

/// `-` written directly against an operand that itself starts with `-`
/// would tokenize as predecrement; a space keeps the two operators apart.
fn needs_unary_space(op: UnaryOp, operand: &ExprIr) -> bool {
    if op != UnaryOp::Neg {
        return false;
    }
    match &operand.kind {
        ExprKind::Unary {
            op: inner,
            prefix: true,
            ..
        } => matches!(inner, UnaryOp::Neg | UnaryOp::Dec),
        ExprKind::Literal(LiteralValue::Int(v)) => *v < 0,
        ExprKind::Literal(LiteralValue::Double(v)) => *v < 0.0,
        _ => false,
    }
}

/// Receivers cheap and effect-free enough to evaluate twice in lowered
/// null-aware forms.
fn is_simple_target(expr: &ExprIr) -> bool {
    matches!(
        expr.kind,
        ExprKind::Identifier { .. } | ExprKind::This | ExprKind::Literal(_)
    )
}

fn escape_single_quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

fn escape_template(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '`' => out.push_str("\\`"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            other => out.push(other),
        }
    }
    out
}
