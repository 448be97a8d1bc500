//! JavaScript operator precedence, as seen by the emitter.
//!
//! Levels follow the JS grammar; higher binds tighter. An expression is
//! parenthesized exactly when its level is below the minimum its context
//! requires, so grouping survives even though source parentheses are
//! discarded, and no redundant parens are emitted.

use fjs_ir::{BinaryOp, ExprIr, ExprKind, UnaryOp};

pub const ASSIGN: u8 = 2;
pub const CONDITIONAL: u8 = 3;
pub const NULLISH: u8 = 4;
pub const LOGICAL_OR: u8 = 5;
pub const LOGICAL_AND: u8 = 6;
pub const BIT_OR: u8 = 7;
pub const BIT_XOR: u8 = 8;
pub const BIT_AND: u8 = 9;
pub const EQUALITY: u8 = 10;
pub const RELATIONAL: u8 = 11;
pub const SHIFT: u8 = 12;
pub const ADDITIVE: u8 = 13;
pub const MULTIPLICATIVE: u8 = 14;
pub const UNARY: u8 = 15;
pub const POSTFIX: u8 = 16;
pub const CALL: u8 = 17;
pub const PRIMARY: u8 = 18;

pub fn binary_precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Or => LOGICAL_OR,
        BinaryOp::And => LOGICAL_AND,
        BinaryOp::BitOr => BIT_OR,
        BinaryOp::BitXor => BIT_XOR,
        BinaryOp::BitAnd => BIT_AND,
        BinaryOp::Eq | BinaryOp::Ne => EQUALITY,
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => RELATIONAL,
        BinaryOp::Shl | BinaryOp::Shr => SHIFT,
        BinaryOp::Add | BinaryOp::Sub => ADDITIVE,
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => MULTIPLICATIVE,
        // `~/` emits as Math.trunc(...), a call.
        BinaryOp::IntDiv => CALL,
    }
}

/// The precedence of the JavaScript an expression node will emit as, which
/// is not always the precedence of the source construct (lowered forms emit
/// ternaries, calls and IIFEs).
pub fn expr_precedence(expr: &ExprIr) -> u8 {
    match &expr.kind {
        ExprKind::Literal(_)
        | ExprKind::Identifier { .. }
        | ExprKind::This
        | ExprKind::Super
        | ExprKind::ListLiteral { .. }
        | ExprKind::MapLiteral { .. }
        | ExprKind::SetLiteral { .. }
        | ExprKind::StringInterpolation { .. } => PRIMARY,

        ExprKind::Binary { op, .. } => binary_precedence(*op),

        ExprKind::Unary { op, prefix, .. } => match op {
            UnaryOp::Inc | UnaryOp::Dec if !prefix => POSTFIX,
            _ => UNARY,
        },

        ExprKind::MethodCall { .. }
        | ExprKind::PropertyAccess { .. }
        | ExprKind::IndexAccess { .. }
        | ExprKind::ConstructorCall { .. }
        | ExprKind::Cascade { .. } => CALL,

        // Lowered to `a == null ? ... : ...` ternaries (or a call IIFE for
        // complex receivers; CONDITIONAL is the safe lower bound).
        ExprKind::NullAwareAccess { .. } | ExprKind::NullCoalescing { .. } => CONDITIONAL,

        ExprKind::Conditional { .. } => CONDITIONAL,

        ExprKind::Assignment { .. } | ExprKind::CompoundAssignment { .. } => ASSIGN,

        // Arrow functions bind like assignments.
        ExprKind::FunctionExpr { .. } => ASSIGN,

        // Casts emit as their bare operand; `is` as typeof/instanceof.
        ExprKind::Cast { operand, .. } => expr_precedence(operand),
        ExprKind::IsCheck { negated, tested_type, .. } => {
            if *negated {
                UNARY
            } else if is_primitive_check(tested_type) {
                EQUALITY
            } else {
                RELATIONAL
            }
        }

        ExprKind::Parenthesized { inner } => expr_precedence(inner),
    }
}

pub(crate) fn is_primitive_check(ty: &fjs_ir::TypeIr) -> bool {
    matches!(ty, fjs_ir::TypeIr::Primitive { .. })
}
