//! Bottom-up type inference.
//!
//! Computes a result type for every expression and records it in the
//! `TypeMap` side table; nodes themselves stay untouched. Inference never
//! fails: anything it cannot type becomes `Dynamic`, with a diagnostic where
//! the code is demonstrably inconsistent (`type_mismatch`) or where branch
//! types have no join (`no_common_supertype`).
//!
//! The numeric rules follow Dart: `int op int` stays `int` except `/`,
//! which always yields `double`; mixing `int` and `double` promotes to
//! `double`.

use crate::resolver::BindingMap;
use crate::scopes::{SymbolId, SymbolTable};
use fjs_common::{AnalysisIssue, codes};
use fjs_ir::{
    BinaryOp, CascadeSection, ClassDecl, ConstructorDecl, ExprIr, ExprKind, FileIr, FunctionDecl,
    InterpolationPart, LiteralValue, NodeId, StmtIr, StmtKind, TypeIr, UnaryOp,
};
use rustc_hash::FxHashMap;

/// Side table from expression node id to inferred result type.
pub type TypeMap = FxHashMap<NodeId, TypeIr>;

pub struct TypeInference<'a> {
    table: &'a SymbolTable,
    bindings: &'a BindingMap,
    types: TypeMap,
    issues: Vec<AnalysisIssue>,
    /// Initializer-refined types for locals declared without an annotation.
    locals: FxHashMap<SymbolId, TypeIr>,
    current_class: Option<&'a str>,
    current_return: Option<TypeIr>,
}

impl<'a> TypeInference<'a> {
    pub fn new(table: &'a SymbolTable, bindings: &'a BindingMap) -> Self {
        Self {
            table,
            bindings,
            types: TypeMap::default(),
            issues: Vec::new(),
            locals: FxHashMap::default(),
            current_class: None,
            current_return: None,
        }
    }

    pub fn infer_file(mut self, file: &'a FileIr) -> (TypeMap, Vec<AnalysisIssue>) {
        tracing::debug!(file = %file.path, "inferring types");
        for class in &file.classes {
            self.infer_class(class);
        }
        for function in &file.functions {
            self.infer_function(function);
        }
        (self.types, self.issues)
    }

    fn infer_class(&mut self, class: &'a ClassDecl) {
        self.current_class = Some(&class.name);
        for field in &class.fields {
            if let Some(init) = &field.initializer {
                let got = self.infer_expr(init);
                self.check_assignable(&got, &field.declared_type, init);
            }
        }
        for ctor in &class.constructors {
            self.infer_constructor(ctor);
        }
        for method in &class.methods {
            self.infer_function(method);
        }
        self.current_class = None;
    }

    fn infer_function(&mut self, function: &'a FunctionDecl) {
        let Some(body) = &function.body else {
            return;
        };
        let previous = self.current_return.replace(function.return_type.clone());
        for stmt in &body.statements {
            self.infer_stmt(stmt);
        }
        self.current_return = previous;
    }

    fn infer_constructor(&mut self, ctor: &'a ConstructorDecl) {
        for init in &ctor.initializers {
            self.infer_expr(&init.value);
        }
        if let Some(super_call) = &ctor.super_call {
            for arg in &super_call.args {
                self.infer_expr(arg);
            }
            for named in &super_call.named_args {
                self.infer_expr(&named.value);
            }
        }
        if let Some(body) = &ctor.body {
            let previous = self.current_return.replace(TypeIr::Void);
            for stmt in &body.statements {
                self.infer_stmt(stmt);
            }
            self.current_return = previous;
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn infer_stmt(&mut self, stmt: &StmtIr) {
        match &stmt.kind {
            StmtKind::Block(stmts) => {
                for s in stmts {
                    self.infer_stmt(s);
                }
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let cond = self.infer_expr(condition);
                self.require_bool(&cond, condition, "if condition");
                for s in then_branch {
                    self.infer_stmt(s);
                }
                if let Some(else_branch) = else_branch {
                    for s in else_branch {
                        self.infer_stmt(s);
                    }
                }
            }
            StmtKind::For {
                init,
                condition,
                update,
                body,
            } => {
                if let Some(init) = init {
                    self.infer_stmt(init);
                }
                if let Some(condition) = condition {
                    let cond = self.infer_expr(condition);
                    self.require_bool(&cond, condition, "loop condition");
                }
                if let Some(update) = update {
                    self.infer_expr(update);
                }
                for s in body {
                    self.infer_stmt(s);
                }
            }
            StmtKind::ForIn { iterable, body, .. } => {
                self.infer_expr(iterable);
                for s in body {
                    self.infer_stmt(s);
                }
            }
            StmtKind::While {
                condition, body, ..
            } => {
                let cond = self.infer_expr(condition);
                self.require_bool(&cond, condition, "loop condition");
                for s in body {
                    self.infer_stmt(s);
                }
            }
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    let got = self.infer_expr(value);
                    if let Some(expected) = self.current_return.clone() {
                        if !expected.is_void() {
                            self.check_assignable(&got, &expected, value);
                        }
                    }
                }
            }
            StmtKind::Break | StmtKind::Continue => {}
            StmtKind::Throw(value) => {
                self.infer_expr(value);
            }
            StmtKind::TryCatch {
                body,
                catch_clauses,
                finally_block,
            } => {
                for s in body {
                    self.infer_stmt(s);
                }
                for clause in catch_clauses {
                    for s in &clause.body {
                        self.infer_stmt(s);
                    }
                }
                if let Some(finally_block) = finally_block {
                    for s in finally_block {
                        self.infer_stmt(s);
                    }
                }
            }
            StmtKind::VariableDecl {
                declared_type,
                initializer,
                ..
            } => {
                let init_ty = initializer.as_ref().map(|init| self.infer_expr(init));
                match (declared_type, init_ty) {
                    (Some(declared), Some(got)) => {
                        if let Some(init) = initializer {
                            self.check_assignable(&got, declared, init);
                        }
                    }
                    (None, Some(got)) => {
                        // `var x = expr;` takes the initializer's type.
                        if let Some(&symbol) = self.bindings.get(&stmt.id) {
                            self.locals.insert(symbol, got);
                        }
                    }
                    _ => {}
                }
            }
            StmtKind::ExpressionStmt(expr) => {
                self.infer_expr(expr);
            }
        }
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn infer_expr(&mut self, expr: &ExprIr) -> TypeIr {
        let ty = self.infer_expr_kind(expr);
        self.types.insert(expr.id.clone(), ty.clone());
        ty
    }

    fn infer_expr_kind(&mut self, expr: &ExprIr) -> TypeIr {
        match &expr.kind {
            ExprKind::Literal(value) => match value {
                LiteralValue::Int(_) => TypeIr::INT,
                LiteralValue::Double(_) => TypeIr::DOUBLE,
                LiteralValue::Bool(_) => TypeIr::BOOL,
                LiteralValue::String(_) => TypeIr::STRING,
                LiteralValue::Null => TypeIr::Dynamic,
            },
            ExprKind::Identifier { .. } => self.binding_type(&expr.id),
            ExprKind::Binary { op, left, right } => {
                let lt = self.infer_expr(left);
                let rt = self.infer_expr(right);
                self.infer_binary(*op, &lt, &rt, expr)
            }
            ExprKind::Unary { op, operand, .. } => {
                let ot = self.infer_expr(operand);
                match op {
                    UnaryOp::Not => {
                        self.require_bool(&ot, operand, "operand of '!'");
                        TypeIr::BOOL
                    }
                    UnaryOp::BitNot => TypeIr::INT,
                    UnaryOp::Neg | UnaryOp::Inc | UnaryOp::Dec => {
                        if ot.is_numeric() { ot } else { TypeIr::Dynamic }
                    }
                }
            }
            ExprKind::MethodCall {
                target,
                method,
                args,
                named_args,
            } => {
                for arg in args {
                    self.infer_expr(arg);
                }
                for named in named_args {
                    self.infer_expr(&named.value);
                }
                match target {
                    Some(target) => {
                        let receiver = self.infer_expr(target);
                        self.member_type(&receiver, method)
                            .map(return_type_of)
                            .unwrap_or(TypeIr::Dynamic)
                    }
                    None => return_type_of(self.binding_type(&expr.id)),
                }
            }
            ExprKind::PropertyAccess { target, property } => {
                let receiver = self.infer_expr(target);
                self.property_type(&receiver, property)
            }
            ExprKind::IndexAccess { target, index } => {
                let receiver = self.infer_expr(target);
                self.infer_expr(index);
                element_type(&receiver)
            }
            ExprKind::Conditional {
                condition,
                then_expr,
                else_expr,
            } => {
                let cond = self.infer_expr(condition);
                self.require_bool(&cond, condition, "conditional");
                let tt = self.infer_expr(then_expr);
                let et = self.infer_expr(else_expr);
                self.join(&tt, &et, expr)
            }
            ExprKind::Assignment { target, value } => {
                let target_ty = self.infer_expr(target);
                let value_ty = self.infer_expr(value);
                self.check_assignable(&value_ty, &target_ty, value);
                value_ty
            }
            ExprKind::CompoundAssignment { op, target, value } => {
                let lt = self.infer_expr(target);
                let rt = self.infer_expr(value);
                self.infer_binary(*op, &lt, &rt, expr)
            }
            ExprKind::Cast { operand, target_type } => {
                self.infer_expr(operand);
                target_type.clone()
            }
            ExprKind::IsCheck { operand, .. } => {
                self.infer_expr(operand);
                TypeIr::BOOL
            }
            ExprKind::Cascade { target, sections } => {
                // A cascade evaluates to its receiver.
                let receiver = self.infer_expr(target);
                for section in sections {
                    match section {
                        CascadeSection::MethodCall {
                            args, named_args, ..
                        } => {
                            for arg in args {
                                self.infer_expr(arg);
                            }
                            for named in named_args {
                                self.infer_expr(&named.value);
                            }
                        }
                        CascadeSection::PropertySet { value, .. } => {
                            self.infer_expr(value);
                        }
                    }
                }
                receiver
            }
            ExprKind::NullAwareAccess { target, property } => {
                let receiver = self.infer_expr(target);
                self.property_type(&receiver, property)
            }
            ExprKind::NullCoalescing { left, right } => {
                let lt = self.infer_expr(left);
                let rt = self.infer_expr(right);
                self.join(&lt, &rt, expr)
            }
            ExprKind::ListLiteral { elements } => {
                let element = self.join_all(elements);
                TypeIr::named_with("List", vec![element])
            }
            ExprKind::SetLiteral { elements } => {
                let element = self.join_all(elements);
                TypeIr::named_with("Set", vec![element])
            }
            ExprKind::MapLiteral { entries } => {
                let mut key_ty: Option<TypeIr> = None;
                let mut value_ty: Option<TypeIr> = None;
                for (key, value) in entries {
                    let kt = self.infer_expr(key);
                    let vt = self.infer_expr(value);
                    key_ty = Some(match key_ty {
                        Some(prev) => TypeIr::common_supertype(&prev, &kt).unwrap_or(TypeIr::Dynamic),
                        None => kt,
                    });
                    value_ty = Some(match value_ty {
                        Some(prev) => TypeIr::common_supertype(&prev, &vt).unwrap_or(TypeIr::Dynamic),
                        None => vt,
                    });
                }
                TypeIr::named_with(
                    "Map",
                    vec![
                        key_ty.unwrap_or(TypeIr::Dynamic),
                        value_ty.unwrap_or(TypeIr::Dynamic),
                    ],
                )
            }
            ExprKind::StringInterpolation { parts } => {
                for part in parts {
                    if let InterpolationPart::Expr(inner) = part {
                        self.infer_expr(inner);
                    }
                }
                TypeIr::STRING
            }
            ExprKind::ConstructorCall {
                class_name,
                args,
                named_args,
                ..
            } => {
                for arg in args {
                    self.infer_expr(arg);
                }
                for named in named_args {
                    self.infer_expr(&named.value);
                }
                TypeIr::named(class_name.clone())
            }
            ExprKind::FunctionExpr { params, body } => {
                for stmt in body {
                    self.infer_stmt(stmt);
                }
                TypeIr::Function {
                    params: params.iter().map(|_| TypeIr::Dynamic).collect(),
                    ret: Box::new(TypeIr::Dynamic),
                }
            }
            ExprKind::This => match self.current_class {
                Some(name) => TypeIr::named(name),
                None => TypeIr::Dynamic,
            },
            ExprKind::Super => TypeIr::Dynamic,
            ExprKind::Parenthesized { inner } => self.infer_expr(inner),
        }
    }

    fn infer_binary(&mut self, op: BinaryOp, lt: &TypeIr, rt: &TypeIr, expr: &ExprIr) -> TypeIr {
        if op.is_comparison() {
            if op == BinaryOp::Eq || op == BinaryOp::Ne {
                return TypeIr::BOOL;
            }
            if !comparable(lt, rt) {
                self.mismatch(expr, &format!("cannot compare {lt} with {rt}"));
            }
            return TypeIr::BOOL;
        }
        if op.is_logical() {
            if !(lt.is_dynamic() || *lt == TypeIr::BOOL) || !(rt.is_dynamic() || *rt == TypeIr::BOOL)
            {
                self.mismatch(expr, &format!("'{}' expects bool operands", op.as_str()));
            }
            return TypeIr::BOOL;
        }
        match op {
            BinaryOp::Add if *lt == TypeIr::STRING && *rt == TypeIr::STRING => TypeIr::STRING,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Mod => {
                self.numeric_result(lt, rt, op, expr)
            }
            // Dart: `/` is always double, `~/` always int.
            BinaryOp::Div => {
                self.expect_numeric_operands(lt, rt, op, expr);
                TypeIr::DOUBLE
            }
            BinaryOp::IntDiv => {
                self.expect_numeric_operands(lt, rt, op, expr);
                TypeIr::INT
            }
            BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor | BinaryOp::Shl | BinaryOp::Shr => {
                TypeIr::INT
            }
            _ => TypeIr::Dynamic,
        }
    }

    fn numeric_result(&mut self, lt: &TypeIr, rt: &TypeIr, op: BinaryOp, expr: &ExprIr) -> TypeIr {
        if lt.is_dynamic() || rt.is_dynamic() {
            return TypeIr::Dynamic;
        }
        if lt.is_numeric() && rt.is_numeric() {
            return if *lt == TypeIr::DOUBLE || *rt == TypeIr::DOUBLE {
                TypeIr::DOUBLE
            } else {
                TypeIr::INT
            };
        }
        self.mismatch(
            expr,
            &format!("operator '{}' is not defined for {lt} and {rt}", op.as_str()),
        );
        TypeIr::Dynamic
    }

    fn expect_numeric_operands(&mut self, lt: &TypeIr, rt: &TypeIr, op: BinaryOp, expr: &ExprIr) {
        let ok = |t: &TypeIr| t.is_dynamic() || t.is_numeric();
        if !ok(lt) || !ok(rt) {
            self.mismatch(
                expr,
                &format!("operator '{}' is not defined for {lt} and {rt}", op.as_str()),
            );
        }
    }

    // =========================================================================
    // Lookup helpers
    // =========================================================================

    fn binding_type(&self, node: &NodeId) -> TypeIr {
        let Some(&symbol) = self.bindings.get(node) else {
            return TypeIr::Dynamic;
        };
        if let Some(refined) = self.locals.get(&symbol) {
            return refined.clone();
        }
        self.table.get(symbol).ty.clone()
    }

    fn member_type(&self, receiver: &TypeIr, member: &str) -> Option<TypeIr> {
        if let TypeIr::Named { name, .. } = receiver {
            return self.table.class_member_type(name, member).cloned();
        }
        None
    }

    fn property_type(&mut self, receiver: &TypeIr, property: &str) -> TypeIr {
        // `.length` is ubiquitous enough to special-case for the collections
        // and strings in the closed type set.
        if property == "length" {
            if let TypeIr::Named { name, .. } = receiver {
                if matches!(name.as_str(), "List" | "Map" | "Set") {
                    return TypeIr::INT;
                }
            }
            if *receiver == TypeIr::STRING {
                return TypeIr::INT;
            }
        }
        self.member_type(receiver, property).unwrap_or(TypeIr::Dynamic)
    }

    fn join(&mut self, a: &TypeIr, b: &TypeIr, expr: &ExprIr) -> TypeIr {
        match TypeIr::common_supertype(a, b) {
            Some(ty) => ty,
            None => {
                self.issues.push(
                    AnalysisIssue::warning(
                        codes::NO_COMMON_SUPERTYPE,
                        format!("branches have no common supertype ({a} vs {b})"),
                        expr.span.clone(),
                    ),
                );
                TypeIr::Dynamic
            }
        }
    }

    fn join_all(&mut self, elements: &[ExprIr]) -> TypeIr {
        let mut joined: Option<TypeIr> = None;
        for element in elements {
            let ty = self.infer_expr(element);
            joined = Some(match joined {
                Some(prev) => TypeIr::common_supertype(&prev, &ty).unwrap_or(TypeIr::Dynamic),
                None => ty,
            });
        }
        joined.unwrap_or(TypeIr::Dynamic)
    }

    fn check_assignable(&mut self, from: &TypeIr, to: &TypeIr, at: &ExprIr) {
        if !assignable(from, to) {
            self.mismatch(at, &format!("{from} is not assignable to {to}"));
        }
    }

    fn require_bool(&mut self, ty: &TypeIr, at: &ExprIr, what: &str) {
        if !ty.is_dynamic() && *ty != TypeIr::BOOL {
            self.mismatch(at, &format!("{what} must be bool, got {ty}"));
        }
    }

    fn mismatch(&mut self, at: &ExprIr, message: &str) {
        self.issues.push(AnalysisIssue::warning(
            codes::TYPE_MISMATCH,
            message.to_string(),
            at.span.clone(),
        ));
    }
}

/// Assignability for the closed type set: exact match, either side dynamic,
/// or the implicit `int` to `double` widening.
fn assignable(from: &TypeIr, to: &TypeIr) -> bool {
    if from == to || from.is_dynamic() || to.is_dynamic() {
        return true;
    }
    *from == TypeIr::INT && *to == TypeIr::DOUBLE
}

fn comparable(a: &TypeIr, b: &TypeIr) -> bool {
    if a.is_dynamic() || b.is_dynamic() {
        return true;
    }
    (a.is_numeric() && b.is_numeric()) || a == b
}

/// The result type of invoking a value: `Function` types yield their return
/// type, everything else is dynamic call-through.
fn return_type_of(ty: TypeIr) -> TypeIr {
    match ty {
        TypeIr::Function { ret, .. } => *ret,
        _ => TypeIr::Dynamic,
    }
}

fn element_type(receiver: &TypeIr) -> TypeIr {
    match receiver {
        TypeIr::Named { name, type_args } if name == "List" || name == "Set" => {
            type_args.first().cloned().unwrap_or(TypeIr::Dynamic)
        }
        TypeIr::Named { name, type_args } if name == "Map" => {
            type_args.get(1).cloned().unwrap_or(TypeIr::Dynamic)
        }
        TypeIr::Primitive { .. } if *receiver == TypeIr::STRING => TypeIr::STRING,
        _ => TypeIr::Dynamic,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::Resolver;
    use fjs_common::SourceSpan;
    use fjs_ir::{FunctionBody, IdGenerator, MemberFlags};

    // Ids sit behind a RefCell so fixture expressions can nest builder calls.
    struct Builder {
        ids: std::cell::RefCell<IdGenerator>,
    }

    impl Builder {
        fn new() -> Self {
            Self {
                ids: std::cell::RefCell::new(IdGenerator::simple()),
            }
        }

        fn make(&self, node_type: &str, name: &str) -> fjs_ir::NodeId {
            self.ids.borrow_mut().make(node_type, "", name)
        }

        fn expr(&self, kind: ExprKind) -> ExprIr {
            ExprIr::new(self.make("expr", ""), SourceSpan::synthetic(), kind)
        }

        fn stmt(&self, kind: StmtKind) -> StmtIr {
            StmtIr::new(self.make("stmt", ""), SourceSpan::synthetic(), kind)
        }

        fn int(&self, v: i64) -> ExprIr {
            self.expr(ExprKind::Literal(LiteralValue::Int(v)))
        }

        fn binary(&self, op: BinaryOp, left: ExprIr, right: ExprIr) -> ExprIr {
            self.expr(ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            })
        }

        fn file_with_main(&self, body: Vec<StmtIr>) -> FileIr {
            let main = FunctionDecl::try_new(
                self.make("function", "main"),
                SourceSpan::synthetic(),
                "main",
                TypeIr::Void,
                vec![],
                Some(FunctionBody::new(body)),
                MemberFlags::empty(),
            )
            .unwrap();
            let mut file = FileIr::new("main.dart");
            file.functions.push(main);
            file
        }
    }

    fn run(file: &FileIr) -> (TypeMap, Vec<AnalysisIssue>) {
        let resolution = Resolver::new().resolve_file(file);
        assert!(resolution.issues.is_empty(), "{:?}", resolution.issues);
        TypeInference::new(&resolution.table, &resolution.bindings).infer_file(file)
    }

    #[test]
    fn int_arithmetic_stays_int_except_division() {
        let b = Builder::new();
        let sum = b.binary(BinaryOp::Add, b.int(1), b.int(2));
        let sum_id = sum.id.clone();
        let quotient = b.binary(BinaryOp::Div, b.int(1), b.int(2));
        let quotient_id = quotient.id.clone();
        let trunc = b.binary(BinaryOp::IntDiv, b.int(7), b.int(2));
        let trunc_id = trunc.id.clone();

        let body = vec![
            b.stmt(StmtKind::ExpressionStmt(sum)),
            b.stmt(StmtKind::ExpressionStmt(quotient)),
            b.stmt(StmtKind::ExpressionStmt(trunc)),
        ];
        let file = b.file_with_main(body);
        let (types, issues) = run(&file);

        assert!(issues.is_empty());
        assert_eq!(types[&sum_id], TypeIr::INT);
        assert_eq!(types[&quotient_id], TypeIr::DOUBLE);
        assert_eq!(types[&trunc_id], TypeIr::INT);
    }

    #[test]
    fn mixed_numeric_promotes_to_double() {
        let b = Builder::new();
        let half = b.expr(ExprKind::Literal(LiteralValue::Double(0.5)));
        let sum = b.binary(BinaryOp::Add, b.int(1), half);
        let sum_id = sum.id.clone();
        let file = b.file_with_main(vec![b.stmt(StmtKind::ExpressionStmt(sum))]);

        let (types, issues) = run(&file);
        assert!(issues.is_empty());
        assert_eq!(types[&sum_id], TypeIr::DOUBLE);
    }

    #[test]
    fn string_plus_int_reports_mismatch_and_degrades() {
        let b = Builder::new();
        let s = b.expr(ExprKind::Literal(LiteralValue::String("a".to_string())));
        let bad = b.binary(BinaryOp::Add, s, b.int(1));
        let bad_id = bad.id.clone();
        let file = b.file_with_main(vec![b.stmt(StmtKind::ExpressionStmt(bad))]);

        let (types, issues) = run(&file);
        assert_eq!(types[&bad_id], TypeIr::Dynamic);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, codes::TYPE_MISMATCH);
    }

    #[test]
    fn unannotated_local_takes_initializer_type() {
        let b = Builder::new();
        let init = b.int(3);
        let decl = b.stmt(StmtKind::VariableDecl {
            name: "n".to_string(),
            declared_type: None,
            initializer: Some(init),
            is_final: false,
            is_const: false,
        });
        let read = b.expr(ExprKind::Identifier {
            name: "n".to_string(),
        });
        let read_id = read.id.clone();
        let body = vec![decl, b.stmt(StmtKind::ExpressionStmt(read))];
        let file = b.file_with_main(body);

        let (types, issues) = run(&file);
        assert!(issues.is_empty());
        assert_eq!(types[&read_id], TypeIr::INT);
    }

    #[test]
    fn conditional_joins_branch_types() {
        let b = Builder::new();
        let cond = b.expr(ExprKind::Literal(LiteralValue::Bool(true)));
        let half = b.expr(ExprKind::Literal(LiteralValue::Double(0.5)));
        let ternary = b.expr(ExprKind::Conditional {
            condition: Box::new(cond),
            then_expr: Box::new(b.int(1)),
            else_expr: Box::new(half),
        });
        let ternary_id = ternary.id.clone();
        let file = b.file_with_main(vec![b.stmt(StmtKind::ExpressionStmt(ternary))]);

        let (types, issues) = run(&file);
        assert!(issues.is_empty());
        assert_eq!(types[&ternary_id], TypeIr::DOUBLE);
    }

    #[test]
    fn unjoinable_branches_degrade_to_dynamic_with_warning() {
        let b = Builder::new();
        let cond = b.expr(ExprKind::Literal(LiteralValue::Bool(true)));
        let s = b.expr(ExprKind::Literal(LiteralValue::String("x".to_string())));
        let ternary = b.expr(ExprKind::Conditional {
            condition: Box::new(cond),
            then_expr: Box::new(b.int(1)),
            else_expr: Box::new(s),
        });
        let ternary_id = ternary.id.clone();
        let file = b.file_with_main(vec![b.stmt(StmtKind::ExpressionStmt(ternary))]);

        let (types, issues) = run(&file);
        assert_eq!(types[&ternary_id], TypeIr::Dynamic);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, codes::NO_COMMON_SUPERTYPE);
    }

    #[test]
    fn comparisons_and_is_checks_are_bool() {
        let b = Builder::new();
        let lt = b.binary(BinaryOp::Lt, b.int(1), b.int(2));
        let lt_id = lt.id.clone();
        let operand = b.int(3);
        let check = b.expr(ExprKind::IsCheck {
            operand: Box::new(operand),
            tested_type: TypeIr::INT,
            negated: false,
        });
        let check_id = check.id.clone();
        let body = vec![
            b.stmt(StmtKind::ExpressionStmt(lt)),
            b.stmt(StmtKind::ExpressionStmt(check)),
        ];
        let file = b.file_with_main(body);

        let (types, issues) = run(&file);
        assert!(issues.is_empty());
        assert_eq!(types[&lt_id], TypeIr::BOOL);
        assert_eq!(types[&check_id], TypeIr::BOOL);
    }

    #[test]
    fn list_literal_joins_elements() {
        let b = Builder::new();
        let list = {
            let e1 = b.int(1);
            let e2 = b.int(2);
            b.expr(ExprKind::ListLiteral {
                elements: vec![e1, e2],
            })
        };
        let list_id = list.id.clone();
        let file = b.file_with_main(vec![b.stmt(StmtKind::ExpressionStmt(list))]);

        let (types, issues) = run(&file);
        assert!(issues.is_empty());
        assert_eq!(types[&list_id], TypeIr::named_with("List", vec![TypeIr::INT]));
    }

    #[test]
    fn every_visited_expression_has_a_type() {
        let b = Builder::new();
        let interp = {
            let inner = b.int(7);
            b.expr(ExprKind::StringInterpolation {
                parts: vec![
                    InterpolationPart::Text("n = ".to_string()),
                    InterpolationPart::Expr(Box::new(inner)),
                ],
            })
        };
        let file = b.file_with_main(vec![b.stmt(StmtKind::ExpressionStmt(interp))]);

        let (types, _) = run(&file);
        // Outer interpolation plus the inner literal.
        assert_eq!(types.len(), 2);
        assert!(types.values().any(|t| *t == TypeIr::STRING));
    }
}
