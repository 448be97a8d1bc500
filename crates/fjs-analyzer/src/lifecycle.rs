//! Widget lifecycle analysis for `State` classes.
//!
//! Tracks disposable resources from creation to cleanup, field
//! initialization against the fixed lifecycle ordering, and the super-call
//! discipline of overridden lifecycle methods. Each analyzed class gets a
//! `LifecycleReport` with a health score: 100 minus a fixed deduction per
//! finding, floored at 0.

use fjs_common::{AnalysisIssue, SourceSpan, codes, limits};
use fjs_ir::{
    CascadeSection, ClassDecl, ExprIr, ExprKind, FieldDecl, FileIr, FunctionDecl,
    InterpolationPart, StmtIr, StmtKind, TypeIr,
};
use rustc_hash::{FxHashMap, FxHashSet};

/// The framework lifecycle methods, in invocation order. `order` indices
/// drive the use-before-init check: a field first assigned in `build` is
/// uninitialized in `initState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LifecycleOp {
    InitState,
    DidChangeDependencies,
    Build,
    DidUpdateWidget,
    Deactivate,
    Dispose,
}

impl LifecycleOp {
    pub fn from_method(name: &str) -> Option<LifecycleOp> {
        Some(match name {
            "initState" => LifecycleOp::InitState,
            "didChangeDependencies" => LifecycleOp::DidChangeDependencies,
            "build" => LifecycleOp::Build,
            "didUpdateWidget" => LifecycleOp::DidUpdateWidget,
            "deactivate" => LifecycleOp::Deactivate,
            "dispose" => LifecycleOp::Dispose,
            _ => return None,
        })
    }

    pub fn method_name(self) -> &'static str {
        match self {
            LifecycleOp::InitState => "initState",
            LifecycleOp::DidChangeDependencies => "didChangeDependencies",
            LifecycleOp::Build => "build",
            LifecycleOp::DidUpdateWidget => "didUpdateWidget",
            LifecycleOp::Deactivate => "deactivate",
            LifecycleOp::Dispose => "dispose",
        }
    }

    pub fn order(self) -> u32 {
        self as u32
    }

    /// Where the mandatory `super` call belongs, if the override must make
    /// one. Setup methods call super first; teardown methods call it last.
    fn super_position(self) -> Option<SuperPosition> {
        match self {
            LifecycleOp::InitState
            | LifecycleOp::DidChangeDependencies
            | LifecycleOp::DidUpdateWidget => Some(SuperPosition::First),
            LifecycleOp::Deactivate | LifecycleOp::Dispose => Some(SuperPosition::Last),
            LifecycleOp::Build => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SuperPosition {
    First,
    Last,
}

/// Tuning knobs for the pass. The default disposable set covers the
/// framework controller types plus the async primitives that hold OS
/// resources.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    pub disposable_types: FxHashSet<String>,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        let disposable_types = [
            "AnimationController",
            "TextEditingController",
            "ScrollController",
            "PageController",
            "TabController",
            "FocusNode",
            "StreamSubscription",
            "StreamController",
            "Timer",
            "ValueNotifier",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();
        Self { disposable_types }
    }
}

impl LifecycleConfig {
    fn is_disposable(&self, ty: &TypeIr) -> bool {
        match ty {
            TypeIr::Named { name, .. } => self.disposable_types.contains(name),
            _ => false,
        }
    }
}

/// A disposable resource with no cleanup call in `dispose`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceLeak {
    pub field: String,
    pub resource_type: String,
    pub span: SourceSpan,
}

/// A field read in a lifecycle method that runs before any method that
/// assigns it.
#[derive(Debug, Clone, PartialEq)]
pub struct UseBeforeInit {
    pub field: String,
    pub read_in: LifecycleOp,
    pub initialized_in: Option<LifecycleOp>,
    pub span: SourceSpan,
}

#[derive(Debug)]
pub struct LifecycleReport {
    pub class_name: String,
    pub leaks: Vec<ResourceLeak>,
    pub use_before_init: Vec<UseBeforeInit>,
    pub issues: Vec<AnalysisIssue>,
    pub health_score: u32,
}

/// First read or write of a field within one method body.
#[derive(Debug, Clone)]
struct FieldUse {
    stmt_index: usize,
    span: SourceSpan,
}

/// What one method body does to the class's fields.
#[derive(Debug, Default)]
struct MethodFacts {
    /// Field name to the first read.
    reads: FxHashMap<String, FieldUse>,
    /// Field name to the first assignment.
    writes: FxHashMap<String, FieldUse>,
    /// Field name to the class constructed in its first `f = Ctor(...)`
    /// assignment; how untyped fields get their resource type.
    ctor_writes: FxHashMap<String, String>,
    /// `(field, method)` pairs for calls like `_controller.dispose()`.
    member_calls: FxHashSet<(String, String)>,
    /// Indices (in statement order) of `super.<name>()` calls at the top
    /// level of the body, with the called name.
    super_calls: Vec<(usize, String)>,
    statement_count: usize,
    /// Index of the top-level statement currently being visited.
    current_stmt: usize,
}

pub struct LifecycleAnalyzer {
    config: LifecycleConfig,
}

impl Default for LifecycleAnalyzer {
    fn default() -> Self {
        Self::new(LifecycleConfig::default())
    }
}

impl LifecycleAnalyzer {
    pub fn new(config: LifecycleConfig) -> Self {
        Self { config }
    }

    pub fn analyze_file(&self, file: &FileIr) -> Vec<LifecycleReport> {
        file.classes
            .iter()
            .filter_map(|class| self.analyze_class(class))
            .collect()
    }

    /// Analyze one class. Returns `None` for classes outside the widget
    /// lifecycle (everything that is not a `State` subclass).
    pub fn analyze_class(&self, class: &ClassDecl) -> Option<LifecycleReport> {
        if !class.is_state_class() {
            return None;
        }
        tracing::debug!(class = %class.name, "analyzing lifecycle");

        let field_names: FxHashSet<&str> =
            class.fields.iter().map(|f| f.name.as_str()).collect();
        let mut facts: FxHashMap<LifecycleOp, MethodFacts> = FxHashMap::default();
        for method in &class.methods {
            let Some(op) = LifecycleOp::from_method(&method.name) else {
                continue;
            };
            facts.insert(op, collect_facts(method, &field_names));
        }

        let mut issues = Vec::new();
        let leaks = self.find_leaks(class, &facts, &mut issues);
        let use_before_init = find_use_before_init(class, &facts, &mut issues);
        check_super_calls(class, &facts, &mut issues);

        let health_score = score(&issues);
        Some(LifecycleReport {
            class_name: class.name.clone(),
            leaks,
            use_before_init,
            issues,
            health_score,
        })
    }

    // =========================================================================
    // Resource leaks
    // =========================================================================

    fn find_leaks(
        &self,
        class: &ClassDecl,
        facts: &FxHashMap<LifecycleOp, MethodFacts>,
        issues: &mut Vec<AnalysisIssue>,
    ) -> Vec<ResourceLeak> {
        let init = facts.get(&LifecycleOp::InitState);
        let dispose = facts.get(&LifecycleOp::Dispose);
        let mut leaks = Vec::new();
        for field in &class.fields {
            let Some(resource_type) = self.disposable_type_of(field, init) else {
                continue;
            };
            // A resource that is never constructed cannot leak. Creation is
            // either a constructor initializer on the declaration or an
            // assignment inside initState.
            let created = init.is_some_and(|f| f.writes.contains_key(&field.name))
                || matches!(
                    field.initializer.as_ref().map(|init| &init.kind),
                    Some(ExprKind::ConstructorCall { .. })
                );
            if !created {
                continue;
            }
            let cleaned = dispose.is_some_and(|d| {
                d.member_calls.iter().any(|(f, m)| {
                    f == &field.name && matches!(m.as_str(), "dispose" | "cancel" | "close" | "stop")
                })
            });
            if cleaned {
                continue;
            }
            let verb = cleanup_verb(&resource_type);
            issues.push(
                AnalysisIssue::warning(
                    codes::RESOURCE_LEAK,
                    format!(
                        "{} '{}' is never released in dispose()",
                        resource_type, field.name
                    ),
                    field.span.clone(),
                )
                .with_suggestion(format!("call {}.{verb}() in dispose()", field.name)),
            );
            leaks.push(ResourceLeak {
                field: field.name.clone(),
                resource_type,
                span: field.span.clone(),
            });
        }
        leaks
    }

    /// The disposable type name of a field, from its declared type or, when
    /// the declaration is untyped, from the constructor it is assigned: its
    /// declaration initializer or its first assignment in initState.
    fn disposable_type_of(
        &self,
        field: &FieldDecl,
        init: Option<&MethodFacts>,
    ) -> Option<String> {
        if self.config.is_disposable(&field.declared_type) {
            if let TypeIr::Named { name, .. } = &field.declared_type {
                return Some(name.clone());
            }
        }
        if let Some(ExprIr {
            kind: ExprKind::ConstructorCall { class_name, .. },
            ..
        }) = field.initializer.as_ref()
        {
            if self.config.disposable_types.contains(class_name) {
                return Some(class_name.clone());
            }
        }
        if let Some(class_name) = init.and_then(|f| f.ctor_writes.get(&field.name)) {
            if self.config.disposable_types.contains(class_name) {
                return Some(class_name.clone());
            }
        }
        None
    }
}

fn cleanup_verb(resource_type: &str) -> &'static str {
    match resource_type {
        "Timer" | "StreamSubscription" => "cancel",
        "StreamController" => "close",
        _ => "dispose",
    }
}

// =============================================================================
// Use before init
// =============================================================================

fn find_use_before_init(
    class: &ClassDecl,
    facts: &FxHashMap<LifecycleOp, MethodFacts>,
    issues: &mut Vec<AnalysisIssue>,
) -> Vec<UseBeforeInit> {
    let mut findings = Vec::new();
    for field in &class.fields {
        // A field with an initializer is live before any lifecycle method.
        if field.initializer.is_some() || field.is_static || field.is_const {
            continue;
        }
        let initialized_in = facts
            .iter()
            .filter(|(_, f)| f.writes.contains_key(&field.name))
            .map(|(&op, _)| op)
            .min();
        for (&op, method_facts) in facts {
            let Some(read) = method_facts.reads.get(&field.name) else {
                continue;
            };
            // Reads in the first-writing method itself count when they sit
            // above the write in statement order.
            let before = match initialized_in {
                Some(init_op) if op == init_op => method_facts
                    .writes
                    .get(&field.name)
                    .is_some_and(|write| read.stmt_index < write.stmt_index),
                Some(init_op) => op.order() < init_op.order(),
                None => true,
            };
            if !before {
                continue;
            }
            issues.push(AnalysisIssue::error(
                codes::USE_BEFORE_INIT,
                match initialized_in {
                    Some(init_op) => format!(
                        "field '{}' is read in {}() but first assigned in {}()",
                        field.name,
                        op.method_name(),
                        init_op.method_name()
                    ),
                    None => format!(
                        "field '{}' is read in {}() but never assigned",
                        field.name,
                        op.method_name()
                    ),
                },
                read.span.clone(),
            ));
            findings.push(UseBeforeInit {
                field: field.name.clone(),
                read_in: op,
                initialized_in,
                span: read.span.clone(),
            });
        }
    }
    // FxHashMap iteration order is arbitrary; reports must not be.
    findings.sort_by(|a, b| (&a.field, a.read_in).cmp(&(&b.field, b.read_in)));
    issues.sort_by(|a, b| (&a.code, &a.message).cmp(&(&b.code, &b.message)));
    findings
}

// =============================================================================
// Super-call discipline
// =============================================================================

fn check_super_calls(
    class: &ClassDecl,
    facts: &FxHashMap<LifecycleOp, MethodFacts>,
    issues: &mut Vec<AnalysisIssue>,
) {
    for method in &class.methods {
        let Some(op) = LifecycleOp::from_method(&method.name) else {
            continue;
        };
        let Some(position) = op.super_position() else {
            continue;
        };
        let Some(method_facts) = facts.get(&op) else {
            continue;
        };
        let own_super = method_facts
            .super_calls
            .iter()
            .find(|(_, name)| name == method.name.as_str());
        match own_super {
            None => {
                issues.push(
                    AnalysisIssue::error(
                        codes::MISSING_SUPER_CALL,
                        format!("{}() never calls super.{}()", method.name, method.name),
                        method.span.clone(),
                    )
                    .with_suggestion(format!("add super.{}()", method.name)),
                );
            }
            Some(&(index, _)) => {
                let misplaced = match position {
                    SuperPosition::First => index != 0,
                    SuperPosition::Last => index + 1 != method_facts.statement_count,
                };
                if misplaced {
                    let expected = match position {
                        SuperPosition::First => "first",
                        SuperPosition::Last => "last",
                    };
                    issues.push(AnalysisIssue::warning(
                        codes::LIFECYCLE_ORDER,
                        format!(
                            "super.{}() should be the {expected} statement of {}()",
                            method.name, method.name
                        ),
                        method.span.clone(),
                    ));
                }
            }
        }
    }
}

fn score(issues: &[AnalysisIssue]) -> u32 {
    let mut deductions: u32 = 0;
    for issue in issues {
        deductions += match issue.code.as_str() {
            codes::RESOURCE_LEAK => limits::DEDUCTION_RESOURCE_LEAK,
            codes::USE_BEFORE_INIT => limits::DEDUCTION_USE_BEFORE_INIT,
            codes::MISSING_SUPER_CALL => limits::DEDUCTION_MISSING_SUPER_CALL,
            codes::LIFECYCLE_ORDER => limits::DEDUCTION_LIFECYCLE_ORDER,
            _ => 0,
        };
    }
    limits::HEALTH_SCORE_MAX.saturating_sub(deductions)
}

// =============================================================================
// Body fact collection
// =============================================================================

fn collect_facts(method: &FunctionDecl, fields: &FxHashSet<&str>) -> MethodFacts {
    let mut facts = MethodFacts::default();
    let Some(body) = &method.body else {
        return facts;
    };
    facts.statement_count = body.statements.len();
    for (index, stmt) in body.statements.iter().enumerate() {
        if let StmtKind::ExpressionStmt(ExprIr {
            kind:
                ExprKind::MethodCall {
                    target: Some(target),
                    method: name,
                    ..
                },
            ..
        }) = &stmt.kind
        {
            if matches!(target.kind, ExprKind::Super) {
                facts.super_calls.push((index, name.clone()));
            }
        }
        facts.current_stmt = index;
        visit_stmt(stmt, fields, &mut facts);
    }
    facts
}

fn visit_stmt(stmt: &StmtIr, fields: &FxHashSet<&str>, facts: &mut MethodFacts) {
    match &stmt.kind {
        StmtKind::Block(stmts) => {
            for s in stmts {
                visit_stmt(s, fields, facts);
            }
        }
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            visit_expr(condition, fields, facts);
            for s in then_branch {
                visit_stmt(s, fields, facts);
            }
            if let Some(else_branch) = else_branch {
                for s in else_branch {
                    visit_stmt(s, fields, facts);
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
                visit_stmt(init, fields, facts);
            }
            if let Some(condition) = condition {
                visit_expr(condition, fields, facts);
            }
            if let Some(update) = update {
                visit_expr(update, fields, facts);
            }
            for s in body {
                visit_stmt(s, fields, facts);
            }
        }
        StmtKind::ForIn { iterable, body, .. } => {
            visit_expr(iterable, fields, facts);
            for s in body {
                visit_stmt(s, fields, facts);
            }
        }
        StmtKind::While {
            condition, body, ..
        } => {
            visit_expr(condition, fields, facts);
            for s in body {
                visit_stmt(s, fields, facts);
            }
        }
        StmtKind::Return(value) => {
            if let Some(value) = value {
                visit_expr(value, fields, facts);
            }
        }
        StmtKind::Break | StmtKind::Continue => {}
        StmtKind::Throw(value) => visit_expr(value, fields, facts),
        StmtKind::TryCatch {
            body,
            catch_clauses,
            finally_block,
        } => {
            for s in body {
                visit_stmt(s, fields, facts);
            }
            for clause in catch_clauses {
                for s in &clause.body {
                    visit_stmt(s, fields, facts);
                }
            }
            if let Some(finally_block) = finally_block {
                for s in finally_block {
                    visit_stmt(s, fields, facts);
                }
            }
        }
        StmtKind::VariableDecl { initializer, .. } => {
            if let Some(init) = initializer {
                visit_expr(init, fields, facts);
            }
        }
        StmtKind::ExpressionStmt(expr) => visit_expr(expr, fields, facts),
    }
}

/// A reference to a class field: bare `_name` or `this._name`.
fn field_ref<'e>(expr: &'e ExprIr, fields: &FxHashSet<&str>) -> Option<&'e str> {
    match &expr.kind {
        ExprKind::Identifier { name } if fields.contains(name.as_str()) => Some(name),
        ExprKind::PropertyAccess { target, property }
            if matches!(target.kind, ExprKind::This) && fields.contains(property.as_str()) =>
        {
            Some(property)
        }
        _ => None,
    }
}

fn visit_expr(expr: &ExprIr, fields: &FxHashSet<&str>, facts: &mut MethodFacts) {
    let at = facts.current_stmt;
    let use_at = |span: &SourceSpan| FieldUse {
        stmt_index: at,
        span: span.clone(),
    };
    match &expr.kind {
        ExprKind::Literal(_) | ExprKind::This | ExprKind::Super => {}
        ExprKind::Identifier { name } => {
            if fields.contains(name.as_str()) {
                facts
                    .reads
                    .entry(name.clone())
                    .or_insert_with(|| use_at(&expr.span));
            }
        }
        ExprKind::Binary { left, right, .. } => {
            visit_expr(left, fields, facts);
            visit_expr(right, fields, facts);
        }
        ExprKind::Unary { operand, .. } => visit_expr(operand, fields, facts),
        ExprKind::MethodCall {
            target,
            method,
            args,
            named_args,
        } => {
            if let Some(target) = target {
                if let Some(field) = field_ref(target, fields) {
                    facts
                        .member_calls
                        .insert((field.to_string(), method.clone()));
                    facts
                        .reads
                        .entry(field.to_string())
                        .or_insert_with(|| use_at(&target.span));
                } else {
                    visit_expr(target, fields, facts);
                }
            }
            for arg in args {
                visit_expr(arg, fields, facts);
            }
            for named in named_args {
                visit_expr(&named.value, fields, facts);
            }
        }
        ExprKind::PropertyAccess { target, .. } => {
            if let Some(field) = field_ref(expr, fields) {
                facts
                    .reads
                    .entry(field.to_string())
                    .or_insert_with(|| use_at(&expr.span));
            } else {
                visit_expr(target, fields, facts);
            }
        }
        ExprKind::IndexAccess { target, index } => {
            visit_expr(target, fields, facts);
            visit_expr(index, fields, facts);
        }
        ExprKind::Conditional {
            condition,
            then_expr,
            else_expr,
        } => {
            visit_expr(condition, fields, facts);
            visit_expr(then_expr, fields, facts);
            visit_expr(else_expr, fields, facts);
        }
        ExprKind::Assignment { target, value } => {
            if let Some(field) = field_ref(target, fields) {
                facts
                    .writes
                    .entry(field.to_string())
                    .or_insert_with(|| use_at(&target.span));
                if let ExprKind::ConstructorCall { class_name, .. } = &value.kind {
                    facts
                        .ctor_writes
                        .entry(field.to_string())
                        .or_insert_with(|| class_name.clone());
                }
            } else {
                visit_expr(target, fields, facts);
            }
            visit_expr(value, fields, facts);
        }
        ExprKind::CompoundAssignment { target, value, .. } => {
            // `x += 1` both reads and writes x.
            if let Some(field) = field_ref(target, fields) {
                facts
                    .writes
                    .entry(field.to_string())
                    .or_insert_with(|| use_at(&target.span));
                facts
                    .reads
                    .entry(field.to_string())
                    .or_insert_with(|| use_at(&target.span));
            } else {
                visit_expr(target, fields, facts);
            }
            visit_expr(value, fields, facts);
        }
        ExprKind::Cast { operand, .. } => visit_expr(operand, fields, facts),
        ExprKind::IsCheck { operand, .. } => visit_expr(operand, fields, facts),
        ExprKind::Cascade { target, sections } => {
            if let Some(field) = field_ref(target, fields) {
                facts
                    .reads
                    .entry(field.to_string())
                    .or_insert_with(|| use_at(&target.span));
                for section in sections {
                    if let CascadeSection::MethodCall { method, .. } = section {
                        facts
                            .member_calls
                            .insert((field.to_string(), method.clone()));
                    }
                }
            } else {
                visit_expr(target, fields, facts);
            }
            for section in sections {
                match section {
                    CascadeSection::MethodCall {
                        args, named_args, ..
                    } => {
                        for arg in args {
                            visit_expr(arg, fields, facts);
                        }
                        for named in named_args {
                            visit_expr(&named.value, fields, facts);
                        }
                    }
                    CascadeSection::PropertySet { value, .. } => {
                        visit_expr(value, fields, facts)
                    }
                }
            }
        }
        ExprKind::NullAwareAccess { target, .. } => visit_expr(target, fields, facts),
        ExprKind::NullCoalescing { left, right } => {
            visit_expr(left, fields, facts);
            visit_expr(right, fields, facts);
        }
        ExprKind::ListLiteral { elements } | ExprKind::SetLiteral { elements } => {
            for element in elements {
                visit_expr(element, fields, facts);
            }
        }
        ExprKind::MapLiteral { entries } => {
            for (key, value) in entries {
                visit_expr(key, fields, facts);
                visit_expr(value, fields, facts);
            }
        }
        ExprKind::StringInterpolation { parts } => {
            for part in parts {
                if let InterpolationPart::Expr(inner) = part {
                    visit_expr(inner, fields, facts);
                }
            }
        }
        ExprKind::ConstructorCall {
            args, named_args, ..
        } => {
            for arg in args {
                visit_expr(arg, fields, facts);
            }
            for named in named_args {
                visit_expr(&named.value, fields, facts);
            }
        }
        ExprKind::FunctionExpr { body, .. } => {
            for stmt in body {
                visit_stmt(stmt, fields, facts);
            }
        }
        ExprKind::Parenthesized { inner } => visit_expr(inner, fields, facts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fjs_common::limits;
    use fjs_ir::{FunctionBody, IdGenerator, LiteralValue, MemberFlags, WidgetKind};

    struct Builder {
        ids: IdGenerator,
    }

    impl Builder {
        fn new() -> Self {
            Self {
                ids: IdGenerator::simple(),
            }
        }

        fn expr(&mut self, kind: ExprKind) -> ExprIr {
            ExprIr::new(self.ids.make("expr", "", ""), SourceSpan::synthetic(), kind)
        }

        fn stmt(&mut self, kind: StmtKind) -> StmtIr {
            StmtIr::new(self.ids.make("stmt", "", ""), SourceSpan::synthetic(), kind)
        }

        fn super_call(&mut self, method: &str) -> StmtIr {
            let sup = self.expr(ExprKind::Super);
            let call = self.expr(ExprKind::MethodCall {
                target: Some(Box::new(sup)),
                method: method.to_string(),
                args: vec![],
                named_args: vec![],
            });
            self.stmt(StmtKind::ExpressionStmt(call))
        }

        fn field_call(&mut self, field: &str, method: &str) -> StmtIr {
            let target = self.expr(ExprKind::Identifier {
                name: field.to_string(),
            });
            let call = self.expr(ExprKind::MethodCall {
                target: Some(Box::new(target)),
                method: method.to_string(),
                args: vec![],
                named_args: vec![],
            });
            self.stmt(StmtKind::ExpressionStmt(call))
        }

        fn assign_ctor(&mut self, field: &str, class_name: &str) -> StmtIr {
            let target = self.expr(ExprKind::Identifier {
                name: field.to_string(),
            });
            let value = self.expr(ExprKind::ConstructorCall {
                class_name: class_name.to_string(),
                ctor_name: None,
                args: vec![],
                named_args: vec![],
                is_const: false,
            });
            let assign = self.expr(ExprKind::Assignment {
                target: Box::new(target),
                value: Box::new(value),
            });
            self.stmt(StmtKind::ExpressionStmt(assign))
        }

        fn read_field(&mut self, field: &str) -> StmtIr {
            let ident = self.expr(ExprKind::Identifier {
                name: field.to_string(),
            });
            let call = self.expr(ExprKind::MethodCall {
                target: None,
                method: "print".to_string(),
                args: vec![ident],
                named_args: vec![],
            });
            self.stmt(StmtKind::ExpressionStmt(call))
        }

        fn assign_str(&mut self, field: &str, value: &str) -> StmtIr {
            let target = self.expr(ExprKind::Identifier {
                name: field.to_string(),
            });
            let value = self.expr(ExprKind::Literal(LiteralValue::String(value.to_string())));
            let assign = self.expr(ExprKind::Assignment {
                target: Box::new(target),
                value: Box::new(value),
            });
            self.stmt(StmtKind::ExpressionStmt(assign))
        }

        fn field(&mut self, name: &str, ty: TypeIr) -> FieldDecl {
            FieldDecl {
                id: self.ids.make("field", "", name),
                span: SourceSpan::synthetic(),
                name: name.to_string(),
                declared_type: ty,
                initializer: None,
                is_final: false,
                is_const: false,
                is_static: false,
                is_late: false,
            }
        }

        fn method(&mut self, name: &str, body: Vec<StmtIr>) -> FunctionDecl {
            let return_type = if name == "build" {
                TypeIr::named("Widget")
            } else {
                TypeIr::Void
            };
            FunctionDecl::try_new(
                self.ids.make("method", "", name),
                SourceSpan::synthetic(),
                name,
                return_type,
                vec![],
                Some(FunctionBody::new(body)),
                MemberFlags::OVERRIDE,
            )
            .unwrap()
        }

        fn state_class(
            &mut self,
            name: &str,
            fields: Vec<FieldDecl>,
            methods: Vec<FunctionDecl>,
        ) -> ClassDecl {
            ClassDecl {
                id: self.ids.make("class", "", name),
                span: SourceSpan::synthetic(),
                name: name.to_string(),
                superclass: Some("State<Counter>".to_string()),
                interfaces: vec![],
                mixins: vec![],
                fields,
                methods,
                constructors: vec![],
                is_abstract: false,
                widget_kind: WidgetKind::State,
            }
        }
    }

    fn analyze(class: &ClassDecl) -> LifecycleReport {
        LifecycleAnalyzer::default()
            .analyze_class(class)
            .expect("state class")
    }

    #[test]
    fn non_state_classes_are_skipped() {
        let mut b = Builder::new();
        let mut class = b.state_class("Plain", vec![], vec![]);
        class.superclass = None;
        class.widget_kind = WidgetKind::None;
        assert!(LifecycleAnalyzer::default().analyze_class(&class).is_none());
    }

    #[test]
    fn undisposed_controller_is_a_leak() {
        let mut b = Builder::new();
        let field = b.field("_controller", TypeIr::named("AnimationController"));
        let init_state = {
            let sup = b.super_call("initState");
            let assign = b.assign_ctor("_controller", "AnimationController");
            b.method("initState", vec![sup, assign])
        };
        let dispose = {
            let sup = b.super_call("dispose");
            b.method("dispose", vec![sup])
        };
        let class = b.state_class("_CounterState", vec![field], vec![init_state, dispose]);

        let report = analyze(&class);
        assert_eq!(report.leaks.len(), 1);
        assert_eq!(report.leaks[0].field, "_controller");
        assert_eq!(report.leaks[0].resource_type, "AnimationController");
        assert!(report.issues.iter().any(|i| i.code == codes::RESOURCE_LEAK));
        assert_eq!(
            report.health_score,
            limits::HEALTH_SCORE_MAX - limits::DEDUCTION_RESOURCE_LEAK
        );
    }

    #[test]
    fn disposed_controller_is_clean() {
        let mut b = Builder::new();
        let field = b.field("_controller", TypeIr::named("AnimationController"));
        let init_state = {
            let sup = b.super_call("initState");
            let assign = b.assign_ctor("_controller", "AnimationController");
            b.method("initState", vec![sup, assign])
        };
        let dispose = {
            let release = b.field_call("_controller", "dispose");
            let sup = b.super_call("dispose");
            b.method("dispose", vec![release, sup])
        };
        let class = b.state_class("_CounterState", vec![field], vec![init_state, dispose]);

        let report = analyze(&class);
        assert!(report.leaks.is_empty());
        assert_eq!(report.health_score, limits::HEALTH_SCORE_MAX);
    }

    #[test]
    fn timer_cancel_counts_as_cleanup() {
        let mut b = Builder::new();
        let field = b.field("_timer", TypeIr::named("Timer"));
        let init_state = {
            let sup = b.super_call("initState");
            let assign = b.assign_ctor("_timer", "Timer");
            b.method("initState", vec![sup, assign])
        };
        let dispose = {
            let cancel = b.field_call("_timer", "cancel");
            let sup = b.super_call("dispose");
            b.method("dispose", vec![cancel, sup])
        };
        let class = b.state_class("_S", vec![field], vec![init_state, dispose]);

        assert!(analyze(&class).leaks.is_empty());
    }

    #[test]
    fn read_in_init_state_assigned_in_build_is_use_before_init() {
        let mut b = Builder::new();
        let field = b.field("_label", TypeIr::STRING);
        let init_state = {
            let sup = b.super_call("initState");
            let read = {
                let ident = b.expr(ExprKind::Identifier {
                    name: "_label".to_string(),
                });
                let call = b.expr(ExprKind::MethodCall {
                    target: None,
                    method: "print".to_string(),
                    args: vec![ident],
                    named_args: vec![],
                });
                b.stmt(StmtKind::ExpressionStmt(call))
            };
            b.method("initState", vec![sup, read])
        };
        let build = {
            let target = b.expr(ExprKind::Identifier {
                name: "_label".to_string(),
            });
            let value = b.expr(ExprKind::Literal(LiteralValue::String("hi".to_string())));
            let assign = b.expr(ExprKind::Assignment {
                target: Box::new(target),
                value: Box::new(value),
            });
            let stmt = b.stmt(StmtKind::ExpressionStmt(assign));
            b.method("build", vec![stmt])
        };
        let class = b.state_class("_S", vec![field], vec![init_state, build]);

        let report = analyze(&class);
        assert_eq!(report.use_before_init.len(), 1);
        let finding = &report.use_before_init[0];
        assert_eq!(finding.field, "_label");
        assert_eq!(finding.read_in, LifecycleOp::InitState);
        assert_eq!(finding.initialized_in, Some(LifecycleOp::Build));
    }

    #[test]
    fn never_constructed_disposable_field_is_not_a_leak() {
        let mut b = Builder::new();
        let field = b.field("_controller", TypeIr::named("AnimationController"));
        let init_state = {
            let sup = b.super_call("initState");
            b.method("initState", vec![sup])
        };
        let dispose = {
            let sup = b.super_call("dispose");
            b.method("dispose", vec![sup])
        };
        let class = b.state_class("_S", vec![field], vec![init_state, dispose]);

        let report = analyze(&class);
        assert!(report.leaks.is_empty());
        assert_eq!(report.health_score, limits::HEALTH_SCORE_MAX);
    }

    #[test]
    fn untyped_field_assigned_controller_in_init_state_leaks() {
        let mut b = Builder::new();
        let field = b.field("_controller", TypeIr::Dynamic);
        let init_state = {
            let sup = b.super_call("initState");
            let assign = b.assign_ctor("_controller", "AnimationController");
            b.method("initState", vec![sup, assign])
        };
        let dispose = {
            let sup = b.super_call("dispose");
            b.method("dispose", vec![sup])
        };
        let class = b.state_class("_S", vec![field], vec![init_state, dispose]);

        let report = analyze(&class);
        assert_eq!(report.leaks.len(), 1);
        assert_eq!(report.leaks[0].field, "_controller");
        assert_eq!(report.leaks[0].resource_type, "AnimationController");
    }

    #[test]
    fn read_above_the_first_assignment_in_the_same_method_is_reported() {
        let mut b = Builder::new();
        let field = b.field("_label", TypeIr::STRING);
        let init_state = {
            let sup = b.super_call("initState");
            let read = b.read_field("_label");
            let assign = b.assign_str("_label", "hi");
            b.method("initState", vec![sup, read, assign])
        };
        let class = b.state_class("_S", vec![field], vec![init_state]);

        let report = analyze(&class);
        assert_eq!(report.use_before_init.len(), 1);
        let finding = &report.use_before_init[0];
        assert_eq!(finding.field, "_label");
        assert_eq!(finding.read_in, LifecycleOp::InitState);
        assert_eq!(finding.initialized_in, Some(LifecycleOp::InitState));
    }

    #[test]
    fn read_below_the_assignment_in_the_same_method_is_clean() {
        let mut b = Builder::new();
        let field = b.field("_label", TypeIr::STRING);
        let init_state = {
            let sup = b.super_call("initState");
            let assign = b.assign_str("_label", "hi");
            let read = b.read_field("_label");
            b.method("initState", vec![sup, assign, read])
        };
        let class = b.state_class("_S", vec![field], vec![init_state]);

        assert!(analyze(&class).use_before_init.is_empty());
    }

    #[test]
    fn missing_super_in_init_state_is_reported() {
        let mut b = Builder::new();
        let init_state = {
            let assign = b.assign_ctor("_x", "Timer");
            b.method("initState", vec![assign])
        };
        let field = b.field("_x", TypeIr::named("Timer"));
        let dispose = {
            let cancel = b.field_call("_x", "cancel");
            let sup = b.super_call("dispose");
            b.method("dispose", vec![cancel, sup])
        };
        let class = b.state_class("_S", vec![field], vec![init_state, dispose]);

        let report = analyze(&class);
        assert!(report.issues.iter().any(|i| i.code == codes::MISSING_SUPER_CALL));
        assert_eq!(
            report.health_score,
            limits::HEALTH_SCORE_MAX - limits::DEDUCTION_MISSING_SUPER_CALL
        );
    }

    #[test]
    fn super_dispose_must_come_last() {
        let mut b = Builder::new();
        let field = b.field("_controller", TypeIr::named("ScrollController"));
        let init_state = {
            let sup = b.super_call("initState");
            let assign = b.assign_ctor("_controller", "ScrollController");
            b.method("initState", vec![sup, assign])
        };
        let dispose = {
            let sup = b.super_call("dispose");
            let release = b.field_call("_controller", "dispose");
            b.method("dispose", vec![sup, release])
        };
        let class = b.state_class("_S", vec![field], vec![init_state, dispose]);

        let report = analyze(&class);
        assert!(report.issues.iter().any(|i| i.code == codes::LIFECYCLE_ORDER));
        assert!(report.leaks.is_empty());
    }

    #[test]
    fn health_score_floors_at_zero() {
        let mut b = Builder::new();
        let fields: Vec<FieldDecl> = (0..6)
            .map(|i| b.field(&format!("_c{i}"), TypeIr::named("AnimationController")))
            .collect();
        // No dispose method at all: every controller leaks.
        let init_state = {
            let assigns: Vec<StmtIr> = (0..6)
                .map(|i| b.assign_ctor(&format!("_c{i}"), "AnimationController"))
                .collect();
            b.method("initState", assigns)
        };
        let class = b.state_class("_S", fields, vec![init_state]);

        let report = analyze(&class);
        // 6 leaks at 20 each, plus the missing super.initState().
        assert_eq!(report.leaks.len(), 6);
        assert_eq!(report.health_score, 0);
    }
}
