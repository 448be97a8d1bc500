//! Symbol resolution.
//!
//! Walks one file's IR with a lexical scope stack and binds every
//! identifier-like node to a `SymbolId` in the side `BindingMap`. Names that
//! resolve nowhere (scopes, then project globals, then the ambient framework
//! set) bind to the shared `SymbolId::DYNAMIC` placeholder and report
//! `unresolved_identifier`; resolution never aborts the pipeline.

use crate::scopes::{GlobalSymbolTable, Symbol, SymbolId, SymbolKind, SymbolTable};
use fjs_common::{AnalysisIssue, SourceSpan, codes};
use fjs_ir::{
    CascadeSection, ClassDecl, ConstructorDecl, ExprIr, ExprKind, FileIr, FunctionDecl,
    InterpolationPart, NodeId, ParameterDecl, StmtIr, StmtKind, TypeIr,
};
use once_cell::sync::Lazy;
use rustc_hash::{FxHashMap, FxHashSet};

/// Side table from IR node id to resolved symbol.
pub type BindingMap = FxHashMap<NodeId, SymbolId>;

/// Names provided by the Dart core libraries and the widget framework.
/// These resolve silently to the Dynamic placeholder; everything else
/// unknown is an error.
static AMBIENT_NAMES: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        // dart:core
        "print", "identical", "int", "double", "num", "bool", "String", "Object", "List", "Map",
        "Set", "Iterable", "Duration", "DateTime", "Future", "Stream", "StreamController",
        "StreamSubscription", "Timer", "Exception", "Error", "StateError", "ArgumentError",
        "UnimplementedError", "UnsupportedError", "RegExp", "Uri", "Comparable",
        // widget framework
        "Widget", "StatelessWidget", "StatefulWidget", "State", "BuildContext", "Key", "ValueKey",
        "GlobalKey", "MaterialApp", "Scaffold", "AppBar", "Text", "TextStyle", "Container",
        "Column", "Row", "Stack", "Center", "Padding", "EdgeInsets", "SizedBox", "Expanded",
        "Flexible", "Icon", "Icons", "IconButton", "ListView", "ListTile", "GridView",
        "ElevatedButton", "TextButton", "FloatingActionButton", "GestureDetector", "InkWell",
        "Image", "Card", "Divider", "CircularProgressIndicator", "TextField", "Form",
        "TextEditingController", "ScrollController", "PageController", "TabController",
        "AnimationController", "Animation", "Tween", "CurvedAnimation", "Curves", "FocusNode",
        "Navigator", "MaterialPageRoute", "Theme", "ThemeData", "Color", "Colors", "Alignment",
        "MainAxisAlignment", "CrossAxisAlignment", "BoxDecoration", "BorderRadius", "MediaQuery",
        "SafeArea", "SingleChildScrollView", "Spacer", "Wrap", "Tooltip", "Switch", "Checkbox",
        "Slider", "Radio", "DropdownButton", "DropdownMenuItem", "SnackBar", "ScaffoldMessenger",
        "AlertDialog", "Placeholder", "ValueNotifier", "ChangeNotifier", "VoidCallback",
        // members inherited from State, visible unqualified in subclasses
        "setState", "mounted", "widget", "context",
    ]
    .into_iter()
    .collect()
});

/// Everything resolution produces for one file.
#[derive(Debug)]
pub struct Resolution {
    pub table: SymbolTable,
    pub bindings: BindingMap,
    pub issues: Vec<AnalysisIssue>,
}

pub struct Resolver<'a> {
    global: Option<&'a GlobalSymbolTable>,
    table: SymbolTable,
    scopes: Vec<FxHashMap<String, SymbolId>>,
    bindings: BindingMap,
    issues: Vec<AnalysisIssue>,
    current_class: Option<String>,
}

impl<'a> Resolver<'a> {
    pub fn new() -> Self {
        Self {
            global: None,
            table: SymbolTable::new(),
            scopes: Vec::new(),
            bindings: BindingMap::default(),
            issues: Vec::new(),
            current_class: None,
        }
    }

    /// Resolve against a project-wide table of top-level exports, so names
    /// declared in other files resolve instead of erroring.
    pub fn with_global(global: &'a GlobalSymbolTable) -> Self {
        Self {
            global: Some(global),
            ..Self::new()
        }
    }

    pub fn resolve_file(mut self, file: &FileIr) -> Resolution {
        tracing::debug!(file = %file.path, "resolving symbols");
        self.scopes.push(FxHashMap::default());

        // Top-level names are hoisted: declare everything before resolving
        // any body so forward references within the file work.
        for class in &file.classes {
            let id = self.declare(
                &class.name,
                SymbolKind::Class,
                TypeIr::named(&class.name),
                Some(class.span.clone()),
            );
            self.bindings.insert(class.id.clone(), id);
            self.declare_class_members(class);
        }
        for function in &file.functions {
            let id = self.declare(
                &function.name,
                SymbolKind::Function,
                function_type(function),
                Some(function.span.clone()),
            );
            self.bindings.insert(function.id.clone(), id);
        }

        for class in &file.classes {
            self.resolve_class(class);
        }
        for function in &file.functions {
            self.resolve_function(function);
        }

        self.scopes.pop();
        Resolution {
            table: self.table,
            bindings: self.bindings,
            issues: self.issues,
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn declare(
        &mut self,
        name: &str,
        kind: SymbolKind,
        ty: TypeIr,
        span: Option<SourceSpan>,
    ) -> SymbolId {
        let id = self.table.declare(Symbol {
            name: name.to_string(),
            kind,
            ty,
            span,
        });
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), id);
        }
        id
    }

    /// Record the declared types of fields, methods and getters so property
    /// access inference can consult them without re-walking the class.
    fn declare_class_members(&mut self, class: &ClassDecl) {
        for field in &class.fields {
            self.table
                .record_class_member(&class.name, &field.name, field.declared_type.clone());
        }
        for method in &class.methods {
            let ty = if method.is_getter() {
                method.return_type.clone()
            } else {
                function_type(method)
            };
            self.table.record_class_member(&class.name, &method.name, ty);
        }
    }

    // =========================================================================
    // Class and function bodies
    // =========================================================================

    fn resolve_class(&mut self, class: &ClassDecl) {
        let previous = self.current_class.replace(class.name.clone());
        self.scopes.push(FxHashMap::default());

        for field in &class.fields {
            let id = self.declare(
                &field.name,
                SymbolKind::Field,
                field.declared_type.clone(),
                Some(field.span.clone()),
            );
            self.bindings.insert(field.id.clone(), id);
        }
        for method in &class.methods {
            let kind = if method.is_getter() {
                SymbolKind::Getter
            } else {
                SymbolKind::Method
            };
            let id = self.declare(
                &method.name,
                kind,
                function_type(method),
                Some(method.span.clone()),
            );
            self.bindings.insert(method.id.clone(), id);
        }

        for field in &class.fields {
            if let Some(init) = &field.initializer {
                self.resolve_expr(init);
            }
        }
        for ctor in &class.constructors {
            self.resolve_constructor(ctor);
        }
        for method in &class.methods {
            self.resolve_function(method);
        }

        self.scopes.pop();
        self.current_class = previous;
    }

    fn resolve_function(&mut self, function: &FunctionDecl) {
        let Some(body) = &function.body else {
            return;
        };
        self.scopes.push(FxHashMap::default());
        for param in &function.params {
            self.declare_param(param);
        }
        for stmt in &body.statements {
            self.resolve_stmt(stmt);
        }
        self.scopes.pop();
    }

    fn resolve_constructor(&mut self, ctor: &ConstructorDecl) {
        self.scopes.push(FxHashMap::default());
        for param in &ctor.params {
            self.declare_param(param);
        }
        for init in &ctor.initializers {
            self.resolve_expr(&init.value);
        }
        if let Some(super_call) = &ctor.super_call {
            for arg in &super_call.args {
                self.resolve_expr(arg);
            }
            for named in &super_call.named_args {
                self.resolve_expr(&named.value);
            }
        }
        if let Some(redirect) = &ctor.redirect {
            for arg in &redirect.args {
                self.resolve_expr(arg);
            }
            for named in &redirect.named_args {
                self.resolve_expr(&named.value);
            }
        }
        if let Some(body) = &ctor.body {
            for stmt in &body.statements {
                self.resolve_stmt(stmt);
            }
        }
        self.scopes.pop();
    }

    fn declare_param(&mut self, param: &ParameterDecl) {
        let id = self.declare(
            &param.name,
            SymbolKind::Parameter,
            param.declared_type.clone(),
            Some(param.span.clone()),
        );
        self.bindings.insert(param.id.clone(), id);
        if let Some(default) = &param.default_value {
            self.resolve_expr(default);
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn resolve_stmt(&mut self, stmt: &StmtIr) {
        match &stmt.kind {
            StmtKind::Block(stmts) => {
                self.scopes.push(FxHashMap::default());
                for s in stmts {
                    self.resolve_stmt(s);
                }
                self.scopes.pop();
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expr(condition);
                self.resolve_branch(then_branch);
                if let Some(else_branch) = else_branch {
                    self.resolve_branch(else_branch);
                }
            }
            StmtKind::For {
                init,
                condition,
                update,
                body,
            } => {
                // The init declaration scopes over condition, update and body.
                self.scopes.push(FxHashMap::default());
                if let Some(init) = init {
                    self.resolve_stmt(init);
                }
                if let Some(condition) = condition {
                    self.resolve_expr(condition);
                }
                if let Some(update) = update {
                    self.resolve_expr(update);
                }
                for s in body {
                    self.resolve_stmt(s);
                }
                self.scopes.pop();
            }
            StmtKind::ForIn {
                variable,
                iterable,
                body,
            } => {
                self.resolve_expr(iterable);
                self.scopes.push(FxHashMap::default());
                let id = self.declare(
                    variable,
                    SymbolKind::Local,
                    TypeIr::Dynamic,
                    Some(stmt.span.clone()),
                );
                self.bindings.insert(stmt.id.clone(), id);
                for s in body {
                    self.resolve_stmt(s);
                }
                self.scopes.pop();
            }
            StmtKind::While {
                condition, body, ..
            } => {
                self.resolve_expr(condition);
                self.resolve_branch(body);
            }
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.resolve_expr(value);
                }
            }
            StmtKind::Break | StmtKind::Continue => {}
            StmtKind::Throw(value) => self.resolve_expr(value),
            StmtKind::TryCatch {
                body,
                catch_clauses,
                finally_block,
            } => {
                self.resolve_branch(body);
                for clause in catch_clauses {
                    self.scopes.push(FxHashMap::default());
                    if let Some(var) = &clause.exception_var {
                        self.declare(var, SymbolKind::Local, TypeIr::Dynamic, Some(stmt.span.clone()));
                    }
                    if let Some(var) = &clause.stack_var {
                        self.declare(var, SymbolKind::Local, TypeIr::Dynamic, Some(stmt.span.clone()));
                    }
                    for s in &clause.body {
                        self.resolve_stmt(s);
                    }
                    self.scopes.pop();
                }
                if let Some(finally_block) = finally_block {
                    self.resolve_branch(finally_block);
                }
            }
            StmtKind::VariableDecl {
                name,
                declared_type,
                initializer,
                ..
            } => {
                // Initializer resolves before the name is in scope, so
                // `var x = x;` correctly errors on the right-hand side.
                if let Some(init) = initializer {
                    self.resolve_expr(init);
                }
                let ty = declared_type.clone().unwrap_or(TypeIr::Dynamic);
                let id = self.declare(name, SymbolKind::Local, ty, Some(stmt.span.clone()));
                self.bindings.insert(stmt.id.clone(), id);
            }
            StmtKind::ExpressionStmt(expr) => self.resolve_expr(expr),
        }
    }

    fn resolve_branch(&mut self, stmts: &[StmtIr]) {
        self.scopes.push(FxHashMap::default());
        for s in stmts {
            self.resolve_stmt(s);
        }
        self.scopes.pop();
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn resolve_expr(&mut self, expr: &ExprIr) {
        match &expr.kind {
            ExprKind::Literal(_) | ExprKind::This | ExprKind::Super => {}
            ExprKind::Identifier { name } => {
                let id = self.lookup_or_report(name, &expr.span);
                self.bindings.insert(expr.id.clone(), id);
            }
            ExprKind::Binary { left, right, .. } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            ExprKind::Unary { operand, .. } => self.resolve_expr(operand),
            ExprKind::MethodCall {
                target,
                method,
                args,
                named_args,
            } => {
                match target {
                    // Member lookup on a value is dynamic dispatch; only the
                    // receiver resolves here.
                    Some(target) => self.resolve_expr(target),
                    None => {
                        let id = self.lookup_or_report(method, &expr.span);
                        self.bindings.insert(expr.id.clone(), id);
                    }
                }
                for arg in args {
                    self.resolve_expr(arg);
                }
                for named in named_args {
                    self.resolve_expr(&named.value);
                }
            }
            ExprKind::PropertyAccess { target, .. } => self.resolve_expr(target),
            ExprKind::IndexAccess { target, index } => {
                self.resolve_expr(target);
                self.resolve_expr(index);
            }
            ExprKind::Conditional {
                condition,
                then_expr,
                else_expr,
            } => {
                self.resolve_expr(condition);
                self.resolve_expr(then_expr);
                self.resolve_expr(else_expr);
            }
            ExprKind::Assignment { target, value }
            | ExprKind::CompoundAssignment { target, value, .. } => {
                self.resolve_expr(target);
                self.resolve_expr(value);
            }
            ExprKind::Cast { operand, .. } => self.resolve_expr(operand),
            ExprKind::IsCheck { operand, .. } => self.resolve_expr(operand),
            ExprKind::Cascade { target, sections } => {
                self.resolve_expr(target);
                for section in sections {
                    match section {
                        CascadeSection::MethodCall {
                            args, named_args, ..
                        } => {
                            for arg in args {
                                self.resolve_expr(arg);
                            }
                            for named in named_args {
                                self.resolve_expr(&named.value);
                            }
                        }
                        CascadeSection::PropertySet { value, .. } => self.resolve_expr(value),
                    }
                }
            }
            ExprKind::NullAwareAccess { target, .. } => self.resolve_expr(target),
            ExprKind::NullCoalescing { left, right } => {
                self.resolve_expr(left);
                self.resolve_expr(right);
            }
            ExprKind::ListLiteral { elements } | ExprKind::SetLiteral { elements } => {
                for element in elements {
                    self.resolve_expr(element);
                }
            }
            ExprKind::MapLiteral { entries } => {
                for (key, value) in entries {
                    self.resolve_expr(key);
                    self.resolve_expr(value);
                }
            }
            ExprKind::StringInterpolation { parts } => {
                for part in parts {
                    if let InterpolationPart::Expr(inner) = part {
                        self.resolve_expr(inner);
                    }
                }
            }
            ExprKind::ConstructorCall {
                class_name,
                args,
                named_args,
                ..
            } => {
                let id = self.lookup_or_report(class_name, &expr.span);
                self.bindings.insert(expr.id.clone(), id);
                for arg in args {
                    self.resolve_expr(arg);
                }
                for named in named_args {
                    self.resolve_expr(&named.value);
                }
            }
            ExprKind::FunctionExpr { params, body } => {
                self.scopes.push(FxHashMap::default());
                for param in params {
                    self.declare(param, SymbolKind::Parameter, TypeIr::Dynamic, None);
                }
                for stmt in body {
                    self.resolve_stmt(stmt);
                }
                self.scopes.pop();
            }
            ExprKind::Parenthesized { inner } => self.resolve_expr(inner),
        }
    }

    fn lookup_or_report(&mut self, name: &str, span: &SourceSpan) -> SymbolId {
        for scope in self.scopes.iter().rev() {
            if let Some(&id) = scope.get(name) {
                return id;
            }
        }
        if let Some(global) = self.global {
            if let Some(export) = global.lookup(name) {
                let ty = export.ty.clone();
                return self.table.declare(Symbol {
                    name: name.to_string(),
                    kind: SymbolKind::Import,
                    ty,
                    span: None,
                });
            }
        }
        if AMBIENT_NAMES.contains(name) {
            return SymbolId::DYNAMIC;
        }
        self.issues.push(AnalysisIssue::error(
            codes::UNRESOLVED_IDENTIFIER,
            format!("unknown identifier '{name}'"),
            span.clone(),
        ));
        SymbolId::DYNAMIC
    }
}

impl Default for Resolver<'_> {
    fn default() -> Self {
        Self::new()
    }
}

fn function_type(function: &FunctionDecl) -> TypeIr {
    TypeIr::Function {
        params: function
            .params
            .iter()
            .map(|p| p.declared_type.clone())
            .collect(),
        ret: Box::new(function.return_type.clone()),
    }
}
