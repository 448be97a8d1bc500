//! Rebuild trigger graph.
//!
//! Connects state fields to the build methods their changes re-run, directly
//! (the build reads the field) and transitively (the build constructs
//! another widget declared in the same file, so that widget's build re-runs
//! too). Costs are static weight-table estimates, dimensionless; they only
//! rank rebuilds against each other and the thresholds.

use fjs_common::{AnalysisIssue, SourceSpan, codes, limits};
use fjs_ir::{
    CascadeSection, ClassDecl, ExprIr, ExprKind, FileIr, InterpolationPart, StmtIr, StmtKind,
    WidgetKind,
};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashSet;

/// One direct edge: a change to `field` re-runs `build_class`'s build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildEdge {
    /// Qualified field name, `Class.field`.
    pub field: String,
    /// The class whose build method reads the field.
    pub build_class: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebuildThresholds {
    pub expensive_cost: u32,
    pub cascade_fanout: usize,
}

impl Default for RebuildThresholds {
    fn default() -> Self {
        Self {
            expensive_cost: limits::EXPENSIVE_REBUILD_THRESHOLD,
            cascade_fanout: limits::CASCADE_FANOUT_THRESHOLD,
        }
    }
}

/// A field that triggers rebuilds (it is set inside `setState`) without any
/// build method depending on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnnecessaryRebuild {
    pub field: String,
    pub span: SourceSpan,
}

#[derive(Debug)]
struct BuildInfo {
    cost: u32,
    span: SourceSpan,
}

#[derive(Debug, Default)]
pub struct RebuildGraph {
    thresholds: RebuildThresholds,
    /// Build-owning class to its cost estimate.
    builds: IndexMap<String, BuildInfo>,
    /// Qualified field to the build classes that read it.
    direct: IndexMap<String, IndexSet<String>>,
    /// Build class to the build classes of widgets it constructs.
    constructs: IndexMap<String, IndexSet<String>>,
    /// Qualified fields written inside `setState` callbacks.
    set_state_writes: IndexMap<String, SourceSpan>,
    field_spans: IndexMap<String, SourceSpan>,
}

impl RebuildGraph {
    pub fn build(file: &FileIr) -> RebuildGraph {
        Self::build_with(file, RebuildThresholds::default())
    }

    pub fn build_with(file: &FileIr, thresholds: RebuildThresholds) -> RebuildGraph {
        tracing::debug!(file = %file.path, "building rebuild graph");
        let mut graph = RebuildGraph {
            thresholds,
            ..RebuildGraph::default()
        };

        // Map each widget class to the class owning its build method: a
        // StatefulWidget's build lives in its State subclass.
        let mut build_owner: IndexMap<&str, &str> = IndexMap::new();
        for class in &file.classes {
            match class.widget_kind {
                WidgetKind::Stateless => {
                    build_owner.insert(&class.name, &class.name);
                }
                WidgetKind::State => {
                    if let Some(widget) = state_target(class) {
                        build_owner.insert(widget, &class.name);
                    }
                }
                _ => {}
            }
        }

        for class in &file.classes {
            let has_build = matches!(class.widget_kind, WidgetKind::Stateless | WidgetKind::State);
            if !has_build {
                continue;
            }
            let Some(build) = class.method("build") else {
                continue;
            };
            let Some(body) = &build.body else {
                continue;
            };

            let fields: FxHashSet<&str> = class.fields.iter().map(|f| f.name.as_str()).collect();
            for field in &class.fields {
                graph
                    .field_spans
                    .insert(qualify(&class.name, &field.name), field.span.clone());
            }

            let mut scan = BuildScan::default();
            for stmt in &body.statements {
                scan.visit_stmt(stmt, &fields, 0);
            }

            let cost = limits::COST_BASE
                + scan.widget_count * limits::COST_PER_WIDGET
                + scan.max_nesting * limits::COST_PER_NESTING_LEVEL
                + scan.conditionals * limits::COST_PER_CONDITIONAL
                + scan.loops * limits::COST_PER_LOOP
                + if scan.dynamic_children {
                    limits::COST_DYNAMIC_CHILDREN
                } else {
                    0
                };
            graph.builds.insert(
                class.name.clone(),
                BuildInfo {
                    cost,
                    span: build.span.clone(),
                },
            );

            for field in &scan.field_reads {
                graph
                    .direct
                    .entry(qualify(&class.name, field))
                    .or_default()
                    .insert(class.name.clone());
            }
            for constructed in &scan.constructed {
                if let Some(owner) = build_owner.get(constructed.as_str()) {
                    if *owner != class.name {
                        graph
                            .constructs
                            .entry(class.name.clone())
                            .or_default()
                            .insert((*owner).to_string());
                    }
                }
            }

            // setState writes can occur in any method of a State class, not
            // just build.
            if class.widget_kind == WidgetKind::State {
                let mut writes = SetStateScan::default();
                for method in &class.methods {
                    if let Some(body) = &method.body {
                        for stmt in &body.statements {
                            writes.visit_stmt(stmt, &fields, false);
                        }
                    }
                }
                for (field, span) in writes.writes {
                    graph
                        .set_state_writes
                        .entry(qualify(&class.name, &field))
                        .or_insert(span);
                }
            }
        }
        graph
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The direct field-to-build edges, in deterministic insertion order.
    pub fn edges(&self) -> Vec<RebuildEdge> {
        self.direct
            .iter()
            .flat_map(|(field, targets)| {
                targets.iter().map(move |build_class| RebuildEdge {
                    field: field.clone(),
                    build_class: build_class.clone(),
                })
            })
            .collect()
    }

    pub fn build_cost(&self, class: &str) -> Option<u32> {
        self.builds.get(class).map(|info| info.cost)
    }

    /// Every build class a change to `field` re-runs, directly or through
    /// constructed child widgets. Fixed point over the constructs relation.
    pub fn transitive_affects(&self, field: &str) -> Vec<String> {
        let mut affected: IndexSet<String> = match self.direct.get(field) {
            Some(targets) => targets.clone(),
            None => return Vec::new(),
        };
        for _ in 0..limits::MAX_FIXPOINT_ITERATIONS {
            let mut added = Vec::new();
            for class in &affected {
                if let Some(children) = self.constructs.get(class) {
                    for child in children {
                        if !affected.contains(child) {
                            added.push(child.clone());
                        }
                    }
                }
            }
            if added.is_empty() {
                break;
            }
            affected.extend(added);
        }
        affected.into_iter().collect()
    }

    /// Fields that trigger rebuilds nothing depends on.
    pub fn unnecessary_rebuilds(&self) -> Vec<UnnecessaryRebuild> {
        self.set_state_writes
            .iter()
            .filter(|(field, _)| !self.direct.contains_key(*field))
            .map(|(field, span)| UnnecessaryRebuild {
                field: field.clone(),
                span: span.clone(),
            })
            .collect()
    }

    /// Build classes whose estimated cost reaches the expensive threshold.
    pub fn expensive_rebuilds(&self) -> Vec<(String, u32)> {
        self.builds
            .iter()
            .filter(|(_, info)| info.cost >= self.thresholds.expensive_cost)
            .map(|(class, info)| (class.clone(), info.cost))
            .collect()
    }

    /// Fields whose fan-out reaches the cascade threshold, with the builds
    /// they re-run.
    pub fn cascades(&self) -> Vec<(String, Vec<String>)> {
        self.direct
            .keys()
            .filter_map(|field| {
                let affected = self.transitive_affects(field);
                (affected.len() >= self.thresholds.cascade_fanout)
                    .then_some((field.clone(), affected))
            })
            .collect()
    }

    /// All graph findings as diagnostics.
    pub fn issues(&self) -> Vec<AnalysisIssue> {
        let mut issues = Vec::new();
        for finding in self.unnecessary_rebuilds() {
            issues.push(
                AnalysisIssue::warning(
                    codes::UNNECESSARY_REBUILD,
                    format!(
                        "'{}' is set inside setState but no build method reads it",
                        finding.field
                    ),
                    finding.span,
                )
                .with_suggestion("assign the field without setState, or drop it"),
            );
        }
        for (class, cost) in self.expensive_rebuilds() {
            let span = self
                .builds
                .get(&class)
                .map(|info| info.span.clone())
                .unwrap_or_else(SourceSpan::synthetic);
            issues.push(AnalysisIssue::warning(
                codes::EXPENSIVE_REBUILD,
                format!("build of '{class}' has estimated cost {cost}"),
                span,
            ));
        }
        for (field, affected) in self.cascades() {
            let span = self
                .field_spans
                .get(&field)
                .cloned()
                .unwrap_or_else(SourceSpan::synthetic);
            issues.push(AnalysisIssue::info(
                codes::REBUILD_CASCADE,
                format!(
                    "changing '{}' rebuilds {} widgets: {}",
                    field,
                    affected.len(),
                    affected.join(", ")
                ),
                span,
            ));
        }
        issues
    }
}

fn qualify(class: &str, field: &str) -> String {
    format!("{class}.{field}")
}

/// The widget a `State` subclass builds for, read off `State<Widget>`.
fn state_target(class: &ClassDecl) -> Option<&str> {
    let superclass = class.superclass.as_deref()?;
    let inner = superclass.strip_prefix("State<")?;
    Some(inner.trim_end_matches('>'))
}

// =============================================================================
// Build body scan
// =============================================================================

#[derive(Debug, Default)]
struct BuildScan {
    field_reads: IndexSet<String>,
    constructed: IndexSet<String>,
    widget_count: u32,
    max_nesting: u32,
    conditionals: u32,
    loops: u32,
    dynamic_children: bool,
}

impl BuildScan {
    fn visit_stmt(&mut self, stmt: &StmtIr, fields: &FxHashSet<&str>, depth: u32) {
        match &stmt.kind {
            StmtKind::Block(stmts) => {
                for s in stmts {
                    self.visit_stmt(s, fields, depth);
                }
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.conditionals += 1;
                self.visit_expr(condition, fields, depth);
                for s in then_branch {
                    self.visit_stmt(s, fields, depth);
                }
                if let Some(else_branch) = else_branch {
                    for s in else_branch {
                        self.visit_stmt(s, fields, depth);
                    }
                }
            }
            StmtKind::For {
                init,
                condition,
                update,
                body,
            } => {
                self.loops += 1;
                if let Some(init) = init {
                    self.visit_stmt(init, fields, depth);
                }
                if let Some(condition) = condition {
                    self.visit_expr(condition, fields, depth);
                }
                if let Some(update) = update {
                    self.visit_expr(update, fields, depth);
                }
                for s in body {
                    self.visit_stmt(s, fields, depth);
                }
            }
            StmtKind::ForIn { iterable, body, .. } => {
                self.loops += 1;
                self.visit_expr(iterable, fields, depth);
                for s in body {
                    self.visit_stmt(s, fields, depth);
                }
            }
            StmtKind::While {
                condition, body, ..
            } => {
                self.loops += 1;
                self.visit_expr(condition, fields, depth);
                for s in body {
                    self.visit_stmt(s, fields, depth);
                }
            }
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.visit_expr(value, fields, depth);
                }
            }
            StmtKind::Break | StmtKind::Continue => {}
            StmtKind::Throw(value) => self.visit_expr(value, fields, depth),
            StmtKind::TryCatch {
                body,
                catch_clauses,
                finally_block,
            } => {
                for s in body {
                    self.visit_stmt(s, fields, depth);
                }
                for clause in catch_clauses {
                    for s in &clause.body {
                        self.visit_stmt(s, fields, depth);
                    }
                }
                if let Some(finally_block) = finally_block {
                    for s in finally_block {
                        self.visit_stmt(s, fields, depth);
                    }
                }
            }
            StmtKind::VariableDecl { initializer, .. } => {
                if let Some(init) = initializer {
                    self.visit_expr(init, fields, depth);
                }
            }
            StmtKind::ExpressionStmt(expr) => self.visit_expr(expr, fields, depth),
        }
    }

    fn visit_expr(&mut self, expr: &ExprIr, fields: &FxHashSet<&str>, depth: u32) {
        match &expr.kind {
            ExprKind::Literal(_) | ExprKind::This | ExprKind::Super => {}
            ExprKind::Identifier { name } => {
                if fields.contains(name.as_str()) {
                    self.field_reads.insert(name.clone());
                }
            }
            ExprKind::ConstructorCall {
                class_name,
                args,
                named_args,
                ..
            } => {
                self.widget_count += 1;
                self.max_nesting = self.max_nesting.max(depth + 1);
                self.constructed.insert(class_name.clone());
                for named in named_args {
                    if matches!(named.name.as_str(), "builder" | "itemBuilder")
                        && matches!(named.value.kind, ExprKind::FunctionExpr { .. })
                    {
                        self.dynamic_children = true;
                    }
                    self.visit_expr(&named.value, fields, depth + 1);
                }
                for arg in args {
                    self.visit_expr(arg, fields, depth + 1);
                }
            }
            ExprKind::MethodCall {
                target,
                method,
                args,
                named_args,
            } => {
                // `items.map(...)` and `List.generate(...)` produce children
                // whose count is unknown statically.
                if matches!(method.as_str(), "map" | "generate") {
                    self.dynamic_children = true;
                }
                if let Some(target) = target {
                    self.visit_expr(target, fields, depth);
                }
                for arg in args {
                    self.visit_expr(arg, fields, depth);
                }
                for named in named_args {
                    self.visit_expr(&named.value, fields, depth);
                }
            }
            ExprKind::PropertyAccess { target, property } => {
                if matches!(target.kind, ExprKind::This) && fields.contains(property.as_str()) {
                    self.field_reads.insert(property.clone());
                } else {
                    self.visit_expr(target, fields, depth);
                }
            }
            ExprKind::IndexAccess { target, index } => {
                self.visit_expr(target, fields, depth);
                self.visit_expr(index, fields, depth);
            }
            ExprKind::Conditional {
                condition,
                then_expr,
                else_expr,
            } => {
                self.conditionals += 1;
                self.visit_expr(condition, fields, depth);
                self.visit_expr(then_expr, fields, depth);
                self.visit_expr(else_expr, fields, depth);
            }
            ExprKind::Binary { left, right, .. } => {
                self.visit_expr(left, fields, depth);
                self.visit_expr(right, fields, depth);
            }
            ExprKind::Unary { operand, .. } => self.visit_expr(operand, fields, depth),
            ExprKind::Assignment { target, value }
            | ExprKind::CompoundAssignment { target, value, .. } => {
                self.visit_expr(target, fields, depth);
                self.visit_expr(value, fields, depth);
            }
            ExprKind::Cast { operand, .. } | ExprKind::IsCheck { operand, .. } => {
                self.visit_expr(operand, fields, depth)
            }
            ExprKind::Cascade { target, sections } => {
                self.visit_expr(target, fields, depth);
                for section in sections {
                    match section {
                        CascadeSection::MethodCall {
                            args, named_args, ..
                        } => {
                            for arg in args {
                                self.visit_expr(arg, fields, depth);
                            }
                            for named in named_args {
                                self.visit_expr(&named.value, fields, depth);
                            }
                        }
                        CascadeSection::PropertySet { value, .. } => {
                            self.visit_expr(value, fields, depth)
                        }
                    }
                }
            }
            ExprKind::NullAwareAccess { target, .. } => self.visit_expr(target, fields, depth),
            ExprKind::NullCoalescing { left, right } => {
                self.visit_expr(left, fields, depth);
                self.visit_expr(right, fields, depth);
            }
            ExprKind::ListLiteral { elements } | ExprKind::SetLiteral { elements } => {
                for element in elements {
                    self.visit_expr(element, fields, depth);
                }
            }
            ExprKind::MapLiteral { entries } => {
                for (key, value) in entries {
                    self.visit_expr(key, fields, depth);
                    self.visit_expr(value, fields, depth);
                }
            }
            ExprKind::StringInterpolation { parts } => {
                for part in parts {
                    if let InterpolationPart::Expr(inner) = part {
                        self.visit_expr(inner, fields, depth);
                    }
                }
            }
            ExprKind::FunctionExpr { body, .. } => {
                for stmt in body {
                    self.visit_stmt(stmt, fields, depth);
                }
            }
            ExprKind::Parenthesized { inner } => self.visit_expr(inner, fields, depth),
        }
    }
}

// =============================================================================
// setState write scan
// =============================================================================

#[derive(Debug, Default)]
struct SetStateScan {
    writes: IndexMap<String, SourceSpan>,
}

impl SetStateScan {
    fn visit_stmt(&mut self, stmt: &StmtIr, fields: &FxHashSet<&str>, in_set_state: bool) {
        match &stmt.kind {
            StmtKind::Block(stmts) => {
                for s in stmts {
                    self.visit_stmt(s, fields, in_set_state);
                }
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.visit_expr(condition, fields, in_set_state);
                for s in then_branch {
                    self.visit_stmt(s, fields, in_set_state);
                }
                if let Some(else_branch) = else_branch {
                    for s in else_branch {
                        self.visit_stmt(s, fields, in_set_state);
                    }
                }
            }
            StmtKind::For { body, .. }
            | StmtKind::ForIn { body, .. }
            | StmtKind::While { body, .. } => {
                for s in body {
                    self.visit_stmt(s, fields, in_set_state);
                }
            }
            StmtKind::Return(Some(value)) => self.visit_expr(value, fields, in_set_state),
            StmtKind::Throw(value) => self.visit_expr(value, fields, in_set_state),
            StmtKind::TryCatch {
                body,
                catch_clauses,
                finally_block,
            } => {
                for s in body {
                    self.visit_stmt(s, fields, in_set_state);
                }
                for clause in catch_clauses {
                    for s in &clause.body {
                        self.visit_stmt(s, fields, in_set_state);
                    }
                }
                if let Some(finally_block) = finally_block {
                    for s in finally_block {
                        self.visit_stmt(s, fields, in_set_state);
                    }
                }
            }
            StmtKind::VariableDecl {
                initializer: Some(init),
                ..
            } => self.visit_expr(init, fields, in_set_state),
            StmtKind::ExpressionStmt(expr) => self.visit_expr(expr, fields, in_set_state),
            _ => {}
        }
    }

    fn visit_expr(&mut self, expr: &ExprIr, fields: &FxHashSet<&str>, in_set_state: bool) {
        match &expr.kind {
            ExprKind::MethodCall {
                target: None,
                method,
                args,
                named_args,
            } if method == "setState" => {
                for arg in args {
                    self.visit_expr(arg, fields, true);
                }
                for named in named_args {
                    self.visit_expr(&named.value, fields, true);
                }
            }
            ExprKind::MethodCall {
                target,
                args,
                named_args,
                ..
            } => {
                if let Some(target) = target {
                    self.visit_expr(target, fields, in_set_state);
                }
                for arg in args {
                    self.visit_expr(arg, fields, in_set_state);
                }
                for named in named_args {
                    self.visit_expr(&named.value, fields, in_set_state);
                }
            }
            ExprKind::Assignment { target, value }
            | ExprKind::CompoundAssignment { target, value, .. } => {
                if in_set_state {
                    let written = match &target.kind {
                        ExprKind::Identifier { name } if fields.contains(name.as_str()) => {
                            Some(name.clone())
                        }
                        ExprKind::PropertyAccess { target: base, property }
                            if matches!(base.kind, ExprKind::This)
                                && fields.contains(property.as_str()) =>
                        {
                            Some(property.clone())
                        }
                        _ => None,
                    };
                    if let Some(field) = written {
                        self.writes.entry(field).or_insert_with(|| target.span.clone());
                    }
                }
                self.visit_expr(value, fields, in_set_state);
            }
            ExprKind::Unary { operand, .. } => {
                // `_count++` inside setState is a write too.
                if in_set_state {
                    if let ExprKind::Identifier { name } = &operand.kind {
                        if fields.contains(name.as_str()) {
                            self.writes
                                .entry(name.clone())
                                .or_insert_with(|| operand.span.clone());
                        }
                    }
                }
                self.visit_expr(operand, fields, in_set_state);
            }
            ExprKind::FunctionExpr { body, .. } => {
                for stmt in body {
                    self.visit_stmt(stmt, fields, in_set_state);
                }
            }
            ExprKind::Conditional {
                condition,
                then_expr,
                else_expr,
            } => {
                self.visit_expr(condition, fields, in_set_state);
                self.visit_expr(then_expr, fields, in_set_state);
                self.visit_expr(else_expr, fields, in_set_state);
            }
            ExprKind::Binary { left, right, .. } | ExprKind::NullCoalescing { left, right } => {
                self.visit_expr(left, fields, in_set_state);
                self.visit_expr(right, fields, in_set_state);
            }
            ExprKind::Parenthesized { inner } => self.visit_expr(inner, fields, in_set_state),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fjs_common::SourceSpan;
    use fjs_ir::{
        FieldDecl, FunctionBody, FunctionDecl, IdGenerator, LiteralValue, MemberFlags, NamedArg,
        TypeIr,
    };

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

        fn ident(&mut self, name: &str) -> ExprIr {
            self.expr(ExprKind::Identifier {
                name: name.to_string(),
            })
        }

        fn ctor(&mut self, class: &str, args: Vec<ExprIr>) -> ExprIr {
            self.expr(ExprKind::ConstructorCall {
                class_name: class.to_string(),
                ctor_name: None,
                args,
                named_args: vec![],
                is_const: false,
            })
        }

        fn field(&mut self, name: &str) -> FieldDecl {
            FieldDecl {
                id: self.ids.make("field", "", name),
                span: SourceSpan::synthetic(),
                name: name.to_string(),
                declared_type: TypeIr::INT,
                initializer: None,
                is_final: false,
                is_const: false,
                is_static: false,
                is_late: false,
            }
        }

        fn build_method(&mut self, body: Vec<StmtIr>) -> FunctionDecl {
            FunctionDecl::try_new(
                self.ids.make("method", "", "build"),
                SourceSpan::synthetic(),
                "build",
                TypeIr::named("Widget"),
                vec![],
                Some(FunctionBody::new(body)),
                MemberFlags::OVERRIDE,
            )
            .unwrap()
        }

        fn class(
            &mut self,
            name: &str,
            widget_kind: WidgetKind,
            superclass: &str,
            fields: Vec<FieldDecl>,
            methods: Vec<FunctionDecl>,
        ) -> ClassDecl {
            ClassDecl {
                id: self.ids.make("class", "", name),
                span: SourceSpan::synthetic(),
                name: name.to_string(),
                superclass: Some(superclass.to_string()),
                interfaces: vec![],
                mixins: vec![],
                fields,
                methods,
                constructors: vec![],
                is_abstract: false,
                widget_kind,
            }
        }
    }

    /// A State class whose build returns `Text(_count)`.
    fn counter_file(b: &mut Builder) -> FileIr {
        let field = b.field("_count");
        let build = {
            let read = b.ident("_count");
            let text = b.ctor("Text", vec![read]);
            let ret = b.stmt(StmtKind::Return(Some(text)));
            b.build_method(vec![ret])
        };
        let state = b.class(
            "_CounterState",
            WidgetKind::State,
            "State<Counter>",
            vec![field],
            vec![build],
        );
        let mut file = FileIr::new("counter.dart");
        file.classes.push(state);
        file
    }

    #[test]
    fn field_read_in_build_creates_direct_edge() {
        let mut b = Builder::new();
        let file = counter_file(&mut b);
        let graph = RebuildGraph::build(&file);

        let edges = graph.edges();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].field, "_CounterState._count");
        assert_eq!(edges[0].build_class, "_CounterState");
    }

    #[test]
    fn transitive_affects_follows_constructed_widgets() {
        let mut b = Builder::new();
        // _HomeState.build reads _tab and constructs Detail (stateless,
        // declared in this file), whose build constructs Leaf.
        let home_field = b.field("_tab");
        let home_build = {
            let read = b.ident("_tab");
            let detail = b.ctor("Detail", vec![read]);
            let ret = b.stmt(StmtKind::Return(Some(detail)));
            b.build_method(vec![ret])
        };
        let home = b.class(
            "_HomeState",
            WidgetKind::State,
            "State<Home>",
            vec![home_field],
            vec![home_build],
        );

        let detail_build = {
            let leaf = b.ctor("Leaf", vec![]);
            let ret = b.stmt(StmtKind::Return(Some(leaf)));
            b.build_method(vec![ret])
        };
        let detail = b.class(
            "Detail",
            WidgetKind::Stateless,
            "StatelessWidget",
            vec![],
            vec![detail_build],
        );

        let leaf_build = {
            let text = b.ctor("Text", vec![]);
            let ret = b.stmt(StmtKind::Return(Some(text)));
            b.build_method(vec![ret])
        };
        let leaf = b.class(
            "Leaf",
            WidgetKind::Stateless,
            "StatelessWidget",
            vec![],
            vec![leaf_build],
        );

        let mut file = FileIr::new("home.dart");
        file.classes.extend([home, detail, leaf]);
        let graph = RebuildGraph::build(&file);

        let affected = graph.transitive_affects("_HomeState._tab");
        assert_eq!(affected, vec!["_HomeState", "Detail", "Leaf"]);
    }

    #[test]
    fn transitive_affects_is_a_superset_of_direct() {
        let mut b = Builder::new();
        let file = counter_file(&mut b);
        let graph = RebuildGraph::build(&file);
        for edge in graph.edges() {
            let affected = graph.transitive_affects(&edge.field);
            assert!(affected.contains(&edge.build_class));
        }
    }

    #[test]
    fn set_state_write_without_build_read_is_unnecessary() {
        let mut b = Builder::new();
        let shown = b.field("_shown");
        let hidden = b.field("_hidden");
        let build = {
            let read = b.ident("_shown");
            let text = b.ctor("Text", vec![read]);
            let ret = b.stmt(StmtKind::Return(Some(text)));
            b.build_method(vec![ret])
        };
        // _tick() calls setState(() { _hidden = 1; _shown = 2; })
        let tick = {
            let lambda_body = {
                let a1 = {
                    let target = b.ident("_hidden");
                    let value = b.expr(ExprKind::Literal(LiteralValue::Int(1)));
                    let assign = b.expr(ExprKind::Assignment {
                        target: Box::new(target),
                        value: Box::new(value),
                    });
                    b.stmt(StmtKind::ExpressionStmt(assign))
                };
                let a2 = {
                    let target = b.ident("_shown");
                    let value = b.expr(ExprKind::Literal(LiteralValue::Int(2)));
                    let assign = b.expr(ExprKind::Assignment {
                        target: Box::new(target),
                        value: Box::new(value),
                    });
                    b.stmt(StmtKind::ExpressionStmt(assign))
                };
                vec![a1, a2]
            };
            let lambda = b.expr(ExprKind::FunctionExpr {
                params: vec![],
                body: lambda_body,
            });
            let call = b.expr(ExprKind::MethodCall {
                target: None,
                method: "setState".to_string(),
                args: vec![lambda],
                named_args: vec![],
            });
            let stmt = b.stmt(StmtKind::ExpressionStmt(call));
            FunctionDecl::try_new(
                b.ids.make("method", "", "_tick"),
                SourceSpan::synthetic(),
                "_tick",
                TypeIr::Void,
                vec![],
                Some(FunctionBody::new(vec![stmt])),
                MemberFlags::empty(),
            )
            .unwrap()
        };
        let state = b.class(
            "_S",
            WidgetKind::State,
            "State<W>",
            vec![shown, hidden],
            vec![build, tick],
        );
        let mut file = FileIr::new("w.dart");
        file.classes.push(state);

        let graph = RebuildGraph::build(&file);
        let unnecessary = graph.unnecessary_rebuilds();
        assert_eq!(unnecessary.len(), 1);
        assert_eq!(unnecessary[0].field, "_S._hidden");
        assert!(graph.issues().iter().any(|i| i.code == codes::UNNECESSARY_REBUILD));
    }

    #[test]
    fn deep_builds_cross_the_expensive_threshold() {
        let mut b = Builder::new();
        // 20 widgets, 6 nesting levels, a builder lambda:
        // 1 + 20*2 + 6*3 + 10 = 69 >= 50.
        let mut inner = b.ctor("Text", vec![]);
        for _ in 0..4 {
            inner = b.ctor("Container", vec![inner]);
        }
        let mut extra = Vec::new();
        for _ in 0..14 {
            extra.push(b.ctor("Icon", vec![]));
        }
        extra.push(inner);
        let lambda = b.expr(ExprKind::FunctionExpr {
            params: vec![],
            body: vec![],
        });
        let list = {
            let children = b.expr(ExprKind::ListLiteral { elements: extra });
            b.expr(ExprKind::ConstructorCall {
                class_name: "ListView".to_string(),
                ctor_name: None,
                args: vec![children],
                named_args: vec![NamedArg {
                    name: "builder".to_string(),
                    value: lambda,
                }],
                is_const: false,
            })
        };
        let build = {
            let ret = b.stmt(StmtKind::Return(Some(list)));
            b.build_method(vec![ret])
        };
        let page = b.class(
            "Page",
            WidgetKind::Stateless,
            "StatelessWidget",
            vec![],
            vec![build],
        );
        let mut file = FileIr::new("page.dart");
        file.classes.push(page);

        let graph = RebuildGraph::build(&file);
        let expensive = graph.expensive_rebuilds();
        assert_eq!(expensive.len(), 1);
        assert_eq!(expensive[0].0, "Page");
        assert!(expensive[0].1 >= limits::EXPENSIVE_REBUILD_THRESHOLD);
        assert!(graph.issues().iter().any(|i| i.code == codes::EXPENSIVE_REBUILD));
    }

    #[test]
    fn wide_fanout_is_a_cascade() {
        let mut b = Builder::new();
        // _AppState.build reads _theme and constructs three stateless
        // widgets declared in the file: fanout 4 including itself.
        let field = b.field("_theme");
        let app_build = {
            let read = b.ident("_theme");
            let header = b.ctor("Header", vec![read]);
            let body = b.ctor("Body", vec![]);
            let footer = b.ctor("Footer", vec![]);
            let column = b.expr(ExprKind::ConstructorCall {
                class_name: "Column".to_string(),
                ctor_name: None,
                args: vec![header, body, footer],
                named_args: vec![],
                is_const: false,
            });
            let ret = b.stmt(StmtKind::Return(Some(column)));
            b.build_method(vec![ret])
        };
        let app = b.class(
            "_AppState",
            WidgetKind::State,
            "State<App>",
            vec![field],
            vec![app_build],
        );
        let mut file = FileIr::new("app.dart");
        file.classes.push(app);
        for name in ["Header", "Body", "Footer"] {
            let build = {
                let text = b.ctor("Text", vec![]);
                let ret = b.stmt(StmtKind::Return(Some(text)));
                b.build_method(vec![ret])
            };
            let widget = b.class(name, WidgetKind::Stateless, "StatelessWidget", vec![], vec![build]);
            file.classes.push(widget);
        }

        let graph = RebuildGraph::build(&file);
        let cascades = graph.cascades();
        assert_eq!(cascades.len(), 1);
        assert_eq!(cascades[0].0, "_AppState._theme");
        assert_eq!(cascades[0].1.len(), 4);
        assert!(graph.issues().iter().any(|i| i.code == codes::REBUILD_CASCADE));
    }

    #[test]
    fn unknown_field_affects_nothing() {
        let mut b = Builder::new();
        let file = counter_file(&mut b);
        let graph = RebuildGraph::build(&file);
        assert!(graph.transitive_affects("_CounterState._missing").is_empty());
    }
}
