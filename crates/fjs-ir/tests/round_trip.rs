//! Serialization round-trip coverage: for every IR node kind `n`,
//! `from_json(to_json(n))` must be `content_equals` to `n`.

use fjs_common::SourceSpan;
use fjs_ir::{
    BinaryOp, CascadeSection, CatchClause, ClassDecl, ConstructorDecl, CtorInitializer,
    CtorRedirect, ExprIr, ExprKind, FieldDecl, FileIr, FunctionBody, FunctionDecl, IdGenerator,
    InterpolationPart, LiteralValue, MemberFlags, NamedArg, ParameterDecl, StmtIr, StmtKind,
    SuperCall, TypeIr, UnaryOp, WidgetKind, content_equals,
};

// Ids sit behind a RefCell so fixture expressions can nest builder calls.
struct Builder {
    ids: std::cell::RefCell<IdGenerator>,
}

impl Builder {
    fn new() -> Self {
        Self {
            ids: std::cell::RefCell::new(IdGenerator::counter()),
        }
    }

    fn make(&self, node_type: &str, name: &str) -> fjs_ir::NodeId {
        self.ids.borrow_mut().make(node_type, "Counter", name)
    }

    fn span(&self) -> SourceSpan {
        SourceSpan::new("lib/main.dart", 3, 7, 42, 11)
    }

    fn expr(&self, kind: ExprKind) -> ExprIr {
        ExprIr::new(self.make("expr", ""), self.span(), kind)
    }

    fn stmt(&self, kind: StmtKind) -> StmtIr {
        StmtIr::new(self.make("stmt", ""), self.span(), kind)
    }

    fn ident(&self, name: &str) -> ExprIr {
        self.expr(ExprKind::Identifier { name: name.into() })
    }

    fn int(&self, v: i64) -> ExprIr {
        self.expr(ExprKind::Literal(LiteralValue::Int(v)))
    }
}

fn assert_expr_round_trip(expr: &ExprIr) {
    let back = ExprIr::from_json(&expr.to_json())
        .unwrap_or_else(|e| panic!("round trip failed for {}: {e}", expr.kind_name()));
    assert!(
        content_equals(expr, &back),
        "content mismatch for {}",
        expr.kind_name()
    );
    // Identity survives exactly, not just structurally.
    assert_eq!(expr.id, back.id);
    assert_eq!(expr.span, back.span);
}

fn assert_stmt_round_trip(stmt: &StmtIr) {
    let back = StmtIr::from_json(&stmt.to_json())
        .unwrap_or_else(|e| panic!("round trip failed for {}: {e}", stmt.kind_name()));
    assert!(
        content_equals(stmt, &back),
        "content mismatch for {}",
        stmt.kind_name()
    );
}

#[test]
fn every_expression_kind_round_trips() {
    let b = Builder::new();

    let count = b.ident("count");
    let one = b.int(1);
    let two = b.int(2);
    let cond = b.expr(ExprKind::Literal(LiteralValue::Bool(true)));
    let double_lit = b.expr(ExprKind::Literal(LiteralValue::Double(3.25)));
    let string_lit = b.expr(ExprKind::Literal(LiteralValue::String("hi".into())));
    let null_lit = b.expr(ExprKind::Literal(LiteralValue::Null));

    let named_arg_value = b.int(5);
    let lambda_body = b.stmt(StmtKind::Return(Some(b.ident("x"))));

    let exprs = vec![
        count.clone(),
        double_lit,
        string_lit,
        null_lit,
        b.expr(ExprKind::Binary {
            op: BinaryOp::Add,
            left: Box::new(count.clone()),
            right: Box::new(one.clone()),
        }),
        b.expr(ExprKind::Unary {
            op: UnaryOp::Inc,
            operand: Box::new(count.clone()),
            prefix: false,
        }),
        b.expr(ExprKind::MethodCall {
            target: Some(Box::new(count.clone())),
            method: "toString".into(),
            args: vec![],
            named_args: vec![NamedArg {
                name: "radix".into(),
                value: named_arg_value,
            }],
        }),
        b.expr(ExprKind::MethodCall {
            target: None,
            method: "print".into(),
            args: vec![count.clone()],
            named_args: vec![],
        }),
        b.expr(ExprKind::PropertyAccess {
            target: Box::new(count.clone()),
            property: "isEven".into(),
        }),
        b.expr(ExprKind::IndexAccess {
            target: Box::new(b.ident("items")),
            index: Box::new(one.clone()),
        }),
        b.expr(ExprKind::Conditional {
            condition: Box::new(cond.clone()),
            then_expr: Box::new(one.clone()),
            else_expr: Box::new(two.clone()),
        }),
        b.expr(ExprKind::Assignment {
            target: Box::new(count.clone()),
            value: Box::new(one.clone()),
        }),
        b.expr(ExprKind::CompoundAssignment {
            op: BinaryOp::Add,
            target: Box::new(count.clone()),
            value: Box::new(one.clone()),
        }),
        b.expr(ExprKind::Cast {
            operand: Box::new(count.clone()),
            target_type: TypeIr::DOUBLE,
        }),
        b.expr(ExprKind::IsCheck {
            operand: Box::new(count.clone()),
            tested_type: TypeIr::STRING,
            negated: true,
        }),
        b.expr(ExprKind::Cascade {
            target: Box::new(b.ident("controller")),
            sections: vec![
                CascadeSection::MethodCall {
                    method: "forward".into(),
                    args: vec![],
                    named_args: vec![],
                },
                CascadeSection::PropertySet {
                    property: "value".into(),
                    value: one.clone(),
                },
            ],
        }),
        b.expr(ExprKind::NullAwareAccess {
            target: Box::new(b.ident("maybe")),
            property: "length".into(),
        }),
        b.expr(ExprKind::NullCoalescing {
            left: Box::new(b.ident("maybe")),
            right: Box::new(one.clone()),
        }),
        b.expr(ExprKind::ListLiteral {
            elements: vec![one.clone(), two.clone()],
        }),
        b.expr(ExprKind::MapLiteral {
            entries: vec![(count.clone(), one.clone())],
        }),
        b.expr(ExprKind::SetLiteral {
            elements: vec![one.clone()],
        }),
        b.expr(ExprKind::StringInterpolation {
            parts: vec![
                InterpolationPart::Text("count: ".into()),
                InterpolationPart::Expr(Box::new(count.clone())),
            ],
        }),
        b.expr(ExprKind::ConstructorCall {
            class_name: "Text".into(),
            ctor_name: Some("rich".into()),
            args: vec![count.clone()],
            named_args: vec![],
            is_const: false,
        }),
        b.expr(ExprKind::FunctionExpr {
            params: vec!["x".into()],
            body: vec![lambda_body],
        }),
        b.expr(ExprKind::This),
        b.expr(ExprKind::Super),
        b.expr(ExprKind::Parenthesized {
            inner: Box::new(count.clone()),
        }),
    ];

    // One of each of the 24 kinds (plus literal sub-kinds).
    for expr in &exprs {
        assert_expr_round_trip(expr);
    }
}

#[test]
fn every_statement_kind_round_trips() {
    let b = Builder::new();

    let cond = b.expr(ExprKind::Literal(LiteralValue::Bool(true)));
    let count = b.ident("count");
    let one = b.int(1);
    let inner = b.stmt(StmtKind::ExpressionStmt(count.clone()));
    let init = b.stmt(StmtKind::VariableDecl {
        name: "i".into(),
        declared_type: Some(TypeIr::INT),
        initializer: Some(one.clone()),
        is_final: false,
        is_const: false,
    });

    let stmts = vec![
        b.stmt(StmtKind::Block(vec![inner.clone()])),
        b.stmt(StmtKind::If {
            condition: cond.clone(),
            then_branch: vec![inner.clone()],
            else_branch: Some(vec![inner.clone()]),
        }),
        b.stmt(StmtKind::If {
            condition: cond.clone(),
            then_branch: vec![],
            else_branch: None,
        }),
        b.stmt(StmtKind::For {
            init: Some(Box::new(init.clone())),
            condition: Some(cond.clone()),
            update: Some(count.clone()),
            body: vec![inner.clone()],
        }),
        b.stmt(StmtKind::ForIn {
            variable: "item".into(),
            iterable: b.ident("items"),
            body: vec![inner.clone()],
        }),
        b.stmt(StmtKind::While {
            condition: cond.clone(),
            body: vec![inner.clone()],
            is_do_while: true,
        }),
        b.stmt(StmtKind::Return(Some(count.clone()))),
        b.stmt(StmtKind::Return(None)),
        b.stmt(StmtKind::Break),
        b.stmt(StmtKind::Continue),
        b.stmt(StmtKind::Throw(b.ident("error"))),
        b.stmt(StmtKind::TryCatch {
            body: vec![inner.clone()],
            catch_clauses: vec![CatchClause {
                exception_type: Some(TypeIr::named("FormatException")),
                exception_var: Some("e".into()),
                stack_var: Some("st".into()),
                body: vec![inner.clone()],
            }],
            finally_block: Some(vec![inner.clone()]),
        }),
        init,
        b.stmt(StmtKind::ExpressionStmt(count)),
    ];

    for stmt in &stmts {
        assert_stmt_round_trip(stmt);
    }
}

#[test]
fn declarations_and_file_round_trip() {
    let b = Builder::new();
    let span = b.span();

    let param = ParameterDecl::try_new(
        b.make("param", "step"),
        span.clone(),
        "step",
        TypeIr::INT,
        Some(b.int(1)),
        true,
        false,
        true,
    )
    .expect("valid parameter");

    let body = FunctionBody::new(vec![b.stmt(StmtKind::Return(Some(b.ident("count"))))]);

    let method = FunctionDecl::try_new(
        b.make("method", "build"),
        span.clone(),
        "build",
        TypeIr::named("Widget"),
        vec![param.clone()],
        Some(body.clone()),
        MemberFlags::OVERRIDE,
    )
    .expect("valid method");

    let field = FieldDecl {
        id: b.make("field", "count"),
        span: span.clone(),
        name: "count".into(),
        declared_type: TypeIr::INT,
        initializer: Some(b.int(0)),
        is_final: false,
        is_const: false,
        is_static: false,
        is_late: false,
    };

    let ctor = ConstructorDecl {
        id: b.make("ctor", "named"),
        span: span.clone(),
        class_name: "Counter".into(),
        name: Some("named".into()),
        params: vec![param.clone()],
        initializers: vec![CtorInitializer {
            field: "count".into(),
            value: b.int(0),
        }],
        super_call: Some(SuperCall {
            ctor_name: None,
            args: vec![b.ident("key")],
            named_args: vec![],
        }),
        redirect: Some(CtorRedirect {
            target: None,
            args: vec![],
            named_args: vec![],
        }),
        body: Some(body),
        is_const: false,
        is_factory: false,
    };

    let class = ClassDecl {
        id: b.make("class", "Counter"),
        span: span.clone(),
        name: "Counter".into(),
        superclass: Some("State<CounterWidget>".into()),
        interfaces: vec!["Comparable".into()],
        mixins: vec!["TickerProviderStateMixin".into()],
        fields: vec![field.clone()],
        methods: vec![method.clone()],
        constructors: vec![ctor.clone()],
        is_abstract: false,
        widget_kind: WidgetKind::State,
    };

    let mut file = FileIr::new("lib/main.dart");
    file.classes.push(class.clone());
    file.functions.push(method.clone());
    file.metadata.insert("library".into(), "main".into());

    let param_back = ParameterDecl::from_json(&param.to_json()).expect("parameter");
    assert!(content_equals(&param, &param_back));
    assert!(param_back.is_named());

    let method_back = FunctionDecl::from_json(&method.to_json()).expect("method");
    assert!(content_equals(&method, &method_back));
    assert_eq!(method_back.flags, MemberFlags::OVERRIDE);

    let field_back = FieldDecl::from_json(&field.to_json()).expect("field");
    assert!(content_equals(&field, &field_back));

    let ctor_back = ConstructorDecl::from_json(&ctor.to_json()).expect("constructor");
    assert!(content_equals(&ctor, &ctor_back));
    assert!(ctor_back.super_call.is_some());
    assert!(ctor_back.redirect.is_some());

    let class_back = ClassDecl::from_json(&class.to_json()).expect("class");
    assert!(content_equals(&class, &class_back));
    assert_eq!(class_back.widget_kind, WidgetKind::State);

    let file_back = FileIr::from_json(&file.to_json()).expect("file");
    assert!(content_equals(&file, &file_back));
    assert_eq!(file_back.metadata.get("library").map(String::as_str), Some("main"));
}

#[test]
fn serialization_is_deterministic() {
    let b = Builder::new();
    let expr = b.expr(ExprKind::Binary {
        op: BinaryOp::Mul,
        left: Box::new(b.ident("a")),
        right: Box::new(b.int(2)),
    });
    let first = serde_json::to_string(&expr.to_json()).expect("serialize");
    let second = serde_json::to_string(&expr.to_json()).expect("serialize");
    assert_eq!(first, second);
}
