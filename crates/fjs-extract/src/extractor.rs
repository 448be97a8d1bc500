//! AST-to-IR extraction.
//!
//! Node kind vocabulary accepted from the front end:
//!
//! - declarations: `file`, `class`, `field`, `method`, `function`,
//!   `constructor`, `param`, `initializer`, `superCall`, `redirect`
//! - statements: `block`, `if`, `for`, `forIn`, `while`, `return`, `break`,
//!   `continue`, `throw`, `try`, `catch`, `finally`, `variableDecl`,
//!   `expressionStmt`, `empty` (absent optional slot)
//! - expressions: `intLiteral`, `doubleLiteral`, `boolLiteral`,
//!   `stringLiteral`, `nullLiteral`, `identifier`, `binary`, `unary`,
//!   `call`, `propertyAccess`, `indexAccess`, `conditional`, `assignment`,
//!   `compoundAssignment`, `cast`, `is`, `cascade`, `cascadeCall`,
//!   `cascadeSet`, `nullAware`, `nullCoalescing`, `listLiteral`,
//!   `mapLiteral`, `mapEntry`, `setLiteral`, `interpolation`, `interpText`,
//!   `constructorCall`, `namedArg`, `lambda`, `this`, `super`, `paren`
//!
//! Anything outside this set is a malformed AST and aborts the file.

use crate::ast::AstNode;
use fjs_common::SourceSpan;
use fjs_ir::{
    BinaryOp, CascadeSection, CatchClause, ClassDecl, ConstructorDecl, CtorInitializer,
    CtorRedirect, ExprIr, ExprKind, FieldDecl, FileIr, FunctionBody, FunctionDecl, IdGenerator,
    InterpolationPart, LiteralValue, MemberFlags, NamedArg, ParameterDecl, StmtIr, StmtKind,
    SuperCall, TypeIr, UnaryOp, WidgetKind,
};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ExtractError {
    MalformedAst { message: String, span: SourceSpan },
}

impl ExtractError {
    fn new(message: impl Into<String>, node: &AstNode) -> Self {
        ExtractError::MalformedAst {
            message: message.into(),
            span: node.span(),
        }
    }
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::MalformedAst { message, span } => {
                write!(f, "{span}: malformed AST: {message}")
            }
        }
    }
}

impl std::error::Error for ExtractError {}

/// A top-level symbol exported by one file, fed into the project-wide merge
/// phase.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolExport {
    pub name: String,
    pub kind: ExportKind,
    pub ty: TypeIr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Class,
    Function,
}

/// Top-level class and function names of an extracted file, with ids
/// resolved to declared types. No shared mutable state: safe to run per
/// file in parallel and merge afterwards.
pub fn file_exports(file: &FileIr) -> Vec<SymbolExport> {
    let mut exports = Vec::with_capacity(file.classes.len() + file.functions.len());
    for class in &file.classes {
        exports.push(SymbolExport {
            name: class.name.clone(),
            kind: ExportKind::Class,
            ty: TypeIr::named(class.name.clone()),
        });
    }
    for func in &file.functions {
        exports.push(SymbolExport {
            name: func.name.clone(),
            kind: ExportKind::Function,
            ty: TypeIr::Function {
                params: func.params.iter().map(|p| p.declared_type.clone()).collect(),
                ret: Box::new(func.return_type.clone()),
            },
        });
    }
    exports
}

/// Walks an external AST and produces `FileIr`. Owns its `IdGenerator`:
/// one extractor per file, never shared across workers.
pub struct Extractor {
    ids: IdGenerator,
    /// Enclosing class name, empty at file level. Used as the id context.
    context: String,
}

impl Extractor {
    pub fn new(ids: IdGenerator) -> Self {
        Self {
            ids,
            context: String::new(),
        }
    }

    pub fn extract_file(&mut self, ast: &AstNode) -> Result<FileIr, ExtractError> {
        if ast.kind != "file" {
            return Err(ExtractError::new(
                format!("expected 'file' root, got '{}'", ast.kind),
                ast,
            ));
        }
        let mut file = FileIr::new(ast.file.clone());
        for child in &ast.children {
            match child.kind.as_str() {
                "class" => {
                    let class = self.extract_class(child)?;
                    file.classes.push(class);
                }
                "function" => {
                    let func = self.extract_function(child)?;
                    file.functions.push(func);
                }
                other => {
                    return Err(ExtractError::new(
                        format!("unexpected top-level node '{other}'"),
                        child,
                    ));
                }
            }
        }
        file.metadata
            .insert("classCount".into(), file.classes.len().to_string());
        Ok(file)
    }

    fn extract_class(&mut self, node: &AstNode) -> Result<ClassDecl, ExtractError> {
        let name = require_value(node, "class name")?.to_string();
        self.context = name.clone();

        let superclass = node.attr("superclass").map(str::to_string);
        let widget_kind = WidgetKind::from_superclass(superclass.as_deref());

        let mut fields = Vec::new();
        let mut methods = Vec::new();
        let mut constructors = Vec::new();
        for member in &node.children {
            match member.kind.as_str() {
                "field" => fields.push(self.extract_field(member)?),
                "method" | "function" => methods.push(self.extract_function(member)?),
                "constructor" => constructors.push(self.extract_constructor(member, &name)?),
                other => {
                    return Err(ExtractError::new(
                        format!("unexpected class member '{other}'"),
                        member,
                    ));
                }
            }
        }

        let class = ClassDecl {
            id: self.ids.make("class", "", &name),
            span: node.span(),
            name,
            superclass,
            interfaces: split_list(node.attr("interfaces")),
            mixins: split_list(node.attr("mixins")),
            fields,
            methods,
            constructors,
            is_abstract: node.attr_bool("abstract"),
            widget_kind,
        };
        self.context.clear();
        Ok(class)
    }

    fn extract_field(&mut self, node: &AstNode) -> Result<FieldDecl, ExtractError> {
        let name = require_value(node, "field name")?.to_string();
        let initializer = node
            .children
            .first()
            .map(|c| self.extract_expr(c))
            .transpose()?;
        Ok(FieldDecl {
            id: self.ids.make("field", &self.context, &name),
            span: node.span(),
            name,
            declared_type: TypeIr::from_annotation(node.attr("type").unwrap_or("")),
            initializer,
            is_final: node.attr_bool("final"),
            is_const: node.attr_bool("const"),
            is_static: node.attr_bool("static"),
            is_late: node.attr_bool("late"),
        })
    }

    fn extract_function(&mut self, node: &AstNode) -> Result<FunctionDecl, ExtractError> {
        let name = require_value(node, "function name")?.to_string();
        let flags = member_flags(node);

        let mut params = Vec::new();
        for p in node.children_of("param") {
            params.push(self.extract_param(p)?);
        }
        let body = node
            .first_child_of("block")
            .map(|b| self.extract_body(b))
            .transpose()?;

        if body.is_none() && !flags.intersects(MemberFlags::ABSTRACT | MemberFlags::EXTERNAL) {
            return Err(ExtractError::new(
                format!("non-abstract function '{name}' has no body"),
                node,
            ));
        }

        FunctionDecl::try_new(
            self.ids.make("method", &self.context, &name),
            node.span(),
            name,
            TypeIr::from_annotation(node.attr("returnType").unwrap_or("")),
            params,
            body,
            flags,
        )
        .map_err(|e| ExtractError::new(e.to_string(), node))
    }

    fn extract_constructor(
        &mut self,
        node: &AstNode,
        class_name: &str,
    ) -> Result<ConstructorDecl, ExtractError> {
        // `value` holds the constructor name for `Class.named`, absent for
        // the unnamed constructor.
        let name = node.value.clone().filter(|n| !n.is_empty());

        let mut params = Vec::new();
        for p in node.children_of("param") {
            params.push(self.extract_param(p)?);
        }

        let mut initializers = Vec::new();
        for init in node.children_of("initializer") {
            let field = init
                .attr("field")
                .ok_or_else(|| ExtractError::new("initializer without field", init))?
                .to_string();
            let value_node = init
                .children
                .first()
                .ok_or_else(|| ExtractError::new("initializer without value", init))?;
            initializers.push(CtorInitializer {
                field,
                value: self.extract_expr(value_node)?,
            });
        }

        let super_call = node
            .first_child_of("superCall")
            .map(|sc| {
                let (args, named_args) = self.extract_args(&sc.children)?;
                Ok::<_, ExtractError>(SuperCall {
                    ctor_name: sc.value.clone().filter(|n| !n.is_empty()),
                    args,
                    named_args,
                })
            })
            .transpose()?;

        let redirect = node
            .first_child_of("redirect")
            .map(|r| {
                let (args, named_args) = self.extract_args(&r.children)?;
                Ok::<_, ExtractError>(CtorRedirect {
                    target: r.value.clone().filter(|n| !n.is_empty()),
                    args,
                    named_args,
                })
            })
            .transpose()?;

        let body = node
            .first_child_of("block")
            .map(|b| self.extract_body(b))
            .transpose()?;

        let id_name = name.as_deref().unwrap_or("new");
        Ok(ConstructorDecl {
            id: self.ids.make("ctor", class_name, id_name),
            span: node.span(),
            class_name: class_name.to_string(),
            name,
            params,
            initializers,
            super_call,
            redirect,
            body,
            is_const: node.attr_bool("const"),
            is_factory: node.attr_bool("factory"),
        })
    }

    fn extract_param(&mut self, node: &AstNode) -> Result<ParameterDecl, ExtractError> {
        let name = require_value(node, "parameter name")?.to_string();
        let default_value = node
            .children
            .first()
            .map(|c| self.extract_expr(c))
            .transpose()?;
        ParameterDecl::try_new(
            self.ids.make("param", &self.context, &name),
            node.span(),
            name,
            TypeIr::from_annotation(node.attr("type").unwrap_or("")),
            default_value,
            node.attr_bool("required"),
            // Unannotated parameters default to positional.
            node.attr_bool("positional") || !node.attr_bool("named"),
            node.attr_bool("named"),
        )
        .map_err(|e| ExtractError::new(e.to_string(), node))
    }

    fn extract_body(&mut self, block: &AstNode) -> Result<FunctionBody, ExtractError> {
        let statements = self.extract_stmt_list(&block.children)?;
        let mut body = FunctionBody::new(statements);
        body.metadata
            .insert("statementCount".into(), body.statements.len().to_string());
        Ok(body)
    }

    fn extract_stmt_list(&mut self, nodes: &[AstNode]) -> Result<Vec<StmtIr>, ExtractError> {
        nodes.iter().map(|n| self.extract_stmt(n)).collect()
    }

    /// A branch slot may be a `block` (list of statements) or a single
    /// statement node.
    fn extract_branch(&mut self, node: &AstNode) -> Result<Vec<StmtIr>, ExtractError> {
        if node.kind == "block" {
            self.extract_stmt_list(&node.children)
        } else {
            Ok(vec![self.extract_stmt(node)?])
        }
    }

    pub fn extract_stmt(&mut self, node: &AstNode) -> Result<StmtIr, ExtractError> {
        let span = node.span();
        let id = self.ids.make("stmt", &self.context, "");

        let kind = match node.kind.as_str() {
            "block" => StmtKind::Block(self.extract_stmt_list(&node.children)?),
            "if" => {
                let condition = self.extract_expr(child_at(node, 0, "if condition")?)?;
                let then_branch = self.extract_branch(child_at(node, 1, "if then-branch")?)?;
                let else_branch = node
                    .children
                    .get(2)
                    .map(|n| self.extract_branch(n))
                    .transpose()?;
                StmtKind::If {
                    condition,
                    then_branch,
                    else_branch,
                }
            }
            "for" => {
                // Fixed four slots: init, condition, update, body. Absent
                // slots are `empty` nodes.
                let init_node = child_at(node, 0, "for init")?;
                let cond_node = child_at(node, 1, "for condition")?;
                let update_node = child_at(node, 2, "for update")?;
                let body_node = child_at(node, 3, "for body")?;
                StmtKind::For {
                    init: non_empty(init_node)
                        .map(|n| self.extract_stmt(n))
                        .transpose()?
                        .map(Box::new),
                    condition: non_empty(cond_node)
                        .map(|n| self.extract_expr(n))
                        .transpose()?,
                    update: non_empty(update_node)
                        .map(|n| self.extract_expr(n))
                        .transpose()?,
                    body: self.extract_branch(body_node)?,
                }
            }
            "forIn" => StmtKind::ForIn {
                variable: require_value(node, "loop variable")?.to_string(),
                iterable: self.extract_expr(child_at(node, 0, "for-in iterable")?)?,
                body: self.extract_branch(child_at(node, 1, "for-in body")?)?,
            },
            "while" => StmtKind::While {
                condition: self.extract_expr(child_at(node, 0, "while condition")?)?,
                body: self.extract_branch(child_at(node, 1, "while body")?)?,
                is_do_while: node.attr_bool("doWhile"),
            },
            "return" => StmtKind::Return(
                node.children
                    .first()
                    .map(|n| self.extract_expr(n))
                    .transpose()?,
            ),
            "break" => StmtKind::Break,
            "continue" => StmtKind::Continue,
            "throw" => StmtKind::Throw(self.extract_expr(child_at(node, 0, "throw value")?)?),
            "try" => {
                let body = self.extract_branch(child_at(node, 0, "try body")?)?;
                let mut catch_clauses = Vec::new();
                for c in node.children_of("catch") {
                    catch_clauses.push(CatchClause {
                        exception_type: c.attr("exceptionType").map(TypeIr::from_annotation),
                        exception_var: c.attr("var").map(str::to_string),
                        stack_var: c.attr("stackVar").map(str::to_string),
                        body: self.extract_stmt_list(&c.children)?,
                    });
                }
                let finally_block = node
                    .first_child_of("finally")
                    .map(|f| self.extract_stmt_list(&f.children))
                    .transpose()?;
                StmtKind::TryCatch {
                    body,
                    catch_clauses,
                    finally_block,
                }
            }
            "variableDecl" => StmtKind::VariableDecl {
                name: require_value(node, "variable name")?.to_string(),
                declared_type: node.attr("type").map(TypeIr::from_annotation),
                initializer: node
                    .children
                    .first()
                    .map(|n| self.extract_expr(n))
                    .transpose()?,
                is_final: node.attr_bool("final"),
                is_const: node.attr_bool("const"),
            },
            "expressionStmt" => StmtKind::ExpressionStmt(
                self.extract_expr(child_at(node, 0, "expression statement")?)?,
            ),
            other => {
                return Err(ExtractError::new(
                    format!("unknown statement kind '{other}'"),
                    node,
                ));
            }
        };

        Ok(StmtIr::new(id, span, kind))
    }

    /// Split a call argument list into positional and named arguments.
    fn extract_args(&mut self, nodes: &[AstNode]) -> Result<(Vec<ExprIr>, Vec<NamedArg>), ExtractError> {
        let mut args = Vec::new();
        let mut named_args = Vec::new();
        for n in nodes {
            if n.kind == "namedArg" {
                named_args.push(NamedArg {
                    name: require_value(n, "named argument name")?.to_string(),
                    value: self.extract_expr(child_at(n, 0, "named argument value")?)?,
                });
            } else {
                args.push(self.extract_expr(n)?);
            }
        }
        Ok((args, named_args))
    }

    pub fn extract_expr(&mut self, node: &AstNode) -> Result<ExprIr, ExtractError> {
        let span = node.span();
        let id = self.ids.make("expr", &self.context, "");

        let kind = match node.kind.as_str() {
            "intLiteral" => ExprKind::Literal(LiteralValue::Int(
                require_value(node, "int literal")?
                    .parse()
                    .map_err(|_| ExtractError::new("unparseable int literal", node))?,
            )),
            "doubleLiteral" => ExprKind::Literal(LiteralValue::Double(
                require_value(node, "double literal")?
                    .parse()
                    .map_err(|_| ExtractError::new("unparseable double literal", node))?,
            )),
            "boolLiteral" => ExprKind::Literal(LiteralValue::Bool(
                require_value(node, "bool literal")? == "true",
            )),
            "stringLiteral" => {
                ExprKind::Literal(LiteralValue::String(node.value_str().to_string()))
            }
            "nullLiteral" => ExprKind::Literal(LiteralValue::Null),
            "identifier" => ExprKind::Identifier {
                name: require_value(node, "identifier")?.to_string(),
            },
            "binary" => {
                let op_str = require_value(node, "binary operator")?;
                let op = BinaryOp::from_dart(op_str)
                    .ok_or_else(|| ExtractError::new(format!("unknown operator '{op_str}'"), node))?;
                ExprKind::Binary {
                    op,
                    left: Box::new(self.extract_expr(child_at(node, 0, "left operand")?)?),
                    right: Box::new(self.extract_expr(child_at(node, 1, "right operand")?)?),
                }
            }
            "unary" => {
                let op_str = require_value(node, "unary operator")?;
                let op = UnaryOp::from_dart(op_str)
                    .ok_or_else(|| ExtractError::new(format!("unknown operator '{op_str}'"), node))?;
                ExprKind::Unary {
                    op,
                    operand: Box::new(self.extract_expr(child_at(node, 0, "operand")?)?),
                    prefix: node.attr("prefix") != Some("false"),
                }
            }
            "call" => {
                let method = require_value(node, "call target name")?.to_string();
                let has_target = node.attr_bool("hasTarget");
                let (target_node, arg_nodes) = if has_target {
                    let (first, rest) = node
                        .children
                        .split_first()
                        .ok_or_else(|| ExtractError::new("call with missing target", node))?;
                    (Some(first), rest)
                } else {
                    (None, node.children.as_slice())
                };
                let target = target_node
                    .map(|t| self.extract_expr(t))
                    .transpose()?
                    .map(Box::new);
                let (args, named_args) = self.extract_args(arg_nodes)?;
                ExprKind::MethodCall {
                    target,
                    method,
                    args,
                    named_args,
                }
            }
            "propertyAccess" => ExprKind::PropertyAccess {
                target: Box::new(self.extract_expr(child_at(node, 0, "access target")?)?),
                property: require_value(node, "property name")?.to_string(),
            },
            "indexAccess" => ExprKind::IndexAccess {
                target: Box::new(self.extract_expr(child_at(node, 0, "index target")?)?),
                index: Box::new(self.extract_expr(child_at(node, 1, "index")?)?),
            },
            "conditional" => ExprKind::Conditional {
                condition: Box::new(self.extract_expr(child_at(node, 0, "condition")?)?),
                then_expr: Box::new(self.extract_expr(child_at(node, 1, "then branch")?)?),
                else_expr: Box::new(self.extract_expr(child_at(node, 2, "else branch")?)?),
            },
            "assignment" => ExprKind::Assignment {
                target: Box::new(self.extract_expr(child_at(node, 0, "assignment target")?)?),
                value: Box::new(self.extract_expr(child_at(node, 1, "assignment value")?)?),
            },
            "compoundAssignment" => {
                let op_str = require_value(node, "compound operator")?;
                let base = op_str.strip_suffix('=').unwrap_or(op_str);
                let op = BinaryOp::from_dart(base)
                    .ok_or_else(|| ExtractError::new(format!("unknown operator '{op_str}'"), node))?;
                ExprKind::CompoundAssignment {
                    op,
                    target: Box::new(self.extract_expr(child_at(node, 0, "assignment target")?)?),
                    value: Box::new(self.extract_expr(child_at(node, 1, "assignment value")?)?),
                }
            }
            "cast" => ExprKind::Cast {
                operand: Box::new(self.extract_expr(child_at(node, 0, "cast operand")?)?),
                target_type: TypeIr::from_annotation(
                    node.attr("type")
                        .ok_or_else(|| ExtractError::new("cast without type", node))?,
                ),
            },
            "is" => ExprKind::IsCheck {
                operand: Box::new(self.extract_expr(child_at(node, 0, "is operand")?)?),
                tested_type: TypeIr::from_annotation(
                    node.attr("type")
                        .ok_or_else(|| ExtractError::new("is-check without type", node))?,
                ),
                negated: node.attr_bool("negated"),
            },
            "cascade" => {
                let target = Box::new(self.extract_expr(child_at(node, 0, "cascade target")?)?);
                let mut sections = Vec::new();
                for section in &node.children[1..] {
                    match section.kind.as_str() {
                        "cascadeCall" => {
                            let (args, named_args) = self.extract_args(&section.children)?;
                            sections.push(CascadeSection::MethodCall {
                                method: require_value(section, "cascade method")?.to_string(),
                                args,
                                named_args,
                            });
                        }
                        "cascadeSet" => sections.push(CascadeSection::PropertySet {
                            property: require_value(section, "cascade property")?.to_string(),
                            value: self.extract_expr(child_at(section, 0, "cascade value")?)?,
                        }),
                        other => {
                            return Err(ExtractError::new(
                                format!("unknown cascade section '{other}'"),
                                section,
                            ));
                        }
                    }
                }
                ExprKind::Cascade { target, sections }
            }
            "nullAware" => ExprKind::NullAwareAccess {
                target: Box::new(self.extract_expr(child_at(node, 0, "null-aware target")?)?),
                property: require_value(node, "property name")?.to_string(),
            },
            "nullCoalescing" => ExprKind::NullCoalescing {
                left: Box::new(self.extract_expr(child_at(node, 0, "left operand")?)?),
                right: Box::new(self.extract_expr(child_at(node, 1, "right operand")?)?),
            },
            "listLiteral" => ExprKind::ListLiteral {
                elements: self.extract_expr_list(&node.children)?,
            },
            "setLiteral" => ExprKind::SetLiteral {
                elements: self.extract_expr_list(&node.children)?,
            },
            "mapLiteral" => {
                let mut entries = Vec::new();
                for entry in &node.children {
                    if entry.kind != "mapEntry" {
                        return Err(ExtractError::new("map literal entry expected", entry));
                    }
                    entries.push((
                        self.extract_expr(child_at(entry, 0, "map key")?)?,
                        self.extract_expr(child_at(entry, 1, "map value")?)?,
                    ));
                }
                ExprKind::MapLiteral { entries }
            }
            "interpolation" => {
                let mut parts = Vec::new();
                for part in &node.children {
                    if part.kind == "interpText" {
                        parts.push(InterpolationPart::Text(part.value_str().to_string()));
                    } else {
                        parts.push(InterpolationPart::Expr(Box::new(self.extract_expr(part)?)));
                    }
                }
                ExprKind::StringInterpolation { parts }
            }
            "constructorCall" => {
                let full = require_value(node, "constructor name")?;
                let (class_name, ctor_name) = match full.split_once('.') {
                    Some((class, ctor)) => (class.to_string(), Some(ctor.to_string())),
                    None => (full.to_string(), None),
                };
                let (args, named_args) = self.extract_args(&node.children)?;
                ExprKind::ConstructorCall {
                    class_name,
                    ctor_name,
                    args,
                    named_args,
                    is_const: node.attr_bool("const"),
                }
            }
            "lambda" => {
                let params = split_list(node.attr("params"));
                let body_node = child_at(node, 0, "lambda body")?;
                let body = if body_node.kind == "block" {
                    self.extract_stmt_list(&body_node.children)?
                } else {
                    // Expression-bodied lambda: synthesize the return.
                    let value = self.extract_expr(body_node)?;
                    vec![StmtIr::new(
                        self.ids.make("stmt", &self.context, "lambdaReturn"),
                        value.span.clone(),
                        StmtKind::Return(Some(value)),
                    )]
                };
                ExprKind::FunctionExpr { params, body }
            }
            "this" => ExprKind::This,
            "super" => ExprKind::Super,
            "paren" => ExprKind::Parenthesized {
                inner: Box::new(self.extract_expr(child_at(node, 0, "parenthesized inner")?)?),
            },
            other => {
                return Err(ExtractError::new(
                    format!("unknown expression kind '{other}'"),
                    node,
                ));
            }
        };

        Ok(ExprIr::new(id, span, kind))
    }

    fn extract_expr_list(&mut self, nodes: &[AstNode]) -> Result<Vec<ExprIr>, ExtractError> {
        nodes.iter().map(|n| self.extract_expr(n)).collect()
    }
}

fn require_value<'a>(node: &'a AstNode, what: &str) -> Result<&'a str, ExtractError> {
    match node.value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ExtractError::new(format!("missing {what}"), node)),
    }
}

fn child_at<'a>(node: &'a AstNode, index: usize, what: &str) -> Result<&'a AstNode, ExtractError> {
    node.children
        .get(index)
        .ok_or_else(|| ExtractError::new(format!("missing {what}"), node))
}

fn non_empty(node: &AstNode) -> Option<&AstNode> {
    (node.kind != "empty").then_some(node)
}

fn split_list(attr: Option<&str>) -> Vec<String> {
    attr.map_or_else(Vec::new, |s| {
        s.split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    })
}

fn member_flags(node: &AstNode) -> MemberFlags {
    let table = [
        ("async", MemberFlags::ASYNC),
        ("generator", MemberFlags::GENERATOR),
        ("syncGenerator", MemberFlags::SYNC_GENERATOR),
        ("static", MemberFlags::STATIC),
        ("abstract", MemberFlags::ABSTRACT),
        ("getter", MemberFlags::GETTER),
        ("setter", MemberFlags::SETTER),
        ("operator", MemberFlags::OPERATOR),
        ("factory", MemberFlags::FACTORY),
        ("const", MemberFlags::CONST),
        ("override", MemberFlags::OVERRIDE),
        ("external", MemberFlags::EXTERNAL),
    ];
    let mut flags = MemberFlags::empty();
    for (attr, flag) in table {
        if node.attr_bool(attr) {
            flags |= flag;
        }
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn ast(v: Value) -> AstNode {
        serde_json::from_value(v).expect("valid AST json")
    }

    fn leaf(kind: &str, value: Option<&str>, attrs: Value) -> Value {
        json!({
            "kind": kind,
            "value": value,
            "attrs": attrs,
            "file": "main.dart", "line": 1, "column": 1, "offset": 0, "length": 1,
        })
    }

    fn tree(kind: &str, value: Option<&str>, attrs: Value, children: Vec<Value>) -> Value {
        let mut node = leaf(kind, value, attrs);
        node["children"] = Value::Array(children);
        node
    }

    fn extract(v: Value) -> Result<FileIr, ExtractError> {
        Extractor::new(IdGenerator::simple()).extract_file(&ast(v))
    }

    #[test]
    fn state_class_is_classified_by_superclass() {
        let file = extract(tree(
            "file",
            None,
            json!({}),
            vec![tree(
                "class",
                Some("_CounterState"),
                json!({"superclass": "State<Counter>"}),
                vec![tree(
                    "field",
                    Some("count"),
                    json!({"type": "int"}),
                    vec![leaf("intLiteral", Some("0"), json!({}))],
                )],
            )],
        ))
        .unwrap();

        let class = file.class("_CounterState").unwrap();
        assert_eq!(class.widget_kind, WidgetKind::State);
        assert_eq!(class.fields[0].declared_type, TypeIr::INT);
        assert!(class.fields[0].initializer.as_ref().unwrap().is_constant());
    }

    #[test]
    fn method_modifiers_map_to_flags() {
        let file = extract(tree(
            "file",
            None,
            json!({}),
            vec![tree(
                "class",
                Some("Repo"),
                json!({}),
                vec![tree(
                    "method",
                    Some("load"),
                    json!({"async": "true", "static": "true", "returnType": "Future"}),
                    vec![tree("block", None, json!({}), vec![])],
                )],
            )],
        ))
        .unwrap();

        let method = file.class("Repo").unwrap().method("load").unwrap();
        assert!(method.is_async());
        assert!(method.is_static());
        assert!(!method.is_getter());
    }

    #[test]
    fn named_parameters_keep_defaults() {
        let file = extract(tree(
            "file",
            None,
            json!({}),
            vec![tree(
                "function",
                Some("pad"),
                json!({}),
                vec![
                    leaf("param", Some("text"), json!({"type": "String"})),
                    tree(
                        "param",
                        Some("width"),
                        json!({"type": "int", "named": "true"}),
                        vec![leaf("intLiteral", Some("8"), json!({}))],
                    ),
                    tree("block", None, json!({}), vec![]),
                ],
            )],
        ))
        .unwrap();

        let params = &file.functions[0].params;
        assert!(params[0].is_positional());
        assert!(params[1].is_named());
        assert!(params[1].default_value.is_some());
    }

    #[test]
    fn cascade_sections_are_split_by_kind() {
        let cascade = tree(
            "cascade",
            None,
            json!({}),
            vec![
                leaf("identifier", Some("p"), json!({})),
                tree("cascadeCall", Some("draw"), json!({}), vec![]),
                tree(
                    "cascadeSet",
                    Some("x"),
                    json!({}),
                    vec![leaf("intLiteral", Some("3"), json!({}))],
                ),
            ],
        );
        let file = extract(tree(
            "file",
            None,
            json!({}),
            vec![tree(
                "function",
                Some("main"),
                json!({}),
                vec![tree(
                    "block",
                    None,
                    json!({}),
                    vec![tree("expressionStmt", None, json!({}), vec![cascade])],
                )],
            )],
        ))
        .unwrap();

        let body = file.functions[0].body.as_ref().unwrap();
        let StmtKind::ExpressionStmt(expr) = &body.statements[0].kind else {
            panic!("expected expression statement");
        };
        let ExprKind::Cascade { sections, .. } = &expr.kind else {
            panic!("expected cascade");
        };
        assert_eq!(sections.len(), 2);
        assert!(matches!(sections[0], CascadeSection::MethodCall { .. }));
        assert!(matches!(sections[1], CascadeSection::PropertySet { .. }));
    }

    #[test]
    fn unknown_node_kind_aborts_the_file() {
        let err = extract(tree(
            "file",
            None,
            json!({}),
            vec![leaf("mystery", None, json!({}))],
        ))
        .unwrap_err();
        let ExtractError::MalformedAst { message, .. } = err;
        assert!(message.contains("mystery"));
    }

    #[test]
    fn bodyless_concrete_function_is_malformed() {
        let err = extract(tree(
            "file",
            None,
            json!({}),
            vec![leaf("function", Some("ghost"), json!({}))],
        ))
        .unwrap_err();
        let ExtractError::MalformedAst { message, .. } = err;
        assert!(message.contains("ghost"));
    }

    #[test]
    fn exports_cover_classes_and_functions() {
        let file = extract(tree(
            "file",
            None,
            json!({}),
            vec![
                tree("class", Some("Counter"), json!({}), vec![]),
                tree(
                    "function",
                    Some("main"),
                    json!({"returnType": "void"}),
                    vec![tree("block", None, json!({}), vec![])],
                ),
            ],
        ))
        .unwrap();

        let exports = file_exports(&file);
        assert_eq!(exports.len(), 2);
        assert_eq!(exports[0].kind, ExportKind::Class);
        assert_eq!(exports[1].kind, ExportKind::Function);
        assert_eq!(exports[0].ty, TypeIr::named("Counter"));
    }
}
