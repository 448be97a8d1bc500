//! Class, constructor and function emission.
//!
//! The unnamed Dart constructor becomes the JS `constructor`; every named
//! constructor becomes an instance method `constructor_<name>` (the same
//! convention call sites lower to), so a class never emits two JS
//! constructors. Named parameters become one trailing destructured object.

use crate::options::ModuleFormat;
use crate::precedence;
use crate::printer::JsEmitter;
use fjs_ir::{ClassDecl, ConstructorDecl, FieldDecl, FunctionDecl, MemberFlags, ParameterDecl};

impl JsEmitter {
    pub(crate) fn emit_class(&mut self, class: &ClassDecl) {
        self.source_comment(&class.span);
        if self.options.module_format == ModuleFormat::Esm {
            self.write("export ");
        }
        self.write("class ");
        self.write(&class.name);
        if let Some(superclass) = &class.superclass {
            self.write(" extends ");
            // `State<Counter>` extends the erased `State`.
            self.write(base_name(superclass));
        }
        self.write(" {");
        self.write_line();
        self.increase_indent();

        for field in &class.fields {
            self.emit_field(field);
        }
        let mut first_member = class.fields.is_empty();

        let unnamed = class.constructors.iter().find(|c| c.name.is_none());
        let named = class.constructors.iter().filter(|c| c.name.is_some());
        if let Some(ctor) = unnamed {
            if !first_member {
                self.write_line();
            }
            first_member = false;
            self.emit_constructor(ctor);
        }
        for ctor in named {
            if !first_member {
                self.write_line();
            }
            first_member = false;
            self.emit_constructor(ctor);
        }
        for method in &class.methods {
            if method.is_abstract() {
                continue;
            }
            if !first_member {
                self.write_line();
            }
            first_member = false;
            self.emit_method(method);
        }

        self.decrease_indent();
        self.line("}");
    }

    fn emit_field(&mut self, field: &FieldDecl) {
        self.source_comment(&field.span);
        if field.is_static {
            self.write("static ");
        }
        self.write(&field.name);
        self.write(" = ");
        match &field.initializer {
            // Only compile-time constants are safe at field position; other
            // initializers run in the constructor, which the extraction
            // stage has already arranged.
            Some(init) if init.is_constant() => self.emit_expr(init, precedence::ASSIGN),
            _ => self.write("null"),
        }
        self.line(";");
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    fn emit_constructor(&mut self, ctor: &ConstructorDecl) {
        self.source_comment(&ctor.span);
        match &ctor.name {
            None => self.write("constructor"),
            Some(name) => {
                self.write("constructor_");
                self.write(name);
            }
        }
        self.emit_params(&ctor.params);
        self.write(" {");
        self.write_line();
        self.increase_indent();

        if let Some(super_call) = &ctor.super_call {
            if ctor.name.is_none() {
                self.write("super");
                self.emit_call_args(&super_call.args, &super_call.named_args);
                self.line(";");
            } else {
                // A named constructor is a plain method; JS only allows
                // `super(...)` inside `constructor`.
                self.unsupported(
                    "superCall",
                    &ctor.span,
                    "super call in a named constructor",
                );
                self.write_line();
            }
        }
        for init in &ctor.initializers {
            self.write("this.");
            self.write(&init.field);
            self.write(" = ");
            self.emit_expr(&init.value, precedence::ASSIGN);
            self.line(";");
        }
        if let Some(redirect) = &ctor.redirect {
            match &redirect.target {
                Some(target) => {
                    self.write("this.constructor_");
                    self.write(target);
                    self.emit_call_args(&redirect.args, &redirect.named_args);
                    self.line(";");
                }
                None => {
                    // Re-invoking the unnamed constructor on an existing
                    // instance has no JS spelling.
                    self.unsupported(
                        "constructorRedirect",
                        &ctor.span,
                        "redirect to the unnamed constructor",
                    );
                    self.write_line();
                }
            }
        }
        if let Some(body) = &ctor.body {
            for stmt in &body.statements {
                self.emit_stmt(stmt);
            }
        }

        self.decrease_indent();
        self.line("}");
    }

    // =========================================================================
    // Methods and functions
    // =========================================================================

    fn emit_method(&mut self, method: &FunctionDecl) {
        self.source_comment(&method.span);
        if method.flags.contains(MemberFlags::OPERATOR) {
            self.unsupported("operator", &method.span, "operator methods");
            self.write_line();
            return;
        }
        if method.flags.contains(MemberFlags::EXTERNAL) {
            self.unsupported("external", &method.span, "external members");
            self.write_line();
            return;
        }
        if method.is_generator() {
            self.unsupported("generator", &method.span, "generator methods");
            self.write_line();
            return;
        }

        if method.is_static() {
            self.write("static ");
        }
        if method.is_async() {
            self.write("async ");
        }
        if method.is_getter() {
            self.write("get ");
        } else if method.is_setter() {
            self.write("set ");
        }
        self.write(&method.name);
        self.emit_params(&method.params);
        self.write(" ");
        self.emit_function_body(method);
        self.write_line();
    }

    pub(crate) fn emit_top_level_function(&mut self, function: &FunctionDecl) {
        self.source_comment(&function.span);
        if function.is_generator() {
            self.unsupported("generator", &function.span, "generator functions");
            self.write_line();
            return;
        }
        if self.options.module_format == ModuleFormat::Esm {
            self.write("export ");
        }
        if function.is_async() {
            self.write("async ");
        }
        self.write("function ");
        self.write(&function.name);
        self.emit_params(&function.params);
        self.write(" ");
        self.emit_function_body(function);
        self.write_line();
    }

    fn emit_function_body(&mut self, function: &FunctionDecl) {
        match &function.body {
            Some(body) => self.emit_body(&body.statements),
            None => self.write("{}"),
        }
    }

    /// `(a, b = 1, {c = 2, d} = {})`: positionals first, optional ones with
    /// defaults, then all named parameters as one destructured object.
    pub(crate) fn emit_params(&mut self, params: &[ParameterDecl]) {
        self.write("(");
        let mut first = true;
        for param in params.iter().filter(|p| p.is_positional()) {
            if !first {
                self.write(", ");
            }
            first = false;
            self.write(&param.name);
            if let Some(default) = &param.default_value {
                self.write(" = ");
                self.emit_expr(default, precedence::ASSIGN);
            }
        }
        let named: Vec<&ParameterDecl> = params.iter().filter(|p| p.is_named()).collect();
        if !named.is_empty() {
            if !first {
                self.write(", ");
            }
            self.write("{");
            for (i, param) in named.iter().enumerate() {
                if i > 0 {
                    self.write(", ");
                }
                self.write(&param.name);
                if let Some(default) = &param.default_value {
                    self.write(" = ");
                    self.emit_expr(default, precedence::ASSIGN);
                }
            }
            self.write("} = {}");
        }
        self.write(")");
    }
}

fn base_name(superclass: &str) -> &str {
    match superclass.find('<') {
        Some(open) => &superclass[..open],
        None => superclass,
    }
}
