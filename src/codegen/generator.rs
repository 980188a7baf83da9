use std::fmt::Write;

use crate::{
    ast::*,
    errors::SourcePos,
    semantic::{SymbolKind, SymbolTable, stdenv::RUNTIME_CLASS},
};

use super::{
    CodegenError, CodegenResult,
    frame::{Frame, MethodKind},
    instruction::{Condition, ElementKind, Instruction, ValueKind},
};

const MAX_STACK: usize = 150;
const INDENT: &str = "   ";

/// Where a variable lives at run time
enum Storage {
    Static { field: String, desc: String },
    Slot(ValueKind, u16),
}

/// Emits the assembly text of one class for a checked program
pub struct CodeGenerator<'a> {
    class_name: String,
    symbols: &'a SymbolTable,
    out: String,
    indent: usize,
    frame: Frame,
    returns: Option<ValueKind>,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(class_name: &str, symbols: &'a SymbolTable) -> Self {
        Self {
            class_name: class_name.to_string(),
            symbols,
            out: String::new(),
            indent: 0,
            frame: Frame::new(MethodKind::ClassInit),
            returns: None,
        }
    }

    pub fn generate(mut self, program: &Program) -> CodegenResult<String> {
        self.line("; Jasmin assembly code");
        self.line("; MiniC v. 1.0");
        self.line(&format!(".class public {}", self.class_name));
        self.line(".super java/lang/Object");

        let globals = program
            .decls
            .iter()
            .filter_map(|decl| match decl {
                Decl::Var(var) => Some(var),
                Decl::Fun(_) => None,
            })
            .collect::<Vec<_>>();
        for var in globals.iter() {
            let desc = descriptor(&var.ty.ty)?;
            self.line(&format!(".field static {} {desc}", var.ident.name));
        }
        self.emit_class_initializer(&globals)?;
        self.emit_constructor();
        for decl in program.decls.iter() {
            if let Decl::Fun(fun) = decl {
                self.emit_function(fun)?;
            }
        }
        tracing::debug!(class = %self.class_name, bytes = self.out.len(), "code generation finished");
        Ok(self.out)
    }
}

/// Output primitives
impl CodeGenerator<'_> {
    fn line(&mut self, text: &str) {
        let _ = writeln!(self.out, "{}{text}", INDENT.repeat(self.indent));
    }

    fn emit(&mut self, instruction: Instruction) {
        self.line(&instruction.to_string());
    }

    fn label(&mut self, label: usize) {
        let _ = writeln!(self.out, "  Label{label}:");
    }

    fn comment(&mut self, what: &str, pos: SourcePos) {
        self.line(&format!("; {what}, line {}", pos.start_line));
    }

    fn begin_method(&mut self, header: &str) {
        self.out.push('\n');
        self.line(header);
        self.indent += 1;
    }

    fn end_method(&mut self) {
        self.indent -= 1;
        self.line(".end method");
    }
}

/// Class structure
impl CodeGenerator<'_> {
    fn emit_class_initializer(&mut self, globals: &[&VarDecl]) -> CodegenResult<()> {
        self.frame = Frame::new(MethodKind::ClassInit);
        self.begin_method(".method static <clinit>()V");
        self.line(&format!(".limit stack {MAX_STACK}"));
        self.line(".limit locals 0");
        for var in globals {
            self.emit_initial_value(var)?;
            let field = self.field_name(&var.ident.name);
            self.emit(Instruction::PutStatic(field, descriptor(&var.ty.ty)?));
        }
        self.emit(Instruction::Return(None));
        self.end_method();
        Ok(())
    }

    fn emit_constructor(&mut self) {
        self.begin_method(".method public <init>()V");
        self.line(".limit stack 1");
        self.line(".limit locals 1");
        self.line(&format!(
            ".var 0 is this L{}; from Label0 to Label1",
            self.class_name
        ));
        self.label(0);
        self.emit(Instruction::Load(ValueKind::Ref, 0));
        self.emit(Instruction::InvokeSpecial("java/lang/Object/<init>()V".into()));
        self.label(1);
        self.emit(Instruction::Return(None));
        self.end_method();
    }

    fn emit_function(&mut self, fun: &FunDecl) -> CodegenResult<()> {
        let is_main = fun.ident.name == "main";
        if is_main && !fun.params.is_empty() {
            return Err(CodegenError::MainWithParameters(fun.pos));
        }
        if is_main {
            self.frame = Frame::new(MethodKind::Main);
            self.returns = None;
            self.begin_method(".method public static main([Ljava/lang/String;)V");
        } else {
            self.frame = Frame::new(MethodKind::Instance);
            self.returns = return_kind(&fun.return_ty.ty)?;
            let params = fun.params.iter().map(|p| &p.ty.ty);
            let desc = method_descriptor(params, &fun.return_ty.ty)?;
            self.begin_method(&format!(".method public {}{desc}", fun.ident.name));
        }
        for param in fun.params.iter() {
            let decl = bound(&param.ident)?;
            self.frame.allocate(decl);
        }

        let (begin, end) = (self.frame.new_label(), self.frame.new_label());
        self.label(begin);
        if is_main {
            self.emit(Instruction::New(self.class_name.clone()));
            self.emit(Instruction::Dup);
            let init = format!("{}/<init>()V", self.class_name);
            self.emit(Instruction::InvokeSpecial(init));
            self.emit(Instruction::Store(ValueKind::Ref, 1));
        }
        self.emit_block(&fun.body)?;
        self.label(end);
        self.emit_default_return();
        self.line(&format!(".limit locals {}", self.frame.limit_locals()));
        self.line(&format!(".limit stack {MAX_STACK}"));
        self.end_method();
        tracing::trace!(
            method = %fun.ident.name,
            locals = self.frame.limit_locals(),
            "method emitted"
        );
        Ok(())
    }

    /// Keeps control from running off the end of a method
    fn emit_default_return(&mut self) {
        match self.returns {
            None => {}
            Some(ValueKind::Int) => self.emit(Instruction::IConst(0)),
            Some(ValueKind::Float) => self.emit(Instruction::FConst(0.0)),
            Some(ValueKind::Ref) => self.emit(Instruction::AConstNull),
        }
        self.emit(Instruction::Return(self.returns));
    }

    /// Pushes the value a declared variable starts with
    fn emit_initial_value(&mut self, var: &VarDecl) -> CodegenResult<()> {
        if let Type::Array { element, size } = &var.ty.ty {
            let size = size.ok_or_else(|| CodegenError::ArraySizeMissing {
                name: var.ident.name.clone(),
                pos: var.pos,
            })?;
            let element = element_kind(element)?;
            self.emit(Instruction::IConst(array_index(size, var.pos)?));
            self.emit(Instruction::NewArray(element));
            if let ExprKind::InitList(items) = &var.init.kind {
                for (idx, item) in items.iter().enumerate() {
                    self.emit(Instruction::Dup);
                    self.emit(Instruction::IConst(array_index(idx, item.pos)?));
                    self.emit_expr(item)?;
                    self.emit(Instruction::ArrayStore(element));
                }
            }
            return Ok(());
        }
        if !var.init.is_empty() {
            return self.emit_expr(&var.init);
        }
        match value_kind(&var.ty.ty)? {
            ValueKind::Int => self.emit(Instruction::IConst(0)),
            ValueKind::Float => self.emit(Instruction::FConst(0.0)),
            ValueKind::Ref => self.emit(Instruction::AConstNull),
        }
        Ok(())
    }
}

/// Statements
impl CodeGenerator<'_> {
    fn emit_block(&mut self, block: &CompoundStmt) -> CodegenResult<()> {
        for var in block.decls.iter() {
            let decl = bound(&var.ident)?;
            let kind = value_kind(&var.ty.ty)?;
            let slot = self.frame.allocate(decl);
            self.emit_initial_value(var)?;
            self.emit(Instruction::Store(kind, slot));
        }
        for stmt in block.stmts.iter() {
            self.emit_stmt(stmt)?;
        }
        Ok(())
    }

    fn emit_stmt(&mut self, stmt: &Stmt) -> CodegenResult<()> {
        match &stmt.kind {
            StmtKind::Assign { lhs, rhs } => {
                self.comment("assignment", stmt.pos);
                self.emit_assignment(lhs, rhs)
            }
            StmtKind::If {
                cond,
                then,
                otherwise,
            } => {
                self.comment("if", stmt.pos);
                let (else_label, end) = (self.frame.new_label(), self.frame.new_label());
                self.emit_expr(cond)?;
                self.emit(Instruction::If(Condition::Eq, else_label));
                self.emit_stmt(then)?;
                self.emit(Instruction::Goto(end));
                self.label(else_label);
                if let Some(otherwise) = otherwise {
                    self.emit_stmt(otherwise)?;
                }
                self.label(end);
                Ok(())
            }
            StmtKind::While { cond, body } => {
                self.comment("while", stmt.pos);
                let (top, end) = (self.frame.new_label(), self.frame.new_label());
                self.label(top);
                self.emit_expr(cond)?;
                self.emit(Instruction::If(Condition::Eq, end));
                self.emit_stmt(body)?;
                self.emit(Instruction::Goto(top));
                self.label(end);
                Ok(())
            }
            StmtKind::For {
                init,
                cond,
                update,
                body,
            } => {
                self.comment("for", stmt.pos);
                let (top, end) = (self.frame.new_label(), self.frame.new_label());
                self.emit_discarded(init)?;
                self.label(top);
                if !cond.is_empty() {
                    self.emit_expr(cond)?;
                    self.emit(Instruction::If(Condition::Eq, end));
                }
                self.emit_stmt(body)?;
                self.emit_discarded(update)?;
                self.emit(Instruction::Goto(top));
                self.label(end);
                Ok(())
            }
            StmtKind::Return(value) => {
                self.comment("return", stmt.pos);
                match self.returns {
                    None => {
                        self.emit_discarded(value)?;
                        self.emit(Instruction::Return(None));
                    }
                    Some(kind) => {
                        self.emit_expr(value)?;
                        self.emit(Instruction::Return(Some(kind)));
                    }
                }
                Ok(())
            }
            StmtKind::Call(call) => {
                self.comment("call", stmt.pos);
                self.emit_discarded(call)
            }
            StmtKind::Compound(block) => self.emit_block(block),
        }
    }

    /// Evaluates an expression for its side effects only
    fn emit_discarded(&mut self, expr: &Expr) -> CodegenResult<()> {
        match &expr.kind {
            ExprKind::Empty => Ok(()),
            ExprKind::Assign { lhs, rhs } => self.emit_assignment(lhs, rhs),
            _ => {
                self.emit_expr(expr)?;
                if !expr_type(expr)?.is_void() {
                    self.emit(Instruction::Pop);
                }
                Ok(())
            }
        }
    }

    fn emit_assignment(&mut self, lhs: &Expr, rhs: &Expr) -> CodegenResult<()> {
        match &lhs.kind {
            ExprKind::Var(ident) => {
                self.emit_expr(rhs)?;
                match self.storage(ident)? {
                    Storage::Static { field, desc } => self.emit(Instruction::PutStatic(field, desc)),
                    Storage::Slot(kind, slot) => self.emit(Instruction::Store(kind, slot)),
                }
            }
            ExprKind::Array { array, index } => {
                let element = element_kind(&expr_type(lhs)?)?;
                self.emit_expr(array)?;
                self.emit_expr(index)?;
                self.emit_expr(rhs)?;
                self.emit(Instruction::ArrayStore(element));
            }
            _ => return Err(CodegenError::InvalidTarget(lhs.pos)),
        }
        Ok(())
    }
}

/// Expressions
impl CodeGenerator<'_> {
    fn emit_expr(&mut self, expr: &Expr) -> CodegenResult<()> {
        match &expr.kind {
            ExprKind::Empty => {}
            ExprKind::IntLit(literal) => {
                let value = literal
                    .parse::<i32>()
                    .map_err(|_| CodegenError::IntOutOfRange {
                        literal: literal.clone(),
                        pos: expr.pos,
                    })?;
                self.emit(Instruction::IConst(value));
            }
            ExprKind::FloatLit(literal) => {
                let value = literal
                    .parse::<f32>()
                    .ok()
                    .filter(|value| value.is_finite())
                    .ok_or_else(|| CodegenError::FloatOutOfRange {
                        literal: literal.clone(),
                        pos: expr.pos,
                    })?;
                self.emit(Instruction::FConst(value));
            }
            ExprKind::BoolLit(value) => self.emit(Instruction::IConst(*value as i32)),
            ExprKind::StringLit(text) => self.emit(Instruction::LdcString(text.clone())),
            ExprKind::Var(ident) => match self.storage(ident)? {
                Storage::Static { field, desc } => self.emit(Instruction::GetStatic(field, desc)),
                Storage::Slot(kind, slot) => self.emit(Instruction::Load(kind, slot)),
            },
            ExprKind::Array { array, index } => {
                let element = element_kind(&expr_type(expr)?)?;
                self.emit_expr(array)?;
                self.emit_expr(index)?;
                self.emit(Instruction::ArrayLoad(element));
            }
            ExprKind::Call { callee, args } => self.emit_call(callee, args, expr.pos)?,
            ExprKind::Binary { left, op, right } => match op.op {
                Op::And => self.emit_short_circuit(left, right, Condition::Eq)?,
                Op::Or => self.emit_short_circuit(left, right, Condition::Ne)?,
                _ if op.op.is_relational() => self.emit_comparison(left, op, right)?,
                _ => self.emit_arithmetic(left, op, right)?,
            },
            ExprKind::Unary { op, operand } => self.emit_unary(op, operand)?,
            ExprKind::Assign { lhs, rhs } => self.emit_assignment(lhs, rhs)?,
            ExprKind::InitList(_) => return Err(CodegenError::MisplacedInitializer(expr.pos)),
        }
        Ok(())
    }

    fn emit_call(&mut self, callee: &Ident, args: &[Expr], pos: SourcePos) -> CodegenResult<()> {
        let symbols = self.symbols;
        let symbol = symbols.get(bound(callee)?).ok_or_else(|| unresolved(callee))?;
        let SymbolKind::Fun {
            return_ty,
            params,
            is_builtin,
        } = &symbol.kind
        else {
            return Err(unresolved(callee));
        };
        let desc = method_descriptor(params.iter(), return_ty)?;

        if *is_builtin {
            for arg in args {
                self.emit_expr(arg)?;
            }
            let method = format!("{RUNTIME_CLASS}/{}{desc}", callee.name);
            self.emit(Instruction::InvokeStatic(method));
            return Ok(());
        }
        if callee.name == "main" {
            return Err(CodegenError::MainCalled(pos));
        }
        let this = self
            .frame
            .this_slot()
            .ok_or_else(|| CodegenError::CallInInitializer {
                name: callee.name.clone(),
                pos,
            })?;
        self.emit(Instruction::Load(ValueKind::Ref, this));
        for arg in args {
            self.emit_expr(arg)?;
        }
        let method = format!("{}/{}{desc}", self.class_name, callee.name);
        self.emit(Instruction::InvokeVirtual(method));
        Ok(())
    }

    /// `exit` is the branch taken when the left operand decides the result
    fn emit_short_circuit(&mut self, left: &Expr, right: &Expr, exit: Condition) -> CodegenResult<()> {
        let (decided, end) = (self.frame.new_label(), self.frame.new_label());
        let fallthrough = (exit == Condition::Eq) as i32;
        self.emit_expr(left)?;
        self.emit(Instruction::If(exit, decided));
        self.emit_expr(right)?;
        self.emit(Instruction::If(exit, decided));
        self.emit(Instruction::IConst(fallthrough));
        self.emit(Instruction::Goto(end));
        self.label(decided);
        self.emit(Instruction::IConst(1 - fallthrough));
        self.label(end);
        Ok(())
    }

    fn emit_comparison(&mut self, left: &Expr, op: &Operator, right: &Expr) -> CodegenResult<()> {
        let cond = match op.op {
            Op::Eq => Condition::Eq,
            Op::NotEq => Condition::Ne,
            Op::Less => Condition::Lt,
            Op::LessEq => Condition::Le,
            Op::Greater => Condition::Gt,
            Op::GreaterEq => Condition::Ge,
            other => return Err(CodegenError::UnexpectedOperator(other.spell(), op.pos)),
        };
        let kind = operator_kind(op)?;
        let (is_true, end) = (self.frame.new_label(), self.frame.new_label());
        self.emit_expr(left)?;
        self.emit_expr(right)?;
        match kind {
            ValueKind::Int => self.emit(Instruction::IfICmp(cond, is_true)),
            ValueKind::Float => {
                let compare = match cond {
                    Condition::Lt | Condition::Le => Instruction::FCmpG,
                    _ => Instruction::FCmpL,
                };
                self.emit(compare);
                self.emit(Instruction::If(cond, is_true));
            }
            ValueKind::Ref => return Err(CodegenError::UnexpectedOperator(op.op.spell(), op.pos)),
        }
        self.emit(Instruction::IConst(0));
        self.emit(Instruction::Goto(end));
        self.label(is_true);
        self.emit(Instruction::IConst(1));
        self.label(end);
        Ok(())
    }

    fn emit_arithmetic(&mut self, left: &Expr, op: &Operator, right: &Expr) -> CodegenResult<()> {
        let kind = operator_kind(op)?;
        let instruction = match op.op {
            Op::Plus => Instruction::Add(kind),
            Op::Minus => Instruction::Subtract(kind),
            Op::Times => Instruction::Multiply(kind),
            Op::Div => Instruction::Divide(kind),
            other => return Err(CodegenError::UnexpectedOperator(other.spell(), op.pos)),
        };
        if kind == ValueKind::Ref {
            return Err(CodegenError::UnexpectedOperator(op.op.spell(), op.pos));
        }
        self.emit_expr(left)?;
        self.emit_expr(right)?;
        self.emit(instruction);
        Ok(())
    }

    fn emit_unary(&mut self, op: &Operator, operand: &Expr) -> CodegenResult<()> {
        self.emit_expr(operand)?;
        match op.op {
            Op::Plus => {}
            Op::Minus => self.emit(Instruction::Negate(operator_kind(op)?)),
            Op::I2f => self.emit(Instruction::IntToFloat),
            Op::Not => {
                let (was_true, end) = (self.frame.new_label(), self.frame.new_label());
                self.emit(Instruction::If(Condition::Ne, was_true));
                self.emit(Instruction::IConst(1));
                self.emit(Instruction::Goto(end));
                self.label(was_true);
                self.emit(Instruction::IConst(0));
                self.label(end);
            }
            other => return Err(CodegenError::UnexpectedOperator(other.spell(), op.pos)),
        }
        Ok(())
    }

    fn storage(&self, ident: &Ident) -> CodegenResult<Storage> {
        let decl = bound(ident)?;
        let symbol = self.symbols.get(decl).ok_or_else(|| unresolved(ident))?;
        match &symbol.kind {
            SymbolKind::Var {
                ty,
                is_global: true,
            } => Ok(Storage::Static {
                field: self.field_name(&ident.name),
                desc: descriptor(ty)?,
            }),
            SymbolKind::Var { ty, .. } | SymbolKind::Param { ty } => {
                let slot = self.frame.slot_of(decl).ok_or_else(|| unresolved(ident))?;
                Ok(Storage::Slot(value_kind(ty)?, slot))
            }
            _ => Err(unresolved(ident)),
        }
    }

    fn field_name(&self, name: &str) -> String {
        format!("{}.{name}", self.class_name)
    }
}

fn bound(ident: &Ident) -> CodegenResult<DeclId> {
    ident.decl.ok_or_else(|| unresolved(ident))
}

fn unresolved(ident: &Ident) -> CodegenError {
    CodegenError::Unresolved {
        name: ident.name.clone(),
        pos: ident.pos,
    }
}

fn expr_type(expr: &Expr) -> CodegenResult<Type> {
    match &expr.ty {
        Some(ty) if !ty.is_error() => Ok(ty.clone()),
        _ => Err(CodegenError::Untyped(expr.pos)),
    }
}

fn operator_kind(op: &Operator) -> CodegenResult<ValueKind> {
    match &op.ty {
        Some(ty) if !ty.is_error() => value_kind(ty),
        _ => Err(CodegenError::Untyped(op.pos)),
    }
}

fn array_index(value: usize, pos: SourcePos) -> CodegenResult<i32> {
    i32::try_from(value).map_err(|_| CodegenError::IntOutOfRange {
        literal: value.to_string(),
        pos,
    })
}

/// JVM type descriptor of a MiniC type
pub fn descriptor(ty: &Type) -> CodegenResult<String> {
    let desc = match ty {
        Type::Int => "I".to_string(),
        Type::Bool => "Z".to_string(),
        Type::Float => "F".to_string(),
        Type::String => "Ljava/lang/String;".to_string(),
        Type::Void => "V".to_string(),
        Type::Array { element, .. } => format!("[{}", descriptor(element)?),
        Type::Error => return Err(CodegenError::NoRepresentation(ty.clone())),
    };
    Ok(desc)
}

pub fn method_descriptor<'t>(
    params: impl Iterator<Item = &'t Type>,
    return_ty: &Type,
) -> CodegenResult<String> {
    let mut desc = String::from("(");
    for param in params {
        desc.push_str(&descriptor(param)?);
    }
    desc.push(')');
    desc.push_str(&descriptor(return_ty)?);
    Ok(desc)
}

fn value_kind(ty: &Type) -> CodegenResult<ValueKind> {
    match ty {
        Type::Int | Type::Bool => Ok(ValueKind::Int),
        Type::Float => Ok(ValueKind::Float),
        Type::String | Type::Array { .. } => Ok(ValueKind::Ref),
        Type::Void | Type::Error => Err(CodegenError::NoRepresentation(ty.clone())),
    }
}

fn return_kind(ty: &Type) -> CodegenResult<Option<ValueKind>> {
    if ty.is_void() {
        return Ok(None);
    }
    value_kind(ty).map(Some)
}

fn element_kind(ty: &Type) -> CodegenResult<ElementKind> {
    match ty {
        Type::Int => Ok(ElementKind::Int),
        Type::Float => Ok(ElementKind::Float),
        Type::Bool => Ok(ElementKind::Bool),
        Type::String => Ok(ElementKind::String),
        _ => Err(CodegenError::NoRepresentation(ty.clone())),
    }
}
