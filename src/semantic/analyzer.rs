use thiserror::Error;

use crate::{
    ast::*,
    errors::{ErrorReporter, SourcePos},
};

use super::{ScopeStack, Symbol, SymbolKind, SymbolTable, stdenv};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SemanticError {
    #[error("#0: main function missing")]
    MainMissing,
    #[error("#1: return type of main must be int")]
    MainNotInt,
    #[error("#2: identifier redeclared")]
    Redeclared,
    #[error("#3: identifier declared void")]
    DeclaredVoid,
    #[error("#4: identifier declared void[]")]
    DeclaredVoidArray,
    #[error("#5: undeclared identifier")]
    Undeclared,
    #[error("#6: incompatible types for =")]
    IncompatibleAssignment,
    #[error("#7: invalid lvalue in assignment")]
    InvalidLvalue,
    #[error("#8: incompatible type for return statement")]
    IncompatibleReturn,
    #[error("#9: incompatible types for binary operator")]
    IncompatibleBinary,
    #[error("#10: incompatible type for unary operator")]
    IncompatibleUnary,
    #[error("#11: attempt to use a function as a scalar")]
    FunctionAsScalar,
    #[error("#12: attempt to use scalar/function as an array")]
    NotAnArray,
    #[error("#13: wrong type for element in array initializer")]
    WrongElementType,
    #[error("#14: invalid initializer: array initializer for scalar")]
    ArrayInitForScalar,
    #[error("#15: invalid initializer: scalar initializer for array")]
    ScalarInitForArray,
    #[error("#16: too many elements in array initializer")]
    TooManyElements,
    #[error("#17: array subscript is not an integer")]
    SubscriptNotInt,
    #[error("#18: array size missing")]
    ArraySizeMissing,
    #[error("#19: attempt to reference a scalar/array as a function")]
    NotAFunction,
    #[error("#20: \"if\" conditional is not of type boolean")]
    IfCondition,
    #[error("#21: \"for\" conditional is not of type boolean")]
    ForCondition,
    #[error("#22: \"while\" conditional is not of type boolean")]
    WhileCondition,
    #[error("#23: too many actual parameters")]
    TooManyArguments,
    #[error("#24: too few actual parameters")]
    TooFewArguments,
    #[error("#25: wrong type for actual parameter, %,")]
    WrongArgumentType,
}

/// Binds identifiers, synthesizes expression types and inserts
/// int to float conversions. Keeps going after every error.
pub struct SemanticAnalyzer<'a> {
    reporter: &'a mut ErrorReporter,
    scopes: ScopeStack,
    symbols: SymbolTable,
    current_return_type: Type,
}

impl<'a> SemanticAnalyzer<'a> {
    pub fn new(reporter: &'a mut ErrorReporter) -> Self {
        let mut symbols = SymbolTable::default();
        let mut scopes = ScopeStack::new();
        stdenv::populate(&mut symbols, &mut scopes);
        Self {
            reporter,
            scopes,
            symbols,
            current_return_type: Type::Void,
        }
    }

    pub fn check(mut self, program: &mut Program) -> SymbolTable {
        for decl in program.decls.iter_mut() {
            match decl {
                Decl::Var(var) => self.visit_var_decl(var),
                Decl::Fun(fun) => self.visit_fun_decl(fun),
            }
        }
        let has_main = self
            .scopes
            .retrieve("main")
            .and_then(|id| self.symbols.get(id))
            .is_some_and(Symbol::is_function);
        if !has_main {
            self.report(SemanticError::MainMissing, "", program.pos);
        }
        tracing::debug!(symbols = self.symbols.len(), "semantic analysis finished");
        self.symbols
    }

    fn report(&mut self, error: SemanticError, token_name: &str, pos: SourcePos) {
        self.reporter
            .report_error(&error.to_string(), token_name, pos);
    }

    fn declare(&mut self, ident: &mut Ident, kind: SymbolKind) {
        let id = self.symbols.declare(Symbol {
            name: ident.name.clone(),
            kind,
            pos: ident.pos,
        });
        ident.decl = Some(id);
        if !self.scopes.enter(&ident.name, id) {
            self.report(SemanticError::Redeclared, &ident.name, ident.pos);
        }
    }

    /// Binds an applied occurrence, reporting it when nothing is in scope
    fn resolve(&mut self, ident: &mut Ident) -> Option<Symbol> {
        // type names are never values
        let symbol = self
            .scopes
            .retrieve(&ident.name)
            .and_then(|id| Some(id).zip(self.symbols.get(id).cloned()))
            .filter(|(_, symbol)| !matches!(symbol.kind, SymbolKind::Type(_)));
        let Some((id, symbol)) = symbol else {
            ident.decl = None;
            self.report(SemanticError::Undeclared, "", ident.pos);
            return None;
        };
        ident.decl = Some(id);
        Some(symbol)
    }
}

/// Declarations
impl SemanticAnalyzer<'_> {
    fn visit_fun_decl(&mut self, fun: &mut FunDecl) {
        self.current_return_type = fun.return_ty.ty.clone();
        let kind = SymbolKind::Fun {
            return_ty: fun.return_ty.ty.clone(),
            params: fun.params.iter().map(|p| p.ty.ty.clone()).collect(),
            is_builtin: false,
        };
        self.declare(&mut fun.ident, kind);
        if fun.ident.name == "main" && !fun.return_ty.ty.is_int() {
            self.report(SemanticError::MainNotInt, &fun.ident.name, fun.ident.pos);
        }

        // parameters and body share one scope
        self.scopes.open_scope();
        for param in fun.params.iter_mut() {
            self.visit_param_decl(param);
        }
        self.visit_block(&mut fun.body);
        self.scopes.close_scope();
    }

    fn visit_param_decl(&mut self, param: &mut ParamDecl) {
        let kind = SymbolKind::Param {
            ty: param.ty.ty.clone(),
        };
        self.declare(&mut param.ident, kind);
        if param.ty.ty.element_type().is_some_and(Type::is_void) {
            self.report(SemanticError::DeclaredVoidArray, &param.ident.name, param.ty.pos);
        } else if param.ty.ty.is_void() {
            self.report(SemanticError::DeclaredVoid, &param.ident.name, param.ty.pos);
        }
    }

    fn visit_var_decl(&mut self, var: &mut VarDecl) {
        if !var.init.is_empty() {
            self.visit_expr(&mut var.init);
            if var.ty.ty.is_array() {
                self.check_array_initializer(var);
            } else {
                self.check_scalar_initializer(var);
            }
        }
        if let Type::Array { size, .. } = &mut var.ty.ty
            && size.is_none()
        {
            match &var.init.kind {
                ExprKind::InitList(elements) => *size = Some(elements.len()),
                _ => self.report(SemanticError::ArraySizeMissing, "", var.pos),
            }
        }

        let kind = SymbolKind::Var {
            ty: var.ty.ty.clone(),
            is_global: var.is_global,
        };
        self.declare(&mut var.ident, kind);
        if var.ty.ty.element_type().is_some_and(Type::is_void) {
            self.report(SemanticError::DeclaredVoidArray, &var.ident.name, var.ty.pos);
        } else if var.ty.ty.is_void() {
            self.report(SemanticError::DeclaredVoid, &var.ident.name, var.pos);
        }
    }

    fn check_array_initializer(&mut self, var: &mut VarDecl) {
        let ExprKind::InitList(elements) = &mut var.init.kind else {
            self.report(SemanticError::ScalarInitForArray, "", var.pos);
            return;
        };
        let Type::Array { element, size } = &var.ty.ty else {
            return;
        };
        for item in elements.iter_mut() {
            let item_ty = item.type_of();
            if item_ty.equals(element) {
                continue;
            }
            if element.is_float() && item_ty.is_int() {
                item.widen();
            } else {
                self.report(SemanticError::WrongElementType, "", item.pos);
            }
        }
        if size.is_some_and(|size| elements.len() > size) {
            self.report(SemanticError::TooManyElements, "", var.pos);
        }
    }

    fn check_scalar_initializer(&mut self, var: &mut VarDecl) {
        if matches!(var.init.kind, ExprKind::InitList(_)) {
            self.report(SemanticError::ArrayInitForScalar, "", var.pos);
            return;
        }
        let init_ty = var.init.type_of();
        if init_ty.equals(&var.ty.ty) {
            return;
        }
        if var.ty.ty.is_float() && init_ty.is_int() {
            var.init.widen();
        } else {
            self.report(SemanticError::IncompatibleAssignment, "", var.pos);
        }
    }
}

/// Statements
impl SemanticAnalyzer<'_> {
    fn visit_compound_stmt(&mut self, block: &mut CompoundStmt) {
        self.scopes.open_scope();
        self.visit_block(block);
        self.scopes.close_scope();
    }

    /// Visits the contents of a block inside the already open scope
    fn visit_block(&mut self, block: &mut CompoundStmt) {
        for var in block.decls.iter_mut() {
            self.visit_var_decl(var);
        }
        for stmt in block.stmts.iter_mut() {
            self.visit_stmt(stmt);
        }
    }

    fn visit_stmt(&mut self, stmt: &mut Stmt) {
        match &mut stmt.kind {
            StmtKind::Assign { lhs, rhs } => {
                self.visit_expr(lhs);
                self.visit_expr(rhs);
                self.check_assignment(lhs, rhs);
            }
            StmtKind::If {
                cond,
                then,
                otherwise,
            } => {
                self.check_condition(cond, SemanticError::IfCondition);
                self.visit_stmt(then);
                if let Some(otherwise) = otherwise {
                    self.visit_stmt(otherwise);
                }
            }
            StmtKind::While { cond, body } => {
                self.check_condition(cond, SemanticError::WhileCondition);
                self.visit_stmt(body);
            }
            StmtKind::For {
                init,
                cond,
                update,
                body,
            } => {
                if !init.is_empty() {
                    self.visit_expr(init);
                }
                if !cond.is_empty() {
                    self.check_condition(cond, SemanticError::ForCondition);
                }
                if !update.is_empty() {
                    self.visit_expr(update);
                }
                self.visit_stmt(body);
            }
            StmtKind::Return(value) => self.visit_return(value),
            StmtKind::Call(call) => self.visit_expr(call),
            StmtKind::Compound(block) => self.visit_compound_stmt(block),
        }
    }

    fn check_condition(&mut self, cond: &mut Expr, error: SemanticError) {
        self.visit_expr(cond);
        if !cond.type_of().equals(&Type::Bool) {
            self.report(error, "", cond.pos);
        }
    }

    fn visit_return(&mut self, value: &mut Expr) {
        if value.is_empty() {
            if !self.current_return_type.is_void() {
                self.report(SemanticError::IncompatibleReturn, "", value.pos);
            }
            return;
        }
        self.visit_expr(value);
        let value_ty = value.type_of();
        if !value_ty.assignable_to(&self.current_return_type) {
            self.report(SemanticError::IncompatibleReturn, "", value.pos);
        } else if self.current_return_type.is_float() && value_ty.is_int() {
            value.widen();
        }
    }

    /// Shared by assignment statements and for-loop assignments
    fn check_assignment(&mut self, lhs: &Expr, rhs: &mut Expr) {
        let (lhs_ty, rhs_ty) = (lhs.type_of(), rhs.type_of());
        if !rhs_ty.assignable_to(&lhs_ty) {
            self.report(SemanticError::IncompatibleAssignment, "", rhs.pos);
        } else if lhs_ty.is_float() && rhs_ty.is_int() {
            rhs.widen();
        }
        if !matches!(lhs.kind, ExprKind::Var(_) | ExprKind::Array { .. }) {
            self.report(SemanticError::InvalidLvalue, "", lhs.pos);
        }
    }
}

/// Expressions
impl SemanticAnalyzer<'_> {
    fn visit_expr(&mut self, expr: &mut Expr) {
        let pos = expr.pos;
        let ty = match &mut expr.kind {
            ExprKind::Empty => return,
            ExprKind::IntLit(_) => Type::Int,
            ExprKind::FloatLit(_) => Type::Float,
            ExprKind::BoolLit(_) => Type::Bool,
            ExprKind::StringLit(_) => Type::String,
            ExprKind::Var(ident) => self.visit_var(ident, pos),
            ExprKind::Array { array, index } => self.visit_array(array, index, pos),
            ExprKind::Call { callee, args } => self.visit_call(callee, args, pos),
            ExprKind::Binary { left, op, right } => {
                self.visit_expr(left);
                self.visit_expr(right);
                self.visit_binary(left, op, right, pos)
            }
            ExprKind::Unary { op, operand } => {
                self.visit_expr(operand);
                self.visit_unary(op, operand, pos)
            }
            ExprKind::Assign { lhs, rhs } => {
                self.visit_expr(lhs);
                self.visit_expr(rhs);
                self.check_assignment(lhs, rhs);
                lhs.type_of()
            }
            ExprKind::InitList(elements) => {
                for item in elements.iter_mut() {
                    self.visit_expr(item);
                }
                let element = elements.first().map_or(Type::Error, Expr::type_of);
                Type::array_of(element, Some(elements.len()))
            }
        };
        expr.ty = Some(ty);
    }

    fn visit_var(&mut self, ident: &mut Ident, pos: SourcePos) -> Type {
        let Some(symbol) = self.resolve(ident) else {
            return Type::Error;
        };
        if symbol.is_function() {
            self.report(SemanticError::FunctionAsScalar, "", pos);
            return Type::Error;
        }
        symbol.value_type()
    }

    fn visit_array(&mut self, array: &mut Expr, index: &mut Expr, pos: SourcePos) -> Type {
        let array_ty = match &mut array.kind {
            ExprKind::Var(ident) => self.resolve(ident).map(|symbol| {
                if symbol.is_function() {
                    Type::Error
                } else {
                    symbol.value_type()
                }
            }),
            _ => {
                self.visit_expr(array);
                Some(array.type_of())
            }
        };
        array.ty = Some(array_ty.clone().unwrap_or(Type::Error));

        self.visit_expr(index);
        if !index.type_of().equals(&Type::Int) {
            self.report(SemanticError::SubscriptNotInt, "", index.pos);
        }

        // an undeclared name has been reported already
        let Some(array_ty) = array_ty else {
            return Type::Error;
        };
        match array_ty.element_type() {
            Some(element) => element.clone(),
            None => {
                self.report(SemanticError::NotAnArray, "", pos);
                Type::Error
            }
        }
    }

    fn visit_call(&mut self, callee: &mut Ident, args: &mut [Expr], pos: SourcePos) -> Type {
        let signature = self.resolve(callee).map(|symbol| match symbol.kind {
            SymbolKind::Fun {
                return_ty, params, ..
            } => Some((return_ty, params)),
            _ => None,
        });
        for arg in args.iter_mut() {
            self.visit_expr(arg);
        }

        let Some(signature) = signature else {
            return Type::Error;
        };
        let Some((return_ty, params)) = signature else {
            self.report(SemanticError::NotAFunction, "", pos);
            return Type::Error;
        };
        if args.len() > params.len() {
            self.report(SemanticError::TooManyArguments, "", pos);
            return Type::Error;
        }
        if args.len() < params.len() {
            self.report(SemanticError::TooFewArguments, "", pos);
            return Type::Error;
        }
        for (idx, (arg, param_ty)) in args.iter_mut().zip(params.iter()).enumerate() {
            let arg_ty = arg.type_of();
            if !arg_ty.assignable_to(param_ty) {
                let name = format!("parameter {}", idx + 1);
                self.report(SemanticError::WrongArgumentType, &name, pos);
            } else if param_ty.is_float() && arg_ty.is_int() {
                arg.widen();
            }
        }
        return_ty
    }

    fn visit_binary(
        &mut self,
        left: &mut Expr,
        op: &mut Operator,
        right: &mut Expr,
        pos: SourcePos,
    ) -> Type {
        let (left_ty, right_ty) = (left.type_of(), right.type_of());
        if op.op.is_arithmetic() || op.op.is_relational() {
            let operand_ty = match (&left_ty, &right_ty) {
                (Type::Int, Type::Int) => Some(Type::Int),
                (Type::Float, Type::Float) => Some(Type::Float),
                (Type::Int, Type::Float) => {
                    left.widen();
                    Some(Type::Float)
                }
                (Type::Float, Type::Int) => {
                    right.widen();
                    Some(Type::Float)
                }
                _ => None,
            };
            if let Some(operand_ty) = operand_ty {
                let result = if op.op.is_relational() {
                    Type::Bool
                } else {
                    operand_ty.clone()
                };
                op.ty = Some(operand_ty);
                return result;
            }
        }
        if op.op.accepts_bool() && left_ty.is_bool() && right_ty.is_bool() {
            op.ty = Some(Type::Int);
            return Type::Bool;
        }

        op.ty = Some(Type::Error);
        if !left_ty.is_error() && !right_ty.is_error() {
            self.report(SemanticError::IncompatibleBinary, "", pos);
        }
        Type::Error
    }

    fn visit_unary(&mut self, op: &mut Operator, operand: &Expr, pos: SourcePos) -> Type {
        let operand_ty = operand.type_of();
        let ty = match (op.op, &operand_ty) {
            (Op::Plus | Op::Minus, Type::Int | Type::Float) => operand_ty.clone(),
            (Op::Not, Type::Bool) => Type::Bool,
            (Op::I2f, Type::Int) => {
                op.ty = Some(Type::Int);
                return Type::Float;
            }
            _ => {
                op.ty = Some(Type::Error);
                if !operand_ty.is_error() {
                    self.report(SemanticError::IncompatibleUnary, "", pos);
                }
                return Type::Error;
            }
        };
        op.ty = Some(ty.clone());
        ty
    }
}

#[cfg(test)]
mod test {
    use std::rc::Rc;

    use super::*;
    use crate::frontend;

    fn analyze(code: &str) -> (Program, ErrorReporter) {
        let mut reporter = ErrorReporter::new();
        let mut program =
            frontend::parse(Rc::new(code.chars().collect()), &mut reporter, false).expect("parse");
        assert_eq!(reporter.num_errors(), 0);
        SemanticAnalyzer::new(&mut reporter).check(&mut program);
        (program, reporter)
    }

    fn codes(code: &str) -> Vec<u8> {
        let (_, reporter) = analyze(code);
        reporter.errors().iter().filter_map(|e| e.code()).collect()
    }

    #[test]
    fn error_messages_match_catalogue() {
        assert_eq!(SemanticError::MainMissing.to_string(), "#0: main function missing");
        assert_eq!(
            SemanticError::IfCondition.to_string(),
            "#20: \"if\" conditional is not of type boolean"
        );
        assert_eq!(
            SemanticError::WrongArgumentType.to_string(),
            "#25: wrong type for actual parameter, %,"
        );
    }

    #[test]
    fn clean_program() {
        assert!(codes("int main() { int x; x = 1 + 2; putInt(x); return 0; }").is_empty());
    }

    #[test]
    fn declarations() {
        assert_eq!(codes("void x; int main() { return 0; }"), vec![3]);
        assert_eq!(codes("void x[2]; int main() { return 0; }"), vec![4]);
        assert_eq!(codes("int f(void v) { return 0; } int main() { return 0; }"), vec![3]);
        assert_eq!(codes("int main() { int a[]; return 0; }"), vec![18]);
        assert!(codes("int main() { int a[] = {1, 2}; return 0; }").is_empty());
        assert_eq!(codes("int f(int a, int a) { return a; } int main() { return 0; }"), vec![2]);
    }

    #[test]
    fn function_used_as_value() {
        assert_eq!(codes("int main() { int x; x = main; return 0; }"), vec![11]);
        assert_eq!(codes("int main() { int x; x = main[0]; return 0; }"), vec![12]);
        assert_eq!(codes("int main() { int x; x(); return 0; }"), vec![19]);
        assert_eq!(codes("int main() { y(); return 0; }"), vec![5]);
    }

    #[test]
    fn arrays() {
        assert_eq!(codes("int main() { int x; x[1] = 2; return 0; }"), vec![12]);
        assert_eq!(codes("int main() { int a[2]; a[true] = 2; return 0; }"), vec![17]);
        assert_eq!(codes("int main() { int a = {1}; return 0; }"), vec![14]);
        assert_eq!(codes("int main() { int a[2] = 1; return 0; }"), vec![15]);
        assert_eq!(codes("int main() { int a[1] = {1, 2, 3}; return 0; }"), vec![16]);
        assert_eq!(codes("int main() { bool a[2] = {true, 1}; return 0; }"), vec![13]);
    }

    #[test]
    fn array_initializer_widens_elements() {
        let (program, reporter) = analyze("float a[2] = {1, 2.0}; int main() { return 0; }");
        assert_eq!(reporter.num_errors(), 0);
        let Decl::Var(var) = &program.decls[0] else {
            panic!("variable expected");
        };
        let ExprKind::InitList(elements) = &var.init.kind else {
            panic!("initializer list expected");
        };
        assert!(elements[0].is_widened());
        assert!(!elements[1].is_widened());
    }

    #[test]
    fn operators() {
        assert_eq!(codes("int main() { bool b; b = 1 < true; return 0; }"), vec![9]);
        assert_eq!(codes("int main() { bool b; b = !1; return 0; }"), vec![10]);
        assert_eq!(codes("int main() { int x; x = -true; return 0; }"), vec![10]);
        assert!(codes("int main() { bool b; b = true == false && 1.5 >= 2; return 0; }").is_empty());
        assert_eq!(codes("int main() { bool b; b = true + false; return 0; }"), vec![9]);
    }

    #[test]
    fn error_type_suppresses_cascade() {
        assert_eq!(codes("int main() { int x; x = y + 1; return 0; }"), vec![5]);
        assert_eq!(codes("int main() { if (y) return 0; return 0; }"), vec![5]);
    }

    #[test]
    fn assignment_errors() {
        assert_eq!(codes("int main() { int x; x = true; return 0; }"), vec![6]);
        assert_eq!(codes("int main() { float f; int i; i = f; return 0; }"), vec![6]);
        assert_eq!(codes("int x = 1.5; int main() { return 0; }"), vec![6]);
    }

    #[test]
    fn conditions() {
        assert_eq!(codes("int main() { while (1) {} return 0; }"), vec![22]);
        assert_eq!(codes("int main() { int i; for (i = 0; i; i = i + 1) {} return 0; }"), vec![21]);
        assert!(codes("int main() { for (;;) {} return 0; }").is_empty());
    }

    #[test]
    fn returns() {
        assert_eq!(codes("int f() { return; } int main() { return 0; }"), vec![8]);
        assert_eq!(codes("void f() { return 1; } int main() { return 0; }"), vec![8]);
        assert!(codes("void f() { return; } int main() { return 0; }").is_empty());
    }

    #[test]
    fn call_arguments() {
        assert_eq!(codes("int main() { putInt(); return 0; }"), vec![24]);
        assert_eq!(codes("int main() { putBool(1); return 0; }"), vec![25]);
        let (_, reporter) = analyze("int main() { putBool(1); return 0; }");
        assert_eq!(
            reporter.errors()[0].message(),
            "#25: wrong type for actual parameter, parameter 1,"
        );
    }

    #[test]
    fn call_argument_widening() {
        let (program, reporter) = analyze("int main() { putFloat(1); return 0; }");
        assert_eq!(reporter.num_errors(), 0);
        let Decl::Fun(main) = &program.decls[0] else {
            panic!("function expected");
        };
        let StmtKind::Call(call) = &main.body.stmts[0].kind else {
            panic!("call expected");
        };
        let ExprKind::Call { args, .. } = &call.kind else {
            panic!("call expected");
        };
        assert!(args[0].is_widened());
        assert_eq!(call.type_of(), Type::Void);
    }

    #[test]
    fn mixed_binary_widens_int_side() {
        let (program, _) = analyze("int main() { float f; f = 1 * 2.5; return 0; }");
        let Decl::Fun(main) = &program.decls[0] else {
            panic!("function expected");
        };
        let StmtKind::Assign { rhs, .. } = &main.body.stmts[0].kind else {
            panic!("assignment expected");
        };
        let ExprKind::Binary { left, op, right } = &rhs.kind else {
            panic!("binary expected");
        };
        assert!(left.is_widened());
        assert!(!right.is_widened());
        assert_eq!(op.ty, Some(Type::Float));
        assert_eq!(rhs.type_of(), Type::Float);
    }

    #[test]
    fn scopes_close_after_blocks() {
        let code = "int main() { { int inner; } inner = 1; return 0; }";
        assert_eq!(codes(code), vec![5]);
        let code = "int f() { int x; return 0; } int main() { x = 1; return 0; }";
        assert_eq!(codes(code), vec![5]);
        let code = "void f() {} int main() { int f; return 0; }";
        assert!(codes(code).is_empty());
    }

    #[test]
    fn initializer_sees_outer_binding() {
        let code = "int x = 1; int main() { int x = x + 1; return x; }";
        let (program, reporter) = analyze(code);
        assert_eq!(reporter.num_errors(), 0);
        let Decl::Fun(main) = &program.decls[1] else {
            panic!("function expected");
        };
        let local = &main.body.decls[0];
        let ExprKind::Binary { left, .. } = &local.init.kind else {
            panic!("binary expected");
        };
        let ExprKind::Var(outer) = &left.kind else {
            panic!("variable expected");
        };
        assert_ne!(outer.decl, local.ident.decl);
    }
}
